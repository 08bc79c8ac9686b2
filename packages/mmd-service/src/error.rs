pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Malformed filter at {path}: {message}")]
	MalformedFilter { path: String, message: String },
	#[error("Malformed geometry: {message}")]
	MalformedGeometry { message: String },
	#[error("Record {identifier} is missing required field {field}.")]
	MalformedRecord { identifier: String, field: &'static str },
	#[error("Transform of record {identifier} failed: {message}")]
	RecordTransformFailed { identifier: String, message: String },
	#[error("Search backend unavailable: {message}")]
	BackendUnavailable { message: String },
	#[error("Invalid backend response: {message}")]
	InvalidResponse { message: String },
	#[error("Operation {operation} is not supported.")]
	UnsupportedOperation { operation: &'static str },
}
impl Error {
	/// The OWS exception code the protocol layer reports for this failure.
	pub fn exception_code(&self) -> &'static str {
		match self {
			Self::InvalidRequest { .. }
			| Self::MalformedFilter { .. }
			| Self::MalformedGeometry { .. } => "InvalidParameterValue",
			Self::UnsupportedOperation { .. } => "OperationNotSupported",
			Self::MalformedRecord { .. }
			| Self::RecordTransformFailed { .. }
			| Self::BackendUnavailable { .. }
			| Self::InvalidResponse { .. } => "NoApplicableCode",
		}
	}
}

impl From<mmd_domain::Error> for Error {
	fn from(err: mmd_domain::Error) -> Self {
		match err {
			mmd_domain::Error::MalformedFilter { path, message } =>
				Self::MalformedFilter { path, message },
			mmd_domain::Error::MalformedGeometry { message } => Self::MalformedGeometry { message },
			err @ mmd_domain::Error::InvalidTimestamp { .. } =>
				Self::InvalidRequest { message: err.to_string() },
		}
	}
}

impl From<mmd_providers::Error> for Error {
	fn from(err: mmd_providers::Error) -> Self {
		match err {
			mmd_providers::Error::Reqwest(_)
			| mmd_providers::Error::Io(_)
			| mmd_providers::Error::Status { .. } =>
				Self::BackendUnavailable { message: err.to_string() },
			mmd_providers::Error::SerdeJson(_)
			| mmd_providers::Error::InvalidResponse { .. }
			| mmd_providers::Error::Transform { .. } =>
				Self::InvalidResponse { message: err.to_string() },
		}
	}
}
