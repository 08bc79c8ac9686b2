pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
	#[error("Malformed filter at {path}: {message}")]
	MalformedFilter { path: String, message: String },
	#[error("Malformed geometry: {message}")]
	MalformedGeometry { message: String },
	#[error("Invalid timestamp '{value}'.")]
	InvalidTimestamp { value: String },
}
