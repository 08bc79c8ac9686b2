use mmd_domain::record::CatalogRecord;

use crate::{CatalogService, Error, Result, normalize};

impl CatalogService {
	/// Renders a record's stored MMD document in another output schema, e.g. `dif10` or `wmo`.
	pub async fn render_record(&self, record: &CatalogRecord, schema: &str) -> Result<Vec<u8>> {
		let stylesheet = self.cfg.stylesheet(schema).ok_or_else(|| Error::InvalidRequest {
			message: format!("Output schema {schema} is not configured."),
		})?;
		let encoded = record.mmd_xml_file.as_deref().ok_or_else(|| Error::InvalidRequest {
			message: format!("Record {} has no stored MMD document.", record.identifier),
		})?;
		let failed = |message: String| Error::RecordTransformFailed {
			identifier: record.identifier.clone(),
			message,
		};
		let source = normalize::decode_document(encoded).map_err(failed)?;

		self.providers
			.transformer
			.transform(&self.cfg.xslt_processor, stylesheet, &source)
			.await
			.map_err(|err| failed(err.to_string()))
	}
}
