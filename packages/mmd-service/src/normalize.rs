//! Projects raw Solr documents onto [`CatalogRecord`]s.

use base64::{Engine, engine::general_purpose::STANDARD};
use serde_json::{Map, Value};

use mmd_config::Config;
use mmd_domain::{
	fields::quote,
	record::{AccessLink, CatalogRecord},
	time_fmt,
};
use mmd_providers::solr::{self, MATCH_ALL};

use crate::{Error, Result, XmlTransformer};

pub const IDENTIFIER_FIELD: &str = "metadata_identifier";

/// Presence-gated access URLs, in the order their links are emitted.
const LINK_SOURCES: [LinkSource; 4] = [
	LinkSource {
		field: "data_access_url_opendap",
		name: "OPeNDAP",
		description: "OPeNDAP access",
		protocol: "OPeNDAP:OPeNDAP",
	},
	LinkSource {
		field: "data_access_url_ogc_wms",
		name: "OGC WMS",
		description: "OGC Web Mapping Service",
		protocol: "OGC:WMS",
	},
	LinkSource {
		field: "data_access_url_http",
		name: "HTTP",
		description: "Direct download",
		protocol: "WWW:DOWNLOAD-1.0-http--download",
	},
	LinkSource {
		field: "data_access_url_ftp",
		name: "FTP",
		description: "Direct download",
		protocol: "WWW:DOWNLOAD-1.0-ftp--download",
	},
];

struct LinkSource {
	field: &'static str,
	name: &'static str,
	description: &'static str,
	protocol: &'static str,
}

pub struct RecordNormalizer<'a> {
	cfg: &'a Config,
	transformer: &'a dyn XmlTransformer,
}
impl<'a> RecordNormalizer<'a> {
	pub fn new(cfg: &'a Config, transformer: &'a dyn XmlTransformer) -> Self {
		Self { cfg, transformer }
	}

	/// Normalizes every document in response order. Transform failures drop the affected record
	/// when `repository.skip_failed_records` is set and abort the batch otherwise.
	pub async fn normalize_all(&self, docs: &[Map<String, Value>]) -> Result<Vec<CatalogRecord>> {
		let mut records = Vec::with_capacity(docs.len());

		for doc in docs {
			match self.normalize(doc).await {
				Ok(record) => records.push(record),
				Err(Error::RecordTransformFailed { identifier, message })
					if self.cfg.repository.skip_failed_records =>
				{
					tracing::warn!(
						identifier = %identifier,
						error = %message,
						"Skipping record whose transform failed."
					);
				},
				Err(err) => return Err(err),
			}
		}

		Ok(records)
	}

	pub async fn normalize(&self, doc: &Map<String, Value>) -> Result<CatalogRecord> {
		let mut record = project(&self.cfg.solr, doc)?;

		if let Some(encoded) = record.mmd_xml_file.as_deref() {
			let xml = self.transform(&record.identifier, encoded).await?;

			record.xml = Some(xml);
		}

		Ok(record)
	}

	async fn transform(&self, identifier: &str, encoded: &str) -> Result<String> {
		let failed = |message: String| Error::RecordTransformFailed {
			identifier: identifier.to_string(),
			message,
		};
		let schema = self.cfg.repository.record_stylesheet.as_str();
		let stylesheet = self
			.cfg
			.stylesheet(schema)
			.ok_or_else(|| failed(format!("No stylesheet is configured for {schema}.")))?;
		let source = decode_document(encoded).map_err(failed)?;
		let output = self
			.transformer
			.transform(&self.cfg.xslt_processor, stylesheet, &source)
			.await
			.map_err(|err| failed(err.to_string()))?;

		String::from_utf8(output).map_err(|_| failed("Transform output is not UTF-8.".to_string()))
	}
}

/// Everything except the transformed XML, which needs the external processor.
pub fn project(solr_cfg: &mmd_config::Solr, doc: &Map<String, Value>) -> Result<CatalogRecord> {
	let identifier = first_text(doc.get(IDENTIFIER_FIELD)).ok_or_else(|| {
		Error::MalformedRecord { identifier: "<unknown>".to_string(), field: IDENTIFIER_FIELD }
	})?;
	let required = |field: &'static str| {
		first_text(doc.get(field))
			.ok_or_else(|| Error::MalformedRecord { identifier: identifier.clone(), field })
	};
	let wkt_geometry = required("bbox")?;
	let title = required("title")?;
	let abstract_text = required("abstract")?;
	let mut record = CatalogRecord::new(identifier.clone(), wkt_geometry, title, abstract_text);

	record.topic_category = joined(doc.get("iso_topic_category"));
	record.keywords = joined(doc.get("keywords_keyword"));
	record.source = first_text(doc.get("related_url_landing_page"));
	record.language = first_text(doc.get("dataset_language"));
	record.creator = joined(doc.get("personnel_investigator_name"));
	record.contributor = join_present([
		joined(doc.get("personnel_technical_name")),
		joined(doc.get("personnel_metadata_author_name")),
	]);
	record.rights = first_text(doc.get("use_constraint_license_text"))
		.or_else(|| first_text(doc.get("use_constraint_identifier")));
	record.publisher = first_text(doc.get("data_center_long_name"));
	record.format = joined(doc.get("storage_information_file_format"));
	record.time_begin = timestamp(doc.get("temporal_extent_start_date"));
	record.time_end = timestamp(doc.get("temporal_extent_end_date"));
	record.insert_date = timestamp(doc.get("timestamp"));
	record.date_modified = timestamp(doc.get("last_metadata_update_datetime"));
	record.links = LINK_SOURCES
		.iter()
		.filter_map(|source| {
			first_text(doc.get(source.field)).map(|url| AccessLink {
				name: source.name.to_string(),
				description: source.description.to_string(),
				protocol: source.protocol.to_string(),
				url,
			})
		})
		.collect();
	record.mdsource = Some(solr::select_request_url(
		solr_cfg,
		&[
			("fq", format!("{IDENTIFIER_FIELD}:{}", quote(&identifier))),
			("q.op", "OR".to_string()),
			("q", MATCH_ALL.to_string()),
		],
	)?);
	record.mmd_xml_file = first_text(doc.get("mmd_xml_file"));

	Ok(record)
}

/// Base64 MMD text as stored in the index. Embedded line breaks are tolerated.
pub fn decode_document(encoded: &str) -> std::result::Result<Vec<u8>, String> {
	let compact: String = encoded.chars().filter(|ch| !ch.is_ascii_whitespace()).collect();

	STANDARD.decode(compact).map_err(|err| format!("Stored document is not valid base64: {err}."))
}

fn scalar_text(value: &Value) -> Option<String> {
	match value {
		Value::String(text) => Some(text.clone()),
		Value::Number(number) => Some(number.to_string()),
		Value::Bool(flag) => Some(flag.to_string()),
		_ => None,
	}
}

fn first_text(value: Option<&Value>) -> Option<String> {
	match value? {
		Value::Array(items) => items.iter().find_map(scalar_text),
		other => scalar_text(other),
	}
}

fn joined(value: Option<&Value>) -> Option<String> {
	match value? {
		Value::Array(items) => {
			let parts: Vec<String> = items.iter().filter_map(scalar_text).collect();

			if parts.is_empty() { None } else { Some(parts.join(",")) }
		},
		other => scalar_text(other),
	}
}

fn join_present<const N: usize>(parts: [Option<String>; N]) -> Option<String> {
	let parts: Vec<String> = parts.into_iter().flatten().collect();

	if parts.is_empty() { None } else { Some(parts.join(",")) }
}

fn timestamp(value: Option<&Value>) -> Option<String> {
	let raw = first_text(value)?;

	Some(time_fmt::normalize_timestamp(&raw).unwrap_or(raw))
}

#[cfg(test)]
mod tests {
	use serde_json::{Map, Value, json};

	use crate::normalize::{decode_document, project};

	fn solr_config() -> mmd_config::Solr {
		mmd_config::Solr {
			url: "http://localhost:8983/solr/mmd".to_string(),
			timeout_ms: 1_000,
			spatial_field: "bbox".to_string(),
		}
	}

	fn doc(value: Value) -> Map<String, Value> {
		match value {
			Value::Object(map) => map,
			_ => panic!("Expected a JSON object."),
		}
	}

	#[test]
	fn contributor_lists_technical_contacts_first() {
		let record = project(
			&solr_config(),
			&doc(json!({
				"metadata_identifier": "id-1",
				"bbox": "POLYGON((0 0,1 0,1 1,0 1,0 0))",
				"title": ["T"],
				"abstract": ["A"],
				"personnel_metadata_author_name": ["Author"],
				"personnel_technical_name": ["Tech One", "Tech Two"],
			})),
		)
		.expect("project");

		assert_eq!(record.contributor.as_deref(), Some("Tech One,Tech Two,Author"));
	}

	#[test]
	fn rights_prefer_license_text() {
		let base = json!({
			"metadata_identifier": "id-1",
			"bbox": "POLYGON((0 0,1 0,1 1,0 1,0 0))",
			"title": "T",
			"abstract": "A",
			"use_constraint_identifier": "CC-BY-4.0",
		});
		let only_identifier = project(&solr_config(), &doc(base.clone())).expect("project");
		let mut with_license = doc(base);

		with_license.insert(
			"use_constraint_license_text".to_string(),
			json!("Creative Commons Attribution 4.0"),
		);

		let with_license = project(&solr_config(), &with_license).expect("project");

		assert_eq!(only_identifier.rights.as_deref(), Some("CC-BY-4.0"));
		assert_eq!(with_license.rights.as_deref(), Some("Creative Commons Attribution 4.0"));
	}

	#[test]
	fn timestamps_are_normalized_or_kept() {
		let record = project(
			&solr_config(),
			&doc(json!({
				"metadata_identifier": "id-1",
				"bbox": "POLYGON((0 0,1 0,1 1,0 1,0 0))",
				"title": ["T"],
				"abstract": ["A"],
				"timestamp": "2023-04-05T06:07:08.910Z",
				"temporal_extent_start_date": ["2020-01-01T00:00:00Z"],
				"temporal_extent_end_date": "ongoing",
			})),
		)
		.expect("project");

		assert_eq!(record.insert_date.as_deref(), Some("2023-04-05T06:07:08Z"));
		assert_eq!(record.time_begin.as_deref(), Some("2020-01-01T00:00:00Z"));
		assert_eq!(record.time_end.as_deref(), Some("ongoing"));
	}

	#[test]
	fn mdsource_points_at_the_index_entry() {
		let record = project(
			&solr_config(),
			&doc(json!({
				"metadata_identifier": "no.met:abc",
				"bbox": "POLYGON((0 0,1 0,1 1,0 1,0 0))",
				"title": ["T"],
				"abstract": ["A"],
			})),
		)
		.expect("project");
		let mdsource = record.mdsource.expect("mdsource");

		assert!(mdsource.starts_with("http://localhost:8983/solr/mmd/select?fq=metadata_identifier"));
		assert!(mdsource.contains("no.met%3Aabc"));
		assert!(mdsource.contains("q.op=OR"));
	}

	#[test]
	fn decoding_tolerates_line_breaks() {
		assert_eq!(decode_document("PG1tZC8+\nCg==").expect("decode"), b"<mmd/>\n");
		assert!(decode_document("not base64!").is_err());
	}
}
