use serde::{Deserialize, Serialize};

pub const TYPENAME: &str = "gmd:MD_Metadata";
pub const SCHEMA: &str = "http://www.isotc211.org/2005/gmd";
pub const RECORD_TYPE: &str = "dataset";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessLink {
	pub name: String,
	pub description: String,
	pub protocol: String,
	pub url: String,
}

/// One search hit projected onto the catalog's record schema. Optional fields are `None` when the
/// source document does not carry them; they are never filled with empty placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRecord {
	pub identifier: String,
	pub typename: String,
	pub schema: String,
	#[serde(rename = "type")]
	pub record_type: String,
	pub wkt_geometry: String,
	pub title: String,
	#[serde(rename = "abstract")]
	pub abstract_text: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub topic_category: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub keywords: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub source: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub language: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub creator: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub contributor: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub rights: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub publisher: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub format: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub time_begin: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub time_end: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub insert_date: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub date_modified: Option<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub links: Vec<AccessLink>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub mdsource: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub mmd_xml_file: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub xml: Option<String>,
}
impl CatalogRecord {
	/// A record with the required fields set and every optional field absent.
	pub fn new(
		identifier: String,
		wkt_geometry: String,
		title: String,
		abstract_text: String,
	) -> Self {
		Self {
			identifier,
			typename: TYPENAME.to_string(),
			schema: SCHEMA.to_string(),
			record_type: RECORD_TYPE.to_string(),
			wkt_geometry,
			title,
			abstract_text,
			topic_category: None,
			keywords: None,
			source: None,
			language: None,
			creator: None,
			contributor: None,
			rights: None,
			publisher: None,
			format: None,
			time_begin: None,
			time_end: None,
			insert_date: None,
			date_modified: None,
			links: Vec::new(),
			mdsource: None,
			mmd_xml_file: None,
			xml: None,
		}
	}

	/// The access links as a JSON array, or `None` when the record has none.
	pub fn links_payload(&self) -> Option<String> {
		if self.links.is_empty() {
			return None;
		}

		serde_json::to_string(&self.links).ok()
	}

	/// Names of the optional fields that carry a value.
	pub fn present_optional_fields(&self) -> Vec<&'static str> {
		[
			("topic_category", self.topic_category.is_some()),
			("keywords", self.keywords.is_some()),
			("source", self.source.is_some()),
			("language", self.language.is_some()),
			("creator", self.creator.is_some()),
			("contributor", self.contributor.is_some()),
			("rights", self.rights.is_some()),
			("publisher", self.publisher.is_some()),
			("format", self.format.is_some()),
			("time_begin", self.time_begin.is_some()),
			("time_end", self.time_end.is_some()),
			("insert_date", self.insert_date.is_some()),
			("date_modified", self.date_modified.is_some()),
			("links", !self.links.is_empty()),
			("mdsource", self.mdsource.is_some()),
			("mmd_xml_file", self.mmd_xml_file.is_some()),
			("xml", self.xml.is_some()),
		]
		.into_iter()
		.filter_map(|(name, present)| present.then_some(name))
		.collect()
	}
}
