use std::{
	collections::BTreeMap,
	path::{Path, PathBuf},
};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub solr: Solr,
	pub repository: Repository,
	/// Stylesheet paths keyed by output schema, e.g. "iso", "dif10", "wmo".
	pub xslt: BTreeMap<String, PathBuf>,
	#[serde(default)]
	pub xslt_processor: XsltProcessor,
	/// The parsed file as-is, kept for section/key lookups of values outside the typed model.
	#[serde(skip)]
	pub raw: toml::Table,
}
impl Config {
	/// Looks up `[section] key` in the raw file. Non-string scalars are rendered as text.
	pub fn value(&self, section: &str, key: &str) -> Option<String> {
		let value = self.raw.get(section)?.as_table()?.get(key)?;

		match value {
			toml::Value::String(text) => Some(text.clone()),
			toml::Value::Integer(_)
			| toml::Value::Float(_)
			| toml::Value::Boolean(_)
			| toml::Value::Datetime(_) => Some(value.to_string()),
			toml::Value::Array(_) | toml::Value::Table(_) => None,
		}
	}

	/// The collection allow-list, split on commas and whitespace.
	pub fn collection_filter(&self) -> Vec<String> {
		self.repository
			.collection_filter
			.split(|ch: char| ch == ',' || ch.is_whitespace())
			.filter(|item| !item.is_empty())
			.map(str::to_string)
			.collect()
	}

	pub fn stylesheet(&self, schema: &str) -> Option<&Path> {
		self.xslt.get(schema).map(PathBuf::as_path)
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Solr {
	pub url: String,
	pub timeout_ms: u64,
	#[serde(default = "default_spatial_field")]
	pub spatial_field: String,
}
impl Solr {
	pub fn select_url(&self) -> String {
		format!("{}/select", self.url.trim_end_matches('/'))
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
	#[serde(default)]
	pub collection_filter: String,
	#[serde(default = "default_active_status")]
	pub active_status: String,
	pub record_stylesheet: String,
	#[serde(default = "default_skip_failed_records")]
	pub skip_failed_records: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct XsltProcessor {
	#[serde(default = "default_xslt_program")]
	pub program: PathBuf,
}
impl Default for XsltProcessor {
	fn default() -> Self {
		Self { program: default_xslt_program() }
	}
}

fn default_spatial_field() -> String {
	"bbox".to_string()
}

fn default_active_status() -> String {
	"Active".to_string()
}

fn default_skip_failed_records() -> bool {
	true
}

fn default_xslt_program() -> PathBuf {
	PathBuf::from("xsltproc")
}
