use serde::{Deserialize, Serialize};
use serde_json::Value;

use mmd_domain::{
	envelope,
	fields::{quote, resolve_field},
	filter::Filter,
	record::CatalogRecord,
	time_fmt,
};
use mmd_providers::solr::{FacetRequest, SelectParams};

use crate::{CatalogService, Error, Result, translate};

pub const TIMESTAMP_FIELD: &str = "timestamp";

const DEFAULT_MAX_RECORDS: u64 = 10;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QueryRequest {
	/// Dictionary form of the OGC Filter; `null` or `{}` lists everything in scope.
	#[serde(default)]
	pub constraint: Value,
	#[serde(default)]
	pub sort_by: Option<SortBy>,
	#[serde(default)]
	pub type_names: Vec<String>,
	#[serde(default = "default_max_records")]
	pub max_records: u64,
	#[serde(default)]
	pub start_position: u64,
	/// Render the bounding box as a closed polygon ring instead of a Solr `ENVELOPE`.
	#[serde(default)]
	pub right_hand_envelope: bool,
}
impl Default for QueryRequest {
	fn default() -> Self {
		Self {
			constraint: Value::Null,
			sort_by: None,
			type_names: Vec::new(),
			max_records: DEFAULT_MAX_RECORDS,
			start_position: 0,
			right_hand_envelope: false,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortBy {
	pub property_name: String,
	pub order: SortOrder,
}
impl SortBy {
	/// `<field> asc|desc`, or `None` when the property does not map onto exactly one sortable
	/// index field.
	pub fn to_solr(&self) -> Option<String> {
		let target = resolve_field(&self.property_name);

		if target.is_full_text() {
			return None;
		}

		target.single().map(|field| format!("{field} {}", self.order.as_str()))
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
	Asc,
	Desc,
}
impl SortOrder {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Asc => "asc",
			Self::Desc => "desc",
		}
	}
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QueryResponse {
	pub total: u64,
	pub records: Vec<CatalogRecord>,
}
impl QueryResponse {
	/// The hit count as the catalog layer reports it.
	pub fn total_hits(&self) -> String {
		self.total.to_string()
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertDirection {
	/// Latest insert.
	Max,
	/// Earliest insert.
	Min,
}
impl InsertDirection {
	fn sort_order(self) -> SortOrder {
		match self {
			Self::Max => SortOrder::Desc,
			Self::Min => SortOrder::Asc,
		}
	}
}

impl CatalogService {
	/// Fetches the records with the given identifiers, in the order the index returns them.
	pub async fn query_ids(&self, ids: &[String]) -> Result<Vec<CatalogRecord>> {
		if ids.is_empty() {
			return Err(Error::InvalidRequest {
				message: "At least one identifier is required.".to_string(),
			});
		}

		let quoted = ids.iter().map(|id| quote(id)).collect::<Vec<_>>().join(" OR ");
		let mut params = SelectParams::default();

		params.rows = ids.len() as u64;
		params.q_op = Some("OR".to_string());
		params.push_filter(format!("{}:({quoted})", crate::normalize::IDENTIFIER_FIELD));
		self.scope.apply(&mut params);

		let response = self.select(&params).await?;

		self.normalizer().normalize_all(&response.response.docs).await
	}

	/// Distinct values of `domain` with their hit counts.
	pub async fn query_domain(
		&self,
		domain: &str,
		type_names: &[String],
	) -> Result<Vec<(String, u64)>> {
		let domain = domain.trim();

		if domain.is_empty() {
			return Err(Error::InvalidRequest { message: "domain must be non-empty.".to_string() });
		}

		tracing::debug!(domain, type_names = ?type_names, "Querying property domain.");

		let mut params = SelectParams::default();

		params.rows = 0;
		params.facet = Some(FacetRequest::terms(domain));
		self.scope.apply(&mut params);

		let response = self.select(&params).await?;

		Ok(response.facet_terms(domain)?)
	}

	/// The newest (`Max`) or oldest (`Min`) insert timestamp in scope, as
	/// `YYYY-MM-DDTHH:MM:SSZ`.
	pub async fn query_insert(&self, direction: InsertDirection) -> Result<Option<String>> {
		let mut params = SelectParams::default();

		params.rows = 1;
		params.fl = Some(TIMESTAMP_FIELD.to_string());
		params.sort = Some(format!("{TIMESTAMP_FIELD} {}", direction.sort_order().as_str()));
		self.scope.apply(&mut params);

		let response = self.select(&params).await?;
		let Some(doc) = response.response.docs.first() else {
			return Ok(None);
		};
		let raw = match doc.get(TIMESTAMP_FIELD) {
			Some(Value::String(raw)) => raw,
			Some(Value::Array(items)) => match items.first() {
				Some(Value::String(raw)) => raw,
				_ =>
					return Err(Error::InvalidResponse {
						message: "Top document has no timestamp.".to_string(),
					}),
			},
			_ =>
				return Err(Error::InvalidResponse {
					message: "Top document has no timestamp.".to_string(),
				}),
		};
		let formatted = time_fmt::normalize_timestamp(raw)
			.map_err(|err| Error::InvalidResponse { message: err.to_string() })?;

		Ok(Some(formatted))
	}

	pub async fn query(&self, req: QueryRequest) -> Result<QueryResponse> {
		let filter = Filter::parse(&req.constraint)?;
		let mut params = SelectParams::default();

		params.start = req.start_position;
		params.rows = req.max_records;

		if !filter.is_empty() {
			for envelope in envelope::extract_envelopes(&filter, req.right_hand_envelope)? {
				let clause = translate::spatial_clause(&self.cfg.solr.spatial_field, &envelope);

				params.push_filter(clause);
			}

			translate::apply_predicates(&filter, &mut params)?;
		}

		self.scope.apply(&mut params);

		params.sort = req.sort_by.as_ref().and_then(SortBy::to_solr);

		let response = self.select(&params).await?;
		let records = self.normalizer().normalize_all(&response.response.docs).await?;

		Ok(QueryResponse { total: response.response.num_found, records })
	}

	/// Lookup by source is not offered by this repository.
	pub async fn query_source(&self, source: &str) -> Result<Vec<CatalogRecord>> {
		tracing::debug!(source, "Rejecting query by source.");

		Err(Error::UnsupportedOperation { operation: "query_source" })
	}
}

fn default_max_records() -> u64 {
	DEFAULT_MAX_RECORDS
}
