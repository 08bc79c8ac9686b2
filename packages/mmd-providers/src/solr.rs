use std::{collections::BTreeMap, time::Duration};

use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{Error, Result};

pub const MATCH_ALL: &str = "*:*";

const DEFAULT_ROWS: u64 = 10;
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Parameters of one `select` request. Filter clauses keep insertion order and are only ever
/// appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectParams {
	pub q: String,
	fq: Vec<String>,
	pub start: u64,
	pub rows: u64,
	pub sort: Option<String>,
	pub fl: Option<String>,
	pub q_op: Option<String>,
	pub facet: Option<FacetRequest>,
}
impl SelectParams {
	/// Appends a filter clause unless the exact clause is already present. Returns whether it was
	/// added.
	pub fn push_filter(&mut self, clause: impl Into<String>) -> bool {
		let clause = clause.into();

		if self.fq.contains(&clause) {
			return false;
		}

		self.fq.push(clause);

		true
	}

	pub fn filters(&self) -> &[String] {
		&self.fq
	}

	pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
		let mut pairs = vec![("q", self.q.clone())];

		pairs.extend(self.fq.iter().map(|clause| ("fq", clause.clone())));
		pairs.push(("start", self.start.to_string()));
		pairs.push(("rows", self.rows.to_string()));

		if let Some(sort) = self.sort.as_ref() {
			pairs.push(("sort", sort.clone()));
		}
		if let Some(fl) = self.fl.as_ref() {
			pairs.push(("fl", fl.clone()));
		}
		if let Some(q_op) = self.q_op.as_ref() {
			pairs.push(("q.op", q_op.clone()));
		}
		if let Some(facet) = self.facet.as_ref() {
			pairs.push(("facet", "true".to_string()));
			pairs.push(("facet.field", facet.field.clone()));
			pairs.push(("facet.mincount", facet.mincount.to_string()));
			pairs.push(("facet.limit", facet.limit.to_string()));
		}

		pairs.push(("wt", "json".to_string()));

		pairs
	}
}

impl Default for SelectParams {
	fn default() -> Self {
		Self {
			q: MATCH_ALL.to_string(),
			fq: Vec::new(),
			start: 0,
			rows: DEFAULT_ROWS,
			sort: None,
			fl: None,
			q_op: None,
			facet: None,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetRequest {
	pub field: String,
	pub mincount: u32,
	/// Negative means unlimited.
	pub limit: i64,
}
impl FacetRequest {
	pub fn terms(field: impl Into<String>) -> Self {
		Self { field: field.into(), mincount: 1, limit: -1 }
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectResponse {
	pub response: ResultSet,
	#[serde(default)]
	pub facet_counts: Option<FacetCounts>,
}
impl SelectResponse {
	/// `(term, count)` pairs for a faceted field, in the order Solr returned them.
	pub fn facet_terms(&self, field: &str) -> Result<Vec<(String, u64)>> {
		let Some(flat) =
			self.facet_counts.as_ref().and_then(|counts| counts.facet_fields.get(field))
		else {
			return Ok(Vec::new());
		};

		if flat.len() % 2 != 0 {
			return Err(Error::InvalidResponse {
				message: format!("Facet list for {field} has an odd number of entries."),
			});
		}

		flat.chunks(2)
			.map(|pair| {
				let term = match &pair[0] {
					Value::String(term) => term.clone(),
					Value::Number(number) => number.to_string(),
					Value::Bool(flag) => flag.to_string(),
					_ =>
						return Err(Error::InvalidResponse {
							message: format!("Facet term for {field} is not a scalar."),
						}),
				};
				let count = pair[1].as_u64().ok_or_else(|| Error::InvalidResponse {
					message: format!("Facet count for {field} is not a non-negative integer."),
				})?;

				Ok((term, count))
			})
			.collect()
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResultSet {
	#[serde(rename = "numFound")]
	pub num_found: u64,
	#[serde(default)]
	pub docs: Vec<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FacetCounts {
	#[serde(default)]
	pub facet_fields: BTreeMap<String, Vec<Value>>,
}

pub async fn select(cfg: &mmd_config::Solr, params: &SelectParams) -> Result<SelectResponse> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let res = client.get(cfg.select_url()).query(&params.to_query_pairs()).send().await?;
	let status = res.status();
	let body = res.text().await?;

	if !status.is_success() {
		return Err(Error::Status {
			status: status.as_u16(),
			body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
		});
	}

	let parsed = parse_select_response(&body)?;

	tracing::debug!(
		num_found = parsed.response.num_found,
		docs = parsed.response.docs.len(),
		"Solr select completed."
	);

	Ok(parsed)
}

pub fn parse_select_response(body: &str) -> Result<SelectResponse> {
	Ok(serde_json::from_str(body)?)
}

/// The `select` URL that fetches exactly the documents matched by `params`, for linking back to
/// the raw index entry.
pub fn select_request_url(cfg: &mmd_config::Solr, params: &[(&str, String)]) -> Result<String> {
	let request = Client::new().get(cfg.select_url()).query(params).build()?;

	Ok(request.url().to_string())
}
