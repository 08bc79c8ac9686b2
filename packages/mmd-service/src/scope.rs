use mmd_config::Config;
use mmd_domain::fields::quote;
use mmd_providers::solr::SelectParams;

pub const STATUS_FIELD: &str = "metadata_status";
pub const COLLECTION_FIELD: &str = "collection";

/// The filter clauses every request carries: the active-status restriction and, when an
/// allow-list is configured, the collection restriction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScopeFilter {
	clauses: Vec<String>,
}
impl ScopeFilter {
	pub fn new(active_status: &str, collections: &[String]) -> Self {
		let mut clauses = vec![format!("{STATUS_FIELD}:{}", quote_if_needed(active_status))];

		if !collections.is_empty() {
			let joined = collections
				.iter()
				.map(|collection| quote_if_needed(collection))
				.collect::<Vec<_>>()
				.join(" OR ");

			clauses.push(format!("{COLLECTION_FIELD}:({joined})"));
		}

		Self { clauses }
	}

	pub fn from_config(cfg: &Config) -> Self {
		Self::new(&cfg.repository.active_status, &cfg.collection_filter())
	}

	pub fn clauses(&self) -> &[String] {
		&self.clauses
	}

	/// Appends the scope clauses. Applying twice adds nothing the second time.
	pub fn apply(&self, params: &mut SelectParams) {
		for clause in &self.clauses {
			params.push_filter(clause.as_str());
		}
	}
}

fn quote_if_needed(value: &str) -> String {
	if value.chars().all(|ch| ch.is_alphanumeric() || ch == '_' || ch == '-') {
		value.to_string()
	} else {
		quote(value)
	}
}
