//! Turns the text and temporal predicates of a filter into Solr query clauses.

use mmd_domain::{
	fields::resolve_field,
	filter::{Comparison, Filter, FilterNode},
	time_fmt,
};
use mmd_providers::solr::SelectParams;

use crate::{Error, Result};

pub const START_DATE_FIELD: &str = "temporal_extent_start_date";
pub const END_DATE_FIELD: &str = "temporal_extent_end_date";

/// Sets the main query from the text predicates and appends the temporal bounds as filter
/// clauses. Predicates the filter does not carry leave `params` untouched.
pub fn apply_predicates(filter: &Filter, params: &mut SelectParams) -> Result<()> {
	if let Some(q) = text_query(filter) {
		params.q = q;
	}

	for clause in temporal_clauses(filter)? {
		params.push_filter(clause);
	}

	Ok(())
}

/// The main query: every `PropertyIsLike` on the And-chain, then every `PropertyIsEqualTo`,
/// deepest level first and AND'd together.
pub fn text_query(filter: &Filter) -> Option<String> {
	let likes = filter.predicates_deepest_first().filter_map(|node| match node {
		FilterNode::Like(like) => {
			let target = resolve_field(&like.property_name);

			Some((target, target.clause(&like.literal.replace('%', "*"))))
		},
		_ => None,
	});
	let equals = filter.predicates_deepest_first().filter_map(|node| match node {
		FilterNode::EqualTo(equal) => {
			let target = resolve_field(&equal.property_name);

			Some((target, target.phrase_clause(&equal.literal)))
		},
		_ => None,
	});
	let mut clauses = likes.chain(equals).collect::<Vec<_>>();

	match clauses.len() {
		0 => None,
		1 => clauses.pop().map(|(_, clause)| clause),
		_ => Some(
			clauses
				.into_iter()
				.map(|(target, clause)| match target.single() {
					Some(_) => clause,
					None => format!("({clause})"),
				})
				.collect::<Vec<_>>()
				.join(" AND "),
		),
	}
}

/// Range clauses for every lower and upper temporal bound, start bounds first.
pub fn temporal_clauses(filter: &Filter) -> Result<Vec<String>> {
	let mut clauses = Vec::new();

	for node in filter.predicates_deepest_first() {
		if let FilterNode::GreaterThanOrEqualTo(start) = node {
			clauses.push(format!("{START_DATE_FIELD}:[{} TO *]", bound(start)?));
		}
	}
	for node in filter.predicates_deepest_first() {
		if let FilterNode::LessThanOrEqualTo(end) = node {
			clauses.push(format!("{END_DATE_FIELD}:[* TO {}]", bound(end)?));
		}
	}

	Ok(clauses)
}

/// `{!field f=<field>}Intersects(<envelope>)`.
pub fn spatial_clause(spatial_field: &str, envelope: &str) -> String {
	format!("{{!field f={spatial_field}}}Intersects({envelope})")
}

fn bound(comparison: &Comparison) -> Result<String> {
	time_fmt::normalize_timestamp(&comparison.literal).map_err(|_| Error::MalformedFilter {
		path: comparison.property_name.clone(),
		message: format!("'{}' is not a date or date-time.", comparison.literal),
	})
}
