//! Typed view of an OGC Filter constraint.
//!
//! The catalog layer hands constraints over in dictionary form: element names keep their
//! namespace prefix (`ogc:And`, `gml:Envelope`), repeated elements become arrays, and
//! attributes appear as `@`-prefixed keys. [`Filter::parse`] turns that into [`FilterNode`]s.

use serde_json::{Map, Value};

use crate::{Error, Result};

const MAX_FILTER_DEPTH: usize = 8;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Comparison {
	pub property_name: String,
	pub literal: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilterNode {
	BBox { lower_corner: String, upper_corner: String },
	Like(Comparison),
	EqualTo(Comparison),
	GreaterThanOrEqualTo(Comparison),
	LessThanOrEqualTo(Comparison),
	And(Vec<FilterNode>),
}
impl FilterNode {
	fn as_and(&self) -> Option<&[FilterNode]> {
		match self {
			Self::And(children) => Some(children),
			_ => None,
		}
	}
}

/// The top-level predicates of one constraint.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Filter {
	nodes: Vec<FilterNode>,
}
impl Filter {
	pub fn new(nodes: Vec<FilterNode>) -> Self {
		Self { nodes }
	}

	/// Parses the dictionary form of a constraint. `null` and `{}` yield an empty filter.
	pub fn parse(raw: &Value) -> Result<Self> {
		let map = match raw {
			Value::Null => return Ok(Self::default()),
			Value::Object(map) => map,
			_ => return Err(malformed("$", "constraint must be an object.")),
		};

		if map.is_empty() {
			return Ok(Self::default());
		}

		let (path, body) = match child(map, "Filter") {
			Some((key, body)) => (format!("$.{key}"), body),
			None => ("$".to_string(), raw),
		};
		let body = match body {
			Value::Null => return Ok(Self::default()),
			Value::Object(body) => body,
			_ => return Err(malformed(&path, "filter body must be an object.")),
		};

		Ok(Self { nodes: parse_children(body, &path, 1)? })
	}

	pub fn nodes(&self) -> &[FilterNode] {
		&self.nodes
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// The And-chain: level 0 holds the top-level nodes, each further level holds the children
	/// of every `And` on the level above it, in document order.
	pub fn levels(&self) -> Vec<Vec<&FilterNode>> {
		let mut levels = Vec::new();
		let mut current: Vec<&FilterNode> = self.nodes.iter().collect();

		while !current.is_empty() {
			let next = current.iter().filter_map(|node| node.as_and()).flatten().collect();

			levels.push(current);

			current = next;
		}

		levels
	}

	/// Every predicate on the And-chain, deepest level first. All of them hold at once.
	pub fn predicates_deepest_first(&self) -> impl Iterator<Item = &FilterNode> {
		self.levels()
			.into_iter()
			.rev()
			.flatten()
			.filter(|node| !matches!(node, FilterNode::And(_)))
	}
}

pub fn local_name(key: &str) -> &str {
	key.rsplit_once(':').map(|(_, local)| local).unwrap_or(key)
}

fn child<'a>(map: &'a Map<String, Value>, local: &str) -> Option<(&'a String, &'a Value)> {
	map.iter().find(|(key, _)| local_name(key) == local)
}

fn malformed(path: &str, message: &str) -> Error {
	Error::MalformedFilter { path: path.to_string(), message: message.to_string() }
}

fn parse_children(map: &Map<String, Value>, path: &str, depth: usize) -> Result<Vec<FilterNode>> {
	if depth > MAX_FILTER_DEPTH {
		return Err(malformed(
			path,
			&format!("filter exceeds depth limit ({depth}/{MAX_FILTER_DEPTH})."),
		));
	}

	let mut nodes = Vec::new();

	for (key, value) in map {
		if key.starts_with('@') || key.starts_with('#') {
			continue;
		}

		let node_path = format!("{path}.{key}");

		match value {
			Value::Array(items) =>
				for (index, item) in items.iter().enumerate() {
					nodes.push(parse_node(key, item, &format!("{node_path}[{index}]"), depth)?);
				},
			_ => nodes.push(parse_node(key, value, &node_path, depth)?),
		}
	}

	Ok(nodes)
}

fn parse_node(key: &str, value: &Value, path: &str, depth: usize) -> Result<FilterNode> {
	let name = local_name(key);

	match name {
		"And" => {
			let map = value
				.as_object()
				.ok_or_else(|| malformed(path, "And must contain predicate elements."))?;

			Ok(FilterNode::And(parse_children(map, path, depth + 1)?))
		},
		"BBOX" => parse_bbox(value, path),
		"PropertyIsLike" => parse_comparison(value, path).map(FilterNode::Like),
		"PropertyIsEqualTo" => parse_comparison(value, path).map(FilterNode::EqualTo),
		"PropertyIsGreaterThanOrEqualTo" =>
			parse_comparison(value, path).map(FilterNode::GreaterThanOrEqualTo),
		"PropertyIsLessThanOrEqualTo" =>
			parse_comparison(value, path).map(FilterNode::LessThanOrEqualTo),
		_ => Err(malformed(path, &format!("unsupported filter operator {key}."))),
	}
}

fn parse_bbox(value: &Value, path: &str) -> Result<FilterNode> {
	let map = value.as_object().ok_or_else(|| malformed(path, "BBOX must be an object."))?;
	let (key, envelope) =
		child(map, "Envelope").ok_or_else(|| malformed(path, "BBOX requires an Envelope."))?;
	let envelope_path = format!("{path}.{key}");
	let envelope = envelope
		.as_object()
		.ok_or_else(|| malformed(&envelope_path, "Envelope must be an object."))?;
	let lower_corner = corner_text(envelope, "lowerCorner", &envelope_path)?;
	let upper_corner = corner_text(envelope, "upperCorner", &envelope_path)?;

	Ok(FilterNode::BBox { lower_corner, upper_corner })
}

fn corner_text(envelope: &Map<String, Value>, local: &str, path: &str) -> Result<String> {
	let (key, value) = child(envelope, local)
		.ok_or_else(|| malformed(path, &format!("Envelope requires {local}.")))?;

	scalar_text(value).ok_or_else(|| malformed(&format!("{path}.{key}"), "corner must be text."))
}

fn parse_comparison(value: &Value, path: &str) -> Result<Comparison> {
	let map = value.as_object().ok_or_else(|| malformed(path, "comparison must be an object."))?;
	let text_of = |local: &str| -> Result<String> {
		let (key, value) = child(map, local)
			.ok_or_else(|| malformed(path, &format!("comparison requires {local}.")))?;

		scalar_text(value)
			.ok_or_else(|| malformed(&format!("{path}.{key}"), &format!("{local} must be text.")))
	};
	let property_name = text_of("PropertyName")?;
	let literal = text_of("Literal")?;

	Ok(Comparison { property_name, literal })
}

/// Element text. An element that also carries attributes keeps its text under `#text`.
fn scalar_text(value: &Value) -> Option<String> {
	match value {
		Value::String(text) => Some(text.clone()),
		Value::Number(number) => Some(number.to_string()),
		Value::Bool(flag) => Some(flag.to_string()),
		Value::Object(map) => map.get("#text").and_then(scalar_text),
		Value::Null | Value::Array(_) => None,
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use crate::{
		Error,
		filter::{Comparison, Filter, FilterNode, MAX_FILTER_DEPTH},
	};

	fn like(literal: &str) -> FilterNode {
		FilterNode::Like(Comparison {
			property_name: "csw:AnyText".to_string(),
			literal: literal.to_string(),
		})
	}

	#[test]
	fn empty_constraints_parse_to_empty_filter() {
		assert!(Filter::parse(&json!(null)).expect("null").is_empty());
		assert!(Filter::parse(&json!({})).expect("empty object").is_empty());
		assert!(Filter::parse(&json!({ "ogc:Filter": null })).expect("null body").is_empty());
	}

	#[test]
	fn parses_flat_like() {
		let filter = Filter::parse(&json!({
			"ogc:Filter": {
				"@xmlns:ogc": "http://www.opengis.net/ogc",
				"ogc:PropertyIsLike": {
					"@wildCard": "%",
					"ogc:PropertyName": "csw:AnyText",
					"ogc:Literal": "%ice%",
				},
			},
		}))
		.expect("valid filter");

		assert_eq!(filter.nodes(), &[like("%ice%")]);
		assert_eq!(filter.levels().len(), 1);
	}

	#[test]
	fn parses_double_and_chain() {
		let filter = Filter::parse(&json!({
			"ogc:Filter": {
				"ogc:And": {
					"ogc:And": {
						"ogc:PropertyIsLike": {
							"ogc:PropertyName": "csw:AnyText",
							"ogc:Literal": "%ocean%",
						},
					},
					"ogc:PropertyIsGreaterThanOrEqualTo": {
						"ogc:PropertyName": "apiso:TempExtent_begin",
						"ogc:Literal": "2020-01-01T00:00:00Z",
					},
				},
			},
		}))
		.expect("valid filter");
		let levels = filter.levels();

		assert_eq!(levels.len(), 3);
		assert_eq!(levels[2], vec![&like("%ocean%")]);
		assert!(matches!(levels[1][1], FilterNode::GreaterThanOrEqualTo(_)));
	}

	#[test]
	fn repeated_elements_become_separate_nodes() {
		let filter = Filter::parse(&json!({
			"ogc:Filter": {
				"ogc:And": {
					"ogc:PropertyIsLike": [
						{ "ogc:PropertyName": "dc:title", "ogc:Literal": "a%" },
						{ "ogc:PropertyName": "dc:title", "ogc:Literal": "b%" },
					],
				},
			},
		}))
		.expect("valid filter");

		assert_eq!(filter.levels()[1].len(), 2);
	}

	#[test]
	fn literal_text_under_hash_key() {
		let filter = Filter::parse(&json!({
			"ogc:Filter": {
				"ogc:PropertyIsEqualTo": {
					"ogc:PropertyName": "dc:format",
					"ogc:Literal": { "@matchCase": "false", "#text": "NetCDF" },
				},
			},
		}))
		.expect("valid filter");

		assert_eq!(
			filter.nodes(),
			&[FilterNode::EqualTo(Comparison {
				property_name: "dc:format".to_string(),
				literal: "NetCDF".to_string(),
			})]
		);
	}

	#[test]
	fn unknown_operators_are_rejected_with_their_path() {
		let cases = [
			(json!({ "ogc:Or": { "ogc:PropertyIsNull": {} } }), "$.ogc:Filter.ogc:Or", "Or"),
			(
				json!({ "ogc:And": { "ogc:PropertyIsNotEqualTo": {} } }),
				"$.ogc:Filter.ogc:And.ogc:PropertyIsNotEqualTo",
				"PropertyIsNotEqualTo",
			),
			(
				json!({ "ogc:PropertyIsGreaterThan": {} }),
				"$.ogc:Filter.ogc:PropertyIsGreaterThan",
				"PropertyIsGreaterThan",
			),
		];

		for (body, expected_path, operator) in cases {
			let err = Filter::parse(&json!({ "ogc:Filter": body })).expect_err("unsupported");

			match err {
				Error::MalformedFilter { path, message } => {
					assert_eq!(path, expected_path);
					assert!(message.contains(operator), "{message}");
				},
				other => panic!("unexpected error {other:?}"),
			}
		}
	}

	#[test]
	fn sibling_ands_all_contribute_to_the_next_level() {
		let filter = Filter::parse(&json!({
			"ogc:Filter": {
				"ogc:And": [
					{ "ogc:PropertyIsLike": { "ogc:PropertyName": "dc:title", "ogc:Literal": "a%" } },
					{ "ogc:PropertyIsLike": { "ogc:PropertyName": "dc:title", "ogc:Literal": "b%" } },
				],
			},
		}))
		.expect("valid filter");
		let predicates: Vec<_> = filter.predicates_deepest_first().collect();

		assert_eq!(filter.levels().len(), 2);
		assert_eq!(predicates.len(), 2);
	}

	#[test]
	fn non_object_constraint_is_malformed() {
		let err = Filter::parse(&json!(["ogc:Filter"])).expect_err("array constraint");

		assert!(matches!(err, Error::MalformedFilter { .. }));
	}

	#[test]
	fn missing_literal_reports_path() {
		let err = Filter::parse(&json!({
			"ogc:Filter": { "ogc:And": { "ogc:PropertyIsLike": { "ogc:PropertyName": "x" } } },
		}))
		.expect_err("missing literal");

		match err {
			Error::MalformedFilter { path, message } => {
				assert_eq!(path, "$.ogc:Filter.ogc:And.ogc:PropertyIsLike");
				assert!(message.contains("Literal"));
			},
			other => panic!("unexpected error {other:?}"),
		}
	}

	#[test]
	fn bbox_without_envelope_is_malformed() {
		let err = Filter::parse(&json!({ "ogc:Filter": { "ogc:BBOX": { "ogc:PropertyName": "x" } } }))
			.expect_err("missing envelope");

		assert!(err.to_string().contains("Envelope"));
	}

	#[test]
	fn depth_limit_is_enforced() {
		let mut body = json!({ "ogc:PropertyIsLike": { "ogc:PropertyName": "x", "ogc:Literal": "y" } });

		for _ in 0..MAX_FILTER_DEPTH {
			body = json!({ "ogc:And": body });
		}

		let err = Filter::parse(&json!({ "ogc:Filter": body })).expect_err("too deep");

		assert!(err.to_string().contains("depth limit"));
	}
}
