//! Bounding-box rendering for spatial constraints.
//!
//! Corner pairs arrive as `"c0 c1"` text. The Solr form treats `c0` as Y and `c1` as X, while the
//! right-hand polygon keeps the pair order untouched. The two forms are intentionally not
//! reconciled; callers pick one.

use crate::{
	Error, Result,
	filter::{Filter, FilterNode},
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Envelope {
	pub lower: (f64, f64),
	pub upper: (f64, f64),
}
impl Envelope {
	pub fn parse(lower_corner: &str, upper_corner: &str) -> Result<Self> {
		Ok(Self {
			lower: parse_corner("lowerCorner", lower_corner)?,
			upper: parse_corner("upperCorner", upper_corner)?,
		})
	}

	/// `(min_x, max_x, max_y, min_y)` in the order Solr's `ENVELOPE` expects.
	pub fn bounds(&self) -> [f64; 4] {
		[self.lower.1, self.upper.1, self.upper.0, self.lower.0]
	}

	pub fn to_solr_envelope(&self) -> String {
		let [min_x, max_x, max_y, min_y] = self.bounds();

		format!("ENVELOPE({min_x},{max_x},{max_y},{min_y})")
	}

	/// Closed ring, counter-clockwise from the lower corner, first point repeated last.
	pub fn ring(&self) -> [(f64, f64); 5] {
		let (l0, l1) = self.lower;
		let (u0, u1) = self.upper;

		[(l0, l1), (u0, l1), (u0, u1), (l0, u1), (l0, l1)]
	}

	pub fn to_polygon_wkt(&self) -> String {
		let points =
			self.ring().iter().map(|(x, y)| format!("{x} {y}")).collect::<Vec<_>>().join(",");

		format!("POLYGON(({points}))")
	}

	pub fn render(&self, right_hand_envelope: bool) -> String {
		if right_hand_envelope { self.to_polygon_wkt() } else { self.to_solr_envelope() }
	}
}

/// Corner text of every `BBOX` on the And-chain, deepest level first.
pub fn find_bboxes(filter: &Filter) -> Vec<(&str, &str)> {
	filter
		.predicates_deepest_first()
		.filter_map(|node| match node {
			FilterNode::BBox { lower_corner, upper_corner } =>
				Some((lower_corner.as_str(), upper_corner.as_str())),
			_ => None,
		})
		.collect()
}

/// Renders the deepest bounding box, or `None` when the constraint has no spatial predicate.
pub fn extract_envelope(filter: &Filter, right_hand_envelope: bool) -> Result<Option<String>> {
	Ok(extract_envelopes(filter, right_hand_envelope)?.into_iter().next())
}

/// Renders every bounding box; each one must hold, so callers intersect them.
pub fn extract_envelopes(filter: &Filter, right_hand_envelope: bool) -> Result<Vec<String>> {
	find_bboxes(filter)
		.into_iter()
		.map(|(lower_corner, upper_corner)| {
			Ok(Envelope::parse(lower_corner, upper_corner)?.render(right_hand_envelope))
		})
		.collect()
}

fn parse_corner(label: &str, raw: &str) -> Result<(f64, f64)> {
	let mut values = Vec::with_capacity(2);

	for part in raw.split_whitespace() {
		let value: f64 = part.parse().map_err(|_| Error::MalformedGeometry {
			message: format!("{label} '{raw}' contains a non-numeric value."),
		})?;

		if !value.is_finite() {
			return Err(Error::MalformedGeometry {
				message: format!("{label} '{raw}' contains a non-finite value."),
			});
		}

		values.push(value);
	}

	match values.as_slice() {
		[first, second, ..] => Ok((*first, *second)),
		_ => Err(Error::MalformedGeometry {
			message: format!("{label} '{raw}' must hold two numbers."),
		}),
	}
}
