//! Maps catalog queryable names onto Solr index fields.

pub const FULL_TEXT_FIELD: &str = "full_text";

const FULL_TEXT: &[&str] = &[FULL_TEXT_FIELD];
/// Lucene query syntax characters. `*` and `?` are absent so wildcard terms keep working.
const QUERY_SYNTAX: &[char] =
	&['+', '-', '&', '|', '!', '(', ')', '{', '}', '[', ']', '^', '"', '~', ':', '\\', '/'];

/// Ordered, first match wins. `dc:source` is matched case-sensitively, everything else is a
/// case-insensitive substring match.
const FIELD_RULES: [(Matcher, &[&str]); 10] = [
	(Matcher::Insensitive("title"), &["title"]),
	(Matcher::Insensitive("abstract"), &["abstract"]),
	(Matcher::Insensitive("subject"), &["keywords_keyword"]),
	(Matcher::Insensitive("creator"), &["personnel_investigator_name"]),
	(
		Matcher::Insensitive("contributor"),
		&["personnel_technical_name", "personnel_metadata_author_name"],
	),
	(Matcher::Sensitive("dc:source"), &["related_url_landing_page"]),
	(Matcher::Insensitive("format"), &["storage_information_file_format"]),
	(Matcher::Insensitive("language"), &["dataset_language"]),
	(Matcher::Insensitive("publisher"), &["data_center_long_name"]),
	(Matcher::Insensitive("rights"), &["use_constraint_identifier", "use_constraint_license_text"]),
];

#[derive(Clone, Copy, Debug)]
enum Matcher {
	Insensitive(&'static str),
	Sensitive(&'static str),
}
impl Matcher {
	fn matches(&self, property_name: &str, lowered: &str) -> bool {
		match self {
			Self::Insensitive(needle) => lowered.contains(needle),
			Self::Sensitive(needle) => property_name.contains(needle),
		}
	}
}

/// One or more index fields a predicate is evaluated against; several fields are OR'd.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FieldTarget {
	fields: &'static [&'static str],
}
impl FieldTarget {
	pub fn fields(&self) -> &'static [&'static str] {
		self.fields
	}

	pub fn is_full_text(&self) -> bool {
		self.fields == FULL_TEXT
	}

	pub fn single(&self) -> Option<&'static str> {
		match self.fields {
			[field] => Some(*field),
			_ => None,
		}
	}

	/// `field:(term)`, OR'd across fields. Query syntax in the term is escaped; `*` and `?`
	/// stay wildcards.
	pub fn clause(&self, term: &str) -> String {
		let term = escape_term(term);

		self.fields.iter().map(|field| format!("{field}:({term})")).collect::<Vec<_>>().join(" OR ")
	}

	/// `field:"value"`, OR'd across fields, with the value quoted as one phrase.
	pub fn phrase_clause(&self, value: &str) -> String {
		let quoted = quote(value);

		self.fields.iter().map(|field| format!("{field}:{quoted}")).collect::<Vec<_>>().join(" OR ")
	}
}

pub fn resolve_field(property_name: &str) -> FieldTarget {
	let lowered = property_name.to_lowercase();
	let fields = FIELD_RULES
		.iter()
		.find(|(matcher, _)| matcher.matches(property_name, &lowered))
		.map(|(_, fields)| *fields)
		.unwrap_or(FULL_TEXT);

	FieldTarget { fields }
}

/// Backslash-escapes Lucene query syntax, leaving the `*` and `?` wildcards alone.
pub fn escape_term(term: &str) -> String {
	let mut out = String::with_capacity(term.len());

	for ch in term.chars() {
		if QUERY_SYNTAX.contains(&ch) {
			out.push('\\');
		}

		out.push(ch);
	}

	out
}

/// Wraps a value in double quotes, escaping quotes and backslashes.
pub fn quote(value: &str) -> String {
	let mut out = String::with_capacity(value.len() + 2);

	out.push('"');

	for ch in value.chars() {
		if ch == '"' || ch == '\\' {
			out.push('\\');
		}

		out.push(ch);
	}

	out.push('"');

	out
}
