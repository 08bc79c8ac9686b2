use time::{
	Date, OffsetDateTime, PrimitiveDateTime, UtcOffset,
	format_description::{BorrowedFormatItem, well_known::Rfc3339},
	macros::format_description,
};

use crate::{Error, Result};

const SOLR_SECONDS: &[BorrowedFormatItem<'static>] =
	format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z");
const NAIVE_DATE_TIMES: [&[BorrowedFormatItem<'static>]; 5] = [
	format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
	format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
	format_description!("[year]-[month]-[day]T[hour]:[minute]"),
	format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
	format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
];
const NAIVE_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Parses RFC 3339 and the common ISO 8601-like forms. Values without an offset are UTC.
pub fn parse_timestamp(raw: &str) -> Result<OffsetDateTime> {
	let trimmed = raw.trim();

	if let Ok(parsed) = OffsetDateTime::parse(trimmed, &Rfc3339) {
		return Ok(parsed);
	}

	let naive = trimmed.strip_suffix(['Z', 'z']).unwrap_or(trimmed);

	for format in NAIVE_DATE_TIMES {
		if let Ok(parsed) = PrimitiveDateTime::parse(naive, format) {
			return Ok(parsed.assume_utc());
		}
	}

	if let Ok(date) = Date::parse(naive, NAIVE_DATE) {
		return Ok(date.midnight().assume_utc());
	}

	Err(Error::InvalidTimestamp { value: raw.to_string() })
}

/// `YYYY-MM-DDTHH:MM:SSZ` in UTC, dropping sub-second precision.
pub fn format_timestamp(value: OffsetDateTime) -> Result<String> {
	value
		.to_offset(UtcOffset::UTC)
		.format(SOLR_SECONDS)
		.map_err(|_| Error::InvalidTimestamp { value: value.to_string() })
}

pub fn normalize_timestamp(raw: &str) -> Result<String> {
	format_timestamp(parse_timestamp(raw)?)
}
