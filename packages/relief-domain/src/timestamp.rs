use time::{
	Date, OffsetDateTime, PrimitiveDateTime, Time,
	format_description::{
		BorrowedFormatItem,
		well_known::{Rfc2822, Rfc3339},
	},
	macros::format_description,
};

type Format = &'static [BorrowedFormatItem<'static>];

const OFFSET_FORMATS: [Format; 4] = [
	format_description!(
		"[year]-[month]-[day] [hour]:[minute]:[second][optional [.[subsecond]]][offset_hour sign:mandatory]:[offset_minute]"
	),
	format_description!(
		"[year]-[month]-[day] [hour]:[minute]:[second][optional [.[subsecond]]][offset_hour sign:mandatory]"
	),
	format_description!(
		"[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]][offset_hour sign:mandatory]:[offset_minute]"
	),
	format_description!(
		"[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]][offset_hour sign:mandatory]"
	),
];
const NAIVE_FORMATS: [Format; 4] = [
	format_description!("[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"),
	format_description!("[year]-[month]-[day] [hour]:[minute]:[second][optional [.[subsecond]]]"),
	format_description!("[year]-[month]-[day]T[hour]:[minute]"),
	format_description!("[year]-[month]-[day] [hour]:[minute]"),
];
const DATE_FORMATS: [Format; 3] = [
	format_description!("[year]-[month]-[day]"),
	format_description!("[year]/[month]/[day]"),
	format_description!("[month]/[day]/[year]"),
];

/// Parses the timestamp shapes clients actually send: RFC 3339, RFC 2822, Postgres text
/// output, and bare dates. Values without an offset are taken as UTC; bare dates as midnight.
pub fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
	let raw = raw.trim();

	if raw.is_empty() {
		return None;
	}
	if let Ok(ts) = OffsetDateTime::parse(raw, &Rfc3339) {
		return Some(ts);
	}
	if let Ok(ts) = OffsetDateTime::parse(raw, &Rfc2822) {
		return Some(ts);
	}

	for format in OFFSET_FORMATS {
		if let Ok(ts) = OffsetDateTime::parse(raw, format) {
			return Some(ts);
		}
	}
	for format in NAIVE_FORMATS {
		if let Ok(ts) = PrimitiveDateTime::parse(raw, format) {
			return Some(ts.assume_utc());
		}
	}
	for format in DATE_FORMATS {
		if let Ok(date) = Date::parse(raw, format) {
			return Some(PrimitiveDateTime::new(date, Time::MIDNIGHT).assume_utc());
		}
	}

	None
}
