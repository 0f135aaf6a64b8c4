//! Text shapes handed back to a requester when matches are delivered.

const KEY_SEPARATOR: &str = ", ";

/// Joins the non-blank demand fields in the order given. `None` when every field is blank.
pub fn demand_key<'a, I>(fields: I) -> Option<String>
where
	I: IntoIterator<Item = Option<&'a str>>,
{
	let parts = fields
		.into_iter()
		.flatten()
		.map(str::trim)
		.filter(|part| !part.is_empty())
		.collect::<Vec<_>>();

	if parts.is_empty() { None } else { Some(parts.join(KEY_SEPARATOR)) }
}

/// A phone is contactable when it carries at least one digit.
pub fn is_contactable_phone(phone: Option<&str>) -> bool {
	phone.map(|phone| phone.chars().any(|c| c.is_ascii_digit())).unwrap_or(false)
}

pub fn supply_line(title: Option<&str>, phone: &str) -> String {
	let title = title.map(str::trim).filter(|title| !title.is_empty()).unwrap_or("Unnamed supply");

	format!("{title}: {}", phone.trim())
}

pub fn supply_listing<I>(lines: I) -> String
where
	I: IntoIterator<Item = String>,
{
	lines.into_iter().collect::<Vec<_>>().join("\n")
}
