//! Column metadata shared by every record type reachable through search and mutation.

use std::cmp::Ordering;

use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::{FromRow, postgres::PgRow};
use time::OffsetDateTime;

use crate::{
	Error, Result,
	models::{Demand, Matches, Raw, Supply, Volunteer},
	value::ColumnValue,
};

pub const RANKING_ORDER: &str =
	"verified DESC NULLS LAST, last_verified_on DESC NULLS LAST, last_updated DESC NULLS LAST";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnType {
	Uuid,
	Text,
	Bool,
	Timestamp,
}
impl ColumnType {
	pub fn sql_name(self) -> &'static str {
		match self {
			Self::Uuid => "uuid",
			Self::Text => "text",
			Self::Bool => "boolean",
			Self::Timestamp => "timestamp with time zone",
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Column {
	pub name: &'static str,
	pub ty: ColumnType,
}
impl Column {
	pub const fn new(name: &'static str, ty: ColumnType) -> Self {
		Self { name, ty }
	}
}

/// The capability set shared by searchable rows.
///
/// `RANKED` types expose `verified`, `last_verified_on`, and `last_updated` and are returned in
/// ranking order. `AUDIT_KEY` names the `user_logs` column that records writes against the type;
/// types without one cannot be written through the audited mutation path.
pub trait Record
where
	Self: for<'r> FromRow<'r, PgRow> + Serialize + Send + Unpin,
{
	const TABLE: &'static str;
	const COLUMNS: &'static [Column];
	const TIME_COLUMN: Option<&'static str>;
	const RANKED: bool;
	const AUDIT_KEY: Option<&'static str>;

	fn rank_key(&self) -> Option<RankKey>;

	fn column(name: &str) -> Result<&'static Column> {
		Self::COLUMNS
			.iter()
			.find(|column| column.name == name)
			.ok_or_else(|| Error::UnknownColumn { table: Self::TABLE, column: name.to_string() })
	}

	fn has_column(name: &str) -> bool {
		Self::COLUMNS.iter().any(|column| column.name == name)
	}

	/// Plain attribute view of the row, as handed back to callers.
	fn attributes(&self) -> Result<Map<String, Value>> {
		match serde_json::to_value(self) {
			Ok(Value::Object(map)) => Ok(map),
			Ok(other) => Err(Error::UnexpectedShape(format!(
				"{} row serialized to {other} instead of an object.",
				Self::TABLE
			))),
			Err(err) => Err(Error::UnexpectedShape(format!(
				"{} row could not be serialized: {err}.",
				Self::TABLE
			))),
		}
	}
}

/// Sorting by `RankKey` ascending yields the same order as [`RANKING_ORDER`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RankKey {
	pub verified: Option<bool>,
	pub last_verified_on: Option<OffsetDateTime>,
	pub last_updated: Option<OffsetDateTime>,
}
impl Ord for RankKey {
	fn cmp(&self, other: &Self) -> Ordering {
		desc_nulls_last(self.verified, other.verified)
			.then_with(|| desc_nulls_last(self.last_verified_on, other.last_verified_on))
			.then_with(|| desc_nulls_last(self.last_updated, other.last_updated))
	}
}
impl PartialOrd for RankKey {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

/// Converts caller attributes into typed column values, rejecting unknown and reserved columns.
pub fn bind_attributes<R>(
	attributes: &Map<String, Value>,
) -> Result<Vec<(&'static Column, ColumnValue)>>
where
	R: Record,
{
	let mut values = Vec::with_capacity(attributes.len());

	for (name, value) in attributes {
		if relief_domain::reserved::is_reserved(name) {
			return Err(Error::InvalidArgument(format!(
				"{name} is a reserved parameter and cannot be written as an attribute."
			)));
		}

		let column = R::column(name)?;

		values.push((column, ColumnValue::from_json(column, value)?));
	}

	Ok(values)
}

fn desc_nulls_last<T>(left: Option<T>, right: Option<T>) -> Ordering
where
	T: Ord,
{
	match (left, right) {
		(Some(left), Some(right)) => right.cmp(&left),
		(Some(_), None) => Ordering::Less,
		(None, Some(_)) => Ordering::Greater,
		(None, None) => Ordering::Equal,
	}
}

const DEMAND_COLUMNS: [Column; 10] = [
	Column::new("id", ColumnType::Uuid),
	Column::new("resource", ColumnType::Text),
	Column::new("category", ColumnType::Text),
	Column::new("location", ColumnType::Text),
	Column::new("phone", ColumnType::Text),
	Column::new("contact_id", ColumnType::Uuid),
	Column::new("requested_at", ColumnType::Timestamp),
	Column::new("last_updated", ColumnType::Timestamp),
	Column::new("last_verified_on", ColumnType::Timestamp),
	Column::new("verified", ColumnType::Bool),
];
const SUPPLY_COLUMNS: [Column; 9] = [
	Column::new("id", ColumnType::Uuid),
	Column::new("title", ColumnType::Text),
	Column::new("resource", ColumnType::Text),
	Column::new("category", ColumnType::Text),
	Column::new("location", ColumnType::Text),
	Column::new("phone", ColumnType::Text),
	Column::new("last_updated", ColumnType::Timestamp),
	Column::new("last_verified_on", ColumnType::Timestamp),
	Column::new("verified", ColumnType::Bool),
];
const MATCHES_COLUMNS: [Column; 5] = [
	Column::new("id", ColumnType::Uuid),
	Column::new("demand_id", ColumnType::Uuid),
	Column::new("supply_id", ColumnType::Uuid),
	Column::new("created_on", ColumnType::Timestamp),
	Column::new("sent", ColumnType::Bool),
];
const RAW_COLUMNS: [Column; 9] = [
	Column::new("id", ColumnType::Uuid),
	Column::new("origin", ColumnType::Text),
	Column::new("content", ColumnType::Text),
	Column::new("resource", ColumnType::Text),
	Column::new("location", ColumnType::Text),
	Column::new("phone", ColumnType::Text),
	Column::new("last_updated", ColumnType::Timestamp),
	Column::new("last_verified_on", ColumnType::Timestamp),
	Column::new("verified", ColumnType::Bool),
];
const VOLUNTEER_COLUMNS: [Column; 8] = [
	Column::new("id", ColumnType::Uuid),
	Column::new("name", ColumnType::Text),
	Column::new("resource", ColumnType::Text),
	Column::new("location", ColumnType::Text),
	Column::new("phone", ColumnType::Text),
	Column::new("last_updated", ColumnType::Timestamp),
	Column::new("last_verified_on", ColumnType::Timestamp),
	Column::new("verified", ColumnType::Bool),
];

impl Record for Demand {
	const AUDIT_KEY: Option<&'static str> = Some("demand_id");
	const COLUMNS: &'static [Column] = &DEMAND_COLUMNS;
	const RANKED: bool = true;
	const TABLE: &'static str = "demands";
	const TIME_COLUMN: Option<&'static str> = Some("requested_at");

	fn rank_key(&self) -> Option<RankKey> {
		Some(RankKey {
			verified: self.verified,
			last_verified_on: self.last_verified_on,
			last_updated: self.last_updated,
		})
	}
}

impl Record for Supply {
	const AUDIT_KEY: Option<&'static str> = Some("supply_id");
	const COLUMNS: &'static [Column] = &SUPPLY_COLUMNS;
	const RANKED: bool = true;
	const TABLE: &'static str = "supplies";
	const TIME_COLUMN: Option<&'static str> = Some("last_updated");

	fn rank_key(&self) -> Option<RankKey> {
		Some(RankKey {
			verified: self.verified,
			last_verified_on: self.last_verified_on,
			last_updated: self.last_updated,
		})
	}
}

impl Record for Matches {
	const AUDIT_KEY: Option<&'static str> = None;
	const COLUMNS: &'static [Column] = &MATCHES_COLUMNS;
	const RANKED: bool = false;
	const TABLE: &'static str = "matches";
	const TIME_COLUMN: Option<&'static str> = Some("created_on");

	fn rank_key(&self) -> Option<RankKey> {
		None
	}
}

impl Record for Raw {
	const AUDIT_KEY: Option<&'static str> = Some("raw_id");
	const COLUMNS: &'static [Column] = &RAW_COLUMNS;
	const RANKED: bool = true;
	const TABLE: &'static str = "raw_intake";
	const TIME_COLUMN: Option<&'static str> = Some("last_updated");

	fn rank_key(&self) -> Option<RankKey> {
		Some(RankKey {
			verified: self.verified,
			last_verified_on: self.last_verified_on,
			last_updated: self.last_updated,
		})
	}
}

impl Record for Volunteer {
	const AUDIT_KEY: Option<&'static str> = Some("volunteer_id");
	const COLUMNS: &'static [Column] = &VOLUNTEER_COLUMNS;
	const RANKED: bool = true;
	const TABLE: &'static str = "volunteers";
	const TIME_COLUMN: Option<&'static str> = Some("last_updated");

	fn rank_key(&self) -> Option<RankKey> {
		Some(RankKey {
			verified: self.verified,
			last_verified_on: self.last_verified_on,
			last_updated: self.last_updated,
		})
	}
}
