use serde_json::Value;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
	Error, Result,
	record::{Column, ColumnType},
};

/// A JSON attribute converted to the Rust type of the column it targets.
#[derive(Clone, Debug, PartialEq)]
pub enum ColumnValue {
	Uuid(Option<Uuid>),
	Text(Option<String>),
	Bool(Option<bool>),
	Timestamp(Option<OffsetDateTime>),
}
impl ColumnValue {
	pub fn from_json(column: &Column, value: &Value) -> Result<Self> {
		if value.is_null() {
			return Ok(Self::null(column.ty));
		}

		let converted = match column.ty {
			ColumnType::Uuid => value.as_str().and_then(|raw| Uuid::parse_str(raw.trim()).ok()).map(
				|id| Self::Uuid(Some(id)),
			),
			ColumnType::Text => match value {
				Value::String(text) => Some(Self::Text(Some(text.clone()))),
				Value::Number(number) => Some(Self::Text(Some(number.to_string()))),
				Value::Bool(flag) => Some(Self::Text(Some(flag.to_string()))),
				_ => None,
			},
			ColumnType::Bool => match value {
				Value::Bool(flag) => Some(Self::Bool(Some(*flag))),
				Value::String(raw) => parse_bool(raw).map(|flag| Self::Bool(Some(flag))),
				Value::Number(number) => match number.as_i64() {
					Some(0) => Some(Self::Bool(Some(false))),
					Some(1) => Some(Self::Bool(Some(true))),
					_ => None,
				},
				_ => None,
			},
			ColumnType::Timestamp => value
				.as_str()
				.and_then(relief_domain::timestamp::parse_timestamp)
				.map(|ts| Self::Timestamp(Some(ts))),
		};

		converted.ok_or_else(|| Error::TypeMismatch {
			column: column.name,
			expected: column.ty.sql_name(),
			found: value.to_string(),
		})
	}

	pub fn null(ty: ColumnType) -> Self {
		match ty {
			ColumnType::Uuid => Self::Uuid(None),
			ColumnType::Text => Self::Text(None),
			ColumnType::Bool => Self::Bool(None),
			ColumnType::Timestamp => Self::Timestamp(None),
		}
	}

	pub fn is_null(&self) -> bool {
		match self {
			Self::Uuid(value) => value.is_none(),
			Self::Text(value) => value.is_none(),
			Self::Bool(value) => value.is_none(),
			Self::Timestamp(value) => value.is_none(),
		}
	}

	pub(crate) fn push_bind(self, builder: &mut QueryBuilder<'_, Postgres>) {
		match self {
			Self::Uuid(value) => builder.push_bind(value),
			Self::Text(value) => builder.push_bind(value),
			Self::Bool(value) => builder.push_bind(value),
			Self::Timestamp(value) => builder.push_bind(value),
		};
	}
}

fn parse_bool(raw: &str) -> Option<bool> {
	match raw.trim().to_ascii_lowercase().as_str() {
		"true" | "t" | "yes" | "y" | "1" => Some(true),
		"false" | "f" | "no" | "n" | "0" => Some(false),
		_ => None,
	}
}
