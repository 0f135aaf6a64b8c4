use serde_json::{Map, Value};
use sqlx::PgConnection;
use time::OffsetDateTime;

use relief_domain::{reserved, timestamp};
use relief_storage::{
	models::{Demand, Matches, Raw, Supply, Volunteer},
	queries::{self, RecordQuery},
	record::Record,
};

use crate::{Error, RecordKind, ReliefService, Result};

/// Lifts a query-string style mapping into the JSON shape [`ReliefService::search`] takes.
pub fn string_params<I, K, V>(pairs: I) -> Map<String, Value>
where
	I: IntoIterator<Item = (K, V)>,
	K: Into<String>,
	V: Into<String>,
{
	pairs.into_iter().map(|(key, value)| (key.into(), Value::String(value.into()))).collect()
}

/// Splits reserved search keys from column filters. Nothing here touches the store.
pub fn parse_query(mut params: Map<String, Value>) -> Result<RecordQuery> {
	params.remove(reserved::JWT);

	let after = take_timestamp(&mut params, reserved::AFTER)?;
	let before = take_timestamp(&mut params, reserved::BEFORE)?;
	let verified_after = take_timestamp(&mut params, reserved::VERIFIED_AFTER)?;
	let limit = take_limit(&mut params)?;
	let filters = params.into_iter().collect();

	Ok(RecordQuery { filters, after, before, verified_after, limit })
}

impl ReliefService {
	/// Equality/time-filtered search over one record type, returned as plain attribute maps in
	/// ranking order where the type has one.
	pub async fn search(
		&self,
		kind: RecordKind,
		params: Map<String, Value>,
	) -> Result<Vec<Map<String, Value>>> {
		let query = parse_query(params)?;
		let mut tx = self.db.pool.begin().await?;
		let items = match kind {
			RecordKind::Demand => search_as::<Demand>(&mut tx, &query).await?,
			RecordKind::Supply => search_as::<Supply>(&mut tx, &query).await?,
			RecordKind::Matches => search_as::<Matches>(&mut tx, &query).await?,
			RecordKind::Raw => search_as::<Raw>(&mut tx, &query).await?,
			RecordKind::Volunteer => search_as::<Volunteer>(&mut tx, &query).await?,
		};

		tx.commit().await?;

		Ok(items)
	}
}

async fn search_as<R>(conn: &mut PgConnection, query: &RecordQuery) -> Result<Vec<Map<String, Value>>>
where
	R: Record,
{
	let rows = queries::search_records::<R>(conn, query).await?;

	rows.iter().map(|row| row.attributes().map_err(Error::from)).collect()
}

fn take_timestamp(params: &mut Map<String, Value>, key: &str) -> Result<Option<OffsetDateTime>> {
	let Some(value) = params.remove(key) else {
		return Ok(None);
	};

	match &value {
		Value::Null => Ok(None),
		Value::String(raw) => timestamp::parse_timestamp(raw)
			.map(Some)
			.ok_or_else(|| Error::validation(format!("Invalid timestamp for {key}: {raw:?}."))),
		other => Err(Error::validation(format!("Invalid timestamp for {key}: {other}."))),
	}
}

fn take_limit(params: &mut Map<String, Value>) -> Result<Option<i64>> {
	let Some(value) = params.remove(reserved::LIMIT) else {
		return Ok(None);
	};
	let limit = match &value {
		Value::Null => return Ok(None),
		Value::String(raw) => raw.trim().parse::<i64>().ok(),
		Value::Number(number) => number.as_i64(),
		_ => None,
	};

	match limit {
		Some(limit) if limit > 0 => Ok(Some(limit)),
		_ => Err(Error::validation(format!("limit must be a positive integer, got {value}."))),
	}
}
