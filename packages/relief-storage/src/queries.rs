use sqlx::{PgConnection, Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
	Error, Result,
	models::{Auth, Contact, Demand, Matches, Supply},
	record::{Column, RANKING_ORDER, Record},
	value::ColumnValue,
};

/// Filters accepted by [`search_records`]; every value is already validated by the caller.
#[derive(Clone, Debug, Default)]
pub struct RecordQuery {
	pub filters: Vec<(String, serde_json::Value)>,
	pub after: Option<OffsetDateTime>,
	pub before: Option<OffsetDateTime>,
	pub verified_after: Option<OffsetDateTime>,
	pub limit: Option<i64>,
}

pub async fn search_records<R>(conn: &mut PgConnection, query: &RecordQuery) -> Result<Vec<R>>
where
	R: Record,
{
	let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM ");

	builder.push(R::TABLE);
	builder.push(" WHERE TRUE");

	for (name, value) in &query.filters {
		let column = R::column(name)?;
		let value = ColumnValue::from_json(column, value)?;

		builder.push(" AND ");
		builder.push(column.name);

		if value.is_null() {
			builder.push(" IS NULL");
		} else {
			builder.push(" = ");
			value.push_bind(&mut builder);
		}
	}

	if query.after.is_some() || query.before.is_some() {
		let Some(time_column) = R::TIME_COLUMN else {
			return Err(Error::InvalidArgument(format!(
				"{} does not support after/before filters.",
				R::TABLE
			)));
		};

		if let Some(after) = query.after {
			builder.push(" AND ");
			builder.push(time_column);
			builder.push(" > ");
			builder.push_bind(after);
		}
		if let Some(before) = query.before {
			builder.push(" AND ");
			builder.push(time_column);
			builder.push(" < ");
			builder.push_bind(before);
		}
	}
	if let Some(verified_after) = query.verified_after {
		if !R::RANKED {
			return Err(Error::InvalidArgument(format!(
				"{} does not support verified_after.",
				R::TABLE
			)));
		}

		builder.push(" AND last_verified_on > ");
		builder.push_bind(verified_after);
	}
	if R::RANKED {
		builder.push(" ORDER BY ");
		builder.push(RANKING_ORDER);
	}
	if let Some(limit) = query.limit {
		builder.push(" LIMIT ");
		builder.push_bind(limit);
	}

	let rows = builder.build_query_as::<R>().fetch_all(&mut *conn).await?;

	tracing::debug!(table = R::TABLE, rows = rows.len(), "Record search completed.");

	Ok(rows)
}

pub async fn insert_record<R>(
	conn: &mut PgConnection,
	id: Uuid,
	values: Vec<(&'static Column, ColumnValue)>,
) -> Result<()>
where
	R: Record,
{
	let mut builder = QueryBuilder::<Postgres>::new("INSERT INTO ");

	builder.push(R::TABLE);
	builder.push(" (id");

	for (column, _) in &values {
		builder.push(", ");
		builder.push(column.name);
	}

	builder.push(") VALUES (");
	builder.push_bind(id);

	for (_, value) in values {
		builder.push(", ");
		value.push_bind(&mut builder);
	}

	builder.push(")");
	builder.build().execute(&mut *conn).await?;

	Ok(())
}

/// Returns `false` when no row carries `id`.
pub async fn update_record<R>(
	conn: &mut PgConnection,
	id: Uuid,
	values: Vec<(&'static Column, ColumnValue)>,
) -> Result<bool>
where
	R: Record,
{
	if values.is_empty() {
		return Err(Error::InvalidArgument("No updates provided.".to_string()));
	}

	let mut builder = QueryBuilder::<Postgres>::new("UPDATE ");

	builder.push(R::TABLE);
	builder.push(" SET ");

	for (index, (column, value)) in values.into_iter().enumerate() {
		if index > 0 {
			builder.push(", ");
		}

		builder.push(column.name);
		builder.push(" = ");
		value.push_bind(&mut builder);
	}

	builder.push(" WHERE id = ");
	builder.push_bind(id);
	builder.push(" RETURNING id");

	let updated: Option<Uuid> =
		builder.build_query_scalar().fetch_optional(&mut *conn).await?;

	Ok(updated.is_some())
}

pub async fn find_auth(conn: &mut PgConnection, id: Uuid) -> Result<Option<Auth>> {
	let auth = sqlx::query_as::<_, Auth>(
		"\
SELECT id, username, password_hash
FROM auth_users
WHERE id = $1",
	)
	.bind(id)
	.fetch_optional(&mut *conn)
	.await?;

	Ok(auth)
}

/// Writes or refreshes the single audit row for `(username, key_column = target_id)`.
///
/// `key_column` must be one of the `user_logs` foreign-key columns; it is only ever taken from
/// [`Record::AUDIT_KEY`].
pub async fn upsert_user_log(
	conn: &mut PgConnection,
	username: &str,
	key_column: &'static str,
	target_id: Uuid,
	now: OffsetDateTime,
) -> Result<()> {
	if !matches!(key_column, "demand_id" | "supply_id" | "raw_id" | "volunteer_id") {
		return Err(Error::InvalidArgument(format!("{key_column} is not an audit key.")));
	}

	let sql = format!(
		"\
INSERT INTO user_logs (id, username, {key_column}, last_updated)
VALUES ($1, $2, $3, $4)
ON CONFLICT (username, {key_column}) WHERE {key_column} IS NOT NULL
DO UPDATE SET last_updated = EXCLUDED.last_updated"
	);

	sqlx::query(&sql)
		.bind(Uuid::new_v4())
		.bind(username)
		.bind(target_id)
		.bind(now)
		.execute(&mut *conn)
		.await?;

	Ok(())
}

pub async fn find_contact_by_user_id(
	conn: &mut PgConnection,
	source: &str,
	external_user_id: &str,
) -> Result<Option<Contact>> {
	let contact = sqlx::query_as::<_, Contact>(
		"\
SELECT id, source, external_user_id, external_handle, bot_activated
FROM contacts
WHERE source = $1 AND external_user_id = $2
LIMIT 1",
	)
	.bind(source)
	.bind(external_user_id)
	.fetch_optional(&mut *conn)
	.await?;

	Ok(contact)
}

pub async fn find_contact_by_handle(
	conn: &mut PgConnection,
	source: &str,
	external_handle: &str,
) -> Result<Option<Contact>> {
	let contact = sqlx::query_as::<_, Contact>(
		"\
SELECT id, source, external_user_id, external_handle, bot_activated
FROM contacts
WHERE source = $1 AND external_handle = $2
ORDER BY created_at ASC
LIMIT 1",
	)
	.bind(source)
	.bind(external_handle)
	.fetch_optional(&mut *conn)
	.await?;

	Ok(contact)
}

/// Returns `false` when a concurrent writer already holds the same identity; the caller should
/// look the contact up again.
pub async fn insert_contact(conn: &mut PgConnection, contact: &Contact) -> Result<bool> {
	let inserted: Option<Uuid> = sqlx::query_scalar(
		"\
INSERT INTO contacts (id, source, external_user_id, external_handle, bot_activated)
VALUES ($1, $2, $3, $4, $5)
ON CONFLICT DO NOTHING
RETURNING id",
	)
	.bind(contact.id)
	.bind(contact.source.as_str())
	.bind(contact.external_user_id.as_deref())
	.bind(contact.external_handle.as_deref())
	.bind(contact.bot_activated)
	.fetch_optional(&mut *conn)
	.await?;

	Ok(inserted.is_some())
}

pub async fn recent_demands_for_contact(
	conn: &mut PgConnection,
	contact_id: Uuid,
	limit: i64,
) -> Result<Vec<Demand>> {
	let demands = sqlx::query_as::<_, Demand>(
		"\
SELECT *
FROM demands
WHERE contact_id = $1
ORDER BY requested_at DESC NULLS LAST
LIMIT $2",
	)
	.bind(contact_id)
	.bind(limit)
	.fetch_all(&mut *conn)
	.await?;

	Ok(demands)
}

/// Locks the returned rows until the transaction ends; rows locked by a concurrent delivery are
/// skipped rather than waited on.
pub async fn claim_unsent_matches(
	conn: &mut PgConnection,
	demand_id: Uuid,
	limit: i64,
) -> Result<Vec<Matches>> {
	let matches = sqlx::query_as::<_, Matches>(
		"\
SELECT id, demand_id, supply_id, created_on, sent
FROM matches
WHERE demand_id = $1 AND sent = false
ORDER BY created_on DESC
LIMIT $2
FOR UPDATE SKIP LOCKED",
	)
	.bind(demand_id)
	.bind(limit)
	.fetch_all(&mut *conn)
	.await?;

	Ok(matches)
}

pub async fn supplies_by_ids(conn: &mut PgConnection, ids: &[Uuid]) -> Result<Vec<Supply>> {
	let supplies = sqlx::query_as::<_, Supply>(
		"\
SELECT *
FROM supplies
WHERE id = ANY($1)",
	)
	.bind(ids)
	.fetch_all(&mut *conn)
	.await?;

	Ok(supplies)
}

/// Only flips rows that are still unsent, so a match is never delivered twice.
pub async fn mark_matches_sent(conn: &mut PgConnection, ids: &[Uuid]) -> Result<u64> {
	if ids.is_empty() {
		return Ok(0);
	}

	let result = sqlx::query(
		"\
UPDATE matches
SET sent = true
WHERE id = ANY($1) AND sent = false",
	)
	.bind(ids)
	.execute(&mut *conn)
	.await?;

	Ok(result.rows_affected())
}

/// Runs the store-side matching procedure for one demand and returns how many pairs it added.
pub async fn compute_matches(conn: &mut PgConnection, demand_id: Uuid) -> Result<i32> {
	let inserted: i32 = sqlx::query_scalar("SELECT compute_matches($1)")
		.bind(demand_id)
		.fetch_one(&mut *conn)
		.await?;

	Ok(inserted)
}
