use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::PgConnection;
use time::OffsetDateTime;
use uuid::Uuid;

use relief_domain::reserved;
use relief_storage::{
	models::{Demand, Matches, Raw, Supply, Volunteer},
	queries,
	record::{self, Record},
	value::ColumnValue,
};

use crate::{ContactHints, Error, RecordKind, ReliefService, Result, contact};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PutOp {
	Insert,
	Update,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PutResponse {
	pub id: Uuid,
	pub op: PutOp,
}

/// Caller attributes after reserved keys have been taken out.
struct PutPlan {
	target: Option<Uuid>,
	hints: Option<ContactHints>,
	attributes: Map<String, Value>,
}
impl PutPlan {
	fn from_attributes(mut attributes: Map<String, Value>) -> Result<Self> {
		attributes.remove(reserved::JWT);

		let target = match attributes.remove(reserved::ID) {
			None | Some(Value::Null) => None,
			Some(Value::String(raw)) => Some(
				Uuid::parse_str(raw.trim())
					.map_err(|_| Error::validation(format!("id must be a UUID, got {raw:?}.")))?,
			),
			Some(other) => return Err(Error::validation(format!("id must be a UUID, got {other}."))),
		};
		let hints = ContactHints::take_from(&mut attributes);

		Ok(Self { target, hints, attributes })
	}
}

impl ReliefService {
	/// Inserts (no `id`) or updates (`id` present) one record and records the acting user in
	/// `user_logs`, both inside one transaction.
	pub async fn put(
		&self,
		kind: RecordKind,
		attributes: Map<String, Value>,
		acting_user: Uuid,
	) -> Result<PutResponse> {
		let plan = PutPlan::from_attributes(attributes)?;

		match kind {
			RecordKind::Demand => self.put_as::<Demand>(plan, acting_user).await,
			RecordKind::Supply => self.put_as::<Supply>(plan, acting_user).await,
			RecordKind::Matches => self.put_as::<Matches>(plan, acting_user).await,
			RecordKind::Raw => self.put_as::<Raw>(plan, acting_user).await,
			RecordKind::Volunteer => self.put_as::<Volunteer>(plan, acting_user).await,
		}
	}

	async fn put_as<R>(&self, plan: PutPlan, acting_user: Uuid) -> Result<PutResponse>
	where
		R: Record,
	{
		let Some(audit_key) = R::AUDIT_KEY else {
			return Err(Error::validation(format!(
				"{} records are produced by matching and cannot be written directly.",
				R::TABLE
			)));
		};
		let now = OffsetDateTime::now_utc();
		let PutPlan { target, hints, mut attributes } = plan;
		let mut tx = self.db.pool.begin().await?;
		let Some(auth) = queries::find_auth(&mut tx, acting_user).await? else {
			return Err(Error::Auth { message: "Authentication failed".to_string() });
		};

		if target.is_none()
			&& let Some(hints) = hints.as_ref()
		{
			link_contact::<R>(&mut tx, hints, &mut attributes).await?;
		}

		let mut values = record::bind_attributes::<R>(&attributes)?;

		if let Ok(column) = R::column("last_updated")
			&& !attributes.contains_key("last_updated")
		{
			values.push((column, ColumnValue::Timestamp(Some(now))));
		}

		let id = target.unwrap_or_else(Uuid::new_v4);

		queries::upsert_user_log(&mut tx, &auth.username, audit_key, id, now).await?;

		let op = match target {
			Some(id) => {
				if !queries::update_record::<R>(&mut tx, id, values).await? {
					return Err(Error::not_found("Could not find record"));
				}

				PutOp::Update
			},
			None => {
				queries::insert_record::<R>(&mut tx, id, values).await?;

				PutOp::Insert
			},
		};

		tx.commit().await?;

		tracing::info!(table = R::TABLE, %id, ?op, username = %auth.username, "Record written.");

		Ok(PutResponse { id, op })
	}
}

/// Resolves the messaging contact behind an insert without creating one, and links it through
/// `contact_id` when the record type carries that column.
async fn link_contact<R>(
	conn: &mut PgConnection,
	hints: &ContactHints,
	attributes: &mut Map<String, Value>,
) -> Result<()>
where
	R: Record,
{
	let Some(contact) = contact::find_contact_tx(conn, hints).await? else {
		return Err(Error::not_found("Contact not found."));
	};

	if R::has_column("contact_id") && !attributes.contains_key("contact_id") {
		attributes.insert("contact_id".to_string(), Value::String(contact.id.to_string()));
	}

	Ok(())
}
