use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::PgConnection;
use uuid::Uuid;

use relief_domain::reserved;
use relief_storage::{models::Contact, queries};

use crate::{Error, ReliefService, Result};

/// Messaging-source identity of a participant. Blank strings count as absent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactHints {
	pub source: String,
	pub external_user_id: Option<String>,
	pub external_handle: Option<String>,
}
impl ContactHints {
	pub fn new(
		source: impl Into<String>,
		external_user_id: Option<String>,
		external_handle: Option<String>,
	) -> Self {
		Self {
			source: source.into().trim().to_string(),
			external_user_id: non_blank(external_user_id),
			external_handle: non_blank(external_handle),
		}
	}

	/// Removes `source`, `tg_user_id`, and `tg_user_handle` from `attributes`. Returns `None` when
	/// none of them carried a value.
	pub fn take_from(attributes: &mut Map<String, Value>) -> Option<Self> {
		let source = attributes.remove(reserved::SOURCE).and_then(value_text);
		let external_user_id = attributes.remove(reserved::TG_USER_ID).and_then(value_text);
		let external_handle = attributes.remove(reserved::TG_USER_HANDLE).and_then(value_text);

		if source.is_none() && external_user_id.is_none() && external_handle.is_none() {
			return None;
		}

		Some(Self::new(source.unwrap_or_default(), external_user_id, external_handle))
	}

	fn validate(&self) -> Result<()> {
		if self.source.is_empty() {
			return Err(Error::validation("source is required to resolve a contact."));
		}
		if self.external_user_id.is_none() && self.external_handle.is_none() {
			return Err(Error::validation("Not enough contact information."));
		}

		Ok(())
	}
}

#[derive(Clone, Debug, Serialize)]
pub struct ResolvedContact {
	pub contact: Contact,
	/// `true` when this call inserted the contact; such a contact has no history yet.
	pub created: bool,
}

impl ReliefService {
	/// Finds the contact for `hints`, creating it when none exists.
	pub async fn resolve_contact(&self, hints: &ContactHints) -> Result<ResolvedContact> {
		let mut tx = self.db.pool.begin().await?;
		let resolved = resolve_contact_tx(&mut tx, hints).await?;

		tx.commit().await?;

		Ok(resolved)
	}
}

/// Lookup without creation: by external user id within the source when given, otherwise by
/// handle within the source.
pub(crate) async fn find_contact_tx(
	conn: &mut PgConnection,
	hints: &ContactHints,
) -> Result<Option<Contact>> {
	hints.validate()?;

	if let Some(external_user_id) = hints.external_user_id.as_deref() {
		return Ok(queries::find_contact_by_user_id(conn, &hints.source, external_user_id).await?);
	}
	if let Some(external_handle) = hints.external_handle.as_deref() {
		return Ok(queries::find_contact_by_handle(conn, &hints.source, external_handle).await?);
	}

	Ok(None)
}

pub(crate) async fn resolve_contact_tx(
	conn: &mut PgConnection,
	hints: &ContactHints,
) -> Result<ResolvedContact> {
	if let Some(contact) = find_contact_tx(conn, hints).await? {
		return Ok(ResolvedContact { contact, created: false });
	}

	let contact = Contact {
		id: Uuid::new_v4(),
		source: hints.source.clone(),
		external_user_id: hints.external_user_id.clone(),
		external_handle: hints.external_handle.clone(),
		bot_activated: true,
	};

	if !queries::insert_contact(conn, &contact).await? {
		// A concurrent call created the same identity first.
		return match find_contact_tx(conn, hints).await? {
			Some(contact) => Ok(ResolvedContact { contact, created: false }),
			None => Err(Error::Internal {
				message: "Contact insert conflicted but no matching contact was found.".to_string(),
			}),
		};
	}

	tracing::info!(contact_id = %contact.id, source = %contact.source, "Contact created.");

	Ok(ResolvedContact { contact, created: true })
}

fn value_text(value: Value) -> Option<String> {
	match value {
		Value::String(text) => non_blank(Some(text)),
		Value::Number(number) => Some(number.to_string()),
		_ => None,
	}
}

fn non_blank(value: Option<String>) -> Option<String> {
	value.map(|text| text.trim().to_string()).filter(|text| !text.is_empty())
}
