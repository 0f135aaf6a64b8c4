use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct Demand {
	pub id: Uuid,
	pub resource: Option<String>,
	pub category: Option<String>,
	pub location: Option<String>,
	pub phone: Option<String>,
	pub contact_id: Option<Uuid>,
	#[serde(with = "crate::time_serde::option")]
	pub requested_at: Option<OffsetDateTime>,
	#[serde(with = "crate::time_serde::option")]
	pub last_updated: Option<OffsetDateTime>,
	#[serde(with = "crate::time_serde::option")]
	pub last_verified_on: Option<OffsetDateTime>,
	pub verified: Option<bool>,
}

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct Supply {
	pub id: Uuid,
	pub title: Option<String>,
	pub resource: Option<String>,
	pub category: Option<String>,
	pub location: Option<String>,
	pub phone: Option<String>,
	#[serde(with = "crate::time_serde::option")]
	pub last_updated: Option<OffsetDateTime>,
	#[serde(with = "crate::time_serde::option")]
	pub last_verified_on: Option<OffsetDateTime>,
	pub verified: Option<bool>,
}

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct Matches {
	pub id: Uuid,
	pub demand_id: Uuid,
	pub supply_id: Uuid,
	#[serde(with = "crate::time_serde")]
	pub created_on: OffsetDateTime,
	pub sent: bool,
}

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct Raw {
	pub id: Uuid,
	pub origin: Option<String>,
	pub content: Option<String>,
	pub resource: Option<String>,
	pub location: Option<String>,
	pub phone: Option<String>,
	#[serde(with = "crate::time_serde::option")]
	pub last_updated: Option<OffsetDateTime>,
	#[serde(with = "crate::time_serde::option")]
	pub last_verified_on: Option<OffsetDateTime>,
	pub verified: Option<bool>,
}

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct Volunteer {
	pub id: Uuid,
	pub name: Option<String>,
	pub resource: Option<String>,
	pub location: Option<String>,
	pub phone: Option<String>,
	#[serde(with = "crate::time_serde::option")]
	pub last_updated: Option<OffsetDateTime>,
	#[serde(with = "crate::time_serde::option")]
	pub last_verified_on: Option<OffsetDateTime>,
	pub verified: Option<bool>,
}

#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct Contact {
	pub id: Uuid,
	pub source: String,
	pub external_user_id: Option<String>,
	pub external_handle: Option<String>,
	pub bot_activated: bool,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Auth {
	pub id: Uuid,
	pub username: String,
	pub password_hash: String,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct UserLog {
	pub id: Uuid,
	pub username: String,
	pub demand_id: Option<Uuid>,
	pub supply_id: Option<Uuid>,
	pub raw_id: Option<Uuid>,
	pub volunteer_id: Option<Uuid>,
	pub last_updated: OffsetDateTime,
}
