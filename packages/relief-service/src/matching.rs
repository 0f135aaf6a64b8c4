use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use uuid::Uuid;

use relief_domain::delivery;
use relief_storage::{
	models::{Contact, Demand, Supply},
	queries,
};

use crate::{ContactHints, Error, ReliefService, Result, contact};

pub const NO_REQUESTS_GUIDANCE: &str =
	"No requests submitted yet. Submit a request first and matching supplies will be sent here.";
pub const NO_NEW_RESULTS: &str = "No new results found.";
pub const INVALID_REQUEST: &str = "Invalid request detected.";

/// One delivered demand: its readable key and the `title: phone` listing of its supplies.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryEntry {
	pub key: String,
	pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Delivery {
	/// The contact was created by this call, so it cannot have requests yet.
	NewContact { contact_id: Uuid },
	NoRequests { contact_id: Uuid, message: String },
	Results { contact_id: Uuid, entries: Vec<DeliveryEntry> },
}
impl Delivery {
	pub fn contact_id(&self) -> Uuid {
		match self {
			Self::NewContact { contact_id }
			| Self::NoRequests { contact_id, .. }
			| Self::Results { contact_id, .. } => *contact_id,
		}
	}

	pub fn entries(&self) -> &[DeliveryEntry] {
		match self {
			Self::Results { entries, .. } => entries,
			_ => &[],
		}
	}
}

/// Insertion-ordered key/value aggregate. A repeated key appends its lines to the existing entry.
#[derive(Debug, Default)]
struct Entries {
	entries: Vec<DeliveryEntry>,
}
impl Entries {
	fn insert(&mut self, key: String, value: String) {
		match self.entries.iter_mut().find(|entry| entry.key == key) {
			Some(entry) => {
				entry.value.push('\n');
				entry.value.push_str(&value);
			},
			None => self.entries.push(DeliveryEntry { key, value }),
		}
	}

	fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

impl ReliefService {
	/// Resolves (or creates) the contact behind `hints` and delivers its pending matches.
	pub async fn deliver_matches(&self, hints: &ContactHints) -> Result<Delivery> {
		let mut tx = self.db.pool.begin().await?;
		let resolved = contact::resolve_contact_tx(&mut tx, hints).await?;
		let delivery = if resolved.created {
			Delivery::NewContact { contact_id: resolved.contact.id }
		} else {
			self.deliver_tx(&mut tx, &resolved.contact).await?
		};

		tx.commit().await?;

		Ok(delivery)
	}

	/// Delivers pending matches for an existing contact.
	pub async fn deliver_for_contact(&self, contact: &Contact) -> Result<Delivery> {
		let mut tx = self.db.pool.begin().await?;
		let delivery = self.deliver_tx(&mut tx, contact).await?;

		tx.commit().await?;

		Ok(delivery)
	}

	async fn deliver_tx(&self, conn: &mut PgConnection, contact: &Contact) -> Result<Delivery> {
		let max_demands = i64::from(self.cfg.matching.max_demands_per_contact);
		let max_matches = i64::from(self.cfg.matching.max_matches_per_demand);
		let demands = queries::recent_demands_for_contact(conn, contact.id, max_demands).await?;

		if demands.is_empty() {
			return Ok(Delivery::NoRequests {
				contact_id: contact.id,
				message: NO_REQUESTS_GUIDANCE.to_string(),
			});
		}

		let mut entries = Entries::default();
		let mut delivered = 0_u64;

		for demand in &demands {
			self.matcher.compute(conn, demand.id).await?;

			let matches = queries::claim_unsent_matches(conn, demand.id, max_matches).await?;

			if matches.is_empty() {
				continue;
			}

			let match_ids = matches.iter().map(|m| m.id).collect::<Vec<_>>();
			let supply_ids = matches.iter().map(|m| m.supply_id).collect::<Vec<_>>();
			let supplies = queries::supplies_by_ids(conn, &supply_ids).await?;
			let lines = supply_lines(&supply_ids, supplies);

			// A demand whose matched supplies are all unreachable aborts the whole run.
			if lines.is_empty() {
				return Err(Error::not_found(NO_NEW_RESULTS));
			}

			let key = demand_key(demand)?;

			delivered += queries::mark_matches_sent(conn, &match_ids).await?;

			entries.insert(key, delivery::supply_listing(lines));
		}

		if entries.is_empty() {
			return Err(Error::not_found(NO_NEW_RESULTS));
		}

		tracing::info!(
			contact_id = %contact.id,
			demands = demands.len(),
			delivered,
			"Matches delivered."
		);

		Ok(Delivery::Results { contact_id: contact.id, entries: entries.entries })
	}
}

fn demand_key(demand: &Demand) -> Result<String> {
	delivery::demand_key([
		demand.resource.as_deref(),
		demand.category.as_deref(),
		demand.location.as_deref(),
		demand.phone.as_deref(),
	])
	.ok_or_else(|| Error::validation(INVALID_REQUEST))
}

/// Renders contactable supplies in match order (newest match first).
fn supply_lines(order: &[Uuid], supplies: Vec<Supply>) -> Vec<String> {
	let mut by_id = supplies.into_iter().map(|supply| (supply.id, supply)).collect::<HashMap<_, _>>();

	order
		.iter()
		.filter_map(|id| by_id.remove(id))
		.filter_map(|supply| {
			let phone = supply.phone.as_deref()?;

			if !delivery::is_contactable_phone(Some(phone)) {
				return None;
			}

			Some(delivery::supply_line(supply.title.as_deref(), phone))
		})
		.collect()
}
