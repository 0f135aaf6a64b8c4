pub mod contact;
pub mod kind;
pub mod matching;
pub mod mutation;
pub mod search;

mod error;

pub use contact::{ContactHints, ResolvedContact};
pub use error::{Error, Result};
pub use kind::RecordKind;
pub use matching::{Delivery, DeliveryEntry};
pub use mutation::{PutOp, PutResponse};

use std::{future::Future, pin::Pin, sync::Arc};

use sqlx::PgConnection;
use uuid::Uuid;

use relief_config::Config;
use relief_storage::{db::Db, queries};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Refreshes the `matches` rows of one demand.
///
/// Runs inside the caller's transaction. Implementations must be idempotent: refreshing a demand
/// twice without new supply must not add rows or touch the `sent` flag of existing ones.
pub trait MatchComputer
where
	Self: Send + Sync,
{
	fn compute<'a>(
		&'a self,
		conn: &'a mut PgConnection,
		demand_id: Uuid,
	) -> BoxFuture<'a, Result<()>>;
}

/// Delegates to the `compute_matches` function installed with the schema.
pub struct StoredProcedureMatcher;
impl MatchComputer for StoredProcedureMatcher {
	fn compute<'a>(
		&'a self,
		conn: &'a mut PgConnection,
		demand_id: Uuid,
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			let inserted = queries::compute_matches(conn, demand_id).await?;

			tracing::debug!(%demand_id, inserted, "Matches refreshed.");

			Ok(())
		})
	}
}

pub struct ReliefService {
	pub cfg: Config,
	pub db: Db,
	pub matcher: Arc<dyn MatchComputer>,
}
impl ReliefService {
	pub fn new(cfg: Config, db: Db) -> Self {
		Self { cfg, db, matcher: Arc::new(StoredProcedureMatcher) }
	}

	pub fn with_matcher(cfg: Config, db: Db, matcher: Arc<dyn MatchComputer>) -> Self {
		Self { cfg, db, matcher }
	}
}
