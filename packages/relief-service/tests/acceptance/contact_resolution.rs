use std::{collections::HashSet, sync::Arc};

use tokio::sync::Barrier;
use uuid::Uuid;

use relief_service::{ContactHints, ReliefService};

const CALLERS: usize = 8;

/// Starts `CALLERS` resolutions of `hints` at once and returns the contact ids they saw and how
/// many of them reported creating the contact.
async fn resolve_concurrently(
	service: &Arc<ReliefService>,
	hints: ContactHints,
) -> (HashSet<Uuid>, usize) {
	let barrier = Arc::new(Barrier::new(CALLERS));
	let mut handles = Vec::with_capacity(CALLERS);

	for _ in 0..CALLERS {
		let service = service.clone();
		let barrier = barrier.clone();
		let hints = hints.clone();

		handles.push(tokio::spawn(async move {
			barrier.wait().await;

			service.resolve_contact(&hints).await
		}));
	}

	let mut ids = HashSet::new();
	let mut created = 0;

	for handle in handles {
		let resolved =
			handle.await.expect("Resolution task panicked.").expect("Resolution failed.");

		created += usize::from(resolved.created);
		ids.insert(resolved.contact.id);
	}

	(ids, created)
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set RELIEF_PG_DSN to run."]
async fn repeated_resolution_returns_the_same_contact() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping repeated_resolution_returns_the_same_contact; {}", super::SKIP_REASON);

		return;
	};
	let service = super::build_service(&test_db).await;
	let hints = super::telegram("777");
	let first = service.resolve_contact(&hints).await.expect("First resolution failed.");
	let second = service.resolve_contact(&hints).await.expect("Second resolution failed.");

	assert!(first.created);
	assert!(!second.created);
	assert_eq!(first.contact.id, second.contact.id);
	assert!(first.contact.bot_activated);
	assert_eq!(super::count_rows(&service.db.pool, "contacts").await, 1);

	let other_source = service
		.resolve_contact(&ContactHints::new("sms", Some("777".to_string()), None))
		.await
		.expect("Resolution for another source failed.");

	assert!(other_source.created);
	assert_ne!(other_source.contact.id, first.contact.id);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set RELIEF_PG_DSN to run."]
async fn handle_only_hints_resolve_by_handle() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping handle_only_hints_resolve_by_handle; {}", super::SKIP_REASON);

		return;
	};
	let service = super::build_service(&test_db).await;
	let hints = ContactHints::new("telegram", None, Some("relief_bob".to_string()));
	let created = service.resolve_contact(&hints).await.expect("Resolution failed.");
	let found = service.resolve_contact(&hints).await.expect("Resolution failed.");

	assert!(created.created);
	assert_eq!(found.contact.id, created.contact.id);
	assert_eq!(found.contact.external_user_id, None);
	assert_eq!(found.contact.external_handle.as_deref(), Some("relief_bob"));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set RELIEF_PG_DSN to run."]
async fn missing_identity_creates_nothing() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping missing_identity_creates_nothing; {}", super::SKIP_REASON);

		return;
	};
	let service = super::build_service(&test_db).await;
	let err = service
		.resolve_contact(&ContactHints::new("telegram", None, None))
		.await
		.expect_err("Expected missing identity.");

	assert_eq!(err.to_string(), "Not enough contact information.");
	assert_eq!(super::count_rows(&service.db.pool, "contacts").await, 0);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "Requires external Postgres. Set RELIEF_PG_DSN to run."]
async fn racing_resolutions_converge_on_one_contact() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping racing_resolutions_converge_on_one_contact; {}", super::SKIP_REASON);

		return;
	};
	let service = Arc::new(super::build_service(&test_db).await);

	for round in 0..5 {
		let (ids, created) =
			resolve_concurrently(&service, super::telegram(&format!("race-{round}"))).await;

		assert_eq!(ids.len(), 1, "round {round} resolved to several contacts");
		assert_eq!(created, 1, "round {round} created {created} contacts");

		let handle = ContactHints::new("telegram", None, Some(format!("racer_{round}")));
		let (ids, created) = resolve_concurrently(&service, handle).await;

		assert_eq!(ids.len(), 1, "round {round} resolved a handle to several contacts");
		assert_eq!(created, 1, "round {round} created {created} handle contacts");
	}

	assert_eq!(super::count_rows(&service.db.pool, "contacts").await, 10);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
