use serde_json::{Value, json};

use relief_service::{RecordKind, ReliefService, search};

async fn seed_supplies(service: &ReliefService) {
	let alice = super::seed_user(&service.db.pool, "alice").await;
	let rows = [
		("Depot A", true, "2021-05-02T08:00:00Z"),
		("Depot B", true, "2021-05-04T08:00:00Z"),
		("Depot C", true, "2021-05-03T08:00:00Z"),
		("Depot D", false, "2021-05-05T08:00:00Z"),
		("Depot E", false, "2021-04-20T08:00:00Z"),
	];

	for (title, verified, verified_on) in rows {
		service
			.put(
				RecordKind::Supply,
				super::attrs(&[
					("title", json!(title)),
					("resource", json!("oxygen")),
					("verified", json!(verified)),
					("last_verified_on", json!(verified_on)),
				]),
				alice,
			)
			.await
			.expect("Failed to seed supply.");
	}
}

fn titles(items: &[serde_json::Map<String, Value>]) -> Vec<&str> {
	items.iter().filter_map(|item| item.get("title").and_then(Value::as_str)).collect()
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set RELIEF_PG_DSN to run."]
async fn verified_after_with_limit_returns_best_ranked_rows() {
	let Some(test_db) = super::test_db().await else {
		eprintln!(
			"Skipping verified_after_with_limit_returns_best_ranked_rows; {}",
			super::SKIP_REASON
		);

		return;
	};
	let service = super::build_service(&test_db).await;

	seed_supplies(&service).await;

	let items = service
		.search(
			RecordKind::Supply,
			search::string_params([("verified_after", "2021-05-01"), ("limit", "2")]),
		)
		.await
		.expect("Search failed.");

	assert_eq!(titles(&items), vec!["Depot B", "Depot C"]);
	assert!(items.iter().all(|item| item.get("verified") == Some(&json!(true))));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set RELIEF_PG_DSN to run."]
async fn unlimited_search_is_fully_ranked() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping unlimited_search_is_fully_ranked; {}", super::SKIP_REASON);

		return;
	};
	let service = super::build_service(&test_db).await;

	seed_supplies(&service).await;

	let all = service
		.search(RecordKind::Supply, search::string_params([("resource", "oxygen")]))
		.await
		.expect("Search failed.");

	assert_eq!(titles(&all), vec!["Depot B", "Depot C", "Depot A", "Depot D", "Depot E"]);

	let top = service
		.search(RecordKind::Supply, search::string_params([("limit", "3")]))
		.await
		.expect("Search failed.");

	assert_eq!(titles(&top), titles(&all[..3]));

	let none = service
		.search(RecordKind::Supply, search::string_params([("resource", "beds")]))
		.await
		.expect("Search failed.");

	assert!(none.is_empty());

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set RELIEF_PG_DSN to run."]
async fn invalid_queries_are_rejected() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping invalid_queries_are_rejected; {}", super::SKIP_REASON);

		return;
	};
	let service = super::build_service(&test_db).await;
	let bad_timestamp = service
		.search(RecordKind::Demand, search::string_params([("after", "yesterday-ish")]))
		.await
		.expect_err("Expected invalid timestamp.");

	assert_eq!(bad_timestamp.kind(), "validation");

	let bad_limit = service
		.search(RecordKind::Demand, search::string_params([("limit", "0")]))
		.await
		.expect_err("Expected invalid limit.");

	assert_eq!(bad_limit.kind(), "validation");

	let unknown_column = service
		.search(RecordKind::Volunteer, search::string_params([("colour", "red")]))
		.await
		.expect_err("Expected unknown column.");

	assert_eq!(unknown_column.kind(), "storage");

	let unranked = service
		.search(RecordKind::Matches, search::string_params([("verified_after", "2021-05-01")]))
		.await
		.expect_err("Expected matches to reject verified_after.");

	assert_eq!(unranked.kind(), "validation");

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set RELIEF_PG_DSN to run."]
async fn demands_filter_by_request_time() {
	let Some(test_db) = super::test_db().await else {
		eprintln!("Skipping demands_filter_by_request_time; {}", super::SKIP_REASON);

		return;
	};
	let service = super::build_service(&test_db).await;
	let alice = super::seed_user(&service.db.pool, "alice").await;

	for (resource, requested_at) in
		[("beds", "2021-04-30 10:00:00"), ("oxygen", "2021-05-02 10:00:00")]
	{
		service
			.put(
				RecordKind::Demand,
				super::attrs(&[
					("resource", json!(resource)),
					("location", json!("City X")),
					("requested_at", json!(requested_at)),
				]),
				alice,
			)
			.await
			.expect("Failed to seed demand.");
	}

	let recent = service
		.search(
			RecordKind::Demand,
			search::string_params([("after", "2021-05-01"), ("location", "City X")]),
		)
		.await
		.expect("Search failed.");

	assert_eq!(recent.len(), 1);
	assert_eq!(recent[0].get("resource"), Some(&json!("oxygen")));

	let older = service
		.search(RecordKind::Demand, search::string_params([("before", "2021-05-01")]))
		.await
		.expect("Search failed.");

	assert_eq!(older.len(), 1);
	assert_eq!(older[0].get("resource"), Some(&json!("beds")));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
