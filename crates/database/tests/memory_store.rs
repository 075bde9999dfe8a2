use chrono::NaiveDate;
use core_types::{GoalMetric, MetricField, Platform};
use database::{InMemorySnapshotStore, SnapshotStore};
use rust_decimal_macros::dec;
use uuid::Uuid;

const CLIENT: &str = "7b0e7f9e-3c57-4a53-9d55-0d7f3a1b2c01";
const OTHER_CLIENT: &str = "5a1f0c2d-8e3b-4f6a-9b7c-1d2e3f4a5b6c";

fn fixture() -> String {
    format!(
        r#"{{
        "snapshots": [
            {{
                "id": "00000000-0000-0000-0000-000000000001",
                "client_id": "{CLIENT}",
                "integration_id": "00000000-0000-0000-0000-0000000000a1",
                "platform": "woocommerce",
                "metric_type": "daily_summary",
                "date": "2025-01-05",
                "metrics": {{"revenue": "120.50", "orders": 3}},
                "created_at": "2025-01-05T08:00:00Z"
            }},
            {{
                "id": "00000000-0000-0000-0000-000000000002",
                "client_id": "{CLIENT}",
                "integration_id": "00000000-0000-0000-0000-0000000000a2",
                "platform": "facebook_ads",
                "metric_type": "daily_summary",
                "date": "2025-01-05",
                "metrics": {{"spend": 40, "impressions": 1000}},
                "created_at": "2025-01-05T09:00:00Z"
            }},
            {{
                "id": "00000000-0000-0000-0000-000000000003",
                "client_id": "{CLIENT}",
                "integration_id": "00000000-0000-0000-0000-0000000000a3",
                "platform": "myspace",
                "metric_type": "daily_summary",
                "date": "2025-01-05",
                "metrics": {{}},
                "created_at": "2025-01-05T09:00:00Z"
            }},
            {{
                "id": "00000000-0000-0000-0000-000000000004",
                "client_id": "{CLIENT}",
                "integration_id": "00000000-0000-0000-0000-0000000000a1",
                "platform": "woocommerce",
                "metric_type": "daily_summary",
                "date": "2025-02-01",
                "metrics": {{"revenue": 99}},
                "created_at": "2025-02-01T08:00:00Z"
            }},
            {{
                "id": "00000000-0000-0000-0000-000000000005",
                "client_id": "{OTHER_CLIENT}",
                "integration_id": "00000000-0000-0000-0000-0000000000b1",
                "platform": "woocommerce",
                "metric_type": "daily_summary",
                "date": "2025-01-05",
                "metrics": {{"revenue": 10}},
                "created_at": "2025-01-05T08:00:00Z"
            }}
        ],
        "expenses": {{ "{CLIENT}": "1500" }},
        "goals": [
            {{
                "id": "00000000-0000-0000-0000-0000000000c1",
                "client_id": "{CLIENT}",
                "metric_type": "revenue",
                "target_value": "10000",
                "period": "monthly",
                "start_date": "2025-01-01",
                "end_date": "2025-01-31",
                "label": "January revenue",
                "status": "active"
            }}
        ]
    }}"#
    )
}

fn client() -> Uuid {
    CLIENT.parse().unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn query_filters_by_client_and_date_and_skips_unknown_platforms() {
    let store = InMemorySnapshotStore::from_json(&fixture()).unwrap();

    let snapshots = store
        .query_snapshots(client(), date(2025, 1, 1), date(2025, 1, 31), None)
        .await
        .unwrap();

    assert_eq!(snapshots.len(), 2);
    assert!(snapshots.iter().all(|s| s.client_id == client()));
    assert!(snapshots.iter().all(|s| s.date == date(2025, 1, 5)));
}

#[tokio::test]
async fn query_respects_platform_filter() {
    let store = InMemorySnapshotStore::from_json(&fixture()).unwrap();

    let snapshots = store
        .query_snapshots(
            client(),
            date(2025, 1, 1),
            date(2025, 2, 28),
            Some(&[Platform::WooCommerce][..]),
        )
        .await
        .unwrap();

    assert_eq!(snapshots.len(), 2);
    assert!(snapshots.iter().all(|s| s.platform() == Platform::WooCommerce));
    let january = snapshots.iter().find(|s| s.date == date(2025, 1, 5)).unwrap();
    assert_eq!(january.metrics.value(MetricField::Revenue), dec!(120.50));
    assert_eq!(january.metrics.value(MetricField::Orders), dec!(3));
}

#[tokio::test]
async fn expenses_default_to_zero() {
    let store = InMemorySnapshotStore::from_json(&fixture()).unwrap();

    assert_eq!(store.get_monthly_expenses(client()).await.unwrap(), dec!(1500));
    assert_eq!(
        store.get_monthly_expenses(OTHER_CLIENT.parse().unwrap()).await.unwrap(),
        dec!(0)
    );
}

#[tokio::test]
async fn goals_are_scoped_to_the_client() {
    let store = InMemorySnapshotStore::from_json(&fixture()).unwrap();

    let goals = store.get_goals(client()).await.unwrap();
    assert_eq!(goals.len(), 1);
    assert_eq!(goals[0].metric_type, GoalMetric::Revenue);
    assert_eq!(goals[0].target_value, dec!(10000));
    assert_eq!(goals[0].display_name(), "January revenue");
    assert!(goals[0].description.is_none());

    assert!(store.get_goals(OTHER_CLIENT.parse().unwrap()).await.unwrap().is_empty());
}

#[tokio::test]
async fn empty_fixture_is_an_empty_store() {
    let store = InMemorySnapshotStore::from_json("{}").unwrap();
    let snapshots = store
        .query_snapshots(client(), date(2025, 1, 1), date(2025, 12, 31), None)
        .await
        .unwrap();
    assert!(snapshots.is_empty());
    assert!(store.get_goals(client()).await.unwrap().is_empty());
}

#[tokio::test]
async fn malformed_fixture_is_an_error() {
    assert!(InMemorySnapshotStore::from_json("{\"snapshots\": 3}").is_err());
}
