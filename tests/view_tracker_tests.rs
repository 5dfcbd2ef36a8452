use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use uuid::Uuid;

use linkbio::models::views::ViewCounter;
use linkbio::store::memory::MemoryGateway;
use linkbio::store::{
    SettingsRecord, SettingsWrite, StorageError, StorageGateway, StorageResult, UserRecord,
};
use linkbio::tracker::{MemoryVisitStore, ViewTracker, VisitStore};
use linkbio::ws::manager::{ProfileEvent, SubscriptionManager};

/// Gateway whose increment RPC always fails, for failure-path tests
struct FailingGateway;

#[async_trait]
impl StorageGateway for FailingGateway {
    async fn ping(&self) -> StorageResult<()> {
        Err(StorageError::Unavailable("down".to_string()))
    }

    async fn create_user(&self, _: &str, _: &str) -> StorageResult<UserRecord> {
        Err(StorageError::Unavailable("down".to_string()))
    }

    async fn find_user_by_email(&self, _: &str) -> StorageResult<Option<UserRecord>> {
        Err(StorageError::Unavailable("down".to_string()))
    }

    async fn find_user_by_id(&self, _: Uuid) -> StorageResult<Option<UserRecord>> {
        Err(StorageError::Unavailable("down".to_string()))
    }

    async fn load_settings(&self, _: Uuid) -> StorageResult<Option<SettingsRecord>> {
        Err(StorageError::Unavailable("down".to_string()))
    }

    async fn find_settings_by_username(&self, _: &str) -> StorageResult<Option<SettingsRecord>> {
        Err(StorageError::Unavailable("down".to_string()))
    }

    async fn username_taken(&self, _: &str, _: Uuid) -> StorageResult<bool> {
        Err(StorageError::Unavailable("down".to_string()))
    }

    async fn upsert_settings(&self, _: Uuid, _: &SettingsWrite) -> StorageResult<SettingsRecord> {
        Err(StorageError::Unavailable("down".to_string()))
    }

    async fn increment_view_count(&self, _: i64) -> StorageResult<ViewCounter> {
        Err(StorageError::Unavailable("down".to_string()))
    }

    async fn view_counter(&self, _: i64) -> StorageResult<Option<ViewCounter>> {
        Err(StorageError::Unavailable("down".to_string()))
    }

    async fn store_blob(&self, _: &str, _: Vec<u8>) -> StorageResult<String> {
        Err(StorageError::Unavailable("down".to_string()))
    }
}

fn tracker_with_gateway(
    gateway: Arc<dyn StorageGateway>,
) -> (ViewTracker, Arc<MemoryVisitStore>, SubscriptionManager) {
    let visits = Arc::new(MemoryVisitStore::new());
    let events = SubscriptionManager::new();
    let tracker = ViewTracker::new(gateway, visits.clone(), events.clone());
    (tracker, visits, events)
}

fn t0() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
}

#[tokio::test]
async fn first_visit_increments() {
    let (tracker, visits, _) = tracker_with_gateway(Arc::new(MemoryGateway::new()));

    let effect = tracker.register_view(1, "device-a", t0()).await.unwrap();
    assert!(effect.incremented);
    assert_eq!(effect.view_count, Some(1));
    assert_eq!(visits.last_visit("device-a", 1), Some(t0()));
}

#[tokio::test]
async fn immediate_repeat_is_suppressed() {
    let gateway = Arc::new(MemoryGateway::new());
    let (tracker, _, _) = tracker_with_gateway(gateway.clone());

    tracker.register_view(1, "device-a", t0()).await.unwrap();
    let effect = tracker
        .register_view(1, "device-a", t0() + Duration::seconds(1))
        .await
        .unwrap();

    assert!(!effect.incremented);
    assert_eq!(effect.view_count, None);

    let counter = gateway.view_counter(1).await.unwrap().unwrap();
    assert_eq!(counter.view_count, 1);
}

#[tokio::test]
async fn gap_equal_to_window_is_still_recent() {
    let gateway = Arc::new(MemoryGateway::new());
    let (tracker, _, _) = tracker_with_gateway(gateway.clone());

    tracker.register_view(1, "device-a", t0()).await.unwrap();
    let effect = tracker
        .register_view(1, "device-a", t0() + Duration::hours(24))
        .await
        .unwrap();

    assert!(!effect.incremented);
    assert_eq!(gateway.view_counter(1).await.unwrap().unwrap().view_count, 1);
}

#[tokio::test]
async fn visit_after_window_expiry_counts_again() {
    let gateway = Arc::new(MemoryGateway::new());
    let (tracker, visits, _) = tracker_with_gateway(gateway.clone());

    tracker.register_view(1, "device-a", t0()).await.unwrap();
    let later = t0() + Duration::hours(25);
    let effect = tracker.register_view(1, "device-a", later).await.unwrap();

    assert!(effect.incremented);
    assert_eq!(effect.view_count, Some(2));
    // Recency record moves to the new visit
    assert_eq!(visits.last_visit("device-a", 1), Some(later));
}

#[tokio::test]
async fn expired_records_are_dropped_by_later_visits() {
    let gateway = Arc::new(MemoryGateway::new());
    let (tracker, visits, _) = tracker_with_gateway(gateway.clone());

    tracker.register_view(1, "device-a", t0()).await.unwrap();

    // A visit past the window evicts device-a's stale record entirely
    let later = t0() + Duration::hours(25);
    tracker.register_view(1, "device-b", later).await.unwrap();

    assert_eq!(visits.last_visit("device-a", 1), None);
    assert_eq!(visits.last_visit("device-b", 1), Some(later));
}

#[tokio::test]
async fn records_inside_the_window_survive_pruning() {
    let gateway = Arc::new(MemoryGateway::new());
    let (tracker, visits, _) = tracker_with_gateway(gateway.clone());

    tracker.register_view(1, "device-a", t0()).await.unwrap();
    let later = t0() + Duration::hours(23);
    tracker.register_view(1, "device-b", later).await.unwrap();

    // Still within the window, so it must keep suppressing
    assert_eq!(visits.last_visit("device-a", 1), Some(t0()));
    let effect = tracker.register_view(1, "device-a", later).await.unwrap();
    assert!(!effect.incremented);
}

#[tokio::test]
async fn concurrent_distinct_visitors_both_count() {
    let gateway = Arc::new(MemoryGateway::new());
    let (tracker, _, _) = tracker_with_gateway(gateway.clone());

    let (a, b) = tokio::join!(
        tracker.register_view(1, "device-a", t0()),
        tracker.register_view(1, "device-b", t0()),
    );

    assert!(a.unwrap().incremented);
    assert!(b.unwrap().incremented);
    assert_eq!(gateway.view_counter(1).await.unwrap().unwrap().view_count, 2);
}

#[tokio::test]
async fn different_visitors_count_independently() {
    let gateway = Arc::new(MemoryGateway::new());
    let (tracker, _, _) = tracker_with_gateway(gateway.clone());

    tracker.register_view(1, "device-a", t0()).await.unwrap();
    let effect = tracker.register_view(1, "device-b", t0()).await.unwrap();

    assert!(effect.incremented);
    assert_eq!(gateway.view_counter(1).await.unwrap().unwrap().view_count, 2);
}

#[tokio::test]
async fn different_profiles_count_independently() {
    let gateway = Arc::new(MemoryGateway::new());
    let (tracker, _, _) = tracker_with_gateway(gateway.clone());

    tracker.register_view(1, "device-a", t0()).await.unwrap();
    let effect = tracker.register_view(2, "device-a", t0()).await.unwrap();

    assert!(effect.incremented);
    assert_eq!(gateway.view_counter(2).await.unwrap().unwrap().view_count, 1);
}

#[tokio::test]
async fn failed_increment_leaves_no_visit_record() {
    let (tracker, visits, _) = tracker_with_gateway(Arc::new(FailingGateway));

    let result = tracker.register_view(1, "device-a", t0()).await;
    assert!(matches!(result, Err(StorageError::Unavailable(_))));

    // No timestamp written, so the next attempt is still eligible
    assert_eq!(visits.last_visit("device-a", 1), None);
}

#[tokio::test]
async fn increment_publishes_view_event() {
    let (tracker, _, events) = tracker_with_gateway(Arc::new(MemoryGateway::new()));
    let mut subscription = events.subscribe(1);

    tracker.register_view(1, "device-a", t0()).await.unwrap();

    match subscription.next_event().await.unwrap() {
        ProfileEvent::ProfileViews(counter) => {
            assert_eq!(counter.profile_id, 1);
            assert_eq!(counter.view_count, 1);
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn suppressed_visit_publishes_nothing() {
    let (tracker, _, events) = tracker_with_gateway(Arc::new(MemoryGateway::new()));

    tracker.register_view(1, "device-a", t0()).await.unwrap();

    let mut subscription = events.subscribe(1);
    tracker
        .register_view(1, "device-a", t0() + Duration::minutes(5))
        .await
        .unwrap();

    assert!(subscription.try_next().is_none());
}

#[tokio::test]
async fn custom_window_is_honored() {
    let gateway = Arc::new(MemoryGateway::new());
    let visits = Arc::new(MemoryVisitStore::new());
    let tracker = ViewTracker::with_window(
        gateway.clone(),
        visits,
        SubscriptionManager::new(),
        Duration::minutes(1),
    );

    tracker.register_view(1, "device-a", t0()).await.unwrap();
    let effect = tracker
        .register_view(1, "device-a", t0() + Duration::minutes(2))
        .await
        .unwrap();

    assert!(effect.incremented);
    assert_eq!(gateway.view_counter(1).await.unwrap().unwrap().view_count, 2);
}
