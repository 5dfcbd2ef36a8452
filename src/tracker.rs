use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};

use crate::models::views::ViewEffect;
use crate::store::{StorageGateway, StorageResult};
use crate::ws::manager::{ProfileEvent, SubscriptionManager};

/// Advisory per-visitor recency record. The authoritative counter lives in
/// storage; this only suppresses repeat increments from the same visitor.
pub trait VisitStore: Send + Sync {
    fn last_visit(&self, visitor: &str, profile_id: i64) -> Option<DateTime<Utc>>;
    fn record_visit(&self, visitor: &str, profile_id: i64, at: DateTime<Utc>);
    /// Drops records older than `cutoff`. Entries at or past the cutoff can
    /// still suppress a visit and must be kept.
    fn prune_expired(&self, cutoff: DateTime<Utc>);
}

/// Process-local visit record
#[derive(Default)]
pub struct MemoryVisitStore {
    visits: Mutex<HashMap<(String, i64), DateTime<Utc>>>,
}

impl MemoryVisitStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VisitStore for MemoryVisitStore {
    fn last_visit(&self, visitor: &str, profile_id: i64) -> Option<DateTime<Utc>> {
        self.visits
            .lock()
            .unwrap()
            .get(&(visitor.to_string(), profile_id))
            .copied()
    }

    fn record_visit(&self, visitor: &str, profile_id: i64, at: DateTime<Utc>) {
        self.visits
            .lock()
            .unwrap()
            .insert((visitor.to_string(), profile_id), at);
    }

    fn prune_expired(&self, cutoff: DateTime<Utc>) {
        self.visits.lock().unwrap().retain(|_, at| *at >= cutoff);
    }
}

/// Per-(visitor, profile) locks handed out on demand and recycled once the
/// last holder lets go, so one slow increment never blocks unrelated
/// registrations.
#[derive(Default)]
struct VisitGates {
    inner: Mutex<HashMap<(String, i64), Arc<tokio::sync::Mutex<()>>>>,
}

impl VisitGates {
    fn checkout(&self, visitor: &str, profile_id: i64) -> Arc<tokio::sync::Mutex<()>> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .entry((visitor.to_string(), profile_id))
            .or_default()
            .clone()
    }

    fn release(&self, visitor: &str, profile_id: i64) {
        let mut inner = self.inner.lock().unwrap();
        let key = (visitor.to_string(), profile_id);
        // Only the map still holds the gate; no caller is waiting on it
        if inner.get(&key).is_some_and(|gate| Arc::strong_count(gate) == 1) {
            inner.remove(&key);
        }
    }
}

/// Decides whether a profile visit counts as a new view and issues the
/// atomic increment when it does.
///
/// Two simultaneous visits from different visitors both increment; that
/// imprecision is accepted rather than coordinated across clients.
#[derive(Clone)]
pub struct ViewTracker {
    gateway: Arc<dyn StorageGateway>,
    visits: Arc<dyn VisitStore>,
    events: SubscriptionManager,
    window: Duration,
    // Serializes check-then-increment per (visitor, profile) so rapid
    // duplicate calls from the same visitor cannot double count
    gates: Arc<VisitGates>,
}

impl ViewTracker {
    pub fn new(
        gateway: Arc<dyn StorageGateway>,
        visits: Arc<dyn VisitStore>,
        events: SubscriptionManager,
    ) -> Self {
        Self::with_window(gateway, visits, events, Duration::hours(24))
    }

    pub fn with_window(
        gateway: Arc<dyn StorageGateway>,
        visits: Arc<dyn VisitStore>,
        events: SubscriptionManager,
        window: Duration,
    ) -> Self {
        Self {
            gateway,
            visits,
            events,
            window,
            gates: Arc::new(VisitGates::default()),
        }
    }

    /// Registers a visit at `now`. Increments the counter unless this
    /// visitor was already counted within the suppression window; a gap
    /// exactly equal to the window still counts as recent.
    ///
    /// On increment failure the visit record is left untouched, so the
    /// next attempt is eligible again.
    pub async fn register_view(
        &self,
        profile_id: i64,
        visitor: &str,
        now: DateTime<Utc>,
    ) -> StorageResult<ViewEffect> {
        let gate = self.gates.checkout(visitor, profile_id);
        let result = {
            let _guard = gate.lock().await;
            self.register_locked(profile_id, visitor, now).await
        };
        drop(gate);
        self.gates.release(visitor, profile_id);
        result
    }

    async fn register_locked(
        &self,
        profile_id: i64,
        visitor: &str,
        now: DateTime<Utc>,
    ) -> StorageResult<ViewEffect> {
        // Records past the window can never suppress again; drop them so
        // the map does not grow with every unique visitor forever
        self.visits.prune_expired(now - self.window);

        if let Some(last) = self.visits.last_visit(visitor, profile_id) {
            if now - last <= self.window {
                tracing::debug!(
                    "Visitor {} already counted for profile {} within the window",
                    visitor,
                    profile_id
                );
                return Ok(ViewEffect {
                    incremented: false,
                    view_count: None,
                });
            }
        }

        let counter = self.gateway.increment_view_count(profile_id).await?;
        self.visits.record_visit(visitor, profile_id, now);
        tracing::info!(
            "Profile {} view count incremented to {}",
            profile_id,
            counter.view_count
        );

        let count = counter.view_count;
        self.events
            .publish(profile_id, ProfileEvent::ProfileViews(counter));

        Ok(ViewEffect {
            incremented: true,
            view_count: Some(count),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryGateway;

    #[test]
    fn prune_keeps_entries_at_the_cutoff() {
        let visits = MemoryVisitStore::new();
        let at = Utc::now();
        visits.record_visit("device-a", 1, at - Duration::hours(1));
        visits.record_visit("device-b", 1, at);

        visits.prune_expired(at);

        assert_eq!(visits.last_visit("device-a", 1), None);
        assert_eq!(visits.last_visit("device-b", 1), Some(at));
    }

    #[tokio::test]
    async fn gates_are_recycled_after_use() {
        let tracker = ViewTracker::new(
            Arc::new(MemoryGateway::new()),
            Arc::new(MemoryVisitStore::new()),
            SubscriptionManager::new(),
        );

        let now = Utc::now();
        for profile_id in 0..10 {
            tracker
                .register_view(profile_id, "device-a", now)
                .await
                .unwrap();
        }

        assert_eq!(tracker.gates.inner.lock().unwrap().len(), 0);
    }
}
