use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tokio::sync::mpsc;

use crate::models::settings::ProfileSettings;
use crate::models::views::ViewCounter;

/// Row-change notification, tagged by the table it came from
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "table", content = "new", rename_all = "snake_case")]
pub enum ProfileEvent {
    ProfileSettings(ProfileSettings),
    ProfileViews(ViewCounter),
}

struct Subscriber {
    id: u64,
    sender: mpsc::UnboundedSender<ProfileEvent>,
}

/// Fan-out hub for per-profile change events. Publishers (settings store,
/// view tracker) push committed changes; each subscriber holds a
/// `Subscription` that unregisters itself on drop.
#[derive(Clone, Default)]
pub struct SubscriptionManager {
    // Map: profile_id -> subscribers
    subscribers: Arc<Mutex<HashMap<i64, Vec<Subscriber>>>>,
    next_id: Arc<AtomicU64>,
}

impl SubscriptionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a change subscription for one profile
    pub fn subscribe(&self, profile_id: i64) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        self.subscribers
            .lock()
            .unwrap()
            .entry(profile_id)
            .or_default()
            .push(Subscriber { id, sender: tx });
        tracing::debug!("Subscriber {} attached to profile {}", id, profile_id);

        Subscription {
            profile_id,
            id,
            receiver: rx,
            manager: self.clone(),
        }
    }

    /// Deliver an event to every live subscriber of a profile. Events
    /// published from a single call site arrive per-subscriber in
    /// publication order (unbounded channels preserve send order).
    pub fn publish(&self, profile_id: i64, event: ProfileEvent) {
        let mut subscribers = self.subscribers.lock().unwrap();
        if let Some(entries) = subscribers.get_mut(&profile_id) {
            entries.retain(|s| s.sender.send(event.clone()).is_ok());
            if entries.is_empty() {
                subscribers.remove(&profile_id);
            }
        }
    }

    /// Number of live subscribers for a profile
    pub fn subscriber_count(&self, profile_id: i64) -> usize {
        self.subscribers
            .lock()
            .unwrap()
            .get(&profile_id)
            .map_or(0, Vec::len)
    }

    fn remove(&self, profile_id: i64, id: u64) {
        let mut subscribers = self.subscribers.lock().unwrap();
        if let Some(entries) = subscribers.get_mut(&profile_id) {
            entries.retain(|s| s.id != id);
            if entries.is_empty() {
                subscribers.remove(&profile_id);
            }
        }
        tracing::debug!("Subscriber {} detached from profile {}", id, profile_id);
    }
}

/// Live update channel for one profile. Dropping the handle closes the
/// channel and removes the subscriber, so teardown cannot leak.
pub struct Subscription {
    profile_id: i64,
    id: u64,
    receiver: mpsc::UnboundedReceiver<ProfileEvent>,
    manager: SubscriptionManager,
}

impl Subscription {
    pub fn profile_id(&self) -> i64 {
        self.profile_id
    }

    /// Next committed change, or `None` once the channel is closed
    pub async fn next_event(&mut self) -> Option<ProfileEvent> {
        self.receiver.recv().await
    }

    /// Non-blocking poll, mainly for tests
    pub fn try_next(&mut self) -> Option<ProfileEvent> {
        self.receiver.try_recv().ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.manager.remove(self.profile_id, self.id);
    }
}
