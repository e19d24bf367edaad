use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;

use shopsignal_core::domain::event::EventType;
use shopsignal_core::domain::product::ProductId;
use shopsignal_core::scoring::{DEFAULT_HOVER_LONG_SECS, DEFAULT_HOVER_SHORT_SECS};

use crate::tracker::EngagementTracker;

/// Turns hover dwell time into `hover_2s` / `hover_5s` events.
///
/// Each milestone fires at most once per hover; ending the hover cancels
/// whatever has not fired yet.
#[derive(Clone)]
pub struct HoverTracker {
    tracker: EngagementTracker,
    short_dwell: Duration,
    long_dwell: Duration,
    active: Arc<Mutex<HashMap<ProductId, JoinHandle<()>>>>,
}

impl HoverTracker {
    pub fn new(tracker: EngagementTracker) -> Self {
        Self::with_dwell(
            tracker,
            Duration::from_secs(DEFAULT_HOVER_SHORT_SECS),
            Duration::from_secs(DEFAULT_HOVER_LONG_SECS),
        )
    }

    /// `short_dwell` must be shorter than `long_dwell`; config validation
    /// enforces this for configured values.
    pub fn with_dwell(tracker: EngagementTracker, short_dwell: Duration, long_dwell: Duration) -> Self {
        Self { tracker, short_dwell, long_dwell, active: Arc::new(Mutex::new(HashMap::new())) }
    }

    pub fn hover_started(&self, product_id: ProductId) {
        let started = Instant::now();
        let short_deadline = started + self.short_dwell;
        let long_deadline = started + self.long_dwell;
        let tracker = self.tracker.clone();
        let target = product_id.clone();

        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = active.remove(&product_id) {
            previous.abort();
        }

        // Aborting this task only cancels the sleeps; fired milestones run
        // on their own task so a started write always completes.
        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(short_deadline).await;
            tracker.track_event(target.clone(), EventType::Hover2s, None, None);
            tokio::time::sleep_until(long_deadline).await;
            tracker.track_event(target, EventType::Hover5s, None, None);
        });
        active.insert(product_id, handle);
    }

    /// Cancels unfired milestones. Returns whether a hover was in progress.
    pub fn hover_ended(&self, product_id: &ProductId) -> bool {
        let removed = self.active.lock().unwrap_or_else(PoisonError::into_inner).remove(product_id);
        match removed {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    pub fn is_hovering(&self, product_id: &ProductId) -> bool {
        self.active.lock().unwrap_or_else(PoisonError::into_inner).contains_key(product_id)
    }
}
