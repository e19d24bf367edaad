use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use shopsignal_core::domain::event::{EventMetadata, EventType};
use shopsignal_core::domain::product::ProductId;
use shopsignal_core::scoring::DEFAULT_ABANDON_TIMEOUT_SECS;

use crate::tracker::EngagementTracker;

struct PendingTimer {
    generation: u64,
    handle: JoinHandle<()>,
}

/// Fires a `cart_abandon` event for products left in the cart past a timeout.
///
/// Each product has at most one pending timer. Starting again replaces the
/// previous timer, and removal or purchase cancels it. Timers live only in
/// memory and do not survive a restart.
#[derive(Clone)]
pub struct CartAbandonmentScheduler {
    tracker: EngagementTracker,
    timeout: Duration,
    timers: Arc<Mutex<HashMap<ProductId, PendingTimer>>>,
    generations: Arc<AtomicU64>,
}

impl CartAbandonmentScheduler {
    pub fn new(tracker: EngagementTracker) -> Self {
        Self::with_timeout(tracker, Duration::from_secs(DEFAULT_ABANDON_TIMEOUT_SECS))
    }

    pub fn with_timeout(tracker: EngagementTracker, timeout: Duration) -> Self {
        Self {
            tracker,
            timeout,
            timers: Arc::new(Mutex::new(HashMap::new())),
            generations: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Arms the abandonment timer for `product_id`, replacing any pending one.
    pub fn start(&self, product_id: ProductId) {
        let generation = self.generations.fetch_add(1, Ordering::Relaxed) + 1;
        // held until the new timer is registered so the task cannot observe a stale map
        let mut timers = self.timers.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(previous) = timers.remove(&product_id) {
            previous.handle.abort();
        }

        let handle = tokio::spawn(fire_at(
            self.tracker.clone(),
            Arc::clone(&self.timers),
            product_id.clone(),
            generation,
            Instant::now() + self.timeout,
        ));

        info!(
            event_name = "cart.timer.started",
            product_id = %product_id,
            timeout_secs = self.timeout.as_secs(),
            "cart abandonment timer started"
        );
        timers.insert(product_id, PendingTimer { generation, handle });
    }

    /// Cancels the pending timer, if any. Returns whether one was pending.
    pub fn clear(&self, product_id: &ProductId) -> bool {
        let removed = self.timers.lock().unwrap_or_else(PoisonError::into_inner).remove(product_id);
        match removed {
            Some(timer) => {
                timer.handle.abort();
                debug!(
                    event_name = "cart.timer.cleared",
                    product_id = %product_id,
                    "cart abandonment timer cleared"
                );
                true
            }
            None => false,
        }
    }

    /// Explicit removal from the cart: cancels the timer and records the
    /// abandonment immediately.
    pub async fn track_removal(
        &self,
        product_id: ProductId,
        user_id: Option<String>,
        metadata: Option<EventMetadata>,
    ) {
        self.clear(&product_id);
        self.tracker.track(product_id, EventType::CartAbandon, user_id, metadata).await;
    }

    /// Purchase completes the cart without any penalty.
    pub fn mark_purchased(&self, product_id: &ProductId) -> bool {
        self.clear(product_id)
    }

    pub fn is_pending(&self, product_id: &ProductId) -> bool {
        self.timers.lock().unwrap_or_else(PoisonError::into_inner).contains_key(product_id)
    }

    pub fn pending_count(&self) -> usize {
        self.timers.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Cancels every pending timer.
    pub fn shutdown(&self) {
        let drained: Vec<PendingTimer> = self
            .timers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
            .map(|(_, timer)| timer)
            .collect();
        for timer in drained {
            timer.handle.abort();
        }
    }
}

async fn fire_at(
    tracker: EngagementTracker,
    timers: Arc<Mutex<HashMap<ProductId, PendingTimer>>>,
    product_id: ProductId,
    generation: u64,
    deadline: Instant,
) {
    tokio::time::sleep_until(deadline).await;

    {
        let mut timers = timers.lock().unwrap_or_else(PoisonError::into_inner);
        match timers.get(&product_id) {
            Some(pending) if pending.generation == generation => {
                timers.remove(&product_id);
            }
            // replaced or cleared after this timer elapsed
            _ => return,
        }
    }

    info!(
        event_name = "cart.timer.fired",
        product_id = %product_id,
        "cart abandonment timer fired"
    );
    tracker.track(product_id, EventType::CartAbandon, None, None).await;
}
