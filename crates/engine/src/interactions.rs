use chrono::Utc;
use serde_json::Value;

use shopsignal_core::domain::event::{EventMetadata, EventType};
use shopsignal_core::domain::product::ProductId;

use crate::cart_timer::CartAbandonmentScheduler;
use crate::hover::HoverTracker;
use crate::tracker::EngagementTracker;

pub const CLICK_SOURCE_PRODUCT_CARD: &str = "product_card";
pub const REMOVAL_REASON_MANUAL: &str = "manual_removal";

/// Storefront-facing entry point that maps product card and cart gestures
/// onto tracked events, hover milestones and abandonment timers.
#[derive(Clone)]
pub struct InteractionRecorder {
    tracker: EngagementTracker,
    hover: HoverTracker,
    cart: CartAbandonmentScheduler,
}

impl InteractionRecorder {
    pub fn new(tracker: EngagementTracker, hover: HoverTracker, cart: CartAbandonmentScheduler) -> Self {
        Self { tracker, hover, cart }
    }

    pub fn tracker(&self) -> &EngagementTracker {
        &self.tracker
    }

    pub fn cart(&self) -> &CartAbandonmentScheduler {
        &self.cart
    }

    pub fn hover_started(&self, product_id: ProductId) {
        self.hover.hover_started(product_id);
    }

    pub fn hover_ended(&self, product_id: &ProductId) {
        self.hover.hover_ended(product_id);
    }

    /// Caller metadata is merged over the standard click fields.
    pub async fn product_clicked(
        &self,
        product_id: ProductId,
        user_id: Option<String>,
        metadata: Option<EventMetadata>,
    ) {
        let mut merged = EventMetadata::new();
        merged.insert("clickSource".to_owned(), Value::from(CLICK_SOURCE_PRODUCT_CARD));
        merged.insert("timestamp".to_owned(), now_value());
        merged.extend(metadata.unwrap_or_default());
        self.tracker.track(product_id, EventType::ProductClick, user_id, Some(merged)).await;
    }

    /// Tracks the add and (re)arms the abandonment timer.
    pub async fn added_to_cart(&self, product_id: ProductId, user_id: Option<String>) {
        self.cart.clear(&product_id);

        let mut metadata = EventMetadata::new();
        metadata.insert("addedAt".to_owned(), now_value());
        self.tracker.track(product_id.clone(), EventType::AddToCart, user_id, Some(metadata)).await;

        self.cart.start(product_id);
    }

    /// Caller metadata is merged over the standard removal fields.
    pub async fn removed_from_cart(
        &self,
        product_id: ProductId,
        user_id: Option<String>,
        metadata: Option<EventMetadata>,
    ) {
        let mut merged = EventMetadata::new();
        merged.insert("removedAt".to_owned(), now_value());
        merged.insert("reason".to_owned(), Value::from(REMOVAL_REASON_MANUAL));
        merged.extend(metadata.unwrap_or_default());

        self.cart.track_removal(product_id, user_id, Some(merged)).await;
    }

    pub fn purchased(&self, product_id: &ProductId) {
        self.cart.mark_purchased(product_id);
    }

    /// Cancels any hover milestones and cart timer for the product.
    pub fn dispose(&self, product_id: &ProductId) {
        self.hover.hover_ended(product_id);
        self.cart.clear(product_id);
    }
}

fn now_value() -> Value {
    Value::from(Utc::now().to_rfc3339())
}
