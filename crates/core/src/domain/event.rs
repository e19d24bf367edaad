use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::product::ProductId;
use crate::errors::DomainError;

/// Free-form annotations attached to an interaction (click source, timestamps).
pub type EventMetadata = BTreeMap<String, serde_json::Value>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "hover_2s")]
    Hover2s,
    #[serde(rename = "hover_5s")]
    Hover5s,
    #[serde(rename = "product_click")]
    ProductClick,
    #[serde(rename = "add_to_cart")]
    AddToCart,
    #[serde(rename = "cart_abandon")]
    CartAbandon,
}

impl EventType {
    pub const ALL: [EventType; 5] = [
        EventType::Hover2s,
        EventType::Hover5s,
        EventType::ProductClick,
        EventType::AddToCart,
        EventType::CartAbandon,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Hover2s => "hover_2s",
            EventType::Hover5s => "hover_5s",
            EventType::ProductClick => "product_click",
            EventType::AddToCart => "add_to_cart",
            EventType::CartAbandon => "cart_abandon",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EventType {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        EventType::ALL
            .into_iter()
            .find(|event| event.as_str() == value.trim())
            .ok_or_else(|| DomainError::UnknownEventType(value.to_owned()))
    }
}

/// An interaction as submitted by the storefront, before the store assigns
/// an id and timestamp.
#[derive(Clone, Debug, PartialEq)]
pub struct NewInteractionEvent {
    pub product_id: ProductId,
    pub event_type: EventType,
    pub session_id: String,
    pub user_id: Option<String>,
    pub metadata: Option<EventMetadata>,
}

impl NewInteractionEvent {
    pub fn new(product_id: ProductId, event_type: EventType, session_id: impl Into<String>) -> Self {
        Self { product_id, event_type, session_id: session_id.into(), user_id: None, metadata: None }
    }

    /// Blank user ids are treated as anonymous.
    pub fn with_user(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id.filter(|value| !value.trim().is_empty());
        self
    }

    /// Empty metadata maps are dropped rather than stored.
    pub fn with_metadata(mut self, metadata: Option<EventMetadata>) -> Self {
        self.metadata = metadata.filter(|value| !value.is_empty());
        self
    }

    pub fn into_event(self, id: String, timestamp: DateTime<Utc>) -> InteractionEvent {
        InteractionEvent {
            id,
            product_id: self.product_id,
            event_type: self.event_type,
            session_id: self.session_id,
            user_id: self.user_id,
            timestamp,
            metadata: self.metadata,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InteractionEvent {
    pub id: String,
    pub product_id: ProductId,
    pub event_type: EventType,
    pub session_id: String,
    pub user_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub metadata: Option<EventMetadata>,
}
