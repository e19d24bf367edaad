use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::event::EventType;
use crate::domain::product::ProductId;
use crate::scoring::{PointTable, ScoreNormalizer};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCounts {
    #[serde(rename = "hover_2s")]
    pub hover_2s: u64,
    #[serde(rename = "hover_5s")]
    pub hover_5s: u64,
    pub product_click: u64,
    pub add_to_cart: u64,
    pub cart_abandon: u64,
}

impl EventCounts {
    pub fn get(&self, event: EventType) -> u64 {
        match event {
            EventType::Hover2s => self.hover_2s,
            EventType::Hover5s => self.hover_5s,
            EventType::ProductClick => self.product_click,
            EventType::AddToCart => self.add_to_cart,
            EventType::CartAbandon => self.cart_abandon,
        }
    }

    pub fn increment(&mut self, event: EventType) {
        self.add(event, 1);
    }

    pub fn add(&mut self, event: EventType, amount: u64) {
        let slot = match event {
            EventType::Hover2s => &mut self.hover_2s,
            EventType::Hover5s => &mut self.hover_5s,
            EventType::ProductClick => &mut self.product_click,
            EventType::AddToCart => &mut self.add_to_cart,
            EventType::CartAbandon => &mut self.cart_abandon,
        };
        *slot += amount;
    }

    pub fn total(&self) -> u64 {
        EventType::ALL.into_iter().map(|event| self.get(event)).sum()
    }

    /// Raw score these counts imply under `points`.
    pub fn weighted_sum(&self, points: &PointTable) -> i64 {
        EventType::ALL.into_iter().map(|event| points.points(event) * self.get(event) as i64).sum()
    }
}

/// Accumulated engagement for one product. One record per product id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductScore {
    pub product_id: ProductId,
    pub raw_score: i64,
    pub normalized_score: f64,
    pub event_counts: EventCounts,
    pub last_updated: DateTime<Utc>,
}

impl ProductScore {
    /// First score record for a product, carrying exactly one event.
    pub fn seeded(
        product_id: ProductId,
        event: EventType,
        points: i64,
        normalizer: &ScoreNormalizer,
        now: DateTime<Utc>,
    ) -> Self {
        let mut score = Self {
            product_id,
            raw_score: 0,
            normalized_score: 0.0,
            event_counts: EventCounts::default(),
            last_updated: now,
        };
        score.apply(event, points, normalizer, now);
        score
    }

    /// Counts one more `event`, adds its points and re-derives the normalized
    /// value from the new raw score.
    pub fn apply(
        &mut self,
        event: EventType,
        points: i64,
        normalizer: &ScoreNormalizer,
        now: DateTime<Utc>,
    ) {
        self.event_counts.increment(event);
        self.raw_score += points;
        self.normalized_score = normalizer.normalize(self.raw_score);
        self.last_updated = now;
    }

    pub fn renormalize(&mut self, normalizer: &ScoreNormalizer, now: DateTime<Utc>) {
        self.normalized_score = normalizer.normalize(self.raw_score);
        self.last_updated = now;
    }

    pub fn is_consistent_with(&self, points: &PointTable) -> bool {
        self.event_counts.weighted_sum(points) == self.raw_score
    }
}
