use serde::{Deserialize, Serialize};

use crate::domain::event::EventType;
use crate::domain::score::{EventCounts, ProductScore};

/// Coarse bucket used when rendering a normalized score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementTier {
    /// 80 and above
    Hot,
    /// 60 to 79.99
    Warm,
    /// 40 to 59.99
    Cool,
    Cold,
}

impl EngagementTier {
    pub fn from_score(normalized_score: f64) -> Self {
        if normalized_score >= 80.0 {
            EngagementTier::Hot
        } else if normalized_score >= 60.0 {
            EngagementTier::Warm
        } else if normalized_score >= 40.0 {
            EngagementTier::Cool
        } else {
            EngagementTier::Cold
        }
    }
}

/// Totals across every scored product, as shown on the analytics dashboard.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EngagementSummary {
    pub products_scored: usize,
    pub totals: EventCounts,
    pub average_normalized_score: f64,
}

impl EngagementSummary {
    pub fn from_scores(scores: &[ProductScore]) -> Self {
        if scores.is_empty() {
            return Self::default();
        }

        let mut totals = EventCounts::default();
        for score in scores {
            for event in EventType::ALL {
                totals.add(event, score.event_counts.get(event));
            }
        }

        let sum: f64 = scores.iter().map(|score| score.normalized_score).sum();
        let average = (sum / scores.len() as f64 * 100.0).round() / 100.0;

        Self { products_scored: scores.len(), totals, average_normalized_score: average }
    }
}

/// Orders scores for ranking: highest normalized score first, product id
/// breaking ties so the order is stable across calls.
pub fn rank_by_normalized(scores: &mut [ProductScore]) {
    scores.sort_by(|left, right| {
        right
            .normalized_score
            .total_cmp(&left.normalized_score)
            .then_with(|| left.product_id.cmp(&right.product_id))
    });
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{rank_by_normalized, EngagementSummary, EngagementTier};
    use crate::domain::event::EventType;
    use crate::domain::product::ProductId;
    use crate::domain::score::ProductScore;
    use crate::scoring::{PointTable, ScoreNormalizer};

    fn score(id: &str, events: &[EventType]) -> ProductScore {
        let points = PointTable::default();
        let normalizer = ScoreNormalizer::default();
        let now = Utc::now();
        let mut iter = events.iter();
        let first = iter.next().expect("at least one event");
        let mut score =
            ProductScore::seeded(ProductId::from(id), *first, points.points(*first), &normalizer, now);
        for event in iter {
            score.apply(*event, points.points(*event), &normalizer, now);
        }
        score
    }

    #[test]
    fn tiers_follow_dashboard_thresholds() {
        assert_eq!(EngagementTier::from_score(95.0), EngagementTier::Hot);
        assert_eq!(EngagementTier::from_score(80.0), EngagementTier::Hot);
        assert_eq!(EngagementTier::from_score(60.0), EngagementTier::Warm);
        assert_eq!(EngagementTier::from_score(45.5), EngagementTier::Cool);
        assert_eq!(EngagementTier::from_score(0.0), EngagementTier::Cold);
    }

    #[test]
    fn summary_totals_every_event_type() {
        let scores = vec![
            score("a", &[EventType::Hover2s, EventType::AddToCart]),
            score("b", &[EventType::Hover2s, EventType::CartAbandon, EventType::ProductClick]),
        ];

        let summary = EngagementSummary::from_scores(&scores);

        assert_eq!(summary.products_scored, 2);
        assert_eq!(summary.totals.hover_2s, 2);
        assert_eq!(summary.totals.add_to_cart, 1);
        assert_eq!(summary.totals.cart_abandon, 1);
        assert_eq!(summary.totals.product_click, 1);
        assert_eq!(summary.totals.total(), 5);
    }

    #[test]
    fn empty_summary_is_zeroed() {
        assert_eq!(EngagementSummary::from_scores(&[]), EngagementSummary::default());
    }

    #[test]
    fn ranking_puts_highest_score_first_and_breaks_ties_by_id() {
        let mut scores = vec![
            score("b", &[EventType::Hover2s]),
            score("c", &[EventType::AddToCart]),
            score("a", &[EventType::Hover2s]),
        ];

        rank_by_normalized(&mut scores);

        let order: Vec<&str> = scores.iter().map(|s| s.product_id.as_str()).collect();
        assert_eq!(order, vec!["c", "a", "b"]);
    }
}
