//! Engagement scoring: point values, normalization and dashboard summaries.

mod normalize;
mod points;
mod summary;

pub use normalize::{ScoreNormalizer, DEFAULT_MAX_SCORE_THRESHOLD};
pub use points::PointTable;
pub use summary::{rank_by_normalized, EngagementSummary, EngagementTier};

/// Seconds a cart item may sit untouched before it counts as abandoned.
pub const DEFAULT_ABANDON_TIMEOUT_SECS: u64 = 30;

/// Hover dwell that earns a `hover_2s` event.
pub const DEFAULT_HOVER_SHORT_SECS: u64 = 2;

/// Hover dwell that earns a `hover_5s` event.
pub const DEFAULT_HOVER_LONG_SECS: u64 = 5;
