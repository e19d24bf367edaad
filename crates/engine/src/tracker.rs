//! Engagement tracking: interaction log plus per-product score accumulation.

use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use shopsignal_core::domain::event::{EventMetadata, EventType, NewInteractionEvent};
use shopsignal_core::domain::product::ProductId;
use shopsignal_core::domain::score::ProductScore;
use shopsignal_core::errors::ApplicationError;
use shopsignal_core::scoring::{rank_by_normalized, EngagementSummary, PointTable, ScoreNormalizer};
use shopsignal_db::repositories::{
    InteractionEventRepository, ProductScoreRepository, RepositoryError,
};

use crate::session::SessionContext;

#[derive(Debug, Error)]
pub enum TrackingError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<TrackingError> for ApplicationError {
    fn from(error: TrackingError) -> Self {
        match error {
            TrackingError::Repository(inner) => inner.into(),
        }
    }
}

/// Records interactions and keeps each product's score in step with them.
///
/// Cheap to clone; clones share repositories and session.
#[derive(Clone)]
pub struct EngagementTracker {
    inner: Arc<TrackerInner>,
}

struct TrackerInner {
    events: Arc<dyn InteractionEventRepository>,
    scores: Arc<dyn ProductScoreRepository>,
    points: PointTable,
    normalizer: ScoreNormalizer,
    session: SessionContext,
}

impl EngagementTracker {
    pub fn new(
        events: Arc<dyn InteractionEventRepository>,
        scores: Arc<dyn ProductScoreRepository>,
    ) -> Self {
        Self::with_settings(
            events,
            scores,
            PointTable::default(),
            ScoreNormalizer::default(),
            SessionContext::default(),
        )
    }

    pub fn with_settings(
        events: Arc<dyn InteractionEventRepository>,
        scores: Arc<dyn ProductScoreRepository>,
        points: PointTable,
        normalizer: ScoreNormalizer,
        session: SessionContext,
    ) -> Self {
        Self { inner: Arc::new(TrackerInner { events, scores, points, normalizer, session }) }
    }

    pub fn points(&self) -> &PointTable {
        &self.inner.points
    }

    pub fn normalizer(&self) -> &ScoreNormalizer {
        &self.inner.normalizer
    }

    pub fn session(&self) -> &SessionContext {
        &self.inner.session
    }

    /// Appends the event and applies its points to the product score.
    pub async fn record(
        &self,
        product_id: ProductId,
        event_type: EventType,
        user_id: Option<String>,
        metadata: Option<EventMetadata>,
    ) -> Result<ProductScore, TrackingError> {
        let event = NewInteractionEvent::new(product_id, event_type, self.inner.session.current())
            .with_user(user_id)
            .with_metadata(metadata);
        let stored = self.inner.events.append(event).await?;

        let score = self
            .inner
            .scores
            .apply_event(
                &stored.product_id,
                event_type,
                self.inner.points.points(event_type),
                &self.inner.normalizer,
            )
            .await?;

        debug!(
            event_name = "engagement.track.recorded",
            product_id = %score.product_id,
            event_type = %event_type,
            event_id = %stored.id,
            raw_score = score.raw_score,
            normalized_score = score.normalized_score,
            "interaction recorded"
        );
        Ok(score)
    }

    /// Like [`record`](Self::record), but failures are logged and dropped.
    pub async fn track(
        &self,
        product_id: ProductId,
        event_type: EventType,
        user_id: Option<String>,
        metadata: Option<EventMetadata>,
    ) {
        let label = product_id.clone();
        if let Err(error) = self.record(product_id, event_type, user_id, metadata).await {
            warn!(
                event_name = "engagement.track.failed",
                product_id = %label,
                event_type = %event_type,
                error = %error,
                "failed to track interaction"
            );
        }
    }

    /// Parses `event_name` first; unknown kinds are logged and dropped.
    pub async fn track_named(
        &self,
        product_id: ProductId,
        event_name: &str,
        user_id: Option<String>,
        metadata: Option<EventMetadata>,
    ) {
        match event_name.parse::<EventType>() {
            Ok(event_type) => self.track(product_id, event_type, user_id, metadata).await,
            Err(error) => warn!(
                event_name = "engagement.track.rejected",
                product_id = %product_id,
                error = %error,
                "dropping interaction with unknown event type"
            ),
        }
    }

    /// Fire-and-forget tracking on a background task.
    pub fn track_event(
        &self,
        product_id: ProductId,
        event_type: EventType,
        user_id: Option<String>,
        metadata: Option<EventMetadata>,
    ) -> JoinHandle<()> {
        let tracker = self.clone();
        tokio::spawn(async move { tracker.track(product_id, event_type, user_id, metadata).await })
    }

    pub async fn product_score(
        &self,
        product_id: &ProductId,
    ) -> Result<Option<ProductScore>, TrackingError> {
        Ok(self.inner.scores.find_by_id(product_id).await?)
    }

    pub async fn all_scores(&self) -> Result<Vec<ProductScore>, TrackingError> {
        Ok(self.inner.scores.list_all().await?)
    }

    /// Every score, highest normalized score first.
    pub async fn ranked_scores(&self) -> Result<Vec<ProductScore>, TrackingError> {
        let mut scores = self.all_scores().await?;
        rank_by_normalized(&mut scores);
        Ok(scores)
    }

    pub async fn summary(&self) -> Result<EngagementSummary, TrackingError> {
        let scores = self.all_scores().await?;
        Ok(EngagementSummary::from_scores(&scores))
    }

    /// Re-derives every normalized score from its stored raw score.
    pub async fn try_recalculate_all(&self) -> Result<usize, TrackingError> {
        let scores = self.inner.scores.list_all().await?;
        let mut rewritten = 0;
        for score in scores {
            let normalized = self.inner.normalizer.normalize(score.raw_score);
            self.inner.scores.set_normalized(&score.product_id, normalized).await?;
            rewritten += 1;
        }

        info!(
            event_name = "engagement.recalculate.completed",
            rewritten,
            max_score_threshold = self.inner.normalizer.threshold(),
            "normalized scores recalculated"
        );
        Ok(rewritten)
    }

    /// Best-effort recalculation; a failure is logged and reported as zero.
    pub async fn recalculate_all(&self) -> usize {
        match self.try_recalculate_all().await {
            Ok(rewritten) => rewritten,
            Err(error) => {
                warn!(
                    event_name = "engagement.recalculate.failed",
                    error = %error,
                    "failed to recalculate normalized scores"
                );
                0
            }
        }
    }
}
