use chrono::Utc;
use sqlx::Row;

use shopsignal_core::domain::event::EventType;
use shopsignal_core::domain::product::ProductId;
use shopsignal_core::domain::score::{EventCounts, ProductScore};
use shopsignal_core::scoring::ScoreNormalizer;

use super::{parse_count, parse_timestamp, ProductScoreRepository, RepositoryError};
use crate::DbPool;

pub struct SqlProductScoreRepository {
    pool: DbPool,
}

impl SqlProductScoreRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const SELECT_SCORES: &str = "SELECT product_id, raw_score, normalized_score,
            hover_2s, hover_5s, product_click, add_to_cart, cart_abandon, last_updated
     FROM product_scores";

/// Counter column for an event type. Values come from a closed set, so they
/// are safe to splice into SQL.
fn count_column(event_type: EventType) -> &'static str {
    match event_type {
        EventType::Hover2s => "hover_2s",
        EventType::Hover5s => "hover_5s",
        EventType::ProductClick => "product_click",
        EventType::AddToCart => "add_to_cart",
        EventType::CartAbandon => "cart_abandon",
    }
}

fn row_to_score(row: &sqlx::sqlite::SqliteRow) -> Result<ProductScore, RepositoryError> {
    let product_id: String =
        row.try_get("product_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let raw_score: i64 =
        row.try_get("raw_score").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let normalized_score: f64 =
        row.try_get("normalized_score").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let last_updated: String =
        row.try_get("last_updated").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let mut event_counts = EventCounts::default();
    for event in EventType::ALL {
        let column = count_column(event);
        let value: i64 = row.try_get(column).map_err(|e| RepositoryError::Decode(e.to_string()))?;
        event_counts.add(event, parse_count(column, value)?);
    }

    Ok(ProductScore {
        product_id: ProductId(product_id),
        raw_score,
        normalized_score,
        event_counts,
        last_updated: parse_timestamp("last_updated", &last_updated)?,
    })
}

#[async_trait::async_trait]
impl ProductScoreRepository for SqlProductScoreRepository {
    async fn find_by_id(
        &self,
        product_id: &ProductId,
    ) -> Result<Option<ProductScore>, RepositoryError> {
        let row = sqlx::query(&format!("{SELECT_SCORES} WHERE product_id = ?"))
            .bind(product_id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_score).transpose()
    }

    async fn list_all(&self) -> Result<Vec<ProductScore>, RepositoryError> {
        let rows = sqlx::query(SELECT_SCORES).fetch_all(&self.pool).await?;
        rows.iter().map(row_to_score).collect()
    }

    async fn apply_event(
        &self,
        product_id: &ProductId,
        event_type: EventType,
        points: i64,
        normalizer: &ScoreNormalizer,
    ) -> Result<ProductScore, RepositoryError> {
        let column = count_column(event_type);
        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;

        sqlx::query(&format!(
            "INSERT INTO product_scores (product_id, raw_score, normalized_score, {column}, last_updated)
             VALUES (?1, ?2, 0, 1, ?3)
             ON CONFLICT(product_id) DO UPDATE SET
                raw_score = raw_score + excluded.raw_score,
                {column} = {column} + 1,
                last_updated = excluded.last_updated"
        ))
        .bind(product_id.as_str())
        .bind(points)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query(&format!("{SELECT_SCORES} WHERE product_id = ?"))
            .bind(product_id.as_str())
            .fetch_one(&mut *tx)
            .await?;
        let mut score = row_to_score(&row)?;
        score.normalized_score = normalizer.normalize(score.raw_score);

        sqlx::query("UPDATE product_scores SET normalized_score = ? WHERE product_id = ?")
            .bind(score.normalized_score)
            .bind(product_id.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(score)
    }

    async fn set_normalized(
        &self,
        product_id: &ProductId,
        normalized_score: f64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE product_scores SET normalized_score = ?, last_updated = ? WHERE product_id = ?",
        )
        .bind(normalized_score)
        .bind(Utc::now().to_rfc3339())
        .bind(product_id.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("product score `{product_id}`")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use shopsignal_core::domain::event::EventType;
    use shopsignal_core::domain::product::ProductId;
    use shopsignal_core::scoring::{PointTable, ScoreNormalizer};

    use super::SqlProductScoreRepository;
    use crate::repositories::{ProductScoreRepository, RepositoryError};
    use crate::{connect_with_settings, migrations};

    async fn setup() -> SqlProductScoreRepository {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        SqlProductScoreRepository::new(pool)
    }

    #[tokio::test]
    async fn apply_event_creates_then_increments() {
        let repo = setup().await;
        let points = PointTable::default();
        let normalizer = ScoreNormalizer::default();
        let product = ProductId::from("p1");

        for event in [EventType::Hover2s, EventType::Hover2s, EventType::AddToCart] {
            repo.apply_event(&product, event, points.points(event), &normalizer)
                .await
                .expect("apply");
        }

        let score = repo.find_by_id(&product).await.expect("find").expect("score exists");
        assert_eq!(score.raw_score, 19);
        assert_eq!(score.normalized_score, 15.97);
        assert_eq!(score.event_counts.hover_2s, 2);
        assert_eq!(score.event_counts.add_to_cart, 1);
        assert!(score.is_consistent_with(&points));
    }

    #[tokio::test]
    async fn concurrent_first_events_do_not_lose_increments() {
        let repo = Arc::new(setup().await);
        let normalizer = ScoreNormalizer::default();

        let mut handles = Vec::new();
        for _ in 0..20 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                repo.apply_event(&ProductId::from("fresh"), EventType::ProductClick, 8, &normalizer)
                    .await
            }));
        }
        for handle in handles {
            handle.await.expect("join").expect("apply");
        }

        let score = repo.find_by_id(&ProductId::from("fresh")).await.expect("find").expect("score");
        assert_eq!(score.event_counts.product_click, 20);
        assert_eq!(score.raw_score, 160);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn pooled_connections_do_not_lose_increments() {
        let dir = tempfile::tempdir().expect("tempdir");
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("scores.db").display());
        let pool = connect_with_settings(&url, 8, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        let repo = Arc::new(SqlProductScoreRepository::new(pool.clone()));
        let normalizer = ScoreNormalizer::default();

        let mut handles = Vec::new();
        for _ in 0..200 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                repo.apply_event(&ProductId::from("busy"), EventType::ProductClick, 8, &normalizer)
                    .await
            }));
        }
        for handle in handles {
            handle.await.expect("join").expect("apply");
        }

        let score = repo.find_by_id(&ProductId::from("busy")).await.expect("find").expect("score");
        assert_eq!(score.event_counts.product_click, 200);
        assert_eq!(score.raw_score, 1_600);
        assert_eq!(score.normalized_score, 94.12);
        pool.close().await;
    }

    #[tokio::test]
    async fn set_normalized_requires_an_existing_score() {
        let repo = setup().await;

        let missing = repo.set_normalized(&ProductId::from("ghost"), 10.0).await;
        assert!(matches!(missing, Err(RepositoryError::NotFound(_))));

        repo.apply_event(&ProductId::from("p1"), EventType::AddToCart, 15, &ScoreNormalizer::default())
            .await
            .expect("apply");
        repo.set_normalized(&ProductId::from("p1"), 42.5).await.expect("set");

        let all = repo.list_all().await.expect("list");
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].normalized_score, 42.5);
        assert_eq!(all[0].raw_score, 15);
    }
}
