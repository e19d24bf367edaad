use chrono::Utc;
use sqlx::Row;
use uuid::Uuid;

use shopsignal_core::domain::event::{EventMetadata, EventType, InteractionEvent, NewInteractionEvent};
use shopsignal_core::domain::product::ProductId;

use super::{parse_timestamp, InteractionEventRepository, RepositoryError};
use crate::DbPool;

pub struct SqlInteractionEventRepository {
    pool: DbPool,
}

impl SqlInteractionEventRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const SELECT_EVENTS: &str = "SELECT id, product_id, event_type, session_id, user_id, timestamp, metadata_json
     FROM interaction_events";

fn row_to_event(row: &sqlx::sqlite::SqliteRow) -> Result<InteractionEvent, RepositoryError> {
    let id: String = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let product_id: String =
        row.try_get("product_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let event_type: String =
        row.try_get("event_type").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let session_id: String =
        row.try_get("session_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let user_id: Option<String> =
        row.try_get("user_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let timestamp: String =
        row.try_get("timestamp").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let metadata_json: Option<String> =
        row.try_get("metadata_json").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let event_type = event_type
        .parse::<EventType>()
        .map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let metadata = metadata_json
        .map(|raw| serde_json::from_str::<EventMetadata>(&raw))
        .transpose()
        .map_err(|e| RepositoryError::Decode(format!("metadata_json: {e}")))?;

    Ok(InteractionEvent {
        id,
        product_id: ProductId(product_id),
        event_type,
        session_id,
        user_id,
        timestamp: parse_timestamp("timestamp", &timestamp)?,
        metadata,
    })
}

#[async_trait::async_trait]
impl InteractionEventRepository for SqlInteractionEventRepository {
    async fn append(
        &self,
        event: NewInteractionEvent,
    ) -> Result<InteractionEvent, RepositoryError> {
        let stored = event.into_event(Uuid::new_v4().to_string(), Utc::now());
        let metadata_json = stored
            .metadata
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| RepositoryError::Decode(format!("metadata_json: {e}")))?;

        sqlx::query(
            "INSERT INTO interaction_events
                (id, product_id, event_type, session_id, user_id, timestamp, metadata_json)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&stored.id)
        .bind(stored.product_id.as_str())
        .bind(stored.event_type.as_str())
        .bind(&stored.session_id)
        .bind(&stored.user_id)
        .bind(stored.timestamp.to_rfc3339())
        .bind(&metadata_json)
        .execute(&self.pool)
        .await?;

        Ok(stored)
    }

    async fn list_for_product(
        &self,
        product_id: &ProductId,
    ) -> Result<Vec<InteractionEvent>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "{SELECT_EVENTS} WHERE product_id = ? ORDER BY timestamp ASC, rowid ASC"
        ))
        .bind(product_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_event).collect()
    }

    async fn list_all(&self) -> Result<Vec<InteractionEvent>, RepositoryError> {
        let rows = sqlx::query(&format!("{SELECT_EVENTS} ORDER BY timestamp ASC, rowid ASC"))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_event).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde_json::json;

    use shopsignal_core::domain::event::{EventType, NewInteractionEvent};
    use shopsignal_core::domain::product::ProductId;

    use super::SqlInteractionEventRepository;
    use crate::repositories::{InteractionEventRepository, RepositoryError};
    use crate::{connect_with_settings, migrations};

    async fn setup() -> SqlInteractionEventRepository {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        SqlInteractionEventRepository::new(pool)
    }

    #[tokio::test]
    async fn append_assigns_id_and_round_trips_metadata() {
        let repo = setup().await;
        let mut metadata = BTreeMap::new();
        metadata.insert("clickSource".to_owned(), json!("product_card"));

        let stored = repo
            .append(
                NewInteractionEvent::new(ProductId::from("p1"), EventType::ProductClick, "s1")
                    .with_user(Some("u1".to_owned()))
                    .with_metadata(Some(metadata.clone())),
            )
            .await
            .expect("append");

        assert!(!stored.id.is_empty());
        let listed = repo.list_for_product(&ProductId::from("p1")).await.expect("list");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, stored.id);
        assert_eq!(listed[0].user_id.as_deref(), Some("u1"));
        assert_eq!(listed[0].metadata, Some(metadata));
    }

    #[tokio::test]
    async fn list_for_product_filters_other_products() {
        let repo = setup().await;
        for product in ["p1", "p2", "p1"] {
            repo.append(NewInteractionEvent::new(ProductId::from(product), EventType::Hover2s, "s1"))
                .await
                .expect("append");
        }

        assert_eq!(repo.list_for_product(&ProductId::from("p1")).await.expect("list").len(), 2);
        assert_eq!(repo.list_all().await.expect("list all").len(), 3);
    }

    #[tokio::test]
    async fn malformed_rows_surface_decode_errors() {
        let repo = setup().await;
        sqlx::query(
            "INSERT INTO interaction_events (id, product_id, event_type, session_id, timestamp)
             VALUES ('bad', 'p1', 'hover_2s', 's1', 'yesterday')",
        )
        .execute(&repo.pool)
        .await
        .expect("insert malformed row");

        let result = repo.list_all().await;
        assert!(matches!(result, Err(RepositoryError::Decode(_))));
    }
}
