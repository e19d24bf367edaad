use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use shopsignal_core::domain::event::{EventType, InteractionEvent, NewInteractionEvent};
use shopsignal_core::domain::product::{Product, ProductId, ProductPatch};
use shopsignal_core::domain::sale::SalesRecord;
use shopsignal_core::domain::score::ProductScore;
use shopsignal_core::scoring::ScoreNormalizer;

use super::{
    InteractionEventRepository, ProductRepository, ProductScoreRepository, RepositoryError,
    SalesRepository,
};

#[derive(Default)]
pub struct InMemoryInteractionEventRepository {
    events: RwLock<Vec<InteractionEvent>>,
}

#[async_trait::async_trait]
impl InteractionEventRepository for InMemoryInteractionEventRepository {
    async fn append(
        &self,
        event: NewInteractionEvent,
    ) -> Result<InteractionEvent, RepositoryError> {
        let stored = event.into_event(Uuid::new_v4().to_string(), Utc::now());
        let mut events = self.events.write().await;
        events.push(stored.clone());
        Ok(stored)
    }

    async fn list_for_product(
        &self,
        product_id: &ProductId,
    ) -> Result<Vec<InteractionEvent>, RepositoryError> {
        let events = self.events.read().await;
        Ok(events.iter().filter(|event| &event.product_id == product_id).cloned().collect())
    }

    async fn list_all(&self) -> Result<Vec<InteractionEvent>, RepositoryError> {
        let events = self.events.read().await;
        Ok(events.clone())
    }
}

#[derive(Default)]
pub struct InMemoryProductScoreRepository {
    scores: RwLock<HashMap<ProductId, ProductScore>>,
}

#[async_trait::async_trait]
impl ProductScoreRepository for InMemoryProductScoreRepository {
    async fn find_by_id(
        &self,
        product_id: &ProductId,
    ) -> Result<Option<ProductScore>, RepositoryError> {
        let scores = self.scores.read().await;
        Ok(scores.get(product_id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<ProductScore>, RepositoryError> {
        let scores = self.scores.read().await;
        Ok(scores.values().cloned().collect())
    }

    async fn apply_event(
        &self,
        product_id: &ProductId,
        event_type: EventType,
        points: i64,
        normalizer: &ScoreNormalizer,
    ) -> Result<ProductScore, RepositoryError> {
        // the write guard spans the whole read-modify-write
        let mut scores = self.scores.write().await;
        let now = Utc::now();
        let score = match scores.get_mut(product_id) {
            Some(existing) => {
                existing.apply(event_type, points, normalizer, now);
                existing.clone()
            }
            None => {
                let seeded =
                    ProductScore::seeded(product_id.clone(), event_type, points, normalizer, now);
                scores.insert(product_id.clone(), seeded.clone());
                seeded
            }
        };
        Ok(score)
    }

    async fn set_normalized(
        &self,
        product_id: &ProductId,
        normalized_score: f64,
    ) -> Result<(), RepositoryError> {
        let mut scores = self.scores.write().await;
        let score = scores
            .get_mut(product_id)
            .ok_or_else(|| RepositoryError::NotFound(format!("product score `{product_id}`")))?;
        score.normalized_score = normalized_score;
        score.last_updated = Utc::now();
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemorySalesRepository {
    records: RwLock<Vec<SalesRecord>>,
}

impl InMemorySalesRepository {
    pub fn with_records(records: Vec<SalesRecord>) -> Self {
        Self { records: RwLock::new(records) }
    }
}

#[async_trait::async_trait]
impl SalesRepository for InMemorySalesRepository {
    async fn list_all_by_date_desc(&self) -> Result<Vec<SalesRecord>, RepositoryError> {
        let records = self.records.read().await;
        let mut sorted = records.clone();
        sorted.sort_by(|left, right| right.date.cmp(&left.date).then_with(|| left.id.cmp(&right.id)));
        Ok(sorted)
    }

    async fn insert(&self, record: SalesRecord) -> Result<(), RepositoryError> {
        let mut records = self.records.write().await;
        if records.iter().any(|existing| existing.id == record.id) {
            return Err(RepositoryError::AlreadyExists(format!("sales record `{}`", record.id)));
        }
        records.push(record);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryProductRepository {
    products: RwLock<HashMap<ProductId, Product>>,
}

#[async_trait::async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let products = self.products.read().await;
        let mut listed: Vec<Product> = products.values().cloned().collect();
        listed.sort_by(|left, right| {
            left.created_at.cmp(&right.created_at).then_with(|| left.id.cmp(&right.id))
        });
        Ok(listed)
    }

    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let products = self.products.read().await;
        Ok(products.get(id).cloned())
    }

    async fn insert(&self, product: Product) -> Result<Product, RepositoryError> {
        let mut products = self.products.write().await;
        if products.contains_key(&product.id) {
            return Err(RepositoryError::AlreadyExists(format!("product `{}`", product.id)));
        }
        products.insert(product.id.clone(), product.clone());
        Ok(product)
    }

    async fn update(&self, id: &ProductId, patch: ProductPatch) -> Result<Product, RepositoryError> {
        let mut products = self.products.write().await;
        let product =
            products.get_mut(id).ok_or_else(|| RepositoryError::NotFound(format!("product `{id}`")))?;
        product.apply_patch(patch, Utc::now());
        Ok(product.clone())
    }

    async fn delete(&self, id: &ProductId) -> Result<(), RepositoryError> {
        let mut products = self.products.write().await;
        products
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::NotFound(format!("product `{id}`")))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use shopsignal_core::domain::event::{EventType, NewInteractionEvent};
    use shopsignal_core::domain::product::{Product, ProductId, ProductPatch};
    use shopsignal_core::domain::sale::SalesRecord;
    use shopsignal_core::scoring::{PointTable, ScoreNormalizer};

    use crate::repositories::{
        InMemoryInteractionEventRepository, InMemoryProductRepository,
        InMemoryProductScoreRepository, InMemorySalesRepository, InteractionEventRepository,
        ProductRepository, ProductScoreRepository, RepositoryError, SalesRepository,
    };

    #[tokio::test]
    async fn event_repo_assigns_unique_ids() {
        let repo = InMemoryInteractionEventRepository::default();
        let first = repo
            .append(NewInteractionEvent::new(ProductId::from("p1"), EventType::Hover5s, "s1"))
            .await
            .expect("append");
        let second = repo
            .append(NewInteractionEvent::new(ProductId::from("p1"), EventType::Hover5s, "s1"))
            .await
            .expect("append");

        assert_ne!(first.id, second.id);
        assert!(second.timestamp >= first.timestamp);
        assert_eq!(repo.list_for_product(&ProductId::from("p1")).await.expect("list").len(), 2);
    }

    #[tokio::test]
    async fn score_repo_keeps_raw_equal_to_weighted_counts() {
        let repo = InMemoryProductScoreRepository::default();
        let points = PointTable::default();
        let normalizer = ScoreNormalizer::default();
        let product = ProductId::from("p1");
        let events = [
            EventType::ProductClick,
            EventType::CartAbandon,
            EventType::AddToCart,
            EventType::Hover5s,
            EventType::CartAbandon,
        ];

        for event in events {
            repo.apply_event(&product, event, points.points(event), &normalizer).await.expect("apply");
        }

        let score = repo.find_by_id(&product).await.expect("find").expect("score");
        assert_eq!(score.event_counts.total(), events.len() as u64);
        assert!(score.is_consistent_with(&points));
    }

    #[tokio::test]
    async fn concurrent_updates_are_serialized() {
        let repo = Arc::new(InMemoryProductScoreRepository::default());
        let normalizer = ScoreNormalizer::default();

        let shared = Arc::clone(&repo);
        let handles: Vec<_> = (0..50)
            .map(move |_| {
                let repo = Arc::clone(&shared);
                tokio::spawn(async move {
                    repo.apply_event(&ProductId::from("hot"), EventType::Hover2s, 2, &normalizer)
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.expect("join").expect("apply");
        }

        let score = repo.find_by_id(&ProductId::from("hot")).await.expect("find").expect("score");
        assert_eq!(score.event_counts.hover_2s, 50);
        assert_eq!(score.raw_score, 100);
        assert_eq!(score.normalized_score, 50.0);
    }

    #[tokio::test]
    async fn sales_repo_orders_newest_first() {
        let sale = |id: &str, day: u32| SalesRecord {
            id: id.to_owned(),
            buyer: "u1".to_owned(),
            date: Utc.with_ymd_and_hms(2024, 5, day, 0, 0, 0).single().expect("valid date"),
            product_id: ProductId::from(id),
            product_name: id.to_owned(),
            price: Decimal::ONE,
            quantity: 1,
            total: Decimal::ONE,
            region: "west".to_owned(),
            payment_method: "card".to_owned(),
        };
        let repo = InMemorySalesRepository::with_records(vec![sale("old", 1), sale("new", 9)]);

        let listed = repo.list_all_by_date_desc().await.expect("list");
        assert_eq!(listed[0].id, "new");

        let duplicate = repo.insert(sale("old", 1)).await;
        assert!(matches!(duplicate, Err(RepositoryError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn product_repo_distinguishes_missing_and_duplicate() {
        let repo = InMemoryProductRepository::default();
        let now = Utc::now();
        let product = Product {
            id: ProductId::from(1),
            name: "Kettle".to_owned(),
            category: "kitchen".to_owned(),
            description: String::new(),
            price: Decimal::new(2500, 2),
            image: None,
            in_stock: true,
            created_at: now,
            updated_at: now,
        };

        repo.insert(product.clone()).await.expect("insert");
        assert!(matches!(repo.insert(product).await, Err(RepositoryError::AlreadyExists(_))));
        assert!(matches!(
            repo.update(&ProductId::from(2), ProductPatch::default()).await,
            Err(RepositoryError::NotFound(_))
        ));
        repo.delete(&ProductId::from(1)).await.expect("delete");
        assert!(matches!(repo.delete(&ProductId::from(1)).await, Err(RepositoryError::NotFound(_))));
    }
}
