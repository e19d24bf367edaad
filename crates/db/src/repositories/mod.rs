use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use shopsignal_core::domain::event::{EventType, InteractionEvent, NewInteractionEvent};
use shopsignal_core::domain::product::{Product, ProductId, ProductPatch};
use shopsignal_core::domain::sale::SalesRecord;
use shopsignal_core::domain::score::ProductScore;
use shopsignal_core::errors::ApplicationError;
use shopsignal_core::scoring::ScoreNormalizer;

pub mod event;
pub mod memory;
pub mod product;
pub mod sales;
pub mod score;

pub use event::SqlInteractionEventRepository;
pub use memory::{
    InMemoryInteractionEventRepository, InMemoryProductRepository,
    InMemoryProductScoreRepository, InMemorySalesRepository,
};
pub use product::SqlProductRepository;
pub use sales::SqlSalesRepository;
pub use score::SqlProductScoreRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("already exists: {0}")]
    AlreadyExists(String),
}

impl From<RepositoryError> for ApplicationError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound(message) => ApplicationError::NotFound(message),
            RepositoryError::AlreadyExists(message) => ApplicationError::Conflict(message),
            other => ApplicationError::Persistence(other.to_string()),
        }
    }
}

/// Append-only log of storefront interactions.
#[async_trait]
pub trait InteractionEventRepository: Send + Sync {
    /// Stores the event, assigning a fresh id and the insert timestamp.
    async fn append(&self, event: NewInteractionEvent)
        -> Result<InteractionEvent, RepositoryError>;

    async fn list_for_product(
        &self,
        product_id: &ProductId,
    ) -> Result<Vec<InteractionEvent>, RepositoryError>;

    async fn list_all(&self) -> Result<Vec<InteractionEvent>, RepositoryError>;
}

/// One engagement score per product, keyed by product id.
#[async_trait]
pub trait ProductScoreRepository: Send + Sync {
    async fn find_by_id(&self, product_id: &ProductId)
        -> Result<Option<ProductScore>, RepositoryError>;

    async fn list_all(&self) -> Result<Vec<ProductScore>, RepositoryError>;

    /// Counts one `event_type` for the product and adds `points` to its raw
    /// score, creating the record on first use. The increment and the
    /// normalized score it implies are written atomically, so concurrent
    /// callers never lose an update.
    async fn apply_event(
        &self,
        product_id: &ProductId,
        event_type: EventType,
        points: i64,
        normalizer: &ScoreNormalizer,
    ) -> Result<ProductScore, RepositoryError>;

    /// Overwrites the normalized score and refreshes `last_updated`.
    async fn set_normalized(
        &self,
        product_id: &ProductId,
        normalized_score: f64,
    ) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait SalesRepository: Send + Sync {
    /// Every sales line, newest first.
    async fn list_all_by_date_desc(&self) -> Result<Vec<SalesRecord>, RepositoryError>;
    async fn insert(&self, record: SalesRecord) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn list_all(&self) -> Result<Vec<Product>, RepositoryError>;
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError>;
    async fn insert(&self, product: Product) -> Result<Product, RepositoryError>;
    async fn update(&self, id: &ProductId, patch: ProductPatch)
        -> Result<Product, RepositoryError>;
    async fn delete(&self, id: &ProductId) -> Result<(), RepositoryError>;
}

pub(crate) fn parse_timestamp(column: &str, raw: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|value| value.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Decode(format!("{column}: {e}")))
}

pub(crate) fn parse_decimal(column: &str, raw: &str) -> Result<Decimal, RepositoryError> {
    Decimal::from_str(raw).map_err(|e| RepositoryError::Decode(format!("{column}: {e}")))
}

pub(crate) fn parse_count(column: &str, raw: i64) -> Result<u64, RepositoryError> {
    u64::try_from(raw).map_err(|_| RepositoryError::Decode(format!("{column}: negative count {raw}")))
}
