use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use shopsignal_core::domain::product::{Product, ProductId, ProductPatch};
use shopsignal_core::errors::ApplicationError;
use shopsignal_db::repositories::{ProductRepository, RepositoryError};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("product `{0}` was not found")]
    NotFound(ProductId),
    #[error("product `{0}` already exists")]
    AlreadyExists(ProductId),
    #[error("invalid product: {0}")]
    Validation(String),
    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<CatalogError> for ApplicationError {
    fn from(error: CatalogError) -> Self {
        match error {
            CatalogError::NotFound(_) => ApplicationError::NotFound(error.to_string()),
            CatalogError::AlreadyExists(_) => ApplicationError::Conflict(error.to_string()),
            CatalogError::Validation(message) => ApplicationError::Domain(
                shopsignal_core::errors::DomainError::InvariantViolation(message),
            ),
            CatalogError::Repository(inner) => inner.into(),
        }
    }
}

/// Product fields supplied when adding to the catalog; timestamps are set
/// by the service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default = "in_stock_default")]
    pub in_stock: bool,
}

fn in_stock_default() -> bool {
    true
}

#[derive(Clone)]
pub struct CatalogService {
    products: Arc<dyn ProductRepository>,
}

impl CatalogService {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }

    pub async fn list(&self) -> Result<Vec<Product>, CatalogError> {
        self.products.list_all().await.map_err(CatalogError::Repository)
    }

    pub async fn get(&self, id: &ProductId) -> Result<Product, CatalogError> {
        self.products
            .find_by_id(id)
            .await
            .map_err(CatalogError::Repository)?
            .ok_or_else(|| CatalogError::NotFound(id.clone()))
    }

    pub async fn add(&self, draft: ProductDraft) -> Result<Product, CatalogError> {
        let now = Utc::now();
        let product = Product {
            id: draft.id,
            name: draft.name,
            category: draft.category,
            description: draft.description,
            price: draft.price,
            image: draft.image,
            in_stock: draft.in_stock,
            created_at: now,
            updated_at: now,
        };
        product.validate().map_err(|error| CatalogError::Validation(error.to_string()))?;

        let id = product.id.clone();
        let stored = self.products.insert(product).await.map_err(|error| match error {
            RepositoryError::AlreadyExists(_) => CatalogError::AlreadyExists(id.clone()),
            other => CatalogError::Repository(other),
        })?;
        info!(event_name = "catalog.product.added", product_id = %stored.id, "product added");
        Ok(stored)
    }

    pub async fn update(&self, id: &ProductId, patch: ProductPatch) -> Result<Product, CatalogError> {
        if patch.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(CatalogError::Validation("product name must not be empty".to_owned()));
        }
        if patch.price.is_some_and(|price| price.is_sign_negative()) {
            return Err(CatalogError::Validation("product price must not be negative".to_owned()));
        }

        let updated = self.products.update(id, patch).await.map_err(|error| match error {
            RepositoryError::NotFound(_) => CatalogError::NotFound(id.clone()),
            other => CatalogError::Repository(other),
        })?;
        info!(event_name = "catalog.product.updated", product_id = %id, "product updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: &ProductId) -> Result<(), CatalogError> {
        self.products.delete(id).await.map_err(|error| match error {
            RepositoryError::NotFound(_) => CatalogError::NotFound(id.clone()),
            other => CatalogError::Repository(other),
        })?;
        info!(event_name = "catalog.product.deleted", product_id = %id, "product deleted");
        Ok(())
    }
}
