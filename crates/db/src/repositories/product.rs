use chrono::Utc;
use sqlx::Row;

use shopsignal_core::domain::product::{Product, ProductId, ProductPatch};

use super::{parse_decimal, parse_timestamp, ProductRepository, RepositoryError};
use crate::DbPool;

pub struct SqlProductRepository {
    pool: DbPool,
}

impl SqlProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const SELECT_PRODUCTS: &str =
    "SELECT id, name, category, description, price, image, in_stock, created_at, updated_at
     FROM products";

fn row_to_product(row: &sqlx::sqlite::SqliteRow) -> Result<Product, RepositoryError> {
    let id: String = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let name: String = row.try_get("name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let category: String =
        row.try_get("category").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let description: String =
        row.try_get("description").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let price: String = row.try_get("price").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let image: Option<String> =
        row.try_get("image").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let in_stock: bool =
        row.try_get("in_stock").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let created_at: String =
        row.try_get("created_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let updated_at: String =
        row.try_get("updated_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    Ok(Product {
        id: ProductId(id),
        name,
        category,
        description,
        price: parse_decimal("price", &price)?,
        image,
        in_stock,
        created_at: parse_timestamp("created_at", &created_at)?,
        updated_at: parse_timestamp("updated_at", &updated_at)?,
    })
}

impl SqlProductRepository {
    async fn write(&self, product: &Product, replace: bool) -> Result<u64, RepositoryError> {
        let statement = if replace {
            "UPDATE products
             SET name = ?2, category = ?3, description = ?4, price = ?5, image = ?6,
                 in_stock = ?7, created_at = ?8, updated_at = ?9
             WHERE id = ?1"
        } else {
            "INSERT INTO products
                (id, name, category, description, price, image, in_stock, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(id) DO NOTHING"
        };

        let result = sqlx::query(statement)
            .bind(product.id.as_str())
            .bind(&product.name)
            .bind(&product.category)
            .bind(&product.description)
            .bind(product.price.to_string())
            .bind(&product.image)
            .bind(product.in_stock)
            .bind(product.created_at.to_rfc3339())
            .bind(product.updated_at.to_rfc3339())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait::async_trait]
impl ProductRepository for SqlProductRepository {
    async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query(&format!("{SELECT_PRODUCTS} ORDER BY created_at ASC, id ASC"))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_product).collect()
    }

    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query(&format!("{SELECT_PRODUCTS} WHERE id = ?"))
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_product).transpose()
    }

    async fn insert(&self, product: Product) -> Result<Product, RepositoryError> {
        if self.write(&product, false).await? == 0 {
            return Err(RepositoryError::AlreadyExists(format!("product `{}`", product.id)));
        }
        Ok(product)
    }

    async fn update(&self, id: &ProductId, patch: ProductPatch) -> Result<Product, RepositoryError> {
        let mut product = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("product `{id}`")))?;

        product.apply_patch(patch, Utc::now());
        if self.write(&product, true).await? == 0 {
            return Err(RepositoryError::NotFound(format!("product `{id}`")));
        }
        Ok(product)
    }

    async fn delete(&self, id: &ProductId) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("DELETE FROM products WHERE id = ?").bind(id.as_str()).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("product `{id}`")));
        }
        Ok(())
    }
}
