use sqlx::Row;

use shopsignal_core::domain::product::ProductId;
use shopsignal_core::domain::sale::SalesRecord;

use super::{parse_decimal, parse_timestamp, RepositoryError, SalesRepository};
use crate::DbPool;

pub struct SqlSalesRepository {
    pool: DbPool,
}

impl SqlSalesRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_sale(row: &sqlx::sqlite::SqliteRow) -> Result<SalesRecord, RepositoryError> {
    let id: String = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let buyer: String = row.try_get("buyer").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let date: String = row.try_get("date").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let product_id: String =
        row.try_get("product_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let product_name: String =
        row.try_get("product_name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let price: String = row.try_get("price").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let quantity: i64 =
        row.try_get("quantity").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let total: String = row.try_get("total").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let region: String =
        row.try_get("region").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let payment_method: String =
        row.try_get("payment_method").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let quantity = u32::try_from(quantity)
        .map_err(|_| RepositoryError::Decode(format!("quantity: out of range {quantity}")))?;

    Ok(SalesRecord {
        id,
        buyer,
        date: parse_timestamp("date", &date)?,
        product_id: ProductId(product_id),
        product_name,
        price: parse_decimal("price", &price)?,
        quantity,
        total: parse_decimal("total", &total)?,
        region,
        payment_method,
    })
}

#[async_trait::async_trait]
impl SalesRepository for SqlSalesRepository {
    async fn list_all_by_date_desc(&self) -> Result<Vec<SalesRecord>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, buyer, date, product_id, product_name, price, quantity, total,
                    region, payment_method
             FROM sales
             ORDER BY date DESC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_sale).collect()
    }

    async fn insert(&self, record: SalesRecord) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO sales
                (id, buyer, date, product_id, product_name, price, quantity, total,
                 region, payment_method)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO NOTHING",
        )
        .bind(&record.id)
        .bind(&record.buyer)
        .bind(record.date.to_rfc3339())
        .bind(record.product_id.as_str())
        .bind(&record.product_name)
        .bind(record.price.to_string())
        .bind(i64::from(record.quantity))
        .bind(record.total.to_string())
        .bind(&record.region)
        .bind(&record.payment_method)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::AlreadyExists(format!("sales record `{}`", record.id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use shopsignal_core::domain::product::ProductId;
    use shopsignal_core::domain::sale::SalesRecord;

    use super::SqlSalesRepository;
    use crate::repositories::{RepositoryError, SalesRepository};
    use crate::{connect_with_settings, migrations};

    fn sale(id: &str, day: u32) -> SalesRecord {
        SalesRecord {
            id: id.to_owned(),
            buyer: "u1".to_owned(),
            date: Utc.with_ymd_and_hms(2024, 3, day, 10, 30, 0).single().expect("valid date"),
            product_id: ProductId::from(id),
            product_name: format!("Item {id}"),
            price: Decimal::new(1999, 2),
            quantity: 2,
            total: Decimal::new(3998, 2),
            region: "north".to_owned(),
            payment_method: "card".to_owned(),
        }
    }

    #[tokio::test]
    async fn sales_are_listed_newest_first_with_exact_prices() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        let repo = SqlSalesRepository::new(pool);

        repo.insert(sale("a", 1)).await.expect("insert a");
        repo.insert(sale("c", 20)).await.expect("insert c");
        repo.insert(sale("b", 9)).await.expect("insert b");

        let listed = repo.list_all_by_date_desc().await.expect("list");
        let ids: Vec<&str> = listed.iter().map(|record| record.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
        assert_eq!(listed[0].price, Decimal::new(1999, 2));
        assert_eq!(listed[0].total, Decimal::new(3998, 2));
        assert_eq!(listed[0], sale("c", 20));
    }

    #[tokio::test]
    async fn duplicate_sale_ids_are_rejected() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        let repo = SqlSalesRepository::new(pool);

        repo.insert(sale("a", 1)).await.expect("insert");
        let again = repo.insert(sale("a", 1)).await;

        assert!(matches!(again, Err(RepositoryError::AlreadyExists(_))));
    }
}
