use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use shopsignal_core::domain::product::{Product, ProductId};
use shopsignal_core::domain::sale::SalesRecord;

use crate::connection::DbPool;
use crate::repositories::{
    ProductRepository, RepositoryError, SalesRepository, SqlProductRepository, SqlSalesRepository,
};

/// `(id, name, category, price in cents)`
const DEMO_PRODUCTS: &[(&str, &str, &str, i64)] = &[
    ("1", "Espresso Machine", "appliances", 24999),
    ("2", "Coffee Grinder", "appliances", 8950),
    ("3", "Milk Frother", "appliances", 3900),
    ("4", "Ceramic Mug Set", "kitchen", 2400),
    ("5", "Pour-Over Kettle", "kitchen", 5995),
    ("6", "Paper Filters", "supplies", 650),
];

/// `(buyer, year, month, day, hour, product id, quantity, region, payment method)`
const DEMO_SALES: &[(&str, i32, u32, u32, u32, &str, u32, &str, &str)] = &[
    ("alice", 2024, 1, 5, 9, "1", 1, "north", "card"),
    ("alice", 2024, 1, 5, 9, "2", 1, "north", "card"),
    ("bob", 2024, 1, 12, 14, "1", 1, "south", "paypal"),
    ("bob", 2024, 1, 12, 14, "2", 1, "south", "paypal"),
    ("bob", 2024, 1, 12, 15, "3", 1, "south", "paypal"),
    ("carol", 2024, 2, 3, 11, "5", 1, "east", "card"),
    ("carol", 2024, 2, 3, 11, "6", 3, "east", "card"),
    ("dave", 2024, 2, 17, 18, "5", 1, "west", "cash"),
    ("dave", 2024, 2, 17, 18, "6", 2, "west", "cash"),
    ("dave", 2024, 2, 17, 19, "4", 1, "west", "cash"),
    ("alice", 2024, 3, 2, 8, "1", 1, "north", "card"),
    ("alice", 2024, 3, 2, 8, "3", 2, "north", "card"),
    ("erin", 2024, 3, 9, 13, "4", 2, "south", "card"),
    ("frank", 2024, 3, 21, 20, "2", 1, "east", "paypal"),
    ("frank", 2024, 3, 21, 20, "6", 1, "east", "paypal"),
];

/// Deterministic storefront catalog and sales history.
///
/// With the default minimum frequency of 2 the history yields exactly three
/// bundles: `1-2`, `1-3` and `5-6`.
pub struct DemoDataset;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SeedResult {
    pub products_seeded: usize,
    pub sales_seeded: usize,
    /// Rows that were already present and left untouched.
    pub skipped: usize,
}

impl DemoDataset {
    pub fn products(now: DateTime<Utc>) -> Vec<Product> {
        DEMO_PRODUCTS
            .iter()
            .map(|(id, name, category, cents)| Product {
                id: ProductId::from(*id),
                name: (*name).to_owned(),
                category: (*category).to_owned(),
                description: format!("{name} from the demo catalog"),
                price: Decimal::new(*cents, 2),
                image: None,
                in_stock: true,
                created_at: now,
                updated_at: now,
            })
            .collect()
    }

    pub fn sales() -> Vec<SalesRecord> {
        DEMO_SALES
            .iter()
            .enumerate()
            .filter_map(
                |(index, (buyer, year, month, day, hour, product_id, quantity, region, payment))| {
                    let (_, name, _, cents) =
                        DEMO_PRODUCTS.iter().find(|(id, ..)| id == product_id)?;
                    let date = Utc.with_ymd_and_hms(*year, *month, *day, *hour, 0, 0).single()?;
                    let price = Decimal::new(*cents, 2);
                    Some(SalesRecord {
                        id: format!("sale-{:04}", index + 1),
                        buyer: (*buyer).to_owned(),
                        date,
                        product_id: ProductId::from(*product_id),
                        product_name: (*name).to_owned(),
                        price,
                        quantity: *quantity,
                        total: price * Decimal::from(*quantity),
                        region: (*region).to_owned(),
                        payment_method: (*payment).to_owned(),
                    })
                },
            )
            .collect()
    }

    /// Inserts the dataset. Re-running is safe: existing rows are skipped.
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let products = SqlProductRepository::new(pool.clone());
        let sales = SqlSalesRepository::new(pool.clone());
        let mut result = SeedResult::default();

        for product in Self::products(Utc::now()) {
            match products.insert(product).await {
                Ok(_) => result.products_seeded += 1,
                Err(RepositoryError::AlreadyExists(_)) => result.skipped += 1,
                Err(error) => return Err(error),
            }
        }

        for record in Self::sales() {
            match sales.insert(record).await {
                Ok(()) => result.sales_seeded += 1,
                Err(RepositoryError::AlreadyExists(_)) => result.skipped += 1,
                Err(error) => return Err(error),
            }
        }

        Ok(result)
    }
}
