use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::ProductId;

/// One historical purchase line. Treated as immutable once fetched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub id: String,
    pub buyer: String,
    pub date: DateTime<Utc>,
    pub product_id: ProductId,
    pub product_name: String,
    pub price: Decimal,
    pub quantity: u32,
    pub total: Decimal,
    pub region: String,
    pub payment_method: String,
}

impl SalesRecord {
    /// UTC calendar day of the purchase, ignoring time of day.
    pub fn purchase_day(&self) -> NaiveDate {
        self.date.date_naive()
    }
}
