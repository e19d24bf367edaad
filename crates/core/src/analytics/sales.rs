use std::collections::BTreeMap;

use chrono::Datelike;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::sale::SalesRecord;

/// Headline numbers for the sales dashboard.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesSummary {
    pub total_orders: usize,
    pub total_quantity: u64,
    pub total_revenue: Decimal,
    /// Revenue per order, rounded to cents. Zero when there are no orders.
    pub average_order_value: Decimal,
}

impl SalesSummary {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a SalesRecord>) -> Self {
        let mut summary = Self::default();
        for record in records {
            summary.total_orders += 1;
            summary.total_quantity += u64::from(record.quantity);
            summary.total_revenue += record.total;
        }
        if summary.total_orders > 0 {
            summary.average_order_value =
                (summary.total_revenue / Decimal::from(summary.total_orders)).round_dp(2);
        }
        summary
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySales {
    /// `YYYY-MM`
    pub month: String,
    pub quantity: u64,
    pub revenue: Decimal,
    pub orders: usize,
}

/// Per-month totals in chronological order.
pub fn monthly_breakdown<'a>(records: impl IntoIterator<Item = &'a SalesRecord>) -> Vec<MonthlySales> {
    let mut months: BTreeMap<(i32, u32), MonthlySales> = BTreeMap::new();
    for record in records {
        let key = (record.date.year(), record.date.month());
        let entry = months.entry(key).or_insert_with(|| MonthlySales {
            month: format!("{:04}-{:02}", key.0, key.1),
            quantity: 0,
            revenue: Decimal::ZERO,
            orders: 0,
        });
        entry.quantity += u64::from(record.quantity);
        entry.revenue += record.total;
        entry.orders += 1;
    }
    months.into_values().collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalesDimension {
    Region,
    PaymentMethod,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueShare {
    pub label: String,
    pub revenue: Decimal,
    pub orders: usize,
}

/// Revenue grouped by region or payment method, largest first.
pub fn revenue_by<'a>(
    records: impl IntoIterator<Item = &'a SalesRecord>,
    dimension: SalesDimension,
) -> Vec<RevenueShare> {
    let mut groups: BTreeMap<&str, RevenueShare> = BTreeMap::new();
    for record in records {
        let label = match dimension {
            SalesDimension::Region => record.region.as_str(),
            SalesDimension::PaymentMethod => record.payment_method.as_str(),
        };
        let entry = groups.entry(label).or_insert_with(|| RevenueShare {
            label: label.to_owned(),
            revenue: Decimal::ZERO,
            orders: 0,
        });
        entry.revenue += record.total;
        entry.orders += 1;
    }

    let mut shares: Vec<RevenueShare> = groups.into_values().collect();
    shares.sort_by(|left, right| right.revenue.cmp(&left.revenue));
    shares
}

/// Lines whose product name matches exactly; `None` keeps everything.
pub fn filter_by_product_name<'a>(
    records: &'a [SalesRecord],
    product_name: Option<&'a str>,
) -> impl Iterator<Item = &'a SalesRecord> + 'a {
    records.iter().filter(move |record| {
        product_name.map(|name| record.product_name == name).unwrap_or(true)
    })
}
