//! Dashboard aggregates over the sales history.

mod sales;

pub use sales::{
    filter_by_product_name, monthly_breakdown, revenue_by, MonthlySales, RevenueShare,
    SalesDimension, SalesSummary,
};
