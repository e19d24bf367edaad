use std::sync::Arc;

use serde::Serialize;

use shopsignal_core::analytics::{
    filter_by_product_name, monthly_breakdown, revenue_by, MonthlySales, RevenueShare,
    SalesDimension, SalesSummary,
};
use shopsignal_db::repositories::{RepositoryError, SalesRepository};

/// Dashboard view of the sales history, optionally narrowed to one product.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SalesReport {
    pub product_name: Option<String>,
    pub summary: SalesSummary,
    pub monthly: Vec<MonthlySales>,
    pub by_region: Vec<RevenueShare>,
    pub by_payment_method: Vec<RevenueShare>,
}

#[derive(Clone)]
pub struct SalesReportService {
    sales: Arc<dyn SalesRepository>,
}

impl SalesReportService {
    pub fn new(sales: Arc<dyn SalesRepository>) -> Self {
        Self { sales }
    }

    pub async fn report(&self, product_name: Option<&str>) -> Result<SalesReport, RepositoryError> {
        let records = self.sales.list_all_by_date_desc().await?;
        let selected: Vec<_> = filter_by_product_name(&records, product_name).collect();

        Ok(SalesReport {
            product_name: product_name.map(str::to_owned),
            summary: SalesSummary::from_records(selected.iter().copied()),
            monthly: monthly_breakdown(selected.iter().copied()),
            by_region: revenue_by(selected.iter().copied(), SalesDimension::Region),
            by_payment_method: revenue_by(selected.iter().copied(), SalesDimension::PaymentMethod),
        })
    }
}
