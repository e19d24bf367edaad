use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error};

use shopsignal_core::bundles::{BundleAnalyzer, ProductPair, DEFAULT_MIN_FREQUENCY};
use shopsignal_core::errors::ApplicationError;
use shopsignal_db::repositories::{RepositoryError, SalesRepository};

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("failed to fetch sales history: {0}")]
    Fetch(#[source] RepositoryError),
}

impl From<BundleError> for ApplicationError {
    fn from(error: BundleError) -> Self {
        ApplicationError::Integration(error.to_string())
    }
}

/// Bundle suggestions computed fresh from the full sales history on every call.
#[derive(Clone)]
pub struct BundleService {
    sales: Arc<dyn SalesRepository>,
    analyzer: BundleAnalyzer,
    default_min_frequency: u32,
}

impl BundleService {
    pub fn new(sales: Arc<dyn SalesRepository>) -> Self {
        Self::with_analyzer(sales, BundleAnalyzer::default(), DEFAULT_MIN_FREQUENCY)
    }

    pub fn with_analyzer(
        sales: Arc<dyn SalesRepository>,
        analyzer: BundleAnalyzer,
        default_min_frequency: u32,
    ) -> Self {
        Self { sales, analyzer, default_min_frequency }
    }

    pub fn default_min_frequency(&self) -> u32 {
        self.default_min_frequency
    }

    /// Pairs bought together at least `min_frequency` times (the configured
    /// default when `None`), most frequent first.
    pub async fn suggestions(
        &self,
        min_frequency: Option<u32>,
    ) -> Result<Vec<ProductPair>, BundleError> {
        let min_frequency = min_frequency.unwrap_or(self.default_min_frequency);
        let sales = self.sales.list_all_by_date_desc().await.map_err(|source| {
            error!(
                event_name = "bundles.fetch.failed",
                error = %source,
                "failed to fetch sales for bundle analysis"
            );
            BundleError::Fetch(source)
        })?;

        let bundles = self.analyzer.analyze(&sales, min_frequency);
        debug!(
            event_name = "bundles.analysis.completed",
            sales = sales.len(),
            bundles = bundles.len(),
            min_frequency,
            "bundle analysis completed"
        );
        Ok(bundles)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use shopsignal_core::bundles::BundleAnalyzer;
    use shopsignal_core::domain::product::ProductId;
    use shopsignal_core::domain::sale::SalesRecord;
    use shopsignal_db::repositories::{InMemorySalesRepository, RepositoryError, SalesRepository};

    use super::{BundleError, BundleService};

    struct UnavailableSales;

    #[async_trait]
    impl SalesRepository for UnavailableSales {
        async fn list_all_by_date_desc(&self) -> Result<Vec<SalesRecord>, RepositoryError> {
            Err(RepositoryError::Decode("sales store offline".to_owned()))
        }

        async fn insert(&self, _record: SalesRecord) -> Result<(), RepositoryError> {
            Err(RepositoryError::Decode("sales store offline".to_owned()))
        }
    }

    fn sale(buyer: &str, day: u32, product: &str, price: i64) -> SalesRecord {
        SalesRecord {
            id: format!("{buyer}-{day}-{product}"),
            buyer: buyer.to_owned(),
            date: Utc.with_ymd_and_hms(2024, 6, day, 12, 0, 0).single().expect("valid date"),
            product_id: ProductId::from(product),
            product_name: product.to_owned(),
            price: Decimal::from(price),
            quantity: 1,
            total: Decimal::from(price),
            region: "north".to_owned(),
            payment_method: "card".to_owned(),
        }
    }

    fn history() -> Vec<SalesRecord> {
        vec![
            sale("u1", 1, "A", 10),
            sale("u1", 1, "B", 20),
            sale("u2", 2, "A", 10),
            sale("u2", 2, "B", 20),
            sale("u3", 3, "C", 5),
            sale("u3", 3, "D", 5),
        ]
    }

    #[tokio::test]
    async fn default_threshold_keeps_repeat_pairs_only() {
        let service = BundleService::new(Arc::new(InMemorySalesRepository::with_records(history())));

        let bundles = service.suggestions(None).await.expect("suggestions");

        assert_eq!(bundles.len(), 1);
        assert_eq!(bundles[0].key().canonical(), "A-B");
        assert_eq!(bundles[0].bundle_price, Decimal::from(27));
        assert_eq!(bundles[0].buyers, vec!["u1".to_owned(), "u2".to_owned()]);
    }

    #[tokio::test]
    async fn explicit_threshold_overrides_default() {
        let service = BundleService::with_analyzer(
            Arc::new(InMemorySalesRepository::with_records(history())),
            BundleAnalyzer::with_discount_percentage(Decimal::from(20)).expect("discount"),
            2,
        );

        let bundles = service.suggestions(Some(1)).await.expect("suggestions");

        assert_eq!(bundles.len(), 2);
        assert_eq!(bundles[1].key().canonical(), "C-D");
        assert_eq!(bundles[1].bundle_price, Decimal::from(8));
    }

    #[tokio::test]
    async fn fetch_failures_are_visible_to_the_caller() {
        let service = BundleService::new(Arc::new(UnavailableSales));

        let result = service.suggestions(None).await;

        assert!(matches!(result, Err(BundleError::Fetch(_))));
    }
}
