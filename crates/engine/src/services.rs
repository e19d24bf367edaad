use std::sync::Arc;
use std::time::Duration;

use shopsignal_core::config::{AppConfig, ConfigError};
use shopsignal_db::repositories::{
    InMemoryInteractionEventRepository, InMemoryProductRepository, InMemoryProductScoreRepository,
    InMemorySalesRepository, InteractionEventRepository, ProductRepository,
    ProductScoreRepository, SalesRepository, SqlInteractionEventRepository, SqlProductRepository,
    SqlProductScoreRepository, SqlSalesRepository,
};
use shopsignal_db::DbPool;

use crate::analytics::SalesReportService;
use crate::bundles::BundleService;
use crate::cart_timer::CartAbandonmentScheduler;
use crate::catalog::CatalogService;
use crate::hover::HoverTracker;
use crate::interactions::InteractionRecorder;
use crate::session::SessionContext;
use crate::tracker::EngagementTracker;

/// Every engine service wired to one set of repositories.
#[derive(Clone)]
pub struct EngineServices {
    pub tracker: EngagementTracker,
    pub cart: CartAbandonmentScheduler,
    pub recorder: InteractionRecorder,
    pub bundles: BundleService,
    pub catalog: CatalogService,
    pub sales_reports: SalesReportService,
}

/// Repository handles the services are built from.
pub struct Repositories {
    pub events: Arc<dyn InteractionEventRepository>,
    pub scores: Arc<dyn ProductScoreRepository>,
    pub sales: Arc<dyn SalesRepository>,
    pub products: Arc<dyn ProductRepository>,
}

impl Repositories {
    pub fn sql(pool: &DbPool) -> Self {
        Self {
            events: Arc::new(SqlInteractionEventRepository::new(pool.clone())),
            scores: Arc::new(SqlProductScoreRepository::new(pool.clone())),
            sales: Arc::new(SqlSalesRepository::new(pool.clone())),
            products: Arc::new(SqlProductRepository::new(pool.clone())),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            events: Arc::new(InMemoryInteractionEventRepository::default()),
            scores: Arc::new(InMemoryProductScoreRepository::default()),
            sales: Arc::new(InMemorySalesRepository::default()),
            products: Arc::new(InMemoryProductRepository::default()),
        }
    }
}

impl EngineServices {
    pub fn build(config: &AppConfig, repositories: Repositories) -> Result<Self, ConfigError> {
        let scoring = &config.scoring;
        let tracker = EngagementTracker::with_settings(
            repositories.events,
            repositories.scores,
            scoring.points,
            scoring.normalizer()?,
            SessionContext::default(),
        );
        let cart = CartAbandonmentScheduler::with_timeout(
            tracker.clone(),
            Duration::from_secs(scoring.abandon_timeout_secs),
        );
        let hover = HoverTracker::with_dwell(
            tracker.clone(),
            Duration::from_secs(scoring.hover_short_secs),
            Duration::from_secs(scoring.hover_long_secs),
        );
        let recorder = InteractionRecorder::new(tracker.clone(), hover, cart.clone());
        let bundles = BundleService::with_analyzer(
            Arc::clone(&repositories.sales),
            config.bundles.analyzer()?,
            config.bundles.min_frequency,
        );

        Ok(Self {
            tracker,
            cart,
            recorder,
            bundles,
            catalog: CatalogService::new(repositories.products),
            sales_reports: SalesReportService::new(repositories.sales),
        })
    }
}

#[cfg(test)]
mod tests {
    use shopsignal_core::config::AppConfig;
    use shopsignal_core::domain::event::EventType;
    use shopsignal_core::domain::product::ProductId;

    use super::{EngineServices, Repositories};

    #[tokio::test]
    async fn configured_points_flow_into_the_tracker() {
        let mut config = AppConfig::default();
        config.scoring.points.product_click = 11;

        let services =
            EngineServices::build(&config, Repositories::in_memory()).expect("services");
        let score = services
            .tracker
            .record(ProductId::from("p1"), EventType::ProductClick, None, None)
            .await
            .expect("record");

        assert_eq!(score.raw_score, 11);
        assert_eq!(services.cart.timeout().as_secs(), 30);
    }

    #[test]
    fn invalid_threshold_is_a_config_error() {
        let mut config = AppConfig::default();
        config.scoring.max_score_threshold = -1.0;

        assert!(EngineServices::build(&config, Repositories::in_memory()).is_err());
    }
}
