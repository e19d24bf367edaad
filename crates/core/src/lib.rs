pub mod analytics;
pub mod bundles;
pub mod config;
pub mod domain;
pub mod errors;
pub mod scoring;

pub use analytics::{MonthlySales, RevenueShare, SalesDimension, SalesSummary};
pub use bundles::{BundleAnalyzer, PairKey, ProductPair, ProductSnapshot};
pub use domain::event::{EventMetadata, EventType, InteractionEvent, NewInteractionEvent};
pub use domain::product::{Product, ProductId, ProductPatch};
pub use domain::sale::SalesRecord;
pub use domain::score::{EventCounts, ProductScore};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use scoring::{EngagementSummary, EngagementTier, PointTable, ScoreNormalizer};
