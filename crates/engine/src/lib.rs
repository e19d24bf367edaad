pub mod analytics;
pub mod bundles;
pub mod cart_timer;
pub mod catalog;
pub mod hover;
pub mod interactions;
pub mod services;
pub mod session;
pub mod tracker;

pub use analytics::{SalesReport, SalesReportService};
pub use bundles::{BundleError, BundleService};
pub use cart_timer::CartAbandonmentScheduler;
pub use catalog::{CatalogError, CatalogService, ProductDraft};
pub use hover::HoverTracker;
pub use interactions::InteractionRecorder;
pub use services::{EngineServices, Repositories};
pub use session::SessionContext;
pub use tracker::{EngagementTracker, TrackingError};
