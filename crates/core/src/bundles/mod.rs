//! Bundle recommendations mined from co-purchase history.
//!
//! Sales are grouped into baskets (one buyer, one calendar day). Every
//! unordered pair of distinct products inside a basket is counted, and pairs
//! bought together often enough are offered as a discounted bundle.

mod analyzer;
mod types;

use rust_decimal::Decimal;

pub use analyzer::{group_baskets, BundleAnalyzer};
pub use types::{PairKey, ProductPair, ProductSnapshot};

/// Minimum number of shared baskets before a pair is suggested
pub const DEFAULT_MIN_FREQUENCY: u32 = 2;

/// Discount applied to the combined price of a bundle, in percent
pub const DEFAULT_DISCOUNT_PERCENTAGE: Decimal = Decimal::TEN;
