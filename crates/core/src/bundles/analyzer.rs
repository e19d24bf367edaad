//! Co-purchase analysis over a sales history.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::types::{PairKey, ProductPair, ProductSnapshot};
use super::{DEFAULT_DISCOUNT_PERCENTAGE, DEFAULT_MIN_FREQUENCY};
use crate::domain::sale::SalesRecord;
use crate::errors::DomainError;

/// Groups sales into baskets and counts how often product pairs share one.
#[derive(Debug, Clone)]
pub struct BundleAnalyzer {
    discount_percentage: Decimal,
}

impl Default for BundleAnalyzer {
    fn default() -> Self {
        Self { discount_percentage: DEFAULT_DISCOUNT_PERCENTAGE }
    }
}

impl BundleAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_discount_percentage(discount_percentage: Decimal) -> Result<Self, DomainError> {
        if discount_percentage.is_sign_negative() || discount_percentage > Decimal::ONE_HUNDRED {
            return Err(DomainError::InvariantViolation(format!(
                "bundle discount percentage must be within 0..=100 (got {discount_percentage})"
            )));
        }
        Ok(Self { discount_percentage })
    }

    pub fn discount_percentage(&self) -> Decimal {
        self.discount_percentage
    }

    /// Pairs bought together in at least `min_frequency` baskets, most
    /// frequent first. Equal frequencies are ordered by canonical pair key.
    pub fn analyze(&self, sales: &[SalesRecord], min_frequency: u32) -> Vec<ProductPair> {
        let pairs = self.collect_pairs(sales);

        let mut bundles: Vec<ProductPair> =
            pairs.into_values().filter(|pair| pair.frequency >= min_frequency).collect();
        // stable sort keeps the key order from the BTreeMap for ties
        bundles.sort_by(|left, right| right.frequency.cmp(&left.frequency));
        bundles
    }

    pub fn analyze_default(&self, sales: &[SalesRecord]) -> Vec<ProductPair> {
        self.analyze(sales, DEFAULT_MIN_FREQUENCY)
    }

    /// Every pair seen in any basket, including those below any threshold.
    pub fn collect_pairs(&self, sales: &[SalesRecord]) -> BTreeMap<PairKey, ProductPair> {
        let mut pairs: BTreeMap<PairKey, ProductPair> = BTreeMap::new();

        for ((buyer, _day), lines) in group_baskets(sales) {
            if lines.len() < 2 {
                continue;
            }

            let mut counted_in_basket: BTreeSet<PairKey> = BTreeSet::new();
            for (index, first) in lines.iter().enumerate() {
                for second in &lines[index + 1..] {
                    if first.product_id == second.product_id {
                        continue;
                    }

                    let key = PairKey::new(&first.product_id, &second.product_id);
                    // a basket counts once per pair even if a product repeats in it
                    if !counted_in_basket.insert(key.clone()) {
                        continue;
                    }

                    let pair = pairs.entry(key).or_insert_with(|| {
                        ProductPair::first_seen(
                            ProductSnapshot::from(*first),
                            ProductSnapshot::from(*second),
                            self.discount_percentage,
                        )
                    });
                    pair.record_basket(buyer);
                }
            }
        }

        pairs
    }
}

/// Sales keyed by `(buyer, UTC purchase day)`, lines kept in input order.
pub fn group_baskets(sales: &[SalesRecord]) -> BTreeMap<(&str, NaiveDate), Vec<&SalesRecord>> {
    let mut baskets: BTreeMap<(&str, NaiveDate), Vec<&SalesRecord>> = BTreeMap::new();
    for sale in sales {
        baskets.entry((sale.buyer.as_str(), sale.purchase_day())).or_default().push(sale);
    }
    baskets
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use super::{group_baskets, BundleAnalyzer};
    use crate::domain::product::ProductId;
    use crate::domain::sale::SalesRecord;

    fn sale(buyer: &str, day: u32, hour: u32, product: &str, price: i64) -> SalesRecord {
        let date = Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).single().expect("valid date");
        SalesRecord {
            id: format!("{buyer}-{day}-{hour}-{product}"),
            buyer: buyer.to_owned(),
            date,
            product_id: ProductId::from(product),
            product_name: format!("Product {product}"),
            price: Decimal::from(price),
            quantity: 1,
            total: Decimal::from(price),
            region: "north".to_owned(),
            payment_method: "card".to_owned(),
        }
    }

    #[test]
    fn end_to_end_pair_matches_expected_pricing() {
        let sales = vec![
            sale("u1", 1, 9, "A", 10),
            sale("u1", 1, 9, "B", 20),
            sale("u2", 2, 9, "A", 10),
            sale("u2", 2, 9, "B", 20),
        ];

        let bundles = BundleAnalyzer::new().analyze(&sales, 2);

        assert_eq!(bundles.len(), 1);
        let pair = &bundles[0];
        assert_eq!(pair.frequency, 2);
        assert_eq!(pair.original_price, Decimal::from(30));
        assert_eq!(pair.discount, Decimal::from(3));
        assert_eq!(pair.bundle_price, Decimal::from(27));
        assert_eq!(pair.discount_percentage, Decimal::from(10));
        assert_eq!(pair.buyers, vec!["u1".to_owned(), "u2".to_owned()]);
    }

    #[test]
    fn reversed_basket_order_accumulates_into_one_pair() {
        let sales = vec![
            sale("u1", 1, 9, "A", 10),
            sale("u1", 1, 9, "B", 20),
            sale("u2", 3, 9, "B", 20),
            sale("u2", 3, 9, "A", 10),
        ];

        let bundles = BundleAnalyzer::new().analyze(&sales, 1);

        assert_eq!(bundles.len(), 1);
        assert_eq!(bundles[0].frequency, 2);
        assert_eq!(bundles[0].key().canonical(), "A-B");
    }

    #[test]
    fn frequency_filter_drops_rare_pairs() {
        let sales = vec![
            sale("u1", 1, 9, "X", 5),
            sale("u1", 1, 9, "Y", 6),
            sale("u2", 2, 9, "X", 5),
            sale("u2", 2, 9, "Y", 6),
            sale("u3", 4, 9, "P", 7),
            sale("u3", 4, 9, "Q", 8),
        ];
        let analyzer = BundleAnalyzer::new();

        let strict = analyzer.analyze(&sales, 2);
        assert_eq!(strict.len(), 1);
        assert_eq!(strict[0].key().canonical(), "X-Y");

        let loose = analyzer.analyze(&sales, 1);
        let keys: Vec<String> = loose.iter().map(|pair| pair.key().canonical()).collect();
        assert_eq!(keys, vec!["X-Y".to_owned(), "P-Q".to_owned()]);
    }

    #[test]
    fn same_buyer_different_days_are_separate_baskets() {
        let sales = vec![sale("u1", 1, 9, "A", 10), sale("u1", 2, 9, "B", 20)];

        assert!(BundleAnalyzer::new().analyze(&sales, 1).is_empty());
    }

    #[test]
    fn time_of_day_is_ignored_when_grouping() {
        let sales = vec![sale("u1", 1, 1, "A", 10), sale("u1", 1, 23, "B", 20)];

        let baskets = group_baskets(&sales);
        assert_eq!(baskets.len(), 1);
        assert_eq!(BundleAnalyzer::new().analyze(&sales, 1).len(), 1);
    }

    #[test]
    fn repeated_product_in_a_basket_is_not_a_pair() {
        let sales = vec![
            sale("u1", 1, 9, "A", 10),
            sale("u1", 1, 10, "A", 10),
            sale("u1", 1, 11, "B", 20),
        ];

        let pairs = BundleAnalyzer::new().collect_pairs(&sales);

        assert_eq!(pairs.len(), 1);
        let pair = pairs.values().next().expect("one pair");
        assert_eq!(pair.frequency, 1, "a basket contributes once per pair");
    }

    #[test]
    fn snapshot_prices_are_frozen_at_first_observation() {
        let sales = vec![
            sale("u1", 1, 9, "A", 10),
            sale("u1", 1, 9, "B", 20),
            sale("u2", 2, 9, "A", 99),
            sale("u2", 2, 9, "B", 99),
        ];

        let bundles = BundleAnalyzer::new().analyze(&sales, 2);

        assert_eq!(bundles[0].original_price, Decimal::from(30));
        assert_eq!(bundles[0].product1.price, Decimal::from(10));
    }

    #[test]
    fn buyer_is_counted_once_across_repeat_baskets() {
        let sales = vec![
            sale("u1", 1, 9, "A", 10),
            sale("u1", 1, 9, "B", 20),
            sale("u1", 5, 9, "A", 10),
            sale("u1", 5, 9, "B", 20),
        ];

        let bundles = BundleAnalyzer::new().analyze(&sales, 2);

        assert_eq!(bundles[0].frequency, 2);
        assert_eq!(bundles[0].buyers, vec!["u1".to_owned()]);
    }

    #[test]
    fn three_item_basket_yields_three_pairs() {
        let sales =
            vec![sale("u1", 1, 9, "A", 1), sale("u1", 1, 9, "B", 2), sale("u1", 1, 9, "C", 3)];

        let pairs = BundleAnalyzer::new().collect_pairs(&sales);

        let keys: Vec<String> = pairs.keys().map(|key| key.canonical()).collect();
        assert_eq!(keys, vec!["A-B".to_owned(), "A-C".to_owned(), "B-C".to_owned()]);
    }

    #[test]
    fn custom_discount_is_validated() {
        assert!(BundleAnalyzer::with_discount_percentage(Decimal::from(150)).is_err());
        assert!(BundleAnalyzer::with_discount_percentage(Decimal::from(-1)).is_err());

        let analyzer =
            BundleAnalyzer::with_discount_percentage(Decimal::from(25)).expect("valid discount");
        let sales = vec![sale("u1", 1, 9, "A", 40), sale("u1", 1, 9, "B", 60)];
        let bundles = analyzer.analyze(&sales, 1);
        assert_eq!(bundles[0].bundle_price, Decimal::from(75));
    }
}
