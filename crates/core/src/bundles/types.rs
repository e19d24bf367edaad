//! Types for bundle mining

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::ProductId;
use crate::domain::sale::SalesRecord;

/// Order-independent key for a product pair: `(A, B)` and `(B, A)` are equal.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PairKey {
    low: ProductId,
    high: ProductId,
}

impl PairKey {
    pub fn new(first: &ProductId, second: &ProductId) -> Self {
        if first <= second {
            Self { low: first.clone(), high: second.clone() }
        } else {
            Self { low: second.clone(), high: first.clone() }
        }
    }

    /// Sorted ids joined with `-`, e.g. `A-B`.
    pub fn canonical(&self) -> String {
        format!("{}-{}", self.low, self.high)
    }

    pub fn members(&self) -> (&ProductId, &ProductId) {
        (&self.low, &self.high)
    }
}

/// Product identity and price as observed on a sales line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
}

impl From<&SalesRecord> for ProductSnapshot {
    fn from(record: &SalesRecord) -> Self {
        Self { id: record.product_id.clone(), name: record.product_name.clone(), price: record.price }
    }
}

/// A pair of products bought together, priced as a discounted bundle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPair {
    /// Snapshot from the first basket that contained the pair
    pub product1: ProductSnapshot,
    /// Snapshot from the first basket that contained the pair
    pub product2: ProductSnapshot,
    /// Number of baskets containing both products
    pub frequency: u32,
    /// Distinct buyers, in the order they were first seen
    pub buyers: Vec<String>,
    pub bundle_price: Decimal,
    pub original_price: Decimal,
    pub discount: Decimal,
    pub discount_percentage: Decimal,
}

impl ProductPair {
    /// Starts a pair with zero frequency and prices frozen from the two lines.
    pub fn first_seen(
        product1: ProductSnapshot,
        product2: ProductSnapshot,
        discount_percentage: Decimal,
    ) -> Self {
        let original_price = product1.price + product2.price;
        let discount = original_price * discount_percentage / Decimal::ONE_HUNDRED;
        Self {
            product1,
            product2,
            frequency: 0,
            buyers: Vec::new(),
            bundle_price: original_price - discount,
            original_price,
            discount,
            discount_percentage,
        }
    }

    pub fn key(&self) -> PairKey {
        PairKey::new(&self.product1.id, &self.product2.id)
    }

    pub(crate) fn record_basket(&mut self, buyer: &str) {
        self.frequency += 1;
        if !self.buyers.iter().any(|existing| existing == buyer) {
            self.buyers.push(buyer.to_owned());
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{PairKey, ProductPair, ProductSnapshot};
    use crate::domain::product::ProductId;

    #[test]
    fn pair_key_ignores_argument_order() {
        let a = ProductId::from("A");
        let b = ProductId::from("B");

        assert_eq!(PairKey::new(&a, &b), PairKey::new(&b, &a));
        assert_eq!(PairKey::new(&b, &a).canonical(), "A-B");
    }

    #[test]
    fn first_seen_prices_the_bundle_with_discount() {
        let pair = ProductPair::first_seen(
            ProductSnapshot { id: ProductId::from("A"), name: "Mug".into(), price: Decimal::new(1250, 2) },
            ProductSnapshot { id: ProductId::from("B"), name: "Tea".into(), price: Decimal::new(750, 2) },
            Decimal::from(10),
        );

        assert_eq!(pair.original_price, Decimal::from(20));
        assert_eq!(pair.discount, Decimal::from(2));
        assert_eq!(pair.bundle_price, Decimal::from(18));
        assert_eq!(pair.frequency, 0);
    }

    #[test]
    fn buyers_are_deduplicated() {
        let mut pair = ProductPair::first_seen(
            ProductSnapshot { id: ProductId::from("A"), name: "A".into(), price: Decimal::ONE },
            ProductSnapshot { id: ProductId::from("B"), name: "B".into(), price: Decimal::ONE },
            Decimal::from(10),
        );

        pair.record_basket("u1");
        pair.record_basket("u1");
        pair.record_basket("u2");

        assert_eq!(pair.frequency, 3);
        assert_eq!(pair.buyers, vec!["u1".to_owned(), "u2".to_owned()]);
    }
}
