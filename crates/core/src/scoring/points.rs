//! Point values awarded per interaction type.

use serde::{Deserialize, Serialize};

use crate::domain::event::EventType;

/// Points added to a product's raw score for each interaction.
///
/// This table is the only place point values live. Display labels are derived
/// from it (see [`PointTable::display_label`]) so storefront copy cannot drift
/// from what the accumulator actually applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointTable {
    #[serde(rename = "hover_2s")]
    pub hover_2s: i64,
    #[serde(rename = "hover_5s")]
    pub hover_5s: i64,
    pub product_click: i64,
    pub add_to_cart: i64,
    pub cart_abandon: i64,
}

impl Default for PointTable {
    fn default() -> Self {
        Self { hover_2s: 2, hover_5s: 5, product_click: 8, add_to_cart: 15, cart_abandon: -5 }
    }
}

impl PointTable {
    pub fn points(&self, event: EventType) -> i64 {
        match event {
            EventType::Hover2s => self.hover_2s,
            EventType::Hover5s => self.hover_5s,
            EventType::ProductClick => self.product_click,
            EventType::AddToCart => self.add_to_cart,
            EventType::CartAbandon => self.cart_abandon,
        }
    }

    /// Signed label such as `+2` or `-5`, for dashboards and tooltips.
    pub fn display_label(&self, event: EventType) -> String {
        format!("{:+}", self.points(event))
    }
}

#[cfg(test)]
mod tests {
    use super::PointTable;
    use crate::domain::event::EventType;

    #[test]
    fn default_table_matches_storefront_weights() {
        let table = PointTable::default();

        assert_eq!(table.points(EventType::Hover2s), 2);
        assert_eq!(table.points(EventType::Hover5s), 5);
        assert_eq!(table.points(EventType::ProductClick), 8);
        assert_eq!(table.points(EventType::AddToCart), 15);
        assert_eq!(table.points(EventType::CartAbandon), -5);
    }

    #[test]
    fn labels_follow_the_accumulator_values() {
        let table = PointTable::default();

        assert_eq!(table.display_label(EventType::Hover2s), "+2");
        assert_eq!(table.display_label(EventType::CartAbandon), "-5");

        let adjusted = PointTable { hover_2s: 3, ..PointTable::default() };
        assert_eq!(adjusted.display_label(EventType::Hover2s), "+3");
    }
}
