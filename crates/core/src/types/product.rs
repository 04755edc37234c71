//! Catalogue product as seen by the cart and wishlist.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ProductId;

/// The subset of a catalogue product that carts and wishlists snapshot.
///
/// Prices are copied at the moment the product is saved; the snapshot is
/// not refreshed when the catalogue changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_price: Option<Decimal>,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub category: String,
}

impl Product {
    /// The price a customer actually pays per unit.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        self.discount_price.unwrap_or(self.price)
    }
}
