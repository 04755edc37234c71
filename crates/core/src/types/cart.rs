//! Shopping cart line items.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::merge::{Keyed, merge_local_first};
use super::{Product, ProductId, Quantity};

/// Error returned when a collection lists the same product twice.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("product {0} appears more than once")]
pub struct DuplicateProductError(pub ProductId);

/// One cart line: a product snapshot and how many units of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_price: Option<Decimal>,
    #[serde(default)]
    pub image: String,
    pub quantity: Quantity,
}

impl CartItem {
    /// Snapshot `product` into a new line.
    #[must_use]
    pub fn new(product: &Product, quantity: Quantity) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            slug: product.slug.clone(),
            price: product.price,
            discount_price: product.discount_price,
            image: product.image.clone(),
            quantity,
        }
    }

    /// Discounted price if present, otherwise the base price.
    #[must_use]
    pub fn unit_price(&self) -> Decimal {
        self.discount_price.unwrap_or(self.price)
    }

    /// `unit_price * quantity`, saturating at the bounds of [`Decimal`].
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price().saturating_mul(Decimal::from(self.quantity.get()))
    }
}

impl Keyed for CartItem {
    fn product_id(&self) -> &ProductId {
        &self.id
    }
}

/// An ordered list of cart lines with at most one line per product.
///
/// Deserializing collapses repeated product ids by summing their quantities,
/// so a hand-edited or legacy payload still yields a valid cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<CartItem>", into = "Vec<CartItem>")]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from lines that must already be unique by product id.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateProductError`] naming the first repeated id.
    pub fn try_from_items(items: Vec<CartItem>) -> Result<Self, DuplicateProductError> {
        if let Some(id) = super::merge::first_duplicate(&items) {
            return Err(DuplicateProductError(id.clone()));
        }
        Ok(Self { items })
    }

    /// Add `quantity` units of `product`.
    ///
    /// An existing line for the same product has its quantity increased;
    /// otherwise a new line is appended.
    pub fn add_item(&mut self, product: &Product, quantity: Quantity) {
        if let Some(line) = self.items.iter_mut().find(|line| line.id == product.id) {
            line.quantity = line.quantity.saturating_add(quantity);
        } else {
            self.items.push(CartItem::new(product, quantity));
        }
    }

    /// Remove the line for `id`. Returns whether a line was removed.
    pub fn remove_item(&mut self, id: &ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|line| &line.id != id);
        self.items.len() != before
    }

    /// Set the quantity of the line for `id`. Returns whether the cart changed.
    pub fn update_quantity(&mut self, id: &ProductId, quantity: Quantity) -> bool {
        match self.items.iter_mut().find(|line| &line.id == id) {
            Some(line) if line.quantity != quantity => {
                line.quantity = quantity;
                true
            }
            _ => false,
        }
    }

    /// Remove every line. Returns whether the cart had any.
    pub fn clear(&mut self) -> bool {
        let had_items = !self.items.is_empty();
        self.items.clear();
        had_items
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.items
            .iter()
            .map(|line| u64::from(line.quantity.get()))
            .sum()
    }

    /// Sum of line totals, saturating at the bounds of [`Decimal`].
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.items
            .iter()
            .map(CartItem::line_total)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// Look up the line for `id`.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|line| &line.id == id)
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Merge this (local) cart with the server's copy.
    ///
    /// An empty local cart adopts the server cart as-is. Otherwise local lines
    /// are kept unchanged, including their quantities, and lines only the
    /// server knows about are appended in server order.
    #[must_use]
    pub fn merge_with_server(&self, server: &Self) -> Self {
        Self {
            items: merge_local_first(&self.items, &server.items),
        }
    }

    #[must_use]
    pub fn into_items(self) -> Vec<CartItem> {
        self.items
    }
}

impl From<Vec<CartItem>> for Cart {
    fn from(items: Vec<CartItem>) -> Self {
        let mut cart = Self::new();
        for item in items {
            if let Some(line) = cart.items.iter_mut().find(|line| line.id == item.id) {
                line.quantity = line.quantity.saturating_add(item.quantity);
            } else {
                cart.items.push(item);
            }
        }
        cart
    }
}

impl From<Cart> for Vec<CartItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: &str, price: i64, discount: Option<i64>) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Kit {id}"),
            slug: format!("kit-{}", id.to_lowercase()),
            price: Decimal::new(price, 0),
            discount_price: discount.map(|d| Decimal::new(d, 0)),
            image: format!("/img/{id}.png"),
            category: "robotics".to_string(),
        }
    }

    fn qty(n: u32) -> Quantity {
        Quantity::new(n).unwrap()
    }

    fn line(id: &str, n: u32) -> CartItem {
        CartItem::new(&product(id, 100, None), qty(n))
    }

    #[test]
    fn test_repeated_add_sums_quantities() {
        let mut cart = Cart::new();
        let kit = product("A", 499, None);
        for n in [1, 4, 2] {
            cart.add_item(&kit, qty(n));
        }

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(&kit.id).unwrap().quantity.get(), 7);
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let mut cart = Cart::new();
        cart.add_item(&product("B", 1, None), Quantity::ONE);
        cart.add_item(&product("A", 1, None), Quantity::ONE);
        cart.add_item(&product("B", 1, None), Quantity::ONE);

        let ids: Vec<_> = cart.items().iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, ["B", "A"]);
    }

    #[test]
    fn test_remove_and_update_are_noops_when_absent() {
        let mut cart = Cart::new();
        cart.add_item(&product("A", 10, None), qty(2));

        assert!(!cart.remove_item(&ProductId::new("Z")));
        assert!(!cart.update_quantity(&ProductId::new("Z"), qty(9)));
        assert_eq!(cart.total_items(), 2);

        assert!(cart.update_quantity(&ProductId::new("A"), qty(5)));
        assert_eq!(cart.total_items(), 5);

        assert!(cart.remove_item(&ProductId::new("A")));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_totals_use_discount_price_when_present() {
        let mut cart = Cart::new();
        cart.add_item(&product("A", 1000, Some(800)), qty(2));
        cart.add_item(&product("B", 250, None), qty(3));

        assert_eq!(cart.total_items(), 5);
        assert_eq!(cart.total_price(), Decimal::new(2350, 0));
    }

    #[test]
    fn test_totals_saturate_instead_of_overflowing() {
        let json = r#"[
            {"id":"A","name":"Kit A","slug":"kit-a","price":"79228162514264337593543950335","quantity":2},
            {"id":"B","name":"Kit B","slug":"kit-b","price":"1","quantity":1}
        ]"#;
        let cart: Cart = serde_json::from_str(json).unwrap();

        assert_eq!(cart.get(&ProductId::new("A")).unwrap().line_total(), Decimal::MAX);
        assert_eq!(cart.total_price(), Decimal::MAX);
    }

    #[test]
    fn test_clear_reports_change() {
        let mut cart = Cart::new();
        assert!(!cart.clear());
        cart.add_item(&product("A", 1, None), Quantity::ONE);
        assert!(cart.clear());
        assert_eq!(cart.total_price(), Decimal::ZERO);
    }

    #[test]
    fn test_merge_local_wins_and_server_only_appended() {
        let local = Cart::try_from_items(vec![line("A", 2)]).unwrap();
        let server = Cart::try_from_items(vec![line("A", 5), line("B", 1)]).unwrap();

        let merged = local.merge_with_server(&server);

        let summary: Vec<_> = merged
            .items()
            .iter()
            .map(|l| (l.id.as_str(), l.quantity.get()))
            .collect();
        assert_eq!(summary, [("A", 2), ("B", 1)]);
    }

    #[test]
    fn test_merge_empty_local_adopts_server() {
        let server = Cart::try_from_items(vec![line("C", 3), line("A", 1)]).unwrap();
        assert_eq!(Cart::new().merge_with_server(&server), server);
    }

    #[test]
    fn test_try_from_items_rejects_duplicates() {
        let err = Cart::try_from_items(vec![line("A", 1), line("B", 1), line("A", 2)]).unwrap_err();
        assert_eq!(err, DuplicateProductError(ProductId::new("A")));
    }

    #[test]
    fn test_deserialize_collapses_duplicates() {
        let json = r#"[
            {"id":"A","name":"Kit A","slug":"kit-a","price":"100","quantity":2},
            {"id":"A","name":"Kit A","slug":"kit-a","price":"100","quantity":3}
        ]"#;
        let cart: Cart = serde_json::from_str(json).unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total_items(), 5);
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let item = CartItem::new(&product("A", 1000, Some(800)), qty(2));
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["discountPrice"], "800");
        assert_eq!(json["quantity"], 2);
        assert!(json.get("category").is_none());
    }
}
