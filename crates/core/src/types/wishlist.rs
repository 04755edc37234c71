//! Saved-for-later products.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::cart::DuplicateProductError;
use super::merge::{Keyed, first_duplicate, merge_local_first};
use super::{Product, ProductId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
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

impl From<&Product> for WishlistItem {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            slug: product.slug.clone(),
            price: product.price,
            discount_price: product.discount_price,
            image: product.image.clone(),
            category: product.category.clone(),
        }
    }
}

impl Keyed for WishlistItem {
    fn product_id(&self) -> &ProductId {
        &self.id
    }
}

/// Saved products with set semantics on product id, in the order they were
/// saved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<WishlistItem>", into = "Vec<WishlistItem>")]
pub struct Wishlist {
    items: Vec<WishlistItem>,
}

impl Wishlist {
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a wishlist from entries that must already be unique.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateProductError`] naming the first repeated id.
    pub fn try_from_items(items: Vec<WishlistItem>) -> Result<Self, DuplicateProductError> {
        if let Some(id) = first_duplicate(&items) {
            return Err(DuplicateProductError(id.clone()));
        }
        Ok(Self { items })
    }

    /// Save `product` unless it is already saved. Returns whether it was added.
    pub fn add_item(&mut self, product: &Product) -> bool {
        if self.contains(&product.id) {
            return false;
        }
        self.items.push(WishlistItem::from(product));
        true
    }

    /// Returns whether an entry was removed.
    pub fn remove_item(&mut self, id: &ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| &item.id != id);
        self.items.len() != before
    }

    /// Add `product` if absent, remove it if present. Returns whether it is
    /// saved afterwards.
    pub fn toggle(&mut self, product: &Product) -> bool {
        if self.remove_item(&product.id) {
            false
        } else {
            self.items.push(WishlistItem::from(product));
            true
        }
    }

    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.items.iter().any(|item| &item.id == id)
    }

    /// Returns whether there was anything to clear.
    pub fn clear(&mut self) -> bool {
        let had_items = !self.items.is_empty();
        self.items.clear();
        had_items
    }

    #[must_use]
    pub fn items(&self) -> &[WishlistItem] {
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

    /// Union with the server's copy, keeping local entries first.
    #[must_use]
    pub fn merge_with_server(&self, server: &Self) -> Self {
        Self {
            items: merge_local_first(&self.items, &server.items),
        }
    }

    #[must_use]
    pub fn into_items(self) -> Vec<WishlistItem> {
        self.items
    }
}

impl From<Vec<WishlistItem>> for Wishlist {
    fn from(items: Vec<WishlistItem>) -> Self {
        let mut wishlist = Self::new();
        for item in items {
            if !wishlist.contains(&item.id) {
                wishlist.items.push(item);
            }
        }
        wishlist
    }
}

impl From<Wishlist> for Vec<WishlistItem> {
    fn from(wishlist: Wishlist) -> Self {
        wishlist.items
    }
}
