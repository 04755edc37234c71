//! Local cart store.

use std::sync::Arc;

use rust_decimal::Decimal;
use sparklab_core::{Cart, CartItem, Product, ProductId, Quantity};
use tokio::sync::watch;

use super::{MergeOutcome, PersistedCell};
use crate::storage::LocalStorage;

/// Storage key for the persisted cart.
pub const CART_STORAGE_KEY: &str = "cart-storage";

/// Handle to the client's cart.
///
/// Mutations apply immediately and are persisted before the call returns.
/// Quantity limits against stock are the caller's concern.
#[derive(Clone)]
pub struct CartStore {
    cell: Arc<PersistedCell<Cart>>,
}

impl CartStore {
    /// Restore the cart from `storage`.
    #[must_use]
    pub fn load(storage: Arc<dyn LocalStorage>) -> Self {
        Self {
            cell: Arc::new(PersistedCell::load(storage, CART_STORAGE_KEY)),
        }
    }

    /// Add `quantity` units of `product`, merging into an existing line.
    pub fn add_item(&self, product: &Product, quantity: Quantity) {
        self.cell.mutate(|cart| {
            cart.add_item(product, quantity);
            true
        });
    }

    pub fn remove_item(&self, id: &ProductId) {
        self.cell.mutate(|cart| cart.remove_item(id));
    }

    /// Set the quantity of an existing line; absent products are ignored.
    pub fn update_quantity(&self, id: &ProductId, quantity: Quantity) {
        self.cell.mutate(|cart| cart.update_quantity(id, quantity));
    }

    pub fn clear_cart(&self) {
        self.cell.mutate(Cart::clear);
    }

    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.cell.read(Cart::total_items)
    }

    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.cell.read(Cart::total_price)
    }

    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<CartItem> {
        self.cell.read(|cart| cart.get(id).cloned())
    }

    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        self.cell.read(|cart| cart.items().to_vec())
    }

    #[must_use]
    pub fn snapshot(&self) -> Cart {
        self.cell.read(Cart::clone)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cell.read(Cart::is_empty)
    }

    /// Fold the server cart in, keeping local lines on conflict.
    ///
    /// An empty cart adopts the server cart without scheduling an upload.
    pub fn merge_server(&self, server: &Cart) -> MergeOutcome {
        self.cell.merge_server(server)
    }

    /// Revision counter bumped on every change that should reach the server.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.cell.subscribe()
    }

    /// Current value of the revision counter.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.cell.revision()
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("lines", &self.cell.read(Cart::len))
            .finish_non_exhaustive()
    }
}
