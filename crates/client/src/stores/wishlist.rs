//! Local wishlist store.

use std::sync::Arc;

use sparklab_core::{Product, ProductId, Wishlist, WishlistItem};
use tokio::sync::watch;

use super::{MergeOutcome, PersistedCell};
use crate::storage::LocalStorage;

/// Storage key for the persisted wishlist.
pub const WISHLIST_STORAGE_KEY: &str = "wishlist-storage";

/// Handle to the client's wishlist.
#[derive(Clone)]
pub struct WishlistStore {
    cell: Arc<PersistedCell<Wishlist>>,
}

impl WishlistStore {
    #[must_use]
    pub fn load(storage: Arc<dyn LocalStorage>) -> Self {
        Self {
            cell: Arc::new(PersistedCell::load(storage, WISHLIST_STORAGE_KEY)),
        }
    }

    /// Save `product`; already-saved products are left alone.
    pub fn add_item(&self, product: &Product) {
        self.cell.mutate(|wishlist| wishlist.add_item(product));
    }

    pub fn remove_item(&self, id: &ProductId) {
        self.cell.mutate(|wishlist| wishlist.remove_item(id));
    }

    /// Flip membership of `product`. Returns whether it is saved afterwards.
    pub fn toggle(&self, product: &Product) -> bool {
        let mut saved = false;
        self.cell.mutate(|wishlist| {
            saved = wishlist.toggle(product);
            true
        });
        saved
    }

    #[must_use]
    pub fn is_in_wishlist(&self, id: &ProductId) -> bool {
        self.cell.read(|wishlist| wishlist.contains(id))
    }

    pub fn clear_wishlist(&self) {
        self.cell.mutate(Wishlist::clear);
    }

    #[must_use]
    pub fn items(&self) -> Vec<WishlistItem> {
        self.cell.read(|wishlist| wishlist.items().to_vec())
    }

    #[must_use]
    pub fn snapshot(&self) -> Wishlist {
        self.cell.read(Wishlist::clone)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cell.read(Wishlist::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cell.read(Wishlist::is_empty)
    }

    pub fn merge_server(&self, server: &Wishlist) -> MergeOutcome {
        self.cell.merge_server(server)
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.cell.subscribe()
    }

    #[must_use]
    pub fn revision(&self) -> u64 {
        self.cell.revision()
    }
}

impl std::fmt::Debug for WishlistStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WishlistStore")
            .field("items", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::storage::MemoryStorage;

    fn product(id: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: id.to_uppercase(),
            slug: id.to_string(),
            price: Decimal::new(2500, 2),
            discount_price: Some(Decimal::new(1999, 2)),
            image: format!("/img/{id}.webp"),
            category: "astronomy".to_string(),
        }
    }

    #[test]
    fn test_duplicate_add_does_not_grow_or_notify() {
        let store = WishlistStore::load(Arc::new(MemoryStorage::new()));
        store.add_item(&product("planisphere"));
        let mut rx = store.subscribe();
        rx.borrow_and_update();

        store.add_item(&product("planisphere"));
        assert_eq!(store.len(), 1);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_toggle_and_membership() {
        let store = WishlistStore::load(Arc::new(MemoryStorage::new()));
        let id = ProductId::new("star-map");

        assert!(store.toggle(&product("star-map")));
        assert!(store.is_in_wishlist(&id));
        assert!(!store.toggle(&product("star-map")));
        assert!(!store.is_in_wishlist(&id));
    }

    #[test]
    fn test_persists_category() {
        let storage: Arc<dyn LocalStorage> = Arc::new(MemoryStorage::new());
        WishlistStore::load(storage.clone()).add_item(&product("orrery"));

        let reloaded = WishlistStore::load(storage);
        let items = reloaded.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items.first().unwrap().category, "astronomy");
    }

    #[test]
    fn test_merge_notifies_when_only_server_is_stale() {
        let store = WishlistStore::load(Arc::new(MemoryStorage::new()));
        store.add_item(&product("a"));
        store.add_item(&product("b"));
        let mut rx = store.subscribe();
        rx.borrow_and_update();

        let server = Wishlist::from(vec![WishlistItem::from(&product("a"))]);
        assert_eq!(store.merge_server(&server), MergeOutcome::Merged);
        assert!(rx.has_changed().unwrap());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_clear_wishlist() {
        let store = WishlistStore::load(Arc::new(MemoryStorage::new()));
        store.add_item(&product("a"));
        store.add_item(&product("b"));
        store.clear_wishlist();
        assert!(store.is_empty());
    }
}
