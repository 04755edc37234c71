//! `HttpSyncApi` and `SyncCoordinator` against the in-process fake storefront.
//!
//! These run on the real clock with a short debounce window, since the
//! HTTP round trips go through actual sockets.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use tokio::sync::broadcast;

use sparklab_client::{
    CartStore, Collection, HttpSyncApi, MemoryStorage, SyncConfig, SyncCoordinator, SyncError,
    SyncEvent, SyncOperation, WishlistStore,
};
use sparklab_core::{AuthStatus, CartItem, Product, ProductId, Quantity, WishlistItem};
use sparklab_integration_tests::{FakeStorefront, TEST_EMAIL, TEST_PASSWORD};

const DEBOUNCE: Duration = Duration::from_millis(50);
const WAIT: Duration = Duration::from_secs(5);

fn product(id: &str, cents: i64) -> Product {
    Product {
        id: ProductId::new(id),
        name: format!("Product {id}"),
        slug: id.to_lowercase(),
        price: Decimal::new(cents, 2),
        discount_price: None,
        image: format!("https://cdn.sparklab.store/{id}.jpg"),
        category: "chemistry".to_string(),
    }
}

fn qty(n: u32) -> Quantity {
    Quantity::new(n).unwrap()
}

fn cart_line(id: &str, n: u32) -> CartItem {
    CartItem::new(&product(id, 1000), qty(n))
}

fn lines(items: &[CartItem]) -> Vec<(String, u32)> {
    items
        .iter()
        .map(|item| (item.id.to_string(), item.quantity.get()))
        .collect()
}

struct Harness {
    fake: FakeStorefront,
    coordinator: SyncCoordinator<HttpSyncApi>,
    events: broadcast::Receiver<SyncEvent>,
}

impl Harness {
    async fn new() -> Self {
        let fake = FakeStorefront::start().await;
        let api = HttpSyncApi::new(&fake.url()).unwrap();
        let cart = CartStore::load(Arc::new(MemoryStorage::new()));
        let wishlist = WishlistStore::load(Arc::new(MemoryStorage::new()));
        let coordinator =
            SyncCoordinator::new(api, cart, wishlist, SyncConfig { debounce: DEBOUNCE });
        let events = coordinator.subscribe();
        Self {
            fake,
            coordinator,
            events,
        }
    }

    async fn sign_in(&self) {
        self.coordinator
            .api()
            .login(TEST_EMAIL, TEST_PASSWORD)
            .await
            .unwrap();
        self.coordinator
            .set_auth_status(AuthStatus::Authenticated)
            .await;
    }

    /// Wait for the first event matching `pred`, skipping others.
    async fn wait_for(&mut self, pred: impl Fn(&SyncEvent) -> bool) -> SyncEvent {
        tokio::time::timeout(WAIT, async {
            loop {
                let event = self.events.recv().await.unwrap();
                if pred(&event) {
                    return event;
                }
            }
        })
        .await
        .expect("timed out waiting for sync event")
    }
}

#[tokio::test]
async fn test_login_merges_local_first_and_pushes_union() {
    let mut h = Harness::new().await;
    h.fake
        .with_state(|s| s.cart = vec![cart_line("A", 5), cart_line("B", 1)]);
    h.coordinator
        .cart()
        .add_item(&product("A", 1000), qty(2));

    let workers = h.coordinator.start();
    h.sign_in().await;

    h.wait_for(|e| {
        matches!(
            e,
            SyncEvent::Pushed {
                collection: Collection::Cart,
                ..
            }
        )
    })
    .await;

    let expected = vec![("A".to_string(), 2), ("B".to_string(), 1)];
    assert_eq!(lines(&h.coordinator.cart().items()), expected);
    let server = h.fake.snapshot();
    assert_eq!(lines(&server.cart), expected);
    assert_eq!(server.cart_puts.len(), 1);

    workers.shutdown().await;
}

#[tokio::test]
async fn test_login_with_empty_local_adopts_server_without_pushing() {
    let mut h = Harness::new().await;
    let saved = WishlistItem::from(&product("W", 2500));
    h.fake.with_state(|s| {
        s.cart = vec![cart_line("A", 3)];
        s.wishlist = vec![saved.clone()];
    });

    let workers = h.coordinator.start();
    h.sign_in().await;
    h.wait_for(|e| {
        matches!(
            e,
            SyncEvent::Merged {
                collection: Collection::Wishlist,
                ..
            }
        )
    })
    .await;

    tokio::time::sleep(DEBOUNCE * 4).await;

    assert_eq!(lines(&h.coordinator.cart().items()), vec![("A".to_string(), 3)]);
    assert_eq!(h.coordinator.wishlist().items(), vec![saved]);
    let server = h.fake.snapshot();
    assert!(server.cart_puts.is_empty());
    assert!(server.wishlist_puts.is_empty());

    workers.shutdown().await;
}

#[tokio::test]
async fn test_burst_of_changes_is_pushed_once() {
    let mut h = Harness::new().await;
    let workers = h.coordinator.start();
    h.sign_in().await;

    let cart = h.coordinator.cart();
    cart.add_item(&product("A", 1000), qty(1));
    cart.add_item(&product("A", 1000), qty(1));
    cart.add_item(&product("B", 500), qty(4));
    cart.update_quantity(&ProductId::new("B"), qty(2));

    h.wait_for(|e| {
        matches!(
            e,
            SyncEvent::Pushed {
                collection: Collection::Cart,
                ..
            }
        )
    })
    .await;
    tokio::time::sleep(DEBOUNCE * 4).await;

    let server = h.fake.snapshot();
    assert_eq!(server.cart_puts.len(), 1);
    assert_eq!(
        lines(&server.cart),
        vec![("A".to_string(), 2), ("B".to_string(), 2)]
    );

    workers.shutdown().await;
}

#[tokio::test]
async fn test_logout_clears_local_stores_and_stops_pushing() {
    let mut h = Harness::new().await;
    let workers = h.coordinator.start();
    h.sign_in().await;

    h.coordinator.cart().add_item(&product("A", 1000), qty(1));
    h.coordinator.wishlist().add_item(&product("W", 2500));

    // Sign out inside the debounce window
    h.coordinator.api().logout().await.unwrap();
    h.coordinator
        .set_auth_status(AuthStatus::Unauthenticated)
        .await;
    h.wait_for(|e| matches!(e, SyncEvent::Cleared)).await;

    h.coordinator.cart().add_item(&product("B", 1000), qty(1));
    tokio::time::sleep(DEBOUNCE * 4).await;

    assert!(h.coordinator.wishlist().is_empty());
    assert_eq!(lines(&h.coordinator.cart().items()), vec![("B".to_string(), 1)]);
    let server = h.fake.snapshot();
    assert_eq!(server.logouts, 1);
    assert!(server.cart_puts.is_empty());
    assert!(server.wishlist_puts.is_empty());

    workers.shutdown().await;
}

#[tokio::test]
async fn test_fetch_without_session_reports_failure_and_keeps_local_state() {
    let mut h = Harness::new().await;
    h.coordinator.cart().add_item(&product("A", 1000), qty(2));

    // Status flips without a server login, so every request is 401
    h.coordinator
        .set_auth_status(AuthStatus::Authenticated)
        .await;

    let event = h
        .wait_for(|e| {
            matches!(
                e,
                SyncEvent::Failed {
                    collection: Collection::Cart,
                    ..
                }
            )
        })
        .await;
    assert_eq!(
        event,
        SyncEvent::Failed {
            collection: Collection::Cart,
            operation: SyncOperation::Fetch,
            error: "not signed in".to_string(),
        }
    );
    assert_eq!(lines(&h.coordinator.cart().items()), vec![("A".to_string(), 2)]);
}

#[tokio::test]
async fn test_push_failure_is_reported_not_retried() {
    let mut h = Harness::new().await;
    let workers = h.coordinator.start();
    h.sign_in().await;
    h.fake.with_state(|s| s.failing = true);

    h.coordinator.cart().add_item(&product("A", 1000), qty(1));

    let event = h
        .wait_for(|e| {
            matches!(
                e,
                SyncEvent::Failed {
                    operation: SyncOperation::Push,
                    ..
                }
            )
        })
        .await;
    assert_eq!(
        event,
        SyncEvent::Failed {
            collection: Collection::Cart,
            operation: SyncOperation::Push,
            error: "server responded with 500 Internal Server Error".to_string(),
        }
    );

    h.fake.with_state(|s| s.failing = false);
    tokio::time::sleep(DEBOUNCE * 4).await;
    assert!(h.fake.snapshot().cart_puts.is_empty());
    assert_eq!(h.coordinator.cart().total_items(), 1);

    workers.shutdown().await;
}

#[tokio::test]
async fn test_flush_pushes_immediately() {
    let h = Harness::new().await;
    let workers = h.coordinator.start();
    h.sign_in().await;

    h.coordinator.wishlist().add_item(&product("W", 2500));
    assert!(h.coordinator.flush().await);

    let server = h.fake.snapshot();
    assert_eq!(server.wishlist.len(), 1);
    assert_eq!(server.wishlist_puts.len(), 1);

    // The pending debounce timer was cancelled by the flush
    tokio::time::sleep(DEBOUNCE * 4).await;
    assert_eq!(h.fake.snapshot().wishlist_puts.len(), 1);

    workers.shutdown().await;
}

#[tokio::test]
async fn test_login_rejects_bad_password() {
    let fake = FakeStorefront::start().await;
    let api = HttpSyncApi::new(&fake.url()).unwrap();

    let err = api.login(TEST_EMAIL, "wrong password").await.unwrap_err();

    assert!(matches!(err, SyncError::Unauthorized));
    assert_eq!(fake.snapshot().logins, 0);
}
