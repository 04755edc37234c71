//! Reconciles the local stores with the account's server copy.
//!
//! The coordinator follows the client's [`AuthStatus`]:
//!
//! | Transition | Effect |
//! |------------|--------|
//! | signed out -> `Authenticated` | pull both collections, merge local-first |
//! | `Authenticated` -> `Unauthenticated` | clear both local stores |
//! | store change while `Authenticated` | push the whole collection after the debounce window |
//!
//! Pushes run in one background task per collection (see [`start`]). Every
//! fetch, merge, push, failure and clear is logged and broadcast as a
//! [`SyncEvent`]; nothing is retried.
//!
//! [`start`]: SyncCoordinator::start

use std::sync::Arc;
use std::time::Duration;

use sparklab_core::{AuthStatus, Cart, Wishlist};
use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::api::{SyncApi, SyncError};
use crate::config::SyncConfig;
use crate::debounce::Debouncer;
use crate::stores::{CartStore, MergeOutcome, WishlistStore};

/// Capacity of the event channel. Slow subscribers lag rather than block.
const EVENT_CAPACITY: usize = 64;

/// Which synced collection an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Cart,
    Wishlist,
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cart => write!(f, "cart"),
            Self::Wishlist => write!(f, "wishlist"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOperation {
    Fetch,
    Push,
}

impl std::fmt::Display for SyncOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fetch => write!(f, "fetch"),
            Self::Push => write!(f, "push"),
        }
    }
}

/// Something the coordinator did. Item counts, not contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// Server copy fetched after sign-in.
    Pulled { collection: Collection, items: usize },
    /// Server copy folded into the local store.
    Merged {
        collection: Collection,
        items: usize,
        outcome: MergeOutcome,
    },
    /// Local collection written to the server.
    Pushed { collection: Collection, items: usize },
    /// A fetch or push failed. Local state was left as it was.
    Failed {
        collection: Collection,
        operation: SyncOperation,
        error: String,
    },
    /// Both local stores were emptied on sign-out.
    Cleared,
}

/// Revisions covered by the most recent [`SyncCoordinator::flush`].
#[derive(Debug, Clone, Copy, Default)]
struct FlushMark {
    cart: u64,
    wishlist: u64,
}

impl FlushMark {
    const fn get(self, collection: Collection) -> u64 {
        match collection {
            Collection::Cart => self.cart,
            Collection::Wishlist => self.wishlist,
        }
    }
}

/// Drives sign-in merges, sign-out clears and debounced pushes.
///
/// Cheap to clone; clones share state.
pub struct SyncCoordinator<A> {
    inner: Arc<Inner<A>>,
}

impl<A> Clone for SyncCoordinator<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<A> {
    api: A,
    cart: CartStore,
    wishlist: WishlistStore,
    status: watch::Sender<AuthStatus>,
    events: broadcast::Sender<SyncEvent>,
    flush: watch::Sender<FlushMark>,
    debounce: Duration,
    /// Serializes status transitions so a sign-out cannot interleave with
    /// a sign-in merge.
    transition: Mutex<()>,
}

impl<A: SyncApi> SyncCoordinator<A> {
    /// Create a coordinator in the `Unauthenticated` state. No background
    /// work happens until [`start`](Self::start) is called.
    #[must_use]
    pub fn new(api: A, cart: CartStore, wishlist: WishlistStore, config: SyncConfig) -> Self {
        let (status, _) = watch::channel(AuthStatus::Unauthenticated);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let (flush, _) = watch::channel(FlushMark::default());

        Self {
            inner: Arc::new(Inner {
                api,
                cart,
                wishlist,
                status,
                events,
                flush,
                debounce: config.debounce,
                transition: Mutex::new(()),
            }),
        }
    }

    #[must_use]
    pub fn status(&self) -> AuthStatus {
        *self.inner.status.borrow()
    }

    #[must_use]
    pub fn watch_status(&self) -> watch::Receiver<AuthStatus> {
        self.inner.status.subscribe()
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.inner.events.subscribe()
    }

    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    #[must_use]
    pub fn wishlist(&self) -> &WishlistStore {
        &self.inner.wishlist
    }

    #[must_use]
    pub fn api(&self) -> &A {
        &self.inner.api
    }

    /// Apply an authentication change.
    ///
    /// Signing in pulls and merges both collections before returning; the
    /// status reads `Loading` while the fetches are in flight. Signing out
    /// clears both stores. Other transitions only update the status.
    #[instrument(skip(self), fields(from = %self.status()))]
    pub async fn set_auth_status(&self, status: AuthStatus) {
        let _guard = self.inner.transition.lock().await;
        let previous = *self.inner.status.borrow();

        match (previous, status) {
            (AuthStatus::Authenticated, AuthStatus::Authenticated) => {}
            (_, AuthStatus::Authenticated) => {
                self.inner.status.send_replace(AuthStatus::Loading);
                self.inner.sign_in().await;
            }
            (AuthStatus::Authenticated, AuthStatus::Unauthenticated) => {
                // Status first: the workers must see the clear as a signed-out change
                self.inner.status.send_replace(status);
                self.inner.sign_out();
            }
            _ => {
                self.inner.status.send_replace(status);
            }
        }
    }

    /// Spawn the cart and wishlist push workers.
    ///
    /// Whatever the stores hold at this point counts as already synced; every
    /// change after this call is pushed. Call once per coordinator. Dropping
    /// the returned handle stops the workers.
    #[must_use = "dropping the handle stops the sync workers"]
    pub fn start(&self) -> SyncHandle {
        let (shutdown, _) = watch::channel(false);
        let tasks = [Collection::Cart, Collection::Wishlist]
            .into_iter()
            .map(|collection| {
                // Subscribe here, not in the task, so nothing slips in before
                // the worker is first polled
                let watches = WorkerWatches {
                    revisions: self.inner.revisions(collection),
                    status: self.inner.status.subscribe(),
                    flushes: self.inner.flush.subscribe(),
                    shutdown: shutdown.subscribe(),
                };
                tokio::spawn(push_loop(Arc::clone(&self.inner), collection, watches))
            })
            .collect();

        SyncHandle { shutdown, tasks }
    }

    /// Push both collections now and cancel pending debounce timers.
    ///
    /// Does nothing unless signed in. Returns whether both pushes succeeded.
    pub async fn flush(&self) -> bool {
        if !self.status().is_authenticated() {
            debug!("Skipping flush while signed out");
            return false;
        }

        // Read revisions before snapshotting so a racing change is pushed again
        // rather than lost
        let mark = FlushMark {
            cart: self.inner.cart.revision(),
            wishlist: self.inner.wishlist.revision(),
        };
        self.inner.flush.send_replace(mark);

        let (cart, wishlist) = tokio::join!(
            self.inner.push(Collection::Cart),
            self.inner.push(Collection::Wishlist)
        );
        cart && wishlist
    }
}

impl<A: SyncApi> Inner<A> {
    fn emit(&self, event: SyncEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn is_authenticated(&self) -> bool {
        self.status.borrow().is_authenticated()
    }

    async fn sign_in(&self) {
        let (cart, wishlist) = tokio::join!(self.api.fetch_cart(), self.api.fetch_wishlist());

        // Merges below notify the workers, which only push while signed in
        self.status.send_replace(AuthStatus::Authenticated);

        match cart {
            Ok(items) => {
                self.emit(SyncEvent::Pulled {
                    collection: Collection::Cart,
                    items: items.len(),
                });
                let outcome = self.cart.merge_server(&Cart::from(items));
                self.merged(Collection::Cart, self.cart.items().len(), outcome);
            }
            Err(e) => self.failed(Collection::Cart, SyncOperation::Fetch, &e),
        }

        match wishlist {
            Ok(items) => {
                self.emit(SyncEvent::Pulled {
                    collection: Collection::Wishlist,
                    items: items.len(),
                });
                let outcome = self.wishlist.merge_server(&Wishlist::from(items));
                self.merged(Collection::Wishlist, self.wishlist.len(), outcome);
            }
            Err(e) => self.failed(Collection::Wishlist, SyncOperation::Fetch, &e),
        }
    }

    fn sign_out(&self) {
        self.cart.clear_cart();
        self.wishlist.clear_wishlist();
        info!("Cleared local cart and wishlist after sign-out");
        self.emit(SyncEvent::Cleared);
    }

    fn merged(&self, collection: Collection, items: usize, outcome: MergeOutcome) {
        info!(%collection, items, ?outcome, "Merged server copy");
        self.emit(SyncEvent::Merged {
            collection,
            items,
            outcome,
        });
    }

    fn failed(&self, collection: Collection, operation: SyncOperation, error: &SyncError) {
        warn!(%collection, %operation, error = %error, "Sync failed");
        self.emit(SyncEvent::Failed {
            collection,
            operation,
            error: error.to_string(),
        });
    }

    fn revisions(&self, collection: Collection) -> watch::Receiver<u64> {
        match collection {
            Collection::Cart => self.cart.subscribe(),
            Collection::Wishlist => self.wishlist.subscribe(),
        }
    }

    /// Replace the server copy with the current local collection.
    async fn push(&self, collection: Collection) -> bool {
        let result = match collection {
            Collection::Cart => {
                let items = self.cart.items();
                self.api.replace_cart(&items).await.map(|()| items.len())
            }
            Collection::Wishlist => {
                let items = self.wishlist.items();
                self.api.replace_wishlist(&items).await.map(|()| items.len())
            }
        };

        match result {
            Ok(items) => {
                debug!(%collection, items, "Pushed to server");
                self.emit(SyncEvent::Pushed { collection, items });
                true
            }
            Err(e) => {
                self.failed(collection, SyncOperation::Push, &e);
                false
            }
        }
    }
}

/// Handle to the running push workers.
#[derive(Debug)]
pub struct SyncHandle {
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl SyncHandle {
    /// Stop the workers and wait for them to exit. A push already in flight
    /// completes first; pending debounced pushes are dropped.
    pub async fn shutdown(self) {
        self.shutdown.send_replace(true);
        for task in self.tasks {
            if let Err(e) = task.await {
                warn!(error = %e, "Sync worker panicked");
            }
        }
    }
}

/// Receivers a worker listens on, created before the worker is spawned.
struct WorkerWatches {
    revisions: watch::Receiver<u64>,
    status: watch::Receiver<AuthStatus>,
    flushes: watch::Receiver<FlushMark>,
    shutdown: watch::Receiver<bool>,
}

async fn push_loop<A: SyncApi>(
    inner: Arc<Inner<A>>,
    collection: Collection,
    watches: WorkerWatches,
) {
    let WorkerWatches {
        mut revisions,
        mut status,
        mut flushes,
        mut shutdown,
    } = watches;
    let mut debouncer = Debouncer::new(inner.debounce);

    debug!(%collection, window_ms = inner.debounce.as_millis(), "Sync worker started");

    loop {
        tokio::select! {
            biased;

            _ = shutdown.changed() => break,

            changed = flushes.changed() => {
                if changed.is_err() {
                    break;
                }
                let flushed = flushes.borrow_and_update().get(collection);
                if *revisions.borrow() <= flushed {
                    revisions.borrow_and_update();
                    debouncer.cancel();
                }
            }

            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                let signed_in = status.borrow_and_update().is_authenticated();
                if !signed_in && debouncer.cancel() {
                    debug!(%collection, "Dropped pending push after sign-out");
                }
            }

            changed = revisions.changed() => {
                if changed.is_err() {
                    break;
                }
                revisions.borrow_and_update();
                if inner.is_authenticated() {
                    debouncer.trigger();
                }
            }

            () = debouncer.elapsed() => {
                if inner.is_authenticated() {
                    inner.push(collection).await;
                }
            }
        }
    }

    debug!(%collection, "Sync worker stopped");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use reqwest::StatusCode;
    use rust_decimal::Decimal;
    use sparklab_core::{CartItem, Product, ProductId, Quantity, WishlistItem};

    use super::*;
    use crate::storage::MemoryStorage;

    const WINDOW: Duration = Duration::from_millis(1000);

    #[derive(Default)]
    struct MockState {
        cart: Vec<CartItem>,
        wishlist: Vec<WishlistItem>,
        cart_pushes: Vec<Vec<CartItem>>,
        wishlist_pushes: Vec<Vec<WishlistItem>>,
        fail_fetch: bool,
        fail_push: bool,
    }

    #[derive(Default)]
    struct MockApi {
        state: StdMutex<MockState>,
    }

    impl MockApi {
        fn with(f: impl FnOnce(&mut MockState)) -> Arc<Self> {
            let api = Self::default();
            f(&mut api.state.lock().unwrap());
            Arc::new(api)
        }

        fn cart_pushes(&self) -> Vec<Vec<CartItem>> {
            self.state.lock().unwrap().cart_pushes.clone()
        }

        fn wishlist_pushes(&self) -> Vec<Vec<WishlistItem>> {
            self.state.lock().unwrap().wishlist_pushes.clone()
        }

        fn set(&self, f: impl FnOnce(&mut MockState)) {
            f(&mut self.state.lock().unwrap());
        }
    }

    impl SyncApi for MockApi {
        async fn fetch_cart(&self) -> Result<Vec<CartItem>, SyncError> {
            let state = self.state.lock().unwrap();
            if state.fail_fetch {
                return Err(SyncError::Status(StatusCode::SERVICE_UNAVAILABLE));
            }
            Ok(state.cart.clone())
        }

        async fn replace_cart(&self, items: &[CartItem]) -> Result<(), SyncError> {
            let mut state = self.state.lock().unwrap();
            if state.fail_push {
                return Err(SyncError::Status(StatusCode::INTERNAL_SERVER_ERROR));
            }
            state.cart = items.to_vec();
            state.cart_pushes.push(items.to_vec());
            Ok(())
        }

        async fn fetch_wishlist(&self) -> Result<Vec<WishlistItem>, SyncError> {
            let state = self.state.lock().unwrap();
            if state.fail_fetch {
                return Err(SyncError::Unauthorized);
            }
            Ok(state.wishlist.clone())
        }

        async fn replace_wishlist(&self, items: &[WishlistItem]) -> Result<(), SyncError> {
            let mut state = self.state.lock().unwrap();
            if state.fail_push {
                return Err(SyncError::Status(StatusCode::INTERNAL_SERVER_ERROR));
            }
            state.wishlist = items.to_vec();
            state.wishlist_pushes.push(items.to_vec());
            Ok(())
        }
    }

    fn product(id: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Kit {id}"),
            slug: id.to_lowercase(),
            price: Decimal::new(1000, 2),
            discount_price: None,
            image: String::new(),
            category: "physics".to_string(),
        }
    }

    fn qty(n: u32) -> Quantity {
        Quantity::new(n).unwrap()
    }

    fn line(id: &str, n: u32) -> CartItem {
        CartItem::new(&product(id), qty(n))
    }

    fn summary(items: &[CartItem]) -> Vec<(String, u32)> {
        items
            .iter()
            .map(|item| (item.id.to_string(), item.quantity.get()))
            .collect()
    }

    fn coordinator(api: &Arc<MockApi>) -> SyncCoordinator<Arc<MockApi>> {
        let storage = Arc::new(MemoryStorage::new());
        SyncCoordinator::new(
            Arc::clone(api),
            CartStore::load(storage.clone()),
            WishlistStore::load(storage),
            SyncConfig { debounce: WINDOW },
        )
    }

    /// Let the workers run past the debounce window.
    async fn settle() {
        tokio::time::sleep(WINDOW * 3).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_sign_in_with_empty_local_adopts_server() {
        let api = MockApi::with(|s| {
            s.cart = vec![line("A", 5), line("B", 1)];
            s.wishlist = vec![WishlistItem::from(&product("W"))];
        });
        let sync = coordinator(&api);
        let _workers = sync.start();

        sync.set_auth_status(AuthStatus::Authenticated).await;
        settle().await;

        assert_eq!(sync.status(), AuthStatus::Authenticated);
        assert_eq!(
            summary(&sync.cart().items()),
            [("A".to_string(), 5), ("B".to_string(), 1)]
        );
        assert!(sync.wishlist().is_in_wishlist(&ProductId::new("W")));
        assert!(api.cart_pushes().is_empty());
        assert!(api.wishlist_pushes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sign_in_merges_local_first_and_pushes_union_once() {
        let api = MockApi::with(|s| s.cart = vec![line("A", 5), line("B", 1)]);
        let sync = coordinator(&api);
        sync.cart().add_item(&product("A"), qty(2));
        let _workers = sync.start();
        let mut events = sync.subscribe();

        sync.set_auth_status(AuthStatus::Authenticated).await;
        settle().await;

        let expected = [("A".to_string(), 2), ("B".to_string(), 1)];
        assert_eq!(summary(&sync.cart().items()), expected);

        let pushes = api.cart_pushes();
        assert_eq!(pushes.len(), 1);
        assert_eq!(summary(pushes.first().unwrap()), expected);

        let mut saw_merge = false;
        while let Ok(event) = events.try_recv() {
            if let SyncEvent::Merged {
                collection: Collection::Cart,
                outcome,
                items,
            } = event
            {
                assert_eq!(outcome, MergeOutcome::Merged);
                assert_eq!(items, 2);
                saw_merge = true;
            }
        }
        assert!(saw_merge);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sign_out_clears_without_pushing() {
        let api = MockApi::with(|_| {});
        let sync = coordinator(&api);
        let _workers = sync.start();
        sync.set_auth_status(AuthStatus::Authenticated).await;

        sync.cart().add_item(&product("A"), qty(1));
        sync.wishlist().add_item(&product("W"));
        settle().await;
        assert_eq!(api.cart_pushes().len(), 1);
        assert_eq!(api.wishlist_pushes().len(), 1);

        let mut events = sync.subscribe();
        sync.set_auth_status(AuthStatus::Unauthenticated).await;
        settle().await;

        assert!(sync.cart().is_empty());
        assert!(sync.wishlist().is_empty());
        assert_eq!(api.cart_pushes().len(), 1);
        assert_eq!(api.wishlist_pushes().len(), 1);
        assert_eq!(events.try_recv().unwrap(), SyncEvent::Cleared);
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_of_changes_pushes_final_state_once() {
        let api = MockApi::with(|_| {});
        let sync = coordinator(&api);
        let _workers = sync.start();
        sync.set_auth_status(AuthStatus::Authenticated).await;

        for _ in 0..5 {
            sync.cart().add_item(&product("A"), qty(1));
            tokio::time::sleep(WINDOW / 4).await;
        }
        sync.cart().update_quantity(&ProductId::new("A"), qty(9));
        assert!(api.cart_pushes().is_empty());

        settle().await;

        let pushes = api.cart_pushes();
        assert_eq!(pushes.len(), 1);
        assert_eq!(summary(pushes.first().unwrap()), [("A".to_string(), 9)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_push_while_signed_out() {
        let api = MockApi::with(|_| {});
        let sync = coordinator(&api);
        let _workers = sync.start();

        sync.cart().add_item(&product("A"), qty(1));
        sync.wishlist().toggle(&product("W"));
        settle().await;

        assert!(api.cart_pushes().is_empty());
        assert!(api.wishlist_pushes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_state_at_start_is_not_pushed() {
        let api = MockApi::with(|s| s.cart = vec![line("A", 3)]);
        let sync = coordinator(&api);
        sync.cart().add_item(&product("A"), qty(3));
        sync.set_auth_status(AuthStatus::Authenticated).await;

        let _workers = sync.start();
        settle().await;
        assert!(api.cart_pushes().is_empty());

        sync.cart().add_item(&product("B"), qty(1));
        settle().await;
        assert_eq!(api.cart_pushes().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_change_right_after_start_is_pushed() {
        let api = MockApi::with(|_| {});
        let sync = coordinator(&api);
        sync.set_auth_status(AuthStatus::Authenticated).await;

        let _workers = sync.start();
        sync.cart().add_item(&product("A"), qty(1));
        sync.wishlist().add_item(&product("W"));
        settle().await;

        let pushes = api.cart_pushes();
        assert_eq!(pushes.len(), 1);
        assert_eq!(summary(pushes.first().unwrap()), [("A".to_string(), 1)]);
        assert_eq!(api.wishlist_pushes().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sign_out_inside_window_cancels_push() {
        let api = MockApi::with(|_| {});
        let sync = coordinator(&api);
        let _workers = sync.start();
        sync.set_auth_status(AuthStatus::Authenticated).await;

        sync.cart().add_item(&product("A"), qty(1));
        tokio::time::sleep(WINDOW / 2).await;
        sync.set_auth_status(AuthStatus::Unauthenticated).await;
        settle().await;

        assert!(api.cart_pushes().is_empty());
        assert!(sync.cart().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_failure_keeps_local_state() {
        let api = MockApi::with(|s| {
            s.cart = vec![line("B", 1)];
            s.fail_fetch = true;
        });
        let sync = coordinator(&api);
        sync.cart().add_item(&product("A"), qty(2));
        let _workers = sync.start();
        let mut events = sync.subscribe();

        sync.set_auth_status(AuthStatus::Authenticated).await;
        settle().await;

        assert_eq!(sync.status(), AuthStatus::Authenticated);
        assert_eq!(summary(&sync.cart().items()), [("A".to_string(), 2)]);
        assert!(api.cart_pushes().is_empty());

        let failures: Vec<_> = std::iter::from_fn(|| events.try_recv().ok())
            .filter(|e| {
                matches!(
                    e,
                    SyncEvent::Failed {
                        operation: SyncOperation::Fetch,
                        ..
                    }
                )
            })
            .collect();
        assert_eq!(failures.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_push_failure_is_reported() {
        let api = MockApi::with(|s| s.fail_push = true);
        let sync = coordinator(&api);
        let _workers = sync.start();
        sync.set_auth_status(AuthStatus::Authenticated).await;
        let mut events = sync.subscribe();

        sync.cart().add_item(&product("A"), qty(1));
        settle().await;

        assert_eq!(
            events.try_recv().unwrap(),
            SyncEvent::Failed {
                collection: Collection::Cart,
                operation: SyncOperation::Push,
                error: "server responded with 500 Internal Server Error".to_string(),
            }
        );
        assert_eq!(sync.cart().items().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_pushes_now_and_cancels_timer() {
        let api = MockApi::with(|_| {});
        let sync = coordinator(&api);
        let _workers = sync.start();
        sync.set_auth_status(AuthStatus::Authenticated).await;

        sync.cart().add_item(&product("A"), qty(1));
        tokio::task::yield_now().await;
        assert!(sync.flush().await);
        assert_eq!(api.cart_pushes().len(), 1);
        assert_eq!(api.wishlist_pushes().len(), 1);

        settle().await;
        assert_eq!(api.cart_pushes().len(), 1);

        api.set(|s| s.fail_push = true);
        assert!(!sync.flush().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_workers() {
        let api = MockApi::with(|_| {});
        let sync = coordinator(&api);
        let workers = sync.start();
        sync.set_auth_status(AuthStatus::Authenticated).await;

        sync.cart().add_item(&product("A"), qty(1));
        workers.shutdown().await;
        settle().await;

        assert!(api.cart_pushes().is_empty());
    }
}
