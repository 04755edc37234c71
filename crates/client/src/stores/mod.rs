//! Persisted cart and wishlist stores.
//!
//! Each store is a cheap `Clone` handle around shared state. Every change is
//! written through to [`LocalStorage`] and announced on a revision channel
//! that the sync coordinator watches; no-op mutations do neither.

mod cart;
mod wishlist;

pub use cart::CartStore;
pub use wishlist::WishlistStore;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sparklab_core::{Cart, Wishlist};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::storage::{self, LocalStorage};

/// Version tag written alongside persisted collections.
const PERSISTED_VERSION: u32 = 1;

/// How a server copy was folded into a store on sign-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The result equals the server copy; nothing needs to be pushed back.
    Adopted,
    /// Local entries the server lacks were kept; the server copy is stale.
    Merged,
}

/// A collection the coordinator knows how to reconcile.
pub trait SyncedCollection:
    Clone + Default + PartialEq + Serialize + DeserializeOwned + Send + 'static
{
    /// Local-first union with the server copy.
    fn merge_with_server(&self, server: &Self) -> Self;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SyncedCollection for Cart {
    fn merge_with_server(&self, server: &Self) -> Self {
        Cart::merge_with_server(self, server)
    }

    fn len(&self) -> usize {
        Cart::len(self)
    }
}

impl SyncedCollection for Wishlist {
    fn merge_with_server(&self, server: &Self) -> Self {
        Wishlist::merge_with_server(self, server)
    }

    fn len(&self) -> usize {
        Wishlist::len(self)
    }
}

/// On-disk envelope for a persisted collection.
#[derive(Serialize, Deserialize)]
struct Persisted<T> {
    version: u32,
    items: T,
}

/// Shared state behind a store handle.
pub(crate) struct PersistedCell<T> {
    state: Mutex<T>,
    storage: Arc<dyn LocalStorage>,
    key: &'static str,
    revision: watch::Sender<u64>,
}

impl<T: SyncedCollection> PersistedCell<T> {
    /// Restore from `storage`, falling back to an empty collection if the
    /// stored value is missing or unreadable.
    pub(crate) fn load(storage: Arc<dyn LocalStorage>, key: &'static str) -> Self {
        let state = match storage::load_json::<Persisted<T>>(storage.as_ref(), key) {
            Ok(Some(persisted)) => {
                debug!(key, items = persisted.items.len(), "Restored local state");
                persisted.items
            }
            Ok(None) => T::default(),
            Err(e) => {
                warn!(key, error = %e, "Discarding unreadable local state");
                T::default()
            }
        };

        let (revision, _) = watch::channel(0);
        Self {
            state: Mutex::new(state),
            storage,
            key,
            revision,
        }
    }

    fn lock(&self) -> MutexGuard<'_, T> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.lock())
    }

    /// Apply `f`; if it reports a change, persist and notify.
    pub(crate) fn mutate(&self, f: impl FnOnce(&mut T) -> bool) -> bool {
        let changed = {
            let mut state = self.lock();
            let changed = f(&mut state);
            if changed {
                self.persist(&state);
            }
            changed
        };
        if changed {
            self.notify();
        }
        changed
    }

    /// Fold the server copy in under a single lock.
    ///
    /// Watchers are notified only when the server copy needs updating, which
    /// may be the case even if the local collection itself is unchanged.
    pub(crate) fn merge_server(&self, server: &T) -> MergeOutcome {
        let outcome = {
            let mut state = self.lock();
            let merged = state.merge_with_server(server);
            let outcome = if merged == *server {
                MergeOutcome::Adopted
            } else {
                MergeOutcome::Merged
            };
            if merged != *state {
                *state = merged;
                self.persist(&state);
            }
            outcome
        };
        if outcome == MergeOutcome::Merged {
            self.notify();
        }
        outcome
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    pub(crate) fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    fn persist(&self, state: &T) {
        let persisted = Persisted {
            version: PERSISTED_VERSION,
            items: state,
        };
        if let Err(e) = storage::save_json(self.storage.as_ref(), self.key, &persisted) {
            warn!(key = self.key, error = %e, "Failed to persist local state");
        }
    }

    fn notify(&self) {
        self.revision.send_modify(|rev| *rev = rev.wrapping_add(1));
    }
}
