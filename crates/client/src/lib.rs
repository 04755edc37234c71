//! Sparklab client-side cart and wishlist state.
//!
//! Customers can fill a cart and a wishlist before signing in. Both
//! collections live locally (persisted through a [`LocalStorage`]) and are
//! reconciled with the account's server copy by the [`SyncCoordinator`]:
//!
//! - on sign-in the server copy is pulled and merged, local entries first
//! - on sign-out both local collections are cleared
//! - while signed in, each mutation is pushed after a quiet period
//!
//! Sync is best effort. Failures are logged and reported as [`SyncEvent`]s
//! but never retried or surfaced as errors; the local stores stay the source
//! of truth for the running session.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sparklab_client::{CartStore, FileStorage, HttpSyncApi, SyncCoordinator, WishlistStore};
//!
//! let storage = Arc::new(FileStorage::open(&config.data_dir)?);
//! let cart = CartStore::load(storage.clone());
//! let wishlist = WishlistStore::load(storage);
//!
//! let api = HttpSyncApi::new(&config.api_url)?;
//! let coordinator = SyncCoordinator::new(api, cart, wishlist, config.sync);
//! let _workers = coordinator.start();
//!
//! coordinator.set_auth_status(AuthStatus::Authenticated).await;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod coordinator;
pub mod debounce;
pub mod storage;
pub mod stores;

pub use api::{HttpSyncApi, SignedInUser, SyncApi, SyncError};
pub use config::{ClientConfig, ConfigError, SyncConfig};
pub use coordinator::{Collection, SyncCoordinator, SyncEvent, SyncHandle, SyncOperation};
pub use debounce::Debouncer;
pub use storage::{FileStorage, LocalStorage, MemoryStorage, StorageError};
pub use stores::{CartStore, MergeOutcome, WishlistStore};
