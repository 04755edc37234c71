//! Sign in and reconcile the local stores with the storefront.
//!
//! # Usage
//!
//! ```bash
//! sl-cli sync --email ada@sparklab.store --password '...'
//! sl-cli sync --email ada@sparklab.store --password '...' --logout
//! ```
//!
//! # Environment Variables
//!
//! - `SPARKLAB_API_URL` - Storefront base URL
//! - `SPARKLAB_DATA_DIR` - Local store directory
//! - `SPARKLAB_PASSWORD` - Password, if not given with `--password`

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tokio::sync::broadcast;

use sparklab_client::{
    CartStore, ClientConfig, ConfigError, HttpSyncApi, StorageError, SyncCoordinator, SyncError,
    SyncEvent, SyncOperation, WishlistStore,
};
use sparklab_core::AuthStatus;

use super::local::open_storage;

#[derive(Debug, Error)]
pub enum SyncCommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Local storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    #[error("Could not load the server copy; nothing was pushed")]
    FetchFailed,

    #[error("Could not push local changes; staying signed in")]
    FlushFailed,
}

/// Log in, merge server state into the local stores and push the result.
///
/// With `logout`, signs out afterwards, which empties the local stores.
/// Returns one line per sync event. If either server copy cannot be
/// fetched nothing is pushed, so a partial local view never replaces it.
///
/// # Errors
///
/// Returns `SyncCommandError` if configuration or storage cannot be loaded,
/// the login is rejected, or the final push fails.
pub async fn run(
    email: &str,
    password: &SecretString,
    logout: bool,
) -> Result<Vec<String>, SyncCommandError> {
    let config = ClientConfig::from_env()?;
    let storage = open_storage(&config.data_dir)?;
    let cart = CartStore::load(std::sync::Arc::clone(&storage));
    let wishlist = WishlistStore::load(storage);

    let api = HttpSyncApi::new(&config.api_url)?;
    let user = api.login(email, password.expose_secret()).await?;
    tracing::info!(user_id = %user.id, api_url = %config.api_url, "Signed in");

    let coordinator = SyncCoordinator::new(api, cart, wishlist, config.sync);
    let mut events = coordinator.subscribe();
    let workers = coordinator.start();

    coordinator
        .set_auth_status(AuthStatus::Authenticated)
        .await;
    let mut seen = drain(&mut events);

    // Pushing now would overwrite a server copy we never merged
    let fetch_failed = seen.iter().any(|event| {
        matches!(
            event,
            SyncEvent::Failed {
                operation: SyncOperation::Fetch,
                ..
            }
        )
    });
    if fetch_failed {
        workers.shutdown().await;
        log_failures(&seen);
        return Err(SyncCommandError::FetchFailed);
    }

    let flushed = coordinator.flush().await;
    if flushed && logout {
        coordinator.api().logout().await?;
        coordinator
            .set_auth_status(AuthStatus::Unauthenticated)
            .await;
    }

    workers.shutdown().await;
    seen.extend(drain(&mut events));

    if !flushed {
        log_failures(&seen);
        return Err(SyncCommandError::FlushFailed);
    }
    Ok(seen.iter().map(describe).collect())
}

fn drain(events: &mut broadcast::Receiver<SyncEvent>) -> Vec<SyncEvent> {
    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    seen
}

fn log_failures(events: &[SyncEvent]) {
    for event in events {
        if matches!(event, SyncEvent::Failed { .. }) {
            tracing::warn!("{}", describe(event));
        }
    }
}

fn describe(event: &SyncEvent) -> String {
    match event {
        SyncEvent::Pulled { collection, items } => {
            format!("pulled {collection}: {items} on server")
        }
        SyncEvent::Merged {
            collection,
            items,
            outcome,
        } => format!("merged {collection}: {items} locally ({outcome:?})"),
        SyncEvent::Pushed { collection, items } => {
            format!("pushed {collection}: {items} saved")
        }
        SyncEvent::Failed {
            collection,
            operation,
            error,
        } => format!("{operation} {collection} failed: {error}"),
        SyncEvent::Cleared => "signed out; local cart and wishlist cleared".to_string(),
    }
}
