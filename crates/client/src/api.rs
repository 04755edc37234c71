//! Server endpoints for the account's cart and wishlist.
//!
//! # Endpoints
//!
//! ```text
//! GET  /cart        -> CartItem[]
//! PUT  /cart        <- { "items": CartItem[] }
//! GET  /wishlist    -> WishlistItem[]
//! PUT  /wishlist    <- { "items": WishlistItem[] }
//! ```
//!
//! All four require a signed-in session. A `PUT` replaces the server record
//! wholesale.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sparklab_core::{CartItem, Email, UserId, WishlistItem};
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

/// Request timeout for sync calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// A failed fetch or push.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Transport failure: connection refused, timeout, TLS, etc.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The session is missing or expired.
    #[error("not signed in")]
    Unauthorized,

    /// Any other non-success status.
    #[error("server responded with {0}")]
    Status(StatusCode),

    /// The response body did not match the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The account behind the current session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SignedInUser {
    pub id: UserId,
    pub email: Email,
}

/// Remote record of the signed-in account's collections.
pub trait SyncApi: Send + Sync + 'static {
    fn fetch_cart(&self) -> impl Future<Output = Result<Vec<CartItem>, SyncError>> + Send;

    fn replace_cart(
        &self,
        items: &[CartItem],
    ) -> impl Future<Output = Result<(), SyncError>> + Send;

    fn fetch_wishlist(&self) -> impl Future<Output = Result<Vec<WishlistItem>, SyncError>> + Send;

    fn replace_wishlist(
        &self,
        items: &[WishlistItem],
    ) -> impl Future<Output = Result<(), SyncError>> + Send;
}

impl<T: SyncApi> SyncApi for Arc<T> {
    fn fetch_cart(&self) -> impl Future<Output = Result<Vec<CartItem>, SyncError>> + Send {
        (**self).fetch_cart()
    }

    fn replace_cart(
        &self,
        items: &[CartItem],
    ) -> impl Future<Output = Result<(), SyncError>> + Send {
        (**self).replace_cart(items)
    }

    fn fetch_wishlist(&self) -> impl Future<Output = Result<Vec<WishlistItem>, SyncError>> + Send {
        (**self).fetch_wishlist()
    }

    fn replace_wishlist(
        &self,
        items: &[WishlistItem],
    ) -> impl Future<Output = Result<(), SyncError>> + Send {
        (**self).replace_wishlist(items)
    }
}

#[derive(Serialize)]
struct ReplaceBody<'a, T> {
    items: &'a [T],
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

// =============================================================================
// HttpSyncApi
// =============================================================================

/// [`SyncApi`] over HTTP with a cookie-backed session.
///
/// Cheap to clone; clones share the connection pool and cookie jar.
#[derive(Clone)]
pub struct HttpSyncApi {
    inner: Arc<HttpSyncApiInner>,
}

struct HttpSyncApiInner {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSyncApi {
    /// Create a client for the storefront at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: &Url) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            inner: Arc::new(HttpSyncApiInner {
                client,
                base_url: base_url.as_str().trim_end_matches('/').to_owned(),
            }),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// Start a session with email and password.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Unauthorized`] for bad credentials, or another
    /// [`SyncError`] if the request fails.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<SignedInUser, SyncError> {
        let response = self
            .inner
            .client
            .post(self.url("/auth/login"))
            .json(&Credentials { email, password })
            .send()
            .await?;
        decode(response).await
    }

    /// End the current session.
    ///
    /// # Errors
    ///
    /// Returns a [`SyncError`] if the request fails.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), SyncError> {
        let response = self
            .inner
            .client
            .post(self.url("/auth/logout"))
            .send()
            .await?;
        check_status(response.status())
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, SyncError> {
        let response = self.inner.client.get(self.url(path)).send().await?;
        decode(response).await
    }

    async fn put_items<T: Serialize + Sync>(
        &self,
        path: &str,
        items: &[T],
    ) -> Result<(), SyncError> {
        let response = self
            .inner
            .client
            .put(self.url(path))
            .json(&ReplaceBody { items })
            .send()
            .await?;
        check_status(response.status())
    }
}

impl SyncApi for HttpSyncApi {
    #[instrument(skip(self))]
    async fn fetch_cart(&self) -> Result<Vec<CartItem>, SyncError> {
        let items: Vec<CartItem> = self.get_json("/cart").await?;
        debug!(items = items.len(), "Fetched server cart");
        Ok(items)
    }

    #[instrument(skip(self, items), fields(items = items.len()))]
    async fn replace_cart(&self, items: &[CartItem]) -> Result<(), SyncError> {
        self.put_items("/cart", items).await
    }

    #[instrument(skip(self))]
    async fn fetch_wishlist(&self) -> Result<Vec<WishlistItem>, SyncError> {
        let items: Vec<WishlistItem> = self.get_json("/wishlist").await?;
        debug!(items = items.len(), "Fetched server wishlist");
        Ok(items)
    }

    #[instrument(skip(self, items), fields(items = items.len()))]
    async fn replace_wishlist(&self, items: &[WishlistItem]) -> Result<(), SyncError> {
        self.put_items("/wishlist", items).await
    }
}

fn check_status(status: StatusCode) -> Result<(), SyncError> {
    if status.is_success() {
        Ok(())
    } else if status == StatusCode::UNAUTHORIZED {
        Err(SyncError::Unauthorized)
    } else {
        Err(SyncError::Status(status))
    }
}

/// Check the status, then parse the body as JSON.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, SyncError> {
    check_status(response.status())?;
    // Read as text first so a shape mismatch reports as `Decode`, not `Http`
    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}
