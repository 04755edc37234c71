//! Integration tests for Sparklab.
//!
//! # Running Tests
//!
//! ```bash
//! # Client against the in-process fake storefront
//! cargo test -p sparklab-integration-tests
//!
//! # Against a running storefront (migrated database required)
//! SPARKLAB_API_URL=http://127.0.0.1:3000 \
//!     cargo test -p sparklab-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `client_sync` - `HttpSyncApi` + `SyncCoordinator` against [`FakeStorefront`]
//! - `storefront_live` - HTTP contract checks against a real storefront

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use url::Url;

use sparklab_core::{Cart, CartItem, Wishlist, WishlistItem};

/// Cookie the fake hands out on login.
const SESSION_COOKIE: &str = "sparklab_session";

/// Account the fake accepts.
pub const TEST_EMAIL: &str = "ada@sparklab.store";
pub const TEST_PASSWORD: &str = "correct horse battery";

/// What the fake currently holds and has been asked to do.
#[derive(Debug, Default, Clone)]
pub struct FakeState {
    pub cart: Vec<CartItem>,
    pub wishlist: Vec<WishlistItem>,
    pub cart_puts: Vec<Vec<CartItem>>,
    pub wishlist_puts: Vec<Vec<WishlistItem>>,
    pub logins: usize,
    pub logouts: usize,
    /// Answer every `/cart` and `/wishlist` request with 500.
    pub failing: bool,
    sessions: HashSet<String>,
}

/// In-process stand-in for the storefront's auth and sync routes.
///
/// Listens on an ephemeral port for as long as the value is alive.
pub struct FakeStorefront {
    addr: SocketAddr,
    state: Arc<Mutex<FakeState>>,
    server: tokio::task::JoinHandle<()>,
}

impl FakeStorefront {
    /// Bind to `127.0.0.1:0` and start serving.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(FakeState::default()));

        let app = Router::new()
            .route("/auth/login", post(login))
            .route("/auth/logout", post(logout))
            .route("/cart", get(get_cart).put(put_cart))
            .route("/wishlist", get(get_wishlist).put(put_wishlist))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake storefront");
        let addr = listener.local_addr().expect("Listener has no address");

        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            state,
            server,
        }
    }

    /// Base URL to hand to `HttpSyncApi::new`.
    ///
    /// # Panics
    ///
    /// Never in practice; the address is always a valid URL.
    #[must_use]
    pub fn url(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr)).expect("Socket address is a valid URL")
    }

    /// Inspect or change the fake's state.
    pub fn with_state<R>(&self, f: impl FnOnce(&mut FakeState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    #[must_use]
    pub fn snapshot(&self) -> FakeState {
        self.with_state(|state| state.clone())
    }
}

impl Drop for FakeStorefront {
    fn drop(&mut self) {
        self.server.abort();
    }
}

type Shared = Arc<Mutex<FakeState>>;

fn lock(state: &Shared) -> std::sync::MutexGuard<'_, FakeState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Deserialize)]
struct Credentials {
    email: String,
    password: String,
}

#[derive(Serialize)]
struct SignedIn {
    id: i32,
    email: String,
}

#[derive(Deserialize)]
struct ReplaceBody<T> {
    items: Vec<T>,
}

async fn login(State(state): State<Shared>, Json(body): Json<Credentials>) -> Response {
    if body.email != TEST_EMAIL || body.password != TEST_PASSWORD {
        return (StatusCode::UNAUTHORIZED, "Invalid credentials").into_response();
    }

    let token = uuid::Uuid::new_v4().to_string();
    {
        let mut state = lock(&state);
        state.logins += 1;
        state.sessions.insert(token.clone());
    }

    let cookie = format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax");
    (
        [(header::SET_COOKIE, cookie)],
        Json(SignedIn {
            id: 1,
            email: body.email,
        }),
    )
        .into_response()
}

async fn logout(State(state): State<Shared>, headers: HeaderMap) -> StatusCode {
    let mut state = lock(&state);
    if let Some(token) = session_token(&headers) {
        state.sessions.remove(&token);
    }
    state.logouts += 1;
    StatusCode::NO_CONTENT
}

fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token.to_string())
}

/// Shared gate for the sync routes: session first, then the failure switch.
fn authorize(state: &FakeState, headers: &HeaderMap) -> Result<(), StatusCode> {
    let signed_in = session_token(headers).is_some_and(|token| state.sessions.contains(&token));
    if !signed_in {
        return Err(StatusCode::UNAUTHORIZED);
    }
    if state.failing {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    Ok(())
}

async fn get_cart(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = lock(&state);
    match authorize(&state, &headers) {
        Ok(()) => Json(state.cart.clone()).into_response(),
        Err(status) => status.into_response(),
    }
}

async fn put_cart(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<ReplaceBody<CartItem>>,
) -> StatusCode {
    let mut state = lock(&state);
    if let Err(status) = authorize(&state, &headers) {
        return status;
    }
    let Ok(cart) = Cart::try_from_items(body.items) else {
        return StatusCode::BAD_REQUEST;
    };
    let items = cart.into_items();
    state.cart_puts.push(items.clone());
    state.cart = items;
    StatusCode::NO_CONTENT
}

async fn get_wishlist(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = lock(&state);
    match authorize(&state, &headers) {
        Ok(()) => Json(state.wishlist.clone()).into_response(),
        Err(status) => status.into_response(),
    }
}

async fn put_wishlist(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<ReplaceBody<WishlistItem>>,
) -> StatusCode {
    let mut state = lock(&state);
    if let Err(status) = authorize(&state, &headers) {
        return status;
    }
    let Ok(wishlist) = Wishlist::try_from_items(body.items) else {
        return StatusCode::BAD_REQUEST;
    };
    let items = wishlist.into_items();
    state.wishlist_puts.push(items.clone());
    state.wishlist = items;
    StatusCode::NO_CONTENT
}
