//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (database)
//!
//! # Auth (JSON)
//! POST /auth/register          - Create account, sign in (201)
//! POST /auth/login             - Sign in
//! POST /auth/logout            - Sign out (204)
//! GET  /auth/me                - Current account
//!
//! # Sync (JSON, requires auth)
//! GET  /cart                   - Stored cart
//! PUT  /cart                   - Replace stored cart (204)
//! GET  /wishlist               - Stored wishlist
//! PUT  /wishlist               - Replace stored wishlist (204)
//! ```

pub mod auth;
pub mod cart;
pub mod wishlist;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .layer(auth_rate_limiter())
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the cart and wishlist sync routes.
pub fn sync_routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(cart::show).put(cart::replace))
        .route("/wishlist", get(wishlist::show).put(wishlist::replace))
        .layer(api_rate_limiter())
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .merge(sync_routes())
}
