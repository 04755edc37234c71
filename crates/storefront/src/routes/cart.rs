//! Server copy of the signed-in account's cart.
//!
//! The client owns the cart while the user browses and pushes the whole
//! thing here after each quiet period, so there is no per-line API.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use sparklab_core::{Cart, CartItem};

use crate::db::CartRepository;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// `PUT /cart` body.
#[derive(Debug, Deserialize)]
pub struct ReplaceCart {
    pub items: Vec<CartItem>,
}

/// `GET /cart` - the stored cart, in order. Empty if never written.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<CartItem>>> {
    let items = CartRepository::new(state.pool()).get(user.id).await?;
    Ok(Json(items))
}

/// `PUT /cart` - replace the stored cart wholesale.
///
/// Responds `400` if a product appears twice; quantities of zero are
/// rejected while decoding the body.
#[tracing::instrument(skip_all, fields(user_id = %user.id, lines = body.items.len()))]
pub async fn replace(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<ReplaceCart>,
) -> Result<StatusCode> {
    let cart = Cart::try_from_items(body.items)?;
    CartRepository::new(state.pool())
        .replace(user.id, &cart)
        .await?;

    tracing::debug!("Replaced server cart");
    Ok(StatusCode::NO_CONTENT)
}
