//! Server copy of the signed-in account's wishlist.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use sparklab_core::{Wishlist, WishlistItem};

use crate::db::WishlistRepository;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ReplaceWishlist {
    pub items: Vec<WishlistItem>,
}

/// `GET /wishlist`
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<WishlistItem>>> {
    let items = WishlistRepository::new(state.pool()).get(user.id).await?;
    Ok(Json(items))
}

/// `PUT /wishlist` - replace wholesale; `400` on duplicate products.
#[tracing::instrument(skip_all, fields(user_id = %user.id, items = body.items.len()))]
pub async fn replace(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<ReplaceWishlist>,
) -> Result<StatusCode> {
    let wishlist = Wishlist::try_from_items(body.items)?;
    WishlistRepository::new(state.pool())
        .replace(user.id, &wishlist)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
