//! Core types for Sparklab.
//!
//! This module provides type-safe wrappers for common domain concepts and
//! the two client-owned collections.

pub mod cart;
pub mod email;
pub mod id;
pub mod merge;
pub mod price;
pub mod product;
pub mod quantity;
pub mod status;
pub mod wishlist;

pub use cart::{Cart, CartItem, DuplicateProductError};
pub use email::{Email, EmailError};
pub use id::*;
pub use merge::{Keyed, merge_local_first};
pub use price::{CurrencyCode, Price};
pub use product::Product;
pub use quantity::{Quantity, QuantityError};
pub use status::AuthStatus;
pub use wishlist::{Wishlist, WishlistItem};
