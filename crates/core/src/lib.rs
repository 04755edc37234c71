//! Sparklab Core - Shared types library.
//!
//! This crate provides common types used across all Sparklab components:
//! - `client` - Local cart/wishlist stores and the sync coordinator
//! - `storefront` - Server holding the durable cart/wishlist records
//! - `cli` - Command-line tools for migrations and local cart management
//!
//! # Architecture
//!
//! The core crate contains only types and pure collection logic - no I/O, no
//! database access, no HTTP clients. This keeps it lightweight and allows it
//! to be used on both sides of the wire.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, quantities and emails,
//!   plus the [`Cart`] and [`Wishlist`] collections

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
