//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Account registration and password login

pub mod auth;
