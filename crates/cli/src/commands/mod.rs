//! Subcommand implementations for `sl-cli`.

pub mod local;
pub mod migrate;
pub mod sync;
