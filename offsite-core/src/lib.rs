//! Offsite core library — domain types, static configuration, errors.
//!
//! Public API surface:
//! - [`types`] — [`SyncTarget`], [`RemoteDestination`], [`TransferOutcome`]
//! - [`config`] — [`Config`] load / validate
//! - [`error`] — [`ConfigError`]

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::ConfigError;
pub use types::{RemoteDestination, SyncTarget, TransferOutcome};
