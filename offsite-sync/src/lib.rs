//! # offsite-sync
//!
//! Remote-path derivation and external transfer invocation.
//!
//! Call [`remap::destination_for`] to compute where a local directory lands
//! on the remote, then [`TransferRunner::run`] to mirror it there.

pub mod error;
pub mod remap;
pub mod transfer;

pub use error::SyncError;
pub use transfer::TransferRunner;
