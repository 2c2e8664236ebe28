//! Error types for offsite-sync.

use thiserror::Error;

/// All errors that can arise from transfer operations.
///
/// A non-zero exit status from the transfer tool is NOT an error — it is
/// reported inside `TransferOutcome`. Only failing to start the process
/// at all surfaces here.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The transfer program could not be spawned (missing binary,
    /// permission denied, fd exhaustion, ...).
    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}
