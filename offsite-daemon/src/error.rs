use std::path::PathBuf;

use thiserror::Error;

/// Error surface for detachment, the log sink, and the sync loop runtime.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config error: {0}")]
    Config(#[from] offsite_core::ConfigError),

    #[error("sync error: {0}")]
    Sync(#[from] offsite_sync::SyncError),

    /// Process creation or session setup failed while detaching. Fatal:
    /// if the OS cannot create a process, nothing meaningful can proceed.
    #[error("detach failed: {0}")]
    Detach(String),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> DaemonError {
    DaemonError::Io {
        path: path.into(),
        source,
    }
}
