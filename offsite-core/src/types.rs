//! Domain types for the offsite mirror daemon.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Sync targets
// ---------------------------------------------------------------------------

/// A single local directory registered for mirroring.
///
/// Built from static configuration at process start; immutable for the
/// process lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncTarget {
    /// Absolute path to the local directory.
    pub local_path: PathBuf,
    /// Path segment that marks where the remote-relative path begins.
    pub anchor_segment: String,
}

/// Fully resolved remote endpoint for one target, computed fresh each cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteDestination {
    /// `user@host:/base/path` prefix shared by every target.
    pub base_remote: String,
    /// Anchor-relative path, always ending in `/`.
    pub relative_path: String,
}

impl RemoteDestination {
    pub fn new(base_remote: impl Into<String>, relative_path: impl Into<String>) -> Self {
        Self {
            base_remote: base_remote.into(),
            relative_path: relative_path.into(),
        }
    }

    /// The argument form handed to the transfer tool:
    /// `user@host:/base/path/<relative>/`.
    pub fn spec(&self) -> String {
        format!("{}/{}", self.base_remote, self.relative_path)
    }
}

impl fmt::Display for RemoteDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.spec())
    }
}

// ---------------------------------------------------------------------------
// Transfer outcomes
// ---------------------------------------------------------------------------

/// Result of one transfer attempt for one directory in one cycle.
///
/// Produced by the transfer runner and consumed immediately by the log
/// sink; never persisted beyond the log line it becomes.
#[derive(Debug, Clone)]
pub struct TransferOutcome {
    pub target: SyncTarget,
    pub destination: RemoteDestination,
    /// Exit status of the external transfer process; `-1` when the
    /// process was terminated by a signal and reported no code.
    pub exit_status: i32,
    pub timestamp: DateTime<Local>,
}

impl TransferOutcome {
    pub fn succeeded(&self) -> bool {
        self.exit_status == 0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
