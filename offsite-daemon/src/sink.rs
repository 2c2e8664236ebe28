//! Append-only transfer log with write-count rotation.
//!
//! Every transfer attempt becomes one line:
//!
//! ```text
//! <local_dir> synced to <remote_dir> at <timestamp>
//! ```
//!
//! After `rotation_threshold` writes the file is truncated and re-seeded
//! with a fresh [`DaemonInfo`] block so it never grows without bound. Every
//! write is flushed immediately so an external `tail -f` sees events
//! promptly and a crash loses no buffered lines.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use nix::unistd;

use offsite_core::TransferOutcome;

use crate::error::{io_err, DaemonError};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Process identity snapshot written at startup and at each rotation.
///
/// Snapshots are written, never mutated in place — each rotation block
/// fully overwrites the prior one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonInfo {
    pub last_return_code: i32,
    pub pid: i32,
    pub parent_pid: i32,
    pub process_group_id: i32,
    pub session_id: i32,
    pub uid: u32,
    pub euid: u32,
    pub gid: u32,
    pub egid: u32,
}

impl DaemonInfo {
    /// Snapshot the calling process.
    pub fn capture(last_return_code: i32) -> Self {
        Self {
            last_return_code,
            pid: unistd::getpid().as_raw(),
            parent_pid: unistd::getppid().as_raw(),
            process_group_id: unistd::getpgrp().as_raw(),
            session_id: unistd::getsid(None).map(|p| p.as_raw()).unwrap_or(-1),
            uid: unistd::getuid().as_raw(),
            euid: unistd::geteuid().as_raw(),
            gid: unistd::getgid().as_raw(),
            egid: unistd::getegid().as_raw(),
        }
    }

    /// Fixed-format multi-line record, one field per line.
    pub fn block(&self) -> String {
        format!(
            "return code = {}\n\
             process ID = {}\n\
             parent process ID = {}\n\
             process group ID = {}\n\
             session ID = {}\n\
             user ID = {}\n\
             effective user ID = {}\n\
             real group ID = {}\n\
             effective group ID = {}\n",
            self.last_return_code,
            self.pid,
            self.parent_pid,
            self.process_group_id,
            self.session_id,
            self.uid,
            self.euid,
            self.gid,
            self.egid,
        )
    }
}

/// Append-only event log owned by the sync loop.
///
/// The write counter is instance state, not a global: invariant
/// `0 <= write_count <= rotation_threshold`, and reaching the threshold
/// triggers rotation followed by a reset to 0.
#[derive(Debug)]
pub struct LogSink {
    file: File,
    path: PathBuf,
    write_count: u32,
    rotation_threshold: u32,
    last_return_code: i32,
}

impl LogSink {
    /// Open (truncating) the log at `path` and seed it with a fresh
    /// process-info block. Used at daemon startup.
    pub fn open(
        path: &Path,
        rotation_threshold: u32,
        return_code: i32,
    ) -> Result<Self, DaemonError> {
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .map_err(|e| io_err(path, e))?;

        let info = DaemonInfo::capture(return_code);
        file.write_all(info.block().as_bytes())
            .map_err(|e| io_err(path, e))?;
        file.flush().map_err(|e| io_err(path, e))?;

        Ok(Self {
            file,
            path: path.to_path_buf(),
            write_count: 0,
            rotation_threshold,
            last_return_code: return_code,
        })
    }

    /// Re-establish a sink after a mid-flight logging failure.
    ///
    /// Opens in append mode and writes no seed block, so whatever survived
    /// the failure is kept. The counter restarts at 0.
    pub fn reopen(
        path: &Path,
        rotation_threshold: u32,
        return_code: i32,
    ) -> Result<Self, DaemonError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| io_err(path, e))?;

        Ok(Self {
            file,
            path: path.to_path_buf(),
            write_count: 0,
            rotation_threshold,
            last_return_code: return_code,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_count(&self) -> u32 {
        self.write_count
    }

    /// Append one transfer-event line and flush, regardless of the
    /// transfer's exit status. Rotates once the counter reaches the
    /// threshold.
    pub fn record(&mut self, outcome: &TransferOutcome) -> Result<(), DaemonError> {
        let line = format!(
            "{} synced to {} at {}\n",
            outcome.target.local_path.display(),
            outcome.destination,
            outcome.timestamp.format(TIMESTAMP_FORMAT),
        );
        self.file
            .write_all(line.as_bytes())
            .map_err(|e| io_err(&self.path, e))?;
        self.file.flush().map_err(|e| io_err(&self.path, e))?;

        self.write_count += 1;
        if self.write_count == self.rotation_threshold {
            self.rotate()?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), DaemonError> {
        self.file.flush().map_err(|e| io_err(&self.path, e))
    }

    /// Truncate the file, write a fresh [`DaemonInfo`] snapshot as the new
    /// content, and reset the counter.
    fn rotate(&mut self) -> Result<(), DaemonError> {
        let mut file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&self.path)
            .map_err(|e| io_err(&self.path, e))?;

        let info = DaemonInfo::capture(self.last_return_code);
        file.write_all(info.block().as_bytes())
            .map_err(|e| io_err(&self.path, e))?;
        file.flush().map_err(|e| io_err(&self.path, e))?;

        self.file = file;
        self.write_count = 0;
        tracing::debug!(path = %self.path.display(), "transfer log rotated");
        Ok(())
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
