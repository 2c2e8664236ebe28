//! External transfer tool invocation.
//!
//! The transfer mechanism itself is an opaque external command (rsync by
//! default) consumed through its exit status. One subprocess is spawned
//! per call and waited on synchronously before returning.

use std::process::Command;

use chrono::Local;

use offsite_core::{Config, RemoteDestination, SyncTarget, TransferOutcome};

use crate::error::SyncError;

/// Invokes the configured mirroring tool for one directory pair.
#[derive(Debug, Clone)]
pub struct TransferRunner {
    program: String,
    args: Vec<String>,
}

impl TransferRunner {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.transfer_program, config.transfer_args.clone())
    }

    /// Mirror one local directory to its remote destination.
    ///
    /// The source argument carries a trailing `/.` so the directory's
    /// contents are copied rather than the directory itself. A non-zero
    /// exit status is a reportable outcome, never an `Err`; only failing
    /// to spawn the process is an error.
    pub fn run(
        &self,
        target: &SyncTarget,
        destination: &RemoteDestination,
    ) -> Result<TransferOutcome, SyncError> {
        let source = format!("{}/.", target.local_path.display());
        let destination_spec = destination.spec();

        tracing::debug!(
            program = %self.program,
            source = %source,
            destination = %destination_spec,
            "starting transfer",
        );

        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(&source)
            .arg(&destination_spec)
            .status()
            .map_err(|e| SyncError::Spawn {
                program: self.program.clone(),
                source: e,
            })?;

        // Signal-terminated processes report no code.
        let exit_status = status.code().unwrap_or(-1);

        Ok(TransferOutcome {
            target: target.clone(),
            destination: destination.clone(),
            exit_status,
            timestamp: Local::now(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
