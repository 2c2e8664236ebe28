//! Sync loop runtime: periodic cycles with per-target error isolation.
//!
//! The defining reliability property lives here: a single bad directory, a
//! transient network blip, or a logging hiccup never kills the process.
//! Nothing inside a cycle propagates far enough to end the loop; only a
//! termination signal does, after flushing and closing the log.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use offsite_core::Config;
use offsite_sync::{remap, TransferRunner};

use crate::error::{io_err, DaemonError};
use crate::paths::log_path;
use crate::sink::LogSink;

/// Start the sync loop and block the current thread until it exits.
///
/// Call after [`crate::detach`] (or directly, for foreground runs): the
/// tokio runtime must be built in the final surviving process, never
/// across a fork.
pub fn start_blocking(config: Config) -> Result<(), DaemonError> {
    init_tracing();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(run(config))
}

/// Run the sync loop forever: cycle, sleep, repeat, until a termination
/// signal arrives.
pub async fn run(config: Config) -> Result<(), DaemonError> {
    let config = Arc::new(config);
    ensure_log_dir(&config.log_dir)?;

    let runner = TransferRunner::from_config(&config);
    let log_file = log_path(&config.log_dir);

    // Startup snapshot. A missing sink degrades logging, never the loop.
    let mut sink = match LogSink::open(&log_file, config.rotation_threshold, 0) {
        Ok(sink) => Some(sink),
        Err(err) => {
            tracing::warn!(error = %err, "could not open transfer log; will retry next cycle");
            None
        }
    };

    let mut interval = tokio::time::interval(Duration::from_secs(config.interval_secs));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("termination signal received, closing transfer log");
                if let Some(sink) = sink.as_mut() {
                    let _ = sink.flush();
                }
                break;
            }
            _ = interval.tick() => {
                let config = config.clone();
                let runner = runner.clone();
                let log_file = log_file.clone();
                let cycle_sink = sink.take();

                match tokio::task::spawn_blocking(move || {
                    run_cycle(&config, &runner, &log_file, cycle_sink)
                })
                .await
                {
                    Ok(returned_sink) => sink = returned_sink,
                    Err(err) => {
                        // A panicked cycle loses its sink handle; the next
                        // cycle re-establishes it.
                        tracing::error!(error = %err, "sync cycle task panicked");
                    }
                }
            }
        }
    }

    Ok(())
}

/// One pass over every configured target, in fixed config order.
///
/// Never fails: transfer spawn errors and log write errors are traced and
/// skipped so the remaining targets (and all future cycles) still run.
/// Returns the sink for the next cycle, `None` if logging degraded.
fn run_cycle(
    config: &Config,
    runner: &TransferRunner,
    log_file: &Path,
    mut sink: Option<LogSink>,
) -> Option<LogSink> {
    if sink.is_none() {
        match LogSink::reopen(log_file, config.rotation_threshold, 0) {
            Ok(reopened) => sink = Some(reopened),
            Err(err) => {
                tracing::warn!(error = %err, "transfer log unavailable this cycle");
            }
        }
    }

    for target in config.targets() {
        let destination = remap::destination_for(&target, &config.base_remote);

        let outcome = match runner.run(&target, &destination) {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::error!(
                    dir = %target.local_path.display(),
                    error = %err,
                    "transfer could not be started",
                );
                continue;
            }
        };

        if !outcome.succeeded() {
            tracing::warn!(
                dir = %target.local_path.display(),
                destination = %destination,
                status = outcome.exit_status,
                "transfer exited non-zero",
            );
        }

        if let Some(active) = sink.as_mut() {
            if let Err(err) = active.record(&outcome) {
                tracing::warn!(
                    error = %err,
                    "log write failed; dropping sink until next cycle",
                );
                sink = None;
            }
        }
    }

    sink
}

async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut term = match signal(SignalKind::terminate()) {
        Ok(term) => term,
        Err(err) => {
            tracing::warn!(error = %err, "SIGTERM handler unavailable, ctrl-c only");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = term.recv() => {}
    }
}

fn ensure_log_dir(log_dir: &Path) -> Result<(), DaemonError> {
    if !log_dir.exists() {
        fs::create_dir_all(log_dir).map_err(|e| io_err(log_dir, e))?;
    }
    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::*;

    fn test_config(log_dir: &Path, program: &str) -> Config {
        Config {
            watch_dirs: vec![
                PathBuf::from("/home/alice/Documents"),
                PathBuf::from("/home/alice/Pictures"),
            ],
            anchor_segment: "alice".to_string(),
            base_remote: "user@host:/backup".to_string(),
            interval_secs: 120,
            rotation_threshold: 100,
            log_dir: log_dir.to_path_buf(),
            umask: 0,
            transfer_program: program.to_string(),
            transfer_args: vec![],
        }
    }

    fn transfer_lines(content: &str) -> Vec<&str> {
        content
            .lines()
            .filter(|line| line.contains(" synced to "))
            .collect()
    }

    #[test]
    fn failing_transfers_still_log_every_target() {
        let dir = TempDir::new().expect("tempdir");
        // `false` exits 1 for every target; both must still be attempted
        // and logged.
        let config = test_config(dir.path(), "false");
        let runner = TransferRunner::from_config(&config);
        let log_file = log_path(&config.log_dir);
        let sink = Some(LogSink::open(&log_file, config.rotation_threshold, 0).expect("open"));

        let sink = run_cycle(&config, &runner, &log_file, sink);
        assert!(sink.is_some(), "sink survives failed transfers");

        let content = fs::read_to_string(&log_file).expect("read");
        let lines = transfer_lines(&content);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("/home/alice/Documents synced to user@host:/backup/alice/Documents/"));
        assert!(lines[1].contains("/home/alice/Pictures synced to user@host:/backup/alice/Pictures/"));
    }

    #[test]
    fn consecutive_cycles_keep_running_after_failures() {
        let dir = TempDir::new().expect("tempdir");
        let config = test_config(dir.path(), "false");
        let runner = TransferRunner::from_config(&config);
        let log_file = log_path(&config.log_dir);
        let mut sink = Some(LogSink::open(&log_file, config.rotation_threshold, 0).expect("open"));

        for _ in 0..3 {
            sink = run_cycle(&config, &runner, &log_file, sink);
        }

        let content = fs::read_to_string(&log_file).expect("read");
        assert_eq!(transfer_lines(&content).len(), 6, "two targets, three cycles");
        assert_eq!(sink.expect("sink").write_count(), 6);
    }

    #[test]
    fn spawn_failure_skips_the_line_but_not_the_cycle() {
        let dir = TempDir::new().expect("tempdir");
        let config = test_config(dir.path(), "offsite-test-no-such-binary");
        let runner = TransferRunner::from_config(&config);
        let log_file = log_path(&config.log_dir);
        let sink = Some(LogSink::open(&log_file, config.rotation_threshold, 0).expect("open"));

        let sink = run_cycle(&config, &runner, &log_file, sink);
        assert!(sink.is_some(), "sink is untouched by spawn failures");

        let content = fs::read_to_string(&log_file).expect("read");
        assert!(transfer_lines(&content).is_empty());
    }

    #[test]
    fn missing_sink_is_reestablished_at_cycle_start() {
        let dir = TempDir::new().expect("tempdir");
        let config = test_config(dir.path(), "true");
        let runner = TransferRunner::from_config(&config);
        let log_file = log_path(&config.log_dir);

        let sink = run_cycle(&config, &runner, &log_file, None);
        let sink = sink.expect("sink reopened");
        assert_eq!(sink.write_count(), 2);

        let content = fs::read_to_string(&log_file).expect("read");
        assert_eq!(transfer_lines(&content).len(), 2);
    }

    #[test]
    fn unwritable_log_dir_degrades_logging_only() {
        let dir = TempDir::new().expect("tempdir");
        let mut config = test_config(dir.path(), "true");
        // Point the log inside a directory that does not exist; reopen
        // fails every cycle but syncing continues.
        config.log_dir = dir.path().join("missing");
        let runner = TransferRunner::from_config(&config);
        let log_file = log_path(&config.log_dir);

        let sink = run_cycle(&config, &runner, &log_file, None);
        assert!(sink.is_none());
    }
}
