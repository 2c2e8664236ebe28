//! Static daemon configuration.
//!
//! Loaded once at startup from a YAML file and never reloaded; the daemon
//! has no dynamic reconfiguration channel.
//!
//! # Storage layout
//!
//! ```text
//! ~/.offsite/
//!   config.yaml
//! ```
//!
//! # API pattern
//!
//! Loaders have two forms:
//! - `load_at(path)` — explicit path; used in tests with `TempDir`
//! - `load()` — derives `~/.offsite/config.yaml` from `dirs::home_dir()`
//!
//! Tests must NEVER call the no-arg wrapper; always use `load_at`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::SyncTarget;

/// Seconds between sync cycles.
fn default_interval_secs() -> u64 {
    120
}

/// Transfer-event writes before the log is truncated and re-seeded.
fn default_rotation_threshold() -> u32 {
    100
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("/tmp")
}

fn default_transfer_program() -> String {
    "rsync".to_string()
}

/// Recursive, update-only (never overwrite a newer remote file), preserve
/// permissions, compress while uploading.
fn default_transfer_args() -> Vec<String> {
    vec!["-rupz".to_string()]
}

/// Everything the daemon needs, consumed as static values at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Local directories to mirror (absolute paths), synced in this order.
    pub watch_dirs: Vec<PathBuf>,
    /// Path segment where remote-relative paths begin.
    pub anchor_segment: String,
    /// `user@host:/base/path` prefix for every remote destination.
    pub base_remote: String,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_rotation_threshold")]
    pub rotation_threshold: u32,
    /// Directory holding the transfer log; also the daemon's working
    /// directory after detaching.
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    /// File-creation mask applied after detaching.
    #[serde(default)]
    pub umask: u32,
    #[serde(default = "default_transfer_program")]
    pub transfer_program: String,
    #[serde(default = "default_transfer_args")]
    pub transfer_args: Vec<String>,
}

impl Config {
    /// One [`SyncTarget`] per watch dir, in the fixed config order.
    pub fn targets(&self) -> Vec<SyncTarget> {
        self.watch_dirs
            .iter()
            .map(|dir| SyncTarget {
                local_path: dir.clone(),
                anchor_segment: self.anchor_segment.clone(),
            })
            .collect()
    }

    /// Reject configs the loop could not run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.watch_dirs.is_empty() {
            return Err(invalid("watch_dirs must list at least one directory"));
        }
        for dir in &self.watch_dirs {
            if !dir.is_absolute() {
                return Err(invalid(format!(
                    "watch dir {} is not an absolute path",
                    dir.display()
                )));
            }
        }
        if self.anchor_segment.is_empty() {
            return Err(invalid("anchor_segment must not be empty"));
        }
        if self.base_remote.is_empty() {
            return Err(invalid("base_remote must not be empty"));
        }
        if self.interval_secs == 0 {
            return Err(invalid("interval_secs must be at least 1"));
        }
        if self.rotation_threshold == 0 {
            return Err(invalid("rotation_threshold must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        reason: reason.into(),
    }
}

/// `<home>/.offsite/config.yaml` — pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    home.join(".offsite").join("config.yaml")
}

/// Load and validate the config at an explicit path.
///
/// Returns `ConfigError::NotFound` if absent, `ConfigError::Parse` (with
/// path + line context) if malformed YAML, `ConfigError::Invalid` if the
/// values fail [`Config::validate`].
pub fn load_at(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path)?;
    let config: Config = serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    config.validate()?;
    Ok(config)
}

/// `load_at` convenience wrapper using `~/.offsite/config.yaml`.
pub fn load() -> Result<Config, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
    load_at(&config_path_at(&home))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> Config {
        Config {
            watch_dirs: vec![PathBuf::from("/home/alice/Documents")],
            anchor_segment: "alice".to_string(),
            base_remote: "user@host:/backup".to_string(),
            interval_secs: default_interval_secs(),
            rotation_threshold: default_rotation_threshold(),
            log_dir: default_log_dir(),
            umask: 0,
            transfer_program: default_transfer_program(),
            transfer_args: default_transfer_args(),
        }
    }

    #[test]
    fn minimal_config_validates() {
        minimal().validate().expect("valid");
    }

    #[test]
    fn relative_watch_dir_is_rejected() {
        let mut config = minimal();
        config.watch_dirs = vec![PathBuf::from("Users/alice/Documents")];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn zero_threshold_is_rejected() {
        let mut config = minimal();
        config.rotation_threshold = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn targets_preserve_config_order() {
        let mut config = minimal();
        config.watch_dirs = vec![
            PathBuf::from("/home/alice/Documents"),
            PathBuf::from("/home/alice/Pictures"),
        ];
        let targets = config.targets();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].local_path, PathBuf::from("/home/alice/Documents"));
        assert_eq!(targets[1].local_path, PathBuf::from("/home/alice/Pictures"));
        assert!(targets.iter().all(|t| t.anchor_segment == "alice"));
    }
}
