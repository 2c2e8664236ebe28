use std::path::{Path, PathBuf};

pub const LOG_FILE: &str = "offsite.log";

/// `<log_dir>/offsite.log`
pub fn log_path(log_dir: &Path) -> PathBuf {
    log_dir.join(LOG_FILE)
}
