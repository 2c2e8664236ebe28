//! Double-fork detachment from the controlling terminal.
//!
//! Sequence:
//! 1. fork — the original parent exits 0 immediately.
//! 2. setsid — the child becomes a session leader with no controlling
//!    terminal.
//! 3. fork again — the first child exits 0; the grandchild is not a
//!    session leader and can never re-acquire a controlling terminal.
//! 4. chdir to the log directory, reset the umask, close every inherited
//!    descriptor up to the RLIMIT_NOFILE hard limit.
//! 5. open `/dev/null` (becomes fd 0) and dup it onto stdout/stderr so no
//!    output escapes to a now-nonexistent terminal.
//!
//! `detach` returns only in the final surviving process; the two
//! intermediate branches exit with status 0 and never come back.

use std::path::Path;

use nix::fcntl::{open, OFlag};
use nix::sys::resource::{getrlimit, Resource, RLIM_INFINITY};
use nix::sys::stat::{umask, Mode};
use nix::unistd::{chdir, close, dup2, fork, setsid, ForkResult};

use crate::error::DaemonError;

/// Fallback descriptor ceiling when RLIMIT_NOFILE is unlimited.
const MAXFD: i32 = 1024;

/// Detach the current process from its terminal and session.
///
/// # Errors
/// Fork and setsid failures are fatal and abort daemonization; they never
/// occur after detachment completes.
pub fn detach(log_dir: &Path, mask: u32) -> Result<(), DaemonError> {
    match unsafe { fork() }
        .map_err(|e| DaemonError::Detach(format!("first fork failed: {e}")))?
    {
        ForkResult::Parent { .. } => std::process::exit(0),
        ForkResult::Child => {}
    }

    setsid().map_err(|e| DaemonError::Detach(format!("setsid failed: {e}")))?;

    match unsafe { fork() }
        .map_err(|e| DaemonError::Detach(format!("second fork failed: {e}")))?
    {
        ForkResult::Parent { .. } => std::process::exit(0),
        ForkResult::Child => {}
    }

    chdir(log_dir)
        .map_err(|e| DaemonError::Detach(format!("chdir to {} failed: {e}", log_dir.display())))?;
    umask(Mode::from_bits_truncate(mask as nix::libc::mode_t));

    close_inherited_descriptors();
    redirect_standard_streams()?;

    Ok(())
}

/// Close fds 0..ceiling; descriptors that were never open fail EBADF and
/// are ignored.
fn close_inherited_descriptors() {
    for fd in 0..descriptor_ceiling() {
        let _ = close(fd);
    }
}

fn descriptor_ceiling() -> i32 {
    match getrlimit(Resource::RLIMIT_NOFILE) {
        Ok((_soft, hard)) if hard != RLIM_INFINITY => i32::try_from(hard).unwrap_or(MAXFD),
        _ => MAXFD,
    }
}

/// With every descriptor closed, `/dev/null` opens as fd 0; stdout and
/// stderr are duplicated onto it.
fn redirect_standard_streams() -> Result<(), DaemonError> {
    let devnull = open(Path::new("/dev/null"), OFlag::O_RDWR, Mode::empty())
        .map_err(|e| DaemonError::Detach(format!("open /dev/null failed: {e}")))?;
    dup2(devnull, 1).map_err(|e| DaemonError::Detach(format!("dup2 stdout failed: {e}")))?;
    dup2(devnull, 2).map_err(|e| DaemonError::Detach(format!("dup2 stderr failed: {e}")))?;
    Ok(())
}

// ─── Tests ────────────────────────────────────────────────────────────────────
