//! Remote-relative path derivation.
//!
//! A local absolute path is truncated at a configured anchor segment to
//! decide where it lands under the remote base. For
//! `/home/alice/Documents` with anchor `alice` the remote-relative path is
//! `alice/Documents/`, so the mirror reproduces the local layout from the
//! anchor down.

use std::path::Path;

use offsite_core::{RemoteDestination, SyncTarget};

/// Derive the remote-relative path for `local_path`.
///
/// Splits the path on `/`, drops a trailing empty segment left by a final
/// separator, and keeps everything from the first segment equal to
/// `anchor` (inclusive) to the end, joined with `/` plus exactly one
/// trailing `/`.
///
/// When the anchor never appears the cutoff index stays 0 and the whole
/// original path is kept. That is deliberate degraded behavior, not an
/// error: the target still syncs, just into a remote directory mirroring
/// the full local layout. Changing it would silently move data on the
/// remote.
pub fn remote_relative(local_path: &Path, anchor: &str) -> String {
    let raw = local_path.to_string_lossy();
    let mut segments: Vec<&str> = raw.split('/').collect();
    if segments.last() == Some(&"") {
        segments.pop();
    }

    let cutoff = segments
        .iter()
        .position(|segment| *segment == anchor)
        .unwrap_or(0);

    let mut relative = segments[cutoff..].join("/");
    relative.push('/');
    relative
}

/// Assemble the full remote endpoint for one target.
pub fn destination_for(target: &SyncTarget, base_remote: &str) -> RemoteDestination {
    RemoteDestination::new(
        base_remote,
        remote_relative(&target.local_path, &target.anchor_segment),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn starts_at_anchor_with_single_trailing_separator() {
        let relative = remote_relative(Path::new("/home/alice/Documents"), "alice");
        assert_eq!(relative, "alice/Documents/");
        assert!(!relative.ends_with("//"));
    }

    #[test]
    fn trailing_separator_on_input_is_not_doubled() {
        assert_eq!(
            remote_relative(Path::new("/home/alice/Documents/"), "alice"),
            "alice/Documents/"
        );
    }

    #[test]
    fn anchor_as_final_segment_keeps_just_the_anchor() {
        assert_eq!(remote_relative(Path::new("/data/alice"), "alice"), "alice/");
    }

    #[test]
    fn first_matching_segment_wins() {
        assert_eq!(
            remote_relative(Path::new("/backups/alice/mirror/alice/old"), "alice"),
            "alice/mirror/alice/old/"
        );
    }

    #[test]
    fn missing_anchor_keeps_the_full_original_path() {
        // Degraded-but-defined: cutoff index defaults to 0.
        assert_eq!(
            remote_relative(Path::new("/home/bob/Documents"), "alice"),
            "/home/bob/Documents/"
        );
    }

    #[test]
    fn destination_for_joins_base_and_relative() {
        let target = SyncTarget {
            local_path: PathBuf::from("/home/alice/Pictures"),
            anchor_segment: "alice".to_string(),
        };
        let dest = destination_for(&target, "user@host:/backup");
        assert_eq!(dest.spec(), "user@host:/backup/alice/Pictures/");
    }
}
