//! End-to-end remote destination derivation for a configured target set.

use std::path::PathBuf;

use offsite_core::Config;
use offsite_sync::remap::destination_for;

fn alice_config() -> Config {
    Config {
        watch_dirs: vec![
            PathBuf::from("/home/alice/Documents"),
            PathBuf::from("/home/alice/Pictures"),
        ],
        anchor_segment: "alice".to_string(),
        base_remote: "user@host:/backup".to_string(),
        interval_secs: 120,
        rotation_threshold: 100,
        log_dir: PathBuf::from("/tmp"),
        umask: 0,
        transfer_program: "rsync".to_string(),
        transfer_args: vec!["-rupz".to_string()],
    }
}

#[test]
fn every_target_lands_under_the_anchor() {
    let config = alice_config();
    let specs: Vec<String> = config
        .targets()
        .iter()
        .map(|target| destination_for(target, &config.base_remote).spec())
        .collect();

    assert_eq!(
        specs,
        vec![
            "user@host:/backup/alice/Documents/".to_string(),
            "user@host:/backup/alice/Pictures/".to_string(),
        ]
    );
}

#[test]
fn destinations_are_recomputed_identically_each_cycle() {
    let config = alice_config();
    let first: Vec<_> = config
        .targets()
        .iter()
        .map(|t| destination_for(t, &config.base_remote))
        .collect();
    let second: Vec<_> = config
        .targets()
        .iter()
        .map(|t| destination_for(t, &config.base_remote))
        .collect();
    assert_eq!(first, second);
}
