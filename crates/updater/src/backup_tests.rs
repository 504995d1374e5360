// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn write_file(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).unwrap();
}

#[test]
fn backup_then_restore_round_trips_contents() {
    let root = tempfile::tempdir().unwrap();
    let install_dir = root.path().join("install");
    let backup_dir = root.path().join("backup");
    std::fs::create_dir_all(&install_dir).unwrap();
    write_file(&install_dir, "wardend", "old-binary");

    backup_install_dir(&install_dir, &backup_dir).unwrap();
    assert!(!install_dir.exists());
    assert_eq!(std::fs::read_to_string(backup_dir.join("wardend")).unwrap(), "old-binary");

    restore_from_backup(&backup_dir, &install_dir).unwrap();
    assert!(!backup_dir.exists());
    assert_eq!(std::fs::read_to_string(install_dir.join("wardend")).unwrap(), "old-binary");
}

#[test]
fn deploy_replaces_existing_install_dir_contents() {
    let root = tempfile::tempdir().unwrap();
    let install_dir = root.path().join("install");
    let staging = root.path().join("staging");
    std::fs::create_dir_all(&install_dir).unwrap();
    write_file(&install_dir, "wardend", "old-binary");
    std::fs::create_dir_all(&staging).unwrap();
    write_file(&staging, "wardend", "new-binary");

    deploy_new_files(&staging, &install_dir).unwrap();
    assert_eq!(std::fs::read_to_string(install_dir.join("wardend")).unwrap(), "new-binary");
}

#[test]
fn cleanup_removes_directories_and_ignores_missing_ones() {
    let root = tempfile::tempdir().unwrap();
    let present = root.path().join("present");
    let absent = root.path().join("absent");
    std::fs::create_dir_all(&present).unwrap();

    cleanup(&[present.as_path(), absent.as_path()]);
    assert!(!present.exists());
}
