// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use tempfile::tempdir;

use super::*;

#[test]
fn sha256_file_matches_known_digest() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("payload.bin");
    std::fs::write(&path, b"hello warden").expect("write");

    let digest = sha256_file(&path).expect("hash");
    assert_eq!(digest.len(), 64);
    assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(digest, sha256_file(&path).expect("hash again"));
}

#[test]
fn extract_zip_recreates_file_tree() {
    let dir = tempdir().expect("tempdir");
    let archive_path = dir.path().join("package.zip");
    {
        let file = std::fs::File::create(&archive_path).expect("create archive");
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::FileOptions::<'_, ()>::default();
        writer.start_file("wardend", options).expect("start file");
        writer.write_all(b"#!/bin/sh\necho agent\n").expect("write entry");
        writer.add_directory("subdir", options).expect("add dir");
        writer.start_file("subdir/notes.txt", options).expect("start nested");
        writer.write_all(b"release notes").expect("write nested");
        writer.finish().expect("finish archive");
    }

    let dest = dir.path().join("extracted");
    extract_zip(&archive_path, &dest).expect("extract");

    assert_eq!(std::fs::read_to_string(dest.join("wardend")).expect("read"), "#!/bin/sh\necho agent\n");
    assert_eq!(std::fs::read_to_string(dest.join("subdir/notes.txt")).expect("read"), "release notes");
}

#[test]
fn select_updater_binary_prefers_shipped_over_installed() {
    let dir = tempdir().expect("tempdir");
    let extract_dir = dir.path().join("extracted");
    let install_dir = dir.path().join("installed");
    std::fs::create_dir_all(&extract_dir).expect("mkdir extract");
    std::fs::create_dir_all(&install_dir).expect("mkdir install");
    std::fs::write(install_dir.join("warden-updater"), b"old").expect("write old");

    // No shipped binary yet: falls back to the installed one.
    assert_eq!(select_updater_binary(&extract_dir, &install_dir), install_dir.join("warden-updater"));

    std::fs::write(extract_dir.join("warden-updater"), b"new").expect("write new");
    assert_eq!(select_updater_binary(&extract_dir, &install_dir), extract_dir.join("warden-updater"));
}

#[test]
fn pipeline_errors_map_to_the_matching_agent_error_variant() {
    let err = UpdatePipelineError::ChecksumMismatch { expected: "a".into(), actual: "b".into() };
    let agent_err: warden_core::AgentError = err.into();
    assert_eq!(agent_err.kind(), "UpdateChecksumMismatch");

    let err = UpdatePipelineError::LaunchFailed("spawn failed".into());
    let agent_err: warden_core::AgentError = err.into();
    assert_eq!(agent_err.kind(), "UpdateServiceStartFailed");
}
