// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use super::*;

#[test]
fn wait_for_exit_returns_true_immediately_when_lock_file_absent() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("wardend.pid");
    assert!(wait_for_old_agent_exit(&missing, Duration::from_millis(50)));
}

#[test]
fn wait_for_exit_returns_true_when_lock_is_free() {
    let dir = tempfile::tempdir().unwrap();
    let lock_path = dir.path().join("wardend.pid");
    std::fs::write(&lock_path, b"1234").unwrap();
    assert!(wait_for_old_agent_exit(&lock_path, Duration::from_millis(200)));
}

#[test]
fn wait_for_exit_times_out_while_lock_is_held() {
    let dir = tempfile::tempdir().unwrap();
    let lock_path = dir.path().join("wardend.pid");
    let held = std::fs::OpenOptions::new().write(true).create(true).open(&lock_path).unwrap();
    held.try_lock_exclusive().unwrap();
    assert!(!wait_for_old_agent_exit(&lock_path, Duration::from_millis(150)));
    fs2::FileExt::unlock(&held).unwrap();
}

#[test]
fn watchdog_reports_stable_when_process_outlives_window() {
    let child = Command::new("sleep").arg("2").spawn().unwrap();
    let outcome = watch(child, Duration::from_millis(300), || {
        Command::new("sleep").arg("2").spawn()
    });
    assert!(matches!(outcome, WatchdogOutcome::Stable));
}

#[test]
fn watchdog_respawns_once_then_trips_on_second_crash() {
    let child = Command::new("true").spawn().unwrap();
    let outcome = watch(child, Duration::from_millis(500), || Command::new("true").spawn());
    assert!(matches!(outcome, WatchdogOutcome::CrashedRepeatedly));
}
