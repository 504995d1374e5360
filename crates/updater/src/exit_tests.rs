// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn codes_match_the_external_interface() {
    assert_eq!(UpdaterExit::Success.code(), 0);
    assert_eq!(UpdaterExit::BackupFailed.code(), 11);
    assert_eq!(UpdaterExit::DeployFailed.code(), 12);
    assert_eq!(UpdaterExit::NewServiceStartFailed.code(), 13);
    assert_eq!(UpdaterExit::RollbackFailed.code(), 14);
    assert_eq!(UpdaterExit::InvalidArguments.code(), 15);
    assert_eq!(UpdaterExit::AgentStopTimeout.code(), 16);
    assert_eq!(UpdaterExit::WatchdogTriggeredRollback.code(), 17);
    assert_eq!(UpdaterExit::General.code(), 99);
}
