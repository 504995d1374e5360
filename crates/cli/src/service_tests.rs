// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn error_messages_name_the_unit() {
    assert!(ServiceError::NotInstalled.to_string().contains("warden"));
    assert!(ServiceError::InsufficientPrivileges.to_string().contains("warden"));
}

#[test]
fn operation_failed_carries_the_underlying_message() {
    let err = ServiceError::OperationFailed("unit not loaded".to_string());
    assert!(err.to_string().contains("unit not loaded"));
}
