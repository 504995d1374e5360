// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn failure_result_carries_outcome_and_message() {
    let id = CommandId::new();
    let result = CommandResult::failure(id, "console_exec", CommandOutcome::Timeout, "deadline exceeded");
    assert!(!result.success);
    assert_eq!(result.error_kind, Some(CommandOutcome::Timeout));
    assert_eq!(result.error_message.as_deref(), Some("deadline exceeded"));
}

#[test]
fn success_result_has_no_error_kind() {
    let id = CommandId::new();
    let result = CommandResult::success(id, "console_exec", Some("ok".into()), Some(0));
    assert!(result.success);
    assert!(result.error_kind.is_none());
}
