// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn kind_matches_taxonomy_name() {
    assert_eq!(AgentError::CommandQueueFull.kind(), "CommandQueueFull");
    assert_eq!(
        AgentError::TokenDecryptionFailed("bad key".into()).kind(),
        "TokenDecryptionFailed"
    );
    assert_eq!(
        AgentError::UpdateChecksumMismatch {
            expected: "aa".into(),
            actual: "bb".into(),
        }
        .kind(),
        "UpdateChecksumMismatch"
    );
}

#[test]
fn only_startup_identity_errors_are_fatal_at_startup() {
    assert!(AgentError::ConfigLoadFailed("missing".into()).is_fatal_at_startup());
    assert!(AgentError::ConfigValidationFailed("bad range".into()).is_fatal_at_startup());
    assert!(AgentError::TokenDecryptionFailed("corrupt".into()).is_fatal_at_startup());
    assert!(!AgentError::WebSocketConnectionFailed("refused".into()).is_fatal_at_startup());
    assert!(!AgentError::CommandQueueFull.is_fatal_at_startup());
}
