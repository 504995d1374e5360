// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn identify_response_success_round_trips() {
    let resp = IdentifyResponse::Success { token: Some("abc".into()) };
    let json = serde_json::to_string(&resp).unwrap();
    let back: IdentifyResponse = serde_json::from_str(&json).unwrap();
    match back {
        IdentifyResponse::Success { token } => assert_eq!(token.as_deref(), Some("abc")),
        _ => panic!("expected Success"),
    }
}

#[test]
fn server_event_tags_by_event_field() {
    let json = serde_json::json!({"event": "auth_success"});
    let event: ServerEvent = serde_json::from_value(json).unwrap();
    assert!(matches!(event, ServerEvent::AuthSuccess));
}

#[test]
fn check_update_response_absent_means_no_update() {
    let none: CheckUpdateResponse = None;
    assert!(serde_json::to_value(none).unwrap().is_null());
}
