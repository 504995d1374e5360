// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn status_response_round_trips() {
    let resp = LocalResponse::Status {
        state: AgentState::Connected,
        uptime_secs: 42,
        agent_version: "1.2.3".into(),
    };
    let json = serde_json::to_string(&resp).unwrap();
    let back: LocalResponse = serde_json::from_str(&json).unwrap();
    assert_eq!(resp, back);
}
