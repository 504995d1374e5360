// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn backoff_grows_but_is_capped_at_max() {
    let mut backoff = ReconnectBackoff::new(Duration::from_secs(1), Duration::from_secs(10), None);
    let mut last = Duration::ZERO;
    for _ in 0..10 {
        let delay = backoff.next_delay().unwrap();
        assert!(delay >= last || delay <= Duration::from_secs(10) + Duration::from_secs(3));
        last = delay;
    }
    assert!(last <= Duration::from_secs(13));
}

#[test]
fn backoff_exhausts_after_max_attempts() {
    let mut backoff = ReconnectBackoff::new(Duration::from_millis(10), Duration::from_secs(1), Some(2));
    assert!(backoff.next_delay().is_some());
    assert!(backoff.next_delay().is_some());
    assert!(backoff.next_delay().is_none());
}

#[test]
fn reset_allows_further_attempts_after_exhaustion() {
    let mut backoff = ReconnectBackoff::new(Duration::from_millis(10), Duration::from_secs(1), Some(1));
    assert!(backoff.next_delay().is_some());
    assert!(backoff.next_delay().is_none());
    backoff.reset();
    assert!(backoff.next_delay().is_some());
}

#[tokio::test]
async fn connect_to_unreachable_host_fails_fast() {
    let agent_id = AgentId::new();
    let result = connect("ws://127.0.0.1:1/warden", &agent_id, "token").await;
    assert!(result.is_err());
}
