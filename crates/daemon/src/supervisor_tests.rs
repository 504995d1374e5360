// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::*;

#[tokio::test]
async fn cancelling_the_token_directly_returns_promptly() {
    let token = CancellationToken::new();
    let inner = token.clone();
    inner.cancel();

    tokio::time::timeout(Duration::from_millis(200), run_until_stop_signal(token))
        .await
        .expect("supervisor should return once already cancelled");
}
