// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
struct Ping {
    n: u32,
}

#[tokio::test]
async fn write_then_read_round_trips() {
    let mut buf = Vec::new();
    write_message(&mut buf, &Ping { n: 7 }).await.unwrap();

    let mut cursor = std::io::Cursor::new(buf);
    let decoded: Ping = read_message(&mut cursor).await.unwrap();
    assert_eq!(decoded, Ping { n: 7 });
}

#[tokio::test]
async fn read_message_rejects_oversized_frame() {
    let mut buf = Vec::new();
    buf.extend_from_slice(&(MAX_FRAME_LEN + 1).to_be_bytes());
    let mut cursor = std::io::Cursor::new(buf);
    let result: Result<Ping, _> = read_message(&mut cursor).await;
    assert!(matches!(result, Err(ProtocolError::FrameTooLarge(_))));
}
