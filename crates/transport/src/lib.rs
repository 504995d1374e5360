// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! warden-transport: the HTTP Transport and WebSocket Transport (§4.4,
//! §4.5).

pub mod circuit_breaker;
pub mod error;
pub mod http;
pub mod ws;

pub use circuit_breaker::CircuitBreaker;
pub use error::TransportError;
pub use http::HttpTransport;
pub use ws::{connect, ConnectionEvent, ReconnectBackoff, WebSocketHandle};
