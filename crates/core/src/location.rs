// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operator-supplied placement of a host in the control plane's topology.

use serde::{Deserialize, Serialize};

/// `{room, x, y}` — used by the control plane to place the host on a map.
/// Carried verbatim in `identify`/`refresh` calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub room: String,
    pub x: f64,
    pub y: f64,
}

impl Location {
    pub fn new(room: impl Into<String>, x: f64, y: f64) -> Self {
        Self { room: room.into(), x, y }
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Default for Location {
    fn default() -> Self {
        Self::new("unassigned", 0.0, 0.0)
    }
}
