// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Records held by the Persistent Offline Queues while the live transport
//! is unavailable.

use serde::{Deserialize, Serialize};
use serde_json::Value;

crate::define_id! {
    pub struct QueueItemId("itm-");
}

/// The three queue kinds named in §4.6, one directory per kind on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueItemKind {
    StatusReports,
    CommandResults,
    ErrorReports,
}

crate::simple_display! {
    QueueItemKind {
        StatusReports => "status_reports",
        CommandResults => "command_results",
        ErrorReports => "error_reports",
    }
}

impl QueueItemKind {
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::StatusReports => "status_reports",
            Self::CommandResults => "command_results",
            Self::ErrorReports => "error_reports",
        }
    }
}

/// A single durable outbound record. `payload` carries the kind-specific
/// body (a `status_update`, `command_result`, or error report document)
/// as an opaque structured document per §9's design note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuedItem {
    pub item_id: QueueItemId,
    pub kind: QueueItemKind,
    pub payload: Value,
    pub enqueued_at_epoch_ms: u64,
    pub retry_count: u32,
}

impl QueuedItem {
    pub fn new(kind: QueueItemKind, payload: Value, enqueued_at_epoch_ms: u64) -> Self {
        Self {
            item_id: QueueItemId::new(),
            kind,
            payload,
            enqueued_at_epoch_ms,
            retry_count: 0,
        }
    }

    pub fn age_ms(&self, now_epoch_ms: u64) -> u64 {
        now_epoch_ms.saturating_sub(self.enqueued_at_epoch_ms)
    }
}

#[cfg(test)]
#[path = "queue_item_tests.rs"]
mod tests;
