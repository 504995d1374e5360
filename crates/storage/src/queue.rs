// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persistent Offline Queues (§4.6): one directory-of-files FIFO per kind,
//! bounded by item count, aggregate bytes, and item age. When a bound is
//! exceeded the oldest items are discarded first (§3 invariant 5).

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;
use warden_core::queue_item::{QueueItemKind, QueuedItem};

use crate::config::OfflineQueueSettings;
use crate::error::StorageError;

fn seq_file_name(seq: u64) -> String {
    format!("{seq:020}.json")
}

/// One durable FIFO directory for a single [`QueueItemKind`].
pub struct OfflineQueue {
    dir: PathBuf,
    kind: QueueItemKind,
    next_seq: AtomicU64,
    max_count: usize,
    max_bytes: u64,
    max_age_ms: u64,
}

impl OfflineQueue {
    pub fn open(
        base_dir: &Path,
        kind: QueueItemKind,
        settings: &OfflineQueueSettings,
    ) -> Result<Self, StorageError> {
        let dir = base_dir.join(kind.dir_name());
        std::fs::create_dir_all(&dir)?;

        let next_seq = std::fs::read_dir(&dir)?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                entry
                    .path()
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .and_then(|s| s.parse::<u64>().ok())
            })
            .max()
            .map(|max| max + 1)
            .unwrap_or(0);

        let max_count = match kind {
            QueueItemKind::StatusReports => settings.max_status_reports,
            QueueItemKind::CommandResults => settings.max_command_results,
            QueueItemKind::ErrorReports => settings.max_error_reports,
        };

        Ok(Self {
            dir,
            kind,
            next_seq: AtomicU64::new(next_seq),
            max_count,
            max_bytes: settings.max_size_bytes,
            max_age_ms: settings.max_age_hours.saturating_mul(3_600_000),
        })
    }

    /// Persists `payload` as a new durable item. Best-effort: a write
    /// failure is returned to the caller to log, never panics.
    pub fn enqueue(&self, payload: Value, now_epoch_ms: u64) -> Result<QueuedItem, StorageError> {
        let item = QueuedItem::new(self.kind, payload, now_epoch_ms);
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        let path = self.dir.join(seq_file_name(seq));
        let body = serde_json::to_vec(&item)?;
        std::fs::write(&path, body)?;
        self.enforce_bounds()?;
        Ok(item)
    }

    /// Items oldest-first, by file sequence (§3: ordering preserved on drain).
    pub fn list(&self) -> Result<Vec<(PathBuf, QueuedItem)>, StorageError> {
        let mut entries: Vec<(PathBuf, QueuedItem)> = std::fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().extension().and_then(|e| e.to_str()) == Some("json"))
            .filter_map(|entry| {
                let path = entry.path();
                let body = std::fs::read(&path).ok()?;
                let item: QueuedItem = serde_json::from_slice(&body).ok()?;
                Some((path, item))
            })
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(entries)
    }

    pub fn remove(&self, path: &Path) -> Result<(), StorageError> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Increments the item's retry count in place, leaving it at the head
    /// of the next drain (§4.6: a per-item send failure re-queues instead
    /// of advancing).
    pub fn mark_retry(&self, path: &Path, item: &mut QueuedItem) -> Result<(), StorageError> {
        item.retry_count += 1;
        let body = serde_json::to_vec(item)?;
        std::fs::write(path, body)?;
        Ok(())
    }

    /// Removes items older than `max_age_hours`, then trims by count and
    /// aggregate byte size, oldest first, until within bounds.
    pub fn expire(&self, now_epoch_ms: u64) -> Result<usize, StorageError> {
        let mut entries = self.list()?;
        let mut removed = 0;

        entries.retain(|(path, item)| {
            if self.max_age_ms > 0 && item.age_ms(now_epoch_ms) > self.max_age_ms {
                let _ = std::fs::remove_file(path);
                removed += 1;
                false
            } else {
                true
            }
        });

        removed += self.trim_to_bounds(&mut entries)?;
        Ok(removed)
    }

    fn enforce_bounds(&self) -> Result<(), StorageError> {
        let mut entries = self.list()?;
        self.trim_to_bounds(&mut entries)?;
        Ok(())
    }

    fn trim_to_bounds(&self, entries: &mut Vec<(PathBuf, QueuedItem)>) -> Result<usize, StorageError> {
        let mut removed = 0;

        while entries.len() > self.max_count {
            let (path, _) = entries.remove(0);
            std::fs::remove_file(&path)?;
            removed += 1;
        }

        if self.max_bytes > 0 {
            loop {
                let total: u64 = entries
                    .iter()
                    .filter_map(|(path, _)| std::fs::metadata(path).ok())
                    .map(|m| m.len())
                    .sum();
                if total <= self.max_bytes || entries.is_empty() {
                    break;
                }
                let (path, _) = entries.remove(0);
                std::fs::remove_file(&path)?;
                removed += 1;
            }
        }

        Ok(removed)
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
