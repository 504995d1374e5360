// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

fn settings(max_count: usize, max_bytes: u64, max_age_hours: u64) -> OfflineQueueSettings {
    OfflineQueueSettings {
        max_size_bytes: max_bytes,
        max_age_hours,
        max_status_reports: max_count,
        max_command_results: max_count,
        max_error_reports: max_count,
    }
}

#[test]
fn enqueue_then_list_round_trips_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let queue = OfflineQueue::open(dir.path(), QueueItemKind::StatusReports, &settings(100, 0, 0)).unwrap();

    queue.enqueue(json!({"n": 1}), 1_000).unwrap();
    queue.enqueue(json!({"n": 2}), 2_000).unwrap();
    queue.enqueue(json!({"n": 3}), 3_000).unwrap();

    let items = queue.list().unwrap();
    let values: Vec<_> = items.iter().map(|(_, item)| item.payload["n"].as_i64().unwrap()).collect();
    assert_eq!(values, vec![1, 2, 3]);
}

#[test]
fn enqueue_beyond_max_count_drops_oldest_first() {
    let dir = tempfile::tempdir().unwrap();
    let queue = OfflineQueue::open(dir.path(), QueueItemKind::CommandResults, &settings(2, 0, 0)).unwrap();

    queue.enqueue(json!({"n": 1}), 1_000).unwrap();
    queue.enqueue(json!({"n": 2}), 2_000).unwrap();
    queue.enqueue(json!({"n": 3}), 3_000).unwrap();

    let items = queue.list().unwrap();
    let values: Vec<_> = items.iter().map(|(_, item)| item.payload["n"].as_i64().unwrap()).collect();
    assert_eq!(values, vec![2, 3]);
}

#[test]
fn expire_removes_items_past_max_age() {
    let dir = tempfile::tempdir().unwrap();
    let queue = OfflineQueue::open(dir.path(), QueueItemKind::ErrorReports, &settings(100, 0, 1)).unwrap();

    queue.enqueue(json!({"n": "old"}), 0).unwrap();
    queue.enqueue(json!({"n": "new"}), 3_600_000).unwrap();

    let removed = queue.expire(3_600_001 + 3_600_000).unwrap();
    assert_eq!(removed, 1);
    let items = queue.list().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].1.payload["n"], "new");
}

#[test]
fn open_resumes_sequence_after_existing_items() {
    let dir = tempfile::tempdir().unwrap();
    {
        let queue =
            OfflineQueue::open(dir.path(), QueueItemKind::StatusReports, &settings(100, 0, 0)).unwrap();
        queue.enqueue(json!({"n": 1}), 1_000).unwrap();
    }
    let queue = OfflineQueue::open(dir.path(), QueueItemKind::StatusReports, &settings(100, 0, 0)).unwrap();
    queue.enqueue(json!({"n": 2}), 2_000).unwrap();

    let items = queue.list().unwrap();
    assert_eq!(items.len(), 2);
}

#[test]
fn mark_retry_increments_count_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let queue = OfflineQueue::open(dir.path(), QueueItemKind::StatusReports, &settings(100, 0, 0)).unwrap();
    queue.enqueue(json!({"n": 1}), 1_000).unwrap();

    let (path, mut item) = queue.list().unwrap().remove(0);
    queue.mark_retry(&path, &mut item).unwrap();

    let reloaded = queue.list().unwrap();
    assert_eq!(reloaded[0].1.retry_count, 1);
}

#[test]
fn remove_deletes_the_item_file() {
    let dir = tempfile::tempdir().unwrap();
    let queue = OfflineQueue::open(dir.path(), QueueItemKind::StatusReports, &settings(100, 0, 0)).unwrap();
    queue.enqueue(json!({"n": 1}), 1_000).unwrap();

    let (path, _) = queue.list().unwrap().remove(0);
    queue.remove(&path).unwrap();

    assert!(queue.list().unwrap().is_empty());
}
