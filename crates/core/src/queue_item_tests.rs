// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn dir_name_matches_persisted_layout() {
    assert_eq!(QueueItemKind::StatusReports.dir_name(), "status_reports");
    assert_eq!(QueueItemKind::CommandResults.dir_name(), "command_results");
    assert_eq!(QueueItemKind::ErrorReports.dir_name(), "error_reports");
}

#[test]
fn age_ms_saturates_instead_of_underflowing() {
    let item = QueuedItem::new(QueueItemKind::StatusReports, serde_json::json!({}), 1_000);
    assert_eq!(item.age_ms(1_500), 500);
    assert_eq!(item.age_ms(0), 0);
}
