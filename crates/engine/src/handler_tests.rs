// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde_json::json;
use warden_core::command::CommandId;

use super::*;

fn request(payload: serde_json::Value) -> CommandRequest {
    CommandRequest {
        command_id: CommandId::new(),
        kind: "console".into(),
        payload,
        parameters: json!({}),
    }
}

#[tokio::test]
async fn console_handler_runs_and_captures_stdout() {
    let handler = ConsoleHandler;
    let output = handler.run(&request(json!({"command": "echo hi"}))).await;
    assert!(output.success);
    assert_eq!(output.stdout.unwrap().trim(), "hi");
}

#[tokio::test]
async fn console_handler_reports_failure_on_nonzero_exit() {
    let handler = ConsoleHandler;
    let output = handler.run(&request(json!({"command": "exit 7"}))).await;
    assert!(!output.success);
    assert_eq!(output.exit_code, Some(7));
}

#[tokio::test]
async fn console_handler_fails_fast_on_missing_command_field() {
    let handler = ConsoleHandler;
    let output = handler.run(&request(json!({}))).await;
    assert!(!output.success);
}

#[tokio::test]
async fn unknown_kind_handler_always_fails() {
    let handler = UnknownKindHandler;
    let output = handler.run(&request(json!({}))).await;
    assert!(!output.success);
}

#[tokio::test]
async fn registry_resolves_registered_kind_and_falls_back_otherwise() {
    let registry = HandlerRegistry::with_defaults();
    let console = registry.resolve("console");
    let fallback = registry.resolve("system_action");
    assert!(console.run(&request(json!({"command": "true"}))).await.success);
    assert!(!fallback.run(&request(json!({}))).await.success);
}

#[test]
fn into_result_maps_success_and_failure_shapes() {
    let id = CommandId::new();
    let ok = HandlerOutput::success(Some("out".into()), Some(0)).into_result(id, "console".into());
    assert!(ok.success);
    assert!(ok.error_kind.is_none());

    let err = HandlerOutput::failure("boom").into_result(id, "console".into());
    assert!(!err.success);
    assert_eq!(err.error_kind, Some(CommandOutcome::ExecutionError));
    assert_eq!(err.error_message.as_deref(), Some("boom"));
}
