mod common;

use common::{answer_response, echo_tool, stub_server, tool_call_response, FakeChatApi};
use mcpbench::agent::{run_agent, TokenCounters, TraditionalHandler};
use mcpbench::api::Message;
use mcpbench::bridge::SessionTable;
use mcpbench::mcp::McpSession;

async fn connected_table() -> SessionTable {
    let (transport, _server) = stub_server(vec![echo_tool()]);
    let session = McpSession::connect("stub", transport, false).await.unwrap();
    let mut table = SessionTable::new(false);
    table.insert(session);
    table
}

#[tokio::test]
async fn echo_round_trip_produces_final_answer() {
    let table = connected_table().await;
    let mut handler = TraditionalHandler::new(table);
    assert_eq!(handler.tools_in_context(), 1);

    let api = FakeChatApi::new(vec![
        tool_call_response("call_1", "stub_echo", r#"{"text": "hi"}"#),
        answer_response("hi"),
    ]);

    let mut messages = vec![Message::user("say hi")];
    let mut counters = TokenCounters::default();
    let outcome = run_agent(&api, "gpt-4o-mini", &mut messages, &mut handler, 15, &mut counters, false)
        .await
        .unwrap();

    assert_eq!(api.request_count(), 2);
    assert_eq!(outcome.turns, 2);
    assert_eq!(outcome.dispatches, 1);
    assert_eq!(outcome.final_answer.as_deref(), Some("hi"));
    assert_eq!(counters.prompt_tokens, 150);
    assert_eq!(counters.completion_tokens, 15);

    // The echo result went back to the model as a tool message.
    let tool_message = messages.iter().find(|m| m.role == "tool").unwrap();
    assert_eq!(tool_message.content.as_deref(), Some("hi"));
    assert_eq!(tool_message.tool_call_id.as_deref(), Some("call_1"));

    handler.into_table().shutdown().await;
}

#[tokio::test]
async fn turn_budget_caps_chat_requests() {
    let table = connected_table().await;
    let mut handler = TraditionalHandler::new(table);

    // The model never stops asking for tool calls.
    let api = FakeChatApi::new(vec![
        tool_call_response("c1", "stub_echo", r#"{"text": "a"}"#),
        tool_call_response("c2", "stub_echo", r#"{"text": "b"}"#),
        tool_call_response("c3", "stub_echo", r#"{"text": "c"}"#),
        tool_call_response("c4", "stub_echo", r#"{"text": "d"}"#),
    ]);

    let mut messages = vec![Message::user("loop forever")];
    let mut counters = TokenCounters::default();
    let outcome = run_agent(&api, "gpt-4o-mini", &mut messages, &mut handler, 3, &mut counters, false)
        .await
        .unwrap();

    assert_eq!(api.request_count(), 3);
    assert_eq!(outcome.turns, 3);
    assert_eq!(outcome.dispatches, 3);
    assert!(outcome.final_answer.is_none());

    handler.into_table().shutdown().await;
}

#[tokio::test]
async fn unknown_tool_and_bad_arguments_become_tool_results() {
    let table = connected_table().await;
    let mut handler = TraditionalHandler::new(table);

    let api = FakeChatApi::new(vec![
        tool_call_response("c1", "stub_missing", r#"{}"#),
        tool_call_response("c2", "stub_echo", "not json"),
        answer_response("done"),
    ]);

    let mut messages = vec![Message::user("misbehave")];
    let mut counters = TokenCounters::default();
    let outcome = run_agent(&api, "gpt-4o-mini", &mut messages, &mut handler, 5, &mut counters, false)
        .await
        .unwrap();

    assert_eq!(outcome.final_answer.as_deref(), Some("done"));
    // The unparseable-arguments call never reached the handler.
    assert_eq!(outcome.dispatches, 1);

    let tool_messages: Vec<&str> = messages
        .iter()
        .filter(|m| m.role == "tool")
        .map(|m| m.content.as_deref().unwrap())
        .collect();
    assert_eq!(tool_messages.len(), 2);
    assert_eq!(tool_messages[0], "Error: Unknown tool stub_missing");
    assert!(tool_messages[1].starts_with("Error: failed to parse arguments"));

    handler.into_table().shutdown().await;
}

#[tokio::test]
async fn dispatch_after_shutdown_is_an_error_result() {
    let mut table = connected_table().await;
    table.shutdown().await;

    let value = table
        .dispatch("stub", "echo", serde_json::json!({"text": "hi"}))
        .await;
    assert_eq!(
        value,
        serde_json::Value::String("Error: Server 'stub' is not connected.".to_string())
    );
}
