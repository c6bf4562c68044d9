//! Shared test doubles: an in-memory MCP server speaking JSON-RPC over a
//! duplex stream, and a scripted chat endpoint.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::task::JoinHandle;

use mcpbench::api::{ChatApi, ChatRequest, ChatResponse};
use mcpbench::error::{BenchError, Result};
use mcpbench::mcp::{McpTool, McpTransport, StreamTransport};

/// One stub tool: its MCP definition plus the text each call returns.
pub struct StubTool {
    pub tool: McpTool,
    pub reply: Box<dyn Fn(&Value) -> String + Send + Sync>,
}

pub fn echo_tool() -> StubTool {
    StubTool {
        tool: McpTool {
            name: "echo".to_string(),
            description: Some("Echo the given text back".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": { "text": { "type": "string" } },
                "required": ["text"]
            }),
        },
        reply: Box::new(|args| args["text"].as_str().unwrap_or_default().to_string()),
    }
}

/// Spawns a stub MCP server on an in-memory stream and returns the client
/// transport for it. The server answers initialize, tools/list, and
/// tools/call; unknown tools produce an isError result.
pub fn stub_server(tools: Vec<StubTool>) -> (Box<dyn McpTransport>, JoinHandle<()>) {
    let (client_io, server_io) = tokio::io::duplex(64 * 1024);
    let (client_read, client_write) = tokio::io::split(client_io);
    let transport = StreamTransport::new(client_read, client_write);

    let handle = tokio::spawn(async move {
        let (server_read, mut server_write) = tokio::io::split(server_io);
        let mut lines = BufReader::new(server_read).lines();

        let definitions: Vec<Value> = tools
            .iter()
            .map(|stub| serde_json::to_value(&stub.tool).unwrap())
            .collect();
        let replies: HashMap<String, &StubTool> = tools
            .iter()
            .map(|stub| (stub.tool.name.clone(), stub))
            .collect();

        while let Ok(Some(line)) = lines.next_line().await {
            let request: Value = match serde_json::from_str(&line) {
                Ok(v) => v,
                Err(_) => continue,
            };
            let Some(id) = request.get("id").cloned() else {
                continue; // notification
            };
            let method = request["method"].as_str().unwrap_or_default();
            let result = match method {
                "initialize" => json!({
                    "protocolVersion": "2024-11-05",
                    "serverInfo": { "name": "stub", "version": "0.1.0" }
                }),
                "tools/list" => json!({ "tools": definitions }),
                "tools/call" => {
                    let name = request["params"]["name"].as_str().unwrap_or_default();
                    let arguments = &request["params"]["arguments"];
                    match replies.get(name) {
                        Some(stub) => {
                            let text = (stub.reply)(arguments);
                            json!({ "content": [{ "type": "text", "text": text }] })
                        }
                        None => json!({
                            "content": [{ "type": "text", "text": format!("no such tool: {}", name) }],
                            "isError": true
                        }),
                    }
                }
                _ => json!({}),
            };
            let response = json!({ "jsonrpc": "2.0", "id": id, "result": result });
            let line = serde_json::to_string(&response).unwrap();
            if server_write.write_all(line.as_bytes()).await.is_err() {
                break;
            }
            if server_write.write_all(b"\n").await.is_err() {
                break;
            }
        }
    });

    (Box::new(transport), handle)
}

/// Chat endpoint that plays back canned responses in order and counts
/// requests.
pub struct FakeChatApi {
    responses: Mutex<Vec<ChatResponse>>,
    pub requests: AtomicU32,
}

impl FakeChatApi {
    pub fn new(responses: Vec<ChatResponse>) -> Self {
        let mut responses = responses;
        responses.reverse();
        Self {
            responses: Mutex::new(responses),
            requests: AtomicU32::new(0),
        }
    }

    pub fn request_count(&self) -> u32 {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatApi for FakeChatApi {
    async fn complete(&self, _request: &ChatRequest) -> Result<ChatResponse> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| BenchError::Other("fake chat endpoint ran out of responses".to_string()))
    }
}

/// Response whose assistant message requests one tool call.
pub fn tool_call_response(call_id: &str, name: &str, arguments: &str) -> ChatResponse {
    from_json(json!({
        "choices": [{
            "message": {
                "content": null,
                "tool_calls": [{
                    "id": call_id,
                    "type": "function",
                    "function": { "name": name, "arguments": arguments }
                }]
            }
        }],
        "usage": { "prompt_tokens": 100, "completion_tokens": 10 }
    }))
}

/// Response with a plain final answer.
pub fn answer_response(content: &str) -> ChatResponse {
    from_json(json!({
        "choices": [{ "message": { "content": content } }],
        "usage": { "prompt_tokens": 50, "completion_tokens": 5 }
    }))
}

fn from_json(value: Value) -> ChatResponse {
    serde_json::from_value(value).unwrap()
}
