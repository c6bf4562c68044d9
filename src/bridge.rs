use colored::*;
use futures::future::join_all;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::io;
use tokio::time::{timeout, Duration};

use crate::config::ServerLaunch;
use crate::mcp::transport::{McpTransport, StdioTransport};
use crate::mcp::types::{McpTool, McpToolResult};
use crate::mcp::McpSession;

const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(30);

/// The live connections for one run. Built at startup, passed by reference
/// into whatever needs to dispatch, torn down with [`SessionTable::shutdown`]
/// (children are additionally kill-on-drop).
pub struct SessionTable {
    sessions: HashMap<String, McpSession>,
    verbose: bool,
}

/// One tool as offered to the model in traditional mode, with the flattened
/// `<server>_<tool>` name mapped back to its dispatch target.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub offered_name: String,
    pub server: String,
    pub tool: String,
    pub definition: Value,
}

impl SessionTable {
    pub fn new(verbose: bool) -> Self {
        Self {
            sessions: HashMap::new(),
            verbose,
        }
    }

    /// Connects to every configured server in parallel. A missing launch
    /// command or a failed handshake logs a warning and skips that server;
    /// the table always comes back usable.
    pub async fn connect_all(launches: &[ServerLaunch], verbose: bool) -> Self {
        let mut table = Self::new(verbose);

        let mut pending = Vec::new();
        for launch in launches {
            match StdioTransport::spawn(launch) {
                Ok(transport) => pending.push((launch.name.clone(), transport)),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    println!(
                        "{}",
                        format!(
                            "   Warning: skipping '{}': {} not found",
                            launch.name, launch.command
                        )
                        .yellow()
                    );
                }
                Err(e) => {
                    println!(
                        "{}",
                        format!("   Warning: could not start '{}': {}", launch.name, e).yellow()
                    );
                }
            }
        }

        let handshakes = pending.into_iter().map(|(name, transport)| async move {
            let result = timeout(
                HANDSHAKE_TIMEOUT,
                McpSession::connect(&name, Box::new(transport) as Box<dyn McpTransport>, verbose),
            )
            .await;
            (name, result)
        });

        for (name, result) in join_all(handshakes).await {
            match result {
                Ok(Ok(session)) => {
                    println!(
                        "{}",
                        format!("   Connected to '{}' ({} tools)", name, session.tools().len())
                            .green()
                    );
                    table.sessions.insert(name, session);
                }
                Ok(Err(e)) => {
                    println!(
                        "{}",
                        format!("   Warning: could not connect to '{}': {}", name, e).yellow()
                    );
                }
                Err(_) => {
                    println!(
                        "{}",
                        format!(
                            "   Warning: handshake with '{}' timed out after {}s",
                            name,
                            HANDSHAKE_TIMEOUT.as_secs()
                        )
                        .yellow()
                    );
                }
            }
        }

        table
    }

    pub fn insert(&mut self, session: McpSession) {
        self.sessions.insert(session.name().to_string(), session);
    }

    pub fn contains(&self, server: &str) -> bool {
        self.sessions.contains_key(server)
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Server names in a stable order.
    pub fn server_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.sessions.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn tools_of(&self, server: &str) -> Option<&[McpTool]> {
        self.sessions.get(server).map(|s| s.tools())
    }

    /// Every connected tool flattened into chat-API function definitions.
    pub fn catalog(&self) -> Vec<CatalogEntry> {
        let mut entries = Vec::new();
        for server in self.server_names() {
            for tool in self.sessions[&server].tools() {
                let offered_name = format!("{}_{}", server, tool.name);
                entries.push(CatalogEntry {
                    definition: openai_tool_def(&offered_name, tool),
                    offered_name,
                    server: server.clone(),
                    tool: tool.name.clone(),
                });
            }
        }
        entries
    }

    /// Forwards one call and normalizes the result. Total: every failure
    /// comes back as an error-shaped string value the agent loop can hand
    /// straight to the model.
    pub async fn dispatch(&mut self, server: &str, tool: &str, arguments: Value) -> Value {
        let Some(session) = self.sessions.get_mut(server) else {
            return Value::String(format!("Error: Server '{}' is not connected.", server));
        };
        if self.verbose {
            eprintln!(
                "{}",
                format!("[bridge] {}.{}({})", server, tool, arguments).dimmed()
            );
        }
        match session.call_tool(tool, arguments).await {
            Ok(result) => normalize_result(result),
            Err(e) => Value::String(format!("Error: {}", e)),
        }
    }

    pub async fn shutdown(&mut self) {
        for (_, mut session) in self.sessions.drain() {
            session.close().await;
        }
    }
}

/// Chat-API function definition for one MCP tool.
pub fn openai_tool_def(offered_name: &str, tool: &McpTool) -> Value {
    let parameters = if tool.input_schema.is_object() {
        tool.input_schema.clone()
    } else {
        json!({ "type": "object", "properties": {} })
    };
    json!({
        "type": "function",
        "function": {
            "name": offered_name,
            "description": tool.description.as_deref().unwrap_or("No description"),
            "parameters": parameters,
        }
    })
}

/// Collapses the protocol's content-item envelope to the tool's actual
/// return shape: joined text, promoted to a structure when it parses as a
/// JSON object or array.
fn normalize_result(result: McpToolResult) -> Value {
    let text = result
        .content
        .iter()
        .filter(|item| item.content_type == "text")
        .map(|item| item.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    if result.is_error == Some(true) {
        return Value::String(format!("Error: {}", text));
    }
    promote(text)
}

/// JSON-looking text becomes the parsed structure; anything else passes
/// through unchanged.
pub fn promote(text: String) -> Value {
    let trimmed = text.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        if let Ok(value) = serde_json::from_str(trimmed) {
            return value;
        }
    }
    Value::String(text)
}

/// String form of a dispatch result for a tool-role message.
pub fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string(other).unwrap_or_else(|_| other.to_string()),
    }
}
