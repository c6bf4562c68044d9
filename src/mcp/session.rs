use colored::*;
use serde_json::{json, Value};

use super::transport::McpTransport;
use super::types::{InitializeResult, McpTool, McpToolResult, ToolListResponse};
use crate::error::{BenchError, Result};

const MCP_PROTOCOL_VERSION: &str = "2024-11-05";
const CLIENT_NAME: &str = "mcpbench";

/// One live connection to an MCP server: the handshake has completed and
/// the server's tool list is cached.
pub struct McpSession {
    name: String,
    transport: Box<dyn McpTransport>,
    next_id: u64,
    tools: Vec<McpTool>,
}

impl McpSession {
    pub async fn connect(
        name: &str,
        transport: Box<dyn McpTransport>,
        verbose: bool,
    ) -> Result<Self> {
        let mut session = Self {
            name: name.to_string(),
            transport,
            next_id: 1,
            tools: Vec::new(),
        };

        let init_params = json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "capabilities": { "tools": {} },
            "clientInfo": {
                "name": CLIENT_NAME,
                "version": env!("CARGO_PKG_VERSION"),
            }
        });

        let response = session.request("initialize", Some(init_params)).await?;
        let init_result: InitializeResult = serde_json::from_value(response)?;
        if verbose {
            eprintln!(
                "{}",
                format!(
                    "[mcp] connected to '{}' ({} v{})",
                    name, init_result.server_info.name, init_result.server_info.version
                )
                .dimmed()
            );
        }

        session.notify("notifications/initialized", None).await?;

        let response = session.request("tools/list", None).await?;
        let tool_list: ToolListResponse = serde_json::from_value(response)?;
        if verbose {
            for tool in &tool_list.tools {
                eprintln!(
                    "{}",
                    format!(
                        "[mcp]   tool {} - {}",
                        tool.name,
                        tool.description.as_deref().unwrap_or("")
                    )
                    .dimmed()
                );
            }
        }
        session.tools = tool_list.tools;

        Ok(session)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tools(&self) -> &[McpTool] {
        &self.tools
    }

    pub async fn call_tool(&mut self, tool_name: &str, arguments: Value) -> Result<McpToolResult> {
        let params = json!({
            "name": tool_name,
            "arguments": arguments,
        });
        let response = self.request("tools/call", Some(params)).await?;
        Ok(serde_json::from_value(response)?)
    }

    async fn request(&mut self, method: &str, params: Option<Value>) -> Result<Value> {
        let id = self.next_id;
        self.next_id += 1;

        let request = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params.unwrap_or(json!({})),
        });
        self.transport
            .send_line(&serde_json::to_string(&request)?)
            .await?;

        // Skip notifications and unrelated ids until our response arrives.
        while let Some(line) = self.transport.recv_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let response: Value = match serde_json::from_str(&line) {
                Ok(v) => v,
                Err(_) => continue,
            };
            if response.get("id") != Some(&json!(id)) {
                continue;
            }
            if let Some(result) = response.get("result") {
                return Ok(result.clone());
            }
            if let Some(error) = response.get("error") {
                return Err(BenchError::McpError(format!(
                    "server '{}' replied to '{}' with: {}",
                    self.name, method, error
                )));
            }
        }

        Err(BenchError::McpError(format!(
            "server '{}' closed the connection before answering '{}'",
            self.name, method
        )))
    }

    async fn notify(&mut self, method: &str, params: Option<Value>) -> Result<()> {
        let notification = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params.unwrap_or(json!({})),
        });
        self.transport
            .send_line(&serde_json::to_string(&notification)?)
            .await?;
        Ok(())
    }

    pub async fn close(&mut self) {
        self.transport.close().await;
    }
}
