use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::mcp::McpTool;

/// On-disk snapshot of one tool: `registry_root/<server>/<tool>.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub server_name: String,
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

impl ToolDescriptor {
    pub fn from_tool(server_name: &str, tool: &McpTool) -> Self {
        Self {
            server_name: server_name.to_string(),
            name: tool.name.clone(),
            description: tool
                .description
                .clone()
                .unwrap_or_else(|| "No description provided.".to_string()),
            input_schema: tool.input_schema.clone(),
        }
    }
}

/// Per-server directory listing: `registry_root/<server>/index.json`.
/// `generated_at` is the only field allowed to differ between rebuilds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerIndex {
    pub server_name: String,
    pub description: String,
    pub tools: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl ServerIndex {
    pub fn new(server_name: &str, tools: Vec<String>) -> Self {
        Self {
            server_name: server_name.to_string(),
            description: format!("Official tools for {}.", server_name),
            tools,
            generated_at: Utc::now(),
        }
    }
}
