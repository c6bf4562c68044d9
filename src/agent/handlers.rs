use async_trait::async_trait;
use serde_json::{json, Value};

use crate::bridge::{openai_tool_def, render, CatalogEntry, SessionTable};
use crate::mcp::McpTool;
use crate::registry::ToolDescriptor;
use crate::script::{run_script, ScriptEnv};

/// What the agent loop offers the model each turn, and how a requested
/// call is executed. One implementation per strategy; all of them own the
/// session table for the duration of the run.
#[async_trait]
pub trait CallHandler: Send {
    fn offered_tools(&self) -> Vec<Value>;

    /// Executes one requested call. Total: failures come back as text.
    async fn handle(&mut self, name: &str, arguments: Value) -> String;
}

/// Traditional mode: every tool from every connected server, every turn.
pub struct TraditionalHandler {
    table: SessionTable,
    catalog: Vec<CatalogEntry>,
}

impl TraditionalHandler {
    pub fn new(table: SessionTable) -> Self {
        let catalog = table.catalog();
        Self { table, catalog }
    }

    pub fn tools_in_context(&self) -> usize {
        self.catalog.len()
    }

    pub fn into_table(self) -> SessionTable {
        self.table
    }
}

#[async_trait]
impl CallHandler for TraditionalHandler {
    fn offered_tools(&self) -> Vec<Value> {
        self.catalog
            .iter()
            .map(|entry| entry.definition.clone())
            .collect()
    }

    async fn handle(&mut self, name: &str, arguments: Value) -> String {
        let Some(entry) = self.catalog.iter().find(|e| e.offered_name == name) else {
            return format!("Error: Unknown tool {}", name);
        };
        let (server, tool) = (entry.server.clone(), entry.tool.clone());
        render(&self.table.dispatch(&server, &tool, arguments).await)
    }
}

/// Discovery mode after the sub-dialog: exactly one capability remains.
pub struct DiscoveryHandler {
    table: SessionTable,
    server: String,
    tool: String,
    definition: Value,
}

impl DiscoveryHandler {
    pub fn new(table: SessionTable, descriptor: &ToolDescriptor) -> Self {
        let tool = McpTool {
            name: descriptor.name.clone(),
            description: Some(descriptor.description.clone()),
            input_schema: descriptor.input_schema.clone(),
        };
        Self {
            table,
            server: descriptor.server_name.clone(),
            tool: descriptor.name.clone(),
            definition: openai_tool_def(&descriptor.name, &tool),
        }
    }

    pub fn into_table(self) -> SessionTable {
        self.table
    }
}

#[async_trait]
impl CallHandler for DiscoveryHandler {
    fn offered_tools(&self) -> Vec<Value> {
        vec![self.definition.clone()]
    }

    async fn handle(&mut self, name: &str, arguments: Value) -> String {
        if name != self.tool {
            return format!("Error: Unknown tool {}", name);
        }
        let (server, tool) = (self.server.clone(), self.tool.clone());
        render(&self.table.dispatch(&server, &tool, arguments).await)
    }
}

/// Code mode: one synthetic run_script capability; real tools are reached
/// through the script runner.
pub struct CodeHandler {
    table: SessionTable,
    env: ScriptEnv,
}

pub const RUN_SCRIPT_TOOL: &str = "run_script";

impl CodeHandler {
    pub fn new(table: SessionTable, env: ScriptEnv) -> Self {
        Self { table, env }
    }

    pub fn into_table(self) -> SessionTable {
        self.table
    }
}

#[async_trait]
impl CallHandler for CodeHandler {
    fn offered_tools(&self) -> Vec<Value> {
        vec![json!({
            "type": "function",
            "function": {
                "name": RUN_SCRIPT_TOOL,
                "description": "Executes a tool script, one statement per line. \
                    Use servers(), index(\"server\") and describe(\"server\", \"tool\") \
                    to explore the registry, then call a tool like \
                    get_current_time({\"timezone\": \"Europe/Amsterdam\"}).",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "code": { "type": "string", "description": "The script to execute" }
                    },
                    "required": ["code"]
                }
            }
        })]
    }

    async fn handle(&mut self, name: &str, arguments: Value) -> String {
        if name != RUN_SCRIPT_TOOL {
            return format!("Error: Unknown tool {}", name);
        }
        let Some(code) = arguments.get("code").and_then(|c| c.as_str()) else {
            return "Error: run_script requires a 'code' string argument".to_string();
        };
        let code = code.to_string();
        run_script(&code, &self.env, &mut self.table).await
    }
}
