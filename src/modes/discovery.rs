use colored::*;
use std::fmt::Write as _;

use super::ModeReport;
use crate::agent::{run_agent, DiscoveryHandler, TokenCounters};
use crate::api::{ChatApi, ChatRequest, Message};
use crate::bridge::SessionTable;
use crate::config::Config;
use crate::error::{BenchError, Result};
use crate::registry;
use crate::ui;

pub const DEFAULT_MAX_TURNS: u32 = 3;

const PICK_SERVER_PROMPT: &str = "You are a tool discovery assistant. Given a user query, \
identify which tool server category would be most relevant. Respond with only the server name.";

const PICK_TOOL_PROMPT: &str = "You are a tool discovery assistant. Given a user query, \
identify which specific tool would be most relevant. Respond with only the tool name.";

/// Two-stage exploration of the on-disk registry (pick a server, then a
/// tool), collapsing the offer to a single capability before the main loop.
pub async fn run(
    config: &Config,
    api: &dyn ChatApi,
    query: &str,
    max_turns: Option<u32>,
) -> Result<ModeReport> {
    if !registry::registry_exists(&config.registry_root) {
        return Err(BenchError::RegistryError(
            "registry not found; run `mcpbench build-registry` first".to_string(),
        ));
    }
    let indexes = registry::load_indexes(&config.registry_root)?;
    if indexes.is_empty() {
        return Err(BenchError::RegistryError(
            "registry is empty; no servers were reachable at build time".to_string(),
        ));
    }

    ui::print_query(query);
    let mut counters = TokenCounters::default();

    // Stage 1: the model sees only server names and descriptions.
    let mut server_list = String::from("Available tool servers:");
    for index in &indexes {
        let _ = write!(server_list, "\n    - {}: {}", index.server_name, index.description);
    }
    let selected_server = pick(
        api,
        &config.model,
        PICK_SERVER_PROMPT,
        &format!("User query: {}\n\n{}\n\nWhich server should I use?", query, server_list),
        &mut counters,
    )
    .await?
    .to_lowercase();
    println!("Selected server: '{}'", selected_server.cyan());

    let index = indexes
        .iter()
        .find(|index| index.server_name == selected_server)
        .ok_or_else(|| {
            BenchError::Other(format!(
                "model selected unknown server '{}'",
                selected_server
            ))
        })?;

    // Stage 2: the model sees that server's tool names.
    let tools_list = index
        .tools
        .iter()
        .map(|tool| format!("- {}", tool))
        .collect::<Vec<_>>()
        .join("\n");
    let selected_tool = pick(
        api,
        &config.model,
        PICK_TOOL_PROMPT,
        &format!(
            "User query: {}\n\nAvailable tools:\n{}\n\nWhich tool should I use?",
            query, tools_list
        ),
        &mut counters,
    )
    .await?;
    println!("Selected tool: '{}'", selected_tool.cyan());

    if !index.tools.contains(&selected_tool) {
        return Err(BenchError::Other(format!(
            "model selected unknown tool '{}' on server '{}'",
            selected_tool, selected_server
        )));
    }
    let descriptor =
        registry::load_descriptor(&config.registry_root, &selected_server, &selected_tool)?;

    // Only the selected server is connected for the main loop.
    let launch = config
        .servers
        .iter()
        .find(|launch| launch.name == selected_server)
        .ok_or_else(|| {
            BenchError::ConfigError(format!(
                "server '{}' is in the registry but not configured",
                selected_server
            ))
        })?;
    let table = SessionTable::connect_all(std::slice::from_ref(launch), config.verbose).await;
    if !table.contains(&selected_server) {
        return Err(BenchError::McpError(format!(
            "could not connect to server '{}'",
            selected_server
        )));
    }

    let mut handler = DiscoveryHandler::new(table, &descriptor);
    let mut messages = vec![Message::user(query)];
    let result = run_agent(
        api,
        &config.model,
        &mut messages,
        &mut handler,
        max_turns.unwrap_or(DEFAULT_MAX_TURNS),
        &mut counters,
        config.verbose,
    )
    .await;

    let mut table = handler.into_table();
    table.shutdown().await;
    let outcome = result?;

    ui::print_answer(outcome.final_answer.as_deref());

    let report = ModeReport {
        mode: "DISCOVERY MODE",
        final_answer: outcome.final_answer,
        counters,
        turns: outcome.turns,
        dispatches: outcome.dispatches,
        tools_in_context: 1,
    };
    ui::print_report(&report);
    Ok(report)
}

/// One plain completion used by the discovery sub-dialog.
async fn pick(
    api: &dyn ChatApi,
    model: &str,
    system: &str,
    user: &str,
    counters: &mut TokenCounters,
) -> Result<String> {
    let messages = vec![Message::system(system), Message::user(user)];
    let response = api.complete(&ChatRequest::new(model, messages, None)).await?;
    if let Some(usage) = response.usage {
        counters.add(&usage);
    }
    response
        .first_message()
        .and_then(|message| message.content.clone())
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or_else(|| BenchError::Other("discovery sub-dialog returned no content".to_string()))
}
