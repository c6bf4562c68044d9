use colored::*;

use super::ModeReport;
use crate::agent::{run_agent, TokenCounters, TraditionalHandler};
use crate::api::{ChatApi, Message};
use crate::bridge::SessionTable;
use crate::config::Config;
use crate::error::Result;
use crate::ui;

const SYSTEM_PROMPT: &str = "You are a helpful assistant with access to various tools.\n\
Use the available tools to complete the user's request.";

pub const DEFAULT_MAX_TURNS: u32 = 15;

/// All tools from all connected servers, offered every turn.
pub async fn run(
    config: &Config,
    api: &dyn ChatApi,
    query: &str,
    max_turns: Option<u32>,
) -> Result<ModeReport> {
    println!(
        "{}",
        "Connecting to MCP servers (loading ALL tools)...".bold()
    );
    let table = SessionTable::connect_all(&config.servers, config.verbose).await;
    let mut handler = TraditionalHandler::new(table);
    let tools_in_context = handler.tools_in_context();
    println!("\nTotal tools available: {}", tools_in_context);

    ui::print_query(query);

    let mut messages = vec![Message::system(SYSTEM_PROMPT), Message::user(query)];
    let mut counters = TokenCounters::default();
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

    // Tear the subprocesses down before surfacing any loop error.
    let mut table = handler.into_table();
    table.shutdown().await;
    let outcome = result?;

    ui::print_answer(outcome.final_answer.as_deref());

    let report = ModeReport {
        mode: "TRADITIONAL MODE",
        final_answer: outcome.final_answer,
        counters,
        turns: outcome.turns,
        dispatches: outcome.dispatches,
        tools_in_context,
    };
    ui::print_report(&report);
    Ok(report)
}
