use colored::*;

use super::ModeReport;
use crate::agent::{run_agent, CodeHandler, TokenCounters};
use crate::api::{ChatApi, Message};
use crate::bridge::SessionTable;
use crate::config::Config;
use crate::error::{BenchError, Result};
use crate::registry;
use crate::script::ScriptEnv;
use crate::ui;

pub const DEFAULT_MAX_TURNS: u32 = 8;

const SYSTEM_PROMPT: &str = r#"You are an agent that completes tasks by writing short tool scripts.
A registry of tool servers is available. Submit scripts with the run_script tool, one statement per line:
    servers()                        list available tool servers
    index("git")                     list a server's tools
    describe("git", "git_status")    show a tool's parameters
    git_status({"repo_path": "."})   call a tool with a JSON object argument
Always start by listing servers, and read a tool's description before calling it.
Arguments must be valid JSON; strings need double quotes.
When you know the answer, reply with it directly instead of calling run_script."#;

/// One synthetic run_script capability; the model finds real tools by
/// exploring the registry from inside its own scripts.
pub async fn run(
    config: &Config,
    api: &dyn ChatApi,
    query: &str,
    max_turns: Option<u32>,
) -> Result<ModeReport> {
    if !registry::registry_exists(&config.registry_root) {
        return Err(BenchError::RegistryError(
            "registry not found; run `mcpbench build-registry --code-wrappers` first".to_string(),
        ));
    }
    let env = ScriptEnv::load(&config.registry_root)?;
    if env.alias_count() == 0 {
        println!(
            "{}",
            "Warning: no wrapper stubs in the registry; rebuild with --code-wrappers"
                .yellow()
        );
    }

    println!("{}", "Connecting to MCP servers...".bold());
    let table = SessionTable::connect_all(&config.servers, config.verbose).await;

    ui::print_query(query);

    let mut handler = CodeHandler::new(table, env);
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

    let mut table = handler.into_table();
    table.shutdown().await;
    let outcome = result?;

    ui::print_answer(outcome.final_answer.as_deref());

    let report = ModeReport {
        mode: "CODE MODE",
        final_answer: outcome.final_answer,
        counters,
        turns: outcome.turns,
        dispatches: outcome.dispatches,
        tools_in_context: 1,
    };
    ui::print_report(&report);
    Ok(report)
}
