use colored::*;

use super::{code, traditional};
use crate::api::ChatApi;
use crate::config::Config;
use crate::error::Result;
use crate::ui;

/// Runs traditional and code mode back to back against the same query and
/// prints the token-usage delta.
pub async fn run(config: &Config, api: &dyn ChatApi, query: &str) -> Result<()> {
    println!("{}", "MCP TOOL ACCESS: TOKEN USAGE COMPARISON".bold());
    println!("  1. TRADITIONAL: all MCP tools loaded directly into context");
    println!("  2. CODE MODE: the model discovers and calls tools via scripts");

    let traditional_report = traditional::run(config, api, query, None).await?;
    let code_report = code::run(config, api, query, None).await?;

    ui::print_comparison(&traditional_report, &code_report);
    Ok(())
}
