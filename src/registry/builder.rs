use colored::*;
use std::fs;
use std::path::Path;

use super::types::{ServerIndex, ToolDescriptor};
use super::wrappers;
use crate::bridge::SessionTable;
use crate::config::ServerLaunch;
use crate::error::Result;

pub struct BuildReport {
    /// (server, tool count) for every server that made it into the registry.
    pub built: Vec<(String, usize)>,
    /// Configured servers that were skipped (missing command, failed handshake).
    pub skipped: Vec<String>,
}

/// Recreates the registry directory from scratch: connects to every
/// configured server, snapshots each tool to `<server>/<tool>.json`, and
/// writes the per-server `index.json`. With `code_wrappers` it also emits
/// the callable stubs code mode runs against. Unreachable servers are
/// skipped with a warning and leave no directory behind.
pub async fn build_registry(
    launches: &[ServerLaunch],
    root: &Path,
    code_wrappers: bool,
    verbose: bool,
) -> Result<BuildReport> {
    println!("{}", "Building tool registry...".bold());

    if root.exists() {
        fs::remove_dir_all(root)?;
    }
    fs::create_dir_all(root)?;

    let mut table = SessionTable::connect_all(launches, verbose).await;

    let mut report = BuildReport {
        built: Vec::new(),
        skipped: launches
            .iter()
            .filter(|launch| !table.contains(&launch.name))
            .map(|launch| launch.name.clone())
            .collect(),
    };

    for server in table.server_names() {
        let tools = table.tools_of(&server).unwrap_or_default().to_vec();
        let server_dir = super::server_dir(root, &server);
        fs::create_dir_all(&server_dir)?;

        let mut tool_names = Vec::new();
        for tool in &tools {
            let descriptor = ToolDescriptor::from_tool(&server, tool);
            let path = super::descriptor_path(root, &server, &tool.name);
            fs::write(&path, serde_json::to_string_pretty(&descriptor)?)?;
            tool_names.push(tool.name.clone());
        }

        let index = ServerIndex::new(&server, tool_names);
        fs::write(
            super::index_path(root, &server),
            serde_json::to_string_pretty(&index)?,
        )?;

        if code_wrappers {
            wrappers::write_wrappers(&server_dir, &server, &tools)?;
        }

        println!(
            "  Generated registry for '{}' ({} tools)",
            server,
            tools.len()
        );
        report.built.push((server, tools.len()));
    }

    table.shutdown().await;

    if report.built.is_empty() {
        println!("{}", "Registry built, but no servers were reachable.".yellow());
    } else {
        println!("{}", "Registry setup complete.".green());
    }
    Ok(report)
}
