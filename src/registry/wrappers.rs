use regex::Regex;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::error::{BenchError, Result};
use crate::mcp::McpTool;

/// File extension for generated wrapper stubs.
pub const WRAPPER_EXT: &str = "fn";

/// Renders the wrapper stub for one tool: a function in the run-script
/// dialect whose body delegates to the bridge with the fixed server/tool
/// pair. The schema is rendered into the doc comment only; neither the
/// generator nor the stub validates arguments.
pub fn wrapper_source(server: &str, tool: &McpTool) -> String {
    let mut source = String::new();
    let _ = writeln!(source, "// Tool: {} (server: {})", tool.name, server);
    let _ = writeln!(source, "//");
    let description = tool
        .description
        .as_deref()
        .unwrap_or("No description provided.");
    for line in description.lines() {
        let _ = writeln!(source, "// {}", line.trim_end());
    }

    if let Some(properties) = tool
        .input_schema
        .get("properties")
        .and_then(|p| p.as_object())
    {
        if !properties.is_empty() {
            let _ = writeln!(source, "//");
            let _ = writeln!(source, "// args object:");
            for (prop_name, prop_def) in properties {
                let prop_type = prop_def
                    .get("type")
                    .and_then(|t| t.as_str())
                    .unwrap_or("any");
                let prop_desc = prop_def
                    .get("description")
                    .and_then(|d| d.as_str())
                    .unwrap_or("");
                let _ = writeln!(source, "//   {} ({}): {}", prop_name, prop_type, prop_desc);
            }
        }
    }

    let _ = writeln!(source, "fn {}(args) {{", tool.name);
    let _ = writeln!(
        source,
        "    dispatch(\"{}\", \"{}\", args)",
        server, tool.name
    );
    let _ = writeln!(source, "}}");
    source
}

/// Renders the aggregating entry file for one server directory.
pub fn entry_source(server: &str, tool_names: &[String]) -> String {
    let mut source = String::new();
    let _ = writeln!(source, "// {} server wrappers", server);
    for name in tool_names {
        let _ = writeln!(source, "use {};", name);
    }
    source
}

/// Writes `<tool>.fn` per tool plus the aggregating `mod.fn`.
pub fn write_wrappers(server_dir: &Path, server: &str, tools: &[McpTool]) -> Result<()> {
    let mut tool_names = Vec::new();
    for tool in tools {
        let path = server_dir.join(format!("{}.{}", tool.name, WRAPPER_EXT));
        fs::write(&path, wrapper_source(server, tool))?;
        tool_names.push(tool.name.clone());
    }
    fs::write(
        server_dir.join(format!("mod.{}", WRAPPER_EXT)),
        entry_source(server, &tool_names),
    )?;
    Ok(())
}

/// Reads the generated stubs back into an alias map
/// `wrapper name -> (server, tool)` for the script runner. A name exported
/// by more than one server keeps its first binding.
pub fn load_aliases(root: &Path) -> Result<HashMap<String, (String, String)>> {
    let pattern = Regex::new(
        r#"fn\s+([A-Za-z_][A-Za-z0-9_]*)\s*\(args\)\s*\{\s*dispatch\("([^"]+)",\s*"([^"]+)",\s*args\)\s*\}"#,
    )
    .map_err(|e| BenchError::Other(format!("wrapper pattern: {}", e)))?;

    let mut aliases = HashMap::new();
    for server in super::server_names(root)? {
        let server_dir = super::server_dir(root, &server);
        let mut paths: Vec<_> = fs::read_dir(&server_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension().and_then(|e| e.to_str()) == Some(WRAPPER_EXT)
                    && path.file_stem().and_then(|s| s.to_str()) != Some("mod")
            })
            .collect();
        paths.sort();

        for path in paths {
            let source = fs::read_to_string(&path)?;
            if let Some(captures) = pattern.captures(&source) {
                let alias = captures[1].to_string();
                let server = captures[2].to_string();
                let tool = captures[3].to_string();
                aliases.entry(alias).or_insert((server, tool));
            }
        }
    }
    Ok(aliases)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_tool() -> McpTool {
        McpTool {
            name: "get_current_time".to_string(),
            description: Some("Get current time in a specific timezone".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "timezone": {
                        "type": "string",
                        "description": "IANA timezone name"
                    }
                },
                "required": ["timezone"]
            }),
        }
    }

    #[test]
    fn wrapper_delegates_to_bridge() {
        let source = wrapper_source("time", &sample_tool());
        assert!(source.contains("fn get_current_time(args) {"));
        assert!(source.contains(r#"dispatch("time", "get_current_time", args)"#));
        assert!(source.contains("// Get current time in a specific timezone"));
        assert!(source.contains("//   timezone (string): IANA timezone name"));
    }

    #[test]
    fn entry_file_lists_every_wrapper() {
        let source = entry_source(
            "time",
            &["get_current_time".to_string(), "convert_time".to_string()],
        );
        assert!(source.starts_with("// time server wrappers"));
        assert!(source.contains("use get_current_time;"));
        assert!(source.contains("use convert_time;"));
    }

    #[test]
    fn aliases_round_trip_through_generated_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let server_dir = root.join("time");
        std::fs::create_dir_all(&server_dir).unwrap();

        let tools = vec![sample_tool()];
        write_wrappers(&server_dir, "time", &tools).unwrap();
        let index = crate::registry::ServerIndex::new("time", vec!["get_current_time".into()]);
        std::fs::write(
            root.join("time").join("index.json"),
            serde_json::to_string(&index).unwrap(),
        )
        .unwrap();

        let aliases = load_aliases(root).unwrap();
        assert_eq!(
            aliases.get("get_current_time"),
            Some(&("time".to_string(), "get_current_time".to_string()))
        );
    }
}
