//! Executes code-mode scripts. The interpreter's entire capability surface
//! is the on-disk registry (read-only) and the bridge: there is no way for
//! a script to reach the host beyond the generated wrapper functions.

use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::parser::{parse_script, Statement};
use crate::bridge::{render, SessionTable};
use crate::error::Result;
use crate::registry::{self, wrappers};

pub struct ScriptEnv {
    registry_root: PathBuf,
    aliases: HashMap<String, (String, String)>,
}

impl ScriptEnv {
    /// Loads the wrapper aliases generated by the registry builder.
    pub fn load(registry_root: &Path) -> Result<Self> {
        let aliases = wrappers::load_aliases(registry_root)?;
        Ok(Self {
            registry_root: registry_root.to_path_buf(),
            aliases,
        })
    }

    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }
}

/// Runs a script and renders its output. Never fails: parse errors, unknown
/// functions, and dispatch failures all come back as text the model can
/// react to. Execution stops at the first failing statement.
pub async fn run_script(source: &str, env: &ScriptEnv, table: &mut SessionTable) -> String {
    let statements = match parse_script(source) {
        Ok(statements) => statements,
        Err(e) => return format!("Script error: {}", e),
    };

    let mut outputs = Vec::new();
    for statement in statements {
        match eval(&statement, env, table).await {
            Ok(output) => {
                if !output.is_empty() {
                    outputs.push(output);
                }
            }
            Err(e) => {
                outputs.push(format!("Error on line {}: {}", statement.line, e));
                break;
            }
        }
    }

    if outputs.is_empty() {
        "(no output)".to_string()
    } else {
        outputs.join("\n")
    }
}

async fn eval(
    statement: &Statement,
    env: &ScriptEnv,
    table: &mut SessionTable,
) -> std::result::Result<String, String> {
    match statement.name.as_str() {
        "servers" => {
            expect_arity(statement, 0)?;
            let names = registry::server_names(&env.registry_root)
                .map_err(|e| e.to_string())?;
            if names.is_empty() {
                Ok("(registry is empty)".to_string())
            } else {
                Ok(names.join("\n"))
            }
        }
        "index" => {
            expect_arity(statement, 1)?;
            let server = string_arg(statement, 0)?;
            let index =
                registry::load_index(&env.registry_root, server).map_err(|e| e.to_string())?;
            let mut lines = vec![format!("{}: {}", index.server_name, index.description)];
            for tool in &index.tools {
                lines.push(format!("- {}", tool));
            }
            Ok(lines.join("\n"))
        }
        "describe" => {
            expect_arity(statement, 2)?;
            let server = string_arg(statement, 0)?;
            let tool = string_arg(statement, 1)?;
            let descriptor = registry::load_descriptor(&env.registry_root, server, tool)
                .map_err(|e| e.to_string())?;
            serde_json::to_string_pretty(&descriptor).map_err(|e| e.to_string())
        }
        "dispatch" => {
            if statement.args.len() < 2 || statement.args.len() > 3 {
                return Err(format!(
                    "dispatch() takes (server, tool, args?), got {} arguments",
                    statement.args.len()
                ));
            }
            let server = string_arg(statement, 0)?.to_string();
            let tool = string_arg(statement, 1)?.to_string();
            let args = call_args(statement, 2)?;
            Ok(render(&table.dispatch(&server, &tool, args).await))
        }
        name => match env.aliases.get(name) {
            Some((server, tool)) => {
                let (server, tool) = (server.clone(), tool.clone());
                if statement.args.len() > 1 {
                    return Err(format!(
                        "{}() takes at most one object argument, got {}",
                        name,
                        statement.args.len()
                    ));
                }
                let args = call_args(statement, 0)?;
                Ok(render(&table.dispatch(&server, &tool, args).await))
            }
            None => Err(format!(
                "unknown function '{}'; use servers() to explore the registry",
                name
            )),
        },
    }
}

fn expect_arity(statement: &Statement, arity: usize) -> std::result::Result<(), String> {
    if statement.args.len() != arity {
        return Err(format!(
            "{}() takes {} argument{}, got {}",
            statement.name,
            arity,
            if arity == 1 { "" } else { "s" },
            statement.args.len()
        ));
    }
    Ok(())
}

fn string_arg<'a>(statement: &'a Statement, idx: usize) -> std::result::Result<&'a str, String> {
    statement.args[idx].as_str().ok_or_else(|| {
        format!(
            "argument {} of {}() must be a string",
            idx + 1,
            statement.name
        )
    })
}

/// The optional trailing argument object of a tool call.
fn call_args(statement: &Statement, idx: usize) -> std::result::Result<Value, String> {
    match statement.args.get(idx) {
        None => Ok(Value::Object(Default::default())),
        Some(value) if value.is_object() => Ok(value.clone()),
        Some(other) => Err(format!(
            "tool arguments must be a JSON object, got {}",
            other
        )),
    }
}
