use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

/// One MCP server to spawn: a name plus its launch command line.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerLaunch {
    pub name: String,
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ServerLaunch {
    pub fn new(name: &str, command: &str, args: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            command: command.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
        }
    }
}

pub struct Config {
    /// Absent when only the registry builder runs; agent runs require it.
    pub api_key: Option<String>,
    pub api_endpoint: String,
    pub model: String,
    pub verbose: bool,
    pub registry_root: PathBuf,
    pub servers: Vec<ServerLaunch>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FileConfig {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub registry_root: Option<String>,
    #[serde(default)]
    pub servers: Option<Vec<ServerLaunch>>,
}

impl Config {
    pub fn from_env(verbose: bool) -> Result<Self, String> {
        let file_config = FileConfig::load().map_err(|e| format!("{:#}", e))?;

        let api_key = env::var("OPENAI_API_KEY").ok();

        // Endpoint: env var > default. Accept either a bare base URL or one
        // already pointing at /chat/completions.
        let api_endpoint = env::var("OPENAI_API_BASE")
            .ok()
            .map(|endpoint| {
                if endpoint.ends_with("/chat/completions") {
                    endpoint
                } else if endpoint.ends_with("/v1") {
                    format!("{}/chat/completions", endpoint)
                } else if endpoint.ends_with("/v1/") {
                    format!("{}chat/completions", endpoint)
                } else {
                    format!("{}/v1/chat/completions", endpoint.trim_end_matches('/'))
                }
            })
            .unwrap_or_else(|| "https://api.openai.com/v1/chat/completions".to_string());

        let model = env::var("MCPBENCH_MODEL")
            .ok()
            .or(file_config.model.clone())
            .unwrap_or_else(|| "gpt-4o-mini".to_string());

        let verbose = verbose
            || env::var("MCPBENCH_VERBOSE")
                .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
                .unwrap_or(false);

        let registry_root = file_config
            .registry_root
            .clone()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./servers"));

        let servers = file_config.servers.unwrap_or_else(default_servers);

        Ok(Config {
            api_key,
            api_endpoint,
            model,
            verbose,
            registry_root,
            servers,
        })
    }

    /// The API key, or the error agent runs report when it is missing.
    pub fn require_api_key(&self) -> Result<&str, String> {
        self.api_key
            .as_deref()
            .ok_or_else(|| "OPENAI_API_KEY environment variable not set".to_string())
    }
}

/// Mirrors the stock server set the benchmark was designed around.
pub fn default_servers() -> Vec<ServerLaunch> {
    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let parent = cwd
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| cwd.clone());
    let parent = parent.to_string_lossy().to_string();

    vec![
        ServerLaunch::new("time", "uvx", &["mcp-server-time"]),
        ServerLaunch::new(
            "sqlite",
            "uvx",
            &["mcp-server-sqlite", "--db-path", "temp_schema.db"],
        ),
        ServerLaunch::new("git", "uvx", &["mcp-server-git", "--repository", &parent]),
        ServerLaunch::new(
            "github",
            "npx",
            &["-y", "@modelcontextprotocol/server-github"],
        ),
        ServerLaunch::new(
            "filesystem",
            "npx",
            &["-y", "@modelcontextprotocol/server-filesystem", &parent],
        ),
    ]
}

impl FileConfig {
    pub fn load() -> anyhow::Result<Self> {
        for path in Self::config_paths() {
            if path.exists() {
                let contents = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config file: {}", path.display()))?;
                let config: FileConfig = serde_yaml::from_str(&contents).with_context(|| {
                    format!("Failed to parse YAML config file: {}", path.display())
                })?;
                return Ok(config);
            }
        }
        Ok(FileConfig::default())
    }

    pub fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(".mcpbench.yaml"),
            PathBuf::from(".mcpbench.yml"),
        ];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("mcpbench").join("config.yaml"));
        }
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_server_set_matches_benchmark() {
        let servers = default_servers();
        let names: Vec<&str> = servers.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["time", "sqlite", "git", "github", "filesystem"]);
    }

    #[test]
    fn file_config_parses_server_list() {
        let yaml = r#"
model: gpt-4o
registry_root: ./registry
servers:
  - name: time
    command: uvx
    args: [mcp-server-time]
"#;
        let config: FileConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.model.as_deref(), Some("gpt-4o"));
        let servers = config.servers.unwrap();
        assert_eq!(servers.len(), 1);
        assert_eq!(servers[0].command, "uvx");
    }
}
