use std::fmt;

#[derive(Debug)]
pub enum BenchError {
    ApiError {
        status: u16,
        message: String,
    },
    ConfigError(String),
    McpError(String),
    RegistryError(String),
    NetworkError(reqwest::Error),
    Timeout(String),
    IoError(std::io::Error),
    JsonError(serde_json::Error),
    YamlError(serde_yaml::Error),
    Other(String),
}

impl fmt::Display for BenchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BenchError::ApiError { status, message } => {
                write!(f, "API error (status {}): {}", status, message)
            }
            BenchError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            BenchError::McpError(msg) => write!(f, "MCP error: {}", msg),
            BenchError::RegistryError(msg) => write!(f, "Registry error: {}", msg),
            BenchError::NetworkError(e) => write!(f, "Network error: {}", e),
            BenchError::Timeout(msg) => write!(f, "Timed out: {}", msg),
            BenchError::IoError(e) => write!(f, "IO error: {}", e),
            BenchError::JsonError(e) => write!(f, "JSON error: {}", e),
            BenchError::YamlError(e) => write!(f, "YAML error: {}", e),
            BenchError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for BenchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BenchError::NetworkError(e) => Some(e),
            BenchError::IoError(e) => Some(e),
            BenchError::JsonError(e) => Some(e),
            BenchError::YamlError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for BenchError {
    fn from(err: reqwest::Error) -> Self {
        BenchError::NetworkError(err)
    }
}

impl From<std::io::Error> for BenchError {
    fn from(err: std::io::Error) -> Self {
        BenchError::IoError(err)
    }
}

impl From<serde_json::Error> for BenchError {
    fn from(err: serde_json::Error) -> Self {
        BenchError::JsonError(err)
    }
}

impl From<serde_yaml::Error> for BenchError {
    fn from(err: serde_yaml::Error) -> Self {
        BenchError::YamlError(err)
    }
}

impl From<anyhow::Error> for BenchError {
    fn from(err: anyhow::Error) -> Self {
        BenchError::Other(err.to_string())
    }
}

impl From<String> for BenchError {
    fn from(msg: String) -> Self {
        BenchError::Other(msg)
    }
}

impl From<&str> for BenchError {
    fn from(msg: &str) -> Self {
        BenchError::Other(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BenchError>;
