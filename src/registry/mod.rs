pub mod builder;
pub mod types;
pub mod wrappers;

pub use builder::{build_registry, BuildReport};
pub use types::{ServerIndex, ToolDescriptor};

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{BenchError, Result};

pub fn server_dir(root: &Path, server: &str) -> PathBuf {
    root.join(server)
}

pub fn descriptor_path(root: &Path, server: &str, tool: &str) -> PathBuf {
    server_dir(root, server).join(format!("{}.json", tool))
}

pub fn index_path(root: &Path, server: &str) -> PathBuf {
    server_dir(root, server).join("index.json")
}

pub fn load_index(root: &Path, server: &str) -> Result<ServerIndex> {
    let path = index_path(root, server);
    let contents = fs::read_to_string(&path).map_err(|e| {
        BenchError::RegistryError(format!("cannot read {}: {}", path.display(), e))
    })?;
    Ok(serde_json::from_str(&contents)?)
}

pub fn load_descriptor(root: &Path, server: &str, tool: &str) -> Result<ToolDescriptor> {
    let path = descriptor_path(root, server, tool);
    let contents = fs::read_to_string(&path).map_err(|e| {
        BenchError::RegistryError(format!("cannot read {}: {}", path.display(), e))
    })?;
    Ok(serde_json::from_str(&contents)?)
}

/// Every server index in the registry, sorted by server name.
pub fn load_indexes(root: &Path) -> Result<Vec<ServerIndex>> {
    let mut indexes = Vec::new();
    let entries = fs::read_dir(root).map_err(|e| {
        BenchError::RegistryError(format!("cannot read registry {}: {}", root.display(), e))
    })?;
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let server = entry.file_name().to_string_lossy().to_string();
        // Tolerate stray directories without an index.
        if index_path(root, &server).exists() {
            indexes.push(load_index(root, &server)?);
        }
    }
    indexes.sort_by(|a, b| a.server_name.cmp(&b.server_name));
    Ok(indexes)
}

/// Server directory names present on disk, sorted.
pub fn server_names(root: &Path) -> Result<Vec<String>> {
    Ok(load_indexes(root)?
        .into_iter()
        .map(|index| index.server_name)
        .collect())
}

pub fn registry_exists(root: &Path) -> bool {
    root.is_dir()
}
