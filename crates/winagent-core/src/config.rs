//! Configuration management for winagent

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// winagent configuration, read once at startup
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Append-only command log (relative paths resolve against the working directory)
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,

    /// File extensions scanned when searching a directory for product keys
    #[serde(default = "default_scan_extensions")]
    pub scan_extensions: Vec<String>,

    /// Credential-store item used when no vault item is given on the command line
    #[serde(default)]
    pub vault_item: Option<String>,
}

fn default_log_file() -> PathBuf {
    PathBuf::from("agent.log")
}

fn default_scan_extensions() -> Vec<String> {
    ["txt", "log", "csv", "ini"].iter().map(|e| e.to_string()).collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_file: default_log_file(),
            scan_extensions: default_scan_extensions(),
            vault_item: None,
        }
    }
}

impl Config {
    /// Load config from file, falling back to defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid config: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }
}
