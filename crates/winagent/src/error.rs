//! Error types for winagent operations
//!
//! These never reach the caller directly: every public operation turns them
//! into an error envelope carrying the `Display` text.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("command not allowed: {0}")]
    CommandNotAllowed(String),

    #[error("path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("invalid key")]
    InvalidKey,

    #[error("failed to launch '{command}': {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AgentError>;
