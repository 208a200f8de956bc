//! Append-only command log
//!
//! One `timestamp: message` line per entry, UTC timestamps.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use winagent_core::format;

use crate::error::Result;

pub struct CommandLog {
    path: PathBuf,
}

impl CommandLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one line
    pub fn append(&self, message: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}: {}", format::utc_timestamp(), message)?;
        Ok(())
    }

    /// Record an incoming command
    pub fn command_received(&self, text: &str) -> Result<()> {
        self.append(&format!("command received: {}", text))
    }
}
