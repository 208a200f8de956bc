//! Standard paths used by winagent

use std::path::PathBuf;

/// Standard winagent paths
pub struct Paths {
    /// Config directory (~/.config/winagent)
    pub config: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

impl Paths {
    pub fn new() -> Self {
        let config = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("winagent");

        Self { config }
    }

    /// Default location of the JSON configuration file
    pub fn config_file(&self) -> PathBuf {
        self.config.join("config.json")
    }
}
