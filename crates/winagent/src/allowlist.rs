//! Allow-list of command leaders
//!
//! Only the first whitespace-separated token of a command is checked. The
//! set is fixed when the executor is built and never changes afterwards.

use std::collections::BTreeSet;

/// Leading tokens permitted by default
pub const DEFAULT_COMMANDS: &[&str] = &["systeminfo", "slmgr", "dir", "whoami", "op"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowList {
    commands: BTreeSet<String>,
}

impl Default for AllowList {
    fn default() -> Self {
        Self::new(DEFAULT_COMMANDS.iter().copied())
    }
}

impl AllowList {
    pub fn new<I, S>(commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            commands: commands
                .into_iter()
                .map(|c| c.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Lower-cased leading token of a command line
    pub fn leader(command: &str) -> Option<String> {
        command.split_whitespace().next().map(str::to_lowercase)
    }

    /// Whether the command's leading token is permitted
    pub fn permits(&self, command: &str) -> bool {
        Self::leader(command).is_some_and(|leader| self.commands.contains(&leader))
    }

    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().map(String::as_str)
    }
}
