//! System command executor
//!
//! Validates a command's leading token against the allow-list, runs it
//! through the shell and wraps the outcome in an [`Envelope`]. The licensing
//! operations built on top of `execute` live in `licensing.rs`.

use tracing::{debug, info, warn};
use winagent_core::format;

use crate::allowlist::AllowList;
use crate::envelope::{Envelope, Status};
use crate::error::{AgentError, Result};
use crate::keysearch::KeyScanner;
use crate::shell::{Shell, SystemShell};

pub struct Executor<S: Shell = SystemShell> {
    allow_list: AllowList,
    shell: S,
    pub(crate) scanner: KeyScanner,
}

impl Executor<SystemShell> {
    /// Executor over the platform shell with the default allow-list
    pub fn system() -> Self {
        Self::new(AllowList::default(), SystemShell)
    }
}

impl<S: Shell> Executor<S> {
    pub fn new(allow_list: AllowList, shell: S) -> Self {
        Self {
            allow_list,
            shell,
            scanner: KeyScanner::default(),
        }
    }

    pub fn with_scanner(mut self, scanner: KeyScanner) -> Self {
        self.scanner = scanner;
        self
    }

    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }

    pub fn shell(&self) -> &S {
        &self.shell
    }

    /// Run a command with output captured
    pub fn execute(&self, command: &str) -> Envelope {
        self.execute_with(command, true)
    }

    /// Run a command; without `capture` the child writes straight to the terminal
    pub fn execute_with(&self, command: &str, capture: bool) -> Envelope {
        match self.try_execute(command, capture) {
            Ok(envelope) => envelope,
            Err(e) => {
                match &e {
                    AgentError::CommandNotAllowed(_) => {}
                    _ => warn!("Command failed: {}", e),
                }
                Envelope::error(e.to_string()).with_field("command", command)
            }
        }
    }

    fn try_execute(&self, command: &str, capture: bool) -> Result<Envelope> {
        if !self.allow_list.permits(command) {
            let leader = AllowList::leader(command).unwrap_or_default();
            warn!("Command not allowed: {}", leader);
            return Err(AgentError::CommandNotAllowed(leader));
        }

        debug!("Running: {}", format::truncate(command, 120));
        let output = self
            .shell
            .run(command, capture)
            .map_err(|source| AgentError::Launch {
                command: command.to_string(),
                source,
            })?;

        let status = if output.success() {
            Status::Success
        } else {
            Status::Error
        };

        let mut envelope = Envelope::new(status)
            .with_field("returncode", output.code)
            .with_field("command", command);

        if capture {
            envelope = envelope
                .with_field("stdout", output.stdout)
                .with_field("stderr", output.stderr);
        }

        info!("Command executed: {} (exit {})", command, output.code);
        Ok(envelope)
    }
}
