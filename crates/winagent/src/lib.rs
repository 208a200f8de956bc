//! winagent - Natural-language wrapper for Windows licensing commands
//!
//! Free text goes in, one JSON envelope comes out. The interpreter picks an
//! intent from a small keyword table and drives the executor, which only
//! ever runs allow-listed commands through the platform shell.
//!
//! Intents:
//! - search MAK keys in the licensing state and, optionally, in files
//! - status: system information and activation state
//! - activate windows <KEY>: install, activate and verify a product key
//! - execute <CMD>: run an allow-listed command verbatim

pub mod allowlist;
pub mod credentials;
pub mod envelope;
pub mod error;
pub mod executor;
pub mod intent;
pub mod interpreter;
pub mod journal;
pub mod keysearch;
pub mod licensing;
pub mod prompt;
pub mod shell;

#[cfg(test)]
pub(crate) mod testing;

pub use allowlist::AllowList;
pub use credentials::CredentialStore;
pub use envelope::{Envelope, Response, Status};
pub use error::AgentError;
pub use executor::Executor;
pub use intent::Intent;
pub use interpreter::Interpreter;
pub use prompt::{InputProvider, NoInput, StdinPrompt};
pub use shell::{Shell, SystemShell};
