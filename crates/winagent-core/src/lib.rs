//! winagent Core - Shared plumbing for the winagent licensing wrapper
//!
//! Standard paths, the JSON configuration file, timestamp formatting and
//! the platform shell helpers used by the executor.

pub mod config;
pub mod format;
pub mod paths;
pub mod process;

pub use config::Config;
pub use paths::Paths;
