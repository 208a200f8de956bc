//! CLI definition and the single request/response cycle

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process;
use tracing::warn;

use winagent::credentials::{CredentialStore, DEFAULT_ITEM};
use winagent::journal::CommandLog;
use winagent::keysearch::KeyScanner;
use winagent::{Executor, InputProvider, Interpreter, NoInput, Response, Shell, StdinPrompt};
use winagent_core::{Config, Paths};

/// winagent - Natural-language wrapper for Windows licensing commands
#[derive(Parser)]
#[command(name = "winagent")]
#[command(version)]
#[command(about = "Run Windows licensing tasks from free text and get one JSON result back")]
#[command(after_help = "\
EXAMPLES:
    winagent status
    winagent ativar windows XXXXX-XXXXX-XXXXX-XXXXX-XXXXX
    winagent procurar mak na pasta C:\\Licencas
    winagent executar whoami
    echo \"status\" | winagent

OUTPUT:
    One line of JSON on stdout: {\"OUTPUT_EXECUTIVO\": {\"status\": ...}}
    Questions and diagnostics go to stderr.")]
pub struct Cli {
    /// Command text; read from stdin when omitted
    #[arg(trailing_var_arg = true)]
    pub text: Vec<String>,

    /// JSON configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Command log file (overrides the configuration)
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Never ask questions; treat every prompt as unanswered
    #[arg(long)]
    pub no_input: bool,

    /// 1Password item to take the key from when the text carries none
    #[arg(long, value_name = "NAME")]
    pub vault_item: Option<String>,

    /// Save successfully activated keys to 1Password
    #[arg(long)]
    pub save_to_vault: bool,

    /// More diagnostics on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

pub fn run(cli: Cli) -> Result<()> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| Paths::new().config_file());
    let config = load_config(&config_path);

    if let Err(e) = ctrlc::set_handler(on_interrupt) {
        warn!("Failed to install Ctrl+C handler: {}", e);
    }

    let text = match read_text(&cli.text)? {
        Some(text) => text,
        None => {
            eprintln!("Please provide a command.");
            return Ok(());
        }
    };

    let log = CommandLog::new(cli.log_file.clone().unwrap_or(config.log_file.clone()));
    if let Err(e) = log.command_received(&text) {
        warn!("Failed to write {}: {}", log.path().display(), e);
    }

    let executor = Executor::system().with_scanner(KeyScanner::new(&config.scan_extensions));
    let store = CredentialStore::probe(*executor.shell());
    let vault_item = cli.vault_item.clone().or(config.vault_item.clone());

    let response = if cli.no_input {
        respond(&executor, &store, vault_item, cli.save_to_vault, NoInput, &text)
    } else {
        respond(&executor, &store, vault_item, cli.save_to_vault, StdinPrompt::new(), &text)
    };

    let line = serde_json::to_string(&response).context("Failed to encode response")?;
    println!("{}", line);

    Ok(())
}

/// Configuration at `path`; an unreadable or malformed file falls back to defaults
fn load_config(path: &Path) -> Config {
    Config::load(path).unwrap_or_else(|e| {
        warn!("{:#}", e);
        Config::default()
    })
}

fn on_interrupt() {
    eprintln!("\nInterrupted by user. Exiting.");
    process::exit(0);
}

fn respond<S: Shell, P: InputProvider>(
    executor: &Executor<S>,
    store: &CredentialStore<S>,
    vault_item: Option<String>,
    save_to_vault: bool,
    input: P,
    text: &str,
) -> Response {
    let mut interpreter = Interpreter::new(executor, input);

    if vault_item.is_some() || save_to_vault {
        let item = vault_item.unwrap_or_else(|| DEFAULT_ITEM.to_string());
        interpreter = interpreter.with_vault(store, item, save_to_vault);
    }

    interpreter.interpret(text)
}

/// Joined arguments, or all of stdin when there are none. `None` when empty.
fn read_text(args: &[String]) -> Result<Option<String>> {
    let text = if args.is_empty() {
        let stdin = io::stdin();
        if stdin.is_terminal() {
            eprintln!(
                "Waiting for a command on stdin.\n\
                 Type it and press Ctrl+D (Linux/Mac) or Ctrl+Z then Enter (Windows) to finish."
            );
        }

        let mut buf = String::new();
        stdin
            .lock()
            .read_to_string(&mut buf)
            .context("Failed to read command from stdin")?;
        buf
    } else {
        args.join(" ")
    };

    let text = text.trim();
    Ok(if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tempfile::tempdir;
    use winagent::AllowList;
    use winagent_core::process::ProcessOutput;

    const KEY: &str = "AAAAA-BBBBB-CCCCC-DDDDD-EEEEE";

    /// Succeeds with empty output, except for `op`, which answers like a
    /// signed-in 1Password CLI holding at most one item
    struct FakeShell {
        item: Option<&'static str>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeShell {
        fn new(item: Option<&'static str>) -> Self {
            Self {
                item,
                calls: RefCell::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl Shell for FakeShell {
        fn run(&self, command: &str, _capture: bool) -> io::Result<ProcessOutput> {
            self.calls.borrow_mut().push(command.to_string());
            Ok(ProcessOutput::default())
        }

        fn run_program(&self, program: &str, args: &[&str]) -> io::Result<ProcessOutput> {
            self.calls
                .borrow_mut()
                .push(format!("{} {}", program, args.join(" ")));

            let stdout = match args {
                ["--version"] => "2.24.0".to_string(),
                ["item", "get", name, ..] if Some(*name) == self.item => {
                    format!(r#"{{"fields":[{{"label":"MAK","value":"{}"}}]}}"#, KEY)
                }
                ["item", "get", ..] => {
                    return Ok(ProcessOutput {
                        code: 1,
                        stdout: String::new(),
                        stderr: "isn't an item".to_string(),
                    })
                }
                _ => String::new(),
            };

            Ok(ProcessOutput {
                code: 0,
                stdout,
                stderr: String::new(),
            })
        }
    }

    fn answer(
        shell: &FakeShell,
        vault_item: Option<&str>,
        save_to_vault: bool,
        text: &str,
    ) -> serde_json::Value {
        let executor = Executor::new(AllowList::default(), shell);
        let store = CredentialStore::probe(shell);
        let response = respond(
            &executor,
            &store,
            vault_item.map(String::from),
            save_to_vault,
            NoInput,
            text,
        );
        serde_json::to_value(&response).unwrap()
    }

    #[test]
    fn test_malformed_config_still_answers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();

        let config = load_config(&path);
        assert_eq!(config.log_file, PathBuf::from("agent.log"));
        assert!(config.vault_item.is_none());

        let shell = FakeShell::new(None);
        let out = answer(&shell, config.vault_item.as_deref(), false, "status");
        assert_eq!(out["OUTPUT_EXECUTIVO"]["status"], "success");
    }

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.json"));
        assert_eq!(config.scan_extensions, vec!["txt", "log", "csv", "ini"]);
    }

    #[test]
    fn test_respond_without_vault_leaves_store_alone() {
        let shell = FakeShell::new(Some(DEFAULT_ITEM));
        let out = answer(&shell, None, false, "ativar windows");

        assert_eq!(out["OUTPUT_EXECUTIVO"]["status"], "error");
        assert_eq!(out["OUTPUT_EXECUTIVO"]["message"], "key not provided or invalid");
        assert_eq!(shell.calls(), vec!["op --version"]);
    }

    #[test]
    fn test_respond_vault_item_supplies_key() {
        let shell = FakeShell::new(Some("Office MAK"));
        let out = answer(&shell, Some("Office MAK"), false, "ativar windows");

        assert_eq!(out["OUTPUT_EXECUTIVO"]["status"], "success");
        assert!(out["OUTPUT_EXECUTIVO"].get("vault_saved").is_none());
        let calls = shell.calls();
        assert!(calls.contains(&"op item get Office MAK --format json".to_string()));
        assert!(calls.contains(&format!("slmgr /ipk {}", KEY)));
    }

    #[test]
    fn test_respond_save_to_vault_uses_default_item() {
        let shell = FakeShell::new(None);
        let out = answer(&shell, None, true, &format!("ativar windows {}", KEY));

        assert_eq!(out["OUTPUT_EXECUTIVO"]["status"], "success");
        assert_eq!(out["OUTPUT_EXECUTIVO"]["vault_saved"], true);
        let create = shell
            .calls()
            .into_iter()
            .find(|c| c.starts_with("op item create --template "))
            .unwrap();
        assert!(create.contains(DEFAULT_ITEM));
    }

    #[test]
    fn test_interrupt_handler_installs() {
        // only registration in this test binary
        assert!(ctrlc::set_handler(on_interrupt).is_ok());
    }

    #[test]
    fn test_parse_free_text() {
        let cli = Cli::parse_from(["winagent", "ativar", "windows", "AAAAA-BBBBB-CCCCC-DDDDD-EEEEE"]);
        assert_eq!(cli.text.join(" "), "ativar windows AAAAA-BBBBB-CCCCC-DDDDD-EEEEE");
        assert!(!cli.no_input);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_parse_options_before_text() {
        let cli = Cli::parse_from([
            "winagent",
            "--no-input",
            "-vv",
            "--vault-item",
            "Office MAK",
            "procurar",
            "mak",
        ]);
        assert!(cli.no_input);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.vault_item.as_deref(), Some("Office MAK"));
        assert_eq!(cli.text, vec!["procurar", "mak"]);
    }

    #[test]
    fn test_read_text_joins_and_trims_args() {
        let args = vec!["  executar".to_string(), "whoami ".to_string()];
        assert_eq!(read_text(&args).unwrap().as_deref(), Some("executar whoami"));
    }

    #[test]
    fn test_read_text_blank_args() {
        let args = vec!["   ".to_string()];
        assert!(read_text(&args).unwrap().is_none());
    }
}
