//! Command interpreter
//!
//! Turns free text into executor calls and a single [`Response`]. Every path
//! ends in an envelope; nothing here returns an error.

use std::fmt::Write as _;
use std::path::Path;
use tracing::info;

use crate::credentials::CredentialStore;
use crate::envelope::{Envelope, Response};
use crate::executor::Executor;
use crate::intent::{self, Intent};
use crate::prompt::InputProvider;
use crate::shell::Shell;

const PATH_QUESTION: &str =
    "Where should I look for the MAK key? (press Enter to check the system only)";
const CHOICE_QUESTION: &str =
    "Use one of these keys to activate Windows? (type its number, or N to decline)";

/// Credential store hooked into activation
struct VaultLink<'a, S: Shell> {
    store: &'a CredentialStore<S>,
    item: String,
    save_activated: bool,
}

pub struct Interpreter<'a, S: Shell, P: InputProvider> {
    executor: &'a Executor<S>,
    input: P,
    vault: Option<VaultLink<'a, S>>,
}

impl<'a, S: Shell, P: InputProvider> Interpreter<'a, S, P> {
    pub fn new(executor: &'a Executor<S>, input: P) -> Self {
        Self {
            executor,
            input,
            vault: None,
        }
    }

    /// Fetch missing activation keys from `item` in `store`, and optionally
    /// save keys there after a successful activation
    pub fn with_vault(
        mut self,
        store: &'a CredentialStore<S>,
        item: impl Into<String>,
        save_activated: bool,
    ) -> Self {
        self.vault = Some(VaultLink {
            store,
            item: item.into(),
            save_activated,
        });
        self
    }

    pub fn interpret(&mut self, text: &str) -> Response {
        let intent = intent::parse(text);
        info!("Intent: {:?}", intent);

        let envelope = match intent {
            Intent::SearchKeys { path } => self.search(path),
            Intent::Status => self.executor.get_system_info(),
            Intent::Activate { key } => self.activate(key),
            Intent::Execute { command: Some(command) } => self.executor.execute(&command),
            Intent::Execute { command: None } => Envelope::error("command not specified"),
            Intent::Unrecognized => {
                Envelope::error("unrecognized command").with_field("original_command", text)
            }
        };

        Response::from(envelope)
    }

    fn search(&mut self, path: Option<String>) -> Envelope {
        let path = path.or_else(|| self.input.ask(PATH_QUESTION).filter(|p| !p.is_empty()));

        let report = match self.executor.search_keys(path.as_deref().map(Path::new)) {
            Ok(report) => report,
            Err(e) => return Envelope::error(e.to_string()),
        };
        let search = report.to_envelope();

        if !search.is_success() || report.found_keys.is_empty() {
            return search;
        }

        let mut question = String::from("MAK keys found:\n");
        for (i, found) in report.found_keys.iter().enumerate() {
            let _ = writeln!(question, "{}. {} (found in {})", i + 1, found.key, found.file);
        }
        question.push_str(CHOICE_QUESTION);

        let selected = self
            .input
            .ask(&question)
            .and_then(|choice| choice.trim().parse::<usize>().ok())
            .filter(|n| (1..=report.found_keys.len()).contains(n))
            .map(|n| &report.found_keys[n - 1].key);

        match selected {
            Some(key) => {
                let activation = self.activate_key(key);
                Envelope::success()
                    .with_field("search_result", search.to_value())
                    .with_field("activation_result", activation.to_value())
            }
            None => search,
        }
    }

    fn activate(&mut self, key: Option<String>) -> Envelope {
        match key.or_else(|| self.vault_key()) {
            Some(key) => self.activate_key(&key),
            None => Envelope::error("key not provided or invalid"),
        }
    }

    fn vault_key(&self) -> Option<String> {
        let vault = self.vault.as_ref()?;
        let key = vault.store.fetch_key(&vault.item);
        if key.is_some() {
            info!("Using key from vault item '{}'", vault.item);
        }
        key
    }

    fn activate_key(&self, key: &str) -> Envelope {
        let envelope = self.executor.activate_windows(key);

        match &self.vault {
            Some(vault) if vault.save_activated && envelope.is_success() => {
                let saved = vault.store.save_key(key, &vault.item);
                envelope.with_field("vault_saved", saved)
            }
            _ => envelope,
        }
    }
}
