//! 1Password CLI (`op`) credential store
//!
//! Availability is probed once with `op --version`; when the CLI is missing
//! every helper short-circuits to a negative answer.

use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};

use crate::error::Result;
use crate::shell::{Shell, SystemShell};

/// Item title used when none is configured
pub const DEFAULT_ITEM: &str = "Windows MAK";

/// Field labels that hold a product key
const KEY_LABELS: &[&str] = &["mak", "key", "chave"];

#[derive(Debug, Deserialize)]
struct ItemField {
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Item {
    #[serde(default)]
    fields: Vec<ItemField>,
    #[serde(default)]
    password: Option<String>,
}

impl Item {
    fn key(self) -> Option<String> {
        let from_fields = self.fields.into_iter().find_map(|f| {
            let label = f.label.unwrap_or_default().to_lowercase();
            if KEY_LABELS.contains(&label.as_str()) {
                f.value
            } else {
                None
            }
        });
        from_fields.or(self.password)
    }
}

pub struct CredentialStore<S: Shell = SystemShell> {
    shell: S,
    available: bool,
}

impl<S: Shell> CredentialStore<S> {
    /// Probe for the `op` CLI
    pub fn probe(shell: S) -> Self {
        let available = match shell.run_program("op", &["--version"]) {
            Ok(out) if out.success() => {
                info!("1Password CLI found: {}", out.stdout.trim());
                true
            }
            Ok(_) => {
                warn!("1Password CLI is not available");
                false
            }
            Err(e) => {
                warn!("1Password CLI is not installed: {}", e);
                false
            }
        };

        Self { shell, available }
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Product key stored in `item`: the first field labelled mak/key/chave,
    /// else the item's password
    pub fn fetch_key(&self, item: &str) -> Option<String> {
        if !self.available {
            return None;
        }

        match self.try_fetch(item) {
            Ok(key) => key,
            Err(e) => {
                error!("Failed to read from 1Password: {}", e);
                None
            }
        }
    }

    fn try_fetch(&self, item: &str) -> Result<Option<String>> {
        let out = self
            .shell
            .run_program("op", &["item", "get", item, "--format", "json"])?;
        if !out.success() {
            return Ok(None);
        }

        let item: Item = serde_json::from_str(&out.stdout)?;
        Ok(item.key())
    }

    /// Store `key` as a new password item titled `title`; returns whether it was saved
    pub fn save_key(&self, key: &str, title: &str) -> bool {
        if !self.available {
            return false;
        }

        match self.try_save(key, title) {
            Ok(saved) => saved,
            Err(e) => {
                error!("Failed to save to 1Password: {}", e);
                false
            }
        }
    }

    fn try_save(&self, key: &str, title: &str) -> Result<bool> {
        let template = json!({
            "title": title,
            "category": "PASSWORD",
            "fields": [{
                "id": "mak",
                "type": "STRING",
                "label": "MAK",
                "value": key,
                "purpose": "PASSWORD",
            }],
        });
        let template = serde_json::to_string(&template)?;

        let out = self
            .shell
            .run_program("op", &["item", "create", "--template", template.as_str()])?;

        if out.success() {
            info!("MAK key saved to 1Password");
            Ok(true)
        } else {
            error!("Failed to save key to 1Password: {}", out.stderr.trim());
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedShell;

    #[test]
    fn test_missing_cli_short_circuits() {
        let shell = ScriptedShell::new().missing("op");
        let store = CredentialStore::probe(&shell);

        assert!(!store.is_available());
        assert!(store.fetch_key(DEFAULT_ITEM).is_none());
        assert!(!store.save_key("AAAAA-BBBBB-CCCCC-DDDDD-EEEEE", DEFAULT_ITEM));
        assert_eq!(shell.calls(), vec!["op --version"]);
    }

    #[test]
    fn test_failing_version_means_unavailable() {
        let shell = ScriptedShell::new().fail("op --version", 1, "not signed in");
        assert!(!CredentialStore::probe(&shell).is_available());
    }

    #[test]
    fn test_fetch_key_from_labelled_field() {
        let item = r#"{"fields":[{"label":"username","value":"admin"},{"label":"MAK","value":"AAAAA-BBBBB-CCCCC-DDDDD-EEEEE"}]}"#;
        let shell = ScriptedShell::new()
            .on("op --version", 0, "2.24.0\n")
            .on("op item get", 0, item);
        let store = CredentialStore::probe(&shell);

        assert_eq!(
            store.fetch_key("Windows MAK").as_deref(),
            Some("AAAAA-BBBBB-CCCCC-DDDDD-EEEEE")
        );
        assert_eq!(shell.calls()[1], "op item get Windows MAK --format json");
    }

    #[test]
    fn test_fetch_key_falls_back_to_password() {
        let shell = ScriptedShell::new()
            .on("op --version", 0, "2.24.0")
            .on("op item get", 0, r#"{"fields":[],"password":"11111-22222-33333-44444-55555"}"#);
        let store = CredentialStore::probe(&shell);

        assert_eq!(
            store.fetch_key(DEFAULT_ITEM).as_deref(),
            Some("11111-22222-33333-44444-55555")
        );
    }

    #[test]
    fn test_fetch_key_missing_item_or_bad_json() {
        let shell = ScriptedShell::new()
            .on("op --version", 0, "2.24.0")
            .fail("op item get absent", 1, "isn't an item")
            .on("op item get broken", 0, "not json");
        let store = CredentialStore::probe(&shell);

        assert!(store.fetch_key("absent").is_none());
        assert!(store.fetch_key("broken").is_none());
    }

    #[test]
    fn test_save_key_sends_template() {
        let shell = ScriptedShell::new().on("op --version", 0, "2.24.0");
        let store = CredentialStore::probe(&shell);

        assert!(store.save_key("AAAAA-BBBBB-CCCCC-DDDDD-EEEEE", "Office MAK"));

        let calls = shell.calls();
        let create = &calls[1];
        assert!(create.starts_with("op item create --template "));
        let template: serde_json::Value =
            serde_json::from_str(create.trim_start_matches("op item create --template ")).unwrap();
        assert_eq!(template["title"], "Office MAK");
        assert_eq!(template["category"], "PASSWORD");
        assert_eq!(template["fields"][0]["value"], "AAAAA-BBBBB-CCCCC-DDDDD-EEEEE");
    }

    #[test]
    fn test_save_key_reports_failure() {
        let shell = ScriptedShell::new()
            .on("op --version", 0, "2.24.0")
            .fail("op item create", 1, "vault is read-only");
        let store = CredentialStore::probe(&shell);

        assert!(!store.save_key("AAAAA-BBBBB-CCCCC-DDDDD-EEEEE", DEFAULT_ITEM));
    }
}
