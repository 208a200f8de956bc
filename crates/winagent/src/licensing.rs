//! Licensing operations
//!
//! System information, MAK key search and the install/activate/verify
//! pipeline, each composed from allow-listed `slmgr`/`systeminfo` calls.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{info, warn};

use crate::envelope::Envelope;
use crate::error::{AgentError, Result};
use crate::executor::Executor;
use crate::keysearch::{FoundKey, KeyCollection};
use crate::shell::Shell;

/// Length of a product key including hyphens
pub const KEY_LENGTH: usize = 29;

/// `slmgr /dlv` labels, localized
const PRODUCT_KEY_LABELS: &[&str] = &["chave do produto:", "product key:"];
const LICENSE_STATUS_LABELS: &[&str] = &["status da licença:", "license status:"];

/// Licensing state reported by `slmgr /dlv`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseInfo {
    pub product_key: Option<String>,
    pub license_status: Option<String>,
}

/// Parse `slmgr /dlv` output. The value is whatever follows the last colon
/// of a labelled line; later lines override earlier ones.
pub fn parse_license_info(output: &str) -> LicenseInfo {
    let mut info = LicenseInfo::default();

    for line in output.lines() {
        let lower = line.to_lowercase();
        let value = || line.rsplit(':').next().unwrap_or_default().trim().to_string();

        if PRODUCT_KEY_LABELS.iter().any(|l| lower.contains(l)) {
            info.product_key = Some(value());
        } else if LICENSE_STATUS_LABELS.iter().any(|l| lower.contains(l)) {
            info.license_status = Some(value());
        }
    }

    info
}

/// Payload of a successful key search
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeySearchReport {
    pub system_info: LicenseInfo,
    pub found_keys: Vec<FoundKey>,
    pub search_locations: Vec<String>,
}

impl KeySearchReport {
    pub fn to_envelope(&self) -> Envelope {
        match serde_json::to_value(self) {
            Ok(data) => Envelope::success().with_data(data),
            Err(e) => Envelope::error(AgentError::from(e).to_string()),
        }
    }
}

/// The product-key heuristic used for free text: 29 characters with a hyphen
pub fn looks_like_key(token: &str) -> bool {
    token.chars().count() == KEY_LENGTH && token.contains('-')
}

impl<S: Shell> Executor<S> {
    /// `systeminfo` and `slmgr /dlv` output under `data.windows` / `data.activation`.
    /// Failed sub-commands are left out; the envelope itself is always a success.
    pub fn get_system_info(&self) -> Envelope {
        let mut data = Map::new();

        let windows = self.execute("systeminfo");
        if windows.is_success() {
            data.insert("windows".into(), windows.stdout().unwrap_or_default().into());
        }

        let activation = self.execute("slmgr /dlv");
        if activation.is_success() {
            data.insert("activation".into(), activation.stdout().unwrap_or_default().into());
        }

        Envelope::success().with_data(Value::Object(data))
    }

    /// Read the licensing state and, when `path` is given, scan it for keys
    pub fn search_keys(&self, path: Option<&Path>) -> Result<KeySearchReport> {
        let mut report = KeySearchReport::default();

        let dlv = self.execute("slmgr /dlv");
        if dlv.is_success() {
            report.system_info = parse_license_info(dlv.stdout().unwrap_or_default());
        }

        if let Some(path) = path {
            if !path.exists() {
                return Err(AgentError::PathNotFound(path.to_path_buf()));
            }

            report.search_locations.push(path.display().to_string());
            let mut found = KeyCollection::default();
            self.scanner.scan(path, &mut found);
            info!("Key search in {}: {} key(s)", path.display(), found.len());
            report.found_keys = found.into_vec();
        }

        Ok(report)
    }

    pub fn search_mak_keys(&self, path: Option<&Path>) -> Envelope {
        match self.search_keys(path) {
            Ok(report) => report.to_envelope(),
            Err(e) => {
                warn!("Key search failed: {}", e);
                Envelope::error(e.to_string())
            }
        }
    }

    /// Install, activate and verify a product key.
    ///
    /// Stops at the first step that does not succeed and returns that step's
    /// envelope unchanged. Nothing is rolled back.
    pub fn activate_windows(&self, key: &str) -> Envelope {
        if key.chars().count() != KEY_LENGTH {
            return Envelope::error(AgentError::InvalidKey.to_string());
        }

        let install = self.execute(&format!("slmgr /ipk {}", key));
        if !install.is_success() {
            warn!("Key installation failed");
            return install;
        }

        let activate = self.execute("slmgr /ato");
        if !activate.is_success() {
            warn!("Activation failed");
            return activate;
        }

        let verify = self.execute("slmgr /dlv");
        info!("Windows activated");

        Envelope::success()
            .with_message("windows activated successfully")
            .with_field("verification", verify.stdout().unwrap_or_default())
    }
}
