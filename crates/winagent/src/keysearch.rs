//! Product key search in files
//!
//! Scans a single file, or a directory tree for files with one of the
//! configured extensions, for text shaped like a Windows product key
//! (five groups of five upper-case alphanumerics joined by hyphens).

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, error};
use walkdir::WalkDir;
use winagent_core::format;

use crate::error::Result;

/// Product key shape
pub const KEY_PATTERN: &str = r"[A-Z0-9]{5}(?:-[A-Z0-9]{5}){4}";

/// A key discovered in a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoundKey {
    pub key: String,
    /// Source file, as displayed by the platform
    pub file: String,
    pub found_at: String,
}

/// Keys collected during one search, unique by key text, in discovery order
#[derive(Debug, Default)]
pub struct KeyCollection {
    seen: HashSet<String>,
    keys: Vec<FoundKey>,
}

impl KeyCollection {
    /// Record a key unless it was already found; returns whether it was new
    pub fn insert(&mut self, key: &str, file: &Path) -> bool {
        if !self.seen.insert(key.to_string()) {
            return false;
        }
        self.keys.push(FoundKey {
            key: key.to_string(),
            file: file.display().to_string(),
            found_at: format::timestamp(),
        });
        true
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn into_vec(self) -> Vec<FoundKey> {
        self.keys
    }
}

pub struct KeyScanner {
    pattern: Regex,
    extensions: Vec<String>,
}

impl Default for KeyScanner {
    fn default() -> Self {
        Self::new(["txt", "log", "csv", "ini"])
    }
}

impl KeyScanner {
    /// Scanner for files with the given extensions (with or without the leading dot)
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            pattern: Regex::new(KEY_PATTERN).expect("product key pattern is valid"),
            extensions: extensions
                .into_iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    /// Whether a directory entry should be read (case-insensitive extension match)
    pub fn wants(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.contains(&e.to_lowercase()))
            .unwrap_or(false)
    }

    /// All key-shaped substrings of `text`, in order
    pub fn find_keys<'t>(&self, text: &'t str) -> Vec<&'t str> {
        self.pattern.find_iter(text).map(|m| m.as_str()).collect()
    }

    /// Scan a file or a directory tree, adding new keys to `found`.
    ///
    /// A file is read whatever its extension; inside a directory only
    /// wanted extensions are read. Unreadable entries are logged and skipped.
    pub fn scan(&self, root: &Path, found: &mut KeyCollection) {
        if root.is_file() {
            if let Err(e) = self.scan_file(root, found) {
                error!("Failed to read {}: {}", root.display(), e);
            }
            return;
        }

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    error!("Failed to walk {}: {}", root.display(), e);
                    continue;
                }
            };

            let path = entry.path();
            if !path.is_file() || !self.wants(path) {
                continue;
            }

            if let Err(e) = self.scan_file(path, found) {
                error!("Failed to read {}: {}", path.display(), e);
            }
        }
    }

    /// Read one file and record every key in it
    pub fn scan_file(&self, path: &Path, found: &mut KeyCollection) -> Result<usize> {
        let bytes = fs::read(path)?;
        let content = String::from_utf8_lossy(&bytes);

        let mut added = 0;
        for key in self.find_keys(&content) {
            if found.insert(key, path) {
                added += 1;
            }
        }

        debug!("{}: {} new key(s)", path.display(), added);
        Ok(added)
    }
}
