//! Per-file fingerprint cache.
//!
//! The cache file is a single JSON envelope:
//!
//! ```json
//! {
//!   "schemaVersion": 1,
//!   "activeIdentifier": "t@3f9a1c",
//!   "files": {
//!     "src/App.tsx": {
//!       "fingerprint": { "mtimeMs": 1718000000000, "size": 1234 },
//!       "candidates": [],
//!       "dynamicKeyWarnings": []
//!     }
//!   }
//! }
//! ```
//!
//! The envelope is validated once on load. A schema or identifier mismatch
//! discards every entry; there is no partial trust. Per-file entries are
//! only reused on an exact fingerprint match.

use std::{
    collections::BTreeMap,
    fs,
    path::Path,
    time::UNIX_EPOCH,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{
    candidate::{Candidate, DynamicKeyWarning},
    diagnostics::Diagnostic,
};

/// Bump whenever the candidate shape or classification rules change.
pub const SCHEMA_VERSION: u32 = 1;

/// Cheap change signal for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fingerprint {
    pub mtime_ms: u64,
    pub size: u64,
}

impl Fingerprint {
    pub fn new(mtime_ms: u64, size: u64) -> Self {
        Self { mtime_ms, size }
    }

    pub fn from_metadata(metadata: &fs::Metadata) -> Self {
        let mtime_ms = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        Self::new(mtime_ms, metadata.len())
    }

    pub fn of(path: &Path) -> Result<Self> {
        let metadata = fs::metadata(path)
            .with_context(|| format!("Failed to read metadata: {}", path.display()))?;
        Ok(Self::from_metadata(&metadata))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub fingerprint: Fingerprint,
    pub candidates: Vec<Candidate>,
    pub dynamic_key_warnings: Vec<DynamicKeyWarning>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEnvelope {
    pub schema_version: u32,
    pub active_identifier: String,
    pub files: BTreeMap<String, CacheEntry>,
}

impl CacheEnvelope {
    pub fn new(active_identifier: impl Into<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            active_identifier: active_identifier.into(),
            files: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, relative_path: impl Into<String>, entry: CacheEntry) {
        self.files.insert(relative_path.into(), entry);
    }

    /// Writes the envelope to a sibling temp file, then renames it into place.
    ///
    /// A crash before the rename leaves the previous cache file untouched.
    pub fn write_atomic(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let content = serde_json::to_string(self).context("Failed to serialize cache")?;
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = Path::new(&tmp);

        fs::write(tmp, content)
            .with_context(|| format!("Failed to write file: {}", tmp.display()))?;
        fs::rename(tmp, path)
            .with_context(|| format!("Failed to replace cache file: {}", path.display()))?;
        Ok(())
    }
}

/// Outcome of loading the cache file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLoad {
    Loaded { entries: usize },
    Missing,
    Discarded(String),
}

/// Read-only view over a validated envelope.
#[derive(Debug, Clone, Default)]
pub struct FingerprintCache {
    entries: BTreeMap<String, CacheEntry>,
}

impl FingerprintCache {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Loads and validates the cache file at `path`.
    ///
    /// Never fails: unreadable or mismatching caches come back empty with a
    /// [`CacheLoad::Discarded`] reason.
    pub fn load(path: &Path, active_identifier: &str) -> (Self, CacheLoad) {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return (Self::empty(), CacheLoad::Missing);
            }
            Err(e) => {
                return (
                    Self::empty(),
                    CacheLoad::Discarded(format!("cache file is unreadable: {}", e)),
                );
            }
        };
        match serde_json::from_str::<Value>(&content) {
            Ok(value) => Self::from_value(value, active_identifier),
            Err(_) => (
                Self::empty(),
                CacheLoad::Discarded("cache file is not valid JSON".to_string()),
            ),
        }
    }

    fn from_value(value: Value, active_identifier: &str) -> (Self, CacheLoad) {
        let version = value.get("schemaVersion").and_then(Value::as_u64);
        if version != Some(SCHEMA_VERSION as u64) {
            let found = version.map_or("none".to_string(), |v| v.to_string());
            return (
                Self::empty(),
                CacheLoad::Discarded(format!(
                    "schema version {} does not match {}",
                    found, SCHEMA_VERSION
                )),
            );
        }

        let identifier = value.get("activeIdentifier").and_then(Value::as_str);
        if identifier != Some(active_identifier) {
            return (
                Self::empty(),
                CacheLoad::Discarded(format!(
                    "active identifier {} does not match {}",
                    identifier.unwrap_or("none"),
                    active_identifier
                )),
            );
        }

        match serde_json::from_value::<CacheEnvelope>(value) {
            Ok(envelope) => {
                let entries = envelope.files.len();
                (
                    Self {
                        entries: envelope.files,
                    },
                    CacheLoad::Loaded { entries },
                )
            }
            Err(e) => (
                Self::empty(),
                CacheLoad::Discarded(format!("cache entries are malformed: {}", e)),
            ),
        }
    }

    /// Returns the entry for `relative_path` only if its fingerprint matches exactly.
    pub fn get(&self, relative_path: &str, fingerprint: Fingerprint) -> Option<&CacheEntry> {
        self.entries
            .get(relative_path)
            .filter(|entry| entry.fingerprint == fingerprint)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
