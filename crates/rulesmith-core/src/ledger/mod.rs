//! Installation Ledger
//!
//! The ledger is the source of truth for what is installed where. Shared
//! output files are regenerated from it, so it must be readable before any
//! of them is touched.
//!
//! Persisted as TOML:
//!
//! ```toml
//! version = "1.0"
//!
//! [[records]]
//! target = "gemini"
//! rule_id = "review"
//! mode = "memory"
//! scope = "project"
//! project_path = "/work/app"
//! output_path = "/work/app/GEMINI.md"
//! checksum = "..."
//! installed_at = "2026-01-01T00:00:00Z"
//! ```

mod record;

pub use record::{InstallRecord, RecordKey, Scope};

use crate::{Error, Result};
use fs2::FileExt;
use rulesmith_fs::NormalizedPath;
use rulesmith_fs::io::write_atomic;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::Read;

const LEDGER_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    version: String,
    #[serde(default)]
    records: Vec<InstallRecord>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            version: LEDGER_VERSION.to_string(),
            records: Vec::new(),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn records(&self) -> &[InstallRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, key: &RecordKey) -> Option<&InstallRecord> {
        self.records.iter().find(|r| r.matches(key))
    }

    /// Insert `record`, replacing any record with the same natural key.
    ///
    /// Returns the replaced record.
    pub fn add_or_replace(&mut self, record: InstallRecord) -> Option<InstallRecord> {
        let key = record.key();
        match self.records.iter_mut().find(|r| r.matches(&key)) {
            Some(existing) => Some(std::mem::replace(existing, record)),
            None => {
                self.records.push(record);
                None
            }
        }
    }

    pub fn remove(&mut self, key: &RecordKey) -> Option<InstallRecord> {
        let pos = self.records.iter().position(|r| r.matches(key))?;
        Some(self.records.remove(pos))
    }

    /// Records matching both filters; `None` matches everything.
    pub fn query(&self, target: Option<&str>, rule_id: Option<&str>) -> Vec<&InstallRecord> {
        self.records
            .iter()
            .filter(|r| target.is_none_or(|t| r.target == t))
            .filter(|r| rule_id.is_none_or(|id| r.rule_id == id))
            .collect()
    }

    /// Records in one scope, in insertion order.
    pub fn in_scope(&self, scope: Scope, project_path: Option<&str>) -> Vec<&InstallRecord> {
        self.records
            .iter()
            .filter(|r| r.in_scope(scope, project_path))
            .collect()
    }

    /// Records that make up one shared output file.
    pub fn shared_output(
        &self,
        target: &str,
        mode: &str,
        scope: Scope,
        project_path: Option<&str>,
    ) -> Vec<&InstallRecord> {
        self.records
            .iter()
            .filter(|r| r.target == target && r.mode == mode && r.in_scope(scope, project_path))
            .collect()
    }

    /// Load a ledger; a missing file yields an empty ledger.
    pub fn load(path: &NormalizedPath) -> Result<Self> {
        let native = path.to_native();
        let read_error = |message: String| Error::LedgerRead {
            path: native.clone(),
            message,
        };

        let file = match File::open(&native) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path, "No ledger found, starting empty");
                return Ok(Self::new());
            }
            Err(e) => return Err(read_error(e.to_string())),
        };
        file.lock_shared().map_err(|e| read_error(e.to_string()))?;

        // Read through the locked handle
        let mut content = String::new();
        (&file)
            .read_to_string(&mut content)
            .map_err(|e| read_error(e.to_string()))?;
        let ledger: Ledger = toml::from_str(&content).map_err(|e| read_error(e.to_string()))?;

        tracing::debug!(path = %path, records = ledger.records.len(), "Ledger loaded");
        Ok(ledger)
    }

    /// Save atomically (temp file + rename).
    pub fn save(&self, path: &NormalizedPath) -> Result<()> {
        let write_error = |message: String| Error::LedgerWrite {
            path: path.to_native(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| write_error(e.to_string()))?;
        write_atomic(path, content.as_bytes()).map_err(|e| write_error(e.to_string()))?;
        tracing::debug!(path = %path, records = self.records.len(), "Ledger saved");
        Ok(())
    }

    /// Transactional read-modify-write.
    ///
    /// Holds an exclusive lock on `<ledger>.lock` while the ledger is
    /// loaded, handed to `mutate`, and saved. Nothing is saved when `mutate`
    /// fails or leaves the ledger unchanged.
    pub fn update<T, F>(path: &NormalizedPath, mutate: F) -> Result<T>
    where
        F: FnOnce(&mut Ledger) -> Result<T>,
    {
        let lock_path = NormalizedPath::new(format!("{}.lock", path));
        let lock_native = lock_path.to_native();
        let read_error = |message: String| Error::LedgerRead {
            path: path.to_native(),
            message,
        };

        if let Some(parent) = lock_native.parent() {
            fs::create_dir_all(parent).map_err(|e| read_error(e.to_string()))?;
        }
        let lock_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_native)
            .map_err(|e| read_error(e.to_string()))?;
        lock_file
            .lock_exclusive()
            .map_err(|e| read_error(format!("cannot lock {}: {}", lock_path, e)))?;

        let mut ledger = Self::load(path)?;
        let before = ledger.clone();
        let value = mutate(&mut ledger)?;
        if ledger != before {
            ledger.save(path)?;
        }

        // Lock released when lock_file is dropped
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn record(rule_id: &str, target: &str) -> InstallRecord {
        InstallRecord {
            target: target.into(),
            rule_id: rule_id.into(),
            mode: "memory".into(),
            scope: Scope::Project,
            project_path: Some("/work/app".into()),
            output_path: "/work/app/GEMINI.md".into(),
            checksum: String::new(),
            installed_at: Utc::now(),
        }
    }

    #[test]
    fn add_or_replace_uses_natural_key() {
        let mut ledger = Ledger::new();
        assert!(ledger.add_or_replace(record("lint", "gemini")).is_none());

        let mut updated = record("lint", "gemini");
        updated.checksum = "abc".into();
        let replaced = ledger.add_or_replace(updated);

        assert!(replaced.is_some());
        assert_eq!(ledger.records().len(), 1);
        assert_eq!(ledger.records()[0].checksum, "abc");
    }

    #[test]
    fn scope_is_part_of_the_key() {
        let mut ledger = Ledger::new();
        ledger.add_or_replace(record("lint", "gemini"));
        let mut global = record("lint", "gemini");
        global.scope = Scope::Global;
        global.project_path = None;
        ledger.add_or_replace(global);
        assert_eq!(ledger.records().len(), 2);
    }

    #[test]
    fn query_filters_by_target_and_rule() {
        let mut ledger = Ledger::new();
        ledger.add_or_replace(record("lint", "gemini"));
        ledger.add_or_replace(record("review", "gemini"));
        ledger.add_or_replace(record("review", "codex"));

        assert_eq!(ledger.query(None, None).len(), 3);
        assert_eq!(ledger.query(Some("gemini"), None).len(), 2);
        assert_eq!(ledger.query(Some("codex"), Some("review")).len(), 1);
        assert!(ledger.query(Some("codex"), Some("lint")).is_empty());
    }

    #[test]
    fn remove_by_key() {
        let mut ledger = Ledger::new();
        let rec = record("lint", "gemini");
        let key = rec.key();
        ledger.add_or_replace(rec);
        assert!(ledger.remove(&key).is_some());
        assert!(ledger.remove(&key).is_none());
        assert!(ledger.is_empty());
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let ledger = Ledger::load(&NormalizedPath::new(dir.path().join("ledger.toml"))).unwrap();
        assert!(ledger.is_empty());
        assert_eq!(ledger.version(), "1.0");
    }

    #[test]
    fn corrupt_file_is_ledger_read_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledger.toml");
        fs::write(&path, "records = [[[").unwrap();
        let result = Ledger::load(&NormalizedPath::new(&path));
        assert!(matches!(result, Err(Error::LedgerRead { .. })));
    }

    #[test]
    fn update_persists_changes() {
        let dir = tempdir().unwrap();
        let path = NormalizedPath::new(dir.path().join("state/ledger.toml"));

        Ledger::update(&path, |ledger| {
            ledger.add_or_replace(record("lint", "gemini"));
            Ok(())
        })
        .unwrap();

        let loaded = Ledger::load(&path).unwrap();
        assert_eq!(loaded.records().len(), 1);
        let raw = fs::read_to_string(path.to_native()).unwrap();
        assert!(raw.contains("version = \"1.0\""));
        assert!(raw.contains("scope = \"project\""));
    }

    #[test]
    fn failed_update_saves_nothing() {
        let dir = tempdir().unwrap();
        let path = NormalizedPath::new(dir.path().join("ledger.toml"));

        let result: Result<()> = Ledger::update(&path, |ledger| {
            ledger.add_or_replace(record("lint", "gemini"));
            Err(Error::InvalidOptions {
                message: "stop".into(),
            })
        });

        assert!(result.is_err());
        assert!(!path.exists());
    }
}
