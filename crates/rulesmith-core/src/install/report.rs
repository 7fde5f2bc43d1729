//! Install, uninstall, sync and check reports

use crate::ledger::InstallRecord;
use crate::warning::Warnings;
use serde::{Deserialize, Serialize};

/// How an installed artifact compares with what was there before.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Nothing was installed at the destination
    NewlyInstalled,
    /// Installed content differs from the fresh compile
    Updated,
    /// Installed content is byte-identical; nothing is written
    Unchanged,
    Removed,
}

impl ChangeKind {
    /// Compare fresh content against what is currently installed.
    pub fn classify(installed: Option<&str>, fresh: &str) -> Self {
        match installed {
            None => ChangeKind::NewlyInstalled,
            Some(current) if current == fresh => ChangeKind::Unchanged,
            Some(_) => ChangeKind::Updated,
        }
    }

    /// Whether this change causes a write and a ledger update.
    pub fn is_change(self) -> bool {
        !matches!(self, ChangeKind::Unchanged)
    }
}

/// Outcome for one (rule, target, mode).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallOutcome {
    pub rule_id: String,
    pub target: String,
    pub mode: String,
    pub path: String,
    pub change: ChangeKind,
}

/// Outcome for one regenerated shared file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedOutcome {
    pub target: String,
    pub mode: String,
    pub path: String,
    pub change: ChangeKind,
    /// Rules present in the file after regeneration
    pub sections: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstallReport {
    pub dry_run: bool,
    pub outcomes: Vec<InstallOutcome>,
    pub shared: Vec<SharedOutcome>,
    /// Backups created before overwriting
    pub backups: Vec<String>,
    pub warnings: Warnings,
}

impl InstallReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    pub fn count(&self, change: ChangeKind) -> usize {
        self.outcomes.iter().filter(|o| o.change == change).count()
    }

    pub fn summary(&self) -> String {
        format!(
            "{}{} installed, {} updated, {} unchanged, {} removed, {} warning(s)",
            if self.dry_run { "[dry-run] " } else { "" },
            self.count(ChangeKind::NewlyInstalled),
            self.count(ChangeKind::Updated),
            self.count(ChangeKind::Unchanged),
            self.count(ChangeKind::Removed),
            self.warnings.len()
        )
    }
}

/// Ledger records whose installed files no longer match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckReport {
    pub healthy: usize,
    /// Recorded as installed but the file is gone
    pub missing: Vec<InstallRecord>,
    /// Per-rule files edited since they were installed
    pub modified: Vec<InstallRecord>,
}

impl CheckReport {
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.modified.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} healthy, {} missing, {} modified",
            self.healthy,
            self.missing.len(),
            self.modified.len()
        )
    }
}
