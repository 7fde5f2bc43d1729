//! Installation records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Installation context of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Global,
    Project,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Global => write!(f, "global"),
            Scope::Project => write!(f, "project"),
        }
    }
}

/// Natural key of an installation record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey {
    pub target: String,
    pub rule_id: String,
    pub scope: Scope,
    pub project_path: Option<String>,
    pub mode: String,
}

/// One installed (rule, target, mode) in one scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallRecord {
    pub target: String,
    pub rule_id: String,
    pub mode: String,
    pub scope: Scope,
    /// Set for project scope only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_path: Option<String>,
    /// Physical file the record contributes to
    pub output_path: String,
    /// sha256 of the compiled content that was installed
    #[serde(default)]
    pub checksum: String,
    pub installed_at: DateTime<Utc>,
}

impl InstallRecord {
    pub fn key(&self) -> RecordKey {
        RecordKey {
            target: self.target.clone(),
            rule_id: self.rule_id.clone(),
            scope: self.scope,
            project_path: self.project_path.clone(),
            mode: self.mode.clone(),
        }
    }

    pub fn matches(&self, key: &RecordKey) -> bool {
        self.target == key.target
            && self.rule_id == key.rule_id
            && self.scope == key.scope
            && self.project_path == key.project_path
            && self.mode == key.mode
    }

    /// Whether this record lives in `scope` for `project_path`.
    pub fn in_scope(&self, scope: Scope, project_path: Option<&str>) -> bool {
        self.scope == scope && self.project_path.as_deref() == project_path
    }
}
