//! Explicit per-call installation settings

use crate::ledger::Scope;
use crate::{Error, Result};
use rulesmith_fs::NormalizedPath;

/// Settings passed to every installer operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOptions {
    pub scope: Scope,
    /// Required for [`Scope::Project`], ignored for [`Scope::Global`]
    pub project_path: Option<NormalizedPath>,
    /// Overwrite without taking backups
    pub force: bool,
    /// Report what would happen without touching files or the ledger
    pub dry_run: bool,
    /// Target slugs to act on; empty means all
    pub targets: Vec<String>,
}

impl InstallOptions {
    pub fn project(path: impl Into<NormalizedPath>) -> Self {
        Self {
            scope: Scope::Project,
            project_path: Some(path.into()),
            force: false,
            dry_run: false,
            targets: Vec::new(),
        }
    }

    pub fn global() -> Self {
        Self {
            scope: Scope::Global,
            project_path: None,
            force: false,
            dry_run: false,
            targets: Vec::new(),
        }
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.targets = targets.into_iter().map(Into::into).collect();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.scope == Scope::Project && self.project_path.is_none() {
            return Err(Error::InvalidOptions {
                message: "project scope requires a project path".to_string(),
            });
        }
        Ok(())
    }

    /// Project path as stored in ledger records.
    pub fn project_key(&self) -> Option<String> {
        match self.scope {
            Scope::Project => self.project_path.as_ref().map(ToString::to_string),
            Scope::Global => None,
        }
    }

    pub(crate) fn includes_target(&self, slug: &str) -> bool {
        self.targets.is_empty() || self.targets.iter().any(|t| t == slug)
    }
}

/// Where scopes are rooted on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRoots {
    /// Root of the global scope, normally the home directory
    pub global: NormalizedPath,
}

impl InstallRoots {
    pub fn new(global: impl Into<NormalizedPath>) -> Self {
        Self {
            global: global.into(),
        }
    }

    pub fn from_home() -> Result<Self> {
        dirs::home_dir()
            .map(Self::new)
            .ok_or(Error::NoHomeDirectory)
    }
}
