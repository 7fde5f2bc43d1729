//! Non-fatal problems collected while processing a batch

use serde::{Deserialize, Serialize};
use std::fmt;

/// A problem that was caught, logged and skipped.
///
/// Warnings never change the outcome of the surrounding operation; they are
/// gathered into the operation's report so callers can surface a count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// A rule's metadata header was missing or malformed
    MetadataParse { rule: String, message: String },
    /// A template file could not be read and was skipped
    SourceRead { path: String, message: String },
    /// A (rule, target) pair failed to render
    Render {
        rule: String,
        target: String,
        message: String,
    },
    /// An artifact could not be written
    Write { path: String, message: String },
    /// A ledger record no longer matches what is on disk
    Inconsistency { message: String },
    /// A mode hint named a mode the target does not declare
    UnknownMode {
        rule: String,
        target: String,
        mode: String,
    },
}

impl Warning {
    /// Emit this warning through `tracing`.
    pub(crate) fn log(&self) {
        tracing::warn!(kind = self.kind(), "{}", self);
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Warning::MetadataParse { .. } => "metadata_parse",
            Warning::SourceRead { .. } => "source_read",
            Warning::Render { .. } => "render",
            Warning::Write { .. } => "write",
            Warning::Inconsistency { .. } => "inconsistency",
            Warning::UnknownMode { .. } => "unknown_mode",
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::MetadataParse { rule, message } => {
                write!(f, "{}: {}", rule, message)
            }
            Warning::SourceRead { path, message } => {
                write!(f, "skipped unreadable template {}: {}", path, message)
            }
            Warning::Render {
                rule,
                target,
                message,
            } => write!(f, "failed to render {} for {}: {}", rule, target, message),
            Warning::Write { path, message } => {
                write!(f, "failed to write {}: {}", path, message)
            }
            Warning::Inconsistency { message } => write!(f, "{}", message),
            Warning::UnknownMode { rule, target, mode } => write!(
                f,
                "{} requests mode '{}' which {} does not support",
                rule, mode, target
            ),
        }
    }
}

/// Collects warnings, logging each one as it arrives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Warnings(Vec<Warning>);

impl Warnings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, warning: Warning) {
        warning.log();
        self.0.push(warning);
    }

    pub fn extend(&mut self, warnings: impl IntoIterator<Item = Warning>) {
        for warning in warnings {
            self.push(warning);
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Warning> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<Warning> {
        self.0
    }
}

impl<'a> IntoIterator for &'a Warnings {
    type Item = &'a Warning;
    type IntoIter = std::slice::Iter<'a, Warning>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
