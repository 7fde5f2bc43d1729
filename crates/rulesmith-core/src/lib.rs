//! Core engine for rulesmith
//!
//! Turns overlapping rule template sources into per-tool artifacts and keeps
//! a ledger of what is installed where:
//!
//! ```text
//! SourceResolver -> merge_context -> compile -> Installer
//!                                                 |      \
//!                                               Ledger  MergedArtifactManager
//! ```
//!
//! - **Source Resolver**: one definition per rule identifier, local first
//! - **Configuration Merger**: vendor defaults < vendor variables < rule metadata
//! - **Compile batch**: every (rule, target) pair, failures become warnings
//! - **Installation Ledger**: keyed install records with transactional updates
//! - **Merged-Artifact Manager**: shared files regenerated from the ledger
//!
//! Structural problems (unreadable root, unreadable ledger) are [`Error`]s.
//! Everything else is a [`Warning`] in the operation's report.

pub mod backup;
pub mod compile;
pub mod context;
pub mod error;
pub mod install;
pub mod ledger;
pub mod logging;
pub mod merged;
pub mod project;
pub mod resolver;
pub mod warning;

pub use compile::{CompileReport, CompiledSources, WrittenArtifact, compile, compile_pair};
pub use context::{MergedContext, default_description, merge_context};
pub use error::{Error, Result};
pub use install::{
    ChangeKind, CheckReport, InstallOptions, InstallOutcome, InstallReport, InstallRoots, Installer,
    SharedOutcome,
};
pub use ledger::{InstallRecord, Ledger, RecordKey, Scope};
pub use merged::{MERGED_HEADER, MergedArtifactManager, MergedFile, render_merged};
pub use project::Project;
pub use resolver::{OriginRoot, Resolution, RuleDefinition, Shadowed, SourceResolver};
pub use warning::{Warning, Warnings};
