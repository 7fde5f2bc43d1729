//! Merged-Artifact Manager
//!
//! A shared output file is derived, never authored: its content is a pure
//! function of the ledger records that point at it and of their compiled
//! sources, which are re-read on every regeneration.

use crate::compile::CompiledSources;
use crate::ledger::InstallRecord;
use crate::warning::Warning;
use rulesmith_targets::{ModeSpec, Target};
use std::collections::BTreeMap;

pub const MERGED_HEADER: &str =
    "<!-- Generated by rulesmith. Do not edit; run an install or sync to regenerate. -->";
const SECTION_SEPARATOR: &str = "\n\n---\n\n";

/// Render a shared file from `(identifier, content)` sections.
///
/// Returns `None` only when there are no sections. A single section is
/// emitted without a sub-header. Blank sections keep their sub-header.
pub fn render_merged(sections: &BTreeMap<String, String>) -> Option<String> {
    let body = match sections.len() {
        0 => return None,
        1 => sections.values().next()?.trim().to_string(),
        _ => sections
            .iter()
            .map(|(id, content)| match content.trim() {
                "" => format!("## {}", id),
                content => format!("## {}\n\n{}", id, content),
            })
            .collect::<Vec<_>>()
            .join(SECTION_SEPARATOR),
    };

    if body.is_empty() {
        Some(format!("{}\n", MERGED_HEADER))
    } else {
        Some(format!("{}\n\n{}\n", MERGED_HEADER, body))
    }
}

/// A regenerated shared file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedFile {
    /// `None` when no constituent remains and the file must be deleted
    pub content: Option<String>,
    /// Identifiers of the rules included, sorted
    pub sections: Vec<String>,
    pub warnings: Vec<Warning>,
}

/// Regenerates shared output files from ledger records.
#[derive(Debug, Clone, Copy)]
pub struct MergedArtifactManager<'a> {
    sources: &'a CompiledSources,
}

impl<'a> MergedArtifactManager<'a> {
    pub fn new(sources: &'a CompiledSources) -> Self {
        Self { sources }
    }

    /// Content of the shared file of `mode` built from `records`.
    ///
    /// A record whose compiled source cannot be read is left out with a
    /// [`Warning::Inconsistency`]; the rest of the file is still produced.
    pub fn resolve_merged_file(
        &self,
        target: &Target,
        mode: &ModeSpec,
        records: &[&InstallRecord],
    ) -> MergedFile {
        let mut sections = BTreeMap::new();
        let mut warnings = Vec::new();

        for record in records {
            let dropped = |reason: String| Warning::Inconsistency {
                message: format!(
                    "{} dropped from {} {} output: {}",
                    record.rule_id, target.slug, mode.name, reason
                ),
            };
            match self.sources.read(target, mode, &record.rule_id) {
                Ok(Some(content)) => {
                    sections.insert(record.rule_id.clone(), content);
                }
                Ok(None) => warnings.push(dropped("compiled source is missing".to_string())),
                Err(e) => warnings.push(dropped(e.to_string())),
            }
        }

        MergedFile {
            content: render_merged(&sections),
            sections: sections.into_keys().collect(),
            warnings,
        }
    }
}
