//! Compile batch: every selected rule against every selected target
//!
//! Artifacts land in `<out>/<target>/<artifact filename>`, the
//! compiled-source layout the installer and the merged-artifact manager
//! read back. A failing (rule, target) pair is recorded as a warning and
//! the batch moves on.

use crate::context::merge_context;
use crate::resolver::{Resolution, RuleDefinition};
use crate::warning::{Warning, Warnings};
use crate::Result;
use rulesmith_fs::NormalizedPath;
use rulesmith_fs::io::{read_text_if_exists, remove_file_if_exists, write_text};
use rulesmith_targets::{CompileInput, CompiledArtifact, ModeSpec, Target, compile_rule};
use serde::{Deserialize, Serialize};

/// Location of compiled artifacts on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledSources {
    out_dir: NormalizedPath,
}

impl CompiledSources {
    pub fn new(out_dir: impl Into<NormalizedPath>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    pub fn out_dir(&self) -> &NormalizedPath {
        &self.out_dir
    }

    /// Compiled source of rule `id` in `mode` of `target`.
    pub fn path(&self, target: &Target, mode: &ModeSpec, id: &str) -> NormalizedPath {
        self.out_dir
            .join(&target.slug)
            .join(&target.artifact_filename(mode, id))
    }

    pub fn exists(&self, target: &Target, mode: &ModeSpec, id: &str) -> bool {
        self.path(target, mode, id).is_file()
    }

    /// Read a compiled source; `None` when it was never compiled.
    pub fn read(&self, target: &Target, mode: &ModeSpec, id: &str) -> Result<Option<String>> {
        Ok(read_text_if_exists(&self.path(target, mode, id))?)
    }
}

/// One artifact written by a compile batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrittenArtifact {
    pub rule_id: String,
    pub target: String,
    pub mode: String,
    pub path: String,
}

/// Outcome of [`compile`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompileReport {
    /// Number of artifacts written
    pub compiled: usize,
    pub artifacts: Vec<WrittenArtifact>,
    pub warnings: Warnings,
}

impl CompileReport {
    pub fn summary(&self) -> String {
        format!(
            "{} artifact(s) compiled, {} warning(s)",
            self.compiled,
            self.warnings.len()
        )
    }
}

/// Compile one (rule, target) pair without touching the filesystem.
///
/// Render failures come back as a [`Warning::Render`] and no artifacts.
pub fn compile_pair(
    resolution: &Resolution,
    rule: &RuleDefinition,
    target: &Target,
) -> (Vec<CompiledArtifact>, Vec<Warning>) {
    let merged = merge_context(rule, resolution.vendor_config(&rule.origin), target);
    let mut warnings = merged.warnings;

    let input = CompileInput {
        id: &rule.id,
        body: &rule.body,
        fragments: resolution.fragments_for(&rule.origin),
        context: &merged.context,
    };

    match compile_rule(target, &input) {
        Ok(artifacts) => (artifacts, warnings),
        Err(e) => {
            warnings.push(Warning::Render {
                rule: rule.id.clone(),
                target: target.slug.clone(),
                message: e.to_string(),
            });
            (Vec::new(), warnings)
        }
    }
}

/// Compile `rules` for `targets` and write the artifacts below `sources`.
///
/// Compiling a rule also removes its compiled sources for modes of the
/// target it no longer selects.
pub fn compile(
    resolution: &Resolution,
    rules: &[&RuleDefinition],
    targets: &[&Target],
    sources: &CompiledSources,
) -> CompileReport {
    let mut report = CompileReport::default();

    for rule in rules {
        for target in targets {
            let _span =
                tracing::debug_span!("compile", rule = %rule.id, slug = %target.slug).entered();

            let (artifacts, warnings) = compile_pair(resolution, rule, target);
            let failed = warnings.iter().any(|w| matches!(w, Warning::Render { .. }));
            report.warnings.extend(warnings);
            if failed {
                continue;
            }

            for artifact in &artifacts {
                let path = sources.out_dir().join(&artifact.target).join(&artifact.filename);
                match write_text(&path, &artifact.content) {
                    Ok(()) => {
                        tracing::debug!(path = %path, mode = %artifact.mode, "Artifact written");
                        report.compiled += 1;
                        report.artifacts.push(WrittenArtifact {
                            rule_id: rule.id.clone(),
                            target: artifact.target.clone(),
                            mode: artifact.mode.clone(),
                            path: path.to_string(),
                        });
                    }
                    Err(e) => report.warnings.push(Warning::Write {
                        path: path.to_string(),
                        message: e.to_string(),
                    }),
                }
            }

            for mode in target.modes() {
                if artifacts.iter().any(|a| a.mode == mode.name) {
                    continue;
                }
                let stale = sources.path(target, mode, &rule.id);
                match remove_file_if_exists(&stale) {
                    Ok(true) => tracing::debug!(path = %stale, "Removed stale compiled source"),
                    Ok(false) => {}
                    Err(e) => report.warnings.push(Warning::Write {
                        path: stale.to_string(),
                        message: e.to_string(),
                    }),
                }
            }
        }
    }

    tracing::info!("{}", report.summary());
    report
}
