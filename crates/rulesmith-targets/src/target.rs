//! Target and mode definitions

use crate::format::ArtifactFormat;
use crate::{Error, Result};
use rulesmith_fs::validate_path_identifier;

/// Where the artifacts of one mode are installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeOutput {
    /// One file per rule: `<scope root>/<dir>/<id><extension>`
    PerRule { dir: String, extension: String },
    /// One shared file per scope, regenerated from the ledger
    Aggregate {
        project_file: String,
        global_file: String,
    },
}

/// A mode a target can compile a rule into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeSpec {
    pub name: String,
    pub output: ModeOutput,
    pub format: ArtifactFormat,
}

impl ModeSpec {
    pub fn per_rule(
        name: impl Into<String>,
        dir: impl Into<String>,
        extension: impl Into<String>,
        format: ArtifactFormat,
    ) -> Self {
        Self {
            name: name.into(),
            output: ModeOutput::PerRule {
                dir: dir.into(),
                extension: extension.into(),
            },
            format,
        }
    }

    pub fn aggregate(
        name: impl Into<String>,
        project_file: impl Into<String>,
        global_file: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            output: ModeOutput::Aggregate {
                project_file: project_file.into(),
                global_file: global_file.into(),
            },
            format: ArtifactFormat::Section,
        }
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(self.output, ModeOutput::Aggregate { .. })
    }

    /// Extension of the compiled source file.
    fn extension(&self) -> &str {
        match &self.output {
            ModeOutput::PerRule { extension, .. } => extension,
            ModeOutput::Aggregate { .. } => ".md",
        }
    }
}

/// The closed set of target capabilities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetCapability {
    /// Exactly one per-rule artifact
    SingleArtifact(ModeSpec),
    /// Several modes; `defaults` names the modes used without a hint
    MultiMode {
        modes: Vec<ModeSpec>,
        defaults: Vec<String>,
    },
    /// Every rule contributes to one shared file per scope
    MergeTarget(ModeSpec),
}

/// Outcome of matching a mode hint against a target's modes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeSelection {
    pub selected: Vec<String>,
    /// Requested names the target does not declare
    pub unknown: Vec<String>,
}

/// A destination AI-tool format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub slug: String,
    pub name: String,
    pub capability: TargetCapability,
}

impl Target {
    pub fn new(
        slug: impl Into<String>,
        name: impl Into<String>,
        capability: TargetCapability,
    ) -> Result<Self> {
        let target = Self {
            slug: slug.into(),
            name: name.into(),
            capability,
        };
        target.validate()?;
        Ok(target)
    }

    fn validate(&self) -> Result<()> {
        validate_path_identifier(&self.slug, "Target slug").map_err(|message| {
            Error::InvalidTarget {
                slug: self.slug.clone(),
                message,
            }
        })?;

        let invalid = |message: &str| Error::InvalidTarget {
            slug: self.slug.clone(),
            message: message.to_string(),
        };
        match &self.capability {
            TargetCapability::SingleArtifact(mode) if mode.is_aggregate() => {
                Err(invalid("a single-artifact mode must produce per-rule files"))
            }
            TargetCapability::MergeTarget(mode) if !mode.is_aggregate() => {
                Err(invalid("a merge-target mode must produce a shared file"))
            }
            TargetCapability::MultiMode { modes, defaults } => {
                if modes.is_empty() {
                    return Err(invalid("a multi-mode target needs at least one mode"));
                }
                if defaults.is_empty() || defaults.iter().any(|d| self.mode(d).is_none()) {
                    return Err(invalid("default modes must name declared modes"));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// All declared modes, in declaration order.
    pub fn modes(&self) -> Vec<&ModeSpec> {
        match &self.capability {
            TargetCapability::SingleArtifact(mode) | TargetCapability::MergeTarget(mode) => {
                vec![mode]
            }
            TargetCapability::MultiMode { modes, .. } => modes.iter().collect(),
        }
    }

    pub fn mode(&self, name: &str) -> Option<&ModeSpec> {
        self.modes().into_iter().find(|m| m.name == name)
    }

    /// Modes compiled when neither the rule nor the vendor gives a hint.
    pub fn default_modes(&self) -> Vec<String> {
        match &self.capability {
            TargetCapability::SingleArtifact(mode) | TargetCapability::MergeTarget(mode) => {
                vec![mode.name.clone()]
            }
            TargetCapability::MultiMode { defaults, .. } => defaults.clone(),
        }
    }

    pub fn is_merge_target(&self) -> bool {
        matches!(self.capability, TargetCapability::MergeTarget(_))
    }

    /// Whether any of this target's modes produce a shared file.
    pub fn has_aggregate_output(&self) -> bool {
        self.modes().iter().any(|m| m.is_aggregate())
    }

    /// Match a mode hint against the declared modes.
    ///
    /// Selected modes keep declaration order and are de-duplicated. When
    /// nothing in the hint is usable the default modes are selected.
    pub fn select_modes(&self, requested: &[String]) -> ModeSelection {
        let unknown: Vec<String> = requested
            .iter()
            .filter(|r| self.mode(r).is_none())
            .cloned()
            .collect();

        let selected: Vec<String> = self
            .modes()
            .into_iter()
            .filter(|m| requested.iter().any(|r| *r == m.name))
            .map(|m| m.name.clone())
            .collect();

        ModeSelection {
            selected: if selected.is_empty() {
                self.default_modes()
            } else {
                selected
            },
            unknown,
        }
    }

    /// Compiled-source file name of `id` in `mode`, relative to this
    /// target's output directory.
    ///
    /// Multi-mode targets prefix the mode name so modes never collide.
    pub fn artifact_filename(&self, mode: &ModeSpec, id: &str) -> String {
        match &self.capability {
            TargetCapability::MultiMode { .. } => {
                format!("{}/{}{}", mode.name, id, mode.extension())
            }
            _ => format!("{}{}", id, mode.extension()),
        }
    }
}
