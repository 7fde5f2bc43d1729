//! Configuration Merger
//!
//! Layers, lowest first: vendor template defaults, vendor variables, rule
//! metadata. Fields merge one by one and the custom map merges key by key,
//! so a higher layer only replaces what it actually sets.

use crate::resolver::RuleDefinition;
use crate::warning::Warning;
use rulesmith_meta::{Globs, ResolvedContext, VendorConfig};
use rulesmith_targets::Target;
use serde_json::Value;
use std::collections::BTreeMap;

/// A resolved context plus the problems found while selecting modes.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedContext {
    pub context: ResolvedContext,
    pub warnings: Vec<Warning>,
}

/// Description used when no layer provides one.
pub fn default_description(id: &str) -> String {
    format!("AI coding rules for {}", id)
}

#[derive(Default)]
struct Layered {
    description: Option<String>,
    globs: Globs,
    tags: Vec<String>,
    custom: BTreeMap<String, Value>,
}

impl Layered {
    fn apply_defaults(&mut self, vendor: &VendorConfig) {
        let defaults = &vendor.defaults;
        self.description = defaults.description.clone();
        self.globs = defaults.globs.clone();
        self.tags = defaults.tags.clone();
        self.custom = defaults.custom.clone();
    }

    /// `description` and `globs` variables override those fields; every
    /// other variable is a custom key.
    fn apply_variables(&mut self, variables: &BTreeMap<String, Value>) {
        for (key, value) in variables {
            match (key.as_str(), value) {
                ("description", Value::String(text)) => self.description = Some(text.clone()),
                ("globs", value) => self.globs = Globs::from_value(value),
                _ => {
                    self.custom.insert(key.clone(), value.clone());
                }
            }
        }
    }

    fn apply_rule(&mut self, rule: &RuleDefinition) {
        let metadata = &rule.metadata;
        if let Some(description) = &metadata.description {
            self.description = Some(description.clone());
        }
        self.globs = metadata.globs.clone().or(std::mem::take(&mut self.globs));
        if !metadata.tags.is_empty() {
            self.tags = metadata.tags.clone();
        }
        for (key, value) in &metadata.custom {
            self.custom.insert(key.clone(), value.clone());
        }
    }
}

/// Merge the layers that apply to `rule` when compiled for `target`.
///
/// Never fails. Mode hints naming modes the target does not declare are
/// dropped with a [`Warning::UnknownMode`].
pub fn merge_context(
    rule: &RuleDefinition,
    vendor: Option<&VendorConfig>,
    target: &Target,
) -> MergedContext {
    let mut layered = Layered::default();
    if let Some(vendor) = vendor {
        layered.apply_defaults(vendor);
        layered.apply_variables(&vendor.variables);
    }
    layered.apply_rule(rule);

    let requested = rule
        .metadata
        .mode_for(&target.slug)
        .or_else(|| vendor.and_then(|v| v.mode_for(&target.slug)))
        .unwrap_or_default();
    let selection = target.select_modes(&requested);
    let warnings = selection
        .unknown
        .into_iter()
        .map(|mode| Warning::UnknownMode {
            rule: rule.id.clone(),
            target: target.slug.clone(),
            mode,
        })
        .collect();

    let context = ResolvedContext {
        id: rule.id.clone(),
        origin: rule.origin.clone(),
        target: target.slug.clone(),
        description: layered
            .description
            .unwrap_or_else(|| default_description(&rule.id)),
        globs: layered.globs.resolved(),
        modes: selection.selected,
        tags: layered.tags,
        custom: layered.custom,
        vendor: vendor.map(|v| v.manifest.clone()),
    };

    MergedContext { context, warnings }
}
