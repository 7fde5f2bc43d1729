//! Per-target rule compilation

use crate::render::RenderScope;
use crate::target::Target;
use crate::Result;
use rulesmith_meta::ResolvedContext;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One output of compiling a rule for a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledArtifact {
    pub target: String,
    pub mode: String,
    /// Path relative to the target's output directory
    pub filename: String,
    pub content: String,
}

/// Everything one (rule, target) compilation pass may see.
#[derive(Debug, Clone, Copy)]
pub struct CompileInput<'a> {
    pub id: &'a str,
    /// Template body with its metadata header already removed
    pub body: &'a str,
    /// Fragments of the rule's own origin only
    pub fragments: &'a BTreeMap<String, String>,
    pub context: &'a ResolvedContext,
}

/// Compile one rule for one target.
///
/// Renders the body once in a fresh scope and shapes it for every mode in
/// `context.modes` that the target declares. Yields one artifact per
/// selected mode; an empty mode list yields nothing.
pub fn compile_rule(target: &Target, input: &CompileInput<'_>) -> Result<Vec<CompiledArtifact>> {
    let modes: Vec<_> = input
        .context
        .modes
        .iter()
        .filter_map(|name| target.mode(name))
        .collect();
    if modes.is_empty() {
        tracing::debug!(rule = input.id, slug = %target.slug, "No selected mode, nothing to compile");
        return Ok(Vec::new());
    }

    let scope = RenderScope::new(input.fragments)?;
    let rendered = scope.render(input.id, input.body, &input.context.template_data())?;

    let artifacts = modes
        .into_iter()
        .map(|mode| CompiledArtifact {
            target: target.slug.clone(),
            mode: mode.name.clone(),
            filename: target.artifact_filename(mode, input.id),
            content: mode.format.apply(input.context, &rendered),
        })
        .collect::<Vec<_>>();

    tracing::trace!(rule = input.id, slug = %target.slug, artifacts = artifacts.len(), "Rule compiled");
    Ok(artifacts)
}
