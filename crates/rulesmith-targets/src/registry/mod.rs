//! Target registry
//!
//! Holds the known targets keyed by slug. Built-in targets come from
//! [`builtins::builtin_targets`]; embedders may register more.

mod builtins;

pub use builtins::{BUILTIN_COUNT, builtin_targets};

use crate::target::Target;
use crate::{Error, Result};
use std::collections::BTreeMap;

/// Registry of compile targets, ordered by slug.
#[derive(Debug, Clone, Default)]
pub struct TargetRegistry {
    targets: BTreeMap<String, Target>,
}

impl TargetRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry containing every built-in target.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for target in builtin_targets() {
            registry.register(target);
        }
        registry
    }

    /// Register a target, replacing any target with the same slug.
    pub fn register(&mut self, target: Target) {
        if self.targets.contains_key(&target.slug) {
            tracing::debug!(slug = %target.slug, "Replacing registered target");
        }
        self.targets.insert(target.slug.clone(), target);
    }

    pub fn get(&self, slug: &str) -> Option<&Target> {
        self.targets.get(slug)
    }

    pub fn require(&self, slug: &str) -> Result<&Target> {
        self.get(slug).ok_or_else(|| Error::UnknownTarget {
            slug: slug.to_string(),
        })
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.targets.contains_key(slug)
    }

    /// All targets, sorted by slug.
    pub fn all(&self) -> impl Iterator<Item = &Target> {
        self.targets.values()
    }

    pub fn slugs(&self) -> Vec<&str> {
        self.targets.keys().map(String::as_str).collect()
    }

    /// Resolve a slug filter; an empty filter selects every target.
    ///
    /// Unknown slugs are an error so a typo never silently compiles nothing.
    pub fn select(&self, slugs: &[String]) -> Result<Vec<&Target>> {
        if slugs.is_empty() {
            return Ok(self.all().collect());
        }
        let mut selected = Vec::with_capacity(slugs.len());
        for slug in slugs {
            let target = self.require(slug)?;
            if !selected.iter().any(|t: &&Target| t.slug == target.slug) {
                selected.push(target);
            }
        }
        selected.sort_by(|a, b| a.slug.cmp(&b.slug));
        Ok(selected)
    }
}
