//! Isolated template rendering

use crate::{Error, Result};
use handlebars::Handlebars;
use serde_json::Value;
use std::collections::BTreeMap;

/// A rendering scope for one (rule, target) compilation pass.
///
/// Every scope owns a fresh registry seeded only with the fragments it is
/// given, so fragment names and registered state never leak between passes.
pub struct RenderScope {
    registry: Handlebars<'static>,
}

impl RenderScope {
    /// Build a scope whose only partials are `fragments`.
    pub fn new(fragments: &BTreeMap<String, String>) -> Result<Self> {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);

        for (name, content) in fragments {
            registry
                .register_partial(name, content.as_str())
                .map_err(|e| Error::Fragment {
                    name: name.clone(),
                    message: e.to_string(),
                })?;
        }

        Ok(Self { registry })
    }

    /// Render `template` (the body of rule `rule_id`) with `data`.
    pub fn render(&self, rule_id: &str, template: &str, data: &Value) -> Result<String> {
        self.registry
            .render_template(template, data)
            .map_err(|e| Error::Render {
                rule: rule_id.to_string(),
                message: e.to_string(),
            })
    }

    pub fn has_fragment(&self, name: &str) -> bool {
        self.registry.has_template(name)
    }
}
