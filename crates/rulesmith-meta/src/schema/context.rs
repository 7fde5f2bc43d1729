//! The fully merged configuration available to one render pass

use super::{Globs, Origin, VendorManifest};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Resolved template context for one (rule, target) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedContext {
    pub id: String,
    pub origin: Origin,
    pub target: String,
    pub description: String,
    /// Never `Unset`: an unset pattern resolves to the universal glob
    pub globs: Globs,
    /// Selected modes for this target, in declaration order
    pub modes: Vec<String>,
    pub tags: Vec<String>,
    pub custom: BTreeMap<String, Value>,
    pub vendor: Option<VendorManifest>,
}

impl ResolvedContext {
    /// Data handed to the template engine.
    ///
    /// Custom keys are exposed at the top level; the reserved keys are
    /// inserted afterwards and win over custom keys with the same name.
    pub fn template_data(&self) -> Value {
        let mut data = Map::new();
        for (key, value) in &self.custom {
            data.insert(key.clone(), value.clone());
        }
        data.insert("id".into(), Value::String(self.id.clone()));
        data.insert("origin".into(), Value::String(self.origin.name().to_string()));
        data.insert("target".into(), Value::String(self.target.clone()));
        data.insert("description".into(), Value::String(self.description.clone()));
        data.insert(
            "globs".into(),
            Value::Array(self.globs.patterns().into_iter().map(Value::String).collect()),
        );
        data.insert(
            "tags".into(),
            Value::Array(self.tags.iter().cloned().map(Value::String).collect()),
        );
        data.insert(
            "custom".into(),
            Value::Object(self.custom.clone().into_iter().collect()),
        );
        if let Some(vendor) = &self.vendor {
            data.insert(
                "vendor".into(),
                serde_json::to_value(vendor).unwrap_or(Value::Null),
            );
        }
        Value::Object(data)
    }
}
