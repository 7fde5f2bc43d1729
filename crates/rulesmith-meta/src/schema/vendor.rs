//! Vendor configuration - loaded from `vendor.toml` at a vendor root
//!
//! # Example TOML
//!
//! ```toml
//! [manifest]
//! name = "acme"
//! description = "ACME engineering guidelines"
//! version = "1.2.0"
//!
//! [defaults]
//! description = "ACME rule"
//! globs = ["src/**"]
//!
//! [variables]
//! company = "ACME"
//!
//! [modes]
//! claude = ["memory", "command"]
//! ```

use super::metadata::{Globs, ModeHint};
use crate::{Error, Result};
use rulesmith_fs::{ConfigStore, NormalizedPath};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// File names probed at a vendor root, in order.
const VENDOR_CONFIG_FILES: &[&str] = &["vendor.toml", "vendor.json", "vendor.yaml", "vendor.yml"];

/// Descriptive manifest of a vendor source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VendorManifest {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<semver::Version>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
}

/// Template defaults a vendor applies to each of its rules
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateDefaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Globs::is_unset")]
    pub globs: Globs,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom: BTreeMap<String, Value>,
}

/// Complete configuration of one vendor origin
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VendorConfig {
    #[serde(default)]
    pub manifest: VendorManifest,
    #[serde(default)]
    pub defaults: TemplateDefaults,
    #[serde(default)]
    pub variables: BTreeMap<String, Value>,
    /// Default mode hint per target slug
    #[serde(default)]
    pub modes: BTreeMap<String, ModeHint>,
}

impl VendorConfig {
    /// Load the vendor configuration found at `root`.
    ///
    /// Returns the default configuration, named after `origin_name`, when no
    /// vendor config file exists.
    pub fn load_from_root(root: &NormalizedPath, origin_name: &str) -> Result<Self> {
        let store = ConfigStore::new();
        for file in VENDOR_CONFIG_FILES {
            let path = root.join(file);
            if path.is_file() {
                tracing::debug!(path = %path, "Loading vendor config");
                let mut config: VendorConfig = store.load(&path)?;
                config.normalize_name(origin_name, &path)?;
                return Ok(config);
            }
        }

        tracing::debug!(root = %root, "No vendor config found, using defaults");
        Ok(Self::named(origin_name))
    }

    /// An empty configuration for `name`.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            manifest: VendorManifest {
                name: name.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Default mode hint for `target`, if the vendor declares one.
    pub fn mode_for(&self, target: &str) -> Option<Vec<String>> {
        self.modes.get(target).map(ModeHint::modes)
    }

    fn normalize_name(&mut self, origin_name: &str, path: &NormalizedPath) -> Result<()> {
        if self.manifest.name.is_empty() {
            self.manifest.name = origin_name.to_string();
        } else if self.manifest.name != origin_name {
            tracing::warn!(
                declared = %self.manifest.name,
                origin = origin_name,
                "Vendor manifest name differs from origin name; origin name is used for resolution"
            );
        }
        if self.manifest.name == super::Origin::LOCAL_NAME {
            return Err(Error::InvalidConfig {
                path: path.to_native(),
                message: "a vendor cannot be named 'local'".to_string(),
            });
        }
        Ok(())
    }
}
