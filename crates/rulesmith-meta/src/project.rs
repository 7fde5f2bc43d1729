//! Project configuration
//!
//! Locating the config file is the caller's concern; this module only
//! defines its shape and loads it from a given path.
//!
//! ```toml
//! out_dir = ".rulesmith/dist"
//! ledger = ".rulesmith/ledger.toml"
//! targets = ["cursor", "claude"]
//!
//! [vendors]
//! include = ["acme"]   # or "all" / "none"
//! ```

use crate::{Error, Result};
use rulesmith_fs::{ConfigStore, NormalizedPath};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const DEFAULT_OUT_DIR: &str = ".rulesmith/dist";
const DEFAULT_LEDGER: &str = ".rulesmith/ledger.toml";

/// Which vendor origins take part in compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum VendorInclusion {
    #[default]
    All,
    None,
    Only(Vec<String>),
}

impl VendorInclusion {
    pub fn includes(&self, vendor: &str) -> bool {
        match self {
            VendorInclusion::All => true,
            VendorInclusion::None => false,
            VendorInclusion::Only(names) => names.iter().any(|n| n == vendor),
        }
    }
}

#[derive(Deserialize, Serialize)]
#[serde(untagged)]
enum InclusionRepr {
    Keyword(String),
    List(Vec<String>),
}

impl<'de> Deserialize<'de> for VendorInclusion {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match InclusionRepr::deserialize(deserializer)? {
            InclusionRepr::Keyword(k) => match k.as_str() {
                "all" => Ok(VendorInclusion::All),
                "none" => Ok(VendorInclusion::None),
                other => Err(serde::de::Error::custom(format!(
                    "expected \"all\", \"none\" or a list of vendor names, got \"{}\"",
                    other
                ))),
            },
            InclusionRepr::List(names) => Ok(VendorInclusion::Only(names)),
        }
    }
}

impl Serialize for VendorInclusion {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let repr = match self {
            VendorInclusion::All => InclusionRepr::Keyword("all".into()),
            VendorInclusion::None => InclusionRepr::Keyword("none".into()),
            VendorInclusion::Only(names) => InclusionRepr::List(names.clone()),
        };
        repr.serialize(serializer)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VendorSettings {
    #[serde(default)]
    pub include: VendorInclusion,
}

/// Project-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Compiled-artifact directory, relative to the project root
    #[serde(default = "default_out_dir")]
    pub out_dir: String,
    /// Ledger file, relative to the project root
    #[serde(default = "default_ledger")]
    pub ledger: String,
    /// Enabled target slugs; empty means every built-in target
    #[serde(default)]
    pub targets: Vec<String>,
    #[serde(default)]
    pub vendors: VendorSettings,
}

fn default_out_dir() -> String {
    DEFAULT_OUT_DIR.to_string()
}

fn default_ledger() -> String {
    DEFAULT_LEDGER.to_string()
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            out_dir: default_out_dir(),
            ledger: default_ledger(),
            targets: Vec::new(),
            vendors: VendorSettings::default(),
        }
    }
}

impl ProjectConfig {
    /// Load from `path`; a missing file yields the defaults.
    pub fn load(path: &NormalizedPath) -> Result<Self> {
        if !path.is_file() {
            tracing::debug!(path = %path, "No project config found, using defaults");
            return Ok(Self::default());
        }
        let config: ProjectConfig = ConfigStore::new().load(path)?;
        config.validate(path)?;
        Ok(config)
    }

    /// Write this config to `path` in the format its extension names.
    pub fn save(&self, path: &NormalizedPath) -> Result<()> {
        self.validate(path)?;
        ConfigStore::new().save(path, self)?;
        Ok(())
    }

    fn validate(&self, path: &NormalizedPath) -> Result<()> {
        if self.out_dir.trim().is_empty() {
            return Err(Error::InvalidConfig {
                path: path.to_native(),
                message: "out_dir must not be empty".to_string(),
            });
        }
        if self.ledger.trim().is_empty() {
            return Err(Error::InvalidConfig {
                path: path.to_native(),
                message: "ledger must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn out_dir(&self, project_root: &NormalizedPath) -> NormalizedPath {
        project_root.join(&self.out_dir)
    }

    pub fn ledger_path(&self, project_root: &NormalizedPath) -> NormalizedPath {
        project_root.join(&self.ledger)
    }
}
