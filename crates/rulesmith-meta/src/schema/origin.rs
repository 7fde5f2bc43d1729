//! Where a rule or fragment came from

use serde::{Deserialize, Serialize};
use std::fmt;

/// The origin of a rule definition or fragment.
///
/// `Local` is the authoring project and always outranks vendor origins.
/// Serialized as the plain string `"local"` or the vendor name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Origin {
    Local,
    Vendor(String),
}

impl Origin {
    pub const LOCAL_NAME: &'static str = "local";

    pub fn vendor(name: impl Into<String>) -> Self {
        Origin::from(name.into())
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Origin::Local)
    }

    pub fn name(&self) -> &str {
        match self {
            Origin::Local => Self::LOCAL_NAME,
            Origin::Vendor(name) => name,
        }
    }
}

impl From<String> for Origin {
    fn from(name: String) -> Self {
        if name == Self::LOCAL_NAME {
            Origin::Local
        } else {
            Origin::Vendor(name)
        }
    }
}

impl From<&str> for Origin {
    fn from(name: &str) -> Self {
        Origin::from(name.to_string())
    }
}

impl From<Origin> for String {
    fn from(origin: Origin) -> Self {
        origin.name().to_string()
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
