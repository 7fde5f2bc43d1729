//! Rule metadata - parsed from the YAML header of a rule template
//!
//! # Example header
//!
//! ```yaml
//! ---
//! description: Review code before merging
//! globs: ["src/**/*.rs", "tests/**/*.rs"]
//! mode:
//!   claude: [memory, command]
//!   cursor: rule
//! tags: [review]
//! custom:
//!   reviewer: alice
//! ---
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// Pattern used when no layer sets `globs` at all.
pub const UNIVERSAL_GLOB: &str = "**/*";

/// Tri-state file pattern selection.
///
/// An absent `globs` key is `Unset`; an explicit `null`, `""` or `[]` is
/// `Empty`. The two must never be collapsed: only `Unset` falls through to a
/// lower configuration layer and finally to [`UNIVERSAL_GLOB`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Globs {
    #[default]
    Unset,
    Empty,
    Set(Vec<String>),
}

impl Globs {
    pub fn set<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns: Vec<String> = patterns
            .into_iter()
            .map(Into::into)
            .filter(|p| !p.trim().is_empty())
            .collect();
        if patterns.is_empty() {
            Globs::Empty
        } else {
            Globs::Set(patterns)
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Globs::Unset)
    }

    /// Field-level merge: keep `self` unless it is unset.
    pub fn or(self, lower: Globs) -> Globs {
        if self.is_unset() { lower } else { self }
    }

    /// Patterns to render. `Unset` resolves to the universal pattern.
    pub fn patterns(&self) -> Vec<String> {
        match self {
            Globs::Unset => vec![UNIVERSAL_GLOB.to_string()],
            Globs::Empty => Vec::new(),
            Globs::Set(patterns) => patterns.clone(),
        }
    }

    /// Replace `Unset` with the universal pattern.
    pub fn resolved(self) -> Globs {
        match self {
            Globs::Unset => Globs::Set(vec![UNIVERSAL_GLOB.to_string()]),
            other => other,
        }
    }

    /// Parse a loosely typed value, as found in vendor variables.
    pub fn from_value(value: &Value) -> Globs {
        match value {
            Value::Null => Globs::Empty,
            Value::String(s) => Globs::set(s.split(',').map(str::trim)),
            Value::Array(items) => Globs::set(
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string),
            ),
            other => Globs::set([other.to_string()]),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GlobsRepr {
    One(String),
    Many(Vec<String>),
}

impl<'de> Deserialize<'de> for Globs {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // A missing key never reaches this point (`#[serde(default)]` yields Unset)
        let repr = Option::<GlobsRepr>::deserialize(deserializer)?;
        Ok(match repr {
            None => Globs::Empty,
            Some(GlobsRepr::One(s)) => Globs::set(s.split(',').map(str::trim)),
            Some(GlobsRepr::Many(v)) => Globs::set(v),
        })
    }
}

impl Serialize for Globs {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Globs::Unset | Globs::Empty => Vec::<String>::new().serialize(serializer),
            Globs::Set(patterns) => patterns.serialize(serializer),
        }
    }
}

/// A per-target mode hint: one mode name or several.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModeHint {
    One(String),
    Many(Vec<String>),
}

impl ModeHint {
    pub fn modes(&self) -> Vec<String> {
        match self {
            ModeHint::One(mode) => vec![mode.clone()],
            ModeHint::Many(modes) => modes.clone(),
        }
    }
}

/// Metadata block of a rule definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Globs::is_unset")]
    pub globs: Globs,
    /// Mode hint per target slug
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub mode: BTreeMap<String, ModeHint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom: BTreeMap<String, Value>,
}

impl RuleMetadata {
    pub fn is_empty(&self) -> bool {
        self == &RuleMetadata::default()
    }

    /// Mode hint for `target`, if the rule names one.
    pub fn mode_for(&self, target: &str) -> Option<Vec<String>> {
        self.mode.get(target).map(ModeHint::modes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Debug, Deserialize)]
    struct Holder {
        #[serde(default)]
        globs: Globs,
    }

    #[rstest]
    #[case("{}", Globs::Unset)]
    #[case("globs:", Globs::Empty)]
    #[case("globs: null", Globs::Empty)]
    #[case("globs: \"\"", Globs::Empty)]
    #[case("globs: []", Globs::Empty)]
    #[case("globs: \"*.rs\"", Globs::Set(vec!["*.rs".into()]))]
    #[case("globs: \"*.rs, *.toml\"", Globs::Set(vec!["*.rs".into(), "*.toml".into()]))]
    #[case("globs: [\"a/**\", \"b/**\"]", Globs::Set(vec!["a/**".into(), "b/**".into()]))]
    fn globs_tri_state_from_yaml(#[case] yaml: &str, #[case] expected: Globs) {
        let holder: Holder = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(holder.globs, expected);
    }

    #[test]
    fn unset_falls_through_but_empty_does_not() {
        let lower = Globs::Set(vec!["*.md".into()]);
        assert_eq!(Globs::Unset.or(lower.clone()), lower);
        assert_eq!(Globs::Empty.or(lower), Globs::Empty);
    }

    #[test]
    fn unset_resolves_to_universal_pattern() {
        assert_eq!(Globs::Unset.patterns(), vec![UNIVERSAL_GLOB.to_string()]);
        assert!(Globs::Empty.patterns().is_empty());
    }

    #[test]
    fn globs_from_variable_value() {
        assert_eq!(Globs::from_value(&Value::Null), Globs::Empty);
        assert_eq!(
            Globs::from_value(&serde_json::json!(["*.py"])),
            Globs::Set(vec!["*.py".into()])
        );
    }

    #[test]
    fn metadata_parses_mode_hints() {
        let yaml = "mode:\n  claude: [memory, command]\n  cursor: rule\n";
        let meta: RuleMetadata = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(
            meta.mode_for("claude"),
            Some(vec!["memory".to_string(), "command".to_string()])
        );
        assert_eq!(meta.mode_for("cursor"), Some(vec!["rule".to_string()]));
        assert_eq!(meta.mode_for("gemini"), None);
    }

    #[test]
    fn default_metadata_is_empty() {
        assert!(RuleMetadata::default().is_empty());
    }
}
