//! Source Resolver
//!
//! Walks every origin root, classifies template files into rules and
//! fragments, and picks exactly one rule definition per identifier.
//!
//! ```text
//! <root>/review.tmpl                 rule      "review"
//! <root>/lang/rust.tmpl              rule      "lang/rust"
//! <root>/shared/footer.partial.tmpl  fragment  "shared/footer"
//! <root>/partials/header.tmpl        fragment  "header"   (legacy layout)
//! ```
//!
//! Precedence: a local definition is never replaced by a vendor one. Among
//! vendors the origin later in the supplied order wins. Every suppressed
//! candidate is kept in [`Resolution::shadowed`].

use crate::warning::{Warning, Warnings};
use crate::{Error, Result};
use rulesmith_fs::NormalizedPath;
use rulesmith_meta::{Origin, RuleMetadata, VendorConfig, VendorInclusion, parse_rule_source, strip_front_matter};
use std::collections::BTreeMap;
use std::fs;
use walkdir::{DirEntry, WalkDir};

pub const RULE_EXTENSION: &str = ".tmpl";
pub const FRAGMENT_EXTENSION: &str = ".partial.tmpl";
/// Directory name whose templates are fragments regardless of extension
pub const FRAGMENT_DIR: &str = "partials";

static NO_FRAGMENTS: BTreeMap<String, String> = BTreeMap::new();

/// One `(origin, root)` input pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginRoot {
    pub origin: Origin,
    pub root: NormalizedPath,
}

impl OriginRoot {
    pub fn local(root: impl Into<NormalizedPath>) -> Self {
        Self {
            origin: Origin::Local,
            root: root.into(),
        }
    }

    pub fn vendor(name: impl Into<String>, root: impl Into<NormalizedPath>) -> Self {
        Self {
            origin: Origin::vendor(name),
            root: root.into(),
        }
    }
}

/// The selected definition of one rule identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleDefinition {
    pub id: String,
    pub origin: Origin,
    pub source_path: NormalizedPath,
    /// Template body with the metadata header removed
    pub body: String,
    pub metadata: RuleMetadata,
}

/// A candidate that lost to another definition of the same identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shadowed {
    pub id: String,
    pub origin: Origin,
    pub source_path: NormalizedPath,
    /// Origin of the definition that was finally selected
    pub winner: Origin,
}

/// Output of [`SourceResolver::resolve`].
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub rules: BTreeMap<String, RuleDefinition>,
    pub fragments: BTreeMap<Origin, BTreeMap<String, String>>,
    /// Configuration of every vendor origin that took part
    pub vendors: BTreeMap<String, VendorConfig>,
    pub shadowed: Vec<Shadowed>,
    /// Metadata problems of selected rules
    pub warnings: Warnings,
}

impl Resolution {
    pub fn rule(&self, id: &str) -> Option<&RuleDefinition> {
        self.rules.get(id)
    }

    pub fn rule_ids(&self) -> Vec<String> {
        self.rules.keys().cloned().collect()
    }

    /// Fragments visible to rules of `origin`.
    pub fn fragments_for(&self, origin: &Origin) -> &BTreeMap<String, String> {
        self.fragments.get(origin).unwrap_or(&NO_FRAGMENTS)
    }

    /// Vendor configuration for `origin`; `None` for the local origin.
    pub fn vendor_config(&self, origin: &Origin) -> Option<&VendorConfig> {
        match origin {
            Origin::Local => None,
            Origin::Vendor(name) => self.vendors.get(name),
        }
    }

    /// Pick rules by identifier; an empty list selects every rule.
    pub fn select(&self, ids: &[String]) -> Result<Vec<&RuleDefinition>> {
        if ids.is_empty() {
            return Ok(self.rules.values().collect());
        }
        ids.iter()
            .map(|id| {
                self.rule(id)
                    .ok_or_else(|| Error::UnknownRule { id: id.clone() })
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SourceKind {
    Rule(String),
    Fragment(String),
}

/// Classify a root-relative, `/`-separated path.
fn classify(relative: &str) -> Option<SourceKind> {
    let kind = if let Some(stem) = relative.strip_suffix(FRAGMENT_EXTENSION) {
        SourceKind::Fragment(without_fragment_dirs(stem))
    } else {
        let stem = relative.strip_suffix(RULE_EXTENSION)?;
        if stem.split('/').any(|segment| segment == FRAGMENT_DIR) {
            SourceKind::Fragment(without_fragment_dirs(stem))
        } else {
            SourceKind::Rule(stem.to_string())
        }
    };

    match &kind {
        SourceKind::Rule(id) | SourceKind::Fragment(id) if id.is_empty() => None,
        _ => Some(kind),
    }
}

fn without_fragment_dirs(stem: &str) -> String {
    stem.split('/')
        .filter(|segment| *segment != FRAGMENT_DIR)
        .collect::<Vec<_>>()
        .join("/")
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

struct Candidate {
    origin: Origin,
    path: NormalizedPath,
    text: String,
}

/// Resolves rule and fragment definitions across origin roots.
#[derive(Debug, Clone, Default)]
pub struct SourceResolver {
    roots: Vec<OriginRoot>,
}

impl SourceResolver {
    /// A resolver over the local root only.
    pub fn new(local_root: impl Into<NormalizedPath>) -> Self {
        Self {
            roots: vec![OriginRoot::local(local_root)],
        }
    }

    /// A resolver over arbitrary roots. The local origin is moved to the
    /// front; vendor order is preserved.
    pub fn from_roots(roots: impl IntoIterator<Item = OriginRoot>) -> Self {
        let mut roots: Vec<OriginRoot> = roots.into_iter().collect();
        roots.sort_by_key(|r| !r.origin.is_local());
        Self { roots }
    }

    pub fn with_vendor(mut self, name: impl Into<String>, root: impl Into<NormalizedPath>) -> Self {
        self.roots.push(OriginRoot::vendor(name, root));
        self
    }

    /// Drop vendor roots not covered by `inclusion`.
    pub fn include(mut self, inclusion: &VendorInclusion) -> Self {
        self.roots.retain(|r| match &r.origin {
            Origin::Local => true,
            Origin::Vendor(name) => inclusion.includes(name),
        });
        self
    }

    pub fn roots(&self) -> &[OriginRoot] {
        &self.roots
    }

    pub fn resolve(&self) -> Result<Resolution> {
        let mut resolution = Resolution::default();
        let mut selected: BTreeMap<String, Candidate> = BTreeMap::new();
        let mut shadowed: Vec<(String, Origin, NormalizedPath)> = Vec::new();

        for root in &self.roots {
            if !root.root.exists() {
                tracing::debug!(origin = %root.origin, root = %root.root, "Root does not exist, skipping");
                continue;
            }

            if let Origin::Vendor(name) = &root.origin {
                let config = VendorConfig::load_from_root(&root.root, name)?;
                resolution.vendors.insert(name.clone(), config);
            }

            let fragments = resolution.fragments.entry(root.origin.clone()).or_default();
            for (kind, path, text) in walk_root(root, &mut resolution.warnings)? {
                match kind {
                    SourceKind::Fragment(id) => {
                        if fragments
                            .insert(id.clone(), strip_front_matter(&text).to_string())
                            .is_some()
                        {
                            tracing::debug!(origin = %root.origin, fragment = %id, "Fragment defined twice, keeping the later one");
                        }
                    }
                    SourceKind::Rule(id) => {
                        let candidate = Candidate {
                            origin: root.origin.clone(),
                            path,
                            text,
                        };
                        match selected.get(&id) {
                            Some(current) if current.origin.is_local() && !candidate.origin.is_local() => {
                                shadowed.push((id, candidate.origin, candidate.path));
                            }
                            _ => {
                                if let Some(previous) = selected.insert(id.clone(), candidate) {
                                    shadowed.push((id, previous.origin, previous.path));
                                }
                            }
                        }
                    }
                }
            }
        }

        for (id, origin, source_path) in shadowed {
            let Some(winner) = selected.get(&id).map(|c| c.origin.clone()) else {
                continue;
            };
            tracing::debug!(rule = %id, shadowed = %origin, winner = %winner, "Rule definition shadowed");
            resolution.shadowed.push(Shadowed {
                id,
                origin,
                source_path,
                winner,
            });
        }

        for (id, candidate) in selected {
            let parsed = parse_rule_source(&candidate.text);
            if let Some(message) = parsed.warning {
                resolution.warnings.push(Warning::MetadataParse {
                    rule: id.clone(),
                    message,
                });
            }
            resolution.rules.insert(
                id.clone(),
                RuleDefinition {
                    id,
                    origin: candidate.origin,
                    source_path: candidate.path,
                    body: parsed.body,
                    metadata: parsed.metadata,
                },
            );
        }

        tracing::debug!(
            rules = resolution.rules.len(),
            shadowed = resolution.shadowed.len(),
            "Sources resolved"
        );
        Ok(resolution)
    }
}

/// Every readable template below `root`, in file-name order.
///
/// Only a failure to walk the tree is an error. A template that cannot be
/// read or is not UTF-8 is skipped with a [`Warning::SourceRead`].
fn walk_root(
    root: &OriginRoot,
    warnings: &mut Warnings,
) -> Result<Vec<(SourceKind, NormalizedPath, String)>> {
    let unreadable = |message: String| Error::Resolution {
        origin: root.origin.to_string(),
        root: root.root.to_native(),
        message,
    };

    if !root.root.is_dir() {
        return Err(unreadable("not a directory".to_string()));
    }

    let mut found = Vec::new();
    let walker = WalkDir::new(root.root.to_native())
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e));

    for entry in walker {
        let entry = entry.map_err(|e| unreadable(e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = NormalizedPath::new(entry.path());
        let Some(relative) = path.relative_to(&root.root) else {
            continue;
        };
        let Some(kind) = classify(&relative) else {
            continue;
        };
        match fs::read_to_string(entry.path()) {
            Ok(text) => found.push((kind, path, text)),
            Err(e) => warnings.push(Warning::SourceRead {
                path: path.to_string(),
                message: e.to_string(),
            }),
        }
    }

    Ok(found)
}
