//! Metadata and configuration schemas for rulesmith.
//!
//! This crate owns the shapes of everything the compiler reads but does not
//! render: rule front matter, vendor configuration, and the project config
//! that selects which vendor origins take part in a compile.

pub mod error;
pub mod frontmatter;
pub mod project;
pub mod schema;

pub use error::{Error, Result};
pub use frontmatter::{FrontMatter, ParsedSource, parse_rule_source, split_front_matter, strip_front_matter};
pub use project::{ProjectConfig, VendorInclusion, VendorSettings};
pub use schema::{
    Globs, ModeHint, Origin, ResolvedContext, RuleMetadata, TemplateDefaults, UNIVERSAL_GLOB,
    VendorConfig, VendorManifest,
};
