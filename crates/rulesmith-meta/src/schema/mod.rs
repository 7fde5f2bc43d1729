//! Schema definitions for rule metadata and vendor configuration

mod context;
mod metadata;
mod origin;
mod vendor;

pub use context::ResolvedContext;
pub use metadata::{Globs, ModeHint, RuleMetadata, UNIVERSAL_GLOB};
pub use origin::Origin;
pub use vendor::{TemplateDefaults, VendorConfig, VendorManifest};
