//! Target definitions and rule compilation for rulesmith.
//!
//! A *target* is an AI tool output format. Every target declares one closed
//! [`TargetCapability`]:
//!
//! - **single-artifact** - exactly one per-rule file (Cursor, Windsurf, Copilot)
//! - **multi-mode** - several modes per rule, some per-rule files and some
//!   contributions to a shared document (Claude)
//! - **merge-target** - every rule lands in one shared file per scope
//!   (Gemini, Codex)
//!
//! The capability is resolved once from the [`TargetRegistry`]; callers never
//! branch on mode strings.
//!
//! Compilation renders the rule body in an isolated [`RenderScope`] seeded
//! only with the fragments of the rule's origin, then shapes the rendered text
//! for each selected mode.

pub mod compiler;
pub mod error;
pub mod format;
pub mod registry;
pub mod render;
pub mod target;

pub use compiler::{CompileInput, CompiledArtifact, compile_rule};
pub use error::{Error, Result};
pub use format::ArtifactFormat;
pub use registry::TargetRegistry;
pub use render::RenderScope;
pub use target::{ModeOutput, ModeSelection, ModeSpec, Target, TargetCapability};
