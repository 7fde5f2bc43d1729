//! Shared test fixtures for rulesmith crates.

pub mod project;

pub use project::{TestProject, rule_source};
