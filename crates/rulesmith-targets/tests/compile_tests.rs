//! Compilation behaviour of the built-in targets

use pretty_assertions::assert_eq;
use rstest::rstest;
use rulesmith_meta::{Globs, Origin, ResolvedContext};
use rulesmith_targets::{CompileInput, Error, TargetRegistry, compile_rule};
use std::collections::BTreeMap;

fn context(target: &str, modes: &[&str], globs: Globs) -> ResolvedContext {
    ResolvedContext {
        id: "review".into(),
        origin: Origin::Local,
        target: target.into(),
        description: "Review code".into(),
        globs,
        modes: modes.iter().map(|m| m.to_string()).collect(),
        tags: vec![],
        custom: BTreeMap::new(),
        vendor: None,
    }
}

#[test]
fn cursor_rule_has_front_matter() {
    let registry = TargetRegistry::with_builtins();
    let target = registry.get("cursor").unwrap();
    let ctx = context("cursor", &["rule"], Globs::set(["*.rs"]));
    let fragments = BTreeMap::new();
    let input = CompileInput {
        id: "review",
        body: "Check {{target}} output.\n",
        fragments: &fragments,
        context: &ctx,
    };

    let artifacts = compile_rule(target, &input).unwrap();

    assert_eq!(artifacts.len(), 1);
    assert_eq!(artifacts[0].filename, "review.mdc");
    assert_eq!(
        artifacts[0].content,
        "---\ndescription: Review code\nglobs: \"*.rs\"\nalwaysApply: false\n---\n\nCheck cursor output.\n"
    );
}

#[test]
fn claude_compiles_each_selected_mode() {
    let registry = TargetRegistry::with_builtins();
    let target = registry.get("claude").unwrap();
    let ctx = context("claude", &["memory", "command"], Globs::set(["**/*"]));
    let fragments = BTreeMap::new();
    let input = CompileInput {
        id: "review",
        body: "Body",
        fragments: &fragments,
        context: &ctx,
    };

    let artifacts = compile_rule(target, &input).unwrap();
    let names: Vec<_> = artifacts.iter().map(|a| a.filename.as_str()).collect();

    assert_eq!(names, vec!["memory/review.md", "command/review.md"]);
    assert_eq!(artifacts[0].content, "Body\n");
}

#[rstest]
#[case("gemini", "memory")]
#[case("codex", "agents")]
fn merge_targets_emit_bare_sections(#[case] slug: &str, #[case] mode: &str) {
    let registry = TargetRegistry::with_builtins();
    let target = registry.get(slug).unwrap();
    let ctx = context(slug, &[mode], Globs::set(["**/*"]));
    let fragments = BTreeMap::new();
    let input = CompileInput {
        id: "review",
        body: "\n\nBody\n\n",
        fragments: &fragments,
        context: &ctx,
    };

    let artifacts = compile_rule(target, &input).unwrap();

    assert_eq!(artifacts.len(), 1);
    assert_eq!(artifacts[0].filename, "review.md");
    assert_eq!(artifacts[0].content, "Body\n");
}

#[test]
fn fragments_render_inline() {
    let registry = TargetRegistry::with_builtins();
    let target = registry.get("gemini").unwrap();
    let ctx = context("gemini", &["memory"], Globs::set(["**/*"]));
    let mut fragments = BTreeMap::new();
    fragments.insert("shared/footer".to_string(), "Owned by {{id}}".to_string());
    let input = CompileInput {
        id: "review",
        body: "Top\n{{> shared/footer}}",
        fragments: &fragments,
        context: &ctx,
    };

    let artifacts = compile_rule(target, &input).unwrap();

    assert_eq!(artifacts[0].content, "Top\nOwned by review\n");
}

#[test]
fn missing_fragment_is_render_error() {
    let registry = TargetRegistry::with_builtins();
    let target = registry.get("gemini").unwrap();
    let ctx = context("gemini", &["memory"], Globs::set(["**/*"]));
    let fragments = BTreeMap::new();
    let input = CompileInput {
        id: "review",
        body: "{{> absent}}",
        fragments: &fragments,
        context: &ctx,
    };

    assert!(matches!(
        compile_rule(target, &input),
        Err(Error::Render { .. })
    ));
}

#[test]
fn no_selected_modes_yields_nothing() {
    let registry = TargetRegistry::with_builtins();
    let target = registry.get("cursor").unwrap();
    let ctx = context("cursor", &[], Globs::set(["**/*"]));
    let fragments = BTreeMap::new();
    let input = CompileInput {
        id: "review",
        body: "{{> absent}}",
        fragments: &fragments,
        context: &ctx,
    };

    assert!(compile_rule(target, &input).unwrap().is_empty());
}
