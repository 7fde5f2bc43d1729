//! Source resolution across local and vendor roots

use pretty_assertions::assert_eq;
use rstest::rstest;
use rulesmith_core::{Error, OriginRoot, SourceResolver, Warning};
use rulesmith_meta::Origin;
use rulesmith_test_utils::{TestProject, rule_source};

fn project_with_review() -> TestProject {
    let project = TestProject::new();
    project.write_local("review.tmpl", &rule_source("Review code", "Local review"));
    project.write_vendor("acme", "review.tmpl", &rule_source("ACME review", "ACME review"));
    project.write_vendor("zeta", "review.tmpl", &rule_source("Zeta review", "Zeta review"));
    project
}

#[rstest]
#[case(&["acme", "zeta"])]
#[case(&["zeta", "acme"])]
fn local_definition_always_wins(#[case] vendor_order: &[&str]) {
    let project = project_with_review();
    let mut roots: Vec<OriginRoot> = vendor_order
        .iter()
        .map(|v| OriginRoot::vendor(*v, project.vendor_root(v)))
        .collect();
    // Local deliberately listed last
    roots.push(OriginRoot::local(project.local_root()));

    let resolution = SourceResolver::from_roots(roots).resolve().unwrap();
    let review = resolution.rule("review").unwrap();

    assert_eq!(review.origin, Origin::Local);
    assert_eq!(review.body, "Local review");
    assert_eq!(resolution.shadowed.len(), 2);
    assert!(resolution.shadowed.iter().all(|s| s.winner == Origin::Local));
}

#[test]
fn later_vendor_wins_among_vendors() {
    let project = TestProject::new();
    project.write_vendor("acme", "lint.tmpl", &rule_source("ACME lint", "acme"));
    project.write_vendor("zeta", "lint.tmpl", &rule_source("Zeta lint", "zeta"));

    let resolution = SourceResolver::new(project.local_root())
        .with_vendor("acme", project.vendor_root("acme"))
        .with_vendor("zeta", project.vendor_root("zeta"))
        .resolve()
        .unwrap();

    let lint = resolution.rule("lint").unwrap();
    assert_eq!(lint.origin, Origin::vendor("zeta"));
    assert_eq!(resolution.shadowed.len(), 1);
    assert_eq!(resolution.shadowed[0].origin, Origin::vendor("acme"));
    assert_eq!(resolution.shadowed[0].winner, Origin::vendor("zeta"));
}

#[test]
fn fragments_stay_with_their_origin() {
    let project = TestProject::new();
    project.write_local("shared/footer.partial.tmpl", "local footer");
    project.write_vendor("acme", "partials/footer.tmpl", "acme footer");

    let resolution = SourceResolver::new(project.local_root())
        .with_vendor("acme", project.vendor_root("acme"))
        .resolve()
        .unwrap();

    assert_eq!(
        resolution.fragments_for(&Origin::Local).get("shared/footer"),
        Some(&"local footer".to_string())
    );
    assert!(resolution.fragments_for(&Origin::Local).get("footer").is_none());
    assert_eq!(
        resolution.fragments_for(&Origin::vendor("acme")).get("footer"),
        Some(&"acme footer".to_string())
    );
    assert!(resolution.rules.is_empty());
}

#[test]
fn nested_identifiers_use_forward_slashes() {
    let project = TestProject::new();
    project.write_local("lang/rust.tmpl", &rule_source("Rust", "body"));

    let resolution = SourceResolver::new(project.local_root()).resolve().unwrap();

    assert_eq!(resolution.rule_ids(), vec!["lang/rust".to_string()]);
}

#[test]
fn missing_root_is_skipped() {
    let project = TestProject::new();
    project.write_local("review.tmpl", &rule_source("Review", "body"));

    let resolution = SourceResolver::new(project.local_root())
        .with_vendor("ghost", project.vendor_root("ghost"))
        .resolve()
        .unwrap();

    assert_eq!(resolution.rules.len(), 1);
    assert!(resolution.vendors.is_empty());
}

#[test]
fn root_that_is_not_a_directory_aborts() {
    let project = TestProject::new();
    let file = project.write("not-a-dir", "x");

    let result = SourceResolver::new(project.local_root())
        .with_vendor("acme", file)
        .resolve();

    match result {
        Err(Error::Resolution { origin, .. }) => assert_eq!(origin, "acme"),
        other => panic!("expected a resolution error, got {:?}", other.map(|r| r.rules.len())),
    }
}

#[test]
fn malformed_header_degrades_with_warning() {
    let project = TestProject::new();
    project.write_local("broken.tmpl", "---\ndescription: [unclosed\n---\nBody\n");

    let resolution = SourceResolver::new(project.local_root()).resolve().unwrap();

    let broken = resolution.rule("broken").unwrap();
    assert!(broken.metadata.is_empty());
    assert_eq!(broken.body, "Body\n");
    assert!(matches!(
        resolution.warnings.iter().next(),
        Some(Warning::MetadataParse { rule, .. }) if rule == "broken"
    ));
}

#[test]
fn vendor_config_is_loaded() {
    let project = TestProject::new();
    project.write_vendor(
        "acme",
        "vendor.toml",
        "[manifest]\nname = \"acme\"\nversion = \"1.2.0\"\n\n[defaults]\ndescription = \"ACME rule\"\n",
    );
    project.write_vendor("acme", "lint.tmpl", "Lint\n");

    let resolution = SourceResolver::new(project.local_root())
        .with_vendor("acme", project.vendor_root("acme"))
        .resolve()
        .unwrap();

    let config = resolution.vendor_config(&Origin::vendor("acme")).unwrap();
    assert_eq!(config.defaults.description.as_deref(), Some("ACME rule"));
    assert_eq!(config.manifest.version.as_ref().map(ToString::to_string), Some("1.2.0".into()));
}

#[test]
fn hidden_directories_are_ignored() {
    let project = TestProject::new();
    project.write_vendor("acme", ".git/hooks/x.tmpl", "noise");
    project.write_vendor("acme", "lint.tmpl", "Lint\n");

    let resolution = SourceResolver::new(project.local_root())
        .with_vendor("acme", project.vendor_root("acme"))
        .resolve()
        .unwrap();

    assert_eq!(resolution.rule_ids(), vec!["lint".to_string()]);
}

#[test]
fn undecodable_template_is_skipped_with_warning() {
    let project = TestProject::new();
    project.write_local("good.tmpl", &rule_source("Good", "Good body"));
    std::fs::write(project.local_root().join("bad.tmpl"), [0xff, 0xfe, 0x00]).unwrap();

    let resolution = SourceResolver::new(project.local_root()).resolve().unwrap();

    assert_eq!(resolution.rule_ids(), vec!["good".to_string()]);
    let warnings: Vec<&Warning> = resolution.warnings.iter().collect();
    assert_eq!(warnings.len(), 1);
    assert!(matches!(
        warnings[0],
        Warning::SourceRead { path, .. } if path.ends_with("bad.tmpl")
    ));
}

#[test]
fn undecodable_vendor_template_leaves_other_definitions() {
    let project = TestProject::new();
    project.write_vendor("acme", "lint.tmpl", "Lint\n");
    project.write_vendor("zeta", "lint.tmpl", "Zeta lint\n");
    std::fs::write(project.vendor_root("zeta").join("lint.tmpl"), [0xc3, 0x28]).unwrap();

    let resolution = SourceResolver::new(project.local_root())
        .with_vendor("acme", project.vendor_root("acme"))
        .with_vendor("zeta", project.vendor_root("zeta"))
        .resolve()
        .unwrap();

    assert_eq!(resolution.rule("lint").unwrap().origin, Origin::vendor("acme"));
    assert!(resolution.shadowed.is_empty());
}
