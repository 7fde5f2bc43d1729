//! End-to-end checks of the engine's guarantees across crates

use pretty_assertions::assert_eq;
use rstest::rstest;
use rulesmith_core::{
    ChangeKind, InstallOptions, InstallRoots, OriginRoot, Project, Warning,
};
use rulesmith_meta::{Origin, ProjectConfig, VendorInclusion, VendorSettings};
use rulesmith_test_utils::{TestProject, rule_source};

fn project(fixture: &TestProject, targets: &[&str]) -> Project {
    let config = ProjectConfig {
        targets: targets.iter().map(|t| t.to_string()).collect(),
        ..Default::default()
    };
    Project::new(fixture.root(), config)
}

fn ids(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

/// Local definitions win whatever order the vendor roots come in.
#[rstest]
#[case(&["acme", "beta", "gamma"])]
#[case(&["gamma", "acme", "beta"])]
#[case(&["beta", "gamma", "acme"])]
fn local_precedence(#[case] order: &[&str]) {
    let fixture = TestProject::new();
    fixture.write_local("review.tmpl", &rule_source("Local", "local body"));
    for vendor in order {
        fixture.write_vendor(vendor, "review.tmpl", &rule_source(vendor, "vendor body"));
    }
    let project = project(&fixture, &["cursor"]);

    let vendors = order
        .iter()
        .map(|v| OriginRoot::vendor(*v, fixture.vendor_root(v)));
    let resolution = project.resolve(fixture.local_root(), vendors).unwrap();

    let review = resolution.rule("review").unwrap();
    assert_eq!(review.origin, Origin::Local);
    assert_eq!(review.body, "local body");
}

/// A vendor's fragment never renders inside another origin's rule.
#[test]
fn fragment_isolation() {
    let fixture = TestProject::new();
    fixture.write_vendor("alpha", "sig.partial.tmpl", "alpha signature");
    fixture.write_vendor("beta", "rule-b.tmpl", &rule_source("B", "{{> sig}}"));
    fixture.write_local("rule-l.tmpl", &rule_source("L", "{{> sig}}"));
    let project = project(&fixture, &["gemini"]);

    let resolution = project
        .resolve(
            fixture.local_root(),
            [
                OriginRoot::vendor("alpha", fixture.vendor_root("alpha")),
                OriginRoot::vendor("beta", fixture.vendor_root("beta")),
            ],
        )
        .unwrap();
    let report = project.compile(&resolution, &[]).unwrap();

    assert_eq!(report.compiled, 0);
    let failed: Vec<_> = report
        .warnings
        .iter()
        .filter_map(|w| match w {
            Warning::Render { rule, .. } => Some(rule.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(failed, vec!["rule-b", "rule-l"]);
}

/// Regenerating an unchanged record set leaves the shared file untouched.
#[test]
fn merge_idempotence() {
    let fixture = TestProject::new();
    fixture.write_local("a.tmpl", &rule_source("A", "Alpha"));
    fixture.write_local("b.tmpl", &rule_source("B", "Beta"));
    let project = project(&fixture, &["codex"]);
    let resolution = project.resolve(fixture.local_root(), []).unwrap();
    project.compile(&resolution, &[]).unwrap();
    let installer = project.installer(InstallRoots::new(fixture.home()));
    let options = InstallOptions::project(fixture.root());

    installer.install(&ids(&["a", "b"]), &options).unwrap();
    let first = fixture.read("AGENTS.md");

    project.compile(&resolution, &[]).unwrap();
    let report = installer.install(&ids(&["a", "b"]), &options).unwrap();

    assert_eq!(fixture.read("AGENTS.md"), first);
    assert_eq!(report.count(ChangeKind::Unchanged), 2);
    assert_eq!(report.shared[0].change, ChangeKind::Unchanged);
    assert!(report.backups.is_empty());
}

/// Removing one of N rules leaves N-1 sections; removing the last deletes
/// the file.
#[test]
fn merge_consistency_under_removal() {
    let fixture = TestProject::new();
    for id in ["a", "b", "c"] {
        fixture.write_local(&format!("{id}.tmpl"), &rule_source(id, &format!("body {id}")));
    }
    let project = project(&fixture, &["gemini"]);
    let resolution = project.resolve(fixture.local_root(), []).unwrap();
    project.compile(&resolution, &[]).unwrap();
    let installer = project.installer(InstallRoots::new(fixture.home()));
    let options = InstallOptions::project(fixture.root()).with_force(true);
    installer.install(&ids(&["a", "b", "c"]), &options).unwrap();

    installer.uninstall(&ids(&["b"]), &options).unwrap();
    let merged = fixture.read("GEMINI.md");
    assert_eq!(merged.matches("\n## ").count(), 2);
    assert!(!merged.contains("body b"));

    installer.uninstall(&ids(&["a"]), &options).unwrap();
    let merged = fixture.read("GEMINI.md");
    assert!(!merged.contains("## "));
    assert!(merged.contains("body c"));

    installer.uninstall(&ids(&["c"]), &options).unwrap();
    fixture.assert_file_not_exists("GEMINI.md");
}

/// Rule metadata overrides vendor defaults field by field.
#[rstest]
#[case(Some("D2"), "D2")]
#[case(None, "D1")]
fn config_precedence(#[case] rule_description: Option<&str>, #[case] expected: &str) {
    let fixture = TestProject::new();
    fixture.write_vendor(
        "acme",
        "vendor.toml",
        "[defaults]\ndescription = \"D1\"\n",
    );
    let source = match rule_description {
        Some(description) => rule_source(description, "body"),
        None => "body".to_string(),
    };
    fixture.write_vendor("acme", "rule.tmpl", &source);
    let project = project(&fixture, &["copilot"]);

    let resolution = project
        .resolve(
            fixture.local_root(),
            [OriginRoot::vendor("acme", fixture.vendor_root("acme"))],
        )
        .unwrap();
    project.compile(&resolution, &[]).unwrap();

    let compiled = std::fs::read_to_string(
        project
            .sources()
            .out_dir()
            .join("copilot/rule.instructions.md")
            .to_native(),
    )
    .unwrap();
    assert!(compiled.starts_with(&format!("---\ndescription: {expected}\n")));
}

/// Three rules, the second unrenderable: two artifacts and one warning.
#[test]
fn batch_resilience() {
    let fixture = TestProject::new();
    fixture.write_local("one.tmpl", &rule_source("One", "first"));
    fixture.write_local("two.tmpl", &rule_source("Two", "{{#each}}"));
    fixture.write_local("three.tmpl", &rule_source("Three", "third"));
    let project = project(&fixture, &["windsurf"]);

    let resolution = project.resolve(fixture.local_root(), []).unwrap();
    let report = project.compile(&resolution, &[]).unwrap();

    assert_eq!(report.compiled, 2);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.summary(), "2 artifact(s) compiled, 1 warning(s)");
}

/// Vendors left out of the project config never contribute rules.
#[test]
fn excluded_vendors_are_not_resolved() {
    let fixture = TestProject::new();
    fixture.write_vendor("acme", "lint.tmpl", &rule_source("Lint", "lint"));
    fixture.write_vendor("zeta", "style.tmpl", &rule_source("Style", "style"));
    let config = ProjectConfig {
        vendors: VendorSettings {
            include: VendorInclusion::Only(vec!["zeta".into()]),
        },
        ..Default::default()
    };
    let project = Project::new(fixture.root(), config);

    let resolution = project
        .resolve(
            fixture.local_root(),
            [
                OriginRoot::vendor("acme", fixture.vendor_root("acme")),
                OriginRoot::vendor("zeta", fixture.vendor_root("zeta")),
            ],
        )
        .unwrap();

    assert_eq!(resolution.rule_ids(), ids(&["style"]));
}
