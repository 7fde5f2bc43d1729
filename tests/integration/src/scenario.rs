//! Local review overrides a vendor review and joins an existing shared file

use pretty_assertions::assert_eq;
use rulesmith_core::{
    ChangeKind, InstallOptions, InstallRoots, MERGED_HEADER, OriginRoot, Project,
};
use rulesmith_meta::{Origin, ProjectConfig};
use rulesmith_test_utils::{TestProject, rule_source};

#[test]
fn local_review_joins_merged_file_after_lint() {
    let fixture = TestProject::new();
    fixture.write_local("review.tmpl", &rule_source("Review code", "Local review guidance."));
    fixture.write_local("lint.tmpl", &rule_source("Lint", "Run clippy before pushing."));
    fixture.write_vendor("acme", "review.tmpl", &rule_source("ACME review", "ACME review guidance."));

    let config = ProjectConfig {
        targets: vec!["gemini".into()],
        ..Default::default()
    };
    let project = Project::new(fixture.root(), config);
    let resolution = project
        .resolve(
            fixture.local_root(),
            [OriginRoot::vendor("acme", fixture.vendor_root("acme"))],
        )
        .unwrap();

    let review = resolution.rule("review").unwrap();
    assert_eq!(review.origin, Origin::Local);
    assert_eq!(review.body, "Local review guidance.");
    assert_eq!(resolution.shadowed.len(), 1);
    assert_eq!(resolution.shadowed[0].origin, Origin::vendor("acme"));

    let compiled = project.compile(&resolution, &[]).unwrap();
    assert_eq!(compiled.compiled, 2);

    let installer = project.installer(InstallRoots::new(fixture.home()));
    let options = InstallOptions::project(fixture.root());

    installer.install(&["lint".to_string()], &options).unwrap();
    let lint_only = fixture.read("GEMINI.md");
    assert_eq!(lint_only, format!("{MERGED_HEADER}\n\nRun clippy before pushing.\n"));

    let report = installer.install(&["review".to_string()], &options).unwrap();
    assert_eq!(report.outcomes[0].change, ChangeKind::NewlyInstalled);
    assert_eq!(report.shared[0].sections, vec!["lint", "review"]);

    assert_eq!(
        fixture.read("GEMINI.md"),
        format!(
            "{MERGED_HEADER}\n\n## lint\n\nRun clippy before pushing.\n\n---\n\n## review\n\nLocal review guidance.\n"
        )
    );
    assert_eq!(installer.installed(Some("gemini"), None).unwrap().len(), 2);
}
