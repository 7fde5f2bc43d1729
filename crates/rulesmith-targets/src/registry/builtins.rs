//! Built-in targets

use crate::format::ArtifactFormat;
use crate::target::{ModeSpec, Target, TargetCapability};

pub const BUILTIN_COUNT: usize = 6;

fn target(slug: &str, name: &str, capability: TargetCapability) -> Target {
    Target {
        slug: slug.to_string(),
        name: name.to_string(),
        capability,
    }
}

/// The targets shipped with rulesmith.
pub fn builtin_targets() -> Vec<Target> {
    vec![
        target(
            "cursor",
            "Cursor",
            TargetCapability::SingleArtifact(ModeSpec::per_rule(
                "rule",
                ".cursor/rules",
                ".mdc",
                ArtifactFormat::CursorRule,
            )),
        ),
        target(
            "windsurf",
            "Windsurf",
            TargetCapability::SingleArtifact(ModeSpec::per_rule(
                "rule",
                ".windsurf/rules",
                ".md",
                ArtifactFormat::WindsurfRule,
            )),
        ),
        target(
            "copilot",
            "GitHub Copilot",
            TargetCapability::SingleArtifact(ModeSpec::per_rule(
                "instructions",
                ".github/instructions",
                ".instructions.md",
                ArtifactFormat::CopilotInstructions,
            )),
        ),
        target(
            "claude",
            "Claude",
            TargetCapability::MultiMode {
                modes: vec![
                    ModeSpec::aggregate("memory", "CLAUDE.md", ".claude/CLAUDE.md"),
                    ModeSpec::per_rule(
                        "command",
                        ".claude/commands",
                        ".md",
                        ArtifactFormat::ClaudeCommand,
                    ),
                ],
                defaults: vec!["memory".to_string()],
            },
        ),
        target(
            "gemini",
            "Gemini",
            TargetCapability::MergeTarget(ModeSpec::aggregate(
                "memory",
                "GEMINI.md",
                ".gemini/GEMINI.md",
            )),
        ),
        target(
            "codex",
            "Codex",
            TargetCapability::MergeTarget(ModeSpec::aggregate(
                "agents",
                "AGENTS.md",
                ".codex/AGENTS.md",
            )),
        ),
    ]
}
