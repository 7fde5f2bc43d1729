//! Per-mode shaping of rendered rule text

use rulesmith_meta::{Globs, ResolvedContext, UNIVERSAL_GLOB};

/// How the rendered body of a rule is wrapped for one mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    /// `.mdc` with `description`, `globs`, `alwaysApply`
    CursorRule,
    /// Markdown with `trigger`, `globs`, `description`
    WindsurfRule,
    /// `.instructions.md` with `applyTo`
    CopilotInstructions,
    /// Slash command with a `description` header
    ClaudeCommand,
    /// Bare markdown, used for shared-file sections
    Section,
}

impl ArtifactFormat {
    /// Wrap `body` for this format. Output always ends with one newline.
    pub fn apply(&self, context: &ResolvedContext, body: &str) -> String {
        let body = body.trim();
        match self {
            ArtifactFormat::CursorRule => {
                let (globs, always) = match &context.globs {
                    g if is_universal(g) => (String::new(), true),
                    Globs::Set(patterns) => (glob_list(patterns), false),
                    _ => (String::new(), false),
                };
                let header = format!(
                    "description: {}\nglobs: {}\nalwaysApply: {}\n",
                    yaml_scalar(&context.description),
                    globs,
                    always
                );
                with_header(&header, body)
            }
            ArtifactFormat::WindsurfRule => {
                let header = match &context.globs {
                    g if is_universal(g) => "trigger: always_on\n".to_string(),
                    Globs::Set(patterns) => {
                        format!("trigger: glob\nglobs: {}\n", glob_list(patterns))
                    }
                    _ => "trigger: model_decision\n".to_string(),
                };
                let header = format!(
                    "{}description: {}\n",
                    header,
                    yaml_scalar(&context.description)
                );
                with_header(&header, body)
            }
            ArtifactFormat::CopilotInstructions => {
                let mut header = format!("description: {}\n", yaml_scalar(&context.description));
                if let Globs::Set(patterns) = &context.globs {
                    header.push_str(&format!("applyTo: {}\n", glob_list(patterns)));
                }
                with_header(&header, body)
            }
            ArtifactFormat::ClaudeCommand => {
                let header = format!("description: {}\n", yaml_scalar(&context.description));
                with_header(&header, body)
            }
            ArtifactFormat::Section => format!("{}\n", body),
        }
    }
}

fn is_universal(globs: &Globs) -> bool {
    matches!(globs, Globs::Set(p) if p.len() == 1 && p[0] == UNIVERSAL_GLOB)
}

/// Comma-joined patterns as one YAML scalar. A leading `*` would otherwise
/// read as an alias.
fn glob_list(patterns: &[String]) -> String {
    yaml_scalar(&patterns.join(","))
}

fn with_header(header: &str, body: &str) -> String {
    format!("---\n{}---\n\n{}\n", header, body)
}

/// Quote a YAML scalar only when plain style would change its meaning.
fn yaml_scalar(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value.trim() != value
        || value.contains([':', '#', '\n', '"', '\'', '{', '}', '[', ']', ',', '&', '*', '!', '|', '>', '%', '@', '`'])
        || value.starts_with(['-', '?']);
    if needs_quotes {
        serde_json::to_string(value).unwrap_or_else(|_| format!("\"{}\"", value))
    } else {
        value.to_string()
    }
}
