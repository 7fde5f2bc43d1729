//! Front matter splitting and metadata parsing
//!
//! A rule template may start with a YAML header delimited by `---` lines.
//! Parsing never fails: problems are reported as a warning message and the
//! metadata degrades to an empty block.

use crate::schema::RuleMetadata;

const DELIMITER: &str = "---";

/// A template split into its optional header and its body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontMatter<'a> {
    /// Raw YAML between the delimiters, `None` when there is no complete header
    pub header: Option<&'a str>,
    pub body: &'a str,
    /// An opening delimiter was found without a closing one
    pub unterminated: bool,
}

/// Result of parsing a rule source file.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSource {
    pub metadata: RuleMetadata,
    /// Template body with the header removed
    pub body: String,
    /// Set when the header was missing or malformed
    pub warning: Option<String>,
}

/// Split `text` into header and body without interpreting the header.
pub fn split_front_matter(text: &str) -> FrontMatter<'_> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let Some(first_line_end) = opening_delimiter_end(text) else {
        return FrontMatter {
            header: None,
            body: text,
            unterminated: false,
        };
    };

    let rest = &text[first_line_end..];
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == DELIMITER {
            let header = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return FrontMatter {
                header: Some(header),
                body: body.strip_prefix("\r\n").or_else(|| body.strip_prefix('\n')).unwrap_or(body),
                unterminated: false,
            };
        }
        offset += line.len();
    }

    FrontMatter {
        header: None,
        body: text,
        unterminated: true,
    }
}

/// Remove a header if present, ignoring its content.
pub fn strip_front_matter(text: &str) -> &str {
    split_front_matter(text).body
}

/// Parse a rule template into metadata and body.
pub fn parse_rule_source(text: &str) -> ParsedSource {
    let split = split_front_matter(text);

    let Some(header) = split.header else {
        let warning = if split.unterminated {
            "metadata header is not terminated by a '---' line"
        } else {
            "no metadata header found"
        };
        return ParsedSource {
            metadata: RuleMetadata::default(),
            body: split.body.to_string(),
            warning: Some(warning.to_string()),
        };
    };

    if header.trim().is_empty() {
        return ParsedSource {
            metadata: RuleMetadata::default(),
            body: split.body.to_string(),
            warning: None,
        };
    }

    match serde_yaml::from_str::<RuleMetadata>(header) {
        Ok(metadata) => ParsedSource {
            metadata,
            body: split.body.to_string(),
            warning: None,
        },
        Err(e) => ParsedSource {
            metadata: RuleMetadata::default(),
            body: split.body.to_string(),
            warning: Some(format!("malformed metadata header: {}", e)),
        },
    }
}

fn opening_delimiter_end(text: &str) -> Option<usize> {
    let line_end = text.find('\n')?;
    let first = text[..line_end].trim_end_matches('\r');
    (first == DELIMITER).then_some(line_end + 1)
}
