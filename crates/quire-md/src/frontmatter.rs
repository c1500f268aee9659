//! Frontmatter extraction and parsing.
//!
//! Two forms are recognized at the very start of a document:
//!
//! ```text
//! ---                      title: Hello
//! title: Hello             author: Ada
//! tags: [a, b]                 Lovelace
//! ---
//!                          # Body
//! # Body
//! ```
//!
//! The fenced form on the left is YAML. The header form on the right is a run
//! of `key: value` lines ended by the first blank line, where indented lines
//! continue the previous value.
//!
//! Either way the result is a flat map of strings, since every value ends up
//! as a template variable.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde_yaml::Value;

/// Flat front-matter: every key maps to the text substituted for it.
pub type Frontmatter = BTreeMap<String, String>;

static HEADER_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z0-9_][A-Za-z0-9_-]*)[ \t]*:(.*)$").unwrap());

/// Extract frontmatter from Markdown content.
///
/// Returns the parsed frontmatter and the remaining content after the frontmatter block.
pub fn extract_frontmatter(source: &str) -> Result<(Option<Frontmatter>, &str), FrontmatterError> {
    let first_line = source.lines().next().unwrap_or("");

    if first_line.trim_end() == "---" {
        return extract_fenced(source);
    }

    if HEADER_LINE.is_match(first_line) {
        return Ok(extract_header(source));
    }

    Ok((None, source))
}

fn extract_fenced(source: &str) -> Result<(Option<Frontmatter>, &str), FrontmatterError> {
    // Skip the opening fence line
    let after_open = match source.find('\n') {
        Some(pos) => &source[pos + 1..],
        None => return Err(FrontmatterError::Unclosed),
    };

    // Find the closing --- on a line of its own
    let mut offset = 0;
    let mut close = None;
    for line in after_open.split_inclusive('\n') {
        if line.trim_end() == "---" {
            close = Some((offset, offset + line.len()));
            break;
        }
        offset += line.len();
    }
    let Some((yaml_end, body_start)) = close else {
        return Err(FrontmatterError::Unclosed);
    };

    let yaml_content = &after_open[..yaml_end];
    let remaining = &after_open[body_start..];

    let frontmatter = parse_yaml(yaml_content)?;

    Ok((Some(frontmatter), remaining))
}

fn parse_yaml(yaml_content: &str) -> Result<Frontmatter, FrontmatterError> {
    if yaml_content.trim().is_empty() {
        return Ok(Frontmatter::new());
    }

    let value: Value = serde_yaml::from_str(yaml_content)
        .map_err(|e| FrontmatterError::InvalidYaml(e.to_string()))?;

    let mapping = match value {
        Value::Mapping(mapping) => mapping,
        Value::Null => return Ok(Frontmatter::new()),
        _ => {
            return Err(FrontmatterError::InvalidYaml(
                "frontmatter must be a mapping of keys to values".to_string(),
            ))
        }
    };

    let mut frontmatter = Frontmatter::new();
    for (key, value) in mapping {
        let key = scalar_text(&key).ok_or(FrontmatterError::InvalidKey)?;
        let text = flatten(&value).ok_or_else(|| FrontmatterError::NonScalar(key.clone()))?;
        frontmatter.insert(key, text);
    }

    Ok(frontmatter)
}

/// Render a YAML scalar as template text.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

fn flatten(value: &Value) -> Option<String> {
    match value {
        Value::Sequence(items) => items
            .iter()
            .map(scalar_text)
            .collect::<Option<Vec<_>>>()
            .map(|items| items.join(", ")),
        Value::Tagged(tagged) => flatten(&tagged.value),
        other => scalar_text(other),
    }
}

fn extract_header(source: &str) -> (Option<Frontmatter>, &str) {
    let mut frontmatter = Frontmatter::new();
    let mut current: Option<String> = None;
    let mut consumed = 0;

    for line in source.split_inclusive('\n') {
        let content = line.trim_end_matches(['\n', '\r']);

        if content.trim().is_empty() {
            consumed += line.len();
            break;
        }

        if let Some(caps) = HEADER_LINE.captures(content) {
            let key = caps[1].to_string();
            frontmatter.insert(key.clone(), caps[2].trim().to_string());
            current = Some(key);
        } else if content.starts_with([' ', '\t']) && current.is_some() {
            if let Some(value) = current.as_ref().and_then(|k| frontmatter.get_mut(k)) {
                if !value.is_empty() {
                    value.push('\n');
                }
                value.push_str(content.trim());
            }
        } else {
            // First line that is neither a pair nor a continuation starts the body
            break;
        }

        consumed += line.len();
    }

    (Some(frontmatter), &source[consumed..])
}

/// Errors that can occur when parsing frontmatter.
#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    #[error("Unclosed frontmatter block - missing closing ---")]
    Unclosed,

    #[error("Invalid YAML in frontmatter: {0}")]
    InvalidYaml(String),

    #[error("Frontmatter value for '{0}' must be a scalar or a list of scalars")]
    NonScalar(String),

    #[error("Frontmatter keys must be scalars")]
    InvalidKey,
}
