//! Permissive `$`-placeholder templates.
//!
//! Placeholder syntax:
//!
//! - `$$` is an escape for a literal `$`
//! - `$name` and `${name}` are replaced when `name` is supplied
//!
//! Names are ASCII identifiers (`[_A-Za-z][_A-Za-z0-9]*`). Anything else,
//! including placeholders with no supplied value, is left as written.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(?:(\$)|([_A-Za-z][_A-Za-z0-9]*)|\{([_A-Za-z][_A-Za-z0-9]*)\})").unwrap()
});

/// Variables available to a substitution pass.
pub type Variables = HashMap<String, String>;

/// A loaded template.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    source: String,
}

impl Template {
    /// Wrap template text.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Replace every supplied placeholder, leaving the rest untouched.
    pub fn safe_substitute(&self, vars: &Variables) -> String {
        PLACEHOLDER
            .replace_all(&self.source, |caps: &Captures<'_>| {
                if caps.get(1).is_some() {
                    return "$".to_string();
                }

                let name = caps.get(2).or_else(|| caps.get(3)).map_or("", |m| m.as_str());
                match vars.get(name) {
                    Some(value) => value.clone(),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}
