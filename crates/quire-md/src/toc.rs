//! Table of contents built from document headings.

use std::collections::HashSet;

/// A table of contents entry.
#[derive(Debug, Clone, PartialEq)]
pub struct TocEntry {
    /// Heading text
    pub title: String,
    /// Anchor ID
    pub id: String,
    /// Heading level (1-6)
    pub level: u8,
}

/// Hands out heading ids, keeping each one unique within a document.
#[derive(Debug, Default)]
pub(crate) struct AnchorIds {
    taken: HashSet<String>,
}

impl AnchorIds {
    /// Reserve an id given explicitly with `{#id}`.
    pub(crate) fn claim(&mut self, id: String) -> String {
        self.taken.insert(id.clone());
        id
    }

    /// Derive an id from heading text, suffixing `-2`, `-3`... on collision.
    pub(crate) fn derive(&mut self, title: &str) -> String {
        let mut base = slugify(title);
        if base.is_empty() {
            base = "section".to_string();
        }

        let mut candidate = base.clone();
        let mut n = 2;
        while self.taken.contains(&candidate) {
            candidate = format!("{base}-{n}");
            n += 1;
        }

        self.taken.insert(candidate.clone());
        candidate
    }
}

/// Convert a heading to a URL-safe slug.
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c
            } else if c.is_whitespace() || c == '-' || c == '_' {
                '-'
            } else {
                '\0'
            }
        })
        .filter(|c| *c != '\0')
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Render entries as nested `<ul>` lists.
///
/// An entry nests under the closest preceding entry with a lower level, so
/// documents that skip levels (h1 then h3) still produce a single child list.
/// Returns `None` when there are no entries.
pub fn render_toc(entries: &[TocEntry]) -> Option<String> {
    if entries.is_empty() {
        return None;
    }

    let mut html = String::new();
    // Levels of the currently open lists' items, innermost last
    let mut open: Vec<u8> = Vec::new();

    html.push_str("<ul>\n");
    for entry in entries {
        match open.last().copied() {
            None => {}
            Some(last) if entry.level > last => {
                html.push_str(&format!("\n{}<ul>\n", indent(open.len())));
            }
            Some(_) => {
                html.push_str("</li>\n");
                while open.len() > 1 && open[open.len() - 2] >= entry.level {
                    open.pop();
                    html.push_str(&format!("{}</ul></li>\n", indent(open.len())));
                }
                open.pop();
            }
        }

        open.push(entry.level);
        html.push_str(&format!(
            "{}<li><a href=\"#{}\">{}</a>",
            indent(open.len()),
            escape_attr(&entry.id),
            escape_text(&entry.title)
        ));
    }

    html.push_str("</li>\n");
    while open.len() > 1 {
        open.pop();
        html.push_str(&format!("{}</ul></li>\n", indent(open.len())));
    }
    html.push_str("</ul>\n");

    Some(html)
}

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(text: &str) -> String {
    escape_text(text).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entry(title: &str, level: u8) -> TocEntry {
        TocEntry {
            title: title.to_string(),
            id: slugify(title),
            level,
        }
    }

    #[test]
    fn slugify_works() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("API Reference"), "api-reference");
        assert_eq!(slugify("Button (Primary)"), "button-primary");
        assert_eq!(slugify("  Multiple   Spaces  "), "multiple-spaces");
    }

    #[test]
    fn derive_deduplicates() {
        let mut ids = AnchorIds::default();

        assert_eq!(ids.derive("Usage"), "usage");
        assert_eq!(ids.derive("Usage"), "usage-2");
        assert_eq!(ids.derive("Usage"), "usage-3");
        assert_eq!(ids.derive("!!!"), "section");
    }

    #[test]
    fn derive_avoids_claimed_ids() {
        let mut ids = AnchorIds::default();
        ids.claim("intro".to_string());

        assert_eq!(ids.derive("Intro"), "intro-2");
    }

    #[test]
    fn empty_toc_is_none() {
        assert_eq!(render_toc(&[]), None);
    }

    #[test]
    fn renders_flat_list() {
        let html = render_toc(&[entry("One", 2), entry("Two", 2)]).unwrap();

        assert_eq!(
            html,
            "<ul>\n  <li><a href=\"#one\">One</a></li>\n  <li><a href=\"#two\">Two</a></li>\n</ul>\n"
        );
    }

    #[test]
    fn renders_nested_list() {
        let html = render_toc(&[
            entry("Guide", 1),
            entry("Install", 2),
            entry("Usage", 2),
            entry("Appendix", 1),
        ])
        .unwrap();

        assert_eq!(
            html,
            "<ul>\n\
             \x20 <li><a href=\"#guide\">Guide</a>\n\
             \x20 <ul>\n\
             \x20   <li><a href=\"#install\">Install</a></li>\n\
             \x20   <li><a href=\"#usage\">Usage</a></li>\n\
             \x20 </ul></li>\n\
             \x20 <li><a href=\"#appendix\">Appendix</a></li>\n\
             </ul>\n"
        );
    }

    #[test]
    fn escapes_titles() {
        let html = render_toc(&[TocEntry {
            title: "a < b & c".to_string(),
            id: "a-b-c".to_string(),
            level: 1,
        }])
        .unwrap();

        assert!(html.contains("a &lt; b &amp; c"));
    }
}
