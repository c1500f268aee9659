//! Markdown document converter.

use std::ops::Range;

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};

use crate::frontmatter::{extract_frontmatter, Frontmatter, FrontmatterError};
use crate::html_blocks::expand_markdown_blocks;
use crate::toc::{render_toc, AnchorIds, TocEntry};

/// A rendered Markdown document.
#[derive(Debug, Clone)]
pub struct RenderedDoc {
    /// Body HTML (without frontmatter)
    pub html: String,

    /// Frontmatter key/value pairs, empty when the document has none
    pub metadata: Frontmatter,

    /// Table of contents entries, in document order
    pub toc: Vec<TocEntry>,
}

impl RenderedDoc {
    /// Table of contents as nested lists, `None` for a document without headings.
    pub fn toc_html(&self) -> Option<String> {
        render_toc(&self.toc)
    }
}

/// Errors that can occur when parsing Markdown.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Frontmatter error: {0}")]
    Frontmatter(#[from] FrontmatterError),
}

/// Markdown converter with a fixed extension set.
///
/// Built once per run and shared across documents.
#[derive(Debug, Clone)]
pub struct Markdown {
    options: Options,
}

impl Markdown {
    /// Create a converter with footnotes, heading attributes and smart punctuation.
    ///
    /// Fenced code and inline HTML are part of CommonMark and always on.
    /// Underscores never produce emphasis, and HTML blocks marked
    /// `markdown="1"` have their contents rendered.
    pub fn new() -> Self {
        let options = Options::ENABLE_FOOTNOTES
            | Options::ENABLE_HEADING_ATTRIBUTES
            | Options::ENABLE_SMART_PUNCTUATION;

        Self { options }
    }

    /// Render a document: frontmatter, anchored headings, TOC and HTML body.
    pub fn render(&self, source: &str) -> Result<RenderedDoc, ParseError> {
        let (frontmatter, content) = extract_frontmatter(source)?;
        let metadata = frontmatter.unwrap_or_default();

        let expanded = expand_markdown_blocks(content);
        let parser = Parser::new_ext(&expanded, self.options).into_offset_iter();
        let mut events = literal_underscores(&expanded, parser);
        let toc = anchor_headings(&mut events);

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        tracing::debug!(
            "Rendered {} bytes of HTML, {} metadata keys, {} headings",
            html_output.len(),
            metadata.len(),
            toc.len()
        );

        Ok(RenderedDoc {
            html: html_output,
            metadata,
            toc,
        })
    }
}

impl Default for Markdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Turn `_` and `__` emphasis back into literal text.
///
/// Only `*` and `**` produce `<em>` and `<strong>`, so identifiers such as
/// `__init__` survive outside code spans.
fn literal_underscores<'a>(
    source: &str,
    events: impl Iterator<Item = (Event<'a>, Range<usize>)>,
) -> Vec<Event<'a>> {
    let mut underscored = Vec::new();
    let mut out = Vec::new();

    for (event, range) in events {
        match event {
            Event::Start(tag @ (Tag::Emphasis | Tag::Strong)) => {
                let literal = source
                    .get(range.start..)
                    .is_some_and(|rest| rest.starts_with('_'));
                underscored.push(literal);
                if literal {
                    out.push(underscores(matches!(tag, Tag::Strong)));
                } else {
                    out.push(Event::Start(tag));
                }
            }
            Event::End(end @ (TagEnd::Emphasis | TagEnd::Strong)) => {
                if underscored.pop().unwrap_or(false) {
                    out.push(underscores(matches!(end, TagEnd::Strong)));
                } else {
                    out.push(Event::End(end));
                }
            }
            other => out.push(other),
        }
    }

    out
}

fn underscores(strong: bool) -> Event<'static> {
    Event::Text(CowStr::Borrowed(if strong { "__" } else { "_" }))
}

/// Give every heading an id and collect the table of contents.
fn anchor_headings(events: &mut [Event<'_>]) -> Vec<TocEntry> {
    let mut toc = Vec::new();
    let mut ids = AnchorIds::default();
    let mut i = 0;

    while i < events.len() {
        let (level, explicit) = match &events[i] {
            Event::Start(Tag::Heading { level, id, .. }) => {
                (*level as u8, id.as_ref().map(|id| id.to_string()))
            }
            _ => {
                i += 1;
                continue;
            }
        };

        // Collect heading text up to the matching end tag
        let mut title = String::new();
        let mut end = i + 1;
        while end < events.len() {
            match &events[end] {
                Event::End(TagEnd::Heading(_)) => break,
                Event::Text(text) | Event::Code(text) => title.push_str(text),
                _ => {}
            }
            end += 1;
        }

        let anchor = match explicit {
            Some(id) => ids.claim(id),
            None => ids.derive(&title),
        };

        if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
            *id = Some(CowStr::from(anchor.clone()));
        }

        toc.push(TocEntry {
            title,
            id: anchor,
            level,
        });

        i = end + 1;
    }

    toc
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_complete_document() {
        let source = r#"---
title: Button
description: A button component
---

# Button

A clickable button.

```rust
let x = 1;
```

## Variants

Different button styles.
"#;

        let doc = Markdown::new().render(source).unwrap();

        assert_eq!(doc.metadata["title"], "Button");
        assert_eq!(doc.metadata["description"], "A button component");

        assert!(doc.html.contains(r#"<h1 id="button">Button</h1>"#));
        assert!(doc.html.contains(r#"<h2 id="variants">Variants</h2>"#));
        assert!(doc.html.contains(r#"<code class="language-rust">"#));
        assert!(!doc.html.contains("description:"));

        assert_eq!(doc.toc.len(), 2);
        assert_eq!(doc.toc[0].title, "Button");
        assert_eq!(doc.toc[0].level, 1);
        assert_eq!(doc.toc[0].id, "button");
        assert_eq!(doc.toc[1].title, "Variants");
        assert_eq!(doc.toc[1].level, 2);
    }

    #[test]
    fn renders_without_frontmatter() {
        let doc = Markdown::new().render("# Hi").unwrap();

        assert!(doc.metadata.is_empty());
        assert_eq!(doc.html, "<h1 id=\"hi\">Hi</h1>\n");
        assert_eq!(doc.toc.len(), 1);
    }

    #[test]
    fn toc_html_absent_without_headings() {
        let doc = Markdown::new().render("Just a paragraph.").unwrap();

        assert!(doc.toc.is_empty());
        assert_eq!(doc.toc_html(), None);
    }

    #[test]
    fn toc_html_links_anchors() {
        let doc = Markdown::new().render("# One\n\n## Two\n").unwrap();
        let toc = doc.toc_html().unwrap();

        assert!(toc.contains(r##"<a href="#one">One</a>"##));
        assert!(toc.contains(r##"<a href="#two">Two</a>"##));
    }

    #[test]
    fn explicit_heading_ids_win() {
        let doc = Markdown::new()
            .render("# Intro {#start}\n\n# Intro\n")
            .unwrap();

        assert_eq!(doc.toc[0].id, "start");
        assert_eq!(doc.toc[1].id, "intro");
        assert!(doc.html.contains(r#"<h1 id="start">Intro</h1>"#));
    }

    #[test]
    fn duplicate_headings_get_suffixes() {
        let doc = Markdown::new().render("## Usage\n\n## Usage\n").unwrap();

        assert_eq!(doc.toc[0].id, "usage");
        assert_eq!(doc.toc[1].id, "usage-2");
    }

    #[test]
    fn heading_text_includes_inline_code() {
        let doc = Markdown::new().render("# The `run` command").unwrap();

        assert_eq!(doc.toc[0].title, "The run command");
        assert_eq!(doc.toc[0].id, "the-run-command");
    }

    #[test]
    fn applies_smart_punctuation() {
        let doc = Markdown::new().render("\"quoted\" -- dash...").unwrap();

        assert!(doc.html.contains('\u{201c}'));
        assert!(doc.html.contains('\u{2013}'));
        assert!(doc.html.contains('\u{2026}'));
    }

    #[test]
    fn renders_footnotes() {
        let doc = Markdown::new()
            .render("Text[^1].\n\n[^1]: The note.\n")
            .unwrap();

        assert!(doc.html.contains("footnote-reference"));
        assert!(doc.html.contains("footnote-definition"));
    }

    #[test]
    fn passes_inline_html_through() {
        let doc = Markdown::new()
            .render("<div class=\"note\">kept</div>\n\nA <span>span</span>.")
            .unwrap();

        assert!(doc.html.contains("<div class=\"note\">kept</div>"));
        assert!(doc.html.contains("<span>span</span>"));
    }

    #[test]
    fn emits_self_closing_void_elements() {
        let doc = Markdown::new().render("line  \nbreak\n\n---\n").unwrap();

        assert!(doc.html.contains("<br />"));
        assert!(doc.html.contains("<hr />"));
    }

    #[test]
    fn underscores_stay_literal() {
        let doc = Markdown::new()
            .render("call _private_fn_ and __init__ here")
            .unwrap();

        assert_eq!(doc.html, "<p>call _private_fn_ and __init__ here</p>\n");
    }

    #[test]
    fn asterisks_still_emphasise() {
        let doc = Markdown::new()
            .render("*star*, **bold** and *mixed __inner__*")
            .unwrap();

        assert_eq!(
            doc.html,
            "<p><em>star</em>, <strong>bold</strong> and <em>mixed __inner__</em></p>\n"
        );
    }

    #[test]
    fn underscored_heading_keeps_its_title() {
        let doc = Markdown::new().render("# The __init__ hook").unwrap();

        assert_eq!(doc.toc[0].title, "The __init__ hook");
        assert!(doc.html.contains(">The __init__ hook</h1>"));
    }

    #[test]
    fn renders_markdown_inside_marked_blocks() {
        let doc = Markdown::new()
            .render("<div class=\"note\" markdown=\"1\">*md*</div>\n\n<div>*raw*</div>\n")
            .unwrap();

        assert!(doc.html.contains("<div class=\"note\">"));
        assert!(doc.html.contains("<p><em>md</em></p>"));
        assert!(doc.html.contains("<div>*raw*</div>"));
        assert!(!doc.html.contains("markdown="));
    }

    #[test]
    fn headings_inside_marked_blocks_are_anchored() {
        let doc = Markdown::new()
            .render("<section markdown=\"1\">\n## Inside\n</section>\n")
            .unwrap();

        assert_eq!(doc.toc[0].id, "inside");
        assert!(doc.html.contains(r#"<h2 id="inside">Inside</h2>"#));
    }

    #[test]
    fn malformed_frontmatter_is_an_error() {
        let result = Markdown::new().render("---\ntitle: x\n");

        assert!(matches!(
            result,
            Err(ParseError::Frontmatter(FrontmatterError::Unclosed))
        ));
    }
}
