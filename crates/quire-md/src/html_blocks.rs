//! HTML blocks whose contents are Markdown.
//!
//! CommonMark passes an HTML block through untouched. An opening tag at the
//! start of a line that carries `markdown="1"` instead has its contents
//! parsed as Markdown: the attribute is dropped and the contents are set
//! apart by blank lines, so they become part of the surrounding document
//! (headings inside still get anchors and TOC entries).

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

static OPEN_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^([ ]{0,3})<([A-Za-z][A-Za-z0-9-]*)((?:\s[^>]*)?)>").unwrap()
});

static MARKDOWN_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\s+markdown\s*=\s*(?:"1"|'1'|1\b)"#).unwrap());

/// Open every `markdown="1"` block so its contents are parsed as Markdown.
///
/// Blocks without a matching close tag are left as written.
pub(crate) fn expand_markdown_blocks(source: &str) -> Cow<'_, str> {
    let mut text = Cow::Borrowed(source);
    let mut pos = 0;

    while let Some(caps) = OPEN_TAG.captures_at(&text, pos) {
        let Some(whole) = caps.get(0) else {
            break;
        };
        let (start, open_end) = (whole.start(), whole.end());

        let attrs = &caps[3];
        if !MARKDOWN_ATTR.is_match(attrs) || attrs.trim_end().ends_with('/') {
            pos = open_end;
            continue;
        }

        let name = caps[2].to_string();
        let open = format!("{}<{}{}>", &caps[1], name, MARKDOWN_ATTR.replace(attrs, ""));

        let Some((inner_len, close_end)) = find_close(&text[open_end..], &name) else {
            tracing::debug!("Unclosed <{}> block with markdown attribute", name);
            pos = open_end;
            continue;
        };

        let inner = dedent(text[open_end..open_end + inner_len].trim_matches(['\n', '\r']));
        let rewritten = format!(
            "{}{}\n\n{}\n\n</{}>{}",
            &text[..start],
            open,
            inner,
            name,
            &text[open_end + close_end..]
        );

        // Nested blocks are picked up on later iterations
        pos = start + open.len();
        text = Cow::Owned(rewritten);
    }

    text
}

/// Offsets of the close tag matching an already-consumed open tag: where the
/// contents end, and where the close tag ends.
fn find_close(rest: &str, name: &str) -> Option<(usize, usize)> {
    let tags = Regex::new(&format!(r"(?i)<(/?){}(?:\s[^>]*)?>", regex::escape(name))).ok()?;
    let mut depth = 0usize;

    for caps in tags.captures_iter(rest) {
        let tag = caps.get(0)?;
        if caps[1].is_empty() {
            if !tag.as_str().ends_with("/>") {
                depth += 1;
            }
        } else if depth == 0 {
            return Some((tag.start(), tag.end()));
        } else {
            depth -= 1;
        }
    }

    None
}

/// Strip the indentation common to every non-blank line.
fn dedent(text: &str) -> String {
    let indent = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);

    text.lines()
        .map(|line| line.get(indent..).unwrap_or(""))
        .collect::<Vec<_>>()
        .join("\n")
}
