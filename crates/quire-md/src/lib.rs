//! Markdown converter with frontmatter extraction and table of contents.
//!
//! This crate renders Markdown to XHTML-compatible HTML, pulls key/value
//! frontmatter off the top of a document, and anchors every heading so a
//! table of contents can link to it.

pub mod frontmatter;
mod html_blocks;
pub mod parser;
pub mod toc;

pub use frontmatter::{Frontmatter, FrontmatterError};
pub use parser::{Markdown, ParseError, RenderedDoc};
pub use toc::TocEntry;
