//! Static page builder for quire.
//!
//! Finds Markdown documents whose page is out of date, renders them, and
//! writes each one through a shared `$`-placeholder template.

pub mod builder;
pub mod paths;
pub mod staleness;
pub mod templates;

pub use builder::{apply_template, BuildConfig, BuildError, BuildResult, StaticBuilder};
pub use paths::SitePaths;
pub use staleness::{changed_documents, ChangedDocuments, StalenessError};
pub use templates::{Template, Variables};
