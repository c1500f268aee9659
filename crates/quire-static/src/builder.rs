//! Render-and-write pipeline.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use quire_md::{Markdown, ParseError, RenderedDoc};

use crate::paths::SitePaths;
use crate::staleness::{changed_documents, StalenessError};
use crate::templates::{Template, Variables};

/// Configuration for building a site.
pub type BuildConfig = SitePaths;

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of pages written
    pub pages: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Staleness(#[from] StalenessError),

    #[error("Failed to read template {}: {source}", .path.display())]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse Markdown: {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("Failed to write output {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Static site builder.
pub struct StaticBuilder {
    config: BuildConfig,
    markdown: Markdown,
}

impl StaticBuilder {
    /// Create a new static builder.
    pub fn new(config: BuildConfig) -> Self {
        Self {
            config,
            markdown: Markdown::new(),
        }
    }

    /// Build stale pages, listing each processed input path on stdout.
    pub fn build(&self) -> Result<BuildResult, BuildError> {
        let stdout = io::stdout();
        let mut report = stdout.lock();
        self.build_with(&mut report)
    }

    /// Build stale pages, listing each processed input path on `report`.
    ///
    /// Stops at the first failure. Pages written before it are kept.
    pub fn build_with(&self, report: &mut dyn Write) -> Result<BuildResult, BuildError> {
        let start = Instant::now();
        let SitePaths {
            template_file,
            input_dir,
            output_dir,
        } = &self.config;

        tracing::debug!(
            "Checking {} against {} (template {})",
            input_dir.display(),
            output_dir.display(),
            template_file.display()
        );

        let changed = changed_documents(template_file, input_dir, output_dir)?;

        let template_text =
            fs::read_to_string(template_file).map_err(|source| BuildError::TemplateRead {
                path: template_file.clone(),
                source,
            })?;
        let template = Template::new(template_text);

        let mut pages = 0;
        for relative in changed {
            let source_path = input_dir.join(&relative);

            // Reporting is best effort; a closed stdout must not abort the build
            if let Err(e) = writeln!(report, "{}", source_path.display()) {
                tracing::warn!("Failed to report {}: {}", source_path.display(), e);
            }

            let output_path = output_dir.join(&relative).with_extension("html");
            self.build_page(&template, &source_path, &output_path)?;
            pages += 1;
        }

        let duration = start.elapsed();

        Ok(BuildResult {
            pages,
            duration_ms: duration.as_millis() as u64,
            output_dir: output_dir.clone(),
        })
    }

    /// Render one document and write its page.
    fn build_page(
        &self,
        template: &Template,
        source_path: &Path,
        output_path: &Path,
    ) -> Result<(), BuildError> {
        let content = fs::read_to_string(source_path).map_err(|source| BuildError::Read {
            path: source_path.to_path_buf(),
            source,
        })?;

        let doc = self
            .markdown
            .render(&content)
            .map_err(|source| BuildError::Parse {
                path: source_path.to_path_buf(),
                source,
            })?;

        let html = apply_template(template, doc);

        // The output folder must already mirror the input; nothing is created here
        fs::write(output_path, html).map_err(|source| BuildError::Write {
            path: output_path.to_path_buf(),
            source,
        })?;

        tracing::info!("Wrote {}", output_path.display());

        Ok(())
    }
}

/// Substitute a rendered document into the template in two passes.
///
/// The first pass fills `content` only. Its output is then treated as a new
/// template and filled with the frontmatter plus `toc`, so placeholders written
/// in the Markdown body are expanded too. `toc` is always supplied, empty for
/// a document without headings, and takes precedence over a frontmatter key
/// of the same name.
pub fn apply_template(template: &Template, doc: RenderedDoc) -> String {
    let toc = doc.toc_html().unwrap_or_default();

    let mut first = Variables::new();
    first.insert("content".to_string(), doc.html);
    let with_content = Template::new(template.safe_substitute(&first));

    let mut second: Variables = doc.metadata.into_iter().collect();
    second.insert("toc".to_string(), toc);
    with_content.safe_substitute(&second)
}
