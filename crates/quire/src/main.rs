//! quire CLI - renders a folder of Markdown documents through one HTML template.
//!
//! Usage: `quire [--template PATH] [--input DIR] [--output DIR]`
//!
//! Each processed input path is printed on stdout. Logs go to stderr.

use std::path::Path;

use anyhow::{Context, Result};
use quire_static::{SitePaths, StaticBuilder};
use tracing_subscriber::{fmt, EnvFilter};

mod config;

fn main() -> Result<()> {
    let file_config = config::load_config(Path::new("."))?;

    // Initialize logging
    let filter = EnvFilter::try_new(&file_config.log.level)
        .with_context(|| format!("Invalid log level '{}'", file_config.log.level))?;

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args_os()
        .skip(1)
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();
    let paths = SitePaths::resolve(&args, file_config.default_paths());

    let result = StaticBuilder::new(paths).build()?;

    tracing::info!(
        "Built {} pages in {}ms",
        result.pages,
        result.duration_ms
    );
    tracing::debug!("Output: {}", result.output_dir.display());

    Ok(())
}
