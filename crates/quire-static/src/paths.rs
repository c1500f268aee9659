//! Resolution of the template file and the two folders.
//!
//! Overrides come from a flat token list. A flag's value is used only when it
//! names an existing path of the right kind, otherwise the default stays:
//!
//! ```text
//! --template PATH   existing file       (default Template.html)
//! --input DIR       existing directory  (default Input/)
//! --output DIR      existing directory  (default Output/)
//! ```
//!
//! Unknown tokens and missing values are ignored. Resolution never fails.

use std::path::{Path, PathBuf};

/// Template file and folders for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitePaths {
    /// Shared HTML template
    pub template_file: PathBuf,

    /// Folder scanned for Markdown documents
    pub input_dir: PathBuf,

    /// Folder receiving rendered pages
    pub output_dir: PathBuf,
}

impl Default for SitePaths {
    fn default() -> Self {
        Self {
            template_file: PathBuf::from("Template.html"),
            input_dir: PathBuf::from("Input/"),
            output_dir: PathBuf::from("Output/"),
        }
    }
}

impl SitePaths {
    /// Apply command-line overrides on top of `defaults`.
    pub fn resolve<S: AsRef<str>>(args: &[S], defaults: SitePaths) -> SitePaths {
        let SitePaths {
            template_file,
            input_dir,
            output_dir,
        } = defaults;

        SitePaths {
            template_file: override_path(args, "--template", Path::is_file).unwrap_or(template_file),
            input_dir: override_path(args, "--input", Path::is_dir).unwrap_or(input_dir),
            output_dir: override_path(args, "--output", Path::is_dir).unwrap_or(output_dir),
        }
    }
}

/// Value following the first occurrence of `flag`, if it passes `accept`.
fn override_path<S: AsRef<str>>(
    args: &[S],
    flag: &str,
    accept: fn(&Path) -> bool,
) -> Option<PathBuf> {
    let index = args.iter().position(|arg| arg.as_ref() == flag)?;

    let Some(value) = args.get(index + 1) else {
        tracing::warn!("{} given without a value, keeping the default", flag);
        return None;
    };

    let candidate = PathBuf::from(value.as_ref());
    if accept(&candidate) {
        Some(candidate)
    } else {
        tracing::warn!(
            "Ignoring {} {}: not an existing path of the expected kind",
            flag,
            candidate.display()
        );
        None
    }
}
