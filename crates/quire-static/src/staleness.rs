//! Detection of documents whose page needs rebuilding.
//!
//! Only the immediate children of each folder are listed. Both sides are keyed
//! by their path relative to the folder with the extension removed, so
//! `Input/notes.md` pairs with `Output/notes.html`. A document is stale when
//! its page is missing or older than either the document or the template.
//!
//! Filesystem timestamps are the only cache; nothing is persisted.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use walkdir::WalkDir;

/// Errors that can occur while comparing timestamps.
#[derive(Debug, thiserror::Error)]
pub enum StalenessError {
    #[error("Failed to list {}: {source}", .path.display())]
    List {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to read modification time of {}: {source}", .path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Lazily yields the relative paths (`.md` extension) of stale documents.
///
/// Consumed once. Order follows the input folder listing.
#[derive(Debug)]
pub struct ChangedDocuments {
    keys: std::vec::IntoIter<PathBuf>,
    inputs: HashMap<PathBuf, SystemTime>,
    outputs: HashMap<PathBuf, SystemTime>,
    template_mtime: SystemTime,
}

impl Iterator for ChangedDocuments {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        for key in self.keys.by_ref() {
            let Some(&input_mtime) = self.inputs.get(&key) else {
                continue;
            };
            let output_mtime = self.outputs.get(&key).copied();
            if is_stale(input_mtime, output_mtime, self.template_mtime) {
                tracing::debug!("{} is stale", key.display());
                return Some(document_path(key));
            }
            tracing::debug!("{} is up to date", key.display());
        }
        None
    }
}

/// Reattach `.md` to a key. Dots inside the stem (`v1.2`) are kept.
fn document_path(key: PathBuf) -> PathBuf {
    let mut name = key.into_os_string();
    name.push(".md");
    PathBuf::from(name)
}

/// Compare the three timestamps. A missing page is always stale.
pub fn is_stale(
    input_mtime: SystemTime,
    output_mtime: Option<SystemTime>,
    template_mtime: SystemTime,
) -> bool {
    match output_mtime {
        None => true,
        Some(output) => output < input_mtime || output < template_mtime,
    }
}

/// List both folders and prepare the stale-document iterator.
pub fn changed_documents(
    template_file: &Path,
    input_dir: &Path,
    output_dir: &Path,
) -> Result<ChangedDocuments, StalenessError> {
    let template_mtime = modified(template_file)?;
    let inputs = list_mtimes(input_dir)?;
    let outputs = list_mtimes(output_dir)?;

    Ok(ChangedDocuments {
        keys: inputs.order.into_iter(),
        inputs: inputs.mtimes,
        outputs: outputs.mtimes,
        template_mtime,
    })
}

/// Staleness keys of one folder, in listing order.
///
/// Entries sharing a key (`a.md`, `a.txt`) collapse into one: the key keeps
/// its first listing position and the last entry's modification time.
#[derive(Debug, Default)]
struct Listing {
    order: Vec<PathBuf>,
    mtimes: HashMap<PathBuf, SystemTime>,
}

/// Staleness key and modification time of every immediate child of `dir`.
fn list_mtimes(dir: &Path) -> Result<Listing, StalenessError> {
    let mut listing = Listing::default();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true) {
        let entry = entry.map_err(|source| StalenessError::List {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();

        let mtime = modified(path)?;
        let key = path.strip_prefix(dir).unwrap_or(path).with_extension("");

        if listing.mtimes.insert(key.clone(), mtime).is_none() {
            listing.order.push(key);
        }
    }

    Ok(listing)
}

fn modified(path: &Path) -> Result<SystemTime, StalenessError> {
    path.metadata()
        .and_then(|meta| meta.modified())
        .map_err(|source| StalenessError::Metadata {
            path: path.to_path_buf(),
            source,
        })
}
