//! Collecting input files from the filesystem.
//!
//! Inputs may be files or directories; directories are walked recursively.
//! Nothing found here is ever fatal: entries that can't be read become
//! [`Exclusion`]s and the rest of the collection carries on.

use crate::error::{ErrorKind, Result};
use crate::file::InputFile;
use crate::plan::Exclusion;
use exn::ResultExt;
use serde::{Deserialize, Serialize};
use std::fs::Metadata;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Component, Path, PathBuf};
use time::OffsetDateTime;
use tokio::fs;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectOptions {
    /// Also collect dotfiles and the contents of dot-directories found while
    /// walking. Inputs named explicitly are always collected.
    pub include_hidden: bool,
    /// Paths skipped entirely, e.g. an output root nested inside an input.
    pub exclude: Vec<PathBuf>,
}

/// Files found by [`collect`], sorted by path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collection {
    pub files: Vec<InputFile>,
    pub exclusions: Vec<Exclusion>,
}

enum WalkEntry {
    File(InputFile),
    Descend(PathBuf),
    Excluded(Exclusion),
    Skip,
}

/// Walks `inputs` and returns every regular file found.
///
/// Symlinks are never followed. The same file reached through two inputs is
/// collected once.
///
/// # Errors
/// Only when the current directory can't be determined to resolve relative
/// paths.
#[instrument(skip(options), fields(include_hidden = options.include_hidden))]
pub async fn collect(inputs: &[PathBuf], options: &CollectOptions) -> Result<Collection> {
    let exclude = options.exclude.iter().map(absolute).collect::<Result<Vec<_>>>()?;
    let mut collection = Collection::default();
    let mut stack = Vec::new();

    for input in inputs {
        let input = absolute(input)?;
        match classify(&input, &exclude, true, true).await {
            WalkEntry::File(file) => collection.files.push(file),
            WalkEntry::Descend(dir) => stack.push(dir),
            WalkEntry::Excluded(exclusion) => collection.exclusions.push(exclusion),
            WalkEntry::Skip => {},
        }
    }

    while let Some(current) = stack.pop() {
        let mut entries = match fs::read_dir(&current).await {
            Ok(entries) => entries,
            Err(err) => {
                collection.exclusions.push(Exclusion::new(&current, err.to_string()));
                continue;
            },
        };
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(err) => {
                    collection.exclusions.push(Exclusion::new(&current, err.to_string()));
                    break;
                },
            };
            match classify(&entry.path(), &exclude, options.include_hidden, false).await {
                WalkEntry::File(file) => collection.files.push(file),
                WalkEntry::Descend(dir) => stack.push(dir),
                WalkEntry::Excluded(exclusion) => collection.exclusions.push(exclusion),
                WalkEntry::Skip => {},
            }
        }
    }

    collection.files.sort_by(|a, b| a.path().cmp(b.path()));
    collection.files.dedup_by(|a, b| a.path() == b.path());
    collection.exclusions.sort_by(|a, b| a.path.cmp(&b.path));
    info!(files = collection.files.len(), excluded = collection.exclusions.len(), "collection complete");
    Ok(collection)
}

async fn classify(path: &Path, exclude: &[PathBuf], include_hidden: bool, explicit: bool) -> WalkEntry {
    if exclude.iter().any(|excluded| path.starts_with(excluded)) {
        debug!(path = %path.display(), "skipping excluded path");
        return WalkEntry::Skip;
    }
    if !include_hidden && is_hidden(path) {
        return WalkEntry::Skip;
    }
    let metadata = match fs::symlink_metadata(path).await {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == IoErrorKind::NotFound && explicit => {
            return WalkEntry::Excluded(Exclusion::new(path, "does not exist"));
        },
        // Vanished between listing and stat.
        Err(err) if err.kind() == IoErrorKind::NotFound => return WalkEntry::Skip,
        Err(err) => return WalkEntry::Excluded(Exclusion::new(path, err.to_string())),
    };
    if metadata.is_symlink() {
        return WalkEntry::Excluded(Exclusion::new(path, "symbolic link not followed"));
    }
    if metadata.is_dir() {
        return WalkEntry::Descend(path.to_path_buf());
    }
    if !metadata.is_file() {
        return WalkEntry::Excluded(Exclusion::new(path, "not a regular file"));
    }
    match input_file(path, &metadata) {
        Ok(file) => WalkEntry::File(file),
        Err(err) => WalkEntry::Excluded(Exclusion::new(path, (*err).to_string())),
    }
}

fn input_file(path: &Path, metadata: &Metadata) -> Result<InputFile> {
    let modified = metadata.modified().map_err(ErrorKind::Io)?;
    Ok(InputFile::new(path, metadata.len(), OffsetDateTime::from(modified)))
}

fn is_hidden(path: &Path) -> bool {
    path.file_name().and_then(|name| name.to_str()).is_some_and(|name| name.starts_with('.'))
}

/// Absolute and lexically normalized, so `in` and `in/../in` compare equal.
///
/// `..` is folded without consulting the filesystem; a `..` at the root stays
/// at the root.
fn absolute(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    let absolute = std::path::absolute(path).or_raise(|| ErrorKind::InvalidPath(path.to_path_buf()))?;
    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::ParentDir => _ = normalized.pop(),
            Component::CurDir => {},
            other => normalized.push(other),
        }
    }
    Ok(normalized)
}

/// Lists every entry (files and folders) under `root`, relative to it.
///
/// Used to pre-claim occupied destinations. A missing root is empty.
pub(crate) async fn existing_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut existing = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(current) = stack.pop() {
        let mut entries = match fs::read_dir(&current).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == IoErrorKind::NotFound => continue,
            Err(err) => exn::bail!(ErrorKind::Io(err)),
        };
        while let Some(entry) = entries.next_entry().await.map_err(ErrorKind::Io)? {
            let path = entry.path();
            if entry.file_type().await.map_err(ErrorKind::Io)?.is_dir() {
                stack.push(path.clone());
            }
            if let Ok(relative) = path.strip_prefix(root) {
                existing.push(relative.to_path_buf());
            }
        }
    }
    existing.sort();
    Ok(existing)
}
