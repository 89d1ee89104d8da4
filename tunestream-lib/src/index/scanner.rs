//! Directory walker - builds a snapshot from the files under a root

use std::fs;
use std::path::Path;

use tokio_util::sync::CancellationToken;
use walkdir::WalkDir;

use crate::error::{LibraryError, Result};
use crate::metadata::build_entry;

use super::Snapshot;

/// Check a path's extension against normalised (lower-case, dot-prefixed)
/// formats
pub fn has_supported_format(path: &Path, formats: &[String]) -> bool {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .map(|ext| formats.iter().any(|f| *f == ext))
        .unwrap_or(false)
}

/// Walk `root` and build a snapshot of every supported file under it.
///
/// The token is checked before each visited entry. Nothing is published on
/// failure: the caller only sees the snapshot once the walk has finished.
pub fn walk_library(
    root: &Path,
    formats: &[String],
    cancel: &CancellationToken,
) -> Result<Snapshot> {
    walk_entries(root, formats, cancel, |count| {
        if count % 1000 == 0 {
            tracing::debug!("Scanning {:?}: {} files so far", root, count);
        }
    })
}

/// The walk itself. `on_file` is called with the running count after each
/// indexed file.
fn walk_entries<F>(
    root: &Path,
    formats: &[String],
    cancel: &CancellationToken,
    mut on_file: F,
) -> Result<Snapshot>
where
    F: FnMut(usize),
{
    match fs::metadata(root) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Err(LibraryError::DirectoryNotFound(root.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(LibraryError::DirectoryNotFound(root.to_path_buf()))
        }
        Err(e) => {
            return Err(LibraryError::Walk(format!(
                "cannot stat {}: {}",
                root.display(),
                e
            )))
        }
    }

    let mut entries = Vec::new();

    for item in WalkDir::new(root).follow_links(false) {
        if cancel.is_cancelled() {
            tracing::debug!("Scan of {:?} cancelled after {} files", root, entries.len());
            return Err(LibraryError::Cancelled);
        }

        let item = item.map_err(|e| LibraryError::Walk(e.to_string()))?;
        if item.file_type().is_dir() {
            continue;
        }

        let path = item.path();
        if !has_supported_format(path, formats) {
            continue;
        }

        // Symlinks are listed as-is; their target decides whether they are
        // files, and the streaming side checks where they point.
        let meta = if item.path_is_symlink() {
            match fs::metadata(path) {
                Ok(m) if m.is_file() => m,
                Ok(_) => continue,
                Err(e) => {
                    tracing::warn!("Skipping dangling link {:?}: {}", path, e);
                    continue;
                }
            }
        } else {
            item.metadata()
                .map_err(|e| LibraryError::Walk(e.to_string()))?
        };

        entries.push(build_entry(path, &meta));
        on_file(entries.len());
    }

    Ok(Snapshot::from_entries(entries))
}
