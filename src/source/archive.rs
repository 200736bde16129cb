//! Reading packages from directories and ZIP archives

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::debug;
use zip::ZipArchive;

use crate::error::{Result, TemplateError, fs as fs_error, source};
use crate::tree::{FileEntry, FileTree, normalize_relative_path};

/// Read a package from `path`, which may be a directory or a ZIP archive.
///
/// A missing path is [`TemplateError::SourceUnavailable`]; anything that is
/// neither a directory nor a readable ZIP is [`TemplateError::MalformedOverlay`].
pub fn read_package(path: &Path) -> Result<FileTree> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| source::unavailable(path.display().to_string(), e.to_string()))?;

    if metadata.is_dir() {
        debug!(path = %path.display(), "Reading package directory");
        return FileTree::from_dir(path);
    }
    if metadata.is_file() {
        return read_zip(path);
    }

    Err(source::malformed_overlay(
        path.display().to_string(),
        "not a directory or ZIP archive",
    ))
}

/// Read every file entry of a ZIP archive into a tree.
///
/// A single wrapper directory shared by all entries is stripped. Entries
/// that would escape the archive root are rejected.
pub fn read_zip(path: &Path) -> Result<FileTree> {
    let shown = path.display().to_string();
    let file = File::open(path).map_err(fs_error::read_error(path))?;
    let mut archive = ZipArchive::new(BufReader::new(file))
        .map_err(|e| source::malformed_overlay(&shown, format!("not a ZIP archive: {e}")))?;

    let mut tree = FileTree::new();
    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| source::malformed_overlay(&shown, e.to_string()))?;
        if entry.is_dir() {
            continue;
        }

        let name = normalize_relative_path(entry.name()).map_err(|e| match e {
            TemplateError::InvalidPath { path, reason } => {
                source::malformed_overlay(&shown, format!("unsafe entry '{path}': {reason}"))
            }
            other => other,
        })?;

        let mut bytes = Vec::new();
        entry
            .read_to_end(&mut bytes)
            .map_err(|e| source::malformed_overlay(&shown, format!("{name}: {e}")))?;
        let executable = entry.unix_mode().is_some_and(|mode| mode & 0o111 != 0);

        tree.insert(&name, FileEntry::from_bytes(bytes).with_executable(executable))?;
    }

    let tree = tree.without_wrapper_dir();
    debug!(path = %shown, files = tree.len(), "Read ZIP package");
    Ok(tree)
}
