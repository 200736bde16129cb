//! Writing packaged trees to disk
//!
//! All writes of one run happen inside an [`OutputTransaction`]: created
//! files and directories are tracked and overwritten files are backed up.
//! Unless the transaction is committed, dropping it undoes every change, so
//! a failed run leaves the output directory as it found it.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Result, fs as fs_error};
use crate::tree::{FileEntry, FileTree};

/// Files touched by a write, as slash-separated paths relative to the output directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WriteReport {
    pub created: Vec<String>,
    pub overwritten: Vec<String>,
}

impl WriteReport {
    pub fn total(&self) -> usize {
        self.created.len() + self.overwritten.len()
    }
}

#[derive(Debug)]
struct Backup {
    path: PathBuf,
    content: Vec<u8>,
    permissions: fs::Permissions,
}

/// Rollback log for one output write
#[derive(Debug, Default)]
pub struct OutputTransaction {
    created_files: Vec<PathBuf>,
    created_dirs: Vec<PathBuf>,
    backups: Vec<Backup>,
    committed: bool,
}

impl OutputTransaction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `dir` and any missing ancestors, remembering which ones were new.
    pub fn create_dir_all(&mut self, dir: &Path) -> Result<()> {
        let missing: Vec<PathBuf> = dir
            .ancestors()
            .take_while(|p| !p.as_os_str().is_empty() && !p.exists())
            .map(Path::to_path_buf)
            .collect();

        for path in missing.into_iter().rev() {
            fs::create_dir(&path).map_err(fs_error::write_error(&path))?;
            self.created_dirs.push(path);
        }
        Ok(())
    }

    /// Write `entry` to `path`, backing up any existing file first.
    ///
    /// Returns `true` when an existing file was overwritten.
    pub fn write_file(&mut self, path: &Path, entry: &FileEntry) -> Result<bool> {
        if let Some(parent) = path.parent() {
            self.create_dir_all(parent)?;
        }

        let existed = path.exists();
        if existed {
            if path.is_dir() {
                return Err(fs_error::write_failed(
                    path.display().to_string(),
                    "a directory exists at this path",
                ));
            }
            let content = fs::read(path).map_err(fs_error::read_error(path))?;
            let permissions = fs::metadata(path)
                .map_err(fs_error::read_error(path))?
                .permissions();
            self.backups.push(Backup {
                path: path.to_path_buf(),
                content,
                permissions,
            });
        } else {
            self.created_files.push(path.to_path_buf());
        }

        fs::write(path, entry.content.as_bytes()).map_err(fs_error::write_error(path))?;
        if entry.executable {
            set_executable(path)?;
        }
        Ok(existed)
    }

    /// Keep all changes
    pub fn commit(mut self) {
        self.committed = true;
    }

    /// Undo every tracked change.
    pub fn rollback(&mut self) {
        if self.committed {
            return;
        }

        for path in self.created_files.drain(..) {
            if !path.exists() {
                continue;
            }
            if let Err(e) = fs::remove_file(&path) {
                warn!(path = %path.display(), error = %e, "Failed to remove file during rollback");
            }
        }

        for backup in self.backups.drain(..) {
            let restored = fs::write(&backup.path, &backup.content)
                .and_then(|()| fs::set_permissions(&backup.path, backup.permissions));
            if let Err(e) = restored {
                warn!(path = %backup.path.display(), error = %e, "Failed to restore file during rollback");
            }
        }

        // Deepest first; only directories left empty are removed.
        for dir in self.created_dirs.drain(..).rev() {
            let is_empty = fs::read_dir(&dir)
                .map(|mut entries| entries.next().is_none())
                .unwrap_or(false);
            if is_empty {
                let _ = fs::remove_dir(&dir);
            }
        }
    }
}

impl Drop for OutputTransaction {
    fn drop(&mut self) {
        if !self.committed {
            self.rollback();
        }
    }
}

#[cfg(unix)]
fn set_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = fs::metadata(path)
        .map_err(fs_error::read_error(path))?
        .permissions();
    permissions.set_mode(permissions.mode() | 0o111);
    fs::set_permissions(path, permissions).map_err(fs_error::write_error(path))
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> Result<()> {
    Ok(())
}

/// Write every file of `tree` under `out_dir`.
///
/// Either all files are written or, on the first failure, everything
/// written so far is rolled back and the error returned.
pub fn write_tree(tree: &FileTree, out_dir: &Path) -> Result<WriteReport> {
    let mut transaction = OutputTransaction::new();
    transaction.create_dir_all(out_dir)?;

    let mut report = WriteReport::default();
    for (path, entry) in tree.iter() {
        let target = out_dir.join(path);
        let overwritten = transaction.write_file(&target, entry)?;
        debug!(path, overwritten, "Wrote file");

        if overwritten {
            report.overwritten.push(path.to_string());
        } else {
            report.created.push(path.to_string());
        }
    }

    transaction.commit();
    Ok(report)
}
