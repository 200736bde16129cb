//! In-memory file trees
//!
//! A [`FileTree`] is an ordered mapping from a normalized, slash-separated
//! relative path to file content. Every tree that flows through packaging
//! (located sources, merged trees, packaged output) is one of these, so
//! nothing touches a real output directory until the whole pipeline has
//! succeeded.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use blake3::Hasher;
use walkdir::WalkDir;

use crate::error::{Result, TemplateError, fs as fs_error};
use crate::packager::paths::REWRITE_ROOTS;

/// Hash prefix for tree digests
pub const HASH_PREFIX: &str = "blake3:";

/// Content of a single file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    Text(String),
    Binary(Vec<u8>),
}

impl FileContent {
    /// Classify raw bytes: valid UTF-8 without NUL bytes is text, anything else binary.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        if bytes.contains(&0) {
            return FileContent::Binary(bytes);
        }
        match String::from_utf8(bytes) {
            Ok(text) => FileContent::Text(text),
            Err(e) => FileContent::Binary(e.into_bytes()),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FileContent::Text(text) => Some(text),
            FileContent::Binary(_) => None,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            FileContent::Text(text) => text.as_bytes(),
            FileContent::Binary(bytes) => bytes,
        }
    }
}

/// A file in a tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub content: FileContent,
    pub executable: bool,
}

impl FileEntry {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: FileContent::Text(content.into()),
            executable: false,
        }
    }

    pub fn binary(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            content: FileContent::Binary(bytes.into()),
            executable: false,
        }
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            content: FileContent::from_bytes(bytes),
            executable: false,
        }
    }

    pub fn with_executable(mut self, executable: bool) -> Self {
        self.executable = executable;
        self
    }
}

/// Ordered mapping from relative path to file entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileTree {
    entries: BTreeMap<String, FileEntry>,
}

impl FileTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert an entry, normalizing the path first.
    ///
    /// Returns the entry previously stored at that path, if any.
    pub fn insert(&mut self, path: &str, entry: FileEntry) -> Result<Option<FileEntry>> {
        let path = normalize_relative_path(path)?;
        Ok(self.entries.insert(path, entry))
    }

    /// Move an entry taken from another tree, whose path is already normalized.
    pub(crate) fn insert_normalized(&mut self, path: String, entry: FileEntry) -> Option<FileEntry> {
        self.entries.insert(path, entry)
    }

    pub fn insert_text(&mut self, path: &str, content: impl Into<String>) -> Result<()> {
        self.insert(path, FileEntry::text(content))?;
        Ok(())
    }

    pub fn get(&self, path: &str) -> Option<&FileEntry> {
        self.entries.get(path)
    }

    /// Text content at `path`, if the file exists and is text
    pub fn text(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(|entry| entry.content.as_text())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn remove(&mut self, path: &str) -> Option<FileEntry> {
        self.entries.remove(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FileEntry)> {
        self.entries.iter().map(|(path, entry)| (path.as_str(), entry))
    }

    /// Read every regular file under `root` into a tree.
    ///
    /// `.git/` directories are skipped.
    pub fn from_dir(root: &Path) -> Result<Self> {
        Self::from_dir_filtered(root, |_| true)
    }

    /// Like [`FileTree::from_dir`], but only descends into top-level entries
    /// whose name satisfies `keep_top`. Skipped entries are never read.
    pub fn from_dir_filtered<F>(root: &Path, keep_top: F) -> Result<Self>
    where
        F: Fn(&str) -> bool,
    {
        let mut tree = FileTree::new();

        let walker = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| match e.depth() {
                0 => true,
                1 => e.file_name() != ".git" && keep_top(e.file_name().to_string_lossy().as_ref()),
                _ => e.file_name() != ".git",
            });

        for entry in walker {
            let entry = entry.map_err(|e| {
                fs_error::read_failed(root.display().to_string(), e.to_string())
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(root)
                .map_err(|e| fs_error::read_failed(entry.path().display().to_string(), e.to_string()))?
                .to_string_lossy()
                .replace('\\', "/");

            let bytes = fs::read(entry.path()).map_err(fs_error::read_error(entry.path()))?;
            let executable = is_executable(entry.path());
            tree.insert(&relative, FileEntry::from_bytes(bytes).with_executable(executable))?;
        }

        Ok(tree)
    }

    /// Strip a single outer wrapper directory (e.g. `repo-main/` in a
    /// repository archive) when every entry lives under it.
    ///
    /// Dot-directories and package roots are never treated as wrappers, so an
    /// overlay holding only `.claude/commands/` keeps its layout.
    pub fn without_wrapper_dir(self) -> Self {
        let Some(wrapper) = self.wrapper_dir() else {
            return self;
        };

        let prefix = format!("{wrapper}/");
        let entries = self
            .entries
            .into_iter()
            .map(|(path, entry)| (path[prefix.len()..].to_string(), entry))
            .collect();
        FileTree { entries }
    }

    fn wrapper_dir(&self) -> Option<String> {
        let mut wrapper: Option<&str> = None;
        for path in self.entries.keys() {
            let (first, _) = path.split_once('/')?;
            match wrapper {
                None => wrapper = Some(first),
                Some(existing) if existing != first => return None,
                Some(_) => {}
            }
        }

        let wrapper = wrapper?;
        if wrapper.starts_with('.') || REWRITE_ROOTS.contains(&wrapper) {
            return None;
        }
        Some(wrapper.to_string())
    }

    /// BLAKE3 digest over sorted paths and contents
    pub fn digest(&self) -> String {
        let mut hasher = Hasher::new();
        for (path, entry) in &self.entries {
            hasher.update(path.as_bytes());
            hasher.update(b"\0");
            hasher.update(entry.content.as_bytes());
            hasher.update(if entry.executable { b"\x01" } else { b"\x00" });
        }
        format!("{}{}", HASH_PREFIX, hasher.finalize().to_hex())
    }
}

impl IntoIterator for FileTree {
    type Item = (String, FileEntry);
    type IntoIter = std::collections::btree_map::IntoIter<String, FileEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Normalize a relative path to slash-separated form.
///
/// `.` and empty segments are dropped; `..` segments and absolute paths are
/// rejected.
pub fn normalize_relative_path(path: &str) -> Result<String> {
    let unified = path.replace('\\', "/");

    let is_absolute = unified.starts_with('/')
        || (unified.len() >= 2 && unified.as_bytes()[1] == b':' && unified.as_bytes()[0].is_ascii_alphabetic());
    if is_absolute {
        return Err(TemplateError::InvalidPath {
            path: path.to_string(),
            reason: "absolute paths are not allowed".to_string(),
        });
    }

    let mut segments = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                return Err(TemplateError::InvalidPath {
                    path: path.to_string(),
                    reason: "parent directory segments are not allowed".to_string(),
                });
            }
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        return Err(TemplateError::InvalidPath {
            path: path.to_string(),
            reason: "path is empty".to_string(),
        });
    }

    Ok(segments.join("/"))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(_path: &Path) -> bool {
    false
}
