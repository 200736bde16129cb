//! Overlay merging
//!
//! Layers an optional overlay tree on top of a base tree.
//!
//! ```text
//! Base:    templates/commands/plan.md  = "official"
//!          memory/constitution.md      = "rules"
//! Overlay: templates/commands/plan.md  = "fork"
//!          templates/commands/epic.md  = "new"
//!
//! Result:  templates/commands/plan.md  = "fork"      (overlay wins)
//!          templates/commands/epic.md  = "new"       (added)
//!          memory/constitution.md      = "rules"     (kept)
//! ```
//!
//! Replacement is always whole-file. Overlay paths outside the packaged
//! layout are merged verbatim; rejecting them is the caller's business.

use tracing::debug;

use crate::tree::FileTree;

/// What an overlay changed in the base tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Paths present in both trees, now holding the overlay's content
    pub replaced: Vec<String>,
    /// Paths only the overlay had
    pub added: Vec<String>,
}

impl MergeReport {
    pub fn is_empty(&self) -> bool {
        self.replaced.is_empty() && self.added.is_empty()
    }

    /// Merged paths whose content came from the overlay
    pub fn overlay_paths(&self) -> impl Iterator<Item = &str> {
        self.replaced.iter().chain(&self.added).map(String::as_str)
    }
}

/// Merge `overlay` onto `base`; overlay content wins on every shared path.
pub fn merge(base: FileTree, overlay: Option<FileTree>) -> FileTree {
    merge_with_report(base, overlay).0
}

/// Same as [`merge`], also reporting which paths the overlay replaced or added.
pub fn merge_with_report(base: FileTree, overlay: Option<FileTree>) -> (FileTree, MergeReport) {
    let Some(overlay) = overlay else {
        return (base, MergeReport::default());
    };

    let mut merged = base;
    let mut report = MergeReport::default();

    for (path, entry) in overlay {
        if merged.insert_normalized(path.clone(), entry).is_some() {
            report.replaced.push(path);
        } else {
            report.added.push(path);
        }
    }

    debug!(
        replaced = report.replaced.len(),
        added = report.added.len(),
        "merged overlay"
    );

    (merged, report)
}
