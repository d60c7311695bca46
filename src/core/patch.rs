//! core::patch
//!
//! Partial application of the displayed diff.
//!
//! # Architecture
//!
//! [`SelectionApplier`] is the seam the `ApplyDiffSelection` command calls.
//! The default [`HunkApplier`] parses the displayed diff into a
//! [`DiffDocument`], narrows it to the selected lines (or the hunk under the
//! cursor) and feeds the resulting patch to `git apply`.
//!
//! # Line Selection
//!
//! When only part of a hunk is selected, unselected lines are rewritten so
//! the patch still applies:
//!
//! | line | forward | reverse |
//! |------|---------|---------|
//! | `-` unselected | becomes context | dropped |
//! | `+` unselected | dropped | becomes context |
//!
//! Hunk headers are recounted afterwards.
//!
//! # Example
//!
//! ```
//! use stagehand::core::patch::DiffDocument;
//!
//! let text = "diff --git a/f b/f\n--- a/f\n+++ b/f\n@@ -1,2 +1,2 @@\n a\n-b\n+c\n";
//! let doc = DiffDocument::parse(text);
//! assert_eq!(doc.hunks().len(), 1);
//! let patch = doc.hunk_patch_at(text.find("-b").unwrap(), false).unwrap();
//! assert!(patch.ends_with("-b\n+c\n"));
//! ```

use thiserror::Error;

use super::model::Model;
use super::types::ProcessOutput;
use crate::git::GitError;

/// Errors building or applying a partial patch.
#[derive(Debug, Error)]
pub enum PatchError {
    /// The cursor is not inside any hunk.
    #[error("no hunk at offset {offset}")]
    NoHunk {
        /// Byte offset into the diff text
        offset: usize,
    },

    /// The selected text does not occur in the diff.
    #[error("selection not found in diff")]
    SelectionNotFound,

    /// The selection contains no added or removed lines.
    #[error("nothing to apply")]
    NothingSelected,

    /// Git could not be run.
    #[error(transparent)]
    Git(#[from] GitError),
}

/// What to apply, captured by `ApplyDiffSelection`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionRequest {
    /// File the diff belongs to.
    pub filename: Option<String>,
    /// The displayed diff text.
    pub diff_text: String,
    /// Selected text (empty for "hunk under cursor").
    pub selected: String,
    /// Cursor byte offset into `diff_text`.
    pub offset: usize,
    /// The diff shows staged changes (apply unstages).
    pub staged: bool,
    /// Apply to the worktree instead of the index (discard).
    pub apply_to_worktree: bool,
}

impl SelectionRequest {
    /// Target the index.
    pub fn cached(&self) -> bool {
        !self.apply_to_worktree
    }

    /// Apply in reverse.
    pub fn reverse(&self) -> bool {
        self.staged || self.apply_to_worktree
    }
}

/// Applies a selection of the displayed diff.
pub trait SelectionApplier {
    fn apply_selection(
        &self,
        model: &Model,
        request: &SelectionRequest,
    ) -> Result<ProcessOutput, PatchError>;
}

/// Default applier: builds a patch and runs `git apply`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HunkApplier;

impl SelectionApplier for HunkApplier {
    fn apply_selection(
        &self,
        model: &Model,
        request: &SelectionRequest,
    ) -> Result<ProcessOutput, PatchError> {
        let doc = DiffDocument::parse(&request.diff_text);
        let reverse = request.reverse();
        let patch = if request.selected.is_empty() {
            doc.hunk_patch_at(request.offset, reverse)?
        } else {
            let start = request
                .diff_text
                .get(request.offset..)
                .and_then(|tail| tail.find(&request.selected))
                .map(|idx| request.offset + idx)
                .ok_or(PatchError::SelectionNotFound)?;
            doc.selection_patch(start, start + request.selected.len(), reverse)?
        };
        tracing::debug!(
            file = ?request.filename,
            cached = request.cached(),
            reverse,
            "applying partial patch"
        );
        Ok(model
            .vcs()
            .apply_patch(&patch, request.cached(), reverse)?)
    }
}

/// A line of the diff with its byte range.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Line {
    start: usize,
    end: usize,
    text: String,
}

/// One `@@` hunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    /// Byte offset of the `@@` line.
    pub start: usize,
    /// Byte offset just past the last body line.
    pub end: usize,
    /// First line in the old file.
    pub old_start: u32,
    /// First line in the new file.
    pub new_start: u32,
    /// Text after the closing `@@`.
    pub section: String,
    body: Vec<Line>,
}

/// A single-file unified diff split into header and hunks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffDocument {
    header: Vec<String>,
    hunks: Vec<Hunk>,
}

impl DiffDocument {
    /// Parse unified diff text. Parsing stops at a second file header.
    pub fn parse(text: &str) -> Self {
        let mut doc = DiffDocument::default();
        let mut offset = 0;
        for raw in text.split_inclusive('\n') {
            let start = offset;
            offset += raw.len();
            let line = raw.trim_end_matches('\n');

            if let Some((old_start, new_start, section)) = parse_hunk_header(line) {
                doc.hunks.push(Hunk {
                    start,
                    end: offset,
                    old_start,
                    new_start,
                    section,
                    body: Vec::new(),
                });
                continue;
            }

            match doc.hunks.last_mut() {
                None => doc.header.push(line.to_string()),
                Some(_) if line.starts_with("diff ") => break,
                Some(hunk) => {
                    hunk.end = offset;
                    hunk.body.push(Line {
                        start,
                        end: offset,
                        text: line.to_string(),
                    });
                }
            }
        }
        doc
    }

    /// Parsed hunks.
    pub fn hunks(&self) -> &[Hunk] {
        &self.hunks
    }

    /// Patch containing the whole hunk under `offset`.
    pub fn hunk_patch_at(&self, offset: usize, reverse: bool) -> Result<String, PatchError> {
        let hunk = self
            .hunks
            .iter()
            .find(|h| h.start <= offset && offset < h.end)
            .ok_or(PatchError::NoHunk { offset })?;
        self.selection_patch(hunk.start, hunk.end, reverse)
    }

    /// Patch containing the lines overlapping `start..end`.
    pub fn selection_patch(
        &self,
        start: usize,
        end: usize,
        reverse: bool,
    ) -> Result<String, PatchError> {
        let mut out: Vec<String> = self.header.clone();
        let mut any = false;
        for hunk in &self.hunks {
            if hunk.end <= start || hunk.start >= end {
                continue;
            }
            if let Some(lines) = hunk.filtered(start, end, reverse) {
                out.extend(lines);
                any = true;
            }
        }
        if !any {
            return Err(PatchError::NothingSelected);
        }
        let mut patch = out.join("\n");
        patch.push('\n');
        Ok(patch)
    }
}

impl Hunk {
    /// Rewrite the hunk keeping only the changes overlapping `start..end`.
    ///
    /// Returns `None` when no change survives.
    fn filtered(&self, start: usize, end: usize, reverse: bool) -> Option<Vec<String>> {
        let mut body = Vec::new();
        let mut old_count = 0u32;
        let mut new_count = 0u32;
        let mut changes = 0usize;
        let mut kept_previous = false;

        for line in &self.body {
            let selected = line.start < end && line.end > start;
            let (tag, rest) = match line.text.chars().next() {
                Some(c) => (c, &line.text[c.len_utf8()..]),
                None => (' ', ""),
            };
            let emitted = match tag {
                '-' if selected => {
                    changes += 1;
                    Some(line.text.clone())
                }
                '+' if selected => {
                    changes += 1;
                    Some(line.text.clone())
                }
                '-' if reverse => None,
                '+' if !reverse => None,
                '-' | '+' => Some(format!(" {}", rest)),
                '\\' => {
                    if kept_previous {
                        body.push(line.text.clone());
                    }
                    continue;
                }
                _ => Some(line.text.clone()),
            };

            kept_previous = emitted.is_some();
            if let Some(text) = emitted {
                match text.chars().next() {
                    Some('-') => old_count += 1,
                    Some('+') => new_count += 1,
                    _ => {
                        old_count += 1;
                        new_count += 1;
                    }
                }
                body.push(text);
            }
        }

        if changes == 0 {
            return None;
        }

        let mut lines = vec![format!(
            "@@ -{},{} +{},{} @@{}",
            self.old_start, old_count, self.new_start, new_count, self.section
        )];
        lines.extend(body);
        Some(lines)
    }
}

/// Parse `@@ -a[,b] +c[,d] @@ section`.
fn parse_hunk_header(line: &str) -> Option<(u32, u32, String)> {
    let rest = line.strip_prefix("@@ -")?;
    let (ranges, section) = rest.split_once(" @@")?;
    let (old, new) = ranges.split_once(" +")?;
    let old_start = old.split(',').next()?.parse().ok()?;
    let new_start = new.split(',').next()?.parse().ok()?;
    Some((old_start, new_start, section.to_string()))
}
