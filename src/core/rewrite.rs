//! Batch byte-range replacement.
//!
//! Edits are applied from the end of the file backwards, so splicing one
//! edit never shifts the offsets of the edits still to be applied.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Edit {
    pub start: usize,
    pub end: usize,
    pub replacement: String,
}

impl Edit {
    pub fn new(start: usize, end: usize, replacement: impl Into<String>) -> Self {
        Self {
            start,
            end,
            replacement: replacement.into(),
        }
    }

    /// A pure insertion.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Caller errors: a batch that violates these is never partially applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewriteError {
    #[error("edit {start}..{end} has its end before its start")]
    InvertedRange { start: usize, end: usize },
    #[error("edit {start}..{end} is out of bounds for content of length {len}")]
    OutOfBounds { start: usize, end: usize, len: usize },
    #[error("edit {start}..{end} does not fall on a character boundary")]
    NotCharBoundary { start: usize, end: usize },
    #[error("edits {first_start}..{first_end} and {second_start}..{second_end} overlap")]
    Overlap {
        first_start: usize,
        first_end: usize,
        second_start: usize,
        second_end: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteResult {
    pub content: String,
    /// The applied edits, sorted by start ascending.
    pub edits: Vec<Edit>,
}

/// Applies non-overlapping edits to `content`.
///
/// The result does not depend on the order of `edits`. Two insertions at
/// the same offset are ambiguous and reported as an overlap.
pub fn apply_edits(content: &str, mut edits: Vec<Edit>) -> Result<RewriteResult, RewriteError> {
    for edit in &edits {
        validate(content, edit)?;
    }

    edits.sort();
    for pair in edits.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        // An insertion at the start of another edit has no defined order.
        if b.start < a.end || (a.start == b.start && (a.is_empty() || b.is_empty())) {
            return Err(RewriteError::Overlap {
                first_start: a.start,
                first_end: a.end,
                second_start: b.start,
                second_end: b.end,
            });
        }
    }

    let mut output = content.to_string();
    for edit in edits.iter().rev() {
        output.replace_range(edit.start..edit.end, &edit.replacement);
    }

    Ok(RewriteResult {
        content: output,
        edits,
    })
}

fn validate(content: &str, edit: &Edit) -> Result<(), RewriteError> {
    let Edit { start, end, .. } = *edit;
    if end < start {
        return Err(RewriteError::InvertedRange { start, end });
    }
    if end > content.len() {
        return Err(RewriteError::OutOfBounds {
            start,
            end,
            len: content.len(),
        });
    }
    if !content.is_char_boundary(start) || !content.is_char_boundary(end) {
        return Err(RewriteError::NotCharBoundary { start, end });
    }
    Ok(())
}
