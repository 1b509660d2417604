//! Byte offset <-> line/column conversion.

use crate::core::candidate::Position;

/// Precomputed line starts for one file's content.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(content: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            content
                .bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self { line_starts }
    }

    /// Converts a byte offset into a 1-based line and 0-based character column.
    pub fn position(&self, content: &str, offset: usize) -> Position {
        let offset = offset.min(content.len());
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        let line_start = self.line_starts[line_idx];
        let column = content
            .get(line_start..offset)
            .map(|prefix| prefix.chars().count())
            .unwrap_or(offset - line_start);
        Position::new(line_idx + 1, column)
    }

    /// Converts a position back into a byte offset, if it lies inside the content.
    pub fn offset(&self, content: &str, position: Position) -> Option<usize> {
        let line_start = *self.line_starts.get(position.line.checked_sub(1)?)?;
        let line_end = self
            .line_starts
            .get(position.line)
            .copied()
            .unwrap_or(content.len());
        let line = content.get(line_start..line_end)?;

        if position.column == 0 {
            return Some(line_start);
        }
        line.char_indices()
            .nth(position.column)
            .map(|(i, _)| line_start + i)
            .or_else(|| (line.chars().count() == position.column).then_some(line_end))
    }

    /// The full text of the 1-based line, without its trailing newline.
    pub fn line_text<'a>(&self, content: &'a str, line: usize) -> &'a str {
        let Some(&start) = line_starts_at(&self.line_starts, line) else {
            return "";
        };
        let end = self
            .line_starts
            .get(line)
            .copied()
            .unwrap_or(content.len());
        content
            .get(start..end)
            .unwrap_or("")
            .trim_end_matches(['\n', '\r'])
    }
}

fn line_starts_at(line_starts: &[usize], line: usize) -> Option<&usize> {
    line_starts.get(line.checked_sub(1)?)
}
