//! Byte offset to line/column conversion.

use std::ops::Range;

/// A 0-indexed line and column. The column counts bytes from the line start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineCol {
    /// 0-indexed line number.
    pub line: u32,
    /// 0-indexed byte column within the line.
    pub col: u32,
}

impl LineCol {
    /// Creates a new line/column position.
    #[inline]
    pub fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

/// Line start table for a source string.
///
/// Lookups are a binary search over the start offsets, so building the index
/// once and querying it repeatedly is cheap.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// `line_starts[i]` is the byte offset where line `i` begins.
    line_starts: Vec<usize>,
    /// Total length of the indexed text.
    len: usize,
}

impl LineIndex {
    /// Indexes `text`. Only `\n` terminates a line; a preceding `\r` stays part
    /// of the line content.
    pub fn new(text: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(offset, _)| offset + 1))
            .collect();

        Self {
            line_starts,
            len: text.len(),
        }
    }

    /// Returns the number of lines. An empty text has one empty line.
    #[inline]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Converts a byte offset to a line/column position.
    ///
    /// Offsets past the end of the text clamp to the end.
    pub fn line_col(&self, offset: usize) -> LineCol {
        let offset = offset.min(self.len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };

        LineCol {
            line: line as u32,
            col: (offset - self.line_starts[line]) as u32,
        }
    }

    /// Converts a line/column position back to a byte offset.
    pub fn offset(&self, position: LineCol) -> Option<usize> {
        let start = *self.line_starts.get(position.line as usize)?;
        let offset = start + position.col as usize;
        (offset <= self.len).then_some(offset)
    }

    /// The byte range of `line`, excluding its terminating newline.
    pub fn line_range(&self, line: u32) -> Option<Range<usize>> {
        let line = line as usize;
        let start = *self.line_starts.get(line)?;
        let end = self
            .line_starts
            .get(line + 1)
            .map(|next| next - 1)
            .unwrap_or(self.len);
        Some(start..end)
    }
}
