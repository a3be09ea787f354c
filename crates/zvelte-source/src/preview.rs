//! Code-frame rendering for diagnostics.

use crate::{LineCol, LineIndex};

/// Number of lines shown above the offending line.
const CONTEXT_LINES: u32 = 2;

/// A rendered excerpt of the source with carets under a span.
///
/// ```text
/// 1 | <div>
/// 2 |   </span>
///   |   ^^^^^^^
/// ```
#[derive(Debug, Clone)]
pub struct CodeFrame<'a> {
    source: &'a str,
    index: &'a LineIndex,
}

impl<'a> CodeFrame<'a> {
    /// Creates a frame renderer over an already indexed source.
    pub fn new(source: &'a str, index: &'a LineIndex) -> Self {
        Self { source, index }
    }

    /// Renders the frame for the byte range `[start, end)`.
    ///
    /// Carets cover the part of the range on its first line, and at least one
    /// column so zero-width spans stay visible.
    pub fn render(&self, start: usize, end: usize) -> String {
        let from = self.index.line_col(start);
        let to = self.index.line_col(end.max(start));
        let first = from.line.saturating_sub(CONTEXT_LINES);
        let width = (from.line + 1).to_string().len();

        let mut out = Vec::new();
        for line in first..=from.line {
            let text = self.line_text(line);
            out.push(format!("{:>width$} | {}", line + 1, text).trim_end().to_string());
        }

        let text = self.line_text(from.line);
        let marker = self.marker(text, from, to);
        out.push(format!("{:>width$} | {}", "", marker));

        out.join("\n")
    }

    fn line_text(&self, line: u32) -> &'a str {
        self.index
            .line_range(line)
            .map(|range| self.source[range].trim_end_matches('\r'))
            .unwrap_or("")
    }

    fn marker(&self, text: &str, from: LineCol, to: LineCol) -> String {
        let col = (from.col as usize).min(text.len());
        let end_col = if to.line == from.line {
            (to.col as usize).clamp(col, text.len())
        } else {
            text.len()
        };

        let padding: String = text
            .get(..col)
            .unwrap_or("")
            .chars()
            .map(|c| if c == '\t' { '\t' } else { ' ' })
            .collect();
        let carets = text.get(col..end_col).map_or(0, |s| s.chars().count()).max(1);

        format!("{padding}{}", "^".repeat(carets))
    }
}
