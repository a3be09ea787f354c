//! Byte spans over a template source.

use text_size::{TextRange, TextSize};

/// A byte offset into a source string.
pub type ByteOffset = TextSize;

/// The longest source, in bytes, whose offsets fit in a [`ByteOffset`].
pub const MAX_SOURCE_LEN: usize = u32::MAX as usize;

/// A half-open byte range `[start, end)` into the original source.
///
/// Every AST node and fragment carries one. Offsets are bytes, not characters,
/// so they can index the source string directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    /// The start byte offset (inclusive).
    pub start: ByteOffset,
    /// The end byte offset (exclusive).
    pub end: ByteOffset,
}

impl Span {
    /// Creates a span from start and end offsets.
    #[inline]
    pub fn new(start: impl Into<ByteOffset>, end: impl Into<ByteOffset>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Creates a span from `usize` cursor positions.
    ///
    /// Offsets past [`MAX_SOURCE_LEN`] saturate to it. Callers reject longer
    /// sources before building spans over them.
    #[inline]
    pub fn from_offsets(start: usize, end: usize) -> Self {
        Self::new(to_offset(start), to_offset(end))
    }

    /// Creates a zero-width span at `offset`.
    #[inline]
    pub fn point(offset: usize) -> Self {
        Self::from_offsets(offset, offset)
    }

    /// The start offset as a `usize`, suitable for slicing.
    #[inline]
    pub fn start_offset(&self) -> usize {
        u32::from(self.start) as usize
    }

    /// The end offset as a `usize`, suitable for slicing.
    #[inline]
    pub fn end_offset(&self) -> usize {
        u32::from(self.end) as usize
    }

    /// Returns the length of this span in bytes.
    #[inline]
    pub fn len(&self) -> TextSize {
        self.end - self.start
    }

    /// Returns true if this span is zero-width.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns a copy of this span ending at `end`.
    #[inline]
    pub fn with_end(self, end: usize) -> Self {
        Self {
            start: self.start,
            end: to_offset(end),
        }
    }

    /// Returns true if `other` lies entirely within this span.
    ///
    /// A zero-width span sitting on either boundary counts as contained.
    #[inline]
    pub fn contains_span(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Returns the smallest span covering both spans.
    #[inline]
    pub fn cover(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Slices the spanned text out of `source`.
    #[inline]
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start_offset()..self.end_offset()]
    }
}

#[inline]
fn to_offset(offset: usize) -> ByteOffset {
    TextSize::try_from(offset).unwrap_or(TextSize::from(u32::MAX))
}

impl From<TextRange> for Span {
    fn from(range: TextRange) -> Self {
        Self::new(range.start(), range.end())
    }
}

impl From<Span> for TextRange {
    fn from(span: Span) -> Self {
        TextRange::new(span.start, span.end)
    }
}
