//! Source positions for the zvelte template parser.
//!
//! Spans are byte ranges into the original template. `LineIndex` turns them
//! into line/column pairs and `CodeFrame` renders the caret previews attached
//! to parse errors.

mod line_index;
mod preview;
mod span;

pub use line_index::{LineCol, LineIndex};
pub use preview::CodeFrame;
pub use span::{ByteOffset, Span, MAX_SOURCE_LEN};
