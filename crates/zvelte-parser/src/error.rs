//! Parse error types.

use thiserror::Error;
use zvelte_source::{CodeFrame, LineCol, LineIndex, Span};

/// An error that stopped the parse.
///
/// Parsing is fail-fast: the first violation is returned and no partial tree
/// is produced.
#[derive(Debug, Clone, Error)]
#[error("{kind}")]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// The offending byte range.
    pub span: Span,
    /// Line and column of `span.start`.
    pub start: LineCol,
    /// Line and column of `span.end`.
    pub end: LineCol,
    /// The surrounding source lines with carets under the span.
    pub preview: String,
}

impl ParseError {
    /// Creates an error for `[start, end)` in `source`, resolving positions and
    /// rendering the preview.
    pub fn new(kind: ParseErrorKind, source: &str, start: usize, end: usize) -> Self {
        let end = end.max(start).min(source.len());
        let start = start.min(end);
        let index = LineIndex::new(source);

        Self {
            kind,
            span: Span::from_offsets(start, end),
            start: index.line_col(start),
            end: index.line_col(end),
            preview: CodeFrame::new(source, &index).render(start, end),
        }
    }
}

/// The kind of parse error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseErrorKind {
    /// The input ended in the middle of a construct.
    #[error("unexpected end of input: expected {expected}")]
    UnexpectedEof {
        /// What was expected.
        expected: String,
    },

    /// Some required text was not found.
    #[error("expected {expected}")]
    Expected {
        /// What was expected.
        expected: String,
    },

    /// The tag name is not a valid element name.
    #[error("invalid tag name")]
    InvalidTagName,

    /// `<{special}:{kind}>` with an unknown kind.
    #[error("unknown meta tag kind `{kind}`, expected component, self or head")]
    UnknownMetaTag {
        /// The suffix after the colon.
        kind: String,
    },

    /// A namespaced tag name that isn't the special tag.
    #[error("invalid tag name `{name}`, only `{special}:` names may contain a colon")]
    InvalidNamespace {
        /// The full tag name.
        name: String,
        /// The configured special tag.
        special: String,
    },

    /// `</name>` without a matching open element.
    #[error("`</{name}>` attempted to close an element that was not open")]
    UnmatchedClosingTag {
        /// The closing tag's name.
        name: String,
    },

    /// An element still open at end of input.
    #[error("`<{name}>` was left open")]
    UnclosedElement {
        /// The element's name.
        name: String,
    },

    /// A block still open at end of input.
    #[error("`{{% {keyword} %}}` block was left open")]
    UnclosedBlock {
        /// The keyword that opened the block.
        keyword: String,
    },

    /// `{% word %}` with an unrecognised keyword.
    #[error("unknown block `{keyword}`")]
    UnknownBlock {
        /// The keyword found.
        keyword: String,
    },

    /// `{{ @word }}` with an unrecognised tag keyword.
    #[error("unknown tag `@{keyword}`, expected @html or @render")]
    UnknownTag {
        /// The keyword found after `@`.
        keyword: String,
    },

    /// A continuation (`else`, `then`, ...) that doesn't belong to the open block.
    #[error("`{{% {keyword} %}}` is not valid in this position")]
    InvalidBlockPosition {
        /// The continuation keyword.
        keyword: String,
    },

    /// An `end*` closer that doesn't match the open block.
    #[error("`{{% {found} %}}` does not close the current block{}", expected_closer(.expected))]
    UnexpectedBlockClose {
        /// The closer found.
        found: String,
        /// The closer the open block needs, if a block is open.
        expected: Option<String>,
    },

    /// An expression that is malformed or of the wrong kind.
    #[error("invalid expression: {message}")]
    InvalidExpression {
        /// A description of the problem.
        message: String,
    },

    /// A repeated attribute or binding.
    #[error("duplicate attribute `{name}`")]
    DuplicateAttribute {
        /// The repeated name.
        name: String,
    },

    /// A directive that is malformed or not allowed here.
    #[error("invalid directive: {message}")]
    InvalidDirective {
        /// A description of the problem.
        message: String,
    },

    /// An attribute that is malformed or not allowed here.
    #[error("invalid attribute: {message}")]
    InvalidAttribute {
        /// A description of the problem.
        message: String,
    },

    /// A second `<style>` or root-level `<script>`.
    #[error("a document can only contain one `<{name}>` element")]
    DuplicateElement {
        /// `style` or `script`.
        name: String,
    },

    /// A required attribute is absent.
    #[error("`{attribute}` is required on `<{element}>`")]
    MissingAttribute {
        /// The element's name.
        element: String,
        /// The missing attribute.
        attribute: String,
    },

    /// Malformed `import` syntax inside the root script.
    #[error("invalid import: {message}")]
    InvalidImport {
        /// A description of the problem.
        message: String,
    },

    /// The template has more bytes than spans can address.
    #[error("template is {len} bytes, larger than the limit of {max_len}")]
    SourceTooLarge {
        /// Length of the template in bytes.
        len: usize,
        /// The largest supported length.
        max_len: usize,
    },

    /// Markup or expression nesting beyond the configured limit.
    #[error("nesting exceeds the maximum depth of {max_depth}")]
    NestingTooDeep {
        /// The configured limit.
        max_depth: usize,
    },
}

fn expected_closer(expected: &Option<String>) -> String {
    match expected {
        Some(closer) => format!(", expected `{{% {closer} %}}`"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_error_display() {
        let error = ParseError::new(
            ParseErrorKind::UnmatchedClosingTag {
                name: "div".to_string(),
            },
            "</div>",
            0,
            6,
        );
        assert_eq!(
            error.to_string(),
            "`</div>` attempted to close an element that was not open"
        );
    }

    #[test]
    fn test_error_positions_and_preview() {
        let source = "<p>\n  {% bogus %}\n</p>";
        let start = source.find("{%").unwrap();
        let error = ParseError::new(
            ParseErrorKind::UnknownBlock {
                keyword: "bogus".to_string(),
            },
            source,
            start,
            start + 11,
        );

        assert_eq!(error.start, LineCol::new(1, 2));
        assert_eq!(error.end, LineCol::new(1, 13));
        assert_eq!(error.preview, "1 | <p>\n2 |   {% bogus %}\n  |   ^^^^^^^^^^^");
    }

    #[test]
    fn test_error_range_is_clamped() {
        let error = ParseError::new(
            ParseErrorKind::UnexpectedEof {
                expected: "`>`".to_string(),
            },
            "<div",
            4,
            99,
        );
        assert_eq!(error.span, Span::point(4));
    }

    #[test]
    fn test_unexpected_block_close_message() {
        let kind = ParseErrorKind::UnexpectedBlockClose {
            found: "endfor".to_string(),
            expected: Some("endif".to_string()),
        };
        assert_eq!(
            kind.to_string(),
            "`{% endfor %}` does not close the current block, expected `{% endif %}`"
        );

        let kind = ParseErrorKind::UnexpectedBlockClose {
            found: "endif".to_string(),
            expected: None,
        };
        assert_eq!(kind.to_string(), "`{% endif %}` does not close the current block");
    }
}
