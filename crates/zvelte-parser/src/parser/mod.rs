//! Single-pass recursive descent parser for zvelte templates.
//!
//! There is no token stream. The dispatcher looks at the next characters and
//! hands off to the element, tag or text reader, which consume directly from
//! the [`Cursor`]. Open elements and blocks live on an explicit stack of
//! [`Frame`]s; when one closes it is finished into a [`Node`] and moved into the
//! active fragment of the frame below it.

mod element;
mod expression;
mod script;
mod tag;

use zvelte_source::{LineCol, Span, MAX_SOURCE_LEN};

use crate::ast::*;
use crate::cursor::Cursor;
use crate::error::{ParseError, ParseErrorKind};
use crate::ParseOptions;

use element::OpenElement;
use tag::{OpenAwait, OpenFor, OpenIf, OpenKey, OpenSnippet};

/// An element or block whose closing construct has not been reached yet.
#[derive(Debug)]
enum OpenNode {
    Element(OpenElement),
    If(OpenIf),
    For(OpenFor),
    Snippet(OpenSnippet),
    Key(OpenKey),
    Await(OpenAwait),
}

impl OpenNode {
    fn start(&self) -> usize {
        match self {
            OpenNode::Element(node) => node.start,
            OpenNode::If(node) => node.start,
            OpenNode::For(node) => node.start,
            OpenNode::Snippet(node) => node.start,
            OpenNode::Key(node) => node.start,
            OpenNode::Await(node) => node.start,
        }
    }

    /// The keyword whose `end` form closes this block; `None` for elements.
    fn keyword(&self) -> Option<&'static str> {
        match self {
            OpenNode::Element(_) => None,
            OpenNode::If(_) => Some("if"),
            OpenNode::For(_) => Some("for"),
            OpenNode::Snippet(_) => Some("snippet"),
            OpenNode::Key(_) => Some("key"),
            OpenNode::Await(_) => Some("await"),
        }
    }
}

/// An open node together with the fragment its children are appended to.
#[derive(Debug)]
struct Frame {
    node: OpenNode,
    fragment: Fragment,
}

/// The zvelte parser.
///
/// Single use: construct, call [`Parser::parse`], drop.
pub struct Parser<'src> {
    cursor: Cursor<'src>,
    options: ParseOptions,
    /// Children of the document.
    root: Fragment,
    /// Open elements and blocks, innermost last.
    stack: Vec<Frame>,
    css: Option<StyleSheet>,
    js: Option<Script>,
    imports: Vec<Import>,
    /// Current expression recursion depth.
    depth: usize,
}

impl<'src> Parser<'src> {
    /// Creates a parser over `source`.
    pub fn new(source: &'src str, options: ParseOptions) -> Self {
        Self {
            cursor: Cursor::new(source),
            options,
            root: Fragment::new(false, 0),
            stack: Vec::new(),
            css: None,
            js: None,
            imports: Vec::new(),
            depth: 0,
        }
    }

    /// Parses the whole source, stopping at the first error.
    ///
    /// Sources longer than [`MAX_SOURCE_LEN`] bytes are rejected up front.
    pub fn parse(mut self) -> Result<Root, ParseError> {
        check_source_len(self.cursor.source().len())?;

        while !self.cursor.is_eof() {
            self.parse_next()?;
        }

        if let Some(frame) = self.stack.last() {
            return Err(self.unclosed(&frame.node));
        }

        let end = self.cursor.position();
        self.root.span = Span::from_offsets(0, end);

        Ok(Root {
            span: Span::from_offsets(0, end),
            css: self.css,
            js: self.js,
            imports: self.imports,
            fragment: self.root,
        })
    }

    /// Parses one construct at the cursor.
    fn parse_next(&mut self) -> Result<(), ParseError> {
        if self.cursor.matches("<") {
            self.element()
        } else if self.cursor.matches("{{") || self.cursor.matches("{%") {
            self.tag()
        } else {
            self.text();
            Ok(())
        }
    }

    /// Reads text up to the next markup or tag opener.
    fn text(&mut self) {
        let start = self.cursor.position();
        let data = self.cursor.read_until_any(&["<", "{{", "{%"]);
        let end = self.cursor.position();

        self.append(Node::Text(Text {
            span: Span::from_offsets(start, end),
            data: data.to_string(),
        }));
    }

    // === Frame stack ===

    /// The fragment new nodes are appended to.
    fn fragment_mut(&mut self) -> &mut Fragment {
        match self.stack.last_mut() {
            Some(frame) => &mut frame.fragment,
            None => &mut self.root,
        }
    }

    fn append(&mut self, node: Node) {
        self.fragment_mut().nodes.push(node);
    }

    /// True when no element or block is open.
    fn at_root(&self) -> bool {
        self.stack.is_empty()
    }

    fn push(&mut self, node: OpenNode, fragment: Fragment) -> Result<(), ParseError> {
        if self.stack.len() >= self.options.max_depth {
            return Err(self.cursor.error(
                ParseErrorKind::NestingTooDeep {
                    max_depth: self.options.max_depth,
                },
                node.start(),
                self.cursor.position(),
            ));
        }
        self.stack.push(Frame { node, fragment });
        Ok(())
    }

    /// Error for a frame still open at end of input.
    fn unclosed(&self, node: &OpenNode) -> ParseError {
        let start = node.start();
        match node {
            OpenNode::Element(element) => self.cursor.error(
                ParseErrorKind::UnclosedElement {
                    name: element.name.to_string(),
                },
                start,
                start + 1 + element.name.len(),
            ),
            _ => self.cursor.error(
                ParseErrorKind::UnclosedBlock {
                    keyword: node.keyword().unwrap_or_default().to_string(),
                },
                start,
                start + 2,
            ),
        }
    }

    // === Shared readers ===

    /// Reads an identifier into an AST node.
    fn identifier(&mut self) -> Result<Identifier, ParseError> {
        expression::read_identifier(&mut self.cursor)
    }

    /// Reads `{{ expression }}` at the cursor.
    fn expression_tag(&mut self) -> Result<ExpressionTag, ParseError> {
        let start = self.cursor.position();
        self.cursor.expect("{{")?;
        self.cursor.allow_whitespace();
        let expression = self.expression()?;
        self.cursor.allow_whitespace();
        self.cursor.expect("}}")?;

        Ok(ExpressionTag {
            span: Span::from_offsets(start, self.cursor.position()),
            expression,
        })
    }

    fn special_tag(&self) -> &str {
        &self.options.special_tag
    }
}

/// Byte offsets are `u32`, so longer sources can't be spanned.
fn check_source_len(len: usize) -> Result<(), ParseError> {
    if len <= MAX_SOURCE_LEN {
        return Ok(());
    }

    Err(ParseError {
        kind: ParseErrorKind::SourceTooLarge {
            len,
            max_len: MAX_SOURCE_LEN,
        },
        span: Span::point(0),
        start: LineCol::new(0, 0),
        end: LineCol::new(0, 0),
        preview: String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> Result<Root, ParseError> {
        Parser::new(source, ParseOptions::default()).parse()
    }

    #[test]
    fn test_parse_empty() {
        let root = parse("").unwrap();
        assert!(root.fragment.is_empty());
        assert_eq!(root.fragment.span, Span::point(0));
        assert!(!root.fragment.transparent);
    }

    #[test]
    fn test_parse_text() {
        let root = parse("hello world").unwrap();
        let [Node::Text(text)] = root.fragment.nodes.as_slice() else {
            panic!("expected one text node, got {:?}", root.fragment.nodes);
        };
        assert_eq!(text.data, "hello world");
        assert_eq!(text.span, Span::from_offsets(0, 11));
        assert_eq!(root.span, Span::from_offsets(0, 11));
    }

    #[test]
    fn test_text_around_tags() {
        let root = parse("a {{ b }} c").unwrap();
        let kinds: Vec<_> = root
            .fragment
            .nodes
            .iter()
            .map(|node| match node {
                Node::Text(text) => text.data.clone(),
                Node::ExpressionTag(_) => "{{}}".to_string(),
                other => panic!("unexpected node {other:?}"),
            })
            .collect();
        assert_eq!(kinds, vec!["a ", "{{}}", " c"]);
    }

    #[test]
    fn test_lone_brace_is_text() {
        let root = parse("a { b } c").unwrap();
        assert_eq!(root.fragment.nodes.len(), 1);
    }

    #[test]
    fn test_text_around_hoisted_style() {
        let root = parse("a<style>p {}</style>b").unwrap();
        let texts: Vec<_> = root
            .fragment
            .nodes
            .iter()
            .map(|node| match node {
                Node::Text(text) => (text.data.as_str(), text.span),
                other => panic!("unexpected node {other:?}"),
            })
            .collect();
        assert_eq!(
            texts,
            vec![("a", Span::from_offsets(0, 1)), ("b", Span::from_offsets(20, 21))]
        );
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_source_length_limit() {
        assert!(check_source_len(MAX_SOURCE_LEN).is_ok());

        let err = check_source_len(MAX_SOURCE_LEN + 1).unwrap_err();
        assert_eq!(
            err.kind,
            ParseErrorKind::SourceTooLarge {
                len: MAX_SOURCE_LEN + 1,
                max_len: MAX_SOURCE_LEN,
            }
        );
        assert_eq!(err.span, Span::point(0));
    }

    #[test]
    fn test_unclosed_element() {
        let err = parse("<div><p>text").unwrap_err();
        assert_eq!(
            err.kind,
            ParseErrorKind::UnclosedElement {
                name: "p".to_string()
            }
        );
        assert_eq!(err.span, Span::from_offsets(5, 7));
    }

    #[test]
    fn test_unclosed_block() {
        let err = parse("{% if a %}text").unwrap_err();
        assert_eq!(
            err.kind,
            ParseErrorKind::UnclosedBlock {
                keyword: "if".to_string()
            }
        );
    }

    #[test]
    fn test_nesting_limit() {
        let options = ParseOptions {
            max_depth: 3,
            ..ParseOptions::default()
        };
        let ok = Parser::new("<a><b><c></c></b></a>", options.clone()).parse();
        assert!(ok.is_ok());

        let err = Parser::new("<a><b><c><d></d></c></b></a>", options)
            .parse()
            .unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::NestingTooDeep { max_depth: 3 });
    }
}
