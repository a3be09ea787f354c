//! Character-stream cursor over the template source.

use logos::Logos;

use crate::error::{ParseError, ParseErrorKind};
use crate::lexer::{self, Identifier};

/// A byte position in a source string plus the primitive reads the parser is
/// built from.
///
/// The cursor never tokenizes ahead: every read inspects the text at the
/// current position and either consumes it or leaves the position untouched.
#[derive(Debug, Clone)]
pub(crate) struct Cursor<'src> {
    source: &'src str,
    position: usize,
}

impl<'src> Cursor<'src> {
    pub(crate) fn new(source: &'src str) -> Self {
        Self {
            source,
            position: 0,
        }
    }

    /// Starts a cursor at `position` inside `source`.
    pub(crate) fn at(source: &'src str, position: usize) -> Self {
        Self {
            source,
            position: position.min(source.len()),
        }
    }

    #[inline]
    pub(crate) fn source(&self) -> &'src str {
        self.source
    }

    #[inline]
    pub(crate) fn position(&self) -> usize {
        self.position
    }

    /// Moves back to a position returned by [`Cursor::position`].
    #[inline]
    pub(crate) fn reset(&mut self, position: usize) {
        self.position = position;
    }

    #[inline]
    pub(crate) fn is_eof(&self) -> bool {
        self.position >= self.source.len()
    }

    #[inline]
    pub(crate) fn rest(&self) -> &'src str {
        &self.source[self.position..]
    }

    #[inline]
    pub(crate) fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Consumes one character.
    pub(crate) fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position += c.len_utf8();
        Some(c)
    }

    /// Returns true if the input continues with `s`.
    #[inline]
    pub(crate) fn matches(&self, s: &str) -> bool {
        self.rest().starts_with(s)
    }

    /// Consumes `s` if the input continues with it.
    pub(crate) fn eat(&mut self, s: &str) -> bool {
        if self.matches(s) {
            self.position += s.len();
            true
        } else {
            false
        }
    }

    /// Consumes `s` or fails.
    pub(crate) fn expect(&mut self, s: &str) -> Result<(), ParseError> {
        if self.eat(s) {
            Ok(())
        } else {
            Err(self.expected(format!("`{s}`")))
        }
    }

    /// Consumes and returns the `T` token at the current position.
    pub(crate) fn read<T>(&mut self) -> Option<&'src str>
    where
        T: Logos<'src, Source = str>,
        T::Extras: Default,
    {
        let start = self.position;
        let len = lexer::anchored_len::<T>(&self.source[start..])?;
        self.position += len;
        Some(&self.source[start..self.position])
    }

    /// Consumes text up to, but excluding, the next occurrence of `s`, or the
    /// rest of the input if `s` never occurs.
    pub(crate) fn read_until(&mut self, s: &str) -> &'src str {
        self.read_until_any(&[s])
    }

    /// Like [`Cursor::read_until`], stopping at the earliest of several needles.
    pub(crate) fn read_until_any(&mut self, needles: &[&str]) -> &'src str {
        let start = self.position;
        let rest = self.rest();
        let len = needles
            .iter()
            .filter_map(|needle| rest.find(needle))
            .min()
            .unwrap_or(rest.len());
        self.position += len;
        &self.source[start..self.position]
    }

    /// Skips any whitespace.
    pub(crate) fn allow_whitespace(&mut self) {
        let rest = self.rest();
        self.position += rest.len() - rest.trim_start().len();
    }

    /// Skips whitespace, failing if there is none.
    pub(crate) fn require_whitespace(&mut self) -> Result<(), ParseError> {
        if !self.peek().is_some_and(char::is_whitespace) {
            return Err(self.expected("whitespace"));
        }
        self.allow_whitespace();
        Ok(())
    }

    /// Returns the identifier at the current position without consuming it.
    pub(crate) fn peek_word(&self) -> Option<&'src str> {
        let rest = self.rest();
        lexer::anchored_len::<Identifier>(rest).map(|len| &rest[..len])
    }

    /// Consumes `word` if it is the whole identifier at the current position, so
    /// `in` does not match the start of `index`.
    pub(crate) fn eat_word(&mut self, word: &str) -> bool {
        if self.peek_word() == Some(word) {
            self.position += word.len();
            true
        } else {
            false
        }
    }

    /// Builds an error for `[start, end)`.
    pub(crate) fn error(&self, kind: ParseErrorKind, start: usize, end: usize) -> ParseError {
        ParseError::new(kind, self.source, start, end)
    }

    /// Builds an error spanning from `start` to the current position.
    pub(crate) fn error_from(&self, kind: ParseErrorKind, start: usize) -> ParseError {
        self.error(kind, start, self.position)
    }

    /// "expected X" at the current position, or an end-of-input error.
    pub(crate) fn expected(&self, expected: impl Into<String>) -> ParseError {
        let expected = expected.into();
        let start = self.position;
        match self.peek() {
            None => self.error(ParseErrorKind::UnexpectedEof { expected }, start, start),
            Some(c) => self.error(
                ParseErrorKind::Expected { expected },
                start,
                start + c.len_utf8(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::TagName;

    #[test]
    fn test_eat_and_matches() {
        let mut cursor = Cursor::new("{{ name }}");
        assert!(cursor.matches("{{"));
        assert!(!cursor.eat("{%"));
        assert!(cursor.eat("{{"));
        assert_eq!(cursor.position(), 2);
    }

    #[test]
    fn test_expect_reports_found_character() {
        let mut cursor = Cursor::new("<div");
        cursor.reset(4);
        let err = cursor.expect(">").unwrap_err();
        assert_eq!(
            err.kind,
            ParseErrorKind::UnexpectedEof {
                expected: "`>`".to_string()
            }
        );

        let mut cursor = Cursor::new("x");
        let err = cursor.expect("}}").unwrap_err();
        assert_eq!(err.to_string(), "expected `}}`");
        assert_eq!(err.span.end_offset(), 1);
    }

    #[test]
    fn test_read_is_anchored() {
        let mut cursor = Cursor::new("  div");
        assert_eq!(cursor.read::<TagName>(), None);
        assert_eq!(cursor.position(), 0);
        cursor.allow_whitespace();
        assert_eq!(cursor.read::<TagName>(), Some("div"));
        assert!(cursor.is_eof());
    }

    #[test]
    fn test_read_until() {
        let mut cursor = Cursor::new("hello {{ x }}");
        assert_eq!(cursor.read_until_any(&["<", "{{", "{%"]), "hello ");
        assert!(cursor.matches("{{"));

        let mut cursor = Cursor::new("no end");
        assert_eq!(cursor.read_until("-->"), "no end");
        assert!(cursor.is_eof());
    }

    #[test]
    fn test_require_whitespace() {
        let mut cursor = Cursor::new("not x");
        assert!(cursor.eat_word("not"));
        assert!(cursor.require_whitespace().is_ok());
        assert_eq!(cursor.peek(), Some('x'));
        assert!(cursor.require_whitespace().is_err());
    }

    #[test]
    fn test_eat_word_is_whole_word() {
        let mut cursor = Cursor::new("index in items");
        assert!(!cursor.eat_word("in"));
        assert!(cursor.eat_word("index"));
    }
}
