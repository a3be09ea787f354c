//! The root `<script>` block and its `import` statements.
//!
//! The script body itself stays raw. Only statements that start a line with the
//! `import` keyword are read, so the scanner never has to understand the rest of
//! the language.

use zvelte_source::Span;

use super::expression::{read_identifier, read_string};
use super::Parser;
use crate::ast::*;
use crate::cursor::Cursor;
use crate::error::{ParseError, ParseErrorKind};

impl<'src> Parser<'src> {
    /// Stores a root-level `<script>` as `root.js` and collects its imports.
    pub(super) fn script(
        &mut self,
        start: usize,
        attributes: Vec<Attribute>,
        self_closing: bool,
    ) -> Result<(), ParseError> {
        if self.js.is_some() {
            return Err(self.duplicate_element("script", start));
        }

        let (content, content_span) = self.raw_body("script", self_closing)?;
        self.imports = ImportReader::new(self.cursor.source(), content_span).read_all()?;
        self.js = Some(Script {
            span: Span::from_offsets(start, self.cursor.position()),
            attributes,
            content,
            content_span,
        });
        Ok(())
    }
}

/// Scans a script body for `import` declarations.
struct ImportReader<'src> {
    /// Limited to the script body; positions stay absolute.
    cursor: Cursor<'src>,
    /// The whole template, for error previews.
    source: &'src str,
}

impl<'src> ImportReader<'src> {
    fn new(source: &'src str, body: Span) -> Self {
        Self {
            cursor: Cursor::at(&source[..body.end_offset()], body.start_offset()),
            source,
        }
    }

    fn read_all(mut self) -> Result<Vec<Import>, ParseError> {
        let mut imports = Vec::new();

        loop {
            self.cursor.allow_whitespace();
            if self.cursor.is_eof() {
                return Ok(imports);
            }

            if self.cursor.eat("//") {
                self.cursor.read_until("\n");
            } else if self.cursor.eat("/*") {
                self.cursor.read_until("*/");
                self.cursor.eat("*/");
            } else if self.at_import() {
                imports.push(self.import()?);
            } else {
                self.cursor.read_until("\n");
            }
        }
    }

    /// `import` as a statement keyword, not `import(...)` or `import.meta`.
    fn at_import(&self) -> bool {
        if self.cursor.peek_word() != Some("import") {
            return false;
        }
        let after = self.cursor.rest()["import".len()..].trim_start();
        !after.starts_with('(') && !after.starts_with('.')
    }

    fn import(&mut self) -> Result<Import, ParseError> {
        let start = self.cursor.position();
        self.cursor.eat_word("import");
        self.cursor.allow_whitespace();

        let mut specifiers = Vec::new();
        if !matches!(self.cursor.peek(), Some('"' | '\'')) {
            self.specifiers(start, &mut specifiers)?;
            self.cursor.allow_whitespace();
            if !self.cursor.eat_word("from") {
                return Err(self.invalid("expected `from`", start));
            }
            self.cursor.allow_whitespace();
        }

        let source = read_string(&mut self.cursor)
            .map_err(|_| self.invalid("expected a module path string", start))?;

        let end = self.cursor.position();
        self.cursor.allow_whitespace();
        let end = if self.cursor.eat(";") {
            self.cursor.position()
        } else {
            self.cursor.reset(end);
            end
        };

        Ok(Import {
            span: Span::from_offsets(start, end),
            specifiers,
            source,
        })
    }

    /// `Default`, `* as ns`, `{ a, b as c }`, or a default followed by one of
    /// the other two.
    fn specifiers(
        &mut self,
        start: usize,
        specifiers: &mut Vec<ImportSpecifier>,
    ) -> Result<(), ParseError> {
        if !matches!(self.cursor.peek(), Some('*' | '{')) {
            let local = self.identifier(start)?;
            specifiers.push(ImportSpecifier::Default { local });

            let before = self.cursor.position();
            self.cursor.allow_whitespace();
            if !self.cursor.eat(",") {
                self.cursor.reset(before);
                return Ok(());
            }
            self.cursor.allow_whitespace();
        }

        if self.cursor.eat("*") {
            self.cursor.allow_whitespace();
            if !self.cursor.eat_word("as") {
                return Err(self.invalid("expected `as` after `*`", start));
            }
            self.cursor.allow_whitespace();
            let local = self.identifier(start)?;
            specifiers.push(ImportSpecifier::Namespace { local });
            return Ok(());
        }

        if !self.cursor.eat("{") {
            return Err(self.invalid("expected `{` or `*`", start));
        }

        loop {
            self.cursor.allow_whitespace();
            if self.cursor.eat("}") {
                return Ok(());
            }

            let imported = self.identifier(start)?;
            self.cursor.allow_whitespace();
            let local = if self.cursor.eat_word("as") {
                self.cursor.allow_whitespace();
                self.identifier(start)?
            } else {
                imported.clone()
            };
            specifiers.push(ImportSpecifier::Named { imported, local });

            self.cursor.allow_whitespace();
            if !self.cursor.eat(",") {
                if self.cursor.eat("}") {
                    return Ok(());
                }
                return Err(self.invalid("expected `,` or `}`", start));
            }
        }
    }

    fn identifier(&mut self, start: usize) -> Result<Identifier, ParseError> {
        read_identifier(&mut self.cursor).map_err(|_| self.invalid("expected an identifier", start))
    }

    fn invalid(&self, message: &str, start: usize) -> ParseError {
        let end = self.cursor.position().max(start + "import".len());
        ParseError::new(
            ParseErrorKind::InvalidImport {
                message: message.to_string(),
            },
            self.source,
            start,
            end,
        )
    }
}
