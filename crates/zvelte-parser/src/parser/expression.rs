//! The expression grammar.
//!
//! Loosest to tightest: assignment, conditional, logical, comparison,
//! additive, multiplicative, concatenation, chainable (member access, calls,
//! filters, postfix updates), range, primary. Each tier reads its operands from
//! the next tighter one.

use smol_str::SmolStr;
use zvelte_source::Span;

use super::Parser;
use crate::ast::*;
use crate::cursor::Cursor;
use crate::error::{ParseError, ParseErrorKind};
use crate::lexer::{self, Digits, Identifier as IdentifierToken, Operator};

const RANGE_BOUNDS: &str = "range bounds must be numeric literals";

/// Reads an identifier.
pub(super) fn read_identifier(cursor: &mut Cursor<'_>) -> Result<Identifier, ParseError> {
    let start = cursor.position();
    match cursor.read::<IdentifierToken>() {
        Some(name) => Ok(Identifier {
            span: Span::from_offsets(start, cursor.position()),
            name: SmolStr::new(name),
        }),
        None => Err(cursor.expected("identifier")),
    }
}

/// Reads a single- or double-quoted string literal, resolving escapes.
pub(super) fn read_string(cursor: &mut Cursor<'_>) -> Result<StringLiteral, ParseError> {
    let start = cursor.position();
    let quote = match cursor.bump() {
        Some(quote @ ('"' | '\'')) => quote,
        _ => {
            cursor.reset(start);
            return Err(cursor.expected("string"));
        }
    };

    let mut value = String::new();
    loop {
        match cursor.bump() {
            Some(c) if c == quote => break,
            Some('\\') => match cursor.bump() {
                Some('n') => value.push('\n'),
                Some('t') => value.push('\t'),
                Some('r') => value.push('\r'),
                Some(other) => value.push(other),
                None => return Err(cursor.expected(format!("closing {quote}"))),
            },
            Some(c) => value.push(c),
            None => return Err(cursor.expected(format!("closing {quote}"))),
        }
    }

    let end = cursor.position();
    Ok(StringLiteral {
        span: Span::from_offsets(start, end),
        value,
        raw: cursor.source()[start..end].to_string(),
    })
}

impl<'src> Parser<'src> {
    /// Parses a full expression, assignments included.
    pub(super) fn expression(&mut self) -> Result<Expression, ParseError> {
        self.descend()?;
        let result = self.assignment();
        self.depth -= 1;
        result
    }

    /// Runs `parse` one level deeper.
    fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        self.descend()?;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Enters one more level of expression nesting, failing past
    /// `max_expression_depth`. The caller decrements `depth` when done.
    fn descend(&mut self) -> Result<(), ParseError> {
        let max_depth = self.options.max_expression_depth;
        if self.depth >= max_depth {
            let position = self.cursor.position();
            return Err(self.cursor.error(
                ParseErrorKind::NestingTooDeep { max_depth },
                position,
                position,
            ));
        }
        self.depth += 1;
        Ok(())
    }

    /// The operator at the cursor, without consuming it.
    fn peek_operator(&self) -> Option<Operator> {
        lexer::anchored::<Operator>(self.cursor.rest()).map(|(operator, _)| operator)
    }

    fn eat_operator(&mut self, operator: Operator) {
        self.cursor.reset(self.cursor.position() + operator.len());
    }

    /// Skips whitespace and returns the operator after it, or rewinds and
    /// returns `None` if `accept` rejects it.
    fn next_operator<T>(&mut self, accept: impl Fn(Operator) -> Option<T>) -> Option<T> {
        let before = self.cursor.position();
        self.cursor.allow_whitespace();
        if let Some(operator) = self.peek_operator() {
            if let Some(accepted) = accept(operator) {
                self.eat_operator(operator);
                self.cursor.allow_whitespace();
                return Some(accepted);
            }
        }
        self.cursor.reset(before);
        None
    }

    /// Skips whitespace and consumes `word` if it follows, else rewinds.
    fn next_word(&mut self, word: &str) -> bool {
        let before = self.cursor.position();
        self.cursor.allow_whitespace();
        if self.cursor.eat_word(word) {
            true
        } else {
            self.cursor.reset(before);
            false
        }
    }

    fn invalid(&self, message: impl Into<String>, span: Span) -> ParseError {
        self.cursor.error(
            ParseErrorKind::InvalidExpression {
                message: message.into(),
            },
            span.start_offset(),
            span.end_offset(),
        )
    }

    // === Tiers ===

    fn assignment(&mut self) -> Result<Expression, ParseError> {
        let left = self.conditional()?;

        let Some(operator) = self.next_operator(|operator| match operator {
            Operator::Eq => Some(AssignmentOperator::Assign),
            Operator::PlusEq => Some(AssignmentOperator::AddAssign),
            Operator::MinusEq => Some(AssignmentOperator::SubtractAssign),
            Operator::TildeEq => Some(AssignmentOperator::ConcatAssign),
            Operator::StarEq => Some(AssignmentOperator::MultiplyAssign),
            Operator::SlashEq => Some(AssignmentOperator::DivideAssign),
            _ => None,
        }) else {
            return Ok(left);
        };

        if !left.is_assignable() {
            return Err(self.invalid(
                format!("cannot assign to {}", left.kind_name()),
                left.span(),
            ));
        }

        let right = self.expression()?;
        Ok(Expression::AssignmentExpression(AssignmentExpression {
            span: left.span().cover(right.span()),
            left: Box::new(left),
            operator,
            right: Box::new(right),
        }))
    }

    fn conditional(&mut self) -> Result<Expression, ParseError> {
        let test = self.logical()?;

        if self
            .next_operator(|operator| (operator == Operator::Question).then_some(()))
            .is_none()
        {
            return Ok(test);
        }

        let consequent = self.expression()?;
        self.cursor.allow_whitespace();
        self.cursor.expect(":")?;
        self.cursor.allow_whitespace();
        let alternate = self.expression()?;

        Ok(Expression::ConditionalExpression(ConditionalExpression {
            span: test.span().cover(alternate.span()),
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
        }))
    }

    fn logical(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.comparison()?;

        loop {
            let operator = if self.next_word("or") {
                LogicalOperator::Or
            } else if self.next_word("and") {
                LogicalOperator::And
            } else if let Some(operator) = self.next_operator(|operator| match operator {
                Operator::PipePipe => Some(LogicalOperator::PipePipe),
                Operator::Coalesce => Some(LogicalOperator::Coalesce),
                _ => None,
            }) {
                operator
            } else {
                return Ok(left);
            };

            self.cursor.allow_whitespace();
            let right = self.comparison()?;
            left = Expression::LogicalExpression(LogicalExpression {
                span: left.span().cover(right.span()),
                left: Box::new(left),
                operator,
                right: Box::new(right),
            });
        }
    }

    fn comparison(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.additive()?;

        loop {
            if let Some(operator) = self.next_operator(|operator| match operator {
                Operator::EqEq => Some(BinaryOperator::Equal),
                Operator::NotEq => Some(BinaryOperator::NotEqual),
                Operator::LtEq => Some(BinaryOperator::LessEqual),
                Operator::GtEq => Some(BinaryOperator::GreaterEqual),
                Operator::Lt => Some(BinaryOperator::Less),
                Operator::Gt => Some(BinaryOperator::Greater),
                _ => None,
            }) {
                let right = self.additive()?;
                left = binary(left, operator, right);
                continue;
            }

            if self.next_word("is") {
                self.cursor.require_whitespace()?;
                let not = self.cursor.eat_word("not");
                if not {
                    self.cursor.require_whitespace()?;
                }
                let right = self.additive()?;
                left = Expression::IsExpression(IsExpression {
                    span: left.span().cover(right.span()),
                    left: Box::new(left),
                    not,
                    right: Box::new(right),
                });
                continue;
            }

            let before = self.cursor.position();
            let not = self.next_word("not");
            if not {
                self.cursor.allow_whitespace();
            }
            if !self.next_word("in") {
                self.cursor.reset(before);
                return Ok(left);
            }

            self.cursor.allow_whitespace();
            let right = self.additive()?;
            left = Expression::InExpression(InExpression {
                span: left.span().cover(right.span()),
                left: Box::new(left),
                not,
                right: Box::new(right),
            });
        }
    }

    fn additive(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.multiplicative()?;

        while let Some(operator) = self.next_operator(|operator| match operator {
            Operator::Plus => Some(BinaryOperator::Add),
            Operator::Minus => Some(BinaryOperator::Subtract),
            _ => None,
        }) {
            let right = self.multiplicative()?;
            left = binary(left, operator, right);
        }

        Ok(left)
    }

    fn multiplicative(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.concatenation()?;

        while let Some(operator) = self.next_operator(|operator| match operator {
            Operator::Star => Some(BinaryOperator::Multiply),
            Operator::Slash => Some(BinaryOperator::Divide),
            _ => None,
        }) {
            let right = self.concatenation()?;
            left = binary(left, operator, right);
        }

        Ok(left)
    }

    /// `a ~ b`. The right operand is read at the additive tier, so
    /// `a ~ b + c` concatenates `a` with the sum.
    fn concatenation(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.chainable()?;

        while self
            .next_operator(|operator| (operator == Operator::Tilde).then_some(()))
            .is_some()
        {
            let right = self.nested(Self::additive)?;
            left = binary(left, BinaryOperator::Concat, right);
        }

        Ok(left)
    }

    /// Member access, calls, filters and postfix updates.
    fn chainable(&mut self) -> Result<Expression, ParseError> {
        let mut expression = self.range()?;

        loop {
            let start = expression.span().start_offset();

            if self.cursor.eat("[") {
                self.cursor.allow_whitespace();
                let property = self.expression()?;
                self.cursor.allow_whitespace();
                self.cursor.expect("]")?;
                expression = Expression::MemberExpression(MemberExpression {
                    span: Span::from_offsets(start, self.cursor.position()),
                    object: Box::new(expression),
                    property: Box::new(property),
                    computed: true,
                });
                continue;
            }

            if self.cursor.matches("(") {
                let arguments = self.arguments()?;
                let span = Span::from_offsets(start, self.cursor.position());
                expression = match expression {
                    Expression::Identifier(name) => Expression::FilterExpression(FilterExpression {
                        span,
                        name,
                        arguments,
                    }),
                    callee => Expression::CallExpression(CallExpression {
                        span,
                        callee: Box::new(callee),
                        arguments,
                    }),
                };
                continue;
            }

            let update = match self.peek_operator() {
                Some(Operator::PlusPlus) => Some((Operator::PlusPlus, UpdateOperator::Increment)),
                Some(Operator::MinusMinus) => {
                    Some((Operator::MinusMinus, UpdateOperator::Decrement))
                }
                _ => None,
            };
            if let Some((token, operator)) = update {
                if !expression.is_assignable() {
                    return Err(self.invalid(
                        format!("cannot update {}", expression.kind_name()),
                        expression.span(),
                    ));
                }
                self.eat_operator(token);
                return Ok(Expression::UpdateExpression(UpdateExpression {
                    span: Span::from_offsets(start, self.cursor.position()),
                    operator,
                    argument: Box::new(expression),
                    prefix: false,
                }));
            }

            let Some(operator) = self.next_operator(|operator| match operator {
                Operator::Dot | Operator::Pipe => Some(operator),
                _ => None,
            }) else {
                return Ok(expression);
            };

            let name = read_identifier(&mut self.cursor)?;
            expression = if operator == Operator::Dot {
                Expression::MemberExpression(MemberExpression {
                    span: Span::from_offsets(start, self.cursor.position()),
                    object: Box::new(expression),
                    property: Box::new(Expression::Identifier(name)),
                    computed: false,
                })
            } else {
                let mut arguments = vec![expression];
                if self.cursor.matches("(") {
                    arguments.extend(self.arguments()?);
                }
                Expression::FilterExpression(FilterExpression {
                    span: Span::from_offsets(start, self.cursor.position()),
                    name,
                    arguments,
                })
            };
        }
    }

    /// `from..to` over numeric literals.
    fn range(&mut self) -> Result<Expression, ParseError> {
        let from = self.primary()?;
        if self.peek_operator() != Some(Operator::DotDot) {
            return Ok(from);
        }

        let from = match from {
            Expression::NumericLiteral(from) => from,
            other => return Err(self.invalid(RANGE_BOUNDS, other.span())),
        };
        self.eat_operator(Operator::DotDot);

        let to = match self.primary()? {
            Expression::NumericLiteral(to) => to,
            other => return Err(self.invalid(RANGE_BOUNDS, other.span())),
        };

        Ok(Expression::RangeExpression(RangeExpression {
            span: from.span.cover(to.span),
            step: if from.value < to.value { 1 } else { -1 },
            from,
            to,
        }))
    }

    fn primary(&mut self) -> Result<Expression, ParseError> {
        let start = self.cursor.position();

        match self.cursor.peek() {
            Some('(') => self.parenthesized_or_arrow(),
            Some('{') => self.object(),
            Some('[') => self.array(),
            Some('"' | '\'') => Ok(Expression::StringLiteral(read_string(&mut self.cursor)?)),
            Some(c) if c.is_ascii_digit() => self.number(),
            Some('+' | '-') => self.prefix(),
            Some(_) => {
                let Some(word) = self.cursor.peek_word() else {
                    return Err(self.cursor.expected("expression"));
                };
                let span = Span::from_offsets(start, start + word.len());

                match word {
                    "true" | "false" => {
                        self.cursor.eat_word(word);
                        Ok(Expression::BooleanLiteral(BooleanLiteral {
                            span,
                            value: word == "true",
                            raw: SmolStr::new(word),
                        }))
                    }
                    "null" => {
                        self.cursor.eat_word(word);
                        Ok(Expression::NullLiteral(NullLiteral {
                            span,
                            raw: SmolStr::new(word),
                        }))
                    }
                    "not" if self.followed_by_whitespace(word) => {
                        self.cursor.eat_word(word);
                        self.cursor.allow_whitespace();
                        let argument = self.nested(Self::chainable)?;
                        Ok(unary(start, UnaryOperator::Not, argument))
                    }
                    _ => self.identifier_or_arrow(),
                }
            }
            None => Err(self.cursor.expected("expression")),
        }
    }

    fn followed_by_whitespace(&self, word: &str) -> bool {
        self.cursor.rest()[word.len()..]
            .chars()
            .next()
            .is_some_and(char::is_whitespace)
    }

    /// Unary `+`/`-` or prefix `++`/`--`.
    fn prefix(&mut self) -> Result<Expression, ParseError> {
        let start = self.cursor.position();
        let Some(operator) = self.peek_operator() else {
            return Err(self.cursor.expected("expression"));
        };

        let update = match operator {
            Operator::PlusPlus => Some(UpdateOperator::Increment),
            Operator::MinusMinus => Some(UpdateOperator::Decrement),
            _ => None,
        };
        if let Some(update) = update {
            self.eat_operator(operator);
            let argument = self.nested(Self::chainable)?;
            if !argument.is_assignable() {
                return Err(self.invalid(
                    format!("cannot update {}", argument.kind_name()),
                    argument.span(),
                ));
            }
            return Ok(Expression::UpdateExpression(UpdateExpression {
                span: Span::from_offsets(start, argument.span().end_offset()),
                operator: update,
                argument: Box::new(argument),
                prefix: true,
            }));
        }

        let unary_operator = match operator {
            Operator::Plus => UnaryOperator::Plus,
            Operator::Minus => UnaryOperator::Minus,
            _ => return Err(self.cursor.expected("expression")),
        };
        self.eat_operator(operator);
        self.cursor.allow_whitespace();
        let argument = self.nested(Self::chainable)?;
        Ok(unary(start, unary_operator, argument))
    }

    /// An identifier, or the single-parameter arrow function `x => body`.
    fn identifier_or_arrow(&mut self) -> Result<Expression, ParseError> {
        let identifier = read_identifier(&mut self.cursor)?;

        if self
            .next_operator(|operator| (operator == Operator::Arrow).then_some(()))
            .is_none()
        {
            return Ok(Expression::Identifier(identifier));
        }

        let body = self.expression()?;
        Ok(Expression::ArrowFunctionExpression(ArrowFunctionExpression {
            span: identifier.span.cover(body.span()),
            params: vec![identifier],
            body: Box::new(body),
        }))
    }

    /// `(expr)` or `(a, b) => body`. The arrow form is tried first and the
    /// cursor rewinds if it doesn't fit.
    fn parenthesized_or_arrow(&mut self) -> Result<Expression, ParseError> {
        let start = self.cursor.position();

        if let Some(params) = self.arrow_params() {
            let body = self.expression()?;
            return Ok(Expression::ArrowFunctionExpression(ArrowFunctionExpression {
                span: Span::from_offsets(start, body.span().end_offset()),
                params,
                body: Box::new(body),
            }));
        }

        self.cursor.reset(start);
        self.cursor.expect("(")?;
        self.cursor.allow_whitespace();
        let expression = self.expression()?;
        self.cursor.allow_whitespace();
        self.cursor.expect(")")?;
        Ok(expression)
    }

    /// Reads `(a, b) =>` and returns the parameters, or `None` if the input
    /// isn't an arrow parameter list.
    fn arrow_params(&mut self) -> Option<Vec<Identifier>> {
        if !self.cursor.eat("(") {
            return None;
        }

        let mut params = Vec::new();
        self.cursor.allow_whitespace();
        if !self.cursor.eat(")") {
            loop {
                params.push(read_identifier(&mut self.cursor).ok()?);
                self.cursor.allow_whitespace();
                if self.cursor.eat(",") {
                    self.cursor.allow_whitespace();
                    continue;
                }
                if !self.cursor.eat(")") {
                    return None;
                }
                break;
            }
        }

        self.next_operator(|operator| (operator == Operator::Arrow).then_some(()))?;
        Some(params)
    }

    /// `(a, b)` call arguments; a trailing comma is allowed.
    fn arguments(&mut self) -> Result<Vec<Expression>, ParseError> {
        self.sequence("(", ")")
    }

    /// A comma separated list of expressions between `open` and `close`.
    fn sequence(&mut self, open: &str, close: &str) -> Result<Vec<Expression>, ParseError> {
        self.cursor.expect(open)?;
        self.cursor.allow_whitespace();

        let mut items = Vec::new();
        while !self.cursor.eat(close) {
            items.push(self.expression()?);
            self.cursor.allow_whitespace();
            if self.cursor.eat(",") {
                self.cursor.allow_whitespace();
            } else {
                self.cursor.expect(close)?;
                break;
            }
        }

        Ok(items)
    }

    fn array(&mut self) -> Result<Expression, ParseError> {
        let start = self.cursor.position();
        let elements = self.sequence("[", "]")?;
        Ok(Expression::ArrayExpression(ArrayExpression {
            span: Span::from_offsets(start, self.cursor.position()),
            elements,
        }))
    }

    /// `{ key: value, "quoted key": value }`
    fn object(&mut self) -> Result<Expression, ParseError> {
        let start = self.cursor.position();
        self.cursor.expect("{")?;
        self.cursor.allow_whitespace();

        let mut properties = Vec::new();
        while !self.cursor.eat("}") {
            let key = match self.cursor.peek() {
                Some('"' | '\'') => PropertyKey::StringLiteral(read_string(&mut self.cursor)?),
                _ => PropertyKey::Identifier(read_identifier(&mut self.cursor)?),
            };
            self.cursor.allow_whitespace();
            self.cursor.expect(":")?;
            self.cursor.allow_whitespace();
            let value = self.expression()?;

            properties.push(Property {
                span: key.span().cover(value.span()),
                key,
                value,
            });

            self.cursor.allow_whitespace();
            if self.cursor.eat(",") {
                self.cursor.allow_whitespace();
            } else {
                self.cursor.expect("}")?;
                break;
            }
        }

        Ok(Expression::ObjectExpression(ObjectExpression {
            span: Span::from_offsets(start, self.cursor.position()),
            properties,
        }))
    }

    /// A decimal number. `0..10` reads `0`, not `0.`.
    fn number(&mut self) -> Result<Expression, ParseError> {
        let start = self.cursor.position();
        self.cursor.read::<Digits>();

        let rest = self.cursor.rest();
        if rest.starts_with('.') && rest[1..].starts_with(|c: char| c.is_ascii_digit()) {
            self.cursor.eat(".");
            self.cursor.read::<Digits>();
        }

        let end = self.cursor.position();
        let raw = &self.cursor.source()[start..end];
        let span = Span::from_offsets(start, end);
        let value = raw
            .parse::<f64>()
            .map_err(|err| self.invalid(format!("invalid number: {err}"), span))?;

        Ok(Expression::NumericLiteral(NumericLiteral {
            span,
            value,
            raw: SmolStr::new(raw),
        }))
    }
}

fn binary(left: Expression, operator: BinaryOperator, right: Expression) -> Expression {
    Expression::BinaryExpression(BinaryExpression {
        span: left.span().cover(right.span()),
        left: Box::new(left),
        operator,
        right: Box::new(right),
    })
}

fn unary(start: usize, operator: UnaryOperator, argument: Expression) -> Expression {
    Expression::UnaryExpression(UnaryExpression {
        span: Span::from_offsets(start, argument.span().end_offset()),
        operator,
        argument: Box::new(argument),
    })
}
