//! `{{ ... }}` tags and `{% ... %}` blocks.

use zvelte_source::Span;

use super::{Frame, OpenNode, Parser};
use crate::ast::*;
use crate::error::{ParseError, ParseErrorKind};
use crate::lexer::Identifier as IdentifierToken;

/// Which fragment of an if block is being filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IfPhase {
    Consequent,
    Alternate,
    /// Waiting for the nested `elseif` block above this frame to close.
    ElseIf,
}

#[derive(Debug)]
pub(super) struct OpenIf {
    pub(super) start: usize,
    elseif: bool,
    test: Expression,
    consequent: Option<Fragment>,
    phase: IfPhase,
}

impl OpenIf {
    fn finish(self, fragment: Fragment, alternate: Option<ElseBranch>, end: usize) -> IfBlock {
        let (consequent, alternate) = match (self.phase, self.consequent) {
            (IfPhase::Consequent, _) | (_, None) => (fragment, alternate),
            (IfPhase::Alternate, Some(consequent)) => {
                (consequent, Some(ElseBranch::Else(fragment)))
            }
            (IfPhase::ElseIf, Some(consequent)) => (consequent, alternate),
        };

        IfBlock {
            span: Span::from_offsets(self.start, end),
            elseif: self.elseif,
            test: self.test,
            consequent,
            alternate,
        }
    }
}

#[derive(Debug)]
pub(super) struct OpenFor {
    pub(super) start: usize,
    context: Identifier,
    index: Option<Identifier>,
    key: Option<Expression>,
    expression: Expression,
    /// Set once `{% else %}` moves on to the fallback.
    body: Option<Fragment>,
}

#[derive(Debug)]
pub(super) struct OpenSnippet {
    pub(super) start: usize,
    expression: Identifier,
    parameters: Vec<Identifier>,
}

#[derive(Debug)]
pub(super) struct OpenKey {
    pub(super) start: usize,
    expression: Expression,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AwaitPhase {
    Pending,
    Then,
    Catch,
}

#[derive(Debug)]
pub(super) struct OpenAwait {
    pub(super) start: usize,
    expression: Expression,
    value: Option<Identifier>,
    error: Option<Identifier>,
    pending: Option<Fragment>,
    then: Option<Fragment>,
    phase: AwaitPhase,
}

impl OpenAwait {
    /// Stores the fragment of the phase that just ended.
    fn store(&mut self, fragment: Fragment) -> Option<Fragment> {
        match self.phase {
            AwaitPhase::Pending => self.pending = Some(fragment),
            AwaitPhase::Then => self.then = Some(fragment),
            AwaitPhase::Catch => return Some(fragment),
        }
        None
    }
}

impl<'src> Parser<'src> {
    /// Parses whatever starts with `{{` or `{%`.
    pub(super) fn tag(&mut self) -> Result<(), ParseError> {
        if self.cursor.matches("{{") {
            self.expression_like_tag()
        } else {
            self.block()
        }
    }

    /// `{{ expr }}`, `{{ @html expr }}` or `{{ @render snippet() }}`.
    fn expression_like_tag(&mut self) -> Result<(), ParseError> {
        let start = self.cursor.position();
        self.cursor.expect("{{")?;
        self.cursor.allow_whitespace();

        if !self.cursor.eat("@") {
            self.cursor.reset(start);
            let tag = self.expression_tag()?;
            self.append(Node::ExpressionTag(tag));
            return Ok(());
        }

        let keyword_start = self.cursor.position();
        let keyword = self.cursor.read::<IdentifierToken>().unwrap_or_default();
        if keyword != "html" && keyword != "render" {
            return Err(self.cursor.error(
                ParseErrorKind::UnknownTag {
                    keyword: keyword.to_string(),
                },
                keyword_start - 1,
                self.cursor.position(),
            ));
        }

        self.cursor.require_whitespace()?;
        let expression = self.expression()?;
        self.cursor.allow_whitespace();
        self.cursor.expect("}}")?;
        let span = Span::from_offsets(start, self.cursor.position());

        let node = if keyword == "html" {
            Node::HtmlTag(HtmlTag { span, expression })
        } else {
            if !matches!(
                expression,
                Expression::CallExpression(_) | Expression::FilterExpression(_)
            ) {
                let invalid = expression.span();
                return Err(self.cursor.error(
                    ParseErrorKind::InvalidExpression {
                        message: format!(
                            "`@render` expects a call, found {}",
                            expression.kind_name()
                        ),
                    },
                    invalid.start_offset(),
                    invalid.end_offset(),
                ));
            }
            Node::RenderTag(RenderTag { span, expression })
        };

        self.append(node);
        Ok(())
    }

    /// `{% keyword ... %}`
    fn block(&mut self) -> Result<(), ParseError> {
        let start = self.cursor.position();
        self.cursor.expect("{%")?;
        self.cursor.allow_whitespace();

        let keyword_start = self.cursor.position();
        let Some(keyword) = self.cursor.read::<IdentifierToken>() else {
            return Err(self.cursor.expected("block keyword"));
        };

        match keyword {
            "if" => self.open_if(start),
            "for" => self.open_for(start),
            "set" => self.set(start),
            "snippet" => self.open_snippet(start),
            "key" => self.open_key(start),
            "await" => self.open_await(start),
            "else" => {
                self.cursor.allow_whitespace();
                if self.cursor.eat_word("if") {
                    self.elseif(start, "else if")
                } else {
                    self.block_end()?;
                    self.else_branch(start)
                }
            }
            "elseif" => self.elseif(start, "elseif"),
            "then" => self.then(start),
            "catch" => self.catch(start),
            "endif" | "endfor" | "endsnippet" | "endkey" | "endawait" => {
                self.block_end()?;
                self.close_block(start, keyword)
            }
            _ => Err(self.cursor.error(
                ParseErrorKind::UnknownBlock {
                    keyword: keyword.to_string(),
                },
                keyword_start,
                self.cursor.position(),
            )),
        }
    }

    /// Consumes the closing `%}`.
    fn block_end(&mut self) -> Result<(), ParseError> {
        self.cursor.allow_whitespace();
        self.cursor.expect("%}")
    }

    /// An expression preceded by mandatory whitespace.
    fn header_expression(&mut self) -> Result<Expression, ParseError> {
        self.cursor.require_whitespace()?;
        self.expression()
    }

    /// An empty block fragment starting at the cursor.
    fn block_fragment(&self) -> Fragment {
        Fragment::new(false, self.cursor.position())
    }

    fn invalid_position(&self, keyword: &str, start: usize) -> ParseError {
        self.cursor.error_from(
            ParseErrorKind::InvalidBlockPosition {
                keyword: keyword.to_string(),
            },
            start,
        )
    }

    // === Openers ===

    fn open_if(&mut self, start: usize) -> Result<(), ParseError> {
        let test = self.header_expression()?;
        self.block_end()?;
        let node = OpenNode::If(OpenIf {
            start,
            elseif: false,
            test,
            consequent: None,
            phase: IfPhase::Consequent,
        });
        self.push(node, self.block_fragment())
    }

    /// `for [index,] context in expression [#(key)]`
    fn open_for(&mut self, start: usize) -> Result<(), ParseError> {
        self.cursor.require_whitespace()?;
        let first = self.identifier()?;
        let after_first = self.cursor.position();
        self.cursor.allow_whitespace();

        let (index, context) = if self.cursor.eat(",") {
            self.cursor.allow_whitespace();
            (Some(first), self.identifier()?)
        } else {
            self.cursor.reset(after_first);
            (None, first)
        };

        self.cursor.require_whitespace()?;
        if !self.cursor.eat_word("in") {
            return Err(self.cursor.expected("`in`"));
        }
        let expression = self.header_expression()?;
        self.cursor.allow_whitespace();

        let key = if self.cursor.eat("#") {
            self.cursor.expect("(")?;
            self.cursor.allow_whitespace();
            let key = self.expression()?;
            if !key.is_assignable() {
                let invalid = key.span();
                return Err(self.cursor.error(
                    ParseErrorKind::InvalidExpression {
                        message: "a for key must be an identifier or a member expression"
                            .to_string(),
                    },
                    invalid.start_offset(),
                    invalid.end_offset(),
                ));
            }
            self.cursor.allow_whitespace();
            self.cursor.expect(")")?;
            Some(key)
        } else {
            None
        };

        self.block_end()?;
        let node = OpenNode::For(OpenFor {
            start,
            context,
            index,
            key,
            expression,
            body: None,
        });
        self.push(node, self.block_fragment())
    }

    /// `set target = value`, a leaf.
    fn set(&mut self, start: usize) -> Result<(), ParseError> {
        let expression = self.header_expression()?;
        let Expression::AssignmentExpression(assignment) = expression else {
            let invalid = expression.span();
            return Err(self.cursor.error(
                ParseErrorKind::InvalidExpression {
                    message: format!(
                        "`set` expects an assignment, found {}",
                        expression.kind_name()
                    ),
                },
                invalid.start_offset(),
                invalid.end_offset(),
            ));
        };
        self.block_end()?;

        self.append(Node::Variable(Variable {
            span: Span::from_offsets(start, self.cursor.position()),
            assignment,
        }));
        Ok(())
    }

    /// `snippet name(a, b)`
    fn open_snippet(&mut self, start: usize) -> Result<(), ParseError> {
        self.cursor.require_whitespace()?;
        let expression = self.identifier()?;
        self.cursor.allow_whitespace();
        self.cursor.expect("(")?;
        self.cursor.allow_whitespace();

        let mut parameters = Vec::new();
        if !self.cursor.eat(")") {
            loop {
                parameters.push(self.identifier()?);
                self.cursor.allow_whitespace();
                if self.cursor.eat(",") {
                    self.cursor.allow_whitespace();
                    continue;
                }
                self.cursor.expect(")")?;
                break;
            }
        }

        self.block_end()?;
        let node = OpenNode::Snippet(OpenSnippet {
            start,
            expression,
            parameters,
        });
        self.push(node, self.block_fragment())
    }

    fn open_key(&mut self, start: usize) -> Result<(), ParseError> {
        let expression = self.header_expression()?;
        self.block_end()?;
        self.push(
            OpenNode::Key(OpenKey { start, expression }),
            self.block_fragment(),
        )
    }

    /// `await promise` or `await promise then [value]`
    fn open_await(&mut self, start: usize) -> Result<(), ParseError> {
        let expression = self.header_expression()?;
        self.cursor.allow_whitespace();

        let (phase, value) = if self.cursor.eat_word("then") {
            (AwaitPhase::Then, self.optional_binding()?)
        } else {
            (AwaitPhase::Pending, None)
        };

        self.block_end()?;
        let node = OpenNode::Await(OpenAwait {
            start,
            expression,
            value,
            error: None,
            pending: None,
            then: None,
            phase,
        });
        self.push(node, self.block_fragment())
    }

    /// The identifier after `then` / `catch`, if any.
    fn optional_binding(&mut self) -> Result<Option<Identifier>, ParseError> {
        self.cursor.allow_whitespace();
        if self.cursor.peek_word().is_some() {
            Ok(Some(self.identifier()?))
        } else {
            Ok(None)
        }
    }

    // === Continuations ===

    fn else_branch(&mut self, start: usize) -> Result<(), ParseError> {
        let position = self.cursor.position();
        let opened = match self.stack.last_mut() {
            Some(Frame {
                node: OpenNode::If(block),
                fragment,
            }) if block.phase == IfPhase::Consequent => {
                let consequent = std::mem::replace(fragment, Fragment::new(false, position));
                block.consequent = Some(with_end(consequent, start));
                block.phase = IfPhase::Alternate;
                true
            }
            Some(Frame {
                node: OpenNode::For(block),
                fragment,
            }) if block.body.is_none() => {
                let body = std::mem::replace(fragment, Fragment::new(false, position));
                block.body = Some(with_end(body, start));
                true
            }
            _ => false,
        };

        if opened {
            Ok(())
        } else {
            Err(self.invalid_position("else", start))
        }
    }

    /// `elseif test` or `else if test`: parks the current block and pushes a
    /// nested one.
    fn elseif(&mut self, start: usize, keyword: &str) -> Result<(), ParseError> {
        let test = self.header_expression()?;
        self.block_end()?;
        let position = self.cursor.position();

        let parked = match self.stack.last_mut() {
            Some(Frame {
                node: OpenNode::If(block),
                fragment,
            }) if block.phase == IfPhase::Consequent => {
                let consequent = std::mem::replace(fragment, Fragment::new(false, position));
                block.consequent = Some(with_end(consequent, start));
                block.phase = IfPhase::ElseIf;
                true
            }
            _ => false,
        };
        if !parked {
            return Err(self.invalid_position(keyword, start));
        }

        let node = OpenNode::If(OpenIf {
            start,
            elseif: true,
            test,
            consequent: None,
            phase: IfPhase::Consequent,
        });
        self.push(node, self.block_fragment())
    }

    fn then(&mut self, start: usize) -> Result<(), ParseError> {
        let value = self.optional_binding()?;
        self.block_end()?;
        let position = self.cursor.position();

        let opened = match self.stack.last_mut() {
            Some(Frame {
                node: OpenNode::Await(block),
                fragment,
            }) if block.phase == AwaitPhase::Pending => {
                let pending = std::mem::replace(fragment, Fragment::new(false, position));
                block.store(with_end(pending, start));
                block.value = value;
                block.phase = AwaitPhase::Then;
                true
            }
            _ => false,
        };

        if opened {
            Ok(())
        } else {
            Err(self.invalid_position("then", start))
        }
    }

    fn catch(&mut self, start: usize) -> Result<(), ParseError> {
        let error = self.optional_binding()?;
        self.block_end()?;
        let position = self.cursor.position();

        let opened = match self.stack.last_mut() {
            Some(Frame {
                node: OpenNode::Await(block),
                fragment,
            }) if block.phase != AwaitPhase::Catch => {
                let previous = std::mem::replace(fragment, Fragment::new(false, position));
                block.store(with_end(previous, start));
                block.error = error;
                block.phase = AwaitPhase::Catch;
                true
            }
            _ => false,
        };

        if opened {
            Ok(())
        } else {
            Err(self.invalid_position("catch", start))
        }
    }

    // === Closers ===

    /// Closes the innermost block with `{% end<keyword> %}`.
    fn close_block(&mut self, start: usize, closer: &str) -> Result<(), ParseError> {
        let end = self.cursor.position();
        let expected = self
            .stack
            .last()
            .and_then(|frame| frame.node.keyword())
            .map(|keyword| format!("end{keyword}"));

        if expected.as_deref() != Some(closer) {
            return Err(self.cursor.error(
                ParseErrorKind::UnexpectedBlockClose {
                    found: closer.to_string(),
                    expected,
                },
                start,
                end,
            ));
        }

        let Some(Frame { node, fragment }) = self.stack.pop() else {
            return Ok(());
        };
        let fragment = with_end(fragment, start);

        let node = match node {
            OpenNode::If(block) => Node::IfBlock(self.close_if_chain(block, fragment, end)),
            OpenNode::For(block) => {
                let (body, fallback) = match block.body {
                    Some(body) => (body, Some(fragment)),
                    None => (fragment, None),
                };
                Node::ForBlock(ForBlock {
                    span: Span::from_offsets(block.start, end),
                    context: block.context,
                    index: block.index,
                    key: block.key,
                    expression: block.expression,
                    body,
                    fallback,
                })
            }
            OpenNode::Snippet(block) => Node::SnippetBlock(SnippetBlock {
                span: Span::from_offsets(block.start, end),
                expression: block.expression,
                parameters: block.parameters,
                body: fragment,
            }),
            OpenNode::Key(block) => Node::KeyBlock(KeyBlock {
                span: Span::from_offsets(block.start, end),
                expression: block.expression,
                fragment,
            }),
            OpenNode::Await(mut block) => {
                let catch = block.store(fragment);
                Node::AwaitBlock(AwaitBlock {
                    span: Span::from_offsets(block.start, end),
                    expression: block.expression,
                    value: block.value,
                    error: block.error,
                    pending: block.pending,
                    then: block.then,
                    catch,
                })
            }
            OpenNode::Element(_) => return Ok(()),
        };

        self.append(node);
        Ok(())
    }

    /// Finishes an if block and, for an `elseif`, every parked block below it.
    fn close_if_chain(&mut self, block: OpenIf, fragment: Fragment, end: usize) -> IfBlock {
        let mut closed = block.finish(fragment, None, end);

        while closed.elseif {
            match self.stack.pop() {
                Some(Frame {
                    node: OpenNode::If(parent),
                    fragment,
                }) if parent.phase == IfPhase::ElseIf => {
                    let alternate = Some(ElseBranch::ElseIf(Box::new(closed)));
                    closed = parent.finish(fragment, alternate, end);
                }
                other => {
                    self.stack.extend(other);
                    break;
                }
            }
        }

        closed
    }
}

/// Closes `fragment` at `end`.
fn with_end(mut fragment: Fragment, end: usize) -> Fragment {
    fragment.span = fragment.span.with_end(end);
    fragment
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::error::ParseErrorKind;
    use crate::parse;
    use pretty_assertions::assert_eq;
    use zvelte_source::Span;

    fn single(source: &str) -> Node {
        let mut root = parse(source).unwrap();
        assert_eq!(root.fragment.nodes.len(), 1, "{:?}", root.fragment.nodes);
        root.fragment.nodes.remove(0)
    }

    fn error_kind(source: &str) -> ParseErrorKind {
        parse(source).unwrap_err().kind
    }

    fn texts(fragment: &Fragment) -> Vec<&str> {
        fragment
            .nodes
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) => Some(text.data.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_expression_tag() {
        let Node::ExpressionTag(tag) = single("{{ name }}") else {
            panic!("expected an expression tag");
        };
        assert_eq!(tag.span, Span::from_offsets(0, 10));
        assert!(matches!(tag.expression, Expression::Identifier(_)));
    }

    #[test]
    fn test_html_and_render_tags() {
        assert!(matches!(single("{{ @html body }}"), Node::HtmlTag(_)));
        assert!(matches!(single("{{ @render row(item) }}"), Node::RenderTag(_)));
        assert!(matches!(single("{{ @render ui.row() }}"), Node::RenderTag(_)));
        assert!(matches!(
            error_kind("{{ @render row }}"),
            ParseErrorKind::InvalidExpression { .. }
        ));
        assert_eq!(
            error_kind("{{ @debug x }}"),
            ParseErrorKind::UnknownTag {
                keyword: "debug".to_string()
            }
        );
    }

    #[test]
    fn test_if_else() {
        let Node::IfBlock(block) = single("{% if ok %}yes{% else %}no{% endif %}") else {
            panic!("expected an if block");
        };
        assert!(!block.elseif);
        assert_eq!(block.span, Span::from_offsets(0, 37));
        assert_eq!(texts(&block.consequent), vec!["yes"]);
        assert_eq!(block.consequent.span, Span::from_offsets(11, 14));
        assert!(!block.consequent.transparent);

        let Some(ElseBranch::Else(alternate)) = &block.alternate else {
            panic!("expected an else branch");
        };
        assert_eq!(texts(alternate), vec!["no"]);
        assert_eq!(alternate.span, Span::from_offsets(24, 26));
    }

    #[test]
    fn test_elseif_chain() {
        let source = "{% if a %}1{% elseif b %}2{% else if c %}3{% else %}4{% endif %}";
        let Node::IfBlock(block) = single(source) else {
            panic!("expected an if block");
        };
        assert_eq!(block.span, Span::from_offsets(0, source.len()));
        assert_eq!(texts(&block.consequent), vec!["1"]);

        let Some(ElseBranch::ElseIf(b)) = &block.alternate else {
            panic!("expected elseif");
        };
        assert!(b.elseif);
        assert_eq!(b.span.start_offset(), 11);
        assert_eq!(b.span.end_offset(), source.len());
        assert_eq!(texts(&b.consequent), vec!["2"]);

        let Some(ElseBranch::ElseIf(c)) = &b.alternate else {
            panic!("expected else if");
        };
        assert_eq!(texts(&c.consequent), vec!["3"]);
        let Some(ElseBranch::Else(last)) = &c.alternate else {
            panic!("expected else");
        };
        assert_eq!(texts(last), vec!["4"]);
    }

    #[test]
    fn test_nested_if_inside_elseif() {
        let source = "{% if a %}{% elseif b %}{% if c %}x{% endif %}{% endif %}";
        let Node::IfBlock(block) = single(source) else {
            panic!("expected an if block");
        };
        let Some(ElseBranch::ElseIf(b)) = &block.alternate else {
            panic!("expected elseif");
        };
        assert!(matches!(b.consequent.nodes.as_slice(), [Node::IfBlock(inner)] if !inner.elseif));
    }

    #[test]
    fn test_for_block() {
        let Node::ForBlock(block) =
            single("{% for i, item in items #(item.id) %}{{ item }}{% else %}none{% endfor %}")
        else {
            panic!("expected a for block");
        };
        assert_eq!(block.index.as_ref().map(|i| i.name.as_str()), Some("i"));
        assert_eq!(block.context.name, "item");
        assert!(matches!(block.expression, Expression::Identifier(ref e) if e.name == "items"));
        assert!(matches!(block.key, Some(Expression::MemberExpression(_))));
        assert_eq!(block.body.nodes.len(), 1);
        assert_eq!(texts(block.fallback.as_ref().unwrap()), vec!["none"]);
    }

    #[test]
    fn test_for_without_index_or_key() {
        let Node::ForBlock(block) = single("{% for x in 1..3 %}{% endfor %}") else {
            panic!("expected a for block");
        };
        assert!(block.index.is_none());
        assert!(block.key.is_none());
        assert!(block.fallback.is_none());
        assert!(matches!(block.expression, Expression::RangeExpression(_)));
        assert_eq!(block.body.span, Span::from_offsets(19, 19));
    }

    #[test]
    fn test_for_errors() {
        assert!(matches!(error_kind("{% for x of items %}{% endfor %}"), ParseErrorKind::Expected { .. }));
        assert!(matches!(
            error_kind("{% for x in items #(x ~ 1) %}{% endfor %}"),
            ParseErrorKind::InvalidExpression { .. }
        ));
        assert!(matches!(
            error_kind("{% for x in a %}{% else %}{% else %}{% endfor %}"),
            ParseErrorKind::InvalidBlockPosition { .. }
        ));
    }

    #[test]
    fn test_set() {
        let Node::Variable(variable) = single("{% set user.name = 'Ada' %}") else {
            panic!("expected a variable");
        };
        assert_eq!(variable.span, Span::from_offsets(0, 27));
        assert!(matches!(*variable.assignment.left, Expression::MemberExpression(_)));
        assert_eq!(variable.assignment.operator, AssignmentOperator::Assign);

        let Node::Variable(variable) = single("{% set total += 1 %}") else {
            panic!("expected a variable");
        };
        assert_eq!(variable.assignment.operator, AssignmentOperator::AddAssign);

        assert!(matches!(error_kind("{% set x %}"), ParseErrorKind::InvalidExpression { .. }));
        assert!(matches!(error_kind("{% set 1 = x %}"), ParseErrorKind::InvalidExpression { .. }));
    }

    #[test]
    fn test_snippet() {
        let Node::SnippetBlock(snippet) = single("{% snippet row(item, index) %}<li></li>{% endsnippet %}")
        else {
            panic!("expected a snippet");
        };
        assert_eq!(snippet.expression.name, "row");
        let names: Vec<_> = snippet.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["item", "index"]);
        assert_eq!(snippet.body.nodes.len(), 1);

        let Node::SnippetBlock(empty) = single("{% snippet empty() %}{% endsnippet %}") else {
            panic!("expected a snippet");
        };
        assert!(empty.parameters.is_empty());

        assert!(parse("{% snippet row(a.b) %}{% endsnippet %}").is_err());
    }

    #[test]
    fn test_key() {
        let Node::KeyBlock(block) = single("{% key id %}<p></p>{% endkey %}") else {
            panic!("expected a key block");
        };
        assert_eq!(block.fragment.nodes.len(), 1);
    }

    #[test]
    fn test_await_phases() {
        let Node::AwaitBlock(block) = single(
            "{% await load() %}loading{% then data %}{{ data }}{% catch err %}failed{% endawait %}",
        ) else {
            panic!("expected an await block");
        };
        assert_eq!(texts(block.pending.as_ref().unwrap()), vec!["loading"]);
        assert_eq!(block.then.as_ref().unwrap().nodes.len(), 1);
        assert_eq!(texts(block.catch.as_ref().unwrap()), vec!["failed"]);
        assert_eq!(block.value.as_ref().map(|v| v.name.as_str()), Some("data"));
        assert_eq!(block.error.as_ref().map(|v| v.name.as_str()), Some("err"));
    }

    #[test]
    fn test_await_short_form() {
        let Node::AwaitBlock(block) = single("{% await p then value %}{{ value }}{% endawait %}")
        else {
            panic!("expected an await block");
        };
        assert!(block.pending.is_none());
        assert!(block.then.is_some());
        assert!(block.catch.is_none());
        assert_eq!(block.value.as_ref().map(|v| v.name.as_str()), Some("value"));

        let Node::AwaitBlock(block) = single("{% await p %}...{% catch %}!{% endawait %}") else {
            panic!("expected an await block");
        };
        assert!(block.then.is_none());
        assert!(block.error.is_none());
        assert!(block.catch.is_some());
    }

    #[test]
    fn test_await_continuation_order() {
        assert!(matches!(
            error_kind("{% await p then v %}{% then w %}{% endawait %}"),
            ParseErrorKind::InvalidBlockPosition { .. }
        ));
        assert!(matches!(
            error_kind("{% await p %}{% catch %}{% catch %}{% endawait %}"),
            ParseErrorKind::InvalidBlockPosition { .. }
        ));
    }

    #[test]
    fn test_continuation_without_block() {
        let err = parse("{% else %}").unwrap_err();
        assert_eq!(
            err.kind,
            ParseErrorKind::InvalidBlockPosition {
                keyword: "else".to_string()
            }
        );
        assert_eq!(err.span, Span::from_offsets(0, 10));

        assert!(matches!(error_kind("{% then %}"), ParseErrorKind::InvalidBlockPosition { .. }));
        assert!(matches!(
            error_kind("{% key k %}{% else %}{% endkey %}"),
            ParseErrorKind::InvalidBlockPosition { .. }
        ));
        assert!(matches!(
            error_kind("{% if a %}<p>{% else %}</p>{% endif %}"),
            ParseErrorKind::InvalidBlockPosition { .. }
        ));
    }

    #[test]
    fn test_mismatched_closer() {
        assert_eq!(
            error_kind("{% if a %}{% endfor %}"),
            ParseErrorKind::UnexpectedBlockClose {
                found: "endfor".to_string(),
                expected: Some("endif".to_string()),
            }
        );
        assert_eq!(
            error_kind("{% endif %}"),
            ParseErrorKind::UnexpectedBlockClose {
                found: "endif".to_string(),
                expected: None,
            }
        );
        assert!(matches!(
            error_kind("{% if a %}<div>{% endif %}</div>"),
            ParseErrorKind::UnexpectedBlockClose { expected: None, .. }
        ));
    }

    #[test]
    fn test_unknown_block() {
        let err = parse("{% unknown %}").unwrap_err();
        assert_eq!(
            err.kind,
            ParseErrorKind::UnknownBlock {
                keyword: "unknown".to_string()
            }
        );
        assert_eq!(err.span, Span::from_offsets(3, 10));
        assert!(matches!(error_kind("{% %}"), ParseErrorKind::Expected { .. }));
    }

    #[test]
    fn test_block_fragments_end_at_next_tag() {
        let Node::KeyBlock(block) = single("{% key a %} x {% endkey %}") else {
            panic!("expected a key block");
        };
        assert_eq!(block.fragment.span, Span::from_offsets(11, 14));
        assert_eq!(block.span, Span::from_offsets(0, 26));
    }
}
