//! Markup: comments, elements, attributes and directives.

use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use zvelte_source::Span;

use super::{Frame, OpenNode, Parser};
use crate::ast::*;
use crate::error::{ParseError, ParseErrorKind};
use crate::lexer::{AttributeName, TagName};

/// HTML void elements that never have children or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Returns true if the element never has a closing tag.
fn is_void_element(name: &str) -> bool {
    name.starts_with('!') || VOID_ELEMENTS.contains(&name.to_ascii_lowercase().as_str())
}

/// What an element name denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ElementKind {
    Regular,
    Component,
    Title,
    ZvelteComponent,
    ZvelteSelf,
    ZvelteHead,
}

impl ElementKind {
    fn is_meta(self) -> bool {
        matches!(
            self,
            ElementKind::ZvelteComponent | ElementKind::ZvelteSelf | ElementKind::ZvelteHead
        )
    }
}

/// Kind-specific data pulled out of the attribute list.
#[derive(Debug)]
enum ElementHead {
    Regular,
    Component { key: Text },
    Title,
    ZvelteComponent { expression: Expression },
    ZvelteSelf,
    ZvelteHead,
}

impl ElementHead {
    fn kind(&self) -> ElementKind {
        match self {
            ElementHead::Regular => ElementKind::Regular,
            ElementHead::Component { .. } => ElementKind::Component,
            ElementHead::Title => ElementKind::Title,
            ElementHead::ZvelteComponent { .. } => ElementKind::ZvelteComponent,
            ElementHead::ZvelteSelf => ElementKind::ZvelteSelf,
            ElementHead::ZvelteHead => ElementKind::ZvelteHead,
        }
    }
}

/// An element whose children are still being parsed.
#[derive(Debug)]
pub(super) struct OpenElement {
    pub(super) start: usize,
    pub(super) name: SmolStr,
    head: ElementHead,
    attributes: Vec<Attribute>,
}

impl OpenElement {
    /// Builds the node, ending at `end`.
    fn finish(self, fragment: Fragment, end: usize) -> Node {
        let span = Span::from_offsets(self.start, end);
        let OpenElement {
            name,
            head,
            attributes,
            ..
        } = self;

        match head {
            ElementHead::Regular => Node::RegularElement(RegularElement {
                span,
                name,
                attributes,
                fragment,
            }),
            ElementHead::Component { key } => Node::Component(Component {
                span,
                name,
                key,
                attributes,
                fragment,
            }),
            ElementHead::Title => Node::TitleElement(TitleElement {
                span,
                name,
                attributes,
                fragment,
            }),
            ElementHead::ZvelteComponent { expression } => {
                Node::ZvelteComponent(ZvelteComponent {
                    span,
                    name,
                    expression,
                    attributes,
                    fragment,
                })
            }
            ElementHead::ZvelteSelf => Node::ZvelteSelf(ZvelteSelf {
                span,
                name,
                attributes,
                fragment,
            }),
            ElementHead::ZvelteHead => Node::ZvelteHead(ZvelteHead {
                span,
                name,
                attributes,
                fragment,
            }),
        }
    }
}

/// Directive prefixes recognised in attribute names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DirectivePrefix {
    On,
    Bind,
    Class,
    Transition,
    In,
    Out,
    Use,
}

impl DirectivePrefix {
    fn parse(prefix: &str) -> Option<Self> {
        Some(match prefix {
            "on" => DirectivePrefix::On,
            "bind" => DirectivePrefix::Bind,
            "class" => DirectivePrefix::Class,
            "transition" => DirectivePrefix::Transition,
            "in" => DirectivePrefix::In,
            "out" => DirectivePrefix::Out,
            "use" => DirectivePrefix::Use,
            _ => return None,
        })
    }
}

impl<'src> Parser<'src> {
    /// Parses whatever starts with `<`.
    pub(super) fn element(&mut self) -> Result<(), ParseError> {
        let start = self.cursor.position();

        if self.cursor.eat("<!--") {
            return self.comment(start);
        }

        self.cursor.expect("<")?;
        if self.cursor.eat("/") {
            return self.closing_tag(start);
        }

        let name_start = self.cursor.position();
        let name = self.tag_name()?;
        let kind = self.element_kind(&name, name_start)?;
        let name_end = self.cursor.position();

        let attributes = self.attributes(kind, &name)?;
        self.cursor.allow_whitespace();
        let self_closing = self.cursor.eat("/");
        self.cursor.expect(">")?;

        match name.as_str() {
            "style" => return self.style(start, attributes, self_closing),
            "script" if self.at_root() => return self.script(start, attributes, self_closing),
            "script" if !self_closing => return self.nested_script(start, name, attributes),
            _ => {}
        }

        let (head, attributes) =
            self.element_head(kind, &name, name_start, name_end, attributes)?;
        let element = OpenElement {
            start,
            name,
            head,
            attributes,
        };

        let position = self.cursor.position();
        if self_closing || is_void_element(&element.name) {
            let node = element.finish(Fragment::new(true, position), position);
            self.append(node);
            Ok(())
        } else {
            self.push(OpenNode::Element(element), Fragment::new(true, position))
        }
    }

    fn comment(&mut self, start: usize) -> Result<(), ParseError> {
        let data = self.cursor.read_until("-->");
        self.cursor.expect("-->")?;
        self.append(Node::Comment(Comment {
            span: Span::from_offsets(start, self.cursor.position()),
            data: data.to_string(),
        }));
        Ok(())
    }

    fn tag_name(&mut self) -> Result<SmolStr, ParseError> {
        let start = self.cursor.position();
        match self.cursor.read::<TagName>() {
            Some(name) => Ok(SmolStr::new(name)),
            None if self.cursor.is_eof() => Err(self.cursor.expected("tag name")),
            None => {
                let invalid = self
                    .cursor
                    .rest()
                    .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
                    .unwrap_or(self.cursor.rest().len())
                    .max(1);
                Err(self
                    .cursor
                    .error(ParseErrorKind::InvalidTagName, start, start + invalid))
            }
        }
    }

    /// Classifies an element by name.
    fn element_kind(&self, name: &str, start: usize) -> Result<ElementKind, ParseError> {
        let special = self.special_tag();

        if let Some((namespace, kind)) = name.split_once(':') {
            if namespace != special {
                return Err(self.cursor.error(
                    ParseErrorKind::InvalidNamespace {
                        name: name.to_string(),
                        special: special.to_string(),
                    },
                    start,
                    start + name.len(),
                ));
            }

            return match kind {
                "component" => Ok(ElementKind::ZvelteComponent),
                "self" => Ok(ElementKind::ZvelteSelf),
                "head" => Ok(ElementKind::ZvelteHead),
                _ => Err(self.cursor.error(
                    ParseErrorKind::UnknownMetaTag {
                        kind: kind.to_string(),
                    },
                    start,
                    start + name.len(),
                )),
            };
        }

        if name == special || name.starts_with(|c: char| c.is_ascii_uppercase()) {
            Ok(ElementKind::Component)
        } else if name == "title" {
            Ok(ElementKind::Title)
        } else {
            Ok(ElementKind::Regular)
        }
    }

    /// Handles `</name>`, closing the matching element and auto-closing any
    /// same-kind elements left open inside it.
    fn closing_tag(&mut self, start: usize) -> Result<(), ParseError> {
        let name_start = self.cursor.position();
        let name = self.tag_name()?;
        let kind = self.element_kind(&name, name_start)?;
        self.cursor.allow_whitespace();
        self.cursor.expect(">")?;
        let end = self.cursor.position();

        loop {
            let (element, mut fragment) = match self.stack.pop() {
                Some(Frame {
                    node: OpenNode::Element(element),
                    fragment,
                }) if element.name == name || element.head.kind() == kind => (element, fragment),
                _ => {
                    return Err(self.cursor.error(
                        ParseErrorKind::UnmatchedClosingTag {
                            name: name.to_string(),
                        },
                        start,
                        end,
                    ));
                }
            };

            fragment.span = fragment.span.with_end(start);
            if element.name == name {
                let node = element.finish(fragment, end);
                self.append(node);
                return Ok(());
            }

            let node = element.finish(fragment, start);
            self.append(node);
        }
    }

    /// Reads attributes up to `/` or `>`.
    fn attributes(&mut self, kind: ElementKind, name: &str) -> Result<Vec<Attribute>, ParseError> {
        let mut attributes = Vec::new();
        let mut unique = FxHashSet::default();

        loop {
            self.cursor.allow_whitespace();
            if self.cursor.is_eof() {
                return Err(self.cursor.expected("`>`"));
            }
            if self.cursor.matches("/") || self.cursor.matches(">") {
                break;
            }

            let (attribute, name_span) = self.attribute()?;
            let unique_name = match &attribute {
                Attribute::Normal(attribute) => Some(attribute.name.clone()),
                Attribute::Bind(bind) if bind.name != "this" => Some(bind.name.clone()),
                _ => None,
            };
            if let Some(unique_name) = unique_name {
                if !unique.insert(unique_name.clone()) {
                    return Err(self.cursor.error(
                        ParseErrorKind::DuplicateAttribute {
                            name: unique_name.to_string(),
                        },
                        name_span.start_offset(),
                        name_span.end_offset(),
                    ));
                }
            }

            self.check_directive_host(kind, name, &attribute)?;
            attributes.push(attribute);
        }

        if kind == ElementKind::Regular {
            self.check_bindings(name, &attributes)?;
        }

        Ok(attributes)
    }

    /// Reads one attribute, returning it with the span of its name.
    fn attribute(&mut self) -> Result<(Attribute, Span), ParseError> {
        let start = self.cursor.position();

        if self.cursor.eat("{{") {
            self.cursor.allow_whitespace();
            if self.cursor.eat("...") {
                let expression = self.expression()?;
                self.cursor.allow_whitespace();
                self.cursor.expect("}}")?;
                let span = Span::from_offsets(start, self.cursor.position());
                return Ok((Attribute::Spread(SpreadAttribute { span, expression }), span));
            }

            let expression = self.expression()?;
            let Expression::Identifier(identifier) = &expression else {
                let span = expression.span();
                return Err(self.cursor.error(
                    ParseErrorKind::InvalidAttribute {
                        message: "shorthand attributes must be a single identifier".to_string(),
                    },
                    span.start_offset(),
                    span.end_offset(),
                ));
            };
            let name = identifier.name.clone();
            let name_span = identifier.span;
            self.cursor.allow_whitespace();
            self.cursor.expect("}}")?;
            let span = Span::from_offsets(start, self.cursor.position());

            let value = AttributeValue::Chunks(vec![AttributeChunk::ExpressionTag(ExpressionTag {
                span,
                expression,
            })]);
            return Ok((Attribute::Normal(NormalAttribute { span, name, value }), name_span));
        }

        let Some(name) = self.cursor.read::<AttributeName>() else {
            return Err(self.cursor.expected("attribute name"));
        };
        let name_span = Span::from_offsets(start, self.cursor.position());
        let value = if self.cursor.eat("=") {
            Some(self.attribute_value()?)
        } else {
            None
        };
        let span = Span::from_offsets(start, self.cursor.position());

        if let Some((prefix, rest)) = name.split_once(':') {
            if let Some(prefix) = DirectivePrefix::parse(prefix) {
                let name_start = start + name.len() - rest.len();
                let directive = self.directive(prefix, rest, name_start, value, span)?;
                return Ok((directive, name_span));
            }
        }

        let attribute = NormalAttribute {
            span,
            name: SmolStr::new(name),
            value: value.unwrap_or(AttributeValue::True),
        };
        Ok((Attribute::Normal(attribute), name_span))
    }

    /// Reads the value after `=`: a quoted run of text and `{{ }}` chunks, or a
    /// single unquoted `{{ }}`.
    fn attribute_value(&mut self) -> Result<AttributeValue, ParseError> {
        let quote = if self.cursor.eat("\"") {
            "\""
        } else if self.cursor.eat("'") {
            "'"
        } else if self.cursor.matches("{{") {
            let tag = self.expression_tag()?;
            return Ok(AttributeValue::Chunks(vec![AttributeChunk::ExpressionTag(tag)]));
        } else {
            return Err(self.cursor.expected("a quoted value or `{{ expression }}`"));
        };

        let mut chunks = Vec::new();
        loop {
            if self.cursor.eat(quote) {
                break;
            }
            if self.cursor.is_eof() {
                return Err(self.cursor.expected(format!("closing `{quote}`")));
            }

            if self.cursor.matches("{{") {
                chunks.push(AttributeChunk::ExpressionTag(self.expression_tag()?));
            } else {
                let start = self.cursor.position();
                let data = self.cursor.read_until_any(&[quote, "{{"]);
                chunks.push(AttributeChunk::Text(Text {
                    span: Span::from_offsets(start, self.cursor.position()),
                    data: data.to_string(),
                }));
            }
        }

        if chunks.is_empty() {
            let position = self.cursor.position() - quote.len();
            chunks.push(AttributeChunk::Text(Text {
                span: Span::point(position),
                data: String::new(),
            }));
        }

        Ok(AttributeValue::Chunks(chunks))
    }

    fn directive(
        &mut self,
        prefix: DirectivePrefix,
        rest: &str,
        name_start: usize,
        value: Option<AttributeValue>,
        span: Span,
    ) -> Result<Attribute, ParseError> {
        let mut parts = rest.split('|');
        let name = parts.next().unwrap_or_default();
        let modifiers: Vec<SmolStr> = parts.map(SmolStr::new).collect();
        let name_end = name_start + name.len();

        if name.is_empty() {
            return Err(self.cursor.error(
                ParseErrorKind::InvalidDirective {
                    message: "directive name cannot be empty".to_string(),
                },
                span.start_offset(),
                name_end,
            ));
        }

        let expression = match value {
            None => None,
            Some(value) => match value.as_single_expression() {
                Some(tag) => Some(tag.expression.clone()),
                None => {
                    return Err(self.cursor.error(
                        ParseErrorKind::InvalidDirective {
                            message: "directive values must be a single `{{ expression }}`"
                                .to_string(),
                        },
                        name_end,
                        span.end_offset(),
                    ));
                }
            },
        };
        let short_form = || {
            Expression::Identifier(Identifier {
                span: Span::from_offsets(name_start, name_end),
                name: SmolStr::new(name),
            })
        };
        let name = SmolStr::new(name);

        Ok(match prefix {
            DirectivePrefix::On => Attribute::On(OnDirective {
                span,
                name,
                expression,
                modifiers,
            }),
            DirectivePrefix::Bind => {
                let expression = expression.unwrap_or_else(short_form);
                if !expression.is_assignable() {
                    let invalid = expression.span();
                    return Err(self.cursor.error(
                        ParseErrorKind::InvalidDirective {
                            message: "can only bind to an identifier or a member expression"
                                .to_string(),
                        },
                        invalid.start_offset(),
                        invalid.end_offset(),
                    ));
                }
                Attribute::Bind(BindDirective {
                    span,
                    name,
                    expression,
                    modifiers,
                })
            }
            DirectivePrefix::Class => Attribute::Class(ClassDirective {
                span,
                name,
                expression: expression.unwrap_or_else(short_form),
                modifiers,
            }),
            DirectivePrefix::Transition | DirectivePrefix::In | DirectivePrefix::Out => {
                Attribute::Transition(TransitionDirective {
                    span,
                    name,
                    expression: expression.unwrap_or_else(short_form),
                    modifiers,
                    intro: prefix != DirectivePrefix::Out,
                    outro: prefix != DirectivePrefix::In,
                })
            }
            DirectivePrefix::Use => Attribute::Use(UseDirective {
                span,
                name,
                expression: expression.unwrap_or_else(short_form),
                modifiers,
            }),
        })
    }

    /// Rejects directives that the element kind cannot host.
    fn check_directive_host(
        &self,
        kind: ElementKind,
        element: &str,
        attribute: &Attribute,
    ) -> Result<(), ParseError> {
        let prefix = match attribute {
            Attribute::Class(_) if kind != ElementKind::Regular => "class",
            Attribute::Transition(_) if kind == ElementKind::Component || kind.is_meta() => {
                "transition"
            }
            Attribute::Use(_) if kind == ElementKind::Component || kind.is_meta() => "use",
            _ => return Ok(()),
        };

        let span = attribute.span();
        Err(self.cursor.error(
            ParseErrorKind::InvalidDirective {
                message: format!("`{prefix}:` directives are not allowed on `<{element}>`"),
            },
            span.start_offset(),
            span.end_offset(),
        ))
    }

    /// Element-specific `bind:` rules for regular elements.
    fn check_bindings(&self, element: &str, attributes: &[Attribute]) -> Result<(), ParseError> {
        let ty = attributes.iter().find_map(|attribute| match attribute {
            Attribute::Normal(attribute) if attribute.name == "type" => Some(&attribute.value),
            _ => None,
        });
        let static_type = ty.and_then(AttributeValue::as_static_text).map(|t| t.data.as_str());
        let dynamic_type = ty.is_some() && static_type.is_none();

        for attribute in attributes {
            let Attribute::Bind(bind) = attribute else {
                continue;
            };

            let message = match bind.name.as_str() {
                "value" if !matches!(element, "input" | "textarea" | "select") => Some(
                    "`bind:value` can only be used on `<input>`, `<textarea>` or `<select>`"
                        .to_string(),
                ),
                "group" | "files" if element != "input" => Some(format!(
                    "`bind:{}` can only be used on `<input>`",
                    bind.name
                )),
                "files" if static_type != Some("file") => {
                    Some("`bind:files` requires `type=\"file\"`".to_string())
                }
                "checked"
                    if element != "input"
                        || (!dynamic_type && static_type != Some("checkbox")) =>
                {
                    Some("`bind:checked` requires `<input type=\"checkbox\">`".to_string())
                }
                "value" | "checked" if element == "input" && dynamic_type => Some(format!(
                    "`type` must be a static attribute when used with `bind:{}`",
                    bind.name
                )),
                _ => None,
            };

            if let Some(message) = message {
                return Err(self.cursor.error(
                    ParseErrorKind::InvalidDirective { message },
                    bind.span.start_offset(),
                    bind.span.end_offset(),
                ));
            }
        }

        Ok(())
    }

    /// Pulls the kind-specific attributes (`key`, `this`) out of the list.
    fn element_head(
        &self,
        kind: ElementKind,
        name: &str,
        name_start: usize,
        name_end: usize,
        mut attributes: Vec<Attribute>,
    ) -> Result<(ElementHead, Vec<Attribute>), ParseError> {
        let head = match kind {
            ElementKind::Regular => ElementHead::Regular,
            ElementKind::Title => ElementHead::Title,
            ElementKind::ZvelteSelf => ElementHead::ZvelteSelf,
            ElementKind::ZvelteHead => ElementHead::ZvelteHead,
            ElementKind::Component => {
                let Some(key) = take_attribute(&mut attributes, "key") else {
                    return Err(self.missing_attribute(name, "key", name_start, name_end));
                };
                let Some(text) = key.value.as_static_text() else {
                    return Err(self.cursor.error(
                        ParseErrorKind::InvalidAttribute {
                            message: "`key`'s value must be text".to_string(),
                        },
                        key.span.start_offset(),
                        key.span.end_offset(),
                    ));
                };
                ElementHead::Component { key: text.clone() }
            }
            ElementKind::ZvelteComponent => {
                let Some(this) = take_attribute(&mut attributes, "this") else {
                    return Err(self.missing_attribute(name, "this", name_start, name_end));
                };
                let Some(tag) = this.value.as_single_expression() else {
                    return Err(self.cursor.error(
                        ParseErrorKind::InvalidAttribute {
                            message: "`this` must be a single `{{ expression }}`".to_string(),
                        },
                        this.span.start_offset(),
                        this.span.end_offset(),
                    ));
                };
                ElementHead::ZvelteComponent {
                    expression: tag.expression.clone(),
                }
            }
        };

        Ok((head, attributes))
    }

    fn missing_attribute(
        &self,
        element: &str,
        attribute: &str,
        start: usize,
        end: usize,
    ) -> ParseError {
        self.cursor.error(
            ParseErrorKind::MissingAttribute {
                element: element.to_string(),
                attribute: attribute.to_string(),
            },
            start,
            end,
        )
    }

    /// Reads the raw body of `<style>`, `<script>` and the like, through the
    /// closing tag. Returns the content and its span.
    pub(super) fn raw_body(
        &mut self,
        name: &str,
        self_closing: bool,
    ) -> Result<(String, Span), ParseError> {
        let start = self.cursor.position();
        if self_closing {
            return Ok((String::new(), Span::point(start)));
        }

        let closing = format!("</{name}");
        let content = self.cursor.read_until(&closing);
        let content_span = Span::from_offsets(start, self.cursor.position());
        self.cursor.expect(&closing)?;
        self.cursor.allow_whitespace();
        self.cursor.expect(">")?;

        Ok((content.to_string(), content_span))
    }

    fn style(
        &mut self,
        start: usize,
        attributes: Vec<Attribute>,
        self_closing: bool,
    ) -> Result<(), ParseError> {
        if self.css.is_some() {
            return Err(self.duplicate_element("style", start));
        }

        let (content, content_span) = self.raw_body("style", self_closing)?;
        self.css = Some(StyleSheet {
            span: Span::from_offsets(start, self.cursor.position()),
            attributes,
            content,
            content_span,
        });
        Ok(())
    }

    /// A `<script>` below the root: an ordinary element holding its raw body.
    fn nested_script(
        &mut self,
        start: usize,
        name: SmolStr,
        attributes: Vec<Attribute>,
    ) -> Result<(), ParseError> {
        let (content, content_span) = self.raw_body("script", false)?;

        let mut fragment = Fragment::new(true, content_span.start_offset());
        fragment.span = content_span;
        if !content.is_empty() {
            fragment.nodes.push(Node::Text(Text {
                span: content_span,
                data: content,
            }));
        }

        self.append(Node::RegularElement(RegularElement {
            span: Span::from_offsets(start, self.cursor.position()),
            name,
            attributes,
            fragment,
        }));
        Ok(())
    }

    pub(super) fn duplicate_element(&self, name: &str, start: usize) -> ParseError {
        self.cursor.error(
            ParseErrorKind::DuplicateElement {
                name: name.to_string(),
            },
            start,
            self.cursor.position(),
        )
    }
}

/// Removes and returns the plain attribute called `name`.
fn take_attribute(attributes: &mut Vec<Attribute>, name: &str) -> Option<NormalAttribute> {
    let index = attributes
        .iter()
        .position(|attribute| matches!(attribute, Attribute::Normal(a) if a.name == name))?;
    match attributes.remove(index) {
        Attribute::Normal(attribute) => Some(attribute),
        _ => None,
    }
}
