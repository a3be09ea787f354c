//! AST types for zvelte templates.
//!
//! The tree is owned top-down: a [`Root`] owns its [`Fragment`], fragments own
//! their nodes, nodes own their fragments. Nothing points back up.

mod expression;

pub use expression::*;

use smol_str::SmolStr;
use zvelte_source::Span;

/// A parsed template.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub struct Root {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub span: Span,
    /// The document's `<style>` block, stored raw.
    pub css: Option<StyleSheet>,
    /// The root-level `<script>` block, stored raw.
    pub js: Option<Script>,
    /// Import statements found in `js`.
    pub imports: Vec<Import>,
    /// The template itself.
    pub fragment: Fragment,
}

/// An ordered run of sibling nodes.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub struct Fragment {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub span: Span,
    pub nodes: Vec<Node>,
    /// True for an element's own children. Block bodies and the root are not
    /// transparent: they open a new scope for the analyzer.
    pub transparent: bool,
}

impl Fragment {
    /// Creates an empty fragment collapsed to `offset`.
    pub fn new(transparent: bool, offset: usize) -> Self {
        Self {
            span: Span::point(offset),
            nodes: Vec::new(),
            transparent,
        }
    }

    /// Returns true if the fragment has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// A node in a fragment.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(untagged))]
pub enum Node {
    Text(Text),
    Comment(Comment),
    RegularElement(RegularElement),
    Component(Component),
    TitleElement(TitleElement),
    ZvelteComponent(ZvelteComponent),
    ZvelteSelf(ZvelteSelf),
    ZvelteHead(ZvelteHead),
    IfBlock(IfBlock),
    ForBlock(ForBlock),
    Variable(Variable),
    SnippetBlock(SnippetBlock),
    KeyBlock(KeyBlock),
    AwaitBlock(AwaitBlock),
    ExpressionTag(ExpressionTag),
    HtmlTag(HtmlTag),
    RenderTag(RenderTag),
}

impl Node {
    /// Returns the span of this node.
    pub fn span(&self) -> Span {
        match self {
            Node::Text(n) => n.span,
            Node::Comment(n) => n.span,
            Node::RegularElement(n) => n.span,
            Node::Component(n) => n.span,
            Node::TitleElement(n) => n.span,
            Node::ZvelteComponent(n) => n.span,
            Node::ZvelteSelf(n) => n.span,
            Node::ZvelteHead(n) => n.span,
            Node::IfBlock(n) => n.span,
            Node::ForBlock(n) => n.span,
            Node::Variable(n) => n.span,
            Node::SnippetBlock(n) => n.span,
            Node::KeyBlock(n) => n.span,
            Node::AwaitBlock(n) => n.span,
            Node::ExpressionTag(n) => n.span,
            Node::HtmlTag(n) => n.span,
            Node::RenderTag(n) => n.span,
        }
    }

    /// Returns the child fragments of this node, in source order.
    ///
    /// An `elseif` chain is not flattened: the nested [`IfBlock`] is reached
    /// through [`IfBlock::alternate`].
    pub fn fragments(&self) -> Vec<&Fragment> {
        match self {
            Node::RegularElement(n) => vec![&n.fragment],
            Node::Component(n) => vec![&n.fragment],
            Node::TitleElement(n) => vec![&n.fragment],
            Node::ZvelteComponent(n) => vec![&n.fragment],
            Node::ZvelteSelf(n) => vec![&n.fragment],
            Node::ZvelteHead(n) => vec![&n.fragment],
            Node::IfBlock(n) => match &n.alternate {
                Some(ElseBranch::Else(alternate)) => vec![&n.consequent, alternate],
                _ => vec![&n.consequent],
            },
            Node::ForBlock(n) => std::iter::once(&n.body).chain(&n.fallback).collect(),
            Node::SnippetBlock(n) => vec![&n.body],
            Node::KeyBlock(n) => vec![&n.fragment],
            Node::AwaitBlock(n) => [&n.pending, &n.then, &n.catch]
                .into_iter()
                .flatten()
                .collect(),
            Node::Text(_)
            | Node::Comment(_)
            | Node::Variable(_)
            | Node::ExpressionTag(_)
            | Node::HtmlTag(_)
            | Node::RenderTag(_) => Vec::new(),
        }
    }
}

/// Literal text between tags.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub struct Text {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub span: Span,
    pub data: String,
}

/// `<!-- ... -->`
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub struct Comment {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub span: Span,
    /// Everything between `<!--` and `-->`.
    pub data: String,
}

/// Any HTML element that isn't a component or meta tag.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub struct RegularElement {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub span: Span,
    pub name: SmolStr,
    pub attributes: Vec<Attribute>,
    pub fragment: Fragment,
}

/// A component reference, `<Card key="card">` or `<zvelte key="card">`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub struct Component {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub span: Span,
    pub name: SmolStr,
    /// The static `key` attribute, removed from `attributes`.
    pub key: Text,
    pub attributes: Vec<Attribute>,
    pub fragment: Fragment,
}

/// `<title>`
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub struct TitleElement {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub span: Span,
    pub name: SmolStr,
    pub attributes: Vec<Attribute>,
    pub fragment: Fragment,
}

/// `<zvelte:component this="{{ expr }}">`
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub struct ZvelteComponent {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub span: Span,
    pub name: SmolStr,
    /// The `this` expression, removed from `attributes`.
    pub expression: Expression,
    pub attributes: Vec<Attribute>,
    pub fragment: Fragment,
}

/// `<zvelte:self>`
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub struct ZvelteSelf {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub span: Span,
    pub name: SmolStr,
    pub attributes: Vec<Attribute>,
    pub fragment: Fragment,
}

/// `<zvelte:head>`
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub struct ZvelteHead {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub span: Span,
    pub name: SmolStr,
    pub attributes: Vec<Attribute>,
    pub fragment: Fragment,
}

/// `{% if test %} ... {% elseif other %} ... {% else %} ... {% endif %}`
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub struct IfBlock {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub span: Span,
    /// True when this block was opened by `elseif` / `else if`.
    pub elseif: bool,
    pub test: Expression,
    pub consequent: Fragment,
    pub alternate: Option<ElseBranch>,
}

/// What follows the consequent of an [`IfBlock`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(untagged))]
pub enum ElseBranch {
    /// `{% else %}`
    Else(Fragment),
    /// `{% elseif %}`, a nested block with `elseif` set.
    ElseIf(Box<IfBlock>),
}

/// `{% for index, context in expression #(key) %} ... {% else %} ... {% endfor %}`
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub struct ForBlock {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub span: Span,
    pub context: Identifier,
    pub index: Option<Identifier>,
    pub key: Option<Expression>,
    pub expression: Expression,
    pub body: Fragment,
    /// Rendered when the iterable is empty.
    pub fallback: Option<Fragment>,
}

/// `{% set target = value %}`
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub struct Variable {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub span: Span,
    pub assignment: AssignmentExpression,
}

/// `{% snippet name(a, b) %} ... {% endsnippet %}`
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub struct SnippetBlock {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub span: Span,
    /// The snippet's name.
    pub expression: Identifier,
    pub parameters: Vec<Identifier>,
    pub body: Fragment,
}

/// `{% key expression %} ... {% endkey %}`
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub struct KeyBlock {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub span: Span,
    pub expression: Expression,
    pub fragment: Fragment,
}

/// `{% await promise %} ... {% then value %} ... {% catch error %} ... {% endawait %}`
///
/// With the short form `{% await promise then value %}` there is no pending
/// phase and `pending` is `None`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub struct AwaitBlock {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub span: Span,
    pub expression: Expression,
    pub value: Option<Identifier>,
    pub error: Option<Identifier>,
    pub pending: Option<Fragment>,
    pub then: Option<Fragment>,
    pub catch: Option<Fragment>,
}

/// `{{ expression }}`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub struct ExpressionTag {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub span: Span,
    pub expression: Expression,
}

/// `{{ @html expression }}`
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub struct HtmlTag {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub span: Span,
    pub expression: Expression,
}

/// `{{ @render snippet(args) }}`. The expression is a call or filter.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub struct RenderTag {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub span: Span,
    pub expression: Expression,
}

/// An entry in an element's attribute list.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(untagged))]
pub enum Attribute {
    /// `name`, `name="text {{ expr }}"`, `name={{ expr }}` or `{{ name }}`.
    Normal(NormalAttribute),
    /// `{{ ...expr }}`
    Spread(SpreadAttribute),
    /// `bind:name`
    Bind(BindDirective),
    /// `on:name`
    On(OnDirective),
    /// `class:name`
    Class(ClassDirective),
    /// `transition:name`, `in:name`, `out:name`
    Transition(TransitionDirective),
    /// `use:name`
    Use(UseDirective),
}

impl Attribute {
    /// Returns the span of this attribute.
    pub fn span(&self) -> Span {
        match self {
            Attribute::Normal(a) => a.span,
            Attribute::Spread(a) => a.span,
            Attribute::Bind(a) => a.span,
            Attribute::On(a) => a.span,
            Attribute::Class(a) => a.span,
            Attribute::Transition(a) => a.span,
            Attribute::Use(a) => a.span,
        }
    }

    /// The attribute or directive name; spreads have none.
    pub fn name(&self) -> Option<&str> {
        match self {
            Attribute::Normal(a) => Some(&a.name),
            Attribute::Spread(_) => None,
            Attribute::Bind(a) => Some(&a.name),
            Attribute::On(a) => Some(&a.name),
            Attribute::Class(a) => Some(&a.name),
            Attribute::Transition(a) => Some(&a.name),
            Attribute::Use(a) => Some(&a.name),
        }
    }
}

/// A plain attribute.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type", rename = "Attribute"))]
pub struct NormalAttribute {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub span: Span,
    pub name: SmolStr,
    pub value: AttributeValue,
}

/// The value of a plain attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// No value: boolean presence.
    True,
    /// Text and `{{ expression }}` chunks in source order.
    Chunks(Vec<AttributeChunk>),
}

impl AttributeValue {
    /// Returns the text when the value is exactly one static chunk.
    pub fn as_static_text(&self) -> Option<&Text> {
        match self {
            AttributeValue::Chunks(chunks) => match chunks.as_slice() {
                [AttributeChunk::Text(text)] => Some(text),
                _ => None,
            },
            AttributeValue::True => None,
        }
    }

    /// Returns the expression tag when the value is exactly one expression chunk.
    pub fn as_single_expression(&self) -> Option<&ExpressionTag> {
        match self {
            AttributeValue::Chunks(chunks) => match chunks.as_slice() {
                [AttributeChunk::ExpressionTag(tag)] => Some(tag),
                _ => None,
            },
            AttributeValue::True => None,
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for AttributeValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AttributeValue::True => serializer.serialize_bool(true),
            AttributeValue::Chunks(chunks) => chunks.serialize(serializer),
        }
    }
}

/// One piece of an attribute value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(untagged))]
pub enum AttributeChunk {
    Text(Text),
    ExpressionTag(ExpressionTag),
}

impl AttributeChunk {
    pub fn span(&self) -> Span {
        match self {
            AttributeChunk::Text(text) => text.span,
            AttributeChunk::ExpressionTag(tag) => tag.span,
        }
    }
}

/// `{{ ...expression }}`
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub struct SpreadAttribute {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub span: Span,
    pub expression: Expression,
}

/// `bind:name={{ target }}`. The expression is an identifier or member expression.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub struct BindDirective {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub span: Span,
    pub name: SmolStr,
    pub expression: Expression,
    pub modifiers: Vec<SmolStr>,
}

/// `on:name|modifier={{ handler }}`
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub struct OnDirective {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub span: Span,
    pub name: SmolStr,
    /// `None` when the event is only forwarded.
    pub expression: Option<Expression>,
    pub modifiers: Vec<SmolStr>,
}

/// `class:name={{ condition }}`
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub struct ClassDirective {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub span: Span,
    pub name: SmolStr,
    pub expression: Expression,
    pub modifiers: Vec<SmolStr>,
}

/// `transition:`, `in:` or `out:`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub struct TransitionDirective {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub span: Span,
    pub name: SmolStr,
    pub expression: Expression,
    pub modifiers: Vec<SmolStr>,
    pub intro: bool,
    pub outro: bool,
}

/// `use:action={{ parameters }}`
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub struct UseDirective {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub span: Span,
    pub name: SmolStr,
    pub expression: Expression,
    pub modifiers: Vec<SmolStr>,
}

/// The document's `<style>` block.
///
/// The body is kept verbatim for the stylesheet parser.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub struct StyleSheet {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub span: Span,
    pub attributes: Vec<Attribute>,
    pub content: String,
    pub content_span: Span,
}

/// The root-level `<script>` block, kept verbatim.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub struct Script {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub span: Span,
    pub attributes: Vec<Attribute>,
    pub content: String,
    pub content_span: Span,
}

/// `import ... from "source"` inside the root script.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub struct Import {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub span: Span,
    pub specifiers: Vec<ImportSpecifier>,
    pub source: StringLiteral,
}

/// One binding introduced by an [`Import`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub enum ImportSpecifier {
    /// `import Card from "..."`
    Default { local: Identifier },
    /// `import * as utils from "..."`
    Namespace { local: Identifier },
    /// `import { format as fmt } from "..."`
    Named {
        imported: Identifier,
        local: Identifier,
    },
}
