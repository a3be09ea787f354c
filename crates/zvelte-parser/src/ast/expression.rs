//! Expression AST.
//!
//! Produced by the `{{ ... }}` and `{% ... %}` grammars and by directive and
//! attribute values. Every node carries its byte span.

use smol_str::SmolStr;
use zvelte_source::Span;

/// Any expression.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(untagged))]
pub enum Expression {
    Identifier(Identifier),
    NumericLiteral(NumericLiteral),
    StringLiteral(StringLiteral),
    BooleanLiteral(BooleanLiteral),
    NullLiteral(NullLiteral),
    ObjectExpression(ObjectExpression),
    ArrayExpression(ArrayExpression),
    RangeExpression(RangeExpression),
    MemberExpression(MemberExpression),
    CallExpression(CallExpression),
    FilterExpression(FilterExpression),
    ConditionalExpression(ConditionalExpression),
    LogicalExpression(LogicalExpression),
    IsExpression(IsExpression),
    InExpression(InExpression),
    BinaryExpression(BinaryExpression),
    UnaryExpression(UnaryExpression),
    UpdateExpression(UpdateExpression),
    AssignmentExpression(AssignmentExpression),
    ArrowFunctionExpression(ArrowFunctionExpression),
}

impl Expression {
    /// Returns the span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Expression::Identifier(e) => e.span,
            Expression::NumericLiteral(e) => e.span,
            Expression::StringLiteral(e) => e.span,
            Expression::BooleanLiteral(e) => e.span,
            Expression::NullLiteral(e) => e.span,
            Expression::ObjectExpression(e) => e.span,
            Expression::ArrayExpression(e) => e.span,
            Expression::RangeExpression(e) => e.span,
            Expression::MemberExpression(e) => e.span,
            Expression::CallExpression(e) => e.span,
            Expression::FilterExpression(e) => e.span,
            Expression::ConditionalExpression(e) => e.span,
            Expression::LogicalExpression(e) => e.span,
            Expression::IsExpression(e) => e.span,
            Expression::InExpression(e) => e.span,
            Expression::BinaryExpression(e) => e.span,
            Expression::UnaryExpression(e) => e.span,
            Expression::UpdateExpression(e) => e.span,
            Expression::AssignmentExpression(e) => e.span,
            Expression::ArrowFunctionExpression(e) => e.span,
        }
    }

    /// The node kind name, as used in diagnostics and serialized output.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expression::Identifier(_) => "Identifier",
            Expression::NumericLiteral(_) => "NumericLiteral",
            Expression::StringLiteral(_) => "StringLiteral",
            Expression::BooleanLiteral(_) => "BooleanLiteral",
            Expression::NullLiteral(_) => "NullLiteral",
            Expression::ObjectExpression(_) => "ObjectExpression",
            Expression::ArrayExpression(_) => "ArrayExpression",
            Expression::RangeExpression(_) => "RangeExpression",
            Expression::MemberExpression(_) => "MemberExpression",
            Expression::CallExpression(_) => "CallExpression",
            Expression::FilterExpression(_) => "FilterExpression",
            Expression::ConditionalExpression(_) => "ConditionalExpression",
            Expression::LogicalExpression(_) => "LogicalExpression",
            Expression::IsExpression(_) => "IsExpression",
            Expression::InExpression(_) => "InExpression",
            Expression::BinaryExpression(_) => "BinaryExpression",
            Expression::UnaryExpression(_) => "UnaryExpression",
            Expression::UpdateExpression(_) => "UpdateExpression",
            Expression::AssignmentExpression(_) => "AssignmentExpression",
            Expression::ArrowFunctionExpression(_) => "ArrowFunctionExpression",
        }
    }

    /// True for the two node kinds that may be bound or assigned to.
    pub fn is_assignable(&self) -> bool {
        matches!(
            self,
            Expression::Identifier(_) | Expression::MemberExpression(_)
        )
    }
}

/// `name`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub struct Identifier {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub span: Span,
    pub name: SmolStr,
}

/// `42`, `3.14`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub struct NumericLiteral {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub span: Span,
    pub value: f64,
    /// The literal exactly as written.
    pub raw: SmolStr,
}

/// `'text'` or `"text"`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub struct StringLiteral {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub span: Span,
    /// The value with escapes resolved.
    pub value: String,
    /// The literal as written, quotes included.
    pub raw: String,
}

/// `true` / `false`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub struct BooleanLiteral {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub span: Span,
    pub value: bool,
    pub raw: SmolStr,
}

/// `null`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub struct NullLiteral {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub span: Span,
    pub raw: SmolStr,
}

/// `{ key: value, "other": value }`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub struct ObjectExpression {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub span: Span,
    pub properties: Vec<Property>,
}

/// One `key: value` entry of an object literal.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub struct Property {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub span: Span,
    pub key: PropertyKey,
    pub value: Expression,
}

/// Object keys are bare identifiers or string literals.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(untagged))]
pub enum PropertyKey {
    Identifier(Identifier),
    StringLiteral(StringLiteral),
}

impl PropertyKey {
    pub fn span(&self) -> Span {
        match self {
            PropertyKey::Identifier(key) => key.span,
            PropertyKey::StringLiteral(key) => key.span,
        }
    }
}

/// `[a, b, c]`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub struct ArrayExpression {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub span: Span,
    pub elements: Vec<Expression>,
}

/// `0..10`. Both ends are numeric literals.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub struct RangeExpression {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub span: Span,
    pub from: NumericLiteral,
    pub to: NumericLiteral,
    /// `1` when counting up, `-1` otherwise.
    pub step: i32,
}

/// `object.property` or `object[property]`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub struct MemberExpression {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub span: Span,
    pub object: Box<Expression>,
    pub property: Box<Expression>,
    /// True for the bracket form.
    pub computed: bool,
}

/// A call whose callee is not a bare identifier, e.g. `user.name()`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub struct CallExpression {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub span: Span,
    pub callee: Box<Expression>,
    pub arguments: Vec<Expression>,
}

/// `name(args)` or `value|name(args)`.
///
/// For the pipe form the piped value is the first argument.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub struct FilterExpression {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub span: Span,
    pub name: Identifier,
    pub arguments: Vec<Expression>,
}

/// `test ? consequent : alternate`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub struct ConditionalExpression {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub span: Span,
    pub test: Box<Expression>,
    pub consequent: Box<Expression>,
    pub alternate: Box<Expression>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum LogicalOperator {
    #[cfg_attr(feature = "serde", serde(rename = "or"))]
    Or,
    #[cfg_attr(feature = "serde", serde(rename = "and"))]
    And,
    #[cfg_attr(feature = "serde", serde(rename = "||"))]
    PipePipe,
    #[cfg_attr(feature = "serde", serde(rename = "??"))]
    Coalesce,
}

impl LogicalOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalOperator::Or => "or",
            LogicalOperator::And => "and",
            LogicalOperator::PipePipe => "||",
            LogicalOperator::Coalesce => "??",
        }
    }
}

/// `left or right`, `left ?? right`, ...
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub struct LogicalExpression {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub span: Span,
    pub left: Box<Expression>,
    pub operator: LogicalOperator,
    pub right: Box<Expression>,
}

/// `left is [not] right`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub struct IsExpression {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub span: Span,
    pub left: Box<Expression>,
    pub not: bool,
    pub right: Box<Expression>,
}

/// `left [not] in right`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub struct InExpression {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub span: Span,
    pub left: Box<Expression>,
    pub not: bool,
    pub right: Box<Expression>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum BinaryOperator {
    #[cfg_attr(feature = "serde", serde(rename = "=="))]
    Equal,
    #[cfg_attr(feature = "serde", serde(rename = "!="))]
    NotEqual,
    #[cfg_attr(feature = "serde", serde(rename = "<"))]
    Less,
    #[cfg_attr(feature = "serde", serde(rename = "<="))]
    LessEqual,
    #[cfg_attr(feature = "serde", serde(rename = ">"))]
    Greater,
    #[cfg_attr(feature = "serde", serde(rename = ">="))]
    GreaterEqual,
    #[cfg_attr(feature = "serde", serde(rename = "+"))]
    Add,
    #[cfg_attr(feature = "serde", serde(rename = "-"))]
    Subtract,
    #[cfg_attr(feature = "serde", serde(rename = "*"))]
    Multiply,
    #[cfg_attr(feature = "serde", serde(rename = "/"))]
    Divide,
    #[cfg_attr(feature = "serde", serde(rename = "~"))]
    Concat,
}

impl BinaryOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::Less => "<",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::Greater => ">",
            BinaryOperator::GreaterEqual => ">=",
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Concat => "~",
        }
    }
}

/// Comparison, arithmetic and `~` concatenation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub struct BinaryExpression {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub span: Span,
    pub left: Box<Expression>,
    pub operator: BinaryOperator,
    pub right: Box<Expression>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum UnaryOperator {
    #[cfg_attr(feature = "serde", serde(rename = "not"))]
    Not,
    #[cfg_attr(feature = "serde", serde(rename = "+"))]
    Plus,
    #[cfg_attr(feature = "serde", serde(rename = "-"))]
    Minus,
}

/// `not x`, `-x`, `+x`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub struct UnaryExpression {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub span: Span,
    pub operator: UnaryOperator,
    pub argument: Box<Expression>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum UpdateOperator {
    #[cfg_attr(feature = "serde", serde(rename = "++"))]
    Increment,
    #[cfg_attr(feature = "serde", serde(rename = "--"))]
    Decrement,
}

/// `x++`, `--x`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub struct UpdateExpression {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub span: Span,
    pub operator: UpdateOperator,
    pub argument: Box<Expression>,
    pub prefix: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum AssignmentOperator {
    #[cfg_attr(feature = "serde", serde(rename = "="))]
    Assign,
    #[cfg_attr(feature = "serde", serde(rename = "+="))]
    AddAssign,
    #[cfg_attr(feature = "serde", serde(rename = "-="))]
    SubtractAssign,
    #[cfg_attr(feature = "serde", serde(rename = "~="))]
    ConcatAssign,
    #[cfg_attr(feature = "serde", serde(rename = "*="))]
    MultiplyAssign,
    #[cfg_attr(feature = "serde", serde(rename = "/="))]
    DivideAssign,
}

/// `target = value`. The target is an identifier or member expression.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub struct AssignmentExpression {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub span: Span,
    pub left: Box<Expression>,
    pub operator: AssignmentOperator,
    pub right: Box<Expression>,
}

/// `item => item.id` or `(a, b) => a + b`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(tag = "type"))]
pub struct ArrowFunctionExpression {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub span: Span,
    pub params: Vec<Identifier>,
    pub body: Box<Expression>,
}
