//! Anchored `logos` patterns used by the cursor.
//!
//! The parser reads the source character by character and only reaches for a
//! lexer when it needs one lexeme: an identifier, a tag name, an operator. Each
//! read builds a fresh lexer over the remaining input and accepts a token only
//! if it starts at offset 0, so no scan state survives between reads.

use logos::Logos;

/// Identifiers and keywords in expressions and block headers.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Identifier {
    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*")]
    Word,
}

/// Element names: `div`, `my-widget`, `zvelte:head`, `!DOCTYPE`.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TagName {
    #[regex(r"!?[a-zA-Z][a-zA-Z0-9\-]*(:[a-zA-Z0-9\-]*)?")]
    Name,
}

/// Attribute and directive names, including the `prefix:` and `|modifier` parts.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AttributeName {
    #[regex(r#"[^\s=>/"'{}]+"#)]
    Name,
}

/// A run of decimal digits.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Digits {
    #[regex(r"[0-9]+")]
    Run,
}

/// Expression punctuation. Logos picks the longest token, so `==` wins over `=`
/// and `..` over `.`.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Operator {
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("??")]
    Coalesce,
    #[token("||")]
    PipePipe,
    #[token("|")]
    Pipe,
    #[token("+=")]
    PlusEq,
    #[token("++")]
    PlusPlus,
    #[token("+")]
    Plus,
    #[token("-=")]
    MinusEq,
    #[token("--")]
    MinusMinus,
    #[token("-")]
    Minus,
    #[token("~=")]
    TildeEq,
    #[token("~")]
    Tilde,
    #[token("*=")]
    StarEq,
    #[token("*")]
    Star,
    #[token("/=")]
    SlashEq,
    #[token("/")]
    Slash,
    #[token("=>")]
    Arrow,
    #[token("=")]
    Eq,
    #[token("?")]
    Question,
    #[token(":")]
    Colon,
    #[token("..")]
    DotDot,
    #[token(".")]
    Dot,
}

impl Operator {
    /// The source spelling of the operator.
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Operator::EqEq => "==",
            Operator::NotEq => "!=",
            Operator::LtEq => "<=",
            Operator::GtEq => ">=",
            Operator::Lt => "<",
            Operator::Gt => ">",
            Operator::Coalesce => "??",
            Operator::PipePipe => "||",
            Operator::Pipe => "|",
            Operator::PlusEq => "+=",
            Operator::PlusPlus => "++",
            Operator::Plus => "+",
            Operator::MinusEq => "-=",
            Operator::MinusMinus => "--",
            Operator::Minus => "-",
            Operator::TildeEq => "~=",
            Operator::Tilde => "~",
            Operator::StarEq => "*=",
            Operator::Star => "*",
            Operator::SlashEq => "/=",
            Operator::Slash => "/",
            Operator::Arrow => "=>",
            Operator::Eq => "=",
            Operator::Question => "?",
            Operator::Colon => ":",
            Operator::DotDot => "..",
            Operator::Dot => ".",
        }
    }

    /// Byte length of the operator.
    pub(crate) fn len(self) -> usize {
        self.as_str().len()
    }
}

/// Lexes one token of `T` at the very start of `input`.
///
/// Returns the token and its byte length, or `None` when `input` doesn't start
/// with a `T` token.
pub(crate) fn anchored<'s, T>(input: &'s str) -> Option<(T, usize)>
where
    T: Logos<'s, Source = str>,
    T::Extras: Default,
{
    let mut lexer = T::lexer(input);
    match lexer.next() {
        Some(Ok(token)) if lexer.span().start == 0 => Some((token, lexer.span().end)),
        _ => None,
    }
}

/// Byte length of the `T` token at the start of `input`, if any.
pub(crate) fn anchored_len<'s, T>(input: &'s str) -> Option<usize>
where
    T: Logos<'s, Source = str>,
    T::Extras: Default,
{
    anchored::<T>(input).map(|(_, len)| len)
}
