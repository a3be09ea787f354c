//! Parser for zvelte templates.
//!
//! zvelte mixes HTML-like markup with Twig-style tags:
//! - `{{ expression }}` interpolations, plus `{{ @html ... }}` and `{{ @render ... }}`
//! - `{% if %}`, `{% for %}`, `{% set %}`, `{% snippet %}`, `{% key %}` and
//!   `{% await %}` blocks
//! - components, `<zvelte:*>` meta elements and Svelte-style directives
//!
//! The parser makes a single pass over the source and stops at the first error.
//! Every node carries a [`Span`] of byte offsets into the input.
//!
//! # Example
//!
//! ```
//! use zvelte_parser::{parse, Node};
//!
//! let source = r#"
//! {% for user in users %}
//!     <p class="name">{{ user.name|upper }}</p>
//! {% else %}
//!     <p>Nobody here.</p>
//! {% endfor %}
//! "#;
//!
//! let root = parse(source).unwrap();
//! assert!(root.fragment.nodes.iter().any(|node| matches!(node, Node::ForBlock(_))));
//!
//! let err = parse("<div>{% if open %}</div>").unwrap_err();
//! println!("{err}\n{}", err.preview);
//! ```

mod ast;
mod cursor;
mod error;
mod lexer;
mod parser;

use smol_str::SmolStr;

pub use ast::*;
pub use error::{ParseError, ParseErrorKind};
pub use parser::Parser;
pub use zvelte_source::{LineCol, Span};

/// Options for parsing zvelte templates.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Namespace of the meta elements, as in `<zvelte:head>`.
    pub special_tag: SmolStr,
    /// Maximum nesting of open elements and blocks.
    pub max_depth: usize,
    /// Maximum nesting of expressions, such as brackets, arrow bodies and
    /// prefix operators.
    ///
    /// Expressions are parsed recursively, so this bounds stack use. The
    /// default fits a 2 MiB thread stack in unoptimized builds.
    pub max_expression_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            special_tag: SmolStr::new_static("zvelte"),
            max_depth: 256,
            max_expression_depth: 64,
        }
    }
}

/// Parses a template with the default options.
pub fn parse(source: &str) -> Result<Root, ParseError> {
    parse_with_options(source, ParseOptions::default())
}

/// Parses a template with custom options.
pub fn parse_with_options(source: &str, options: ParseOptions) -> Result<Root, ParseError> {
    Parser::new(source, options).parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = ParseOptions::default();
        assert_eq!(options.special_tag, "zvelte");
        assert_eq!(options.max_depth, 256);
        assert_eq!(options.max_expression_depth, 64);
    }

    #[test]
    fn test_parse_simple_element() {
        let root = parse("<div class=\"box\">{{ name }}</div>").unwrap();
        let [Node::RegularElement(div)] = root.fragment.nodes.as_slice() else {
            panic!("expected a single element, got {:?}", root.fragment.nodes);
        };
        assert_eq!(div.name, "div");
        assert_eq!(div.attributes.len(), 1);
        assert!(matches!(div.fragment.nodes[0], Node::ExpressionTag(_)));
    }

    #[test]
    fn test_custom_special_tag() {
        let options = ParseOptions {
            special_tag: SmolStr::new_static("z"),
            ..ParseOptions::default()
        };
        let root = parse_with_options("<z:head><title>x</title></z:head>", options).unwrap();
        assert!(matches!(root.fragment.nodes[0], Node::ZvelteHead(_)));

        let err = parse("<z:head></z:head>").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::InvalidNamespace { .. }));
    }

    #[test]
    fn test_errors_carry_positions() {
        let err = parse("<p>\n  {% endif %}</p>").unwrap_err();
        assert_eq!(err.start, LineCol::new(1, 2));
        assert!(err.preview.contains("{% endif %}"));
    }
}
