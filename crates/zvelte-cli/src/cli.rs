//! CLI argument parsing.

use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};
use zvelte_parser::ParseOptions;

/// Parse a zvelte template and print its syntax tree.
#[derive(Debug, Parser)]
#[command(name = "zvelte-parse")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Template file to parse
    pub file: Utf8PathBuf,

    /// Namespace of meta elements such as `<zvelte:head>`
    #[arg(long = "special-tag", default_value = "zvelte")]
    pub special_tag: String,

    /// Maximum nesting depth of elements and blocks
    #[arg(long = "max-depth", default_value_t = 256)]
    pub max_depth: usize,

    /// Maximum nesting depth of expressions
    #[arg(long = "max-expression-depth", default_value_t = 64)]
    pub max_expression_depth: usize,

    /// Output format
    #[arg(long, value_enum, default_value = "json")]
    pub output: OutputFormat,
}

/// Output format options.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// The AST as pretty-printed JSON (default)
    #[default]
    Json,
    /// The AST in Rust debug notation
    Debug,
    /// No tree, only a one-line summary
    Check,
}

impl Args {
    /// Parser options taken from the command line.
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            special_tag: self.special_tag.as_str().into(),
            max_depth: self.max_depth,
            max_expression_depth: self.max_expression_depth,
        }
    }
}
