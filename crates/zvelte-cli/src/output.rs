//! Output formatting and error reports.

use crate::cli::OutputFormat;
use camino::{Utf8Path, Utf8PathBuf};
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;
use zvelte_parser::{ParseError, Root};

/// A parse error positioned in its file, rendered by miette.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(zvelte::parse))]
pub struct TemplateError {
    message: String,
    #[source_code]
    source_code: NamedSource<String>,
    #[label("here")]
    span: SourceSpan,
}

impl TemplateError {
    /// Wraps `error`, which was produced by parsing `source` read from `path`.
    pub fn new(error: &ParseError, path: &Utf8Path, source: String) -> Self {
        let offset = error.span.start_offset();
        let len = error.span.end_offset() - offset;
        Self {
            message: error.to_string(),
            source_code: NamedSource::new(path.as_str(), source),
            span: SourceSpan::new(offset.into(), len),
        }
    }
}

/// Failures outside the template itself.
#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("failed to read `{path}`")]
    #[diagnostic(code(zvelte::io))]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize the syntax tree")]
    #[diagnostic(code(zvelte::json))]
    Serialize(#[from] serde_json::Error),
}

/// Formats a parsed template.
pub fn render(root: &Root, format: OutputFormat, path: &Utf8Path) -> Result<String, CliError> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(root)?,
        OutputFormat::Debug => format!("{root:#?}"),
        OutputFormat::Check => format!(
            "{path}: ok ({} top-level nodes, {} imports)",
            root.fragment.nodes.len(),
            root.imports.len()
        ),
    })
}
