//! zvelte-parse: parse a zvelte template and print its syntax tree.

mod cli;
mod output;

use clap::Parser;
use cli::Args;
use miette::Result;
use output::{CliError, TemplateError};

fn main() -> Result<()> {
    let args = Args::parse();

    let source = std::fs::read_to_string(&args.file).map_err(|source| CliError::Read {
        path: args.file.clone(),
        source,
    })?;

    match zvelte_parser::parse_with_options(&source, args.parse_options()) {
        Ok(root) => {
            println!("{}", output::render(&root, args.output, &args.file)?);
            Ok(())
        }
        Err(err) => {
            let report = miette::Report::new(TemplateError::new(&err, &args.file, source));
            eprintln!("{report:?}");
            std::process::exit(1);
        }
    }
}
