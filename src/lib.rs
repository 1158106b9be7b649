use std::sync::Arc;

use anyhow::Context;
use lex::File;
use verifier::{Options, Report};

pub mod expr;
pub mod justifier;
pub mod lex;
pub mod parse;
pub mod proof;
pub mod rules;
pub mod verifier;

/// Parses and verifies a whole proof file. Malformed lines and invalid steps
/// are reported through the returned [Report].
pub fn process(file: Arc<File>, options: &Options) -> anyhow::Result<Report> {
    let ast = parse::parse_proof(file.clone());
    log::debug!("{}: parsed {} top-level nodes", file.name(), ast.len());
    verifier::verify_from_ast(&ast, options).context("verifier error")
}
