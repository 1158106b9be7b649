use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{ArgAction, Parser};
use folproof::lex::File;
use folproof::verifier::Options;

#[derive(Debug, Parser)]
#[command(version, about = env!("CARGO_PKG_DESCRIPTION"), disable_version_flag = true)]
struct Args {
    /// Print version
    #[arg(short = 'v', long, action = ArgAction::Version)]
    version: Option<bool>,
    /// Log every verification step
    #[arg(short, long)]
    debug: bool,
    /// Only allow propositional formulas
    #[arg(long)]
    propositional: bool,
    /// Restrict symbols to a signature, e.g. "P/1 f/2 c/0"
    #[arg(long, value_name = "SIGNATURE")]
    signature: Option<String>,
    /// The proof file to check
    file: PathBuf,
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(if args.debug {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        })
        .format_timestamp(None)
        .format_target(false)
        .parse_default_env()
        .init();

    let path = args.file.display().to_string();
    let contents =
        std::fs::read_to_string(&args.file).with_context(|| format!("failed to read `{path}`"))?;
    let file = Arc::new(File::new(path, contents));

    let options = Options {
        propositional: args.propositional,
        signature: args.signature,
    };
    let report = folproof::process(file, &options)?;
    println!("{report}");

    Ok(if report.valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
