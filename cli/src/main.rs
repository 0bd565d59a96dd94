#![deny(missing_docs)]

//! # Flowheater CLI
//!
//! Command line front end of the router generator.
//!
//! Supported Commands:
//! - `generate`: Analyzes a package folder and writes the router plan.
//! - `check`: Runs the same analysis and prints the routes it would produce.

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing::error;

mod check;
mod generate;
mod logging;
mod source;

#[derive(Parser, Debug)]
#[clap(author, version, about = "HTTP handler wiring generator")]
struct Cli {
    /// Log filter, e.g. `debug` or `flowheater_core=trace`. `RUST_LOG` wins when set.
    #[clap(long, global = true, env = "FLOWHEATER_LOG", default_value = "info")]
    log_level: String,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze annotated services and write the router plan.
    Generate(generate::GenerateArgs),
    /// Analyze annotated services without writing anything.
    Check(check::CheckArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init(&cli.log_level) {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }

    let result = match &cli.command {
        Commands::Generate(args) => generate::execute(args).map(|_| ()),
        Commands::Check(args) => check::execute(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("generation failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
