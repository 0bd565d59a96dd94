//! # Generate Command
//!
//! Analyzes the package folder and writes the router plan next to it.
//!
//! The plan is written only once the whole analysis succeeded; a failing
//! endpoint leaves any previous output untouched.

use crate::source::SourceArgs;
use flowheater_core::{AppResult, GeneratorOptions, RouterPlan};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Arguments for the generate command.
#[derive(clap::Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Package to analyze.
    #[clap(flatten)]
    pub source: SourceArgs,

    /// Output file, relative to the package folder unless absolute.
    /// A `.yaml` or `.yml` extension selects YAML, anything else JSON.
    #[clap(long, env = "FLOWHEATER_OUTPUT", default_value = "flowheater_gen.json")]
    pub output: PathBuf,

    /// Route handler errors through a user supplied error handler.
    #[clap(long)]
    pub error_handler: bool,

    /// Let a user supplied reader decode request payloads.
    #[clap(long)]
    pub request_reader: bool,

    /// Let a user supplied writer encode responses.
    #[clap(long)]
    pub response_writer: bool,
}

impl GenerateArgs {
    /// Resolved output location.
    pub fn output_path(&self) -> PathBuf {
        if self.output.is_absolute() {
            self.output.clone()
        } else {
            self.source.package.join(&self.output)
        }
    }

    fn options(&self) -> GeneratorOptions {
        GeneratorOptions {
            error_handler: self.error_handler,
            request_reader: self.request_reader,
            response_writer: self.response_writer,
        }
    }
}

/// Executes the generate command, returning the written file.
pub fn execute(args: &GenerateArgs) -> AppResult<PathBuf> {
    let collection = args.source.analyze()?;
    let plan = RouterPlan {
        options: args.options(),
        collection,
    };

    let target = args.output_path();
    let rendered = render(&plan, &target)?;
    fs::write(&target, rendered)?;

    info!(
        output = %target.display(),
        services = plan.collection.services.len(),
        endpoints = plan.collection.endpoints().count(),
        "wrote router plan"
    );
    Ok(target)
}

/// Serializes `plan` in the format selected by the extension of `target`.
fn render(plan: &RouterPlan, target: &Path) -> AppResult<String> {
    match target.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => Ok(serde_yaml::to_string(plan)?),
        _ => Ok(serde_json::to_string_pretty(plan)? + "\n"),
    }
}
