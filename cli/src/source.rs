//! # Source Arguments
//!
//! Options shared by every command that analyzes a package folder.

use flowheater_core::{analyze_package, parse_package, AppResult, NativeTypes, ServiceCollection};
use std::path::PathBuf;
use tracing::{debug, info};

/// Where to read declarations from.
#[derive(clap::Args, Debug, Clone)]
pub struct SourceArgs {
    /// Folder holding the annotated service sources (not searched recursively).
    #[clap(long, env = "FLOWHEATER_PACKAGE", default_value = "./rest")]
    pub package: PathBuf,

    /// YAML file overriding the native request, writer and context types.
    #[clap(long)]
    pub natives: Option<PathBuf>,
}

impl SourceArgs {
    /// Native types to use, defaults unless `--natives` is given.
    pub fn native_types(&self) -> AppResult<NativeTypes> {
        match &self.natives {
            Some(path) => {
                debug!(natives = %path.display(), "loading native types");
                NativeTypes::from_yaml_file(path)
                    .map_err(|e| e.within(format!("reading {}", path.display())))
            }
            None => Ok(NativeTypes::default()),
        }
    }

    /// Parses and analyzes the package folder.
    pub fn analyze(&self) -> AppResult<ServiceCollection> {
        let natives = self.native_types()?;
        info!(package = %self.package.display(), "parsing package");
        let package = parse_package(&self.package)?;
        analyze_package(&package, &natives)
    }
}
