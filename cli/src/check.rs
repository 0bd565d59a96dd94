//! # Check Command
//!
//! Runs the full analysis and prints what would be generated, without
//! writing anything.

use crate::source::SourceArgs;
use flowheater_core::{AppResult, ServiceCollection};

/// Arguments for the check command.
#[derive(clap::Args, Debug, Clone)]
pub struct CheckArgs {
    /// Package to analyze.
    #[clap(flatten)]
    pub source: SourceArgs,
}

/// Executes the check command.
pub fn execute(args: &CheckArgs) -> AppResult<()> {
    let collection = args.source.analyze()?;
    print!("{}", summary(&collection));
    Ok(())
}

/// One line per route plus the referenced resolvers.
pub fn summary(collection: &ServiceCollection) -> String {
    let mut out = format!("package {}\n", collection.package_name);

    for service in &collection.services {
        for endpoint in &service.endpoints {
            out.push_str(&format!(
                "  {:<7} {} -> {} ({} steps)\n",
                endpoint.method,
                service.route(endpoint),
                endpoint.wrapper_func(),
                endpoint.steps.len()
            ));
        }
    }

    for resolver in &collection.resolvers {
        let fallible = if resolver.fallible { " (fallible)" } else { "" };
        out.push_str(&format!(
            "  resolver {} -> {}{}\n",
            resolver.resolver, resolver.ty, fallible
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_summary_lists_routes_and_resolvers() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("api.rs"),
            r#"
/// Path: /account
pub struct Account;

impl Account {
    /// Path: /
    /// Method: post
    pub fn update(&self, user: CurrentUser, body: Profile) {}
}

/// Resolve: true
pub fn current_user(token: String) -> Result<CurrentUser, Error> {
    todo!()
}
"#,
        )
        .unwrap();

        let args = CheckArgs {
            source: SourceArgs {
                package: dir.path().to_path_buf(),
                natives: None,
            },
        };
        let collection = args.source.analyze().unwrap();
        let text = summary(&collection);

        assert!(text.contains("POST    /account -> _handle_Account_update (3 steps)"));
        assert!(text.contains("resolver current_user -> "));
        assert!(text.contains("(fallible)"));
        assert!(text.starts_with("package "));
        assert_eq!(text.lines().count(), 3);
        assert!(text.ends_with('\n'));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_custom_natives() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("api.rs"),
            r#"
use hyper::Request;

/// Path: /ping
pub struct Ping;

impl Ping {
    /// Path: /
    pub fn ping(&self, req: &Request) {}
}
"#,
        )
        .unwrap();
        let natives = dir.path().join("natives.yaml");
        fs::write(
            &natives,
            "request:\n  name: Request\n  package: hyper\n  pointer_depth: 1\n  var: req\n",
        )
        .unwrap();

        let source = SourceArgs {
            package: dir.path().to_path_buf(),
            natives: Some(natives),
        };
        let collection = source.analyze().unwrap();
        let endpoint = &collection.services[0].endpoints[0];
        assert!(endpoint.steps.is_empty());
        assert_eq!(endpoint.args[0].var, "req");
    }
}
