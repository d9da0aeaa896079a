//! # Lint Subcommand
//!
//! Loads a rules file the same way the server does and prints one line per
//! route. A file that lints cleanly will not fail at server startup.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;

use paramcheck_core::{RouteRule, RuleSet, RulesError};

use crate::{EXIT_OK, EXIT_REJECTED};

/// Arguments for the `paramcheck lint` subcommand.
#[derive(Args, Debug)]
pub struct LintArgs {
    /// Rules file (YAML or JSON).
    #[arg(value_name = "RULES")]
    pub rules: PathBuf,
}

/// Execute the lint subcommand.
///
/// Returns exit code: 0 when the rules load, 1 when they are invalid. An
/// unreadable file is an operational error.
pub fn run_lint(args: &LintArgs) -> Result<u8> {
    match lint_file(&args.rules)? {
        Ok(rules) => {
            for route in &rules.routes {
                println!("{}", describe(route));
            }
            println!("OK: {} route(s)", rules.routes.len());
            Ok(EXIT_OK)
        }
        Err(err) => {
            println!("FAIL: {}: {err}", args.rules.display());
            Ok(EXIT_REJECTED)
        }
    }
}

/// Load `path`, separating I/O failures from invalid content.
pub fn lint_file(path: &Path) -> Result<Result<RuleSet, RulesError>> {
    match RuleSet::load(path) {
        Err(err @ RulesError::Io { .. }) => Err(err.into()),
        other => Ok(other),
    }
}

/// One summary line: method, path, accepted types and fields.
pub fn describe(route: &RouteRule) -> String {
    let fields = route
        .fields
        .iter()
        .map(|(name, spec)| format!("{name}: {spec}"))
        .collect::<Vec<_>>()
        .join(", ");
    let accept = match &route.accept {
        Some(types) => format!(" accept=[{}]", types.join(", ")),
        None => String::new(),
    };
    format!("{:<4} {}{accept} {{{fields}}}", route.method.as_str(), route.path)
}
