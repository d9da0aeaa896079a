//! # paramcheck CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use paramcheck_cli::check::{run_check, CheckArgs};
use paramcheck_cli::lint::{run_lint, LintArgs};
use paramcheck_cli::EXIT_ERROR;

/// Declarative request-parameter validation tooling.
///
/// Lints rules files and checks individual query strings or request bodies
/// against a declared route, using the same engine as the HTTP middleware.
#[derive(Parser, Debug)]
#[command(name = "paramcheck", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load and compile a rules file, listing its routes.
    Lint(LintArgs),

    /// Validate one query string or request body against a declared route.
    Check(CheckArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("paramcheck CLI starting");

    let result = match cli.command {
        Commands::Lint(args) => run_lint(&args),
        Commands::Check(args) => run_check(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}
