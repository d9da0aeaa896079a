//! # Check Subcommand
//!
//! Validates a single input against one declared route, exactly as the
//! server's middleware would: GET routes read `--query`, POST routes check
//! `--content-type` against the route's accepted set and then decode
//! `--body` by that content type.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;

use paramcheck_core::{body, query, HttpMethod, RawInput, RuleSet, ValidationError};

use crate::{EXIT_OK, EXIT_REJECTED};

/// Request method selector for `--method`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum MethodArg {
    /// Validate `--query`.
    #[default]
    Get,
    /// Validate `--body`.
    Post,
}

impl From<MethodArg> for HttpMethod {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Get => HttpMethod::Get,
            MethodArg::Post => HttpMethod::Post,
        }
    }
}

/// Arguments for the `paramcheck check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Rules file (YAML or JSON).
    #[arg(long, value_name = "RULES")]
    pub rules: PathBuf,

    /// Declared route path, e.g. `/search`.
    #[arg(long)]
    pub route: String,

    /// Request method of the route.
    #[arg(long, value_enum, default_value_t = MethodArg::Get)]
    pub method: MethodArg,

    /// Query string for GET routes, without the leading `?`.
    #[arg(long, value_name = "QS")]
    pub query: Option<String>,

    /// File holding the request body for POST routes.
    #[arg(long, value_name = "FILE")]
    pub body: Option<PathBuf>,

    /// Declared `Content-Type` of the body.
    #[arg(long, value_name = "CT")]
    pub content_type: Option<String>,
}

/// JSON report printed for a rejected input.
#[derive(Debug, Serialize)]
struct Rejection<'a> {
    status: u16,
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    key: Option<&'a str>,
}

impl<'a> From<&'a ValidationError> for Rejection<'a> {
    fn from(err: &'a ValidationError) -> Self {
        Self {
            status: err.status(),
            code: err.code().as_str(),
            message: err.to_string(),
            key: err.key(),
        }
    }
}

/// Execute the check subcommand.
///
/// Returns exit code: 0 when the input is accepted, 1 when it is rejected.
/// Unreadable files, invalid rules, undeclared routes and undecodable
/// bodies are operational errors.
pub fn run_check(args: &CheckArgs) -> Result<u8> {
    match evaluate(args)? {
        Ok(()) => {
            println!("ok");
            Ok(EXIT_OK)
        }
        Err(err) => {
            let report = serde_json::to_string(&Rejection::from(&err))
                .context("failed to serialize rejection")?;
            println!("{report}");
            Ok(EXIT_REJECTED)
        }
    }
}

/// Run validation, separating rejections from operational failures.
pub fn evaluate(args: &CheckArgs) -> Result<Result<(), ValidationError>> {
    let rules = RuleSet::load(&args.rules)
        .with_context(|| format!("failed to load rules from {}", args.rules.display()))?;

    let method = HttpMethod::from(args.method);
    let Some(route) = rules.find(method, &args.route) else {
        bail!("no {method} route declared for {}", args.route);
    };
    let validator = route.validator();

    tracing::debug!(
        method = %method,
        path = %route.path,
        fields = route.fields.len(),
        "checking input"
    );

    match method {
        HttpMethod::Get => {
            if args.body.is_some() {
                tracing::warn!("--body is ignored for GET routes");
            }
            let input = query::parse(args.query.as_deref().unwrap_or_default());
            Ok(validator.check_query(&input))
        }
        HttpMethod::Post => {
            let content_type = args.content_type.as_deref();
            if let Err(err) = validator.check_content_type(content_type) {
                return Ok(Err(err));
            }
            let input = read_body(args)?;
            Ok(paramcheck_core::validate(&input, validator.fields()))
        }
    }
}

fn read_body(args: &CheckArgs) -> Result<RawInput> {
    let bytes = match &args.body {
        Some(path) => std::fs::read(path)
            .with_context(|| format!("failed to read body from {}", path.display()))?,
        None => Vec::new(),
    };
    body::decode(args.content_type.as_deref(), &bytes).context("failed to decode body")
}
