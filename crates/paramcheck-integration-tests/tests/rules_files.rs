//! # Rules Files Across Crates
//!
//! One rules file on disk must mean the same thing to the server loader and
//! to both CLI subcommands.

use std::path::PathBuf;

use paramcheck_api::state::{AppConfig, AppState};
use paramcheck_cli::check::{evaluate, run_check, CheckArgs, MethodArg};
use paramcheck_cli::lint::{run_lint, LintArgs};
use paramcheck_cli::{EXIT_OK, EXIT_REJECTED};
use paramcheck_core::{ErrorCode, HttpMethod};

const RULES: &str = r#"
routes:
  - path: /search
    fields:
      q: string
      tags: [array, "?string"]
  - path: /submit
    method: POST
    accept: "+json"
    fields:
      name: string
"#;

fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn check_args(rules: PathBuf, route: &str, method: MethodArg) -> CheckArgs {
    CheckArgs {
        rules,
        route: route.to_string(),
        method,
        query: None,
        body: None,
        content_type: None,
    }
}

#[test]
fn server_loads_the_same_routes_lint_reports() {
    let dir = tempfile::tempdir().unwrap();
    let rules = write(&dir, "rules.yaml", RULES);

    assert_eq!(run_lint(&LintArgs { rules: rules.clone() }).unwrap(), EXIT_OK);

    let config = AppConfig {
        rules_path: Some(rules),
        ..AppConfig::default()
    };
    let state = AppState::load(config).unwrap();
    assert_eq!(state.rules.routes.len(), 2);
    assert!(state.rules.find(HttpMethod::Post, "/submit").is_some());
}

#[test]
fn json_rules_files_are_equivalent() {
    let dir = tempfile::tempdir().unwrap();
    let rules = write(
        &dir,
        "rules.json",
        r#"{"routes": [{"path": "/search", "fields": {"q": "string"}}]}"#,
    );
    let mut args = check_args(rules, "/search", MethodArg::Get);
    args.query = Some("q=hello".into());
    assert_eq!(run_check(&args).unwrap(), EXIT_OK);
}

#[test]
fn invalid_rules_fail_lint_and_server_load() {
    let dir = tempfile::tempdir().unwrap();
    let rules = write(
        &dir,
        "rules.yaml",
        "routes:\n  - path: /a\n    fields:\n      x: [[string]]\n",
    );
    assert_eq!(run_lint(&LintArgs { rules: rules.clone() }).unwrap(), EXIT_REJECTED);

    let config = AppConfig {
        rules_path: Some(rules),
        ..AppConfig::default()
    };
    assert!(AppState::load(config).is_err());
}

#[test]
fn check_query_with_repeated_keys() {
    let dir = tempfile::tempdir().unwrap();
    let rules = write(&dir, "rules.yaml", RULES);

    let mut args = check_args(rules, "/search", MethodArg::Get);
    args.query = Some("q=x&tags=a&tags=b".into());
    assert_eq!(evaluate(&args).unwrap(), Ok(()));

    args.query = Some("q=x&tags[k]=a".into());
    let err = evaluate(&args).unwrap().unwrap_err();
    assert_eq!(err.key(), Some("tags"));
}

#[test]
fn check_body_with_suffix_media_type() {
    let dir = tempfile::tempdir().unwrap();
    let rules = write(&dir, "rules.yaml", RULES);
    let body = write(&dir, "body.json", r#"{"name":"ada"}"#);

    let mut args = check_args(rules, "/submit", MethodArg::Post);
    args.body = Some(body);
    args.content_type = Some("application/vnd.example+json".into());
    assert_eq!(run_check(&args).unwrap(), EXIT_OK);

    args.content_type = Some("application/json".into());
    let err = evaluate(&args).unwrap().unwrap_err();
    assert_eq!(err.code(), ErrorCode::BadContentType);
}
