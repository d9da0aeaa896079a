//! # paramcheck-cli: Rules Tooling
//!
//! Provides the `paramcheck` command-line interface for working with rules
//! files outside a running server.
//!
//! ## Subcommands
//!
//! - `paramcheck lint`: Load and compile a rules file, list its routes.
//! - `paramcheck check`: Validate one query string or body against a route.
//!
//! ```bash
//! paramcheck lint rules.yaml
//! paramcheck check --rules rules.yaml --route /search --query 'q=rust&page=2'
//! paramcheck check --rules rules.yaml --route /submit --method post \
//!     --content-type application/json --body payload.json
//! ```
//!
//! ## Exit Codes
//!
//! | Code | Meaning                                      |
//! |------|----------------------------------------------|
//! | 0    | Rules load / input accepted                  |
//! | 1    | Rules invalid / input rejected               |
//! | 2    | Operational error (unreadable file, no route)|

pub mod check;
pub mod lint;

/// Exit code for success.
pub const EXIT_OK: u8 = 0;
/// Exit code for invalid rules or rejected input.
pub const EXIT_REJECTED: u8 = 1;
/// Exit code for operational errors.
pub const EXIT_ERROR: u8 = 2;
