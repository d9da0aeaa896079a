#![deny(missing_docs)]

//! # paramcheck-core: Declarative Request Parameter Validation
//!
//! Callers declare, per field, which shapes of value are acceptable using a
//! small type-specification language, and the engine checks a decoded query
//! string or request body against that declaration. The first violation is
//! reported as a structured [`ValidationError`]; nothing is coerced or
//! returned on success.
//!
//! ## Type-Spec Language
//!
//! | Spec                | Accepts                                                  |
//! |---------------------|----------------------------------------------------------|
//! | `"string"`          | non-empty text without control characters                |
//! | `"number"`          | text that is entirely a finite decimal literal           |
//! | `"integer"`         | text whose numeric value is finite and integral          |
//! | `"boolean"`         | checkbox semantics: absent, `"1"`, `""`, native booleans |
//! | `"array"`           | a list of any length                                     |
//! | `"object"`          | a mapping                                                |
//! | `"null"`            | null                                                     |
//! | `"?<primitive>"`    | absent, `""` or null, otherwise the primitive            |
//! | `/regex/`           | text (absent counts as `""`) containing a match          |
//! | `[spec, spec, ...]` | any member                                               |
//!
//! ## Crate Policy
//!
//! - Evaluation is pure and total: [`TypeSpec::accepts`] never errors.
//! - Malformed specs are rejected at construction ([`SpecError`]), never at
//!   request time.
//! - The content-type precondition is an injected [`ContentTypeMatcher`];
//!   nothing here reads ambient state.

pub mod body;
pub mod error;
pub mod media;
pub mod number;
pub mod query;
pub mod rules;
pub mod spec;
pub mod validate;
pub mod value;

// Re-export primary types at crate root for ergonomic imports.
pub use body::BodyFormat;
pub use error::{DecodeError, ErrorCode, RulesError, SpecError, ValidationError};
pub use media::{ContentTypeMatcher, MediaTypeMatcher};
pub use rules::{HttpMethod, RouteRule, RuleSet};
pub use spec::{check_key, FieldSet, Primitive, TypeSpec};
pub use validate::{validate, InputSource, ValidateOptions, Validator};
pub use value::{RawInput, RawValue};
