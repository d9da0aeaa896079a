//! # Error Hierarchy
//!
//! Structured error types built with `thiserror`. No `Box<dyn Error>`, no
//! `.unwrap()` outside tests.
//!
//! [`ValidationError`] is the only error that crosses the request boundary.
//! [`SpecError`] and [`RulesError`] are configuration-time failures: a field
//! set that cannot be compiled never reaches request handling.

use thiserror::Error;

/// Machine-readable error codes carried by [`ValidationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// A declared field did not satisfy its type spec.
    BadParam,
    /// The request body's media type is not in the accepted set.
    BadContentType,
}

impl ErrorCode {
    /// Return the wire representation of this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BadParam => "E_BAD_PARAM",
            Self::BadContentType => "E_BAD_CONTENT_TYPE",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request rejected by the field-set validator.
///
/// Exactly one is produced per failed validation: the first field that
/// failed, or the content-type precondition, whichever was checked first.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A declared field's value did not satisfy its type spec.
    #[error("missing or invalid parameter {key}")]
    BadParam {
        /// Name of the offending field.
        key: String,
    },

    /// The body's declared media type did not satisfy the accepted set.
    #[error("invalid content-type")]
    BadContentType,
}

impl ValidationError {
    /// Build a parameter error for `key`.
    pub fn bad_param(key: impl Into<String>) -> Self {
        Self::BadParam { key: key.into() }
    }

    /// HTTP status for this error: 400 for parameters, 415 for content types.
    pub fn status(&self) -> u16 {
        match self {
            Self::BadParam { .. } => 400,
            Self::BadContentType => 415,
        }
    }

    /// Machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::BadParam { .. } => ErrorCode::BadParam,
            Self::BadContentType => ErrorCode::BadContentType,
        }
    }

    /// The offending field, or `None` for content-type failures.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::BadParam { key } => Some(key),
            Self::BadContentType => None,
        }
    }
}

/// A type spec that cannot be compiled.
#[derive(Error, Debug)]
pub enum SpecError {
    /// The primitive name is not one of the recognized kinds.
    #[error("unknown primitive type \"{0}\" (expected null, array, string, boolean, number, integer or object)")]
    UnknownPrimitive(String),

    /// The regular expression failed to compile.
    #[error("invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        /// The pattern source as written.
        pattern: String,
        /// The underlying compile error.
        #[source]
        source: regex::Error,
    },

    /// A `/.../` pattern literal carried a flag other than `i`, `m`, `s`, `u`.
    #[error("unsupported pattern flag '{flag}' in {literal:?}")]
    UnsupportedFlag {
        /// The full literal as written.
        literal: String,
        /// The offending flag character.
        flag: char,
    },

    /// An alternation listed another alternation as a member.
    #[error("alternations cannot be nested")]
    NestedAlternation,

    /// The same field was declared twice in one field set.
    #[error("duplicate field \"{0}\"")]
    DuplicateField(String),
}

/// Errors while loading a rules file.
#[derive(Error, Debug)]
pub enum RulesError {
    /// The file could not be read.
    #[error("failed to read rules file {path}: {source}")]
    Io {
        /// Path that was read.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid YAML/JSON or does not match the rules shape.
    #[error("failed to parse rules: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The same method and path were declared twice.
    #[error("duplicate route {method} {path}")]
    DuplicateRoute {
        /// HTTP method of the duplicate.
        method: String,
        /// Path of the duplicate.
        path: String,
    },

    /// `accept` was configured on a route that does not read a body.
    #[error("route {path}: accept is only meaningful for POST routes")]
    AcceptOnQueryRoute {
        /// Path of the offending route.
        path: String,
    },

    /// `accept` was given as an empty list, which no body could satisfy.
    #[error("route {path}: accept must name at least one media type")]
    EmptyAccept {
        /// Path of the offending route.
        path: String,
    },

    /// The path is not a literal absolute path.
    #[error("invalid route path {path:?}: must start with '/' and contain no captures")]
    InvalidPath {
        /// The rejected path.
        path: String,
    },
}

/// A request body that could not be decoded into fields.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The body was declared as JSON but does not parse.
    #[error("malformed JSON body: {0}")]
    MalformedJson(#[from] serde_json::Error),
}
