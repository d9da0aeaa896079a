//! # Rules Files
//!
//! Endpoint declarations loaded from YAML (or JSON, which `serde_yaml` also
//! reads). Every route names a path, a method, an optional accepted media-type
//! set and its field set:
//!
//! ```yaml
//! routes:
//!   - path: /search
//!     method: GET
//!     fields:
//!       q: string
//!       page: "?integer"
//!   - path: /submit
//!     method: POST
//!     accept: [json, urlencoded]
//!     fields:
//!       name: string
//!       mode: { pattern: "^(fast|slow)$" }
//!       tags: [array, "?string"]
//! ```
//!
//! GET routes validate the query string; POST routes validate the body.
//! Specs are compiled while loading, so a rules file that loads cleanly can
//! never fail at request time for configuration reasons.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use crate::error::RulesError;
use crate::spec::FieldSet;
use crate::validate::{InputSource, ValidateOptions, Validator};

/// The request methods a route can be declared for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
pub enum HttpMethod {
    /// Query-string validation.
    #[default]
    #[serde(rename = "GET", alias = "get")]
    Get,
    /// Body validation, with the optional content-type precondition.
    #[serde(rename = "POST", alias = "post")]
    Post,
}

impl HttpMethod {
    /// Upper-case method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }

    /// Which part of the request this method validates.
    pub fn source(&self) -> InputSource {
        match self {
            Self::Get => InputSource::Query,
            Self::Post => InputSource::Body,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declared endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteRule {
    /// Request path, e.g. `/search`.
    pub path: String,
    /// Request method; defaults to GET.
    #[serde(default)]
    pub method: HttpMethod,
    /// Accepted body media types (a single entry or a list).
    #[serde(default, deserialize_with = "one_or_many")]
    pub accept: Option<Vec<String>>,
    /// The declared fields.
    #[serde(default)]
    pub fields: FieldSet,
}

impl RouteRule {
    /// Build the validator for this route.
    pub fn validator(&self) -> Validator {
        Validator::new(
            self.fields.clone(),
            ValidateOptions {
                accept: self.accept.clone(),
            },
        )
    }
}

/// A whole rules file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSet {
    /// Declared routes, in file order.
    #[serde(default)]
    pub routes: Vec<RouteRule>,
}

impl RuleSet {
    /// Parse and check a YAML or JSON document.
    pub fn from_yaml_str(source: &str) -> Result<Self, RulesError> {
        let rules: RuleSet = serde_yaml::from_str(source)?;
        rules.check()?;
        Ok(rules)
    }

    /// Read and parse a rules file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RulesError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| RulesError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&source)
    }

    /// Find the route declared for `method` and `path`.
    pub fn find(&self, method: HttpMethod, path: &str) -> Option<&RouteRule> {
        self.routes
            .iter()
            .find(|r| r.method == method && r.path == path)
    }

    fn check(&self) -> Result<(), RulesError> {
        let mut seen = HashSet::new();
        for route in &self.routes {
            if !is_literal_path(&route.path) {
                return Err(RulesError::InvalidPath {
                    path: route.path.clone(),
                });
            }
            if !seen.insert((route.method, route.path.as_str())) {
                return Err(RulesError::DuplicateRoute {
                    method: route.method.to_string(),
                    path: route.path.clone(),
                });
            }
            if route.accept.as_ref().is_some_and(Vec::is_empty) {
                return Err(RulesError::EmptyAccept {
                    path: route.path.clone(),
                });
            }
            if route.accept.is_some() && route.method == HttpMethod::Get {
                return Err(RulesError::AcceptOnQueryRoute {
                    path: route.path.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Absolute, with no `{capture}`, `:param` or `*wildcard` segments.
fn is_literal_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.contains(['{', '}'])
        && path
            .split('/')
            .all(|segment| !segment.starts_with([':', '*']))
}

fn one_or_many<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<String>>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(Some(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
    }))
}
