//! # Application State
//!
//! Server configuration and the loaded rules. Both are immutable after
//! startup; the router is built from them once.

use std::path::PathBuf;
use std::sync::Arc;

use paramcheck_core::{RuleSet, RulesError};

use crate::body::DEFAULT_BODY_LIMIT;

/// Errors while reading configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `PORT` is not a valid port number.
    #[error("invalid PORT value: {0:?}")]
    InvalidPort(String),

    /// `PARAMCHECK_BODY_LIMIT` is not a byte count.
    #[error("invalid PARAMCHECK_BODY_LIMIT value: {0:?}")]
    InvalidBodyLimit(String),
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Listen port.
    pub port: u16,
    /// Rules file to serve. `None` serves only the health checks.
    pub rules_path: Option<PathBuf>,
    /// Maximum request body size in bytes.
    pub body_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            rules_path: None,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `PORT` (default: 8080)
    /// - `PARAMCHECK_RULES` (optional path to a YAML/JSON rules file)
    /// - `PARAMCHECK_BODY_LIMIT` (default: 1048576)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidPort(raw))?,
            None => defaults.port,
        };
        let body_limit = match lookup("PARAMCHECK_BODY_LIMIT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidBodyLimit(raw))?,
            None => defaults.body_limit,
        };
        let rules_path = lookup("PARAMCHECK_RULES")
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            port,
            rules_path,
            body_limit,
        })
    }
}

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: AppConfig,
    /// The routes to serve.
    pub rules: Arc<RuleSet>,
}

impl AppState {
    /// Bundle configuration with loaded rules.
    pub fn new(config: AppConfig, rules: RuleSet) -> Self {
        Self {
            config,
            rules: Arc::new(rules),
        }
    }

    /// Load the configured rules file, or start with no routes.
    pub fn load(config: AppConfig) -> Result<Self, RulesError> {
        let rules = match &config.rules_path {
            Some(path) => {
                let rules = RuleSet::load(path)?;
                tracing::info!(
                    path = %path.display(),
                    routes = rules.routes.len(),
                    "loaded validation rules"
                );
                rules
            }
            None => {
                tracing::warn!("PARAMCHECK_RULES not set; serving health checks only");
                RuleSet::default()
            }
        };
        Ok(Self::new(config, rules))
    }
}
