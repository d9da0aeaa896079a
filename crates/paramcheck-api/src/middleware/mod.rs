//! # Middleware Modules
//!
//! Tower middleware layers for the validation service.

pub mod tracing_layer;
pub mod validate;

pub use validate::{body_middleware, query_middleware, validate_get, validate_post, BodyRules, QueryRules};
