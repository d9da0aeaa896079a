//! # Declared Routes
//!
//! Mounts one endpoint per [`RouteRule`]. GET routes sit behind
//! [`query_middleware`]; POST routes behind [`body_middleware`] with the
//! configured body limit. The handlers only acknowledge the request, so the
//! server doubles as a live checker for a rules file.

use axum::body::Bytes;
use axum::extract::DefaultBodyLimit;
use axum::http::Uri;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post, MethodRouter};
use axum::{Json, Router};
use serde::Serialize;

use paramcheck_core::{HttpMethod, RouteRule, RuleSet};

use crate::error::ApiError;
use crate::middleware::{body_middleware, query_middleware, BodyRules, QueryRules};

/// Acknowledgement returned once a request has passed validation.
#[derive(Debug, Serialize)]
pub struct Accepted {
    /// Always `"ok"`.
    pub status: &'static str,
    /// The matched route.
    pub route: String,
    /// Size of the request body, for POST routes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_bytes: Option<usize>,
}

/// Paths served by the health checks; rules may not shadow them.
pub const RESERVED_PATHS: [&str; 2] = ["/health/liveness", "/health/readiness"];

/// Build a router serving every route in `rules`.
///
/// Routes declared on a [`RESERVED_PATHS`] entry are skipped with a warning.
pub fn router(rules: &RuleSet, body_limit: usize) -> Router {
    let routes = rules.routes.iter().filter(|rule| {
        let reserved = RESERVED_PATHS.contains(&rule.path.as_str());
        if reserved {
            tracing::warn!(path = %rule.path, "route shadows a health check; skipped");
        }
        !reserved
    });
    let router = routes.fold(Router::new(), |router, rule| {
        tracing::debug!(
            method = %rule.method,
            path = %rule.path,
            fields = rule.fields.len(),
            "mounting route"
        );
        router.route(&rule.path, endpoint(rule, body_limit))
    });
    router.fallback(not_found)
}

fn endpoint(rule: &RouteRule, body_limit: usize) -> MethodRouter {
    let path = rule.path.clone();
    match rule.method {
        HttpMethod::Get => {
            let rules = QueryRules::from_validator(rule.validator());
            get(move || {
                let route = path.clone();
                async move {
                    Json(Accepted {
                        status: "ok",
                        route,
                        body_bytes: None,
                    })
                }
            })
            .route_layer(from_fn_with_state(rules, query_middleware))
        }
        HttpMethod::Post => {
            let rules = BodyRules::from_validator(rule.validator()).with_limit(body_limit);
            post(move |body: Bytes| {
                let route = path.clone();
                async move {
                    Json(Accepted {
                        status: "ok",
                        route,
                        body_bytes: Some(body.len()),
                    })
                }
            })
            .route_layer(from_fn_with_state(rules, body_middleware))
            .layer(DefaultBodyLimit::max(body_limit))
        }
    }
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(uri.path().to_string())
}
