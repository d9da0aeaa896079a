//! # paramcheck-api: Axum Validation Middleware
//!
//! HTTP boundary for `paramcheck-core`. Declared field sets become
//! middleware that rejects a request before it reaches its handler.
//!
//! ## Surface
//!
//! | Item                                   | Purpose                                  |
//! |----------------------------------------|------------------------------------------|
//! | [`middleware::validate_get`]           | Query-string rules for a GET route       |
//! | [`middleware::validate_post`]          | Content-type + body rules for a POST     |
//! | [`error::ApiError`]                    | JSON error envelope (400/413/415/404)    |
//! | [`app`]                                | Demo server built from a rules file      |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → {query,body}_middleware → Handler
//! ```
//!
//! ## Rejection Body
//!
//! ```json
//! { "error": { "code": "E_BAD_PARAM", "message": "missing or invalid parameter foo", "key": "foo" } }
//! ```

pub mod body;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;

/// Assemble the application router: health checks plus every declared route.
pub fn app(state: AppState) -> Router {
    let health = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness));

    Router::new()
        .merge(health)
        .merge(routes::router(&state.rules, state.config.body_limit))
        .layer(middleware::tracing_layer::layer())
}

/// Liveness check: always 200 while the process runs.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness check: rules are loaded before the listener binds, so a
/// running server is ready.
async fn readiness() -> &'static str {
    "ready"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppConfig;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use paramcheck_core::RuleSet;
    use tower::ServiceExt;

    const RULES: &str = r#"
routes:
  - path: /search
    fields:
      q: string
      page: "?integer"
  - path: /submit
    method: POST
    accept: [json, urlencoded]
    fields:
      name: string
      tags: [array, "?string"]
  - path: /health/liveness
    fields:
      never: string
"#;

    fn test_app() -> Router {
        let rules = RuleSet::from_yaml_str(RULES).unwrap();
        app(AppState::new(AppConfig::default(), rules))
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn health_checks_answer() {
        let resp = test_app()
            .oneshot(Request::get("/health/liveness").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_string(resp).await, "ok");

        let resp = test_app()
            .oneshot(Request::get("/health/readiness").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(body_string(resp).await, "ready");
    }

    #[tokio::test]
    async fn get_route_validates_query() {
        let resp = test_app()
            .oneshot(Request::get("/search?q=rust&page=2").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
        assert_eq!(json["route"], "/search");

        let resp = test_app()
            .oneshot(Request::get("/search?q=rust&page=two").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn post_route_validates_body() {
        let req = Request::post("/submit")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"name":"ada","tags":["a","b"]}"#))
            .unwrap();
        let resp = test_app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
        assert_eq!(json["body_bytes"], 31);

        let req = Request::post("/submit")
            .header("content-type", "text/plain")
            .body(Body::from("name=ada"))
            .unwrap();
        let resp = test_app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn unknown_path_is_404_json() {
        let resp = test_app()
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let json: serde_json::Value = serde_json::from_str(&body_string(resp).await).unwrap();
        assert_eq!(json["error"]["code"], "E_NOT_FOUND");
    }

    #[tokio::test]
    async fn undeclared_method_is_405() {
        let resp = test_app()
            .oneshot(Request::get("/submit").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
