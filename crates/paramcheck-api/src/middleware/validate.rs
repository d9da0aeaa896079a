//! # Validation Middleware
//!
//! Two factories mirror the two input sources:
//!
//! - [`validate_get`]: checks the query string.
//! - [`validate_post`]: checks the content-type precondition, then the
//!   decoded body.
//!
//! Each returns cloneable rules to install with
//! `axum::middleware::from_fn_with_state` next to the matching middleware
//! function:
//!
//! ```ignore
//! let search = get(handler).route_layer(from_fn_with_state(
//!     validate_get(fields),
//!     query_middleware,
//! ));
//! ```
//!
//! On success the request reaches the next service unchanged (the body is
//! re-attached byte for byte). On failure the next service is not called and
//! the first violation is rendered through [`ApiError`].

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::middleware::Next;
use axum::response::Response;

use paramcheck_core::{
    query, ContentTypeMatcher, FieldSet, RawInput, ValidateOptions, ValidationError, Validator,
};

use crate::body::{self, DEFAULT_BODY_LIMIT};
use crate::error::ApiError;

/// Rules for query-string validation.
#[derive(Debug, Clone)]
pub struct QueryRules {
    validator: Validator,
}

/// Rules for body validation.
#[derive(Debug, Clone)]
pub struct BodyRules {
    validator: Validator,
    limit: usize,
}

/// Build query-string rules for `fields`.
pub fn validate_get(fields: FieldSet) -> QueryRules {
    QueryRules {
        validator: Validator::new(fields, ValidateOptions::default()),
    }
}

/// Build body rules for `fields`, with an optional accepted media-type set.
pub fn validate_post(fields: FieldSet, options: ValidateOptions) -> BodyRules {
    BodyRules {
        validator: Validator::new(fields, options),
        limit: DEFAULT_BODY_LIMIT,
    }
}

impl QueryRules {
    /// Wrap an already-built validator.
    pub fn from_validator(validator: Validator) -> Self {
        Self { validator }
    }
}

impl BodyRules {
    /// Wrap an already-built validator.
    pub fn from_validator(validator: Validator) -> Self {
        Self {
            validator,
            limit: DEFAULT_BODY_LIMIT,
        }
    }

    /// Maximum body size in bytes.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Replace the content-type matcher.
    pub fn with_matcher(mut self, matcher: impl ContentTypeMatcher + 'static) -> Self {
        self.validator = self.validator.with_matcher(matcher);
        self
    }
}

/// Validate the query string against [`QueryRules`].
pub async fn query_middleware(
    State(rules): State<QueryRules>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let input = query::parse(req.uri().query().unwrap_or_default());
    rules
        .validator
        .check_query(&input)
        .map_err(|err| rejected(req.uri().path(), Some(&input), err))?;
    Ok(next.run(req).await)
}

/// Validate the content type and body against [`BodyRules`].
///
/// The content type is checked before the body is read.
pub async fn body_middleware(
    State(rules): State<BodyRules>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let path = req.uri().path().to_string();

    rules
        .validator
        .check_content_type(content_type.as_deref())
        .map_err(|err| rejected(&path, None, err))?;

    let (parts, body) = req.into_parts();
    let bytes = body::collect(body, rules.limit).await.map_err(|err| {
        tracing::warn!(path = %path, error = %err, "failed to read request body");
        err
    })?;
    let input = body::decode(content_type.as_deref(), &bytes).map_err(|err| {
        tracing::debug!(path = %path, error = %err, "failed to decode request body");
        err
    })?;

    paramcheck_core::validate(&input, rules.validator.fields())
        .map_err(|err| rejected(&path, Some(&input), err))?;

    let req = Request::from_parts(parts, Body::from(bytes));
    Ok(next.run(req).await)
}

fn rejected(path: &str, input: Option<&RawInput>, err: ValidationError) -> ApiError {
    tracing::debug!(
        path = %path,
        code = %err.code(),
        key = err.key().unwrap_or("-"),
        value = rejected_kind(input, &err),
        "request rejected"
    );
    ApiError::Validation(err)
}

/// Shape of the offending value, without its content.
fn rejected_kind(input: Option<&RawInput>, err: &ValidationError) -> &'static str {
    match (input, err.key()) {
        (Some(input), Some(key)) => input.get(key).kind(),
        _ => "-",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;
    use axum::http::StatusCode;
    use axum::middleware::from_fn_with_state;
    use axum::routing::{get, post};
    use axum::Router;
    use http_body_util::BodyExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn fields(pairs: &[(&str, &str)]) -> FieldSet {
        FieldSet::from_pairs(pairs.iter().copied()).unwrap()
    }

    fn query_app(pairs: &[(&str, &str)], hits: Arc<AtomicUsize>) -> Router {
        let handler = move || {
            let hits = Arc::clone(&hits);
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                "ok"
            }
        };
        Router::new().route(
            "/q",
            get(handler).route_layer(from_fn_with_state(
                validate_get(fields(pairs)),
                query_middleware,
            )),
        )
    }

    fn body_app(rules: BodyRules) -> Router {
        Router::new().route(
            "/b",
            post(|body: Bytes| async move { body })
                .route_layer(from_fn_with_state(rules, body_middleware)),
        )
    }

    fn get_req(uri: &str) -> Request {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_req(content_type: Option<&str>, body: &'static str) -> Request {
        let mut builder = Request::builder().method("POST").uri("/b");
        if let Some(ct) = content_type {
            builder = builder.header("content-type", ct);
        }
        builder.body(Body::from(body)).unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn rejection_reports_value_kind() {
        let set = fields(&[("n", "integer")]);
        let input = paramcheck_core::body::decode(Some("application/json"), br#"{"n": 3}"#).unwrap();
        let err = paramcheck_core::validate(&input, &set).unwrap_err();
        assert_eq!(rejected_kind(Some(&input), &err), "number");

        let err = paramcheck_core::validate(&RawInput::new(), &set).unwrap_err();
        assert_eq!(rejected_kind(Some(&RawInput::new()), &err), "absent");
        assert_eq!(rejected_kind(None, &ValidationError::BadContentType), "-");
    }

    #[tokio::test]
    async fn query_pass_calls_next_once() {
        let hits = Arc::new(AtomicUsize::new(0));
        let app = query_app(&[("foo", "string"), ("n", "?integer")], Arc::clone(&hits));
        let resp = app.oneshot(get_req("/q?foo=bar")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn query_failure_skips_handler() {
        let hits = Arc::new(AtomicUsize::new(0));
        let app = query_app(&[("foo", "string"), ("n", "integer")], Arc::clone(&hits));
        let resp = app.oneshot(get_req("/q?foo=bar&n=1.5")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["error"]["code"], "E_BAD_PARAM");
        assert_eq!(json["error"]["key"], "n");
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn query_without_string_validates_absent_fields() {
        let hits = Arc::new(AtomicUsize::new(0));
        let app = query_app(&[("foo", "string")], hits);
        let resp = app.oneshot(get_req("/q")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn body_passes_through_unchanged() {
        let app = body_app(validate_post(
            fields(&[("name", "string")]),
            ValidateOptions::accept(["json"]),
        ));
        let payload = r#"{"name":"ada"}"#;
        let resp = app
            .oneshot(post_req(Some("application/json"), payload))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], payload.as_bytes());
    }

    #[tokio::test]
    async fn wrong_content_type_is_415_even_with_valid_fields() {
        let app = body_app(validate_post(
            fields(&[("name", "string")]),
            ValidateOptions::accept(["json"]),
        ));
        let resp = app
            .oneshot(post_req(Some("application/x-www-form-urlencoded"), "name=ada"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        let json = body_json(resp).await;
        assert_eq!(json["error"]["code"], "E_BAD_CONTENT_TYPE");
        assert!(json["error"].get("key").is_none());
    }

    #[tokio::test]
    async fn form_bodies_are_validated() {
        let app = body_app(validate_post(
            fields(&[("agree", "boolean"), ("age", "integer")]),
            ValidateOptions::default(),
        ));
        let resp = app
            .clone()
            .oneshot(post_req(Some("application/x-www-form-urlencoded"), "agree=1&age=30"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = app
            .oneshot(post_req(Some("application/x-www-form-urlencoded"), "agree=yes&age=30"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["error"]["key"], "agree");
    }

    #[tokio::test]
    async fn malformed_json_is_400() {
        let app = body_app(validate_post(fields(&[]), ValidateOptions::default()));
        let resp = app
            .oneshot(post_req(Some("application/json"), "{oops"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["error"]["code"], "E_BAD_BODY");
    }

    #[tokio::test]
    async fn oversized_body_is_413() {
        let rules = validate_post(fields(&[]), ValidateOptions::default()).with_limit(4);
        let resp = body_app(rules)
            .oneshot(post_req(Some("application/json"), r#"{"a":"bcdef"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn injected_matcher_replaces_default() {
        let rules = validate_post(fields(&[]), ValidateOptions::accept(["ignored"]))
            .with_matcher(|ct: Option<&str>, _: &[String]| ct == Some("x/custom"));
        let app = body_app(rules);
        let resp = app
            .clone()
            .oneshot(post_req(Some("x/custom"), ""))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let resp = app.oneshot(post_req(None, "")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }
}
