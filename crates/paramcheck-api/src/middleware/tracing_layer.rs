//! # Request/Response Tracing
//!
//! Configures `tower_http::trace::TraceLayer` so each request gets a span,
//! and rejections logged by the validation middleware land inside it.

use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Build the `TraceLayer` for the demo router.
///
/// Spans carry method and URI; responses are logged at `INFO` with status
/// and latency.
pub fn layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO))
}
