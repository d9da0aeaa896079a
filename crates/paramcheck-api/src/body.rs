//! # Body Buffering
//!
//! Reads a request body under a size limit and decodes it with
//! [`paramcheck_core::body::decode`], mapping failures onto [`ApiError`].

use axum::body::{Body, Bytes};
use http_body_util::LengthLimitError;

use paramcheck_core::RawInput;

use crate::error::ApiError;

/// Default body limit: 1 MiB.
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Decode `bytes` declared as `content_type`; malformed JSON is a 400.
pub fn decode(content_type: Option<&str>, bytes: &[u8]) -> Result<RawInput, ApiError> {
    paramcheck_core::body::decode(content_type, bytes)
        .map_err(|e| ApiError::MalformedBody(e.to_string()))
}

/// Buffer a body, failing with 413 past `limit` bytes.
pub async fn collect(body: Body, limit: usize) -> Result<Bytes, ApiError> {
    axum::body::to_bytes(body, limit).await.map_err(|err| {
        if exceeded_limit(&err) {
            ApiError::PayloadTooLarge { limit }
        } else {
            ApiError::MalformedBody(err.to_string())
        }
    })
}

fn exceeded_limit(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = std::error::Error::source(err);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use paramcheck_core::RawValue;

    #[test]
    fn decode_maps_malformed_json() {
        let err = decode(Some("application/json"), b"{not json").unwrap_err();
        assert!(matches!(err, ApiError::MalformedBody(_)));
        assert!(err.to_string().contains("malformed"));
    }

    #[test]
    fn decode_passes_fields_through() {
        let input = decode(Some("application/json"), br#"{"a": "x"}"#).unwrap();
        assert_eq!(input.get("a"), &RawValue::text("x"));
    }

    #[tokio::test]
    async fn collect_enforces_limit() {
        let ok = collect(Body::from("abc"), 8).await.unwrap();
        assert_eq!(&ok[..], b"abc");

        let err = collect(Body::from("0123456789"), 4).await.unwrap_err();
        assert!(matches!(err, ApiError::PayloadTooLarge { limit: 4 }), "{err:?}");
    }
}
