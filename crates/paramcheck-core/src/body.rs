//! # Body Decoding
//!
//! Turns buffered request bytes into a [`RawInput`] according to the
//! declared media type. JSON (`application/json`, `*/*+json`) and urlencoded
//! forms are decoded; anything else carries no fields, the same as a body no
//! parser understood.

use crate::error::DecodeError;
use crate::media::{ContentTypeMatcher, MediaTypeMatcher};
use crate::query;
use crate::value::RawInput;

/// How a body will be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    /// A JSON document.
    Json,
    /// `application/x-www-form-urlencoded`.
    Form,
    /// Not decoded; yields no fields.
    Opaque,
}

impl BodyFormat {
    /// Classify a `Content-Type` header value.
    pub fn detect(content_type: Option<&str>) -> Self {
        let json = ["json".to_string(), "+json".to_string()];
        let form = ["urlencoded".to_string()];
        if MediaTypeMatcher.matches(content_type, &json) {
            Self::Json
        } else if MediaTypeMatcher.matches(content_type, &form) {
            Self::Form
        } else {
            Self::Opaque
        }
    }
}

/// Decode `bytes` declared as `content_type`.
///
/// An empty body has no fields whatever its type. Malformed JSON is an
/// error; a JSON document that is not an object has no fields.
pub fn decode(content_type: Option<&str>, bytes: &[u8]) -> Result<RawInput, DecodeError> {
    if bytes.is_empty() {
        return Ok(RawInput::new());
    }
    match BodyFormat::detect(content_type) {
        BodyFormat::Json => Ok(RawInput::from_json(serde_json::from_slice(bytes)?)),
        BodyFormat::Form => Ok(query::parse_bytes(bytes)),
        BodyFormat::Opaque => Ok(RawInput::new()),
    }
}
