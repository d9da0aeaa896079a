//! # Field-Set Validation
//!
//! Applies a [`FieldSet`] to a [`RawInput`]:
//!
//! 1. For body input with `accept` configured, the content type must satisfy
//!    the accepted set, otherwise 415 `E_BAD_CONTENT_TYPE`. No field is
//!    looked at.
//! 2. Fields are checked in declaration order; a missing key is absent.
//! 3. The first rejected field yields 400 `E_BAD_PARAM` and stops the pass.
//!
//! Validation never mutates its inputs. A [`Validator`] is immutable and can
//! be shared across threads.

use std::fmt;
use std::sync::Arc;

use crate::error::ValidationError;
use crate::media::{ContentTypeMatcher, MediaTypeMatcher};
use crate::spec::FieldSet;
use crate::value::RawInput;

/// Where the input mapping came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    /// The URL query string. The content-type precondition never applies.
    Query,
    /// A decoded request body.
    Body,
}

/// Per-endpoint validation options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidateOptions {
    /// Accepted media types for body input. `None` skips the check.
    pub accept: Option<Vec<String>>,
}

impl ValidateOptions {
    /// Require the body's media type to match one of `types`.
    pub fn accept<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            accept: Some(types.into_iter().map(Into::into).collect()),
        }
    }
}

/// Check every declared field of `fields` against `input`.
///
/// Returns the first failing field as [`ValidationError::BadParam`].
pub fn validate(input: &RawInput, fields: &FieldSet) -> Result<(), ValidationError> {
    match fields.iter().find(|(name, spec)| !spec.accepts(input.get(name))) {
        Some((name, _)) => Err(ValidationError::bad_param(name)),
        None => Ok(()),
    }
}

/// A field set bundled with its options and content-type matcher.
#[derive(Clone)]
pub struct Validator {
    fields: Arc<FieldSet>,
    options: ValidateOptions,
    matcher: Arc<dyn ContentTypeMatcher>,
}

impl Validator {
    /// Build a validator using [`MediaTypeMatcher`] for the content-type check.
    pub fn new(fields: FieldSet, options: ValidateOptions) -> Self {
        Self {
            fields: Arc::new(fields),
            options,
            matcher: Arc::new(MediaTypeMatcher),
        }
    }

    /// Replace the content-type matcher.
    pub fn with_matcher(mut self, matcher: impl ContentTypeMatcher + 'static) -> Self {
        self.matcher = Arc::new(matcher);
        self
    }

    /// The declared fields.
    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    /// The configured options.
    pub fn options(&self) -> &ValidateOptions {
        &self.options
    }

    /// Run the full procedure for input from `source`.
    ///
    /// `content_type` is only consulted for [`InputSource::Body`].
    pub fn check(
        &self,
        source: InputSource,
        content_type: Option<&str>,
        input: &RawInput,
    ) -> Result<(), ValidationError> {
        if source == InputSource::Body {
            self.check_content_type(content_type)?;
        }
        validate(input, &self.fields)
    }

    /// The content-type precondition alone. Passes when `accept` is unset.
    ///
    /// Lets a boundary reject a body before reading it.
    pub fn check_content_type(&self, content_type: Option<&str>) -> Result<(), ValidationError> {
        match &self.options.accept {
            Some(accepted) if !self.matcher.matches(content_type, accepted) => {
                Err(ValidationError::BadContentType)
            }
            _ => Ok(()),
        }
    }

    /// Validate query-string input.
    pub fn check_query(&self, input: &RawInput) -> Result<(), ValidationError> {
        self.check(InputSource::Query, None, input)
    }

    /// Validate body input declared as `content_type`.
    pub fn check_body(
        &self,
        content_type: Option<&str>,
        input: &RawInput,
    ) -> Result<(), ValidationError> {
        self.check(InputSource::Body, content_type, input)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("fields", &self.fields)
            .field("options", &self.options)
            .field("matcher", &"[dyn ContentTypeMatcher]")
            .finish()
    }
}
