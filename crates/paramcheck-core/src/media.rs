//! # Media-Type Matching
//!
//! The content-type precondition is an injected capability: the validator
//! only asks "does this declared media type satisfy the accepted set?".
//! [`MediaTypeMatcher`] is the default answer; any
//! `Fn(Option<&str>, &[String]) -> bool` can stand in for it.
//!
//! ## Accepted-Set Entries
//!
//! | Entry                 | Matches                                   |
//! |-----------------------|-------------------------------------------|
//! | `application/json`    | exactly that type                         |
//! | `text/*`, `*/*`       | wildcard type or subtype                  |
//! | `+json`               | any `*/*+json` (e.g. `application/ld+json`) |
//! | `application/*+json`  | suffix match within one top-level type    |
//! | `json`, `urlencoded`… | extension shorthands, see [`shorthand`]   |
//!
//! Parameters such as `; charset=utf-8` are ignored, comparison is
//! case-insensitive, and a missing or unparsable content type matches
//! nothing.

/// Decides whether a request's declared media type satisfies an accepted set.
pub trait ContentTypeMatcher: Send + Sync {
    /// `content_type` is the raw header value, `None` if the header is absent.
    fn matches(&self, content_type: Option<&str>, accepted: &[String]) -> bool;
}

impl<F> ContentTypeMatcher for F
where
    F: Fn(Option<&str>, &[String]) -> bool + Send + Sync,
{
    fn matches(&self, content_type: Option<&str>, accepted: &[String]) -> bool {
        self(content_type, accepted)
    }
}

/// Default matcher with the wildcard, suffix and shorthand rules above.
#[derive(Debug, Clone, Copy, Default)]
pub struct MediaTypeMatcher;

impl ContentTypeMatcher for MediaTypeMatcher {
    fn matches(&self, content_type: Option<&str>, accepted: &[String]) -> bool {
        let Some((ty, subtype)) = content_type.and_then(parse_essence) else {
            return false;
        };
        accepted
            .iter()
            .filter_map(|entry| normalize(entry))
            .any(|pattern| pattern_matches(&pattern, &ty, &subtype))
    }
}

/// Expand an extension shorthand to a full media type.
pub fn shorthand(ext: &str) -> Option<&'static str> {
    let full = match ext {
        "json" => "application/json",
        "urlencoded" | "form" => "application/x-www-form-urlencoded",
        "multipart" => "multipart/*",
        "text" | "txt" => "text/plain",
        "html" => "text/html",
        "xml" => "application/xml",
        "bin" | "octet-stream" => "application/octet-stream",
        _ => return None,
    };
    Some(full)
}

/// Split `type/subtype; params` into lowercase `(type, subtype)`.
fn parse_essence(raw: &str) -> Option<(String, String)> {
    let essence = raw.split(';').next()?.trim();
    let (ty, subtype) = essence.split_once('/')?;
    if !is_token(ty) || !is_token(subtype) {
        return None;
    }
    Some((ty.to_ascii_lowercase(), subtype.to_ascii_lowercase()))
}

fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes().all(|b| {
            b.is_ascii_alphanumeric() || b"!#$&^_.+-".contains(&b)
        })
}

fn normalize(entry: &str) -> Option<String> {
    let entry = entry.trim().to_ascii_lowercase();
    if entry.starts_with('+') {
        return Some(format!("*/*{entry}"));
    }
    if entry.contains('/') {
        return Some(entry);
    }
    shorthand(&entry).map(str::to_string)
}

fn pattern_matches(pattern: &str, ty: &str, subtype: &str) -> bool {
    let Some((p_ty, p_sub)) = pattern.split_once('/') else {
        return false;
    };
    if p_ty != "*" && p_ty != ty {
        return false;
    }
    if p_sub == "*" {
        return true;
    }
    match p_sub.strip_prefix("*+") {
        Some(suffix) => subtype
            .rsplit_once('+')
            .is_some_and(|(_, actual)| actual == suffix),
        None => p_sub == subtype,
    }
}
