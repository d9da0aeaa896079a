//! # Type Specs and Field Sets
//!
//! A [`TypeSpec`] is compiled once, when the endpoint's [`FieldSet`] is
//! declared: the `?` marker is split off, primitive names are resolved and
//! patterns are compiled. Evaluation is then a pure match over
//! ([`TypeSpec`], [`RawValue`]).
//!
//! ## Textual Form
//!
//! ```text
//! string        primitive
//! ?number       optional primitive
//! /^ba[rz]$/i   pattern literal (flags: i, m, s, u)
//! ```
//!
//! Rules files may also write a pattern as `{ pattern: "^ba[rz]$" }` and an
//! alternation as a list of either form.

use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;

use crate::error::SpecError;
use crate::number;
use crate::value::RawValue;

// ---------------------------------------------------------------------------
// Primitive
// ---------------------------------------------------------------------------

/// The recognized primitive kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// Exactly null.
    Null,
    /// A list of any length.
    Array,
    /// Non-empty text without control characters.
    String,
    /// Checkbox semantics: absent, `"1"`, `""`, or a native boolean.
    Boolean,
    /// Text that is a complete, finite numeric literal.
    Number,
    /// Text that is a complete, finite, integral numeric literal.
    Integer,
    /// A mapping.
    Object,
}

impl Primitive {
    /// All primitives, in declaration order.
    pub const ALL: [Primitive; 7] = [
        Self::Null,
        Self::Array,
        Self::String,
        Self::Boolean,
        Self::Number,
        Self::Integer,
        Self::Object,
    ];

    /// The name used in textual specs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Array => "array",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Object => "object",
        }
    }

    /// Apply this primitive's acceptance rule.
    pub fn accepts(&self, value: &RawValue) -> bool {
        match self {
            Self::Null => matches!(value, RawValue::Null),
            Self::Array => matches!(value, RawValue::List(_)),
            Self::String => match value {
                RawValue::Text(s) => !s.is_empty() && !has_control_chars(s),
                _ => false,
            },
            // A checkbox is either present ("1") or absent; an empty value
            // and native booleans are accepted for API compatibility.
            Self::Boolean => match value {
                RawValue::Absent | RawValue::Bool(_) => true,
                RawValue::Text(s) => s.is_empty() || s == "1",
                _ => false,
            },
            Self::Number => value.as_text().is_some_and(number::is_number),
            Self::Integer => value.as_text().is_some_and(number::is_integer),
            Self::Object => matches!(value, RawValue::Map(_)),
        }
    }
}

impl FromStr for Primitive {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| SpecError::UnknownPrimitive(s.to_string()))
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// C0 controls except the whitespace block U+0009..=U+000D, DEL, and the
/// C1 controls.
fn has_control_chars(s: &str) -> bool {
    s.chars()
        .any(|c| matches!(c, '\u{0}'..='\u{8}' | '\u{e}'..='\u{1f}' | '\u{7f}'..='\u{9f}'))
}

// ---------------------------------------------------------------------------
// TypeSpec
// ---------------------------------------------------------------------------

/// A compiled acceptance rule for one field.
#[derive(Debug, Clone)]
pub enum TypeSpec {
    /// A primitive kind, optionally accepting blank values too.
    Primitive {
        /// The base rule.
        kind: Primitive,
        /// If set, absent, `""` and null are accepted without consulting `kind`.
        optional: bool,
    },
    /// Unanchored regex search over the value's text. Anchoring is up to the
    /// spec author.
    Pattern(Regex),
    /// Accepts if any member accepts, evaluated left to right.
    Alternation(Vec<TypeSpec>),
}

impl TypeSpec {
    /// A required primitive.
    pub fn primitive(kind: Primitive) -> Self {
        Self::Primitive {
            kind,
            optional: false,
        }
    }

    /// An optional primitive (`?kind`).
    pub fn optional(kind: Primitive) -> Self {
        Self::Primitive {
            kind,
            optional: true,
        }
    }

    /// Compile a pattern from regex source (no delimiters).
    pub fn pattern(source: &str) -> Result<Self, SpecError> {
        Regex::new(source)
            .map(Self::Pattern)
            .map_err(|source_err| SpecError::InvalidPattern {
                pattern: source.to_string(),
                source: source_err,
            })
    }

    /// Build an alternation. Members must not themselves be alternations.
    pub fn any_of(options: impl IntoIterator<Item = TypeSpec>) -> Result<Self, SpecError> {
        let options: Vec<TypeSpec> = options.into_iter().collect();
        if options.iter().any(|o| matches!(o, Self::Alternation(_))) {
            return Err(SpecError::NestedAlternation);
        }
        Ok(Self::Alternation(options))
    }

    /// Parse the textual form: `name`, `?name` or `/regex/flags`.
    pub fn parse(s: &str) -> Result<Self, SpecError> {
        if let Some(literal) = parse_pattern_literal(s)? {
            return Ok(literal);
        }
        match s.strip_prefix('?') {
            Some(base) => base.parse().map(Self::optional),
            None => s.parse().map(Self::primitive),
        }
    }

    /// Evaluate this spec against one raw value. Pure and total.
    pub fn accepts(&self, value: &RawValue) -> bool {
        match self {
            Self::Alternation(options) => options.iter().any(|o| o.accepts(value)),
            Self::Pattern(re) => match value {
                RawValue::Absent => re.is_match(""),
                RawValue::Text(s) => re.is_match(s),
                _ => false,
            },
            Self::Primitive { kind, optional } => {
                (*optional && value.is_blank()) || kind.accepts(value)
            }
        }
    }
}

/// Evaluate `spec` against `value`.
pub fn check_key(value: &RawValue, spec: &TypeSpec) -> bool {
    spec.accepts(value)
}

/// Parse `/body/flags`. Returns `Ok(None)` when `s` is not a pattern literal.
fn parse_pattern_literal(s: &str) -> Result<Option<TypeSpec>, SpecError> {
    let Some(rest) = s.strip_prefix('/') else {
        return Ok(None);
    };
    let Some(close) = rest.rfind('/') else {
        return Ok(None);
    };
    let (body, flags) = (&rest[..close], &rest[close + 1..]);

    let mut inline = String::new();
    for flag in flags.chars() {
        match flag {
            'i' | 'm' | 's' => inline.push(flag),
            'u' => {}
            other => {
                return Err(SpecError::UnsupportedFlag {
                    literal: s.to_string(),
                    flag: other,
                })
            }
        }
    }

    let source = if inline.is_empty() {
        body.to_string()
    } else {
        format!("(?{inline}){body}")
    };
    TypeSpec::pattern(&source).map(Some)
}

impl FromStr for TypeSpec {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Primitive> for TypeSpec {
    fn from(kind: Primitive) -> Self {
        Self::primitive(kind)
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive { kind, optional } => {
                if *optional {
                    f.write_str("?")?;
                }
                write!(f, "{kind}")
            }
            Self::Pattern(re) => write!(f, "/{}/", re.as_str()),
            Self::Alternation(options) => {
                f.write_str("[")?;
                for (i, option) in options.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{option}")?;
                }
                f.write_str("]")
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SpecRepr {
    Text(String),
    Pattern { pattern: String },
    List(Vec<SpecRepr>),
}

impl SpecRepr {
    fn compile(self) -> Result<TypeSpec, SpecError> {
        match self {
            Self::Text(s) => TypeSpec::parse(&s),
            Self::Pattern { pattern } => TypeSpec::pattern(&pattern),
            Self::List(items) => {
                let options = items
                    .into_iter()
                    .map(Self::compile)
                    .collect::<Result<Vec<_>, _>>()?;
                TypeSpec::any_of(options)
            }
        }
    }
}

impl<'de> Deserialize<'de> for TypeSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        SpecRepr::deserialize(deserializer)?
            .compile()
            .map_err(de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// FieldSet
// ---------------------------------------------------------------------------

/// The declared fields of one endpoint, in declaration order.
///
/// Order only decides which field is reported when several are invalid.
#[derive(Debug, Clone, Default)]
pub struct FieldSet {
    fields: Vec<(String, TypeSpec)>,
}

impl FieldSet {
    /// Create an empty field set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(name, textual spec)` pairs.
    ///
    /// ```
    /// use paramcheck_core::FieldSet;
    ///
    /// let fields = FieldSet::from_pairs([("q", "string"), ("limit", "?integer")]).unwrap();
    /// assert_eq!(fields.len(), 2);
    /// ```
    pub fn from_pairs<'a>(
        pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, SpecError> {
        let mut set = Self::new();
        for (name, spec) in pairs {
            set.insert(name, TypeSpec::parse(spec)?)?;
        }
        Ok(set)
    }

    /// Declare a field. Names must be unique.
    pub fn insert(&mut self, name: impl Into<String>, spec: TypeSpec) -> Result<(), SpecError> {
        let name = name.into();
        if self.get(&name).is_some() {
            return Err(SpecError::DuplicateField(name));
        }
        self.fields.push((name, spec));
        Ok(())
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, spec: TypeSpec) -> Result<Self, SpecError> {
        self.insert(name, spec)?;
        Ok(self)
    }

    /// Look up a field's spec.
    pub fn get(&self, name: &str) -> Option<&TypeSpec> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, spec)| spec)
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if no field is declared.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypeSpec)> {
        self.fields.iter().map(|(n, s)| (n.as_str(), s))
    }
}

struct FieldSetVisitor;

impl<'de> Visitor<'de> for FieldSetVisitor {
    type Value = FieldSet;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a mapping of field names to type specs")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<FieldSet, A::Error> {
        let mut set = FieldSet::new();
        while let Some((name, spec)) = map.next_entry::<String, TypeSpec>()? {
            set.insert(name, spec).map_err(de::Error::custom)?;
        }
        Ok(set)
    }
}

impl<'de> Deserialize<'de> for FieldSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(FieldSetVisitor)
    }
}
