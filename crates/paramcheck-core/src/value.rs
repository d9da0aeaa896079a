//! # Raw Request Values
//!
//! The closed set of shapes a decoded query string or request body can take.
//! Every evaluator branch matches on [`RawValue`] exhaustively, so there is
//! no runtime type inspection.

use std::collections::BTreeMap;

use serde_json::Value;

static ABSENT: RawValue = RawValue::Absent;

/// One raw field value as produced by a query or body decoder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RawValue {
    /// The key was not present in the input.
    #[default]
    Absent,
    /// An explicit null (JSON bodies only).
    Null,
    /// A native boolean (JSON bodies, or a boundary that coerced a checkbox).
    Bool(bool),
    /// A string, possibly empty.
    Text(String),
    /// A native JSON number, kept as its literal text. No type accepts it:
    /// `number` and `integer` describe textual input.
    Number(String),
    /// A list-shaped value.
    List(Vec<RawValue>),
    /// A nested mapping.
    Map(BTreeMap<String, RawValue>),
}

impl RawValue {
    /// Build a text value.
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Build a list of text values.
    pub fn texts<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(items.into_iter().map(|s| Self::Text(s.into())).collect())
    }

    /// The string content, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// True for absent, null and the empty string: the values an optional
    /// marker accepts unconditionally.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Absent | Self::Null => true,
            Self::Text(s) => s.is_empty(),
            Self::Bool(_) | Self::Number(_) | Self::List(_) | Self::Map(_) => false,
        }
    }

    /// Short name of the variant, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Text(_) => "text",
            Self::Number(_) => "number",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for RawValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// JSON numbers keep their own variant; they are not coerced to text.
impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n.to_string()),
            Value::String(s) => Self::Text(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => {
                Self::Map(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

/// The per-request field mapping handed to the validator.
///
/// Read-only from the validator's point of view; lookups of missing keys
/// yield [`RawValue::Absent`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawInput {
    fields: BTreeMap<String, RawValue>,
}

impl RawInput {
    /// Create an empty input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an input from a decoded JSON document.
    ///
    /// A top-level value that is not an object carries no fields, so every
    /// declared field evaluates as absent.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(map) => map.into_iter().collect(),
            _ => Self::new(),
        }
    }

    /// Insert or replace a field, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<RawValue>) -> Option<RawValue> {
        self.fields.insert(key.into(), value.into())
    }

    /// Look up a field; missing keys are [`RawValue::Absent`].
    pub fn get(&self, key: &str) -> &RawValue {
        self.fields.get(key).unwrap_or(&ABSENT)
    }

    /// Number of present fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if no field is present.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate present fields in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl From<BTreeMap<String, RawValue>> for RawInput {
    fn from(fields: BTreeMap<String, RawValue>) -> Self {
        Self { fields }
    }
}

impl<K: Into<String>, V: Into<RawValue>> FromIterator<(K, V)> for RawInput {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_key_is_absent() {
        let input = RawInput::new();
        assert_eq!(input.get("foo"), &RawValue::Absent);
    }

    #[test]
    fn blank_values() {
        assert!(RawValue::Absent.is_blank());
        assert!(RawValue::Null.is_blank());
        assert!(RawValue::text("").is_blank());
        assert!(!RawValue::text(" ").is_blank());
        assert!(!RawValue::Bool(false).is_blank());
        assert!(!RawValue::Number("0".into()).is_blank());
        assert!(!RawValue::List(vec![]).is_blank());
        assert!(!RawValue::Map(BTreeMap::new()).is_blank());
    }

    #[test]
    fn json_conversion() {
        let input = RawInput::from_json(json!({
            "a": null,
            "b": true,
            "c": 1.5,
            "d": "x",
            "e": [1, "y"],
            "f": {"g": false},
        }));
        assert_eq!(input.len(), 6);
        assert_eq!(input.get("a"), &RawValue::Null);
        assert_eq!(input.get("b"), &RawValue::Bool(true));
        assert_eq!(input.get("c"), &RawValue::Number("1.5".into()));
        assert_eq!(input.get("d"), &RawValue::text("x"));
        assert_eq!(
            input.get("e"),
            &RawValue::List(vec![RawValue::Number("1".into()), RawValue::text("y")])
        );
        match input.get("f") {
            RawValue::Map(m) => assert_eq!(m.get("g"), Some(&RawValue::Bool(false))),
            other => panic!("expected map, got {other:?}"),
        }
    }

    #[test]
    fn kind_names_each_variant() {
        assert_eq!(RawValue::Absent.kind(), "absent");
        assert_eq!(RawValue::text("5").kind(), "text");
        assert_eq!(RawInput::from_json(json!({"n": 5})).get("n").kind(), "number");
        assert_eq!(RawValue::List(vec![]).kind(), "list");
    }

    #[test]
    fn non_object_json_has_no_fields() {
        assert!(RawInput::from_json(json!([1, 2])).is_empty());
        assert!(RawInput::from_json(json!("foo")).is_empty());
    }

    #[test]
    fn collect_from_pairs() {
        let input: RawInput = [("foo", "bar"), ("baz", "")].into_iter().collect();
        assert_eq!(input.get("foo").as_text(), Some("bar"));
        assert!(input.get("baz").is_blank());
        assert_eq!(input.iter().count(), 2);
    }
}
