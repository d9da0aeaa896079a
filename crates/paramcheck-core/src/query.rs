//! # Query-String Decoding
//!
//! Decodes `application/x-www-form-urlencoded` text into a [`RawInput`],
//! with bracket syntax for lists and mappings:
//!
//! ```text
//! a=1&a=2        a: ["1", "2"]
//! a[]=1          a: ["1"]
//! a[0]=x&a[1]=y  a: ["x", "y"]
//! a[k]=1         a: { k: "1" }
//! a[]=1&a[k]=2   a: { "0": "1", k: "2" }
//! a              a: ""
//! ```
//!
//! Percent-escapes and `+` are decoded before brackets are interpreted, so
//! `a%5B%5D=1` is a list too. Bracket nesting deeper than [`MAX_DEPTH`] is
//! folded into a single final segment, and numeric indices above
//! [`MAX_INDEX`] are treated as mapping keys.

use std::collections::BTreeMap;

use url::form_urlencoded;

use crate::value::{RawInput, RawValue};

/// Maximum number of bracket segments interpreted per key.
pub const MAX_DEPTH: usize = 5;

/// Largest numeric bracket segment treated as a list index.
pub const MAX_INDEX: usize = 20;

/// Decode a query string (without the leading `?`).
pub fn parse(query: &str) -> RawInput {
    parse_bytes(query.as_bytes())
}

/// Decode urlencoded bytes, e.g. a form body.
pub fn parse_bytes(input: &[u8]) -> RawInput {
    let mut root: BTreeMap<String, RawValue> = BTreeMap::new();
    for (key, value) in form_urlencoded::parse(input) {
        if key.is_empty() {
            continue;
        }
        let (head, segments) = split_key(&key);
        let slot = root.entry(head.to_string()).or_default();
        assign(slot, &segments, value.into_owned());
    }
    RawInput::from(root)
}

/// Split `head[a][b]` into `("head", ["a", "b"])`.
///
/// A key that does not start with a plain name followed by a well-formed
/// `[...]` group is taken literally.
fn split_key(key: &str) -> (&str, Vec<&str>) {
    let open = match key.find('[') {
        Some(i) if i > 0 => i,
        _ => return (key, Vec::new()),
    };
    let head = &key[..open];
    let mut rest = &key[open..];
    let mut segments = Vec::new();

    while let Some(inner) = rest.strip_prefix('[') {
        let Some(close) = inner.find(']') else {
            break;
        };
        if segments.len() == MAX_DEPTH {
            break;
        }
        segments.push(&inner[..close]);
        rest = &inner[close + 1..];
    }

    if segments.is_empty() {
        return (key, Vec::new());
    }
    if !rest.is_empty() {
        segments.push(rest);
    }
    (head, segments)
}

fn assign(slot: &mut RawValue, segments: &[&str], value: String) {
    let Some((segment, rest)) = segments.split_first() else {
        append(slot, RawValue::Text(value));
        return;
    };

    if segment.is_empty() {
        let mut child = RawValue::Absent;
        assign(&mut child, rest, value);
        push(slot, child);
        return;
    }

    if let Some(index) = segment.parse::<usize>().ok().filter(|i| *i <= MAX_INDEX) {
        match slot {
            RawValue::Map(map) => assign(map.entry(segment.to_string()).or_default(), rest, value),
            RawValue::List(items) if index < items.len() => assign(&mut items[index], rest, value),
            _ => {
                let mut child = RawValue::Absent;
                assign(&mut child, rest, value);
                push(slot, child);
            }
        }
        return;
    }

    match slot {
        RawValue::Absent => *slot = RawValue::Map(BTreeMap::new()),
        RawValue::List(items) => {
            let items = std::mem::take(items);
            *slot = RawValue::Map(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, v)| (i.to_string(), v))
                    .collect(),
            );
        }
        RawValue::Map(_) => {}
        RawValue::Null | RawValue::Bool(_) | RawValue::Text(_) | RawValue::Number(_) => {
            let mut child = RawValue::Map(BTreeMap::new());
            assign(&mut child, segments, value);
            push(slot, child);
            return;
        }
    }
    if let RawValue::Map(map) = slot {
        assign(map.entry(segment.to_string()).or_default(), rest, value);
    }
}

/// Repeated plain keys: the first occurrence stays scalar.
fn append(slot: &mut RawValue, leaf: RawValue) {
    match slot {
        RawValue::Absent => *slot = leaf,
        _ => push(slot, leaf),
    }
}

/// List-producing insertion.
fn push(slot: &mut RawValue, child: RawValue) {
    match slot {
        RawValue::Absent => *slot = RawValue::List(vec![child]),
        RawValue::List(items) => items.push(child),
        RawValue::Map(map) => {
            let key = next_index(map);
            map.insert(key, child);
        }
        RawValue::Null | RawValue::Bool(_) | RawValue::Text(_) | RawValue::Number(_) => {
            let previous = std::mem::take(slot);
            *slot = RawValue::List(vec![previous, child]);
        }
    }
}

/// Key for an appended child: one past the largest numeric key, skipping
/// any key already taken.
fn next_index(map: &BTreeMap<String, RawValue>) -> String {
    let mut next = map
        .keys()
        .filter_map(|k| k.parse::<usize>().ok())
        .max()
        .map_or(0, |max| max.saturating_add(1));
    while map.contains_key(&next.to_string()) {
        next = next.wrapping_add(1);
    }
    next.to_string()
}
