//! JSON wire codecs.
//!
//! Configurations are encoded and decoded explicitly, one variant at a time,
//! through [`serde_json::Value`]. Elements are decoded discriminator-first:
//! the `type` field is read before the rest of the node is interpreted.
//!
//! All decode errors carry a dotted path to the offending field, such as
//! `output.formats.pdf` or `pages.elements[3].box`.

pub mod cleaner;
pub mod configuration;
pub mod element;
pub mod page;

pub use cleaner::{decode_cleaner, encode_cleaner};
pub use configuration::{decode_configuration, encode_configuration};
pub use element::decode_element;
pub use page::{decode_font, decode_metadata, decode_page};

use crate::error::ParsrError;
use serde_json::{Map, Value};

pub(crate) type JsonObject = Map<String, Value>;

/// `parent.key`, or just `key` at the root.
pub(crate) fn join(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

pub(crate) fn index(parent: &str, i: usize) -> String {
    format!("{parent}[{i}]")
}

pub(crate) fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a JsonObject, ParsrError> {
    value
        .as_object()
        .ok_or_else(|| ParsrError::invalid(path, "an object"))
}

/// A present, non-null field. JSON `null` counts as missing.
pub(crate) fn optional<'a>(obj: &'a JsonObject, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|v| !v.is_null())
}

pub(crate) fn required<'a>(
    obj: &'a JsonObject,
    parent: &str,
    key: &str,
) -> Result<&'a Value, ParsrError> {
    optional(obj, key).ok_or_else(|| ParsrError::missing(join(parent, key)))
}

pub(crate) fn to_str<'a>(value: &'a Value, path: &str) -> Result<&'a str, ParsrError> {
    value
        .as_str()
        .ok_or_else(|| ParsrError::invalid(path, "a string"))
}

pub(crate) fn to_bool(value: &Value, path: &str) -> Result<bool, ParsrError> {
    value
        .as_bool()
        .ok_or_else(|| ParsrError::invalid(path, "a boolean"))
}

pub(crate) fn to_f64(value: &Value, path: &str) -> Result<f64, ParsrError> {
    value
        .as_f64()
        .ok_or_else(|| ParsrError::invalid(path, "a number"))
}

/// Unsigned integer. Floats with no fractional part are accepted.
pub(crate) fn to_u64(value: &Value, path: &str) -> Result<u64, ParsrError> {
    if let Some(n) = value.as_u64() {
        return Ok(n);
    }
    match value.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => Ok(f as u64),
        _ => Err(ParsrError::invalid(path, "a non-negative integer")),
    }
}

pub(crate) fn to_u32(value: &Value, path: &str) -> Result<u32, ParsrError> {
    u32::try_from(to_u64(value, path)?)
        .map_err(|_| ParsrError::invalid(path, "a 32-bit unsigned integer"))
}

pub(crate) fn to_array<'a>(value: &'a Value, path: &str) -> Result<&'a [Value], ParsrError> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| ParsrError::invalid(path, "an array"))
}

/// Decode every entry of an array, tagging errors with the entry's index.
pub(crate) fn map_array<T>(
    value: &Value,
    path: &str,
    mut f: impl FnMut(&Value, &str) -> Result<T, ParsrError>,
) -> Result<Vec<T>, ParsrError> {
    to_array(value, path)?
        .iter()
        .enumerate()
        .map(|(i, item)| f(item, &index(path, i)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_counts_as_missing() {
        let v = json!({"a": null, "b": 1});
        let obj = v.as_object().unwrap();
        assert!(optional(obj, "a").is_none());
        assert!(optional(obj, "b").is_some());

        let err = required(obj, "root", "a").unwrap_err();
        assert!(matches!(err, ParsrError::MissingField { ref field } if field == "root.a"));
    }

    #[test]
    fn integers_accept_whole_floats() {
        assert_eq!(to_u32(&json!(15), "x").unwrap(), 15);
        assert_eq!(to_u32(&json!(15.0), "x").unwrap(), 15);
        assert!(to_u32(&json!(15.5), "x").is_err());
        assert!(to_u32(&json!(-1), "x").is_err());
        assert!(to_u32(&json!("15"), "x").is_err());
    }

    #[test]
    fn array_errors_carry_the_index() {
        let err = map_array(&json!([1, "two", 3]), "pages", to_u32).unwrap_err();
        match err {
            ParsrError::InvalidField { field, .. } => assert_eq!(field, "pages[1]"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
