//! The open per-element properties bag.
//!
//! A handful of flags are well known and get typed fields; everything else is
//! kept in [`Properties::others`] as a [`PropertyValue`] and read back with
//! [`Properties::get_as`], typed by the caller.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A JSON value kept from the wire without interpretation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Array(Vec<PropertyValue>),
    Object(BTreeMap<String, PropertyValue>),
}

impl PropertyValue {
    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[PropertyValue]> {
        match self {
            PropertyValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, PropertyValue>> {
        match self {
            PropertyValue::Object(map) => Some(map),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for PropertyValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => PropertyValue::Null,
            Value::Bool(b) => PropertyValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => PropertyValue::Integer(i),
                None => PropertyValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => PropertyValue::String(s),
            Value::Array(items) => {
                PropertyValue::Array(items.into_iter().map(PropertyValue::from).collect())
            }
            Value::Object(map) => PropertyValue::Object(
                map.into_iter()
                    .map(|(k, v)| (k, PropertyValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&serde_json::Value> for PropertyValue {
    fn from(value: &serde_json::Value) -> Self {
        PropertyValue::from(value.clone())
    }
}

/// Conversion from a [`PropertyValue`] into a concrete Rust type.
pub trait FromProperty: Sized {
    fn from_property(value: &PropertyValue) -> Option<Self>;
}

impl FromProperty for bool {
    fn from_property(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromProperty for i64 {
    fn from_property(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl FromProperty for u32 {
    fn from_property(value: &PropertyValue) -> Option<Self> {
        i64::from_property(value).and_then(|i| u32::try_from(i).ok())
    }
}

impl FromProperty for f64 {
    fn from_property(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Integer(i) => Some(*i as f64),
            PropertyValue::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl FromProperty for String {
    fn from_property(value: &PropertyValue) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl FromProperty for PropertyValue {
    fn from_property(value: &PropertyValue) -> Option<Self> {
        Some(value.clone())
    }
}

impl<T: FromProperty> FromProperty for Vec<T> {
    fn from_property(value: &PropertyValue) -> Option<Self> {
        value.as_array()?.iter().map(T::from_property).collect()
    }
}

/// Per-element flags and extension data.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Properties {
    /// Reading-order position within the parent.
    pub order: Option<i64>,
    pub is_redundant: Option<bool>,
    pub is_header: Option<bool>,
    pub is_footer: Option<bool>,
    pub is_page_number: Option<bool>,
    pub bullet_list: Option<bool>,
    /// Every key without a typed field above.
    pub others: BTreeMap<String, PropertyValue>,
}

impl Properties {
    pub const ORDER: &'static str = "order";
    pub const IS_REDUNDANT: &'static str = "isRedundant";
    pub const IS_HEADER: &'static str = "isHeader";
    pub const IS_FOOTER: &'static str = "isFooter";
    pub const IS_PAGE_NUMBER: &'static str = "isPageNumber";
    pub const BULLET_LIST: &'static str = "bulletList";

    pub fn with_order(order: i64) -> Self {
        Self {
            order: Some(order),
            ..Self::default()
        }
    }

    /// Raw extension value for `key`. Well-known flags are not stored here.
    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.others.get(key)
    }

    /// Read `key` (well-known or not) as `T`. `None` when absent or of
    /// another type.
    pub fn get_as<T: FromProperty>(&self, key: &str) -> Option<T> {
        let known = match key {
            Self::ORDER => self.order.map(PropertyValue::Integer),
            Self::IS_REDUNDANT => self.is_redundant.map(PropertyValue::Bool),
            Self::IS_HEADER => self.is_header.map(PropertyValue::Bool),
            Self::IS_FOOTER => self.is_footer.map(PropertyValue::Bool),
            Self::IS_PAGE_NUMBER => self.is_page_number.map(PropertyValue::Bool),
            Self::BULLET_LIST => self.bullet_list.map(PropertyValue::Bool),
            _ => None,
        };
        match known {
            Some(value) => T::from_property(&value),
            None => self.others.get(key).and_then(T::from_property),
        }
    }

    /// Header, footer or page number.
    pub fn is_marginal(&self) -> bool {
        self.is_header.unwrap_or(false)
            || self.is_footer.unwrap_or(false)
            || self.is_page_number.unwrap_or(false)
    }
}
