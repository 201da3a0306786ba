//! Metadata annotations attached to elements by cleaners such as the regex
//! matcher.

use crate::model::ids::{ElementId, MetadataId};
use crate::model::properties::PropertyValue;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    pub id: MetadataId,
    /// Elements the annotation applies to (`elements` on the wire).
    pub element_ids: Vec<ElementId>,
    pub kind: MetadataType,
    /// Annotation payload (`data` on the wire).
    pub content: MetadataContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataType {
    Regex,
    Unknown,
}

impl MetadataType {
    /// Unrecognised names map to [`MetadataType::Unknown`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "regex" => MetadataType::Regex,
            _ => MetadataType::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MetadataContent {
    Regex(RegexContent),
    /// Payload of an unrecognised annotation type, keyed by field name.
    Raw(BTreeMap<String, PropertyValue>),
}

/// A regex-matcher hit.
#[derive(Debug, Clone, PartialEq)]
pub struct RegexContent {
    /// Label of the query that matched.
    pub name: String,
    pub regex: String,
    pub full_match: String,
    /// Capture groups by position; `None` where a group did not participate.
    pub groups: Vec<Option<String>>,
}

impl RegexContent {
    pub fn group(&self, index: usize) -> Option<&str> {
        self.groups.get(index).and_then(|g| g.as_deref())
    }
}
