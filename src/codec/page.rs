//! Decoding of the document's top-level entries: pages, metadata and fonts.

use crate::codec::element::decode_element_at;
use crate::codec::{self, JsonObject};
use crate::error::ParsrError;
use crate::model::font::Font;
use crate::model::geometry::{BoundingBox, Rotation};
use crate::model::ids::{ElementId, MetadataId};
use crate::model::metadata::{Metadata, MetadataContent, MetadataType, RegexContent};
use crate::model::page::Page;
use crate::model::properties::PropertyValue;
use serde::Deserialize;
use serde_json::Value;

/// Decode one page. Keys other than `box`, `rotation`, `pageNumber` and
/// `elements` are ignored.
pub fn decode_page(value: &Value) -> Result<Page, ParsrError> {
    decode_page_at(value, "page")
}

pub(crate) fn decode_page_at(value: &Value, path: &str) -> Result<Page, ParsrError> {
    let obj = codec::as_object(value, path)?;

    let box_path = codec::join(path, "box");
    let bounds = BoundingBox::deserialize(codec::required(obj, path, "box")?)
        .map_err(|_| ParsrError::invalid(box_path, "a box with l, t, w and h"))?;
    let rotation_path = codec::join(path, "rotation");
    let rotation = Rotation::deserialize(codec::required(obj, path, "rotation")?)
        .map_err(|_| ParsrError::invalid(rotation_path, "a rotation"))?;
    let number = codec::to_u32(
        codec::required(obj, path, "pageNumber")?,
        &codec::join(path, "pageNumber"),
    )?;
    let elements = match codec::optional(obj, "elements") {
        Some(v) => codec::map_array(v, &codec::join(path, "elements"), decode_element_at)?,
        None => Vec::new(),
    };

    Ok(Page {
        bounds,
        rotation,
        number,
        elements,
    })
}

/// Decode one metadata entry: `{id, elements, type, data}`.
pub fn decode_metadata(value: &Value) -> Result<Metadata, ParsrError> {
    decode_metadata_at(value, "metadata")
}

pub(crate) fn decode_metadata_at(value: &Value, path: &str) -> Result<Metadata, ParsrError> {
    let obj = codec::as_object(value, path)?;

    let id = MetadataId(codec::to_u32(
        codec::required(obj, path, "id")?,
        &codec::join(path, "id"),
    )?);
    let element_ids = codec::map_array(
        codec::required(obj, path, "elements")?,
        &codec::join(path, "elements"),
        |v, p| codec::to_u64(v, p).map(ElementId),
    )?;
    let kind = MetadataType::from_name(codec::to_str(
        codec::required(obj, path, "type")?,
        &codec::join(path, "type"),
    )?);
    let data_path = codec::join(path, "data");
    let data = codec::as_object(codec::required(obj, path, "data")?, &data_path)?;
    let content = match kind {
        MetadataType::Regex => MetadataContent::Regex(decode_regex_content(data, &data_path)?),
        MetadataType::Unknown => MetadataContent::Raw(
            data.iter()
                .map(|(k, v)| (k.clone(), PropertyValue::from(v)))
                .collect(),
        ),
    };

    Ok(Metadata {
        id,
        element_ids,
        kind,
        content,
    })
}

fn decode_regex_content(obj: &JsonObject, path: &str) -> Result<RegexContent, ParsrError> {
    let text = |key: &str| -> Result<String, ParsrError> {
        codec::to_str(codec::required(obj, path, key)?, &codec::join(path, key))
            .map(str::to_string)
    };
    let groups = match codec::optional(obj, "groups") {
        Some(v) => codec::map_array(v, &codec::join(path, "groups"), |g, p| match g {
            Value::Null => Ok(None),
            other => codec::to_str(other, p).map(|s| Some(s.to_string())),
        })?,
        None => Vec::new(),
    };
    Ok(RegexContent {
        name: text("name")?,
        regex: text("regex")?,
        full_match: text("fullMatch")?,
        groups,
    })
}

/// Decode one font table entry.
pub fn decode_font(value: &Value) -> Result<Font, ParsrError> {
    decode_font_at(value, "font")
}

pub(crate) fn decode_font_at(value: &Value, path: &str) -> Result<Font, ParsrError> {
    Font::deserialize(value).map_err(|source| ParsrError::InvalidEntry {
        path: path.to_string(),
        source,
    })
}
