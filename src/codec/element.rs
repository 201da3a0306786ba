//! Element decoding.
//!
//! The `type` field is read first and decides which shape the rest of the
//! node must have. An unrecognised `type` is a hard error: unlike cleaner
//! tags, the element type determines structure.

use crate::codec::{self, JsonObject};
use crate::error::ParsrError;
use crate::model::element::{
    AnyContent, AnyElement, Element, ElementType, Heading, Line, Paragraph, Word,
};
use crate::model::geometry::BoundingBox;
use crate::model::ids::{ElementId, FontId, MetadataId};
use crate::model::properties::{Properties, PropertyValue};
use serde::Deserialize;
use serde_json::Value;

/// Keys every element shares. On an [`AnyElement`], any other top-level key
/// is kept in its properties.
const COMMON_KEYS: [&str; 6] = ["id", "type", "box", "properties", "metadata", "content"];

/// Decode one element node and, recursively, its children.
pub fn decode_element(value: &Value) -> Result<Element, ParsrError> {
    decode_element_at(value, "element")
}

pub(crate) fn decode_element_at(value: &Value, path: &str) -> Result<Element, ParsrError> {
    let obj = codec::as_object(value, path)?;

    let raw_type = codec::to_str(
        codec::required(obj, path, "type")?,
        &codec::join(path, "type"),
    )?;
    let kind = ElementType::from_wire(raw_type).ok_or_else(|| ParsrError::UnknownElementType {
        value: raw_type.to_string(),
    })?;

    let id = ElementId(codec::to_u64(
        codec::required(obj, path, "id")?,
        &codec::join(path, "id"),
    )?);
    let bounds = decode_box(codec::required(obj, path, "box")?, &codec::join(path, "box"))?;
    let mut properties = match codec::optional(obj, "properties") {
        Some(v) => decode_properties(v, &codec::join(path, "properties"))?,
        None => Properties::default(),
    };
    let metadata = match codec::optional(obj, "metadata") {
        Some(v) => codec::map_array(v, &codec::join(path, "metadata"), |m, p| {
            codec::to_u32(m, p).map(MetadataId)
        })?,
        None => Vec::new(),
    };
    let content_path = codec::join(path, "content");

    let element = match kind {
        ElementType::Word => {
            let content = codec::to_str(codec::required(obj, path, "content")?, &content_path)?;
            let font = match codec::optional(obj, "font") {
                Some(v) => Some(FontId(codec::to_u32(v, &codec::join(path, "font"))?)),
                None => None,
            };
            Element::Word(Word {
                id,
                bounds,
                properties,
                metadata,
                content: content.to_string(),
                font,
            })
        }
        ElementType::Line => Element::Line(Line {
            id,
            bounds,
            properties,
            metadata,
            content: decode_children(codec::required(obj, path, "content")?, &content_path)?,
        }),
        ElementType::Paragraph => Element::Paragraph(Paragraph {
            id,
            bounds,
            properties,
            metadata,
            content: decode_children(codec::required(obj, path, "content")?, &content_path)?,
        }),
        ElementType::Heading => {
            let content = decode_children(codec::required(obj, path, "content")?, &content_path)?;
            let level = codec::to_u32(
                codec::required(obj, path, "level")?,
                &codec::join(path, "level"),
            )?;
            Element::Heading(Heading {
                id,
                bounds,
                properties,
                metadata,
                content,
                level,
            })
        }
        kind => {
            for (key, extra) in obj.iter().filter(|(k, _)| !COMMON_KEYS.contains(&k.as_str())) {
                properties
                    .others
                    .insert(key.clone(), PropertyValue::from(extra));
            }
            let content = match codec::optional(obj, "content") {
                Some(v) => decode_any_content(v, &content_path)?,
                None => AnyContent::Empty,
            };
            Element::Any(AnyElement {
                kind,
                id,
                bounds,
                properties,
                metadata,
                content,
            })
        }
    };
    Ok(element)
}

fn decode_box(value: &Value, path: &str) -> Result<BoundingBox, ParsrError> {
    BoundingBox::deserialize(value).map_err(|_| ParsrError::invalid(path, "a box with l, t, w and h"))
}

fn decode_children(value: &Value, path: &str) -> Result<Vec<Element>, ParsrError> {
    codec::map_array(value, path, decode_element_at)
}

/// Text stays text; an array made only of typed objects becomes child
/// elements; anything else is kept raw.
fn decode_any_content(value: &Value, path: &str) -> Result<AnyContent, ParsrError> {
    match value {
        Value::String(text) => Ok(AnyContent::Text(text.clone())),
        Value::Array(items) if !items.is_empty() && items.iter().all(is_typed_object) => {
            decode_children(value, path).map(AnyContent::Elements)
        }
        other => Ok(AnyContent::Raw(PropertyValue::from(other))),
    }
}

fn is_typed_object(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|obj| obj.get("type").is_some_and(Value::is_string))
}

/// Well-known flags get typed fields; everything else lands in `others`.
/// A known flag with an unexpected JSON type is kept in `others` as-is.
pub(crate) fn decode_properties(value: &Value, path: &str) -> Result<Properties, ParsrError> {
    let obj: &JsonObject = codec::as_object(value, path)?;
    let mut props = Properties::default();
    for (key, raw) in obj {
        if raw.is_null() {
            continue;
        }
        let typed = match key.as_str() {
            Properties::ORDER => raw.as_i64().map(|v| props.order = Some(v)),
            Properties::IS_REDUNDANT => raw.as_bool().map(|v| props.is_redundant = Some(v)),
            Properties::IS_HEADER => raw.as_bool().map(|v| props.is_header = Some(v)),
            Properties::IS_FOOTER => raw.as_bool().map(|v| props.is_footer = Some(v)),
            Properties::IS_PAGE_NUMBER => raw.as_bool().map(|v| props.is_page_number = Some(v)),
            Properties::BULLET_LIST => raw.as_bool().map(|v| props.bullet_list = Some(v)),
            _ => None,
        };
        if typed.is_none() {
            props.others.insert(key.clone(), PropertyValue::from(raw));
        }
    }
    Ok(props)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn word(id: u64, text: &str) -> Value {
        json!({
            "id": id,
            "type": "word",
            "box": {"l": 1.0, "t": 2.0, "w": 3.0, "h": 4.0},
            "content": text,
            "font": 2,
            "properties": {},
            "metadata": []
        })
    }

    #[test]
    fn decodes_a_word() {
        let Element::Word(w) = decode_element(&word(7, "Hello")).unwrap() else {
            panic!("expected a word");
        };
        assert_eq!(w.id, ElementId(7));
        assert_eq!(w.content, "Hello");
        assert_eq!(w.font, Some(FontId(2)));
        assert_eq!(w.bounds, BoundingBox::new(1.0, 2.0, 3.0, 4.0));
    }

    #[test]
    fn decodes_nested_heading() {
        let raw = json!({
            "id": 10,
            "type": "heading",
            "level": 2,
            "box": {"l": 0, "t": 0, "w": 10, "h": 5},
            "properties": {"order": 1, "isHeader": false},
            "content": [{
                "id": 9,
                "type": "line",
                "box": {"l": 0, "t": 0, "w": 10, "h": 5},
                "content": [word(7, "Chapter"), word(8, "One")]
            }]
        });
        let heading = decode_element(&raw).unwrap();
        assert_eq!(heading.kind(), ElementType::Heading);
        assert_eq!(heading.properties().order, Some(1));
        assert_eq!(heading.properties().is_header, Some(false));
        assert_eq!(heading.text(), "Chapter One");
        let Element::Heading(h) = heading else {
            unreachable!()
        };
        assert_eq!(h.level, 2);
    }

    #[test]
    fn unknown_type_fails_fast() {
        let mut raw = word(1, "x");
        raw["type"] = json!("sticker");
        let err = decode_element(&raw).unwrap_err();
        assert!(
            matches!(err, ParsrError::UnknownElementType { ref value } if value == "sticker"),
            "got: {err}"
        );
    }

    #[test]
    fn underscored_type_is_normalised() {
        let raw = json!({
            "id": 3,
            "type": "table_cell",
            "box": {"l": 0, "t": 0, "w": 1, "h": 1},
            "content": [word(1, "42")]
        });
        let cell = decode_element(&raw).unwrap();
        assert_eq!(cell.kind(), ElementType::TableCell);
        assert_eq!(cell.children().len(), 1);
    }

    #[test]
    fn image_keeps_extra_fields_as_properties() {
        let raw = json!({
            "id": 2054,
            "type": "image",
            "box": {"l": 0, "t": 0, "w": 612, "h": 792},
            "properties": {"order": 0},
            "metadata": [],
            "src": "assets/img-000.png",
            "refId": "Im0",
            "xObjId": "Im0",
            "xObjExt": "png",
            "enabled": true
        });
        let image = decode_element(&raw).unwrap();
        let props = image.properties();
        assert_eq!(props.get_as::<String>("src").as_deref(), Some("assets/img-000.png"));
        assert_eq!(props.get_as::<String>("xObjExt").as_deref(), Some("png"));
        assert_eq!(props.get_as::<bool>("enabled"), Some(true));
        assert_eq!(props.order, Some(0));
        assert!(image.children().is_empty());
    }

    #[test]
    fn opaque_content_is_kept_raw() {
        let raw = json!({
            "id": 5,
            "type": "drawing",
            "box": {"l": 0, "t": 0, "w": 1, "h": 1},
            "content": [{"x": 1, "y": 2}]
        });
        let Element::Any(drawing) = decode_element(&raw).unwrap() else {
            panic!("expected a generic element");
        };
        assert!(matches!(drawing.content, AnyContent::Raw(PropertyValue::Array(_))));
    }

    #[test]
    fn missing_box_names_the_field() {
        let mut raw = word(1, "x");
        raw.as_object_mut().unwrap().remove("box");
        match decode_element(&raw).unwrap_err() {
            ParsrError::MissingField { field } => assert_eq!(field, "element.box"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn heading_requires_level() {
        let raw = json!({
            "id": 1,
            "type": "heading",
            "box": {"l": 0, "t": 0, "w": 1, "h": 1},
            "content": []
        });
        assert!(decode_element(&raw).unwrap_err().is_malformed_input());
    }

    #[test]
    fn mistyped_known_flag_falls_back_to_others() {
        let props = decode_properties(&json!({"isHeader": "yes", "custom": [1]}), "p").unwrap();
        assert_eq!(props.is_header, None);
        assert_eq!(props.get("isHeader"), Some(&PropertyValue::String("yes".into())));
        assert_eq!(props.get_as::<Vec<i64>>("custom"), Some(vec![1]));
    }
}
