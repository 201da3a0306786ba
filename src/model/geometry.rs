//! Geometry value types: bounding boxes, points and page rotation.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in page coordinates.
///
/// The server writes boxes as `{"l": .., "t": .., "w": .., "h": ..}`; the
/// long field names are accepted as well.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    #[serde(rename = "l", alias = "left")]
    pub left: f64,
    #[serde(rename = "t", alias = "top")]
    pub top: f64,
    #[serde(rename = "w", alias = "width")]
    pub width: f64,
    #[serde(rename = "h", alias = "height")]
    pub height: f64,
}

impl BoundingBox {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Whether `other` lies entirely inside this box.
    pub fn contains(&self, other: &BoundingBox) -> bool {
        other.left >= self.left
            && other.top >= self.top
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Rotation applied to a page by the extractor.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rotation {
    pub degrees: f64,
    pub origin: Point,
    pub translation: Point,
}
