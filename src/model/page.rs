//! A single page of a parsed document.

use crate::model::element::Element;
use crate::model::geometry::{BoundingBox, Rotation};

/// A page and its top-level elements, in document order.
///
/// Traverse the element tree with [`Page::accept`].
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub bounds: BoundingBox,
    pub rotation: Rotation,
    /// Page number as reported by the server (`pageNumber`).
    pub number: u32,
    pub elements: Vec<Element>,
}

impl Page {
    /// Total number of elements in the page's tree, nested ones included.
    pub fn element_count(&self) -> usize {
        let mut count = 0;
        let mut stack: Vec<&Element> = self.elements.iter().collect();
        while let Some(next) = stack.pop() {
            count += 1;
            stack.extend(next.children());
        }
        count
    }
}
