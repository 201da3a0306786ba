//! Callbacks for walking a parsed document.
//!
//! [`Page::accept`] walks a page's element tree depth-first, pre-order,
//! calling one [`PageVisitor`] method per element. It uses an explicit stack,
//! so deeply nested documents cannot overflow the call stack.

use crate::model::element::{AnyElement, Element, Heading, Line, Paragraph, Word};
use crate::model::font::Font;
use crate::model::metadata::Metadata;
use crate::model::page::Page;

/// Per-element callbacks. Every method defaults to a no-op.
pub trait PageVisitor {
    fn visit_heading(&mut self, _heading: &Heading) {}
    fn visit_line(&mut self, _line: &Line) {}
    fn visit_paragraph(&mut self, _paragraph: &Paragraph) {}
    fn visit_word(&mut self, _word: &Word) {}
    /// Tables, images, lists and every other element without a dedicated shape.
    fn visit_any(&mut self, _element: &AnyElement) {}
}

/// Callbacks for a whole document, fed by [`crate::Document::accept`].
///
/// Metadata, pages and fonts are delivered in the order they appear in the
/// source. Each page's element tree is visited right after its `visit_page`.
pub trait DocumentVisitor: PageVisitor {
    fn visit_meta(&mut self, _meta: &Metadata) {}
    fn visit_page(&mut self, _page: &Page) {}
    fn visit_font(&mut self, _font: &Font) {}
}

impl Page {
    /// Visit every element of this page, parents before children and
    /// children before the parent's next sibling.
    pub fn accept<V: PageVisitor + ?Sized>(&self, visitor: &mut V) {
        let mut stack: Vec<&Element> = self.elements.iter().rev().collect();
        while let Some(element) = stack.pop() {
            match element {
                Element::Word(word) => visitor.visit_word(word),
                Element::Line(line) => visitor.visit_line(line),
                Element::Paragraph(paragraph) => visitor.visit_paragraph(paragraph),
                Element::Heading(heading) => visitor.visit_heading(heading),
                Element::Any(any) => visitor.visit_any(any),
            }
            stack.extend(element.children().iter().rev());
        }
    }
}
