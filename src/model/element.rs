//! The parsed document's content tree.
//!
//! Elements are produced only by decoding a page's `elements` array (see
//! [`crate::codec::element`]) and are owned by their [`crate::Page`].
//! Words, lines, paragraphs and headings get dedicated shapes; every other
//! element type is kept as an [`AnyElement`].

use crate::model::ids::{ElementId, FontId, MetadataId};
use crate::model::properties::{Properties, PropertyValue};
use crate::model::geometry::BoundingBox;
use std::fmt;

/// The `type` discriminator of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementType {
    Character,
    Drawing,
    Heading,
    Image,
    List,
    Paragraph,
    Table,
    TableCell,
    TableRow,
    Word,
    Line,
    Barcode,
}

impl ElementType {
    pub const ALL: [ElementType; 12] = [
        ElementType::Character,
        ElementType::Drawing,
        ElementType::Heading,
        ElementType::Image,
        ElementType::List,
        ElementType::Paragraph,
        ElementType::Table,
        ElementType::TableCell,
        ElementType::TableRow,
        ElementType::Word,
        ElementType::Line,
        ElementType::Barcode,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ElementType::Character => "character",
            ElementType::Drawing => "drawing",
            ElementType::Heading => "heading",
            ElementType::Image => "image",
            ElementType::List => "list",
            ElementType::Paragraph => "paragraph",
            ElementType::Table => "table",
            ElementType::TableCell => "table-cell",
            ElementType::TableRow => "table-row",
            ElementType::Word => "word",
            ElementType::Line => "line",
            ElementType::Barcode => "barcode",
        }
    }

    /// Match a wire discriminator after normalising `_` to `-` and case.
    pub fn from_wire(raw: &str) -> Option<Self> {
        let normalised = raw.replace('_', "-").to_lowercase();
        ElementType::ALL
            .into_iter()
            .find(|t| t.name() == normalised)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub id: ElementId,
    pub bounds: BoundingBox,
    pub properties: Properties,
    pub metadata: Vec<MetadataId>,
    pub content: String,
    pub font: Option<FontId>,
}

impl Word {
    pub fn new(id: ElementId, bounds: BoundingBox, content: impl Into<String>) -> Self {
        Self {
            id,
            bounds,
            properties: Properties::default(),
            metadata: Vec::new(),
            content: content.into(),
            font: None,
        }
    }
}

/// A line of text. Children are usually words.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub id: ElementId,
    pub bounds: BoundingBox,
    pub properties: Properties,
    pub metadata: Vec<MetadataId>,
    pub content: Vec<Element>,
}

impl Line {
    pub fn new(id: ElementId, bounds: BoundingBox, content: Vec<Element>) -> Self {
        Self {
            id,
            bounds,
            properties: Properties::default(),
            metadata: Vec::new(),
            content,
        }
    }
}

/// A paragraph. Children are usually lines.
#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub id: ElementId,
    pub bounds: BoundingBox,
    pub properties: Properties,
    pub metadata: Vec<MetadataId>,
    pub content: Vec<Element>,
}

impl Paragraph {
    pub fn new(id: ElementId, bounds: BoundingBox, content: Vec<Element>) -> Self {
        Self {
            id,
            bounds,
            properties: Properties::default(),
            metadata: Vec::new(),
            content,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Heading {
    pub id: ElementId,
    pub bounds: BoundingBox,
    pub properties: Properties,
    pub metadata: Vec<MetadataId>,
    pub content: Vec<Element>,
    /// Heading depth, 1 being the outermost.
    pub level: u32,
}

impl Heading {
    pub fn new(id: ElementId, bounds: BoundingBox, content: Vec<Element>, level: u32) -> Self {
        Self {
            id,
            bounds,
            properties: Properties::default(),
            metadata: Vec::new(),
            content,
            level,
        }
    }
}

/// Content of an element without a dedicated shape.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AnyContent {
    #[default]
    Empty,
    Text(String),
    /// Nested typed elements, e.g. table rows or list items.
    Elements(Vec<Element>),
    /// Anything else, kept as-is.
    Raw(PropertyValue),
}

/// Table, image, drawing, list, barcode, character and friends.
#[derive(Debug, Clone, PartialEq)]
pub struct AnyElement {
    pub kind: ElementType,
    pub id: ElementId,
    pub bounds: BoundingBox,
    pub properties: Properties,
    pub metadata: Vec<MetadataId>,
    pub content: AnyContent,
}

/// One node of a page's content tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Word(Word),
    Line(Line),
    Paragraph(Paragraph),
    Heading(Heading),
    Any(AnyElement),
}

impl Element {
    pub fn kind(&self) -> ElementType {
        match self {
            Element::Word(_) => ElementType::Word,
            Element::Line(_) => ElementType::Line,
            Element::Paragraph(_) => ElementType::Paragraph,
            Element::Heading(_) => ElementType::Heading,
            Element::Any(e) => e.kind,
        }
    }

    pub fn id(&self) -> ElementId {
        match self {
            Element::Word(e) => e.id,
            Element::Line(e) => e.id,
            Element::Paragraph(e) => e.id,
            Element::Heading(e) => e.id,
            Element::Any(e) => e.id,
        }
    }

    pub fn bounds(&self) -> &BoundingBox {
        match self {
            Element::Word(e) => &e.bounds,
            Element::Line(e) => &e.bounds,
            Element::Paragraph(e) => &e.bounds,
            Element::Heading(e) => &e.bounds,
            Element::Any(e) => &e.bounds,
        }
    }

    pub fn properties(&self) -> &Properties {
        match self {
            Element::Word(e) => &e.properties,
            Element::Line(e) => &e.properties,
            Element::Paragraph(e) => &e.properties,
            Element::Heading(e) => &e.properties,
            Element::Any(e) => &e.properties,
        }
    }

    pub fn metadata(&self) -> &[MetadataId] {
        match self {
            Element::Word(e) => &e.metadata,
            Element::Line(e) => &e.metadata,
            Element::Paragraph(e) => &e.metadata,
            Element::Heading(e) => &e.metadata,
            Element::Any(e) => &e.metadata,
        }
    }

    /// Nested elements; empty for words and for opaque content.
    pub fn children(&self) -> &[Element] {
        match self {
            Element::Word(_) => &[],
            Element::Line(e) => &e.content,
            Element::Paragraph(e) => &e.content,
            Element::Heading(e) => &e.content,
            Element::Any(e) => match &e.content {
                AnyContent::Elements(children) => children,
                _ => &[],
            },
        }
    }

    /// Plain text of this subtree. Words inside a line are joined by spaces,
    /// lines inside a block by newlines.
    pub fn text(&self) -> String {
        match self {
            Element::Word(w) => w.content.clone(),
            Element::Paragraph(_) | Element::Heading(_) => join_text(self.children(), "\n"),
            Element::Any(AnyElement {
                content: AnyContent::Text(text),
                ..
            }) => text.clone(),
            _ => join_text(self.children(), " "),
        }
    }
}

fn join_text(children: &[Element], sep: &str) -> String {
    children
        .iter()
        .map(Element::text)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

impl From<Word> for Element {
    fn from(e: Word) -> Self {
        Element::Word(e)
    }
}

impl From<Line> for Element {
    fn from(e: Line) -> Self {
        Element::Line(e)
    }
}

impl From<Paragraph> for Element {
    fn from(e: Paragraph) -> Self {
        Element::Paragraph(e)
    }
}

impl From<Heading> for Element {
    fn from(e: Heading) -> Self {
        Element::Heading(e)
    }
}

impl From<AnyElement> for Element {
    fn from(e: AnyElement) -> Self {
        Element::Any(e)
    }
}
