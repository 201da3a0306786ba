//! Typed model of configurations and parsed documents.
//!
//! Two halves:
//!
//! * **Configuration**: [`Configuration`], its [`Cleaner`] pipeline,
//!   [`Extractor`] and [`Output`] selection. Sent to the server with a job.
//! * **Document**: [`Page`], the [`Element`] tree, [`Font`] and [`Metadata`].
//!   Produced by decoding the server's JSON result.

pub mod cleaner;
pub mod configuration;
pub mod element;
pub mod extractor;
pub mod font;
pub mod geometry;
pub mod ids;
pub mod metadata;
pub mod output;
pub mod page;
pub mod properties;

pub use cleaner::{
    Cleaner, CleanerSet, Flavor, HeaderFooterDetection, ImageDetection, KeyValueDetection,
    LinesToParagraph, NumberCorrection, ReadingOrderDetection, RedundancyDetection, RegexMatcher,
    RegexQuery, TableDetection, TableDetectionOption, TableOfContentsDetection,
    WhitespaceRemoval, WordsToLine,
};
pub use configuration::{Configuration, ConfigurationBuilder};
pub use element::{AnyContent, AnyElement, Element, ElementType, Heading, Line, Paragraph, Word};
pub use extractor::{Extractor, OcrExtractor, PdfExtractor};
pub use font::{Font, FontColor, FontWeight};
pub use geometry::{BoundingBox, Point, Rotation};
pub use ids::{ElementId, FontId, MetadataId};
pub use metadata::{Metadata, MetadataContent, MetadataType, RegexContent};
pub use output::{Format, Granularity, Output};
pub use page::Page;
pub use properties::{FromProperty, Properties, PropertyValue};
