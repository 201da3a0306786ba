//! Cleaner modules: the server-side post-processing steps applied to raw
//! extraction output.
//!
//! Each cleaner has a stable kebab-case tag that identifies it on the wire.
//! Some cleaners are plain markers; the rest carry parameters with defaults
//! matching the server's own. Tags this crate does not know are captured as
//! [`Cleaner::Unknown`] so configurations from newer servers still load.
//!
//! Adding a cleaner means adding a variant here *and* both codec branches in
//! [`crate::codec::cleaner`]; otherwise it round-trips as `Unknown`.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A processing module in the server's cleaning pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Cleaner {
    DrawingDetection,
    HeaderFooterDetection(HeaderFooterDetection),
    HierarchyDetection,
    ImageDetection(ImageDetection),
    KeyValueDetection(KeyValueDetection),
    LinesToParagraph(LinesToParagraph),
    LinkDetection,
    ListDetection,
    MlHeadingDetection,
    NumberCorrection(NumberCorrection),
    OutOfPageRemoval,
    PageNumberDetection,
    ReadingOrderDetection(ReadingOrderDetection),
    RedundancyDetection(RedundancyDetection),
    RegexMatcher(RegexMatcher),
    SeparateWords,
    TableDetection(TableDetection),
    TableOfContentsDetection(TableOfContentsDetection),
    WhitespaceRemoval(WhitespaceRemoval),
    WordsToLine(WordsToLine),
    WordsToLineNew,
    /// A tag this crate does not recognise. Parameters are not retained.
    Unknown(String),
}

impl Cleaner {
    /// Every tag with a dedicated variant, in wire order of the server's docs.
    pub const KNOWN_TAGS: [&'static str; 21] = [
        "drawing-detection",
        "header-footer-detection",
        "hierarchy-detection",
        "image-detection",
        "key-value-detection",
        "lines-to-paragraph",
        "link-detection",
        "list-detection",
        "ml-heading-detection",
        "number-correction",
        "out-of-page-removal",
        "page-number-detection",
        "reading-order-detection",
        "redundancy-detection",
        "regex-matcher",
        "separate-words",
        "table-detection",
        "table-of-contents-detection",
        "whitespace-removal",
        "words-to-line",
        "words-to-line-new",
    ];

    /// The wire tag of this cleaner.
    pub fn name(&self) -> &str {
        match self {
            Cleaner::DrawingDetection => "drawing-detection",
            Cleaner::HeaderFooterDetection(_) => "header-footer-detection",
            Cleaner::HierarchyDetection => "hierarchy-detection",
            Cleaner::ImageDetection(_) => "image-detection",
            Cleaner::KeyValueDetection(_) => "key-value-detection",
            Cleaner::LinesToParagraph(_) => "lines-to-paragraph",
            Cleaner::LinkDetection => "link-detection",
            Cleaner::ListDetection => "list-detection",
            Cleaner::MlHeadingDetection => "ml-heading-detection",
            Cleaner::NumberCorrection(_) => "number-correction",
            Cleaner::OutOfPageRemoval => "out-of-page-removal",
            Cleaner::PageNumberDetection => "page-number-detection",
            Cleaner::ReadingOrderDetection(_) => "reading-order-detection",
            Cleaner::RedundancyDetection(_) => "redundancy-detection",
            Cleaner::RegexMatcher(_) => "regex-matcher",
            Cleaner::SeparateWords => "separate-words",
            Cleaner::TableDetection(_) => "table-detection",
            Cleaner::TableOfContentsDetection(_) => "table-of-contents-detection",
            Cleaner::WhitespaceRemoval(_) => "whitespace-removal",
            Cleaner::WordsToLine(_) => "words-to-line",
            Cleaner::WordsToLineNew => "words-to-line-new",
            Cleaner::Unknown(name) => name,
        }
    }

    /// Whether the cleaner is written as `[tag, {params}]` rather than a bare tag.
    pub fn has_parameters(&self) -> bool {
        !matches!(
            self,
            Cleaner::DrawingDetection
                | Cleaner::HierarchyDetection
                | Cleaner::LinkDetection
                | Cleaner::ListDetection
                | Cleaner::MlHeadingDetection
                | Cleaner::OutOfPageRemoval
                | Cleaner::PageNumberDetection
                | Cleaner::SeparateWords
                | Cleaner::WordsToLineNew
                | Cleaner::Unknown(_)
        )
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Cleaner::Unknown(_))
    }

    /// The cleaner for `tag` with all parameters at their defaults, or
    /// `None` when the tag is not known.
    pub fn with_defaults(tag: &str) -> Option<Cleaner> {
        let cleaner = match tag {
            "drawing-detection" => Cleaner::DrawingDetection,
            "header-footer-detection" => {
                Cleaner::HeaderFooterDetection(HeaderFooterDetection::default())
            }
            "hierarchy-detection" => Cleaner::HierarchyDetection,
            "image-detection" => Cleaner::ImageDetection(ImageDetection::default()),
            "key-value-detection" => Cleaner::KeyValueDetection(KeyValueDetection::default()),
            "lines-to-paragraph" => Cleaner::LinesToParagraph(LinesToParagraph::default()),
            "link-detection" => Cleaner::LinkDetection,
            "list-detection" => Cleaner::ListDetection,
            "ml-heading-detection" => Cleaner::MlHeadingDetection,
            "number-correction" => Cleaner::NumberCorrection(NumberCorrection::default()),
            "out-of-page-removal" => Cleaner::OutOfPageRemoval,
            "page-number-detection" => Cleaner::PageNumberDetection,
            "reading-order-detection" => {
                Cleaner::ReadingOrderDetection(ReadingOrderDetection::default())
            }
            "redundancy-detection" => Cleaner::RedundancyDetection(RedundancyDetection::default()),
            "regex-matcher" => Cleaner::RegexMatcher(RegexMatcher::default()),
            "separate-words" => Cleaner::SeparateWords,
            "table-detection" => Cleaner::TableDetection(TableDetection::default()),
            "table-of-contents-detection" => {
                Cleaner::TableOfContentsDetection(TableOfContentsDetection::default())
            }
            "whitespace-removal" => Cleaner::WhitespaceRemoval(WhitespaceRemoval::default()),
            "words-to-line" => Cleaner::WordsToLine(WordsToLine::default()),
            "words-to-line-new" => Cleaner::WordsToLineNew,
            _ => return None,
        };
        Some(cleaner)
    }
}

impl fmt::Display for Cleaner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Parameterised cleaners ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderFooterDetection {
    /// Pages excluded from header/footer detection.
    pub ignore_pages: BTreeSet<u32>,
    /// Height of the top/bottom margin band, as a percentage of the page. Default: 15.
    pub max_margin_percentage: u32,
}

impl Default for HeaderFooterDetection {
    fn default() -> Self {
        Self {
            ignore_pages: BTreeSet::new(),
            max_margin_percentage: 15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImageDetection {
    /// Run OCR on detected images. Default: false.
    pub ocr_images: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyValueDetection {
    pub threshold: f64,
    pub key_value_divided_chars: BTreeSet<String>,
    pub key_patterns: BTreeMap<String, BTreeSet<String>>,
}

impl Default for KeyValueDetection {
    fn default() -> Self {
        Self {
            threshold: 0.2,
            key_value_divided_chars: BTreeSet::new(),
            key_patterns: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinesToParagraph {
    pub tolerance: f64,
}

impl Default for LinesToParagraph {
    fn default() -> Self {
        Self { tolerance: 0.25 }
    }
}

/// Default pattern for [`NumberCorrection::number_reg_exp`].
pub const DEFAULT_NUMBER_REGEXP: &str = r"^\d+(?:[.,]\d+)*$";

#[derive(Debug, Clone, PartialEq)]
pub struct NumberCorrection {
    pub fix_split_numbers: bool,
    pub max_consecutive_splits: u32,
    pub number_reg_exp: String,
    pub whitelist: BTreeSet<String>,
}

impl Default for NumberCorrection {
    fn default() -> Self {
        Self {
            fix_split_numbers: true,
            max_consecutive_splits: 3,
            number_reg_exp: DEFAULT_NUMBER_REGEXP.to_string(),
            whitelist: BTreeSet::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadingOrderDetection {
    pub min_vertical_gap_width: u32,
    pub min_column_width_in_page_percent: f64,
}

impl Default for ReadingOrderDetection {
    fn default() -> Self {
        Self {
            min_vertical_gap_width: 5,
            min_column_width_in_page_percent: 15.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RedundancyDetection {
    pub min_overlap: f64,
}

impl Default for RedundancyDetection {
    fn default() -> Self {
        Self { min_overlap: 0.5 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegexMatcher {
    pub is_case_sensitive: bool,
    pub is_global: bool,
    pub queries: BTreeSet<RegexQuery>,
}

impl Default for RegexMatcher {
    fn default() -> Self {
        Self {
            is_case_sensitive: true,
            is_global: true,
            queries: BTreeSet::new(),
        }
    }
}

/// A labelled pattern searched for by [`RegexMatcher`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegexQuery {
    pub label: String,
    pub regex: String,
}

impl RegexQuery {
    pub fn new(label: impl Into<String>, regex: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            regex: regex.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableDetection {
    pub check_drawings: bool,
    pub run_config: Vec<TableDetectionOption>,
}

impl Default for TableDetection {
    fn default() -> Self {
        Self {
            check_drawings: true,
            run_config: Vec::new(),
        }
    }
}

/// One table-detection pass: the pages it covers and the detection flavor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableDetectionOption {
    /// Pages to scan; empty means all pages.
    pub pages: BTreeSet<u32>,
    pub flavor: Flavor,
}

/// Table-detection strategy.
///
/// Written lowercase on the wire; read case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Flavor {
    /// Tables with ruling lines.
    #[default]
    Lattice,
    /// Tables laid out by whitespace alone.
    Stream,
}

impl Flavor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Flavor::Lattice => "lattice",
            Flavor::Stream => "stream",
        }
    }

    /// Case-insensitive lookup; `None` for anything but lattice/stream.
    pub fn parse(value: &str) -> Option<Flavor> {
        match value.to_ascii_uppercase().as_str() {
            "LATTICE" => Some(Flavor::Lattice),
            "STREAM" => Some(Flavor::Stream),
            _ => None,
        }
    }
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableOfContentsDetection {
    pub page_keywords: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct WhitespaceRemoval {
    pub min_width: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WordsToLine {
    pub line_height_uncertainty: f64,
    pub top_uncertainty: f64,
    pub maximum_space_between_words: u32,
    pub merge_table_elements: bool,
}

impl Default for WordsToLine {
    fn default() -> Self {
        Self {
            line_height_uncertainty: 0.2,
            top_uncertainty: 0.4,
            maximum_space_between_words: 100,
            merge_table_elements: false,
        }
    }
}

// ── CleanerSet ───────────────────────────────────────────────────────────

/// The cleaners of a configuration, with set semantics keyed by tag.
///
/// Inserting a cleaner whose tag is already present replaces the old entry.
/// Iteration follows insertion order, but equality ignores order.
#[derive(Debug, Clone, Default)]
pub struct CleanerSet {
    entries: Vec<Cleaner>,
}

impl CleanerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `cleaner`, returning the entry it replaced, if any.
    pub fn insert(&mut self, cleaner: Cleaner) -> Option<Cleaner> {
        match self.entries.iter().position(|c| c.name() == cleaner.name()) {
            Some(idx) => Some(std::mem::replace(&mut self.entries[idx], cleaner)),
            None => {
                self.entries.push(cleaner);
                None
            }
        }
    }

    pub fn get(&self, tag: &str) -> Option<&Cleaner> {
        self.entries.iter().find(|c| c.name() == tag)
    }

    pub fn contains_tag(&self, tag: &str) -> bool {
        self.get(tag).is_some()
    }

    pub fn remove(&mut self, tag: &str) -> Option<Cleaner> {
        let idx = self.entries.iter().position(|c| c.name() == tag)?;
        Some(self.entries.remove(idx))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Cleaner> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PartialEq for CleanerSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|c| other.get(c.name()).is_some_and(|o| o == c))
    }
}

impl FromIterator<Cleaner> for CleanerSet {
    fn from_iter<I: IntoIterator<Item = Cleaner>>(iter: I) -> Self {
        let mut set = CleanerSet::new();
        set.extend(iter);
        set
    }
}

impl Extend<Cleaner> for CleanerSet {
    fn extend<I: IntoIterator<Item = Cleaner>>(&mut self, iter: I) {
        for cleaner in iter {
            self.insert(cleaner);
        }
    }
}

impl<'a> IntoIterator for &'a CleanerSet {
    type Item = &'a Cleaner;
    type IntoIter = std::slice::Iter<'a, Cleaner>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for CleanerSet {
    type Item = Cleaner;
    type IntoIter = std::vec::IntoIter<Cleaner>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_known_tag_has_defaults() {
        for tag in Cleaner::KNOWN_TAGS {
            let cleaner = Cleaner::with_defaults(tag).expect(tag);
            assert_eq!(cleaner.name(), tag);
            assert!(!cleaner.is_unknown());
        }
        assert!(Cleaner::with_defaults("totally-new-module").is_none());
    }

    #[test]
    fn tags_are_unique() {
        let unique: BTreeSet<_> = Cleaner::KNOWN_TAGS.iter().collect();
        assert_eq!(unique.len(), Cleaner::KNOWN_TAGS.len());
    }

    #[test]
    fn flavor_parse_is_case_insensitive() {
        assert_eq!(Flavor::parse("STREAM"), Some(Flavor::Stream));
        assert_eq!(Flavor::parse("stream"), Some(Flavor::Stream));
        assert_eq!(Flavor::parse("Lattice"), Some(Flavor::Lattice));
        assert_eq!(Flavor::parse("grid"), None);
        assert_eq!(Flavor::Stream.as_str(), "stream");
    }

    #[test]
    fn set_collapses_duplicate_tags() {
        let mut set = CleanerSet::new();
        assert!(set.insert(Cleaner::WhitespaceRemoval(WhitespaceRemoval { min_width: 1 })).is_none());
        let replaced = set.insert(Cleaner::WhitespaceRemoval(WhitespaceRemoval { min_width: 5 }));
        assert_eq!(
            replaced,
            Some(Cleaner::WhitespaceRemoval(WhitespaceRemoval { min_width: 1 }))
        );
        assert_eq!(set.len(), 1);
        assert_eq!(
            set.get("whitespace-removal"),
            Some(&Cleaner::WhitespaceRemoval(WhitespaceRemoval { min_width: 5 }))
        );
    }

    #[test]
    fn set_equality_ignores_order() {
        let a: CleanerSet = [Cleaner::LinkDetection, Cleaner::ListDetection]
            .into_iter()
            .collect();
        let b: CleanerSet = [Cleaner::ListDetection, Cleaner::LinkDetection]
            .into_iter()
            .collect();
        assert_eq!(a, b);

        let c: CleanerSet = [Cleaner::ListDetection].into_iter().collect();
        assert_ne!(a, c);
    }

    #[test]
    fn marker_cleaners_have_no_parameters() {
        assert!(!Cleaner::DrawingDetection.has_parameters());
        assert!(!Cleaner::Unknown("x".into()).has_parameters());
        assert!(Cleaner::RegexMatcher(RegexMatcher::default()).has_parameters());
    }
}
