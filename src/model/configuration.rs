//! The processing configuration submitted alongside a document.
//!
//! A [`Configuration`] bundles the extraction engines, the cleaning pipeline
//! and the output selection. It is built via [`Configuration::builder()`] or
//! taken from [`Configuration::default()`], which mirrors the server's own
//! default pipeline.
//!
//! The JSON wire form is handled by [`crate::codec::configuration`]; the
//! `Serialize`/`Deserialize` impls delegate to it.

use crate::error::ParsrError;
use crate::model::cleaner::{
    Cleaner, CleanerSet, HeaderFooterDetection, ImageDetection, LinesToParagraph,
    ReadingOrderDetection, RedundancyDetection, RegexMatcher, TableDetection,
    TableOfContentsDetection, WhitespaceRemoval,
};
use crate::model::extractor::{Extractor, OcrExtractor, PdfExtractor};
use crate::model::output::{Format, Granularity, Output};

/// Configuration version understood by current servers.
pub const DEFAULT_VERSION: &str = "0.9";

/// Processing configuration for a parsing job.
///
/// # Example
/// ```rust
/// use docparsr::{Cleaner, Configuration, Format};
///
/// let config = Configuration::builder()
///     .cleaner(Cleaner::LinkDetection)
///     .format(Format::Markdown)
///     .language("fra")
///     .build()
///     .unwrap();
/// assert!(config.output.is_enabled(Format::Markdown));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    /// Configuration schema version. Travels as a JSON number.
    pub version: String,
    pub extractor: Extractor,
    pub cleaners: CleanerSet,
    pub output: Output,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            extractor: Extractor::default(),
            cleaners: default_cleaners(),
            output: Output::default(),
        }
    }
}

/// The server's default cleaning pipeline.
pub fn default_cleaners() -> CleanerSet {
    [
        Cleaner::OutOfPageRemoval,
        Cleaner::WhitespaceRemoval(WhitespaceRemoval::default()),
        Cleaner::RedundancyDetection(RedundancyDetection::default()),
        Cleaner::TableDetection(TableDetection::default()),
        Cleaner::HeaderFooterDetection(HeaderFooterDetection::default()),
        Cleaner::ReadingOrderDetection(ReadingOrderDetection::default()),
        Cleaner::LinkDetection,
        Cleaner::ImageDetection(ImageDetection::default()),
        Cleaner::WordsToLineNew,
        Cleaner::LinesToParagraph(LinesToParagraph::default()),
        Cleaner::MlHeadingDetection,
        Cleaner::ListDetection,
        Cleaner::PageNumberDetection,
        Cleaner::HierarchyDetection,
        Cleaner::TableOfContentsDetection(TableOfContentsDetection::default()),
        Cleaner::RegexMatcher(RegexMatcher::default()),
    ]
    .into_iter()
    .collect()
}

impl Configuration {
    /// Create a builder seeded with [`Configuration::default()`].
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder {
            config: Self::default(),
        }
    }

    /// The version as the number written on the wire.
    pub fn numeric_version(&self) -> Result<f64, ParsrError> {
        parse_version(&self.version)
    }
}

pub(crate) fn parse_version(version: &str) -> Result<f64, ParsrError> {
    match version.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ParsrError::InvalidConfig(format!(
            "version must be numeric, got '{version}'"
        ))),
    }
}

/// Builder for [`Configuration`].
#[derive(Debug)]
pub struct ConfigurationBuilder {
    config: Configuration,
}

impl ConfigurationBuilder {
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.config.version = version.into();
        self
    }

    pub fn pdf_extractor(mut self, pdf: PdfExtractor) -> Self {
        self.config.extractor.pdf = pdf;
        self
    }

    pub fn ocr_extractor(mut self, ocr: OcrExtractor) -> Self {
        self.config.extractor.ocr = ocr;
        self
    }

    /// Add an OCR language.
    pub fn language(mut self, lang: impl Into<String>) -> Self {
        self.config.extractor.languages.insert(lang.into());
        self
    }

    /// Replace the OCR language set.
    pub fn languages<I, S>(mut self, langs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.extractor.languages = langs.into_iter().map(Into::into).collect();
        self
    }

    /// Add (or replace, by tag) a cleaner.
    pub fn cleaner(mut self, cleaner: Cleaner) -> Self {
        self.config.cleaners.insert(cleaner);
        self
    }

    /// Replace the whole cleaning pipeline.
    pub fn cleaners(mut self, cleaners: impl IntoIterator<Item = Cleaner>) -> Self {
        self.config.cleaners = cleaners.into_iter().collect();
        self
    }

    pub fn without_cleaner(mut self, tag: &str) -> Self {
        self.config.cleaners.remove(tag);
        self
    }

    pub fn granularity(mut self, granularity: Granularity) -> Self {
        self.config.output.granularity = granularity;
        self
    }

    pub fn include_marginals(mut self, v: bool) -> Self {
        self.config.output.include_marginals = v;
        self
    }

    pub fn include_drawings(mut self, v: bool) -> Self {
        self.config.output.include_drawings = v;
        self
    }

    /// Enable an additional output format.
    pub fn format(mut self, format: Format) -> Self {
        self.config.output.formats.insert(format);
        self
    }

    /// Replace the enabled output formats.
    pub fn formats(mut self, formats: impl IntoIterator<Item = Format>) -> Self {
        self.config.output.formats = formats.into_iter().collect();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<Configuration, ParsrError> {
        let c = &self.config;
        parse_version(&c.version)?;
        if c.output.formats.is_empty() {
            return Err(ParsrError::InvalidConfig(
                "at least one output format must be enabled".into(),
            ));
        }
        if c.extractor.languages.iter().any(|l| l.trim().is_empty()) {
            return Err(ParsrError::InvalidConfig(
                "OCR language codes must not be blank".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pipeline_has_sixteen_cleaners() {
        let config = Configuration::default();
        assert_eq!(config.version, "0.9");
        assert_eq!(config.cleaners.len(), 16);
        assert!(config.cleaners.contains_tag("regex-matcher"));
        assert!(!config.cleaners.contains_tag("drawing-detection"));
    }

    #[test]
    fn builder_rejects_non_numeric_version() {
        let err = Configuration::builder().version("latest").build().unwrap_err();
        assert!(err.is_caller_misuse(), "got: {err}");
    }

    #[test]
    fn builder_rejects_empty_formats() {
        let err = Configuration::builder()
            .formats(Vec::new())
            .build()
            .unwrap_err();
        assert!(matches!(err, ParsrError::InvalidConfig(_)));
    }

    #[test]
    fn builder_edits_pipeline() {
        let config = Configuration::builder()
            .without_cleaner("regex-matcher")
            .cleaner(Cleaner::DrawingDetection)
            .languages(["eng", "fra"])
            .format(Format::Markdown)
            .build()
            .unwrap();
        assert!(!config.cleaners.contains_tag("regex-matcher"));
        assert!(config.cleaners.contains_tag("drawing-detection"));
        assert_eq!(config.extractor.languages.len(), 2);
        assert!(config.output.is_enabled(Format::Json));
        assert!(config.output.is_enabled(Format::Markdown));
    }

    #[test]
    fn numeric_version() {
        let config = Configuration::builder().version("0.90").build().unwrap();
        assert_eq!(config.numeric_version().unwrap(), 0.9);
    }
}
