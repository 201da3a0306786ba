//! Extraction engine selection.

use std::collections::BTreeSet;
use std::fmt;

/// Which engines the server uses to pull raw text out of the input.
#[derive(Debug, Clone, PartialEq)]
pub struct Extractor {
    pub pdf: PdfExtractor,
    pub ocr: OcrExtractor,
    /// OCR languages, as Tesseract language codes (`eng`, `fra`, ...).
    pub languages: BTreeSet<String>,
}

impl Default for Extractor {
    fn default() -> Self {
        Self {
            pdf: PdfExtractor::PdfMiner,
            ocr: OcrExtractor::Tesseract,
            languages: BTreeSet::from(["eng".to_string()]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PdfExtractor {
    PdfMiner,
    PdfJs,
    Unknown(String),
}

impl PdfExtractor {
    pub fn name(&self) -> &str {
        match self {
            PdfExtractor::PdfMiner => "pdfminer",
            PdfExtractor::PdfJs => "pdfjs",
            PdfExtractor::Unknown(name) => name,
        }
    }

    /// Never fails: unrecognised names become [`PdfExtractor::Unknown`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "pdfminer" => PdfExtractor::PdfMiner,
            "pdfjs" => PdfExtractor::PdfJs,
            other => PdfExtractor::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for PdfExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OcrExtractor {
    Tesseract,
    Unknown(String),
}

impl OcrExtractor {
    pub fn name(&self) -> &str {
        match self {
            OcrExtractor::Tesseract => "tesseract",
            OcrExtractor::Unknown(name) => name,
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "tesseract" => OcrExtractor::Tesseract,
            other => OcrExtractor::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for OcrExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for name in ["pdfminer", "pdfjs", "abbyy"] {
            assert_eq!(PdfExtractor::from_name(name).name(), name);
        }
        assert_eq!(
            PdfExtractor::from_name("abbyy"),
            PdfExtractor::Unknown("abbyy".into())
        );
        assert_eq!(OcrExtractor::from_name("tesseract"), OcrExtractor::Tesseract);
        assert_eq!(
            OcrExtractor::from_name("google-vision"),
            OcrExtractor::Unknown("google-vision".into())
        );
    }

    #[test]
    fn default_is_pdfminer_tesseract_english() {
        let e = Extractor::default();
        assert_eq!(e.pdf, PdfExtractor::PdfMiner);
        assert_eq!(e.ocr, OcrExtractor::Tesseract);
        assert!(e.languages.contains("eng"));
    }
}
