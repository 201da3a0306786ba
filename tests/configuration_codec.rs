//! Configuration codec tests against a full pipeline fixture.
//!
//! `fixtures/config.json` is a configuration as a current server writes it:
//! every cleaner the server ships, three regex queries and all formats but
//! `pdf` enabled.

use docparsr::codec::{decode_configuration, encode_configuration};
use docparsr::{
    Cleaner, Configuration, Flavor, Format, Granularity, HeaderFooterDetection, ImageDetection,
    LinesToParagraph, OcrExtractor, ParsrError, PdfExtractor, ReadingOrderDetection,
    RedundancyDetection, RegexMatcher, RegexQuery, TableDetection, TableDetectionOption,
    TableOfContentsDetection, WhitespaceRemoval,
};
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::path::PathBuf;

fn fixture(name: &str) -> Vec<u8> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    std::fs::read(&path).unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
}

fn fixture_value() -> Value {
    serde_json::from_slice(&fixture("config.json")).unwrap()
}

fn golden() -> Configuration {
    Configuration::builder()
        .version("0.9")
        .pdf_extractor(PdfExtractor::PdfMiner)
        .ocr_extractor(OcrExtractor::Tesseract)
        .languages(["eng", "fra"])
        .cleaners([
            Cleaner::DrawingDetection,
            Cleaner::ImageDetection(ImageDetection { ocr_images: false }),
            Cleaner::OutOfPageRemoval,
            Cleaner::WhitespaceRemoval(WhitespaceRemoval { min_width: 0 }),
            Cleaner::RedundancyDetection(RedundancyDetection { min_overlap: 0.5 }),
            Cleaner::TableDetection(TableDetection {
                check_drawings: true,
                run_config: vec![TableDetectionOption {
                    pages: BTreeSet::new(),
                    flavor: Flavor::Lattice,
                }],
            }),
            Cleaner::HeaderFooterDetection(HeaderFooterDetection {
                ignore_pages: BTreeSet::new(),
                max_margin_percentage: 8,
            }),
            Cleaner::LinkDetection,
            Cleaner::WordsToLineNew,
            Cleaner::ReadingOrderDetection(ReadingOrderDetection {
                min_vertical_gap_width: 5,
                min_column_width_in_page_percent: 15.0,
            }),
            Cleaner::LinesToParagraph(LinesToParagraph { tolerance: 0.25 }),
            Cleaner::TableOfContentsDetection(TableOfContentsDetection {
                page_keywords: ["pagina", "page", "pag"].map(String::from).into(),
            }),
            Cleaner::MlHeadingDetection,
            Cleaner::ListDetection,
            Cleaner::PageNumberDetection,
            Cleaner::HierarchyDetection,
            Cleaner::RegexMatcher(RegexMatcher {
                is_case_sensitive: true,
                is_global: true,
                queries: [
                    RegexQuery::new("Car", r"([A-Z]{2}\-[\d]{3}\-[A-Z]{2})"),
                    RegexQuery::new("Age", r"(\d+)[ -]*(ans|jarige)"),
                    RegexQuery::new(
                        "Percent",
                        r"([\-]?(\d)+[\.\,]*(\d)*)[ ]*(%|per|percent|pourcent|procent)",
                    ),
                ]
                .into(),
            }),
        ])
        .granularity(Granularity::Word)
        .include_marginals(false)
        .include_drawings(false)
        .formats([
            Format::Json,
            Format::Text,
            Format::Csv,
            Format::SimpleJson,
            Format::Markdown,
        ])
        .build()
        .unwrap()
}

#[test]
fn fixture_decodes_to_the_full_pipeline() {
    let decoded = Configuration::from_json(&fixture("config.json")).unwrap();
    assert_eq!(decoded.cleaners.len(), 17);
    assert_eq!(decoded, golden());
}

#[test]
fn encoding_is_stable_across_a_decode() {
    let config = golden();
    let once = encode_configuration(&config).unwrap();
    let twice = encode_configuration(&decode_configuration(&once).unwrap()).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn encoded_form_matches_the_wire_layout() {
    let encoded = encode_configuration(&golden()).unwrap();

    assert_eq!(encoded["version"], json!(0.9));
    assert_eq!(encoded["extractor"]["pdf"], "pdfminer");
    assert_eq!(encoded["extractor"]["language"], json!(["eng", "fra"]));
    assert_eq!(encoded["output"]["formats"]["pdf"], json!(false));
    assert_eq!(encoded["output"]["formats"]["simpleJson"], json!(true));

    let cleaners = encoded["cleaner"].as_array().unwrap();
    assert_eq!(cleaners[0], json!("drawing-detection"));
    assert_eq!(
        cleaners[5],
        json!(["table-detection", {
            "checkDrawings": true,
            "runConfig": [{"pages": [], "flavor": "lattice"}]
        }])
    );
    assert_eq!(cleaners.len(), fixture_value()["cleaner"].as_array().unwrap().len());
}

#[test]
fn serde_impls_delegate_to_the_codec() {
    let config = golden();
    let text = serde_json::to_string(&config).unwrap();
    let back: Configuration = serde_json::from_str(&text).unwrap();
    assert_eq!(back, config);
}

#[test]
fn missing_format_flag_names_its_path() {
    let mut raw = fixture_value();
    raw["output"]["formats"]
        .as_object_mut()
        .unwrap()
        .remove("pdf");

    match decode_configuration(&raw).unwrap_err() {
        ParsrError::MissingField { field } => assert_eq!(field, "output.formats.pdf"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_granularity_is_malformed() {
    let mut raw = fixture_value();
    raw["output"].as_object_mut().unwrap().remove("granularity");

    let err = decode_configuration(&raw).unwrap_err();
    assert!(err.is_malformed_input());
    assert!(err.to_string().contains("output.granularity"), "got: {err}");
}

#[test]
fn unknown_cleaners_survive_a_round_trip() {
    let mut raw = fixture_value();
    raw["cleaner"]
        .as_array_mut()
        .unwrap()
        .push(json!(["sentiment-detection", {"model": "small"}]));

    let config = decode_configuration(&raw).unwrap();
    assert_eq!(
        config.cleaners.get("sentiment-detection"),
        Some(&Cleaner::Unknown("sentiment-detection".into()))
    );

    let encoded = encode_configuration(&config).unwrap();
    let last = encoded["cleaner"].as_array().unwrap().last().cloned();
    assert_eq!(last, Some(json!("sentiment-detection")));
}

#[test]
fn unknown_cleaner_options_of_any_shape_are_dropped() {
    for options in [json!([1, 2]), json!("fast"), json!(3), json!(true)] {
        let mut raw = fixture_value();
        raw["cleaner"]
            .as_array_mut()
            .unwrap()
            .push(json!(["totally-new-module", options.clone()]));

        let config = decode_configuration(&raw)
            .unwrap_or_else(|e| panic!("options {options} were rejected: {e}"));
        assert_eq!(
            config.cleaners.get("totally-new-module"),
            Some(&Cleaner::Unknown("totally-new-module".into()))
        );
    }
}

#[test]
fn marker_cleaner_ignores_whatever_follows_its_tag() {
    let mut raw = fixture_value();
    let cleaners = raw["cleaner"].as_array_mut().unwrap();
    let link = cleaners
        .iter()
        .position(|c| *c == "link-detection")
        .unwrap();
    cleaners[link] = json!(["link-detection", true]);

    let config = decode_configuration(&raw).unwrap();
    assert_eq!(config, golden());
    let encoded = encode_configuration(&config).unwrap();
    assert_eq!(encoded["cleaner"][link], json!("link-detection"));
}

#[test]
fn parameterised_cleaner_still_requires_an_options_object() {
    let mut raw = fixture_value();
    raw["cleaner"][3] = json!(["whitespace-removal", [0]]);

    let err = decode_configuration(&raw).unwrap_err();
    assert!(err.is_malformed_input());
    assert!(err.to_string().contains("cleaner[3][1]"), "got: {err}");
}

#[test]
fn unknown_extractor_names_are_kept() {
    let mut raw = fixture_value();
    raw["extractor"]["pdf"] = json!("pdfplumber");

    let config = decode_configuration(&raw).unwrap();
    assert_eq!(config.extractor.pdf, PdfExtractor::Unknown("pdfplumber".into()));
    let encoded = encode_configuration(&config).unwrap();
    assert_eq!(encoded["extractor"]["pdf"], "pdfplumber");
}

#[test]
fn duplicate_cleaner_tags_keep_the_last_entry() {
    let mut raw = fixture_value();
    raw["cleaner"]
        .as_array_mut()
        .unwrap()
        .push(json!(["whitespace-removal", {"minWidth": 4}]));

    let config = decode_configuration(&raw).unwrap();
    assert_eq!(config.cleaners.len(), 17);
    assert_eq!(
        config.cleaners.get("whitespace-removal"),
        Some(&Cleaner::WhitespaceRemoval(WhitespaceRemoval { min_width: 4 }))
    );
}
