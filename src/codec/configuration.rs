//! Configuration wire form.
//!
//! ```json
//! {
//!   "version": 0.9,
//!   "extractor": {"pdf": "pdfminer", "ocr": "tesseract", "language": ["eng"]},
//!   "cleaner": ["out-of-page-removal", ["whitespace-removal", {"minWidth": 0}]],
//!   "output": {
//!     "granularity": "word",
//!     "includeMarginals": false,
//!     "includeDrawings": false,
//!     "formats": {"json": true, "text": false, "csv": false,
//!                 "markdown": false, "pdf": false, "simpleJson": false}
//!   }
//! }
//! ```

use crate::codec::cleaner::{decode_cleaner_at, encode_cleaner};
use crate::codec;
use crate::error::ParsrError;
use crate::model::cleaner::CleanerSet;
use crate::model::configuration::{parse_version, Configuration};
use crate::model::extractor::{Extractor, OcrExtractor, PdfExtractor};
use crate::model::output::{Format, Granularity, Output};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Map, Number, Value};
use std::collections::BTreeSet;
use tracing::debug;

/// Encode a configuration.
///
/// Fails only when `version` is not a finite number.
pub fn encode_configuration(config: &Configuration) -> Result<Value, ParsrError> {
    let version = parse_version(&config.version)?;
    let version = Number::from_f64(version).ok_or_else(|| {
        ParsrError::InvalidConfig(format!("version '{}' is not representable", config.version))
    })?;

    let cleaners: Vec<Value> = config.cleaners.iter().map(encode_cleaner).collect();

    let mut formats = Map::new();
    for format in Format::ALL {
        formats.insert(
            format.name().to_string(),
            Value::Bool(config.output.is_enabled(format)),
        );
    }

    Ok(json!({
        "version": Value::Number(version),
        "extractor": {
            "pdf": config.extractor.pdf.name(),
            "ocr": config.extractor.ocr.name(),
            "language": config.extractor.languages,
        },
        "cleaner": cleaners,
        "output": {
            "granularity": config.output.granularity.as_str(),
            "includeMarginals": config.output.include_marginals,
            "includeDrawings": config.output.include_drawings,
            "formats": Value::Object(formats),
        },
    }))
}

/// Decode a configuration. Stops at the first malformed field.
pub fn decode_configuration(value: &Value) -> Result<Configuration, ParsrError> {
    let root = codec::as_object(value, "configuration")?;

    let version = decode_version(codec::required(root, "", "version")?)?;
    let extractor = decode_extractor(codec::required(root, "", "extractor")?)?;
    let cleaners = codec::map_array(
        codec::required(root, "", "cleaner")?,
        "cleaner",
        decode_cleaner_at,
    )?
    .into_iter()
    .collect::<CleanerSet>();
    let output = decode_output(codec::required(root, "", "output")?)?;

    Ok(Configuration {
        version,
        extractor,
        cleaners,
        output,
    })
}

/// The number's shortest textual form, so `0.90` reads back as `"0.9"`.
fn decode_version(value: &Value) -> Result<String, ParsrError> {
    match value {
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) => {
            parse_version(s)?;
            serde_json::from_str::<serde_json::Number>(s.trim())
                .map(|n| n.to_string())
                .map_err(|_| ParsrError::invalid("version", "a number"))
        }
        _ => Err(ParsrError::invalid("version", "a number")),
    }
}

fn decode_extractor(value: &Value) -> Result<Extractor, ParsrError> {
    const PATH: &str = "extractor";
    let obj = codec::as_object(value, PATH)?;

    let pdf = codec::to_str(codec::required(obj, PATH, "pdf")?, "extractor.pdf")?;
    let ocr = codec::to_str(codec::required(obj, PATH, "ocr")?, "extractor.ocr")?;
    let languages = codec::map_array(
        codec::required(obj, PATH, "language")?,
        "extractor.language",
        |v, p| codec::to_str(v, p).map(str::to_string),
    )?
    .into_iter()
    .collect::<BTreeSet<String>>();

    Ok(Extractor {
        pdf: PdfExtractor::from_name(pdf),
        ocr: OcrExtractor::from_name(ocr),
        languages,
    })
}

fn decode_output(value: &Value) -> Result<Output, ParsrError> {
    const PATH: &str = "output";
    let obj = codec::as_object(value, PATH)?;

    let raw = codec::to_str(
        codec::required(obj, PATH, "granularity")?,
        "output.granularity",
    )?;
    let granularity = Granularity::from_name(raw)
        .ok_or_else(|| ParsrError::unsupported("output.granularity", raw))?;

    let include_marginals = codec::to_bool(
        codec::required(obj, PATH, "includeMarginals")?,
        "output.includeMarginals",
    )?;
    let include_drawings = match codec::optional(obj, "includeDrawings") {
        Some(v) => codec::to_bool(v, "output.includeDrawings")?,
        None => false,
    };

    const FORMATS: &str = "output.formats";
    let flags = codec::as_object(codec::required(obj, PATH, "formats")?, FORMATS)?;
    let mut formats = BTreeSet::new();
    for format in Format::ALL {
        let flag = codec::required(flags, FORMATS, format.name())?;
        if codec::to_bool(flag, &codec::join(FORMATS, format.name()))? {
            formats.insert(format);
        }
    }
    for key in flags.keys().filter(|k| Format::from_name(k).is_none()) {
        debug!(format = %key, "Ignoring unknown output format");
    }

    Ok(Output {
        granularity,
        include_marginals,
        include_drawings,
        formats,
    })
}

impl Configuration {
    /// Decode a configuration from JSON bytes.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ParsrError> {
        let value: Value = serde_json::from_slice(bytes)?;
        decode_configuration(&value)
    }

    /// Encode to compact JSON, as submitted to the server.
    pub fn to_json(&self) -> Result<String, ParsrError> {
        Ok(serde_json::to_string(&encode_configuration(self)?)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, ParsrError> {
        Ok(serde_json::to_string_pretty(&encode_configuration(self)?)?)
    }
}

impl Serialize for Configuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        encode_configuration(self)
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Configuration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        decode_configuration(&value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::cleaner::{Cleaner, WhitespaceRemoval};

    fn minimal() -> Value {
        json!({
            "version": 0.9,
            "extractor": {"pdf": "pdfminer", "ocr": "tesseract", "language": ["eng", "fra"]},
            "cleaner": [
                "out-of-page-removal",
                ["whitespace-removal", {"minWidth": 2}],
                "totally-new-module"
            ],
            "output": {
                "granularity": "word",
                "includeMarginals": false,
                "formats": {
                    "json": true, "text": true, "csv": false,
                    "markdown": false, "pdf": false, "simpleJson": false
                }
            }
        })
    }

    #[test]
    fn decodes_a_minimal_configuration() {
        let config = decode_configuration(&minimal()).unwrap();
        assert_eq!(config.version, "0.9");
        assert_eq!(config.extractor.pdf, PdfExtractor::PdfMiner);
        assert_eq!(config.extractor.languages.len(), 2);
        assert_eq!(config.cleaners.len(), 3);
        assert_eq!(
            config.cleaners.get("whitespace-removal"),
            Some(&Cleaner::WhitespaceRemoval(WhitespaceRemoval { min_width: 2 }))
        );
        assert!(config.cleaners.contains_tag("totally-new-module"));
        assert!(!config.output.include_drawings);
        assert_eq!(
            config.output.formats,
            BTreeSet::from([Format::Json, Format::Text])
        );
    }

    #[test]
    fn missing_format_flag_is_an_error() {
        let mut raw = minimal();
        raw["output"]["formats"]
            .as_object_mut()
            .unwrap()
            .remove("pdf");
        let err = decode_configuration(&raw).unwrap_err();
        match err {
            ParsrError::MissingField { field } => assert_eq!(field, "output.formats.pdf"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_granularity_is_unsupported() {
        let mut raw = minimal();
        raw["output"]["granularity"] = json!("sentence");
        let err = decode_configuration(&raw).unwrap_err();
        assert!(matches!(err, ParsrError::UnsupportedValue { .. }), "got: {err}");
    }

    #[test]
    fn version_reads_back_in_shortest_form() {
        let raw: Value = serde_json::from_str(
            &minimal().to_string().replace("\"version\":0.9", "\"version\":0.90"),
        )
        .unwrap();
        assert_eq!(decode_configuration(&raw).unwrap().version, "0.9");
    }

    #[test]
    fn string_version_normalises_like_a_number() {
        for (wire, expected) in [("0.90", "0.9"), (" 0.9 ", "0.9"), ("1", "1")] {
            let mut raw = minimal();
            raw["version"] = json!(wire);
            assert_eq!(decode_configuration(&raw).unwrap().version, expected, "{wire:?}");
        }

        let mut raw = minimal();
        raw["version"] = json!("latest");
        assert!(decode_configuration(&raw).is_err());
    }

    #[test]
    fn encode_emits_every_format_flag() {
        let encoded = encode_configuration(&Configuration::default()).unwrap();
        let formats = encoded["output"]["formats"].as_object().unwrap();
        assert_eq!(formats.len(), Format::ALL.len());
        assert_eq!(formats["json"], json!(true));
        assert_eq!(formats["simpleJson"], json!(false));
        assert_eq!(encoded["version"], json!(0.9));
    }

    #[test]
    fn default_configuration_round_trips() {
        let config = Configuration::default();
        let decoded = decode_configuration(&encode_configuration(&config).unwrap()).unwrap();
        assert_eq!(decoded, config);
    }

    #[test]
    fn serde_impls_delegate_to_the_codec() {
        let config: Configuration = serde_json::from_value(minimal()).unwrap();
        let back = serde_json::to_value(&config).unwrap();
        assert_eq!(back["cleaner"][1], json!(["whitespace-removal", {"minWidth": 2}]));
        assert_eq!(back["output"]["includeDrawings"], json!(false));
    }

    #[test]
    fn bad_version_fails_to_encode() {
        let mut config = Configuration::default();
        config.version = "latest".into();
        assert!(encode_configuration(&config).is_err());
    }
}
