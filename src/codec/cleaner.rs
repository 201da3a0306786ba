//! Cleaner wire form.
//!
//! A cleaner is either a bare tag (`"link-detection"`) or a pair of tag and
//! options (`["whitespace-removal", {"minWidth": 0}]`). Marker cleaners are
//! always written bare; parameterised cleaners are always written as a pair
//! with every parameter present.

use crate::codec::{self, index, JsonObject};
use crate::error::ParsrError;
use crate::model::cleaner::{
    Cleaner, Flavor, HeaderFooterDetection, ImageDetection, KeyValueDetection, LinesToParagraph,
    NumberCorrection, ReadingOrderDetection, RedundancyDetection, RegexMatcher, RegexQuery,
    TableDetection, TableDetectionOption, TableOfContentsDetection, WhitespaceRemoval,
    WordsToLine,
};
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Encode one cleaner.
pub fn encode_cleaner(cleaner: &Cleaner) -> Value {
    let params = match cleaner {
        Cleaner::HeaderFooterDetection(p) => json!({
            "ignorePages": p.ignore_pages,
            "maxMarginPercentage": p.max_margin_percentage,
        }),
        Cleaner::ImageDetection(p) => json!({ "ocrImages": p.ocr_images }),
        Cleaner::KeyValueDetection(p) => json!({
            "threshold": p.threshold,
            "keyValueDividedChars": p.key_value_divided_chars,
            "keyPatterns": p.key_patterns,
        }),
        Cleaner::LinesToParagraph(p) => json!({ "tolerance": p.tolerance }),
        Cleaner::NumberCorrection(p) => json!({
            "fixSplitNumbers": p.fix_split_numbers,
            "maxConsecutiveSplits": p.max_consecutive_splits,
            "numberRegExp": p.number_reg_exp,
            "whitelist": p.whitelist,
        }),
        Cleaner::ReadingOrderDetection(p) => json!({
            "minVerticalGapWidth": p.min_vertical_gap_width,
            "minColumnWidthInPagePercent": p.min_column_width_in_page_percent,
        }),
        Cleaner::RedundancyDetection(p) => json!({ "minOverlap": p.min_overlap }),
        Cleaner::RegexMatcher(p) => {
            let queries: Vec<Value> = p
                .queries
                .iter()
                .map(|q| json!({ "label": q.label, "regex": q.regex }))
                .collect();
            json!({
                "isCaseSensitive": p.is_case_sensitive,
                "isGlobal": p.is_global,
                "queries": queries,
            })
        }
        Cleaner::TableDetection(p) => {
            let run_config: Vec<Value> = p
                .run_config
                .iter()
                .map(|o| json!({ "pages": o.pages, "flavor": o.flavor.as_str() }))
                .collect();
            json!({
                "checkDrawings": p.check_drawings,
                "runConfig": run_config,
            })
        }
        Cleaner::TableOfContentsDetection(p) => json!({ "pageKeywords": p.page_keywords }),
        Cleaner::WhitespaceRemoval(p) => json!({ "minWidth": p.min_width }),
        Cleaner::WordsToLine(p) => json!({
            "lineHeightUncertainty": p.line_height_uncertainty,
            "topUncertainty": p.top_uncertainty,
            "maximumSpaceBetweenWords": p.maximum_space_between_words,
            "mergeTableElements": p.merge_table_elements,
        }),
        Cleaner::DrawingDetection
        | Cleaner::HierarchyDetection
        | Cleaner::LinkDetection
        | Cleaner::ListDetection
        | Cleaner::MlHeadingDetection
        | Cleaner::OutOfPageRemoval
        | Cleaner::PageNumberDetection
        | Cleaner::SeparateWords
        | Cleaner::WordsToLineNew
        | Cleaner::Unknown(_) => return Value::String(cleaner.name().to_string()),
    };
    json!([cleaner.name(), params])
}

/// Decode one cleaner entry.
///
/// Unknown tags decode to [`Cleaner::Unknown`] and any options they carried
/// are dropped.
pub fn decode_cleaner(value: &Value) -> Result<Cleaner, ParsrError> {
    decode_cleaner_at(value, "cleaner")
}

pub(crate) fn decode_cleaner_at(value: &Value, path: &str) -> Result<Cleaner, ParsrError> {
    let (tag, slot) = match value {
        Value::String(tag) => (tag.as_str(), None),
        Value::Array(items) => {
            let head = items
                .first()
                .ok_or_else(|| ParsrError::missing(index(path, 0)))?;
            let tag = codec::to_str(head, &index(path, 0))?;
            (tag, items.get(1).filter(|v| !v.is_null()))
        }
        _ => {
            return Err(ParsrError::invalid(
                path,
                "a cleaner tag or a [tag, options] pair",
            ))
        }
    };

    let Some(defaults) = Cleaner::with_defaults(tag) else {
        if slot.is_some() {
            debug!(tag = %tag, "Dropping options of unknown cleaner");
        } else {
            debug!(tag = %tag, "Unknown cleaner");
        }
        return Ok(Cleaner::Unknown(tag.to_string()));
    };
    let Some(slot) = slot else {
        return Ok(defaults);
    };
    if !defaults.has_parameters() {
        debug!(tag = %tag, "Ignoring options of a cleaner that takes none");
        return Ok(defaults);
    }
    let options_path = index(path, 1);
    let p = Params::new(codec::as_object(slot, &options_path)?, options_path);

    let cleaner = match defaults {
        Cleaner::HeaderFooterDetection(d) => {
            Cleaner::HeaderFooterDetection(HeaderFooterDetection {
                ignore_pages: p.u32_set("ignorePages", d.ignore_pages)?,
                max_margin_percentage: p.u32("maxMarginPercentage", d.max_margin_percentage)?,
            })
        }
        Cleaner::ImageDetection(d) => Cleaner::ImageDetection(ImageDetection {
            ocr_images: p.bool("ocrImages", d.ocr_images)?,
        }),
        Cleaner::KeyValueDetection(d) => Cleaner::KeyValueDetection(KeyValueDetection {
            threshold: p.f64("threshold", d.threshold)?,
            key_value_divided_chars: p
                .string_set("keyValueDividedChars", d.key_value_divided_chars)?,
            key_patterns: p.key_patterns("keyPatterns", d.key_patterns)?,
        }),
        Cleaner::LinesToParagraph(d) => Cleaner::LinesToParagraph(LinesToParagraph {
            tolerance: p.f64("tolerance", d.tolerance)?,
        }),
        Cleaner::NumberCorrection(d) => Cleaner::NumberCorrection(NumberCorrection {
            fix_split_numbers: p.bool("fixSplitNumbers", d.fix_split_numbers)?,
            max_consecutive_splits: p.u32("maxConsecutiveSplits", d.max_consecutive_splits)?,
            number_reg_exp: p.string("numberRegExp", d.number_reg_exp)?,
            whitelist: p.string_set("whitelist", d.whitelist)?,
        }),
        Cleaner::ReadingOrderDetection(d) => {
            Cleaner::ReadingOrderDetection(ReadingOrderDetection {
                min_vertical_gap_width: p.u32("minVerticalGapWidth", d.min_vertical_gap_width)?,
                min_column_width_in_page_percent: p.f64(
                    "minColumnWidthInPagePercent",
                    d.min_column_width_in_page_percent,
                )?,
            })
        }
        Cleaner::RedundancyDetection(d) => Cleaner::RedundancyDetection(RedundancyDetection {
            min_overlap: p.f64("minOverlap", d.min_overlap)?,
        }),
        Cleaner::RegexMatcher(d) => Cleaner::RegexMatcher(RegexMatcher {
            is_case_sensitive: p.bool("isCaseSensitive", d.is_case_sensitive)?,
            is_global: p.bool("isGlobal", d.is_global)?,
            queries: p.queries("queries", d.queries)?,
        }),
        Cleaner::TableDetection(d) => Cleaner::TableDetection(TableDetection {
            check_drawings: p.bool("checkDrawings", d.check_drawings)?,
            run_config: p.run_config("runConfig", d.run_config)?,
        }),
        Cleaner::TableOfContentsDetection(d) => {
            Cleaner::TableOfContentsDetection(TableOfContentsDetection {
                page_keywords: p.string_set("pageKeywords", d.page_keywords)?,
            })
        }
        Cleaner::WhitespaceRemoval(d) => Cleaner::WhitespaceRemoval(WhitespaceRemoval {
            min_width: p.u32("minWidth", d.min_width)?,
        }),
        Cleaner::WordsToLine(d) => Cleaner::WordsToLine(WordsToLine {
            line_height_uncertainty: p
                .f64("lineHeightUncertainty", d.line_height_uncertainty)?,
            top_uncertainty: p.f64("topUncertainty", d.top_uncertainty)?,
            maximum_space_between_words: p
                .u32("maximumSpaceBetweenWords", d.maximum_space_between_words)?,
            merge_table_elements: p.bool("mergeTableElements", d.merge_table_elements)?,
        }),
        marker => marker,
    };
    Ok(cleaner)
}

/// Options object of a parameterised cleaner. Absent keys fall back to the
/// supplied default; present keys must have the right type.
struct Params<'a> {
    obj: &'a JsonObject,
    path: String,
}

impl<'a> Params<'a> {
    fn new(obj: &'a JsonObject, path: String) -> Self {
        Self { obj, path }
    }

    fn get(&self, key: &str) -> Option<(&'a Value, String)> {
        codec::optional(self.obj, key).map(|v| (v, codec::join(&self.path, key)))
    }

    fn bool(&self, key: &str, default: bool) -> Result<bool, ParsrError> {
        match self.get(key) {
            Some((v, path)) => codec::to_bool(v, &path),
            None => Ok(default),
        }
    }

    fn u32(&self, key: &str, default: u32) -> Result<u32, ParsrError> {
        match self.get(key) {
            Some((v, path)) => codec::to_u32(v, &path),
            None => Ok(default),
        }
    }

    fn f64(&self, key: &str, default: f64) -> Result<f64, ParsrError> {
        match self.get(key) {
            Some((v, path)) => codec::to_f64(v, &path),
            None => Ok(default),
        }
    }

    fn string(&self, key: &str, default: String) -> Result<String, ParsrError> {
        match self.get(key) {
            Some((v, path)) => codec::to_str(v, &path).map(str::to_string),
            None => Ok(default),
        }
    }

    fn u32_set(&self, key: &str, default: BTreeSet<u32>) -> Result<BTreeSet<u32>, ParsrError> {
        match self.get(key) {
            Some((v, path)) => u32_set(v, &path),
            None => Ok(default),
        }
    }

    fn string_set(
        &self,
        key: &str,
        default: BTreeSet<String>,
    ) -> Result<BTreeSet<String>, ParsrError> {
        match self.get(key) {
            Some((v, path)) => string_set(v, &path),
            None => Ok(default),
        }
    }

    fn key_patterns(
        &self,
        key: &str,
        default: BTreeMap<String, BTreeSet<String>>,
    ) -> Result<BTreeMap<String, BTreeSet<String>>, ParsrError> {
        let Some((v, path)) = self.get(key) else {
            return Ok(default);
        };
        codec::as_object(v, &path)?
            .iter()
            .map(|(name, patterns)| {
                Ok((name.clone(), string_set(patterns, &codec::join(&path, name))?))
            })
            .collect()
    }

    fn queries(
        &self,
        key: &str,
        default: BTreeSet<RegexQuery>,
    ) -> Result<BTreeSet<RegexQuery>, ParsrError> {
        let Some((v, path)) = self.get(key) else {
            return Ok(default);
        };
        let queries = codec::map_array(v, &path, |item, item_path| {
            let obj = codec::as_object(item, item_path)?;
            let label = codec::to_str(
                codec::required(obj, item_path, "label")?,
                &codec::join(item_path, "label"),
            )?;
            let regex = codec::to_str(
                codec::required(obj, item_path, "regex")?,
                &codec::join(item_path, "regex"),
            )?;
            Ok(RegexQuery::new(label, regex))
        })?;
        Ok(queries.into_iter().collect())
    }

    fn run_config(
        &self,
        key: &str,
        default: Vec<TableDetectionOption>,
    ) -> Result<Vec<TableDetectionOption>, ParsrError> {
        let Some((v, path)) = self.get(key) else {
            return Ok(default);
        };
        codec::map_array(v, &path, |item, item_path| {
            let obj = codec::as_object(item, item_path)?;
            let pages = match codec::optional(obj, "pages") {
                Some(pages) => u32_set(pages, &codec::join(item_path, "pages"))?,
                None => BTreeSet::new(),
            };
            let flavor = match codec::optional(obj, "flavor") {
                Some(raw) => {
                    let flavor_path = codec::join(item_path, "flavor");
                    let name = codec::to_str(raw, &flavor_path)?;
                    Flavor::parse(name)
                        .ok_or_else(|| ParsrError::unsupported(flavor_path, name))?
                }
                None => Flavor::default(),
            };
            Ok(TableDetectionOption { pages, flavor })
        })
    }
}

fn u32_set(value: &Value, path: &str) -> Result<BTreeSet<u32>, ParsrError> {
    Ok(codec::map_array(value, path, codec::to_u32)?
        .into_iter()
        .collect())
}

fn string_set(value: &Value, path: &str) -> Result<BTreeSet<String>, ParsrError> {
    Ok(codec::map_array(value, path, |v, p| {
        codec::to_str(v, p).map(str::to_string)
    })?
    .into_iter()
    .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_encode_bare() {
        assert_eq!(encode_cleaner(&Cleaner::LinkDetection), json!("link-detection"));
        assert_eq!(
            encode_cleaner(&Cleaner::Unknown("totally-new-module".into())),
            json!("totally-new-module")
        );
    }

    #[test]
    fn parameterised_cleaners_encode_every_option() {
        let encoded = encode_cleaner(&Cleaner::WordsToLine(WordsToLine::default()));
        assert_eq!(
            encoded,
            json!(["words-to-line", {
                "lineHeightUncertainty": 0.2,
                "topUncertainty": 0.4,
                "maximumSpaceBetweenWords": 100,
                "mergeTableElements": false,
            }])
        );
    }

    #[test]
    fn unknown_tag_decodes_to_unknown() {
        let bare = decode_cleaner(&json!("totally-new-module")).unwrap();
        assert_eq!(bare, Cleaner::Unknown("totally-new-module".into()));

        let with_options =
            decode_cleaner(&json!(["totally-new-module", {"strength": 11}])).unwrap();
        assert_eq!(with_options, Cleaner::Unknown("totally-new-module".into()));

        let with_list = decode_cleaner(&json!(["totally-new-module", [1, 2]])).unwrap();
        assert_eq!(with_list, Cleaner::Unknown("totally-new-module".into()));
    }

    #[test]
    fn marker_tag_ignores_a_non_object_slot() {
        let cleaner = decode_cleaner(&json!(["link-detection", true])).unwrap();
        assert_eq!(cleaner, Cleaner::LinkDetection);
    }

    #[test]
    fn unrecognised_option_of_known_cleaner_is_ignored() {
        let cleaner =
            decode_cleaner(&json!(["whitespace-removal", {"minWidth": 3, "aggressive": true}]))
                .unwrap();
        assert_eq!(
            cleaner,
            Cleaner::WhitespaceRemoval(WhitespaceRemoval { min_width: 3 })
        );
    }

    #[test]
    fn bare_parameterised_tag_takes_defaults() {
        let cleaner = decode_cleaner(&json!("number-correction")).unwrap();
        assert_eq!(
            cleaner,
            Cleaner::NumberCorrection(NumberCorrection::default())
        );
    }

    #[test]
    fn absent_option_takes_default() {
        let cleaner =
            decode_cleaner(&json!(["header-footer-detection", {"ignorePages": [1, 2]}])).unwrap();
        assert_eq!(
            cleaner,
            Cleaner::HeaderFooterDetection(HeaderFooterDetection {
                ignore_pages: BTreeSet::from([1, 2]),
                max_margin_percentage: 15,
            })
        );
    }

    #[test]
    fn mistyped_option_is_rejected() {
        let err = decode_cleaner(&json!(["whitespace-removal", {"minWidth": "wide"}]))
            .unwrap_err();
        match err {
            ParsrError::InvalidField { field, .. } => assert_eq!(field, "cleaner[1].minWidth"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn flavor_is_read_case_insensitively() {
        for raw in ["STREAM", "stream"] {
            let cleaner = decode_cleaner(&json!(["table-detection", {
                "runConfig": [{"pages": [3], "flavor": raw}]
            }]))
            .unwrap();
            let Cleaner::TableDetection(table) = cleaner else {
                panic!("expected table-detection");
            };
            assert_eq!(table.run_config[0].flavor, Flavor::Stream);
            assert!(table.check_drawings);
        }
    }

    #[test]
    fn unrecognised_flavor_is_unsupported() {
        let err = decode_cleaner(&json!(["table-detection", {
            "runConfig": [{"flavor": "grid"}]
        }]))
        .unwrap_err();
        assert!(
            matches!(err, ParsrError::UnsupportedValue { ref value, .. } if value == "grid"),
            "got: {err}"
        );
    }

    #[test]
    fn non_string_non_array_entry_is_malformed() {
        let err = decode_cleaner(&json!(42)).unwrap_err();
        assert!(err.is_malformed_input());
        let err = decode_cleaner(&json!([])).unwrap_err();
        assert!(err.is_malformed_input());
    }

    #[test]
    fn every_known_cleaner_survives_encode_decode() {
        for tag in Cleaner::KNOWN_TAGS {
            let cleaner = Cleaner::with_defaults(tag).unwrap();
            assert_eq!(decode_cleaner(&encode_cleaner(&cleaner)).unwrap(), cleaner);
        }
    }

    #[test]
    fn key_value_detection_keeps_patterns() {
        let raw = json!(["key-value-detection", {
            "threshold": 0.3,
            "keyValueDividedChars": [":", "="],
            "keyPatterns": {"date": ["Date", "Fecha"]}
        }]);
        let Cleaner::KeyValueDetection(kv) = decode_cleaner(&raw).unwrap() else {
            panic!("expected key-value-detection");
        };
        assert_eq!(kv.threshold, 0.3);
        assert_eq!(kv.key_value_divided_chars.len(), 2);
        assert!(kv.key_patterns["date"].contains("Fecha"));
        assert_eq!(
            encode_cleaner(&Cleaner::KeyValueDetection(kv))[1]["keyPatterns"],
            json!({"date": ["Date", "Fecha"]})
        );
    }
}
