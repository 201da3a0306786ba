//! Font table entries referenced by words.

use crate::model::ids::FontId;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

static HEX_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9A-Fa-f]{6}$").unwrap());

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Font {
    pub id: FontId,
    pub name: String,
    pub size: f64,
    pub weight: FontWeight,
    pub is_italic: bool,
    pub is_underline: bool,
    pub color: FontColor,
    pub size_unit: String,
}

/// Font weight as reported by the extractor (`bold`, `medium`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FontWeight(pub String);

impl FontWeight {
    pub fn is_bold(&self) -> bool {
        self.0.eq_ignore_ascii_case("bold")
    }
}

/// A hex colour code such as `#000000`.
///
/// Leading `#` characters are ignored for validation; the remaining code
/// must be exactly six hex digits. The original text is kept.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FontColor(String);

impl FontColor {
    pub fn from_hex(hex: impl Into<String>) -> Result<Self, String> {
        let hex = hex.into();
        let code = hex.trim_start_matches('#');
        if !HEX_COLOR.is_match(code) {
            return Err(format!(
                "expecting a hex code of length 6, but got '{code}'"
            ));
        }
        Ok(FontColor(hex))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The colour as `(r, g, b)`.
    pub fn rgb(&self) -> (u8, u8, u8) {
        let code = self.0.trim_start_matches('#');
        let channel = |i: usize| u8::from_str_radix(&code[i..i + 2], 16).unwrap_or(0);
        (channel(0), channel(2), channel(4))
    }
}

impl TryFrom<String> for FontColor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        FontColor::from_hex(value)
    }
}

impl From<FontColor> for String {
    fn from(value: FontColor) -> Self {
        value.0
    }
}

impl fmt::Display for FontColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn font_from_wire() {
        let font: Font = serde_json::from_str(
            r##"{"id":1,"name":"Arial","size":12.5,"weight":"bold","isItalic":false,
                "isUnderline":true,"color":"#FF8000","sizeUnit":"px","url":"ignored"}"##,
        )
        .unwrap();
        assert_eq!(font.id, FontId(1));
        assert!(font.weight.is_bold());
        assert!(font.is_underline);
        assert_eq!(font.color.rgb(), (255, 128, 0));
        assert_eq!(font.color.as_str(), "#FF8000");
    }

    #[test]
    fn color_requires_six_hex_digits() {
        assert!(FontColor::from_hex("#000000").is_ok());
        assert!(FontColor::from_hex("##abcdef").is_ok());
        assert!(FontColor::from_hex("abcdef").is_ok());
        assert!(FontColor::from_hex("#fff").is_err());
        assert!(FontColor::from_hex("#gggggg").is_err());
    }
}
