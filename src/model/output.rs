//! Output selection: granularity and the result formats the server renders.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// What the server should render once parsing finishes.
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    pub granularity: Granularity,
    /// Keep headers, footers and page numbers in rendered outputs.
    pub include_marginals: bool,
    /// Keep vector drawings in rendered outputs.
    pub include_drawings: bool,
    /// Enabled formats. Only these can be fetched from a finished job.
    pub formats: BTreeSet<Format>,
}

impl Default for Output {
    fn default() -> Self {
        Self {
            granularity: Granularity::Word,
            include_marginals: false,
            include_drawings: false,
            formats: BTreeSet::from([Format::Json]),
        }
    }
}

impl Output {
    pub fn is_enabled(&self, format: Format) -> bool {
        self.formats.contains(&format)
    }
}

/// Atomic unit at which positional boxes are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Granularity {
    #[default]
    Word,
    Character,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Word => "word",
            Granularity::Character => "character",
        }
    }

    /// Exact, case-sensitive lookup.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "word" => Some(Granularity::Word),
            "character" => Some(Granularity::Character),
            _ => None,
        }
    }
}

/// A result format the server can render.
///
/// The name doubles as the wire key under `output.formats` and as the path
/// segment used to retrieve the rendered result.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Format {
    #[serde(rename = "json")]
    Json,
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "csv")]
    Csv,
    #[serde(rename = "markdown")]
    Markdown,
    #[serde(rename = "pdf")]
    Pdf,
    #[serde(rename = "simpleJson")]
    SimpleJson,
}

impl Format {
    pub const ALL: [Format; 6] = [
        Format::Json,
        Format::Text,
        Format::Csv,
        Format::Markdown,
        Format::Pdf,
        Format::SimpleJson,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Text => "text",
            Format::Csv => "csv",
            Format::Markdown => "markdown",
            Format::Pdf => "pdf",
            Format::SimpleJson => "simpleJson",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Format::ALL.into_iter().find(|f| f.name() == name)
    }

    /// File extension used when saving a rendered result.
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Json | Format::SimpleJson => "json",
            Format::Text => "txt",
            Format::Csv => "csv",
            Format::Markdown => "md",
            Format::Pdf => "pdf",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
