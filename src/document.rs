//! Streaming traversal of a parsed document.
//!
//! A Parsr JSON result can run to hundreds of pages, so [`Document`] never
//! builds the whole tree. The source is read incrementally with
//! `serde_json::Deserializer`; each metadata entry, page and font is decoded
//! on its own, handed to the [`DocumentVisitor`] and dropped before the next
//! one is read. Top-level keys other than `metadata`, `pages` and `fonts` are
//! skipped without being buffered.

use crate::codec::page::{decode_font_at, decode_metadata_at, decode_page_at};
use crate::codec::index;
use crate::error::ParsrError;
use crate::visitor::DocumentVisitor;
use serde::de::{self, DeserializeSeed, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde_json::Value;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A parsed document that can be traversed any number of times.
#[derive(Debug, Clone)]
pub struct Document {
    source: Source,
}

#[derive(Debug, Clone)]
enum Source {
    File(PathBuf),
    Bytes(Vec<u8>),
}

impl Document {
    /// A document stored as JSON on disk. The file is opened on every
    /// [`accept`](Self::accept) and closed before it returns.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self {
            source: Source::File(path.as_ref().to_path_buf()),
        }
    }

    /// A document already held in memory.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            source: Source::Bytes(bytes.into()),
        }
    }

    /// Stream the document through `visitor`.
    ///
    /// Stops at the first malformed entry; entries before it have already
    /// been visited.
    pub fn accept<V>(&self, visitor: &mut V) -> Result<(), ParsrError>
    where
        V: DocumentVisitor + ?Sized,
    {
        match &self.source {
            Source::File(path) => {
                let file = File::open(path).map_err(|source| ParsrError::Io {
                    path: path.clone(),
                    source,
                })?;
                read_document(BufReader::new(file), visitor)
            }
            Source::Bytes(bytes) => read_document(bytes.as_slice(), visitor),
        }
    }
}

/// Stream a document from any reader. The reader is consumed and dropped
/// on every exit path.
pub fn read_document<R, V>(reader: R, visitor: &mut V) -> Result<(), ParsrError>
where
    R: Read,
    V: DocumentVisitor + ?Sized,
{
    let mut de = serde_json::Deserializer::from_reader(reader);
    let mut failure = None;
    let outcome = RootSeed {
        visitor,
        failure: &mut failure,
    }
    .deserialize(&mut de);

    match outcome {
        Ok(()) => {
            de.end()?;
            Ok(())
        }
        // A decode error stashed by a section takes precedence over the
        // generic serde error used to unwind the parser.
        Err(e) => Err(failure.unwrap_or(ParsrError::Json(e))),
    }
}

#[derive(Clone, Copy)]
enum Section {
    Metadata,
    Pages,
    Fonts,
}

impl Section {
    fn key(self) -> &'static str {
        match self {
            Section::Metadata => "metadata",
            Section::Pages => "pages",
            Section::Fonts => "fonts",
        }
    }
}

struct RootSeed<'a, V: ?Sized> {
    visitor: &'a mut V,
    failure: &'a mut Option<ParsrError>,
}

impl<'de, V: DocumentVisitor + ?Sized> DeserializeSeed<'de> for RootSeed<'_, V> {
    type Value = ();

    fn deserialize<D: de::Deserializer<'de>>(self, deserializer: D) -> Result<(), D::Error> {
        deserializer.deserialize_map(self)
    }
}

impl<'de, V: DocumentVisitor + ?Sized> Visitor<'de> for RootSeed<'_, V> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a Parsr document object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<(), A::Error> {
        while let Some(key) = map.next_key::<String>()? {
            let section = match key.as_str() {
                "metadata" => Section::Metadata,
                "pages" => Section::Pages,
                "fonts" => Section::Fonts,
                _ => {
                    debug!(key = %key, "Skipping document field");
                    map.next_value::<IgnoredAny>()?;
                    continue;
                }
            };
            map.next_value_seed(SectionSeed {
                section,
                visitor: &mut *self.visitor,
                failure: &mut *self.failure,
            })?;
        }
        Ok(())
    }
}

struct SectionSeed<'a, V: ?Sized> {
    section: Section,
    visitor: &'a mut V,
    failure: &'a mut Option<ParsrError>,
}

impl<'de, V: DocumentVisitor + ?Sized> DeserializeSeed<'de> for SectionSeed<'_, V> {
    type Value = ();

    fn deserialize<D: de::Deserializer<'de>>(self, deserializer: D) -> Result<(), D::Error> {
        deserializer.deserialize_seq(self)
    }
}

impl<'de, V: DocumentVisitor + ?Sized> Visitor<'de> for SectionSeed<'_, V> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "an array under '{}'", self.section.key())
    }

    fn visit_seq<A: SeqAccess<'de>>(mut self, mut seq: A) -> Result<(), A::Error> {
        let mut position = 0usize;
        while let Some(entry) = seq.next_element::<Value>()? {
            let path = index(self.section.key(), position);
            position += 1;
            if let Err(e) = self.visit_entry(&entry, &path) {
                let message = e.to_string();
                *self.failure = Some(e);
                return Err(de::Error::custom(message));
            }
        }
        debug!(section = self.section.key(), entries = position, "Document section read");
        Ok(())
    }
}

impl<V: DocumentVisitor + ?Sized> SectionSeed<'_, V> {
    fn visit_entry(&mut self, entry: &Value, path: &str) -> Result<(), ParsrError> {
        match self.section {
            Section::Metadata => {
                let meta = decode_metadata_at(entry, path)?;
                self.visitor.visit_meta(&meta);
            }
            Section::Pages => {
                let page = decode_page_at(entry, path)?;
                self.visitor.visit_page(&page);
                page.accept(&mut *self.visitor);
            }
            Section::Fonts => {
                let font = decode_font_at(entry, path)?;
                self.visitor.visit_font(&font);
            }
        }
        Ok(())
    }
}
