//! Error types for the docparsr library.
//!
//! Every fallible operation returns [`ParsrError`]. The variants are grouped
//! into four families so callers can branch on *why* something failed rather
//! than on the exact variant:
//!
//! * **Malformed input** ([`ParsrError::is_malformed_input`]): the server (or
//!   a file on disk) produced JSON that does not match the wire format, e.g. a
//!   missing `granularity`, a missing flag under `formats`, or an element with
//!   an unrecognised `type`. Decoding stops at the first such error and no
//!   partial value is returned.
//!
//! * **Caller misuse** ([`ParsrError::is_caller_misuse`]): the request itself
//!   was wrong, e.g. asking a [`crate::ParsingResult`] for a format that was
//!   never enabled in the job's configuration.
//!
//! * **Transport** ([`ParsrError::is_transport`]): the server could not be
//!   reached or answered with an unexpected status.
//!
//! * **Internal**: a broken invariant inside this crate.
//!
//! Unknown cleaner tags and unknown extractor names are *not* errors; they are
//! captured as `Unknown(name)` variants so newer servers keep working.

use crate::model::Format;
use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the docparsr library.
#[derive(Debug, Error)]
pub enum ParsrError {
    // ── Malformed input ───────────────────────────────────────────────────
    /// A required field is absent. `field` is a dotted path such as
    /// `output.formats.pdf`.
    #[error("Missing required field '{field}'")]
    MissingField { field: String },

    /// A field is present but holds the wrong JSON type.
    #[error("Field '{field}' has an unexpected type (expected {expected})")]
    InvalidField {
        field: String,
        expected: &'static str,
    },

    /// A field holds a value outside its closed set, e.g. a granularity other
    /// than `word` or `character`.
    #[error("Unsupported value '{value}' for field '{field}'")]
    UnsupportedValue { field: String, value: String },

    /// An element's `type` discriminator is not one of the known element types.
    #[error("Unknown element type: '{value}'")]
    UnknownElementType { value: String },

    /// An entry decoded through serde did not have the expected shape.
    /// `path` locates it, e.g. `fonts[2]`.
    #[error("Malformed entry at '{path}': {source}")]
    InvalidEntry {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// The input is not well-formed JSON, or does not have the expected shape.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    // ── Caller misuse ─────────────────────────────────────────────────────
    /// A result was requested in a format the job configuration never enabled.
    #[error("The format '{format}' is not enabled in the job configuration")]
    FormatNotEnabled { format: Format },

    /// Builder or configuration validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A parsing job was started twice.
    #[error("Parsing job has already been started")]
    JobAlreadyStarted,

    // ── Server / transport ────────────────────────────────────────────────
    /// The request could not be sent or the response could not be read.
    #[error("HTTP request to '{url}' failed: {reason}")]
    Transport { url: String, reason: String },

    /// The request exceeded the configured timeout.
    #[error("HTTP request to '{url}' timed out after {secs}s")]
    Timeout { url: String, secs: u64 },

    /// The server answered with a status the operation does not accept.
    #[error("{operation}: the server returned HTTP {status}")]
    UnexpectedStatus { operation: String, status: u16 },

    /// The server refused the submitted document.
    #[error("The server rejected the file (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },

    /// Polling the queue returned a status other than 200 or 201.
    #[error("The server returned HTTP {status} while polling for '{job_id}'")]
    PollFailed { job_id: String, status: u16 },

    /// The job did not finish within the configured number of polls.
    #[error("Job '{job_id}' did not complete after {polls} polls")]
    PollLimitExceeded { job_id: String, polls: u32 },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not read an input file.
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ParsrError {
    pub(crate) fn missing(field: impl Into<String>) -> Self {
        ParsrError::MissingField {
            field: field.into(),
        }
    }

    pub(crate) fn invalid(field: impl Into<String>, expected: &'static str) -> Self {
        ParsrError::InvalidField {
            field: field.into(),
            expected,
        }
    }

    pub(crate) fn unsupported(field: impl Into<String>, value: impl Into<String>) -> Self {
        ParsrError::UnsupportedValue {
            field: field.into(),
            value: value.into(),
        }
    }

    /// The input did not match the wire format.
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            ParsrError::MissingField { .. }
                | ParsrError::InvalidField { .. }
                | ParsrError::UnsupportedValue { .. }
                | ParsrError::UnknownElementType { .. }
                | ParsrError::InvalidEntry { .. }
                | ParsrError::Json(_)
        )
    }

    /// The caller asked for something the library cannot honour as requested.
    pub fn is_caller_misuse(&self) -> bool {
        matches!(
            self,
            ParsrError::FormatNotEnabled { .. }
                | ParsrError::InvalidConfig(_)
                | ParsrError::JobAlreadyStarted
        )
    }

    /// The server was unreachable or answered unexpectedly.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ParsrError::Transport { .. }
                | ParsrError::Timeout { .. }
                | ParsrError::UnexpectedStatus { .. }
                | ParsrError::Rejected { .. }
                | ParsrError::PollFailed { .. }
                | ParsrError::PollLimitExceeded { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_display() {
        let e = ParsrError::missing("output.formats.pdf");
        assert!(e.to_string().contains("output.formats.pdf"));
        assert!(e.is_malformed_input());
        assert!(!e.is_caller_misuse());
    }

    #[test]
    fn format_not_enabled_is_caller_misuse() {
        let e = ParsrError::FormatNotEnabled {
            format: Format::Pdf,
        };
        assert!(e.to_string().contains("'pdf'"), "got: {e}");
        assert!(e.is_caller_misuse());
        assert!(!e.is_transport());
        assert!(!e.is_malformed_input());
    }

    #[test]
    fn poll_failed_display() {
        let e = ParsrError::PollFailed {
            job_id: "abc".into(),
            status: 500,
        };
        assert!(e.to_string().contains("500"));
        assert!(e.to_string().contains("abc"));
        assert!(e.is_transport());
    }

    #[test]
    fn unsupported_value_display() {
        let e = ParsrError::unsupported("output.granularity", "sentence");
        assert_eq!(
            e.to_string(),
            "Unsupported value 'sentence' for field 'output.granularity'"
        );
    }
}
