//! # docparsr
//!
//! Typed client for [Parsr](https://github.com/axa-group/Parsr), a document
//! parsing server that turns PDFs and scans into structured JSON, text,
//! Markdown and CSV.
//!
//! ## What's inside
//!
//! ```text
//! Configuration ──encode──► POST /api/document ──► job id
//!      ▲                                             │
//!      └──decode── GET /api/default-config           ▼
//!                                      GET /api/queue/{id} (poll)
//!                                                    │
//!                                                    ▼
//!                  Document ◄── GET /api/json/{id}   ParsingResult
//!                     │
//!                     └── DocumentVisitor: metadata, pages (element trees), fonts
//! ```
//!
//! * [`Configuration`]: the processing pipeline sent with each job (extractor,
//!   cleaners, output formats), with its own JSON codec in [`codec`].
//! * [`ParsrClient`] / [`ParsingJob`] / [`ParsingResult`]: submit, poll and
//!   fetch results over HTTP.
//! * [`Document`]: streams a JSON result page by page into a
//!   [`DocumentVisitor`] without building the whole tree in memory.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docparsr::{ClientConfig, Document, DocumentVisitor, PageVisitor, ParsrClient, Word};
//!
//! #[derive(Default)]
//! struct WordCount(usize);
//!
//! impl PageVisitor for WordCount {
//!     fn visit_word(&mut self, _word: &Word) {
//!         self.0 += 1;
//!     }
//! }
//! impl DocumentVisitor for WordCount {}
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ParsrClient::new(ClientConfig::default())?;
//!     let config = client.default_config().await?;
//!     let result = client.new_job("report.pdf", config).execute().await?;
//!
//!     let mut count = WordCount::default();
//!     result.document().await?.accept(&mut count)?;
//!     println!("{} words", count.0);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `parsr` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! docparsr = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod client;
pub mod codec;
pub mod config;
pub mod document;
pub mod error;
pub mod job;
pub mod model;
pub mod progress;
pub mod result;
pub mod stream;
pub mod transport;
pub mod visitor;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use client::ParsrClient;
pub use config::{ClientConfig, ClientConfigBuilder};
pub use document::{read_document, Document};
pub use error::ParsrError;
pub use job::{ParsingJob, QueueStatus};
pub use model::*;
pub use progress::{JobProgressCallback, NoopProgressCallback, Progress, ProgressCallback};
pub use result::ParsingResult;
pub use stream::{JobEvent, JobStream};
pub use transport::{DocumentUpload, HttpResponse, HttpTransport, ReqwestTransport};
pub use visitor::{DocumentVisitor, PageVisitor};
