//! Access to the rendered outputs of a finished job.

use crate::client::ParsrClient;
use crate::document::Document;
use crate::error::ParsrError;
use crate::model::{Configuration, Format};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The outputs of a completed parsing job.
///
/// Only formats enabled in the job's [`Configuration`] can be fetched;
/// asking for another one fails with [`ParsrError::FormatNotEnabled`]
/// without contacting the server.
#[derive(Debug, Clone)]
pub struct ParsingResult {
    client: ParsrClient,
    job_id: String,
    config: Configuration,
}

impl ParsingResult {
    pub(crate) fn new(client: ParsrClient, job_id: String, config: Configuration) -> Self {
        Self {
            client,
            job_id,
            config,
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    /// Formats that can be fetched from this result.
    pub fn formats(&self) -> impl Iterator<Item = Format> + '_ {
        self.config.output.formats.iter().copied()
    }

    /// Raw bytes of the result rendered as `format`.
    pub async fn source(&self, format: Format) -> Result<Vec<u8>, ParsrError> {
        if !self.config.output.is_enabled(format) {
            return Err(ParsrError::FormatNotEnabled { format });
        }
        let path = format!("/api/{}/{}", format.name(), self.job_id);
        let response = self.client.transport().get(&path).await?;
        if !response.is_success() {
            return Err(ParsrError::UnexpectedStatus {
                operation: format!("Fetching the {format} result of job {}", self.job_id),
                status: response.status,
            });
        }
        Ok(response.body)
    }

    /// The result rendered as `format`, as text. Invalid UTF-8 is replaced.
    pub async fn text(&self, format: Format) -> Result<String, ParsrError> {
        let bytes = self.source(format).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// The JSON result as a traversable [`Document`].
    pub async fn document(&self) -> Result<Document, ParsrError> {
        Ok(Document::from_bytes(self.source(Format::Json).await?))
    }

    /// File name used by [`save_to`](Self::save_to) for `format`.
    pub fn file_name(&self, format: Format) -> String {
        match format {
            Format::SimpleJson => format!("{}.simple.json", self.job_id),
            other => format!("{}.{}", self.job_id, other.extension()),
        }
    }

    /// Write the result rendered as `format` into `dir`, returning the file
    /// path. The file appears atomically (temp file + rename).
    pub async fn save_to(&self, format: Format, dir: impl AsRef<Path>) -> Result<PathBuf, ParsrError> {
        let bytes = self.source(format).await?;
        let path = dir.as_ref().join(self.file_name(format));
        write_atomic(&path, &bytes).await?;
        info!("Saved {} result to {}", format, path.display());
        Ok(path)
    }

    /// [`save_to`](Self::save_to) for every enabled format.
    pub async fn save_all(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, ParsrError> {
        let mut saved = Vec::new();
        for format in self.formats() {
            saved.push(self.save_to(format, dir.as_ref()).await?);
        }
        Ok(saved)
    }
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), ParsrError> {
    let write_failed = |source| ParsrError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(write_failed)?;
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);
    let written = match tokio::fs::write(&tmp_path, bytes).await {
        Ok(()) => tokio::fs::rename(&tmp_path, path).await,
        Err(e) => Err(e),
    };
    if let Err(e) = written {
        if let Err(cleanup) = tokio::fs::remove_file(&tmp_path).await {
            debug!("Could not remove {}: {}", tmp_path.display(), cleanup);
        }
        return Err(write_failed(e));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_atomic_replaces_the_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job-1.txt");
        std::fs::write(&path, "old").unwrap();

        write_atomic(&path, b"new").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
        assert!(!dir.path().join("job-1.txt.tmp").exists());
    }

    #[tokio::test]
    async fn failed_rename_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory cannot be replaced by a file.
        let path = dir.path().join("job-1.json");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), "x").unwrap();

        let err = write_atomic(&path, b"{}").await.unwrap_err();
        assert!(matches!(err, ParsrError::OutputWriteFailed { .. }), "got: {err}");
        assert!(!dir.path().join("job-1.json.tmp").exists());
        assert!(path.join("keep").exists());
    }
}
