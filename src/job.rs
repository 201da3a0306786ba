//! Parsing jobs: submit a document, poll the queue, hand back the result.
//!
//! A job goes through three steps against the server:
//!
//! ```text
//! POST /api/document        multipart file + config  → job id (any 2xx)
//! GET  /api/queue/{id}      repeated every poll interval
//!                             200 → still running, body is a Progress
//!                             201 → done
//!                             else → failure
//! GET  /api/{format}/{id}   per enabled format (see ParsingResult)
//! ```

use crate::client::ParsrClient;
use crate::error::ParsrError;
use crate::model::Configuration;
use crate::progress::{JobProgressCallback, Progress};
use crate::result::ParsingResult;
use crate::transport::DocumentUpload;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// Outcome of one queue poll.
#[derive(Debug, Clone, PartialEq)]
pub enum QueueStatus {
    Running(Progress),
    Completed,
}

/// A document and the configuration to parse it with.
///
/// A job can be started once, by [`submit`](Self::submit),
/// [`execute`](Self::execute), [`execute_with`](Self::execute_with) or
/// [`watch`](Self::watch). Starting it again fails with
/// [`ParsrError::JobAlreadyStarted`].
#[derive(Debug)]
pub struct ParsingJob {
    client: ParsrClient,
    file: PathBuf,
    config: Configuration,
    started: AtomicBool,
}

impl ParsingJob {
    pub(crate) fn new(client: ParsrClient, file: PathBuf, config: Configuration) -> Self {
        Self {
            client,
            file,
            config,
            started: AtomicBool::new(false),
        }
    }

    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Send the document and return the job id assigned by the server.
    pub async fn submit(&self) -> Result<String, ParsrError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(ParsrError::JobAlreadyStarted);
        }

        let upload = DocumentUpload::from_path(&self.file, self.config.to_json()?).await?;
        info!(
            "Submitting {} ({} bytes, {})",
            self.file.display(),
            upload.bytes.len(),
            upload.mime_type
        );
        let response = self
            .client
            .transport()
            .post_document("/api/document", upload)
            .await?;

        let body = response.text();
        if !response.is_success() {
            return Err(ParsrError::Rejected {
                status: response.status,
                body,
            });
        }
        let job_id = body.trim();
        if job_id.is_empty() {
            return Err(ParsrError::Rejected {
                status: response.status,
                body: "the server did not return a job id".into(),
            });
        }
        info!("Job {} queued", job_id);
        Ok(job_id.to_string())
    }

    /// Ask the server once how job `job_id` is doing.
    pub async fn poll(&self, job_id: &str) -> Result<QueueStatus, ParsrError> {
        let response = self
            .client
            .transport()
            .get(&format!("/api/queue/{job_id}"))
            .await?;
        match response.status {
            200 => {
                let progress = Progress::from_json(&response.body)?;
                debug!(
                    "Job {}: {}",
                    job_id,
                    progress.status.as_deref().unwrap_or("running")
                );
                Ok(QueueStatus::Running(progress))
            }
            201 => Ok(QueueStatus::Completed),
            status => Err(ParsrError::PollFailed {
                job_id: job_id.to_string(),
                status,
            }),
        }
    }

    /// Whether `polls` running reports exhaust the configured budget.
    pub(crate) fn poll_limit_reached(&self, polls: u32) -> bool {
        self.client.config().max_polls.is_some_and(|max| polls >= max)
    }

    pub(crate) fn poll_limit_error(&self, job_id: &str, polls: u32) -> ParsrError {
        warn!("Job {} still running after {} polls, giving up", job_id, polls);
        ParsrError::PollLimitExceeded {
            job_id: job_id.to_string(),
            polls,
        }
    }

    pub(crate) fn client(&self) -> &ParsrClient {
        &self.client
    }

    /// Poll until the server reports completion.
    async fn wait(
        &self,
        job_id: &str,
        callback: &dyn JobProgressCallback,
    ) -> Result<(), ParsrError> {
        let mut polls = 0u32;
        loop {
            tokio::time::sleep(self.client.config().poll_interval()).await;
            polls += 1;
            match self.poll(job_id).await? {
                QueueStatus::Completed => {
                    info!("Job {} completed after {} polls", job_id, polls);
                    return Ok(());
                }
                QueueStatus::Running(progress) => {
                    callback.on_progress(job_id, &progress);
                    if self.poll_limit_reached(polls) {
                        return Err(self.poll_limit_error(job_id, polls));
                    }
                }
            }
        }
    }

    /// Submit, poll until done and return the result, reporting every step
    /// to `callback`.
    pub async fn execute_with(
        &self,
        callback: &dyn JobProgressCallback,
    ) -> Result<ParsingResult, ParsrError> {
        let job_id = match self.submit().await {
            Ok(id) => id,
            Err(e) => {
                callback.on_failure(None, &e);
                return Err(e);
            }
        };
        callback.on_submitted(&job_id);

        match self.wait(&job_id, callback).await {
            Ok(()) => {
                callback.on_complete(&job_id);
                Ok(self.result(job_id))
            }
            Err(e) => {
                callback.on_failure(Some(&job_id), &e);
                Err(e)
            }
        }
    }

    /// Submit and wait for the result, logging progress.
    pub async fn execute(&self) -> Result<ParsingResult, ParsrError> {
        self.execute_with(&LogProgress).await
    }

    /// Blocking wrapper around [`execute`](Self::execute).
    ///
    /// Creates a temporary tokio runtime internally; do not call from
    /// within an async context.
    pub fn execute_blocking(&self) -> Result<ParsingResult, ParsrError> {
        tokio::runtime::Runtime::new()
            .map_err(|e| ParsrError::Internal(format!("Failed to create tokio runtime: {e}")))?
            .block_on(self.execute())
    }

    pub(crate) fn result(&self, job_id: String) -> ParsingResult {
        ParsingResult::new(self.client.clone(), job_id, self.config.clone())
    }
}

/// Progress reporting used by [`ParsingJob::execute`].
struct LogProgress;

impl JobProgressCallback for LogProgress {
    fn on_progress(&self, job_id: &str, progress: &Progress) {
        info!(
            "[JOB-{}] {}",
            job_id,
            progress.status.as_deref().unwrap_or("running")
        );
    }
}
