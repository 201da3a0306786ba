//! Progress-callback trait for parsing-job events.
//!
//! Pass an implementation to [`crate::ParsingJob::execute_with`] to receive
//! events as the server works through the job: submission, each queue poll
//! that reports progress, completion or failure.
//!
//! # Example
//!
//! ```rust
//! use docparsr::{JobProgressCallback, Progress};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! struct CountingCallback {
//!     polls: AtomicUsize,
//! }
//!
//! impl JobProgressCallback for CountingCallback {
//!     fn on_progress(&self, job_id: &str, progress: &Progress) {
//!         let n = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
//!         eprintln!("[{job_id}] poll {n}: {}", progress.status.as_deref().unwrap_or("-"));
//!     }
//! }
//!
//! let cb = CountingCallback { polls: AtomicUsize::new(0) };
//! cb.on_submitted("abc");
//! ```

use crate::error::ParsrError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A progress report from `GET /api/queue/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    /// When the server started processing the job.
    #[serde(rename = "start-date")]
    pub started_at: DateTime<Utc>,
    /// Human-readable stage, e.g. `"Running cleaner: table-detection"`.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "progress-percentage", default)]
    pub percentage: Option<f64>,
}

impl Progress {
    pub fn from_json(bytes: &[u8]) -> Result<Self, ParsrError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Called by a [`crate::ParsingJob`] as the job moves through the queue.
///
/// Implementations must be `Send + Sync`. All methods have default no-op
/// implementations so callers only override what they care about.
pub trait JobProgressCallback: Send + Sync {
    /// The server accepted the document and assigned `job_id`.
    fn on_submitted(&self, job_id: &str) {
        let _ = job_id;
    }

    /// A poll reported the job still running.
    fn on_progress(&self, job_id: &str, progress: &Progress) {
        let _ = (job_id, progress);
    }

    /// The job finished; results can now be fetched.
    fn on_complete(&self, job_id: &str) {
        let _ = job_id;
    }

    /// The job failed. `job_id` is `None` when submission itself failed.
    fn on_failure(&self, job_id: Option<&str>, error: &ParsrError) {
        let _ = (job_id, error);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl JobProgressCallback for NoopProgressCallback {}

/// Convenience alias for a shared callback.
pub type ProgressCallback = Arc<dyn JobProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct TrackingCallback {
        progress: AtomicUsize,
        completed: Mutex<Option<String>>,
        failures: AtomicUsize,
    }

    impl JobProgressCallback for TrackingCallback {
        fn on_progress(&self, _job_id: &str, _progress: &Progress) {
            self.progress.fetch_add(1, Ordering::SeqCst);
        }

        fn on_complete(&self, job_id: &str) {
            *self.completed.lock().unwrap() = Some(job_id.to_string());
        }

        fn on_failure(&self, _job_id: Option<&str>, _error: &ParsrError) {
            self.failures.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn sample() -> Progress {
        Progress::from_json(br#"{"start-date":"2020-03-21T10:15:30.000Z","status":"Extracting"}"#)
            .unwrap()
    }

    #[test]
    fn progress_parses_queue_body() {
        let p = sample();
        assert_eq!(p.status.as_deref(), Some("Extracting"));
        assert_eq!(p.percentage, None);
        assert_eq!(p.started_at.to_rfc3339(), "2020-03-21T10:15:30+00:00");
    }

    #[test]
    fn progress_ignores_unknown_fields() {
        let p = Progress::from_json(
            br#"{"start-date":"2020-03-21T10:15:30Z","status":null,"progress-percentage":40.5,"estimated-remaining-time":3}"#,
        )
        .unwrap();
        assert_eq!(p.status, None);
        assert_eq!(p.percentage, Some(40.5));
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_submitted("a");
        cb.on_progress("a", &sample());
        cb.on_complete("a");
        cb.on_failure(None, &ParsrError::JobAlreadyStarted);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        tracker.on_progress("a", &sample());
        tracker.on_progress("a", &sample());
        tracker.on_complete("a");
        assert_eq!(tracker.progress.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.completed.lock().unwrap().as_deref(), Some("a"));
        assert_eq!(tracker.failures.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_submitted("job");
    }
}
