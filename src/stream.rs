//! Streaming job API: observe a parsing job as a sequence of events.
//!
//! Unlike [`crate::ParsingJob::execute`], which returns only once the job
//! finishes, [`crate::ParsingJob::watch`] yields a [`JobEvent`] per step:
//! submission, every progress report, then completion. The stream ends after
//! the first error or after [`JobEvent::Completed`].

use crate::error::ParsrError;
use crate::job::{ParsingJob, QueueStatus};
use crate::progress::Progress;
use crate::result::ParsingResult;
use futures::stream;
use std::pin::Pin;
use tokio_stream::Stream;
use tracing::info;

/// One step of a watched job.
#[derive(Debug, Clone)]
pub enum JobEvent {
    Submitted { job_id: String },
    Progress { job_id: String, progress: Progress },
    Completed(ParsingResult),
}

/// A boxed stream of job events.
pub type JobStream = Pin<Box<dyn Stream<Item = Result<JobEvent, ParsrError>> + Send>>;

enum State {
    Submit(ParsingJob),
    Poll {
        job: ParsingJob,
        job_id: String,
        polls: u32,
    },
    Fail(ParsrError),
    Done,
}

impl ParsingJob {
    /// Start the job and stream its events.
    ///
    /// # Example
    /// ```rust,no_run
    /// use docparsr::{ClientConfig, Configuration, JobEvent, ParsrClient};
    /// use futures::StreamExt;
    ///
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = ParsrClient::new(ClientConfig::default())?;
    /// let mut events = client.new_job("scan.pdf", Configuration::default()).watch();
    /// while let Some(event) = events.next().await {
    ///     match event? {
    ///         JobEvent::Submitted { job_id } => eprintln!("queued as {job_id}"),
    ///         JobEvent::Progress { progress, .. } => eprintln!("{:?}", progress.status),
    ///         JobEvent::Completed(result) => eprintln!("done: {}", result.job_id()),
    ///     }
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn watch(self) -> JobStream {
        let s = stream::unfold(State::Submit(self), |state| async move {
            match state {
                State::Submit(job) => match job.submit().await {
                    Ok(job_id) => Some((
                        Ok(JobEvent::Submitted {
                            job_id: job_id.clone(),
                        }),
                        State::Poll {
                            job,
                            job_id,
                            polls: 0,
                        },
                    )),
                    Err(e) => Some((Err(e), State::Done)),
                },
                State::Poll { job, job_id, polls } => {
                    tokio::time::sleep(job.client().config().poll_interval()).await;
                    let polls = polls + 1;
                    match job.poll(&job_id).await {
                        Ok(QueueStatus::Running(progress)) => {
                            let next = if job.poll_limit_reached(polls) {
                                State::Fail(job.poll_limit_error(&job_id, polls))
                            } else {
                                State::Poll {
                                    job,
                                    job_id: job_id.clone(),
                                    polls,
                                }
                            };
                            Some((Ok(JobEvent::Progress { job_id, progress }), next))
                        }
                        Ok(QueueStatus::Completed) => {
                            info!("Job {} completed after {} polls", job_id, polls);
                            Some((Ok(JobEvent::Completed(job.result(job_id))), State::Done))
                        }
                        Err(e) => Some((Err(e), State::Done)),
                    }
                }
                State::Fail(err) => Some((Err(err), State::Done)),
                State::Done => None,
            }
        });
        Box::pin(s)
    }
}
