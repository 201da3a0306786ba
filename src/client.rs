//! Entry point for talking to a Parsr server.

use crate::config::ClientConfig;
use crate::error::ParsrError;
use crate::job::ParsingJob;
use crate::model::Configuration;
use crate::result::ParsingResult;
use crate::transport::{HttpTransport, ReqwestTransport};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Handle on a Parsr server.
///
/// Cheap to clone; clones share the underlying transport.
///
/// # Example
/// ```rust,no_run
/// use docparsr::{ClientConfig, ParsrClient};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ParsrClient::new(ClientConfig::default())?;
/// let config = client.default_config().await?;
/// let result = client.new_job("invoice.pdf", config).execute().await?;
/// println!("{}", result.text(docparsr::Format::Json).await?);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ParsrClient {
    config: Arc<ClientConfig>,
    transport: Arc<dyn HttpTransport>,
}

impl fmt::Debug for ParsrClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParsrClient")
            .field("config", &self.config)
            .field("transport", &"<dyn HttpTransport>")
            .finish()
    }
}

impl ParsrClient {
    /// A client speaking HTTP through `reqwest`.
    pub fn new(config: ClientConfig) -> Result<Self, ParsrError> {
        let transport = ReqwestTransport::new(config.clone())?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// A client using a caller-supplied transport.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            config: Arc::new(config),
            transport,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn transport(&self) -> &dyn HttpTransport {
        self.transport.as_ref()
    }

    /// Fetch the configuration the server applies when none is given.
    pub async fn default_config(&self) -> Result<Configuration, ParsrError> {
        let response = self.transport.get("/api/default-config").await?;
        if response.status != 200 {
            return Err(ParsrError::UnexpectedStatus {
                operation: "Fetching the default configuration".into(),
                status: response.status,
            });
        }
        let config = Configuration::from_json(&response.body)?;
        debug!(
            "Server default configuration: version {}, {} cleaners",
            config.version,
            config.cleaners.len()
        );
        Ok(config)
    }

    /// Prepare a job for `file`. Nothing is sent until the job is started.
    pub fn new_job(&self, file: impl AsRef<Path>, config: Configuration) -> ParsingJob {
        ParsingJob::new(self.clone(), file.as_ref().to_path_buf(), config)
    }

    /// Re-attach to the results of a job that already finished.
    ///
    /// `config` must be the configuration the job ran with; it decides which
    /// formats can be fetched.
    pub fn load_result(&self, job_id: impl Into<String>, config: Configuration) -> ParsingResult {
        let job_id = job_id.into();
        info!("Loading results of job {}", job_id);
        ParsingResult::new(self.clone(), job_id, config)
    }
}
