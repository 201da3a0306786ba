//! Client settings: where the Parsr server lives and how to talk to it.
//!
//! All connection behaviour is controlled through [`ClientConfig`], built via
//! its [`ClientConfigBuilder`]. The processing options sent with each job are
//! a separate concern; see [`crate::Configuration`].

use crate::error::ParsrError;
use std::time::Duration;

/// Settings for a [`crate::ParsrClient`].
///
/// Built via [`ClientConfig::builder()`] or using [`ClientConfig::default()`].
///
/// # Example
/// ```rust
/// use docparsr::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .base_url("http://parsr.internal:3001")
///     .poll_interval_ms(500)
///     .max_polls(600)
///     .build()
///     .unwrap();
/// assert_eq!(config.base_url, "http://parsr.internal:3001");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server root, without a trailing slash. Default: `http://localhost:3001`.
    pub base_url: String,

    /// Delay between two queue polls, in milliseconds. Default: 1000.
    ///
    /// Parsr reports progress per cleaner, so polling faster than once a
    /// second rarely shows anything new.
    pub poll_interval_ms: u64,

    /// Per-request timeout in seconds. Default: 60.
    ///
    /// Applies to each HTTP call on its own, not to the whole job. Large
    /// result downloads (PDF, JSON of long documents) are the slowest calls.
    pub request_timeout_secs: u64,

    /// Give up after this many polls. Default: no limit.
    pub max_polls: Option<u32>,

    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3001".to_string(),
            poll_interval_ms: 1000,
            request_timeout_secs: 60,
            max_polls: None,
            user_agent: format!("docparsr/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Create a new builder for `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::default(),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Absolute URL for an API path such as `/api/queue/abc`.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.poll_interval_ms = ms;
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs.max(1);
        self
    }

    pub fn max_polls(mut self, n: u32) -> Self {
        self.config.max_polls = Some(n);
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ClientConfig, ParsrError> {
        let c = &self.config;
        if !(c.base_url.starts_with("http://") || c.base_url.starts_with("https://")) {
            return Err(ParsrError::InvalidConfig(format!(
                "Server URL must start with http:// or https://, got '{}'",
                c.base_url
            )));
        }
        if c.max_polls == Some(0) {
            return Err(ParsrError::InvalidConfig(
                "max_polls must be at least 1".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_server() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:3001");
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.max_polls, None);
        assert!(config.user_agent.starts_with("docparsr/"));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let config = ClientConfig::builder()
            .base_url("https://parsr.example.com/")
            .build()
            .unwrap();
        assert_eq!(
            config.url("/api/queue/42"),
            "https://parsr.example.com/api/queue/42"
        );
    }

    #[test]
    fn rejects_non_http_url() {
        let err = ClientConfig::builder()
            .base_url("ftp://parsr")
            .build()
            .unwrap_err();
        assert!(matches!(err, ParsrError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_zero_poll_budget() {
        assert!(ClientConfig::builder().max_polls(0).build().is_err());
    }
}
