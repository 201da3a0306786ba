//! HTTP plumbing between the client and a Parsr server.
//!
//! [`crate::ParsrClient`] only ever talks to an [`HttpTransport`]. The
//! shipped implementation is [`ReqwestTransport`]; tests substitute an
//! in-memory transport.

use crate::config::ClientConfig;
use crate::error::ParsrError;
use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

/// Status and body of a finished request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text, with invalid UTF-8 replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// The multipart form of a document submission: the input file and the
/// encoded configuration.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
    /// Encoded [`crate::Configuration`], sent as the `config` part.
    pub config_json: String,
}

impl DocumentUpload {
    /// Read `path` into an upload. The MIME type is derived from the file
    /// extension.
    pub async fn from_path(path: &Path, config_json: String) -> Result<Self, ParsrError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| ParsrError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        Ok(Self {
            mime_type: mime_for(path),
            file_name,
            bytes,
            config_json,
        })
    }
}

/// MIME type for the input formats Parsr accepts.
pub fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "tif" | "tiff" => "image/tiff",
        "bmp" => "image/bmp",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "eml" => "message/rfc822",
        "txt" => "text/plain",
        "json" => "application/json",
        _ => "application/octet-stream",
    }
}

/// Minimal HTTP surface the client needs.
///
/// `path` is always an absolute API path such as `/api/queue/abc`;
/// implementations resolve it against their server.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, path: &str) -> Result<HttpResponse, ParsrError>;

    /// POST a multipart form with parts `file` and `config`.
    async fn post_document(
        &self,
        path: &str,
        upload: DocumentUpload,
    ) -> Result<HttpResponse, ParsrError>;
}

/// [`HttpTransport`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    config: ClientConfig,
}

impl ReqwestTransport {
    pub fn new(config: ClientConfig) -> Result<Self, ParsrError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ParsrError::Transport {
                url: config.base_url.clone(),
                reason: e.to_string(),
            })?;
        Ok(Self { client, config })
    }

    fn map_error(&self, url: &str, e: reqwest::Error) -> ParsrError {
        if e.is_timeout() {
            ParsrError::Timeout {
                url: url.to_string(),
                secs: self.config.request_timeout_secs,
            }
        } else {
            ParsrError::Transport {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    }

    async fn finish(&self, url: &str, response: reqwest::Response) -> Result<HttpResponse, ParsrError> {
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.map_error(url, e))?;
        debug!("{} -> HTTP {} ({} bytes)", url, status, body.len());
        Ok(HttpResponse::new(status, body.to_vec()))
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, path: &str) -> Result<HttpResponse, ParsrError> {
        let url = self.config.url(path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.map_error(&url, e))?;
        self.finish(&url, response).await
    }

    async fn post_document(
        &self,
        path: &str,
        upload: DocumentUpload,
    ) -> Result<HttpResponse, ParsrError> {
        use reqwest::multipart::{Form, Part};

        let url = self.config.url(path);
        let file = Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(upload.mime_type)
            .map_err(|e| self.map_error(&url, e))?;
        let config = Part::text(upload.config_json)
            .file_name("config.json")
            .mime_str("application/json")
            .map_err(|e| self.map_error(&url, e))?;
        let form = Form::new().part("file", file).part("config", config);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.map_error(&url, e))?;
        self.finish(&url, response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_follows_extension() {
        assert_eq!(mime_for(Path::new("scan.PDF")), "application/pdf");
        assert_eq!(mime_for(Path::new("photo.jpeg")), "image/jpeg");
        assert_eq!(mime_for(Path::new("README")), "application/octet-stream");
    }

    #[test]
    fn success_means_any_2xx() {
        assert!(HttpResponse::new(200, "x").is_success());
        assert!(HttpResponse::new(202, "x").is_success());
        assert!(!HttpResponse::new(302, "x").is_success());
        assert!(!HttpResponse::new(500, "x").is_success());
    }

    #[tokio::test]
    async fn upload_reads_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invoice.pdf");
        tokio::fs::write(&path, b"%PDF-1.4").await.unwrap();
        let upload = DocumentUpload::from_path(&path, "{}".into()).await.unwrap();
        assert_eq!(upload.file_name, "invoice.pdf");
        assert_eq!(upload.mime_type, "application/pdf");
        assert_eq!(upload.bytes, b"%PDF-1.4");
    }

    #[test]
    fn missing_upload_is_an_io_error() {
        let err = tokio_test::block_on(DocumentUpload::from_path(
            Path::new("/no/such/file.pdf"),
            "{}".into(),
        ))
        .unwrap_err();
        assert!(matches!(err, ParsrError::Io { .. }));
    }
}
