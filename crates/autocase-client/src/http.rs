//! HTTP client for the `/analyze-pdf/` endpoint.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use autocase_core::{AnalyzeError, Analyzer};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

const ANALYZE_PATH: &str = "/analyze-pdf/";
const FILES_FIELD: &str = "files";

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<ClientError> for AnalyzeError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Http(e) => AnalyzeError::Transport(e.to_string()),
            ClientError::Server { status, body } => AnalyzeError::Server {
                status,
                detail: detail_from_body(&body),
            },
            ClientError::Json(e) => AnalyzeError::InvalidResponse(e.to_string()),
            ClientError::Io { path, source } => AnalyzeError::File {
                path,
                message: source.to_string(),
            },
        }
    }
}

/// Client for the analysis API.
pub struct AnalyzeClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct AnalyzeResponse {
    analysis: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

/// One file ready to become a multipart part.
#[derive(Debug)]
struct Upload {
    file_name: String,
    mime: &'static str,
    bytes: Vec<u8>,
}

impl AnalyzeClient {
    /// Create a client for the given API base URL.
    ///
    /// `base_url` should be like `http://localhost:8000`; a trailing slash is dropped.
    /// No request timeout is set.
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, ANALYZE_PATH)
    }

    /// Upload `files` in one multipart POST and return the markdown report.
    ///
    /// Every file is read before the request goes out, so an unreadable file
    /// fails the attempt without touching the network.
    pub async fn analyze_files(&self, files: &[PathBuf]) -> Result<String, ClientError> {
        let mut form = Form::new();
        let mut total_bytes = 0usize;
        for path in files {
            let upload = read_upload(path).await?;
            debug!(file = %upload.file_name, bytes = upload.bytes.len(), "adding upload part");
            total_bytes += upload.bytes.len();
            let part = Part::bytes(upload.bytes)
                .file_name(upload.file_name)
                .mime_str(upload.mime)?;
            form = form.part(FILES_FIELD, part);
        }

        let url = self.endpoint();
        info!(url = %url, files = files.len(), bytes = total_bytes, "uploading documents");
        let resp = self.client.post(&url).multipart(form).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(ClientError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: AnalyzeResponse = serde_json::from_str(&body)?;
        info!(chars = parsed.analysis.len(), "received analysis");
        Ok(parsed.analysis)
    }
}

#[async_trait]
impl Analyzer for AnalyzeClient {
    async fn analyze(&self, files: &[PathBuf]) -> Result<String, AnalyzeError> {
        Ok(self.analyze_files(files).await?)
    }
}

async fn read_upload(path: &Path) -> Result<Upload, ClientError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| ClientError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    Ok(Upload {
        file_name,
        mime: mime_for(path),
        bytes,
    })
}

fn mime_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// Pull the `detail` field out of an error body.
///
/// Strings come back verbatim; any other JSON value (FastAPI validation
/// errors are arrays) comes back as compact JSON. Anything else is `None`.
fn detail_from_body(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail? {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}
