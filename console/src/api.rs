//! HTTP client for the recording backend.
//!
//! Routes used:
//!   GET    /api/health
//!   POST   /api/users/register
//!   POST   /api/users/login
//!   GET    /api/users
//!   POST   /api/start-recording
//!   POST   /api/stop-recording
//!   GET    /api/recording-status/{username}
//!   GET    /api/videos
//!   GET    /api/video/{id}/download
//!   DELETE /api/delete-video/{id}

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use vidrec_common::protocol::{
    Ack, ErrorBody, HealthResponse, RecordingStatus, RegisterRequest, StartRecordingRequest,
    StopRecordingResponse, UserList, UserRecord, UsernameRequest, VideoChunk, VideoList,
};

/// Errors from a single backend call.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The backend answered non-2xx with an `{"error": ...}` body.
    #[error("{message}")]
    Backend { status: StatusCode, message: String },

    /// Non-2xx without a recognisable error body.
    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus { status: StatusCode, body: String },

    #[error("http error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("cannot write download: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid base URL {0}")]
    BaseUrl(String),
}

impl ApiError {
    /// Message the backend reported, if this is a backend-reported error.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            ApiError::Backend { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// Async API client. Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
    http: Client,
}

impl ApiClient {
    /// Create a client for `base_url` (scheme + host, optionally a path
    /// prefix; `/api/...` is appended).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url =
            Url::parse(base_url.trim()).map_err(|e| ApiError::BaseUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::BaseUrl(base_url.to_string()));
        }
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { base_url, http })
    }

    /// Returns the base URL configured for this client.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL of `/api/<segments...>`, each segment percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.path_segments_mut()
            .map_err(|_| ApiError::BaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    /// URL that streams (and downloads) one video chunk.
    pub fn stream_url(&self, id: i64) -> Result<Url, ApiError> {
        self.endpoint(&["video", &id.to_string(), "download"])
    }

    pub async fn health(&self) -> Result<HealthResponse, ApiError> {
        let url = self.endpoint(&["health"])?;
        let resp = self.http.get(url).send().await?;
        parse_json(resp).await
    }

    // ── users ────────────────────────────────────────────────────────

    pub async fn register(&self, request: &RegisterRequest) -> Result<Ack, ApiError> {
        let url = self.endpoint(&["users", "register"])?;
        let resp = self.http.post(url).json(request).send().await?;
        parse_json(resp).await
    }

    pub async fn login(&self, username: &str) -> Result<Ack, ApiError> {
        let url = self.endpoint(&["users", "login"])?;
        let body = UsernameRequest {
            username: username.to_string(),
        };
        let resp = self.http.post(url).json(&body).send().await?;
        parse_json(resp).await
    }

    pub async fn list_users(&self) -> Result<Vec<UserRecord>, ApiError> {
        let url = self.endpoint(&["users"])?;
        let resp = self.http.get(url).send().await?;
        let list: UserList = parse_json(resp).await?;
        Ok(list.users)
    }

    // ── recording ────────────────────────────────────────────────────

    pub async fn start_recording(&self, request: &StartRecordingRequest) -> Result<Ack, ApiError> {
        let url = self.endpoint(&["start-recording"])?;
        let resp = self.http.post(url).json(request).send().await?;
        parse_json(resp).await
    }

    pub async fn stop_recording(&self, username: &str) -> Result<StopRecordingResponse, ApiError> {
        let url = self.endpoint(&["stop-recording"])?;
        let body = UsernameRequest {
            username: username.to_string(),
        };
        let resp = self.http.post(url).json(&body).send().await?;
        parse_json(resp).await
    }

    pub async fn recording_status(&self, username: &str) -> Result<RecordingStatus, ApiError> {
        let url = self.endpoint(&["recording-status", username])?;
        let resp = self.http.get(url).send().await?;
        parse_json(resp).await
    }

    // ── videos ───────────────────────────────────────────────────────

    pub async fn list_videos(&self) -> Result<Vec<VideoChunk>, ApiError> {
        let url = self.endpoint(&["videos"])?;
        let resp = self.http.get(url).send().await?;
        let list: VideoList = parse_json(resp).await?;
        Ok(list.chunks)
    }

    pub async fn delete_video(&self, id: i64) -> Result<Ack, ApiError> {
        let url = self.endpoint(&["delete-video", &id.to_string()])?;
        let resp = self.http.delete(url).send().await?;
        parse_json(resp).await
    }

    /// Stream one video chunk into `out_path`. Returns the bytes written.
    ///
    /// The body goes to `<out_path>.part` first and is renamed into place
    /// once complete, so a failed transfer never leaves a truncated file
    /// under the real name.
    pub async fn download_video(&self, id: i64, out_path: &Path) -> Result<u64, ApiError> {
        let url = self.stream_url(id)?;
        let resp = check_status(self.http.get(url.clone()).send().await?).await?;

        if let Some(parent) = out_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let part_path = partial_path(out_path);
        let written = match stream_to_file(resp, &part_path).await {
            Ok(written) => written,
            Err(e) => {
                if let Err(rm) = tokio::fs::remove_file(&part_path).await {
                    debug!("Cannot remove {}: {rm}", part_path.display());
                }
                return Err(e);
            }
        };

        if tokio::fs::try_exists(out_path).await.unwrap_or(false) {
            warn!("Replacing existing file {}", out_path.display());
        }
        tokio::fs::rename(&part_path, out_path).await?;

        info!("Downloaded {url} → {} ({written} bytes)", out_path.display());
        Ok(written)
    }
}

/// Sibling path a download is written to before it is complete.
fn partial_path(out_path: &Path) -> PathBuf {
    let mut name = out_path.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    out_path.with_file_name(name)
}

async fn stream_to_file(mut resp: Response, path: &Path) -> Result<u64, ApiError> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut written: u64 = 0;
    while let Some(chunk) = resp.chunk().await? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(written)
}

// ── response helpers ─────────────────────────────────────────────────────

/// Pass 2xx responses through; turn anything else into an [`ApiError`].
async fn check_status(resp: Response) -> Result<Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    debug!("Backend returned {status}: {body}");
    match serde_json::from_str::<ErrorBody>(&body) {
        Ok(err) => Err(ApiError::Backend {
            status,
            message: err.error,
        }),
        Err(_) => Err(ApiError::UnexpectedStatus { status, body }),
    }
}

async fn parse_json<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
    let resp = check_status(resp).await?;
    let bytes = resp.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
