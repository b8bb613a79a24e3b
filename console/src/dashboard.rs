//! Dashboard view controller: the recorded-chunk list, its user filter,
//! and play / download / delete actions.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::api::ApiClient;
use crate::error::{Action, ActionError};
use crate::prompt::Confirm;
use crate::schedule::spawn_repeating;
use crate::state::DashboardState;
use crate::view::{self, DashboardView, Notice, PlaybackOverlay};

/// Dashboard controller over `{state, api client}`. Clones share state.
#[derive(Debug, Clone)]
pub struct DashboardController {
    api: ApiClient,
    state: Arc<Mutex<DashboardState>>,
    download_dir: PathBuf,
}

impl DashboardController {
    pub fn new(api: ApiClient, download_dir: impl Into<PathBuf>) -> Self {
        Self {
            api,
            state: Arc::default(),
            download_dir: download_dir.into(),
        }
    }

    fn state(&self) -> MutexGuard<'_, DashboardState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn view(&self) -> DashboardView {
        view::render_dashboard(&self.state())
    }

    pub fn file_name_of(&self, id: i64) -> Option<String> {
        self.state().find(id).map(|v| v.file_name.clone())
    }

    // ── loading ──────────────────────────────────────────────────────

    /// Replace the cached list. Returns the number of chunks.
    pub async fn load_videos(&self) -> Result<usize, ActionError> {
        let videos = self.api.list_videos().await.map_err(|e| {
            error!("Error loading videos: {e}");
            ActionError::request(Action::LoadVideos, e)
        })?;

        let count = videos.len();
        self.state().videos = videos;
        debug!("Loaded {count} video chunk(s)");
        Ok(count)
    }

    /// Refresh the users offered by the filter. Returns the number of users.
    pub async fn load_users(&self) -> Result<usize, ActionError> {
        let users = self.api.list_users().await.map_err(|e| {
            error!("Error loading users: {e}");
            ActionError::request(Action::LoadUsers, e)
        })?;

        let count = users.len();
        self.state().users = users;
        Ok(count)
    }

    // ── filter ───────────────────────────────────────────────────────

    /// Filter the cached list to one user. Blank clears the filter and
    /// reloads; otherwise no request is made.
    pub async fn apply_filter(&self, username: &str) -> Result<Notice, ActionError> {
        let username = username.trim();
        if username.is_empty() {
            self.state().filter = None;
            self.load_videos().await?;
            return Ok(Notice::success("Filters cleared"));
        }

        let matches = {
            let mut state = self.state();
            state.filter = Some(username.to_string());
            state.visible().len()
        };

        Ok(if matches == 0 {
            Notice::info(format!("No videos found for user \"{username}\""))
        } else {
            Notice::success(format!("Found {matches} video(s) for user \"{username}\""))
        })
    }

    // ── actions ──────────────────────────────────────────────────────

    /// Player overlay for a cached chunk.
    pub fn play_video(&self, id: i64) -> Result<PlaybackOverlay, ActionError> {
        let state = self.state();
        let chunk = state
            .find(id)
            .ok_or_else(|| ActionError::invalid("Video not found"))?;
        let url = self
            .api
            .stream_url(id)
            .map_err(|e| ActionError::request(Action::DownloadVideo, e))?;
        Ok(PlaybackOverlay::new(chunk, url.to_string()))
    }

    /// Save a chunk into the download directory under its base name.
    pub async fn download_video(&self, id: i64, file_name: &str) -> Result<Notice, ActionError> {
        let name = local_file_name(id, file_name);
        let out_path = self.download_dir.join(&name);
        info!("Downloading {name}...");

        let bytes = self.api.download_video(id, &out_path).await.map_err(|e| {
            error!("Error downloading video {id}: {e}");
            ActionError::request(Action::DownloadVideo, e)
        })?;

        debug!("{name}: {bytes} bytes");
        Ok(Notice::success(format!(
            "Downloaded {name} to {}",
            out_path.display()
        )))
    }

    /// Delete after confirmation, then reload. `None` if declined.
    pub async fn delete_video<C: Confirm>(
        &self,
        id: i64,
        confirm: &mut C,
    ) -> Result<Option<Notice>, ActionError> {
        let question = "Are you sure you want to delete this video? This action cannot be undone.";
        if !confirm.confirm(question).await {
            return Ok(None);
        }

        self.api.delete_video(id).await.map_err(|e| {
            error!("Error deleting video {id}: {e}");
            ActionError::request(Action::DeleteVideo, e)
        })?;
        info!("Deleted video {id}");

        // Drop it locally too, in case the reload fails.
        self.state().videos.retain(|v| v.id != id);
        if let Err(e) = self.load_videos().await {
            warn!("Reload after delete failed: {e}");
        }
        Ok(Some(Notice::success("Video deleted successfully")))
    }

    // ── auto refresh ─────────────────────────────────────────────────

    /// Reload the video list every `period` until stopped.
    ///
    /// The returned channel gets a notice whenever a reload changes which
    /// chunks are cached.
    pub fn start_auto_refresh(&self, period: Duration) -> mpsc::UnboundedReceiver<Notice> {
        let (changes, rx) = mpsc::unbounded_channel();
        let this = self.clone();
        let handle = spawn_repeating("video-refresh", period, move || {
            let this = this.clone();
            let changes = changes.clone();
            async move {
                let before = this.cached_ids();
                match this.load_videos().await {
                    Ok(count) if this.cached_ids() != before => {
                        changes
                            .send(Notice::info(format!("Video list updated: {count} chunk(s)")))
                            .ok();
                    }
                    Ok(_) => {}
                    Err(e) => warn!("Auto refresh failed: {e}"),
                }
            }
        });
        if let Some(old) = self.state().refresh.replace(handle) {
            old.stop();
        }
        info!("Auto refresh every {period:?}");
        rx
    }

    fn cached_ids(&self) -> Vec<i64> {
        self.state().videos.iter().map(|v| v.id).collect()
    }

    pub fn stop_auto_refresh(&self) {
        if let Some(handle) = self.state().refresh.take() {
            handle.stop();
        }
    }

    pub fn is_refreshing(&self) -> bool {
        self.state()
            .refresh
            .as_ref()
            .is_some_and(|h| !h.is_stopped())
    }
}

/// Final path component of the backend's file name, or a generated one.
fn local_file_name(id: i64, file_name: &str) -> String {
    Path::new(file_name.trim())
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("video-{id}.mp4"))
}
