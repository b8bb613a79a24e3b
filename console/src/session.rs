//! Session view controller: registration, login, and the recording
//! lifecycle with its status poll.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Local;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use vidrec_common::plan::RecordingPlan;
use vidrec_common::protocol::{RegisterRequest, StartRecordingRequest};

use crate::api::ApiClient;
use crate::error::{Action, ActionError};
use crate::prompt::Confirm;
use crate::schedule::spawn_repeating;
use crate::state::{ActiveRecording, SessionState};
use crate::view::{self, Notice, PlanPreview, ProgressView, SessionView};

const MIN_USERNAME_LEN: usize = 3;

/// Why the poll loop stopped a recording on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopCause {
    /// Elapsed time reached the requested total.
    DurationReached,
    /// The backend reported the session as no longer recording.
    BackendInactive,
}

/// Published from the status poll, outside any user action.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Progress(ProgressView),
    Finished { cause: StopCause, notice: Notice },
}

/// Session controller over `{state, api client}`. Clones share state.
#[derive(Debug, Clone)]
pub struct SessionController {
    api: ApiClient,
    state: Arc<Mutex<SessionState>>,
    events: mpsc::UnboundedSender<SessionEvent>,
    poll_interval: Duration,
}

impl SessionController {
    /// Returns the controller and the stream of poll events.
    pub fn new(
        api: ApiClient,
        poll_interval: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let controller = Self {
            api,
            state: Arc::default(),
            events,
            poll_interval,
        };
        (controller, rx)
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn emit(&self, event: SessionEvent) {
        // Nobody listening is fine; the state still reflects the outcome.
        self.events.send(event).ok();
    }

    pub fn view(&self) -> SessionView {
        view::render_session(&self.state())
    }

    pub fn current_user(&self) -> Option<String> {
        self.state().current_user.clone()
    }

    pub fn is_recording(&self) -> bool {
        self.state().is_recording()
    }

    pub fn is_polling(&self) -> bool {
        self.state().is_polling()
    }

    /// Expected chunks and minutes for a prospective start.
    pub fn plan(&self, total_secs: i64, chunk_secs: i64) -> PlanPreview {
        view::preview_plan(total_secs, chunk_secs)
    }

    // ── users ────────────────────────────────────────────────────────

    pub async fn register(&self, username: &str, email: Option<&str>) -> Result<Notice, ActionError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ActionError::invalid("Please enter a username"));
        }
        if username.chars().count() < MIN_USERNAME_LEN {
            return Err(ActionError::invalid(format!(
                "Username must be at least {MIN_USERNAME_LEN} characters"
            )));
        }
        let email = email.map(str::trim).filter(|e| !e.is_empty());

        let request = RegisterRequest {
            username: username.to_string(),
            email: email.map(str::to_string),
        };
        self.api.register(&request).await.map_err(|e| {
            error!("Error registering user {username}: {e}");
            ActionError::request(Action::Register, e)
        })?;

        info!("Registered user {username}");
        Ok(Notice::success(
            "User registered successfully! You can now login.",
        ))
    }

    pub async fn login(&self, username: &str) -> Result<Notice, ActionError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ActionError::invalid("Please enter your username"));
        }

        self.api.login(username).await.map_err(|e| {
            error!("Error logging in {username}: {e}");
            ActionError::request(Action::Login, e)
        })?;

        self.state().current_user = Some(username.to_string());
        info!("Logged in as {username}");
        Ok(Notice::success(format!("Welcome {username}!")))
    }

    /// Forget the current user after confirmation. `None` if declined.
    ///
    /// A recording still running on the backend is left alone; logging in
    /// again allows stopping it.
    pub async fn logout<C: Confirm>(&self, confirm: &mut C) -> Option<Notice> {
        if !confirm.confirm("Are you sure you want to logout?").await {
            return None;
        }

        let mut state = self.state();
        if let Some(user) = state.current_user.take() {
            info!("Logged out {user}");
        }
        state.clear_recording();
        Some(Notice::success("You have been logged out"))
    }

    // ── recording ────────────────────────────────────────────────────

    pub async fn start_recording(
        &self,
        total_secs: i64,
        chunk_secs: i64,
    ) -> Result<Notice, ActionError> {
        let (username, plan) = self.validate_start(total_secs, chunk_secs)?;

        let request = StartRecordingRequest {
            username: username.clone(),
            total_duration_seconds: plan.total_secs,
            chunk_duration_seconds: plan.chunk_secs,
        };
        self.api.start_recording(&request).await.map_err(|e| {
            error!("Error starting recording for {username}: {e}");
            ActionError::request(Action::StartRecording, e)
        })?;

        {
            let mut state = self.state();
            state.clear_recording();
            state.recording = Some(ActiveRecording {
                plan,
                started_at: Local::now(),
            });
        }
        self.start_polling();

        info!(
            "Recording started for {username} ({}s in {}s chunks, {} expected)",
            plan.total_secs,
            plan.chunk_secs,
            plan.expected_chunks()
        );
        Ok(Notice::success("Recording started!"))
    }

    fn validate_start(
        &self,
        total_secs: i64,
        chunk_secs: i64,
    ) -> Result<(String, RecordingPlan), ActionError> {
        let state = self.state();
        let username = state
            .current_user
            .clone()
            .ok_or_else(|| ActionError::invalid("Please login first"))?;
        if total_secs <= 0 {
            return Err(ActionError::invalid("Please enter a valid duration"));
        }
        let plan = RecordingPlan::new(total_secs, chunk_secs)
            .ok_or_else(|| ActionError::invalid("Please enter a valid chunk duration"))?;
        if state.is_recording() {
            return Err(ActionError::invalid("Recording already in progress"));
        }
        Ok((username, plan))
    }

    pub async fn stop_recording(&self) -> Result<Notice, ActionError> {
        let username = self.begin_stop()?;

        match self.api.stop_recording(&username).await {
            Ok(resp) => {
                self.state().clear_recording();
                info!(
                    "Recording stopped for {username}: {} chunk(s)",
                    resp.total_chunks
                );
                Ok(Notice::success(format!(
                    "Recording stopped! Total chunks: {}",
                    resp.total_chunks
                )))
            }
            Err(e) => {
                self.state().stopping = false;
                error!("Error stopping recording for {username}: {e}");
                Err(ActionError::request(Action::StopRecording, e))
            }
        }
    }

    /// Claim the stop latch; only one stop request is in flight at a time.
    fn begin_stop(&self) -> Result<String, ActionError> {
        let mut state = self.state();
        let username = state
            .current_user
            .clone()
            .ok_or_else(|| ActionError::invalid("No active recording"))?;
        if state.stopping {
            return Err(ActionError::invalid("Recording is already stopping"));
        }
        state.stopping = true;
        Ok(username)
    }

    // ── status poll ──────────────────────────────────────────────────

    fn start_polling(&self) {
        let this = self.clone();
        let handle = spawn_repeating("status-poll", self.poll_interval, move || {
            let this = this.clone();
            async move { this.poll_tick().await }
        });
        if let Some(old) = self.state().poll.replace(handle) {
            old.stop();
        }
    }

    /// One status poll. Failed fetches are skipped until the next tick.
    pub async fn poll_tick(&self) {
        let Some((username, recording)) = self.poll_target() else {
            return;
        };

        let status = match self.api.recording_status(&username).await {
            Ok(status) => status,
            Err(e) => {
                debug!("Status poll for {username} failed, skipping tick: {e}");
                return;
            }
        };

        // The recording may have been stopped or replaced while the fetch
        // was in flight.
        if !self.still_watching(&recording) {
            debug!("Discarding stale status for {username}");
            return;
        }

        let plan = recording.plan;
        if !status.is_recording {
            self.auto_stop(StopCause::BackendInactive).await;
            return;
        }

        let progress = ProgressView::from_status(&status, Some(&plan));
        debug!(
            "{username}: {} / {} ({:.0}%), {} chunk(s)",
            progress.elapsed, progress.total, progress.percent, progress.chunks_so_far
        );
        if self.record_progress(&progress) {
            self.emit(SessionEvent::Progress(progress));
        }

        if status.elapsed_seconds >= status.total_duration_seconds as f64 {
            self.auto_stop(StopCause::DurationReached).await;
        }
    }

    /// User and recording to poll for, or `None` (and the poll stopped)
    /// when there is nothing to watch.
    fn poll_target(&self) -> Option<(String, ActiveRecording)> {
        let mut state = self.state();
        let target = match (&state.current_user, &state.recording) {
            (Some(user), Some(recording)) => Some((user.clone(), recording.clone())),
            _ => None,
        };
        if target.is_none() {
            if let Some(poll) = state.poll.take() {
                poll.stop();
            }
        }
        target
    }

    /// True while `recording` is still the active one and no stop is
    /// in flight.
    fn still_watching(&self, recording: &ActiveRecording) -> bool {
        let state = self.state();
        !state.stopping && state.recording.as_ref() == Some(recording)
    }

    fn record_progress(&self, progress: &ProgressView) -> bool {
        let mut state = self.state();
        if !state.is_recording() {
            return false;
        }
        state.last_progress = Some(progress.clone());
        true
    }

    /// Stop on behalf of the poll. Whatever the backend answers, the local
    /// recording ends here so the stop is never repeated by later ticks.
    async fn auto_stop(&self, cause: StopCause) {
        info!(?cause, "Stopping recording automatically");
        let notice = match self.stop_recording().await {
            Ok(notice) => notice,
            Err(ActionError::Invalid(reason)) => {
                debug!("Automatic stop skipped: {reason}");
                return;
            }
            Err(e) => {
                warn!("Automatic stop failed: {e}");
                self.state().clear_recording();
                Notice::error(e.to_string())
            }
        };
        self.emit(SessionEvent::Finished { cause, notice });
    }
}
