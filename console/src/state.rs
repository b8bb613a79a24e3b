//! Controller-owned application state.
//!
//! Plain data; controllers wrap each in `Arc<Mutex<_>>` and the view
//! module renders them.

use chrono::{DateTime, Local};

use vidrec_common::plan::RecordingPlan;
use vidrec_common::protocol::{UserRecord, VideoChunk};

use crate::schedule::TaskHandle;
use crate::view::ProgressView;

/// A recording this client started and has not yet seen stop.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveRecording {
    pub plan: RecordingPlan,
    pub started_at: DateTime<Local>,
}

#[derive(Debug, Default)]
pub struct SessionState {
    pub current_user: Option<String>,
    pub recording: Option<ActiveRecording>,
    /// Set while a stop request is in flight.
    pub(crate) stopping: bool,
    pub(crate) poll: Option<TaskHandle>,
    pub last_progress: Option<ProgressView>,
}

impl SessionState {
    pub fn is_recording(&self) -> bool {
        self.recording.is_some()
    }

    pub fn is_polling(&self) -> bool {
        self.poll.as_ref().is_some_and(|p| !p.is_stopped())
    }

    /// Back to idle: no recording, no poll task, no progress.
    pub(crate) fn clear_recording(&mut self) {
        self.recording = None;
        self.stopping = false;
        self.last_progress = None;
        if let Some(poll) = self.poll.take() {
            poll.stop();
        }
    }
}

#[derive(Debug, Default)]
pub struct DashboardState {
    /// Last successful `GET /api/videos`.
    pub videos: Vec<VideoChunk>,
    /// Last successful `GET /api/users`.
    pub users: Vec<UserRecord>,
    /// Username the list is filtered to.
    pub filter: Option<String>,
    pub(crate) refresh: Option<TaskHandle>,
}

impl DashboardState {
    /// Cached videos passing the active filter.
    pub fn visible(&self) -> Vec<&VideoChunk> {
        match &self.filter {
            Some(user) => self.videos.iter().filter(|v| &v.user_name == user).collect(),
            None => self.videos.iter().collect(),
        }
    }

    pub fn find(&self, id: i64) -> Option<&VideoChunk> {
        self.videos.iter().find(|v| v.id == id)
    }
}
