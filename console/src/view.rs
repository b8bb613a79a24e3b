//! View models: pure functions from controller state to what the console
//! shows. Nothing here performs I/O.

use std::collections::BTreeSet;

use vidrec_common::format::{
    format_date, format_hours_minutes, format_span, format_time, span_seconds,
};
use vidrec_common::plan::RecordingPlan;
use vidrec_common::protocol::{RecordingStatus, VideoChunk};

use crate::state::{DashboardState, SessionState};

// ─── Notices ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Error,
}

/// One line of feedback for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: Level,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: Level::Info,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            text: text.into(),
        }
    }
}

// ─── Session ─────────────────────────────────────────────────────────────────

/// Live progress of the recording, from one status response.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressView {
    pub elapsed: String,
    pub total: String,
    /// `elapsed / total * 100`, clamped to `[0, 100]`.
    pub percent: f64,
    pub chunks_so_far: u64,
    pub expected_chunks: Option<u64>,
}

impl ProgressView {
    pub fn from_status(status: &RecordingStatus, plan: Option<&RecordingPlan>) -> Self {
        let expected_chunks = status
            .chunk_duration_seconds
            .and_then(|chunk| RecordingPlan::new(status.total_duration_seconds as i64, chunk as i64))
            .or(plan.copied())
            .map(|p| p.expected_chunks());

        Self {
            elapsed: format_time(status.elapsed_seconds),
            total: format_time(status.total_duration_seconds as f64),
            percent: progress_percent(status.elapsed_seconds, status.total_duration_seconds),
            chunks_so_far: status.total_chunks_so_far,
            expected_chunks,
        }
    }
}

/// Share of the window elapsed, in percent, clamped to `[0, 100]`.
///
/// A zero-length window counts as complete once anything has elapsed.
pub fn progress_percent(elapsed_secs: f64, total_secs: u64) -> f64 {
    if !elapsed_secs.is_finite() || elapsed_secs <= 0.0 {
        return 0.0;
    }
    if total_secs == 0 {
        return 100.0;
    }
    (elapsed_secs / total_secs as f64 * 100.0).clamp(0.0, 100.0)
}

/// Expected chunks / minutes for a pending start, as the form previews it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanPreview {
    pub expected_chunks: u64,
    pub total_minutes: u64,
    pub total: String,
}

pub fn preview_plan(total_secs: i64, chunk_secs: i64) -> PlanPreview {
    match RecordingPlan::new(total_secs, chunk_secs) {
        Some(plan) => PlanPreview {
            expected_chunks: plan.expected_chunks(),
            total_minutes: plan.total_minutes(),
            total: format_time(plan.total_secs as f64),
        },
        None => PlanPreview {
            expected_chunks: 0,
            total_minutes: 0,
            total: format_time(0.0),
        },
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub current_user: Option<String>,
    /// Login / register forms.
    pub show_auth: bool,
    pub show_recording: bool,
    pub start_enabled: bool,
    pub stop_enabled: bool,
    /// Duration inputs are locked while recording.
    pub inputs_enabled: bool,
    pub progress: Option<ProgressView>,
}

pub fn render_session(state: &SessionState) -> SessionView {
    let logged_in = state.current_user.is_some();
    let recording = state.is_recording();
    SessionView {
        current_user: state.current_user.clone(),
        show_auth: !logged_in,
        show_recording: logged_in,
        start_enabled: logged_in && !recording,
        stop_enabled: logged_in && recording,
        inputs_enabled: !recording,
        progress: if recording {
            state.last_progress.clone()
        } else {
            None
        },
    }
}

// ─── Dashboard ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoCard {
    pub id: i64,
    pub file_name: String,
    pub user_name: String,
    /// Recorded length, `Xm Ys`.
    pub duration: String,
    /// Requested duration, e.g. `180s`.
    pub requested: String,
    pub chunk_size: String,
    pub start: String,
    pub end: String,
    pub recorded: String,
}

impl VideoCard {
    pub fn from_chunk(chunk: &VideoChunk) -> Self {
        Self {
            id: chunk.id,
            file_name: chunk.file_name.clone(),
            user_name: chunk.user_name.clone(),
            duration: recorded_length(chunk),
            requested: format!("{}s", chunk.duration_seconds),
            chunk_size: format!("{}s", chunk.chunk_duration_seconds),
            start: format_date(&chunk.record_start_time),
            end: format_date(&chunk.record_end_time),
            recorded: format_date(&chunk.created_at),
        }
    }
}

fn recorded_length(chunk: &VideoChunk) -> String {
    span_seconds(&chunk.record_start_time, &chunk.record_end_time)
        .map(format_span)
        .unwrap_or_else(|| "-".to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statistics {
    pub total_chunks: usize,
    pub total_users: usize,
    pub total_duration: String,
}

/// Aggregates over `videos`: count, distinct users, summed recorded time.
pub fn statistics(videos: &[VideoChunk]) -> Statistics {
    if videos.is_empty() {
        return Statistics {
            total_chunks: 0,
            total_users: 0,
            total_duration: "0h".to_string(),
        };
    }

    let users: BTreeSet<&str> = videos.iter().map(|v| v.user_name.as_str()).collect();
    let seconds: f64 = videos
        .iter()
        .filter_map(|v| span_seconds(&v.record_start_time, &v.record_end_time))
        .sum();

    Statistics {
        total_chunks: videos.len(),
        total_users: users.len(),
        total_duration: format_hours_minutes(seconds),
    }
}

/// One entry of the user filter; `value` empty means "all users".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardView {
    pub cards: Vec<VideoCard>,
    /// Shown instead of cards when the visible list is empty.
    pub empty_message: Option<String>,
    pub stats: Statistics,
    pub filter_options: Vec<FilterOption>,
}

pub fn render_dashboard(state: &DashboardState) -> DashboardView {
    let cards: Vec<VideoCard> = state
        .visible()
        .into_iter()
        .map(VideoCard::from_chunk)
        .collect();
    let empty_message = cards.is_empty().then(|| "No videos found".to_string());

    let selected = state.filter.as_deref().unwrap_or("");
    let mut filter_options = vec![FilterOption {
        value: String::new(),
        label: "All Users".to_string(),
        selected: selected.is_empty(),
    }];
    filter_options.extend(state.users.iter().map(|u| FilterOption {
        value: u.username.clone(),
        label: u.username.clone(),
        selected: u.username == selected,
    }));

    DashboardView {
        cards,
        empty_message,
        stats: statistics(&state.videos),
        filter_options,
    }
}

/// Player overlay for one chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackOverlay {
    pub title: String,
    pub stream_url: String,
    pub user_name: String,
    pub duration: String,
    pub requested: String,
    pub chunk_size: String,
    pub recorded: String,
}

impl PlaybackOverlay {
    pub fn new(chunk: &VideoChunk, stream_url: String) -> Self {
        Self {
            title: chunk.file_name.clone(),
            stream_url,
            user_name: chunk.user_name.clone(),
            duration: recorded_length(chunk),
            requested: format!("{}s", chunk.duration_seconds),
            chunk_size: format!("{}s", chunk.chunk_duration_seconds),
            recorded: format_date(&chunk.created_at),
        }
    }
}
