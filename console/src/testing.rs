//! In-process fake of the recording backend, for tests.
//!
//! Serves the same routes and error shapes as the real backend from an
//! in-memory store on an ephemeral localhost port. Recording status is
//! scripted: tests move a session forward with [`FakeBackend::update_status`].

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{delete, get, post};
use axum::Router;
use chrono::NaiveDateTime;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use vidrec_common::protocol::{
    RecordingStatus, RegisterRequest, StartRecordingRequest, UserRecord, UsernameRequest,
    VideoChunk,
};

use crate::api::ApiClient;

#[derive(Default)]
pub(crate) struct Store {
    users: Vec<UserRecord>,
    videos: Vec<VideoChunk>,
    next_id: i64,
    statuses: HashMap<String, RecordingStatus>,
    stop_failure: Option<(StatusCode, String)>,
    status_delay: Option<Duration>,
    calls: HashMap<&'static str, usize>,
}

impl Store {
    fn hit(&mut self, route: &'static str) {
        *self.calls.entry(route).or_default() += 1;
    }
}

type Shared = Arc<Mutex<Store>>;
type Reply = (StatusCode, Json<Value>);

fn lock(store: &Shared) -> MutexGuard<'_, Store> {
    store.lock().unwrap_or_else(|e| e.into_inner())
}

fn error(status: StatusCode, message: impl Into<String>) -> Reply {
    (status, Json(json!({ "error": message.into() })))
}

pub(crate) struct FakeBackend {
    addr: SocketAddr,
    store: Shared,
}

impl FakeBackend {
    pub(crate) async fn spawn() -> Self {
        let store: Shared = Arc::default();
        let app = Router::new()
            .route("/api/health", get(health))
            .route("/api/users", get(list_users))
            .route("/api/users/register", post(register))
            .route("/api/users/login", post(login))
            .route("/api/start-recording", post(start_recording))
            .route("/api/stop-recording", post(stop_recording))
            .route("/api/recording-status/{username}", get(recording_status))
            .route("/api/videos", get(list_videos))
            .route("/api/video/{id}/download", get(download_video))
            .route("/api/delete-video/{id}", delete(delete_video))
            .with_state(store.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, store }
    }

    pub(crate) fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub(crate) fn client(&self) -> ApiClient {
        ApiClient::new(&self.base_url(), Duration::from_secs(5)).unwrap()
    }

    /// Number of requests served on `route` (handler name).
    pub(crate) fn calls(&self, route: &str) -> usize {
        lock(&self.store).calls.get(route).copied().unwrap_or(0)
    }

    pub(crate) fn total_calls(&self) -> usize {
        lock(&self.store).calls.values().sum()
    }

    pub(crate) fn add_user(&self, username: &str) {
        lock(&self.store).users.push(UserRecord {
            username: username.to_string(),
            email: None,
            id: None,
            created_at: None,
        });
    }

    /// Add a chunk recorded from 2024-05-01 10:00:00 for `secs` seconds.
    pub(crate) fn add_video(&self, user: &str, file_name: &str, secs: i64) -> i64 {
        let start = NaiveDateTime::parse_from_str("2024-05-01T10:00:00", "%Y-%m-%dT%H:%M:%S")
            .unwrap();
        let end = start + chrono::Duration::seconds(secs);
        let fmt = |t: NaiveDateTime| t.format("%Y-%m-%dT%H:%M:%S").to_string();

        let mut store = lock(&self.store);
        store.next_id += 1;
        let id = store.next_id;
        store.videos.push(VideoChunk {
            id,
            file_name: file_name.to_string(),
            user_name: user.to_string(),
            record_start_time: fmt(start),
            record_end_time: fmt(end),
            duration_seconds: secs.max(0) as u64,
            chunk_duration_seconds: 180,
            created_at: fmt(end),
            clip_id: Some(id),
            user_id: None,
            file_path: Some(format!("recordings/{file_name}")),
        });
        id
    }

    pub(crate) fn video_count(&self) -> usize {
        lock(&self.store).videos.len()
    }

    /// Mutate the scripted status of an existing session.
    pub(crate) fn update_status(&self, username: &str, f: impl FnOnce(&mut RecordingStatus)) {
        if let Some(status) = lock(&self.store).statuses.get_mut(username) {
            f(status);
        }
    }

    /// Make every subsequent stop-recording call fail with this error.
    pub(crate) fn fail_stops(&self, status: StatusCode, message: &str) {
        lock(&self.store).stop_failure = Some((status, message.to_string()));
    }

    /// Hold every recording-status reply for `delay` before answering.
    pub(crate) fn delay_status(&self, delay: Duration) {
        lock(&self.store).status_delay = Some(delay);
    }

    pub(crate) fn video_bytes(id: i64) -> Vec<u8> {
        format!("fake-mp4-{id}").into_bytes().repeat(64)
    }
}

// ── route handlers ───────────────────────────────────────────────────────

async fn health(State(store): State<Shared>) -> Reply {
    lock(&store).hit("health");
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

async fn list_users(State(store): State<Shared>) -> Reply {
    let mut store = lock(&store);
    store.hit("users");
    (
        StatusCode::OK,
        Json(json!({ "total_users": store.users.len(), "users": store.users })),
    )
}

async fn register(State(store): State<Shared>, Json(req): Json<RegisterRequest>) -> Reply {
    let mut store = lock(&store);
    store.hit("register");
    if req.username.is_empty() {
        return error(StatusCode::BAD_REQUEST, "username is required");
    }
    if req.username.len() < 3 {
        return error(StatusCode::BAD_REQUEST, "username must be at least 3 characters");
    }
    if store.users.iter().any(|u| u.username == req.username) {
        return error(StatusCode::CONFLICT, "User already exists");
    }
    let user = UserRecord {
        username: req.username,
        email: req.email,
        id: Some(store.users.len() as i64 + 1),
        created_at: None,
    };
    store.users.push(user.clone());
    (
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully", "user": user })),
    )
}

async fn login(State(store): State<Shared>, Json(req): Json<UsernameRequest>) -> Reply {
    let mut store = lock(&store);
    store.hit("login");
    if !store.users.iter().any(|u| u.username == req.username) {
        return error(StatusCode::NOT_FOUND, "User not found");
    }
    (
        StatusCode::OK,
        Json(json!({ "message": format!("Welcome {}!", req.username) })),
    )
}

async fn start_recording(
    State(store): State<Shared>,
    Json(req): Json<StartRecordingRequest>,
) -> Reply {
    let mut store = lock(&store);
    store.hit("start");
    if !store.users.iter().any(|u| u.username == req.username) {
        return error(StatusCode::NOT_FOUND, "User not found. Please register first.");
    }
    if req.total_duration_seconds < 60 {
        return error(
            StatusCode::BAD_REQUEST,
            "total_duration_seconds must be at least 60 seconds",
        );
    }
    if store
        .statuses
        .get(&req.username)
        .is_some_and(|s| s.is_recording)
    {
        return error(
            StatusCode::CONFLICT,
            format!("Recording already in progress for user {}", req.username),
        );
    }
    store.statuses.insert(
        req.username.clone(),
        RecordingStatus {
            username: Some(req.username.clone()),
            is_recording: true,
            elapsed_seconds: 0.0,
            total_duration_seconds: req.total_duration_seconds,
            chunk_duration_seconds: Some(req.chunk_duration_seconds),
            total_chunks_so_far: 0,
        },
    );
    (
        StatusCode::OK,
        Json(json!({ "message": format!("Recording started for user {}", req.username) })),
    )
}

async fn stop_recording(State(store): State<Shared>, Json(req): Json<UsernameRequest>) -> Reply {
    let mut store = lock(&store);
    store.hit("stop");
    if let Some((status, message)) = store.stop_failure.clone() {
        return error(status, message);
    }
    let Some(status) = store.statuses.get_mut(&req.username) else {
        return error(
            StatusCode::NOT_FOUND,
            format!("No active recording for user {}", req.username),
        );
    };
    status.is_recording = false;
    (
        StatusCode::OK,
        Json(json!({
            "message": format!("Recording stopped for user {}", req.username),
            "total_chunks": status.total_chunks_so_far,
        })),
    )
}

async fn recording_status(State(store): State<Shared>, Path(username): Path<String>) -> Reply {
    let delay = lock(&store).status_delay;
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    let mut store = lock(&store);
    store.hit("status");
    match store.statuses.get(&username) {
        Some(status) => (StatusCode::OK, Json(json!(status))),
        None => (
            StatusCode::OK,
            Json(json!({ "username": username, "is_recording": false })),
        ),
    }
}

async fn list_videos(State(store): State<Shared>) -> Reply {
    let mut store = lock(&store);
    store.hit("videos");
    // Same field names as the real backend's VideoChunk.to_dict().
    let chunks: Vec<Value> = store
        .videos
        .iter()
        .map(|v| {
            json!({
                "id": v.id,
                "clip_id": v.clip_id,
                "user_name": v.user_name,
                "file_name": v.file_name,
                "file_path": v.file_path,
                "start_time": v.record_start_time,
                "end_time": v.record_end_time,
                "duration_seconds": v.duration_seconds,
                "chunk_duration_seconds": v.chunk_duration_seconds,
                "created_at": v.created_at,
            })
        })
        .collect();
    (
        StatusCode::OK,
        Json(json!({ "total_chunks": chunks.len(), "chunks": chunks })),
    )
}

async fn download_video(State(store): State<Shared>, Path(id): Path<i64>) -> Response {
    let mut store = lock(&store);
    store.hit("download");
    if !store.videos.iter().any(|v| v.id == id) {
        return error(StatusCode::NOT_FOUND, "Video chunk not found").into_response();
    }
    (
        [(header::CONTENT_TYPE, "video/mp4")],
        FakeBackend::video_bytes(id),
    )
        .into_response()
}

async fn delete_video(State(store): State<Shared>, Path(id): Path<i64>) -> Reply {
    let mut store = lock(&store);
    store.hit("delete");
    let before = store.videos.len();
    store.videos.retain(|v| v.id != id);
    if store.videos.len() == before {
        return error(StatusCode::NOT_FOUND, "Video chunk not found");
    }
    (
        StatusCode::OK,
        Json(json!({ "message": "Video chunk deleted successfully" })),
    )
}
