//! HTTP protocol types for the recording backend API.
//!
//! Requests are serialised by the console; responses are deserialised
//! leniently (missing optional fields default, unknown fields ignored).

use serde::{Deserialize, Serialize};

// ─── Requests ────────────────────────────────────────────────────────────────

/// `POST /api/users/register`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegisterRequest {
    pub username: String,
    /// Sent as `null` when absent.
    pub email: Option<String>,
}

/// `POST /api/users/login` and `POST /api/stop-recording`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UsernameRequest {
    pub username: String,
}

/// `POST /api/start-recording`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StartRecordingRequest {
    pub username: String,
    pub total_duration_seconds: u64,
    pub chunk_duration_seconds: u64,
}

// ─── Responses ───────────────────────────────────────────────────────────────

/// Error payload returned with non-2xx statuses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Generic acknowledgement (`{"message": ...}`); every field optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
}

/// `POST /api/stop-recording` success body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopRecordingResponse {
    #[serde(default)]
    pub total_chunks: u64,
}

/// `GET /api/recording-status/{username}`
///
/// When no session exists the backend sends only `username` and
/// `is_recording: false`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RecordingStatus {
    #[serde(default)]
    pub username: Option<String>,
    pub is_recording: bool,
    #[serde(default)]
    pub elapsed_seconds: f64,
    #[serde(default)]
    pub total_duration_seconds: u64,
    #[serde(default)]
    pub chunk_duration_seconds: Option<u64>,
    #[serde(default)]
    pub total_chunks_so_far: u64,
}

/// One recorded video chunk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoChunk {
    pub id: i64,
    pub file_name: String,
    pub user_name: String,
    /// ISO-8601, with or without offset.
    #[serde(alias = "start_time")]
    pub record_start_time: String,
    #[serde(alias = "end_time")]
    pub record_end_time: String,
    /// Requested duration of the chunk, seconds.
    #[serde(default)]
    pub duration_seconds: u64,
    #[serde(default)]
    pub chunk_duration_seconds: u64,
    #[serde(default)]
    pub created_at: String,

    // Sent by the backend but not shown by the dashboard.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clip_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

/// `GET /api/videos`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoList {
    #[serde(default)]
    pub chunks: Vec<VideoChunk>,
}

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserRecord {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// `GET /api/users`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserList {
    #[serde(default)]
    pub users: Vec<UserRecord>,
}

/// `GET /api/health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_accepts_backend_field_names() {
        // Shape produced by the backend's VideoChunk.to_dict().
        let json = r#"{
            "id": 7,
            "clip_id": 2,
            "user_id": 1,
            "user_name": "alice",
            "recording_date": "2024-05-01T10:00:00",
            "file_name": "alice_clip2.mp4",
            "file_path": "recordings/alice_clip2.mp4",
            "start_time": "2024-05-01T10:03:00.250000",
            "end_time": "2024-05-01T10:06:00.250000",
            "duration_seconds": 180,
            "chunk_duration_seconds": 180,
            "created_at": "2024-05-01T10:06:01"
        }"#;
        let chunk: VideoChunk = serde_json::from_str(json).unwrap();
        assert_eq!(chunk.id, 7);
        assert_eq!(chunk.record_start_time, "2024-05-01T10:03:00.250000");
        assert_eq!(chunk.record_end_time, "2024-05-01T10:06:00.250000");
        assert_eq!(chunk.clip_id, Some(2));
    }

    #[test]
    fn test_chunk_accepts_record_prefixed_names() {
        let json = r#"{
            "id": 1, "file_name": "a.mp4", "user_name": "bob",
            "record_start_time": "2024-05-01T10:00:00",
            "record_end_time": "2024-05-01T10:01:00",
            "duration_seconds": 60, "chunk_duration_seconds": 30,
            "created_at": "2024-05-01T10:01:00"
        }"#;
        let chunk: VideoChunk = serde_json::from_str(json).unwrap();
        assert_eq!(chunk.user_name, "bob");
        assert_eq!(chunk.record_end_time, "2024-05-01T10:01:00");
        assert!(chunk.file_path.is_none());
    }

    #[test]
    fn test_idle_status_defaults() {
        let status: RecordingStatus =
            serde_json::from_str(r#"{"username": "alice", "is_recording": false}"#).unwrap();
        assert!(!status.is_recording);
        assert_eq!(status.elapsed_seconds, 0.0);
        assert_eq!(status.total_chunks_so_far, 0);
    }

    #[test]
    fn test_register_sends_null_email() {
        let body = serde_json::to_value(RegisterRequest {
            username: "alice".into(),
            email: None,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"username": "alice", "email": null}));
    }
}
