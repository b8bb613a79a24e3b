//! Controller-level errors and the user-facing text for each.

use crate::api::ApiError;

/// User actions that talk to the backend, for their generic failure text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Register,
    Login,
    StartRecording,
    StopRecording,
    LoadVideos,
    LoadUsers,
    DownloadVideo,
    DeleteVideo,
}

impl Action {
    /// Shown when the call failed for any reason other than a
    /// backend-reported error.
    pub fn failure_text(self) -> &'static str {
        match self {
            Action::Register => "Failed to register user",
            Action::Login => "Failed to login",
            Action::StartRecording => "Failed to start recording",
            Action::StopRecording => "Failed to stop recording",
            Action::LoadVideos => "Failed to load videos",
            Action::LoadUsers => "Failed to load users",
            Action::DownloadVideo => "Failed to download video",
            Action::DeleteVideo => "Failed to delete video",
        }
    }
}

/// Why a controller action did not complete.
///
/// `Display` is the exact message to show the user.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    /// Rejected locally; no request was sent.
    #[error("{0}")]
    Invalid(String),

    #[error("{}", request_message(.action, .source))]
    Request {
        action: Action,
        #[source]
        source: ApiError,
    },
}

impl ActionError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ActionError::Invalid(message.into())
    }

    pub fn request(action: Action, source: ApiError) -> Self {
        ActionError::Request { action, source }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ActionError::Invalid(_))
    }
}

fn request_message(action: &Action, source: &ApiError) -> String {
    match source.backend_message() {
        Some(message) => format!("Error: {message}"),
        None => action.failure_text().to_string(),
    }
}
