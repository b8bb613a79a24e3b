//! Console client for the video-recording session manager.
//!
//! Two controllers, each owning its state and an [`api::ApiClient`]:
//! [`session::SessionController`] (login and the recording lifecycle) and
//! [`dashboard::DashboardController`] (recorded chunks). Rendering lives in
//! [`view`] as pure functions of controller state.

pub mod api;
pub mod dashboard;
pub mod error;
pub mod prompt;
pub mod schedule;
pub mod session;
pub mod state;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;
