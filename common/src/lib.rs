//! Shared types for the vidrec console: configuration, backend wire
//! protocol, recording plans and display formatting.

pub mod config;
pub mod format;
pub mod plan;
pub mod protocol;
