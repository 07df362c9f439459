//! Error types for the notification system.

use thiserror::Error;

/// Errors that can occur when talking to a notification channel.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// Notification service returned an error response
    #[error("Notification service error: {code} - {message}")]
    Service { code: String, message: String },

    /// Request never produced a service response
    #[error("Transport error: {0}")]
    Transport(String),

    /// Service response lacked a required field
    #[error("Response missing field: {0}")]
    MissingField(&'static str),
}
