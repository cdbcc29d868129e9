//! Driven port for the push messaging backend.

use async_trait::async_trait;

use crate::domain::{MessageId, PushMessage};

use super::define_port_error;

define_port_error! {
    /// Errors raised by push messaging adapters.
    pub enum PushMessengerError {
        /// The token is no longer registered with the messaging backend.
        Unregistered { message: String } =>
            "push token is not registered: {message}",
        /// The backend rejected the token as malformed.
        InvalidToken { message: String } =>
            "push token is invalid: {message}",
        /// The backend could not be reached or timed out.
        Unavailable { message: String } =>
            "push messaging backend unavailable: {message}",
        /// The backend refused the message for another reason.
        Rejected { message: String } =>
            "push message rejected: {message}",
    }
}

impl PushMessengerError {
    /// Whether the failure means the stored token should be discarded.
    pub const fn is_stale_token(&self) -> bool {
        matches!(self, Self::Unregistered { .. } | Self::InvalidToken { .. })
    }
}

/// Port for delivering push messages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PushMessenger: Send + Sync {
    /// Deliver one message and return the backend's message identifier.
    async fn send(&self, message: &PushMessage) -> Result<MessageId, PushMessengerError>;
}
