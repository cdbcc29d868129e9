//! Driving port for sending push notifications to students.

use async_trait::async_trait;

use crate::domain::{Error, PushReceipt, PushRequest};

/// Driving port behind the push-send endpoint.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PushDispatch: Send + Sync {
    /// Validate, resolve the token and deliver one notification.
    ///
    /// A token the backend reports as unregistered or invalid is removed
    /// from the student and notifications are switched off before the
    /// `TOKEN_UNREGISTERED` error is returned.
    async fn send(&self, request: PushRequest) -> Result<PushReceipt, Error>;
}
