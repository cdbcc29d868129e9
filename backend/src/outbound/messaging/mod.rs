//! Push messaging adapters.

mod dto;
mod fcm;

use async_trait::async_trait;

pub use fcm::{DEFAULT_FCM_ENDPOINT, FcmPushMessenger, FcmSettings};

use crate::domain::ports::{PushMessenger, PushMessengerError};
use crate::domain::{MessageId, PushMessage};

/// Messenger used when no messaging credentials are configured; every send
/// fails as rejected.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredPushMessenger;

#[async_trait]
impl PushMessenger for UnconfiguredPushMessenger {
    async fn send(&self, _message: &PushMessage) -> Result<MessageId, PushMessengerError> {
        Err(PushMessengerError::rejected(
            "push messaging is not configured",
        ))
    }
}
