//! Push dispatch service implementing the [`PushDispatch`] driving port.
//!
//! The only corrective side effect in the system lives here: when the
//! messaging backend reports a token as unregistered or invalid, the token
//! is removed from the student and notifications are switched off.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::domain::ports::{DocumentStore, PushDispatch, PushMessenger, PushMessengerError};
use crate::domain::service_support::map_store_error;
use crate::domain::{
    DocumentId, DocumentPath, Error, PushMessage, PushReceipt, PushRequest, Student,
    clear_token_updates, students_collection,
};

/// Push dispatch over the student store and a messaging backend.
pub struct PushService<S: ?Sized, M: ?Sized> {
    store: Arc<S>,
    messenger: Arc<M>,
}

impl<S: ?Sized, M: ?Sized> PushService<S, M> {
    /// Create the service.
    pub fn new(store: Arc<S>, messenger: Arc<M>) -> Self {
        Self { store, messenger }
    }
}

impl<S, M> PushService<S, M>
where
    S: DocumentStore + ?Sized,
    M: PushMessenger + ?Sized,
{
    async fn discard_token(&self, path: &DocumentPath, cause: &PushMessengerError) {
        match self.store.update(path, &clear_token_updates()).await {
            Ok(()) => info!(student = %path, reason = %cause, "cleared stale push token"),
            Err(err) => warn!(
                student = %path,
                reason = %cause,
                error = %err,
                "failed to clear stale push token"
            ),
        }
    }
}

#[async_trait]
impl<S, M> PushDispatch for PushService<S, M>
where
    S: DocumentStore + ?Sized,
    M: PushMessenger + ?Sized,
{
    async fn send(&self, request: PushRequest) -> Result<PushReceipt, Error> {
        let valid = request.validate()?;
        let not_found = || Error::user_not_found(format!("user {} not found", valid.user_id));

        let student_id = DocumentId::new(valid.user_id.as_str()).map_err(|_| not_found())?;
        let path = students_collection().doc(student_id);
        let document = self
            .store
            .get(&path)
            .await
            .map_err(map_store_error)?
            .ok_or_else(not_found)?;
        let student = Student::from_document(&document);

        if !student.push_notifications_enabled {
            return Err(Error::notifications_disabled(format!(
                "user {} has push notifications disabled",
                valid.user_id
            )));
        }
        let token = valid
            .fcm_token
            .or(student.fcm_token)
            .ok_or_else(|| Error::invalid_token("no push token registered for user"))?;

        let message = PushMessage {
            token,
            title: valid.title,
            body: valid.body,
            data: valid.data,
        };
        match self.messenger.send(&message).await {
            Ok(message_id) => {
                info!(student = %path, %message_id, "push notification sent");
                Ok(PushReceipt { message_id })
            }
            Err(cause) if cause.is_stale_token() => {
                self.discard_token(&path, &cause).await;
                Err(Error::token_unregistered(
                    "push token is no longer registered; notifications disabled",
                ))
            }
            Err(cause) => {
                error!(student = %path, error = %cause, "push notification failed");
                Err(Error::internal(format!("failed to send notification: {cause}")))
            }
        }
    }
}
