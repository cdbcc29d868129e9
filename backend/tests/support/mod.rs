//! Shared harness for HTTP integration tests.
//!
//! Builds the full `/api/v1` surface over the in-memory adapters so tests
//! drive real services through real Actix handlers. The push messenger is a
//! recording double whose outcome each test chooses.

use std::sync::{Arc, Mutex};

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use async_trait::async_trait;
use classdesk::Trace;
use classdesk::domain::ports::{PushMessenger, PushMessengerError};
use classdesk::domain::{
    LibraryService, MessageId, ProgressService, PushMessage, PushService, RecommendationsService,
    ScheduleService, StudentService,
};
use classdesk::inbound::http::configure;
use classdesk::inbound::http::state::{HttpState, HttpStatePorts};
use classdesk::outbound::blob::BlobUrls;
use classdesk::outbound::memory::{InMemoryBlobStore, InMemoryDocumentStore};
use mockable::DefaultClock;
use url::Url;

/// Base URL blobs are published under.
pub const PUBLIC_BASE: &str = "http://localhost:8080/";

/// What the recording messenger answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Accept the message.
    Accept,
    /// Report the token as no longer registered.
    Unregistered,
}

/// Push messenger double recording every message it is handed.
pub struct RecordingMessenger {
    delivery: Delivery,
    sent: Mutex<Vec<PushMessage>>,
}

impl RecordingMessenger {
    pub fn new(delivery: Delivery) -> Self {
        Self {
            delivery,
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Messages received so far.
    pub fn sent(&self) -> Vec<PushMessage> {
        self.sent.lock().expect("messenger lock").clone()
    }
}

#[async_trait]
impl PushMessenger for RecordingMessenger {
    async fn send(&self, message: &PushMessage) -> Result<MessageId, PushMessengerError> {
        let mut sent = self.sent.lock().expect("messenger lock");
        sent.push(message.clone());
        match self.delivery {
            Delivery::Accept => Ok(MessageId(format!("projects/classdesk/messages/{}", sent.len()))),
            Delivery::Unregistered => Err(PushMessengerError::unregistered(
                "Requested entity was not found.",
            )),
        }
    }
}

/// HTTP state wired over fresh in-memory stores.
pub fn http_state(messenger: Arc<RecordingMessenger>) -> HttpState {
    let store = Arc::new(InMemoryDocumentStore::new());
    let urls = BlobUrls::new(Url::parse(PUBLIC_BASE).expect("base url")).expect("blob urls");
    let blobs = Arc::new(InMemoryBlobStore::new(urls));
    let ports = HttpStatePorts {
        library: Arc::new(LibraryService::new(store.clone(), blobs)),
        progress: Arc::new(ProgressService::new(store.clone(), Arc::new(DefaultClock))),
        students: Arc::new(StudentService::new(store.clone())),
        schedule: Arc::new(ScheduleService::new(store.clone())),
        recommendations: Arc::new(RecommendationsService::new(store.clone())),
        push: Arc::new(PushService::new(store, messenger)),
    };
    HttpState::new(ports, "https://teacher.example.test".to_owned())
}

/// Application serving the whole API over `state`.
pub fn app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(Trace)
        .configure(configure)
}
