//! Adapter selection and HTTP state assembly.
//!
//! Each driven port picks its production adapter when configured and an
//! in-process one otherwise:
//!
//! | Port | Configured | Fallback |
//! | --- | --- | --- |
//! | `DocumentStore` | PostgreSQL (`database_url`) | in-memory |
//! | `BlobStore` | filesystem (`blob_root`) | in-memory |
//! | `PushMessenger` | FCM (`fcm_*`) | always rejects |

use std::sync::Arc;

use classdesk::domain::ports::{BlobStore, DocumentStore, PushMessenger};
use classdesk::domain::{
    LibraryService, ProgressService, PushService, RecommendationsService, ScheduleService,
    StudentService,
};
use classdesk::inbound::http::state::{HttpState, HttpStatePorts};
use classdesk::outbound::blob::{BlobUrls, FilesystemBlobStore};
use classdesk::outbound::memory::{InMemoryBlobStore, InMemoryDocumentStore};
use classdesk::outbound::messaging::{
    DEFAULT_FCM_ENDPOINT, FcmPushMessenger, FcmSettings, UnconfiguredPushMessenger,
};
use classdesk::outbound::persistence::DieselDocumentStore;
use color_eyre::eyre::{Result, WrapErr};
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};
use url::Url;

use super::ServerConfig;

fn build_document_store(config: &ServerConfig) -> Arc<dyn DocumentStore> {
    match &config.db_pool {
        Some(pool) => Arc::new(DieselDocumentStore::new(pool.clone())),
        None => {
            warn!("no database configured; documents are kept in memory");
            Arc::new(InMemoryDocumentStore::new())
        }
    }
}

fn build_blob_store(config: &ServerConfig) -> Result<Arc<dyn BlobStore>> {
    let urls = BlobUrls::new(config.public_base_url.clone())
        .wrap_err("public base URL cannot carry blob paths")?;
    match &config.blob_root {
        Some(root) => {
            let store = FilesystemBlobStore::open(root, urls)
                .wrap_err_with(|| format!("open blob root {}", root.display()))?;
            info!(root = %root.display(), "serving blobs from filesystem");
            Ok(Arc::new(store))
        }
        None => {
            warn!("no blob root configured; uploads are kept in memory");
            Ok(Arc::new(InMemoryBlobStore::new(urls)))
        }
    }
}

fn build_messenger(config: &ServerConfig) -> Result<Arc<dyn PushMessenger>> {
    let Some(fcm) = &config.fcm else {
        warn!("no messaging credentials configured; push sends will fail");
        return Ok(Arc::new(UnconfiguredPushMessenger));
    };
    let endpoint = Url::parse(DEFAULT_FCM_ENDPOINT).wrap_err("parse FCM endpoint")?;
    let messenger = FcmPushMessenger::new(FcmSettings {
        project_id: fcm.project_id.clone(),
        access_token: fcm.access_token.clone(),
        endpoint,
        timeout: fcm.timeout,
    })
    .wrap_err("build FCM messenger")?;
    Ok(Arc::new(messenger))
}

/// Build HTTP state from the configured adapters.
///
/// # Errors
///
/// Fails when the blob root cannot be opened or the messenger cannot be
/// constructed.
pub(super) fn build_http_state(config: &ServerConfig) -> Result<HttpState> {
    let store = build_document_store(config);
    let blobs = build_blob_store(config)?;
    let messenger = build_messenger(config)?;
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);

    let ports = HttpStatePorts {
        library: Arc::new(LibraryService::new(store.clone(), blobs)),
        progress: Arc::new(ProgressService::new(store.clone(), clock)),
        students: Arc::new(StudentService::new(store.clone())),
        schedule: Arc::new(ScheduleService::new(store.clone())),
        recommendations: Arc::new(RecommendationsService::new(store.clone())),
        push: Arc::new(PushService::new(store, messenger)),
    };
    Ok(HttpState::new(ports, config.cors_allowed_origin.clone()))
}
