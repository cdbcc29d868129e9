//! Server configuration resolved from [`AppSettings`].

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use classdesk::outbound::persistence::DbPool;
use classdesk::settings::{AppSettings, SettingsError};
use url::Url;
use zeroize::Zeroizing;

/// FCM credentials lifted out of the settings.
pub struct FcmConfig {
    pub(crate) project_id: String,
    pub(crate) access_token: Zeroizing<String>,
    pub(crate) timeout: Duration,
}

/// Everything needed to build adapters and bind the listener.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) public_base_url: Url,
    pub(crate) blob_root: Option<PathBuf>,
    pub(crate) fcm: Option<FcmConfig>,
    pub(crate) cors_allowed_origin: String,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    /// Resolve settings into a configuration without a database pool.
    ///
    /// # Errors
    ///
    /// Propagates [`SettingsError`] for malformed addresses or URLs.
    pub fn from_settings(settings: &AppSettings) -> Result<Self, SettingsError> {
        let fcm = settings
            .fcm_credentials()
            .map(|(project_id, access_token)| FcmConfig {
                project_id: project_id.to_owned(),
                access_token: Zeroizing::new(access_token.to_owned()),
                timeout: settings.fcm_timeout(),
            });
        Ok(Self {
            bind_addr: settings.bind_addr()?,
            public_base_url: settings.public_base_url()?,
            blob_root: settings.blob_root.clone(),
            fcm,
            cors_allowed_origin: settings.cors_allowed_origin().to_owned(),
            db_pool: None,
        })
    }

    /// Attach a database pool; the document store then uses PostgreSQL.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
