//! Runtime settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `CLASSDESK_*` environment variables or a
//! config file. Unset optional adapters fall back to in-process
//! implementations so the server runs without external services.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:8080/";
const DEFAULT_FCM_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CORS_ORIGIN: &str = "*";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// Invalid setting values.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("bind_addr `{value}` is not a socket address: {source}")]
    BindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("public_base_url `{value}` is not a URL: {source}")]
    PublicBaseUrl {
        value: String,
        source: url::ParseError,
    },
}

/// Server settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CLASSDESK")]
pub struct AppSettings {
    /// Listen address; defaults to `0.0.0.0:8080`.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL for the document store. In-memory when unset.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// Directory holding uploaded files. In-memory when unset.
    pub blob_root: Option<PathBuf>,
    /// Externally visible base URL used to build blob URLs.
    pub public_base_url: Option<String>,
    /// FCM project for push delivery.
    pub fcm_project_id: Option<String>,
    /// OAuth access token for the FCM HTTP v1 API.
    pub fcm_access_token: Option<String>,
    /// Messaging request timeout in seconds.
    pub fcm_timeout_secs: Option<u64>,
    /// `Access-Control-Allow-Origin` for the push endpoint.
    pub cors_allowed_origin: Option<String>,
}

impl AppSettings {
    /// Resolved listen address.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::BindAddr`] for an unparsable address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    /// Resolved public base URL, always ending in `/`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::PublicBaseUrl`] for an unparsable URL.
    pub fn public_base_url(&self) -> Result<Url, SettingsError> {
        let value = self
            .public_base_url
            .as_deref()
            .unwrap_or(DEFAULT_PUBLIC_BASE_URL);
        let normalised = if value.ends_with('/') {
            value.to_owned()
        } else {
            format!("{value}/")
        };
        Url::parse(&normalised).map_err(|source| SettingsError::PublicBaseUrl {
            value: value.to_owned(),
            source,
        })
    }

    /// Project id and access token when both are configured.
    pub fn fcm_credentials(&self) -> Option<(&str, &str)> {
        match (&self.fcm_project_id, &self.fcm_access_token) {
            (Some(project), Some(token)) if !project.is_empty() && !token.is_empty() => {
                Some((project.as_str(), token.as_str()))
            }
            _ => None,
        }
    }

    pub fn fcm_timeout(&self) -> Duration {
        Duration::from_secs(self.fcm_timeout_secs.unwrap_or(DEFAULT_FCM_TIMEOUT_SECS))
    }

    /// Pool size, never below one.
    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
            .max(1)
    }

    pub fn cors_allowed_origin(&self) -> &str {
        self.cors_allowed_origin
            .as_deref()
            .unwrap_or(DEFAULT_CORS_ORIGIN)
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    use super::*;

    const KEYS: [&str; 9] = [
        "CLASSDESK_BIND_ADDR",
        "CLASSDESK_DATABASE_URL",
        "CLASSDESK_DB_MAX_CONNECTIONS",
        "CLASSDESK_BLOB_ROOT",
        "CLASSDESK_PUBLIC_BASE_URL",
        "CLASSDESK_FCM_PROJECT_ID",
        "CLASSDESK_FCM_ACCESS_TOKEN",
        "CLASSDESK_FCM_TIMEOUT_SECS",
        "CLASSDESK_CORS_ALLOWED_ORIGIN",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("classdesk")]).expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(KEYS.map(|key| (key, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("default address"),
            DEFAULT_BIND_ADDR.parse::<SocketAddr>().expect("literal")
        );
        assert_eq!(
            settings.public_base_url().expect("default url").as_str(),
            DEFAULT_PUBLIC_BASE_URL
        );
        assert!(settings.database_url.is_none());
        assert!(settings.fcm_credentials().is_none());
        assert_eq!(settings.fcm_timeout(), Duration::from_secs(10));
        assert_eq!(settings.db_max_connections(), 10);
        assert_eq!(settings.cors_allowed_origin(), "*");
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let mut vars = KEYS.map(|key| (key, None::<String>));
        vars[0].1 = Some("127.0.0.1:9000".to_owned());
        vars[2].1 = Some("0".to_owned());
        vars[4].1 = Some("https://cdn.example.org/classdesk".to_owned());
        vars[5].1 = Some("classdesk-prod".to_owned());
        vars[6].1 = Some("ya29.token".to_owned());
        vars[8].1 = Some("https://app.example.org".to_owned());
        let _guard = lock_env(vars);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("address").port(),
            9000
        );
        assert_eq!(
            settings.public_base_url().expect("url").as_str(),
            "https://cdn.example.org/classdesk/"
        );
        assert_eq!(
            settings.fcm_credentials(),
            Some(("classdesk-prod", "ya29.token"))
        );
        assert_eq!(settings.db_max_connections(), 1);
        assert_eq!(settings.cors_allowed_origin(), "https://app.example.org");
    }

    #[rstest]
    fn bad_bind_addr_is_reported() {
        let settings = AppSettings {
            bind_addr: Some("not-an-address".to_owned()),
            database_url: None,
            db_max_connections: None,
            blob_root: None,
            public_base_url: None,
            fcm_project_id: None,
            fcm_access_token: None,
            fcm_timeout_secs: None,
            cors_allowed_origin: None,
        };
        assert!(matches!(
            settings.bind_addr(),
            Err(SettingsError::BindAddr { .. })
        ));
    }
}
