//! Client configuration loaded via OrthoConfig.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_MS: u64 = 120_000;

/// Configuration values for the backend connection and local cache.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "NALFLO")]
pub struct ClientSettings {
    /// Backend base address.
    pub base_url: Option<String>,
    /// Default per-call deadline in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Directory for the local settings cache; in-memory when unset.
    pub cache_dir: Option<PathBuf>,
    /// Identity used when a command does not name a user.
    pub user: Option<String>,
}

impl ClientSettings {
    /// Return the configured base address, falling back to the default.
    ///
    /// # Errors
    ///
    /// Returns an error when the configured value is not an absolute URL.
    pub fn base_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))
    }

    /// Return the configured deadline, falling back to the default.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS))
    }

    pub fn cache_dir(&self) -> Option<&Path> {
        self.cache_dir.as_deref()
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for client configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    fn load_from_empty_args() -> ClientSettings {
        ClientSettings::load_from_iter([OsString::from("nalflo")]).expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env([
            ("NALFLO_BASE_URL", None::<String>),
            ("NALFLO_TIMEOUT_MS", None::<String>),
            ("NALFLO_CACHE_DIR", None::<String>),
            ("NALFLO_USER", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.base_url().expect("default parses").as_str(),
            "http://localhost:8000/"
        );
        assert_eq!(settings.timeout(), Duration::from_millis(120_000));
        assert!(settings.cache_dir().is_none());
        assert!(settings.user().is_none());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("NALFLO_BASE_URL", Some("https://api.nalflo.test".to_owned())),
            ("NALFLO_TIMEOUT_MS", Some("2500".to_owned())),
            ("NALFLO_CACHE_DIR", Some("/tmp/nalflo-cache".to_owned())),
            ("NALFLO_USER", Some("demo@nalflo.com".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.base_url().expect("override parses").as_str(),
            "https://api.nalflo.test/"
        );
        assert_eq!(settings.timeout(), Duration::from_millis(2_500));
        assert_eq!(settings.cache_dir(), Some(Path::new("/tmp/nalflo-cache")));
        assert_eq!(settings.user(), Some("demo@nalflo.com"));
    }

    #[rstest]
    fn relative_base_urls_are_rejected() {
        let _guard = lock_env([("NALFLO_BASE_URL", Some("/api/v1".to_owned()))]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.base_url(),
            Err(url::ParseError::RelativeUrlWithoutBase)
        );
    }
}
