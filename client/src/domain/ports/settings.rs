//! Ports for the per-user settings blob.
//!
//! Reads follow a two-tier policy: the remote [`SettingsStore`] is
//! authoritative and the local [`SettingsCache`] is consulted only when the
//! remote read fails.

use async_trait::async_trait;

use super::{RequestError, define_port_error};
use crate::domain::Username;

/// Remote, authoritative settings storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Fetch the blob; `None` when the user has never saved one.
    async fn fetch_settings(&self, user: &Username) -> Result<Option<String>, RequestError>;

    /// Replace the blob.
    async fn store_settings(&self, user: &Username, blob: &str) -> Result<(), RequestError>;
}

define_port_error! {
    /// Errors surfaced by local settings caches.
    pub enum SettingsCacheError {
        /// Reading or writing the cache medium failed.
        Io { message: String } => "settings cache i/o failed: {message}",
        /// A cached entry could not be encoded or decoded.
        Serialization { message: String } => "settings cache serialisation failed: {message}",
    }
}

/// Local fallback copy of the settings blob.
#[cfg_attr(test, mockall::automock)]
pub trait SettingsCache: Send + Sync {
    fn read(&self, user: &Username) -> Result<Option<String>, SettingsCacheError>;

    fn write(&self, user: &Username, blob: &str) -> Result<(), SettingsCacheError>;
}
