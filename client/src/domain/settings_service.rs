//! Settings blob service with a two-tier read policy.
//!
//! The remote store is authoritative. The injected local cache is read only
//! when the remote read fails, and written back on a best-effort basis after
//! a successful save.

use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use crate::domain::Username;
use crate::domain::ports::{RequestError, SettingsCache, SettingsStore};

/// Where a loaded blob came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsSource {
    Remote,
    /// Served from the local cache because the remote read failed.
    LocalCache { remote_error: RequestError },
}

/// A loaded settings blob; `blob` is `None` when the user never saved one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsSnapshot {
    pub blob: Option<String>,
    pub source: SettingsSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    /// The remote read failed and the cache had nothing usable.
    #[error("settings unavailable: {0}")]
    Unavailable(#[source] RequestError),
    #[error("settings could not be saved: {0}")]
    SaveFailed(#[source] RequestError),
}

pub struct SettingsService<S: ?Sized, C: ?Sized> {
    store: Arc<S>,
    cache: Arc<C>,
}

impl<S: ?Sized, C: ?Sized> SettingsService<S, C> {
    pub fn new(store: Arc<S>, cache: Arc<C>) -> Self {
        Self { store, cache }
    }
}

impl<S, C> SettingsService<S, C>
where
    S: SettingsStore + ?Sized,
    C: SettingsCache + ?Sized,
{
    /// Load the blob, falling back to the local cache on remote failure.
    pub async fn load(&self, user: &Username) -> Result<SettingsSnapshot, SettingsError> {
        let remote_error = match self.store.fetch_settings(user).await {
            Ok(blob) => {
                return Ok(SettingsSnapshot {
                    blob,
                    source: SettingsSource::Remote,
                });
            }
            Err(error) => error,
        };
        warn!(user = %user, error = %remote_error, "remote settings read failed; trying local cache");
        match self.cache.read(user) {
            Ok(Some(blob)) => Ok(SettingsSnapshot {
                blob: Some(blob),
                source: SettingsSource::LocalCache { remote_error },
            }),
            Ok(None) => Err(SettingsError::Unavailable(remote_error)),
            Err(cache_error) => {
                warn!(user = %user, error = %cache_error, "local settings cache unreadable");
                Err(SettingsError::Unavailable(remote_error))
            }
        }
    }

    /// Save the blob remotely, then refresh the local copy.
    ///
    /// A failed cache write is logged and does not fail the save.
    pub async fn save(&self, user: &Username, blob: &str) -> Result<(), SettingsError> {
        self.store
            .store_settings(user, blob)
            .await
            .map_err(SettingsError::SaveFailed)?;
        if let Err(error) = self.cache.write(user, blob) {
            warn!(user = %user, error = %error, "settings saved remotely but not cached");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockSettingsCache, MockSettingsStore, SettingsCacheError};
    use mockall::predicate::eq;

    fn user() -> Username {
        Username::new("ada").expect("valid username")
    }

    #[tokio::test]
    async fn remote_blobs_are_authoritative() {
        let mut store = MockSettingsStore::new();
        store
            .expect_fetch_settings()
            .return_once(|_| Ok(Some("layout: compact".to_owned())));
        let mut cache = MockSettingsCache::new();
        cache.expect_read().times(0);

        let service = SettingsService::new(Arc::new(store), Arc::new(cache));
        let snapshot = service.load(&user()).await.expect("load succeeds");

        assert_eq!(snapshot.blob.as_deref(), Some("layout: compact"));
        assert_eq!(snapshot.source, SettingsSource::Remote);
    }

    #[tokio::test]
    async fn remote_failures_fall_back_to_the_cache() {
        let mut store = MockSettingsStore::new();
        store
            .expect_fetch_settings()
            .return_once(|_| Err(RequestError::transport("refused")));
        let mut cache = MockSettingsCache::new();
        cache
            .expect_read()
            .with(eq(user()))
            .return_once(|_| Ok(Some("cached".to_owned())));

        let service = SettingsService::new(Arc::new(store), Arc::new(cache));
        let snapshot = service.load(&user()).await.expect("cache serves the blob");

        assert_eq!(snapshot.blob.as_deref(), Some("cached"));
        assert_eq!(
            snapshot.source,
            SettingsSource::LocalCache {
                remote_error: RequestError::transport("refused")
            }
        );
    }

    #[tokio::test]
    async fn empty_or_broken_caches_surface_the_remote_error() {
        for cached in [Ok(None), Err(SettingsCacheError::io("permission denied"))] {
            let mut store = MockSettingsStore::new();
            store
                .expect_fetch_settings()
                .return_once(|_| Err(RequestError::timeout(120_000_u64)));
            let mut cache = MockSettingsCache::new();
            cache.expect_read().return_once(move |_| cached);

            let service = SettingsService::new(Arc::new(store), Arc::new(cache));
            let error = service.load(&user()).await.expect_err("nothing to serve");

            assert_eq!(
                error,
                SettingsError::Unavailable(RequestError::timeout(120_000_u64))
            );
        }
    }

    #[tokio::test]
    async fn save_writes_remote_then_cache() {
        let mut seq = mockall::Sequence::new();
        let mut store = MockSettingsStore::new();
        store
            .expect_store_settings()
            .withf(|_, blob| blob == "dark")
            .times(1)
            .in_sequence(&mut seq)
            .return_once(|_, _| Ok(()));
        let mut cache = MockSettingsCache::new();
        cache
            .expect_write()
            .withf(|_, blob| blob == "dark")
            .times(1)
            .in_sequence(&mut seq)
            .return_once(|_, _| Err(SettingsCacheError::io("read-only")));

        let service = SettingsService::new(Arc::new(store), Arc::new(cache));
        service
            .save(&user(), "dark")
            .await
            .expect("cache failures do not fail the save");
    }

    #[tokio::test]
    async fn failed_saves_leave_the_cache_alone() {
        let mut store = MockSettingsStore::new();
        store
            .expect_store_settings()
            .return_once(|_, _| Err(RequestError::http(500_u16, "boom")));
        let mut cache = MockSettingsCache::new();
        cache.expect_write().times(0);

        let service = SettingsService::new(Arc::new(store), Arc::new(cache));
        let error = service.save(&user(), "dark").await.expect_err("save fails");

        assert_eq!(
            error,
            SettingsError::SaveFailed(RequestError::http(500_u16, "boom"))
        );
    }
}
