//! Local settings cache adapters.
//!
//! - [`FileSettingsCache`] keeps one JSON file per user inside a directory
//!   opened through `cap_std`, so the cache can never escape it.
//! - [`InMemorySettingsCache`] lives for the process only; the CLI falls back
//!   to it when no cache directory is configured.

use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use cap_std::{ambient_authority, fs::Dir};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::Username;
use crate::domain::ports::{SettingsCache, SettingsCacheError};

#[derive(Debug, Serialize, Deserialize)]
struct CachedSettings {
    user: String,
    blob: String,
}

/// Settings cache backed by a directory of JSON files.
///
/// File names are the hex SHA-256 of the username, so arbitrary identifiers
/// map to safe, fixed-length names.
#[derive(Debug)]
pub struct FileSettingsCache {
    dir: Dir,
}

impl FileSettingsCache {
    /// Open `path`, creating it when missing.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory cannot be created or opened.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        Dir::create_ambient_dir_all(path, ambient_authority())?;
        let dir = Dir::open_ambient_dir(path, ambient_authority())?;
        Ok(Self { dir })
    }

    fn file_name(user: &Username) -> String {
        let digest = Sha256::digest(user.as_str().as_bytes());
        format!("{}.json", hex::encode(digest))
    }
}

fn io_error(error: io::Error) -> SettingsCacheError {
    SettingsCacheError::io(error.to_string())
}

impl SettingsCache for FileSettingsCache {
    fn read(&self, user: &Username) -> Result<Option<String>, SettingsCacheError> {
        let contents = match self.dir.read_to_string(Self::file_name(user)) {
            Ok(contents) => contents,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(io_error(error)),
        };
        let cached: CachedSettings = serde_json::from_str(&contents)
            .map_err(|error| SettingsCacheError::serialization(error.to_string()))?;
        // A digest collision must not leak another user's settings.
        if cached.user != user.as_str() {
            return Ok(None);
        }
        Ok(Some(cached.blob))
    }

    fn write(&self, user: &Username, blob: &str) -> Result<(), SettingsCacheError> {
        let file_name = Self::file_name(user);
        let staged = format!("{file_name}.tmp");
        let contents = serde_json::to_vec(&CachedSettings {
            user: user.as_str().to_owned(),
            blob: blob.to_owned(),
        })
        .map_err(|error| SettingsCacheError::serialization(error.to_string()))?;
        self.dir.write(&staged, contents).map_err(io_error)?;
        self.dir
            .rename(&staged, &self.dir, &file_name)
            .map_err(io_error)
    }
}

/// Process-local settings cache.
#[derive(Debug, Default)]
pub struct InMemorySettingsCache {
    entries: Mutex<HashMap<Username, String>>,
}

impl InMemorySettingsCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsCache for InMemorySettingsCache {
    fn read(&self, user: &Username) -> Result<Option<String>, SettingsCacheError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(user).cloned())
    }

    fn write(&self, user: &Username, blob: &str) -> Result<(), SettingsCacheError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user.clone(), blob.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn user() -> Username {
        Username::new("demo@nalflo.com").expect("valid username")
    }

    #[rstest]
    fn file_cache_round_trips_per_user(user: Username) {
        let temp = TempDir::new().expect("temp dir");
        let cache = FileSettingsCache::open(temp.path().join("settings")).expect("open cache");
        let other = Username::new("other@nalflo.com").expect("valid username");

        cache.write(&user, "theme: dark").expect("write");

        assert_eq!(cache.read(&user).expect("read").as_deref(), Some("theme: dark"));
        assert_eq!(cache.read(&other).expect("read"), None);
    }

    #[rstest]
    fn file_cache_overwrites_previous_blobs(user: Username) {
        let temp = TempDir::new().expect("temp dir");
        let cache = FileSettingsCache::open(temp.path()).expect("open cache");

        cache.write(&user, "v1").expect("first write");
        cache.write(&user, "v2").expect("second write");

        assert_eq!(cache.read(&user).expect("read").as_deref(), Some("v2"));
    }

    #[rstest]
    fn file_cache_survives_reopening(user: Username) {
        let temp = TempDir::new().expect("temp dir");
        FileSettingsCache::open(temp.path())
            .expect("open cache")
            .write(&user, "persisted")
            .expect("write");

        let reopened = FileSettingsCache::open(temp.path()).expect("reopen cache");
        assert_eq!(
            reopened.read(&user).expect("read").as_deref(),
            Some("persisted")
        );
    }

    #[rstest]
    fn corrupt_entries_are_serialisation_errors(user: Username) {
        let temp = TempDir::new().expect("temp dir");
        let cache = FileSettingsCache::open(temp.path()).expect("open cache");
        cache
            .dir
            .write(FileSettingsCache::file_name(&user), "not json")
            .expect("seed corrupt entry");

        let error = cache.read(&user).expect_err("corrupt entry");
        assert!(matches!(error, SettingsCacheError::Serialization { .. }));
    }

    #[rstest]
    fn in_memory_cache_round_trips(user: Username) {
        let cache = InMemorySettingsCache::new();
        assert_eq!(cache.read(&user).expect("read"), None);

        cache.write(&user, "layout").expect("write");

        assert_eq!(cache.read(&user).expect("read").as_deref(), Some("layout"));
    }
}
