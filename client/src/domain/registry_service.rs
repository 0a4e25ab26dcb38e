//! API registry service.
//!
//! Implements the endpoint lifecycle on top of the [`EndpointRegistry`] port:
//! input validation before any network call, `NotFound` classification for
//! lookups, and the persist-then-update sequence for code changes.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::ports::{EndpointRegistry, RequestError};
use crate::domain::{
    EndpointDraft, EndpointPath, EndpointRecord, EndpointValidationError, FileEntry,
    ListedEndpoint, Username,
};

/// Failures of single-step registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Input was rejected before any network call.
    #[error("invalid endpoint: {0}")]
    Validation(#[from] EndpointValidationError),
    /// The freshly fetched registry holds no endpoint at `path`.
    #[error("endpoint {path} not found")]
    NotFound { path: EndpointPath },
    /// The backend call failed.
    #[error(transparent)]
    Request(#[from] RequestError),
}

/// Failures of the composite code update.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpdateCodeError {
    /// Saving the backend runtime state failed; no update was attempted.
    #[error("backend state could not be persisted, code left unchanged: {0}")]
    PersistFailed(#[source] RequestError),
    /// Runtime state was saved but the code update itself failed.
    #[error("code update failed after backend state was persisted: {0}")]
    UpdateFailed(#[source] RequestError),
}

/// Registry service wrapping an [`EndpointRegistry`] adapter.
pub struct ApiRegistryService<R: ?Sized> {
    registry: Arc<R>,
}

impl<R: ?Sized> Clone for ApiRegistryService<R> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<R: ?Sized> ApiRegistryService<R> {
    /// Create a service over the given registry adapter.
    pub fn new(registry: Arc<R>) -> Self {
        Self { registry }
    }
}

impl<R> ApiRegistryService<R>
where
    R: EndpointRegistry + ?Sized,
{
    /// List the user's endpoints ordered by path.
    ///
    /// Each call re-fetches the registry and numbers the records from 1.
    /// The numbers only make sense within this result.
    pub async fn list(&self, user: &Username) -> Result<Vec<ListedEndpoint>, RegistryError> {
        let endpoints = self.registry.list_endpoints(user).await?;
        debug!(user = %user, count = endpoints.len(), "fetched endpoint registry");
        Ok(endpoints
            .into_iter()
            .enumerate()
            .map(|(index, (path, definition))| ListedEndpoint {
                id: index + 1,
                record: EndpointRecord::from_definition(path, definition),
            })
            .collect())
    }

    /// Fetch one endpoint.
    ///
    /// A path missing from the fetched registry is [`RegistryError::NotFound`],
    /// including when it was removed since an earlier listing.
    pub async fn get(
        &self,
        user: &Username,
        path: &EndpointPath,
    ) -> Result<EndpointRecord, RegistryError> {
        let mut endpoints = self.registry.list_endpoints(user).await?;
        endpoints
            .remove_entry(path)
            .map(|(path, definition)| EndpointRecord::from_definition(path, definition))
            .ok_or_else(|| RegistryError::NotFound { path: path.clone() })
    }

    /// Validate a draft and register it.
    ///
    /// Validation failures return before the backend is contacted.
    pub async fn create(
        &self,
        user: &Username,
        draft: EndpointDraft,
    ) -> Result<EndpointPath, RegistryError> {
        let endpoint = draft.validate()?;
        self.registry
            .create_endpoint(user, &endpoint)
            .await
            .inspect_err(|err| warn_if_unknown(err, "create"))?;
        info!(user = %user, path = %endpoint.path(), "endpoint created");
        Ok(endpoint.path().clone())
    }

    /// Persist backend runtime state, then replace the endpoint's code.
    ///
    /// The update is never sent when persisting fails. Only the code changes;
    /// path, description, and body schema stay as they are.
    pub async fn update_code(
        &self,
        user: &Username,
        path: &EndpointPath,
        source_code: &str,
    ) -> Result<(), UpdateCodeError> {
        self.registry
            .persist_runtime_state()
            .await
            .map_err(UpdateCodeError::PersistFailed)?;
        self.registry
            .update_endpoint_code(user, path, source_code)
            .await
            .inspect_err(|err| warn_if_unknown(err, "update_code"))
            .map_err(UpdateCodeError::UpdateFailed)?;
        info!(user = %user, path = %path, "endpoint code updated");
        Ok(())
    }

    /// Remove an endpoint. Irreversible; confirmation is the caller's job.
    pub async fn remove(&self, user: &Username, path: &EndpointPath) -> Result<(), RegistryError> {
        self.registry
            .remove_endpoint(user, path)
            .await
            .inspect_err(|err| warn_if_unknown(err, "remove"))?;
        info!(user = %user, path = %path, "endpoint removed");
        Ok(())
    }

    /// List the files stored alongside the user's endpoints.
    pub async fn list_files(&self, user: &Username) -> Result<Vec<FileEntry>, RegistryError> {
        Ok(self.registry.list_files(user).await?)
    }
}

fn warn_if_unknown(error: &RequestError, operation: &'static str) {
    if error.is_outcome_unknown() {
        warn!(operation, error = %error, "mutation outcome unknown; re-query before retrying");
    }
}

#[cfg(test)]
#[path = "registry_service_tests.rs"]
mod tests;
