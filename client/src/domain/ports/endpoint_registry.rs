//! Driven port for the backend's endpoint registry.
//!
//! The backend keys endpoints by path; the port hands back that mapping as-is
//! and leaves flattening, lookup classification, and call sequencing to the
//! domain service.

use std::collections::BTreeMap;

use async_trait::async_trait;

use super::RequestError;
use crate::domain::{EndpointDefinition, EndpointPath, FileEntry, NewEndpoint, Username};

/// Registry operations exposed by the backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EndpointRegistry: Send + Sync {
    /// Fetch every endpoint owned by `user`, keyed by path.
    async fn list_endpoints(
        &self,
        user: &Username,
    ) -> Result<BTreeMap<EndpointPath, EndpointDefinition>, RequestError>;

    /// Register a new endpoint.
    async fn create_endpoint(
        &self,
        user: &Username,
        endpoint: &NewEndpoint,
    ) -> Result<(), RequestError>;

    /// Durably save the backend's live runtime state.
    async fn persist_runtime_state(&self) -> Result<(), RequestError>;

    /// Replace the source code of an existing endpoint.
    async fn update_endpoint_code(
        &self,
        user: &Username,
        path: &EndpointPath,
        source_code: &str,
    ) -> Result<(), RequestError>;

    /// Delete an endpoint.
    async fn remove_endpoint(&self, user: &Username, path: &EndpointPath)
    -> Result<(), RequestError>;

    /// Fetch the files stored for `user`, sorted by name.
    async fn list_files(&self, user: &Username) -> Result<Vec<FileEntry>, RequestError>;
}

/// Fixture registry with no endpoints that accepts every mutation.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureEndpointRegistry;

#[async_trait]
impl EndpointRegistry for FixtureEndpointRegistry {
    async fn list_endpoints(
        &self,
        _user: &Username,
    ) -> Result<BTreeMap<EndpointPath, EndpointDefinition>, RequestError> {
        Ok(BTreeMap::new())
    }

    async fn create_endpoint(
        &self,
        _user: &Username,
        _endpoint: &NewEndpoint,
    ) -> Result<(), RequestError> {
        Ok(())
    }

    async fn persist_runtime_state(&self) -> Result<(), RequestError> {
        Ok(())
    }

    async fn update_endpoint_code(
        &self,
        _user: &Username,
        _path: &EndpointPath,
        _source_code: &str,
    ) -> Result<(), RequestError> {
        Ok(())
    }

    async fn remove_endpoint(
        &self,
        _user: &Username,
        _path: &EndpointPath,
    ) -> Result<(), RequestError> {
        Ok(())
    }

    async fn list_files(&self, _user: &Username) -> Result<Vec<FileEntry>, RequestError> {
        Ok(Vec::new())
    }
}
