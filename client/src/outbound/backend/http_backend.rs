//! Backend adapter implementing the driven ports over [`RequestClient`].

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::BackendRoutes;
use super::dto::{
    CreateEndpointRequestDto, DashboardResponseDto, EndpointsResponseDto, FilesResponseDto,
    RemoveEndpointRequestDto, SettingsResponseDto, StoreSettingsRequestDto,
    UpdateCodeRequestDto, UserRequestDto,
};
use crate::domain::ports::{
    ConnectionProbe, DashboardSource, EndpointRegistry, LivenessPing, RequestError,
    SettingsStore,
};
use crate::domain::{
    DashboardState, EndpointDefinition, EndpointPath, FileEntry, NewEndpoint, Username,
};
use crate::outbound::http::{RequestClient, ResponseBody};

/// All backend-facing ports, served by one shared [`RequestClient`].
pub struct HttpBackend {
    client: Arc<RequestClient>,
    routes: BackendRoutes,
}

impl HttpBackend {
    /// Build an adapter using the default route table.
    pub fn new(client: Arc<RequestClient>) -> Self {
        Self::with_routes(client, BackendRoutes::default())
    }

    pub fn with_routes(client: Arc<RequestClient>, routes: BackendRoutes) -> Self {
        Self { client, routes }
    }

    pub fn client(&self) -> &Arc<RequestClient> {
        &self.client
    }

    pub fn routes(&self) -> &BackendRoutes {
        &self.routes
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        route: &str,
        body: Option<&B>,
    ) -> Result<ResponseBody, RequestError> {
        let body = body.map(encode).transpose()?;
        self.client.post(route, body.as_ref()).await
    }

    async fn post_for<B, T>(&self, route: &str, body: &B) -> Result<T, RequestError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.post(route, Some(body)).await?.decode()
    }

    async fn post_user(&self, route: &str, user: &Username) -> Result<ResponseBody, RequestError> {
        self.post(route, Some(&user_body(user))).await
    }

    async fn post_user_for<T: DeserializeOwned>(
        &self,
        route: &str,
        user: &Username,
    ) -> Result<T, RequestError> {
        self.post_for(route, &user_body(user)).await
    }
}

fn user_body(user: &Username) -> UserRequestDto<'_> {
    UserRequestDto {
        username: user.as_str(),
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> Result<Value, RequestError> {
    serde_json::to_value(body)
        .map_err(|error| RequestError::decode(format!("request body not serialisable: {error}")))
}

#[async_trait]
impl EndpointRegistry for HttpBackend {
    async fn list_endpoints(
        &self,
        user: &Username,
    ) -> Result<BTreeMap<EndpointPath, EndpointDefinition>, RequestError> {
        let response: EndpointsResponseDto = self
            .post_user_for(&self.routes.list_endpoints, user)
            .await?;
        response.into_domain().map_err(RequestError::decode)
    }

    async fn create_endpoint(
        &self,
        user: &Username,
        endpoint: &NewEndpoint,
    ) -> Result<(), RequestError> {
        let body = CreateEndpointRequestDto::new(user.as_str(), endpoint);
        self.post(&self.routes.create_endpoint, Some(&body))
            .await
            .map(drop)
    }

    async fn persist_runtime_state(&self) -> Result<(), RequestError> {
        self.post::<Value>(&self.routes.persist_runtime_state, None)
            .await
            .map(drop)
    }

    async fn update_endpoint_code(
        &self,
        user: &Username,
        path: &EndpointPath,
        source_code: &str,
    ) -> Result<(), RequestError> {
        let body = UpdateCodeRequestDto {
            username: user.as_str(),
            endpoint: path.as_str(),
            code: source_code,
        };
        self.post(&self.routes.update_code, Some(&body))
            .await
            .map(drop)
    }

    async fn remove_endpoint(
        &self,
        user: &Username,
        path: &EndpointPath,
    ) -> Result<(), RequestError> {
        let body = RemoveEndpointRequestDto {
            username: user.as_str(),
            endpoint: path.as_str(),
        };
        self.post(&self.routes.remove_endpoint, Some(&body))
            .await
            .map(drop)
    }

    async fn list_files(&self, user: &Username) -> Result<Vec<FileEntry>, RequestError> {
        let response: FilesResponseDto = self
            .post_user_for(&self.routes.list_files, user)
            .await?;
        Ok(response.into_domain())
    }
}

#[async_trait]
impl DashboardSource for HttpBackend {
    async fn fetch_dashboard(
        &self,
        user: &Username,
    ) -> Result<Option<DashboardState>, RequestError> {
        let response: DashboardResponseDto = self
            .post_user_for(&self.routes.dashboard, user)
            .await?;
        response.into_domain().map_err(RequestError::decode)
    }

    async fn force_refresh(&self, user: &Username) -> Result<(), RequestError> {
        self.post_user(&self.routes.force_refresh, user)
            .await
            .map(drop)
    }
}

#[async_trait]
impl LivenessPing for HttpBackend {
    async fn ping(&self, user: &Username) -> Result<(), RequestError> {
        self.post_user(&self.routes.ping, user).await.map(drop)
    }
}

#[async_trait]
impl SettingsStore for HttpBackend {
    async fn fetch_settings(&self, user: &Username) -> Result<Option<String>, RequestError> {
        let response: SettingsResponseDto = self
            .post_user_for(&self.routes.fetch_settings, user)
            .await?;
        Ok(response.into_blob())
    }

    async fn store_settings(&self, user: &Username, blob: &str) -> Result<(), RequestError> {
        let body = StoreSettingsRequestDto {
            username: user.as_str(),
            user_input: blob,
        };
        self.post(&self.routes.store_settings, Some(&body))
            .await
            .map(drop)
    }
}

#[async_trait]
impl ConnectionProbe for HttpBackend {
    async fn is_reachable(&self) -> bool {
        self.client.health_check_at(&self.routes.health).await
    }
}
