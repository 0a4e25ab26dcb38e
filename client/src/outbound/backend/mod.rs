//! Backend outbound adapter.
//!
//! One HTTP implementation of the registry, dashboard, liveness, settings
//! and connection ports, sharing a single request client.

mod dto;
mod http_backend;
mod routes;

pub use http_backend::HttpBackend;
pub use routes::BackendRoutes;
