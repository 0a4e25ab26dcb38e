//! Domain primitives, services and ports.
//!
//! Purpose: hold the transport-agnostic core of the client. Services depend
//! only on the traits in [`ports`]; adapters under `outbound` implement them
//! and inbound adapters drive the services.
//!
//! Public surface:
//! - Username: session identity used as the backend's per-user key.
//! - EndpointRecord, EndpointDraft, NewEndpoint: user-defined endpoints.
//! - DashboardState, Tile, TileCoordinates: dashboard configuration.
//! - place, place_tiles, GridTemplate: tile layout engine.
//! - ApiRegistryService, DashboardLoader, SettingsService: domain services.
//! - Error, ErrorCode: presentation-facing failure payload.

pub mod dashboard;
pub mod dashboard_loader;
pub mod endpoint;
pub mod error;
pub mod layout;
pub mod ports;
pub mod registry_service;
pub mod settings_service;
pub mod user;

pub use self::dashboard::{DashboardState, GridCell, GridSize, Tile, TileCoordinates};
pub use self::dashboard_loader::{
    DashboardLoader, DashboardLoaderPorts, LoaderStatus, TriggerOutcome,
};
pub use self::endpoint::{
    BodySchema, EndpointDefinition, EndpointDraft, EndpointField, EndpointPath, EndpointRecord,
    EndpointValidationError, FileEntry, ListedEndpoint, NewEndpoint,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::layout::{
    GridTemplate, LayoutError, PlacedTile, TileLayoutError, TilePlacement, place, place_tiles,
};
pub use self::registry_service::{ApiRegistryService, RegistryError, UpdateCodeError};
pub use self::settings_service::{
    SettingsError, SettingsService, SettingsSnapshot, SettingsSource,
};
pub use self::user::{Username, UserValidationError};

/// Result alias for presentation-facing operations.
pub type ClientResult<T> = Result<T, Error>;
