//! Client core for a dashboard viewer and custom-endpoint registry.
//!
//! - [`domain`]: transport-agnostic types, services and ports.
//! - [`outbound`]: reqwest backend adapter and local settings caches.
//! - [`inbound`]: the `nalflo` command-line adapter.
//! - [`config`]: OrthoConfig-backed settings.

pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;

pub use config::ClientSettings;
