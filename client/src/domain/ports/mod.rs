//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Every backend-facing port reports failures as [`RequestError`] so the
//! services above them classify outcomes the same way regardless of adapter.

mod macros;
pub(crate) use macros::define_port_error;

mod dashboard_source;
mod endpoint_registry;
mod request_error;
mod settings;

#[cfg(test)]
pub use dashboard_source::{MockDashboardSource, MockLivenessPing, MockPingFailureSink};
pub use dashboard_source::{
    ConnectionProbe, DashboardSource, LivenessPing, PingFailureSink, TracingPingSink,
};
#[cfg(test)]
pub use endpoint_registry::MockEndpointRegistry;
pub use endpoint_registry::{EndpointRegistry, FixtureEndpointRegistry};
pub use request_error::RequestError;
#[cfg(test)]
pub use settings::{MockSettingsCache, MockSettingsStore};
pub use settings::{SettingsCache, SettingsCacheError, SettingsStore};
