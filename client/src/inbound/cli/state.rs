//! Shared CLI adapter state.
//!
//! Commands accept this state so they only depend on domain services and
//! ports, and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    ConnectionProbe, DashboardSource, EndpointRegistry, LivenessPing, PingFailureSink,
    SettingsCache, SettingsStore,
};
use crate::domain::{ApiRegistryService, DashboardLoader, DashboardLoaderPorts, SettingsService};

/// Parameter object bundling all port implementations for CLI commands.
#[derive(Clone)]
pub struct CliStatePorts {
    pub registry: Arc<dyn EndpointRegistry>,
    pub dashboard: Arc<dyn DashboardSource>,
    pub liveness: Arc<dyn LivenessPing>,
    pub ping_failures: Arc<dyn PingFailureSink>,
    pub settings: Arc<dyn SettingsStore>,
    pub settings_cache: Arc<dyn SettingsCache>,
    pub probe: Arc<dyn ConnectionProbe>,
}

/// Dependency bundle for CLI commands.
pub struct CliState {
    pub registry: ApiRegistryService<dyn EndpointRegistry>,
    pub loader: DashboardLoader,
    pub settings: SettingsService<dyn SettingsStore, dyn SettingsCache>,
    pub probe: Arc<dyn ConnectionProbe>,
}

impl CliState {
    pub fn new(ports: CliStatePorts) -> Self {
        let CliStatePorts {
            registry,
            dashboard,
            liveness,
            ping_failures,
            settings,
            settings_cache,
            probe,
        } = ports;
        Self {
            registry: ApiRegistryService::new(registry),
            loader: DashboardLoader::new(DashboardLoaderPorts::new(
                dashboard,
                liveness,
                ping_failures,
            )),
            settings: SettingsService::new(settings, settings_cache),
            probe,
        }
    }
}

impl From<CliStatePorts> for CliState {
    fn from(ports: CliStatePorts) -> Self {
        Self::new(ports)
    }
}
