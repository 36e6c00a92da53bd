//! Host bootstrap orchestration.

use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use serde_json::{Map, Value};
use thiserror::Error;

use trellis_config::Config;

use crate::error::HostError;
use crate::host::{Host, InitParams};
use crate::lifecycle::LifecycleReporter;
use crate::telemetry::{self, TelemetryError, TelemetryHandle};
use crate::transport::Transport;

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the host configuration.
    ///
    /// # Errors
    ///
    /// Returns the loader error when any configuration layer is invalid.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Loader returning a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps an already resolved configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
}

/// Result of a successful bootstrap: a configured, uninitialised host.
pub struct Runtime<T> {
    config: Config,
    host: Host<T>,
    telemetry: TelemetryHandle,
}

impl<T: Transport> Runtime<T> {
    /// Accessor for the resolved configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Settings of the subscriber serving this process.
    #[must_use]
    pub const fn telemetry(&self) -> &TelemetryHandle {
        &self.telemetry
    }

    /// The host, for declarations and lifecycle signals.
    #[must_use]
    pub const fn host_mut(&mut self) -> &mut Host<T> {
        &mut self.host
    }

    /// Initialises the host with the configured root and controllers.
    ///
    /// # Errors
    ///
    /// Propagates the failure of [`Host::init`].
    pub fn init(&mut self, registry: Map<String, Value>) -> Result<(), HostError> {
        let params = InitParams::from_config(&self.config).with_registry(registry);
        self.host.init(params)
    }

    /// Gives up the bootstrap wrapper and returns the host.
    #[must_use]
    pub fn into_host(self) -> Host<T> {
        self.host
    }
}

/// Bootstraps a host using the supplied collaborators.
///
/// # Errors
///
/// Returns [`BootstrapError`] when the configuration cannot be loaded or
/// telemetry cannot be installed. The reporter sees the failure first.
pub fn bootstrap_with<T: Transport>(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn LifecycleReporter>,
    transport: T,
) -> Result<Runtime<T>, BootstrapError> {
    reporter.bootstrap_starting();

    let config = match loader.load() {
        Ok(config) => config,
        Err(source) => {
            let error = BootstrapError::Configuration { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    let telemetry = match telemetry::initialise(&config) {
        Ok(handle) => handle,
        Err(source) => {
            let error = BootstrapError::Telemetry { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    reporter.bootstrap_succeeded(&config);
    let host = Host::from_config(&config, transport).with_reporter(reporter);
    Ok(Runtime {
        config,
        host,
        telemetry,
    })
}
