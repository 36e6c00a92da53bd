//! Page host built on the `trellis-loader` dependency engine.
//!
//! A [`Host`] owns one loader and gives it concrete behaviour: names are
//! fetched through a [`Transport`], modules and controllers are built from
//! factories once their dependencies exist, and controllers follow the page
//! lifecycle ([`Stage`]). The bootstrap sequence loads configuration through
//! [`trellis_config`], installs structured telemetry and returns a
//! [`Runtime`] wrapping an uninitialised host.
//!
//! Fetch completion is asynchronous. A transport only starts fetches; the
//! embedder's event loop reports each arrival back through the declaration
//! entry points, which lets the loader create whatever became ready.

mod artifact;
mod bootstrap;
mod error;
mod host;
mod lifecycle;
mod registry;
pub mod telemetry;
mod transport;

pub use artifact::{
    Artifact, ArtifactError, Context, Controller, ControllerFactory, Module, ModuleFactory,
};
pub use bootstrap::{
    BootstrapError, ConfigLoader, Runtime, StaticConfigLoader, SystemConfigLoader, bootstrap_with,
};
pub use error::HostError;
pub use host::{Host, InitParams};
pub use lifecycle::{LifecycleReporter, Stage, StructuredLifecycleReporter};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use transport::{QueuedTransport, Request, Transport, TransportError};
pub use trellis_loader::{Name, Namespace, StallReport, Status};

#[cfg(test)]
mod tests;
