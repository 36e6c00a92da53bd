//! Payloads handed to the loader and the contexts they are built with.
//!
//! A declaration carries an [`Artifact`]: a factory for a module or a
//! controller, or [`Artifact::Available`] for libraries and extensions that
//! need no construction. Factories run once, when every dependency has been
//! created, and receive a [`Context`] exposing the public registry and the
//! modules created so far.

use std::any::Any;
use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;
use trellis_loader::Name;

use crate::registry::ModuleRegistry;

/// A created module. Any `'static` value qualifies.
pub type Module = Box<dyn Any>;

/// Builds a module from its creation context.
pub type ModuleFactory = Box<dyn FnOnce(&Context<'_>) -> Result<Module, ArtifactError>>;

/// Builds a controller from its creation context.
pub type ControllerFactory =
    Box<dyn FnOnce(&Context<'_>) -> Result<Box<dyn Controller>, ArtifactError>>;

/// Payload recorded for each declared name.
pub enum Artifact {
    /// Module factory, run on creation.
    Module(ModuleFactory),
    /// Controller factory, run on creation.
    Controller(ControllerFactory),
    /// A fetched library or extension; creation is a no-op.
    Available,
}

impl fmt::Debug for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::Module(_) => "Module",
            Self::Controller(_) => "Controller",
            Self::Available => "Available",
        };
        f.write_str(kind)
    }
}

/// Failure reported by a module or controller factory.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ArtifactError {
    message: String,
}

impl ArtifactError {
    /// Creates a new factory failure.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Failure description.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Read-only view handed to factories and [`Controller::on_create`].
#[derive(Debug)]
pub struct Context<'a> {
    name: &'a Name,
    registry: &'a Map<String, Value>,
    modules: &'a ModuleRegistry,
}

impl<'a> Context<'a> {
    pub(crate) const fn new(
        name: &'a Name,
        registry: &'a Map<String, Value>,
        modules: &'a ModuleRegistry,
    ) -> Self {
        Self {
            name,
            registry,
            modules,
        }
    }

    /// Name of the artifact being created.
    #[must_use]
    pub const fn name(&self) -> &'a Name {
        self.name
    }

    /// Public registry supplied at initialisation.
    #[must_use]
    pub const fn registry(&self) -> &'a Map<String, Value> {
        self.registry
    }

    /// A module created earlier, typically a declared dependency.
    #[must_use]
    pub fn module<M: Any>(&self, local: &str) -> Option<&'a M> {
        self.modules.get(local)
    }
}

/// Page controller.
///
/// Every hook defaults to a no-op. The host calls them in this order:
/// [`on_create`](Self::on_create) right after construction,
/// [`on_dom_load`](Self::on_dom_load) when the document is ready (which runs
/// [`init`](Self::init) by default), [`on_load`](Self::on_load) after the full
/// load, then [`on_unload`](Self::on_unload) and [`done`](Self::done) when the
/// page goes away. Controllers created after a stage was reached replay the
/// hooks they missed.
pub trait Controller {
    /// Runs once, right after the factory returned.
    fn on_create(&mut self, _context: &Context<'_>) {}

    /// Document-ready handler.
    fn on_dom_load(&mut self) {
        self.init();
    }

    /// Initialisation once the document is ready.
    fn init(&mut self) {}

    /// Full-load handler.
    fn on_load(&mut self) {}

    /// Unload handler.
    fn on_unload(&mut self) {}

    /// Final teardown, after [`on_unload`](Self::on_unload).
    fn done(&mut self) {}
}
