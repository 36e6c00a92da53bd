//! The host: one loader plus the registries and lifecycle around it.
//!
//! Resources declare themselves through [`Host::module`] and
//! [`Host::controller`]. Declarations made before [`Host::init`] are
//! preloaded; later ones are live and usually answer a fetch started by the
//! includer. Libraries and extensions have no declaration of their own, so
//! their fetch completion is reported with [`Host::library_loaded`] and
//! [`Host::extension_loaded`].
//!
//! The host is single-threaded. Embedders that share it across threads wrap
//! it in one `Mutex`.

mod hooks;

use std::any::Any;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use serde_json::{Map, Value};
use tracing::debug;
use trellis_config::Config;
use trellis_loader::{
    DependencySet, DependencySpec, Loader, Name, Namespace, StallReport, Status, normalize,
};

use crate::artifact::{Artifact, ArtifactError, Context, Controller, Module};
use crate::error::HostError;
use crate::lifecycle::{LifecycleReporter, Stage, StructuredLifecycleReporter};
use crate::registry::{ControllerRegistry, ModuleRegistry};
use crate::telemetry::HOST_TARGET as TARGET;
use crate::transport::Transport;

use self::hooks::HostHooks;

/// Parameters supplied once, at initialisation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InitParams {
    root: Option<Utf8PathBuf>,
    registry: Map<String, Value>,
    controllers: Vec<String>,
}

impl InitParams {
    /// Empty parameters: keep the configured root, no registry, no controllers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Root and initial controllers taken from the configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            root: Some(config.root().to_owned()),
            registry: Map::new(),
            controllers: config.initial_controllers(),
        }
    }

    /// Sets the resource root.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<Utf8PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Sets the public registry shared with every factory.
    #[must_use]
    pub fn with_registry(mut self, registry: Map<String, Value>) -> Self {
        self.registry = registry;
        self
    }

    /// Adds a controller to include at initialisation.
    #[must_use]
    pub fn with_controller(mut self, name: impl Into<String>) -> Self {
        self.controllers.push(name.into());
        self
    }
}

/// Page host owning the dependency loader.
///
/// # Example
///
/// ```
/// use trellis::{Host, InitParams, QueuedTransport, Request};
///
/// # fn main() -> Result<(), trellis::HostError> {
/// let mut host = Host::new(QueuedTransport::new());
/// host.init(InitParams::new().with_root("/static").with_controller("menu"))?;
/// assert_eq!(
///     host.transport_mut().pop(),
///     Some(Request::File("/static/controllers/menu.js".into()))
/// );
///
/// host.module("storage", "", |_| Ok(Vec::<String>::new()))?;
/// assert!(host.module_ref::<Vec<String>>("storage").is_some());
/// # Ok(())
/// # }
/// ```
pub struct Host<T> {
    loader: Loader<Artifact, HostHooks<T>>,
}

impl<T: Transport> Host<T> {
    /// Creates an uninitialised host with the default resource layout.
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self::with_settings(
            transport,
            Utf8PathBuf::from(trellis_config::DEFAULT_ROOT),
            trellis_config::DEFAULT_RESOURCE_EXTENSION.to_owned(),
        )
    }

    /// Creates an uninitialised host using the configured root and extension.
    #[must_use]
    pub fn from_config(config: &Config, transport: T) -> Self {
        Self::with_settings(
            transport,
            config.root().to_owned(),
            config.resource_extension().to_owned(),
        )
    }

    fn with_settings(transport: T, root: Utf8PathBuf, extension: String) -> Self {
        Self {
            loader: Loader::new(HostHooks {
                transport,
                root,
                extension,
                registry: Map::new(),
                modules: ModuleRegistry::default(),
                controllers: ControllerRegistry::default(),
                stage: Stage::Booting,
                reporter: Arc::new(StructuredLifecycleReporter::new()),
            }),
        }
    }

    /// Replaces the lifecycle reporter.
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn LifecycleReporter>) -> Self {
        self.hooks_mut().reporter = reporter;
        self
    }

    /// Declares a module.
    ///
    /// Unprefixed dependency tokens are read as modules. Before
    /// [`Host::init`] the declaration is preloaded.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Name`] for an invalid name or dependency,
    /// [`HostError::ModuleRedeclared`] when the module already exists, and
    /// any failure raised while creating it or its dependents.
    pub fn module<M, F>(
        &mut self,
        name: &str,
        dependencies: impl Into<DependencySpec>,
        factory: F,
    ) -> Result<(), HostError>
    where
        M: Any,
        F: FnOnce(&Context<'_>) -> Result<M, ArtifactError> + 'static,
    {
        let name = Name::new(Namespace::Module, name)?;
        let dependencies = normalize(&dependencies.into(), Namespace::Module)?;
        if self.loader.is_initialised() && self.hooks().modules.contains(name.local()) {
            return Err(HostError::ModuleRedeclared {
                name: name.local().to_owned(),
            });
        }
        let artifact = Artifact::Module(Box::new(move |context: &Context<'_>| {
            factory(context).map(|module| Box::new(module) as Module)
        }));
        self.declare(name, dependencies, artifact)
    }

    /// Declares a controller.
    ///
    /// Unprefixed dependency tokens are read as controllers.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Name`] for an invalid name or dependency,
    /// [`HostError::ControllerRedeclared`] when the controller already exists,
    /// and any failure raised while creating it or its dependents.
    pub fn controller<C, F>(
        &mut self,
        name: &str,
        dependencies: impl Into<DependencySpec>,
        factory: F,
    ) -> Result<(), HostError>
    where
        C: Controller + 'static,
        F: FnOnce(&Context<'_>) -> Result<C, ArtifactError> + 'static,
    {
        let name = Name::new(Namespace::Controller, name)?;
        let dependencies = normalize(&dependencies.into(), Namespace::Controller)?;
        if self.loader.is_initialised() && self.hooks().controllers.contains(name.local()) {
            return Err(HostError::ControllerRedeclared {
                name: name.local().to_owned(),
            });
        }
        let artifact = Artifact::Controller(Box::new(move |context: &Context<'_>| {
            factory(context).map(|controller| Box::new(controller) as Box<dyn Controller>)
        }));
        self.declare(name, dependencies, artifact)
    }

    /// Reports that an external library finished loading.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Name`] for an invalid name, a wrapped loader
    /// error when the library was already reported, and any failure raised
    /// by dependents created as a result.
    pub fn library_loaded(&mut self, name: &str) -> Result<(), HostError> {
        let name = Name::new(Namespace::Library, name)?;
        self.declare(name, DependencySet::empty(), Artifact::Available)
    }

    /// Reports that a framework extension finished loading.
    ///
    /// # Errors
    ///
    /// As for [`Host::library_loaded`].
    pub fn extension_loaded(&mut self, name: &str) -> Result<(), HostError> {
        let name = Name::new(Namespace::Extension, name)?;
        self.declare(name, DependencySet::empty(), Artifact::Available)
    }

    fn declare(
        &mut self,
        name: Name,
        dependencies: DependencySet,
        artifact: Artifact,
    ) -> Result<(), HostError> {
        if self.loader.is_initialised() {
            self.loader.loaded(name, dependencies, artifact)?;
        } else {
            self.loader.preload(name, dependencies, artifact)?;
        }
        Ok(())
    }

    /// Initialises the host.
    ///
    /// Records the root and the public registry, requests every initial
    /// controller, then creates the preloaded declarations in the order they
    /// were made.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::AlreadyInitialised`] on a second call, and any
    /// failure raised while requesting or creating artifacts.
    pub fn init(&mut self, params: InitParams) -> Result<(), HostError> {
        if self.loader.is_initialised() {
            return Err(HostError::AlreadyInitialised);
        }
        let InitParams {
            root,
            registry,
            controllers,
        } = params;
        let initial = controllers
            .iter()
            .map(|local| Name::new(Namespace::Controller, local.as_str()))
            .collect::<Result<Vec<_>, _>>()?;

        let hooks = self.hooks_mut();
        if let Some(root) = root {
            hooks.root = root;
        }
        hooks.registry = registry;

        self.loader.initialise()?;
        debug!(
            target: TARGET,
            root = %self.root(),
            controllers = initial.len(),
            preloaded = self.loader.preloaded_len(),
            "initialising host"
        );
        self.loader.include(&initial)?;
        self.loader.create_preloaded()?;
        Ok(())
    }

    /// Signals that the document is ready.
    ///
    /// Runs [`Controller::on_dom_load`] on every controller, in creation
    /// order. Ignored once the stage is past [`Stage::Booting`].
    pub fn dom_ready(&mut self) {
        if self.advance(Stage::DomReady) {
            self.hooks_mut()
                .controllers
                .for_each(|controller| controller.on_dom_load());
        }
    }

    /// Signals that the document has fully loaded.
    ///
    /// Runs [`Controller::on_load`] on every controller. Ignored once the
    /// stage is past [`Stage::DomReady`].
    pub fn full_load(&mut self) {
        if self.advance(Stage::Loaded) {
            self.hooks_mut()
                .controllers
                .for_each(|controller| controller.on_load());
        }
    }

    /// Signals that the page is going away.
    ///
    /// Runs [`Controller::on_unload`] then [`Controller::done`] on every
    /// controller. Ignored on repeated calls.
    pub fn unload(&mut self) {
        if self.advance(Stage::Unloaded) {
            self.hooks_mut().controllers.for_each(|controller| {
                controller.on_unload();
                controller.done();
            });
        }
    }

    fn advance(&mut self, stage: Stage) -> bool {
        let hooks = self.hooks_mut();
        if hooks.stage >= stage {
            debug!(target: TARGET, current = %hooks.stage, requested = %stage, "stage ignored");
            return false;
        }
        hooks.stage = stage;
        hooks.reporter.stage_entered(stage, hooks.controllers.len());
        true
    }

    /// Reports entries that have not resolved, logging them when any remain.
    pub fn diagnose(&self) -> StallReport {
        let report = self.loader.stall_report();
        if !report.is_empty() {
            self.hooks().reporter.stalled(&report);
        }
        report
    }
}

impl<T> Host<T> {
    const fn hooks(&self) -> &HostHooks<T> {
        self.loader.hooks()
    }

    const fn hooks_mut(&mut self) -> &mut HostHooks<T> {
        self.loader.hooks_mut()
    }

    /// Returns whether [`Host::init`] has run.
    #[must_use]
    pub const fn is_initialised(&self) -> bool {
        self.loader.is_initialised()
    }

    /// Current lifecycle stage.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        self.hooks().stage
    }

    /// Resource root.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.hooks().root
    }

    /// Public registry supplied at initialisation.
    #[must_use]
    pub const fn registry(&self) -> &Map<String, Value> {
        &self.hooks().registry
    }

    /// Resolution status of `name`.
    #[must_use]
    pub fn status(&self, name: &Name) -> Status {
        self.loader.ledger().status(name)
    }

    /// A created module, when it exists and has type `M`.
    #[must_use]
    pub fn module_ref<M: Any>(&self, name: &str) -> Option<&M> {
        self.hooks().modules.get(name)
    }

    /// Returns whether the controller has been created.
    #[must_use]
    pub fn has_controller(&self, name: &str) -> bool {
        self.hooks().controllers.contains(name)
    }

    /// Created controllers, in creation order.
    #[must_use]
    pub fn controller_names(&self) -> Vec<&str> {
        self.hooks().controllers.names().collect()
    }

    /// Read access to the transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.hooks().transport
    }

    /// Mutable access to the transport, for draining queued requests.
    #[must_use]
    pub const fn transport_mut(&mut self) -> &mut T {
        &mut self.hooks_mut().transport
    }
}
