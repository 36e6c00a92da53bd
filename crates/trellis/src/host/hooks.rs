//! Loader hooks binding names to fetches and factories.

use std::sync::Arc;

use camino::Utf8PathBuf;
use serde_json::{Map, Value};
use trellis_loader::{LoaderHooks, Name, Namespace};

use crate::artifact::{Artifact, Context, ControllerFactory, ModuleFactory};
use crate::error::HostError;
use crate::lifecycle::{LifecycleReporter, Stage};
use crate::registry::{ControllerRegistry, ModuleRegistry};
use crate::transport::Transport;

const CONTROLLERS_DIR: &str = "controllers";
const MODULES_DIR: &str = "modules";

/// State shared by the includer and the creator.
pub(crate) struct HostHooks<T> {
    pub(crate) transport: T,
    pub(crate) root: Utf8PathBuf,
    pub(crate) extension: String,
    pub(crate) registry: Map<String, Value>,
    pub(crate) modules: ModuleRegistry,
    pub(crate) controllers: ControllerRegistry,
    pub(crate) stage: Stage,
    pub(crate) reporter: Arc<dyn LifecycleReporter>,
}

impl<T> HostHooks<T> {
    /// Path of the resource defining a controller or module.
    ///
    /// Dots in the local name become directory separators:
    /// `c:admin.users` maps to `<root>/controllers/admin/users.<extension>`.
    /// Empty segments (which `..` produces) and segments holding a path
    /// separator are rejected, so the path stays under `<root>/<folder>`.
    pub(crate) fn resource_path(
        &self,
        folder: &str,
        name: &Name,
    ) -> Result<Utf8PathBuf, HostError> {
        let mut path = self.root.join(folder);
        for segment in name.segments() {
            if !is_plain_segment(segment) {
                return Err(HostError::UnsafeResourceName {
                    name: name.clone(),
                    segment: segment.to_owned(),
                });
            }
            path.push(segment);
        }
        path.set_extension(&self.extension);
        Ok(path)
    }

    fn create_module(&mut self, name: &Name, factory: ModuleFactory) -> Result<(), HostError> {
        let local = name.local();
        if self.modules.contains(local) {
            return Err(HostError::ModuleRedeclared {
                name: local.to_owned(),
            });
        }
        let context = Context::new(name, &self.registry, &self.modules);
        let module = factory(&context).map_err(|source| HostError::Artifact {
            name: name.clone(),
            source,
        })?;
        self.modules.insert(local, module);
        Ok(())
    }

    fn create_controller(
        &mut self,
        name: &Name,
        factory: ControllerFactory,
    ) -> Result<(), HostError> {
        let local = name.local();
        if self.controllers.contains(local) {
            return Err(HostError::ControllerRedeclared {
                name: local.to_owned(),
            });
        }
        let context = Context::new(name, &self.registry, &self.modules);
        let mut controller = factory(&context).map_err(|source| HostError::Artifact {
            name: name.clone(),
            source,
        })?;
        controller.on_create(&context);
        match self.stage {
            Stage::DomReady => controller.init(),
            Stage::Loaded => {
                controller.init();
                controller.on_load();
            }
            Stage::Booting | Stage::Unloaded => {}
        }
        self.controllers.insert(local, controller);
        Ok(())
    }
}

fn is_plain_segment(segment: &str) -> bool {
    !segment.is_empty() && !segment.contains(['/', '\\'])
}

impl<T: Transport> LoaderHooks<Artifact> for HostHooks<T> {
    type Error = HostError;

    fn include(&mut self, name: &Name) -> Result<(), HostError> {
        let outcome = match name.namespace() {
            Namespace::Controller => {
                let path = self.resource_path(CONTROLLERS_DIR, name)?;
                self.transport.request_file(&path)
            }
            Namespace::Module => {
                let path = self.resource_path(MODULES_DIR, name)?;
                self.transport.request_file(&path)
            }
            Namespace::Extension => self.transport.request_extension(name.local()),
            Namespace::Library => self.transport.request_library(name.local()),
        };
        outcome.map_err(|source| HostError::Transport {
            name: name.clone(),
            source,
        })
    }

    fn create(&mut self, name: &Name, payload: Artifact) -> Result<(), HostError> {
        match payload {
            Artifact::Module(factory) => self.create_module(name, factory)?,
            Artifact::Controller(factory) => self.create_controller(name, factory)?,
            Artifact::Available => {}
        }
        self.reporter.artifact_created(name);
        Ok(())
    }
}
