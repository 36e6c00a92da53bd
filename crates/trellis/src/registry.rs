//! Storage for created modules and controllers.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use crate::artifact::{Controller, Module};

/// Created modules keyed by local name.
#[derive(Default)]
pub(crate) struct ModuleRegistry {
    modules: HashMap<String, Module>,
}

impl ModuleRegistry {
    pub(crate) fn contains(&self, local: &str) -> bool {
        self.modules.contains_key(local)
    }

    pub(crate) fn insert(&mut self, local: &str, module: Module) {
        self.modules.insert(local.to_owned(), module);
    }

    /// Typed access; `None` when absent or of another type.
    pub(crate) fn get<M: Any>(&self, local: &str) -> Option<&M> {
        self.modules.get(local)?.downcast_ref::<M>()
    }

    pub(crate) fn len(&self) -> usize {
        self.modules.len()
    }
}

impl fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.modules.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ModuleRegistry")
            .field("modules", &names)
            .finish()
    }
}

/// Created controllers, kept in creation order.
#[derive(Default)]
pub(crate) struct ControllerRegistry {
    controllers: Vec<(String, Box<dyn Controller>)>,
    index: HashMap<String, usize>,
}

impl ControllerRegistry {
    pub(crate) fn contains(&self, local: &str) -> bool {
        self.index.contains_key(local)
    }

    pub(crate) fn insert(&mut self, local: &str, controller: Box<dyn Controller>) {
        self.index.insert(local.to_owned(), self.controllers.len());
        self.controllers.push((local.to_owned(), controller));
    }

    pub(crate) fn names(&self) -> impl Iterator<Item = &str> {
        self.controllers.iter().map(|(name, _)| name.as_str())
    }

    pub(crate) fn for_each(&mut self, mut visit: impl FnMut(&mut dyn Controller)) {
        for (_, controller) in &mut self.controllers {
            visit(controller.as_mut());
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.controllers.len()
    }
}

impl fmt::Debug for ControllerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerRegistry")
            .field("controllers", &self.names().collect::<Vec<_>>())
            .finish()
    }
}
