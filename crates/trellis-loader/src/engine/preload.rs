//! FIFO buffer of declarations made before initialisation.

use std::collections::HashMap;

use crate::deps::DependencySet;
use crate::name::Name;

/// One buffered or queued declaration.
#[derive(Debug)]
pub(crate) struct Declaration<P> {
    pub(crate) name: Name,
    pub(crate) dependencies: DependencySet,
    pub(crate) payload: P,
}

/// Declarations accepted before initialisation.
///
/// Slots are drained by position. A slot emptied early, because a cascade
/// requested its name, is skipped by the drain rather than declared twice.
#[derive(Debug)]
pub(crate) struct PreloadBuffer<P> {
    slots: Vec<Option<Declaration<P>>>,
    /// First buffered position of each name.
    index: HashMap<Name, usize>,
}

impl<P> Default for PreloadBuffer<P> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<P> PreloadBuffer<P> {
    pub(crate) fn push(&mut self, declaration: Declaration<P>) {
        let position = self.slots.len();
        self.index
            .entry(declaration.name.clone())
            .or_insert(position);
        self.slots.push(Some(declaration));
    }

    /// Takes the first still-buffered declaration of `name`.
    pub(crate) fn take(&mut self, name: &Name) -> Option<Declaration<P>> {
        let position = self.index.remove(name)?;
        self.slots.get_mut(position).and_then(Option::take)
    }

    /// Takes the declaration at `position`, if it has not been taken yet.
    pub(crate) fn take_at(&mut self, position: usize) -> Option<Declaration<P>> {
        let declaration = self.slots.get_mut(position).and_then(Option::take)?;
        if self.index.get(&declaration.name) == Some(&position) {
            self.index.remove(&declaration.name);
        }
        Some(declaration)
    }

    /// Number of slots, taken ones included.
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    /// Number of declarations still buffered.
    pub(crate) fn buffered(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.index.clear();
    }
}
