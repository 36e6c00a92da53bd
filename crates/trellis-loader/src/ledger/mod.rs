//! Resolution ledger: the state store behind the loader.
//!
//! The [`Ledger`] records, for every [`Name`] ever mentioned, whether it has
//! been requested, declared or resolved. Declared entries carry the number
//! of dependencies that are still unresolved; a reverse index maps each
//! unresolved dependency to the entries waiting on it so a resolution only
//! touches its direct waiters.
//!
//! The ledger tracks resolution only. It never owns the artifacts whose
//! creation it triggers.

mod stall;

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::deps::DependencySet;
use crate::error::LedgerError;
use crate::name::Name;

pub use self::stall::{StallReport, Waiting};

/// Position of an entry in its lifecycle.
///
/// Statuses are ordered and only ever advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Status {
    /// Mentioned but not yet requested.
    Unrequested,
    /// Requested through the includer; no declaration has arrived yet.
    Requested,
    /// Declared, waiting on at least one unresolved dependency.
    Pending,
    /// Created and resolved.
    Resolved,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unrequested => "unrequested",
            Self::Requested => "requested",
            Self::Pending => "pending",
            Self::Resolved => "resolved",
        })
    }
}

/// Ledger state for one name.
#[derive(Debug, Clone)]
pub struct LedgerEntry<P> {
    status: Status,
    sequence: Option<usize>,
    dependencies: DependencySet,
    remaining: usize,
    payload: Option<P>,
}

impl<P> LedgerEntry<P> {
    const fn unrequested() -> Self {
        Self {
            status: Status::Unrequested,
            sequence: None,
            dependencies: DependencySet::empty(),
            remaining: 0,
            payload: None,
        }
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> Status {
        self.status
    }

    /// Position among declarations, once declared.
    #[must_use]
    pub const fn declaration_order(&self) -> Option<usize> {
        self.sequence
    }

    /// Dependencies recorded at declaration time.
    #[must_use]
    pub const fn dependencies(&self) -> &DependencySet {
        &self.dependencies
    }

    /// Number of dependencies not yet resolved.
    ///
    /// Only meaningful while the entry is [`Status::Pending`].
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.remaining
    }

    /// Declared payload, until the creator takes it.
    #[must_use]
    pub const fn payload(&self) -> Option<&P> {
        self.payload.as_ref()
    }
}

/// Resolution state store.
///
/// # Example
///
/// ```
/// use trellis_loader::{DependencySet, Ledger, Name, Status};
///
/// let a: Name = "mo:A".parse().expect("valid name");
/// let b: Name = "mo:B".parse().expect("valid name");
///
/// let mut ledger = Ledger::new();
/// let ready = ledger
///     .declare(a.clone(), DependencySet::new(vec![b.clone()]), "a")
///     .expect("first declaration");
/// assert!(!ready);
///
/// assert!(ledger.declare(b.clone(), DependencySet::empty(), "b").expect("declared"));
/// let cascade = ledger.resolve(&b).expect("b is ready");
/// assert_eq!(cascade, vec![a.clone()]);
/// assert_eq!(ledger.status(&a), Status::Pending);
/// assert_eq!(ledger.remaining(&a), Some(0));
/// ```
#[derive(Debug, Clone)]
pub struct Ledger<P> {
    entries: HashMap<Name, LedgerEntry<P>>,
    /// Names in order of first mention.
    order: Vec<Name>,
    /// Reverse index: dependency -> names waiting on it, in registration order.
    waiters: HashMap<Name, Vec<Name>>,
    declared: usize,
}

impl<P> Default for Ledger<P> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
            waiters: HashMap::new(),
            declared: 0,
        }
    }
}

impl<P> Ledger<P> {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entry_mut(&mut self, name: &Name) -> &mut LedgerEntry<P> {
        if !self.entries.contains_key(name) {
            self.order.push(name.clone());
        }
        self.entries
            .entry(name.clone())
            .or_insert_with(LedgerEntry::unrequested)
    }

    /// Returns the entry for `name`, creating an unrequested one if needed.
    pub fn ensure_entry(&mut self, name: &Name) -> &LedgerEntry<P> {
        self.entry_mut(name)
    }

    /// Moves `name` from unrequested to requested.
    ///
    /// Returns `true` when the status changed; entries already requested or
    /// further along are left untouched.
    pub fn mark_requested(&mut self, name: &Name) -> bool {
        let entry = self.entry_mut(name);
        if entry.status == Status::Unrequested {
            entry.status = Status::Requested;
            true
        } else {
            false
        }
    }

    /// Checks that `name` may still be declared.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Redeclared`] when the name is already pending
    /// or resolved.
    pub fn ensure_declarable(&self, name: &Name) -> Result<(), LedgerError> {
        if self.status(name) >= Status::Pending {
            return Err(LedgerError::Redeclared { name: name.clone() });
        }
        Ok(())
    }

    /// Declares `name` with its dependencies and payload.
    ///
    /// Counts the distinct dependencies not yet resolved and registers `name`
    /// as a waiter on each of them. Returns `true` when nothing remains, in
    /// which case the caller should create the artifact right away.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Redeclared`] when the name is already pending
    /// or resolved; the existing declaration is left intact.
    pub fn declare(
        &mut self,
        name: Name,
        dependencies: DependencySet,
        payload: P,
    ) -> Result<bool, LedgerError> {
        self.ensure_declarable(&name)?;

        let mut remaining = 0;
        let mut seen = HashSet::new();
        for dependency in dependencies.iter() {
            if !seen.insert(dependency) || self.status(dependency) == Status::Resolved {
                continue;
            }
            self.entry_mut(dependency);
            self.waiters
                .entry(dependency.clone())
                .or_default()
                .push(name.clone());
            remaining += 1;
        }

        let sequence = self.declared;
        self.declared += 1;
        let entry = self.entry_mut(&name);
        entry.status = Status::Pending;
        entry.sequence = Some(sequence);
        entry.dependencies = dependencies;
        entry.remaining = remaining;
        entry.payload = Some(payload);
        Ok(remaining == 0)
    }

    /// Marks `name` resolved and releases its waiters.
    ///
    /// Returns the waiters whose remaining count reached zero, ordered by
    /// declaration. The caller creates each of them and resolves it in turn.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::AlreadyResolved`] on a second resolution,
    /// [`LedgerError::NotReady`] while dependencies remain, and
    /// [`LedgerError::NotDeclared`] when the name was never declared.
    pub fn resolve(&mut self, name: &Name) -> Result<Vec<Name>, LedgerError> {
        let entry = self
            .entries
            .get_mut(name)
            .ok_or_else(|| LedgerError::NotDeclared { name: name.clone() })?;
        match entry.status {
            Status::Resolved => {
                return Err(LedgerError::AlreadyResolved { name: name.clone() });
            }
            Status::Pending if entry.remaining > 0 => {
                return Err(LedgerError::NotReady {
                    name: name.clone(),
                    remaining: entry.remaining,
                });
            }
            Status::Pending => entry.status = Status::Resolved,
            Status::Unrequested | Status::Requested => {
                return Err(LedgerError::NotDeclared { name: name.clone() });
            }
        }

        let mut ready = Vec::new();
        for waiter in self.waiters.remove(name).unwrap_or_default() {
            let Some(waiting) = self.entries.get_mut(&waiter) else {
                continue;
            };
            waiting.remaining = waiting.remaining.saturating_sub(1);
            if waiting.remaining == 0 && waiting.status == Status::Pending {
                ready.push((waiting.sequence, waiter));
            }
        }
        ready.sort_by_key(|(sequence, _)| *sequence);
        Ok(ready.into_iter().map(|(_, waiter)| waiter).collect())
    }

    /// Takes the declared payload out of the entry, leaving the entry itself.
    pub fn take_payload(&mut self, name: &Name) -> Option<P> {
        self.entries.get_mut(name).and_then(|entry| entry.payload.take())
    }

    /// Status of `name`; names never mentioned are unrequested.
    #[must_use]
    pub fn status(&self, name: &Name) -> Status {
        self.entries
            .get(name)
            .map_or(Status::Unrequested, LedgerEntry::status)
    }

    /// Entry for `name`, if it was ever mentioned.
    #[must_use]
    pub fn entry(&self, name: &Name) -> Option<&LedgerEntry<P>> {
        self.entries.get(name)
    }

    /// Remaining dependency count of a pending entry.
    #[must_use]
    pub fn remaining(&self, name: &Name) -> Option<usize> {
        self.entries
            .get(name)
            .filter(|entry| entry.status == Status::Pending)
            .map(LedgerEntry::remaining)
    }

    /// Names currently waiting on `name`, in registration order.
    #[must_use]
    pub fn waiters_of(&self, name: &Name) -> &[Name] {
        self.waiters.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// Iterates over all entries in order of first mention.
    pub fn iter(&self) -> impl Iterator<Item = (&Name, &LedgerEntry<P>)> {
        self.order
            .iter()
            .filter_map(|name| self.entries.get(name).map(|entry| (name, entry)))
    }

    /// Names with the given status, in order of first mention.
    #[must_use]
    pub fn names_with_status(&self, status: Status) -> Vec<&Name> {
        self.iter()
            .filter(|(_, entry)| entry.status == status)
            .map(|(name, _)| name)
            .collect()
    }

    /// Number of names ever mentioned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no name was ever mentioned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
