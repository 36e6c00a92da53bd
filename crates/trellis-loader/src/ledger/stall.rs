//! Read-only diagnostics for entries that never resolve.
//!
//! A fetch that never completes, or a dependency cycle, leaves entries
//! pending forever without any error. [`StallReport`] makes that state
//! visible on demand; producing it never changes ledger behaviour.

use std::collections::{HashMap, HashSet};
use std::fmt;

use super::{Ledger, Status};
use crate::name::Name;

/// A pending entry and the dependencies it still waits on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Waiting {
    name: Name,
    blocked_on: Vec<Name>,
}

impl Waiting {
    /// Pending name.
    #[must_use]
    pub const fn name(&self) -> &Name {
        &self.name
    }

    /// Unresolved dependencies, first occurrence order.
    #[must_use]
    pub fn blocked_on(&self) -> &[Name] {
        &self.blocked_on
    }
}

/// Snapshot of everything that has not resolved yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StallReport {
    unfetched: Vec<Name>,
    waiting: Vec<Waiting>,
    cycles: Vec<Vec<Name>>,
}

impl StallReport {
    /// Names requested from the includer that were never declared.
    #[must_use]
    pub fn unfetched(&self) -> &[Name] {
        &self.unfetched
    }

    /// Pending names in declaration order.
    #[must_use]
    pub fn waiting(&self) -> &[Waiting] {
        &self.waiting
    }

    /// Dependency cycles among pending names.
    ///
    /// Each cycle lists its members in dependency order, starting from the
    /// member reached first.
    #[must_use]
    pub fn cycles(&self) -> &[Vec<Name>] {
        &self.cycles
    }

    /// Returns `true` when everything mentioned has resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.unfetched.is_empty() && self.waiting.is_empty()
    }
}

impl fmt::Display for StallReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} unfetched, {} waiting, {} cycles",
            self.unfetched.len(),
            self.waiting.len(),
            self.cycles.len()
        )
    }
}

impl<P> Ledger<P> {
    /// Builds a [`StallReport`] describing every unresolved entry.
    #[must_use]
    pub fn stall_report(&self) -> StallReport {
        let unfetched = self
            .names_with_status(Status::Requested)
            .into_iter()
            .cloned()
            .collect();

        let mut pending: Vec<_> = self
            .iter()
            .filter(|(_, entry)| entry.status == Status::Pending)
            .collect();
        pending.sort_by_key(|(_, entry)| entry.sequence);

        let waiting = pending
            .iter()
            .map(|(name, entry)| Waiting {
                name: (*name).clone(),
                blocked_on: entry
                    .dependencies
                    .unique()
                    .filter(|dependency| self.status(dependency) != Status::Resolved)
                    .cloned()
                    .collect(),
            })
            .collect::<Vec<_>>();

        let cycles = find_cycles(&waiting);
        StallReport {
            unfetched,
            waiting,
            cycles,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

fn find_cycles(waiting: &[Waiting]) -> Vec<Vec<Name>> {
    let edges: HashMap<&Name, &[Name]> = waiting
        .iter()
        .map(|entry| (&entry.name, entry.blocked_on.as_slice()))
        .collect();
    let mut search = CycleSearch {
        edges,
        marks: HashMap::new(),
        path: Vec::new(),
        cycles: Vec::new(),
        reported: HashSet::new(),
    };
    for entry in waiting {
        search.visit(&entry.name);
    }
    search.cycles
}

/// Depth-first search over pending entries with an explicit frame stack.
struct CycleSearch<'a> {
    edges: HashMap<&'a Name, &'a [Name]>,
    marks: HashMap<&'a Name, Mark>,
    /// Names on the current path, parallel to the frame stack.
    path: Vec<&'a Name>,
    cycles: Vec<Vec<Name>>,
    reported: HashSet<Vec<Name>>,
}

impl<'a> CycleSearch<'a> {
    fn visit(&mut self, start: &'a Name) {
        if self.marks.contains_key(start) {
            return;
        }
        self.enter(start);
        // Each frame holds a node and the index of its next edge.
        let mut stack: Vec<(&'a Name, usize)> = vec![(start, 0)];

        while let Some(frame) = stack.last_mut() {
            let (node, next) = *frame;
            let outgoing = self.edges.get(node).copied().unwrap_or_default();
            let Some(dependency) = outgoing.get(next) else {
                stack.pop();
                self.path.pop();
                self.marks.insert(node, Mark::Done);
                continue;
            };
            frame.1 += 1;
            if !self.edges.contains_key(dependency) {
                continue;
            }
            match self.marks.get(dependency).copied() {
                Some(Mark::Done) => {}
                Some(Mark::Visiting) => self.record_cycle(dependency),
                None => {
                    self.enter(dependency);
                    stack.push((dependency, 0));
                }
            }
        }
    }

    fn enter(&mut self, node: &'a Name) {
        self.marks.insert(node, Mark::Visiting);
        self.path.push(node);
    }

    fn record_cycle(&mut self, node: &Name) {
        let Some(start) = self.path.iter().position(|member| *member == node) else {
            return;
        };
        let cycle: Vec<Name> = self
            .path
            .iter()
            .skip(start)
            .map(|member| (*member).clone())
            .collect();
        let mut key = cycle.clone();
        key.sort();
        if self.reported.insert(key) {
            self.cycles.push(cycle);
        }
    }
}
