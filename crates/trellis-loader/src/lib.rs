//! Dependency-graph loader for namespaced page artifacts.
//!
//! Artifacts (controllers, modules, framework extensions and external
//! libraries) are addressed by a [`Name`] and declare the names they depend
//! on. The [`Loader`] requests missing dependencies through injected
//! [`LoaderHooks`], records every declaration in a [`Ledger`] and creates
//! each artifact exactly once, after all of its dependencies have been
//! created, regardless of the order in which fetches complete.
//!
//! # Core Types
//!
//! - [`Name`] and [`Namespace`] identify artifacts.
//! - [`DependencySpec`] accepts the declaration shapes callers write;
//!   [`normalize`] turns them into a [`DependencySet`].
//! - [`Ledger`] tracks the [`Status`] of every name seen so far.
//! - [`Loader`] drives preloading, live declarations and creation cascades.
//! - [`StallReport`] explains why entries have not resolved.
//!
//! The loader is single-threaded and synchronous. Completion of an
//! asynchronous fetch is delivered by calling [`Loader::loaded`].

mod deps;
mod engine;
mod error;
mod ledger;
mod name;

pub use deps::{DependencySet, DependencySpec, normalize};
pub use engine::{Loader, LoaderHooks};
pub use error::{LedgerError, LoaderError, NameError};
pub use ledger::{Ledger, LedgerEntry, StallReport, Status, Waiting};
pub use name::{Name, Namespace};

#[cfg(test)]
mod tests;
