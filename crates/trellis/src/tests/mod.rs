//! Test suites for the host crate.

mod behaviour;
pub(crate) mod support;
