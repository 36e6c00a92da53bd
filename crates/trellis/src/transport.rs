//! Fetch seam between the host and the page environment.
//!
//! The includer never waits: a [`Transport`] only starts a fetch. Once the
//! resource has arrived and run, the embedder reports it back through
//! [`Host::module`](crate::Host::module), [`Host::controller`](crate::Host::controller),
//! [`Host::library_loaded`](crate::Host::library_loaded) or
//! [`Host::extension_loaded`](crate::Host::extension_loaded).

use std::collections::VecDeque;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

/// Errors raised when a fetch cannot be started.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The transport refused the request.
    #[error("request for '{target}' rejected: {message}")]
    Rejected {
        /// Path or name that was requested.
        target: String,
        /// Reason given by the transport.
        message: String,
    },
    /// The transport no longer accepts requests.
    #[error("transport closed")]
    Closed,
}

/// Starts fetches on behalf of the host.
pub trait Transport {
    /// Fetches a controller or module resource file.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when the fetch cannot be started.
    fn request_file(&mut self, path: &Utf8Path) -> Result<(), TransportError>;

    /// Fetches a framework extension by name.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when the fetch cannot be started.
    fn request_extension(&mut self, name: &str) -> Result<(), TransportError>;

    /// Fetches an external library through the configured library loader.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when the fetch cannot be started.
    fn request_library(&mut self, name: &str) -> Result<(), TransportError>;
}

/// A fetch started through a [`QueuedTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Controller or module resource path.
    File(Utf8PathBuf),
    /// Framework extension name.
    Extension(String),
    /// External library name.
    Library(String),
}

/// Transport that queues requests for an external event loop to serve.
#[derive(Debug, Default)]
pub struct QueuedTransport {
    pending: VecDeque<Request>,
}

impl QueuedTransport {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the oldest pending request.
    pub fn pop(&mut self) -> Option<Request> {
        self.pending.pop_front()
    }

    /// Takes every pending request, oldest first.
    pub fn drain(&mut self) -> Vec<Request> {
        self.pending.drain(..).collect()
    }

    /// Pending requests, oldest first.
    pub fn pending(&self) -> impl Iterator<Item = &Request> {
        self.pending.iter()
    }

    /// Number of pending requests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` when nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl Transport for QueuedTransport {
    fn request_file(&mut self, path: &Utf8Path) -> Result<(), TransportError> {
        self.pending.push_back(Request::File(path.to_owned()));
        Ok(())
    }

    fn request_extension(&mut self, name: &str) -> Result<(), TransportError> {
        self.pending.push_back(Request::Extension(name.to_owned()));
        Ok(())
    }

    fn request_library(&mut self, name: &str) -> Result<(), TransportError> {
        self.pending.push_back(Request::Library(name.to_owned()));
        Ok(())
    }
}
