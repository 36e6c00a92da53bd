//! Errors raised by the host façade.

use thiserror::Error;
use trellis_loader::{LoaderError, Name, NameError};

use crate::artifact::ArtifactError;
use crate::transport::TransportError;

/// Errors raised by [`Host`](crate::Host) operations.
#[derive(Debug, Error)]
pub enum HostError {
    /// A name or dependency token could not be parsed.
    #[error(transparent)]
    Name(#[from] NameError),

    /// The loader rejected the operation.
    #[error(transparent)]
    Loader(Box<LoaderError<HostError>>),

    /// A module with this name has already been created.
    #[error("module '{name}' is already declared")]
    ModuleRedeclared {
        /// Local module name.
        name: String,
    },

    /// A controller with this name has already been created.
    #[error("controller '{name}' is already declared")]
    ControllerRedeclared {
        /// Local controller name.
        name: String,
    },

    /// [`Host::init`](crate::Host::init) was called twice.
    #[error("host already initialised")]
    AlreadyInitialised,

    /// A fetch could not be started.
    #[error("failed to request '{name}': {source}")]
    Transport {
        /// Name being fetched.
        name: Name,
        /// Transport failure.
        #[source]
        source: TransportError,
    },

    /// A controller or module name cannot be mapped to a path under the root.
    #[error("'{name}' does not map to a resource path: segment '{segment}' is not allowed")]
    UnsafeResourceName {
        /// Offending name.
        name: Name,
        /// Rejected dot-separated segment.
        segment: String,
    },

    /// A module or controller factory failed.
    #[error("failed to build '{name}': {source}")]
    Artifact {
        /// Name being created.
        name: Name,
        /// Factory failure.
        #[source]
        source: ArtifactError,
    },
}

impl HostError {
    /// Returns `true` for every redeclaration failure, whichever layer caught it.
    #[must_use]
    pub fn is_redeclaration(&self) -> bool {
        match self {
            Self::ModuleRedeclared { .. } | Self::ControllerRedeclared { .. } => true,
            Self::Loader(error) => {
                matches!(error.as_ref(), LoaderError::Ledger(ledger) if ledger.is_redeclaration())
            }
            _ => false,
        }
    }
}

/// Hook failures come back unchanged; everything else is wrapped.
impl From<LoaderError<Self>> for HostError {
    fn from(error: LoaderError<Self>) -> Self {
        match error {
            LoaderError::Include { source, .. } | LoaderError::Create { source, .. } => source,
            other => Self::Loader(Box::new(other)),
        }
    }
}
