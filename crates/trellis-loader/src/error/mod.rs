//! Domain errors raised by the loader.
//!
//! Every failure is synchronous and surfaces at the call that caused it.
//! Nothing is logged and swallowed internally; retry policy belongs to the
//! collaborators behind [`LoaderHooks`](crate::LoaderHooks).

use thiserror::Error;

use crate::name::Name;

/// Errors raised while turning a textual token into a [`Name`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    /// The token cannot be split into `namespace:local`.
    #[error("malformed dependency '{token}': {reason}")]
    MalformedDependency {
        /// Offending token, as written by the caller.
        token: String,
        /// Short description of the defect.
        reason: &'static str,
    },

    /// The token is well formed but names a namespace outside the reserved set.
    #[error("unknown namespace '{namespace}' in '{token}'")]
    UnknownNamespace {
        /// Namespace part of the token.
        namespace: String,
        /// Offending token, as written by the caller.
        token: String,
    },
}

impl NameError {
    /// Creates a new `MalformedDependency` error.
    #[must_use]
    pub fn malformed(token: impl Into<String>, reason: &'static str) -> Self {
        Self::MalformedDependency {
            token: token.into(),
            reason,
        }
    }

    /// Creates a new `UnknownNamespace` error.
    #[must_use]
    pub fn unknown_namespace(namespace: impl Into<String>, token: impl Into<String>) -> Self {
        Self::UnknownNamespace {
            namespace: namespace.into(),
            token: token.into(),
        }
    }
}

/// Errors raised by the resolution ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The name was already declared (or already resolved).
    #[error("'{name}' is already declared")]
    Redeclared {
        /// Name that was declared twice.
        name: Name,
    },

    /// The name was resolved a second time.
    #[error("'{name}' is already resolved")]
    AlreadyResolved {
        /// Name that was resolved twice.
        name: Name,
    },

    /// The name has no declaration to act on.
    #[error("'{name}' has not been declared")]
    NotDeclared {
        /// Name that lacks a declaration.
        name: Name,
    },

    /// The name still waits on unresolved dependencies.
    #[error("'{name}' still waits on {remaining} unresolved dependencies")]
    NotReady {
        /// Name that is not ready.
        name: Name,
        /// Number of dependencies still unresolved.
        remaining: usize,
    },
}

impl LedgerError {
    /// Returns `true` for the redeclaration class of failures.
    ///
    /// Resolving twice is reported as [`LedgerError::AlreadyResolved`] but
    /// belongs to the same class as declaring twice.
    #[must_use]
    pub const fn is_redeclaration(&self) -> bool {
        matches!(self, Self::Redeclared { .. } | Self::AlreadyResolved { .. })
    }
}

/// Errors raised by the [`Loader`](crate::Loader).
///
/// `E` is the error type of the injected hooks; hook failures are carried
/// unchanged in [`LoaderError::Include`] and [`LoaderError::Create`].
#[derive(Debug, Error)]
pub enum LoaderError<E> {
    /// A dependency could not be named.
    #[error(transparent)]
    Name(#[from] NameError),

    /// The ledger rejected the operation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// A preload arrived after initialisation.
    #[error("'{name}' preloaded after initialisation")]
    PreloadAfterInit {
        /// Name of the late declaration.
        name: Name,
    },

    /// A live declaration arrived before initialisation.
    #[error("'{name}' declared before initialisation")]
    LiveDeclareBeforeInit {
        /// Name of the early declaration.
        name: Name,
    },

    /// The preload buffer was drained before initialisation.
    #[error("loader is not initialised")]
    NotInitialised,

    /// Initialisation (or the preload drain) was attempted twice.
    #[error("loader already initialised")]
    AlreadyInitialised,

    /// The includer hook failed.
    #[error("failed to include '{name}': {source}")]
    Include {
        /// Name whose fetch was requested.
        name: Name,
        /// Error returned by the hook.
        #[source]
        source: E,
    },

    /// The creator hook failed.
    #[error("failed to create '{name}': {source}")]
    Create {
        /// Name whose creation was attempted.
        name: Name,
        /// Error returned by the hook.
        #[source]
        source: E,
    },
}
