//! Namespaced artifact names.
//!
//! Every artifact the loader knows about is addressed by a [`Name`]: a
//! [`Namespace`] drawn from a closed set plus a local identifier. The textual
//! form is `namespace:local`, for example `c:menu` or `mo:storage.local`.

use std::fmt;
use std::str::FromStr;

use crate::error::NameError;

/// Reserved artifact categories.
///
/// The declaration order of the variants is the canonical order used when
/// normalising per-namespace dependency maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Namespace {
    /// Page controllers (`c`).
    Controller,
    /// Application modules (`mo`).
    Module,
    /// Framework extensions (`go`).
    Extension,
    /// External libraries (`l`).
    Library,
}

impl Namespace {
    /// All namespaces in canonical order.
    pub const ALL: [Self; 4] = [Self::Controller, Self::Module, Self::Extension, Self::Library];

    /// Short token used in the `namespace:local` form.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Controller => "c",
            Self::Module => "mo",
            Self::Extension => "go",
            Self::Library => "l",
        }
    }

    /// Key used for this namespace in per-namespace dependency maps.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Controller => "controllers",
            Self::Module => "modules",
            Self::Extension => "go",
            Self::Library => "libs",
        }
    }

    /// Looks a namespace up by its short token.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ns| ns.token() == token)
    }

    /// Looks a namespace up by map key, accepting the short token as well.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|ns| ns.key() == key || ns.token() == key)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Immutable `(namespace, local)` identifier of a loadable artifact.
///
/// # Example
///
/// ```
/// use trellis_loader::{Name, Namespace};
///
/// let name: Name = "mo:storage.local".parse().expect("valid name");
/// assert_eq!(name.namespace(), Namespace::Module);
/// assert_eq!(name.local(), "storage.local");
/// assert_eq!(name.to_string(), "mo:storage.local");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name {
    namespace: Namespace,
    local: String,
}

impl Name {
    /// Creates a name from a namespace and a local identifier.
    ///
    /// # Errors
    ///
    /// Returns [`NameError::MalformedDependency`] when `local` is empty or
    /// contains a colon.
    pub fn new(namespace: Namespace, local: impl Into<String>) -> Result<Self, NameError> {
        let local_name = local.into();
        if local_name.is_empty() {
            return Err(NameError::malformed(
                format!("{namespace}:"),
                "empty local name",
            ));
        }
        if local_name.contains(':') {
            return Err(NameError::malformed(
                format!("{namespace}:{local_name}"),
                "more than one colon",
            ));
        }
        Ok(Self {
            namespace,
            local: local_name,
        })
    }

    /// Parses a token, applying `default_namespace` when it has no prefix.
    ///
    /// Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`NameError::MalformedDependency`] for empty tokens, empty
    /// namespace or local parts, and tokens with two or more colons.
    /// Returns [`NameError::UnknownNamespace`] when the prefix is not one of
    /// the reserved tokens.
    pub fn parse_with_default(token: &str, default_namespace: Namespace) -> Result<Self, NameError> {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(NameError::malformed(token, "empty token"));
        }
        let Some((prefix, local)) = trimmed.split_once(':') else {
            return Self::new(default_namespace, trimmed);
        };
        Self::from_parts(trimmed, prefix, local)
    }

    fn from_parts(token: &str, prefix: &str, local: &str) -> Result<Self, NameError> {
        if local.contains(':') {
            return Err(NameError::malformed(token, "more than one colon"));
        }
        if prefix.is_empty() {
            return Err(NameError::malformed(token, "empty namespace"));
        }
        if local.is_empty() {
            return Err(NameError::malformed(token, "empty local name"));
        }
        let namespace = Namespace::from_token(prefix)
            .ok_or_else(|| NameError::unknown_namespace(prefix, token))?;
        Ok(Self {
            namespace,
            local: local.to_owned(),
        })
    }

    /// Namespace of the artifact.
    #[must_use]
    pub const fn namespace(&self) -> Namespace {
        self.namespace
    }

    /// Local identifier of the artifact.
    #[must_use]
    pub fn local(&self) -> &str {
        &self.local
    }

    /// Dot-separated segments of the local identifier.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.local.split('.')
    }
}

impl FromStr for Name {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.split_once(':') {
            Some((prefix, local)) => Self::from_parts(trimmed, prefix, local),
            None if trimmed.is_empty() => Err(NameError::malformed(s, "empty token")),
            None => Err(NameError::malformed(s, "missing namespace")),
        }
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.local)
    }
}
