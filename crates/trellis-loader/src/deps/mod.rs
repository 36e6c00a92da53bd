//! Dependency declarations and their canonical form.
//!
//! Declarations accept dependencies in several shapes, enumerated by
//! [`DependencySpec`]. [`normalize`] turns any of them into a
//! [`DependencySet`], the only representation the ledger works with.

use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;

use crate::error::NameError;
use crate::name::{Name, Namespace};

/// Dependency declaration as written by the caller.
///
/// Deserialises untagged: `null` is [`DependencySpec::Absent`], a string is a
/// comma list, an array is a token sequence and an object maps namespace keys
/// to local names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DependencySpec {
    /// No dependencies.
    #[default]
    Absent,
    /// Comma-separated tokens, each optionally prefixed with `ns:`.
    List(String),
    /// Ordered tokens, each optionally prefixed with `ns:`.
    Sequence(Vec<String>),
    /// Local names keyed by namespace (`controllers`, `modules`, `go`, `libs`).
    ByNamespace(BTreeMap<String, Vec<String>>),
}

impl DependencySpec {
    /// Builds a per-namespace declaration.
    pub fn by_namespace<K, L, S>(entries: impl IntoIterator<Item = (K, L)>) -> Self
    where
        K: Into<String>,
        L: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::ByNamespace(
            entries
                .into_iter()
                .map(|(key, locals)| (key.into(), locals.into_iter().map(Into::into).collect()))
                .collect(),
        )
    }
}

impl From<&str> for DependencySpec {
    fn from(value: &str) -> Self {
        Self::List(value.to_owned())
    }
}

impl From<String> for DependencySpec {
    fn from(value: String) -> Self {
        Self::List(value)
    }
}

impl From<Vec<String>> for DependencySpec {
    fn from(value: Vec<String>) -> Self {
        Self::Sequence(value)
    }
}

impl From<&[&str]> for DependencySpec {
    fn from(value: &[&str]) -> Self {
        Self::Sequence(value.iter().map(|token| (*token).to_owned()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for DependencySpec {
    fn from(value: [&str; N]) -> Self {
        Self::Sequence(value.iter().map(|token| (*token).to_owned()).collect())
    }
}

/// Ordered sequence of dependency names.
///
/// Duplicates are kept as declared; resolving a duplicate has no additional
/// effect. A set is never mutated after construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencySet {
    names: Vec<Name>,
}

impl DependencySet {
    /// Creates a set from already-parsed names, preserving their order.
    #[must_use]
    pub const fn new(names: Vec<Name>) -> Self {
        Self { names }
    }

    /// Creates an empty set.
    #[must_use]
    pub const fn empty() -> Self {
        Self { names: Vec::new() }
    }

    /// Iterates over the names in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Name> {
        self.names.iter()
    }

    /// Iterates over the first occurrence of each name.
    pub fn unique(&self) -> impl Iterator<Item = &Name> {
        let mut seen = HashSet::new();
        self.names.iter().filter(move |name| seen.insert(*name))
    }

    /// Returns whether `name` appears in the set.
    #[must_use]
    pub fn contains(&self, name: &Name) -> bool {
        self.names.contains(name)
    }

    /// Number of names, duplicates included.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` when the set holds no names.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Name] {
        &self.names
    }
}

impl FromIterator<Name> for DependencySet {
    fn from_iter<I: IntoIterator<Item = Name>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a DependencySet {
    type Item = &'a Name;
    type IntoIter = std::slice::Iter<'a, Name>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Normalises a dependency declaration into its canonical form.
///
/// String and sequence forms keep input order; tokens without an explicit
/// `ns:` prefix take `default_namespace`. Per-namespace maps are walked in
/// canonical namespace order (controllers, modules, extensions, libraries)
/// and local names in declaration order.
///
/// # Errors
///
/// Returns [`NameError::MalformedDependency`] for tokens that cannot be
/// parsed and [`NameError::UnknownNamespace`] for prefixes or map keys
/// outside the reserved set.
///
/// # Example
///
/// ```
/// use trellis_loader::{normalize, DependencySpec, Namespace};
///
/// let from_list = normalize(&"c:A, mo:B".into(), Namespace::Module).expect("valid");
/// let from_map = normalize(
///     &DependencySpec::by_namespace([("controllers", ["A"]), ("modules", ["B"])]),
///     Namespace::Module,
/// )
/// .expect("valid");
/// assert_eq!(from_list, from_map);
/// ```
pub fn normalize(
    raw: &DependencySpec,
    default_namespace: Namespace,
) -> Result<DependencySet, NameError> {
    match raw {
        DependencySpec::Absent => Ok(DependencySet::empty()),
        DependencySpec::List(text) if text.trim().is_empty() => Ok(DependencySet::empty()),
        DependencySpec::List(text) => from_tokens(text.split(','), default_namespace),
        DependencySpec::Sequence(tokens) => {
            from_tokens(tokens.iter().map(String::as_str), default_namespace)
        }
        DependencySpec::ByNamespace(map) => from_map(map),
    }
}

fn from_tokens<'a>(
    tokens: impl Iterator<Item = &'a str>,
    default_namespace: Namespace,
) -> Result<DependencySet, NameError> {
    tokens
        .map(|token| Name::parse_with_default(token, default_namespace))
        .collect()
}

fn from_map(map: &BTreeMap<String, Vec<String>>) -> Result<DependencySet, NameError> {
    if let Some(key) = map.keys().find(|key| Namespace::from_key(key).is_none()) {
        return Err(NameError::unknown_namespace(key.as_str(), key.as_str()));
    }

    let mut names = Vec::new();
    for namespace in Namespace::ALL {
        let locals = map
            .iter()
            .filter(|(key, _)| Namespace::from_key(key) == Some(namespace))
            .flat_map(|(_, locals)| locals);
        for local in locals {
            names.push(Name::new(namespace, local.trim())?);
        }
    }
    Ok(DependencySet::new(names))
}
