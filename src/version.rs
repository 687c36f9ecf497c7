//! Format versioning primitives
//!
//! A watch face document is validated against every revision of the format
//! at once; the algebra here tracks *which* revisions a document (or a
//! single node, or a single expression) is valid for.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A single format revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(pub u8);

/// The oldest supported format revision.
pub const MIN_VERSION: Version = Version(1);

/// The newest supported format revision. Bumped when a new revision ships.
pub const MAX_VERSION: Version = Version(4);

impl Version {
    /// All revisions from this one up to [`MAX_VERSION`].
    pub fn and_above(self) -> VersionSet {
        VersionSet::range(self, MAX_VERSION)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An unordered set of format revisions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionSet(BTreeSet<Version>);

impl VersionSet {
    /// The empty set: no revision accepts the document.
    pub fn empty() -> Self {
        Self(BTreeSet::new())
    }

    /// The full universe of supported revisions.
    pub fn all() -> Self {
        Self::range(MIN_VERSION, MAX_VERSION)
    }

    /// Inclusive range `[min, max]`; empty when `min > max`.
    pub fn range(min: Version, max: Version) -> Self {
        Self((min.0..=max.0).map(Version).collect())
    }

    pub fn contains(&self, version: Version) -> bool {
        self.0.contains(&version)
    }

    pub fn insert(&mut self, version: Version) {
        self.0.insert(version);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Version> + '_ {
        self.0.iter().copied()
    }

    /// Set intersection. The core operation of the validation algebra:
    /// every constraint and every child narrows the valid set this way.
    pub fn intersect(&self, other: &VersionSet) -> VersionSet {
        Self(self.0.intersection(&other.0).copied().collect())
    }

    /// `universe − self`.
    pub fn complement_of(&self, universe: &VersionSet) -> VersionSet {
        Self(universe.0.difference(&self.0).copied().collect())
    }
}

impl FromIterator<Version> for VersionSet {
    fn from_iter<I: IntoIterator<Item = Version>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl FromIterator<u8> for VersionSet {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        Self(iter.into_iter().map(Version).collect())
    }
}

impl fmt::Display for VersionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", v)?;
        }
        write!(f, "}}")
    }
}

/// An inclusive `[min, max]` range of revisions supporting one symbol.
///
/// The expression parser starts from the full range and intersects in the
/// range of every function and data source it consumes. `min > max` encodes
/// the empty range (two symbols with disjoint support were combined).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRange {
    pub min: Version,
    pub max: Version,
}

impl VersionRange {
    pub fn new(min: Version, max: Version) -> Self {
        Self { min, max }
    }

    /// Supported by every revision.
    pub fn all() -> Self {
        Self::new(MIN_VERSION, MAX_VERSION)
    }

    /// Introduced in `min`, still present in the newest revision.
    pub fn since(min: Version) -> Self {
        Self::new(min, MAX_VERSION)
    }

    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    pub fn intersect(&self, other: &VersionRange) -> VersionRange {
        Self::new(self.min.max(other.min), self.max.min(other.max))
    }

    pub fn to_set(&self) -> VersionSet {
        if self.is_empty() {
            VersionSet::empty()
        } else {
            VersionSet::range(self.min, self.max)
        }
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}
