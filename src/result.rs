//! Validation outcomes
//!
//! A validation run produces the set of format revisions the document is
//! valid for, plus a map of diagnostics keyed by revision. Version-scoped
//! errors land under their revision; structural errors that hold regardless
//! of revision land under the reserved [`ErrorKey::Global`] key.

use crate::version::VersionSet;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Key of one error-map bucket. `Global` sorts before any version so
/// structural errors lead the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorKey {
    Global,
    Version(crate::version::Version),
}

// Serialized as the display string so the error map stays a JSON object.
impl Serialize for ErrorKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl fmt::Display for ErrorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKey::Global => write!(f, "all versions"),
            ErrorKey::Version(v) => write!(f, "version {}", v),
        }
    }
}

/// One validation diagnostic. Every variant carries the element path it
/// applies to; version-scoped variants additionally carry the revisions the
/// instance applies to.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
pub enum ValidationError {
    #[error("element <{tag}> is not allowed here")]
    IllegalTag { path: String, tag: String },

    #[error("attribute '{attribute}' is not allowed here")]
    IllegalAttribute { path: String, attribute: String },

    #[error("required condition failed: {message}")]
    RequiredConditionFailed {
        path: String,
        message: String,
        versions: VersionSet,
    },

    #[error("element <{tag}> occurs {count} time(s), expected {expected}")]
    TagOccurrence {
        path: String,
        tag: String,
        count: usize,
        expected: String,
    },

    #[error("invalid value for attribute '{attribute}': {message}")]
    AttributeValueInvalid {
        path: String,
        attribute: String,
        message: String,
    },

    #[error("invalid content: {message}")]
    ContentInvalid { path: String, message: String },

    #[error("expression syntax error: {message}")]
    ExpressionSyntax { path: String, message: String },

    #[error("only supported in versions {versions}: {reason}")]
    VersionEliminated {
        path: String,
        reason: String,
        versions: VersionSet,
    },

    #[error("{message}")]
    Unknown { path: String, message: String },
}

impl ValidationError {
    pub fn path(&self) -> &str {
        match self {
            ValidationError::IllegalTag { path, .. }
            | ValidationError::IllegalAttribute { path, .. }
            | ValidationError::RequiredConditionFailed { path, .. }
            | ValidationError::TagOccurrence { path, .. }
            | ValidationError::AttributeValueInvalid { path, .. }
            | ValidationError::ContentInvalid { path, .. }
            | ValidationError::ExpressionSyntax { path, .. }
            | ValidationError::VersionEliminated { path, .. }
            | ValidationError::Unknown { path, .. } => path,
        }
    }
}

/// Diagnostics grouped by revision (or global).
pub type ErrorMap = BTreeMap<ErrorKey, Vec<ValidationError>>;

/// Three observable shapes of a [`ValidationResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultKind {
    /// Every supported revision accepts the document, no diagnostics.
    Success,
    /// Some revisions accept the document; diagnostics explain the rest.
    Partial,
    /// No revision accepts the document.
    Failure,
}

/// The outcome of validating one node (or, bubbled to the root, one
/// document): valid revisions plus diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    pub versions: VersionSet,
    pub errors: ErrorMap,
}

impl ValidationResult {
    /// No restriction and no diagnostics: the identity of [`Self::merge`].
    pub fn unrestricted() -> Self {
        Self {
            versions: VersionSet::all(),
            errors: ErrorMap::new(),
        }
    }

    pub fn push(&mut self, key: ErrorKey, error: ValidationError) {
        self.errors.entry(key).or_default().push(error);
    }

    /// Record a global, version-independent error without restricting the
    /// valid set (structural errors contribute diagnostics only; see the
    /// walker for how they weigh on the final verdict).
    pub fn push_global(&mut self, error: ValidationError) {
        self.push(ErrorKey::Global, error);
    }

    /// Combine two outcomes for the same node: version sets intersect,
    /// error maps concatenate per key.
    pub fn merge(mut self, other: ValidationResult) -> ValidationResult {
        self.versions = self.versions.intersect(&other.versions);
        for (key, mut errors) in other.errors {
            self.errors.entry(key).or_default().append(&mut errors);
        }
        self
    }

    pub fn has_errors(&self) -> bool {
        self.errors.values().any(|list| !list.is_empty())
    }

    /// Classify the result. Derived, never stored: `Failure` when no
    /// revision survives, `Success` when every revision survives with a
    /// clean error map, `Partial` otherwise.
    pub fn kind(&self) -> ResultKind {
        if self.versions.is_empty() {
            ResultKind::Failure
        } else if !self.has_errors() && self.versions == VersionSet::all() {
            ResultKind::Success
        } else {
            ResultKind::Partial
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::Version;

    fn eliminated(path: &str) -> ValidationError {
        ValidationError::VersionEliminated {
            path: path.to_string(),
            reason: "test".to_string(),
            versions: [2u8].into_iter().collect(),
        }
    }

    #[test]
    fn test_merge_intersects_and_concatenates() {
        let mut a = ValidationResult::unrestricted();
        a.versions = [2u8, 3].into_iter().collect();
        a.push(ErrorKey::Version(Version(1)), eliminated("A"));

        let mut b = ValidationResult::unrestricted();
        b.versions = [3u8, 4].into_iter().collect();
        b.push(ErrorKey::Version(Version(1)), eliminated("B"));
        b.push_global(eliminated("C"));

        let merged = a.merge(b);
        assert_eq!(merged.versions, [3u8].into_iter().collect());
        assert_eq!(merged.errors[&ErrorKey::Version(Version(1))].len(), 2);
        assert_eq!(merged.errors[&ErrorKey::Global].len(), 1);
    }

    #[test]
    fn test_kind_classification() {
        let clean = ValidationResult::unrestricted();
        assert_eq!(clean.kind(), ResultKind::Success);

        let mut partial = ValidationResult::unrestricted();
        partial.versions = [3u8, 4].into_iter().collect();
        partial.push(ErrorKey::Version(Version(1)), eliminated("x"));
        assert_eq!(partial.kind(), ResultKind::Partial);

        let mut failed = ValidationResult::unrestricted();
        failed.versions = VersionSet::empty();
        assert_eq!(failed.kind(), ResultKind::Failure);
    }

    #[test]
    fn test_global_key_sorts_first() {
        let mut result = ValidationResult::unrestricted();
        result.push(ErrorKey::Version(Version(1)), eliminated("x"));
        result.push_global(eliminated("y"));
        let first = result.errors.keys().next().unwrap();
        assert_eq!(*first, ErrorKey::Global);
    }
}
