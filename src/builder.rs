//! Constraint builder DSL
//!
//! Declarative assembly of one element tag's constraint tree. Each schema
//! definition gets its own fresh builder; the accumulated rules are folded
//! with [`Constraint::And`] behind an implicit requirement that the
//! element's tag actually matches the declared tag.
//!
//! ```
//! use wff_validator::builder::ConstraintBuilder;
//! use wff_validator::condition::{positive_integer, ValueRule};
//! use wff_validator::constraint::{lazy, Constraint, Occurs};
//! use std::sync::Arc;
//!
//! let group = ConstraintBuilder::element("Group")
//!     .attribute("x", ValueRule::Plain(positive_integer()))
//!     .child("Group", lazy(|| Arc::new(Constraint::PassAll)), Occurs::any())
//!     .build();
//! ```

use crate::condition::{tag_is, ElementCondition, ValueRule};
use crate::constraint::{Constraint, ConstraintThunk, Occurs};
use crate::version::VersionSet;
use std::sync::Arc;

/// Accumulates constraints for one element tag.
pub struct ConstraintBuilder {
    tag: String,
    parts: Vec<Constraint>,
}

impl ConstraintBuilder {
    pub fn element(tag: impl Into<String>) -> Self {
        let tag = tag.into();
        assert!(!tag.is_empty(), "element tag must not be empty");
        Self {
            tag,
            parts: Vec::new(),
        }
    }

    /// Scope the next `require`/`allow` to a subset of versions.
    pub fn versions(self, versions: VersionSet) -> VersionScope {
        assert!(
            !versions.is_empty(),
            "a version scope on <{}> must name at least one version",
            self.tag
        );
        VersionScope {
            builder: self,
            versions,
        }
    }

    /// Require `conditions` in every version.
    pub fn require(self, conditions: Vec<ElementCondition>) -> Self {
        self.versions(VersionSet::all()).require(conditions)
    }

    /// Allow `conditions` in every version (declaration side effects only).
    pub fn allow(self, conditions: Vec<ElementCondition>) -> Self {
        self.versions(VersionSet::all()).allow(conditions)
    }

    /// Declare an optional attribute with its value rule.
    pub fn attribute(mut self, name: impl Into<String>, rule: ValueRule) -> Self {
        self.parts.push(Constraint::Attribute {
            name: name.into(),
            rule,
        });
        self
    }

    /// Validate the element's text content.
    pub fn content(mut self, rule: ValueRule) -> Self {
        self.parts.push(Constraint::Content { rule });
        self
    }

    /// Declare a permitted child tag.
    pub fn child(mut self, tag: impl Into<String>, thunk: ConstraintThunk, occurs: Occurs) -> Self {
        self.parts.push(Constraint::Child {
            tag: tag.into(),
            thunk,
            occurs,
        });
        self
    }

    pub fn push(mut self, constraint: Constraint) -> Self {
        self.parts.push(constraint);
        self
    }

    /// Fold the accumulated rules, appending the implicit tag check.
    pub fn build(mut self) -> Arc<Constraint> {
        self.parts.push(Constraint::Required {
            conditions: vec![tag_is(self.tag.clone())],
            versions: VersionSet::all(),
        });
        let folded = self
            .parts
            .into_iter()
            .reduce(|acc, next| Constraint::And(Box::new(acc), Box::new(next)))
            .unwrap_or(Constraint::PassAll);
        Arc::new(folded)
    }
}

/// A builder with a pending version scope; see [`ConstraintBuilder::versions`].
pub struct VersionScope {
    builder: ConstraintBuilder,
    versions: VersionSet,
}

impl VersionScope {
    pub fn require(mut self, conditions: Vec<ElementCondition>) -> ConstraintBuilder {
        assert!(
            !conditions.is_empty(),
            "require on <{}> needs at least one condition",
            self.builder.tag
        );
        self.builder.parts.push(Constraint::Required {
            conditions,
            versions: self.versions,
        });
        self.builder
    }

    pub fn allow(mut self, conditions: Vec<ElementCondition>) -> ConstraintBuilder {
        assert!(
            !conditions.is_empty(),
            "allow on <{}> needs at least one condition",
            self.builder.tag
        );
        self.builder.parts.push(Constraint::Allowed {
            conditions,
            versions: self.versions,
        });
        self.builder
    }
}
