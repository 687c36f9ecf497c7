//! Per-node validation scratch state
//!
//! A fresh context is created for every element the validator visits and
//! discarded once that element's subtree is done; registrations made while
//! validating one child never leak to a sibling. Conditions *declare*
//! attributes, children, and content rules here as a side effect of being
//! evaluated, and the validator reads the registries back to enforce the
//! closed-world schema and to recurse.

use crate::condition::ValueRule;
use crate::constraint::{ConstraintThunk, Occurs};
use std::collections::BTreeMap;

/// Declared child tag: how to validate it and how often it may occur.
#[derive(Clone)]
pub struct ChildSpec {
    pub thunk: ConstraintThunk,
    pub occurs: Occurs,
}

pub struct ValidationContext {
    /// Slash-joined element path from the document root, for diagnostics.
    path: String,
    /// Snapshot of the current element's attributes, for conditions that
    /// cross-reference a sibling attribute of the value they check.
    scope: BTreeMap<String, String>,
    declared_attributes: BTreeMap<String, ValueRule>,
    declared_children: BTreeMap<String, ChildSpec>,
    content_rules: Vec<ValueRule>,
}

impl ValidationContext {
    pub fn new(path: String, attributes: &BTreeMap<String, String>) -> Self {
        Self {
            path,
            scope: attributes.clone(),
            declared_attributes: BTreeMap::new(),
            declared_children: BTreeMap::new(),
            content_rules: Vec::new(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn scope_attribute(&self, name: &str) -> Option<&str> {
        self.scope.get(name).map(String::as_str)
    }

    /// Mark an attribute as permitted on this element. Later declarations
    /// for the same name win, matching evaluation order.
    pub fn declare_attribute(&mut self, name: &str, rule: ValueRule) {
        self.declared_attributes.insert(name.to_string(), rule);
    }

    pub fn declare_child(&mut self, tag: &str, thunk: ConstraintThunk, occurs: Occurs) {
        self.declared_children
            .insert(tag.to_string(), ChildSpec { thunk, occurs });
    }

    pub fn push_content_rule(&mut self, rule: ValueRule) {
        self.content_rules.push(rule);
    }

    pub fn is_declared_attribute(&self, name: &str) -> bool {
        self.declared_attributes.contains_key(name)
    }

    pub fn is_declared_child(&self, tag: &str) -> bool {
        self.declared_children.contains_key(tag)
    }

    pub fn declared_children(&self) -> impl Iterator<Item = (&str, &ChildSpec)> {
        self.declared_children.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn content_rules(&self) -> &[ValueRule] {
        &self.content_rules
    }
}
