//! Document validation walk
//!
//! Walks a concrete element tree against a root constraint. Per node: run
//! the constraint (populating the context's registries), apply deferred
//! content rules, enforce the closed-world schema over attributes and child
//! tags, then recurse into declared children whose occurrence count is in
//! range. Version sets intersect and error maps merge all the way back to
//! the root.

use crate::constraint::{apply_value_rule, Constraint, ConstraintThunk, ValueTarget};
use crate::context::ValidationContext;
use crate::document::{Document, Element};
use crate::result::{ValidationError, ValidationResult};
use crate::version::VersionSet;
use tracing::debug;

/// A complete schema: the root element's constraint plus the universe of
/// supported format revisions.
#[derive(Clone)]
pub struct Specification {
    pub root: ConstraintThunk,
    pub versions: VersionSet,
}

impl Specification {
    pub fn new(root: ConstraintThunk, versions: VersionSet) -> Self {
        Self { root, versions }
    }
}

/// Validate a whole document against a specification.
pub fn validate(document: &Document, spec: &Specification) -> ValidationResult {
    let constraint = (spec.root)();
    let mut result = validate_element(&document.root, &constraint, "", &document.root.tag);
    result.versions = result.versions.intersect(&spec.versions);
    result
}

/// Just the set of format revisions the document is valid for.
pub fn find_valid_versions(document: &Document, spec: &Specification) -> VersionSet {
    validate(document, spec).versions
}

/// Parse an XML source string and validate it in one step.
pub fn validate_source(source: &str, spec: &Specification) -> crate::error::Result<ValidationResult> {
    let document = crate::xml::parse_document(source)?;
    Ok(validate(&document, spec))
}

/// Read, parse and validate an XML file.
pub fn validate_file(
    path: impl AsRef<std::path::Path>,
    spec: &Specification,
) -> crate::error::Result<ValidationResult> {
    let source = std::fs::read_to_string(path)?;
    validate_source(&source, spec)
}

fn validate_element(
    element: &Element,
    constraint: &Constraint,
    parent_path: &str,
    label: &str,
) -> ValidationResult {
    let path = if parent_path.is_empty() {
        label.to_string()
    } else {
        format!("{}/{}", parent_path, label)
    };
    debug!(path = %path, "validating element");

    // Fresh context per node: registrations never leak to siblings.
    let mut ctx = ValidationContext::new(path.clone(), &element.attributes);
    let mut result = constraint.evaluate(element, &mut ctx);

    // Content rules registered by conditions are deferred to here.
    let text = element.text.as_deref().unwrap_or("");
    for rule in ctx.content_rules() {
        result = result.merge(apply_value_rule(rule, text, ValueTarget::Content, &path));
    }

    // Closed world: anything not declared during evaluation is illegal,
    // regardless of version.
    for name in element.attributes.keys() {
        if !ctx.is_declared_attribute(name) {
            result.push_global(ValidationError::IllegalAttribute {
                path: path.clone(),
                attribute: name.clone(),
            });
        }
    }
    for child in &element.children {
        if !ctx.is_declared_child(&child.tag) {
            result.push_global(ValidationError::IllegalTag {
                path: path.clone(),
                tag: child.tag.clone(),
            });
        }
    }

    // Declared children: check the occurrence range, then recurse into
    // each occurrence with the registered constraint.
    for (tag, child_spec) in ctx.declared_children() {
        let count = element.children_with_tag(tag).count();
        if !child_spec.occurs.contains(count) {
            result.push_global(ValidationError::TagOccurrence {
                path: path.clone(),
                tag: tag.to_string(),
                count,
                expected: child_spec.occurs.to_string(),
            });
            continue;
        }
        if count == 0 {
            continue;
        }
        let child_constraint = (child_spec.thunk)();
        for (index, child) in element.children_with_tag(tag).enumerate() {
            let child_label = if count > 1 {
                format!("{}[{}]", tag, index + 1)
            } else {
                tag.to_string()
            };
            result = result.merge(validate_element(child, &child_constraint, &path, &child_label));
        }
    }

    result
}
