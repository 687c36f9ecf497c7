//! Constraint model
//!
//! Composable node-level rules. Evaluating a constraint against an element
//! yields a [`ValidationResult`]: the set of format revisions this node is
//! valid for plus per-revision diagnostics. Constraints are pure and
//! reentrant; child constraint trees are supplied lazily through thunks so
//! mutually recursive element specifications (a `Group` containing a
//! `Group`) can be expressed without infinite eager construction.

use crate::condition::{ElementCondition, ValueRule};
use crate::context::ValidationContext;
use crate::document::Element;
use crate::result::{ErrorKey, ValidationError, ValidationResult};
use crate::version::VersionSet;
use std::fmt;
use std::sync::Arc;

/// Deferred supplier of a child element's constraint tree.
pub type ConstraintThunk = Arc<dyn Fn() -> Arc<Constraint> + Send + Sync>;

/// Wrap a closure as a [`ConstraintThunk`].
pub fn lazy(f: impl Fn() -> Arc<Constraint> + Send + Sync + 'static) -> ConstraintThunk {
    Arc::new(f)
}

/// Inclusive occurrence range for a child tag; `max: None` is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurs {
    pub min: usize,
    pub max: Option<usize>,
}

impl Occurs {
    pub fn new(min: usize, max: Option<usize>) -> Self {
        if let Some(max) = max {
            assert!(min <= max, "occurrence range {}..{} is inverted", min, max);
        }
        Self { min, max }
    }

    pub fn any() -> Self {
        Self::new(0, None)
    }

    pub fn once() -> Self {
        Self::new(1, Some(1))
    }

    pub fn at_least(min: usize) -> Self {
        Self::new(min, None)
    }

    pub fn between(min: usize, max: usize) -> Self {
        Self::new(min, Some(max))
    }

    pub fn contains(&self, count: usize) -> bool {
        count >= self.min && self.max.map(|max| count <= max).unwrap_or(true)
    }
}

impl fmt::Display for Occurs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "{}", self.min),
            Some(max) => write!(f, "{}..{}", self.min, max),
            None => write!(f, "{}..", self.min),
        }
    }
}

/// A composable node-level rule.
#[derive(Clone)]
pub enum Constraint {
    /// Both sides evaluate on the same node and context; version sets
    /// intersect, error maps concatenate.
    And(Box<Constraint>, Box<Constraint>),
    /// If any condition fails, every revision in `versions` is marked
    /// invalid for this node. A satisfied requirement never narrows
    /// validity; only a failed one does.
    Required {
        conditions: Vec<ElementCondition>,
        versions: VersionSet,
    },
    /// If any condition holds, the observed feature only exists in
    /// `versions`: the node narrows to exactly that set and every other
    /// revision gets a version-elimination diagnostic.
    Allowed {
        conditions: Vec<ElementCondition>,
        versions: VersionSet,
    },
    /// Declares the attribute and validates its value when present.
    Attribute { name: String, rule: ValueRule },
    /// Validates the element's text content.
    Content { rule: ValueRule },
    /// Declares a permitted child tag with its constraint and occurrence
    /// range. The count check and recursion happen in the validator walk,
    /// driven by this declaration.
    Child {
        tag: String,
        thunk: ConstraintThunk,
        occurs: Occurs,
    },
    PassAll,
    FailAll,
}

impl Constraint {
    /// Evaluate this constraint for one element. Side effects on `ctx`
    /// (declared attributes, children, content rules) feed the validator's
    /// closed-world check and recursion.
    pub fn evaluate(&self, element: &Element, ctx: &mut ValidationContext) -> ValidationResult {
        match self {
            Constraint::And(left, right) => {
                let l = left.evaluate(element, ctx);
                let r = right.evaluate(element, ctx);
                l.merge(r)
            }

            Constraint::Required { conditions, versions } => {
                // Every condition runs: errors accumulate and declarations
                // must be recorded even after a failure.
                let mut failed = Vec::new();
                for cond in conditions {
                    if !cond.check(element, ctx) {
                        failed.push(cond.message().to_string());
                    }
                }
                let mut result = ValidationResult::unrestricted();
                if !failed.is_empty() {
                    result.versions = versions.complement_of(&VersionSet::all());
                    for version in versions.iter() {
                        for message in &failed {
                            result.push(
                                ErrorKey::Version(version),
                                ValidationError::RequiredConditionFailed {
                                    path: ctx.path().to_string(),
                                    message: message.clone(),
                                    versions: versions.clone(),
                                },
                            );
                        }
                    }
                }
                result
            }

            Constraint::Allowed { conditions, versions } => {
                let mut held = None;
                for cond in conditions {
                    if cond.check(element, ctx) && held.is_none() {
                        held = Some(cond.message().to_string());
                    }
                }
                let mut result = ValidationResult::unrestricted();
                if let Some(reason) = held {
                    result.versions = versions.clone();
                    for version in versions.complement_of(&VersionSet::all()).iter() {
                        result.push(
                            ErrorKey::Version(version),
                            ValidationError::VersionEliminated {
                                path: ctx.path().to_string(),
                                reason: reason.clone(),
                                versions: versions.clone(),
                            },
                        );
                    }
                }
                result
            }

            Constraint::Attribute { name, rule } => {
                ctx.declare_attribute(name, rule.clone());
                match element.attribute(name) {
                    Some(value) => {
                        apply_value_rule(rule, value, ValueTarget::Attribute(name), ctx.path())
                    }
                    None => ValidationResult::unrestricted(),
                }
            }

            Constraint::Content { rule } => {
                let text = element.text.as_deref().unwrap_or("");
                apply_value_rule(rule, text, ValueTarget::Content, ctx.path())
            }

            Constraint::Child { tag, thunk, occurs } => {
                ctx.declare_child(tag, thunk.clone(), *occurs);
                ValidationResult::unrestricted()
            }

            Constraint::PassAll => ValidationResult::unrestricted(),

            Constraint::FailAll => {
                let mut result = ValidationResult::unrestricted();
                result.versions = VersionSet::empty();
                result.push_global(ValidationError::Unknown {
                    path: ctx.path().to_string(),
                    message: "element rejected by specification".to_string(),
                });
                result
            }
        }
    }
}

/// What a value rule is being applied to, for diagnostics.
#[derive(Clone, Copy)]
pub enum ValueTarget<'a> {
    Attribute(&'a str),
    Content,
}

/// Apply a [`ValueRule`] to a concrete value. Plain rules yield a global,
/// version-independent diagnostic on failure. Expression rules delegate to
/// the expression engine: a syntax error is global; a successful parse
/// narrows the node to the expression's version range, eliminating every
/// other revision (an empty range eliminates them all).
pub(crate) fn apply_value_rule(
    rule: &ValueRule,
    value: &str,
    target: ValueTarget<'_>,
    path: &str,
) -> ValidationResult {
    let mut result = ValidationResult::unrestricted();
    match rule {
        ValueRule::Plain(cond) => {
            if !cond.check(value) {
                let message = format!("'{}' is not {}", value, cond.message());
                result.push_global(match target {
                    ValueTarget::Attribute(name) => ValidationError::AttributeValueInvalid {
                        path: path.to_string(),
                        attribute: name.to_string(),
                        message,
                    },
                    ValueTarget::Content => ValidationError::ContentInvalid {
                        path: path.to_string(),
                        message,
                    },
                });
            }
        }
        ValueRule::Expression => match crate::expr::parse(value) {
            Ok(parsed) => {
                let supported = parsed.versions.to_set();
                for version in supported.complement_of(&VersionSet::all()).iter() {
                    result.push(
                        ErrorKey::Version(version),
                        ValidationError::VersionEliminated {
                            path: path.to_string(),
                            reason: format!("expression '{}' requires versions {}", value, supported),
                            versions: supported.clone(),
                        },
                    );
                }
                result.versions = supported;
            }
            Err(err) => {
                result.push_global(ValidationError::ExpressionSyntax {
                    path: path.to_string(),
                    message: err.to_string(),
                });
            }
        },
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{always_fail, always_pass, positive_integer};
    use crate::result::ResultKind;

    fn eval(constraint: &Constraint, element: &Element) -> ValidationResult {
        let mut ctx = ValidationContext::new(element.tag.clone(), &element.attributes);
        constraint.evaluate(element, &mut ctx)
    }

    #[test]
    fn test_required_failure_is_the_complement() {
        let constraint = Constraint::Required {
            conditions: vec![always_fail()],
            versions: [1u8, 2, 3].into_iter().collect(),
        };
        let result = eval(&constraint, &Element::new("X"));
        assert_eq!(result.versions, [4u8].into_iter().collect());
        assert_eq!(result.errors[&ErrorKey::Version(crate::version::Version(1))].len(), 1);
    }

    #[test]
    fn test_required_pass_does_not_narrow() {
        let constraint = Constraint::Required {
            conditions: vec![always_pass()],
            versions: [1u8, 2].into_iter().collect(),
        };
        let result = eval(&constraint, &Element::new("X"));
        assert_eq!(result.versions, VersionSet::all());
        assert!(!result.has_errors());
    }

    #[test]
    fn test_allowed_narrows_to_exactly_its_versions() {
        let constraint = Constraint::Allowed {
            conditions: vec![always_pass()],
            versions: [2u8, 4].into_iter().collect(),
        };
        let result = eval(&constraint, &Element::new("X"));
        assert_eq!(result.versions, [2u8, 4].into_iter().collect());
        // Versions 1 and 3 each get an elimination diagnostic.
        assert!(result.errors.contains_key(&ErrorKey::Version(crate::version::Version(1))));
        assert!(result.errors.contains_key(&ErrorKey::Version(crate::version::Version(3))));
    }

    #[test]
    fn test_allowed_without_a_holding_condition_is_neutral() {
        let constraint = Constraint::Allowed {
            conditions: vec![always_fail()],
            versions: [2u8].into_iter().collect(),
        };
        let result = eval(&constraint, &Element::new("X"));
        assert_eq!(result.versions, VersionSet::all());
        assert!(!result.has_errors());
    }

    #[test]
    fn test_attribute_value_error_is_global() {
        let constraint = Constraint::Attribute {
            name: "width".to_string(),
            rule: ValueRule::Plain(positive_integer()),
        };
        let result = eval(&constraint, &Element::new("X").attr("width", "banana"));
        assert_eq!(result.versions, VersionSet::all());
        assert_eq!(result.errors[&ErrorKey::Global].len(), 1);
    }

    #[test]
    fn test_attribute_expression_narrows() {
        let constraint = Constraint::Attribute {
            name: "alpha".to_string(),
            rule: ValueRule::Expression,
        };
        let result = eval(
            &constraint,
            &Element::new("X").attr("alpha", "interpolate(0, 255, [SECOND])"),
        );
        assert_eq!(result.versions, [4u8].into_iter().collect());
    }

    #[test]
    fn test_attribute_expression_syntax_error_is_global() {
        let constraint = Constraint::Attribute {
            name: "alpha".to_string(),
            rule: ValueRule::Expression,
        };
        let result = eval(&constraint, &Element::new("X").attr("alpha", "1 +"));
        assert_eq!(result.versions, VersionSet::all());
        assert!(matches!(
            result.errors[&ErrorKey::Global][0],
            ValidationError::ExpressionSyntax { .. }
        ));
    }

    #[test]
    fn test_expression_with_empty_range_eliminates_everything() {
        let constraint = Constraint::Content {
            rule: ValueRule::Expression,
        };
        let element = Element::new("X").text("interpolate(0, 1, unreadNotificationCount(0))");
        let result = eval(&constraint, &element);
        assert!(result.versions.is_empty());
        assert_eq!(result.kind(), ResultKind::Failure);
    }

    #[test]
    fn test_and_intersects() {
        let left = Constraint::Allowed {
            conditions: vec![always_pass()],
            versions: [2u8, 3].into_iter().collect(),
        };
        let right = Constraint::Allowed {
            conditions: vec![always_pass()],
            versions: [3u8, 4].into_iter().collect(),
        };
        let both = Constraint::And(Box::new(left), Box::new(right));
        let result = eval(&both, &Element::new("X"));
        assert_eq!(result.versions, [3u8].into_iter().collect());
    }

    #[test]
    fn test_occurs() {
        assert!(Occurs::any().contains(0));
        assert!(Occurs::once().contains(1));
        assert!(!Occurs::once().contains(2));
        assert!(Occurs::between(1, 3).contains(3));
        assert!(!Occurs::between(1, 3).contains(0));
        assert_eq!(Occurs::once().to_string(), "1");
        assert_eq!(Occurs::between(0, 2).to_string(), "0..2");
        assert_eq!(Occurs::at_least(2).to_string(), "2..");
    }

    #[test]
    #[should_panic]
    fn test_inverted_occurs_panics() {
        let _ = Occurs::new(3, Some(1));
    }

    #[test]
    fn test_evaluation_is_reentrant() {
        let constraint = Constraint::Required {
            conditions: vec![always_fail()],
            versions: [1u8].into_iter().collect(),
        };
        let element = Element::new("X");
        let first = eval(&constraint, &element);
        let second = eval(&constraint, &element);
        assert_eq!(first, second);
    }
}
