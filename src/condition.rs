//! Condition library
//!
//! Reusable predicates with attached failure messages, produced by pure
//! factory functions and combined with `and`/`or`/`if_then`. Two families:
//! [`ValueCondition`] judges a single attribute or text value;
//! [`ElementCondition`] judges a whole element and may register
//! declarations into the [`ValidationContext`] as a side effect — testing
//! and declaring together is what lets schema definitions read naturally
//! while still building the whitelist the validator needs.

use crate::constraint::{ConstraintThunk, Occurs};
use crate::context::ValidationContext;
use crate::document::Element;
use regex::Regex;
use std::sync::Arc;

type ValueTest = Arc<dyn Fn(&str) -> bool + Send + Sync>;
type ElementTest = Arc<dyn Fn(&Element, &mut ValidationContext) -> bool + Send + Sync>;

/// Predicate over one string value.
#[derive(Clone)]
pub struct ValueCondition {
    test: ValueTest,
    message: String,
}

impl ValueCondition {
    pub fn new(
        message: impl Into<String>,
        test: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            test: Arc::new(test),
            message: message.into(),
        }
    }

    pub fn check(&self, value: &str) -> bool {
        (self.test)(value)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn and(self, other: ValueCondition) -> ValueCondition {
        let message = format!("{} and {}", self.message, other.message);
        ValueCondition::new(message, move |v| self.check(v) && other.check(v))
    }

    pub fn or(self, other: ValueCondition) -> ValueCondition {
        let message = format!("{} or {}", self.message, other.message);
        ValueCondition::new(message, move |v| self.check(v) || other.check(v))
    }
}

impl std::fmt::Debug for ValueCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueCondition")
            .field("message", &self.message)
            .finish()
    }
}

/// How a declared attribute or content value is validated.
#[derive(Clone, Debug)]
pub enum ValueRule {
    /// Check the literal string.
    Plain(ValueCondition),
    /// The value is an expression; validity and the contributed version
    /// range come from the expression engine.
    Expression,
}

/// Predicate over a document element. Evaluation may declare permitted
/// attributes, children, or content rules into the context.
#[derive(Clone)]
pub struct ElementCondition {
    test: ElementTest,
    message: String,
}

impl ElementCondition {
    pub fn new(
        message: impl Into<String>,
        test: impl Fn(&Element, &mut ValidationContext) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            test: Arc::new(test),
            message: message.into(),
        }
    }

    pub fn check(&self, element: &Element, ctx: &mut ValidationContext) -> bool {
        (self.test)(element, ctx)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn and(self, other: ElementCondition) -> ElementCondition {
        let message = format!("{} and {}", self.message, other.message);
        ElementCondition::new(message, move |el, ctx| {
            // Both sides always run so declarations from both are recorded.
            let left = self.check(el, ctx);
            let right = other.check(el, ctx);
            left && right
        })
    }

    pub fn or(self, other: ElementCondition) -> ElementCondition {
        let message = format!("{} or {}", self.message, other.message);
        ElementCondition::new(message, move |el, ctx| {
            let left = self.check(el, ctx);
            let right = other.check(el, ctx);
            left || right
        })
    }

    /// Material implication: holds unless `self` holds and `then` fails.
    pub fn if_then(self, then: ElementCondition) -> ElementCondition {
        let message = format!("if {} then {}", self.message, then.message);
        ElementCondition::new(message, move |el, ctx| {
            if self.check(el, ctx) {
                then.check(el, ctx)
            } else {
                true
            }
        })
    }
}

impl std::fmt::Debug for ElementCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementCondition")
            .field("message", &self.message)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Value condition factories

pub fn any_value() -> ValueCondition {
    ValueCondition::new("any value", |_| true)
}

pub fn non_empty() -> ValueCondition {
    ValueCondition::new("a non-empty value", |v| !v.is_empty())
}

pub fn equals(expected: impl Into<String>) -> ValueCondition {
    let expected = expected.into();
    ValueCondition::new(format!("exactly '{}'", expected), move |v| v == expected)
}

pub fn one_of(options: &[&str]) -> ValueCondition {
    let options: Vec<String> = options.iter().map(|s| s.to_string()).collect();
    ValueCondition::new(
        format!("one of [{}]", options.join(", ")),
        move |v| options.iter().any(|o| o == v),
    )
}

/// Full-string regex match. Panics on an invalid pattern, which is a
/// programmer error in a schema definition, not document input.
pub fn matches(pattern: &str) -> ValueCondition {
    let re = Regex::new(&format!("^(?:{})$", pattern)).unwrap();
    ValueCondition::new(format!("a value matching '{}'", pattern), move |v| {
        re.is_match(v)
    })
}

pub fn integer() -> ValueCondition {
    ValueCondition::new("an integer", |v| v.parse::<i64>().is_ok())
}

pub fn non_negative_integer() -> ValueCondition {
    ValueCondition::new("a non-negative integer", |v| {
        v.parse::<i64>().map(|n| n >= 0).unwrap_or(false)
    })
}

pub fn positive_integer() -> ValueCondition {
    ValueCondition::new("a positive integer", |v| {
        v.parse::<i64>().map(|n| n > 0).unwrap_or(false)
    })
}

pub fn number() -> ValueCondition {
    ValueCondition::new("a number", |v| v.parse::<f64>().is_ok())
}

pub fn number_between(min: f64, max: f64) -> ValueCondition {
    ValueCondition::new(format!("a number between {} and {}", min, max), move |v| {
        v.parse::<f64>().map(|n| n >= min && n <= max).unwrap_or(false)
    })
}

pub fn boolean_value() -> ValueCondition {
    ValueCondition::new("'true' or 'false'", |v| {
        v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("false")
    })
}

pub fn color_value() -> ValueCondition {
    let re = Regex::new(r"^#(?:[0-9a-fA-F]{8}|[0-9a-fA-F]{6})$").unwrap();
    ValueCondition::new("a #RRGGBB or #AARRGGBB color", move |v| re.is_match(v))
}

// ---------------------------------------------------------------------------
// Element condition factories

pub fn always_pass() -> ElementCondition {
    ElementCondition::new("always satisfied", |_, _| true)
}

pub fn always_fail() -> ElementCondition {
    ElementCondition::new("never satisfied", |_, _| false)
}

pub fn tag_is(tag: impl Into<String>) -> ElementCondition {
    let tag = tag.into();
    ElementCondition::new(format!("element is <{}>", tag), move |el, _| el.tag == tag)
}

/// Declares `name` as a permitted attribute and holds when the attribute is
/// present with a value satisfying `rule`.
pub fn attribute(name: impl Into<String>, rule: ValueRule) -> ElementCondition {
    let name = name.into();
    let message = match &rule {
        ValueRule::Plain(cond) => {
            format!("attribute '{}' is present with {}", name, cond.message())
        }
        ValueRule::Expression => format!("attribute '{}' is present with a valid expression", name),
    };
    ElementCondition::new(message, move |el, ctx| {
        ctx.declare_attribute(&name, rule.clone());
        match el.attribute(&name) {
            Some(value) => match &rule {
                ValueRule::Plain(cond) => cond.check(value),
                ValueRule::Expression => crate::expr::parse(value).is_ok(),
            },
            None => false,
        }
    })
}

/// Holds when the scope (the element's own attributes) carries `name` equal
/// to `expected`. Useful for rules that depend on a sibling attribute.
pub fn scope_attribute_equals(
    name: impl Into<String>,
    expected: impl Into<String>,
) -> ElementCondition {
    let name = name.into();
    let expected = expected.into();
    ElementCondition::new(
        format!("attribute '{}' equals '{}'", name, expected),
        move |_, ctx| ctx.scope_attribute(&name) == Some(expected.as_str()),
    )
}

/// Declares `tag` as a permitted child with the given constraint thunk and
/// occurrence range, and holds when at least one such child exists.
pub fn child_element(
    tag: impl Into<String>,
    thunk: ConstraintThunk,
    occurs: Occurs,
) -> ElementCondition {
    let tag = tag.into();
    ElementCondition::new(format!("at least one <{}> child", tag), move |el, ctx| {
        ctx.declare_child(&tag, thunk.clone(), occurs);
        el.children_with_tag(&tag).next().is_some()
    })
}

/// Registers a pending content rule; the actual value check is deferred to
/// the validator. Holds when the element carries any text content.
pub fn content(rule: ValueRule) -> ElementCondition {
    ElementCondition::new("element has text content", move |el, ctx| {
        ctx.push_content_rule(rule.clone());
        el.text.as_deref().map(|t| !t.is_empty()).unwrap_or(false)
    })
}

/// Counts how many of `conditions` hold and requires the count to fall in
/// `[min, max]`. All conditions run regardless, so their declarations are
/// always recorded. Used for mutually exclusive child shapes.
pub fn choice(conditions: Vec<ElementCondition>, min: usize, max: usize) -> ElementCondition {
    assert!(min <= max, "choice: min {} exceeds max {}", min, max);
    let message = format!(
        "between {} and {} of [{}]",
        min,
        max,
        conditions
            .iter()
            .map(|c| c.message())
            .collect::<Vec<_>>()
            .join("; ")
    );
    ElementCondition::new(message, move |el, ctx| {
        let held = conditions.iter().filter(|c| c.check(el, ctx)).count();
        held >= min && held <= max
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn ctx() -> ValidationContext {
        ValidationContext::new("Test".to_string(), &BTreeMap::new())
    }

    #[test]
    fn test_value_factories() {
        assert!(positive_integer().check("3"));
        assert!(!positive_integer().check("0"));
        assert!(!positive_integer().check("3.5"));
        assert!(number_between(0.0, 1.0).check("0.5"));
        assert!(!number_between(0.0, 1.0).check("1.5"));
        assert!(color_value().check("#AABBCC"));
        assert!(!color_value().check("#ABC"));
        assert!(one_of(&["left", "right"]).check("left"));
        assert!(!one_of(&["left", "right"]).check("center"));
    }

    #[test]
    fn test_matches_anchors_full_string() {
        let cond = matches("[A-Z_]+");
        assert!(cond.check("HOUR"));
        assert!(!cond.check("hour HOUR"));
    }

    #[test]
    fn test_value_combinators() {
        let cond = integer().and(non_negative_integer());
        assert!(cond.check("4"));
        assert!(!cond.check("-4"));
        let either = equals("none").or(number());
        assert!(either.check("none"));
        assert!(either.check("2.5"));
        assert!(!either.check("some"));
    }

    #[test]
    fn test_attribute_declares_and_tests() {
        let el = Element::new("Test").attr("width", "450");
        let cond = attribute("width", ValueRule::Plain(positive_integer()));
        let mut ctx = ctx();
        assert!(cond.check(&el, &mut ctx));
        assert!(ctx.is_declared_attribute("width"));

        // Declared even when the element lacks the attribute.
        let empty = Element::new("Test");
        let mut ctx2 = ValidationContext::new("Test".to_string(), &BTreeMap::new());
        assert!(!cond.check(&empty, &mut ctx2));
        assert!(ctx2.is_declared_attribute("width"));
    }

    #[test]
    fn test_choice_counts() {
        let el = Element::new("Test").attr("a", "1").attr("b", "2");
        let exactly_one = choice(
            vec![
                attribute("a", ValueRule::Plain(any_value())),
                attribute("b", ValueRule::Plain(any_value())),
            ],
            1,
            1,
        );
        let mut c = ctx();
        assert!(!exactly_one.check(&el, &mut c));
        // Both branches declared even though the choice failed.
        assert!(c.is_declared_attribute("a"));
        assert!(c.is_declared_attribute("b"));
    }

    #[test]
    fn test_if_then() {
        let rule = attribute("kind", ValueRule::Plain(equals("icon")))
            .if_then(attribute("resource", ValueRule::Plain(non_empty())));
        let plain = Element::new("Test").attr("kind", "text");
        assert!(rule.check(&plain, &mut ctx()));
        let icon_missing = Element::new("Test").attr("kind", "icon");
        assert!(!rule.check(&icon_missing, &mut ctx()));
        let icon_ok = Element::new("Test").attr("kind", "icon").attr("resource", "res/a");
        assert!(rule.check(&icon_ok, &mut ctx()));
    }

    #[test]
    fn test_scope_snapshot() {
        let el = Element::new("Test").attr("mode", "analog");
        let mut ctx = ValidationContext::new("Test".to_string(), &el.attributes);
        assert!(scope_attribute_equals("mode", "analog").check(&el, &mut ctx));
        assert!(!scope_attribute_equals("mode", "digital").check(&el, &mut ctx));
    }
}
