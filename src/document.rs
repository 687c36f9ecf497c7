//! Simplified document tree
//!
//! The engine never sees raw XML; an external adapter (see [`crate::xml`])
//! feeds it this already-shaped tree. Elements are immutable once built and
//! owned exclusively by their parent.

use std::collections::BTreeMap;

/// One element of a watch face document.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<Element>,
    pub text: Option<String>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
            text: None,
        }
    }

    /// Builder-style attribute setter, used heavily in tests and by the
    /// XML adapter.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Children whose tag equals `tag`, in document order.
    pub fn children_with_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.tag == tag)
    }
}

/// A whole document: ownership root for the element tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub root: Element,
}

impl Document {
    pub fn new(root: Element) -> Self {
        Self { root }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let el = Element::new("Group")
            .attr("x", "0")
            .attr("y", "10")
            .child(Element::new("PartText"))
            .child(Element::new("PartText"));
        assert_eq!(el.attribute("x"), Some("0"));
        assert_eq!(el.attribute("missing"), None);
        assert_eq!(el.children_with_tag("PartText").count(), 2);
        assert_eq!(el.children_with_tag("Group").count(), 0);
    }
}
