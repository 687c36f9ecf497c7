//! XML boundary adapter
//!
//! Converts a well-formed XML string into the simplified [`Element`] tree
//! the engine consumes. This is the only place XML exists in the crate; the
//! validation engine itself never sees markup.

use crate::document::{Document, Element};
use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum XmlError {
    #[error("XML parse error: {0}")]
    Parse(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("document has no root element")]
    MissingRoot,

    #[error("unexpected closing tag")]
    UnbalancedTag,
}

/// Parse one document. Comments, processing instructions, and the XML
/// declaration are ignored; whitespace-only text is dropped.
pub fn parse_document(xml: &str) -> Result<Document, XmlError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                stack.push(element_from_start(&start)?);
            }
            Event::Empty(start) => {
                let element = element_from_start(&start)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => return Ok(Document::new(element)),
                }
            }
            Event::Text(text) => {
                let text = text.unescape()?.to_string();
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    if let Some(top) = stack.last_mut() {
                        top.text = Some(trimmed.to_string());
                    }
                }
            }
            Event::End(_) => {
                let element = stack.pop().ok_or(XmlError::UnbalancedTag)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => return Ok(Document::new(element)),
                }
            }
            Event::Eof => return Err(XmlError::MissingRoot),
            _ => {}
        }
    }
}

fn element_from_start(start: &quick_xml::events::BytesStart<'_>) -> Result<Element, XmlError> {
    let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()).to_string());
    for attr in start.attributes() {
        let attr = attr?;
        element.attributes.insert(
            String::from_utf8_lossy(attr.key.as_ref()).to_string(),
            attr.unescape_value()?.to_string(),
        );
    }
    Ok(element)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_document() {
        let doc = parse_document(
            r#"<?xml version="1.0"?>
            <WatchFace width="450" height="450">
              <Scene>
                <Group x="0" y="0"/>
              </Scene>
            </WatchFace>"#,
        )
        .unwrap();
        assert_eq!(doc.root.tag, "WatchFace");
        assert_eq!(doc.root.attribute("width"), Some("450"));
        let scene = &doc.root.children[0];
        assert_eq!(scene.tag, "Scene");
        assert_eq!(scene.children[0].attribute("x"), Some("0"));
    }

    #[test]
    fn test_text_content() {
        let doc = parse_document("<Text>  [HOUR_0_23] * 2  </Text>").unwrap();
        assert_eq!(doc.root.text.as_deref(), Some("[HOUR_0_23] * 2"));
    }

    #[test]
    fn test_self_closing_root() {
        let doc = parse_document("<WatchFace/>").unwrap();
        assert_eq!(doc.root.tag, "WatchFace");
        assert!(doc.root.children.is_empty());
    }

    #[test]
    fn test_empty_input_has_no_root() {
        assert!(matches!(parse_document(""), Err(XmlError::MissingRoot)));
    }
}
