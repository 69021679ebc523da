//! Minimal owned element tree built from quick-xml events.
//!
//! Both decoders work on this tree: the schema-aware decoder walks fixed
//! paths, the generic decoder converts it wholesale.

use crate::error::ChartError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Attribute carrying the scalar type of a leaf (`s32` or `str`).
pub const TYPE_ATTRIBUTE: &str = "__type";

#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    pub name: String,
    pub type_tag: Option<String>,
    /// Raw concatenated text content, whitespace preserved.
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a, 'n>(
        &'a self,
        name: &'n str,
    ) -> impl Iterator<Item = &'a XmlElement> + 'n
    where
        'a: 'n,
    {
        self.children.iter().filter(move |c| c.name == name)
    }
}

fn malformed(message: impl Into<String>) -> ChartError {
    ChartError::MalformedXml {
        message: message.into(),
    }
}

/// Parse `xml` into an element tree rooted at the document element.
pub fn parse_element_tree(xml: &str) -> Result<XmlElement, ChartError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            malformed(format!("at byte {}: {}", reader.buffer_position(), e))
        })?;
        match event {
            Event::Start(start) => {
                if root.is_some() {
                    return Err(malformed("element found after the root element"));
                }
                stack.push(open_element(&start)?);
            }
            Event::Empty(start) => {
                if root.is_some() {
                    return Err(malformed("element found after the root element"));
                }
                let element = open_element(&start)?;
                attach(&mut stack, &mut root, element);
            }
            Event::End(end) => {
                let element = stack.pop().ok_or_else(|| {
                    malformed(format!(
                        "closing tag </{}> without an open element",
                        String::from_utf8_lossy(end.name().as_ref())
                    ))
                })?;
                if element.name.as_bytes() != end.name().as_ref() {
                    return Err(malformed(format!(
                        "expected </{}>, found </{}>",
                        element.name,
                        String::from_utf8_lossy(end.name().as_ref())
                    )));
                }
                attach(&mut stack, &mut root, element);
            }
            Event::Text(text) => {
                let value = text.unescape().map_err(|e| malformed(e.to_string()))?;
                push_text(&mut stack, &value)?;
            }
            Event::CData(data) => {
                let bytes = data.into_inner();
                let value = std::str::from_utf8(&bytes).map_err(|e| malformed(e.to_string()))?;
                push_text(&mut stack, value)?;
            }
            Event::Eof => break,
            // declaration, comments, processing instructions, doctype
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(malformed(format!("unclosed element <{}>", open.name)));
    }
    root.ok_or_else(|| malformed("document has no root element"))
}

fn open_element(start: &BytesStart) -> Result<XmlElement, ChartError> {
    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(|e| malformed(e.to_string()))?
        .to_string();

    let mut type_tag = None;
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| malformed(format!("<{}>: {}", name, e)))?;
        if attribute.key.as_ref() == TYPE_ATTRIBUTE.as_bytes() {
            let value = attribute
                .unescape_value()
                .map_err(|e| malformed(format!("<{}>: {}", name, e)))?;
            type_tag = Some(value.into_owned());
        }
    }

    Ok(XmlElement {
        name,
        type_tag,
        text: String::new(),
        children: Vec::new(),
    })
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => *root = Some(element),
    }
}

fn push_text(stack: &mut [XmlElement], value: &str) -> Result<(), ChartError> {
    match stack.last_mut() {
        Some(parent) => parent.text.push_str(value),
        None if value.trim().is_empty() => {}
        None => return Err(malformed("text found outside the root element")),
    }
    Ok(())
}
