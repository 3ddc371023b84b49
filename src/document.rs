//! Result document tree
//!
//! The action API answers with XML whose shape mirrors the requested
//! modules (`<api><query><pages>...</pages></query></api>`). Paginated
//! queries arrive as several partial trees that must be merged into one
//! logical result, so the crate parses responses into its own small owned
//! tree instead of using a read-only XML view.
//!
//! The merge rule is strictly append-under-existing: children from later
//! rounds are appended to the same-named module node of the first round,
//! in arrival order. A module that was absent from the first round is
//! silently discarded when later rounds mention it; a query that needs a
//! module must request it from round one.

use crate::error::{Error, Result};
use quick_xml::Reader;
use quick_xml::events::Event;

/// One XML element: name, attributes in document order, text and children
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Element {
    /// Tag name
    pub name: String,
    /// Attributes in document order
    pub attributes: Vec<(String, String)>,
    /// Concatenated text content
    pub text: String,
    /// Child elements in document order
    pub children: Vec<Element>,
}

impl Element {
    /// New element with the given tag name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Attribute value by name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// First descendant-or-self element with the given name, document order
    pub fn find(&self, name: &str) -> Option<&Element> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }

    /// Direct children with the given name
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.name == name)
    }
}

/// A server result document, possibly merged from several rounds/chunks
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Document {
    root: Option<Element>,
}

impl Document {
    /// New empty document (no root; what an empty batch yields)
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the document holds any data at all
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// The root element, if any
    pub fn root(&self) -> Option<&Element> {
        self.root.as_ref()
    }

    /// First element with the given name anywhere in the tree
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.root.as_ref().and_then(|root| root.find(name))
    }

    /// Parse a server response body into a document
    pub fn parse(xml: &str) -> Result<Document> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event().map_err(|e| Error::Xml(e.to_string()))? {
                Event::Start(start) => {
                    stack.push(element_from_start(&start)?);
                }
                Event::Empty(start) => {
                    let element = element_from_start(&start)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    let value = text.unescape().map_err(|e| Error::Xml(e.to_string()))?;
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&value);
                    }
                }
                Event::CData(data) => {
                    if let Some(current) = stack.last_mut() {
                        current
                            .text
                            .push_str(&String::from_utf8_lossy(&data.into_inner()));
                    }
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| Error::Xml("unbalanced end tag".to_string()))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Eof => break,
                // declarations, comments and processing instructions are noise
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(Error::Xml("unclosed element".to_string()));
        }
        match root {
            Some(root) => Ok(Document { root: Some(root) }),
            None => Err(Error::Xml("empty response body".to_string())),
        }
    }

    /// The top-level error node as (code, info), if present
    pub fn error(&self) -> Option<(&str, &str)> {
        let node = self.find("error")?;
        Some((node.attr("code")?, node.attr("info").unwrap_or("")))
    }

    /// The continuation cursor: the reserved node's first child's first
    /// attribute. Absence means pagination is complete.
    pub fn continuation(&self) -> Option<(String, String)> {
        let node = self.find("query-continue")?;
        let child = node.children.first()?;
        let (name, value) = child.attributes.first()?;
        Some((name.clone(), value.clone()))
    }

    /// The `result` attribute of the node the given action answers with
    pub fn action_result(&self, action: &str) -> Option<&str> {
        self.find(action)?.attr("result")
    }

    /// Merge one continuation round (or batch chunk) into this document.
    ///
    /// An empty document adopts the incoming tree wholesale. Otherwise, for
    /// each top-level child of the incoming `query` node, the children of
    /// that node are appended to the same-named child of this document's
    /// `query` node; incoming modules without a match are discarded.
    pub fn merge_query(&mut self, incoming: &Document) {
        let Some(own_root) = self.root.as_mut() else {
            self.root = incoming.root.clone();
            return;
        };
        let Some(incoming_query) = incoming.find("query") else {
            return;
        };
        let Some(own_query) = own_root.children.iter_mut().find(|c| c.name == "query") else {
            return;
        };
        for module in &incoming_query.children {
            if let Some(existing) = own_query.children.iter_mut().find(|c| c.name == module.name)
            {
                existing.children.extend(module.children.iter().cloned());
            } else {
                tracing::debug!(module = %module.name, "discarding module absent from first round");
            }
        }
    }
}

fn element_from_start(start: &quick_xml::events::BytesStart<'_>) -> Result<Element> {
    let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| Error::Xml(e.to_string()))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|e| Error::Xml(e.to_string()))?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(stack: &mut Vec<Element>, root: &mut Option<Element>, element: Element) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
    } else if root.is_none() {
        *root = Some(element);
    } else {
        return Err(Error::Xml("multiple root elements".to_string()));
    }
    Ok(())
}
