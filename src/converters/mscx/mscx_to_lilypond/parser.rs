//! Ordered-tree layer for MuseScore documents
//!
//! MuseScore files are order-sensitive: the sequence of siblings inside a
//! `<voice>` *is* the music. This module provides an owned tree that keeps
//! elements and text runs in document order, plus a single lookup operation
//! that treats "attribute called X" and "child elements called X" uniformly.

use crate::converters::mscx::mscx_to_lilypond::errors::ParseError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Name given to text pseudo-children
pub const TEXT_NODE_NAME: &str = "#text";

// ============================================================================
// ORDERED NODE
// ============================================================================

/// One node of the source tree.
///
/// `children` holds elements and `#text` pseudo-children interleaved exactly
/// as they appear in the source. Nothing in the crate re-sorts this list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderedNode {
    pub name: String,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<OrderedNode>,
    /// Direct (non-whitespace) text content, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Result of [`OrderedNode::get`].
///
/// Mirrors the cardinality of the match: nothing, one scalar, one node, or
/// an ordered list of matches.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<'a> {
    None,
    /// Exactly one match that collapsed to a string (an attribute, or a
    /// text-bearing element when not forced)
    Value(&'a str),
    /// Exactly one element match
    One(&'a OrderedNode),
    /// Two or more matches, attribute first, then children in document order
    Many(Vec<Found<'a>>),
}

/// One entry of a multi-match lookup
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Found<'a> {
    Attr(&'a str),
    Node(&'a OrderedNode),
}

impl<'a> Found<'a> {
    pub fn text(&self) -> Option<&'a str> {
        match self {
            Found::Attr(value) => Some(value),
            Found::Node(node) => node.text(),
        }
    }
}

impl<'a> Lookup<'a> {
    pub fn is_none(&self) -> bool {
        matches!(self, Lookup::None)
    }

    /// Text of the (first) match
    pub fn text(&self) -> Option<&'a str> {
        match self {
            Lookup::None => None,
            Lookup::Value(value) => Some(value),
            Lookup::One(node) => node.text(),
            Lookup::Many(found) => found.first().and_then(Found::text),
        }
    }

    /// First element match, if any
    pub fn node(&self) -> Option<&'a OrderedNode> {
        match self {
            Lookup::One(node) => Some(node),
            Lookup::Many(found) => found.iter().find_map(|f| match f {
                Found::Node(node) => Some(*node),
                Found::Attr(_) => None,
            }),
            _ => None,
        }
    }

    /// Normalize to a list of element matches.
    ///
    /// A collapsed [`Lookup::Value`] has no node behind it; callers that need
    /// nodes should look up with [`OrderedNode::get_forced`].
    pub fn nodes(&self) -> Vec<&'a OrderedNode> {
        match self {
            Lookup::One(node) => vec![*node],
            Lookup::Many(found) => found
                .iter()
                .filter_map(|f| match f {
                    Found::Node(node) => Some(*node),
                    Found::Attr(_) => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Normalize to a list of strings (attribute values and element texts)
    pub fn texts(&self) -> Vec<&'a str> {
        match self {
            Lookup::None => Vec::new(),
            Lookup::Value(value) => vec![*value],
            Lookup::One(node) => node.text().into_iter().collect(),
            Lookup::Many(found) => found.iter().filter_map(Found::text).collect(),
        }
    }
}

impl OrderedNode {
    /// Create an empty element
    pub fn element(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
            text: None,
        }
    }

    /// Create a `#text` pseudo-child
    pub fn text_node(text: impl Into<String>) -> Self {
        let mut node = Self::element(TEXT_NODE_NAME);
        node.text = Some(text.into());
        node
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: OrderedNode) -> Self {
        self.children.push(child);
        self
    }

    /// Append a text run (kept both as `text` and as a `#text` pseudo-child)
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        match self.text.as_mut() {
            Some(existing) => existing.push_str(&text),
            None => self.text = Some(text.clone()),
        }
        self.children.push(OrderedNode::text_node(text));
        self
    }

    /// Shorthand for `<name>text</name>`
    pub fn leaf(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::element(name).with_text(text)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw ordered child list, including `#text` pseudo-children
    pub fn children(&self) -> &[OrderedNode] {
        &self.children
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn is_text_node(&self) -> bool {
        self.name == TEXT_NODE_NAME
    }

    /// Look up an attribute or child elements by name.
    ///
    /// A single text-bearing element collapses to its text, just like an
    /// attribute collapses to its value.
    pub fn get(&self, name: &str) -> Lookup<'_> {
        self.lookup(name, false)
    }

    /// Like [`OrderedNode::get`] but never collapses a single element to its
    /// text, so its attributes stay reachable.
    pub fn get_forced(&self, name: &str) -> Lookup<'_> {
        self.lookup(name, true)
    }

    fn lookup(&self, name: &str, force_node: bool) -> Lookup<'_> {
        let mut found: Vec<Found<'_>> = Vec::new();
        if let Some(value) = self.attributes.get(name) {
            found.push(Found::Attr(value));
        }
        found.extend(
            self.children
                .iter()
                .filter(|child| !child.is_text_node() && child.name == name)
                .map(Found::Node),
        );

        match found.len() {
            0 => Lookup::None,
            1 => match found[0] {
                Found::Attr(value) => Lookup::Value(value),
                Found::Node(node) => match node.text() {
                    Some(text) if !force_node => Lookup::Value(text),
                    _ => Lookup::One(node),
                },
            },
            _ => Lookup::Many(found),
        }
    }

    /// Parse an XML string into an ordered tree rooted at the document element
    pub fn parse(xml: &str) -> Result<OrderedNode, ParseError> {
        // roxmltree rejects DTDs
        let source = if xml.contains("<!DOCTYPE") {
            xml.lines()
                .filter(|line| !line.trim_start().starts_with("<!DOCTYPE"))
                .collect::<Vec<_>>()
                .join("\n")
        } else {
            xml.to_string()
        };

        let doc = roxmltree::Document::parse(&source)
            .map_err(|e| ParseError::InvalidXml(format!("XML parse error: {}", e)))?;

        Ok(from_xml_node(doc.root_element()))
    }
}

fn from_xml_node(node: roxmltree::Node) -> OrderedNode {
    let mut out = OrderedNode::element(node.tag_name().name());
    for attr in node.attributes() {
        out.attributes
            .insert(attr.name().to_string(), attr.value().to_string());
    }

    for child in node.children() {
        if child.is_element() {
            out.children.push(from_xml_node(child));
        } else if child.is_text() {
            if let Some(text) = child.text() {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    out = out.with_text(trimmed);
                }
            }
        }
    }

    out
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Text of the attribute or single child called `name`
pub fn get_child_text(node: &OrderedNode, name: &str) -> Option<String> {
    node.get(name).text().map(|s| s.trim().to_string())
}

/// Parse the attribute or child called `name` into `T`
pub fn get_child_parsed<T: FromStr>(node: &OrderedNode, name: &str) -> Option<T> {
    node.get(name).text().and_then(|s| s.trim().parse().ok())
}

/// All child elements called `name`, always as a list
pub fn get_nodes<'a>(node: &'a OrderedNode, name: &str) -> Vec<&'a OrderedNode> {
    node.get_forced(name).nodes()
}

/// First child element called `name`, never collapsed to text
pub fn get_node<'a>(node: &'a OrderedNode, name: &str) -> Option<&'a OrderedNode> {
    node.get_forced(name).node()
}
