use crate::dom::style::ComputedStyle;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A child of an element: either another element or a text node
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DomNode {
    Element(ElementNode),
    Text { content: String },
}

impl DomNode {
    /// Create a text node
    pub fn text(content: impl Into<String>) -> Self {
        DomNode::Text { content: content.into() }
    }

    pub fn as_element(&self) -> Option<&ElementNode> {
        match self {
            DomNode::Element(element) => Some(element),
            DomNode::Text { .. } => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            DomNode::Text { content } => Some(content),
            DomNode::Element(_) => None,
        }
    }
}

impl From<ElementNode> for DomNode {
    fn from(element: ElementNode) -> Self {
        DomNode::Element(element)
    }
}

/// Represents a rendered DOM element node
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElementNode {
    /// HTML tag name (e.g., "div", "main", "span")
    pub tag_name: String,

    /// Element attributes (e.g., id, class, style)
    #[serde(default)]
    pub attributes: HashMap<String, String>,

    /// Computed style as resolved by the renderer
    #[serde(default)]
    pub style: ComputedStyle,

    /// Child elements and text nodes, in document order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DomNode>,
}

impl ElementNode {
    /// Create a new ElementNode with the default (rendered) style
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            attributes: HashMap::new(),
            style: ComputedStyle::default(),
            children: Vec::new(),
        }
    }

    /// Builder method: set attributes
    pub fn with_attributes(mut self, attributes: HashMap<String, String>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Builder method: add a single attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_attribute(key, value);
        self
    }

    /// Builder method: set computed style
    pub fn with_style(mut self, style: ComputedStyle) -> Self {
        self.style = style;
        self
    }

    /// Builder method: append a text node
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.add_text(text);
        self
    }

    /// Builder method: append a child element
    pub fn with_child(mut self, child: ElementNode) -> Self {
        self.add_child(child);
        self
    }

    /// Builder method: set children
    pub fn with_children(mut self, children: Vec<DomNode>) -> Self {
        self.children = children;
        self
    }

    /// Add a single attribute
    pub fn add_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    /// Add a child element
    pub fn add_child(&mut self, child: ElementNode) {
        self.children.push(DomNode::Element(child));
    }

    /// Add a text node
    pub fn add_text(&mut self, text: impl Into<String>) {
        self.children.push(DomNode::text(text));
    }

    /// Get attribute value by key
    pub fn get_attribute(&self, key: &str) -> Option<&String> {
        self.attributes.get(key)
    }

    /// Check if element has a specific class
    pub fn has_class(&self, class_name: &str) -> bool {
        if let Some(classes) = self.attributes.get("class") {
            classes.split_whitespace().any(|c| c == class_name)
        } else {
            false
        }
    }

    /// Get element ID
    pub fn id(&self) -> Option<&String> {
        self.attributes.get("id")
    }

    /// Check if element is a specific tag
    pub fn is_tag(&self, tag: &str) -> bool {
        self.tag_name.eq_ignore_ascii_case(tag)
    }

    /// Child elements, skipping text nodes
    pub fn elements(&self) -> impl Iterator<Item = &ElementNode> {
        self.children.iter().filter_map(DomNode::as_element)
    }

    /// Immediate text-node children, untrimmed
    pub fn text_nodes(&self) -> impl Iterator<Item = &str> {
        self.children.iter().filter_map(DomNode::as_text)
    }

    /// All descendant elements in document (pre-)order, excluding `self`
    pub fn descendants(&self) -> Descendants<'_> {
        let mut stack: Vec<&ElementNode> = self.elements().collect();
        stack.reverse();
        Descendants { stack }
    }

    /// Whether `other` is this very node or one of its descendants.
    ///
    /// Identity is by address, so two structurally equal subtrees are distinct.
    pub fn contains(&self, other: &ElementNode) -> bool {
        std::ptr::eq(self, other) || self.descendants().any(|node| std::ptr::eq(node, other))
    }

    /// Concatenated text of the whole subtree, as `textContent` would report it
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }
}

fn collect_text(node: &ElementNode, out: &mut String) {
    for child in &node.children {
        match child {
            DomNode::Text { content } => out.push_str(content),
            DomNode::Element(element) => collect_text(element, out),
        }
    }
}

/// Pre-order iterator over the element descendants of a node
pub struct Descendants<'a> {
    stack: Vec<&'a ElementNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a ElementNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        let first = self.stack.len();
        self.stack.extend(node.elements());
        self.stack[first..].reverse();
        Some(node)
    }
}
