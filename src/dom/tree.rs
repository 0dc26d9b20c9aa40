use crate::dom::element::{DomNode, ElementNode};
use crate::dom::style::ComputedStyle;
use crate::error::{CaptureError, Result};
use headless_chrome::Tab;
use scraper::{ElementRef, Html, Node, Selector};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// A snapshot of a rendered page: its body element plus page metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DomTree {
    /// Document title
    #[serde(default)]
    pub title: String,

    /// URL the snapshot was taken from
    #[serde(default)]
    pub url: String,

    /// The body element; absent for documents without one
    pub body: Option<ElementNode>,
}

impl DomTree {
    /// Create a DomTree around a body element
    pub fn new(body: ElementNode) -> Self {
        Self { title: String::new(), url: String::new(), body: Some(body) }
    }

    /// A document with no body at all
    pub fn empty() -> Self {
        Self::default()
    }

    /// Snapshot the rendered DOM of a browser tab, including computed styles
    pub fn from_tab(tab: &Arc<Tab>) -> Result<Self> {
        let js_code = include_str!("snapshot_dom.js");

        let result = tab
            .evaluate(js_code, false)
            .map_err(|e| CaptureError::DomParseFailed(format!("Failed to execute DOM snapshot script: {}", e)))?;

        let json_value = result
            .value
            .ok_or_else(|| CaptureError::DomParseFailed("No value returned from DOM snapshot".to_string()))?;

        // The script returns a JSON string to avoid CDP object-depth limits
        let json_str: String = serde_json::from_value(json_value)
            .map_err(|e| CaptureError::DomParseFailed(format!("Failed to get JSON string: {}", e)))?;

        let tree = Self::from_json(&json_str)?;
        log::debug!("Snapshot of {} contains {} elements", tree.url, tree.count_elements());
        Ok(tree)
    }

    /// Parse a snapshot previously serialized with [`DomTree::to_json`]
    ///
    /// Nesting depth is unbounded; each DOM level costs two JSON levels, so
    /// the default limit of 128 would reject ordinary deep pages.
    pub fn from_json(json: &str) -> Result<Self> {
        let parse_err = |e: serde_json::Error| CaptureError::DomParseFailed(format!("Failed to parse DOM JSON: {}", e));

        let mut de = serde_json::Deserializer::from_str(json);
        de.disable_recursion_limit();
        let tree = Self::deserialize(serde_stacker::Deserializer::new(&mut de)).map_err(parse_err)?;
        de.end().map_err(parse_err)?;
        Ok(tree)
    }

    /// Build a tree from static HTML.
    ///
    /// There is no renderer here, so each element's style comes only from its
    /// inline `style` attribute and its `hidden` attribute.
    pub fn from_html(html: &str) -> Self {
        let document = Html::parse_document(html);

        let title = Selector::parse("title")
            .ok()
            .and_then(|sel| document.select(&sel).next())
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        let body = Selector::parse("body").ok().and_then(|sel| document.select(&sel).next()).map(convert_element);

        Self { title, url: String::new(), body }
    }

    /// Convert the DOM tree to JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CaptureError::DomParseFailed(format!("Failed to serialize DOM to JSON: {}", e)))
    }

    /// Count total elements in the tree
    pub fn count_elements(&self) -> usize {
        self.body.as_ref().map_or(0, |body| 1 + body.descendants().count())
    }
}

fn convert_element(element: ElementRef<'_>) -> ElementNode {
    let value = element.value();

    let attributes: HashMap<String, String> =
        value.attrs().map(|(name, val)| (name.to_string(), val.to_string())).collect();
    let style = ComputedStyle::from_inline(value.attr("style"), value.attr("hidden").is_some());

    let children = element
        .children()
        .filter_map(|child| match child.value() {
            Node::Element(_) => ElementRef::wrap(child).map(|el| DomNode::Element(convert_element(el))),
            Node::Text(text) => {
                let content: &str = &text.text;
                Some(DomNode::text(content))
            }
            _ => None,
        })
        .collect();

    ElementNode::new(value.name().to_ascii_lowercase())
        .with_attributes(attributes)
        .with_style(style)
        .with_children(children)
}
