//! Rendered DOM snapshots
//!
//! This module holds the document model the extractor walks:
//! - ElementNode / DomNode: elements and text nodes in document order
//! - ComputedStyle: the style fields that decide visibility
//! - DomTree: a page snapshot, taken from a live tab or parsed from static HTML

pub mod element;
pub mod style;
pub mod tree;

pub use element::{DomNode, ElementNode};
pub use style::ComputedStyle;
pub use tree::DomTree;

use crate::error::Result;
use headless_chrome::Tab;
use std::sync::Arc;

/// Snapshot the rendered DOM of a browser tab
pub fn snapshot_dom(tab: &Arc<Tab>) -> Result<DomTree> {
    DomTree::from_tab(tab)
}
