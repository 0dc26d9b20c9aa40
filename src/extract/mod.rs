//! Visibility-aware text extraction
//!
//! The extractor walks a [`DomTree`] from a content anchor (`main`, `#main`,
//! `.main`, else the body), prunes skip-listed and invisible subtrees, and
//! renders each element's own text on a line indented by its nesting depth.
//! Text of the inline tag stays on the line it belongs to.

pub mod options;
pub mod text;

pub use options::{DEFAULT_SKIP_TAGS, ExtractionOptions};
pub use text::{NO_CONTENT, SnapshotStyles, StyleResolver, TextExtractor};

use crate::dom::DomTree;

/// Extract page text using the styles recorded in the snapshot
pub fn extract_page_text(document: &DomTree, options: &ExtractionOptions) -> String {
    TextExtractor::new(options.clone()).extract_page_text(document)
}
