use indexmap::IndexSet;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Tags excluded from extraction regardless of visibility
pub const DEFAULT_SKIP_TAGS: [&str; 6] = ["script", "style", "noscript", "meta", "link", "head"];

/// Configuration for a text extraction run.
///
/// Field names are camelCase on the wire so host requests can pass the
/// options object through unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractionOptions {
    /// Bypass the visibility filter entirely
    pub include_hidden: bool,

    /// Minimum trimmed length for a text fragment to be kept
    pub min_text_length: usize,

    /// Accepted for compatibility; the traversal does not cut off at this depth
    pub max_depth: usize,

    /// Lowercase tag names pruned together with their subtree
    pub skip_tags: IndexSet<String>,

    /// Tag whose text joins the surrounding line instead of starting a new one
    pub inline_tag: String,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            include_hidden: false,
            min_text_length: 1,
            max_depth: 10,
            skip_tags: DEFAULT_SKIP_TAGS.iter().map(|t| t.to_string()).collect(),
            inline_tag: "span".to_string(),
        }
    }
}

impl ExtractionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: include hidden elements
    pub fn include_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Builder method: set minimum fragment length
    pub fn min_text_length(mut self, len: usize) -> Self {
        self.min_text_length = len;
        self
    }

    /// Builder method: add a tag to the skip list
    pub fn skip_tag(mut self, tag: impl Into<String>) -> Self {
        self.skip_tags.insert(tag.into().to_ascii_lowercase());
        self
    }

    /// Builder method: set the inline tag
    pub fn inline_tag(mut self, tag: impl Into<String>) -> Self {
        self.inline_tag = tag.into().to_ascii_lowercase();
        self
    }

    /// Whether a lowercase tag name is on the skip list
    pub fn is_skip_tag(&self, tag: &str) -> bool {
        self.skip_tags.contains(tag)
    }

    /// Whether a tag name is the inline tag
    pub fn is_inline_tag(&self, tag: &str) -> bool {
        self.inline_tag.eq_ignore_ascii_case(tag)
    }
}
