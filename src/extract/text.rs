use crate::dom::{ComputedStyle, DomTree, ElementNode};
use crate::error::Result;
use crate::extract::options::ExtractionOptions;
use std::iter;

/// Returned when the document has no body
pub const NO_CONTENT: &str = "No content found";

const HEADER: &str = "# Text extracted from the page: \n\n";
const FOOTER: &str = "\n\n---";

/// Supplies the computed style of an element.
///
/// The extractor never reads styles on its own; whoever rendered the page
/// provides them through this capability.
pub trait StyleResolver {
    fn computed_style(&self, node: &ElementNode) -> Result<ComputedStyle>;
}

/// Reads the styles recorded on each node when the snapshot was taken
#[derive(Debug, Default, Clone, Copy)]
pub struct SnapshotStyles;

impl StyleResolver for SnapshotStyles {
    fn computed_style(&self, node: &ElementNode) -> Result<ComputedStyle> {
        Ok(node.style.clone())
    }
}

/// Accumulates extracted lines.
///
/// A block element opens an indented line; inline text is never indented and
/// joins whichever line is open, separated by one space.
#[derive(Debug, Default)]
pub(crate) struct TextBuffer {
    out: String,
    line_open: bool,
}

impl TextBuffer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn push_line(&mut self, depth: usize, text: &str) {
        self.end_line();
        self.out.extend(iter::repeat_n(' ', depth));
        self.out.push_str(text);
        self.line_open = true;
    }

    fn push_inline(&mut self, text: &str) {
        if self.line_open && !self.out.ends_with(char::is_whitespace) {
            self.out.push(' ');
        }
        self.out.push_str(text);
        self.line_open = true;
    }

    fn end_line(&mut self) {
        if self.line_open {
            self.out.push('\n');
            self.line_open = false;
        }
    }

    pub(crate) fn into_string(mut self) -> String {
        self.end_line();
        self.out
    }
}

/// Walks a rendered DOM and produces indented plain text
#[derive(Debug, Clone)]
pub struct TextExtractor<S = SnapshotStyles> {
    options: ExtractionOptions,
    styles: S,
}

impl TextExtractor<SnapshotStyles> {
    /// Extractor reading styles from the snapshot itself
    pub fn new(options: ExtractionOptions) -> Self {
        Self { options, styles: SnapshotStyles }
    }
}

impl Default for TextExtractor<SnapshotStyles> {
    fn default() -> Self {
        Self::new(ExtractionOptions::default())
    }
}

impl<S: StyleResolver> TextExtractor<S> {
    /// Extractor with an injected style source
    pub fn with_styles(options: ExtractionOptions, styles: S) -> Self {
        Self { options, styles }
    }

    pub fn options(&self) -> &ExtractionOptions {
        &self.options
    }

    pub fn is_visible(&self, node: &ElementNode) -> Result<bool> {
        if self.options.include_hidden {
            return Ok(true);
        }
        let style = self.styles.computed_style(node)?;
        Ok(style.display != "none" && style.visibility != "hidden" && style.opacity != "0")
    }

    /// Skipped nodes contribute nothing, and neither do their descendants
    pub fn should_skip(&self, node: &ElementNode) -> Result<bool> {
        if self.options.is_skip_tag(&node.tag_name.to_ascii_lowercase()) {
            return Ok(true);
        }
        Ok(!self.is_visible(node)?)
    }

    /// Text of the node's own text-node children, excluding descendant elements
    pub fn direct_text(&self, node: &ElementNode) -> String {
        let min = self.options.min_text_length;
        node.text_nodes()
            .map(str::trim)
            .filter(|fragment| fragment.chars().count() >= min)
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string()
    }

    pub(crate) fn traverse(&self, node: &ElementNode, depth: usize, out: &mut TextBuffer) -> Result<()> {
        if self.should_skip(node)? {
            return Ok(());
        }

        let inline = self.options.is_inline_tag(&node.tag_name);
        let text = self.direct_text(node);

        if inline {
            if !text.is_empty() {
                out.push_inline(&text);
            }
        } else if text.is_empty() {
            out.end_line();
        } else {
            out.push_line(depth, &text);
        }

        let child_depth = if inline { depth } else { depth + 1 };
        for child in node.elements() {
            self.traverse(child, child_depth, out)?;
        }

        if !inline {
            out.end_line();
        }
        Ok(())
    }

    /// Render one subtree starting at depth zero
    pub fn render(&self, node: &ElementNode) -> Result<String> {
        let mut out = TextBuffer::new();
        self.traverse(node, 0, &mut out)?;
        Ok(out.into_string())
    }

    /// Extract the page text, choosing the content anchor by priority.
    ///
    /// Always returns a string: [`NO_CONTENT`] when there is no body, and a
    /// `Text extraction failed: ...` message when the walk itself fails.
    pub fn extract_page_text(&self, document: &DomTree) -> String {
        match self.try_extract_page_text(document) {
            Ok(Some(text)) => text,
            Ok(None) => NO_CONTENT.to_string(),
            Err(e) => {
                log::warn!("Text extraction failed: {}", e);
                format!("Text extraction failed: {}", e)
            }
        }
    }

    fn try_extract_page_text(&self, document: &DomTree) -> Result<Option<String>> {
        let Some(body) = document.body.as_ref() else {
            return Ok(None);
        };

        let (mut roots, anchor) = self.select_anchors(body)?;

        for footer in iter::once(body).chain(body.descendants()).filter(|n| n.is_tag("footer")) {
            if !self.is_visible(footer)? || anchor.is_some_and(|a| a.contains(footer)) {
                continue;
            }
            roots.push(footer);
        }

        let parts = roots.iter().map(|root| self.render(root)).collect::<Result<Vec<_>>>()?;
        let mut content = parts.join("\n");

        if content.trim().is_empty() {
            log::debug!("Anchored content was empty, falling back to the whole body");
            content = self.render(body)?;
        }

        Ok(Some(format!("{}{}{}", HEADER, content.trim(), FOOTER)))
    }

    /// Matches of the first tier with a visible hit, plus the last anchor
    /// processed, which is the one that guards footer deduplication. The body
    /// fallback tracks no anchor.
    fn select_anchors<'a>(&self, body: &'a ElementNode) -> Result<(Vec<&'a ElementNode>, Option<&'a ElementNode>)> {
        let tiers: [(&str, fn(&ElementNode) -> bool); 3] = [
            ("main", |n| n.is_tag("main")),
            ("#main", |n| n.id().is_some_and(|id| id == "main")),
            (".main", |n| n.has_class("main")),
        ];

        for (label, matches) in tiers {
            let mut roots = Vec::new();
            for node in iter::once(body).chain(body.descendants()).filter(|n| matches(n)) {
                if self.is_visible(node)? {
                    roots.push(node);
                }
            }
            if let Some(&last) = roots.last() {
                log::debug!("Content anchored on '{}' ({} match(es))", label, roots.len());
                return Ok((roots, Some(last)));
            }
        }

        log::debug!("No content anchor matched, using body");
        Ok((vec![body], None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CaptureError;

    fn el(tag: &str) -> ElementNode {
        ElementNode::new(tag)
    }

    fn hidden(tag: &str) -> ElementNode {
        el(tag).with_style(ComputedStyle::default().with_display("none"))
    }

    fn extractor() -> TextExtractor {
        TextExtractor::default()
    }

    fn content_of(output: &str) -> &str {
        output.strip_prefix(HEADER).and_then(|rest| rest.strip_suffix(FOOTER)).expect("output should be wrapped")
    }

    struct FailingStyles;

    impl StyleResolver for FailingStyles {
        fn computed_style(&self, node: &ElementNode) -> Result<ComputedStyle> {
            if node.is_tag("aside") {
                Err(CaptureError::StyleResolution {
                    tag: node.tag_name.clone(),
                    reason: "renderer detached".to_string(),
                })
            } else {
                Ok(node.style.clone())
            }
        }
    }

    #[test]
    fn test_visibility_fields_independently() {
        let ex = extractor();
        let base = ComputedStyle::default();

        assert!(ex.is_visible(&el("div").with_style(base.clone())).unwrap());
        assert!(!ex.is_visible(&el("div").with_style(base.clone().with_display("none"))).unwrap());
        assert!(!ex.is_visible(&el("div").with_style(base.clone().with_visibility("hidden"))).unwrap());
        assert!(!ex.is_visible(&el("div").with_style(base.clone().with_opacity("0"))).unwrap());
        assert!(!ex.is_visible(&el("div").with_style(base.clone().with_display("none").with_opacity("0"))).unwrap());
        // Only the exact string "0" counts as transparent
        assert!(ex.is_visible(&el("div").with_style(base.with_opacity("0.5"))).unwrap());
    }

    #[test]
    fn test_include_hidden_bypasses_filter() {
        let ex = TextExtractor::new(ExtractionOptions::new().include_hidden(true));
        assert!(ex.is_visible(&hidden("div")).unwrap());
        assert!(!ex.should_skip(&hidden("div")).unwrap());
        assert!(ex.should_skip(&el("script")).unwrap());
    }

    #[test]
    fn test_should_skip() {
        let ex = extractor();
        assert!(ex.should_skip(&el("SCRIPT")).unwrap());
        assert!(ex.should_skip(&el("head")).unwrap());
        assert!(ex.should_skip(&hidden("p")).unwrap());
        assert!(!ex.should_skip(&el("p")).unwrap());
    }

    #[test]
    fn test_direct_text_excludes_descendants() {
        let ex = extractor();
        let parent = el("div").with_text("  Parent  ").with_child(el("p").with_text("Child")).with_text(" tail ");

        assert_eq!(ex.direct_text(&parent), "Parent tail");

        let rendered = ex.render(&parent).unwrap();
        assert_eq!(rendered, "Parent tail\n Child\n");
    }

    #[test]
    fn test_direct_text_min_length() {
        let ex = TextExtractor::new(ExtractionOptions::new().min_text_length(3));
        let node = el("p").with_text("ab").with_text("  abc ").with_text("x").with_text("long");
        assert_eq!(ex.direct_text(&node), "abc long");
    }

    #[test]
    fn test_skipped_subtree_is_pruned() {
        let ex = extractor();
        let root = el("div")
            .with_child(el("script").with_text("var x = 1;").with_child(el("p").with_text("inner")))
            .with_child(hidden("section").with_child(el("p").with_text("ghost")))
            .with_child(el("p").with_text("shown"));

        assert_eq!(ex.render(&root).unwrap(), " shown\n");
    }

    #[test]
    fn test_inline_text_joins_parent_line() {
        let ex = extractor();
        let body = el("body").with_child(
            el("main")
                .with_child(el("h1").with_text("Title"))
                .with_child(el("p").with_text("Hello ").with_child(el("span").with_text("world"))),
        );

        let output = ex.extract_page_text(&DomTree::new(body));
        assert_eq!(content_of(&output), "Title\n Hello world");
    }

    #[test]
    fn test_inline_passes_own_depth() {
        let ex = extractor();
        let root = el("div").with_child(el("span").with_text("a").with_child(el("p").with_text("under span")));

        // span text is unindented; its block child stays at the span's depth
        assert_eq!(ex.render(&root).unwrap(), "a\n under span\n");
    }

    #[test]
    fn test_inline_does_not_attach_to_previous_block() {
        let ex = extractor();
        let root = el("div").with_child(el("p").with_text("first")).with_child(el("span").with_text("loose"));

        assert_eq!(ex.render(&root).unwrap(), " first\nloose\n");
    }

    #[test]
    fn test_inline_text_is_never_indented() {
        let body = el("body").with_child(
            el("main")
                .with_child(el("h1").with_text("Top"))
                .with_child(el("div").with_child(el("p").with_text("first")).with_child(el("span").with_text("loose"))),
        );

        let output = extractor().extract_page_text(&DomTree::new(body));
        assert_eq!(content_of(&output), "Top\n  first\nloose");
    }

    #[test]
    fn test_custom_inline_tag() {
        let ex = TextExtractor::new(ExtractionOptions::new().inline_tag("a"));
        let root =
            el("p").with_text("see").with_child(el("a").with_text("docs")).with_child(el("span").with_text("next"));

        assert_eq!(ex.render(&root).unwrap(), "see docs\n next\n");
    }

    #[test]
    fn test_main_tag_beats_main_id() {
        let body = el("body")
            .with_child(el("div").with_attribute("id", "main").with_text("by id"))
            .with_child(el("main").with_text("by tag"));

        let output = extractor().extract_page_text(&DomTree::new(body));
        assert_eq!(content_of(&output), "by tag");
    }

    #[test]
    fn test_id_then_class_tiers() {
        let by_id = el("body")
            .with_child(el("div").with_attribute("class", "main").with_text("by class"))
            .with_child(el("div").with_attribute("id", "main").with_text("by id"));
        assert_eq!(content_of(&extractor().extract_page_text(&DomTree::new(by_id))), "by id");

        let by_class = el("body")
            .with_child(el("div").with_text("chrome"))
            .with_child(el("div").with_attribute("class", "wrapper main").with_text("by class"));
        assert_eq!(content_of(&extractor().extract_page_text(&DomTree::new(by_class))), "by class");
    }

    #[test]
    fn test_hidden_anchor_falls_through_to_next_tier() {
        let body = el("body")
            .with_child(hidden("main").with_text("hidden main"))
            .with_child(el("div").with_attribute("id", "main").with_text("visible id"));

        assert_eq!(content_of(&extractor().extract_page_text(&DomTree::new(body))), "visible id");
    }

    #[test]
    fn test_all_matches_of_winning_tier_are_used() {
        let body = el("body")
            .with_child(el("main").with_text("one"))
            .with_child(el("div").with_text("between"))
            .with_child(el("main").with_text("two"));

        assert_eq!(content_of(&extractor().extract_page_text(&DomTree::new(body))), "one\n\ntwo");
    }

    #[test]
    fn test_footer_outside_anchor_is_appended() {
        let body = el("body")
            .with_child(el("main").with_text("Body text"))
            .with_child(el("footer").with_text("Footer text"));

        assert_eq!(
            content_of(&extractor().extract_page_text(&DomTree::new(body))),
            "Body text\n\nFooter text"
        );
    }

    #[test]
    fn test_footer_inside_anchor_appears_once() {
        let body = el("body").with_child(
            el("main").with_text("Body text").with_child(el("footer").with_text("Footer text")),
        );

        let output = extractor().extract_page_text(&DomTree::new(body));
        assert_eq!(output.matches("Footer text").count(), 1);
        assert_eq!(content_of(&output), "Body text\n Footer text");
    }

    #[test]
    fn test_only_last_anchor_guards_footers() {
        let body = el("body")
            .with_child(el("main").with_text("first").with_child(el("footer").with_text("inner foot")))
            .with_child(el("main").with_text("second"));

        let output = extractor().extract_page_text(&DomTree::new(body));
        assert_eq!(output.matches("inner foot").count(), 2);
    }

    #[test]
    fn test_body_fallback_still_appends_footers() {
        let body = el("body").with_child(el("div").with_text("Plain page")).with_child(el("footer").with_text("Foot"));

        let output = extractor().extract_page_text(&DomTree::new(body));
        assert_eq!(content_of(&output), "Plain page\n Foot\n\nFoot");
    }

    #[test]
    fn test_hidden_footer_is_ignored() {
        let body = el("body").with_child(el("main").with_text("Body")).with_child(hidden("footer").with_text("Secret"));

        assert_eq!(content_of(&extractor().extract_page_text(&DomTree::new(body))), "Body");
    }

    #[test]
    fn test_empty_anchor_falls_back_to_body() {
        let body = el("body")
            .with_child(el("main").with_child(el("script").with_text("x()")))
            .with_child(el("div").with_text("Outside"));

        assert_eq!(content_of(&extractor().extract_page_text(&DomTree::new(body))), "Outside");
    }

    #[test]
    fn test_only_skip_tags_yields_empty_content() {
        let body = el("body")
            .with_child(el("script").with_text("track()"))
            .with_child(el("style").with_text("p{}"))
            .with_child(el("noscript").with_text("enable js"));

        let output = extractor().extract_page_text(&DomTree::new(body));
        assert_eq!(output, format!("{}{}", HEADER, FOOTER));
        assert_eq!(content_of(&output), "");
    }

    #[test]
    fn test_missing_body() {
        assert_eq!(extractor().extract_page_text(&DomTree::empty()), NO_CONTENT);
    }

    #[test]
    fn test_idempotent() {
        let body = el("body").with_child(
            el("main")
                .with_child(el("h2").with_text("Heading"))
                .with_child(el("ul").with_child(el("li").with_text("one")).with_child(el("li").with_text("two"))),
        );
        let doc = DomTree::new(body);
        let ex = extractor();

        assert_eq!(ex.extract_page_text(&doc), ex.extract_page_text(&doc));
    }

    #[test]
    fn test_resolver_failure_becomes_message() {
        let ex = TextExtractor::with_styles(ExtractionOptions::default(), FailingStyles);
        let body = el("body").with_child(el("main").with_text("ok").with_child(el("aside").with_text("boom")));

        let output = ex.extract_page_text(&DomTree::new(body));
        assert!(output.starts_with("Text extraction failed: "));
        assert!(output.contains("renderer detached"));
    }

    #[test]
    fn test_resolver_not_consulted_when_including_hidden() {
        let opts = ExtractionOptions::new().include_hidden(true);
        let ex = TextExtractor::with_styles(opts, FailingStyles);
        let body = el("body").with_child(el("aside").with_text("side"));

        assert_eq!(content_of(&ex.extract_page_text(&DomTree::new(body))), "side");
    }
}
