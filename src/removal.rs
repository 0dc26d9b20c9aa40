//! Removal of clutter before extraction: site-builder artifacts, ads, cookie
//! and consent banners, and caller-supplied selectors.

use crate::browser::BrowserSession;
use crate::error::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Removed on every run
pub const ALWAYS_REMOVED: &[&str] = &["script", "noscript"];

/// Framer server-side-rendering variants and the "Made in Framer" badge
pub const FRAMER_SELECTORS: &[&str] = &["div.ssr-variant", "div#__framer-badge-container"];

/// Ads, cookie/GDPR banners, overlays and tracking consent
pub const COMMON_UNWANTED_SELECTORS: &[&str] = &[
    ".advertisement",
    ".ads",
    ".cookie-banner",
    ".gdpr-banner",
    "#cookie-notice",
    ".popup-overlay",
    ".modal-overlay",
    "[id*=\"cookie\"]",
    "[class*=\"cookie\"]",
    "[id*=\"gdpr\"]",
    "[class*=\"gdpr\"]",
    ".tracking-consent",
];

/// Which groups of elements to strip from the page
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct RemovalOptions {
    /// Remove Framer-specific elements
    pub remove_framer: bool,

    /// Remove ads, cookie banners, GDPR notices and popup overlays
    pub remove_common_unwanted: bool,

    /// Additional CSS selectors to remove
    pub custom_selectors: Vec<String>,
}

impl RemovalOptions {
    /// Every selector to remove, in application order
    pub fn selectors(&self) -> Vec<String> {
        let mut selectors: Vec<String> = ALWAYS_REMOVED.iter().map(|s| s.to_string()).collect();

        if self.remove_framer {
            selectors.extend(FRAMER_SELECTORS.iter().map(|s| s.to_string()));
        }
        if self.remove_common_unwanted {
            selectors.extend(COMMON_UNWANTED_SELECTORS.iter().map(|s| s.to_string()));
        }
        selectors.extend(self.custom_selectors.iter().map(|s| s.trim().to_string()).filter(|s| !s.is_empty()));

        selectors
    }
}

/// Script removing every match of one selector; yields the count, or -1 when
/// the selector does not parse
pub fn removal_script(selector: &str) -> Result<String> {
    let literal = serde_json::to_string(selector)?;
    Ok(format!(
        r#"(function() {{
            let elements;
            try {{ elements = document.querySelectorAll({literal}); }} catch (e) {{ return -1; }}
            elements.forEach(el => el.remove());
            return elements.length;
        }})()"#
    ))
}

/// Strip unwanted elements from the active tab and return how many were removed.
///
/// Each selector is applied on its own; one that fails is logged and skipped.
pub fn remove_unwanted_elements(session: &BrowserSession, options: &RemovalOptions) -> Result<usize> {
    if options.remove_framer {
        log::info!("Removing Framer elements (ssr-variant, __framer-badge-container)");
    }
    if options.remove_common_unwanted {
        log::info!("Removing common unwanted elements (ads, cookies, popups)");
    }
    if !options.custom_selectors.is_empty() {
        log::info!("Removing custom elements: {}", options.custom_selectors.join(", "));
    }

    let mut removed = 0usize;
    for selector in options.selectors() {
        let outcome = removal_script(&selector).and_then(|js| session.evaluate(&js));
        match outcome {
            Ok(value) => match value.and_then(|v| v.as_i64()) {
                Some(count) if count >= 0 => removed += count as usize,
                Some(_) => log::warn!("Invalid selector skipped: {}", selector),
                None => log::debug!("Selector {} returned no count", selector),
            },
            Err(e) => log::warn!("Failed to remove '{}': {}", selector, e),
        }
    }

    if removed > 0 {
        log::info!("Removed {} unwanted elements", removed);
    } else {
        log::info!("No unwanted elements found to remove");
    }
    Ok(removed)
}
