//! Main-content DOM capture
//!
//! Locates the page's main content container, then rewrites inline `style`
//! attributes into utility classes produced by an external converter. Every
//! `style` attribute is dropped, converted or not.

use crate::browser::BrowserSession;
use crate::error::{CaptureError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};

/// Candidate containers, most specific first; `body` always matches
pub const MAIN_CONTENT_SELECTORS: &[&str] = &[
    "main",
    "[role=\"main\"]",
    ".main-content",
    "#main-content",
    ".content",
    "#content",
    "body > div:first-child",
    "body",
];

/// Turns a CSS declaration block into space-separated utility classes
pub trait StyleConverter {
    fn convert(&self, css: &str) -> Result<String>;
}

/// Converter that knows no classes; styles are only stripped
#[derive(Debug, Default, Clone, Copy)]
pub struct StripStyles;

impl StyleConverter for StripStyles {
    fn convert(&self, _css: &str) -> Result<String> {
        Ok(String::new())
    }
}

/// Runs an external program that reads CSS on stdin and prints classes
#[derive(Debug, Clone)]
pub struct CommandConverter {
    program: String,
    args: Vec<String>,
}

impl CommandConverter {
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into(), args: Vec::new() }
    }

    /// Split a command line such as `node convert_css.js` on whitespace
    pub fn from_command_line(command: &str) -> Result<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or_else(|| CaptureError::InvalidArgument("empty converter command".to_string()))?;
        Ok(Self { program, args: parts.collect() })
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl StyleConverter for CommandConverter {
    fn convert(&self, css: &str) -> Result<String> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| CaptureError::ConversionFailed(format!("failed to start {}: {}", self.program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            // A converter may exit without reading its input
            if let Err(e) = stdin.write_all(css.as_bytes()) {
                if e.kind() != ErrorKind::BrokenPipe {
                    return Err(e.into());
                }
            }
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(CaptureError::ConversionFailed(String::from_utf8_lossy(&output.stderr).trim().to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// The captured main-content markup
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MainContent {
    /// Selector that matched the container
    pub selector: String,

    /// Inner HTML of the container
    pub html: String,

    /// Distinct inline style values found inside it
    #[serde(default)]
    pub styles: Vec<String>,
}

impl MainContent {
    /// Wrap the markup in a standalone document recording the selector used
    pub fn to_document(&self) -> String {
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n    <meta charset=\"utf-8\">\n    <title>Extracted Main Content</title>\n    <meta name=\"selector-used\" content=\"{}\">\n</head>\n<body>\n{}\n</body>\n</html>\n",
            escape_attr(&self.selector),
            self.html.trim()
        )
    }
}

fn escape_attr(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Convert each distinct style once; failures leave that style without classes
pub fn build_class_map<C: StyleConverter + ?Sized>(styles: &[String], converter: &C) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for style in styles {
        if map.contains_key(style) {
            continue;
        }
        let classes = match converter.convert(style) {
            Ok(classes) => classes,
            Err(e) => {
                log::warn!("Error converting CSS '{}': {}", style, e);
                String::new()
            }
        };
        map.insert(style.clone(), classes);
    }
    map
}

fn locate_script() -> Result<String> {
    let selectors = serde_json::to_string(MAIN_CONTENT_SELECTORS)?;
    Ok(format!(
        r#"(function() {{
            const selectors = {selectors};
            for (const selector of selectors) {{
                const el = document.querySelector(selector);
                if (el && el.innerHTML.trim().length > 0) {{
                    const styles = new Set();
                    el.querySelectorAll("[style]").forEach(node => styles.add(node.getAttribute("style")));
                    return JSON.stringify({{ selector: selector, html: el.innerHTML, styles: Array.from(styles) }});
                }}
            }}
            return JSON.stringify({{ selector: "body", html: document.body ? document.body.innerHTML : "", styles: [] }});
        }})()"#
    ))
}

fn rewrite_script(html: &str, classes: &BTreeMap<String, String>) -> Result<String> {
    let html = serde_json::to_string(html)?;
    let classes = serde_json::to_string(classes)?;
    Ok(format!(
        r#"(function() {{
            const classes = {classes};
            const template = document.createElement("template");
            template.innerHTML = {html};
            template.content.querySelectorAll("[style]").forEach(node => {{
                const converted = classes[node.getAttribute("style")] || "";
                converted.split(/\s+/).filter(Boolean).forEach(c => node.classList.add(c));
                node.removeAttribute("style");
            }});
            return template.innerHTML;
        }})()"#
    ))
}

/// Capture the main content of the active tab with inline styles converted
pub fn capture_main_content<C: StyleConverter + ?Sized>(
    session: &BrowserSession,
    converter: &C,
) -> Result<MainContent> {
    let value = session
        .evaluate(&locate_script()?)?
        .ok_or_else(|| CaptureError::EvaluationFailed("main content locator returned nothing".to_string()))?;
    let json: String = serde_json::from_value(value)?;
    let mut content: MainContent = serde_json::from_str(&json)?;

    log::info!("Found main content using selector: {}", content.selector);

    let classes = build_class_map(&content.styles, converter);
    let rewritten = session
        .evaluate(&rewrite_script(&content.html, &classes)?)?
        .and_then(|v| v.as_str().map(str::to_string))
        .ok_or_else(|| CaptureError::EvaluationFailed("style rewrite returned nothing".to_string()))?;

    content.html = rewritten;
    Ok(content)
}
