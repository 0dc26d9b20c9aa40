//! Per-URL capture pipeline
//!
//! navigate, settle, remove clutter, extract text, capture the main content
//! markup, write artifacts. Each step runs as a registry tool.

use crate::browser::BrowserSession;
use crate::capture::MainContent;
use crate::error::{CaptureError, Result};
use crate::extract::ExtractionOptions;
use crate::output::SiteFolder;
use crate::removal::RemovalOptions;
use crate::tools::{CaptureDomParams, ExtractTextParams, NavigateParams, ToolContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Everything a capture run needs besides the browser
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CaptureOptions {
    pub extraction: ExtractionOptions,
    pub removal: RemovalOptions,

    /// Seconds to wait after load for client-side rendering
    pub delay_secs: f64,

    /// External CSS-to-classes command for the DOM capture
    pub converter: Option<String>,

    /// Copy the extracted text to the page clipboard
    pub copy: bool,

    /// Save the main-content markup next to the text
    pub capture_dom: bool,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            extraction: ExtractionOptions::default(),
            removal: RemovalOptions::default(),
            delay_secs: 2.0,
            converter: None,
            copy: false,
            capture_dom: true,
        }
    }
}

/// What one URL produced
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureReport {
    pub url: String,
    pub folder: PathBuf,
    pub text_path: PathBuf,
    pub dom_path: Option<PathBuf>,
    pub selector_used: Option<String>,
    pub removed: usize,
    pub elapsed: Duration,
}

fn run_tool(context: &mut ToolContext, name: &str, params: Value) -> Result<Value> {
    let session = context.session;
    let result = session.tool_registry().execute(name, params, context)?;
    if !result.success {
        return Err(CaptureError::ToolExecutionFailed {
            tool: name.to_string(),
            reason: result.error.unwrap_or_else(|| "unknown error".to_string()),
        });
    }
    Ok(result.data.unwrap_or(Value::Null))
}

/// Capture one URL into its folder under `output_dir`
pub fn process_url(
    session: &BrowserSession,
    url: &str,
    output_dir: impl AsRef<Path>,
    options: &CaptureOptions,
) -> Result<CaptureReport> {
    let started = Instant::now();
    let folder = SiteFolder::for_url(output_dir, url)?;
    folder.create()?;

    log::info!("Processing: {}", url);
    log::info!("Output folder: {}", folder.dir().display());

    let mut context = ToolContext::new(session);

    let navigate = NavigateParams {
        url: url.to_string(),
        wait_for_load: true,
        settle_secs: if options.delay_secs.is_finite() { options.delay_secs.max(0.0) } else { 0.0 },
    };
    run_tool(&mut context, "navigate", serde_json::to_value(navigate)?)?;

    let removed = run_tool(&mut context, "remove_elements", serde_json::to_value(&options.removal)?)?
        .get("removed")
        .and_then(Value::as_u64)
        .unwrap_or(0) as usize;

    let extract = ExtractTextParams { options: options.extraction.clone(), copy: options.copy };
    let extracted = run_tool(&mut context, "extract_text", serde_json::to_value(extract)?)?;
    let text = extracted.get("text").and_then(Value::as_str).unwrap_or_default();
    let text_path = folder.write_text(text)?;

    if options.copy && extracted.get("copied").and_then(Value::as_bool) != Some(true) {
        log::warn!("Text for {} was not copied to the clipboard", url);
    }

    let mut dom_path = None;
    let mut selector_used = None;
    if options.capture_dom {
        let params = CaptureDomParams { converter: options.converter.clone() };
        let captured = serde_json::to_value(params)
            .map_err(CaptureError::from)
            .and_then(|p| run_tool(&mut context, "capture_dom", p))
            .and_then(|v| serde_json::from_value::<MainContent>(v).map_err(CaptureError::from));

        match captured {
            Ok(content) => {
                dom_path = Some(folder.write_dom(&content.to_document())?);
                selector_used = Some(content.selector);
            }
            Err(e) => log::warn!("Error extracting DOM for {}: {}", url, e),
        }
    }

    Ok(CaptureReport {
        url: url.to_string(),
        folder: folder.dir().to_path_buf(),
        text_path,
        dom_path,
        selector_used,
        removed,
        elapsed: started.elapsed(),
    })
}

/// Tally of a batch run
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: Vec<String>,
}

impl BatchSummary {
    pub fn record(&mut self, url: &str, outcome: &Result<CaptureReport>) {
        match outcome {
            Ok(_) => self.succeeded += 1,
            Err(_) => self.failed.push(url.to_string()),
        }
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_options_defaults() {
        let opts = CaptureOptions::default();
        assert_eq!(opts.delay_secs, 2.0);
        assert!(opts.capture_dom);
        assert!(!opts.copy);
        assert!(opts.converter.is_none());
    }

    #[test]
    fn test_capture_options_partial_json() {
        let opts: CaptureOptions = serde_json::from_value(serde_json::json!({
            "removal": { "remove_framer": true },
            "extraction": { "includeHidden": true },
            "delay_secs": 0.5
        }))
        .unwrap();

        assert!(opts.removal.remove_framer);
        assert!(opts.extraction.include_hidden);
        assert_eq!(opts.delay_secs, 0.5);
        assert!(opts.capture_dom);
    }

    #[test]
    fn test_batch_summary() {
        let mut summary = BatchSummary::default();
        let report = CaptureReport {
            url: "https://a.example".to_string(),
            folder: PathBuf::from("out/a.example"),
            text_path: PathBuf::from("out/a.example/a.example_text.txt"),
            dom_path: None,
            selector_used: None,
            removed: 0,
            elapsed: Duration::from_millis(5),
        };

        summary.record("https://a.example", &Ok(report));
        summary.record("https://b.example", &Err(CaptureError::NavigationFailed("timeout".to_string())));

        assert_eq!(summary.total(), 2);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, vec!["https://b.example"]);
        assert!(!summary.all_succeeded());
    }
}
