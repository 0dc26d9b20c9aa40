//! # site-capture
//!
//! Capture what a reader actually sees on a web page. Pages are rendered in
//! Chrome/Chromium via the DevTools Protocol, cleaned of clutter, and reduced
//! to indented plain text plus a standalone copy of the main content markup.
//!
//! ## Features
//!
//! - **Visibility-aware text extraction**: hidden subtrees, scripts and styles
//!   are pruned; content is anchored on `main`, `#main` or `.main`
//! - **Clutter removal**: Framer artifacts, ads, cookie/GDPR banners, custom selectors
//! - **Main-content capture**: inline styles rewritten into utility classes by
//!   an external converter
//! - **Batch CLI**: one folder of artifacts per site
//!
//! ## Extracting text from a snapshot
//!
//! The extractor is pure; it works on any [`DomTree`], rendered or parsed:
//!
//! ```rust
//! use site_capture::{DomTree, ExtractionOptions, extract_page_text};
//!
//! let dom = DomTree::from_html("<body><main><h1>Title</h1><p>Hello</p></main></body>");
//! let text = extract_page_text(&dom, &ExtractionOptions::default());
//! assert!(text.contains("Title"));
//! ```
//!
//! ## Capturing a live page
//!
//! ```rust,no_run
//! use site_capture::{BrowserSession, CaptureOptions, LaunchOptions, process_url};
//!
//! # fn main() -> site_capture::Result<()> {
//! let session = BrowserSession::launch(LaunchOptions::default())?;
//! let report = process_url(&session, "https://example.com", "captures", &CaptureOptions::default())?;
//! println!("Text saved to {}", report.text_path.display());
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`browser`]: Browser session management and configuration
//! - [`dom`]: Rendered DOM snapshots with computed styles
//! - [`extract`]: Visibility-aware text extraction
//! - [`removal`]: Unwanted-element presets
//! - [`capture`]: Main-content markup capture and style conversion
//! - [`clipboard`]: Clipboard delivery with a scratch-element fallback
//! - [`host`]: Request/response adapter for embedding hosts
//! - [`tools`]: Capture steps as registry tools
//! - [`output`]: Per-site output folders
//! - [`pipeline`]: Per-URL capture run
//! - [`error`]: Error types and result aliases

pub mod browser;
pub mod capture;
pub mod clipboard;
pub mod dom;
pub mod error;
pub mod extract;
pub mod host;
pub mod output;
pub mod pipeline;
pub mod removal;
pub mod tools;

pub use browser::{BrowserSession, ConnectionOptions, LaunchOptions};
pub use capture::{CommandConverter, MainContent, StyleConverter};
pub use clipboard::{ClipboardHost, Delivery, deliver};
pub use dom::{ComputedStyle, DomNode, DomTree, ElementNode};
pub use error::{CaptureError, Result};
pub use extract::{ExtractionOptions, StyleResolver, TextExtractor, extract_page_text};
pub use host::{ExtractRequest, ExtractResponse, handle_request};
pub use output::SiteFolder;
pub use pipeline::{CaptureOptions, CaptureReport, process_url};
pub use removal::RemovalOptions;
pub use tools::{Tool, ToolContext, ToolRegistry, ToolResult};
