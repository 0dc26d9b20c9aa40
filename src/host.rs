//! Request/response adapter for embedding hosts
//!
//! A host (browser extension, plugin bridge) sends one JSON request and gets
//! exactly one JSON response back, synchronously.

use crate::clipboard::{self, ClipboardHost};
use crate::dom::DomTree;
use crate::extract::{ExtractionOptions, TextExtractor};
use serde::{Deserialize, Serialize};

pub const EXTRACT_TEXT: &str = "extractText";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractRequest {
    pub action: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<ExtractionOptions>,

    /// Also deliver the text to the host clipboard
    #[serde(default)]
    pub copy: bool,
}

impl ExtractRequest {
    pub fn extract_text() -> Self {
        Self { action: EXTRACT_TEXT.to_string(), options: None, copy: false }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractResponse {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExtractResponse {
    pub fn ok(data: String) -> Self {
        Self { success: true, data: Some(data), error: None }
    }

    pub fn err(error: impl Into<String>) -> Self {
        Self { success: false, data: None, error: Some(error.into()) }
    }
}

/// Answer one request against `document`.
///
/// Clipboard delivery only logs its outcome; the response always carries the
/// extracted text.
pub fn handle_request(
    request: &ExtractRequest,
    document: &DomTree,
    clipboard: Option<&dyn ClipboardHost>,
) -> ExtractResponse {
    if request.action != EXTRACT_TEXT {
        return ExtractResponse::err(format!("Unknown action: {}", request.action));
    }

    let options = request.options.clone().unwrap_or_default();
    let text = TextExtractor::new(options).extract_page_text(document);

    if request.copy {
        match clipboard {
            Some(host) => {
                let delivery = clipboard::deliver(host, &text);
                log::debug!("Clipboard delivery: {:?}", delivery);
            }
            None => log::warn!("Copy requested but the host has no clipboard"),
        }
    }

    ExtractResponse::ok(text)
}

/// Answer a raw JSON message; always yields a serialized response
pub fn handle_message(message: &str, document: &DomTree, clipboard: Option<&dyn ClipboardHost>) -> String {
    let response = match serde_json::from_str::<ExtractRequest>(message) {
        Ok(request) => handle_request(&request, document, clipboard),
        Err(e) => ExtractResponse::err(format!("Invalid request: {}", e)),
    };

    serde_json::to_string(&response).unwrap_or_else(|e| {
        log::error!("Failed to serialize response: {}", e);
        r#"{"success":false,"error":"Failed to serialize response"}"#.to_string()
    })
}
