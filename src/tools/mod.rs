//! Capture tools
//!
//! Every browser-facing step of a capture run is a [`Tool`] with typed,
//! schema-described parameters. Tools are looked up by name in a
//! [`ToolRegistry`] and executed against a [`ToolContext`] borrowing the
//! session.

pub mod capture_dom;
pub mod extract_text;
pub mod navigate;
pub mod remove_elements;
pub mod utils;

pub use capture_dom::{CaptureDomParams, CaptureDomTool};
pub use extract_text::{ExtractTextParams, ExtractTextTool};
pub use navigate::{NavigateParams, NavigateTool};
pub use remove_elements::RemoveElementsTool;

use crate::browser::BrowserSession;
use crate::dom::DomTree;
use crate::error::{CaptureError, Result};
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of a tool execution
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolResult {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    pub fn success(data: Option<Value>) -> Self {
        Self { success: true, data, error: None }
    }

    pub fn success_with(data: Value) -> Self {
        Self::success(Some(data))
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self { success: false, data: None, error: Some(error.into()) }
    }

    /// Typed view of `data`
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T> {
        let data = self.data.clone().unwrap_or(Value::Null);
        Ok(serde_json::from_value(data)?)
    }
}

/// State shared by the tools of one run
pub struct ToolContext<'a> {
    pub session: &'a BrowserSession,

    /// DOM snapshot, taken on first use
    pub dom: Option<DomTree>,
}

impl<'a> ToolContext<'a> {
    pub fn new(session: &'a BrowserSession) -> Self {
        Self { session, dom: None }
    }

    pub fn with_dom(session: &'a BrowserSession, dom: DomTree) -> Self {
        Self { session, dom: Some(dom) }
    }

    /// The cached snapshot, taking one if needed
    pub fn get_dom(&mut self) -> Result<&DomTree> {
        if self.dom.is_none() {
            self.dom = Some(self.session.snapshot_dom()?);
        }
        self.dom.as_ref().ok_or_else(|| CaptureError::DomParseFailed("No DOM snapshot available".to_string()))
    }

    /// Drop the cached snapshot after the page changed
    pub fn invalidate_dom(&mut self) {
        self.dom = None;
    }
}

/// A browser operation with typed parameters
pub trait Tool: Send + Sync {
    type Params: DeserializeOwned + JsonSchema;

    fn name(&self) -> &str;

    /// JSON schema of [`Tool::Params`]
    fn parameters_schema(&self) -> Value {
        serde_json::to_value(schemars::schema_for!(Self::Params)).unwrap_or_default()
    }

    fn execute_typed(&self, params: Self::Params, context: &mut ToolContext) -> Result<ToolResult>;

    /// Deserialize `params` and execute
    fn execute(&self, params: Value, context: &mut ToolContext) -> Result<ToolResult> {
        let typed = serde_json::from_value(params)
            .map_err(|e| CaptureError::InvalidArgument(format!("{}: {}", self.name(), e)))?;
        self.execute_typed(typed, context)
    }
}

/// Object-safe view of a [`Tool`] for storage in the registry
pub trait DynTool: Send + Sync {
    fn name(&self) -> &str;
    fn parameters_schema(&self) -> Value;
    fn execute(&self, params: Value, context: &mut ToolContext) -> Result<ToolResult>;
}

impl<T: Tool> DynTool for T {
    fn name(&self) -> &str {
        Tool::name(self)
    }

    fn parameters_schema(&self) -> Value {
        Tool::parameters_schema(self)
    }

    fn execute(&self, params: Value, context: &mut ToolContext) -> Result<ToolResult> {
        Tool::execute(self, params, context)
    }
}

/// Tools by name, in registration order
#[derive(Default)]
pub struct ToolRegistry {
    tools: IndexMap<String, Box<dyn DynTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in capture tool
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(NavigateTool);
        registry.register(RemoveElementsTool);
        registry.register(ExtractTextTool);
        registry.register(CaptureDomTool);
        registry
    }

    /// Add a tool, replacing any tool with the same name
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        let name = Tool::name(&tool).to_string();
        self.tools.insert(name, Box::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<&dyn DynTool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn execute(&self, name: &str, params: Value, context: &mut ToolContext) -> Result<ToolResult> {
        let tool = self.get(name).ok_or_else(|| CaptureError::UnknownTool(name.to_string()))?;
        log::debug!("Executing tool '{}'", name);
        tool.execute(params, context)
    }
}
