use crate::capture::{self, CommandConverter, MainContent, StripStyles, StyleConverter};
use crate::error::Result;
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the capture_dom tool
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CaptureDomParams {
    /// Command that reads CSS on stdin and prints utility classes.
    /// Without one, inline styles are stripped.
    #[serde(default)]
    pub converter: Option<String>,
}

impl CaptureDomParams {
    fn style_converter(&self) -> Result<Box<dyn StyleConverter>> {
        Ok(match self.converter.as_deref().map(str::trim) {
            Some(command) if !command.is_empty() => Box::new(CommandConverter::from_command_line(command)?),
            _ => Box::new(StripStyles),
        })
    }
}

/// Tool for capturing the page's main content markup
#[derive(Default)]
pub struct CaptureDomTool;

impl Tool for CaptureDomTool {
    type Params = CaptureDomParams;

    fn name(&self) -> &str {
        "capture_dom"
    }

    fn execute_typed(&self, params: CaptureDomParams, context: &mut ToolContext) -> Result<ToolResult> {
        let converter = params.style_converter()?;
        let content: MainContent = capture::capture_main_content(context.session, converter.as_ref())?;

        Ok(ToolResult::success_with(serde_json::to_value(&content)?))
    }
}
