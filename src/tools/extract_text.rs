use crate::clipboard;
use crate::error::Result;
use crate::extract::{ExtractionOptions, TextExtractor};
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the extract_text tool
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ExtractTextParams {
    #[serde(flatten)]
    pub options: ExtractionOptions,

    /// Also copy the text to the page clipboard
    #[serde(default)]
    pub copy: bool,
}

/// Tool for extracting the visible text of the loaded page
#[derive(Default)]
pub struct ExtractTextTool;

impl Tool for ExtractTextTool {
    type Params = ExtractTextParams;

    fn name(&self) -> &str {
        "extract_text"
    }

    fn execute_typed(&self, params: ExtractTextParams, context: &mut ToolContext) -> Result<ToolResult> {
        let text = {
            let dom = context.get_dom()?;
            TextExtractor::new(params.options).extract_page_text(dom)
        };

        let copied = if params.copy {
            let host = context.session.clipboard()?;
            Some(clipboard::deliver(&host, &text).is_delivered())
        } else {
            None
        };

        Ok(ToolResult::success_with(serde_json::json!({
            "length": text.chars().count(),
            "text": text,
            "copied": copied
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text_params_flatten_options() {
        let params: ExtractTextParams =
            serde_json::from_value(serde_json::json!({ "includeHidden": true, "copy": true })).unwrap();
        assert!(params.options.include_hidden);
        assert!(params.copy);
        assert_eq!(params.options.inline_tag, "span");
    }

    #[test]
    fn test_extract_text_params_default() {
        let params: ExtractTextParams = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(!params.copy);
        assert_eq!(params.options, ExtractionOptions::default());
    }

    #[test]
    fn test_extract_text_tool_metadata() {
        let tool = ExtractTextTool;
        assert_eq!(tool.name(), "extract_text");
        assert!(tool.parameters_schema().is_object());
    }
}
