use crate::error::Result;
use crate::removal::{self, RemovalOptions};
use crate::tools::{Tool, ToolContext, ToolResult};

/// Tool for stripping clutter from the loaded page
#[derive(Default)]
pub struct RemoveElementsTool;

impl Tool for RemoveElementsTool {
    type Params = RemovalOptions;

    fn name(&self) -> &str {
        "remove_elements"
    }

    fn execute_typed(&self, params: RemovalOptions, context: &mut ToolContext) -> Result<ToolResult> {
        let removed = removal::remove_unwanted_elements(context.session, &params)?;

        if removed > 0 {
            context.invalidate_dom();
        }

        Ok(ToolResult::success_with(serde_json::json!({
            "removed": removed,
            "selectors": params.selectors()
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_elements_tool_metadata() {
        let tool = RemoveElementsTool;
        assert_eq!(tool.name(), "remove_elements");

        let schema = tool.parameters_schema();
        assert!(schema["properties"]["remove_framer"].is_object());
        assert!(schema["properties"]["custom_selectors"].is_object());
    }

    #[test]
    fn test_params_accept_empty_object() {
        let params: RemovalOptions = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(params, RemovalOptions::default());
    }
}
