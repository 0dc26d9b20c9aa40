use crate::error::Result;
use crate::tools::utils::normalize_url;
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Parameters for the navigate tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NavigateParams {
    /// URL to navigate to
    pub url: String,

    /// Wait for navigation to complete (default: true)
    #[serde(default = "default_wait")]
    pub wait_for_load: bool,

    /// Seconds to let client-side rendering finish after load
    #[serde(default)]
    pub settle_secs: f64,
}

fn default_wait() -> bool {
    true
}

/// Tool for loading a page
#[derive(Default)]
pub struct NavigateTool;

impl Tool for NavigateTool {
    type Params = NavigateParams;

    fn name(&self) -> &str {
        "navigate"
    }

    fn execute_typed(&self, params: NavigateParams, context: &mut ToolContext) -> Result<ToolResult> {
        let normalized_url = normalize_url(&params.url);

        context.session.navigate(&normalized_url)?;

        if params.wait_for_load {
            context.session.wait_for_navigation()?;
        }

        if params.settle_secs.is_finite() && params.settle_secs > 0.0 {
            context.session.settle(Duration::from_secs_f64(params.settle_secs));
        }

        context.invalidate_dom();

        Ok(ToolResult::success_with(serde_json::json!({
            "original_url": params.url,
            "normalized_url": normalized_url,
            "waited": params.wait_for_load
        })))
    }
}
