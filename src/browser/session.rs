use crate::{browser::config::{ConnectionOptions, LaunchOptions},
            clipboard::TabClipboard,
            dom::{self, DomTree},
            error::{CaptureError, Result},
            tools::{ToolContext, ToolRegistry, ToolResult}};
use headless_chrome::{Browser, Tab};
use std::{ffi::OsStr, sync::Arc, time::Duration};

/// Browser session that manages a Chrome/Chromium instance
pub struct BrowserSession {
    /// The underlying headless_chrome Browser instance
    browser: Browser,

    /// Applied to every tab before navigating
    navigation_timeout: Duration,

    /// Tool registry for executing capture tools
    tool_registry: ToolRegistry,
}

impl BrowserSession {
    /// Launch a new browser instance with the given options
    pub fn launch(options: LaunchOptions) -> Result<Self> {
        let mut launch_opts = headless_chrome::LaunchOptions::default();

        // Keep sites from detecting automation and serving a stripped page
        launch_opts.ignore_default_args.push(OsStr::new("--enable-automation"));
        launch_opts.args.push(OsStr::new("--disable-blink-features=AutomationControlled"));
        launch_opts.args.push(OsStr::new("--disable-dev-shm-usage"));

        // Batches of slow pages outlive the 30 second default
        launch_opts.idle_browser_timeout = Duration::from_secs(60 * 60);

        launch_opts.headless = options.headless;
        launch_opts.window_size = Some((options.window_width, options.window_height));
        launch_opts.sandbox = options.sandbox;
        launch_opts.path = options.chrome_path.clone();
        launch_opts.user_data_dir = options.user_data_dir.clone();
        launch_opts.proxy_server = options.proxy_server.as_deref();

        log::debug!(
            "Launching browser (headless: {}, window: {}x{})",
            options.headless,
            options.window_width,
            options.window_height
        );

        let browser = Browser::new(launch_opts).map_err(|e| CaptureError::LaunchFailed(e.to_string()))?;

        browser.new_tab().map_err(|e| CaptureError::LaunchFailed(format!("Failed to create tab: {}", e)))?;

        Ok(Self {
            browser,
            navigation_timeout: options.navigation_timeout,
            tool_registry: ToolRegistry::with_defaults(),
        })
    }

    /// Connect to an existing browser instance via WebSocket
    pub fn connect(options: ConnectionOptions) -> Result<Self> {
        let browser = Browser::connect(options.ws_url).map_err(|e| CaptureError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            browser,
            navigation_timeout: LaunchOptions::default().navigation_timeout,
            tool_registry: ToolRegistry::with_defaults(),
        })
    }

    /// Get the active tab
    pub fn tab(&self) -> Result<Arc<Tab>> {
        self.get_active_tab()
    }

    /// Get all tabs
    pub fn get_tabs(&self) -> Result<Vec<Arc<Tab>>> {
        let tabs = self
            .browser
            .get_tabs()
            .lock()
            .map_err(|e| CaptureError::TabOperationFailed(format!("Failed to get tabs: {}", e)))?
            .clone();

        Ok(tabs)
    }

    /// The visible tab, or the first tab when none reports visibility
    pub fn get_active_tab(&self) -> Result<Arc<Tab>> {
        let tabs = self.get_tabs()?;

        for tab in &tabs {
            match tab.evaluate("document.visibilityState === 'visible'", false) {
                Ok(remote_object) => {
                    if remote_object.value.and_then(|v| v.as_bool()).unwrap_or(false) {
                        return Ok(tab.clone());
                    }
                }
                Err(e) => {
                    log::debug!("Failed to check tab status: {}", e);
                    continue;
                }
            }
        }

        tabs.into_iter().next().ok_or_else(|| CaptureError::TabOperationFailed("No active tab found".to_string()))
    }

    /// Navigate to a URL using the active tab
    pub fn navigate(&self, url: &str) -> Result<()> {
        let tab = self.tab()?;
        tab.set_default_timeout(self.navigation_timeout);
        tab.navigate_to(url)
            .map_err(|e| CaptureError::NavigationFailed(format!("Failed to navigate to {}: {}", url, e)))?;

        Ok(())
    }

    /// Wait for navigation to complete
    pub fn wait_for_navigation(&self) -> Result<()> {
        self.tab()?
            .wait_until_navigated()
            .map_err(|e| CaptureError::NavigationFailed(format!("Navigation timeout: {}", e)))?;

        Ok(())
    }

    /// Give client-side rendering and animations time to finish
    pub fn settle(&self, delay: Duration) {
        if !delay.is_zero() {
            log::debug!("Waiting {:.1}s for the page to render", delay.as_secs_f64());
            std::thread::sleep(delay);
        }
    }

    /// Evaluate a script in the active tab and return its value
    pub fn evaluate(&self, js: &str) -> Result<Option<serde_json::Value>> {
        let result = self.tab()?.evaluate(js, false).map_err(|e| CaptureError::EvaluationFailed(e.to_string()))?;
        Ok(result.value)
    }

    /// Snapshot the rendered DOM of the active tab
    pub fn snapshot_dom(&self) -> Result<DomTree> {
        dom::snapshot_dom(&self.tab()?)
    }

    /// Clipboard of the active tab
    pub fn clipboard(&self) -> Result<TabClipboard> {
        Ok(TabClipboard::new(self.tab()?))
    }

    /// Get the underlying Browser instance
    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    /// Get the tool registry
    pub fn tool_registry(&self) -> &ToolRegistry {
        &self.tool_registry
    }

    /// Get mutable tool registry
    pub fn tool_registry_mut(&mut self) -> &mut ToolRegistry {
        &mut self.tool_registry
    }

    /// Execute a tool by name
    pub fn execute_tool(&self, name: &str, params: serde_json::Value) -> Result<ToolResult> {
        let mut context = ToolContext::new(self);
        self.tool_registry.execute(name, params, &mut context)
    }

    /// Close every tab; the browser process exits when the session is dropped
    pub fn close(&self) -> Result<()> {
        for tab in self.get_tabs()? {
            let _ = tab.close(false);
        }
        Ok(())
    }
}
