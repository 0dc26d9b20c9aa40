//! Copy extracted text to a page's clipboard
//!
//! Delivery tries the host's clipboard API first. When that is missing or
//! refuses the write, it falls back to a scratch editable element: fill it,
//! select it, run the copy command. The scratch element is removed on every
//! path by [`ScratchGuard`].

use crate::error::{CaptureError, Result};
use headless_chrome::Tab;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Identifies a scratch element created for the fallback copy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScratchHandle(pub String);

/// The clipboard operations a host page must offer
pub trait ClipboardHost {
    /// Primary mechanism. Fails with [`CaptureError::ClipboardUnavailable`]
    /// when the host has no clipboard API.
    fn write_text(&self, text: &str) -> Result<()>;

    /// Create an offscreen editable element holding `text`
    fn create_scratch(&self, text: &str) -> Result<ScratchHandle>;

    fn select_scratch(&self, handle: &ScratchHandle) -> Result<()>;

    /// Run the platform copy command; `false` when the host declined
    fn exec_copy(&self) -> Result<bool>;

    fn remove_scratch(&self, handle: &ScratchHandle) -> Result<()>;
}

/// How a delivery ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Primary,
    Fallback,
    Failed { reason: String },
}

impl Delivery {
    pub fn is_delivered(&self) -> bool {
        !matches!(self, Delivery::Failed { .. })
    }
}

/// Removes its scratch element when dropped
pub struct ScratchGuard<'h, H: ClipboardHost + ?Sized> {
    host: &'h H,
    handle: ScratchHandle,
}

impl<'h, H: ClipboardHost + ?Sized> ScratchGuard<'h, H> {
    pub fn create(host: &'h H, text: &str) -> Result<Self> {
        let handle = host.create_scratch(text)?;
        Ok(Self { host, handle })
    }

    pub fn handle(&self) -> &ScratchHandle {
        &self.handle
    }
}

impl<H: ClipboardHost + ?Sized> Drop for ScratchGuard<'_, H> {
    fn drop(&mut self) {
        if let Err(e) = self.host.remove_scratch(&self.handle) {
            log::warn!("Failed to remove clipboard scratch element {}: {}", self.handle.0, e);
        }
    }
}

/// Copy `text` through `host`. Failures are logged and reported in the
/// returned value; they never abort the caller.
pub fn deliver<H: ClipboardHost + ?Sized>(host: &H, text: &str) -> Delivery {
    match host.write_text(text) {
        Ok(()) => {
            log::info!("Copied {} characters to clipboard", text.chars().count());
            return Delivery::Primary;
        }
        Err(e) => log::debug!("Primary clipboard write unavailable, using fallback: {}", e),
    }

    match fallback_copy(host, text) {
        Ok(()) => {
            log::info!("Copied {} characters to clipboard (fallback)", text.chars().count());
            Delivery::Fallback
        }
        Err(e) => {
            log::error!("Clipboard delivery failed: {}", e);
            Delivery::Failed { reason: e.to_string() }
        }
    }
}

fn fallback_copy<H: ClipboardHost + ?Sized>(host: &H, text: &str) -> Result<()> {
    let scratch = ScratchGuard::create(host, text)?;
    host.select_scratch(scratch.handle())?;
    if host.exec_copy()? {
        Ok(())
    } else {
        Err(CaptureError::ClipboardFailed("copy command was rejected".to_string()))
    }
}

static SCRATCH_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Clipboard of a live browser tab
pub struct TabClipboard {
    tab: Arc<Tab>,
}

impl TabClipboard {
    pub fn new(tab: Arc<Tab>) -> Self {
        Self { tab }
    }

    fn eval(&self, js: &str, await_promise: bool) -> Result<Option<serde_json::Value>> {
        let result = self.tab.evaluate(js, await_promise).map_err(|e| CaptureError::EvaluationFailed(e.to_string()))?;
        Ok(result.value)
    }
}

impl ClipboardHost for TabClipboard {
    fn write_text(&self, text: &str) -> Result<()> {
        let available = self
            .eval("!!(navigator.clipboard && navigator.clipboard.writeText)", false)?
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        if !available {
            return Err(CaptureError::ClipboardUnavailable("navigator.clipboard is missing".to_string()));
        }

        let literal = serde_json::to_string(text)?;
        self.tab
            .evaluate(&format!("navigator.clipboard.writeText({})", literal), true)
            .map_err(|e| CaptureError::ClipboardFailed(e.to_string()))?;
        Ok(())
    }

    fn create_scratch(&self, text: &str) -> Result<ScratchHandle> {
        let id = format!("__site_capture_clip_{}", SCRATCH_COUNTER.fetch_add(1, Ordering::Relaxed));
        let js = format!(
            r#"(function() {{
                const area = document.createElement("textarea");
                area.id = {id};
                area.value = {text};
                area.setAttribute("readonly", "");
                area.style.position = "fixed";
                area.style.left = "-9999px";
                area.style.top = "-9999px";
                document.body.appendChild(area);
                return true;
            }})()"#,
            id = serde_json::to_string(&id)?,
            text = serde_json::to_string(text)?,
        );
        self.eval(&js, false)?;
        Ok(ScratchHandle(id))
    }

    fn select_scratch(&self, handle: &ScratchHandle) -> Result<()> {
        let js = format!(
            "(function() {{ const el = document.getElementById({}); if (!el) return false; el.focus(); el.select(); return true; }})()",
            serde_json::to_string(&handle.0)?
        );
        let selected = self.eval(&js, false)?.and_then(|v| v.as_bool()).unwrap_or(false);
        if selected {
            Ok(())
        } else {
            Err(CaptureError::ClipboardFailed(format!("scratch element {} not found", handle.0)))
        }
    }

    fn exec_copy(&self) -> Result<bool> {
        let copied = self
            .eval("(function() { try { return document.execCommand('copy'); } catch (e) { return false; } })()", false)?
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        Ok(copied)
    }

    fn remove_scratch(&self, handle: &ScratchHandle) -> Result<()> {
        let js = format!(
            "(function() {{ const el = document.getElementById({}); if (el) el.remove(); return true; }})()",
            serde_json::to_string(&handle.0)?
        );
        self.eval(&js, false)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// In-memory host recording the scratch elements alive in its "page"
    #[derive(Default)]
    struct FakeHost {
        primary_available: bool,
        copy_succeeds: bool,
        copy_errors: bool,
        live: RefCell<Vec<String>>,
        created: RefCell<usize>,
        clipboard: RefCell<Option<String>>,
    }

    impl FakeHost {
        fn new(primary_available: bool, copy_succeeds: bool) -> Self {
            Self { primary_available, copy_succeeds, ..Default::default() }
        }
    }

    impl ClipboardHost for FakeHost {
        fn write_text(&self, text: &str) -> Result<()> {
            if !self.primary_available {
                return Err(CaptureError::ClipboardUnavailable("no api".to_string()));
            }
            *self.clipboard.borrow_mut() = Some(text.to_string());
            Ok(())
        }

        fn create_scratch(&self, _text: &str) -> Result<ScratchHandle> {
            let mut created = self.created.borrow_mut();
            *created += 1;
            let id = format!("scratch-{}", created);
            self.live.borrow_mut().push(id.clone());
            Ok(ScratchHandle(id))
        }

        fn select_scratch(&self, handle: &ScratchHandle) -> Result<()> {
            assert!(self.live.borrow().contains(&handle.0));
            Ok(())
        }

        fn exec_copy(&self) -> Result<bool> {
            if self.copy_errors {
                return Err(CaptureError::ClipboardFailed("execCommand threw".to_string()));
            }
            Ok(self.copy_succeeds)
        }

        fn remove_scratch(&self, handle: &ScratchHandle) -> Result<()> {
            self.live.borrow_mut().retain(|id| id != &handle.0);
            Ok(())
        }
    }

    #[test]
    fn test_all_permutations_leave_no_scratch_element() {
        for primary in [true, false] {
            for fallback_ok in [true, false] {
                let host = FakeHost::new(primary, fallback_ok);
                let outcome = deliver(&host, "hello");

                assert!(
                    host.live.borrow().is_empty(),
                    "scratch left behind (primary={primary}, fallback={fallback_ok})"
                );

                match (primary, fallback_ok) {
                    (true, _) => {
                        assert_eq!(outcome, Delivery::Primary);
                        assert_eq!(*host.created.borrow(), 0);
                        assert_eq!(host.clipboard.borrow().as_deref(), Some("hello"));
                    }
                    (false, true) => {
                        assert_eq!(outcome, Delivery::Fallback);
                        assert_eq!(*host.created.borrow(), 1);
                    }
                    (false, false) => {
                        assert!(matches!(outcome, Delivery::Failed { .. }));
                        assert_eq!(*host.created.borrow(), 1);
                    }
                }
            }
        }
    }

    #[test]
    fn test_copy_command_error_still_cleans_up() {
        let host = FakeHost { copy_errors: true, ..FakeHost::new(false, true) };

        let outcome = deliver(&host, "text");
        assert!(!outcome.is_delivered());
        assert!(host.live.borrow().is_empty());
        match outcome {
            Delivery::Failed { reason } => assert!(reason.contains("execCommand threw")),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_guard_removes_on_drop() {
        let host = FakeHost::new(false, true);
        {
            let guard = ScratchGuard::create(&host, "x").unwrap();
            assert_eq!(host.live.borrow().as_slice(), [guard.handle().0.clone()]);
        }
        assert!(host.live.borrow().is_empty());
    }
}
