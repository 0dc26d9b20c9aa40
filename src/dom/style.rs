use serde::{Deserialize, Serialize};

/// The subset of an element's computed style that decides whether it renders.
///
/// Values are kept as the strings the renderer reports (`getComputedStyle`),
/// so `opacity` is compared textually.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ComputedStyle {
    #[serde(default = "default_display")]
    pub display: String,

    #[serde(default = "default_visibility")]
    pub visibility: String,

    #[serde(default = "default_opacity")]
    pub opacity: String,
}

fn default_display() -> String {
    "block".to_string()
}

fn default_visibility() -> String {
    "visible".to_string()
}

fn default_opacity() -> String {
    "1".to_string()
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self { display: default_display(), visibility: default_visibility(), opacity: default_opacity() }
    }
}

impl ComputedStyle {
    /// Builder method: set display
    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = display.into();
        self
    }

    /// Builder method: set visibility
    pub fn with_visibility(mut self, visibility: impl Into<String>) -> Self {
        self.visibility = visibility.into();
        self
    }

    /// Builder method: set opacity
    pub fn with_opacity(mut self, opacity: impl Into<String>) -> Self {
        self.opacity = opacity.into();
        self
    }

    /// Style of an element with no renderer behind it: inline `style`
    /// declarations win, and the `hidden` attribute implies `display: none`.
    pub fn from_inline(style_attr: Option<&str>, hidden: bool) -> Self {
        let mut style = Self::default();
        if hidden {
            style.display = "none".to_string();
        }

        let Some(declarations) = style_attr else {
            return style;
        };

        for declaration in declarations.split(';') {
            let Some((property, value)) = declaration.split_once(':') else {
                continue;
            };
            let value = value.trim().trim_end_matches("!important").trim().to_ascii_lowercase();
            match property.trim().to_ascii_lowercase().as_str() {
                "display" => style.display = value,
                "visibility" => style.visibility = value,
                "opacity" => style.opacity = value,
                _ => {}
            }
        }

        style
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_rendered() {
        let style = ComputedStyle::default();
        assert_eq!(style.display, "block");
        assert_eq!(style.visibility, "visible");
        assert_eq!(style.opacity, "1");
    }

    #[test]
    fn test_from_inline_declarations() {
        let style = ComputedStyle::from_inline(Some("color: red; DISPLAY: None ;opacity:0"), false);
        assert_eq!(style.display, "none");
        assert_eq!(style.opacity, "0");
        assert_eq!(style.visibility, "visible");
    }

    #[test]
    fn test_from_inline_important_and_garbage() {
        let style = ComputedStyle::from_inline(Some("visibility: hidden !important; nonsense; :"), false);
        assert_eq!(style.visibility, "hidden");
        assert_eq!(style.display, "block");
    }

    #[test]
    fn test_hidden_attribute() {
        let style = ComputedStyle::from_inline(None, true);
        assert_eq!(style.display, "none");

        let overridden = ComputedStyle::from_inline(Some("display: flex"), true);
        assert_eq!(overridden.display, "flex");
    }

    #[test]
    fn test_missing_fields_deserialize_to_defaults() {
        let style: ComputedStyle = serde_json::from_str(r#"{"display": "inline"}"#).unwrap();
        assert_eq!(style.display, "inline");
        assert_eq!(style.opacity, "1");
    }
}
