//! Container configuration.
//!
//! Loaded once at startup, usually from TOML:
//!
//! ```toml
//! platform = "desktop"
//! navigation_mode = "button_or_pointer"
//! screen_size_scale_mode = "linear"
//! action_keys = ["Enter", "Space"]
//! controller_action_button = "South"
//!
//! [breakpoints]
//! sm = 600.0
//! ```

use serde::Deserialize;

use crate::error::{UiError, UiResult};
use crate::input::{ControllerButton, Key, NavigationMode, Platform};
use crate::layout::{Breakpoints, LayoutRuleset, ScreenSizeScaleMode, DEFAULT_LAYOUT};

/// Configuration of one [`UiContainer`](crate::UiContainer).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Host platform class; decides navigation permissions and the pointer input source.
    pub platform: Platform,
    /// Which navigation styles are accepted.
    pub navigation_mode: NavigationMode,
    /// How the render scale affects breakpoint thresholds.
    pub screen_size_scale_mode: ScreenSizeScaleMode,
    /// Breakpoint thresholds.
    pub breakpoints: Breakpoints,
    /// Keys that begin/end the active action.
    pub action_keys: Vec<Key>,
    /// Controller button that begins/ends the active action.
    pub controller_action_button: ControllerButton,
    /// Log every triggered layout.
    pub debug_layout: bool,
    /// Layout the container applies to its direct children.
    pub layout: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            platform: Platform::Desktop,
            navigation_mode: NavigationMode::ButtonOrPointer,
            screen_size_scale_mode: ScreenSizeScaleMode::NoScaling,
            breakpoints: Breakpoints::standard(),
            action_keys: vec![Key::Enter],
            controller_action_button: ControllerButton::South,
            debug_layout: false,
            layout: DEFAULT_LAYOUT.to_string(),
        }
    }
}

impl UiConfig {
    /// Desktop release build: keyboard, controller and pointer all accepted.
    #[must_use]
    pub fn production() -> Self {
        Self {
            action_keys: vec![Key::Enter, Key::Space],
            ..Self::default()
        }
    }

    /// Phones and tablets: pointer only, thresholds follow the render scale.
    #[must_use]
    pub fn touch_device() -> Self {
        Self {
            platform: Platform::Touch,
            navigation_mode: NavigationMode::PointerOnly,
            screen_size_scale_mode: ScreenSizeScaleMode::Linear,
            ..Self::default()
        }
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`UiError::InvalidConfig`] for malformed TOML or bad
    /// breakpoints, and the layout parse error for a bad `layout`.
    pub fn from_toml_str(text: &str) -> UiResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| UiError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks breakpoints and parses the container layout.
    ///
    /// # Errors
    ///
    /// See [`UiConfig::from_toml_str`].
    pub fn validate(&self) -> UiResult<()> {
        self.breakpoints.validate()?;
        LayoutRuleset::parse(&self.layout)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = UiConfig::default();
        assert_eq!(config.action_keys, vec![Key::Enter]);
        assert_eq!(config.breakpoints, Breakpoints::standard());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml() {
        let config = UiConfig::from_toml_str(
            r#"
            platform = "touch"
            navigation_mode = "pointer_only"
            screen_size_scale_mode = "inverse"
            action_keys = ["Enter", "Space"]
            controller_action_button = "East"
            layout = "flex-row:xs-12c"

            [breakpoints]
            sm = 600.0
            "#,
        )
        .unwrap();
        assert_eq!(config.platform, Platform::Touch);
        assert_eq!(config.navigation_mode, NavigationMode::PointerOnly);
        assert_eq!(config.screen_size_scale_mode, ScreenSizeScaleMode::Inverse);
        assert_eq!(config.controller_action_button, ControllerButton::East);
        assert_eq!(config.breakpoints.sm, 600.0);
        assert_eq!(config.breakpoints.md, 768.0);
    }

    #[test]
    fn test_rejects_bad_layout() {
        let err = UiConfig::from_toml_str(r#"layout = "flex-row:xs-13c""#).unwrap_err();
        assert!(matches!(err, UiError::InvalidLayout { .. }));
    }

    #[test]
    fn test_rejects_decreasing_breakpoints() {
        let err = UiConfig::from_toml_str("[breakpoints]\nmd = 100.0\n").unwrap_err();
        assert!(matches!(err, UiError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        assert!(matches!(
            UiConfig::from_toml_str("platform = ").unwrap_err(),
            UiError::InvalidConfig(_)
        ));
    }

    #[test]
    fn test_presets() {
        assert_eq!(UiConfig::touch_device().platform, Platform::Touch);
        assert!(UiConfig::production().action_keys.contains(&Key::Space));
    }
}
