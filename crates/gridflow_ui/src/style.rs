//! Styling: colours, style rules and themes.
//!
//! A [`Theme`] maps a style id plus the active breakpoint to a [`StyleRule`].
//! Render nodes resolve their rule once per layout pass and treat it as
//! read-only until the next one.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{UiError, UiResult};
use crate::layout::ScreenSize;
use crate::render::NodeState;

/// Style id every theme falls back to.
pub const DEFAULT_STYLE_ID: &str = "default";

/// RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub struct Color {
    /// Red component (0-1).
    pub r: f32,
    /// Green component (0-1).
    pub g: f32,
    /// Blue component (0-1).
    pub b: f32,
    /// Alpha component (0-1).
    pub a: f32,
}

impl Color {
    /// Transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);
    /// Solid black.
    pub const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 1.0);
    /// Solid white.
    pub const WHITE: Self = Self::rgba(1.0, 1.0, 1.0, 1.0);

    /// Creates a color from RGBA values (0-1).
    #[must_use]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a color from RGB values (0-1) with full alpha.
    #[must_use]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    /// Creates a color from a packed 0xRRGGBBAA value.
    #[must_use]
    pub const fn hex(hex: u32) -> Self {
        let r = ((hex >> 24) & 0xFF) as f32 / 255.0;
        let g = ((hex >> 16) & 0xFF) as f32 / 255.0;
        let b = ((hex >> 8) & 0xFF) as f32 / 255.0;
        let a = (hex & 0xFF) as f32 / 255.0;
        Self::rgba(r, g, b, a)
    }

    /// Parses `#RRGGBB` or `#RRGGBBAA`.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem for anything else.
    pub fn parse_hex(text: &str) -> Result<Self, String> {
        let digits = text.strip_prefix('#').unwrap_or(text);
        let packed = u32::from_str_radix(digits, 16)
            .map_err(|_| format!("'{text}' is not a hex colour"))?;
        match digits.len() {
            6 => Ok(Self::hex((packed << 8) | 0xFF)),
            8 => Ok(Self::hex(packed)),
            _ => Err(format!("'{text}' must be #RRGGBB or #RRGGBBAA")),
        }
    }

    /// Returns a new color with different alpha.
    #[must_use]
    pub const fn with_alpha(self, a: f32) -> Self {
        Self::rgba(self.r, self.g, self.b, a)
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_hex(&value)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Per-side insets.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Spacing {
    /// Top.
    pub top: f32,
    /// Right.
    pub right: f32,
    /// Bottom.
    pub bottom: f32,
    /// Left.
    pub left: f32,
}

impl Spacing {
    /// No spacing.
    pub const ZERO: Self = Self::uniform(0.0);

    /// Same value on every side.
    #[must_use]
    pub const fn uniform(value: f32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    /// Left plus right.
    #[must_use]
    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    /// Top plus bottom.
    #[must_use]
    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

/// Rounding applied to a computed content width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rounding {
    /// Keep fractional pixels.
    #[default]
    None,
    /// Round down.
    Floor,
    /// Round up.
    Ceil,
    /// Round half up.
    Round,
}

impl Rounding {
    /// Applies the rounding to `value`.
    #[must_use]
    pub fn apply(self, value: f32) -> f32 {
        match self {
            Self::None => value,
            Self::Floor => value.floor(),
            Self::Ceil => value.ceil(),
            Self::Round => (value + 0.5).floor(),
        }
    }
}

/// Resolved style for one element at one breakpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StyleRule {
    /// Space between the element's edge and its content.
    pub padding: Spacing,
    /// Space outside the element's edge.
    pub margin: Spacing,
    /// Minimum outer width (0 disables).
    pub min_width: f32,
    /// Minimum outer height (0 disables).
    pub min_height: f32,
    /// Rounding of the content width.
    pub rounding: Rounding,
    /// Background in the normal state.
    pub background: Option<Color>,
    /// Background while hovered.
    pub hover_background: Option<Color>,
    /// Background while actioned.
    pub action_background: Option<Color>,
    /// Text colour for text-bearing nodes.
    pub text_color: Option<Color>,
}

impl StyleRule {
    /// A rule with no padding, margin, minimums or colours.
    pub const EMPTY: Self = Self {
        padding: Spacing::ZERO,
        margin: Spacing::ZERO,
        min_width: 0.0,
        min_height: 0.0,
        rounding: Rounding::None,
        background: None,
        hover_background: None,
        action_background: None,
        text_color: None,
    };

    /// Padding plus margin, left and right.
    #[must_use]
    pub fn horizontal_insets(&self) -> f32 {
        self.padding.horizontal() + self.margin.horizontal()
    }

    /// Padding plus margin, top and bottom.
    #[must_use]
    pub fn vertical_insets(&self) -> f32 {
        self.padding.vertical() + self.margin.vertical()
    }

    /// Background for a node state. Action falls back to hover.
    #[must_use]
    pub fn background_for(&self, state: NodeState) -> Option<Color> {
        match state {
            NodeState::Normal => self.background,
            NodeState::Hover => self.hover_background.or(self.background),
            NodeState::Action => self
                .action_background
                .or(self.hover_background)
                .or(self.background),
        }
    }
}

impl Default for StyleRule {
    fn default() -> Self {
        Self::EMPTY
    }
}

static EMPTY_RULE: StyleRule = StyleRule::EMPTY;

/// Supplies style rules to the layout pass.
pub trait Theme: Send + Sync {
    /// Unique id; a change of id forces every container to relayout.
    fn id(&self) -> &str;

    /// Rule for `style_id` at `size`.
    fn style_rule(&self, style_id: &str, size: ScreenSize) -> &StyleRule;
}

/// Table-driven theme, usually loaded from TOML.
///
/// ```toml
/// id = "dark"
///
/// [[styles]]
/// style_id = "default"
/// screen_size = "xs"
/// padding = { top = 4.0, right = 4.0, bottom = 4.0, left = 4.0 }
/// background = "#202020"
/// ```
#[derive(Debug, Clone, Default)]
pub struct UiTheme {
    id: String,
    styles: HashMap<String, [Option<StyleRule>; 5]>,
}

#[derive(Deserialize)]
struct ThemeFile {
    id: String,
    #[serde(default)]
    styles: Vec<StyleEntry>,
}

#[derive(Deserialize)]
struct StyleEntry {
    style_id: String,
    #[serde(default)]
    screen_size: ScreenSize,
    #[serde(flatten)]
    rule: StyleRule,
}

impl UiTheme {
    /// Creates an empty theme; every lookup yields [`StyleRule::EMPTY`].
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            styles: HashMap::new(),
        }
    }

    /// Parses a theme from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`UiError::InvalidConfig`] if the document is malformed.
    pub fn from_toml_str(text: &str) -> UiResult<Self> {
        let file: ThemeFile =
            toml::from_str(text).map_err(|e| UiError::InvalidConfig(e.to_string()))?;
        if file.id.is_empty() {
            return Err(UiError::InvalidConfig("theme id must not be empty".to_string()));
        }
        let mut theme = Self::new(file.id);
        for entry in file.styles {
            theme.insert(entry.style_id, entry.screen_size, entry.rule);
        }
        Ok(theme)
    }

    /// Sets the rule for `style_id` from `size` upwards.
    pub fn insert(&mut self, style_id: impl Into<String>, size: ScreenSize, rule: StyleRule) {
        self.styles.entry(style_id.into()).or_default()[size.index()] = Some(rule);
    }

    /// Builder form of [`UiTheme::insert`].
    #[must_use]
    pub fn with_style(mut self, style_id: impl Into<String>, size: ScreenSize, rule: StyleRule) -> Self {
        self.insert(style_id, size, rule);
        self
    }

    fn lookup(&self, style_id: &str, size: ScreenSize) -> Option<&StyleRule> {
        let rules = self.styles.get(style_id)?;
        rules[..=size.index()].iter().rev().find_map(Option::as_ref)
    }
}

impl Theme for UiTheme {
    fn id(&self) -> &str {
        &self.id
    }

    fn style_rule(&self, style_id: &str, size: ScreenSize) -> &StyleRule {
        self.lookup(style_id, size)
            .or_else(|| self.lookup(DEFAULT_STYLE_ID, size))
            .unwrap_or(&EMPTY_RULE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(Color::parse_hex("#ffffff"), Ok(Color::WHITE));
        assert_eq!(Color::parse_hex("00000000"), Ok(Color::TRANSPARENT));
        assert!(Color::parse_hex("#fff").is_err());
        assert!(Color::parse_hex("#zzzzzz").is_err());
    }

    #[test]
    fn test_rounding() {
        assert_eq!(Rounding::None.apply(10.4), 10.4);
        assert_eq!(Rounding::Floor.apply(10.6), 10.0);
        assert_eq!(Rounding::Ceil.apply(10.1), 11.0);
        assert_eq!(Rounding::Round.apply(10.5), 11.0);
        assert_eq!(Rounding::Round.apply(10.49), 10.0);
    }

    #[test]
    fn test_background_fallbacks() {
        let rule = StyleRule {
            background: Some(Color::BLACK),
            ..StyleRule::EMPTY
        };
        assert_eq!(rule.background_for(NodeState::Action), Some(Color::BLACK));
        let rule = StyleRule {
            hover_background: Some(Color::WHITE),
            ..rule
        };
        assert_eq!(rule.background_for(NodeState::Action), Some(Color::WHITE));
        assert_eq!(rule.background_for(NodeState::Normal), Some(Color::BLACK));
    }

    #[test]
    fn test_theme_ascending_fill_and_fallback() {
        let small = StyleRule {
            padding: Spacing::uniform(2.0),
            ..StyleRule::EMPTY
        };
        let large = StyleRule {
            padding: Spacing::uniform(8.0),
            ..StyleRule::EMPTY
        };
        let theme = UiTheme::new("t")
            .with_style("panel", ScreenSize::Xs, small.clone())
            .with_style("panel", ScreenSize::Lg, large.clone())
            .with_style(DEFAULT_STYLE_ID, ScreenSize::Xs, StyleRule::EMPTY);

        assert_eq!(theme.style_rule("panel", ScreenSize::Md), &small);
        assert_eq!(theme.style_rule("panel", ScreenSize::Xl), &large);
        assert_eq!(theme.style_rule("missing", ScreenSize::Xl), &StyleRule::EMPTY);
    }

    #[test]
    fn test_theme_from_toml() {
        let theme = UiTheme::from_toml_str(
            r##"
            id = "dark"

            [[styles]]
            style_id = "default"
            padding = { top = 4.0, right = 4.0, bottom = 4.0, left = 4.0 }
            background = "#202020"

            [[styles]]
            style_id = "default"
            screen_size = "md"
            min_height = 20.0
            rounding = "floor"
            "##,
        )
        .unwrap();
        assert_eq!(theme.id(), "dark");
        let xs = theme.style_rule("button", ScreenSize::Xs);
        assert_eq!(xs.padding, Spacing::uniform(4.0));
        assert_eq!(xs.background, Some(Color::hex(0x2020_20FF)));
        let md = theme.style_rule("button", ScreenSize::Md);
        assert_eq!(md.padding, Spacing::ZERO);
        assert_eq!(md.rounding, Rounding::Floor);
        assert_eq!(md.min_height, 20.0);
    }

    #[test]
    fn test_theme_from_toml_rejects_bad_colour() {
        let err = UiTheme::from_toml_str(
            r#"
            id = "bad"
            [[styles]]
            style_id = "default"
            background = "red"
            "#,
        );
        assert!(matches!(err, Err(UiError::InvalidConfig(_))));
    }
}
