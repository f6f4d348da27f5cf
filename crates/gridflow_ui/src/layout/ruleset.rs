//! The layout ruleset DSL: `<kind>:<rules>`.
//!
//! A ruleset is parsed once, when an element is attached or its layout is
//! reassigned, and is immutable afterwards. Changing a layout replaces the
//! ruleset wholesale.

use std::fmt;

use crate::error::{UiError, UiResult};
use crate::layout::flex::{FlexDirection, FlexLayoutRuleset};
use crate::layout::pixel::PixelLayoutRuleset;
use crate::layout::rules::{LayoutState, OffsetRule, SizeRule};
use crate::layout::ScreenSize;

/// Layout used when an element does not specify one.
pub const DEFAULT_LAYOUT: &str = "flex-column:xs-12c,xs-auto";

/// Geometry of one child handed to [`LayoutRuleset::arrange`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChildBox {
    /// Resolved horizontal offset.
    pub x_offset: f32,
    /// Resolved vertical offset.
    pub y_offset: f32,
    /// Outer width (content, padding and margin).
    pub width: f32,
    /// Outer height (content, padding and margin).
    pub height: f32,
    /// False when the child takes no space in the flow.
    pub included: bool,
    /// Output: x relative to the parent.
    pub x: f32,
    /// Output: y relative to the parent.
    pub y: f32,
}

impl ChildBox {
    /// Creates an unplaced child box.
    #[must_use]
    pub const fn new(x_offset: f32, y_offset: f32, width: f32, height: f32, included: bool) -> Self {
        Self {
            x_offset,
            y_offset,
            width,
            height,
            included,
            x: 0.0,
            y: 0.0,
        }
    }
}

/// A parsed layout string.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutRuleset {
    /// `pixel:x,y,width,height`
    Pixel(PixelLayoutRuleset),
    /// `flex-*:<horizontal>[,<vertical>]`
    Flex(FlexLayoutRuleset),
}

impl LayoutRuleset {
    /// Parses a layout string. Kinds and tokens are case-insensitive.
    ///
    /// # Errors
    ///
    /// Returns [`UiError::InvalidLayout`] (or a more specific token error)
    /// for any malformed input.
    pub fn parse(layout: &str) -> UiResult<Self> {
        let normalized = layout.trim().to_ascii_lowercase();
        let Some((kind, value)) = normalized.split_once(':') else {
            return Err(UiError::layout(layout, "expected <kind>:<rules>"));
        };
        match kind.trim() {
            "p" | "pix" | "pixel" => PixelLayoutRuleset::parse(value).map(Self::Pixel),
            other => {
                let direction = FlexDirection::from_alias(other).ok_or_else(|| {
                    UiError::layout(layout, format!("unknown layout kind '{other}'"))
                })?;
                FlexLayoutRuleset::parse(direction, value).map(Self::Flex)
            }
        }
    }

    /// The ruleset for [`DEFAULT_LAYOUT`].
    #[must_use]
    pub fn default_flex() -> Self {
        Self::Flex(FlexLayoutRuleset::default_column())
    }

    /// True for flex rulesets.
    #[must_use]
    pub const fn is_flex(&self) -> bool {
        matches!(self, Self::Flex(_))
    }

    /// Width and height rules at `size`.
    #[must_use]
    pub const fn size_rules(&self, size: ScreenSize) -> (SizeRule, SizeRule) {
        match self {
            Self::Pixel(p) => (SizeRule::Absolute(p.width), SizeRule::Absolute(p.height)),
            Self::Flex(f) => (f.width_rule(size), f.height_rule(size)),
        }
    }

    /// X and y offset rules at `size`.
    #[must_use]
    pub const fn offset_rules(&self, size: ScreenSize) -> (OffsetRule, OffsetRule) {
        match self {
            Self::Pixel(p) => (OffsetRule::Absolute(p.x), OffsetRule::Absolute(p.y)),
            Self::Flex(f) => (f.x_offset_rule(size), f.y_offset_rule(size)),
        }
    }

    /// True when the height at `size` is computed from content.
    #[must_use]
    pub const fn is_auto_height(&self, size: ScreenSize) -> bool {
        self.size_rules(size).1.is_auto_size()
    }

    /// Outer width the rules ask for in this pass.
    #[must_use]
    pub fn preferred_element_width(&self, state: &LayoutState<'_>) -> f32 {
        match self {
            Self::Pixel(p) => p.width,
            Self::Flex(f) => f.preferred_element_width(state),
        }
    }

    /// Outer height the rules ask for in this pass (zero when auto).
    #[must_use]
    pub fn preferred_element_height(&self, state: &LayoutState<'_>) -> f32 {
        match self {
            Self::Pixel(p) => p.height,
            Self::Flex(f) => f.preferred_element_height(state),
        }
    }

    /// Horizontal offset in this pass.
    #[must_use]
    pub fn preferred_element_relative_x(&self, state: &LayoutState<'_>) -> f32 {
        match self {
            Self::Pixel(p) => p.x,
            Self::Flex(f) => f.preferred_element_relative_x(state),
        }
    }

    /// Vertical offset in this pass.
    #[must_use]
    pub fn preferred_element_relative_y(&self, state: &LayoutState<'_>) -> f32 {
        match self {
            Self::Pixel(p) => p.y,
            Self::Flex(f) => f.preferred_element_relative_y(state),
        }
    }

    /// Whether the active input source hides the element.
    #[must_use]
    pub fn is_hidden_by_input_source(&self, state: &LayoutState<'_>) -> bool {
        match self {
            Self::Pixel(_) => false,
            Self::Flex(f) => f.is_hidden_by_input_source(state),
        }
    }

    /// Copy with every offset replaced by absolute pixels.
    #[must_use]
    pub fn with_position(&self, x: f32, y: f32) -> Self {
        match self {
            Self::Pixel(p) => Self::Pixel(PixelLayoutRuleset::new(x, y, p.width, p.height)),
            Self::Flex(f) => Self::Flex(f.with_position(x, y)),
        }
    }

    /// Copy with every size replaced by absolute pixels.
    #[must_use]
    pub fn with_size(&self, width: f32, height: f32) -> Self {
        match self {
            Self::Pixel(p) => Self::Pixel(PixelLayoutRuleset::new(
                p.x,
                p.y,
                width.max(0.0),
                height.max(0.0),
            )),
            Self::Flex(f) => Self::Flex(f.with_size(width, height)),
        }
    }

    /// Positions one z-layer of children within a parent using these rules.
    ///
    /// `origin` is the parent's padding origin relative to its own outer box.
    pub fn arrange(&self, origin: (f32, f32), content_width: f32, children: &mut [ChildBox]) {
        match self {
            Self::Pixel(_) => PixelLayoutRuleset::arrange(origin, children),
            Self::Flex(f) => f.arrange(origin, content_width, children),
        }
    }
}

impl Default for LayoutRuleset {
    fn default() -> Self {
        Self::default_flex()
    }
}

impl fmt::Display for LayoutRuleset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pixel(p) => fmt::Display::fmt(p, f),
            Self::Flex(flex) => fmt::Display::fmt(flex, f),
        }
    }
}
