//! Size and offset rule primitives, and the state threaded through a layout pass.

use std::fmt;

use crate::input::{ControllerType, InputSource};
use crate::layout::ScreenSize;
use crate::style::Theme;

/// Number of columns in the responsive grid.
pub const GRID_COLUMNS: u8 = 12;

/// How a node's width or height is determined at one breakpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizeRule {
    /// Fixed pixel size.
    Absolute(f32),
    /// Fraction of the parent's content width, in grid columns.
    Responsive(u8),
    /// Computed from content after children are laid out (height only).
    Auto,
}

impl SizeRule {
    /// Resolves the rule against the parent's content width.
    ///
    /// `Auto` resolves to zero here; auto sizing is handled by the node.
    #[must_use]
    pub fn preferred_size(&self, parent_width: f32, total_columns: u8) -> f32 {
        match *self {
            Self::Absolute(px) => px,
            Self::Responsive(columns) => columns_to_px(columns, parent_width, total_columns),
            Self::Auto => 0.0,
        }
    }

    /// True for [`SizeRule::Auto`].
    #[must_use]
    pub const fn is_auto_size(&self) -> bool {
        matches!(self, Self::Auto)
    }
}

impl fmt::Display for SizeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absolute(px) => write!(f, "{px}px"),
            Self::Responsive(columns) => write!(f, "{columns}c"),
            Self::Auto => f.write_str("auto"),
        }
    }
}

/// How a node is offset from its flow position at one breakpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OffsetRule {
    /// Fixed pixel offset.
    Absolute(f32),
    /// Offset in grid columns of the parent's content width.
    Responsive(u8),
}

impl OffsetRule {
    /// No offset.
    pub const ZERO: Self = Self::Absolute(0.0);

    /// Resolves the offset against the parent's content width.
    #[must_use]
    pub fn offset(&self, parent_width: f32, total_columns: u8) -> f32 {
        match *self {
            Self::Absolute(px) => px,
            Self::Responsive(columns) => columns_to_px(columns, parent_width, total_columns),
        }
    }
}

impl fmt::Display for OffsetRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absolute(px) => write!(f, "{px}px"),
            Self::Responsive(columns) => write!(f, "{columns}c"),
        }
    }
}

fn columns_to_px(columns: u8, parent_width: f32, total_columns: u8) -> f32 {
    if total_columns == 0 {
        return 0.0;
    }
    parent_width * f32::from(columns) / f32::from(total_columns)
}

/// State threaded through one top-down layout pass.
pub struct LayoutState<'a> {
    /// Theme supplying style rules.
    pub theme: &'a dyn Theme,
    /// Active breakpoint.
    pub screen_size: ScreenSize,
    /// Grid column count.
    pub total_columns: u8,
    /// Content width of the parent currently being laid out.
    pub parent_width: f32,
    /// True when the breakpoint (or input source) changed since the last pass.
    pub screen_size_changed: bool,
    /// Input source active for this pass.
    pub input_source: InputSource,
    /// Controller type active for this pass.
    pub controller_type: ControllerType,
}

impl<'a> LayoutState<'a> {
    /// Creates a layout state for a pass over a root of `width` pixels.
    #[must_use]
    pub fn new(theme: &'a dyn Theme, screen_size: ScreenSize, width: f32) -> Self {
        Self {
            theme,
            screen_size,
            total_columns: GRID_COLUMNS,
            parent_width: width,
            screen_size_changed: false,
            input_source: InputSource::default(),
            controller_type: ControllerType::default(),
        }
    }

    /// Marks the pass as following a breakpoint change.
    #[must_use]
    pub fn with_screen_size_changed(mut self, changed: bool) -> Self {
        self.screen_size_changed = changed;
        self
    }

    /// Sets the active input source and controller type.
    #[must_use]
    pub fn with_input(mut self, source: InputSource, controller: ControllerType) -> Self {
        self.input_source = source;
        self.controller_type = controller;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_responsive_size() {
        let rule = SizeRule::Responsive(6);
        assert!((rule.preferred_size(400.0, GRID_COLUMNS) - 200.0).abs() < f32::EPSILON);
        assert!((SizeRule::Responsive(0).preferred_size(400.0, GRID_COLUMNS)).abs() < f32::EPSILON);
    }

    #[test]
    fn test_auto_resolves_to_zero() {
        assert!(SizeRule::Auto.is_auto_size());
        assert!(SizeRule::Auto.preferred_size(400.0, GRID_COLUMNS).abs() < f32::EPSILON);
    }

    #[test]
    fn test_offsets() {
        assert!((OffsetRule::Responsive(3).offset(120.0, GRID_COLUMNS) - 30.0).abs() < f32::EPSILON);
        assert!((OffsetRule::Absolute(7.0).offset(120.0, GRID_COLUMNS) - 7.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_display() {
        assert_eq!(SizeRule::Absolute(30.0).to_string(), "30px");
        assert_eq!(SizeRule::Absolute(12.5).to_string(), "12.5px");
        assert_eq!(SizeRule::Responsive(4).to_string(), "4c");
        assert_eq!(SizeRule::Auto.to_string(), "auto");
        assert_eq!(OffsetRule::Responsive(2).to_string(), "2c");
    }
}
