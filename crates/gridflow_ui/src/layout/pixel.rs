//! Pixel layout rulesets: `pixel:x,y,width,height`, identical at every breakpoint.

use std::fmt;

use crate::error::{UiError, UiResult};
use crate::layout::ruleset::ChildBox;

/// A parsed `pixel:` layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelLayoutRuleset {
    /// Offset from the parent's padding box, x.
    pub x: f32,
    /// Offset from the parent's padding box, y.
    pub y: f32,
    /// Outer width.
    pub width: f32,
    /// Outer height.
    pub height: f32,
}

impl PixelLayoutRuleset {
    /// Creates a pixel ruleset directly.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Parses the part after `pixel:`.
    pub(crate) fn parse(value: &str) -> UiResult<Self> {
        let parts: Vec<&str> = value.split(',').map(str::trim).collect();
        let [x, y, width, height] = parts.as_slice() else {
            return Err(UiError::layout(value, "must be pixel:x,y,width,height"));
        };
        let number = |part: &str| match part.parse::<f32>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(UiError::layout(value, format!("'{part}' is not a pixel amount"))),
        };
        let ruleset = Self::new(number(*x)?, number(*y)?, number(*width)?, number(*height)?);
        if ruleset.width < 0.0 || ruleset.height < 0.0 {
            return Err(UiError::layout(value, "sizes cannot be negative"));
        }
        Ok(ruleset)
    }

    /// Children sit at the parent's padding origin plus their own offset.
    pub(crate) fn arrange(origin: (f32, f32), children: &mut [ChildBox]) {
        for child in children {
            child.x = origin.0 + child.x_offset;
            child.y = origin.1 + child.y_offset;
        }
    }
}

impl fmt::Display for PixelLayoutRuleset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pixel:{},{},{},{}", self.x, self.y, self.width, self.height)
    }
}
