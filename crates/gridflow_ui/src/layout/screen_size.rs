//! Breakpoints and breakpoint resolution.

use std::fmt;

use serde::Deserialize;

use crate::error::{UiError, UiResult};

/// Ordered breakpoint classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreenSize {
    /// Extra small (phones).
    #[default]
    Xs,
    /// Small.
    Sm,
    /// Medium.
    Md,
    /// Large.
    Lg,
    /// Extra large.
    Xl,
}

impl ScreenSize {
    /// Every breakpoint in ascending order.
    pub const ALL: [Self; 5] = [Self::Xs, Self::Sm, Self::Md, Self::Lg, Self::Xl];

    /// Index into per-breakpoint arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Parses a breakpoint token (`xs`, `sm`, `md`, `lg`, `xl`).
    ///
    /// # Errors
    ///
    /// Returns [`UiError::UnknownScreenSize`] for any other token.
    pub fn from_token(token: &str) -> UiResult<Self> {
        match token {
            "xs" => Ok(Self::Xs),
            "sm" => Ok(Self::Sm),
            "md" => Ok(Self::Md),
            "lg" => Ok(Self::Lg),
            "xl" => Ok(Self::Xl),
            other => Err(UiError::UnknownScreenSize(other.to_string())),
        }
    }

    /// Token used in layout strings.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Xs => "xs",
            Self::Sm => "sm",
            Self::Md => "md",
            Self::Lg => "lg",
            Self::Xl => "xl",
        }
    }
}

impl fmt::Display for ScreenSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// How the container's render scale affects breakpoint thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenSizeScaleMode {
    /// Thresholds are used as-is.
    #[default]
    NoScaling,
    /// Thresholds are multiplied by the horizontal scale.
    Linear,
    /// Thresholds are divided by the horizontal scale.
    Inverse,
}

impl ScreenSizeScaleMode {
    /// Threshold multiplier for a horizontal render scale. A scale that is
    /// not finite and positive counts as 1.
    #[must_use]
    pub fn factor(self, scale_x: f32) -> f32 {
        let scale_x = if scale_x.is_finite() && scale_x > 0.0 { scale_x } else { 1.0 };
        match self {
            Self::NoScaling => 1.0,
            Self::Linear => scale_x,
            Self::Inverse => 1.0 / scale_x,
        }
    }
}

/// Minimum pixel width of each breakpoint.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Breakpoints {
    /// Minimum width for `xs`.
    pub xs: f32,
    /// Minimum width for `sm`.
    pub sm: f32,
    /// Minimum width for `md`.
    pub md: f32,
    /// Minimum width for `lg`.
    pub lg: f32,
    /// Minimum width for `xl`.
    pub xl: f32,
}

impl Breakpoints {
    /// Bootstrap-style thresholds.
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            xs: 0.0,
            sm: 576.0,
            md: 768.0,
            lg: 992.0,
            xl: 1200.0,
        }
    }

    /// Minimum width of `size` before scaling.
    #[must_use]
    pub const fn min_width(&self, size: ScreenSize) -> f32 {
        match size {
            ScreenSize::Xs => self.xs,
            ScreenSize::Sm => self.sm,
            ScreenSize::Md => self.md,
            ScreenSize::Lg => self.lg,
            ScreenSize::Xl => self.xl,
        }
    }

    /// Picks the largest breakpoint whose scaled minimum is `<= width`.
    #[must_use]
    pub fn resolve(&self, width: f32, scale: f32) -> ScreenSize {
        let mut result = ScreenSize::Xs;
        for size in ScreenSize::ALL {
            if width >= self.min_width(size) * scale {
                result = size;
            }
        }
        result
    }

    /// Checks that thresholds never decrease.
    ///
    /// # Errors
    ///
    /// Returns [`UiError::InvalidConfig`] when a threshold is smaller than the
    /// one before it.
    pub fn validate(&self) -> UiResult<()> {
        let mut previous = f32::NEG_INFINITY;
        for size in ScreenSize::ALL {
            let current = self.min_width(size);
            if current < previous || current.is_nan() {
                return Err(UiError::InvalidConfig(format!(
                    "breakpoint {size} threshold {current} is below the previous one"
                )));
            }
            previous = current;
        }
        Ok(())
    }
}

impl Default for Breakpoints {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_staircase() {
        let bp = Breakpoints::standard();
        assert_eq!(bp.resolve(0.0, 1.0), ScreenSize::Xs);
        assert_eq!(bp.resolve(575.0, 1.0), ScreenSize::Xs);
        assert_eq!(bp.resolve(576.0, 1.0), ScreenSize::Sm);
        assert_eq!(bp.resolve(800.0, 1.0), ScreenSize::Md);
        assert_eq!(bp.resolve(1000.0, 1.0), ScreenSize::Lg);
        assert_eq!(bp.resolve(4000.0, 1.0), ScreenSize::Xl);
    }

    #[test]
    fn test_resolve_is_monotonic() {
        let bp = Breakpoints::standard();
        let mut last = ScreenSize::Xs;
        for w in (0..2000).step_by(7) {
            #[allow(clippy::cast_precision_loss)]
            let size = bp.resolve(w as f32, 1.0);
            assert!(size >= last, "regressed at width {w}");
            last = size;
        }
    }

    #[test]
    fn test_scale_modes() {
        assert!((ScreenSizeScaleMode::NoScaling.factor(2.0) - 1.0).abs() < f32::EPSILON);
        assert!((ScreenSizeScaleMode::Linear.factor(2.0) - 2.0).abs() < f32::EPSILON);
        assert!((ScreenSizeScaleMode::Inverse.factor(2.0) - 0.5).abs() < f32::EPSILON);
        assert!((ScreenSizeScaleMode::Inverse.factor(0.0) - 1.0).abs() < f32::EPSILON);
        assert!((ScreenSizeScaleMode::Linear.factor(f32::NAN) - 1.0).abs() < f32::EPSILON);

        let bp = Breakpoints::standard();
        assert_eq!(bp.resolve(800.0, 2.0), ScreenSize::Xs);
        assert_eq!(bp.resolve(800.0, 0.5), ScreenSize::Xl);
    }

    #[test]
    fn test_validate_rejects_decreasing() {
        let mut bp = Breakpoints::standard();
        assert!(bp.validate().is_ok());
        bp.md = 100.0;
        assert!(bp.validate().is_err());
    }

    #[test]
    fn test_token_roundtrip() {
        for size in ScreenSize::ALL {
            assert_eq!(ScreenSize::from_token(size.token()), Ok(size));
        }
        assert!(ScreenSize::from_token("xxl").is_err());
    }
}
