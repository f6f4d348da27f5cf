//! Raster backend seam.
//!
//! The engine only issues primitive draw calls. [`CommandRecorder`] collects
//! them as [`RenderCommand`]s for a backend to batch and submit.

use crate::geometry::Rect;
use crate::style::Color;

/// Drawing surface consumed by the render pass.
pub trait Graphics {
    /// Fills `area` with `color`.
    fn fill_rect(&mut self, area: Rect, color: Color);

    /// Draws `text` with its top-left at (`x`, `y`).
    fn draw_text(&mut self, text: &str, x: f32, y: f32, color: Color);

    /// Current clip rectangle, if any.
    fn peek_clip(&self) -> Option<Rect>;

    /// Replaces the clip rectangle.
    fn set_clip(&mut self, clip: Option<Rect>);

    /// Current (x, y) scale.
    fn scale(&self) -> (f32, f32);

    /// Sets the (x, y) scale.
    fn set_scale(&mut self, x: f32, y: f32);

    /// Current (x, y) translation.
    fn translation(&self) -> (f32, f32);

    /// Sets the (x, y) translation.
    fn set_translation(&mut self, x: f32, y: f32);
}

/// A recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    /// Filled rectangle.
    Rect {
        /// Bounds.
        bounds: Rect,
        /// Fill color.
        color: Color,
    },
    /// Text.
    Text {
        /// Text content.
        text: String,
        /// X position.
        x: f32,
        /// Y position.
        y: f32,
        /// Text color.
        color: Color,
    },
    /// Clip change (`None` clears it).
    SetClip {
        /// Clip bounds.
        bounds: Option<Rect>,
    },
    /// Scale change.
    SetScale {
        /// Horizontal scale.
        x: f32,
        /// Vertical scale.
        y: f32,
    },
    /// Translation change.
    SetTranslation {
        /// Horizontal translation.
        x: f32,
        /// Vertical translation.
        y: f32,
    },
}

/// [`Graphics`] implementation that records every call.
#[derive(Debug, Clone)]
pub struct CommandRecorder {
    commands: Vec<RenderCommand>,
    clip: Option<Rect>,
    scale: (f32, f32),
    translation: (f32, f32),
}

impl CommandRecorder {
    /// Creates an empty recorder with unit scale.
    #[must_use]
    pub fn new() -> Self {
        Self {
            commands: Vec::with_capacity(256),
            clip: None,
            scale: (1.0, 1.0),
            translation: (0.0, 0.0),
        }
    }

    /// Commands recorded since the last [`CommandRecorder::clear`].
    #[must_use]
    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    /// Drops recorded commands; clip, scale and translation are kept.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Recorded text strings, in draw order.
    #[must_use]
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                RenderCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Default for CommandRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl Graphics for CommandRecorder {
    fn fill_rect(&mut self, area: Rect, color: Color) {
        let bounds = match self.clip {
            Some(clip) => match area.intersection(&clip) {
                Some(visible) => visible,
                None => return,
            },
            None => area,
        };
        self.commands.push(RenderCommand::Rect { bounds, color });
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, color: Color) {
        self.commands.push(RenderCommand::Text {
            text: text.to_string(),
            x,
            y,
            color,
        });
    }

    fn peek_clip(&self) -> Option<Rect> {
        self.clip
    }

    fn set_clip(&mut self, clip: Option<Rect>) {
        self.clip = clip;
        self.commands.push(RenderCommand::SetClip { bounds: clip });
    }

    fn scale(&self) -> (f32, f32) {
        self.scale
    }

    fn set_scale(&mut self, x: f32, y: f32) {
        self.scale = (x, y);
        self.commands.push(RenderCommand::SetScale { x, y });
    }

    fn translation(&self) -> (f32, f32) {
        self.translation
    }

    fn set_translation(&mut self, x: f32, y: f32) {
        self.translation = (x, y);
        self.commands.push(RenderCommand::SetTranslation { x, y });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_trims_rects() {
        let mut g = CommandRecorder::new();
        g.set_clip(Some(Rect::new(0.0, 0.0, 50.0, 50.0)));
        g.fill_rect(Rect::new(25.0, 25.0, 50.0, 50.0), Color::BLACK);
        g.fill_rect(Rect::new(60.0, 60.0, 10.0, 10.0), Color::BLACK);
        let rects: Vec<Rect> = g
            .commands()
            .iter()
            .filter_map(|c| match c {
                RenderCommand::Rect { bounds, .. } => Some(*bounds),
                _ => None,
            })
            .collect();
        assert_eq!(rects, vec![Rect::new(25.0, 25.0, 25.0, 25.0)]);
    }

    #[test]
    fn test_scale_and_translation_state() {
        let mut g = CommandRecorder::default();
        assert_eq!(g.scale(), (1.0, 1.0));
        g.set_scale(2.0, 3.0);
        g.set_translation(-4.0, 5.0);
        assert_eq!(g.scale(), (2.0, 3.0));
        assert_eq!(g.translation(), (-4.0, 5.0));
        g.clear();
        assert!(g.commands().is_empty());
        assert_eq!(g.scale(), (2.0, 3.0));
    }
}
