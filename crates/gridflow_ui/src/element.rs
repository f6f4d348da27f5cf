//! Client-facing element descriptions.
//!
//! An [`Element`] is handed to [`UiTree::add_child`](crate::render::UiTree::add_child),
//! which parses its layout once and creates the matching render node.

use crate::layout::DEFAULT_LAYOUT;
use crate::listener::ActionListener;
use crate::navigation::{Navigatable, UiNavigation, VerticalUiNavigation};
use crate::render::{Actionable, Label, NodeKind, TextInput, Visibility};
use crate::style::DEFAULT_STYLE_ID;

/// Default line height for text-bearing elements.
pub const DEFAULT_LINE_HEIGHT: f32 = 16.0;

/// Element to be attached to a tree.
#[derive(Debug)]
pub struct Element {
    pub(crate) id: String,
    pub(crate) kind: NodeKind,
    pub(crate) layout: String,
    pub(crate) style_id: String,
    pub(crate) z_index: i32,
    pub(crate) visibility: Option<Visibility>,
    pub(crate) clip_overflow: bool,
}

impl Element {
    fn new(id: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            kind,
            layout: DEFAULT_LAYOUT.to_string(),
            style_id: DEFAULT_STYLE_ID.to_string(),
            z_index: 0,
            visibility: None,
            clip_overflow: false,
        }
    }

    /// A plain parent element.
    #[must_use]
    pub fn div(id: impl Into<String>) -> Self {
        Self::new(id, NodeKind::Div)
    }

    /// A parent element with a vertical navigation list.
    #[must_use]
    pub fn container(id: impl Into<String>) -> Self {
        Self::container_with(id, Box::new(VerticalUiNavigation::new()))
    }

    /// A parent element with a custom navigation implementation.
    #[must_use]
    pub fn container_with(id: impl Into<String>, navigation: Box<dyn UiNavigation>) -> Self {
        Self::new(id, NodeKind::Container(Navigatable::new(navigation)))
    }

    /// An actionable parent element.
    #[must_use]
    pub fn button(id: impl Into<String>) -> Self {
        Self::new(id, NodeKind::Button(Actionable::new()))
    }

    /// A static text leaf.
    #[must_use]
    pub fn label(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(
            id,
            NodeKind::Label(Label {
                text: text.into(),
                line_height: DEFAULT_LINE_HEIGHT,
            }),
        )
    }

    /// An editable single-line text leaf.
    #[must_use]
    pub fn text_box(id: impl Into<String>) -> Self {
        Self::new(
            id,
            NodeKind::TextBox(TextInput {
                line_height: DEFAULT_LINE_HEIGHT,
                ..TextInput::default()
            }),
        )
    }

    /// Element id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Sets the layout string. It is parsed when the element is attached.
    #[must_use]
    pub fn layout(mut self, layout: impl Into<String>) -> Self {
        self.layout = layout.into();
        self
    }

    /// Sets the style id.
    #[must_use]
    pub fn style(mut self, style_id: impl Into<String>) -> Self {
        self.style_id = style_id.into();
        self
    }

    /// Sets the z-index within the parent.
    #[must_use]
    pub const fn z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Sets the visibility; unset elements take the runtime default.
    #[must_use]
    pub const fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    /// Clips children to this element's box when drawn.
    #[must_use]
    pub const fn clip_overflow(mut self, clip: bool) -> Self {
        self.clip_overflow = clip;
        self
    }

    /// Line height of a label or text box. Ignored by other kinds.
    #[must_use]
    pub fn line_height(mut self, line_height: f32) -> Self {
        match &mut self.kind {
            NodeKind::Label(l) => l.line_height = line_height,
            NodeKind::TextBox(t) => t.line_height = line_height,
            _ => {}
        }
        self
    }

    /// Maximum character count of a text box. Ignored by other kinds.
    #[must_use]
    pub fn max_length(mut self, max_length: usize) -> Self {
        if let NodeKind::TextBox(t) = &mut self.kind {
            t.max_length = Some(max_length);
            let value = t.value.clone();
            t.set_value(&value);
        }
        self
    }

    /// Initial value of a text box. Ignored by other kinds.
    #[must_use]
    pub fn value(mut self, value: &str) -> Self {
        if let NodeKind::TextBox(t) = &mut self.kind {
            t.set_value(value);
        }
        self
    }

    /// Enables or disables an actionable element.
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        if let Some(actionable) = self.kind.actionable_mut() {
            actionable.enabled = enabled;
        }
        self
    }

    /// Adds an action listener to an actionable element.
    #[must_use]
    pub fn on_action(mut self, listener: Box<dyn ActionListener>) -> Self {
        if let Some(actionable) = self.kind.actionable_mut() {
            actionable.listeners.push(listener);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let element = Element::div("panel");
        assert_eq!(element.id(), "panel");
        assert_eq!(element.layout, DEFAULT_LAYOUT);
        assert_eq!(element.style_id, DEFAULT_STYLE_ID);
        assert_eq!(element.visibility, None);
    }

    #[test]
    fn test_text_box_options() {
        let element = Element::text_box("name").value("abcdef").max_length(3).line_height(20.0);
        let NodeKind::TextBox(input) = &element.kind else {
            panic!("expected a text box");
        };
        assert_eq!(input.value(), "abc");
        assert_eq!(input.cursor(), 3);
        assert_eq!(input.line_height, 20.0);
    }

    #[test]
    fn test_enabled_only_applies_to_actionables() {
        let button = Element::button("ok").enabled(false);
        assert!(!button.kind.actionable().is_some_and(Actionable::is_enabled));
        let div = Element::div("d").enabled(false);
        assert!(div.kind.actionable().is_none());
    }
}
