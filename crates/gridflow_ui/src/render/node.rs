//! Render nodes: the cached-geometry counterpart of every UI element.
//!
//! Node behaviour is selected by [`NodeKind`], a closed set of variants
//! carrying kind-specific payloads. Per-kind layout, hit testing and
//! rendering are looked up in a static [`Capabilities`] table rather than
//! dispatched through a class hierarchy.

use std::fmt;

use serde::Deserialize;

use crate::geometry::Rect;
use crate::layout::{LayoutRuleset, LayoutState};
use crate::listener::ActionListener;
use crate::navigation::Navigatable;
use crate::render::deferred::PendingDeferred;
use crate::render::graphics::Graphics;
use crate::render::{interaction, passes};
use crate::render::UiTree;
use crate::style::StyleRule;

/// Unique node identifier within one tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// Creates a node ID from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Interaction state of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NodeState {
    /// Idle.
    #[default]
    Normal,
    /// Pointer over it, or selected by the navigation cursor.
    Hover,
    /// Being pressed / activated.
    Action,
}

/// Element visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Laid out and drawn.
    #[default]
    Visible,
    /// Excluded from layout, hit testing and rendering.
    Hidden,
    /// Laid out and hit-testable but not drawn.
    NoRender,
}

/// Payload of nodes that fire begin/end action events.
pub struct Actionable {
    pub(crate) enabled: bool,
    pub(crate) listeners: Vec<Box<dyn ActionListener>>,
}

impl Actionable {
    /// Creates an enabled actionable with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self {
            enabled: true,
            listeners: Vec::new(),
        }
    }

    /// Whether the node accepts actions.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Number of registered action listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Default for Actionable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Actionable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Actionable")
            .field("enabled", &self.enabled)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Payload of a static text node.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub(crate) text: String,
    pub(crate) line_height: f32,
}

impl Label {
    /// Text shown by the label.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Height of one line of text.
    #[must_use]
    pub const fn line_height(&self) -> f32 {
        self.line_height
    }
}

/// Payload of an editable single-line text node.
#[derive(Debug, Default)]
pub struct TextInput {
    pub(crate) actionable: Actionable,
    pub(crate) value: String,
    /// Cursor position in characters.
    pub(crate) cursor: usize,
    pub(crate) max_length: Option<usize>,
    pub(crate) line_height: f32,
}

impl TextInput {
    /// Current text.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Cursor position in characters.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Maximum number of characters, if limited.
    #[must_use]
    pub const fn max_length(&self) -> Option<usize> {
        self.max_length
    }

    /// Inserts `ch` at the cursor. Returns false when the value is full.
    pub(crate) fn insert(&mut self, ch: char) -> bool {
        if self
            .max_length
            .is_some_and(|max| self.value.chars().count() >= max)
        {
            return false;
        }
        let at = self.byte_offset(self.cursor);
        self.value.insert(at, ch);
        self.cursor += 1;
        true
    }

    /// Deletes the character before the cursor.
    pub(crate) fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let at = self.byte_offset(self.cursor - 1);
        self.value.remove(at);
        self.cursor -= 1;
        true
    }

    /// Moves the cursor by `delta` characters, clamped to the value.
    pub(crate) fn move_cursor(&mut self, delta: isize) {
        let len = self.value.chars().count();
        self.cursor = self.cursor.saturating_add_signed(delta).min(len);
    }

    pub(crate) fn set_value(&mut self, value: &str) {
        self.value = match self.max_length {
            Some(max) => value.chars().take(max).collect(),
            None => value.to_string(),
        };
        self.cursor = self.value.chars().count();
    }

    fn byte_offset(&self, chars: usize) -> usize {
        self.value
            .char_indices()
            .nth(chars)
            .map_or(self.value.len(), |(i, _)| i)
    }
}

/// Tagged node kind.
#[derive(Debug)]
pub enum NodeKind {
    /// The container root; sized by the container.
    Root,
    /// Plain parent element.
    Div,
    /// Parent element with a navigation list and hotkeys.
    Container(Navigatable),
    /// Actionable parent element.
    Button(Actionable),
    /// Static text leaf.
    Label(Label),
    /// Editable text leaf.
    TextBox(TextInput),
}

pub(crate) type LayoutFn = fn(&mut UiTree, NodeId, &mut LayoutState<'_>);
pub(crate) type RenderFn = fn(&UiTree, NodeId, &mut dyn Graphics);
pub(crate) type HitTestFn = fn(&mut UiTree, NodeId, f32, f32) -> Option<NodeId>;

/// Static per-kind behaviour table.
pub struct Capabilities {
    /// Kind name for diagnostics.
    pub name: &'static str,
    /// Owns z-layers of children.
    pub is_parent: bool,
    /// Fires begin/end action events and can be focused.
    pub is_actionable: bool,
    /// Owns a navigation list and hotkeys.
    pub is_navigatable: bool,
    /// Accepts typed characters while focused.
    pub is_text_input: bool,
    pub(crate) layout: LayoutFn,
    pub(crate) hit_test: HitTestFn,
    pub(crate) render: RenderFn,
}

static ROOT: Capabilities = Capabilities {
    name: "root",
    is_parent: true,
    is_actionable: false,
    is_navigatable: false,
    is_text_input: false,
    layout: passes::layout_root,
    hit_test: interaction::hit_parent,
    render: passes::render_parent,
};

static DIV: Capabilities = Capabilities {
    name: "div",
    is_parent: true,
    is_actionable: false,
    is_navigatable: false,
    is_text_input: false,
    layout: passes::layout_parent,
    hit_test: interaction::hit_parent,
    render: passes::render_parent,
};

static CONTAINER: Capabilities = Capabilities {
    name: "container",
    is_parent: true,
    is_actionable: false,
    is_navigatable: true,
    is_text_input: false,
    layout: passes::layout_parent,
    hit_test: interaction::hit_parent,
    render: passes::render_parent,
};

static BUTTON: Capabilities = Capabilities {
    name: "button",
    is_parent: true,
    is_actionable: true,
    is_navigatable: false,
    is_text_input: false,
    layout: passes::layout_parent,
    hit_test: interaction::hit_parent,
    render: passes::render_parent,
};

static LABEL: Capabilities = Capabilities {
    name: "label",
    is_parent: false,
    is_actionable: false,
    is_navigatable: false,
    is_text_input: false,
    layout: passes::layout_leaf,
    hit_test: interaction::hit_leaf,
    render: passes::render_text,
};

static TEXT_BOX: Capabilities = Capabilities {
    name: "text box",
    is_parent: false,
    is_actionable: true,
    is_navigatable: false,
    is_text_input: true,
    layout: passes::layout_leaf,
    hit_test: interaction::hit_leaf,
    render: passes::render_text,
};

impl NodeKind {
    /// Behaviour table for this kind.
    #[must_use]
    pub fn capabilities(&self) -> &'static Capabilities {
        match self {
            Self::Root => &ROOT,
            Self::Div => &DIV,
            Self::Container(_) => &CONTAINER,
            Self::Button(_) => &BUTTON,
            Self::Label(_) => &LABEL,
            Self::TextBox(_) => &TEXT_BOX,
        }
    }

    /// Actionable payload, if any.
    #[must_use]
    pub fn actionable(&self) -> Option<&Actionable> {
        match self {
            Self::Button(a) => Some(a),
            Self::TextBox(t) => Some(&t.actionable),
            _ => None,
        }
    }

    pub(crate) fn actionable_mut(&mut self) -> Option<&mut Actionable> {
        match self {
            Self::Button(a) => Some(a),
            Self::TextBox(t) => Some(&mut t.actionable),
            _ => None,
        }
    }

    /// Navigation payload, if any.
    #[must_use]
    pub fn navigatable(&self) -> Option<&Navigatable> {
        match self {
            Self::Container(n) => Some(n),
            _ => None,
        }
    }

    pub(crate) fn navigatable_mut(&mut self) -> Option<&mut Navigatable> {
        match self {
            Self::Container(n) => Some(n),
            _ => None,
        }
    }

    /// Text input payload, if any.
    #[must_use]
    pub fn text_input(&self) -> Option<&TextInput> {
        match self {
            Self::TextBox(t) => Some(t),
            _ => None,
        }
    }

    pub(crate) fn text_input_mut(&mut self) -> Option<&mut TextInput> {
        match self {
            Self::TextBox(t) => Some(t),
            _ => None,
        }
    }

    /// Text drawn by text-bearing kinds.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Label(l) => Some(&l.text),
            Self::TextBox(t) => Some(&t.value),
            _ => None,
        }
    }

    /// Content height used when a leaf's height rule is auto.
    #[must_use]
    pub fn intrinsic_height(&self) -> f32 {
        match self {
            Self::Label(l) => {
                #[allow(clippy::cast_precision_loss)]
                let lines = l.text.lines().count().max(1) as f32;
                lines * l.line_height
            }
            Self::TextBox(t) => t.line_height,
            _ => 0.0,
        }
    }
}

/// Layout geometry cached on a node.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct NodeGeometry {
    pub x_offset: f32,
    pub y_offset: f32,
    /// Position relative to the parent's outer box, margin included.
    pub rel_x: f32,
    pub rel_y: f32,
    pub content_width: f32,
    pub content_height: f32,
    /// Absolute box inside the margin.
    pub outer_area: Rect,
    /// `outer_area` minus padding.
    pub inner_area: Rect,
    pub previous_area: Rect,
    pub render_area: Rect,
}

/// One node of a [`UiTree`].
#[derive(Debug)]
pub struct RenderNode {
    pub(crate) id: NodeId,
    pub(crate) element_id: String,
    pub(crate) style_id: String,
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) layers: crate::render::LayerMap,
    pub(crate) layout: String,
    pub(crate) ruleset: LayoutRuleset,
    pub(crate) z_index: i32,
    /// Key of the parent layer currently holding this node.
    pub(crate) layer_z: i32,
    pub(crate) visibility: Visibility,
    pub(crate) clip_overflow: bool,
    pub(crate) state: NodeState,
    pub(crate) style: StyleRule,
    pub(crate) geometry: NodeGeometry,
    pub(crate) dirty: bool,
    pub(crate) child_dirty: bool,
    pub(crate) hidden_by_layout_rule: bool,
    pub(crate) hidden_by_input_source: bool,
    pub(crate) initial_layout: bool,
    pub(crate) initial_update: bool,
    pub(crate) pending: PendingDeferred,
}

impl RenderNode {
    /// Node ID.
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// Element ID (unique within the tree).
    #[must_use]
    pub fn element_id(&self) -> &str {
        &self.element_id
    }

    /// Style ID used for theme lookups.
    #[must_use]
    pub fn style_id(&self) -> &str {
        &self.style_id
    }

    /// Node kind and payload.
    #[must_use]
    pub const fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Behaviour table for this node's kind.
    #[must_use]
    pub fn capabilities(&self) -> &'static Capabilities {
        self.kind.capabilities()
    }

    /// Parent node, `None` for the root.
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Serialized layout string.
    #[must_use]
    pub fn layout(&self) -> &str {
        &self.layout
    }

    /// Parsed layout.
    #[must_use]
    pub const fn ruleset(&self) -> &LayoutRuleset {
        &self.ruleset
    }

    /// Requested z-index.
    #[must_use]
    pub const fn z_index(&self) -> i32 {
        self.z_index
    }

    /// Visibility.
    #[must_use]
    pub const fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Interaction state.
    #[must_use]
    pub const fn state(&self) -> NodeState {
        self.state
    }

    /// Style resolved in the last layout pass.
    #[must_use]
    pub const fn style(&self) -> &StyleRule {
        &self.style
    }

    /// Whether children are clipped to this node's box when drawn.
    #[must_use]
    pub const fn clips_overflow(&self) -> bool {
        self.clip_overflow
    }

    /// X relative to the parent's outer box (parent padding included).
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.geometry.rel_x
    }

    /// Y relative to the parent's outer box (parent padding included).
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.geometry.rel_y
    }

    /// Outer width including padding and margin.
    ///
    /// Negative until the first layout has happened.
    #[must_use]
    pub fn width(&self) -> f32 {
        if !self.initial_layout {
            return -1.0;
        }
        if self.is_collapsed() {
            return 0.0;
        }
        self.geometry.content_width + self.style.horizontal_insets()
    }

    /// Outer height including padding and margin.
    ///
    /// Negative until the first layout has happened.
    #[must_use]
    pub fn height(&self) -> f32 {
        if !self.initial_layout {
            return -1.0;
        }
        if self.is_collapsed() {
            return 0.0;
        }
        self.geometry.content_height + self.style.vertical_insets()
    }

    /// Width available to children.
    #[must_use]
    pub const fn content_width(&self) -> f32 {
        self.geometry.content_width
    }

    /// Height available to children.
    #[must_use]
    pub const fn content_height(&self) -> f32 {
        self.geometry.content_height
    }

    /// Absolute box (inside margin) computed by the last update.
    #[must_use]
    pub const fn outer_area(&self) -> Rect {
        self.geometry.outer_area
    }

    /// Absolute content box computed by the last update.
    #[must_use]
    pub const fn inner_area(&self) -> Rect {
        self.geometry.inner_area
    }

    /// Interpolated box used for drawing.
    #[must_use]
    pub const fn render_area(&self) -> Rect {
        self.geometry.render_area
    }

    /// True if this node or any descendant needs layout.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty || self.child_dirty
    }

    /// True if any descendant needs layout.
    #[must_use]
    pub const fn has_dirty_child(&self) -> bool {
        self.child_dirty
    }

    /// True once a layout pass has computed this node.
    #[must_use]
    pub const fn initial_layout_occurred(&self) -> bool {
        self.initial_layout
    }

    /// True once an update pass has visited this node after layout.
    #[must_use]
    pub const fn initial_update_occurred(&self) -> bool {
        self.initial_update
    }

    /// True when the width rule resolved to zero or less.
    #[must_use]
    pub const fn is_hidden_by_layout_rule(&self) -> bool {
        self.hidden_by_layout_rule
    }

    /// True when a `hidden-*` rule matches the active input source.
    #[must_use]
    pub const fn is_hidden_by_input_source(&self) -> bool {
        self.hidden_by_input_source
    }

    /// True when the node takes space in its parent's flow.
    #[must_use]
    pub const fn is_included_in_layout(&self) -> bool {
        !matches!(self.visibility, Visibility::Hidden) && !self.is_collapsed()
    }

    const fn is_collapsed(&self) -> bool {
        self.hidden_by_layout_rule || self.hidden_by_input_source
    }

    /// True when the node can be hovered or clicked.
    pub(crate) const fn is_interactive(&self) -> bool {
        self.initial_update && self.is_included_in_layout()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_input(value: &str) -> TextInput {
        let mut input = TextInput {
            actionable: Actionable::new(),
            line_height: 16.0,
            ..TextInput::default()
        };
        input.set_value(value);
        input
    }

    #[test]
    fn test_text_input_editing() {
        let mut input = text_input("héllo");
        assert_eq!(input.cursor(), 5);
        input.move_cursor(-4);
        assert!(input.insert('X'));
        assert_eq!(input.value(), "hXéllo");
        assert!(input.backspace());
        assert!(input.backspace());
        assert_eq!(input.value(), "éllo");
        assert!(!input.backspace());
        input.move_cursor(100);
        assert_eq!(input.cursor(), 4);
    }

    #[test]
    fn test_text_input_max_length() {
        let mut input = text_input("");
        input.max_length = Some(2);
        assert!(input.insert('a'));
        assert!(input.insert('b'));
        assert!(!input.insert('c'));
        input.set_value("wxyz");
        assert_eq!(input.value(), "wx");
    }

    #[test]
    fn test_capability_table() {
        assert!(NodeKind::Div.capabilities().is_parent);
        assert!(!NodeKind::Div.capabilities().is_actionable);
        assert!(NodeKind::Button(Actionable::new()).capabilities().is_actionable);
        let label = NodeKind::Label(Label {
            text: "a\nb".to_string(),
            line_height: 10.0,
        });
        assert!(!label.capabilities().is_parent);
        assert_eq!(label.intrinsic_height(), 20.0);
        assert!(NodeKind::TextBox(text_input("")).capabilities().is_text_input);
    }
}
