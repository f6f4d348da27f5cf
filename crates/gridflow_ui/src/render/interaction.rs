//! Pointer hit testing, hover tracking, actions and text editing on the tree.

use crate::input::InputSource;
use crate::listener::{ActionEvent, EventTrigger};
use crate::render::node::{Actionable, NodeState};
use crate::render::{NodeId, UiTree};

/// Hit test for parent kinds: an enabled actionable parent captures the
/// press itself, other parents ask their children from the top layer down.
pub(crate) fn hit_parent(tree: &mut UiTree, id: NodeId, x: f32, y: f32) -> Option<NodeId> {
    let node = tree.nodes.get(&id)?;
    if !node.is_interactive() {
        return None;
    }
    if node.kind.actionable().is_some_and(Actionable::is_enabled) {
        return node.geometry.outer_area.contains(x, y).then_some(id);
    }
    for child in node.layers.child_ids_descending() {
        if let Some(hit) = tree.hit_test_node(child, x, y) {
            return Some(hit);
        }
    }
    None
}

/// Hit test for leaves: only enabled actionables can be pressed.
pub(crate) fn hit_leaf(tree: &mut UiTree, id: NodeId, x: f32, y: f32) -> Option<NodeId> {
    let node = tree.nodes.get(&id)?;
    let pressable = node.is_interactive()
        && node.kind.actionable().is_some_and(Actionable::is_enabled)
        && node.geometry.outer_area.contains(x, y);
    pressable.then_some(id)
}

impl UiTree {
    /// Finds the topmost enabled actionable under the pointer and puts it in
    /// the action state.
    pub fn mouse_down(&mut self, x: f32, y: f32) -> Option<NodeId> {
        let root = self.root();
        let hit = self.hit_test_node(root, x, y)?;
        self.set_state(hit, NodeState::Action);
        Some(hit)
    }

    /// Releases a pressed node, leaving it hovered if the pointer is still over it.
    pub fn mouse_up(&mut self, id: NodeId, x: f32, y: f32) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        let state = if node.geometry.outer_area.contains(x, y) {
            NodeState::Hover
        } else {
            NodeState::Normal
        };
        self.set_state(id, state);
    }

    /// Updates hover states for a pointer move. Returns true when an
    /// actionable node is under the pointer.
    pub fn mouse_moved(&mut self, x: f32, y: f32) -> bool {
        let root = self.root();
        self.hover(root, x, y)
    }

    fn hover(&mut self, id: NodeId, x: f32, y: f32) -> bool {
        let Some(node) = self.nodes.get_mut(&id) else {
            return false;
        };
        if !node.is_interactive() {
            return false;
        }
        let is_parent = node.capabilities().is_parent;
        let actionable = node.kind.actionable().is_some();
        let area = if is_parent {
            node.geometry.inner_area
        } else {
            node.geometry.outer_area
        };

        if !area.contains(x, y) {
            self.clear_hover(id);
            return false;
        }
        if node.state != NodeState::Action {
            node.state = NodeState::Hover;
        }
        let mut result = actionable;
        for child in node.layers.child_ids_descending() {
            result |= self.hover(child, x, y);
        }
        result
    }

    /// Returns hovered nodes in the subtree to normal; pressed nodes keep
    /// their state.
    fn clear_hover(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(&current) {
                if node.state == NodeState::Hover {
                    node.state = NodeState::Normal;
                }
                stack.extend(node.layers.child_ids());
            }
        }
    }

    /// Puts an enabled actionable node in the action state and notifies its
    /// listeners. Returns the event fired, or `None` if the node is not an
    /// enabled actionable.
    pub fn begin_action(&mut self, id: NodeId, trigger: EventTrigger, input_source: InputSource) -> Option<ActionEvent> {
        self.fire_action(id, trigger, input_source, NodeState::Action, true)
    }

    /// Moves an actionable node out of the action state into `state` and
    /// notifies its listeners.
    pub fn end_action(
        &mut self,
        id: NodeId,
        trigger: EventTrigger,
        input_source: InputSource,
        state: NodeState,
    ) -> Option<ActionEvent> {
        self.fire_action(id, trigger, input_source, state, false)
    }

    fn fire_action(
        &mut self,
        id: NodeId,
        trigger: EventTrigger,
        input_source: InputSource,
        state: NodeState,
        begin: bool,
    ) -> Option<ActionEvent> {
        let node = self.nodes.get_mut(&id)?;
        let element_id = node.element_id.clone();
        let actionable = node.kind.actionable_mut()?;
        if !actionable.enabled {
            return None;
        }
        let event = ActionEvent {
            source: id,
            element_id,
            trigger,
            input_source,
        };
        for listener in &mut actionable.listeners {
            if begin {
                listener.on_action_begin(&event);
            } else {
                listener.on_action_end(&event);
            }
        }
        node.state = state;
        Some(event)
    }

    /// Whether `id` is an enabled actionable.
    #[must_use]
    pub fn is_enabled_actionable(&self, id: NodeId) -> bool {
        self.nodes
            .get(&id)
            .and_then(|n| n.kind.actionable())
            .is_some_and(Actionable::is_enabled)
    }

    /// Inserts a typed character into a text box.
    pub fn text_insert(&mut self, id: NodeId, ch: char) -> bool {
        self.nodes
            .get_mut(&id)
            .and_then(|n| n.kind.text_input_mut())
            .is_some_and(|t| t.insert(ch))
    }

    /// Deletes the character before a text box's cursor.
    pub fn text_backspace(&mut self, id: NodeId) -> bool {
        self.nodes
            .get_mut(&id)
            .and_then(|n| n.kind.text_input_mut())
            .is_some_and(|t| t.backspace())
    }

    /// Moves a text box's cursor by `delta` characters.
    pub fn text_move_cursor(&mut self, id: NodeId, delta: isize) {
        if let Some(input) = self.nodes.get_mut(&id).and_then(|n| n.kind.text_input_mut()) {
            input.move_cursor(delta);
        }
    }
}
