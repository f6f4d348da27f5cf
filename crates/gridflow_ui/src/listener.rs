//! Listener traits for container and action events.

use crate::input::{ControllerType, InputSource};
use crate::layout::ScreenSize;
use crate::render::{NodeId, UiTree};

/// What triggered an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTrigger {
    /// An action key or hotkey on the keyboard.
    Keyboard,
    /// The controller action button or a controller hotkey.
    Controller,
    /// A mouse click or touch.
    Pointer,
}

/// Begin/end action notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionEvent {
    /// Node that was actioned.
    pub source: NodeId,
    /// Element id of the node.
    pub element_id: String,
    /// What triggered it.
    pub trigger: EventTrigger,
    /// Input source active when it fired.
    pub input_source: InputSource,
}

/// Receives action events from one actionable node.
pub trait ActionListener {
    /// The node entered the action state.
    fn on_action_begin(&mut self, event: &ActionEvent);

    /// The node left the action state.
    fn on_action_end(&mut self, event: &ActionEvent);
}

/// Frame pipeline and input state notifications from a container.
///
/// Every method has an empty default so implementors pick what they need.
#[allow(unused_variables)]
pub trait UiContainerListener {
    /// Before the update pass, after any relayout bookkeeping.
    fn pre_update(&mut self, tree: &mut UiTree, delta: f32) {}

    /// After the update pass, before update-phase deferred tasks run.
    fn post_update(&mut self, tree: &mut UiTree, delta: f32) {}

    /// Before interpolation.
    fn pre_interpolate(&mut self, tree: &mut UiTree, alpha: f32) {}

    /// After interpolation.
    fn post_interpolate(&mut self, tree: &mut UiTree, alpha: f32) {}

    /// Before drawing.
    fn pre_render(&mut self, tree: &UiTree) {}

    /// After drawing.
    fn post_render(&mut self, tree: &UiTree) {}

    /// The active input source changed.
    fn input_source_changed(&mut self, old: InputSource, new: InputSource) {}

    /// The active controller type changed.
    fn controller_type_changed(&mut self, old: ControllerType, new: ControllerType) {}

    /// An element's action began from a hotkey, action key or pointer.
    fn on_element_action(&mut self, event: &ActionEvent) {}

    /// An element became the active action, by navigation or a pointer press.
    fn on_element_activated(&mut self, element_id: &str) {}

    /// The container was resized or rescaled.
    fn on_screen_size_changed(&mut self, screen_size: ScreenSize) {}

    /// The on-screen keyboard should be shown (`true`) or hidden.
    fn on_screen_keyboard_changed(&mut self, visible: bool) {}
}
