//! The top-level UI container.
//!
//! A [`UiContainer`] owns one [`UiTree`], drives it through the frame
//! pipeline (update, interpolate, render) and turns raw keyboard, pointer and
//! controller events into focus changes and actions.
//!
//! Focus has two independent paths that both end in "set active action":
//! the navigation cursor of the active [`Navigatable`](crate::navigation::Navigatable),
//! moved by arrow keys and the d-pad, and pointer hit testing.

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::config::UiConfig;
use crate::element::Element;
use crate::error::{UiError, UiResult};
use crate::input::{
    ControllerButton, ControllerType, InputSource, Key, MouseButton, NavigationDirection, NavigationMode, Platform,
};
use crate::layout::{ScreenSize, ScreenSizeScaleMode};
use crate::listener::{EventTrigger, UiContainerListener};
use crate::render::{Graphics, NodeId, NodeState, UiTree, Visibility};
use crate::runtime::{Registration, UiPhase, UiRuntime};

/// Pointer movement (in pixels) that counts as switching to the pointer.
const POINTER_SWITCH_THRESHOLD: f32 = 2.0;

/// Handle returned by [`UiContainer::add_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// A UI root bound to a screen area.
pub struct UiContainer {
    runtime: Arc<UiRuntime>,
    registration: Registration,
    registered: bool,
    config: UiConfig,
    tree: UiTree,
    listeners: Vec<(ListenerId, Box<dyn UiContainerListener>)>,
    next_listener_id: u64,
    visibility: Visibility,
    scale: (f32, f32),

    last_input_source: InputSource,
    next_input_source: Option<InputSource>,
    last_controller_type: ControllerType,
    next_controller_type: Option<ControllerType>,
    last_mouse: (f32, f32),

    last_theme_id: Option<String>,
    theme_warning_issued: bool,
    initial_theme_layout_complete: bool,

    received_key_downs: HashSet<Key>,
    received_button_downs: HashSet<ControllerButton>,
    active_navigation: Option<NodeId>,
    active_action: Option<NodeId>,
    active_text_input: Option<NodeId>,
    text_input_ignored_first_enter: bool,
}

impl UiContainer {
    /// Creates a container of `width` x `height` pixels and registers it with
    /// `runtime`.
    ///
    /// # Errors
    ///
    /// Returns the validation error of `config`.
    pub fn new(runtime: Arc<UiRuntime>, id: &str, config: UiConfig, width: f32, height: f32) -> UiResult<Self> {
        config.validate()?;
        let mut tree = UiTree::new(id, &config, width, height)?;
        tree.set_default_visibility(runtime.default_visibility());
        let registration = runtime.register();
        tracing::debug!(
            "UI container '{}' registered as #{} ({}x{}, {})",
            id,
            registration.id,
            width,
            height,
            tree.screen_size()
        );
        Ok(Self {
            registration,
            registered: true,
            last_input_source: config.platform.pointer_input_source(),
            runtime,
            config,
            tree,
            listeners: Vec::new(),
            next_listener_id: 1,
            visibility: Visibility::Visible,
            scale: (1.0, 1.0),
            next_input_source: None,
            last_controller_type: ControllerType::Unknown,
            next_controller_type: None,
            last_mouse: (0.0, 0.0),
            last_theme_id: None,
            theme_warning_issued: false,
            initial_theme_layout_complete: false,
            received_key_downs: HashSet::new(),
            received_button_downs: HashSet::new(),
            active_navigation: None,
            active_action: None,
            active_text_input: None,
            text_input_ignored_first_enter: false,
        })
    }

    /// Unregisters from the runtime. Called automatically on drop.
    pub fn dispose(&mut self) {
        if self.registered {
            self.runtime.unregister(self.registration.id);
            self.registered = false;
        }
    }

    /// The render tree.
    #[must_use]
    pub const fn tree(&self) -> &UiTree {
        &self.tree
    }

    /// The render tree, for structural changes.
    pub fn tree_mut(&mut self) -> &mut UiTree {
        &mut self.tree
    }

    /// Attaches `element` directly under the container.
    ///
    /// # Errors
    ///
    /// See [`UiTree::add_child`].
    pub fn add(&mut self, element: Element) -> UiResult<NodeId> {
        let root = self.tree.root();
        self.tree.add_child(root, element)
    }

    /// The shared runtime.
    #[must_use]
    pub const fn runtime(&self) -> &Arc<UiRuntime> {
        &self.runtime
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &UiConfig {
        &self.config
    }

    // ========================================================================
    // Listeners
    // ========================================================================

    /// Registers a listener.
    pub fn add_listener(&mut self, listener: Box<dyn UiContainerListener>) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Removes a listener. Returns false if it was not registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(registered, _)| *registered != id);
        self.listeners.len() != before
    }

    fn notify(&mut self, mut f: impl FnMut(&mut dyn UiContainerListener)) {
        for (_, listener) in &mut self.listeners {
            f(listener.as_mut());
        }
    }

    // ========================================================================
    // Frame pipeline
    // ========================================================================

    fn enter_phase(&mut self, phase: UiPhase) {
        self.runtime.set_phase(phase);
        self.tree.set_phase(phase);
    }

    /// Applies pending input changes, relayouts if anything is dirty, then
    /// runs the update pass.
    ///
    /// Does nothing until the runtime has a theme.
    pub fn update(&mut self, delta: f32) {
        self.apply_input_source();
        self.apply_controller_type();

        let Some(theme) = self.runtime.theme() else {
            if !self.theme_warning_issued {
                tracing::error!("No theme applied to UI - cannot update or render UI");
                self.theme_warning_issued = true;
            }
            return;
        };
        if self.last_theme_id.as_deref() != Some(theme.id()) {
            let root = self.tree.root();
            self.tree.mark_dirty(root);
            self.initial_theme_layout_complete = false;
            tracing::info!("Applied theme - {}", theme.id());
            self.last_theme_id = Some(theme.id().to_string());
        }
        if self.registration.force_layout.swap(false, Ordering::AcqRel) {
            self.resize_tree();
        }

        let tree = &mut self.tree;
        for (_, listener) in &mut self.listeners {
            listener.pre_update(tree, delta);
        }

        if self.tree.is_dirty() {
            self.enter_phase(UiPhase::Layout);
            self.tree
                .layout(theme.as_ref(), self.last_input_source, self.last_controller_type);
            self.enter_phase(UiPhase::Noop);
            self.tree.process_layout_deferred();
            self.initial_theme_layout_complete = true;
        }

        self.enter_phase(UiPhase::Update);
        self.tree.update(delta);
        let tree = &mut self.tree;
        for (_, listener) in &mut self.listeners {
            listener.post_update(tree, delta);
        }
        self.enter_phase(UiPhase::Noop);
        self.tree.process_update_deferred();
    }

    /// Moves render areas `alpha` of the way towards the last update.
    pub fn interpolate(&mut self, alpha: f32) {
        if !self.runtime.is_theme_applied() {
            return;
        }
        self.enter_phase(UiPhase::Interpolate);
        let tree = &mut self.tree;
        for (_, listener) in &mut self.listeners {
            listener.pre_interpolate(tree, alpha);
        }
        self.tree.interpolate(alpha);
        let tree = &mut self.tree;
        for (_, listener) in &mut self.listeners {
            listener.post_interpolate(tree, alpha);
        }
        self.enter_phase(UiPhase::Noop);
    }

    /// Draws the tree at the container's scale, then runs render-phase
    /// deferred tasks.
    ///
    /// Nothing is drawn before the first layout with the current theme.
    pub fn render(&mut self, g: &mut dyn Graphics) {
        if !self.runtime.is_theme_applied() || !self.initial_theme_layout_complete {
            return;
        }
        self.enter_phase(UiPhase::Render);
        for (_, listener) in &mut self.listeners {
            listener.pre_render(&self.tree);
        }
        if self.visibility == Visibility::Visible {
            let scaled = self.scale != (1.0, 1.0);
            let previous = g.scale();
            if scaled {
                g.set_scale(self.scale.0, self.scale.1);
            }
            self.tree.render(g);
            if scaled {
                g.set_scale(previous.0, previous.1);
            }
        }
        for (_, listener) in &mut self.listeners {
            listener.post_render(&self.tree);
        }
        self.enter_phase(UiPhase::Noop);
        self.tree.process_render_deferred();
    }

    /// True once the tree has been laid out with the current theme.
    #[must_use]
    pub const fn is_initial_theme_layout_complete(&self) -> bool {
        self.initial_theme_layout_complete
    }

    /// Container visibility. Only `Visible` containers draw.
    #[must_use]
    pub const fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Shows or hides the whole container.
    pub fn set_visibility(&mut self, visibility: Visibility) {
        self.visibility = visibility;
    }

    // ========================================================================
    // Size, scale and modes
    // ========================================================================

    /// Resizes the container.
    pub fn set(&mut self, width: f32, height: f32) {
        let screen_size = self.tree.on_resize(width, height, self.scale.0);
        self.notify(|l| l.on_screen_size_changed(screen_size));
    }

    fn resize_tree(&mut self) {
        let (width, height) = (self.tree.width(), self.tree.height());
        self.set(width, height);
    }

    /// Container width in pixels.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.tree.width()
    }

    /// Container height in pixels.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.tree.height()
    }

    /// Active breakpoint.
    #[must_use]
    pub const fn screen_size(&self) -> ScreenSize {
        self.tree.screen_size()
    }

    /// Render scale.
    #[must_use]
    pub const fn scale(&self) -> (f32, f32) {
        self.scale
    }

    /// Changes the render scale. Pointer coordinates are divided by it and
    /// the breakpoint is re-resolved.
    ///
    /// # Errors
    ///
    /// [`UiError::InvalidConfig`] unless both factors are finite and positive.
    /// The previous scale stays in effect.
    pub fn set_scale(&mut self, scale_x: f32, scale_y: f32) -> UiResult<()> {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if !valid(scale_x) || !valid(scale_y) {
            return Err(UiError::InvalidConfig(format!(
                "render scale must be positive, got {scale_x}x{scale_y}"
            )));
        }
        if self.scale != (scale_x, scale_y) {
            self.scale = (scale_x, scale_y);
            self.resize_tree();
        }
        Ok(())
    }

    /// Active navigation mode.
    #[must_use]
    pub const fn navigation_mode(&self) -> NavigationMode {
        self.config.navigation_mode
    }

    /// Changes which navigation styles are accepted from now on.
    pub fn set_navigation_mode(&mut self, mode: NavigationMode) {
        self.config.navigation_mode = mode;
    }

    /// Changes how the render scale affects breakpoints and re-resolves the
    /// breakpoint.
    pub fn set_screen_size_scale_mode(&mut self, mode: ScreenSizeScaleMode) {
        if self.config.screen_size_scale_mode == mode {
            return;
        }
        self.config.screen_size_scale_mode = mode;
        self.tree.set_scale_mode(mode);
        self.resize_tree();
    }

    /// Adds a key that begins and ends the active action.
    pub fn add_action_key(&mut self, key: Key) {
        if !self.config.action_keys.contains(&key) {
            self.config.action_keys.push(key);
        }
    }

    /// Removes an action key.
    pub fn remove_action_key(&mut self, key: Key) {
        self.config.action_keys.retain(|k| *k != key);
    }

    fn key_navigation_allowed(&self) -> bool {
        self.config
            .navigation_mode
            .key_navigation_allowed(self.config.platform)
    }

    fn pointer_navigation_allowed(&self) -> bool {
        self.config
            .navigation_mode
            .pointer_navigation_allowed(self.config.platform)
    }

    // ========================================================================
    // Input source tracking
    // ========================================================================

    /// Input source as of the last update.
    #[must_use]
    pub const fn last_input_source(&self) -> InputSource {
        self.last_input_source
    }

    /// Queues an input source change, applied at the start of the next update.
    pub fn set_last_input_source(&mut self, source: InputSource) {
        self.next_input_source = Some(source);
    }

    /// Controller type as of the last update.
    #[must_use]
    pub const fn last_controller_type(&self) -> ControllerType {
        self.last_controller_type
    }

    /// Queues a controller type change, applied at the start of the next update.
    pub fn set_last_controller_type(&mut self, controller_type: ControllerType) {
        self.next_controller_type = Some(controller_type);
    }

    fn apply_input_source(&mut self) {
        let Some(next) = self.next_input_source.take() else {
            return;
        };
        if next == self.last_input_source {
            return;
        }
        let old = std::mem::replace(&mut self.last_input_source, next);
        tracing::debug!("Input source changed from {:?} to {:?}", old, next);
        let root = self.tree.root();
        self.tree.mark_dirty(root);
        self.notify(|l| l.input_source_changed(old, next));
    }

    fn apply_controller_type(&mut self) {
        let Some(next) = self.next_controller_type.take() else {
            return;
        };
        if next == self.last_controller_type {
            return;
        }
        let old = std::mem::replace(&mut self.last_controller_type, next);
        let root = self.tree.root();
        self.tree.mark_dirty(root);
        self.notify(|l| l.controller_type_changed(old, next));
    }

    /// Converts to tree coordinates and records the pointer position.
    fn track_pointer(&mut self, x: f32, y: f32) -> (f32, f32) {
        let local = (x / self.scale.0, y / self.scale.1);
        let (last_x, last_y) = self.last_mouse;
        if (local.0 - last_x).abs() > POINTER_SWITCH_THRESHOLD || (local.1 - last_y).abs() > POINTER_SWITCH_THRESHOLD {
            self.set_last_input_source(self.config.platform.pointer_input_source());
        }
        self.last_mouse = local;
        local
    }

    fn set_screen_keyboard(&mut self, visible: bool) {
        if self.config.platform == Platform::Touch {
            self.notify(|l| l.on_screen_keyboard_changed(visible));
        }
    }

    // ========================================================================
    // Pointer input
    // ========================================================================

    /// Pointer press. Returns true when an actionable node took it.
    pub fn touch_down(&mut self, x: f32, y: f32, button: MouseButton) -> bool {
        if !self.pointer_navigation_allowed() {
            return false;
        }
        let (x, y) = self.track_pointer(x, y);
        if let Some(text_input) = self.active_text_input {
            let inside = self
                .tree
                .node(text_input)
                .is_some_and(|n| n.outer_area().contains(x, y));
            if !inside {
                self.release_text_input();
            }
        }
        if button != MouseButton::Left {
            return false;
        }
        let Some(hit) = self.tree.mouse_down(x, y) else {
            return false;
        };
        self.begin_action(hit, EventTrigger::Pointer);
        self.set_active_action(hit);
        true
    }

    /// Pointer release. Returns true when it ended an action.
    pub fn touch_up(&mut self, x: f32, y: f32, button: MouseButton) -> bool {
        if !self.pointer_navigation_allowed() {
            return false;
        }
        let (x, y) = self.track_pointer(x, y);
        if button != MouseButton::Left {
            return false;
        }
        let Some(active) = self.active_action.take() else {
            return false;
        };
        let state = if self.tree.node(active).is_some_and(|n| n.outer_area().contains(x, y)) {
            NodeState::Hover
        } else {
            NodeState::Normal
        };
        if self.tree.end_action(active, EventTrigger::Pointer, self.last_input_source, state).is_none() {
            self.tree.mouse_up(active, x, y);
        }
        true
    }

    /// Pointer drag; updates hover states like a move.
    pub fn touch_dragged(&mut self, x: f32, y: f32) -> bool {
        if !self.pointer_navigation_allowed() {
            return false;
        }
        let (x, y) = self.track_pointer(x, y);
        self.tree.mouse_moved(x, y)
    }

    /// Pointer move. Returns true when an actionable node is under the pointer.
    pub fn mouse_moved(&mut self, x: f32, y: f32) -> bool {
        let (x, y) = self.track_pointer(x, y);
        if !self.pointer_navigation_allowed() {
            return false;
        }
        self.tree.mouse_moved(x, y)
    }

    /// Scroll wheel at the last pointer position. No node kind scrolls, so
    /// the event is never consumed.
    pub fn scrolled(&mut self, amount_x: f32, amount_y: f32) -> bool {
        if !self.pointer_navigation_allowed() {
            return false;
        }
        let (x, y) = self.last_mouse;
        tracing::trace!(x, y, amount_x, amount_y, "scroll ignored");
        false
    }

    // ========================================================================
    // Keyboard input
    // ========================================================================

    /// A character was typed. Returns true when a text input consumed it.
    pub fn key_typed(&mut self, ch: char) -> bool {
        let Some(text_input) = self.active_text_input else {
            return false;
        };
        if self.is_receiving_text(text_input) {
            self.tree.text_insert(text_input, ch);
        }
        true
    }

    /// Key press. Returns true when the container consumed it.
    pub fn key_down(&mut self, key: Key) -> bool {
        self.received_key_downs.insert(key);
        if self.active_text_input.is_some_and(|t| self.is_receiving_text(t)) {
            return true;
        }
        if self.config.action_keys.contains(&key) {
            if let Some(active) = self.active_action {
                self.begin_action(active, EventTrigger::Keyboard);
                if self.active_text_input.is_some() {
                    self.text_input_ignored_first_enter = false;
                }
                return true;
            }
        }
        if self.navigation_key_down(key) {
            return true;
        }
        self.received_key_downs.remove(&key);
        false
    }

    /// Key release. Returns false for keys whose press this container did
    /// not see.
    pub fn key_up(&mut self, key: Key) -> bool {
        if !self.received_key_downs.remove(&key) {
            return false;
        }
        if self.text_input_key_up(key) {
            return true;
        }
        if self.config.action_keys.contains(&key) {
            if let Some(active) = self.active_action {
                self.tree
                    .end_action(active, EventTrigger::Keyboard, self.last_input_source, NodeState::Normal);
                self.set_screen_keyboard(false);
                return true;
            }
        }
        self.navigation_key_up(key)
    }

    fn navigation_key_down(&mut self, key: Key) -> bool {
        let Some(navigation) = self.active_navigation else {
            return false;
        };
        let hotkey = self
            .tree
            .navigatable(navigation)
            .and_then(|n| n.hotkey(key))
            .map(str::to_string);
        match hotkey {
            Some(element_id) => self.hotkey_begin(&element_id, EventTrigger::Keyboard),
            None => {
                if let Some(direction) = NavigationDirection::from_key(key) {
                    self.navigate(navigation, direction);
                }
            }
        }
        true
    }

    fn navigation_key_up(&mut self, key: Key) -> bool {
        let Some(navigation) = self.active_navigation else {
            return false;
        };
        let hotkey = self
            .tree
            .navigatable(navigation)
            .and_then(|n| n.hotkey(key))
            .map(str::to_string);
        if let Some(element_id) = hotkey {
            self.hotkey_end(&element_id, EventTrigger::Keyboard);
        }
        true
    }

    fn text_input_key_up(&mut self, key: Key) -> bool {
        let Some(text_input) = self.active_text_input else {
            return false;
        };
        if !self.is_receiving_text(text_input) {
            return false;
        }
        match key {
            Key::Backspace => {
                self.tree.text_backspace(text_input);
            }
            Key::Enter => {
                if !self.text_input_ignored_first_enter {
                    self.text_input_ignored_first_enter = true;
                    return true;
                }
                self.tree
                    .end_action(text_input, EventTrigger::Keyboard, self.last_input_source, NodeState::Normal);
                self.release_text_input();
            }
            Key::Left => self.tree.text_move_cursor(text_input, -1),
            Key::Right => self.tree.text_move_cursor(text_input, 1),
            _ => {}
        }
        true
    }

    fn is_receiving_text(&self, text_input: NodeId) -> bool {
        self.tree
            .node(text_input)
            .is_some_and(|n| n.state() == NodeState::Action && n.kind().text_input().is_some())
    }

    fn release_text_input(&mut self) {
        self.active_text_input = None;
        self.active_action = None;
        self.text_input_ignored_first_enter = false;
        self.set_screen_keyboard(false);
    }

    // ========================================================================
    // Controller input
    // ========================================================================

    /// Controller button press. Switches the next input source to the
    /// controller; only handled while a navigation is active.
    pub fn button_down(&mut self, button: ControllerButton) -> bool {
        self.set_last_input_source(InputSource::Controller);
        let Some(navigation) = self.active_navigation else {
            return false;
        };
        self.received_button_downs.insert(button);

        let hotkey = self
            .tree
            .navigatable(navigation)
            .and_then(|n| n.controller_hotkey(button))
            .map(str::to_string);
        if let Some(element_id) = hotkey {
            self.hotkey_begin(&element_id, EventTrigger::Controller);
        } else if button == self.config.controller_action_button {
            if let Some(active) = self.active_action {
                if self.active_text_input.is_none() || !self.text_input_ignored_first_enter {
                    self.begin_action(active, EventTrigger::Controller);
                }
            }
        } else if let Some(direction) = NavigationDirection::from_button(button) {
            self.navigate(navigation, direction);
        }
        true
    }

    /// Controller button release. Returns false for buttons whose press this
    /// container did not see.
    pub fn button_up(&mut self, button: ControllerButton) -> bool {
        if !self.received_button_downs.remove(&button) {
            return false;
        }
        let Some(navigation) = self.active_navigation else {
            return false;
        };
        let hotkey = self
            .tree
            .navigatable(navigation)
            .and_then(|n| n.controller_hotkey(button))
            .map(str::to_string);
        if let Some(element_id) = hotkey {
            self.hotkey_end(&element_id, EventTrigger::Controller);
            return true;
        }
        let Some(active) = self.active_action else {
            return true;
        };
        if self.active_text_input.is_some() && !self.text_input_ignored_first_enter {
            self.text_input_ignored_first_enter = true;
            return true;
        }
        if button == self.config.controller_action_button {
            self.tree
                .end_action(active, EventTrigger::Controller, self.last_input_source, NodeState::Normal);
            self.text_input_ignored_first_enter = false;
        }
        true
    }

    // ========================================================================
    // Focus
    // ========================================================================

    fn begin_action(&mut self, id: NodeId, trigger: EventTrigger) {
        if let Some(event) = self.tree.begin_action(id, trigger, self.last_input_source) {
            self.notify(|l| l.on_element_action(&event));
        }
    }

    /// Disabled hotkey targets swallow the event without firing.
    fn hotkey_begin(&mut self, element_id: &str, trigger: EventTrigger) {
        if let Some(id) = self.tree.find_by_element_id(element_id) {
            if self.tree.is_enabled_actionable(id) {
                self.begin_action(id, trigger);
            }
        }
    }

    fn hotkey_end(&mut self, element_id: &str, trigger: EventTrigger) {
        if let Some(id) = self.tree.find_by_element_id(element_id) {
            if self.tree.is_enabled_actionable(id) {
                self.tree
                    .end_action(id, trigger, self.last_input_source, NodeState::Normal);
            }
        }
    }

    fn navigate(&mut self, navigation: NodeId, direction: NavigationDirection) {
        if !self.key_navigation_allowed() {
            return;
        }
        if let Some(active) = self.active_action {
            self.tree.set_state(active, NodeState::Normal);
        }
        let target = self
            .tree
            .navigatable_mut(navigation)
            .and_then(|n| n.navigation_mut().navigate(direction).map(str::to_string));
        if let Some(id) = target.and_then(|e| self.tree.find_by_element_id(&e)) {
            self.tree.set_state(id, NodeState::Hover);
            self.set_active_action(id);
        }
    }

    /// Makes `id` the active action. A text box also becomes the active text
    /// input.
    pub fn set_active_action(&mut self, id: NodeId) {
        if let Some(previous) = self.active_action {
            if previous != id {
                self.tree.set_state(previous, NodeState::Normal);
            }
        }
        if self.tree.text_input(id).is_some() {
            self.active_text_input = Some(id);
            self.set_screen_keyboard(true);
        }
        self.active_action = Some(id);
        if let Some(element_id) = self.tree.node(id).map(|n| n.element_id().to_string()) {
            self.notify(|l| l.on_element_activated(&element_id));
        }
    }

    /// Makes `id` the active navigation and, when keyboard navigation is
    /// permitted, hovers its first entry.
    ///
    /// # Errors
    ///
    /// [`UiError::UnknownNode`], or [`UiError::Unsupported`] if `id` is not
    /// navigatable.
    pub fn set_active_navigation(&mut self, id: NodeId) -> UiResult<()> {
        let node = self.tree.node(id).ok_or(UiError::UnknownNode(id))?;
        if node.kind().navigatable().is_none() {
            return Err(UiError::Unsupported {
                node: id,
                capability: "navigation",
            });
        }
        if self.active_navigation == Some(id) {
            return Ok(());
        }
        self.unset_navigation_hover();
        self.active_navigation = Some(id);
        if !self.key_navigation_allowed() {
            return Ok(());
        }
        if let Some(active) = self.active_action {
            self.tree.set_state(active, NodeState::Normal);
        }
        let first = self
            .tree
            .navigatable_mut(id)
            .and_then(|n| n.navigation_mut().reset_cursor().map(str::to_string));
        if let Some(target) = first.and_then(|e| self.tree.find_by_element_id(&e)) {
            self.set_active_action(target);
            self.tree.set_state(target, NodeState::Hover);
        }
        Ok(())
    }

    /// Returns the navigation cursor's node to normal, unless it is pressed.
    fn unset_navigation_hover(&mut self) {
        let Some(navigation) = self.active_navigation else {
            return;
        };
        let cursor = self
            .tree
            .navigatable(navigation)
            .and_then(|n| n.navigation().cursor())
            .and_then(|e| self.tree.find_by_element_id(e));
        if let Some(id) = cursor {
            if self.tree.node(id).is_some_and(|n| n.state() == NodeState::Hover) {
                self.tree.set_state(id, NodeState::Normal);
            }
        }
    }

    /// Drops the active action.
    pub fn clear_active_action(&mut self) {
        self.unset_navigation_hover();
        self.active_action = None;
    }

    /// Drops the active navigation, action and text input.
    pub fn clear_active_navigation(&mut self) {
        self.unset_navigation_hover();
        self.active_text_input = None;
        self.active_action = None;
        self.active_navigation = None;
    }

    /// Active navigation container.
    #[must_use]
    pub const fn active_navigation(&self) -> Option<NodeId> {
        self.active_navigation
    }

    /// Active action.
    #[must_use]
    pub const fn active_action(&self) -> Option<NodeId> {
        self.active_action
    }

    /// Active text input.
    #[must_use]
    pub const fn active_text_input(&self) -> Option<NodeId> {
        self.active_text_input
    }
}

impl Drop for UiContainer {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for UiContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiContainer")
            .field("registration", &self.registration.id)
            .field("tree", &self.tree)
            .field("listeners", &self.listeners.len())
            .field("last_input_source", &self.last_input_source)
            .field("active_navigation", &self.active_navigation)
            .field("active_action", &self.active_action)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::UiTheme;

    fn container(runtime: &Arc<UiRuntime>, config: UiConfig) -> UiContainer {
        UiContainer::new(Arc::clone(runtime), "ui", config, 800.0, 600.0).unwrap()
    }

    #[test]
    fn test_registers_and_unregisters() {
        let runtime = Arc::new(UiRuntime::new());
        let mut a = container(&runtime, UiConfig::default());
        let b = container(&runtime, UiConfig::default());
        assert_eq!(runtime.container_count(), 2);
        a.dispose();
        a.dispose();
        assert_eq!(runtime.container_count(), 1);
        drop(b);
        assert_eq!(runtime.container_count(), 0);
    }

    #[test]
    fn test_no_theme_skips_update() {
        let runtime = Arc::new(UiRuntime::new());
        let mut ui = container(&runtime, UiConfig::default());
        ui.update(0.016);
        ui.update(0.016);
        assert!(!ui.is_initial_theme_layout_complete());
        assert!(ui.tree().is_dirty());

        runtime.set_theme(Arc::new(UiTheme::new("t")));
        ui.update(0.016);
        assert!(ui.is_initial_theme_layout_complete());
        assert!(!ui.tree().is_dirty());
    }

    #[test]
    fn test_phase_is_noop_between_passes() {
        let runtime = Arc::new(UiRuntime::with_theme(Arc::new(UiTheme::new("t"))));
        let mut ui = container(&runtime, UiConfig::default());
        ui.update(0.016);
        assert_eq!(runtime.phase(), UiPhase::Noop);
        assert_eq!(ui.tree().phase(), UiPhase::Noop);
    }

    #[test]
    fn test_input_source_change_applies_on_update() {
        let runtime = Arc::new(UiRuntime::with_theme(Arc::new(UiTheme::new("t"))));
        let mut ui = container(&runtime, UiConfig::default());
        ui.update(0.016);
        ui.set_last_input_source(InputSource::Controller);
        assert_eq!(ui.last_input_source(), InputSource::KeyboardMouse);
        ui.update(0.016);
        assert_eq!(ui.last_input_source(), InputSource::Controller);

        ui.mouse_moved(1.0, 1.0);
        ui.update(0.016);
        assert_eq!(ui.last_input_source(), InputSource::Controller);
        ui.mouse_moved(50.0, 50.0);
        ui.update(0.016);
        assert_eq!(ui.last_input_source(), InputSource::KeyboardMouse);
    }

    #[test]
    fn test_action_keys_deduplicated() {
        let runtime = Arc::new(UiRuntime::new());
        let mut ui = container(&runtime, UiConfig::default());
        ui.add_action_key(Key::Space);
        ui.add_action_key(Key::Space);
        assert_eq!(ui.config().action_keys, vec![Key::Enter, Key::Space]);
        ui.remove_action_key(Key::Enter);
        assert_eq!(ui.config().action_keys, vec![Key::Space]);
    }

    #[test]
    fn test_rejects_degenerate_scale() {
        let runtime = Arc::new(UiRuntime::with_theme(Arc::new(UiTheme::new("t"))));
        let mut ui = container(&runtime, UiConfig {
            screen_size_scale_mode: ScreenSizeScaleMode::Inverse,
            ..UiConfig::default()
        });
        ui.update(0.016);
        assert!(matches!(ui.set_scale(0.0, 1.0), Err(UiError::InvalidConfig(_))));
        assert!(matches!(ui.set_scale(1.0, f32::NAN), Err(UiError::InvalidConfig(_))));
        assert!(matches!(ui.set_scale(-2.0, -2.0), Err(UiError::InvalidConfig(_))));
        assert_eq!(ui.scale(), (1.0, 1.0));
        assert_eq!(ui.screen_size(), ScreenSize::Md);

        ui.set_scale(0.5, 0.5).unwrap();
        assert_eq!(ui.screen_size(), ScreenSize::Xs);
    }

    #[test]
    fn test_scroll_is_never_consumed() {
        let runtime = Arc::new(UiRuntime::with_theme(Arc::new(UiTheme::new("t"))));
        let mut ui = container(&runtime, UiConfig::default());
        ui.update(0.016);
        ui.mouse_moved(10.0, 10.0);
        assert!(!ui.scrolled(0.0, 3.0));
        ui.set_navigation_mode(NavigationMode::ButtonOnly);
        assert!(!ui.scrolled(0.0, -3.0));
    }
}
