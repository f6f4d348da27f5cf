//! The render tree: node arena, breakpoint state, deferred task lists and the
//! element id lookup cache.
//!
//! Nodes live in a flat map keyed by [`NodeId`]. Parents own their children
//! through their [`LayerMap`](crate::render::LayerMap); the `parent` field is a
//! plain id used for upward queries only.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::config::UiConfig;
use crate::element::Element;
use crate::error::{UiError, UiResult};
use crate::input::{ControllerType, InputSource};
use crate::layout::{Breakpoints, LayoutRuleset, LayoutState, ScreenSize, ScreenSizeScaleMode};
use crate::listener::ActionListener;
use crate::navigation::Navigatable;
use crate::render::deferred::{DeferredList, DeferredPhase, DeferredRunnable, PendingDeferred};
use crate::render::graphics::Graphics;
use crate::render::node::{NodeGeometry, NodeKind, NodeState, RenderNode, TextInput, Visibility};
use crate::render::{passes, LayerMap, NodeId};
use crate::runtime::UiPhase;
use crate::style::{StyleRule, Theme};

/// Root of one container's render nodes.
pub struct UiTree {
    pub(super) nodes: HashMap<NodeId, RenderNode>,
    root: NodeId,
    next_id: u64,
    id_cache: RefCell<HashMap<String, NodeId>>,
    breakpoints: Breakpoints,
    scale_mode: ScreenSizeScaleMode,
    screen_size: ScreenSize,
    screen_size_scale: f32,
    pub(super) screen_size_changed: bool,
    pub(super) width: f32,
    pub(super) height: f32,
    deferred_layout: DeferredList,
    deferred_update: DeferredList,
    deferred_render: DeferredList,
    next_seq: u64,
    phase: UiPhase,
    default_visibility: Visibility,
    pub(super) debug_layout: bool,
}

impl UiTree {
    /// Creates a tree whose root has element id `root_id` and lays out its
    /// children with `config.layout`.
    ///
    /// # Errors
    ///
    /// Returns the parse error when `config.layout` is malformed.
    pub fn new(root_id: &str, config: &UiConfig, width: f32, height: f32) -> UiResult<Self> {
        let ruleset = LayoutRuleset::parse(&config.layout)?;
        let root = NodeId::new(0);
        let mut nodes = HashMap::new();
        nodes.insert(
            root,
            RenderNode {
                id: root,
                element_id: root_id.to_string(),
                style_id: String::new(),
                kind: NodeKind::Root,
                parent: None,
                layers: LayerMap::new(),
                layout: config.layout.clone(),
                ruleset,
                z_index: 0,
                layer_z: 0,
                visibility: Visibility::Visible,
                clip_overflow: false,
                state: NodeState::Normal,
                style: StyleRule::EMPTY,
                geometry: NodeGeometry::default(),
                dirty: true,
                child_dirty: false,
                hidden_by_layout_rule: false,
                hidden_by_input_source: false,
                initial_layout: false,
                initial_update: false,
                pending: PendingDeferred::default(),
            },
        );

        let mut tree = Self {
            nodes,
            root,
            next_id: 1,
            id_cache: RefCell::new(HashMap::new()),
            breakpoints: config.breakpoints,
            scale_mode: config.screen_size_scale_mode,
            screen_size: ScreenSize::Xs,
            screen_size_scale: 1.0,
            screen_size_changed: false,
            width,
            height,
            deferred_layout: DeferredList::default(),
            deferred_update: DeferredList::default(),
            deferred_render: DeferredList::default(),
            next_seq: 0,
            phase: UiPhase::Noop,
            default_visibility: Visibility::Visible,
            debug_layout: config.debug_layout,
        };
        tree.on_resize(width, height, 1.0);
        Ok(tree)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Root node id.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Node by id.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&RenderNode> {
        self.nodes.get(&id)
    }

    /// True while `id` is attached.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Number of nodes, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false; the root cannot be removed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Children of `id`, lowest layer first.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(&id)
            .map(|n| n.layers.child_ids())
            .unwrap_or_default()
    }

    /// Looks up a node by element id.
    ///
    /// Hits are cached until the next layout pass or removal.
    #[must_use]
    pub fn find_by_element_id(&self, element_id: &str) -> Option<NodeId> {
        let cached = self.id_cache.borrow().get(element_id).copied();
        if cached.is_some() {
            return cached;
        }
        let found = self
            .nodes
            .values()
            .find(|n| n.element_id == element_id)
            .map(RenderNode::id)?;
        self.id_cache
            .borrow_mut()
            .insert(element_id.to_string(), found);
        Some(found)
    }

    /// Active breakpoint.
    #[must_use]
    pub const fn screen_size(&self) -> ScreenSize {
        self.screen_size
    }

    /// Threshold multiplier from the last resize.
    #[must_use]
    pub const fn screen_size_scale(&self) -> f32 {
        self.screen_size_scale
    }

    /// True until the next layout pass after a resize.
    #[must_use]
    pub const fn is_screen_size_changed(&self) -> bool {
        self.screen_size_changed
    }

    /// Root width in pixels.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Root height in pixels.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Breakpoint thresholds.
    #[must_use]
    pub const fn breakpoints(&self) -> &Breakpoints {
        &self.breakpoints
    }

    /// True when the next update must lay the tree out.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.screen_size_changed || self.nodes.get(&self.root).is_some_and(RenderNode::is_dirty)
    }

    /// Phase the owning container is in.
    #[must_use]
    pub const fn phase(&self) -> UiPhase {
        self.phase
    }

    pub(crate) fn set_phase(&mut self, phase: UiPhase) {
        self.phase = phase;
    }

    pub(crate) fn set_default_visibility(&mut self, visibility: Visibility) {
        self.default_visibility = visibility;
    }

    pub(crate) fn set_scale_mode(&mut self, mode: ScreenSizeScaleMode) {
        self.scale_mode = mode;
    }

    /// Navigation payload of a container node.
    #[must_use]
    pub fn navigatable(&self, id: NodeId) -> Option<&Navigatable> {
        self.nodes.get(&id)?.kind.navigatable()
    }

    /// Mutable navigation payload of a container node.
    pub fn navigatable_mut(&mut self, id: NodeId) -> Option<&mut Navigatable> {
        self.nodes.get_mut(&id)?.kind.navigatable_mut()
    }

    /// Appends the attached actionable `element` to the navigation list of
    /// `navigation`.
    ///
    /// # Errors
    ///
    /// [`UiError::UnknownNode`] for either node, or [`UiError::Unsupported`]
    /// when `element` is not actionable or `navigation` is not navigatable.
    pub fn add_to_navigation(&mut self, navigation: NodeId, element: NodeId) -> UiResult<()> {
        let node = self.nodes.get(&element).ok_or(UiError::UnknownNode(element))?;
        if node.kind.actionable().is_none() {
            return Err(UiError::Unsupported {
                node: element,
                capability: "actions",
            });
        }
        let element_id = node.element_id.clone();
        self.require(navigation)?
            .kind
            .navigatable_mut()
            .ok_or(UiError::Unsupported {
                node: navigation,
                capability: "navigation",
            })?
            .navigation_mut()
            .add(&element_id);
        Ok(())
    }

    /// Text input payload of a text box node.
    #[must_use]
    pub fn text_input(&self, id: NodeId) -> Option<&TextInput> {
        self.nodes.get(&id)?.kind.text_input()
    }

    // ========================================================================
    // Structure
    // ========================================================================

    /// Attaches `element` under `parent`, parsing its layout.
    ///
    /// # Errors
    ///
    /// - [`UiError::UnknownNode`] if `parent` is not attached
    /// - [`UiError::Unsupported`] if `parent` cannot hold children
    /// - [`UiError::DuplicateElementId`] if the id is taken
    /// - the layout parse error for a malformed layout
    pub fn add_child(&mut self, parent: NodeId, element: Element) -> UiResult<NodeId> {
        let parent_node = self.nodes.get(&parent).ok_or(UiError::UnknownNode(parent))?;
        if !parent_node.capabilities().is_parent {
            return Err(UiError::Unsupported {
                node: parent,
                capability: "children",
            });
        }
        if self.find_by_element_id(&element.id).is_some() {
            return Err(UiError::DuplicateElementId(element.id));
        }
        let ruleset = LayoutRuleset::parse(&element.layout)?;

        let id = NodeId::new(self.next_id);
        self.next_id += 1;
        let z_index = element.z_index;
        let node = RenderNode {
            id,
            element_id: element.id,
            style_id: element.style_id,
            kind: element.kind,
            parent: Some(parent),
            layers: LayerMap::new(),
            layout: element.layout,
            ruleset,
            z_index,
            layer_z: z_index,
            visibility: element.visibility.unwrap_or(self.default_visibility),
            clip_overflow: element.clip_overflow,
            state: NodeState::Normal,
            style: StyleRule::EMPTY,
            geometry: NodeGeometry::default(),
            dirty: true,
            child_dirty: false,
            hidden_by_layout_rule: false,
            hidden_by_input_source: false,
            initial_layout: false,
            initial_update: false,
            pending: PendingDeferred::default(),
        };
        self.nodes.insert(id, node);
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.layers.insert(z_index, id);
        }
        self.mark_dirty(id);
        Ok(id)
    }

    /// Detaches `id` and its subtree. Removing a detached node is a no-op.
    ///
    /// Navigation entries and hotkeys pointing at removed elements are
    /// dropped along with any tasks still queued on them.
    ///
    /// # Errors
    ///
    /// Returns [`UiError::Unsupported`] for the root.
    pub fn remove(&mut self, id: NodeId) -> UiResult<Vec<NodeId>> {
        if id == self.root {
            return Err(UiError::Unsupported {
                node: id,
                capability: "removal",
            });
        }
        let Some(node) = self.nodes.get(&id) else {
            return Ok(Vec::new());
        };
        let parent = node.parent;
        let layer_z = node.layer_z;

        let mut removed = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get(&current) {
                stack.extend(node.layers.child_ids());
                removed.push(current);
            }
        }
        let element_ids: Vec<String> = removed
            .iter()
            .filter_map(|r| self.nodes.remove(r))
            .map(|n| n.element_id)
            .collect();

        if let Some(parent) = parent {
            if let Some(parent_node) = self.nodes.get_mut(&parent) {
                parent_node.layers.remove(layer_z, id);
            }
            self.mark_dirty(parent);
        }
        for node in self.nodes.values_mut() {
            if let Some(navigatable) = node.kind.navigatable_mut() {
                for element_id in &element_ids {
                    navigatable.forget(element_id);
                }
            }
        }
        self.id_cache.borrow_mut().clear();
        Ok(removed)
    }

    // ========================================================================
    // Element properties
    // ========================================================================

    fn require(&mut self, id: NodeId) -> UiResult<&mut RenderNode> {
        self.nodes.get_mut(&id).ok_or(UiError::UnknownNode(id))
    }

    /// Replaces the layout string. The ruleset is parsed immediately; on
    /// error the previous layout stays in effect.
    ///
    /// # Errors
    ///
    /// The layout parse error, or [`UiError::UnknownNode`].
    pub fn set_layout(&mut self, id: NodeId, layout: &str) -> UiResult<()> {
        let node = self.require(id)?;
        if node.layout == layout {
            return Ok(());
        }
        node.ruleset = LayoutRuleset::parse(layout)?;
        node.layout = layout.to_string();
        self.mark_dirty(id);
        Ok(())
    }

    /// Changes the style id.
    ///
    /// # Errors
    ///
    /// [`UiError::UnknownNode`].
    pub fn set_style_id(&mut self, id: NodeId, style_id: &str) -> UiResult<()> {
        let node = self.require(id)?;
        if node.style_id == style_id {
            return Ok(());
        }
        node.style_id = style_id.to_string();
        self.mark_dirty(id);
        Ok(())
    }

    /// Changes the z-index. The node moves layers on the next layout.
    ///
    /// # Errors
    ///
    /// [`UiError::UnknownNode`].
    pub fn set_z_index(&mut self, id: NodeId, z_index: i32) -> UiResult<()> {
        let node = self.require(id)?;
        if node.z_index == z_index {
            return Ok(());
        }
        node.z_index = z_index;
        self.mark_dirty(id);
        Ok(())
    }

    /// Changes visibility.
    ///
    /// # Errors
    ///
    /// [`UiError::UnknownNode`].
    pub fn set_visibility(&mut self, id: NodeId, visibility: Visibility) -> UiResult<()> {
        let node = self.require(id)?;
        if node.visibility == visibility {
            return Ok(());
        }
        node.visibility = visibility;
        self.mark_dirty(id);
        Ok(())
    }

    /// Enables or disables overflow clipping.
    ///
    /// # Errors
    ///
    /// [`UiError::UnknownNode`].
    pub fn set_clip_overflow(&mut self, id: NodeId, clip: bool) -> UiResult<()> {
        self.require(id)?.clip_overflow = clip;
        Ok(())
    }

    /// Enables or disables an actionable node.
    ///
    /// # Errors
    ///
    /// [`UiError::UnknownNode`], or [`UiError::Unsupported`] for non-actionable kinds.
    pub fn set_enabled(&mut self, id: NodeId, enabled: bool) -> UiResult<()> {
        let actionable = self
            .require(id)?
            .kind
            .actionable_mut()
            .ok_or(UiError::Unsupported {
                node: id,
                capability: "actions",
            })?;
        actionable.enabled = enabled;
        Ok(())
    }

    /// Registers an action listener on an actionable node.
    ///
    /// # Errors
    ///
    /// [`UiError::UnknownNode`], or [`UiError::Unsupported`] for non-actionable kinds.
    pub fn add_action_listener(&mut self, id: NodeId, listener: Box<dyn ActionListener>) -> UiResult<()> {
        let actionable = self
            .require(id)?
            .kind
            .actionable_mut()
            .ok_or(UiError::Unsupported {
                node: id,
                capability: "actions",
            })?;
        actionable.listeners.push(listener);
        Ok(())
    }

    /// Replaces the text of a label or text box.
    ///
    /// # Errors
    ///
    /// [`UiError::UnknownNode`], or [`UiError::Unsupported`] for kinds without text.
    pub fn set_text(&mut self, id: NodeId, text: &str) -> UiResult<()> {
        match &mut self.require(id)?.kind {
            NodeKind::Label(label) => {
                if label.text == text {
                    return Ok(());
                }
                label.text = text.to_string();
            }
            NodeKind::TextBox(input) => input.set_value(text),
            _ => {
                return Err(UiError::Unsupported {
                    node: id,
                    capability: "text",
                })
            }
        }
        self.mark_dirty(id);
        Ok(())
    }

    /// Sets the interaction state. Returning a parent to normal resets its
    /// whole subtree.
    pub fn set_state(&mut self, id: NodeId, state: NodeState) {
        let Some(node) = self.nodes.get_mut(&id) else {
            return;
        };
        node.state = state;
        if state != NodeState::Normal {
            return;
        }
        let mut stack = node.layers.child_ids();
        while let Some(current) = stack.pop() {
            if let Some(child) = self.nodes.get_mut(&current) {
                child.state = NodeState::Normal;
                stack.extend(child.layers.child_ids());
            }
        }
    }

    /// Marks `id` and its subtree for layout and flags every ancestor.
    pub fn mark_dirty(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(&current) {
                node.dirty = true;
                if !node.layers.is_empty() {
                    node.child_dirty = true;
                    stack.extend(node.layers.child_ids());
                }
            }
        }

        let mut parent = self.nodes.get(&id).and_then(|n| n.parent);
        while let Some(current) = parent {
            let Some(node) = self.nodes.get_mut(&current) else {
                break;
            };
            if node.child_dirty {
                break;
            }
            node.child_dirty = true;
            parent = node.parent;
        }
    }

    /// Moves `id` so that its top-left sits at (`x`, `y`) relative to its
    /// parent, replacing every offset rule with absolute pixels.
    ///
    /// # Errors
    ///
    /// [`UiError::UnknownNode`], or [`UiError::Unsupported`] for the root.
    pub fn set_xy(&mut self, id: NodeId, x: f32, y: f32) -> UiResult<()> {
        let parent = self
            .require(id)?
            .parent
            .ok_or(UiError::Unsupported {
                node: id,
                capability: "positioning",
            })?;
        let padding = self
            .nodes
            .get(&parent)
            .map(|p| p.style.padding)
            .ok_or(UiError::UnknownNode(parent))?;
        let node = self.require(id)?;
        node.ruleset = node.ruleset.with_position(x - padding.left, y - padding.top);
        node.layout = node.ruleset.to_string();
        self.mark_dirty(id);
        Ok(())
    }

    /// Sets the content size, replacing every size rule with absolute pixels
    /// that include the node's padding and margin.
    ///
    /// # Errors
    ///
    /// [`UiError::UnknownNode`].
    pub fn set_content_size(&mut self, id: NodeId, width: f32, height: f32) -> UiResult<()> {
        let node = self.require(id)?;
        let outer_width = width + node.style.horizontal_insets();
        let outer_height = height + node.style.vertical_insets();
        node.ruleset = node.ruleset.with_size(outer_width, outer_height);
        node.layout = node.ruleset.to_string();
        self.mark_dirty(id);
        Ok(())
    }

    // ========================================================================
    // Deferred tasks
    // ========================================================================

    /// Queues `task` on `id` for the given phase, to first run after
    /// `phase_distance` further processing passes.
    ///
    /// Tasks reach the root's lists when the next pass visits the node. Layout
    /// tasks mark the node dirty so that a layout pass does visit it.
    ///
    /// # Errors
    ///
    /// [`UiError::UnknownNode`].
    pub fn defer<F>(&mut self, id: NodeId, phase: DeferredPhase, phase_distance: f32, task: F) -> UiResult<()>
    where
        F: FnMut(&mut UiTree) -> UiResult<bool> + 'static,
    {
        let seq = self.next_seq;
        let node = self.require(id)?;
        node.pending
            .list_mut(phase)
            .push(DeferredRunnable::new(seq, phase_distance, Box::new(task)));
        self.next_seq += 1;
        if phase == DeferredPhase::Layout {
            self.mark_dirty(id);
        }
        Ok(())
    }

    /// Runs `task` after the next layout pass that visits `id`.
    ///
    /// # Errors
    ///
    /// [`UiError::UnknownNode`].
    pub fn defer_until_layout<F>(&mut self, id: NodeId, task: F) -> UiResult<()>
    where
        F: FnMut(&mut UiTree) -> UiResult<bool> + 'static,
    {
        self.defer(id, DeferredPhase::Layout, 0.0, task)
    }

    /// Runs `task` after the next update pass.
    ///
    /// # Errors
    ///
    /// [`UiError::UnknownNode`].
    pub fn defer_until_update<F>(&mut self, id: NodeId, task: F) -> UiResult<()>
    where
        F: FnMut(&mut UiTree) -> UiResult<bool> + 'static,
    {
        self.defer(id, DeferredPhase::Update, 0.0, task)
    }

    /// Runs `task` after the next render pass.
    ///
    /// # Errors
    ///
    /// [`UiError::UnknownNode`].
    pub fn defer_until_render<F>(&mut self, id: NodeId, task: F) -> UiResult<()>
    where
        F: FnMut(&mut UiTree) -> UiResult<bool> + 'static,
    {
        self.defer(id, DeferredPhase::Render, 0.0, task)
    }

    /// Moves `tasks` into the root list for `phase`, flagging it for sorting.
    pub fn transfer_deferred(&mut self, phase: DeferredPhase, tasks: &mut Vec<DeferredRunnable>) {
        self.deferred_list_mut(phase).transfer(tasks);
    }

    pub(super) fn transfer_pending(&mut self, pending: &mut PendingDeferred) {
        self.deferred_layout.transfer(&mut pending.layout);
        self.deferred_update.transfer(&mut pending.update);
        self.deferred_render.transfer(&mut pending.render);
    }

    /// Runs layout-phase tasks.
    pub fn process_layout_deferred(&mut self) {
        self.process_deferred(DeferredPhase::Layout);
    }

    /// Runs update-phase tasks.
    pub fn process_update_deferred(&mut self) {
        self.process_deferred(DeferredPhase::Update);
    }

    /// Runs render-phase tasks.
    pub fn process_render_deferred(&mut self) {
        self.process_deferred(DeferredPhase::Render);
    }

    fn process_deferred(&mut self, phase: DeferredPhase) {
        let mut list = std::mem::take(self.deferred_list_mut(phase));
        list.process(self, phase);
        let transferred_meanwhile = std::mem::replace(self.deferred_list_mut(phase), list);
        self.deferred_list_mut(phase).merge(transferred_meanwhile);
    }

    fn deferred_list_mut(&mut self, phase: DeferredPhase) -> &mut DeferredList {
        match phase {
            DeferredPhase::Layout => &mut self.deferred_layout,
            DeferredPhase::Update => &mut self.deferred_update,
            DeferredPhase::Render => &mut self.deferred_render,
        }
    }

    /// Tasks still queued for `phase`, on the root and on nodes not yet visited.
    #[must_use]
    pub fn deferred_len(&self, phase: DeferredPhase) -> usize {
        let root_len = match phase {
            DeferredPhase::Layout => self.deferred_layout.len(),
            DeferredPhase::Update => self.deferred_update.len(),
            DeferredPhase::Render => self.deferred_render.len(),
        };
        let node_len: usize = self
            .nodes
            .values()
            .map(|n| match phase {
                DeferredPhase::Layout => n.pending.layout.len(),
                DeferredPhase::Update => n.pending.update.len(),
                DeferredPhase::Render => n.pending.render.len(),
            })
            .sum();
        root_len + node_len
    }

    /// Tasks queued for any phase.
    #[must_use]
    pub fn deferred_total(&self) -> usize {
        self.deferred_layout.len()
            + self.deferred_update.len()
            + self.deferred_render.len()
            + self.nodes.values().map(|n| n.pending.len()).sum::<usize>()
    }

    // ========================================================================
    // Frame passes
    // ========================================================================

    /// Resolves the breakpoint for a new size and forces a full relayout.
    ///
    /// `scale_x` is the container's horizontal render scale, applied to the
    /// thresholds according to the configured scale mode.
    pub fn on_resize(&mut self, width: f32, height: f32, scale_x: f32) -> ScreenSize {
        self.width = width;
        self.height = height;
        self.screen_size_scale = self.scale_mode.factor(scale_x);
        let screen_size = self.breakpoints.resolve(width, self.screen_size_scale);
        if screen_size != self.screen_size {
            tracing::debug!(
                "Screen size changed from {} to {} at {}x{}",
                self.screen_size,
                screen_size,
                width,
                height
            );
        }
        self.screen_size = screen_size;
        self.screen_size_changed = true;
        screen_size
    }

    /// Lays out every dirty node. Returns false when nothing needed layout.
    pub fn layout(&mut self, theme: &dyn Theme, input_source: InputSource, controller_type: ControllerType) -> bool {
        if !self.is_dirty() {
            return false;
        }
        let mut state = LayoutState::new(theme, self.screen_size, self.width)
            .with_screen_size_changed(self.screen_size_changed)
            .with_input(input_source, controller_type);
        let root = self.root;
        self.layout_node(root, &mut state);
        self.screen_size_changed = false;
        true
    }

    /// Recomputes absolute areas from the last layout and hands queued node
    /// tasks to the root lists.
    pub fn update(&mut self, _delta: f32) {
        let root = self.root;
        passes::update_subtree(self, root, (0.0, 0.0));
    }

    /// Moves every render area `alpha` of the way from the previous area to
    /// the current one.
    pub fn interpolate(&mut self, alpha: f32) {
        for node in self.nodes.values_mut() {
            node.geometry.render_area = node
                .geometry
                .previous_area
                .lerp(&node.geometry.outer_area, alpha);
        }
    }

    /// Draws the tree.
    pub fn render(&self, g: &mut dyn Graphics) {
        self.render_node(self.root, g);
    }

    pub(crate) fn layout_node(&mut self, id: NodeId, state: &mut LayoutState<'_>) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        let layout = node.capabilities().layout;
        layout(self, id, state);
    }

    pub(crate) fn render_node(&self, id: NodeId, g: &mut dyn Graphics) {
        if let Some(node) = self.nodes.get(&id) {
            (node.capabilities().render)(self, id, g);
        }
    }

    pub(crate) fn hit_test_node(&mut self, id: NodeId, x: f32, y: f32) -> Option<NodeId> {
        let hit_test = self.nodes.get(&id)?.capabilities().hit_test;
        hit_test(self, id, x, y)
    }

    pub(super) fn clear_id_cache(&self) {
        self.id_cache.borrow_mut().clear();
    }
}

impl std::fmt::Debug for UiTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiTree")
            .field("root", &self.root)
            .field("nodes", &self.nodes.len())
            .field("screen_size", &self.screen_size)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::UiTheme;

    fn tree() -> UiTree {
        UiTree::new("root", &UiConfig::default(), 800.0, 600.0).unwrap()
    }

    #[test]
    fn test_new_resolves_breakpoint() {
        let tree = tree();
        assert_eq!(tree.screen_size(), ScreenSize::Md);
        assert!(tree.is_dirty());
        assert_eq!(tree.find_by_element_id("root"), Some(tree.root()));
    }

    #[test]
    fn test_duplicate_element_id_rejected() {
        let mut tree = tree();
        let root = tree.root();
        tree.add_child(root, Element::div("a")).unwrap();
        let err = tree.add_child(root, Element::div("a")).unwrap_err();
        assert_eq!(err, UiError::DuplicateElementId("a".to_string()));
    }

    #[test]
    fn test_leaf_cannot_hold_children() {
        let mut tree = tree();
        let root = tree.root();
        let label = tree.add_child(root, Element::label("l", "hi")).unwrap();
        assert!(matches!(
            tree.add_child(label, Element::div("x")),
            Err(UiError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_bad_layout_rejected_at_attach() {
        let mut tree = tree();
        let root = tree.root();
        let err = tree
            .add_child(root, Element::div("a").layout("flex-column:xs-99c"))
            .unwrap_err();
        assert!(matches!(err, UiError::InvalidLayout { .. }));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_set_layout_keeps_previous_on_error() {
        let mut tree = tree();
        let root = tree.root();
        let a = tree.add_child(root, Element::div("a").layout("pixel:0,0,10,10")).unwrap();
        assert!(tree.set_layout(a, "pixel:1,2").is_err());
        assert_eq!(tree.node(a).unwrap().layout(), "pixel:0,0,10,10");
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut tree = tree();
        let root = tree.root();
        let a = tree.add_child(root, Element::div("a")).unwrap();
        let b = tree.add_child(a, Element::div("b")).unwrap();
        let removed = tree.remove(a).unwrap();
        assert_eq!(removed.len(), 2);
        assert!(!tree.contains(b));
        assert!(tree.remove(a).unwrap().is_empty());
        assert_eq!(tree.find_by_element_id("b"), None);
        assert!(tree.remove(root).is_err());
    }

    #[test]
    fn test_remove_prunes_navigation() {
        let mut tree = tree();
        let root = tree.root();
        let menu = tree.add_child(root, Element::container("menu")).unwrap();
        let ok = tree.add_child(menu, Element::button("ok")).unwrap();
        let cancel = tree.add_child(menu, Element::button("cancel")).unwrap();
        tree.add_to_navigation(menu, ok).unwrap();
        tree.add_to_navigation(menu, cancel).unwrap();
        let nav = tree.navigatable_mut(menu).unwrap();
        nav.set_hotkey(crate::input::Key::O, "ok");

        tree.remove(ok).unwrap();
        let nav = tree.navigatable(menu).unwrap();
        assert_eq!(nav.navigation().len(), 1);
        assert_eq!(nav.navigation().cursor(), Some("cancel"));
        assert_eq!(nav.hotkey(crate::input::Key::O), None);
    }

    #[test]
    fn test_navigation_accepts_only_attached_actionables() {
        let mut tree = tree();
        let root = tree.root();
        let menu = tree.add_child(root, Element::container("menu")).unwrap();
        let label = tree.add_child(menu, Element::label("title", "Menu")).unwrap();
        let ok = tree.add_child(menu, Element::button("ok")).unwrap();

        assert!(matches!(
            tree.add_to_navigation(menu, label),
            Err(UiError::Unsupported { capability: "actions", .. })
        ));
        assert!(matches!(
            tree.add_to_navigation(ok, ok),
            Err(UiError::Unsupported { capability: "navigation", .. })
        ));
        tree.remove(ok).unwrap();
        assert!(matches!(tree.add_to_navigation(menu, ok), Err(UiError::UnknownNode(_))));
        assert!(tree.navigatable(menu).unwrap().navigation().is_empty());
    }

    #[test]
    fn test_layout_clears_screen_size_changed() {
        let mut tree = tree();
        let theme = UiTheme::new("t");
        assert!(tree.layout(&theme, InputSource::KeyboardMouse, ControllerType::Unknown));
        assert!(!tree.is_dirty());
        assert!(!tree.layout(&theme, InputSource::KeyboardMouse, ControllerType::Unknown));
        tree.on_resize(1300.0, 600.0, 1.0);
        assert_eq!(tree.screen_size(), ScreenSize::Xl);
        assert!(tree.is_dirty());
    }

    #[test]
    fn test_scale_mode_applies_to_thresholds() {
        let config = UiConfig {
            screen_size_scale_mode: ScreenSizeScaleMode::Linear,
            ..UiConfig::default()
        };
        let mut tree = UiTree::new("root", &config, 800.0, 600.0).unwrap();
        assert_eq!(tree.on_resize(800.0, 600.0, 2.0), ScreenSize::Sm);
        assert_eq!(tree.screen_size_scale(), 2.0);
    }
}
