//! Layout, update and render passes.
//!
//! Layout is top-down. A parent resolves its width (and its height when the
//! height rule is fixed) before its children are laid out, positions each
//! z-layer of children, then resolves an auto height from the placed
//! children.

use crate::geometry::Rect;
use crate::layout::{ChildBox, LayoutState};
use crate::render::graphics::Graphics;
use crate::render::node::{RenderNode, Visibility};
use crate::render::{NodeId, UiTree};
use crate::style::{Color, StyleRule};

/// Root layout: the root is sized by the container and never dirty-skipped
/// while the breakpoint changed.
pub(crate) fn layout_root(tree: &mut UiTree, id: NodeId, state: &mut LayoutState<'_>) {
    if !tree.is_dirty() && !state.screen_size_changed {
        return;
    }
    if tree.debug_layout {
        tracing::debug!("Layout triggered at {} ({}x{})", state.screen_size, tree.width, tree.height);
    }
    tree.clear_id_cache();

    let (width, height) = (tree.width, tree.height);
    let Some(node) = tree.nodes.get_mut(&id) else {
        return;
    };
    node.style = StyleRule::EMPTY;
    node.geometry.rel_x = 0.0;
    node.geometry.rel_y = 0.0;
    node.geometry.content_width = width;
    node.geometry.content_height = height;
    node.geometry.outer_area = Rect::new(0.0, 0.0, width, height);
    node.geometry.inner_area = node.geometry.outer_area;

    let parent_width = state.parent_width;
    state.parent_width = width;
    layout_children(tree, id, state);
    state.parent_width = parent_width;

    arrange_children(tree, id);
    finish_layout(tree, id);
}

/// Layout of every parent kind below the root.
pub(crate) fn layout_parent(tree: &mut UiTree, id: NodeId, state: &mut LayoutState<'_>) {
    let Some(node) = tree.nodes.get(&id) else {
        return;
    };
    if !node.is_dirty() && !state.screen_size_changed {
        return;
    }
    let auto_height = node.ruleset.is_auto_height(state.screen_size);

    begin_layout(tree, id, state);
    let Some(node) = tree.nodes.get_mut(&id) else {
        return;
    };
    if !auto_height {
        node.geometry.content_height = fixed_content_height(node, state);
    }

    let parent_width = state.parent_width;
    state.parent_width = node.geometry.content_width;
    layout_children(tree, id, state);
    state.parent_width = parent_width;

    arrange_children(tree, id);

    let children_bottom = children_bottom(tree, id);
    let Some(node) = tree.nodes.get_mut(&id) else {
        return;
    };
    node.geometry.y_offset = node.ruleset.preferred_element_relative_y(state);
    if auto_height {
        node.geometry.content_height = if node.geometry.content_width <= 0.0 {
            0.0
        } else {
            let content = (children_bottom - node.style.padding.top).max(0.0);
            apply_min_height(&node.style, content)
        };
    }
    finish_layout(tree, id);
}

/// Layout of text leaves; an auto height comes from the text itself.
pub(crate) fn layout_leaf(tree: &mut UiTree, id: NodeId, state: &mut LayoutState<'_>) {
    let Some(node) = tree.nodes.get(&id) else {
        return;
    };
    if !node.is_dirty() && !state.screen_size_changed {
        return;
    }
    begin_layout(tree, id, state);
    let Some(node) = tree.nodes.get_mut(&id) else {
        return;
    };
    node.geometry.content_height = if node.ruleset.is_auto_height(state.screen_size) {
        if node.geometry.content_width <= 0.0 {
            0.0
        } else {
            apply_min_height(&node.style, node.kind.intrinsic_height())
        }
    } else {
        fixed_content_height(node, state)
    };
    node.geometry.y_offset = node.ruleset.preferred_element_relative_y(state);
    finish_layout(tree, id);
}

/// Style, z-index relayering, x offset and content width.
fn begin_layout(tree: &mut UiTree, id: NodeId, state: &LayoutState<'_>) {
    let Some(node) = tree.nodes.get_mut(&id) else {
        return;
    };
    node.style = state
        .theme
        .style_rule(&node.style_id, state.screen_size)
        .clone();

    let relayer = (node.z_index != node.layer_z).then_some((node.parent, node.layer_z, node.z_index));
    node.layer_z = node.z_index;
    node.geometry.x_offset = node.ruleset.preferred_element_relative_x(state);
    node.geometry.content_width = content_width(node, state);

    if let Some((Some(parent), old_z, new_z)) = relayer {
        if let Some(parent) = tree.nodes.get_mut(&parent) {
            parent.layers.remove(old_z, id);
            parent.layers.insert(new_z, id);
        }
    }
}

fn content_width(node: &mut RenderNode, state: &LayoutState<'_>) -> f32 {
    node.hidden_by_input_source = node.ruleset.is_hidden_by_input_source(state);
    if node.hidden_by_input_source {
        node.hidden_by_layout_rule = false;
        return 0.0;
    }
    let rule = node.ruleset.preferred_element_width(state);
    node.hidden_by_layout_rule = rule <= 0.0;
    if node.hidden_by_layout_rule {
        return 0.0;
    }
    let insets = node.style.horizontal_insets();
    let outer = if node.style.min_width > 0.0 {
        rule.max(node.style.min_width)
    } else {
        rule
    };
    node.style.rounding.apply((outer - insets).max(0.0))
}

fn fixed_content_height(node: &RenderNode, state: &LayoutState<'_>) -> f32 {
    if node.geometry.content_width <= 0.0 {
        return 0.0;
    }
    let rule = node.ruleset.preferred_element_height(state);
    apply_min_height(&node.style, (rule - node.style.vertical_insets()).max(0.0))
}

fn apply_min_height(style: &StyleRule, content: f32) -> f32 {
    let insets = style.vertical_insets();
    if style.min_height > 0.0 && content + insets < style.min_height {
        return style.min_height - insets;
    }
    content
}

fn layout_children(tree: &mut UiTree, id: NodeId, state: &mut LayoutState<'_>) {
    let children = tree.children(id);
    for child in children {
        tree.layout_node(child, state);
    }
}

/// Positions each z-layer of `id`'s children as its own flow.
fn arrange_children(tree: &mut UiTree, id: NodeId) {
    let Some(node) = tree.nodes.get(&id) else {
        return;
    };
    let origin = (node.style.padding.left, node.style.padding.top);
    let content_width = node.geometry.content_width;

    let mut placements: Vec<(NodeId, ChildBox)> = Vec::with_capacity(node.layers.len());
    for layer in node.layers.ascending() {
        let start = placements.len();
        for &child_id in layer.children() {
            if let Some(child) = tree.nodes.get(&child_id) {
                let child_box = ChildBox::new(
                    child.geometry.x_offset,
                    child.geometry.y_offset,
                    child.width().max(0.0),
                    child.height().max(0.0),
                    child.is_included_in_layout(),
                );
                placements.push((child_id, child_box));
            }
        }
        let mut boxes: Vec<ChildBox> = placements[start..].iter().map(|(_, b)| *b).collect();
        node.ruleset.arrange(origin, content_width, &mut boxes);
        for (placement, placed) in placements[start..].iter_mut().zip(boxes) {
            placement.1 = placed;
        }
    }

    for (child_id, placed) in placements {
        if let Some(child) = tree.nodes.get_mut(&child_id) {
            child.geometry.rel_x = placed.x;
            child.geometry.rel_y = placed.y;
        }
    }
}

/// Lowest edge of the included children, relative to the parent's outer box.
fn children_bottom(tree: &UiTree, id: NodeId) -> f32 {
    tree.children(id)
        .iter()
        .filter_map(|c| tree.nodes.get(c))
        .filter(|c| c.is_included_in_layout())
        .map(|c| c.geometry.rel_y + c.height())
        .fold(0.0, f32::max)
}

fn finish_layout(tree: &mut UiTree, id: NodeId) {
    let Some(node) = tree.nodes.get_mut(&id) else {
        return;
    };
    node.dirty = false;
    node.child_dirty = false;
    node.initial_layout = true;
    let mut pending = std::mem::take(&mut node.pending.layout);
    tree.transfer_deferred(crate::render::DeferredPhase::Layout, &mut pending);
}

/// Recomputes absolute areas below `id`; `origin` is the parent's outer
/// top-left.
pub(crate) fn update_subtree(tree: &mut UiTree, id: NodeId, origin: (f32, f32)) {
    let Some(node) = tree.nodes.get_mut(&id) else {
        return;
    };
    let style = &node.style;
    let x = origin.0 + node.geometry.rel_x + style.margin.left;
    let y = origin.1 + node.geometry.rel_y + style.margin.top;
    let outer = if node.initial_layout && node.width() > 0.0 {
        Rect::new(
            x,
            y,
            node.geometry.content_width + style.padding.horizontal(),
            node.geometry.content_height + style.padding.vertical(),
        )
    } else {
        Rect::new(x, y, 0.0, 0.0)
    };
    let inner = outer.inset(
        style.padding.top,
        style.padding.right,
        style.padding.bottom,
        style.padding.left,
    );

    let geometry = &mut node.geometry;
    geometry.previous_area = if node.initial_update { geometry.outer_area } else { outer };
    geometry.outer_area = outer;
    geometry.inner_area = inner;
    if !node.initial_update {
        geometry.render_area = outer;
    }
    node.initial_update = node.initial_layout;

    let mut pending = std::mem::take(&mut node.pending);
    let children = node.layers.child_ids();
    tree.transfer_pending(&mut pending);

    for child in children {
        update_subtree(tree, child, (outer.x, outer.y));
    }
}

/// Whether `node` should be drawn at all.
fn is_drawn(node: &RenderNode) -> bool {
    node.visibility == Visibility::Visible && node.is_included_in_layout() && node.initial_update
}

fn draw_background(node: &RenderNode, g: &mut dyn Graphics) {
    if let Some(color) = node.style.background_for(node.state) {
        g.fill_rect(inner_render_area(node), color);
    }
}

fn inner_render_area(node: &RenderNode) -> Rect {
    let padding = node.style.padding;
    node.geometry
        .render_area
        .inset(padding.top, padding.right, padding.bottom, padding.left)
}

/// Background, then every layer from lowest to highest, optionally clipped.
pub(crate) fn render_parent(tree: &UiTree, id: NodeId, g: &mut dyn Graphics) {
    let Some(node) = tree.node(id) else {
        return;
    };
    if !is_drawn(node) {
        return;
    }
    let restore = node.clip_overflow.then(|| {
        let previous = g.peek_clip();
        let area = node.geometry.render_area;
        let clip = match previous {
            Some(previous) => previous.intersection(&area).unwrap_or(Rect::new(area.x, area.y, 0.0, 0.0)),
            None => area,
        };
        g.set_clip(Some(clip));
        previous
    });

    draw_background(node, g);
    for layer in node.layers.ascending() {
        for &child in layer.children() {
            tree.render_node(child, g);
        }
    }

    if let Some(previous) = restore {
        g.set_clip(previous);
    }
}

/// Background and text of a label or text box.
pub(crate) fn render_text(tree: &UiTree, id: NodeId, g: &mut dyn Graphics) {
    let Some(node) = tree.node(id) else {
        return;
    };
    if !is_drawn(node) {
        return;
    }
    draw_background(node, g);
    if let Some(text) = node.kind.text() {
        let area = inner_render_area(node);
        g.draw_text(text, area.x, area.y, node.style.text_color.unwrap_or(Color::WHITE));
    }
}
