//! Pixel layout utilities built on deferred tasks.
//!
//! None of these operate on geometry that is still settling. Each one checks
//! that the nodes involved have been laid out and updated, and otherwise
//! queues itself on a later phase boundary and tries again.

use std::cell::Cell;
use std::rc::Rc;

use crate::error::{UiError, UiResult};
use crate::layout::LayoutRuleset;
use crate::render::{DeferredPhase, NodeId, RenderNode, UiTree};

/// Rounds to the nearest whole pixel, halves rounding up.
#[must_use]
pub fn round_px(value: f32) -> f32 {
    (value + 0.5).floor()
}

/// Horizontal anchor for alignment operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HorizontalAlignment {
    /// Left edges.
    #[default]
    Left,
    /// Centres.
    Center,
    /// Right edges.
    Right,
}

/// Vertical anchor for alignment operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerticalAlignment {
    /// Top edges.
    #[default]
    Top,
    /// Middles.
    Middle,
    /// Bottom edges.
    Bottom,
}

// ============================================================================
// Shrink to contents
// ============================================================================

/// Progress of a shrink-to-contents job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShrinkState {
    /// Not started; nested jobs have not been spawned yet.
    Pending,
    /// Waiting for nested parent elements to finish shrinking.
    WaitingOnChildren,
    /// Waiting until the node and its children have settled geometry.
    WaitingOnOwnLayout,
    /// Size applied; completion runs after the next layout.
    Settled,
}

/// Completion callback of a shrink job.
pub type ShrinkCallback = Box<dyn FnOnce(&mut UiTree) -> UiResult<()>>;

enum Step {
    Continue,
    Wait(NodeId, DeferredPhase),
    Done,
}

struct ShrinkJob {
    target: NodeId,
    recursive: bool,
    state: ShrinkState,
    open_children: Rc<Cell<usize>>,
    parent: Option<Rc<Cell<usize>>>,
    on_settled: Option<ShrinkCallback>,
}

impl ShrinkJob {
    fn new(target: NodeId, recursive: bool, on_settled: Option<ShrinkCallback>) -> Self {
        Self {
            target,
            recursive,
            state: ShrinkState::Pending,
            open_children: Rc::new(Cell::new(0)),
            parent: None,
            on_settled,
        }
    }

    fn step(&mut self, tree: &mut UiTree) -> UiResult<Step> {
        match self.state {
            ShrinkState::Pending => {
                self.state = ShrinkState::WaitingOnOwnLayout;
                if self.recursive {
                    for child in tree.children(self.target) {
                        let is_parent = tree.node(child).is_some_and(|n| n.capabilities().is_parent);
                        if !is_parent {
                            continue;
                        }
                        self.open_children.set(self.open_children.get() + 1);
                        self.state = ShrinkState::WaitingOnChildren;
                        let mut nested = Self::new(child, true, None);
                        nested.parent = Some(Rc::clone(&self.open_children));
                        nested.drive(tree)?;
                    }
                }
                Ok(Step::Continue)
            }
            ShrinkState::WaitingOnChildren => {
                if self.open_children.get() > 0 {
                    return Ok(Step::Wait(self.target, DeferredPhase::Update));
                }
                self.state = ShrinkState::WaitingOnOwnLayout;
                Ok(Step::Continue)
            }
            ShrinkState::WaitingOnOwnLayout => {
                let Some(node) = tree.node(self.target) else {
                    tracing::debug!("Shrink target {} was removed", self.target);
                    self.release();
                    return Ok(Step::Done);
                };
                let children = tree.children(self.target);
                let hook = children.last().copied().unwrap_or(self.target);
                if let Some(phase) = unsettled(node) {
                    return Ok(Step::Wait(hook, phase));
                }

                let mut max_x = 0.0_f32;
                let mut max_y = 0.0_f32;
                for child_id in children {
                    let Some(child) = tree.node(child_id) else {
                        continue;
                    };
                    if let Some(phase) = unsettled(child) {
                        return Ok(Step::Wait(child_id, phase));
                    }
                    max_x = max_x.max(child.x() + child.width());
                    max_y = max_y.max(child.y() + child.height());
                }
                let padding = node.style().padding;
                let width = (max_x - padding.left).max(0.0);
                let height = (max_y - padding.top).max(0.0);
                tracing::debug!("Shrinking {} to {}x{}", node.element_id(), width, height);
                tree.set_content_size(self.target, width, height)?;
                self.state = ShrinkState::Settled;
                Ok(Step::Wait(self.target, DeferredPhase::Layout))
            }
            ShrinkState::Settled => {
                self.release();
                if let Some(callback) = self.on_settled.take() {
                    callback(tree)?;
                }
                Ok(Step::Done)
            }
        }
    }

    fn release(&mut self) {
        if let Some(parent) = self.parent.take() {
            parent.set(parent.get().saturating_sub(1));
        }
    }

    /// Steps until the job finishes or has to wait for a phase boundary.
    fn drive(mut self, tree: &mut UiTree) -> UiResult<()> {
        loop {
            match self.step(tree)? {
                Step::Continue => {}
                Step::Wait(node, phase) => return self.park(tree, node, phase),
                Step::Done => return Ok(()),
            }
        }
    }

    fn park(self, tree: &mut UiTree, node: NodeId, phase: DeferredPhase) -> UiResult<()> {
        let mut job = Some(self);
        tree.defer(node, phase, 0.0, move |tree| {
            if let Some(job) = job.take() {
                job.drive(tree)?;
            }
            Ok(true)
        })
    }
}

// A job dropped with the node it was parked on still counts as finished for
// its outer job.
impl Drop for ShrinkJob {
    fn drop(&mut self) {
        self.release();
    }
}

/// Phase to wait for before `node`'s geometry can be read, if any.
fn unsettled(node: &RenderNode) -> Option<DeferredPhase> {
    if !node.initial_layout_occurred() || node.is_dirty() {
        Some(DeferredPhase::Layout)
    } else if !node.initial_update_occurred() {
        Some(DeferredPhase::Update)
    } else {
        None
    }
}

/// Resizes a parent so that its content box exactly fits its children.
///
/// With `recursive`, nested parent elements are shrunk first and the outer
/// size is only computed once every nested job has settled. `callback` runs
/// after the layout pass that applies the new size.
///
/// # Errors
///
/// [`UiError::UnknownNode`], or [`UiError::Unsupported`] if `id` cannot hold
/// children. Errors raised while the job runs later are logged by the
/// deferred queue.
pub fn shrink_to_contents(
    tree: &mut UiTree,
    id: NodeId,
    recursive: bool,
    callback: Option<ShrinkCallback>,
) -> UiResult<()> {
    let node = tree.node(id).ok_or(UiError::UnknownNode(id))?;
    if !node.capabilities().is_parent {
        return Err(UiError::Unsupported {
            node: id,
            capability: "children",
        });
    }
    let job = ShrinkJob::new(id, recursive, callback);
    if tree.phase().is_mutating() {
        return job.park(tree, id, DeferredPhase::Update);
    }
    job.drive(tree)
}

// ============================================================================
// Alignment
// ============================================================================

#[derive(Debug, Clone, Copy)]
enum Placement {
    Snap(HorizontalAlignment, VerticalAlignment),
    EdgeToEdge(HorizontalAlignment, VerticalAlignment),
    Below(HorizontalAlignment),
    Above(HorizontalAlignment),
    LeftOf(VerticalAlignment),
    RightOf(VerticalAlignment),
}

#[derive(Debug, Clone, Copy)]
struct Bounds {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl Bounds {
    fn of(node: &RenderNode) -> Self {
        Self {
            x: node.x(),
            y: node.y(),
            width: node.width(),
            height: node.height(),
        }
    }
}

impl Placement {
    /// Target top-left of `element` relative to the shared parent.
    fn resolve(self, element: Bounds, reference: Bounds) -> (f32, f32) {
        let inside_x = |h: HorizontalAlignment| match h {
            HorizontalAlignment::Left => reference.x,
            HorizontalAlignment::Center => reference.x + reference.width * 0.5 - element.width * 0.5,
            HorizontalAlignment::Right => reference.x + reference.width - element.width,
        };
        let inside_y = |v: VerticalAlignment| match v {
            VerticalAlignment::Top => reference.y,
            VerticalAlignment::Middle => reference.y + reference.height * 0.5 - element.height * 0.5,
            VerticalAlignment::Bottom => reference.y + reference.height - element.height,
        };
        let (x, y) = match self {
            Self::Snap(h, v) => (inside_x(h), inside_y(v)),
            Self::EdgeToEdge(h, v) => {
                let x = match h {
                    HorizontalAlignment::Left => reference.x - element.width,
                    HorizontalAlignment::Center => inside_x(h),
                    HorizontalAlignment::Right => reference.x + reference.width,
                };
                let y = match v {
                    VerticalAlignment::Top => reference.y - element.height,
                    VerticalAlignment::Middle => inside_y(v),
                    VerticalAlignment::Bottom => reference.y + reference.height,
                };
                (x, y)
            }
            Self::Below(h) => (inside_x(h), reference.y + reference.height),
            Self::Above(h) => (inside_x(h), reference.y - element.height),
            Self::LeftOf(v) => (reference.x - element.width, inside_y(v)),
            Self::RightOf(v) => (reference.x + reference.width, inside_y(v)),
        };
        (round_px(x), round_px(y))
    }
}

fn is_ready(node: &RenderNode) -> bool {
    node.initial_layout_occurred() && node.initial_update_occurred()
}

fn place(tree: &mut UiTree, element: NodeId, reference: NodeId, placement: Placement) -> UiResult<()> {
    let target = tree.node(element).ok_or(UiError::UnknownNode(element))?;
    let anchor = tree.node(reference).ok_or(UiError::UnknownNode(reference))?;
    // Flex parents add the flow position on top of any offset.
    let pixel_parent = target
        .parent()
        .and_then(|parent| tree.node(parent))
        .is_some_and(|parent| matches!(parent.ruleset(), LayoutRuleset::Pixel(_)));
    if !pixel_parent {
        return Err(UiError::Unsupported {
            node: element,
            capability: "pixel positioning",
        });
    }
    let ready = !tree.phase().is_mutating() && is_ready(target) && is_ready(anchor) && !anchor.is_dirty();
    if !ready {
        return tree.defer_until_update(reference, move |tree| {
            place(tree, element, reference, placement)?;
            Ok(true)
        });
    }
    let (x, y) = placement.resolve(Bounds::of(target), Bounds::of(anchor));
    tree.set_xy(element, x, y)
}

/// Moves `element` so that it sits inside `reference` at the given anchors.
///
/// Both nodes must share a parent with a `pixel:` layout. The move waits
/// until both have been laid out and updated and `reference` is clean.
///
/// # Errors
///
/// [`UiError::UnknownNode`] for either node, or [`UiError::Unsupported`]
/// when `element` is the root or its parent arranges children with a flex
/// layout.
pub fn align_to(
    tree: &mut UiTree,
    element: NodeId,
    reference: NodeId,
    horizontal: HorizontalAlignment,
    vertical: VerticalAlignment,
) -> UiResult<()> {
    place(tree, element, reference, Placement::Snap(horizontal, vertical))
}

/// Moves `element` onto the top-left corner of `reference`.
///
/// # Errors
///
/// See [`align_to`].
pub fn snap_to(tree: &mut UiTree, element: NodeId, reference: NodeId) -> UiResult<()> {
    align_to(
        tree,
        element,
        reference,
        HorizontalAlignment::Left,
        VerticalAlignment::Top,
    )
}

/// Places `element` directly under `reference`.
///
/// # Errors
///
/// See [`align_to`].
pub fn align_below(
    tree: &mut UiTree,
    element: NodeId,
    reference: NodeId,
    horizontal: HorizontalAlignment,
) -> UiResult<()> {
    place(tree, element, reference, Placement::Below(horizontal))
}

/// Places `element` directly above `reference`.
///
/// # Errors
///
/// See [`align_to`].
pub fn align_above(
    tree: &mut UiTree,
    element: NodeId,
    reference: NodeId,
    horizontal: HorizontalAlignment,
) -> UiResult<()> {
    place(tree, element, reference, Placement::Above(horizontal))
}

/// Places `element` directly left of `reference`.
///
/// # Errors
///
/// See [`align_to`].
pub fn align_left_of(
    tree: &mut UiTree,
    element: NodeId,
    reference: NodeId,
    vertical: VerticalAlignment,
) -> UiResult<()> {
    place(tree, element, reference, Placement::LeftOf(vertical))
}

/// Places `element` directly right of `reference`.
///
/// # Errors
///
/// See [`align_to`].
pub fn align_right_of(
    tree: &mut UiTree,
    element: NodeId,
    reference: NodeId,
    vertical: VerticalAlignment,
) -> UiResult<()> {
    place(tree, element, reference, Placement::RightOf(vertical))
}

/// Places `element` outside `reference` so that their edges touch. `Left`
/// and `Top` put it before the reference, `Right` and `Bottom` after it, and
/// `Center`/`Middle` centre it on that axis.
///
/// # Errors
///
/// See [`align_to`].
pub fn align_edge_to_edge(
    tree: &mut UiTree,
    element: NodeId,
    reference: NodeId,
    horizontal: HorizontalAlignment,
    vertical: VerticalAlignment,
) -> UiResult<()> {
    place(tree, element, reference, Placement::EdgeToEdge(horizontal, vertical))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UiConfig;
    use crate::element::Element;
    use crate::input::{ControllerType, InputSource};
    use crate::style::UiTheme;

    fn frame(tree: &mut UiTree, theme: &UiTheme) {
        tree.layout(theme, InputSource::KeyboardMouse, ControllerType::Unknown);
        tree.process_layout_deferred();
        tree.update(0.0);
        tree.process_update_deferred();
    }

    fn bounds(tree: &UiTree, id: NodeId) -> (f32, f32, f32, f32) {
        let node = tree.node(id).unwrap();
        (node.x(), node.y(), node.width(), node.height())
    }

    #[test]
    fn test_round_px_halves_up() {
        assert_eq!(round_px(1.5), 2.0);
        assert_eq!(round_px(1.49), 1.0);
        assert_eq!(round_px(-0.5), 0.0);
    }

    #[test]
    fn test_placement_nine_positions() {
        let element = Bounds { x: 0.0, y: 0.0, width: 10.0, height: 10.0 };
        let reference = Bounds { x: 100.0, y: 50.0, width: 40.0, height: 20.0 };
        let snap = |h, v| Placement::Snap(h, v).resolve(element, reference);
        assert_eq!(snap(HorizontalAlignment::Left, VerticalAlignment::Top), (100.0, 50.0));
        assert_eq!(snap(HorizontalAlignment::Center, VerticalAlignment::Middle), (115.0, 55.0));
        assert_eq!(snap(HorizontalAlignment::Right, VerticalAlignment::Bottom), (130.0, 60.0));

        let edge = |h, v| Placement::EdgeToEdge(h, v).resolve(element, reference);
        assert_eq!(edge(HorizontalAlignment::Left, VerticalAlignment::Top), (90.0, 40.0));
        assert_eq!(edge(HorizontalAlignment::Right, VerticalAlignment::Bottom), (140.0, 70.0));

        assert_eq!(Placement::Below(HorizontalAlignment::Left).resolve(element, reference), (100.0, 70.0));
        assert_eq!(Placement::Above(HorizontalAlignment::Right).resolve(element, reference), (130.0, 40.0));
        assert_eq!(Placement::LeftOf(VerticalAlignment::Top).resolve(element, reference), (90.0, 50.0));
        assert_eq!(Placement::RightOf(VerticalAlignment::Middle).resolve(element, reference), (140.0, 55.0));
    }

    #[test]
    fn test_alignment_rounds_to_whole_pixels() {
        let element = Bounds { x: 0.0, y: 0.0, width: 5.0, height: 5.0 };
        let reference = Bounds { x: 0.0, y: 0.0, width: 10.0, height: 10.0 };
        let (x, y) = Placement::Snap(HorizontalAlignment::Center, VerticalAlignment::Middle).resolve(element, reference);
        assert_eq!((x, y), (3.0, 3.0));
    }

    #[test]
    fn test_align_below_waits_for_layout() {
        let theme = UiTheme::new("t");
        let mut tree = UiTree::new("root", &UiConfig::default(), 800.0, 600.0).unwrap();
        let root = tree.root();
        let panel = tree.add_child(root, Element::div("panel").layout("pixel:0,0,800,600")).unwrap();
        let anchor = tree.add_child(panel, Element::div("anchor").layout("pixel:40,30,100,20")).unwrap();
        let popup = tree.add_child(panel, Element::div("popup").layout("pixel:0,0,50,10")).unwrap();

        align_below(&mut tree, popup, anchor, HorizontalAlignment::Right).unwrap();
        assert_eq!(bounds(&tree, popup).0, 0.0);

        frame(&mut tree, &theme);
        frame(&mut tree, &theme);
        assert_eq!(bounds(&tree, popup), (90.0, 50.0, 50.0, 10.0));
        assert_eq!(tree.deferred_total(), 0);
    }

    #[test]
    fn test_alignment_requires_pixel_parent() {
        let mut tree = UiTree::new("root", &UiConfig::default(), 800.0, 600.0).unwrap();
        let root = tree.root();
        let anchor = tree.add_child(root, Element::div("anchor").layout("pixel:40,30,100,20")).unwrap();
        let popup = tree.add_child(root, Element::div("popup").layout("pixel:0,0,50,10")).unwrap();

        assert!(matches!(
            align_below(&mut tree, popup, anchor, HorizontalAlignment::Left),
            Err(UiError::Unsupported { node, .. }) if node == popup
        ));
        assert!(matches!(
            snap_to(&mut tree, root, anchor),
            Err(UiError::Unsupported { node, .. }) if node == root
        ));
        assert_eq!(tree.deferred_total(), 0);
    }

    #[test]
    fn test_shrink_to_contents_fits_children() {
        let theme = UiTheme::new("t");
        let mut tree = UiTree::new("root", &UiConfig::default(), 800.0, 600.0).unwrap();
        let root = tree.root();
        let panel = tree.add_child(root, Element::div("panel").layout("pixel:0,0,400,400")).unwrap();
        tree.add_child(panel, Element::div("a").layout("pixel:10,10,30,20")).unwrap();
        tree.add_child(panel, Element::div("b").layout("pixel:50,5,20,60")).unwrap();

        let done = Rc::new(Cell::new(false));
        let flag = Rc::clone(&done);
        let callback: ShrinkCallback = Box::new(move |_| {
            flag.set(true);
            Ok(())
        });
        shrink_to_contents(&mut tree, panel, false, Some(callback)).unwrap();

        for _ in 0..4 {
            frame(&mut tree, &theme);
        }
        assert!(done.get());
        assert_eq!(bounds(&tree, panel), (0.0, 0.0, 70.0, 65.0));
        assert_eq!(tree.deferred_total(), 0);
    }

    #[test]
    fn test_shrink_rejects_leaf() {
        let mut tree = UiTree::new("root", &UiConfig::default(), 800.0, 600.0).unwrap();
        let root = tree.root();
        let label = tree.add_child(root, Element::label("l", "x")).unwrap();
        assert!(matches!(
            shrink_to_contents(&mut tree, label, false, None),
            Err(UiError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_shrink_of_removed_node_finishes() {
        let theme = UiTheme::new("t");
        let mut tree = UiTree::new("root", &UiConfig::default(), 800.0, 600.0).unwrap();
        let root = tree.root();
        let panel = tree.add_child(root, Element::div("panel")).unwrap();
        shrink_to_contents(&mut tree, panel, true, None).unwrap();
        tree.remove(panel).unwrap();
        for _ in 0..3 {
            frame(&mut tree, &theme);
        }
        assert_eq!(tree.deferred_total(), 0);
    }
}
