//! Integration tests for layout, dirty propagation and the layout utilities.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use gridflow_ui::layout::{align_edge_to_edge, align_right_of, shrink_to_contents, snap_to, ShrinkCallback};
use gridflow_ui::style::Spacing;
use gridflow_ui::{
    CommandRecorder, Color, Element, HorizontalAlignment, NodeId, RenderCommand, ScreenSize, StyleRule, UiConfig,
    UiContainer, UiRuntime, UiTheme, VerticalAlignment, Visibility,
};

fn runtime(theme: UiTheme) -> Arc<UiRuntime> {
    Arc::new(UiRuntime::with_theme(Arc::new(theme)))
}

fn container(runtime: &Arc<UiRuntime>, width: f32) -> UiContainer {
    UiContainer::new(Arc::clone(runtime), "ui", UiConfig::default(), width, 600.0).unwrap()
}

fn frames(ui: &mut UiContainer, count: usize) {
    for _ in 0..count {
        ui.update(1.0 / 60.0);
        ui.interpolate(1.0);
    }
}

fn bounds(ui: &UiContainer, id: NodeId) -> (f32, f32, f32, f32) {
    let node = ui.tree().node(id).unwrap();
    (node.x(), node.y(), node.width(), node.height())
}

#[test]
fn test_auto_height_sums_wrapped_rows() {
    let runtime = runtime(UiTheme::new("t"));
    let mut ui = container(&runtime, 800.0);
    let panel = ui.add(Element::div("panel")).unwrap();
    let first = ui
        .tree_mut()
        .add_child(panel, Element::div("first").layout("flex-column:xs-12c,xs-30px"))
        .unwrap();
    let second = ui
        .tree_mut()
        .add_child(panel, Element::div("second").layout("flex-column:xs-12c,xs-40px"))
        .unwrap();

    frames(&mut ui, 1);
    assert_eq!(bounds(&ui, first), (0.0, 0.0, 800.0, 30.0));
    assert_eq!(bounds(&ui, second), (0.0, 30.0, 800.0, 40.0));
    assert_eq!(bounds(&ui, panel), (0.0, 0.0, 800.0, 70.0));
}

#[test]
fn test_columns_flow_side_by_side() {
    let runtime = runtime(UiTheme::new("t"));
    let mut ui = container(&runtime, 1200.0);
    let layout = "flex-column:xs-12c md-6c lg-4c,xs-10px";
    let ids: Vec<NodeId> = (0..3)
        .map(|i| ui.add(Element::div(format!("c{i}")).layout(layout)).unwrap())
        .collect();

    frames(&mut ui, 1);
    assert_eq!(ui.screen_size(), ScreenSize::Xl);
    assert_eq!(bounds(&ui, ids[0]), (0.0, 0.0, 400.0, 10.0));
    assert_eq!(bounds(&ui, ids[1]), (400.0, 0.0, 400.0, 10.0));
    assert_eq!(bounds(&ui, ids[2]), (800.0, 0.0, 400.0, 10.0));

    ui.set(800.0, 600.0);
    frames(&mut ui, 1);
    assert_eq!(ui.screen_size(), ScreenSize::Md);
    assert_eq!(bounds(&ui, ids[1]), (400.0, 0.0, 400.0, 10.0));
    assert_eq!(bounds(&ui, ids[2]), (0.0, 10.0, 400.0, 10.0));
}

#[test]
fn test_pixel_layout_is_exact_at_every_breakpoint() {
    let runtime = runtime(UiTheme::new("t"));
    let mut ui = container(&runtime, 400.0);
    let node = ui.add(Element::div("p").layout("pixel:10,20,100,50")).unwrap();

    for (width, expected) in [
        (400.0, ScreenSize::Xs),
        (600.0, ScreenSize::Sm),
        (800.0, ScreenSize::Md),
        (1000.0, ScreenSize::Lg),
        (1300.0, ScreenSize::Xl),
    ] {
        ui.set(width, 600.0);
        frames(&mut ui, 1);
        assert_eq!(ui.screen_size(), expected);
        assert_eq!(bounds(&ui, node), (10.0, 20.0, 100.0, 50.0));
        let area = ui.tree().node(node).unwrap().outer_area();
        assert_eq!((area.x, area.y, area.width, area.height), (10.0, 20.0, 100.0, 50.0));
    }
}

#[test]
fn test_hidden_rule_collapses_width() {
    let runtime = runtime(UiTheme::new("t"));
    let mut ui = container(&runtime, 400.0);
    let node = ui
        .add(Element::div("wide").layout("flex-column:xs-0c md-6c,xs-20px"))
        .unwrap();

    frames(&mut ui, 1);
    let n = ui.tree().node(node).unwrap();
    assert!(n.is_hidden_by_layout_rule());
    assert_eq!(n.width(), 0.0);

    ui.set(800.0, 600.0);
    frames(&mut ui, 1);
    let n = ui.tree().node(node).unwrap();
    assert!(!n.is_hidden_by_layout_rule());
    assert_eq!(n.width(), 400.0);
}

#[test]
fn test_padding_offsets_children() {
    let padded = StyleRule {
        padding: Spacing::uniform(5.0),
        ..StyleRule::EMPTY
    };
    let theme = UiTheme::new("t").with_style("panel", ScreenSize::Xs, padded);
    let runtime = runtime(theme);
    let mut ui = container(&runtime, 800.0);
    let panel = ui
        .add(Element::div("panel").style("panel").layout("pixel:0,0,200,100"))
        .unwrap();
    let child = ui
        .tree_mut()
        .add_child(panel, Element::div("child").layout("pixel:10,10,20,20"))
        .unwrap();

    frames(&mut ui, 1);
    assert_eq!(ui.tree().node(panel).unwrap().content_width(), 190.0);
    assert_eq!(bounds(&ui, child), (15.0, 15.0, 20.0, 20.0));
    let area = ui.tree().node(child).unwrap().outer_area();
    assert_eq!((area.x, area.y), (15.0, 15.0));
}

#[test]
fn test_dirty_propagation_is_local() {
    let runtime = runtime(UiTheme::new("t"));
    let mut ui = container(&runtime, 800.0);
    let left = ui.add(Element::div("left")).unwrap();
    let right = ui.add(Element::div("right")).unwrap();
    let label = ui.tree_mut().add_child(left, Element::label("text", "hello")).unwrap();
    let other = ui.tree_mut().add_child(right, Element::label("other", "x")).unwrap();
    frames(&mut ui, 1);
    assert!(!ui.tree().is_dirty());

    ui.tree_mut().set_text(label, "hello\nworld").unwrap();
    let tree = ui.tree();
    assert!(tree.node(label).unwrap().is_dirty());
    assert!(tree.node(left).unwrap().has_dirty_child());
    assert!(tree.node(tree.root()).unwrap().has_dirty_child());
    assert!(!tree.node(right).unwrap().is_dirty());
    assert!(!tree.node(other).unwrap().is_dirty());

    frames(&mut ui, 1);
    assert!(!ui.tree().is_dirty());
    assert!(ui.tree().node(label).unwrap().height() > 16.0);
}

#[test]
fn test_relayering_on_z_index_change() {
    let runtime = runtime(UiTheme::new("t"));
    let mut ui = container(&runtime, 800.0);
    let a = ui.add(Element::div("a").layout("pixel:0,0,10,10")).unwrap();
    let b = ui.add(Element::div("b").layout("pixel:0,0,10,10").z_index(1)).unwrap();
    frames(&mut ui, 1);
    let root = ui.tree().root();
    assert_eq!(ui.tree().children(root), vec![a, b]);

    ui.tree_mut().set_z_index(a, 5).unwrap();
    frames(&mut ui, 1);
    assert_eq!(ui.tree().children(root), vec![b, a]);
    assert_eq!(ui.tree().node(root).unwrap().z_index(), 0);
}

#[test]
fn test_render_draws_visible_backgrounds_in_layer_order() {
    let red = StyleRule {
        background: Some(Color::rgb(1.0, 0.0, 0.0)),
        ..StyleRule::EMPTY
    };
    let blue = StyleRule {
        background: Some(Color::rgb(0.0, 0.0, 1.0)),
        ..StyleRule::EMPTY
    };
    let theme = UiTheme::new("t")
        .with_style("red", ScreenSize::Xs, red)
        .with_style("blue", ScreenSize::Xs, blue);
    let runtime = runtime(theme);
    let mut ui = container(&runtime, 800.0);
    ui.add(Element::div("top").style("blue").layout("pixel:0,0,10,10").z_index(2))
        .unwrap();
    ui.add(Element::div("bottom").style("red").layout("pixel:0,0,10,10")).unwrap();
    ui.add(
        Element::div("ghost")
            .style("red")
            .layout("pixel:0,0,10,10")
            .visibility(Visibility::NoRender),
    )
    .unwrap();

    let mut g = CommandRecorder::new();
    ui.render(&mut g);
    assert!(g.commands().is_empty());

    frames(&mut ui, 1);
    ui.render(&mut g);
    let colors: Vec<Color> = g
        .commands()
        .iter()
        .filter_map(|c| match c {
            RenderCommand::Rect { color, .. } => Some(*color),
            _ => None,
        })
        .collect();
    assert_eq!(colors, vec![Color::rgb(1.0, 0.0, 0.0), Color::rgb(0.0, 0.0, 1.0)]);
}

#[test]
fn test_theme_change_relayouts_every_container() {
    let runtime = runtime(UiTheme::new("plain"));
    let mut a = container(&runtime, 800.0);
    let mut b = container(&runtime, 800.0);
    let in_a = a.add(Element::div("x").layout("pixel:0,0,100,10")).unwrap();
    let in_b = b.add(Element::div("x").layout("pixel:0,0,100,10")).unwrap();
    frames(&mut a, 1);
    frames(&mut b, 1);
    assert_eq!(a.tree().node(in_a).unwrap().content_width(), 100.0);

    let padded = StyleRule {
        padding: Spacing::uniform(10.0),
        ..StyleRule::EMPTY
    };
    runtime.set_theme(Arc::new(UiTheme::new("padded").with_style("default", ScreenSize::Xs, padded)));
    assert_eq!(a.tree().node(in_a).unwrap().content_width(), 100.0);
    frames(&mut a, 1);
    frames(&mut b, 1);
    assert_eq!(a.tree().node(in_a).unwrap().content_width(), 80.0);
    assert_eq!(b.tree().node(in_b).unwrap().content_width(), 80.0);
}

#[test]
fn test_shrink_waits_for_nested_shrinks() {
    let runtime = runtime(UiTheme::new("t"));
    let mut ui = container(&runtime, 800.0);
    let outer = ui.add(Element::div("outer")).unwrap();
    let first = ui.tree_mut().add_child(outer, Element::div("first")).unwrap();
    let second = ui.tree_mut().add_child(outer, Element::div("second")).unwrap();
    ui.tree_mut()
        .add_child(first, Element::label("a", "A").layout("flex-column:xs-100px,xs-30px"))
        .unwrap();
    ui.tree_mut()
        .add_child(second, Element::label("b", "B").layout("flex-column:xs-150px,xs-40px"))
        .unwrap();

    let settled = Rc::new(Cell::new(false));
    let flag = Rc::clone(&settled);
    let callback: ShrinkCallback = Box::new(move |_| {
        flag.set(true);
        Ok(())
    });
    shrink_to_contents(ui.tree_mut(), outer, true, Some(callback)).unwrap();

    frames(&mut ui, 1);
    assert!(!settled.get());
    frames(&mut ui, 4);
    assert!(settled.get());
    assert_eq!(bounds(&ui, first), (0.0, 0.0, 100.0, 30.0));
    assert_eq!(bounds(&ui, second), (100.0, 0.0, 150.0, 40.0));
    assert_eq!(bounds(&ui, outer), (0.0, 0.0, 250.0, 40.0));
    assert_eq!(ui.tree().deferred_total(), 0);
}

#[test]
fn test_shrink_settles_when_nested_content_is_removed() {
    let runtime = runtime(UiTheme::new("t"));
    let mut ui = container(&runtime, 800.0);
    let outer = ui.add(Element::div("outer")).unwrap();
    let first = ui.tree_mut().add_child(outer, Element::div("first")).unwrap();
    let label = ui
        .tree_mut()
        .add_child(first, Element::label("a", "A").layout("flex-column:xs-100px,xs-30px"))
        .unwrap();

    let settled = Rc::new(Cell::new(false));
    let flag = Rc::clone(&settled);
    let callback: ShrinkCallback = Box::new(move |_| {
        flag.set(true);
        Ok(())
    });
    shrink_to_contents(ui.tree_mut(), outer, true, Some(callback)).unwrap();
    ui.tree_mut().remove(label).unwrap();

    frames(&mut ui, 5);
    assert!(settled.get());
    assert_eq!(ui.tree().deferred_total(), 0);
}

#[test]
fn test_alignment_helpers_place_siblings() {
    let runtime = runtime(UiTheme::new("t"));
    let mut ui = container(&runtime, 800.0);
    let panel = ui.add(Element::div("panel").layout("pixel:0,0,800,600")).unwrap();
    let mut add = |id: &str, layout: &str| ui.tree_mut().add_child(panel, Element::div(id).layout(layout)).unwrap();
    let anchor = add("anchor", "pixel:200,100,100,50");
    let snapped = add("snapped", "pixel:0,0,20,10");
    let beside = add("beside", "pixel:0,0,20,10");
    let corner = add("corner", "pixel:0,0,20,10");

    snap_to(ui.tree_mut(), snapped, anchor).unwrap();
    align_right_of(ui.tree_mut(), beside, anchor, VerticalAlignment::Middle).unwrap();
    align_edge_to_edge(
        ui.tree_mut(),
        corner,
        anchor,
        HorizontalAlignment::Left,
        VerticalAlignment::Top,
    )
    .unwrap();

    frames(&mut ui, 3);
    assert_eq!(bounds(&ui, snapped), (200.0, 100.0, 20.0, 10.0));
    assert_eq!(bounds(&ui, beside), (300.0, 120.0, 20.0, 10.0));
    assert_eq!(bounds(&ui, corner), (180.0, 90.0, 20.0, 10.0));
    assert_eq!(ui.tree().node(snapped).unwrap().layout(), "pixel:200,100,20,10");
}
