//! Integration tests for deferred task scheduling across frames.

use std::cell::RefCell;
use std::rc::Rc;

use gridflow_ui::input::{ControllerType, InputSource};
use gridflow_ui::{DeferredPhase, Element, UiConfig, UiError, UiResult, UiTheme, UiTree};

type Log = Rc<RefCell<Vec<&'static str>>>;

fn tree() -> UiTree {
    UiTree::new("root", &UiConfig::default(), 800.0, 600.0).unwrap()
}

/// One frame without a container: layout, update and render boundaries.
fn frame(tree: &mut UiTree, theme: &UiTheme) {
    tree.layout(theme, InputSource::KeyboardMouse, ControllerType::Unknown);
    tree.process_layout_deferred();
    tree.update(0.016);
    tree.process_update_deferred();
    tree.process_render_deferred();
}

fn push(log: &Log, entry: &'static str) -> impl FnMut(&mut UiTree) -> UiResult<bool> + 'static {
    let log = Rc::clone(log);
    move |_: &mut UiTree| {
        log.borrow_mut().push(entry);
        Ok(true)
    }
}

#[test]
fn test_lower_distance_runs_first_then_oldest() {
    let theme = UiTheme::new("t");
    let mut tree = tree();
    let root = tree.root();
    let log: Log = Rc::default();

    tree.defer_until_update(root, push(&log, "a")).unwrap();
    tree.defer(root, DeferredPhase::Update, 1.0, push(&log, "b")).unwrap();
    tree.defer_until_update(root, push(&log, "c")).unwrap();

    frame(&mut tree, &theme);
    assert_eq!(*log.borrow(), vec!["a", "c"]);
    assert_eq!(tree.deferred_len(DeferredPhase::Update), 1);

    frame(&mut tree, &theme);
    assert_eq!(*log.borrow(), vec!["a", "c", "b"]);
    assert_eq!(tree.deferred_total(), 0);
}

#[test]
fn test_task_queued_while_processing_runs_next_pass() {
    let theme = UiTheme::new("t");
    let mut tree = tree();
    let root = tree.root();
    let log: Log = Rc::default();

    let inner_log = Rc::clone(&log);
    tree.defer_until_update(root, move |tree| {
        inner_log.borrow_mut().push("outer");
        let root = tree.root();
        tree.defer_until_update(root, push(&inner_log, "inner"))?;
        Ok(true)
    })
    .unwrap();

    frame(&mut tree, &theme);
    assert_eq!(*log.borrow(), vec!["outer"]);
    frame(&mut tree, &theme);
    assert_eq!(*log.borrow(), vec!["outer", "inner"]);
}

#[test]
fn test_unfinished_task_stays_queued_without_livelock() {
    let theme = UiTheme::new("t");
    let mut tree = tree();
    let root = tree.root();
    let visits = Rc::new(RefCell::new(0_u32));

    let counter = Rc::clone(&visits);
    tree.defer_until_update(root, move |_| {
        *counter.borrow_mut() += 1;
        Ok(false)
    })
    .unwrap();

    for _ in 0..10 {
        frame(&mut tree, &theme);
    }
    assert_eq!(*visits.borrow(), 10);
    assert_eq!(tree.deferred_len(DeferredPhase::Update), 1);
}

#[test]
fn test_failing_task_is_dropped() {
    let theme = UiTheme::new("t");
    let mut tree = tree();
    let root = tree.root();
    let log: Log = Rc::default();

    tree.defer_until_render(root, |_| Err(UiError::Deferred("boom".to_string())))
        .unwrap();
    tree.defer_until_render(root, push(&log, "after")).unwrap();

    frame(&mut tree, &theme);
    assert_eq!(*log.borrow(), vec!["after"]);
    assert_eq!(tree.deferred_total(), 0);
}

#[test]
fn test_layout_deferral_forces_layout_of_node() {
    let theme = UiTheme::new("t");
    let mut tree = tree();
    let root = tree.root();
    let panel = tree.add_child(root, Element::div("panel")).unwrap();
    frame(&mut tree, &theme);
    assert!(!tree.is_dirty());

    let log: Log = Rc::default();
    tree.defer_until_layout(panel, push(&log, "laid out")).unwrap();
    assert!(tree.node(panel).unwrap().is_dirty());
    assert_eq!(tree.deferred_len(DeferredPhase::Layout), 1);

    frame(&mut tree, &theme);
    assert_eq!(*log.borrow(), vec!["laid out"]);
}

#[test]
fn test_tasks_on_removed_nodes_are_discarded() {
    let theme = UiTheme::new("t");
    let mut tree = tree();
    let root = tree.root();
    let panel = tree.add_child(root, Element::div("panel")).unwrap();
    let log: Log = Rc::default();
    tree.defer_until_update(panel, push(&log, "never")).unwrap();
    tree.remove(panel).unwrap();

    frame(&mut tree, &theme);
    assert!(log.borrow().is_empty());
    assert!(matches!(
        tree.defer_until_update(panel, push(&log, "never")),
        Err(UiError::UnknownNode(_))
    ));
}

#[test]
fn test_equal_distances_run_in_submission_order() {
    let theme = UiTheme::new("t");
    let mut tree = tree();
    let root = tree.root();
    let log: Log = Rc::default();

    tree.defer(root, DeferredPhase::Update, 2.0, push(&log, "x")).unwrap();
    tree.defer(root, DeferredPhase::Update, 1.0, push(&log, "y")).unwrap();
    tree.defer(root, DeferredPhase::Update, 1.0, push(&log, "z")).unwrap();

    frame(&mut tree, &theme);
    assert!(log.borrow().is_empty());
    frame(&mut tree, &theme);
    assert_eq!(*log.borrow(), vec!["y", "z"]);
    frame(&mut tree, &theme);
    assert_eq!(*log.borrow(), vec!["y", "z", "x"]);
    assert_eq!(tree.deferred_total(), 0);
}
