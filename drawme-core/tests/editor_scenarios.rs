//! Editor Scenario Tests
//!
//! End-to-end flows through the public editor API:
//! - Registry setup and drops
//! - Layer reordering
//! - Selection gestures and deletion
//! - Cascading deletes

use drawme_core::{
    BoxToolkit, CategoryId, ChangeEvent, Editor, EditorError, GestureStart, KeyModifiers,
    MemoryStore, PlacementId, Point, Transform,
};
use std::sync::{Arc, Mutex};

/// Editor with the "Icons" category (id "10") and a "Star" component in it.
fn icons_editor() -> (Editor<MemoryStore>, drawme_core::Component) {
    let mut editor = Editor::in_memory();
    editor
        .insert_category(CategoryId::from("10"), "Icons")
        .expect("create Icons");
    let star = editor
        .create_component("data:image/png;base64,AA==", "Star", CategoryId::from("10"))
        .expect("create Star");
    (editor, star)
}

fn place_three(editor: &mut Editor<MemoryStore>, star: &drawme_core::Component) -> Vec<PlacementId> {
    [0.0, 150.0, 300.0]
        .into_iter()
        .map(|x| {
            editor
                .drop_component(&star.id, Point::new(x, 0.0))
                .expect("drop")
                .id
        })
        .collect()
}

// ============================================================================
// Drops
// ============================================================================

#[test]
fn test_drop_star_on_fresh_canvas() {
    let (mut editor, star) = icons_editor();

    let placement = editor
        .drop_component(&star.id, Point::new(200.0, 150.0))
        .expect("drop");

    assert_eq!(editor.placements().len(), 1);
    assert_eq!(placement.transform, Transform::translation(Point::new(200.0, 150.0)));
    assert_eq!(placement.z_index, 1);
    assert!(placement.visible);
    assert!(placement.layer_name.starts_with("Star_"));
    assert_eq!(placement.component.category_id, CategoryId::from("10"));
}

#[test]
fn test_blank_component_name_gets_placeholder() {
    let mut editor = Editor::in_memory();
    let component = editor
        .create_component("data:,", "", CategoryId::uncategorized())
        .expect("create");
    assert!(!component.name.is_empty());
    assert!(component.name.starts_with("C-"));
}

#[test]
fn test_component_in_all_category_lands_in_uncategorized() {
    let mut editor = Editor::in_memory();
    let component = editor
        .create_component("data:,", "Leaf", CategoryId::all())
        .expect("create");
    assert_eq!(component.category_id, CategoryId::uncategorized());
}

#[test]
fn test_panel_follows_selected_category() {
    let (mut editor, _star) = icons_editor();
    editor
        .create_component("data:,", "Moon", CategoryId::uncategorized())
        .expect("create");

    assert_eq!(editor.panel_components().len(), 2);
    editor
        .select_category(Some(CategoryId::from("10")))
        .expect("select");
    let names: Vec<_> = editor.panel_components().iter().map(|c| c.name.clone()).collect();
    assert_eq!(names, vec!["Star".to_string()]);

    let snapshot = editor.snapshot();
    let counts: Vec<_> = snapshot.categories.iter().map(|c| c.count).collect();
    assert_eq!(counts, vec![2, 1, 1]);
    assert!(matches!(
        editor.select_category(Some(CategoryId::from("404"))),
        Err(EditorError::CategoryNotFound(_))
    ));
}

// ============================================================================
// Layers
// ============================================================================

#[test]
fn test_reverse_reorder_assigns_descending_z() {
    let (mut editor, star) = icons_editor();
    let ids = place_three(&mut editor, &star);

    // Layer list currently shows the newest first; reverse it.
    let mut order = editor.layers().ids();
    order.reverse();
    editor.reorder(&order).expect("reorder");

    let z: Vec<_> = order
        .iter()
        .map(|id| editor.placements().get(id).expect("exists").z_index)
        .collect();
    assert_eq!(z, vec![3, 2, 1]);
    assert_eq!(editor.layers().ids(), order);
    assert_eq!(order[0], ids[0]);
}

#[test]
fn test_hidden_layer_is_skipped_by_hit_testing() {
    let (mut editor, star) = icons_editor();
    let below = editor.drop_component(&star.id, Point::default()).expect("drop").id;
    let above = editor.drop_component(&star.id, Point::default()).expect("drop").id;
    editor.set_visible(&above, false).expect("hide");

    let mut toolkit = BoxToolkit::new();
    editor
        .pointer_down(&mut toolkit, Point::new(50.0, 50.0), KeyModifiers::default())
        .expect("down");
    editor
        .pointer_up(&mut toolkit, Point::new(50.0, 50.0))
        .expect("up");
    assert_eq!(editor.selection(), std::slice::from_ref(&below));

    // Still reachable from the layer list.
    editor.focus_layer(&above).expect("focus");
    assert_eq!(editor.selection(), &[below, above]);
}

// ============================================================================
// Selection and deletion
// ============================================================================

#[test]
fn test_delete_two_selected_placements() {
    let (mut editor, star) = icons_editor();
    let ids = place_three(&mut editor, &star);
    editor.select(&ids[0]).expect("select");
    editor.select(&ids[2]).expect("select");

    let removed = editor.delete_selection().expect("delete");

    assert_eq!(removed.len(), 2);
    assert_eq!(editor.placements().len(), 1);
    assert!(editor.selection().is_empty());
    assert!(editor.placements().contains(&ids[1]));
}

#[test]
fn test_group_drag_moves_every_member() {
    let (mut editor, star) = icons_editor();
    let ids = place_three(&mut editor, &star);
    let mut toolkit = BoxToolkit::new();

    // Shift-click two placements into the selection.
    for point in [Point::new(10.0, 10.0), Point::new(160.0, 10.0)] {
        editor
            .pointer_down(&mut toolkit, point, KeyModifiers::shift())
            .expect("down");
        editor.pointer_up(&mut toolkit, point).expect("up");
    }
    assert_eq!(editor.selection(), &ids[..2]);

    // Plain press on a member drags the whole group.
    let start = editor
        .pointer_down(&mut toolkit, Point::new(20.0, 20.0), KeyModifiers::default())
        .expect("down");
    assert_eq!(start, GestureStart::Transform);
    editor.pointer_move(&mut toolkit, Point::new(45.0, 60.0));
    editor
        .pointer_up(&mut toolkit, Point::new(45.0, 60.0))
        .expect("up");

    let origin = |id: &PlacementId| editor.placements().get(id).expect("exists").transform.origin();
    assert_eq!(origin(&ids[0]), Point::new(25.0, 40.0));
    assert_eq!(origin(&ids[1]), Point::new(175.0, 40.0));
    assert_eq!(origin(&ids[2]), Point::new(300.0, 0.0));
    assert_eq!(editor.selection().len(), 2);
}

#[test]
fn test_shift_rubber_band_extends_selection() {
    let (mut editor, star) = icons_editor();
    let ids = place_three(&mut editor, &star);
    editor.select(&ids[2]).expect("select");
    let mut toolkit = BoxToolkit::new();

    editor
        .pointer_down(&mut toolkit, Point::new(-5.0, 120.0), KeyModifiers::shift())
        .expect("down");
    editor.pointer_move(&mut toolkit, Point::new(50.0, 50.0));
    editor
        .pointer_up(&mut toolkit, Point::new(50.0, 50.0))
        .expect("up");

    assert_eq!(editor.selection(), &[ids[2].clone(), ids[0].clone()]);
}

#[test]
fn test_pointer_up_without_gesture_is_an_error() {
    let mut editor = Editor::in_memory();
    let mut toolkit = BoxToolkit::new();
    assert!(matches!(
        editor.pointer_up(&mut toolkit, Point::default()),
        Err(EditorError::NoGesture)
    ));
}

// ============================================================================
// Cascades and notifications
// ============================================================================

#[test]
fn test_category_delete_cascades_transitively() {
    let (mut editor, star) = icons_editor();
    place_three(&mut editor, &star);
    editor.select_all().expect("select all");

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let _subscription = editor.subscribe(move |event| sink.lock().expect("lock").push(event));

    editor
        .delete_category(&CategoryId::from("10"))
        .expect("delete");

    assert!(editor.registry().components().is_empty());
    assert!(editor.placements().is_empty());
    assert!(editor.selection().is_empty());
    let events = events.lock().expect("lock");
    assert!(events.contains(&ChangeEvent::Registry));
    assert!(events.contains(&ChangeEvent::Placements));
    assert!(events.contains(&ChangeEvent::Selection));
}
