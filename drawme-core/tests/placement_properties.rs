//! Property tests for the placement model and editor invariants.

use std::collections::HashSet;

use drawme_core::{
    CategoryId, Component, Editor, PlacementId, PlacementModel, Point, Transform,
};
use proptest::prelude::*;

fn component(name: &str) -> Component {
    Component::new("data:,", name, CategoryId::uncategorized())
}

/// Model holding `count` placements spread over a few components.
fn model_with(count: usize) -> (PlacementModel, Vec<PlacementId>) {
    let components = [component("A"), component("B"), component("C")];
    let mut model = PlacementModel::new();
    let ids = (0..count)
        .map(|i| {
            model
                .place(&components[i % components.len()], Point::new(i as f64, 0.0))
                .id
        })
        .collect();
    (model, ids)
}

proptest! {
    #[test]
    fn prop_every_drop_gets_a_unique_id(picks in prop::collection::vec(0usize..3, 0..40)) {
        let components = [component("A"), component("B"), component("C")];
        let mut model = PlacementModel::new();
        let mut seen = HashSet::new();
        for pick in &picks {
            let placement = model.place(&components[*pick], Point::default());
            prop_assert!(seen.insert(placement.id.clone()), "duplicate id {}", placement.id);
        }
        prop_assert_eq!(model.len(), picks.len());
    }

    #[test]
    fn prop_reorder_yields_strictly_decreasing_z(
        order in (1usize..12).prop_flat_map(|n| Just((0..n).collect::<Vec<_>>()).prop_shuffle())
    ) {
        let (mut model, ids) = model_with(order.len());
        let new_order: Vec<_> = order.iter().map(|i| ids[*i].clone()).collect();
        model.reorder(&new_order).expect("reorder");

        let z: Vec<_> = new_order
            .iter()
            .map(|id| model.get(id).expect("exists").z_index)
            .collect();
        prop_assert!(z.windows(2).all(|w| w[0] > w[1]), "z not decreasing: {:?}", z);
        prop_assert_eq!(z[0], i64::try_from(new_order.len()).expect("fits"));
    }

    #[test]
    fn prop_commit_touches_only_listed_placements(
        count in 1usize..10,
        mask in prop::collection::vec(any::<bool>(), 10),
        dx in -500.0f64..500.0,
        angle in 0.0f64..360.0,
    ) {
        let (mut model, ids) = model_with(count);
        let before = model.clone();
        let updates: Vec<_> = ids
            .iter()
            .zip(&mask)
            .filter(|(_, chosen)| **chosen)
            .map(|(id, _)| (id.clone(), Transform::IDENTITY.translated(dx, 1.0).rotated_by(angle)))
            .collect();

        model.commit_transform(&updates).expect("commit");

        for id in &ids {
            let after = model.get(id).expect("exists");
            match updates.iter().find(|(u, _)| u == id) {
                Some((_, transform)) => prop_assert_eq!(after.transform, *transform),
                None => prop_assert_eq!(after, before.get(id).expect("exists")),
            }
        }
    }

    #[test]
    fn prop_delete_many_removes_exactly_those_ids(
        count in 0usize..10,
        mask in prop::collection::vec(any::<bool>(), 10),
        ghosts in 0usize..3,
    ) {
        let mut editor = Editor::in_memory();
        let leaf = editor
            .create_component("data:,", "Leaf", CategoryId::uncategorized())
            .expect("component");
        let ids: Vec<_> = (0..count)
            .map(|_| editor.drop_component(&leaf.id, Point::default()).expect("drop").id)
            .collect();
        let doomed: Vec<_> = ids
            .iter()
            .zip(&mask)
            .filter(|(_, chosen)| **chosen)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &doomed {
            editor.select(id).expect("select");
        }
        for n in 0..ghosts {
            // Unknown ids cannot be selected and leave the model alone.
            let ghost = PlacementId::from(format!("ghost-{n}"));
            prop_assert!(editor.select(&ghost).is_err());
        }

        let removed = editor.delete_selection().expect("delete");

        prop_assert_eq!(removed.len(), doomed.len());
        prop_assert_eq!(editor.placements().len(), count - doomed.len());
        prop_assert!(editor.selection().is_empty());
        for id in &ids {
            prop_assert_eq!(editor.placements().contains(id), !doomed.contains(id));
        }
    }

    #[test]
    fn prop_css_round_trip_is_lossless(
        tx in -10_000.0f64..10_000.0,
        ty in -10_000.0f64..10_000.0,
        rotation in -359.0f64..359.0,
        sx in 0.01f64..20.0,
        sy in 0.01f64..20.0,
    ) {
        let transform = Transform {
            translate_x: tx,
            translate_y: ty,
            rotation,
            scale_x: sx,
            scale_y: sy,
        };
        let parsed = Transform::parse_css(&transform.to_css()).expect("parse");
        prop_assert_eq!(parsed, transform);
    }
}

#[test]
fn delete_many_with_unknown_ids_is_noop_for_them() {
    let (mut model, ids) = model_with(3);
    let removed = model.delete_many(&[PlacementId::from("nobody-1"), ids[1].clone()]);
    assert_eq!(removed.len(), 1);
    assert_eq!(model.len(), 2);
}
