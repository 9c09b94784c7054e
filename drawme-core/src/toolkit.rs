//! Contract with the transform-interaction toolkit.
//!
//! The toolkit owns pointer geometry: hit-testing rendered placements and
//! applying drag/scale/rotate frames to the elements of a gesture. The editor
//! only hands it the candidates and reads the final transform strings back
//! when the gesture ends.
//!
//! [`BoxToolkit`] is a small reference implementation working on axis-aligned
//! bounding boxes. Browser hosts plug in their own toolkit.

use std::collections::HashMap;

use crate::geometry::{Point, Rect};
use crate::options::CanvasOptions;
use crate::placement::{Placement, PlacementId, PlacementModel};
use crate::transform::Transform;

/// Base extent of a placement with no registered size.
pub const DEFAULT_EXTENT: (f64, f64) = (100.0, 100.0);

/// One incremental manipulation applied to every element of a gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Manipulation {
    /// Move by an offset.
    Drag {
        /// Horizontal offset.
        dx: f64,
        /// Vertical offset.
        dy: f64,
    },
    /// Multiply the scale factors.
    Scale {
        /// Horizontal factor.
        fx: f64,
        /// Vertical factor (ignored when the aspect ratio is locked).
        fy: f64,
    },
    /// Rotate clockwise.
    Rotate {
        /// Angle in degrees.
        degrees: f64,
    },
}

/// Services the editor needs from the interaction toolkit.
pub trait InteractionToolkit {
    /// Topmost candidate under `point`. Candidates come bottom to top.
    fn hit_test_point(&self, point: Point, candidates: &[&Placement]) -> Option<PlacementId>;

    /// Every candidate intersecting `rect`.
    fn hit_test_rect(&self, rect: Rect, candidates: &[&Placement]) -> Vec<PlacementId>;

    /// Start manipulating the given elements.
    fn begin_gesture(&mut self, targets: &[(PlacementId, Transform)], options: CanvasOptions);

    /// Apply one frame to every element of the gesture.
    fn apply(&mut self, manipulation: Manipulation);

    /// Finish the gesture and report each element's final CSS transform.
    fn end_gesture(&mut self) -> Vec<(PlacementId, String)>;
}

/// Reference toolkit using bounding boxes of a per-placement base extent.
#[derive(Debug, Clone, Default)]
pub struct BoxToolkit {
    extents: HashMap<PlacementId, (f64, f64)>,
    active: Vec<(PlacementId, Transform)>,
    options: CanvasOptions,
}

impl BoxToolkit {
    /// Create a toolkit where every placement is [`DEFAULT_EXTENT`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the rendered, untransformed size of a placement.
    pub fn set_extent(&mut self, id: PlacementId, width: f64, height: f64) {
        self.extents.insert(id, (width, height));
    }

    /// Forget the extents of placements that no longer exist.
    pub fn prune_extents(&mut self, live: &PlacementModel) {
        self.extents.retain(|id, _| live.contains(id));
    }

    /// Axis-aligned bounds of a placement after scale and rotation about its
    /// center.
    #[must_use]
    pub fn bounds(&self, placement: &Placement) -> Rect {
        let (base_w, base_h) = self
            .extents
            .get(&placement.id)
            .copied()
            .unwrap_or(DEFAULT_EXTENT);
        let t = &placement.transform;
        let w = base_w * t.scale_x.abs();
        let h = base_h * t.scale_y.abs();
        let (sin, cos) = t.rotation.to_radians().sin_cos();
        let rotated_w = w * cos.abs() + h * sin.abs();
        let rotated_h = w * sin.abs() + h * cos.abs();
        let center = Point::new(t.translate_x + base_w / 2.0, t.translate_y + base_h / 2.0);
        Rect::new(
            center.x - rotated_w / 2.0,
            center.y - rotated_h / 2.0,
            rotated_w,
            rotated_h,
        )
    }
}

impl InteractionToolkit for BoxToolkit {
    fn hit_test_point(&self, point: Point, candidates: &[&Placement]) -> Option<PlacementId> {
        candidates
            .iter()
            .rev()
            .find(|p| self.bounds(p).contains(point))
            .map(|p| p.id.clone())
    }

    fn hit_test_rect(&self, rect: Rect, candidates: &[&Placement]) -> Vec<PlacementId> {
        candidates
            .iter()
            .filter(|p| self.bounds(p).intersects(&rect))
            .map(|p| p.id.clone())
            .collect()
    }

    fn begin_gesture(&mut self, targets: &[(PlacementId, Transform)], options: CanvasOptions) {
        self.active = targets.to_vec();
        self.options = options;
    }

    fn apply(&mut self, manipulation: Manipulation) {
        let options = self.options;
        for (_, transform) in &mut self.active {
            *transform = match manipulation {
                Manipulation::Drag { dx, dy } if options.draggable => transform.translated(dx, dy),
                Manipulation::Scale { fx, .. } if options.scalable && options.keep_ratio => {
                    transform.scaled_by(fx, fx)
                }
                Manipulation::Scale { fx, fy } if options.scalable => transform.scaled_by(fx, fy),
                Manipulation::Rotate { degrees } if options.rotatable => {
                    transform.rotated_by(degrees)
                }
                _ => *transform,
            };
        }
    }

    fn end_gesture(&mut self) -> Vec<(PlacementId, String)> {
        std::mem::take(&mut self.active)
            .into_iter()
            .map(|(id, transform)| (id, transform.to_css()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{CategoryId, Component};
    use crate::placement::PlacementModel;

    fn model_with_two() -> (PlacementModel, PlacementId, PlacementId) {
        let mut model = PlacementModel::new();
        let component = Component::new("data:,", "Box", CategoryId::uncategorized());
        let low = model.place(&component, Point::new(0.0, 0.0)).id;
        let high = model.place(&component, Point::new(50.0, 50.0)).id;
        (model, low, high)
    }

    #[test]
    fn point_hit_prefers_topmost() {
        let (model, low, high) = model_with_two();
        let toolkit = BoxToolkit::new();
        let candidates = model.paint_order();

        assert_eq!(toolkit.hit_test_point(Point::new(75.0, 75.0), &candidates), Some(high));
        assert_eq!(toolkit.hit_test_point(Point::new(10.0, 10.0), &candidates), Some(low));
        assert_eq!(toolkit.hit_test_point(Point::new(500.0, 500.0), &candidates), None);
    }

    #[test]
    fn rect_hit_collects_intersections() {
        let (model, low, high) = model_with_two();
        let mut toolkit = BoxToolkit::new();
        toolkit.set_extent(low.clone(), 20.0, 20.0);
        let candidates = model.paint_order();

        let hits = toolkit.hit_test_rect(Rect::new(40.0, 40.0, 10.0, 10.0), &candidates);
        assert_eq!(hits, vec![high.clone()]);

        let hits = toolkit.hit_test_rect(Rect::new(0.0, 0.0, 200.0, 200.0), &candidates);
        assert_eq!(hits, vec![low, high]);
    }

    #[test]
    fn pruning_forgets_deleted_placements() {
        let (mut model, low, high) = model_with_two();
        let mut toolkit = BoxToolkit::new();
        toolkit.set_extent(low.clone(), 20.0, 20.0);
        toolkit.set_extent(high.clone(), 30.0, 30.0);

        let removed = model.delete_many(&[low]);
        toolkit.prune_extents(&model);

        assert_eq!(toolkit.extents.len(), 1);
        assert!(toolkit.extents.contains_key(&high));
        assert_eq!(toolkit.bounds(&removed[0]).width, DEFAULT_EXTENT.0);
    }

    #[test]
    fn gesture_applies_frames_per_element() {
        let mut toolkit = BoxToolkit::new();
        let a = PlacementId::from("a-1");
        let b = PlacementId::from("b-2");
        toolkit.begin_gesture(
            &[
                (a.clone(), Transform::translation(Point::new(0.0, 0.0))),
                (b.clone(), Transform::translation(Point::new(10.0, 10.0))),
            ],
            CanvasOptions::default(),
        );
        toolkit.apply(Manipulation::Drag { dx: 5.0, dy: 7.0 });
        toolkit.apply(Manipulation::Scale { fx: 2.0, fy: 3.0 });

        let result = toolkit.end_gesture();
        assert!(toolkit.end_gesture().is_empty());
        let expected_a = Transform::translation(Point::new(5.0, 7.0)).scaled_by(2.0, 2.0);
        let expected_b = Transform::translation(Point::new(15.0, 17.0)).scaled_by(2.0, 2.0);
        assert_eq!(result, vec![(a, expected_a.to_css()), (b, expected_b.to_css())]);
    }

    #[test]
    fn disabled_options_suppress_frames() {
        let mut toolkit = BoxToolkit::new();
        let a = PlacementId::from("a-1");
        let options = CanvasOptions {
            draggable: false,
            rotatable: false,
            keep_ratio: false,
            scalable: true,
        };
        toolkit.begin_gesture(&[(a.clone(), Transform::IDENTITY)], options);
        toolkit.apply(Manipulation::Drag { dx: 5.0, dy: 7.0 });
        toolkit.apply(Manipulation::Rotate { degrees: 45.0 });
        toolkit.apply(Manipulation::Scale { fx: 2.0, fy: 3.0 });

        let result = toolkit.end_gesture();
        assert_eq!(result, vec![(a, Transform::IDENTITY.scaled_by(2.0, 3.0).to_css())]);
    }

    #[test]
    fn rotated_bounds_grow() {
        let (mut model, low, _) = model_with_two();
        model
            .commit_transform(&[(low.clone(), Transform::IDENTITY.rotated_by(45.0))])
            .expect("commit");
        let toolkit = BoxToolkit::new();
        let placement = model.get(&low).expect("exists");
        let bounds = toolkit.bounds(placement);
        assert!(bounds.width > 141.0 && bounds.width < 142.0);
        assert!((bounds.center().x - 50.0).abs() < 1e-9);
    }
}
