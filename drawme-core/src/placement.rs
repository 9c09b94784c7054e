//! Canvas placements - instances of registered components on the surface.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::component::{Component, ComponentId};
use crate::geometry::Point;
use crate::transform::Transform;
use crate::{EditorError, EditorResult};

/// Unique identifier for a placement: `{component id}-{sequence}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlacementId(String);

impl PlacementId {
    fn for_component(component: &ComponentId, sequence: u64) -> Self {
        Self(format!("{component}-{sequence}"))
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The trailing sequence number, if the id has one.
    #[must_use]
    pub fn sequence(&self) -> Option<u64> {
        self.0
            .rsplit_once('-')
            .and_then(|(_, seq)| seq.parse().ok())
    }
}

/// First sequence number past every id in `ids`.
///
/// Sequences that cannot be incremented are ignored; `place` skips any id
/// that is already taken.
pub(crate) fn next_sequence<'a>(ids: impl IntoIterator<Item = &'a PlacementId>) -> u64 {
    ids.into_iter()
        .filter_map(PlacementId::sequence)
        .filter_map(|sequence| sequence.checked_add(1))
        .max()
        .unwrap_or(1)
}

/// Sequence following `sequence`, wrapping back to 1.
pub(crate) fn following(sequence: u64) -> u64 {
    sequence.checked_add(1).unwrap_or(1)
}

impl From<&str> for PlacementId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for PlacementId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for PlacementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One instance of a component positioned on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    /// Unique identifier.
    pub id: PlacementId,
    /// Copy of the component taken at drop time.
    pub component: Component,
    /// Position, rotation and scale on the surface.
    pub transform: Transform,
    /// Paint order; higher paints on top.
    pub z_index: i64,
    /// Hidden placements are not hit-tested and render transparent.
    pub visible: bool,
    /// Label shown in the layer list.
    pub layer_name: String,
}

/// The ordered collection of placements on the canvas.
///
/// List order and paint order are independent: new placements go to the front
/// of the list while `z_index` decides what paints on top.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementModel {
    placements: Vec<Placement>,
    next_sequence: u64,
}

impl Default for PlacementModel {
    fn default() -> Self {
        Self::new()
    }
}

impl PlacementModel {
    /// Create an empty model.
    #[must_use]
    pub fn new() -> Self {
        Self {
            placements: Vec::new(),
            next_sequence: 1,
        }
    }

    /// Rebuild a model from persisted placements.
    ///
    /// The sequence counter resumes past the highest persisted sequence so new
    /// ids never collide with restored ones.
    #[must_use]
    pub fn from_placements(placements: Vec<Placement>) -> Self {
        let next_sequence = next_sequence(placements.iter().map(|p| &p.id));
        Self {
            placements,
            next_sequence,
        }
    }

    /// Place a copy of `component` at `drop_point`, on top of everything else.
    pub fn place(&mut self, component: &Component, drop_point: Point) -> Placement {
        let (id, sequence) = loop {
            let sequence = self.next_sequence;
            self.next_sequence = following(sequence);
            let id = PlacementId::for_component(&component.id, sequence);
            if self.get(&id).is_none() {
                break (id, sequence);
            }
        };

        let placement = Placement {
            id,
            component: component.clone(),
            transform: Transform::translation(drop_point),
            z_index: self.max_z_index().saturating_add(1),
            visible: true,
            layer_name: format!("{}_{sequence}", component.name),
        };
        tracing::debug!(
            "Placed {} at ({}, {}) z={}",
            placement.id,
            drop_point.x,
            drop_point.y,
            placement.z_index
        );
        self.placements.insert(0, placement.clone());
        placement
    }

    /// Apply the final transforms of one gesture.
    ///
    /// Either every listed placement is updated or none is.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::PlacementNotFound`] if any id is unknown.
    pub fn commit_transform(&mut self, updates: &[(PlacementId, Transform)]) -> EditorResult<()> {
        if let Some((missing, _)) = updates.iter().find(|(id, _)| self.get(id).is_none()) {
            return Err(EditorError::PlacementNotFound(missing.to_string()));
        }
        let mut next = self.placements.clone();
        for (id, transform) in updates {
            if let Some(placement) = next.iter_mut().find(|p| &p.id == id) {
                placement.transform = *transform;
            }
        }
        self.placements = next;
        tracing::debug!("Committed transforms for {} placement(s)", updates.len());
        Ok(())
    }

    /// Parse and apply CSS transform strings reported at the end of a gesture.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidTransform`] or
    /// [`EditorError::PlacementNotFound`]; nothing is applied in either case.
    pub fn commit_css_transforms(&mut self, updates: &[(PlacementId, String)]) -> EditorResult<()> {
        let parsed = updates
            .iter()
            .map(|(id, css)| Transform::parse_css(css).map(|t| (id.clone(), t)))
            .collect::<EditorResult<Vec<_>>>()?;
        self.commit_transform(&parsed)
    }

    /// Adopt a new top-to-bottom order; the first id gets the highest z-index.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidOrder`] unless `order` is a permutation
    /// of every placement id.
    pub fn reorder(&mut self, order: &[PlacementId]) -> EditorResult<()> {
        if order.len() != self.placements.len() {
            return Err(EditorError::InvalidOrder(format!(
                "expected {} ids, got {}",
                self.placements.len(),
                order.len()
            )));
        }
        let mut seen = HashSet::with_capacity(order.len());
        if let Some(dup) = order.iter().find(|id| !seen.insert(*id)) {
            return Err(EditorError::InvalidOrder(format!("duplicate id {dup}")));
        }

        let count = order.len();
        let mut next = Vec::with_capacity(count);
        for (position, id) in order.iter().enumerate() {
            let mut placement = self
                .get(id)
                .cloned()
                .ok_or_else(|| EditorError::InvalidOrder(format!("unknown id {id}")))?;
            placement.z_index = i64::try_from(count - position)
                .map_err(|_| EditorError::InvalidOrder("too many placements".into()))?;
            next.push(placement);
        }
        self.placements = next;
        Ok(())
    }

    /// Show or hide a placement.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::PlacementNotFound`] for unknown ids.
    pub fn set_visible(&mut self, id: &PlacementId, visible: bool) -> EditorResult<()> {
        self.get_mut(id)?.visible = visible;
        Ok(())
    }

    /// Change a placement's layer name.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::PlacementNotFound`] for unknown ids.
    pub fn rename(&mut self, id: &PlacementId, layer_name: &str) -> EditorResult<()> {
        self.get_mut(id)?.layer_name = layer_name.to_string();
        Ok(())
    }

    /// Remove the listed placements; unknown ids are ignored.
    pub fn delete_many(&mut self, ids: &[PlacementId]) -> Vec<Placement> {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.placements)
            .into_iter()
            .partition(|p| ids.contains(&p.id));
        self.placements = kept;
        removed
    }

    /// Remove every placement derived from one of `components`.
    pub fn remove_by_component(&mut self, components: &[ComponentId]) -> Vec<PlacementId> {
        let ids: Vec<PlacementId> = self
            .placements
            .iter()
            .filter(|p| components.contains(&p.component.id))
            .map(|p| p.id.clone())
            .collect();
        self.delete_many(&ids);
        ids
    }

    /// Get a placement by id.
    #[must_use]
    pub fn get(&self, id: &PlacementId) -> Option<&Placement> {
        self.placements.iter().find(|p| &p.id == id)
    }

    fn get_mut(&mut self, id: &PlacementId) -> EditorResult<&mut Placement> {
        self.placements
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| EditorError::PlacementNotFound(id.to_string()))
    }

    /// Check if a placement exists.
    #[must_use]
    pub fn contains(&self, id: &PlacementId) -> bool {
        self.get(id).is_some()
    }

    /// Placements in list order.
    #[must_use]
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// Placements from bottom to top.
    #[must_use]
    pub fn paint_order(&self) -> Vec<&Placement> {
        let mut ordered: Vec<_> = self.placements.iter().collect();
        ordered.sort_by_key(|p| p.z_index);
        ordered
    }

    /// Highest z-index in use, 0 when empty.
    #[must_use]
    pub fn max_z_index(&self) -> i64 {
        self.placements.iter().map(|p| p.z_index).max().unwrap_or(0)
    }

    /// Number of placements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    /// Check if the canvas is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::CategoryId;

    fn star() -> Component {
        Component::new("data:,", "Star", CategoryId::from("10"))
    }

    #[test]
    fn place_creates_top_placement() {
        let mut model = PlacementModel::new();
        let placement = model.place(&star(), Point::new(200.0, 150.0));

        assert_eq!(model.len(), 1);
        assert_eq!(placement.transform, Transform::translation(Point::new(200.0, 150.0)));
        assert_eq!(placement.z_index, 1);
        assert!(placement.visible);
        assert!(placement.layer_name.starts_with("Star_"));
    }

    #[test]
    fn place_inserts_at_front_with_increasing_z() {
        let mut model = PlacementModel::new();
        let component = star();
        let first = model.place(&component, Point::default());
        let second = model.place(&component, Point::default());

        assert_ne!(first.id, second.id);
        assert_eq!(model.placements()[0].id, second.id);
        assert_eq!(second.z_index, first.z_index + 1);
    }

    #[test]
    fn sequence_resumes_after_reload() {
        let mut model = PlacementModel::new();
        let component = star();
        model.place(&component, Point::default());
        let second = model.place(&component, Point::default());

        let mut restored = PlacementModel::from_placements(model.placements().to_vec());
        let third = restored.place(&component, Point::default());
        assert_eq!(third.id.sequence(), Some(second.id.sequence().unwrap_or(0) + 1));
    }

    #[test]
    fn sequence_wraps_instead_of_overflowing() {
        let component = star();
        let mut model = PlacementModel::new();
        let mut last = model.place(&component, Point::default());
        last.id = PlacementId::for_component(&component.id, u64::MAX);
        let mut model = PlacementModel::from_placements(vec![last]);
        model.next_sequence = u64::MAX;

        let wrapped = model.place(&component, Point::default());
        assert_eq!(wrapped.id.sequence(), Some(1));
        assert_eq!(model.len(), 2);
        assert_eq!(next_sequence(model.placements().iter().map(|p| &p.id)), 2);
    }

    #[test]
    fn reorder_assigns_descending_z() {
        let mut model = PlacementModel::new();
        let component = star();
        let a = model.place(&component, Point::default()).id;
        let b = model.place(&component, Point::default()).id;
        let c = model.place(&component, Point::default()).id;

        let order = vec![a.clone(), b.clone(), c.clone()];
        model.reorder(&order).expect("reorder");

        let z: Vec<_> = model.placements().iter().map(|p| p.z_index).collect();
        assert_eq!(z, vec![3, 2, 1]);
        let ids: Vec<_> = model.placements().iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids, order);
    }

    #[test]
    fn reorder_rejects_partial_or_duplicate_orders() {
        let mut model = PlacementModel::new();
        let component = star();
        let a = model.place(&component, Point::default()).id;
        let b = model.place(&component, Point::default()).id;

        assert!(matches!(
            model.reorder(std::slice::from_ref(&a)),
            Err(EditorError::InvalidOrder(_))
        ));
        assert!(matches!(
            model.reorder(&[a.clone(), a.clone()]),
            Err(EditorError::InvalidOrder(_))
        ));
        assert!(matches!(
            model.reorder(&[a, PlacementId::from("nope")]),
            Err(EditorError::InvalidOrder(_))
        ));
        assert!(model.get(&b).is_some());
    }

    #[test]
    fn commit_transform_is_atomic() {
        let mut model = PlacementModel::new();
        let component = star();
        let a = model.place(&component, Point::default()).id;
        let before = model.clone();

        let moved = Transform::translation(Point::new(5.0, 5.0));
        let result = model.commit_transform(&[(a.clone(), moved), (PlacementId::from("ghost"), moved)]);
        assert!(matches!(result, Err(EditorError::PlacementNotFound(_))));
        assert_eq!(model, before);

        let result = model.commit_css_transforms(&[
            (a.clone(), "translate(9px, 9px)".to_string()),
            (a.clone(), "bogus".to_string()),
        ]);
        assert!(matches!(result, Err(EditorError::InvalidTransform(_))));
        assert_eq!(model, before);

        model.commit_transform(&[(a.clone(), moved)]).expect("commit");
        assert_eq!(model.get(&a).map(|p| p.transform), Some(moved));
    }

    #[test]
    fn delete_many_ignores_unknown_ids() {
        let mut model = PlacementModel::new();
        let component = star();
        let a = model.place(&component, Point::default()).id;
        let b = model.place(&component, Point::default()).id;

        let removed = model.delete_many(&[a.clone(), PlacementId::from("ghost")]);
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].id, a);
        assert!(model.contains(&b));
        assert_eq!(model.len(), 1);
    }

    #[test]
    fn visibility_and_rename() {
        let mut model = PlacementModel::new();
        let a = model.place(&star(), Point::default()).id;

        model.set_visible(&a, false).expect("hide");
        model.rename(&a, "Background star").expect("rename");
        let placement = model.get(&a).expect("exists");
        assert!(!placement.visible);
        assert_eq!(placement.layer_name, "Background star");

        let ghost = PlacementId::from("ghost");
        assert!(model.set_visible(&ghost, true).is_err());
        assert!(model.rename(&ghost, "x").is_err());
    }

    #[test]
    fn remove_by_component_cascades() {
        let mut model = PlacementModel::new();
        let star = star();
        let moon = Component::new("data:,", "Moon", CategoryId::uncategorized());
        model.place(&star, Point::default());
        model.place(&star, Point::default());
        let kept = model.place(&moon, Point::default()).id;

        let removed = model.remove_by_component(&[star.id.clone()]);
        assert_eq!(removed.len(), 2);
        assert_eq!(model.len(), 1);
        assert!(model.contains(&kept));
    }

    #[test]
    fn paint_order_follows_z_not_list() {
        let mut model = PlacementModel::new();
        let component = star();
        let a = model.place(&component, Point::default()).id;
        let b = model.place(&component, Point::default()).id;

        let bottom_to_top: Vec<_> = model.paint_order().iter().map(|p| p.id.clone()).collect();
        assert_eq!(bottom_to_top, vec![a, b]);
    }
}
