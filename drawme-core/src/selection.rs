//! Selection set and the pointer-gesture state machine.
//!
//! ## Transitions
//!
//! | From | Input | To |
//! |------|-------|----|
//! | `Idle` | down on empty canvas | `RubberBandSelecting` |
//! | `Idle` | down on a selected element | `DraggingExistingSelection` → `Transforming` |
//! | `Idle` | down on an unselected element | `Transforming` (selection = element, or toggled with shift) |
//! | `Transforming` | up | `Idle` (transforms committed) |
//! | `RubberBandSelecting` | up | `Idle` (selection = band hits) |
//!
//! Only one gesture may be in flight; a press while not `Idle` is rejected.

use crate::event::KeyModifiers;
use crate::geometry::{Point, Rect};
use crate::placement::PlacementId;
use crate::toolkit::Manipulation;
use crate::{EditorError, EditorResult};

/// Current gesture.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureState {
    /// No gesture.
    #[default]
    Idle,
    /// Dragging a band on empty canvas.
    RubberBandSelecting {
        /// Where the press happened.
        origin: Point,
        /// Latest pointer position.
        current: Point,
        /// Band hits are added to the existing selection.
        additive: bool,
    },
    /// The press landed on an element that was already selected.
    DraggingExistingSelection {
        /// Where the press happened.
        origin: Point,
    },
    /// The selection is being manipulated.
    Transforming {
        /// Pointer position of the previous frame.
        last: Point,
    },
}

/// What the press started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureStart {
    /// A rubber-band selection.
    RubberBand,
    /// A manipulation of the current selection.
    Transform,
    /// Nothing (a shift-click emptied the selection).
    None,
}

/// How the gesture ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEnd {
    /// The rubber band covered `rect`.
    RubberBand {
        /// Normalized band.
        rect: Rect,
        /// Hits extend the selection instead of replacing it.
        additive: bool,
    },
    /// A manipulation finished; its result must be committed.
    Transform,
}

/// Tracks the selected placements and the gesture in flight.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionController {
    selected: Vec<PlacementId>,
    state: GestureState,
}

impl SelectionController {
    /// Create a controller with nothing selected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current gesture.
    #[must_use]
    pub fn state(&self) -> GestureState {
        self.state
    }

    /// Whether no gesture is in flight.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.state == GestureState::Idle
    }

    /// The band being dragged, if any.
    #[must_use]
    pub fn rubber_band(&self) -> Option<Rect> {
        match self.state {
            GestureState::RubberBandSelecting {
                origin, current, ..
            } => Some(Rect::from_corners(origin, current)),
            _ => None,
        }
    }

    /// Handle a press. `hit` is the element under the pointer, if any.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::GestureInProgress`] unless idle.
    pub fn pointer_down(
        &mut self,
        point: Point,
        hit: Option<&PlacementId>,
        modifiers: KeyModifiers,
    ) -> EditorResult<GestureStart> {
        if !self.is_idle() {
            return Err(EditorError::GestureInProgress);
        }

        let Some(id) = hit else {
            if !modifiers.shift {
                self.selected.clear();
            }
            self.state = GestureState::RubberBandSelecting {
                origin: point,
                current: point,
                additive: modifiers.shift,
            };
            return Ok(GestureStart::RubberBand);
        };

        if modifiers.shift {
            self.toggle(id);
            if self.selected.is_empty() {
                return Ok(GestureStart::None);
            }
            self.state = GestureState::Transforming { last: point };
        } else if self.contains(id) {
            // Grabbing any member drags the whole group.
            self.state = GestureState::DraggingExistingSelection { origin: point };
        } else {
            self.selected = vec![id.clone()];
            self.state = GestureState::Transforming { last: point };
        }
        Ok(GestureStart::Transform)
    }

    /// Promote a grab of the existing selection into a running manipulation.
    pub fn start_transforming(&mut self) {
        if let GestureState::DraggingExistingSelection { origin } = self.state {
            self.state = GestureState::Transforming { last: origin };
        }
    }

    /// Handle pointer movement; yields the drag frame for a manipulation.
    pub fn pointer_move(&mut self, point: Point) -> Option<Manipulation> {
        match &mut self.state {
            GestureState::RubberBandSelecting { current, .. } => {
                *current = point;
                None
            }
            GestureState::Transforming { last } => {
                let (dx, dy) = point.delta_from(*last);
                *last = point;
                (dx != 0.0 || dy != 0.0).then_some(Manipulation::Drag { dx, dy })
            }
            GestureState::Idle | GestureState::DraggingExistingSelection { .. } => None,
        }
    }

    /// Handle a release and return to `Idle`.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::NoGesture`] when idle.
    pub fn pointer_up(&mut self, point: Point) -> EditorResult<GestureEnd> {
        let end = match self.state {
            GestureState::Idle => return Err(EditorError::NoGesture),
            GestureState::RubberBandSelecting {
                origin, additive, ..
            } => GestureEnd::RubberBand {
                rect: Rect::from_corners(origin, point),
                additive,
            },
            GestureState::DraggingExistingSelection { .. } | GestureState::Transforming { .. } => {
                GestureEnd::Transform
            }
        };
        self.state = GestureState::Idle;
        Ok(end)
    }

    /// Apply the result of a rubber band.
    pub fn finish_rubber_band(&mut self, hits: Vec<PlacementId>, additive: bool) {
        if additive {
            for id in hits {
                self.select(id);
            }
        } else {
            self.set(hits);
        }
    }

    /// Add a placement to the selection.
    pub fn select(&mut self, id: PlacementId) {
        if !self.contains(&id) {
            self.selected.push(id);
        }
    }

    /// Remove a placement from the selection.
    pub fn deselect(&mut self, id: &PlacementId) {
        self.selected.retain(|s| s != id);
    }

    /// Flip a placement's membership.
    pub fn toggle(&mut self, id: &PlacementId) {
        if self.contains(id) {
            self.deselect(id);
        } else {
            self.selected.push(id.clone());
        }
    }

    /// Replace the selection.
    pub fn set(&mut self, ids: Vec<PlacementId>) {
        self.selected.clear();
        for id in ids {
            self.select(id);
        }
    }

    /// Drop every selected id.
    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Drop the listed ids from the selection.
    pub fn remove_all(&mut self, ids: &[PlacementId]) {
        self.selected.retain(|s| !ids.contains(s));
    }

    /// Check if a placement is selected.
    #[must_use]
    pub fn contains(&self, id: &PlacementId) -> bool {
        self.selected.contains(id)
    }

    /// Selected ids in selection order.
    #[must_use]
    pub fn selected(&self) -> &[PlacementId] {
        &self.selected
    }

    /// Whether nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}
