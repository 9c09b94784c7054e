//! The editor: single owner of the application state.
//!
//! Every user intent is a method on [`Editor`]. Commands validate their
//! preconditions, apply the change to the in-memory model, mirror the touched
//! collections to the store and notify subscribers. Store failures are logged
//! and never surface as command errors.

use serde::{Deserialize, Serialize};

use crate::component::{Category, CategoryId, Component, ComponentId};
use crate::event::{InputEvent, KeyCommand, KeyModifiers};
use crate::geometry::{Point, Rect};
use crate::layers::{LayerList, LayerRow, RenameKey, RenameSession};
use crate::notify::{ChangeEvent, ChangeNotifier, Subscription};
use crate::options::{CanvasOption, CanvasOptions};
use crate::placement::{Placement, PlacementId, PlacementModel};
use crate::registry::ComponentRegistry;
use crate::schema::{self, keys, PersistedState, SCHEMA_VERSION};
use crate::selection::{GestureEnd, GestureStart, GestureState, SelectionController};
use crate::store::{KeyValueStore, MemoryStore, StoreError};
use crate::surface::{Growth, Surface};
use crate::toolkit::{InteractionToolkit, Manipulation};
use crate::{EditorError, EditorResult};

/// Encode a component as the payload of a drag from the component panel.
///
/// # Errors
///
/// Returns [`EditorError::Serialization`] if encoding fails.
pub fn encode_drag_payload(component: &Component) -> EditorResult<String> {
    Ok(serde_json::to_string(component)?)
}

/// Decode a drag payload back into a component.
///
/// # Errors
///
/// Returns [`EditorError::MalformedPayload`] for empty, unparsable or
/// bitmap-less payloads.
pub fn decode_drag_payload(payload: &str) -> EditorResult<Component> {
    if payload.trim().is_empty() {
        return Err(EditorError::MalformedPayload("empty payload".into()));
    }
    let component: Component = serde_json::from_str(payload)
        .map_err(|e| EditorError::MalformedPayload(e.to_string()))?;
    if component.data_url.is_empty() {
        return Err(EditorError::MalformedPayload("component has no bitmap".into()));
    }
    Ok(component)
}

/// A category with its component count badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRow {
    /// Category id.
    pub id: CategoryId,
    /// Display name.
    pub name: String,
    /// Number of components shown when the category is chosen.
    pub count: usize,
}

/// The open rename field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameState {
    /// Placement being renamed.
    pub id: PlacementId,
    /// Current field text.
    pub text: String,
}

/// Read-only view of everything a UI renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorSnapshot {
    /// Categories with counts, in creation order.
    pub categories: Vec<CategoryRow>,
    /// Category chosen in the component panel.
    pub selected_category: Option<CategoryId>,
    /// Components shown in the panel for the chosen category.
    pub components: Vec<Component>,
    /// Placements in list order.
    pub placements: Vec<Placement>,
    /// Layer rows, top first.
    pub layers: Vec<LayerRow>,
    /// Selected placement ids.
    pub selection: Vec<PlacementId>,
    /// Rubber band being dragged.
    pub rubber_band: Option<Rect>,
    /// Open rename field.
    pub renaming: Option<RenameState>,
    /// Global manipulation options.
    pub options: CanvasOptions,
    /// Surface size.
    pub surface: Surface,
}

/// Application state for one editing session.
#[derive(Debug)]
pub struct Editor<S> {
    registry: ComponentRegistry,
    placements: PlacementModel,
    surface: Surface,
    selection: SelectionController,
    rename: Option<RenameSession>,
    options: CanvasOptions,
    selected_category: Option<CategoryId>,
    notifier: ChangeNotifier,
    store: S,
}

impl Editor<MemoryStore> {
    /// Editor over a fresh in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::open(MemoryStore::new())
    }
}

impl<S: KeyValueStore> Editor<S> {
    /// Restore the editor from `store`.
    ///
    /// Older layouts are migrated and written back at the current schema
    /// version.
    pub fn open(store: S) -> Self {
        let stored_version = store
            .get(keys::SCHEMA_VERSION)
            .as_ref()
            .and_then(serde_json::Value::as_u64);
        let state = PersistedState::load(&store);

        if stored_version != Some(SCHEMA_VERSION) {
            tracing::info!(
                "Migrating store from schema {} to {SCHEMA_VERSION}",
                stored_version.map_or_else(|| "unversioned".to_string(), |v| v.to_string())
            );
            if let Err(e) = state.save(&store) {
                tracing::warn!("Failed to write migrated state: {e}");
            }
        }

        Self {
            registry: state.registry,
            placements: state.placements,
            surface: Surface::default(),
            selection: SelectionController::new(),
            rename: None,
            options: state.options,
            selected_category: state.selected_category,
            notifier: ChangeNotifier::new(),
            store,
        }
    }

    // --- accessors ---

    /// Component catalog.
    #[must_use]
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Placements on the canvas.
    #[must_use]
    pub fn placements(&self) -> &PlacementModel {
        &self.placements
    }

    /// Surface size.
    #[must_use]
    pub fn surface(&self) -> Surface {
        self.surface
    }

    /// Selected placement ids.
    #[must_use]
    pub fn selection(&self) -> &[PlacementId] {
        self.selection.selected()
    }

    /// Gesture in flight.
    #[must_use]
    pub fn gesture(&self) -> GestureState {
        self.selection.state()
    }

    /// Global manipulation options.
    #[must_use]
    pub fn options(&self) -> CanvasOptions {
        self.options
    }

    /// Category chosen in the component panel.
    #[must_use]
    pub fn selected_category(&self) -> Option<&CategoryId> {
        self.selected_category.as_ref()
    }

    /// The open rename field.
    #[must_use]
    pub fn rename_session(&self) -> Option<&RenameSession> {
        self.rename.as_ref()
    }

    /// Layer rows, top first.
    #[must_use]
    pub fn layers(&self) -> LayerList {
        LayerList::project(&self.placements, &self.selection)
    }

    /// Components shown for the chosen category (everything when none is).
    #[must_use]
    pub fn panel_components(&self) -> Vec<&Component> {
        match &self.selected_category {
            Some(id) => self.registry.components_by_category(id).collect(),
            None => self.registry.components().iter().collect(),
        }
    }

    /// The backing store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Register for change notifications.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(&self, callback: impl FnMut(ChangeEvent) + Send + 'static) -> Subscription {
        self.notifier.subscribe(callback)
    }

    // --- registry ---

    /// Create a category with a generated id.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidOperation`] for blank names.
    pub fn create_category(&mut self, name: &str) -> EditorResult<Category> {
        let category = self.registry.create_category(name)?;
        self.commit(ChangeEvent::Registry);
        Ok(category)
    }

    /// Create a category under a caller-chosen id.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidOperation`] for blank names and
    /// [`EditorError::DuplicateCategory`] for taken ids.
    pub fn insert_category(&mut self, id: CategoryId, name: &str) -> EditorResult<Category> {
        let category = self.registry.insert_category(id, name)?;
        self.commit(ChangeEvent::Registry);
        Ok(category)
    }

    /// Delete a category, its components and their placements.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::ProtectedCategory`] for "All" and "Uncategorized",
    /// [`EditorError::CategoryNotFound`] for unknown ids and
    /// [`EditorError::GestureInProgress`] while a gesture runs.
    pub fn delete_category(&mut self, id: &CategoryId) -> EditorResult<()> {
        self.ensure_idle()?;
        let components = self.registry.delete_category(id)?;
        tracing::info!("Deleted category {id} ({} component(s))", components.len());
        self.commit(ChangeEvent::Registry);

        if self.selected_category.as_ref() == Some(id) {
            self.selected_category = None;
            self.commit(ChangeEvent::SelectedCategory);
        }
        self.remove_placements_of(&components);
        Ok(())
    }

    /// Register a drawn component.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::CategoryNotFound`] for unknown categories.
    pub fn create_component(
        &mut self,
        data_url: &str,
        name: &str,
        category_id: CategoryId,
    ) -> EditorResult<Component> {
        let component = self.registry.create_component(data_url, name, category_id)?;
        self.commit(ChangeEvent::Registry);
        Ok(component)
    }

    /// Delete a component and its placements.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::ComponentNotFound`] for unknown ids and
    /// [`EditorError::GestureInProgress`] while a gesture runs.
    pub fn delete_component(&mut self, id: &ComponentId) -> EditorResult<Component> {
        self.ensure_idle()?;
        let component = self.registry.delete_component(id)?;
        tracing::info!("Deleted component {} ({id})", component.name);
        self.commit(ChangeEvent::Registry);
        self.remove_placements_of(std::slice::from_ref(id));
        Ok(component)
    }

    /// Choose the category shown in the component panel.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::CategoryNotFound`] for unknown ids.
    pub fn select_category(&mut self, id: Option<CategoryId>) -> EditorResult<()> {
        if let Some(id) = &id {
            if self.registry.category(id).is_none() {
                return Err(EditorError::CategoryNotFound(id.to_string()));
            }
        }
        self.selected_category = id;
        self.commit(ChangeEvent::SelectedCategory);
        Ok(())
    }

    // --- placements ---

    /// Place a registered component at a surface point.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::ComponentNotFound`] for unknown ids.
    pub fn drop_component(&mut self, id: &ComponentId, point: Point) -> EditorResult<Placement> {
        let component = self
            .registry
            .component(id)
            .cloned()
            .ok_or_else(|| EditorError::ComponentNotFound(id.to_string()))?;
        Ok(self.place(&component, point))
    }

    /// Place the component carried by a drag payload.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::MalformedPayload`] if the payload cannot be
    /// decoded and [`EditorError::ComponentNotFound`] if it names a component
    /// the registry does not hold. The registry's copy is placed, not the
    /// payload's.
    pub fn drop_payload(&mut self, payload: &str, point: Point) -> EditorResult<Placement> {
        let carried = decode_drag_payload(payload)?;
        self.drop_component(&carried.id, point)
    }

    fn place(&mut self, component: &Component, point: Point) -> Placement {
        let placement = self.placements.place(component, point);
        self.commit(ChangeEvent::Placements);
        placement
    }

    /// Show or hide a placement. Hidden placements stay selectable here.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::PlacementNotFound`] for unknown ids.
    pub fn set_visible(&mut self, id: &PlacementId, visible: bool) -> EditorResult<()> {
        self.placements.set_visible(id, visible)?;
        self.commit(ChangeEvent::Placements);
        Ok(())
    }

    /// Adopt a new top-to-bottom layer order.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidOrder`] unless `order` lists every
    /// placement exactly once.
    pub fn reorder(&mut self, order: &[PlacementId]) -> EditorResult<()> {
        self.placements.reorder(order)?;
        tracing::debug!("Reordered {} layer(s)", order.len());
        self.commit(ChangeEvent::Placements);
        Ok(())
    }

    /// Drag a layer row from one position to another.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidOrder`] for out-of-range rows.
    pub fn move_layer(&mut self, from: usize, to: usize) -> EditorResult<()> {
        let order = self.layers().move_row(from, to)?;
        self.reorder(&order)
    }

    /// Add a placement to the selection and return the point to scroll to.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::PlacementNotFound`] for unknown ids.
    pub fn focus_layer(&mut self, id: &PlacementId) -> EditorResult<Point> {
        let origin = self
            .placements
            .get(id)
            .map(|p| p.transform.origin())
            .ok_or_else(|| EditorError::PlacementNotFound(id.to_string()))?;
        self.select(id)?;
        Ok(origin)
    }

    /// Grow the surface if the viewport reached its far edges.
    pub fn grow_surface(&mut self, viewport: Rect) -> Growth {
        let growth = self.surface.grow_to_fit(&viewport);
        if growth.any() {
            self.notifier.notify(ChangeEvent::Surface);
        }
        growth
    }

    /// Flip a global option and return its new value.
    pub fn toggle_option(&mut self, option: CanvasOption) -> bool {
        let value = self.options.toggle(option);
        tracing::debug!("Canvas option {option:?} = {value}");
        self.commit(ChangeEvent::Options);
        value
    }

    // --- selection ---

    /// Add a placement to the selection.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::PlacementNotFound`] for unknown ids and
    /// [`EditorError::GestureInProgress`] while a gesture runs.
    pub fn select(&mut self, id: &PlacementId) -> EditorResult<()> {
        self.ensure_idle()?;
        if !self.placements.contains(id) {
            return Err(EditorError::PlacementNotFound(id.to_string()));
        }
        self.selection.select(id.clone());
        self.notifier.notify(ChangeEvent::Selection);
        Ok(())
    }

    /// Remove a placement from the selection.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::GestureInProgress`] while a gesture runs.
    pub fn deselect(&mut self, id: &PlacementId) -> EditorResult<()> {
        self.ensure_idle()?;
        self.selection.deselect(id);
        self.notifier.notify(ChangeEvent::Selection);
        Ok(())
    }

    /// Empty the selection.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::GestureInProgress`] while a gesture runs.
    pub fn clear_selection(&mut self) -> EditorResult<()> {
        self.ensure_idle()?;
        self.selection.clear();
        self.notifier.notify(ChangeEvent::Selection);
        Ok(())
    }

    /// Select every visible placement.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::GestureInProgress`] while a gesture runs.
    pub fn select_all(&mut self) -> EditorResult<()> {
        self.ensure_idle()?;
        let ids = self
            .visible_candidates()
            .into_iter()
            .map(|p| p.id.clone())
            .collect();
        self.selection.set(ids);
        self.notifier.notify(ChangeEvent::Selection);
        Ok(())
    }

    /// Delete every selected placement.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::GestureInProgress`] while a gesture runs.
    pub fn delete_selection(&mut self) -> EditorResult<Vec<Placement>> {
        self.ensure_idle()?;
        let ids = self.selection.selected().to_vec();
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let removed = self.placements.delete_many(&ids);
        tracing::info!("Deleted {} selected placement(s)", removed.len());
        self.forget(&ids);
        self.commit(ChangeEvent::Placements);
        Ok(removed)
    }

    // --- gestures ---

    /// Press on the surface.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::GestureInProgress`] unless idle.
    pub fn pointer_down(
        &mut self,
        toolkit: &mut impl InteractionToolkit,
        point: Point,
        modifiers: KeyModifiers,
    ) -> EditorResult<GestureStart> {
        self.ensure_idle()?;
        if self.rename.is_some() {
            // Focus leaves the rename field.
            self.commit_rename()?;
        }

        let hit = toolkit.hit_test_point(point, &self.visible_candidates());
        let start = self.selection.pointer_down(point, hit.as_ref(), modifiers)?;
        if matches!(
            self.selection.state(),
            GestureState::DraggingExistingSelection { .. }
        ) {
            self.selection.start_transforming();
        }
        if start == GestureStart::Transform {
            let targets: Vec<_> = self
                .selection
                .selected()
                .iter()
                .filter_map(|id| self.placements.get(id))
                .map(|p| (p.id.clone(), p.transform))
                .collect();
            toolkit.begin_gesture(&targets, self.options);
        }
        tracing::debug!("Pointer down at ({}, {}): {start:?}", point.x, point.y);
        self.notifier.notify(ChangeEvent::Selection);
        self.notifier.notify(ChangeEvent::Gesture);
        Ok(start)
    }

    /// Pointer movement. Moves outside a gesture are ignored.
    pub fn pointer_move(&mut self, toolkit: &mut impl InteractionToolkit, point: Point) {
        let banding = matches!(
            self.selection.state(),
            GestureState::RubberBandSelecting { .. }
        );
        if let Some(frame) = self.selection.pointer_move(point) {
            toolkit.apply(frame);
        } else if banding {
            self.notifier.notify(ChangeEvent::Gesture);
        }
    }

    /// Release: resolve the rubber band or commit the manipulation.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::NoGesture`] when idle, or the commit error if
    /// the toolkit reported an unusable transform (nothing is applied then).
    pub fn pointer_up(
        &mut self,
        toolkit: &mut impl InteractionToolkit,
        point: Point,
    ) -> EditorResult<GestureEnd> {
        let end = self.selection.pointer_up(point)?;
        self.notifier.notify(ChangeEvent::Gesture);
        match end {
            GestureEnd::RubberBand { rect, additive } => {
                let hits = toolkit.hit_test_rect(rect, &self.visible_candidates());
                tracing::debug!("Rubber band hit {} placement(s)", hits.len());
                self.selection.finish_rubber_band(hits, additive);
                self.notifier.notify(ChangeEvent::Selection);
            }
            GestureEnd::Transform => {
                let updates = toolkit.end_gesture();
                if let Err(e) = self.placements.commit_css_transforms(&updates) {
                    tracing::warn!("Discarded gesture result: {e}");
                    return Err(e);
                }
                self.commit(ChangeEvent::Placements);
            }
        }
        Ok(end)
    }

    /// Scale the selection from a resize handle.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::NoGesture`] unless a manipulation is running.
    pub fn scale_selection(
        &mut self,
        toolkit: &mut impl InteractionToolkit,
        fx: f64,
        fy: f64,
    ) -> EditorResult<()> {
        self.manipulate(toolkit, Manipulation::Scale { fx, fy })
    }

    /// Rotate the selection from a rotation handle.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::NoGesture`] unless a manipulation is running.
    pub fn rotate_selection(
        &mut self,
        toolkit: &mut impl InteractionToolkit,
        degrees: f64,
    ) -> EditorResult<()> {
        self.manipulate(toolkit, Manipulation::Rotate { degrees })
    }

    fn manipulate(
        &mut self,
        toolkit: &mut impl InteractionToolkit,
        manipulation: Manipulation,
    ) -> EditorResult<()> {
        if !matches!(self.selection.state(), GestureState::Transforming { .. }) {
            return Err(EditorError::NoGesture);
        }
        toolkit.apply(manipulation);
        Ok(())
    }

    /// Dispatch an input event.
    ///
    /// # Errors
    ///
    /// Propagates the error of the command the event maps to.
    pub fn handle_event(
        &mut self,
        toolkit: &mut impl InteractionToolkit,
        event: &InputEvent,
    ) -> EditorResult<()> {
        match event {
            InputEvent::PointerDown { point, modifiers } => {
                self.pointer_down(toolkit, *point, *modifiers).map(|_| ())
            }
            InputEvent::PointerMove { point } => {
                self.pointer_move(toolkit, *point);
                Ok(())
            }
            InputEvent::PointerUp { point } => self.pointer_up(toolkit, *point).map(|_| ()),
            InputEvent::Key { key, modifiers } => self.key_down(key, *modifiers).map(|_| ()),
        }
    }

    // --- keyboard ---

    /// Handle a key press while the canvas (or the rename field) has focus.
    ///
    /// Returns the command that ran, if any.
    ///
    /// # Errors
    ///
    /// Propagates the error of the command the key maps to.
    pub fn key_down(
        &mut self,
        key: &str,
        modifiers: KeyModifiers,
    ) -> EditorResult<Option<KeyCommand>> {
        if self.rename.is_some() {
            self.rename_key(key)?;
            return Ok(None);
        }
        let Some(command) = KeyCommand::from_key(key, modifiers) else {
            return Ok(None);
        };
        match command {
            KeyCommand::Toggle(option) => {
                self.toggle_option(option);
            }
            _ if !self.selection.is_idle() => return Ok(None),
            KeyCommand::DeleteSelection => {
                if self.selection.is_empty() {
                    return Ok(None);
                }
                self.delete_selection()?;
            }
            KeyCommand::ClearSelection => self.clear_selection()?,
            KeyCommand::SelectAll => self.select_all()?,
        }
        Ok(Some(command))
    }

    // --- rename ---

    /// Open the rename field on a placement, committing any open one.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::PlacementNotFound`] for unknown ids.
    pub fn begin_rename(&mut self, id: &PlacementId) -> EditorResult<()> {
        let current = self
            .placements
            .get(id)
            .map(|p| p.layer_name.clone())
            .ok_or_else(|| EditorError::PlacementNotFound(id.to_string()))?;
        if self.rename.is_some() {
            self.commit_rename()?;
        }
        self.rename = Some(RenameSession::open(id.clone(), &current));
        self.notifier.notify(ChangeEvent::Rename);
        Ok(())
    }

    /// Replace the text of the rename field.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::RenameNotActive`] if no field is open.
    pub fn update_rename(&mut self, text: &str) -> EditorResult<()> {
        self.rename
            .as_mut()
            .ok_or(EditorError::RenameNotActive)?
            .set_text(text);
        self.notifier.notify(ChangeEvent::Rename);
        Ok(())
    }

    /// Route a key press to the rename field.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::RenameNotActive`] if no field is open.
    pub fn rename_key(&mut self, key: &str) -> EditorResult<RenameKey> {
        if self.rename.is_none() {
            return Err(EditorError::RenameNotActive);
        }
        let outcome = RenameSession::key(key);
        match outcome {
            RenameKey::Commit => self.commit_rename()?,
            RenameKey::Cancel => self.cancel_rename()?,
            RenameKey::Continue => {}
        }
        Ok(outcome)
    }

    /// Close the rename field, applying its text. Blank text cancels.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::RenameNotActive`] if no field is open.
    pub fn commit_rename(&mut self) -> EditorResult<()> {
        let session = self.rename.take().ok_or(EditorError::RenameNotActive)?;
        if let Some((id, name)) = session.into_commit() {
            self.placements.rename(&id, &name)?;
            tracing::debug!("Renamed layer {id} to {name}");
            self.commit(ChangeEvent::Placements);
        }
        self.notifier.notify(ChangeEvent::Rename);
        Ok(())
    }

    /// Close the rename field without changing anything.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::RenameNotActive`] if no field is open.
    pub fn cancel_rename(&mut self) -> EditorResult<()> {
        self.rename.take().ok_or(EditorError::RenameNotActive)?;
        self.notifier.notify(ChangeEvent::Rename);
        Ok(())
    }

    // --- views ---

    /// Everything a UI needs to render.
    #[must_use]
    pub fn snapshot(&self) -> EditorSnapshot {
        EditorSnapshot {
            categories: self
                .registry
                .categories()
                .iter()
                .map(|c| CategoryRow {
                    id: c.id.clone(),
                    name: c.name.clone(),
                    count: self.registry.component_count(&c.id),
                })
                .collect(),
            selected_category: self.selected_category.clone(),
            components: self.panel_components().into_iter().cloned().collect(),
            placements: self.placements.placements().to_vec(),
            layers: self.layers().rows().to_vec(),
            selection: self.selection.selected().to_vec(),
            rubber_band: self.selection.rubber_band(),
            renaming: self.rename.as_ref().map(|r| RenameState {
                id: r.id().clone(),
                text: r.text().to_string(),
            }),
            options: self.options,
            surface: self.surface,
        }
    }

    // --- internals ---

    fn ensure_idle(&self) -> EditorResult<()> {
        if self.selection.is_idle() {
            Ok(())
        } else {
            Err(EditorError::GestureInProgress)
        }
    }

    /// Hit-test candidates, bottom to top.
    fn visible_candidates(&self) -> Vec<&Placement> {
        self.placements
            .paint_order()
            .into_iter()
            .filter(|p| p.visible)
            .collect()
    }

    fn remove_placements_of(&mut self, components: &[ComponentId]) {
        let removed = self.placements.remove_by_component(components);
        if removed.is_empty() {
            return;
        }
        tracing::debug!("Cascaded delete of {} placement(s)", removed.len());
        self.forget(&removed);
        self.commit(ChangeEvent::Placements);
    }

    /// Drop removed placements from the selection and the rename field.
    fn forget(&mut self, removed: &[PlacementId]) {
        self.selection.remove_all(removed);
        self.notifier.notify(ChangeEvent::Selection);
        if self
            .rename
            .as_ref()
            .is_some_and(|session| removed.contains(session.id()))
        {
            self.rename = None;
            self.notifier.notify(ChangeEvent::Rename);
        }
    }

    /// Mirror the collections behind `change` to the store and notify.
    fn commit(&self, change: ChangeEvent) {
        if let Err(e) = self.persist(change) {
            tracing::warn!("Failed to persist {change:?}: {e}");
        }
        self.notifier.notify(change);
    }

    fn persist(&self, change: ChangeEvent) -> Result<(), StoreError> {
        match change {
            ChangeEvent::Registry => {
                schema::write(&self.store, keys::COMPONENTS, self.registry.components())?;
                schema::write(&self.store, keys::CATEGORIES, self.registry.categories())
            }
            ChangeEvent::SelectedCategory => {
                schema::write(&self.store, keys::SELECTED_CATEGORY, &self.selected_category)
            }
            ChangeEvent::Placements => {
                schema::write(&self.store, keys::PLACEMENTS, self.placements.placements())
            }
            ChangeEvent::Options => schema::write(&self.store, keys::OPTIONS, &self.options),
            ChangeEvent::Selection
            | ChangeEvent::Surface
            | ChangeEvent::Rename
            | ChangeEvent::Gesture => Ok(()),
        }
    }
}
