//! WebAssembly bindings for drawme-core.
//!
//! Exposes the editor to JavaScript. Structured values cross the boundary as
//! JSON strings; errors come back as their display text.

use wasm_bindgen::prelude::*;

use crate::component::{CategoryId, ComponentId};
use crate::editor::{encode_drag_payload, Editor};
use crate::event::{InputEvent, KeyModifiers};
use crate::geometry::{Point, Rect};
use crate::options::CanvasOption;
use crate::placement::PlacementId;
use crate::store::{KeyValueStore, LocalStorage};
use crate::toolkit::BoxToolkit;

/// Initialize the editor WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages
    console_error_panic_hook::set_once();
}

/// Editor instance for WASM, persisted to `localStorage`.
#[wasm_bindgen]
pub struct WasmEditor {
    editor: Editor<Box<dyn KeyValueStore>>,
    toolkit: BoxToolkit,
}

#[wasm_bindgen]
impl WasmEditor {
    /// Restore the editor from `localStorage`.
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> Self {
        Self::with_store(Box::new(LocalStorage))
    }

    /// Everything the UI renders, as JSON.
    #[wasm_bindgen(js_name = snapshotJson)]
    #[must_use]
    pub fn snapshot_json(&self) -> String {
        serde_json::to_string(&self.editor.snapshot()).unwrap_or_default()
    }

    /// Create a category; returns it as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error string for blank names.
    #[wasm_bindgen(js_name = createCategory)]
    pub fn create_category(&mut self, name: &str) -> Result<String, String> {
        let category = self.editor.create_category(name).map_err(|e| e.to_string())?;
        serde_json::to_string(&category).map_err(|e| e.to_string())
    }

    /// Delete a category and everything filed under it.
    ///
    /// # Errors
    ///
    /// Returns an error string for the seed categories or unknown ids.
    #[wasm_bindgen(js_name = deleteCategory)]
    pub fn delete_category(&mut self, id: &str) -> Result<(), String> {
        let result = self.editor.delete_category(&CategoryId::from(id));
        self.prune_extents();
        result.map_err(|e| e.to_string())
    }

    /// Choose the category shown in the component panel.
    ///
    /// # Errors
    ///
    /// Returns an error string for unknown ids.
    #[wasm_bindgen(js_name = selectCategory)]
    pub fn select_category(&mut self, id: Option<String>) -> Result<(), String> {
        self.editor
            .select_category(id.map(CategoryId::from))
            .map_err(|e| e.to_string())
    }

    /// Register a drawn component; returns it as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error string for unknown categories.
    #[wasm_bindgen(js_name = createComponent)]
    pub fn create_component(
        &mut self,
        data_url: &str,
        name: &str,
        category_id: &str,
    ) -> Result<String, String> {
        let component = self
            .editor
            .create_component(data_url, name, CategoryId::from(category_id))
            .map_err(|e| e.to_string())?;
        serde_json::to_string(&component).map_err(|e| e.to_string())
    }

    /// Delete a component and its placements.
    ///
    /// # Errors
    ///
    /// Returns an error string for unknown ids.
    #[wasm_bindgen(js_name = deleteComponent)]
    pub fn delete_component(&mut self, id: &str) -> Result<(), String> {
        let result = self.editor.delete_component(&ComponentId::from(id));
        self.prune_extents();
        result.map(|_| ()).map_err(|e| e.to_string())
    }

    /// Drag payload for a registered component.
    ///
    /// # Errors
    ///
    /// Returns an error string for unknown ids.
    #[wasm_bindgen(js_name = dragPayload)]
    pub fn drag_payload(&self, id: &str) -> Result<String, String> {
        let component = self
            .editor
            .registry()
            .component(&ComponentId::from(id))
            .ok_or_else(|| format!("Component not found: {id}"))?;
        encode_drag_payload(component).map_err(|e| e.to_string())
    }

    /// Drop a payload at a client-space pointer position; returns the new
    /// placement as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error string for malformed payloads or components missing
    /// from the registry.
    #[wasm_bindgen(js_name = dropPayload)]
    #[allow(clippy::too_many_arguments)]
    pub fn drop_payload(
        &mut self,
        payload: &str,
        client_x: f64,
        client_y: f64,
        origin_x: f64,
        origin_y: f64,
        scroll_x: f64,
        scroll_y: f64,
    ) -> Result<String, String> {
        let point = Point::from_client(
            Point::new(client_x, client_y),
            Point::new(origin_x, origin_y),
            Point::new(scroll_x, scroll_y),
        );
        let placement = self
            .editor
            .drop_payload(payload, point)
            .map_err(|e| e.to_string())?;
        serde_json::to_string(&placement).map_err(|e| e.to_string())
    }

    /// Record the rendered size of a placement for hit-testing.
    #[wasm_bindgen(js_name = setExtent)]
    pub fn set_extent(&mut self, id: &str, width: f64, height: f64) {
        let id = PlacementId::from(id);
        if self.editor.placements().contains(&id) {
            self.toolkit.set_extent(id, width, height);
        }
    }

    /// Dispatch a JSON-encoded input event.
    ///
    /// # Errors
    ///
    /// Returns an error string if the event is malformed or rejected.
    #[wasm_bindgen(js_name = handleEvent)]
    pub fn handle_event(&mut self, json: &str) -> Result<(), String> {
        let event: InputEvent = serde_json::from_str(json).map_err(|e| e.to_string())?;
        let result = self.editor.handle_event(&mut self.toolkit, &event);
        self.prune_extents();
        result.map_err(|e| e.to_string())
    }

    /// Handle a key press.
    ///
    /// # Errors
    ///
    /// Returns an error string if the bound command fails.
    #[wasm_bindgen(js_name = keyDown)]
    pub fn key_down(&mut self, key: &str, shift: bool, ctrl: bool, meta: bool) -> Result<(), String> {
        let modifiers = KeyModifiers {
            shift,
            ctrl,
            alt: false,
            meta,
        };
        let result = self.editor.key_down(key, modifiers);
        self.prune_extents();
        result.map(|_| ()).map_err(|e| e.to_string())
    }

    /// Scale the selection from a resize handle.
    ///
    /// # Errors
    ///
    /// Returns an error string unless a manipulation is running.
    #[wasm_bindgen(js_name = scaleSelection)]
    pub fn scale_selection(&mut self, fx: f64, fy: f64) -> Result<(), String> {
        self.editor
            .scale_selection(&mut self.toolkit, fx, fy)
            .map_err(|e| e.to_string())
    }

    /// Rotate the selection from a rotation handle.
    ///
    /// # Errors
    ///
    /// Returns an error string unless a manipulation is running.
    #[wasm_bindgen(js_name = rotateSelection)]
    pub fn rotate_selection(&mut self, degrees: f64) -> Result<(), String> {
        self.editor
            .rotate_selection(&mut self.toolkit, degrees)
            .map_err(|e| e.to_string())
    }

    /// Select a placement from the layer list and return the point to scroll
    /// to as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error string for unknown ids.
    #[wasm_bindgen(js_name = focusLayer)]
    pub fn focus_layer(&mut self, id: &str) -> Result<String, String> {
        let point = self
            .editor
            .focus_layer(&PlacementId::from(id))
            .map_err(|e| e.to_string())?;
        serde_json::to_string(&point).map_err(|e| e.to_string())
    }

    /// Show or hide a placement.
    ///
    /// # Errors
    ///
    /// Returns an error string for unknown ids.
    #[wasm_bindgen(js_name = setVisible)]
    pub fn set_visible(&mut self, id: &str, visible: bool) -> Result<(), String> {
        self.editor
            .set_visible(&PlacementId::from(id), visible)
            .map_err(|e| e.to_string())
    }

    /// Drag a layer row to a new position.
    ///
    /// # Errors
    ///
    /// Returns an error string for out-of-range rows.
    #[wasm_bindgen(js_name = moveLayer)]
    pub fn move_layer(&mut self, from: usize, to: usize) -> Result<(), String> {
        self.editor.move_layer(from, to).map_err(|e| e.to_string())
    }

    /// Adopt a JSON array of placement ids as the new top-to-bottom order.
    ///
    /// # Errors
    ///
    /// Returns an error string unless the array lists every placement once.
    pub fn reorder(&mut self, order_json: &str) -> Result<(), String> {
        let order: Vec<PlacementId> =
            serde_json::from_str(order_json).map_err(|e| e.to_string())?;
        self.editor.reorder(&order).map_err(|e| e.to_string())
    }

    /// Open the rename field on a placement.
    ///
    /// # Errors
    ///
    /// Returns an error string for unknown ids.
    #[wasm_bindgen(js_name = beginRename)]
    pub fn begin_rename(&mut self, id: &str) -> Result<(), String> {
        self.editor
            .begin_rename(&PlacementId::from(id))
            .map_err(|e| e.to_string())
    }

    /// Replace the rename field's text.
    ///
    /// # Errors
    ///
    /// Returns an error string if no field is open.
    #[wasm_bindgen(js_name = updateRename)]
    pub fn update_rename(&mut self, text: &str) -> Result<(), String> {
        self.editor.update_rename(text).map_err(|e| e.to_string())
    }

    /// The rename field lost focus.
    ///
    /// # Errors
    ///
    /// Returns an error string if no field is open.
    #[wasm_bindgen(js_name = commitRename)]
    pub fn commit_rename(&mut self) -> Result<(), String> {
        self.editor.commit_rename().map_err(|e| e.to_string())
    }

    /// Toggle an option by its shortcut letter; returns the new value.
    ///
    /// # Errors
    ///
    /// Returns an error string for unknown shortcuts.
    #[wasm_bindgen(js_name = toggleOption)]
    pub fn toggle_option(&mut self, shortcut: &str) -> Result<bool, String> {
        let option = CanvasOption::from_shortcut(shortcut)
            .ok_or_else(|| format!("Unknown option shortcut: {shortcut}"))?;
        Ok(self.editor.toggle_option(option))
    }

    /// Report the visible region; returns whether the surface grew.
    #[wasm_bindgen(js_name = growSurface)]
    pub fn grow_surface(&mut self, x: f64, y: f64, width: f64, height: f64) -> bool {
        self.editor
            .grow_surface(Rect::new(x, y, width, height))
            .any()
    }
}

impl WasmEditor {
    /// Editor over an arbitrary store.
    #[must_use]
    pub fn with_store(store: Box<dyn KeyValueStore>) -> Self {
        Self {
            editor: Editor::open(store),
            toolkit: BoxToolkit::new(),
        }
    }

    fn prune_extents(&mut self) {
        self.toolkit.prune_extents(self.editor.placements());
    }
}

impl Default for WasmEditor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn editor() -> WasmEditor {
        WasmEditor::with_store(Box::new(MemoryStore::new()))
    }

    #[test]
    fn snapshot_json_is_valid() {
        let wasm = editor();
        let json: serde_json::Value =
            serde_json::from_str(&wasm.snapshot_json()).expect("valid json");
        assert_eq!(json["categories"][0]["name"], "All");
        assert_eq!(json["surface"]["width"], 5000.0);
    }

    #[test]
    fn create_drag_and_drop() {
        let mut wasm = editor();
        let component: serde_json::Value = serde_json::from_str(
            &wasm
                .create_component("data:,", "Star", "1")
                .expect("component"),
        )
        .expect("json");
        let id = component["id"].as_str().expect("id");

        let payload = wasm.drag_payload(id).expect("payload");
        let placement: serde_json::Value = serde_json::from_str(
            &wasm
                .drop_payload(&payload, 250.0, 200.0, 50.0, 50.0, 0.0, 0.0)
                .expect("drop"),
        )
        .expect("json");
        assert_eq!(placement["transform"], "translate(200px, 150px) rotate(0deg) scale(1, 1)");
        assert!(wasm.drop_payload("nope", 0.0, 0.0, 0.0, 0.0, 0.0, 0.0).is_err());
    }

    #[test]
    fn events_drive_selection() {
        let mut wasm = editor();
        let component: serde_json::Value =
            serde_json::from_str(&wasm.create_component("data:,", "Star", "1").expect("create"))
                .expect("json");
        let payload = wasm
            .drag_payload(component["id"].as_str().expect("id"))
            .expect("payload");
        wasm.drop_payload(&payload, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0)
            .expect("drop");

        wasm.handle_event(r#"{"type":"PointerDown","data":{"point":{"x":10.0,"y":10.0},"modifiers":{"shift":false,"ctrl":false,"alt":false,"meta":false}}}"#)
            .expect("down");
        wasm.handle_event(r#"{"type":"PointerUp","data":{"point":{"x":10.0,"y":10.0}}}"#)
            .expect("up");
        let snapshot: serde_json::Value =
            serde_json::from_str(&wasm.snapshot_json()).expect("json");
        assert_eq!(snapshot["selection"].as_array().map(Vec::len), Some(1));

        wasm.key_down("Delete", false, false, false).expect("delete");
        let snapshot: serde_json::Value =
            serde_json::from_str(&wasm.snapshot_json()).expect("json");
        assert_eq!(snapshot["placements"].as_array().map(Vec::len), Some(0));
        assert!(wasm.handle_event("{}").is_err());
    }

    #[test]
    fn toggle_option_by_shortcut() {
        let mut wasm = editor();
        assert_eq!(wasm.toggle_option("r"), Ok(false));
        assert!(wasm.toggle_option("x").is_err());
    }
}
