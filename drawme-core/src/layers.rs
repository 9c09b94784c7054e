//! Layer-list projection of the placements, plus the inline rename field.

use serde::{Deserialize, Serialize};

use crate::placement::{PlacementId, PlacementModel};
use crate::selection::SelectionController;
use crate::{EditorError, EditorResult};

/// One row of the layer panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerRow {
    /// Placement shown by this row.
    pub id: PlacementId,
    /// Editable label.
    pub layer_name: String,
    /// Visibility toggle state.
    pub visible: bool,
    /// Thumbnail source (the component's data URL).
    pub thumbnail: String,
    /// Whether the placement is selected.
    pub selected: bool,
    /// Paint order of the placement.
    pub z_index: i64,
}

/// Rows from top (highest z-index) to bottom.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerList {
    rows: Vec<LayerRow>,
}

impl LayerList {
    /// Project the placements into layer rows.
    #[must_use]
    pub fn project(model: &PlacementModel, selection: &SelectionController) -> Self {
        let mut rows: Vec<LayerRow> = model
            .placements()
            .iter()
            .map(|p| LayerRow {
                id: p.id.clone(),
                layer_name: p.layer_name.clone(),
                visible: p.visible,
                thumbnail: p.component.data_url.clone(),
                selected: selection.contains(&p.id),
                z_index: p.z_index,
            })
            .collect();
        // Stable: equal z-indexes keep list order.
        rows.sort_by(|a, b| b.z_index.cmp(&a.z_index));
        Self { rows }
    }

    /// Rows, top first.
    #[must_use]
    pub fn rows(&self) -> &[LayerRow] {
        &self.rows
    }

    /// Row ids, top first.
    #[must_use]
    pub fn ids(&self) -> Vec<PlacementId> {
        self.rows.iter().map(|r| r.id.clone()).collect()
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the list has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The id order after dragging the row at `from` to position `to`.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidOrder`] if either index is out of range.
    pub fn move_row(&self, from: usize, to: usize) -> EditorResult<Vec<PlacementId>> {
        if from >= self.rows.len() || to >= self.rows.len() {
            return Err(EditorError::InvalidOrder(format!(
                "cannot move row {from} to {to} in a list of {}",
                self.rows.len()
            )));
        }
        let mut ids = self.ids();
        let moved = ids.remove(from);
        ids.insert(to, moved);
        Ok(ids)
    }
}

/// The single open layer-name text field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameSession {
    id: PlacementId,
    original: String,
    text: String,
}

/// Result of a key press inside the rename field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameKey {
    /// Keep editing.
    Continue,
    /// Enter: commit the text.
    Commit,
    /// Escape: discard the text.
    Cancel,
}

impl RenameSession {
    /// Open the field for a placement, pre-filled with its current name.
    #[must_use]
    pub fn open(id: PlacementId, current: &str) -> Self {
        Self {
            id,
            original: current.to_string(),
            text: current.to_string(),
        }
    }

    /// Placement being renamed.
    #[must_use]
    pub fn id(&self) -> &PlacementId {
        &self.id
    }

    /// Text currently in the field.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the field's text.
    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
    }

    /// Classify a key press.
    #[must_use]
    pub fn key(key: &str) -> RenameKey {
        match key {
            "Enter" => RenameKey::Commit,
            "Escape" => RenameKey::Cancel,
            _ => RenameKey::Continue,
        }
    }

    /// The name to commit, or `None` if the edit is blank or unchanged.
    #[must_use]
    pub fn into_commit(self) -> Option<(PlacementId, String)> {
        let text = self.text.trim();
        if text.is_empty() || text == self.original {
            None
        } else {
            Some((self.id, text.to_string()))
        }
    }
}
