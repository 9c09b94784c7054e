//! Input events for canvas interaction.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::options::CanvasOption;

/// Keyboard modifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct KeyModifiers {
    /// Shift key pressed.
    pub shift: bool,
    /// Control key pressed.
    pub ctrl: bool,
    /// Alt/Option key pressed.
    pub alt: bool,
    /// Meta/Command key pressed.
    pub meta: bool,
}

impl KeyModifiers {
    /// Only shift held.
    #[must_use]
    pub const fn shift() -> Self {
        Self {
            shift: true,
            ctrl: false,
            alt: false,
            meta: false,
        }
    }

    /// Ctrl or Cmd held.
    #[must_use]
    pub const fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Pointer and keyboard input the canvas can receive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum InputEvent {
    /// Primary button pressed on the surface.
    PointerDown {
        /// Position in surface coordinates.
        point: Point,
        /// Active modifier keys.
        modifiers: KeyModifiers,
    },
    /// Pointer moved.
    PointerMove {
        /// Position in surface coordinates.
        point: Point,
    },
    /// Primary button released.
    PointerUp {
        /// Position in surface coordinates.
        point: Point,
    },
    /// Key pressed.
    Key {
        /// Key name as reported by the browser (`"Delete"`, `"s"`, ...).
        key: String,
        /// Active modifier keys.
        modifiers: KeyModifiers,
    },
}

/// Commands bound to keys while the canvas has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    /// Remove the selected placements.
    DeleteSelection,
    /// Drop the whole selection.
    ClearSelection,
    /// Select every visible placement.
    SelectAll,
    /// Flip a global canvas option.
    Toggle(CanvasOption),
}

impl KeyCommand {
    /// Map a key press to its command.
    #[must_use]
    pub fn from_key(key: &str, modifiers: KeyModifiers) -> Option<Self> {
        match key {
            "Delete" | "Backspace" => Some(Self::DeleteSelection),
            "Escape" => Some(Self::ClearSelection),
            "a" | "A" if modifiers.command() => Some(Self::SelectAll),
            _ if modifiers.command() || modifiers.alt => None,
            _ => CanvasOption::from_shortcut(key).map(Self::Toggle),
        }
    }
}
