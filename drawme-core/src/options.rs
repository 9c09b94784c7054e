//! Global canvas manipulation options.

use serde::{Deserialize, Serialize};

/// Which manipulations the transform handles allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct CanvasOptions {
    /// Elements can be resized.
    #[serde(default = "enabled")]
    pub scalable: bool,
    /// Elements can be rotated.
    #[serde(default = "enabled")]
    pub rotatable: bool,
    /// Elements can be dragged.
    #[serde(default = "enabled")]
    pub draggable: bool,
    /// Resizing keeps the aspect ratio.
    #[serde(default = "enabled")]
    pub keep_ratio: bool,
}

const fn enabled() -> bool {
    true
}

impl Default for CanvasOptions {
    fn default() -> Self {
        Self {
            scalable: true,
            rotatable: true,
            draggable: true,
            keep_ratio: true,
        }
    }
}

/// A single toggleable option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CanvasOption {
    /// [`CanvasOptions::scalable`].
    Scalable,
    /// [`CanvasOptions::rotatable`].
    Rotatable,
    /// [`CanvasOptions::draggable`].
    Draggable,
    /// [`CanvasOptions::keep_ratio`].
    KeepRatio,
}

impl CanvasOption {
    /// The single-letter shortcut that toggles this option.
    #[must_use]
    pub fn from_shortcut(key: &str) -> Option<Self> {
        match key {
            "s" | "S" => Some(Self::Scalable),
            "r" | "R" => Some(Self::Rotatable),
            "d" | "D" => Some(Self::Draggable),
            "k" | "K" => Some(Self::KeepRatio),
            _ => None,
        }
    }
}

impl CanvasOptions {
    /// Flip one option and return its new value.
    pub fn toggle(&mut self, option: CanvasOption) -> bool {
        let flag = match option {
            CanvasOption::Scalable => &mut self.scalable,
            CanvasOption::Rotatable => &mut self.rotatable,
            CanvasOption::Draggable => &mut self.draggable,
            CanvasOption::KeepRatio => &mut self.keep_ratio,
        };
        *flag = !*flag;
        *flag
    }
}
