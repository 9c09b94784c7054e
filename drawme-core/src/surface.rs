//! The composition surface and its auto-grow rule.

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// Initial surface width in pixels.
pub const DEFAULT_SURFACE_WIDTH: f64 = 5000.0;

/// Initial surface height in pixels.
pub const DEFAULT_SURFACE_HEIGHT: f64 = 5000.0;

/// Distance from an edge at which the surface grows.
pub const GROW_MARGIN: f64 = 100.0;

/// Amount added to an axis each time it grows.
pub const GROW_STEP: f64 = 1000.0;

/// Which axes grew in a call to [`Surface::grow_to_fit`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Growth {
    /// The width grew.
    pub width: bool,
    /// The height grew.
    pub height: bool,
}

impl Growth {
    /// Whether either axis grew.
    #[must_use]
    pub fn any(&self) -> bool {
        self.width || self.height
    }
}

/// Size of the scrollable canvas surface.
///
/// Placements live in absolute surface coordinates, so resizing never moves
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl Default for Surface {
    fn default() -> Self {
        Self::new(DEFAULT_SURFACE_WIDTH, DEFAULT_SURFACE_HEIGHT)
    }
}

impl Surface {
    /// Create a surface with the given size.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Grow each axis independently if the visible region is within
    /// [`GROW_MARGIN`] of that axis' far edge.
    pub fn grow_to_fit(&mut self, viewport: &Rect) -> Growth {
        let mut growth = Growth::default();
        if viewport.right() + GROW_MARGIN >= self.width {
            self.width += GROW_STEP;
            growth.width = true;
        }
        if viewport.bottom() + GROW_MARGIN >= self.height {
            self.height += GROW_STEP;
            growth.height = true;
        }
        if growth.any() {
            tracing::debug!("Surface grew to {}x{}", self.width, self.height);
        }
        growth
    }
}
