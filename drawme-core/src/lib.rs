//! # DrawMe Core
//!
//! Editor logic for composing hand-drawn components onto a canvas.
//! Compiles to WASM for the browser and runs natively for the CLI.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                   Editor                    │
//! │  commands · change notification · persist   │
//! ├──────────────────────┬──────────────────────┤
//! │  Component Registry  │  Placement Model     │
//! │  - Components        │  - Transforms        │
//! │  - Categories        │  - Z-order / layers  │
//! ├──────────────────────┼──────────────────────┤
//! │  Selection           │  Layer List          │
//! │  - Gesture machine   │  - Rows, rename      │
//! │  - Toolkit contract  │  - Reorder           │
//! ├──────────────────────┴──────────────────────┤
//! │       Key/value store (schema v2)           │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod component;
pub mod editor;
pub mod error;
pub mod event;
pub mod geometry;
pub mod layers;
pub mod notify;
pub mod options;
pub mod placement;
pub mod registry;
pub mod schema;
pub mod selection;
pub mod store;
pub mod surface;
pub mod toolkit;
pub mod transform;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use component::{data_url_from_png, Category, CategoryId, Component, ComponentId};
pub use editor::{
    decode_drag_payload, encode_drag_payload, CategoryRow, Editor, EditorSnapshot, RenameState,
};
pub use error::{EditorError, EditorResult};
pub use event::{InputEvent, KeyCommand, KeyModifiers};
pub use geometry::{Point, Rect};
pub use layers::{LayerList, LayerRow, RenameKey, RenameSession};
pub use notify::{ChangeEvent, ChangeNotifier, Subscription};
pub use options::{CanvasOption, CanvasOptions};
pub use placement::{Placement, PlacementId, PlacementModel};
pub use registry::ComponentRegistry;
pub use schema::{PersistedState, SCHEMA_VERSION};
pub use selection::{GestureEnd, GestureStart, GestureState, SelectionController};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
pub use surface::{Growth, Surface};
pub use toolkit::{BoxToolkit, InteractionToolkit, Manipulation};
pub use transform::Transform;

/// Editor core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
