//! # DrawMe CLI
//!
//! Headless driver for the DrawMe editor. Every invocation opens the store in
//! the data directory, runs one command and exits; the store keeps the state
//! between invocations.
//!
//! ## Usage
//!
//! ```bash
//! drawme add-category Icons --id 10
//! drawme add-component --file star.png --name Star --category 10
//! drawme place <component-id> 200 150
//! drawme layers
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `CliConfig` - Data directory and viewport size
//! - `run` - Executes one `Command` against a `FileStore`-backed editor

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

mod commands;

pub use commands::run;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command-line arguments for drawme.
#[derive(Debug, Clone, Parser)]
#[command(name = "drawme")]
#[command(about = "Compose drawn components on a canvas from the command line")]
#[command(version)]
pub struct CliArgs {
    /// Directory holding the persisted editor state
    #[arg(long, env = "DRAWME_DATA_DIR", default_value = ".drawme")]
    pub data_dir: PathBuf,

    /// Viewport width used for hit-testing and surface growth
    #[arg(long, env = "DRAWME_VIEWPORT_WIDTH", default_value = "1280")]
    pub viewport_width: f64,

    /// Viewport height used for hit-testing and surface growth
    #[arg(long, env = "DRAWME_VIEWPORT_HEIGHT", default_value = "720")]
    pub viewport_height: f64,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Editor commands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List categories with their component counts
    Categories,
    /// Create a category
    AddCategory {
        /// Display name
        name: String,
        /// Explicit id (generated when omitted)
        #[arg(long)]
        id: Option<String>,
    },
    /// Delete a category, its components and their placements
    DeleteCategory {
        /// Category id
        id: String,
    },
    /// Choose the category shown in the component panel
    SelectCategory {
        /// Category id (omit to show everything)
        id: Option<String>,
    },
    /// List components of a category (all by default)
    Components {
        /// Category id
        #[arg(long)]
        category: Option<String>,
    },
    /// Register a component from a PNG file or a data URL
    AddComponent {
        /// PNG file to import
        #[arg(long, conflicts_with = "data_url")]
        file: Option<PathBuf>,
        /// Ready-made data URL
        #[arg(long)]
        data_url: Option<String>,
        /// Display name (a placeholder is generated when blank)
        #[arg(long, default_value = "")]
        name: String,
        /// Category id
        #[arg(long, default_value = "1")]
        category: String,
    },
    /// Delete a component and its placements
    DeleteComponent {
        /// Component id
        id: String,
    },
    /// Place a component on the canvas
    Place {
        /// Component id
        component: String,
        /// Surface x coordinate
        #[arg(allow_negative_numbers = true)]
        x: f64,
        /// Surface y coordinate
        #[arg(allow_negative_numbers = true)]
        y: f64,
    },
    /// Show the layer list, top first
    Layers,
    /// Set the layer order, top first (must list every placement)
    Reorder {
        /// Placement ids
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Drag a layer row to another position
    MoveLayer {
        /// Current row index (0 = top)
        from: usize,
        /// Target row index
        to: usize,
    },
    /// Make a placement visible
    Show {
        /// Placement id
        id: String,
    },
    /// Hide a placement
    Hide {
        /// Placement id
        id: String,
    },
    /// Rename a layer
    Rename {
        /// Placement id
        id: String,
        /// New layer name
        name: String,
    },
    /// Delete placements
    Delete {
        /// Placement ids
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Drag, scale or rotate a placement with a pointer gesture
    Transform {
        /// Placement id
        id: String,
        /// Horizontal drag distance
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        dx: f64,
        /// Vertical drag distance
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        dy: f64,
        /// Scale factor
        #[arg(long)]
        scale: Option<f64>,
        /// Rotation in degrees
        #[arg(long, allow_negative_numbers = true)]
        rotate: Option<f64>,
    },
    /// Select everything inside a rectangle and print the selection
    Select {
        /// Left edge
        #[arg(allow_negative_numbers = true)]
        x: f64,
        /// Top edge
        #[arg(allow_negative_numbers = true)]
        y: f64,
        /// Width
        width: f64,
        /// Height
        height: f64,
    },
    /// Show or toggle canvas options (s, r, d, k)
    Options {
        /// Shortcut of the option to toggle
        toggle: Option<String>,
    },
    /// Report whether the surface grows for a scroll position
    Grow {
        /// Horizontal scroll offset
        #[arg(long, default_value = "0")]
        scroll_x: f64,
        /// Vertical scroll offset
        #[arg(long, default_value = "0")]
        scroll_y: f64,
    },
    /// Print the full editor snapshot as JSON
    Snapshot,
}

/// CLI configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct CliConfig {
    /// Directory holding the persisted editor state.
    pub data_dir: PathBuf,
    /// Viewport width in pixels.
    pub viewport_width: f64,
    /// Viewport height in pixels.
    pub viewport_height: f64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl CliConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data_dir: PathBuf::from(".drawme"),
            viewport_width: 1280.0,
            viewport_height: 720.0,
        }
    }
}

impl From<&CliArgs> for CliConfig {
    fn from(args: &CliArgs) -> Self {
        Self {
            data_dir: args.data_dir.clone(),
            viewport_width: args.viewport_width,
            viewport_height: args.viewport_height,
        }
    }
}
