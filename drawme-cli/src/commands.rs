//! Command execution against a directory-backed editor.

use std::fmt::Write as _;

use anyhow::{bail, Context};
use drawme_core::{
    data_url_from_png, BoxToolkit, CanvasOption, CategoryId, ComponentId, Editor, FileStore,
    InteractionToolkit, KeyModifiers, Placement, PlacementId, Point, Rect,
};

use crate::{CliConfig, Command};

/// Run one command and return its printable output.
///
/// # Errors
///
/// Returns an error if the store cannot be opened, an input file cannot be
/// read, or the editor rejects the command.
#[allow(clippy::too_many_lines)]
pub fn run(config: &CliConfig, command: Command) -> anyhow::Result<String> {
    let store = FileStore::open(&config.data_dir)
        .with_context(|| format!("opening store at {}", config.data_dir.display()))?;
    let mut editor = Editor::open(store);
    let mut out = String::new();

    match command {
        Command::Categories => {
            let snapshot = editor.snapshot();
            for row in &snapshot.categories {
                let marker = if snapshot.selected_category.as_ref() == Some(&row.id) {
                    "*"
                } else {
                    " "
                };
                writeln!(out, "{marker} {}\t{}\t({})", row.id, row.name, row.count)?;
            }
        }
        Command::AddCategory { name, id } => {
            let category = match id {
                Some(id) => editor.insert_category(CategoryId::from(id), &name)?,
                None => editor.create_category(&name)?,
            };
            writeln!(out, "{}", category.id)?;
        }
        Command::DeleteCategory { id } => {
            editor.delete_category(&CategoryId::from(id.as_str()))?;
            writeln!(out, "Deleted category {id}")?;
        }
        Command::SelectCategory { id } => {
            editor.select_category(id.map(CategoryId::from))?;
            let shown = editor.panel_components().len();
            writeln!(out, "{shown} component(s) shown")?;
        }
        Command::Components { category } => {
            let category = category.map_or_else(CategoryId::all, CategoryId::from);
            for component in editor.registry().components_by_category(&category) {
                writeln!(
                    out,
                    "{}\t{}\t{}",
                    component.id, component.name, component.category_id
                )?;
            }
        }
        Command::AddComponent {
            file,
            data_url,
            name,
            category,
        } => {
            let data_url = match (file, data_url) {
                (Some(path), _) => {
                    let bytes = std::fs::read(&path)
                        .with_context(|| format!("reading {}", path.display()))?;
                    data_url_from_png(&bytes)
                }
                (None, Some(data_url)) => data_url,
                (None, None) => bail!("either --file or --data-url is required"),
            };
            let component =
                editor.create_component(&data_url, &name, CategoryId::from(category))?;
            writeln!(out, "{}\t{}", component.id, component.name)?;
        }
        Command::DeleteComponent { id } => {
            let component = editor.delete_component(&ComponentId::from(id))?;
            writeln!(out, "Deleted component {}", component.name)?;
        }
        Command::Place { component, x, y } => {
            let placement =
                editor.drop_component(&ComponentId::from(component), Point::new(x, y))?;
            writeln!(out, "{}\t{}", placement.id, placement.layer_name)?;
        }
        Command::Layers => write_layers(&editor, &mut out)?,
        Command::Reorder { ids } => {
            let order: Vec<PlacementId> = ids.into_iter().map(PlacementId::from).collect();
            editor.reorder(&order)?;
            write_layers(&editor, &mut out)?;
        }
        Command::MoveLayer { from, to } => {
            editor.move_layer(from, to)?;
            write_layers(&editor, &mut out)?;
        }
        Command::Show { id } => {
            editor.set_visible(&PlacementId::from(id), true)?;
            write_layers(&editor, &mut out)?;
        }
        Command::Hide { id } => {
            editor.set_visible(&PlacementId::from(id), false)?;
            write_layers(&editor, &mut out)?;
        }
        Command::Rename { id, name } => {
            editor.begin_rename(&PlacementId::from(id))?;
            editor.update_rename(&name)?;
            editor.commit_rename()?;
            write_layers(&editor, &mut out)?;
        }
        Command::Delete { ids } => {
            for id in ids.into_iter().map(PlacementId::from) {
                if editor.placements().contains(&id) {
                    editor.select(&id)?;
                } else {
                    tracing::warn!("Skipping unknown placement {id}");
                }
            }
            let removed = editor.delete_selection()?;
            writeln!(out, "Deleted {} placement(s)", removed.len())?;
        }
        Command::Transform {
            id,
            dx,
            dy,
            scale,
            rotate,
        } => {
            let id = PlacementId::from(id);
            let transform = transform(&mut editor, &id, dx, dy, scale, rotate)?;
            writeln!(out, "{id}\t{transform}")?;
        }
        Command::Select {
            x,
            y,
            width,
            height,
        } => {
            let mut toolkit = BoxToolkit::new();
            let origin = Point::new(x, y);
            let corner = Point::new(x + width, y + height);
            if let Some(hit) = toolkit.hit_test_point(origin, &visible(&editor)) {
                bail!("({x}, {y}) is on placement {hit}; start the rectangle on empty canvas");
            }
            editor.pointer_down(&mut toolkit, origin, KeyModifiers::default())?;
            editor.pointer_move(&mut toolkit, corner);
            editor.pointer_up(&mut toolkit, corner)?;
            for id in editor.selection() {
                writeln!(out, "{id}")?;
            }
        }
        Command::Options { toggle } => {
            if let Some(shortcut) = toggle {
                let Some(option) = CanvasOption::from_shortcut(&shortcut) else {
                    bail!("unknown option shortcut {shortcut:?} (expected s, r, d or k)");
                };
                editor.toggle_option(option);
            }
            let options = editor.options();
            writeln!(out, "scalable\t{}", options.scalable)?;
            writeln!(out, "rotatable\t{}", options.rotatable)?;
            writeln!(out, "draggable\t{}", options.draggable)?;
            writeln!(out, "keepRatio\t{}", options.keep_ratio)?;
        }
        Command::Grow { scroll_x, scroll_y } => {
            let viewport = Rect::new(
                scroll_x,
                scroll_y,
                config.viewport_width,
                config.viewport_height,
            );
            let growth = editor.grow_surface(viewport);
            let surface = editor.surface();
            writeln!(
                out,
                "{}x{} (width grew: {}, height grew: {})",
                surface.width, surface.height, growth.width, growth.height
            )?;
        }
        Command::Snapshot => {
            writeln!(out, "{}", serde_json::to_string_pretty(&editor.snapshot())?)?;
        }
    }
    Ok(out)
}

/// Visible placements, bottom to top.
fn visible(editor: &Editor<FileStore>) -> Vec<&Placement> {
    editor
        .placements()
        .paint_order()
        .into_iter()
        .filter(|p| p.visible)
        .collect()
}

fn write_layers(editor: &Editor<FileStore>, out: &mut String) -> anyhow::Result<()> {
    for row in editor.layers().rows() {
        let visibility = if row.visible { "visible" } else { "hidden" };
        writeln!(
            out,
            "{}\t{}\t{}\t{visibility}",
            row.z_index, row.id, row.layer_name
        )?;
    }
    Ok(())
}

/// Press on the placement's center, drag, apply handle frames and release.
fn transform(
    editor: &mut Editor<FileStore>,
    id: &PlacementId,
    dx: f64,
    dy: f64,
    scale: Option<f64>,
    rotate: Option<f64>,
) -> anyhow::Result<drawme_core::Transform> {
    let mut toolkit = BoxToolkit::new();
    let placement = editor
        .placements()
        .get(id)
        .with_context(|| format!("no placement {id}"))?;
    if !placement.visible {
        bail!("placement {id} is hidden");
    }
    let start = toolkit.bounds(placement).center();
    match toolkit.hit_test_point(start, &visible(editor)) {
        Some(hit) if &hit == id => {}
        Some(hit) => bail!("placement {id} is covered by {hit}"),
        None => bail!("placement {id} cannot be grabbed"),
    }

    editor.pointer_down(&mut toolkit, start, KeyModifiers::default())?;
    let end = Point::new(start.x + dx, start.y + dy);
    editor.pointer_move(&mut toolkit, end);
    if let Some(factor) = scale {
        editor.scale_selection(&mut toolkit, factor, factor)?;
    }
    if let Some(degrees) = rotate {
        editor.rotate_selection(&mut toolkit, degrees)?;
    }
    editor.pointer_up(&mut toolkit, end)?;

    editor
        .placements()
        .get(id)
        .map(|p| p.transform)
        .with_context(|| format!("placement {id} vanished"))
}
