//! Persisted layout of the editor state and load-time migration.
//!
//! Each root collection lives under its own key. Loading never fails: a
//! missing or corrupt key falls back to its default, and individual records
//! that cannot be repaired are skipped with a warning.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::component::{placeholder_name, Category, CategoryId, Component, ComponentId};
use crate::options::CanvasOptions;
use crate::placement::{following, next_sequence, Placement, PlacementModel};
use crate::registry::ComponentRegistry;
use crate::store::{KeyValueStore, StoreError};
use crate::transform::Transform;

/// Current layout version written under [`keys::SCHEMA_VERSION`].
pub const SCHEMA_VERSION: u64 = 2;

/// Store keys.
pub mod keys {
    /// Registered components.
    pub const COMPONENTS: &str = "components";
    /// Categories, including the seed entries.
    pub const CATEGORIES: &str = "categories";
    /// Category chosen in the component panel.
    pub const SELECTED_CATEGORY: &str = "selectedCategory";
    /// Placements on the canvas.
    pub const PLACEMENTS: &str = "canvasComponents";
    /// Global manipulation options.
    pub const OPTIONS: &str = "canvasOptions";
    /// Layout version.
    pub const SCHEMA_VERSION: &str = "schemaVersion";
}

/// Everything the editor restores on startup.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PersistedState {
    /// Components and categories.
    pub registry: ComponentRegistry,
    /// Category chosen in the component panel.
    pub selected_category: Option<CategoryId>,
    /// Placements on the canvas.
    pub placements: PlacementModel,
    /// Global manipulation options.
    pub options: CanvasOptions,
}

impl PersistedState {
    /// Read every key, migrating older layouts.
    pub fn load(store: &impl KeyValueStore) -> Self {
        let version = store
            .get(keys::SCHEMA_VERSION)
            .as_ref()
            .and_then(Value::as_u64)
            .unwrap_or(1);
        if version > SCHEMA_VERSION {
            tracing::warn!(
                "Stored schema version {version} is newer than {SCHEMA_VERSION}; loading best effort"
            );
        }

        let components = records(store, keys::COMPONENTS)
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| migrate_component(record, index))
            .collect();

        let categories = match store.get(keys::CATEGORIES) {
            Some(Value::Array(items)) => items
                .into_iter()
                .enumerate()
                .filter_map(|(index, record)| {
                    serde_json::from_value::<Category>(record)
                        .map_err(|e| tracing::warn!("Skipping category #{index}: {e}"))
                        .ok()
                })
                .collect(),
            Some(_) => {
                tracing::warn!("Ignoring malformed {} value", keys::CATEGORIES);
                Category::seed()
            }
            None => Category::seed(),
        };

        let placements = migrate_placements(records(store, keys::PLACEMENTS));

        let options = store
            .get(keys::OPTIONS)
            .and_then(|value| {
                serde_json::from_value(value)
                    .map_err(|e| tracing::warn!("Ignoring malformed canvas options: {e}"))
                    .ok()
            })
            .unwrap_or_default();

        let state = Self {
            registry: ComponentRegistry::from_parts(components, categories),
            selected_category: store.get(keys::SELECTED_CATEGORY).and_then(selected_category),
            placements: PlacementModel::from_placements(placements),
            options,
        };
        tracing::info!(
            "Loaded {} component(s), {} categories, {} placement(s) from schema v{version}",
            state.registry.components().len(),
            state.registry.categories().len(),
            state.placements.len()
        );
        state
    }

    /// Write every key and stamp the current schema version.
    ///
    /// # Errors
    ///
    /// Returns the first [`StoreError`] reported by the backend.
    pub fn save(&self, store: &impl KeyValueStore) -> Result<(), StoreError> {
        write(store, keys::COMPONENTS, &self.registry.components())?;
        write(store, keys::CATEGORIES, &self.registry.categories())?;
        write(store, keys::SELECTED_CATEGORY, &self.selected_category)?;
        write(store, keys::PLACEMENTS, &self.placements.placements())?;
        write(store, keys::OPTIONS, &self.options)?;
        write_version(store)
    }
}

/// Serialize `value` under `key`.
///
/// # Errors
///
/// Returns [`StoreError::Serialization`] or the backend's error.
pub fn write<T: Serialize + ?Sized>(
    store: &impl KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let value = serde_json::to_value(value).map_err(|e| StoreError::Serialization(e.to_string()))?;
    store.set(key, &value)
}

/// Stamp [`SCHEMA_VERSION`].
///
/// # Errors
///
/// Returns the backend's error.
pub fn write_version(store: &impl KeyValueStore) -> Result<(), StoreError> {
    store.set(keys::SCHEMA_VERSION, &Value::from(SCHEMA_VERSION))
}

fn records(store: &impl KeyValueStore, key: &str) -> Vec<Value> {
    match store.get(key) {
        Some(Value::Array(items)) => items,
        Some(_) => {
            tracing::warn!("Ignoring malformed {key} value");
            Vec::new()
        }
        None => Vec::new(),
    }
}

/// Accepts a bare id or a whole category object.
fn selected_category(value: Value) -> Option<CategoryId> {
    match value {
        Value::String(id) => Some(CategoryId::from(id)),
        Value::Object(mut object) => match object.remove("id") {
            Some(Value::String(id)) => Some(CategoryId::from(id)),
            _ => None,
        },
        _ => None,
    }
}

fn migrate_component(record: Value, index: usize) -> Option<Component> {
    let Value::Object(mut object) = record else {
        tracing::warn!("Skipping component #{index}: not an object");
        return None;
    };
    if !matches!(object.get("dataUrl"), Some(Value::String(_))) {
        tracing::warn!("Skipping component #{index}: missing dataUrl");
        return None;
    }
    backfill(&mut object, "id", || Value::from(ComponentId::new().to_string()));
    backfill(&mut object, "name", || Value::from(placeholder_name()));
    backfill(&mut object, "categoryId", || {
        Value::from(CategoryId::uncategorized().to_string())
    });
    serde_json::from_value(Value::Object(object))
        .map_err(|e| tracing::warn!("Skipping component #{index}: {e}"))
        .ok()
}

fn migrate_placements(records: Vec<Value>) -> Vec<Placement> {
    let count = records.len();
    let mut migrated: Vec<Placement> = Vec::with_capacity(count);
    let mut missing_ids = Vec::new();

    for (index, record) in records.into_iter().enumerate() {
        let Value::Object(mut object) = record else {
            tracing::warn!("Skipping placement #{index}: not an object");
            continue;
        };
        let Some(component) = object
            .remove("component")
            .and_then(|c| migrate_component(c, index))
        else {
            tracing::warn!("Skipping placement #{index}: unusable component");
            continue;
        };

        let sequence = object
            .get("id")
            .and_then(Value::as_str)
            .and_then(|id| id.rsplit_once('-'))
            .and_then(|(_, seq)| seq.parse::<u64>().ok())
            .unwrap_or(index as u64 + 1);
        let transform = match object.remove("transform") {
            Some(Value::String(css)) => Transform::parse_css(&css).unwrap_or_else(|e| {
                tracing::warn!("Resetting transform of placement #{index}: {e}");
                Transform::IDENTITY
            }),
            _ => Transform::IDENTITY,
        };
        let has_id = matches!(object.get("id"), Some(Value::String(_)));

        backfill(&mut object, "visible", || Value::Bool(true));
        backfill(&mut object, "layerName", || {
            Value::from(format!("{}_{sequence}", component.name))
        });
        backfill(&mut object, "zIndex", || {
            Value::from(i64::try_from(count - index).unwrap_or(i64::MAX))
        });
        backfill(&mut object, "id", || Value::from(String::new()));
        object.insert("transform".into(), Value::from(transform.to_css()));
        object.insert(
            "component".into(),
            serde_json::to_value(&component).unwrap_or(Value::Null),
        );

        match serde_json::from_value::<Placement>(Value::Object(object)) {
            Ok(placement) => {
                if !has_id {
                    missing_ids.push(migrated.len());
                }
                migrated.push(placement);
            }
            Err(e) => tracing::warn!("Skipping placement #{index}: {e}"),
        }
    }

    // Assign ids past every persisted sequence so nothing collides.
    let mut next = next_sequence(migrated.iter().map(|p| &p.id));
    for position in missing_ids {
        let placement = &mut migrated[position];
        placement.id = format!("{}-{next}", placement.component.id).into();
        next = following(next);
    }
    migrated
}

fn backfill(object: &mut Map<String, Value>, key: &str, default: impl FnOnce() -> Value) {
    if object.get(key).map_or(true, Value::is_null) {
        object.insert(key.to_string(), default());
    }
}
