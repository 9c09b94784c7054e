//! Registry entries - the drawn components and the categories grouping them.

use base64::Engine;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of the synthetic "All" category.
pub const ALL_CATEGORY_ID: &str = "0";

/// Identifier of the default "Uncategorized" category.
pub const UNCATEGORIZED_CATEGORY_ID: &str = "1";

/// Prefix of generated component names.
const PLACEHOLDER_PREFIX: &str = "C-";

/// Unique identifier for a component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(String);

impl ComponentId {
    /// Create a new unique component ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ComponentId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for ComponentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ComponentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for ComponentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(String);

impl CategoryId {
    /// Generate a fresh short hexadecimal category ID.
    #[must_use]
    pub fn generate() -> Self {
        // Low 32 bits of a v4 uuid, rendered like the browser's getRandomValues ids.
        #[allow(clippy::cast_possible_truncation)]
        let value = Uuid::new_v4().as_u128() as u32;
        Self(format!("{value:x}"))
    }

    /// The synthetic "All" category.
    #[must_use]
    pub fn all() -> Self {
        Self(ALL_CATEGORY_ID.to_string())
    }

    /// The default "Uncategorized" category.
    #[must_use]
    pub fn uncategorized() -> Self {
        Self(UNCATEGORIZED_CATEGORY_ID.to_string())
    }

    /// Whether this is the synthetic "All" category.
    #[must_use]
    pub fn is_all(&self) -> bool {
        self.0 == ALL_CATEGORY_ID
    }

    /// Whether this is one of the seed categories, which cannot be deleted.
    #[must_use]
    pub fn is_protected(&self) -> bool {
        self.0 == ALL_CATEGORY_ID || self.0 == UNCATEGORIZED_CATEGORY_ID
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CategoryId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for CategoryId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for CategoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named group of components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier.
    pub id: CategoryId,
    /// Display name.
    pub name: String,
}

impl Category {
    /// Create a category.
    #[must_use]
    pub fn new(id: impl Into<CategoryId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// The categories every fresh store starts with.
    #[must_use]
    pub fn seed() -> Vec<Self> {
        vec![
            Self::new(ALL_CATEGORY_ID, "All"),
            Self::new(UNCATEGORIZED_CATEGORY_ID, "Uncategorized"),
        ]
    }
}

/// A drawn bitmap registered for reuse on the canvas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    /// Unique identifier.
    pub id: ComponentId,
    /// Display name.
    pub name: String,
    /// Owning category.
    pub category_id: CategoryId,
    /// Encoded bitmap (data URL). Never decoded by the editor.
    pub data_url: String,
}

impl Component {
    /// Create a component with a fresh id.
    ///
    /// A blank name is replaced by a generated placeholder.
    #[must_use]
    pub fn new(data_url: impl Into<String>, name: &str, category_id: CategoryId) -> Self {
        let name = if name.trim().is_empty() {
            placeholder_name()
        } else {
            name.to_string()
        };
        Self {
            id: ComponentId::new(),
            name,
            category_id,
            data_url: data_url.into(),
        }
    }
}

/// Generate a `C-xxxxxxxx` placeholder name.
#[must_use]
pub fn placeholder_name() -> String {
    format!("{PLACEHOLDER_PREFIX}{}", short_random_id())
}

/// Eight random lowercase hex characters.
#[must_use]
pub fn short_random_id() -> String {
    let mut simple = Uuid::new_v4().simple().to_string();
    simple.truncate(8);
    simple
}

/// Encode raw PNG bytes as a `data:image/png;base64,...` URL.
#[must_use]
pub fn data_url_from_png(bytes: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:image/png;base64,{encoded}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_name_gets_placeholder() {
        let component = Component::new("data:,", "   ", CategoryId::uncategorized());
        assert!(component.name.starts_with("C-"));
        assert_eq!(component.name.len(), 10);
    }

    #[test]
    fn explicit_name_is_kept() {
        let component = Component::new("data:,", "Star", CategoryId::uncategorized());
        assert_eq!(component.name, "Star");
    }

    #[test]
    fn component_ids_are_unique() {
        let a = ComponentId::new();
        let b = ComponentId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn generated_category_id_is_hex() {
        let id = CategoryId::generate();
        assert!(!id.as_str().is_empty());
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn component_serializes_camel_case() {
        let component = Component::new("data:,", "Star", CategoryId::from("10"));
        let json = serde_json::to_value(&component).expect("serialize");
        assert_eq!(json["categoryId"], "10");
        assert_eq!(json["dataUrl"], "data:,");
    }

    #[test]
    fn png_data_url_has_prefix() {
        let url = data_url_from_png(&[0x89, b'P', b'N', b'G']);
        assert_eq!(url, "data:image/png;base64,iVBORw==");
    }
}
