//! In-memory catalog of drawn components grouped by category.

use serde::{Deserialize, Serialize};

use crate::component::{Category, CategoryId, Component, ComponentId};
use crate::{EditorError, EditorResult};

/// Catalog of components and categories, in registration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRegistry {
    components: Vec<Component>,
    categories: Vec<Category>,
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self {
            components: Vec::new(),
            categories: Category::seed(),
        }
    }
}

impl ComponentRegistry {
    /// Create a registry holding only the seed categories.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a registry from persisted collections.
    ///
    /// The synthetic "All" and "Uncategorized" categories are restored if the
    /// persisted list lost them.
    #[must_use]
    pub fn from_parts(components: Vec<Component>, mut categories: Vec<Category>) -> Self {
        for (position, seed) in Category::seed().into_iter().enumerate() {
            if !categories.iter().any(|c| c.id == seed.id) {
                categories.insert(position.min(categories.len()), seed);
            }
        }
        Self {
            components,
            categories,
        }
    }

    /// Create a category with a freshly generated id.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidOperation`] if the name is blank.
    pub fn create_category(&mut self, name: &str) -> EditorResult<Category> {
        let mut id = CategoryId::generate();
        while self.category(&id).is_some() {
            id = CategoryId::generate();
        }
        self.insert_category(id, name)
    }

    /// Register a category under a caller-chosen id.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidOperation`] if the name is blank and
    /// [`EditorError::DuplicateCategory`] if the id is taken.
    pub fn insert_category(&mut self, id: CategoryId, name: &str) -> EditorResult<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EditorError::InvalidOperation(
                "category name must not be blank".into(),
            ));
        }
        if self.category(&id).is_some() {
            return Err(EditorError::DuplicateCategory(id.to_string()));
        }
        let category = Category::new(id, name);
        self.categories.push(category.clone());
        tracing::debug!("Created category {} ({})", category.name, category.id);
        Ok(category)
    }

    /// Register a new component.
    ///
    /// A blank name becomes a `C-` placeholder. Components filed under the
    /// synthetic "All" category land in "Uncategorized".
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::CategoryNotFound`] if the category is unknown.
    pub fn create_component(
        &mut self,
        data_url: &str,
        name: &str,
        category_id: CategoryId,
    ) -> EditorResult<Component> {
        let category_id = if category_id.is_all() {
            CategoryId::uncategorized()
        } else {
            category_id
        };
        if self.category(&category_id).is_none() {
            return Err(EditorError::CategoryNotFound(category_id.to_string()));
        }
        let component = Component::new(data_url, name, category_id);
        self.components.push(component.clone());
        tracing::debug!("Created component {} ({})", component.name, component.id);
        Ok(component)
    }

    /// Delete a category and every component filed under it.
    ///
    /// Returns the ids of the removed components so callers can cascade
    /// further.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::ProtectedCategory`] for the "All" and
    /// "Uncategorized" categories and
    /// [`EditorError::CategoryNotFound`] for unknown ids.
    pub fn delete_category(&mut self, id: &CategoryId) -> EditorResult<Vec<ComponentId>> {
        if id.is_protected() {
            return Err(EditorError::ProtectedCategory(id.to_string()));
        }
        let before = self.categories.len();
        self.categories.retain(|c| &c.id != id);
        if self.categories.len() == before {
            return Err(EditorError::CategoryNotFound(id.to_string()));
        }

        let removed: Vec<ComponentId> = self
            .components
            .iter()
            .filter(|c| &c.category_id == id)
            .map(|c| c.id.clone())
            .collect();
        self.components.retain(|c| &c.category_id != id);
        tracing::debug!(
            "Deleted category {id} with {} component(s)",
            removed.len()
        );
        Ok(removed)
    }

    /// Delete a component by id.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::ComponentNotFound`] for unknown ids.
    pub fn delete_component(&mut self, id: &ComponentId) -> EditorResult<Component> {
        let position = self
            .components
            .iter()
            .position(|c| &c.id == id)
            .ok_or_else(|| EditorError::ComponentNotFound(id.to_string()))?;
        Ok(self.components.remove(position))
    }

    /// Components in a category, in registration order. "All" yields everything.
    pub fn components_by_category<'a>(
        &'a self,
        id: &'a CategoryId,
    ) -> impl Iterator<Item = &'a Component> + 'a {
        self.components
            .iter()
            .filter(move |c| id.is_all() || &c.category_id == id)
    }

    /// Number of components shown for a category.
    #[must_use]
    pub fn component_count(&self, id: &CategoryId) -> usize {
        self.components_by_category(id).count()
    }

    /// Look up a component.
    #[must_use]
    pub fn component(&self, id: &ComponentId) -> Option<&Component> {
        self.components.iter().find(|c| &c.id == id)
    }

    /// Look up a category.
    #[must_use]
    pub fn category(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| &c.id == id)
    }

    /// All components in registration order.
    #[must_use]
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// All categories in creation order.
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with_icons() -> ComponentRegistry {
        let mut registry = ComponentRegistry::new();
        registry
            .insert_category(CategoryId::from("10"), "Icons")
            .expect("insert");
        registry
    }

    #[test]
    fn new_registry_has_seed_categories() {
        let registry = ComponentRegistry::new();
        assert_eq!(registry.categories().len(), 2);
        assert!(registry.category(&CategoryId::all()).is_some());
        assert!(registry.category(&CategoryId::uncategorized()).is_some());
    }

    #[test]
    fn create_category_appends_unique_ids() {
        let mut registry = ComponentRegistry::new();
        let a = registry.create_category("Animals").expect("create");
        let b = registry.create_category("Plants").expect("create");
        assert_ne!(a.id, b.id);
        assert_eq!(registry.categories().last(), Some(&b));
    }

    #[test]
    fn blank_category_name_is_rejected() {
        let mut registry = ComponentRegistry::new();
        let result = registry.create_category("  ");
        assert!(matches!(result, Err(EditorError::InvalidOperation(_))));
    }

    #[test]
    fn duplicate_category_id_is_rejected() {
        let mut registry = registry_with_icons();
        let result = registry.insert_category(CategoryId::from("10"), "Again");
        assert!(matches!(result, Err(EditorError::DuplicateCategory(_))));
    }

    #[test]
    fn create_component_with_empty_name() {
        let mut registry = ComponentRegistry::new();
        let component = registry
            .create_component("data:,", "", CategoryId::uncategorized())
            .expect("create");
        assert!(!component.name.is_empty());
        assert!(component.name.starts_with("C-"));
    }

    #[test]
    fn create_component_in_all_lands_in_uncategorized() {
        let mut registry = ComponentRegistry::new();
        let component = registry
            .create_component("data:,", "Dot", CategoryId::all())
            .expect("create");
        assert_eq!(component.category_id, CategoryId::uncategorized());
    }

    #[test]
    fn create_component_in_unknown_category_fails() {
        let mut registry = ComponentRegistry::new();
        let result = registry.create_component("data:,", "Dot", CategoryId::from("missing"));
        assert!(matches!(result, Err(EditorError::CategoryNotFound(_))));
    }

    #[test]
    fn components_by_category_filters_and_keeps_order() {
        let mut registry = registry_with_icons();
        let star = registry
            .create_component("data:,", "Star", CategoryId::from("10"))
            .expect("star");
        let tree = registry
            .create_component("data:,", "Tree", CategoryId::uncategorized())
            .expect("tree");
        let moon = registry
            .create_component("data:,", "Moon", CategoryId::from("10"))
            .expect("moon");

        let icons = CategoryId::from("10");
        let names: Vec<_> = registry
            .components_by_category(&icons)
            .map(|c| c.id.clone())
            .collect();
        assert_eq!(names, vec![star.id.clone(), moon.id.clone()]);

        let all = CategoryId::all();
        let everything: Vec<_> = registry
            .components_by_category(&all)
            .map(|c| c.id.clone())
            .collect();
        assert_eq!(everything, vec![star.id, tree.id, moon.id]);
        assert_eq!(registry.component_count(&all), 3);
        assert_eq!(registry.component_count(&icons), 2);
    }

    #[test]
    fn delete_category_cascades_to_components() {
        let mut registry = registry_with_icons();
        let star = registry
            .create_component("data:,", "Star", CategoryId::from("10"))
            .expect("star");
        registry
            .create_component("data:,", "Tree", CategoryId::uncategorized())
            .expect("tree");

        let removed = registry
            .delete_category(&CategoryId::from("10"))
            .expect("delete");
        assert_eq!(removed, vec![star.id]);
        assert_eq!(registry.components().len(), 1);
        assert!(registry.category(&CategoryId::from("10")).is_none());
    }

    #[test]
    fn seed_categories_are_protected() {
        let mut registry = ComponentRegistry::new();
        for id in [CategoryId::all(), CategoryId::uncategorized()] {
            let result = registry.delete_category(&id);
            assert!(matches!(result, Err(EditorError::ProtectedCategory(_))));
        }
        assert_eq!(registry.categories().len(), 2);
    }

    #[test]
    fn delete_component_matches_id_not_name() {
        let mut registry = ComponentRegistry::new();
        let first = registry
            .create_component("data:,", "Twin", CategoryId::uncategorized())
            .expect("first");
        let second = registry
            .create_component("data:,", "Twin", CategoryId::uncategorized())
            .expect("second");

        registry.delete_component(&first.id).expect("delete");
        assert_eq!(registry.components(), &[second]);
        assert!(matches!(
            registry.delete_component(&first.id),
            Err(EditorError::ComponentNotFound(_))
        ));
    }

    #[test]
    fn from_parts_restores_seed_categories() {
        let registry = ComponentRegistry::from_parts(Vec::new(), vec![Category::new("7", "Mine")]);
        let ids: Vec<_> = registry.categories().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["0", "1", "7"]);
    }
}
