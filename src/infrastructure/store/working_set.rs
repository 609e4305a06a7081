//! In-memory category set shared by the store adapters' transactions.

use std::collections::HashMap;

use crate::domain::{sort_siblings, Category, CategoryId};

/// Mutable copy of a store's categories, owned by one transaction.
#[derive(Debug, Clone, Default)]
pub(crate) struct WorkingSet {
    categories: HashMap<CategoryId, Category>,
    dirty: bool,
}

impl WorkingSet {
    pub(crate) fn new(categories: HashMap<CategoryId, Category>) -> Self {
        Self {
            categories,
            dirty: false,
        }
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn into_inner(self) -> HashMap<CategoryId, Category> {
        self.categories
    }

    pub(crate) fn save(&mut self, category: Category) -> Category {
        self.dirty = true;
        self.categories.insert(category.id, category.clone());
        category
    }

    pub(crate) fn find_by_id(&self, id: CategoryId) -> Option<Category> {
        self.categories.get(&id).cloned()
    }

    pub(crate) fn find_by_name(&self, name: &str) -> Option<Category> {
        self.categories.values().find(|c| c.name == name).cloned()
    }

    /// All categories in sibling order.
    pub(crate) fn find_all(&self) -> Vec<Category> {
        let mut all: Vec<Category> = self.categories.values().cloned().collect();
        sort_siblings(&mut all);
        all
    }

    pub(crate) fn find_children(&self, parent_id: Option<CategoryId>) -> Vec<Category> {
        let mut children: Vec<Category> = self
            .categories
            .values()
            .filter(|c| c.parent_id == parent_id)
            .cloned()
            .collect();
        sort_siblings(&mut children);
        children
    }

    pub(crate) fn exists_children(&self, parent_id: CategoryId) -> bool {
        self.categories
            .values()
            .any(|c| c.parent_id == Some(parent_id))
    }

    pub(crate) fn delete_by_id(&mut self, id: CategoryId) {
        if self.categories.remove(&id).is_some() {
            self.dirty = true;
        }
    }
}
