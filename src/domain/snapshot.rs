//! Id-indexed, read-only view of all categories.

use std::collections::HashMap;

use super::engine::{sort_siblings, CategoryLookup};
use super::entities::{Category, CategoryId};

/// Every category keyed by id, as read at one point in time.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    by_id: HashMap<CategoryId, Category>,
}

impl Snapshot {
    pub fn new(categories: Vec<Category>) -> Self {
        categories.into_iter().collect()
    }

    pub fn get(&self, id: CategoryId) -> Option<&Category> {
        self.by_id.get(&id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// All categories in sibling order (sort order, then id).
    pub fn to_sorted_vec(&self) -> Vec<Category> {
        let mut all: Vec<Category> = self.by_id.values().cloned().collect();
        sort_siblings(&mut all);
        all
    }

    pub fn child_count(&self, parent: CategoryId) -> usize {
        self.by_id
            .values()
            .filter(|c| c.parent_id == Some(parent))
            .count()
    }
}

impl FromIterator<Category> for Snapshot {
    fn from_iter<I: IntoIterator<Item = Category>>(iter: I) -> Self {
        Self {
            by_id: iter.into_iter().map(|c| (c.id, c)).collect(),
        }
    }
}

impl CategoryLookup for Snapshot {
    fn lookup(&self, id: CategoryId) -> Option<&Category> {
        self.get(id)
    }
}
