use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use tracing::trace;

use super::working_set::WorkingSet;
use crate::domain::{Category, CategoryId};
use crate::infrastructure::error::{StoreError, StoreResult};
use crate::infrastructure::traits::{CategoryRepository, CategoryTx};

/// Process-local category store.
///
/// A transaction holds the store mutex from `begin` until it is committed or
/// dropped, so concurrent use cases are serialized.
#[derive(Debug, Default)]
pub struct MemoryStore {
    categories: Mutex<HashMap<CategoryId, Category>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a store, e.g. with fixture data.
    pub fn with_categories(categories: impl IntoIterator<Item = Category>) -> Self {
        Self {
            categories: Mutex::new(categories.into_iter().map(|c| (c.id, c)).collect()),
        }
    }
}

impl CategoryRepository for MemoryStore {
    fn begin(&self) -> StoreResult<Box<dyn CategoryTx + '_>> {
        let guard = self.categories.lock().map_err(|_| StoreError::Poisoned)?;
        let working = WorkingSet::new(guard.clone());
        trace!(count = guard.len(), "memory store: begin");
        Ok(Box::new(MemoryTx { guard, working }))
    }
}

struct MemoryTx<'a> {
    guard: MutexGuard<'a, HashMap<CategoryId, Category>>,
    working: WorkingSet,
}

impl CategoryTx for MemoryTx<'_> {
    fn save(&mut self, category: Category) -> StoreResult<Category> {
        Ok(self.working.save(category))
    }

    fn find_by_id(&self, id: CategoryId) -> StoreResult<Option<Category>> {
        Ok(self.working.find_by_id(id))
    }

    fn find_by_name(&self, name: &str) -> StoreResult<Option<Category>> {
        Ok(self.working.find_by_name(name))
    }

    fn find_all(&self) -> StoreResult<Vec<Category>> {
        Ok(self.working.find_all())
    }

    fn find_children(&self, parent_id: Option<CategoryId>) -> StoreResult<Vec<Category>> {
        Ok(self.working.find_children(parent_id))
    }

    fn exists_children(&self, parent_id: CategoryId) -> StoreResult<bool> {
        Ok(self.working.exists_children(parent_id))
    }

    fn delete_by_id(&mut self, id: CategoryId) -> StoreResult<()> {
        self.working.delete_by_id(id);
        Ok(())
    }

    fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemoryTx { mut guard, working } = *self;
        if working.is_dirty() {
            *guard = working.into_inner();
            trace!(count = guard.len(), "memory store: committed");
        }
        Ok(())
    }
}
