use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::file_lock::CatalogLock;
use super::working_set::WorkingSet;
use crate::domain::{Category, CategoryId};
use crate::infrastructure::error::{StoreError, StoreResult};
use crate::infrastructure::traits::{CategoryRepository, CategoryTx, FileSystem};

/// On-disk layout of a catalog file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogDocument {
    /// Bumped on every committed write; used for optimistic concurrency.
    #[serde(default)]
    revision: u64,
    #[serde(default)]
    categories: Vec<Category>,
}

/// Category store persisted as a single TOML file.
///
/// Transactions inside one process are serialized by a mutex, and across
/// processes by an exclusive OS lock on `<catalog>.lock` held from `begin`
/// until the transaction commits or is dropped. The file's `revision` still
/// guards against writers that bypass the lock, such as a hand edit: a commit
/// fails with [`StoreError::Conflict`] when the file changed since `begin`.
/// A missing file is an empty catalog.
pub struct TomlFileStore {
    path: PathBuf,
    fs: Arc<dyn FileSystem>,
    lock: Mutex<()>,
}

impl TomlFileStore {
    pub fn new(path: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            path: path.into(),
            fs,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> StoreResult<CatalogDocument> {
        if !self.fs.exists(&self.path) {
            return Ok(CatalogDocument::default());
        }
        let content = self
            .fs
            .read_to_string(&self.path)
            .map_err(|e| StoreError::io(format!("read {}", self.path.display()), e))?;
        toml::from_str(&content).map_err(|e| StoreError::Parse {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    fn store(&self, document: &CatalogDocument) -> StoreResult<()> {
        let content =
            toml::to_string_pretty(document).map_err(|e| StoreError::Serialize(e.to_string()))?;
        self.fs
            .ensure_parent(&self.path)
            .map_err(|e| StoreError::io(format!("create parent of {}", self.path.display()), e))?;
        self.fs
            .write_atomic(&self.path, &content)
            .map_err(|e| StoreError::io(format!("write {}", self.path.display()), e))
    }
}

impl CategoryRepository for TomlFileStore {
    #[instrument(level = "debug", skip(self), fields(path = %self.path.display()))]
    fn begin(&self) -> StoreResult<Box<dyn CategoryTx + '_>> {
        let guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        self.fs
            .ensure_parent(&self.path)
            .map_err(|e| StoreError::io(format!("create parent of {}", self.path.display()), e))?;
        let file_lock = CatalogLock::acquire(&self.path)?;
        let document = self.load()?;
        debug!(
            revision = document.revision,
            count = document.categories.len(),
            "catalog loaded"
        );
        let working = WorkingSet::new(
            document
                .categories
                .into_iter()
                .map(|c| (c.id, c))
                .collect(),
        );
        Ok(Box::new(TomlTx {
            store: self,
            _file_lock: file_lock,
            _guard: guard,
            base_revision: document.revision,
            working,
        }))
    }
}

struct TomlTx<'a> {
    store: &'a TomlFileStore,
    // dropped before the mutex guard
    _file_lock: CatalogLock,
    _guard: MutexGuard<'a, ()>,
    base_revision: u64,
    working: WorkingSet,
}

impl CategoryTx for TomlTx<'_> {
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
        if !self.working.is_dirty() {
            return Ok(());
        }
        let found = self.store.load()?.revision;
        if found != self.base_revision {
            return Err(StoreError::Conflict {
                expected: self.base_revision,
                found,
            });
        }
        let document = CatalogDocument {
            revision: self.base_revision + 1,
            categories: self.working.find_all(),
        };
        self.store.store(&document)?;
        debug!(revision = document.revision, "catalog committed");
        Ok(())
    }
}
