//! I/O boundary traits for testability
//!
//! The category repository port is what the service layer talks to; any store
//! that implements it (in-memory, file, database) is interchangeable. The
//! filesystem trait sits underneath the file-backed store.

use std::io::{self, Write};
use std::path::Path;

use crate::domain::{Category, CategoryId};
use crate::infrastructure::error::StoreResult;

/// One unit of work against a category store.
///
/// Reads see the transaction's own writes. Nothing becomes visible to other
/// transactions until [`commit`](CategoryTx::commit); dropping the transaction
/// discards its writes.
pub trait CategoryTx {
    /// Insert or replace a category, keyed by its id.
    fn save(&mut self, category: Category) -> StoreResult<Category>;

    fn find_by_id(&self, id: CategoryId) -> StoreResult<Option<Category>>;

    /// Exact (case-sensitive) name match.
    fn find_by_name(&self, name: &str) -> StoreResult<Option<Category>>;

    fn find_all(&self) -> StoreResult<Vec<Category>>;

    /// Direct children of `parent_id`; `None` selects the roots.
    fn find_children(&self, parent_id: Option<CategoryId>) -> StoreResult<Vec<Category>>;

    fn exists_children(&self, parent_id: CategoryId) -> StoreResult<bool>;

    /// Remove a category. Removing an unknown id is a no-op.
    fn delete_by_id(&mut self, id: CategoryId) -> StoreResult<()>;

    /// Publish all writes atomically.
    fn commit(self: Box<Self>) -> StoreResult<()>;
}

/// Category repository port.
///
/// Implementations must isolate a transaction from concurrent writers until
/// commit, either by holding a lock for its lifetime or by rejecting the
/// commit when the underlying data changed since `begin`.
pub trait CategoryRepository: Send + Sync {
    fn begin(&self) -> StoreResult<Box<dyn CategoryTx + '_>>;
}

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Replace file content so readers see either the old or the new file.
    fn write_atomic(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Create directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Create parent directories if needed.
    fn ensure_parent(&self, path: &Path) -> io::Result<()>;
}

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write_atomic(&self, path: &Path, content: &str) -> io::Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn ensure_parent(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                self.create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}
