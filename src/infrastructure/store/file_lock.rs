//! OS-level exclusive lock on a sidecar file next to the catalog

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::debug;

use crate::infrastructure::error::{StoreError, StoreResult};

/// Exclusive lock on `<catalog>.lock`, released on drop.
///
/// Blocks until no other holder, in this or another process, keeps the lock.
pub(super) struct CatalogLock {
    path: PathBuf,
    file: File,
}

impl CatalogLock {
    pub(super) fn acquire(catalog: &Path) -> StoreResult<Self> {
        let path = lock_path(catalog);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| StoreError::io(format!("open lock {}", path.display()), e))?;
        file.lock_exclusive()
            .map_err(|e| StoreError::io(format!("lock {}", path.display()), e))?;
        debug!(lock = %path.display(), "catalog lock acquired");
        Ok(Self { path, file })
    }
}

impl Drop for CatalogLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
        debug!(lock = %self.path.display(), "catalog lock released");
    }
}

pub(super) fn lock_path(catalog: &Path) -> PathBuf {
    let mut name = catalog.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}
