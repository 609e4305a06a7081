//! Service container for dependency injection
//!
//! Wires settings, the category store and the category service together.

use std::sync::Arc;

use crate::application::services::CategoryService;
use crate::config::Settings;
use crate::domain::TreeEngine;
use crate::infrastructure::store::TomlFileStore;
use crate::infrastructure::traits::{CategoryRepository, FileSystem, RealFileSystem};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Category use cases
    pub categories: CategoryService,
}

impl ServiceContainer {
    /// Create a container backed by the catalog file named in `settings`.
    pub fn new(settings: Settings) -> Self {
        Self::with_fs(settings, Arc::new(RealFileSystem))
    }

    /// Catalog file store on a custom filesystem.
    pub fn with_fs(settings: Settings, fs: Arc<dyn FileSystem>) -> Self {
        let repository = Arc::new(TomlFileStore::new(settings.catalog_file.clone(), fs));
        Self::with_repository(settings, repository)
    }

    /// Create a service container with a custom store (for testing).
    pub fn with_repository(settings: Settings, repository: Arc<dyn CategoryRepository>) -> Self {
        let engine = TreeEngine::new(settings.max_depth);
        let categories = CategoryService::new(repository, engine);
        Self {
            settings: Arc::new(settings),
            categories,
        }
    }
}
