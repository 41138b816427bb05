//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::MindMapService;
use crate::config::Settings;
use crate::infrastructure::repository::JsonFileRepository;
use crate::infrastructure::traits::{FileSystem, MindMapRepository, RealFileSystem};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Mind map storage
    pub repo: Arc<dyn MindMapRepository>,

    pub mindmaps: MindMapService,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
        let repo = Arc::new(JsonFileRepository::new(fs.clone(), &settings.data_dir));
        Self::with_deps(settings, fs, repo)
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        repo: Arc<dyn MindMapRepository>,
    ) -> Self {
        let settings = Arc::new(settings);
        let mindmaps = MindMapService::new(repo.clone(), settings.clone());

        Self {
            settings,
            fs,
            repo,
            mindmaps,
        }
    }
}
