//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::render::HtmlRenderer;
use crate::application::services::{SiteService, SourceLoader};
use crate::config::Settings;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> Self {
        let settings = Arc::new(settings);

        Self { settings, fs }
    }

    pub fn source_loader(&self) -> SourceLoader {
        SourceLoader::new(Arc::clone(&self.fs), self.settings.loader_options())
    }

    pub fn site_service(&self) -> SiteService {
        SiteService::new(
            Arc::clone(&self.fs),
            self.source_loader(),
            self.settings.build_options(),
            Box::new(HtmlRenderer::new()),
        )
    }
}
