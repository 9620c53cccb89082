//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{GenerateService, MetarigService};
use crate::application::{BuiltinWidgets, WidgetCatalog};
use crate::config::Settings;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Widget shape catalog
    pub widgets: Arc<dyn WidgetCatalog>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        let widgets = Arc::new(BuiltinWidgets::new(settings.widget_prefix.clone()));
        Self::with_deps(settings, Arc::new(RealFileSystem), widgets)
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        widgets: Arc<dyn WidgetCatalog>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self {
            settings,
            fs,
            widgets,
        }
    }

    pub fn metarig_service(&self) -> MetarigService {
        MetarigService::new(Arc::clone(&self.fs))
    }

    pub fn generate_service(&self) -> GenerateService {
        GenerateService::new(Arc::clone(&self.settings), Arc::clone(&self.widgets))
    }
}
