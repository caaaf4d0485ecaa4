use std::sync::Arc;

use doctranslate_core::{Authenticator, Config, FileLibrary, SanitizedConfig, TranslateOrchestrator};

/// Shared application state
pub struct AppState {
    config: Config,
    authenticator: Arc<dyn Authenticator>,
    orchestrator: Arc<TranslateOrchestrator>,
    library: Arc<FileLibrary>,
}

impl AppState {
    pub fn new(
        config: Config,
        authenticator: Arc<dyn Authenticator>,
        orchestrator: Arc<TranslateOrchestrator>,
        library: Arc<FileLibrary>,
    ) -> Self {
        Self {
            config,
            authenticator,
            orchestrator,
            library,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn authenticator(&self) -> &dyn Authenticator {
        self.authenticator.as_ref()
    }

    pub fn orchestrator(&self) -> &Arc<TranslateOrchestrator> {
        &self.orchestrator
    }

    pub fn library(&self) -> &FileLibrary {
        self.library.as_ref()
    }
}
