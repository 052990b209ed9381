//! Application state management

use std::sync::Arc;

use crate::config::Config;
use crate::controller::Controller;
use crate::ocr::{OcrService, TextExtractor};
use crate::session::SessionStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    sessions: SessionStore,
    controller: Controller,
}

impl AppState {
    /// Create a new application state around an already constructed OCR
    /// service. The service is shared by every session.
    pub fn new(config: Config, ocr: Arc<OcrService>) -> Self {
        let sessions = SessionStore::new(chrono::Duration::minutes(config.session.ttl_minutes));
        let controller = Controller::new(TextExtractor::new(ocr));

        Self {
            inner: Arc::new(AppStateInner {
                config,
                sessions,
                controller,
            }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the session store
    pub fn sessions(&self) -> &SessionStore {
        &self.inner.sessions
    }

    /// Get the interaction controller
    pub fn controller(&self) -> &Controller {
        &self.inner.controller
    }

    /// Get the OCR service
    pub fn ocr(&self) -> &OcrService {
        self.inner.controller.extractor().ocr()
    }
}
