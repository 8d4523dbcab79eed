use std::sync::Arc;

use gtm_site_core::auth::{PasswordGate, SessionKeys};
use gtm_site_core::events::EventBus;
use gtm_site_core::ContentService;

use crate::config::AppConfig;

/// Shared application state, passed to all handlers via Axum's `State` extractor.
/// Wrapped in `Arc` so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    content: ContentService,
    config: AppConfig,
    /// `None` when no admin password hash is configured; logins then fail.
    password: Option<PasswordGate>,
    sessions: SessionKeys,
}

impl AppState {
    pub fn new(content: ContentService, config: AppConfig, password: Option<PasswordGate>) -> Self {
        let sessions = SessionKeys::new(config.jwt_secret.as_bytes(), config.session_ttl);
        Self {
            inner: Arc::new(InnerState {
                content,
                config,
                password,
                sessions,
            }),
        }
    }

    pub fn content(&self) -> &ContentService {
        &self.inner.content
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn password(&self) -> Option<&PasswordGate> {
        self.inner.password.as_ref()
    }

    pub fn sessions(&self) -> &SessionKeys {
        &self.inner.sessions
    }

    pub fn event_bus(&self) -> &EventBus {
        self.inner.content.events()
    }
}
