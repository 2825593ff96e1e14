use std::sync::Arc;

use crate::backend::{ApiClient, Config, HttpApiClient};
use crate::error::AppError;
use crate::session::SessionStore;

/// Shared handles every view works against.
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn ApiClient>,
    pub config: Config,
}

impl AppState {
    pub fn from_env() -> Result<Self, AppError> {
        let config = Config::from_env();
        let api: Arc<dyn ApiClient> = Arc::new(HttpApiClient::new(&config)?);
        Ok(Self { api, config })
    }

    pub fn new(api: Arc<dyn ApiClient>, config: Config) -> Self {
        Self { api, config }
    }

    /// Opens the persistent client state in the configured directory.
    pub fn open_store(&self) -> Result<SessionStore, AppError> {
        let dir = SessionStore::default_dir(self.config.state_dir.as_deref());
        SessionStore::open(&dir)
    }
}
