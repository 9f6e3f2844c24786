// src/state.rs
use std::sync::Arc;

use crate::services::{
    provider::ChatProvider,
    session_manager::{SessionManager, SessionStore},
};

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub sessions: Arc<dyn SessionStore>,
    pub provider: Arc<dyn ChatProvider>,
}

impl AppState {
    /// State backed by the in-memory session store.
    pub fn new(provider: Arc<dyn ChatProvider>) -> Self {
        Self::with_store(Arc::new(SessionManager::new()), provider)
    }

    pub fn with_store(sessions: Arc<dyn SessionStore>, provider: Arc<dyn ChatProvider>) -> Self {
        Self { sessions, provider }
    }
}
