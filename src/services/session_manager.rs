// src/services/session_manager.rs
use std::{collections::HashMap, fmt::Debug, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::provider::{ChatProvider, ConversationHandle};

/// Key used when the caller does not name a session.
pub const DEFAULT_SESSION_ID: &str = "default";

/// Maps session keys to their conversation handles.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Return the handle for `session_id`, creating an empty conversation
    /// through `provider` if this key has never been seen.
    ///
    /// Concurrent first calls for the same key must all receive the same handle.
    async fn get_or_create(&self, session_id: &str, provider: &dyn ChatProvider)
    -> ConversationHandle;

    async fn len(&self) -> usize;

    async fn contains(&self, session_id: &str) -> bool;

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Process-lifetime, unbounded session store. Nothing is ever evicted.
#[derive(Clone, Default)]
pub struct SessionManager {
    inner: Arc<RwLock<HashMap<String, ConversationHandle>>>,
}

impl Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager").finish_non_exhaustive()
    }
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for SessionManager {
    async fn get_or_create(
        &self,
        session_id: &str,
        provider: &dyn ChatProvider,
    ) -> ConversationHandle {
        {
            let guard = self.inner.read().await;
            if let Some(handle) = guard.get(session_id) {
                return handle.clone();
            }
        }

        // Re-checked under the write lock: another request may have created it
        // between the two acquisitions.
        let mut guard = self.inner.write().await;
        guard
            .entry(session_id.to_string())
            .or_insert_with(|| {
                tracing::debug!(session = %session_id, "starting new conversation");
                ConversationHandle::new(provider.start_chat())
            })
            .clone()
    }

    async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    async fn contains(&self, session_id: &str) -> bool {
        self.inner.read().await.contains_key(session_id)
    }
}
