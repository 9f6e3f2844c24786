// src/services/provider.rs
//! The seam between the relay and whatever hosted model produces the replies.
//!
//! A [`ChatProvider`] is stateless with respect to conversations: it is handed
//! the accumulated history plus the new message and returns the reply text.
//! History lives in a [`Conversation`], shared per session through a
//! [`ConversationHandle`].

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("provider API key is not configured")]
    MissingApiKey,

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("rate limited by provider")]
    RateLimited,

    #[error("provider returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("response blocked: {0}")]
    Blocked(String),

    #[error("provider returned no candidates")]
    EmptyResponse,

    #[error("malformed provider response: {0}")]
    Parse(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnRole {
    User,
    Model,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Turn {
    pub role: TurnRole,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: TurnRole::User, text: text.into() }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self { role: TurnRole::Model, text: text.into() }
    }
}

/// Append-only dialogue history for one session.
#[derive(Clone, Debug, Default)]
pub struct Conversation {
    history: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    fn record_exchange(&mut self, message: &str, reply: &str) {
        self.history.push(Turn::user(message));
        self.history.push(Turn::model(reply));
    }
}

#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Fresh conversation with no prior turns.
    fn start_chat(&self) -> Conversation {
        Conversation::new()
    }

    /// Produce the reply to `message` given everything said so far.
    async fn generate(&self, history: &[Turn], message: &str) -> Result<String, ProviderError>;
}

/// Shared, cloneable reference to one session's conversation.
#[derive(Clone, Debug, Default)]
pub struct ConversationHandle {
    inner: Arc<Mutex<Conversation>>,
}

impl ConversationHandle {
    pub fn new(conversation: Conversation) -> Self {
        Self { inner: Arc::new(Mutex::new(conversation)) }
    }

    /// Send one message through `provider` and return the reply.
    ///
    /// The handle stays locked for the whole provider call, so turns on the
    /// same session never interleave. History only grows when the provider
    /// succeeds; a failed turn leaves it exactly as it was.
    pub async fn send_turn(
        &self,
        provider: &dyn ChatProvider,
        message: &str,
    ) -> Result<String, ProviderError> {
        let mut conversation = self.inner.lock().await;
        let reply = provider.generate(conversation.history(), message).await?;
        conversation.record_exchange(message, &reply);
        Ok(reply)
    }

    pub async fn snapshot(&self) -> Vec<Turn> {
        self.inner.lock().await.history().to_vec()
    }

    /// Whether two handles point at the same conversation.
    pub fn same_as(&self, other: &ConversationHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}
