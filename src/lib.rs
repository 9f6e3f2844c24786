//! HTTP relay that forwards chat messages to a hosted language model and
//! keeps one conversation per session key in memory.

pub mod config;
pub mod error;
pub mod message;
pub mod routes;
pub mod services;
pub mod state;

use std::sync::Arc;

use axum::Router;

use config::Config;
use services::gemini::GeminiProvider;
use state::AppState;

/// Build the complete application without binding a listener, for hosts that
/// bring their own.
pub fn build_app(config: &Config) -> anyhow::Result<Router> {
    let provider = GeminiProvider::new(config.gemini.clone())?;
    let state = Arc::new(AppState::new(Arc::new(provider)));
    Ok(routes::create_router(&config.landing).with_state(state))
}
