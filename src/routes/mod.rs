// src/routes/mod.rs
pub mod chat;

use crate::{config::Landing, state::SharedState};
use axum::{
    Router,
    response::Html,
    routing::{get, post},
};
use chat::chat_handler;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

pub const BANNER: &str = "<h1>YOU ARE CONNECTED</h1>";

pub fn create_router(landing: &Landing) -> Router<SharedState> {
    let router = Router::new()
        .route("/chat", post(chat_handler))
        .route("/health", get(|| async { "OK" }));

    let router = match landing {
        Landing::Banner => router.route("/", get(|| async { Html(BANNER) })),
        Landing::StaticDir(dir) => router
            .route_service("/", ServeFile::new(dir.join("index.html")))
            .fallback_service(ServeDir::new(dir)),
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
}
