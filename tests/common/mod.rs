#![allow(dead_code)]

use std::{
    io,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chat_relay::services::provider::{ChatProvider, ProviderError, Turn};
use serde_json::Value;
use tower::util::ServiceExt;
use tracing_subscriber::fmt::MakeWriter;

/// Records every call and answers with a numbered reply.
#[derive(Default)]
pub struct FakeProvider {
    calls: Mutex<Vec<(Vec<Turn>, String)>>,
    failing: AtomicBool,
}

impl FakeProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        let provider = Self::new();
        provider.failing.store(true, Ordering::SeqCst);
        provider
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// History handed to the provider on call `n` (0-based).
    pub fn history_at(&self, n: usize) -> Vec<Turn> {
        self.calls.lock().unwrap()[n].0.clone()
    }
}

#[async_trait]
impl ChatProvider for FakeProvider {
    async fn generate(&self, history: &[Turn], message: &str) -> Result<String, ProviderError> {
        let n = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((history.to_vec(), message.to_string()));
            calls.len()
        };
        if self.failing.load(Ordering::SeqCst) {
            return Err(ProviderError::Api {
                status: 503,
                body: "upstream exploded: quota 0/0".to_string(),
            });
        }
        Ok(format!("reply {n} to {message}"))
    }
}

pub async fn post_chat(app: &Router, body: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/chat")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body_bytes).unwrap())
}

pub async fn get_text(app: &Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(body_bytes.to_vec()).unwrap())
}

/// In-memory log sink for a `tracing_subscriber::fmt` subscriber.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
