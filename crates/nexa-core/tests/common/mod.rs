//! In-process mock of the assistant backend

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;
use tokio::sync::Notify;

/// Holds `/prompt` requests until the test releases them
#[derive(Default)]
pub struct Gate {
    pub arrived: Notify,
    pub release: Notify,
}

#[derive(Clone)]
pub struct MockBackend {
    prompt_reply: (StatusCode, String),
    health_reply: (StatusCode, String),
    pub prompt_calls: Arc<AtomicUsize>,
    pub health_calls: Arc<AtomicUsize>,
    pub prompts_seen: Arc<Mutex<Vec<String>>>,
    pub gate: Option<Arc<Gate>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            prompt_reply: (StatusCode::OK, r#"{"ok":true,"response":"ok"}"#.to_string()),
            health_reply: (StatusCode::OK, r#"{"ok":true}"#.to_string()),
            prompt_calls: Arc::new(AtomicUsize::new(0)),
            health_calls: Arc::new(AtomicUsize::new(0)),
            prompts_seen: Arc::new(Mutex::new(Vec::new())),
            gate: None,
        }
    }

    pub fn prompt(mut self, status: StatusCode, body: &str) -> Self {
        self.prompt_reply = (status, body.to_string());
        self
    }

    pub fn health(mut self, status: StatusCode, body: &str) -> Self {
        self.health_reply = (status, body.to_string());
        self
    }

    pub fn gated(mut self) -> (Self, Arc<Gate>) {
        let gate = Arc::new(Gate::default());
        self.gate = Some(gate.clone());
        (self, gate)
    }

    pub fn prompt_calls(&self) -> usize {
        self.prompt_calls.load(Ordering::SeqCst)
    }

    pub fn health_calls(&self) -> usize {
        self.health_calls.load(Ordering::SeqCst)
    }

    pub fn prompts_seen(&self) -> Vec<String> {
        self.prompts_seen.lock().unwrap().clone()
    }

    /// Serve on an ephemeral port and return the base URL.
    pub async fn spawn(&self) -> String {
        let app = Router::new()
            .route("/prompt", post(handle_prompt))
            .route("/health", get(handle_health))
            .route("/", get(handle_root))
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }
}

fn json_reply((status, body): (StatusCode, String)) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

async fn handle_prompt(State(mock): State<MockBackend>, Json(body): Json<Value>) -> Response {
    mock.prompt_calls.fetch_add(1, Ordering::SeqCst);
    let prompt = body["prompt"].as_str().unwrap_or_default().to_string();
    mock.prompts_seen.lock().unwrap().push(prompt);

    if let Some(gate) = &mock.gate {
        gate.arrived.notify_one();
        gate.release.notified().await;
    }

    json_reply(mock.prompt_reply.clone())
}

async fn handle_health(State(mock): State<MockBackend>) -> Response {
    mock.health_calls.fetch_add(1, Ordering::SeqCst);
    json_reply(mock.health_reply.clone())
}

async fn handle_root() -> &'static str {
    "<!doctype html><title>NEXA</title>"
}

/// Nothing listens here
pub const DEAD_BASE_URL: &str = "http://127.0.0.1:1";
