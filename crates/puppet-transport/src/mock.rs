//! In-process mock of the control backend
//!
//! Serves the same routes the director consumes. Bodies are stored as raw
//! JSON strings so tests can also serve malformed data.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde::Deserialize;

#[derive(Debug)]
struct MockState {
    commands: VecDeque<String>,
    reports: Vec<serde_json::Value>,
    profiles: String,
    scenes: String,
    status: String,
    last_polled_client: Option<String>,
    polls: u64,
}

impl Default for MockState {
    fn default() -> Self {
        MockState {
            commands: VecDeque::new(),
            reports: Vec::new(),
            profiles: "{}".into(),
            scenes: "{}".into(),
            status: r#"{"clients": {}}"#.into(),
            last_polled_client: None,
            polls: 0,
        }
    }
}

type Shared = Arc<Mutex<MockState>>;

#[derive(Debug, Deserialize)]
struct QueueQuery {
    client_id: String,
}

fn json_body(body: String) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], body)
}

async fn next_command(State(state): State<Shared>, Query(q): Query<QueueQuery>) -> impl IntoResponse {
    let mut state = state.lock();
    state.polls += 1;
    state.last_polled_client = Some(q.client_id);
    let body = state.commands.pop_front().unwrap_or_else(|| "null".into());
    json_body(body)
}

async fn report(State(state): State<Shared>, Json(body): Json<serde_json::Value>) -> impl IntoResponse {
    state.lock().reports.push(body);
    Json(serde_json::json!({"status": "ok"}))
}

async fn profiles(State(state): State<Shared>) -> impl IntoResponse {
    json_body(state.lock().profiles.clone())
}

async fn scenes(State(state): State<Shared>) -> impl IntoResponse {
    json_body(state.lock().scenes.clone())
}

async fn status(State(state): State<Shared>) -> impl IntoResponse {
    json_body(state.lock().status.clone())
}

/// Running mock backend; the server stops when the runtime shuts down
#[derive(Clone)]
pub struct MockBackend {
    addr: SocketAddr,
    state: Shared,
}

impl MockBackend {
    /// Bind to an ephemeral local port and start serving
    pub async fn start() -> Self {
        let state = Shared::default();
        let app = Router::new()
            .route("/api/queue", get(next_command))
            .route("/api/report", post(report))
            .route("/api/profiles", get(profiles))
            .route("/api/scenes", get(scenes))
            .route("/api/status", get(status))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("mock backend address");
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::warn!("mock backend stopped: {}", e);
            }
        });

        MockBackend { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Queue a raw JSON command body
    pub fn push_command(&self, json: &str) {
        self.state.lock().commands.push_back(json.to_string());
    }

    pub fn set_profiles(&self, json: &str) {
        self.state.lock().profiles = json.to_string();
    }

    pub fn set_scenes(&self, json: &str) {
        self.state.lock().scenes = json.to_string();
    }

    pub fn set_status(&self, json: &str) {
        self.state.lock().status = json.to_string();
    }

    pub fn reports(&self) -> Vec<serde_json::Value> {
        self.state.lock().reports.clone()
    }

    pub fn pending_commands(&self) -> usize {
        self.state.lock().commands.len()
    }

    pub fn polls(&self) -> u64 {
        self.state.lock().polls
    }

    pub fn last_polled_client(&self) -> Option<String> {
        self.state.lock().last_polled_client.clone()
    }
}
