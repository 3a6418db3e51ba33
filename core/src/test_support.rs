//! In-process push collector for tests: records every request it receives
//! and answers from a queue of canned replies (default `200 {"ok": true}`).

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};

#[derive(Debug, Clone)]
pub(crate) struct RecordedPush {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub token: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
    pub received_at: Instant,
}

impl RecordedPush {
    /// Decoded `key=value` pairs from the body (POST) or query (GET).
    pub fn fields(&self) -> Vec<(String, String)> {
        let raw = if self.method == Method::GET {
            self.query.clone().unwrap_or_default()
        } else {
            self.body.clone()
        };
        url::form_urlencoded::parse(raw.as_bytes())
            .into_owned()
            .collect()
    }

    pub fn field(&self, key: &str) -> Option<String> {
        self.fields()
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Reply {
    status: StatusCode,
    body: Value,
    retry_after: Option<u64>,
}

impl Reply {
    pub fn ok() -> Self {
        Self::with_status(200, json!({"ok": true}))
    }

    pub fn with_status(status: u16, body: Value) -> Self {
        Self {
            status: StatusCode::from_u16(status).expect("valid status code"),
            body,
            retry_after: None,
        }
    }

    pub fn rate_limited(retry_after: u64) -> Self {
        Self {
            retry_after: Some(retry_after),
            ..Self::with_status(429, json!({"ok": false, "msg": "Too many requests"}))
        }
    }
}

#[derive(Clone, Default)]
struct CollectorState {
    pushes: Arc<Mutex<Vec<RecordedPush>>>,
    replies: Arc<Mutex<VecDeque<Reply>>>,
}

pub(crate) struct Collector {
    pub base_url: String,
    state: CollectorState,
}

impl Collector {
    pub async fn start(replies: Vec<Reply>) -> Self {
        let state = CollectorState {
            pushes: Arc::default(),
            replies: Arc::new(Mutex::new(replies.into())),
        };
        let app = Router::new().fallback(record).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind collector");
        let addr = listener.local_addr().expect("collector address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("collector server");
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub fn pushes(&self) -> Vec<RecordedPush> {
        self.state.pushes.lock().unwrap().clone()
    }

    /// Time between consecutive received pushes.
    pub fn gaps(&self) -> Vec<Duration> {
        self.pushes()
            .windows(2)
            .map(|pair| pair[1].received_at.duration_since(pair[0].received_at))
            .collect()
    }
}

async fn record(
    State(state): State<CollectorState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let header_str = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    state.pushes.lock().unwrap().push(RecordedPush {
        method,
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        token: header_str("x-push-token"),
        content_type: header_str("content-type"),
        body,
        received_at: Instant::now(),
    });

    let reply = state
        .replies
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(Reply::ok);
    let mut response = (reply.status, axum::Json(reply.body)).into_response();
    if let Some(secs) = reply.retry_after {
        response
            .headers_mut()
            .insert(header::RETRY_AFTER, HeaderValue::from(secs));
    }
    response
}
