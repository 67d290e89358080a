use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use axum::{
    extract::{Path, State},
    http::{HeaderMap, Method, StatusCode},
    response::Html,
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;

pub const SAMPLE_JSON: &str = concat!(
    r#"{"name":"test","version":"1.0","nested":{"value":"nested-data"},"#,
    r#""build":42,"tags":["a","b"]}"#
);

pub const SAMPLE_HTML: &str = concat!(
    "<html><head><title>Test Page</title></head>",
    "<body><h1>Welcome</h1></body></html>"
);

/// What `/echo` saw, returned as its JSON body.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

/// Number of requests served since start-up, across all routes.
pub type Hits = Arc<AtomicU64>;

pub fn app() -> Router {
    let hits: Hits = Arc::new(AtomicU64::new(0));
    Router::new()
        .route("/json", get(sample_json))
        .route("/html", get(sample_html))
        .route("/status/{code}", any(status))
        .route("/echo", any(echo))
        .route("/delay/{millis}", get(delay))
        .route("/bytes/{len}", get(bytes))
        .route("/hits", get(hit_count))
        .with_state(hits)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn count(hits: &Hits) {
    hits.fetch_add(1, Ordering::SeqCst);
}

async fn sample_json(State(hits): State<Hits>) -> Json<Value> {
    count(&hits);
    Json(serde_json::from_str(SAMPLE_JSON).unwrap_or(Value::Null))
}

async fn sample_html(State(hits): State<Hits>) -> Html<&'static str> {
    count(&hits);
    Html(SAMPLE_HTML)
}

async fn status(State(hits): State<Hits>, Path(code): Path<u16>) -> (StatusCode, Json<Value>) {
    count(&hits);
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST);
    (status, Json(json!({ "status": status.as_u16(), "name": "status-fixture" })))
}

async fn echo(
    State(hits): State<Hits>,
    method: Method,
    headers: HeaderMap,
    body: String,
) -> Json<Echo> {
    count(&hits);
    let headers = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();
    Json(Echo {
        method: method.as_str().to_string(),
        headers,
        body,
    })
}

async fn delay(State(hits): State<Hits>, Path(millis): Path<u64>) -> Json<Value> {
    count(&hits);
    tokio::time::sleep(Duration::from_millis(millis)).await;
    Json(json!({ "delayed": millis }))
}

async fn bytes(State(hits): State<Hits>, Path(len): Path<usize>) -> String {
    count(&hits);
    "x".repeat(len)
}

async fn hit_count(State(hits): State<Hits>) -> Json<Value> {
    // not counted itself
    Json(json!({ "hits": hits.load(Ordering::SeqCst) }))
}
