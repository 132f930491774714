//! In-process fake Jenkins for the integration suite. Each endpoint serves a
//! scripted response sequence and records what it saw, so tests can assert
//! exact poll counts and request shapes.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use url::Url;

/// How the trigger endpoint answers.
pub struct Script {
    pub trigger_status: StatusCode,
    pub location: Location,
    /// Per-poll queue responses, in order; the last one repeats.
    pub queue_responses: Vec<Value>,
    /// Per-poll build responses, in order; the last one repeats.
    pub build_responses: Vec<Value>,
}

pub enum Location {
    /// A well-formed queue item URL on this server.
    Queue(u64),
    /// No Location header at all.
    Missing,
    /// An arbitrary header value.
    Custom(String),
}

impl Default for Script {
    fn default() -> Self {
        Self {
            trigger_status: StatusCode::CREATED,
            location: Location::Queue(26),
            queue_responses: Vec::new(),
            build_responses: Vec::new(),
        }
    }
}

#[derive(Clone)]
pub struct RecordedTrigger {
    pub path: String,
    pub body: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
}

struct Inner {
    script: Script,
    base: String,
    triggers: Vec<RecordedTrigger>,
    queue_polls: usize,
    build_polls: usize,
}

type Shared = Arc<Mutex<Inner>>;

pub struct FakeJenkins {
    pub base: Url,
    state: Shared,
}

impl FakeJenkins {
    pub async fn spawn(script: Script) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let state: Shared = Arc::new(Mutex::new(Inner {
            script,
            base: base.clone(),
            triggers: Vec::new(),
            queue_polls: 0,
            build_polls: 0,
        }));

        let app = Router::new()
            .route("/job/{job}/build", post(trigger))
            .route("/job/{job}/buildWithParameters", post(trigger))
            .route("/queue/item/{id}/api/json", get(queue_item))
            .route("/job/{job}/{number}/api/json", get(build_state))
            .with_state(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base: Url::parse(&base).unwrap(),
            state,
        }
    }

    pub fn triggers(&self) -> Vec<RecordedTrigger> {
        self.state.lock().unwrap().triggers.clone()
    }

    pub fn queue_polls(&self) -> usize {
        self.state.lock().unwrap().queue_polls
    }

    pub fn build_polls(&self) -> usize {
        self.state.lock().unwrap().build_polls
    }
}

async fn trigger(State(state): State<Shared>, uri: Uri, headers: HeaderMap, body: String) -> Response {
    let mut inner = state.lock().unwrap();
    inner.triggers.push(RecordedTrigger {
        path: uri.path().to_string(),
        body,
        authorization: header_value(&headers, header::AUTHORIZATION),
        content_type: header_value(&headers, header::CONTENT_TYPE),
    });

    let mut response = Response::builder().status(inner.script.trigger_status);
    if inner.script.trigger_status == StatusCode::CREATED {
        match &inner.script.location {
            Location::Queue(id) => {
                let loc = format!("{}/queue/item/{}/", inner.base, id);
                response = response.header(header::LOCATION, loc);
            }
            Location::Custom(loc) => {
                response = response.header(header::LOCATION, loc.clone());
            }
            Location::Missing => {}
        }
    }
    response.body(Body::empty()).unwrap()
}

async fn queue_item(State(state): State<Shared>) -> Json<Value> {
    let mut inner = state.lock().unwrap();
    let index = inner.queue_polls;
    inner.queue_polls += 1;
    Json(scripted(&inner.script.queue_responses, index))
}

async fn build_state(State(state): State<Shared>) -> Json<Value> {
    let mut inner = state.lock().unwrap();
    let index = inner.build_polls;
    inner.build_polls += 1;
    Json(scripted(&inner.script.build_responses, index))
}

fn scripted(responses: &[Value], index: usize) -> Value {
    responses
        .get(index)
        .or_else(|| responses.last())
        .cloned()
        .unwrap_or_else(|| json!({}))
}

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(String::from)
}
