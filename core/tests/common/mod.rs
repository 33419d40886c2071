//! Scripted backend and wiring shared by the integration test files.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use matchday_core::host::{RecordingFeedback, ScriptedPlatform};
use matchday_core::request::TransportErrorKind;
use matchday_core::{
    ApiClient, ClientConfig, HttpRequest, HttpResponse, MemoryStorage, Requester, Services,
    Session, Storage, StorageError, Transport, TransportError,
};
use serde_json::{json, Value};

pub const BASE_URL: &str = "http://stub";

type Reply = Result<HttpResponse, TransportError>;

/// Answers by `"METHOD /path"` (query string ignored). Replies are sticky
/// until replaced; unrouted requests get a 404 envelope.
#[derive(Default)]
pub struct StubBackend {
    routes: Mutex<HashMap<String, Reply>>,
    seen: Mutex<Vec<HttpRequest>>,
}

fn route_key(method: &str, url: &str) -> String {
    let path = url.strip_prefix(BASE_URL).unwrap_or(url);
    let path = path.split('?').next().unwrap_or(path);
    format!("{method} {path}")
}

impl StubBackend {
    pub fn reply(&self, method: &str, path: &str, reply: Reply) {
        self.routes
            .lock()
            .unwrap()
            .insert(format!("{method} {path}"), reply);
    }

    pub fn ok(&self, method: &str, path: &str, data: Value) {
        self.reply(method, path, Ok(envelope(200, "success", data)));
    }

    pub fn business_error(&self, method: &str, path: &str, code: i64, message: &str) {
        self.reply(method, path, Ok(envelope(code, message, Value::Null)));
    }

    pub fn unreachable(&self, method: &str, path: &str) {
        self.reply(
            method,
            path,
            Err(TransportError::new(TransportErrorKind::Connect, "connection refused")),
        );
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.seen.lock().unwrap().clone()
    }

    /// Full request URLs, in order, without the base.
    pub fn paths(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|r| format!("{} {}", r.method.as_str(), r.path.trim_start_matches(BASE_URL)))
            .collect()
    }

    pub fn clear_requests(&self) {
        self.seen.lock().unwrap().clear();
    }
}

#[async_trait]
impl Transport for StubBackend {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let key = route_key(request.method.as_str(), &request.path);
        self.seen.lock().unwrap().push(request);
        let reply = self.routes.lock().unwrap().get(&key).cloned();
        reply.unwrap_or_else(|| {
            Ok(HttpResponse {
                status: 404,
                headers: Vec::new(),
                body: json!({"code": 404, "message": "not found", "data": null}).to_string(),
            })
        })
    }
}

pub fn envelope(code: i64, message: &str, data: Value) -> HttpResponse {
    HttpResponse {
        status: 200,
        headers: Vec::new(),
        body: json!({"code": code, "message": message, "data": data}).to_string(),
    }
}

pub fn event_json(id: i64, title: &str, views: u64) -> Value {
    json!({
        "id": id,
        "title": title,
        "date": "2024-06-14",
        "content": "Kick-off at **21:00**\n\n![pitch](/uploads/pitch.png)",
        "cover_image": "/uploads/cover.png",
        "view_count": views,
        "created_at": "2024-06-10T08:00:00",
        "updated_at": "2024-06-10T08:00:00"
    })
}

pub fn page_json(items: Vec<Value>) -> Value {
    let total = items.len();
    json!({"items": items, "total": total, "page": 1, "page_size": 20, "has_more": false})
}

pub fn banner_json(id: i64, image_url: &str) -> Value {
    json!({
        "id": id,
        "image_url": image_url,
        "title": null,
        "link_url": null,
        "sort_order": id,
        "is_active": true,
        "created_at": "2024-06-01T09:00:00",
        "updated_at": "2024-06-01T09:00:00"
    })
}

pub fn customer_service_json() -> Value {
    json!({
        "id": 1,
        "qr_code_url": "/uploads/qr.png",
        "online_time": "09:00-21:00",
        "updated_at": "2024-06-01T09:00:00"
    })
}

pub fn user_json(open_id: &str, nick_name: &str) -> Value {
    json!({
        "id": 7,
        "open_id": open_id,
        "nick_name": nick_name,
        "avatar_url": null,
        "created_at": "2024-06-14T20:00:00",
        "last_login_at": "2024-06-14T20:00:00"
    })
}

/// Services wired over a `StubBackend` with recording host facilities.
pub struct Harness {
    pub backend: Arc<StubBackend>,
    pub feedback: Arc<RecordingFeedback>,
    pub platform: Arc<ScriptedPlatform>,
    pub session: Session,
    pub services: Services,
}

/// Reads as empty and rejects every write, like a full device disk.
pub struct ReadOnlyStorage;

impl Storage for ReadOnlyStorage {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Io("disk full".to_string()))
    }

    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Io("disk full".to_string()))
    }
}

impl Harness {
    pub fn new() -> Self {
        Self::with_storage(Arc::new(MemoryStorage::new()))
    }

    pub fn with_storage(storage: Arc<dyn Storage>) -> Self {
        let backend = Arc::new(StubBackend::default());
        let feedback = Arc::new(RecordingFeedback::new());
        let platform = Arc::new(ScriptedPlatform::new());
        let session = Session::new(storage);
        let requester = Arc::new(Requester::new(
            backend.clone(),
            feedback.clone(),
            &ClientConfig::default(),
        ));
        let services = Services::new(
            ApiClient::new(BASE_URL),
            requester,
            session.clone(),
            platform.clone(),
        );
        Self {
            backend,
            feedback,
            platform,
            session,
            services,
        }
    }
}
