//! Async request execution on top of the I/O-free `ApiClient`.
//!
//! # Design
//! `Requester` is the one place that touches the network. It merges caller
//! headers, enforces the timeout, keeps the loading mask scoped to the call
//! through a `LoadingGuard`, unwraps the envelope and, on failure, shows a
//! toast before handing the error back. There are no retries.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::client::unwrap_envelope;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::host::{Feedback, LoadingGuard, Toast};
use crate::http::{merge_headers, HttpMethod, HttpRequest, HttpResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Timeout,
    Connect,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<TransportError> for ApiError {
    fn from(e: TransportError) -> Self {
        match e.kind {
            TransportErrorKind::Timeout => ApiError::Timeout,
            TransportErrorKind::Connect | TransportErrorKind::Other => ApiError::Transport(e.message),
        }
    }
}

/// Executes one HTTP round-trip.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Production transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Self { client })
    }
}

fn reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

fn classify(e: reqwest::Error) -> TransportError {
    let kind = if e.is_timeout() {
        TransportErrorKind::Timeout
    } else if e.is_connect() {
        TransportErrorKind::Connect
    } else {
        TransportErrorKind::Other
    };
    TransportError::new(kind, e.to_string())
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .client
            .request(reqwest_method(request.method), &request.path);
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }
        let response = builder.send().await.map_err(classify)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.to_string(), v.to_str().ok()?.to_string())))
            .collect();
        let body = response.text().await.map_err(classify)?;
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Per-call options.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    pub show_loading: bool,
    /// Overrides the configured loading text.
    pub loading_text: Option<String>,
    /// Merged over the request's default headers; these win.
    pub headers: Vec<(String, String)>,
}

impl CallOptions {
    pub fn with_loading() -> Self {
        Self {
            show_loading: true,
            ..Self::default()
        }
    }
}

/// Executes requests built by `ApiClient`.
pub struct Requester {
    transport: Arc<dyn Transport>,
    feedback: Arc<dyn Feedback>,
    timeout: Duration,
    loading_text: String,
}

impl Requester {
    pub fn new(
        transport: Arc<dyn Transport>,
        feedback: Arc<dyn Feedback>,
        config: &ClientConfig,
    ) -> Self {
        Self {
            transport,
            feedback,
            timeout: config.timeout(),
            loading_text: config.loading_text.clone(),
        }
    }

    pub fn feedback(&self) -> &Arc<dyn Feedback> {
        &self.feedback
    }

    pub async fn call<T: DeserializeOwned>(
        &self,
        mut request: HttpRequest,
        options: CallOptions,
    ) -> Result<T, ApiError> {
        request.headers = merge_headers(&request.headers, &options.headers);
        let method = request.method.as_str();
        let path = request.path.clone();
        debug!(method, %path, "sending request");

        let result = {
            let _loading = options.show_loading.then(|| {
                let text = options.loading_text.as_deref().unwrap_or(&self.loading_text);
                LoadingGuard::show(self.feedback.as_ref(), text)
            });
            self.execute(request).await
        };

        result.map_err(|e| {
            warn!(method, %path, error = %e, "request failed");
            if !e.is_permission_denied() {
                self.feedback.show_toast(&Toast::info(e.notice()));
            }
            e
        })
    }

    async fn execute<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T, ApiError> {
        let response = tokio::time::timeout(self.timeout, self.transport.send(request))
            .await
            .map_err(|_| ApiError::Timeout)??;
        unwrap_envelope(response)
    }
}
