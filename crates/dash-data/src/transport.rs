//! HTTP transport seam
//!
//! The fetcher and the page client only see [`DataTransport`]. Production
//! code uses [`HttpTransport`]; tests and offline tools use
//! [`MemoryTransport`] with canned responses.

use std::fmt;

use ahash::AHashMap;
use async_trait::async_trait;
use dash_core::{ApiMethod, Props};
use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use tracing::debug;

use crate::config::FetcherConfig;
use crate::DataError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl RequestMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestMethod::Get => "GET",
            RequestMethod::Post => "POST",
            RequestMethod::Put => "PUT",
            RequestMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ApiMethod> for RequestMethod {
    fn from(method: ApiMethod) -> Self {
        match method {
            ApiMethod::Get => RequestMethod::Get,
            ApiMethod::Post => RequestMethod::Post,
        }
    }
}

/// One outgoing request
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    pub method: RequestMethod,
    /// Absolute URL, or a path resolved against the configured base URL
    pub url: String,
    pub headers: IndexMap<String, String>,
    pub query: Props,
    pub body: Option<Value>,
}

impl TransportRequest {
    pub fn new(method: RequestMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: IndexMap::new(),
            query: Props::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(RequestMethod::Get, url)
    }

    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self::new(RequestMethod::Post, url).with_body(body)
    }

    pub fn put(url: impl Into<String>, body: Value) -> Self {
        Self::new(RequestMethod::Put, url).with_body(body)
    }

    pub fn with_headers(mut self, headers: IndexMap<String, String>) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn with_query(mut self, query: Props) -> Self {
        self.query.extend(query);
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Query parameters as strings; `null` values are omitted
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.query
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(key, value)| {
                let value = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), value)
            })
            .collect()
    }
}

/// Sends requests and decodes JSON responses
#[async_trait]
pub trait DataTransport: Send + Sync {
    /// Send `request`; non-success statuses are errors
    async fn send(&self, request: TransportRequest) -> Result<Value, DataError>;
}

/// Unwrap a `{"data": ...}` response envelope
///
/// Responses without a non-null `data` field are returned as they are.
pub fn unwrap_envelope(response: Value) -> Value {
    match response {
        Value::Object(mut fields) if fields.get("data").is_some_and(|data| !data.is_null()) => {
            fields.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// `reqwest`-backed transport
pub struct HttpTransport {
    client: reqwest::Client,
    config: FetcherConfig,
}

impl HttpTransport {
    /// Create a new HTTP transport
    pub fn new(config: FetcherConfig) -> Result<Self, DataError> {
        config.validate()?;
        let client = reqwest::Client::builder().timeout(config.timeout()).build()?;
        Ok(Self { client, config })
    }

    /// Create a transport reusing an existing client for connection pooling
    pub fn with_client(client: reqwest::Client, config: FetcherConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }
}

#[async_trait]
impl DataTransport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> Result<Value, DataError> {
        let url = self.config.resolve_url(&request.url);
        let method = match request.method {
            RequestMethod::Get => reqwest::Method::GET,
            RequestMethod::Post => reqwest::Method::POST,
            RequestMethod::Put => reqwest::Method::PUT,
            RequestMethod::Delete => reqwest::Method::DELETE,
        };

        let mut headers = self.config.default_headers.clone();
        headers.extend(request.headers.iter().map(|(k, v)| (k.clone(), v.clone())));

        let mut builder = self.client.request(method, &url);
        if let Some(token) = &self.config.auth_token {
            builder = builder.bearer_auth(token);
        }
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let query = request.query_pairs();
        if !query.is_empty() {
            builder = builder.query(&query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        debug!(method = %request.method, url = %url, "sending request");
        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DataError::Status {
                method: request.method,
                url,
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[derive(Debug, Clone)]
enum CannedResponse {
    Json(Value),
    Status(u16),
}

/// In-memory transport answering from canned responses keyed by URL
///
/// Every request is recorded. URLs without a canned response answer 404.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    responses: RwLock<AHashMap<String, CannedResponse>>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl MemoryTransport {
    /// Create a new transport with no canned responses
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer requests for `url` with `body`
    pub fn with_response(self, url: impl Into<String>, body: Value) -> Self {
        self.set_response(url, body);
        self
    }

    /// Answer requests for `url` with `body`, replacing any earlier answer
    pub fn set_response(&self, url: impl Into<String>, body: Value) {
        self.responses.write().insert(url.into(), CannedResponse::Json(body));
    }

    /// Fail requests for `url` with HTTP `status`
    pub fn set_failure(&self, url: impl Into<String>, status: u16) {
        self.responses.write().insert(url.into(), CannedResponse::Status(status));
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl DataTransport for MemoryTransport {
    async fn send(&self, request: TransportRequest) -> Result<Value, DataError> {
        let canned = self.responses.read().get(&request.url).cloned();
        let method = request.method;
        let url = request.url.clone();
        self.requests.lock().push(request);

        match canned {
            Some(CannedResponse::Json(body)) => Ok(body),
            Some(CannedResponse::Status(status)) => Err(DataError::Status {
                method,
                url,
                status,
                body: String::new(),
            }),
            None => Err(DataError::Status {
                method,
                url,
                status: 404,
                body: "no canned response".to_string(),
            }),
        }
    }
}
