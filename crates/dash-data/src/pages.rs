//! Page persistence client
//!
//! Dashboards are stored server-side as pages whose `page_config` holds the
//! exported document.

use std::sync::Arc;

use dash_core::DashboardDocument;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::config::FetcherConfig;
use crate::transport::{unwrap_envelope, DataTransport, HttpTransport, TransportRequest};
use crate::DataError;

const PAGE_PATH: &str = "/api/core/page";

/// Page metadata as returned by the page API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageMeta {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub page_config: Value,
    #[serde(default)]
    pub sort: i64,
    #[serde(default)]
    pub sys_create_datetime: String,
    #[serde(default)]
    pub sys_update_datetime: String,
}

impl PageMeta {
    /// Decode the stored dashboard; an empty config yields a new document
    /// named after the page
    pub fn document(&self) -> Result<DashboardDocument, DataError> {
        match &self.page_config {
            Value::Null => Ok(DashboardDocument::new(self.name.clone())),
            Value::Object(fields) if fields.is_empty() => Ok(DashboardDocument::new(self.name.clone())),
            config => Ok(DashboardDocument::from_value(config.clone())?),
        }
    }
}

/// Body of a page creation request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageCreateInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,
    pub name: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_config: Option<Value>,
}

impl PageCreateInput {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            ..Self::default()
        }
    }

    /// Store `document` as the page config
    pub fn with_document(mut self, document: &DashboardDocument) -> Result<Self, DataError> {
        self.page_config = Some(serde_json::to_value(document)?);
        Ok(self)
    }
}

/// Client for the page API
#[derive(Clone)]
pub struct PageClient {
    transport: Arc<dyn DataTransport>,
}

impl PageClient {
    /// Create a new page client over `transport`
    pub fn new(transport: Arc<dyn DataTransport>) -> Self {
        Self { transport }
    }

    /// Create a page client talking HTTP to the configured backend
    pub fn http(config: FetcherConfig) -> Result<Self, DataError> {
        Ok(Self::new(Arc::new(HttpTransport::new(config)?)))
    }

    pub async fn get_page(&self, id: &str) -> Result<PageMeta, DataError> {
        self.fetch(TransportRequest::get(format!("{PAGE_PATH}/{}", urlencoding::encode(id)))).await
    }

    pub async fn get_page_by_code(&self, code: &str) -> Result<PageMeta, DataError> {
        self.fetch(TransportRequest::get(format!("{PAGE_PATH}/code/{}", urlencoding::encode(code)))).await
    }

    pub async fn create_page(&self, input: &PageCreateInput) -> Result<PageMeta, DataError> {
        let request = TransportRequest::post(PAGE_PATH, serde_json::to_value(input)?);
        let page: PageMeta = self.fetch(request).await?;
        info!(page_id = %page.id, code = %page.code, "created page");
        Ok(page)
    }

    /// Store `document` as the config of page `id`
    pub async fn save_document(&self, id: &str, document: &DashboardDocument) -> Result<PageMeta, DataError> {
        let body = json!({ "page_config": serde_json::to_value(document)? });
        let request = TransportRequest::put(format!("{PAGE_PATH}/{}", urlencoding::encode(id)), body);
        let page: PageMeta = self.fetch(request).await?;
        info!(page_id = %id, widgets = document.widgets.len(), "saved dashboard");
        Ok(page)
    }

    /// Exported config of page `id`
    pub async fn export_page_config(&self, id: &str) -> Result<Value, DataError> {
        self.fetch(TransportRequest::get(format!("{PAGE_PATH}/{}/export", urlencoding::encode(id)))).await
    }

    async fn fetch<T: DeserializeOwned>(&self, request: TransportRequest) -> Result<T, DataError> {
        debug!(method = %request.method, url = %request.url, "page request");
        let response = self.transport.send(request).await?;
        Ok(serde_json::from_value(unwrap_envelope(response))?)
    }
}
