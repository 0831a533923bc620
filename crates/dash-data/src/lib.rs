//! Data binding for dashboard widgets
//!
//! Resolves widget data sources into render props, drives refresh timers,
//! keeps the per-widget resolved props, and persists dashboards through the
//! page API.

pub mod bindings;
pub mod config;
pub mod fetcher;
pub mod pages;
pub mod refresh;
pub mod transport;

use dash_core::DocumentError;
use thiserror::Error;

// Re-exports
pub use bindings::WidgetBindings;
pub use config::FetcherConfig;
pub use fetcher::{is_chart_payload, ResolvedData, WidgetDataFetcher, CHART_PAYLOAD_KEYS};
pub use pages::{PageClient, PageCreateInput, PageMeta};
pub use refresh::{create_refresh_timer, RefreshHandle};
pub use transport::{DataTransport, HttpTransport, MemoryTransport, RequestMethod, TransportRequest};

/// Errors that can occur in data operations
#[derive(Error, Debug)]
pub enum DataError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{method} {url} returned {status}: {body}")]
    Status {
        method: RequestMethod,
        url: String,
        status: u16,
        body: String,
    },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Other error: {0}")]
    Other(String),
}
