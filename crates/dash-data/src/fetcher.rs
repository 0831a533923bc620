//! Widget data resolution
//!
//! Turns a widget's data binding plus its default props into the props the
//! renderer should use. Resolution never fails: fetch errors are logged and
//! the defaults are returned, so a bound widget always has something to
//! render.

use std::sync::Arc;

use dash_core::{apply_field_mappings, get_by_path, DataSourceConfig, DataSourceType, Props};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::FetcherConfig;
use crate::transport::{unwrap_envelope, DataTransport, HttpTransport, RequestMethod, TransportRequest};
use crate::DataError;

/// Endpoint executing a named data source; the code is appended as a path
/// segment
pub const DATA_SOURCE_EXECUTE_PATH: &str = "/api/core/data-source/execute";

/// Keys marking a named data source payload as ready-made chart props
///
/// A payload carrying both `value` and `max` is a chart payload as well.
pub const CHART_PAYLOAD_KEYS: [&str; 4] = ["xAxisData", "seriesData", "indicator", "yAxisData"];

/// Whether `value` is an object shaped like chart props
pub fn is_chart_payload(value: &Value) -> bool {
    match value {
        Value::Object(fields) => {
            CHART_PAYLOAD_KEYS.iter().any(|key| fields.contains_key(*key))
                || (fields.contains_key("value") && fields.contains_key("max"))
        }
        _ => false,
    }
}

/// Outcome of resolving one widget's binding
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedData {
    /// Extracted payload, `None` when nothing was fetched
    pub raw_data: Option<Value>,
    /// Props the renderer should use
    pub resolved_props: Props,
}

impl ResolvedData {
    /// No data: render with the defaults
    pub fn defaults(default_props: &Props) -> Self {
        Self {
            raw_data: None,
            resolved_props: default_props.clone(),
        }
    }
}

/// Resolves data bindings over a [`DataTransport`]
#[derive(Clone)]
pub struct WidgetDataFetcher {
    transport: Arc<dyn DataTransport>,
}

impl WidgetDataFetcher {
    /// Create a new fetcher over `transport`
    pub fn new(transport: Arc<dyn DataTransport>) -> Self {
        Self { transport }
    }

    /// Create a fetcher talking HTTP to the configured backend
    pub fn http(config: FetcherConfig) -> Result<Self, DataError> {
        Ok(Self::new(Arc::new(HttpTransport::new(config)?)))
    }

    pub fn transport(&self) -> &Arc<dyn DataTransport> {
        &self.transport
    }

    /// Resolve `config` into render props layered over `default_props`
    pub async fn resolve_widget_data(
        &self,
        config: Option<&DataSourceConfig>,
        default_props: &Props,
    ) -> ResolvedData {
        let Some(config) = config else {
            return ResolvedData::defaults(default_props);
        };

        match config.source_type {
            DataSourceType::DataSource => match non_empty(&config.data_source_code) {
                Some(code) => self.resolve_named(code, config, default_props).await,
                None => ResolvedData::defaults(default_props),
            },
            DataSourceType::Api => match non_empty(&config.api_url) {
                Some(url) => self.resolve_api(url, config, default_props).await,
                None => ResolvedData::defaults(default_props),
            },
            DataSourceType::Static | DataSourceType::Upload => ResolvedData::defaults(default_props),
        }
    }

    async fn resolve_named(&self, code: &str, config: &DataSourceConfig, default_props: &Props) -> ResolvedData {
        let request = TransportRequest::get(format!("{DATA_SOURCE_EXECUTE_PATH}/{}", urlencoding::encode(code)));
        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(code = %code, error = %err, "failed to fetch data source");
                return ResolvedData::defaults(default_props);
            }
        };

        let Some(extracted) = extract(unwrap_envelope(response), config.data_path()) else {
            return ResolvedData::defaults(default_props);
        };

        let resolved_props = if is_chart_payload(&extracted) {
            debug!(code = %code, "merging chart payload");
            let merged = apply_field_mappings(&extracted, &[], default_props);
            if config.field_mappings.is_empty() {
                merged
            } else {
                apply_field_mappings(&extracted, &config.field_mappings, &merged)
            }
        } else {
            apply_field_mappings(&extracted, &config.field_mappings, default_props)
        };

        ResolvedData {
            raw_data: Some(extracted),
            resolved_props,
        }
    }

    async fn resolve_api(&self, url: &str, config: &DataSourceConfig, default_props: &Props) -> ResolvedData {
        let method = RequestMethod::from(config.api_method.unwrap_or_default());
        let mut request = TransportRequest::new(method, url)
            .with_headers(config.api_headers.clone().unwrap_or_default())
            .with_query(config.api_params.clone().unwrap_or_default());
        if method == RequestMethod::Post {
            request = request.with_body(Value::Object(config.api_body.clone().unwrap_or_default()));
        }

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(url = %url, error = %err, "failed to fetch widget data");
                return ResolvedData::defaults(default_props);
            }
        };

        let Some(extracted) = extract(response, config.data_path()) else {
            return ResolvedData::defaults(default_props);
        };

        ResolvedData {
            resolved_props: apply_field_mappings(&extracted, &config.field_mappings, default_props),
            raw_data: Some(extracted),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Payload at `path`, `None` when the path misses or the payload is `null`
fn extract(payload: Value, path: Option<&str>) -> Option<Value> {
    let extracted = match path {
        Some(path) => {
            let found = get_by_path(&payload, path).cloned();
            if found.is_none() {
                debug!(data_path = %path, "data path did not resolve");
            }
            found?
        }
        None => payload,
    };
    (!extracted.is_null()).then_some(extracted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MemoryTransport;
    use dash_core::ApiMethod;
    use indexmap::IndexMap;
    use serde_json::json;

    fn props(value: Value) -> Props {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn fetcher(transport: &Arc<MemoryTransport>) -> WidgetDataFetcher {
        WidgetDataFetcher::new(transport.clone())
    }

    #[tokio::test]
    async fn test_static_and_missing_config_skip_io() {
        let transport = Arc::new(MemoryTransport::new());
        let fetcher = fetcher(&transport);
        let defaults = props(json!({"value": 1}));

        let resolved = fetcher.resolve_widget_data(None, &defaults).await;
        assert_eq!(resolved, ResolvedData::defaults(&defaults));

        let config = DataSourceConfig::default();
        let resolved = fetcher.resolve_widget_data(Some(&config), &defaults).await;
        assert_eq!(resolved.resolved_props, defaults);
        assert!(resolved.raw_data.is_none());

        let upload = DataSourceConfig {
            source_type: DataSourceType::Upload,
            ..DataSourceConfig::default()
        };
        fetcher.resolve_widget_data(Some(&upload), &defaults).await;

        let no_code = DataSourceConfig {
            source_type: DataSourceType::DataSource,
            data_source_code: Some(String::new()),
            ..DataSourceConfig::default()
        };
        fetcher.resolve_widget_data(Some(&no_code), &defaults).await;

        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_api_data_path() {
        let transport = Arc::new(
            MemoryTransport::new().with_response("https://api.test/list", json!({"data": {"list": [1, 2, 3]}})),
        );
        let config = DataSourceConfig::api("https://api.test/list", ApiMethod::Get).with_data_path("data.list");

        let resolved = fetcher(&transport)
            .resolve_widget_data(Some(&config), &props(json!({"items": []})))
            .await;

        assert_eq!(resolved.raw_data, Some(json!([1, 2, 3])));
        // Arrays are not merged in passthrough mode
        assert_eq!(resolved.resolved_props, props(json!({"items": []})));
    }

    #[tokio::test]
    async fn test_api_post_sends_body_headers_and_query() {
        let transport = Arc::new(MemoryTransport::new().with_response("/stats", json!({"total": 9})));
        let mut config = DataSourceConfig::api("/stats", ApiMethod::Post).with_mapping("total", "value");
        config.api_headers = Some(IndexMap::from([("X-Tenant".to_string(), "7".to_string())]));
        config.api_params = Some(props(json!({"range": "week"})));
        config.api_body = Some(props(json!({"metric": "visits"})));

        let resolved = fetcher(&transport)
            .resolve_widget_data(Some(&config), &props(json!({"value": 0, "suffix": "%"})))
            .await;
        assert_eq!(resolved.resolved_props, props(json!({"value": 9, "suffix": "%"})));

        let requests = transport.requests();
        let request = &requests[0];
        assert_eq!(request.method, RequestMethod::Post);
        assert_eq!(request.headers.get("X-Tenant").map(String::as_str), Some("7"));
        assert_eq!(request.query_pairs(), vec![("range".to_string(), "week".to_string())]);
        assert_eq!(request.body, Some(json!({"metric": "visits"})));
    }

    #[tokio::test]
    async fn test_api_get_has_no_body() {
        let transport = Arc::new(MemoryTransport::new().with_response("/ping", json!({"ok": true})));
        let config = DataSourceConfig::api("/ping", ApiMethod::Get);

        fetcher(&transport).resolve_widget_data(Some(&config), &Props::new()).await;
        assert_eq!(transport.requests()[0].body, None);
    }

    #[tokio::test]
    async fn test_named_source_chart_payload() {
        let url = format!("{DATA_SOURCE_EXECUTE_PATH}/monthly");
        let transport = Arc::new(MemoryTransport::new().with_response(
            url.as_str(),
            json!({"data": {"xAxisData": ["Jan", "Feb"], "seriesData": [{"name": "A", "data": [1, 2]}], "unit": "k"}}),
        ));
        let config = DataSourceConfig::named("monthly").with_mapping("unit", "title");
        let defaults = props(json!({"title": "Visits", "smooth": true, "xAxisData": []}));

        let resolved = fetcher(&transport).resolve_widget_data(Some(&config), &defaults).await;

        assert_eq!(transport.requests()[0].url, url);
        assert_eq!(resolved.resolved_props["xAxisData"], json!(["Jan", "Feb"]));
        assert_eq!(resolved.resolved_props["smooth"], json!(true));
        assert_eq!(resolved.resolved_props["unit"], json!("k"));
        // Mappings are layered over the chart merge
        assert_eq!(resolved.resolved_props["title"], json!("k"));
    }

    #[tokio::test]
    async fn test_named_source_code_is_escaped() {
        let url = format!("{DATA_SOURCE_EXECUTE_PATH}/sales%2F2024%3Fregion%3Deu%23top");
        let transport = Arc::new(MemoryTransport::new().with_response(url.as_str(), json!({"total": 9})));
        let config = DataSourceConfig::named("sales/2024?region=eu#top").with_mapping("total", "value");

        let resolved = fetcher(&transport).resolve_widget_data(Some(&config), &Props::new()).await;

        assert_eq!(transport.requests()[0].url, url);
        assert_eq!(resolved.resolved_props["value"], json!(9));
    }

    #[tokio::test]
    async fn test_named_source_plain_payload_uses_mappings() {
        let transport = Arc::new(MemoryTransport::new().with_response(
            format!("{DATA_SOURCE_EXECUTE_PATH}/kpi"),
            json!({"data": {"stats": {"total": 120, "delta": -3}}}),
        ));
        let config = DataSourceConfig::named("kpi")
            .with_data_path("stats")
            .with_mapping("total", "value")
            .with_mapping("delta", "trend");
        let defaults = props(json!({"value": 0, "trend": 0, "prefix": "$"}));

        let resolved = fetcher(&transport).resolve_widget_data(Some(&config), &defaults).await;
        assert_eq!(resolved.raw_data, Some(json!({"total": 120, "delta": -3})));
        assert_eq!(resolved.resolved_props, props(json!({"value": 120, "trend": -3, "prefix": "$"})));
    }

    #[tokio::test]
    async fn test_bare_payload_without_envelope() {
        let transport = Arc::new(
            MemoryTransport::new().with_response(format!("{DATA_SOURCE_EXECUTE_PATH}/gauge"), json!({"value": 64, "max": 80})),
        );
        let config = DataSourceConfig::named("gauge");
        let defaults = props(json!({"value": 0, "min": 0, "max": 100}));

        let resolved = fetcher(&transport).resolve_widget_data(Some(&config), &defaults).await;
        assert_eq!(resolved.resolved_props, props(json!({"value": 64, "min": 0, "max": 80})));
    }

    #[tokio::test]
    async fn test_fetch_failure_degrades_to_defaults() {
        let transport = Arc::new(MemoryTransport::new());
        transport.set_failure("/broken", 502);
        let defaults = props(json!({"value": 5}));

        let config = DataSourceConfig::api("/broken", ApiMethod::Get).with_mapping("a", "value");
        let resolved = fetcher(&transport).resolve_widget_data(Some(&config), &defaults).await;
        assert_eq!(resolved, ResolvedData::defaults(&defaults));

        let config = DataSourceConfig::named("unknown");
        let resolved = fetcher(&transport).resolve_widget_data(Some(&config), &defaults).await;
        assert_eq!(resolved, ResolvedData::defaults(&defaults));
    }

    #[tokio::test]
    async fn test_unresolved_data_path() {
        let transport = Arc::new(MemoryTransport::new().with_response("/x", json!({"rows": []})));
        let config = DataSourceConfig::api("/x", ApiMethod::Get).with_data_path("data.list");
        let defaults = props(json!({"items": [1]}));

        let resolved = fetcher(&transport).resolve_widget_data(Some(&config), &defaults).await;
        assert_eq!(resolved, ResolvedData::defaults(&defaults));
    }

    #[test]
    fn test_chart_payload_detection() {
        assert!(is_chart_payload(&json!({"seriesData": []})));
        assert!(is_chart_payload(&json!({"indicator": []})));
        assert!(is_chart_payload(&json!({"yAxisData": []})));
        assert!(is_chart_payload(&json!({"value": 1, "max": 2})));
        assert!(!is_chart_payload(&json!({"value": 1})));
        assert!(!is_chart_payload(&json!([{"seriesData": []}])));
        assert!(!is_chart_payload(&json!("xAxisData")));
    }
}
