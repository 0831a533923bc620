//! Dashboard document model
//!
//! Field names serialize exactly as the export/import wire format expects
//! (`rowHeight`, `minW`, `dataSource`, ...). Decoding is permissive: fields
//! that are missing or have an unexpected shape fall back to their defaults,
//! so any JSON object can be imported.

use std::fmt;
use std::time::Duration;

use ahash::AHashSet;
use indexmap::IndexMap;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::DocumentError;

/// Open property bag handed to widget renderers
pub type Props = serde_json::Map<String, Value>;

/// Default number of grid columns for a new dashboard
pub const DEFAULT_COLUMNS: u32 = 12;

/// Default pixel height of one grid row
pub const DEFAULT_ROW_HEIGHT: f64 = 50.0;

/// Default horizontal and vertical spacing between widgets
pub const DEFAULT_MARGIN: [f64; 2] = [12.0, 12.0];

/// Generate a fresh widget or document identifier
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

macro_rules! widget_types {
    ($($variant:ident => $tag:literal),* $(,)?) => {
        /// Renderer kind of a widget
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum WidgetType {
            $($variant,)*
            /// A kind this build has no material for, kept verbatim
            Custom(String),
        }

        impl WidgetType {
            /// Every built-in widget kind
            pub const ALL: &'static [WidgetType] = &[$(WidgetType::$variant),*];

            /// Wire tag of this kind
            pub fn as_str(&self) -> &str {
                match self {
                    $(WidgetType::$variant => $tag,)*
                    WidgetType::Custom(tag) => tag,
                }
            }
        }

        impl From<String> for WidgetType {
            fn from(tag: String) -> Self {
                match tag.as_str() {
                    $($tag => WidgetType::$variant,)*
                    _ => WidgetType::Custom(tag),
                }
            }
        }
    };
}

widget_types! {
    StatCard => "stat-card",
    ProgressCard => "progress-card",
    ChartLine => "chart-line",
    ChartBar => "chart-bar",
    ChartPie => "chart-pie",
    ChartGauge => "chart-gauge",
    ChartArea => "chart-area",
    ChartRadar => "chart-radar",
    ChartFunnel => "chart-funnel",
    ChartScatter => "chart-scatter",
    ChartRing => "chart-ring",
    ChartHeatmap => "chart-heatmap",
    ChartKline => "chart-kline",
    ChartSankey => "chart-sankey",
    TodoList => "todo-list",
    NoticeList => "notice-list",
    AnnouncementList => "announcement-list",
    RankingList => "ranking-list",
    QuickLinks => "quick-links",
    WelcomeCard => "welcome-card",
    Calendar => "calendar",
    Countdown => "countdown",
    Clock => "clock",
    Weather => "weather",
    ImageCarousel => "image-carousel",
    DataTable => "data-table",
    Iframe => "iframe",
    VideoPlayer => "video-player",
    Image => "image",
}

impl WidgetType {
    /// Parse a tag, rejecting kinds that are not built in
    pub fn parse_known(tag: &str) -> Option<WidgetType> {
        match WidgetType::from(tag.to_string()) {
            WidgetType::Custom(_) => None,
            known => Some(known),
        }
    }

    /// Whether this kind renders a chart
    pub fn is_chart(&self) -> bool {
        self.as_str().starts_with("chart-")
    }
}

impl From<WidgetType> for String {
    fn from(widget_type: WidgetType) -> Self {
        match widget_type {
            WidgetType::Custom(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for WidgetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn untyped_widget() -> WidgetType {
    WidgetType::Custom(String::new())
}

/// Field-by-field decoding of an imported JSON object
///
/// A field that is absent or has an unexpected shape reads as `None`.
struct Fields(Props);

impl Fields {
    fn take<T: DeserializeOwned>(&mut self, key: &str) -> Option<T> {
        serde_json::from_value(self.0.remove(key)?).ok()
    }

    /// Elements of an array field that decode as `T`; others are dropped
    fn take_list<T: DeserializeOwned>(&mut self, key: &str) -> Vec<T> {
        match self.0.remove(key) {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Grid units: floats are rounded, negatives become zero
    fn take_grid_unit(&mut self, key: &str) -> Option<u32> {
        self.take::<f64>(key).map(|value| {
            if value > 0.0 {
                value.round().min(u32::MAX as f64) as u32
            } else {
                0
            }
        })
    }
}

/// The root aggregate: grid configuration plus the ordered widget list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Props")]
pub struct DashboardDocument {
    /// Assigned once at creation
    pub id: String,

    /// Display name
    pub name: String,

    /// Grid column count
    pub columns: u32,

    /// Pixel height of one grid row
    pub row_height: f64,

    /// Horizontal and vertical spacing in pixels
    pub margin: [f64; 2],

    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_outer_margin: Option<bool>,

    /// Widgets in z-order: later entries stack on top
    pub widgets: Vec<Widget>,
}

impl Default for DashboardDocument {
    fn default() -> Self {
        Self {
            id: new_id(),
            name: "My Dashboard".to_string(),
            columns: DEFAULT_COLUMNS,
            row_height: DEFAULT_ROW_HEIGHT,
            margin: DEFAULT_MARGIN,
            background_color: None,
            show_outer_margin: None,
            widgets: Vec::new(),
        }
    }
}

impl DashboardDocument {
    /// Create an empty dashboard with the default grid
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Decode a document from JSON text
    ///
    /// Any JSON object is accepted; fields that are absent or of the wrong
    /// type take the defaults of a new document. Only invalid JSON and
    /// non-object JSON are rejected.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Decode a document from an already parsed JSON value
    pub fn from_value(value: Value) -> Result<Self, DocumentError> {
        match value {
            Value::Object(fields) => Ok(DashboardDocument::from(fields)),
            Value::Null => Err(DocumentError::NotAnObject("null")),
            Value::Bool(_) => Err(DocumentError::NotAnObject("a boolean")),
            Value::Number(_) => Err(DocumentError::NotAnObject("a number")),
            Value::String(_) => Err(DocumentError::NotAnObject("a string")),
            Value::Array(_) => Err(DocumentError::NotAnObject("an array")),
        }
    }

    /// Compact JSON used for history snapshots
    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Indented JSON used for exports
    pub fn to_json_pretty(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Restore widget identity invariants after decoding
    ///
    /// Widgets without an id, or repeating an id already taken by an
    /// earlier widget, receive a fresh one. Every grid key `i` is then
    /// re-synchronized with its widget id.
    pub fn normalize(&mut self) {
        let mut seen = AHashSet::with_capacity(self.widgets.len());
        for widget in &mut self.widgets {
            if widget.id.is_empty() || !seen.insert(widget.id.clone()) {
                if !widget.id.is_empty() {
                    debug!(widget_id = %widget.id, "reassigning duplicate widget id");
                }
                widget.id = new_id();
                seen.insert(widget.id.clone());
            }
            widget.i = widget.id.clone();
        }
    }

    /// Find a widget by id
    pub fn widget(&self, id: &str) -> Option<&Widget> {
        self.widgets.iter().find(|w| w.id == id)
    }

    /// Find a widget by id for modification
    pub fn widget_mut(&mut self, id: &str) -> Option<&mut Widget> {
        self.widgets.iter_mut().find(|w| w.id == id)
    }

    /// Index of a widget in z-order
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.widgets.iter().position(|w| w.id == id)
    }

    /// First row below every placed widget
    pub fn next_free_y(&self) -> u32 {
        self.widgets.iter().map(Widget::bottom).max().unwrap_or(0)
    }

    /// Overwrite the dashboard-level fields present in `patch`
    pub fn apply_patch(&mut self, patch: &DashboardPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(columns) = patch.columns {
            self.columns = columns;
        }
        if let Some(row_height) = patch.row_height {
            self.row_height = row_height;
        }
        if let Some(margin) = patch.margin {
            self.margin = margin;
        }
        if let Some(background_color) = &patch.background_color {
            self.background_color = Some(background_color.clone());
        }
        if let Some(show_outer_margin) = patch.show_outer_margin {
            self.show_outer_margin = Some(show_outer_margin);
        }
    }
}

impl From<Props> for DashboardDocument {
    fn from(fields: Props) -> Self {
        let mut fields = Fields(fields);
        let defaults = DashboardDocument::default();

        let mut document = DashboardDocument {
            id: fields.take("id").unwrap_or(defaults.id),
            name: fields.take("name").unwrap_or(defaults.name),
            columns: fields.take_grid_unit("columns").unwrap_or(defaults.columns),
            row_height: fields.take("rowHeight").unwrap_or(defaults.row_height),
            margin: fields.take("margin").unwrap_or(defaults.margin),
            background_color: fields.take("backgroundColor"),
            show_outer_margin: fields.take("showOuterMargin"),
            widgets: fields.take_list("widgets"),
        };
        document.normalize();
        document
    }
}

/// Partial update of dashboard-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardPatch {
    pub name: Option<String>,
    pub columns: Option<u32>,
    pub row_height: Option<f64>,
    pub margin: Option<[f64; 2]>,
    pub background_color: Option<String>,
    pub show_outer_margin: Option<bool>,
}

/// Grid cell where a new widget is placed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridPosition {
    pub x: u32,
    pub y: u32,
}

impl GridPosition {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// One entry of a full-layout recompute reported by the grid engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutEntry {
    pub i: String,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

/// One placed widget instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Props")]
pub struct Widget {
    pub id: String,

    #[serde(rename = "type")]
    pub widget_type: WidgetType,

    /// Grid-engine key, always equal to `id`
    pub i: String,

    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_w: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_h: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_w: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_h: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Renderer configuration, never shared with a material's defaults
    pub props: Props,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<WidgetStyle>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_source: Option<DataSourceConfig>,
}

impl Widget {
    /// Replace the identifier, keeping the grid key in sync
    pub fn set_id(&mut self, id: String) {
        self.i = id.clone();
        self.id = id;
    }

    /// First grid row below this widget
    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.h)
    }

    /// Style renderers should apply, with unset fields filled from defaults
    pub fn effective_style(&self) -> WidgetStyle {
        match &self.style {
            Some(style) => WidgetStyle::defaults().merged(style),
            None => WidgetStyle::defaults(),
        }
    }
}

impl From<Props> for Widget {
    fn from(fields: Props) -> Self {
        let mut fields = Fields(fields);
        Widget {
            id: fields.take("id").unwrap_or_default(),
            widget_type: fields.take("type").unwrap_or_else(untyped_widget),
            i: fields.take("i").unwrap_or_default(),
            x: fields.take_grid_unit("x").unwrap_or(0),
            y: fields.take_grid_unit("y").unwrap_or(0),
            w: fields.take_grid_unit("w").unwrap_or(0),
            h: fields.take_grid_unit("h").unwrap_or(0),
            min_w: fields.take_grid_unit("minW"),
            min_h: fields.take_grid_unit("minH"),
            max_w: fields.take_grid_unit("maxW"),
            max_h: fields.take_grid_unit("maxH"),
            title: fields.take("title"),
            props: fields.take("props").unwrap_or_default(),
            style: fields.take("style"),
            data_source: fields.take("dataSource"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundSize {
    Auto,
    Contain,
    Cover,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderStyle {
    Dashed,
    Dotted,
    None,
    Solid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TitleAlign {
    Center,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Bold,
    Normal,
}

/// Widget chrome: background, border, shadow, padding and title styling
///
/// Every field is optional so that a value doubles as a partial patch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Props")]
pub struct WidgetStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_size: Option<BackgroundSize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_style: Option<BorderStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_blur: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_offset_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_offset_y: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_show: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_align: Option<TitleAlign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_font_weight: Option<FontWeight>,
}

impl WidgetStyle {
    /// The documented default style
    pub fn defaults() -> Self {
        Self {
            background_color: Some(String::new()),
            background_image: None,
            background_size: None,
            border_width: Some(0.0),
            border_color: Some(String::new()),
            border_style: Some(BorderStyle::Solid),
            border_radius: Some(8.0),
            shadow_enabled: Some(true),
            shadow_color: Some("rgba(0, 0, 0, 0.1)".to_string()),
            shadow_blur: Some(4.0),
            shadow_offset_x: Some(0.0),
            shadow_offset_y: Some(1.0),
            padding: Some(16.0),
            title_show: Some(true),
            title_font_size: Some(14.0),
            title_color: Some(String::new()),
            title_align: Some(TitleAlign::Left),
            title_font_weight: Some(FontWeight::Normal),
        }
    }

    /// Layer `patch` over `self`: fields set in the patch win
    pub fn merged(&self, patch: &WidgetStyle) -> WidgetStyle {
        fn pick<T: Clone>(patch: &Option<T>, base: &Option<T>) -> Option<T> {
            patch.clone().or_else(|| base.clone())
        }

        WidgetStyle {
            background_color: pick(&patch.background_color, &self.background_color),
            background_image: pick(&patch.background_image, &self.background_image),
            background_size: pick(&patch.background_size, &self.background_size),
            border_width: pick(&patch.border_width, &self.border_width),
            border_color: pick(&patch.border_color, &self.border_color),
            border_style: pick(&patch.border_style, &self.border_style),
            border_radius: pick(&patch.border_radius, &self.border_radius),
            shadow_enabled: pick(&patch.shadow_enabled, &self.shadow_enabled),
            shadow_color: pick(&patch.shadow_color, &self.shadow_color),
            shadow_blur: pick(&patch.shadow_blur, &self.shadow_blur),
            shadow_offset_x: pick(&patch.shadow_offset_x, &self.shadow_offset_x),
            shadow_offset_y: pick(&patch.shadow_offset_y, &self.shadow_offset_y),
            padding: pick(&patch.padding, &self.padding),
            title_show: pick(&patch.title_show, &self.title_show),
            title_font_size: pick(&patch.title_font_size, &self.title_font_size),
            title_color: pick(&patch.title_color, &self.title_color),
            title_align: pick(&patch.title_align, &self.title_align),
            title_font_weight: pick(&patch.title_font_weight, &self.title_font_weight),
        }
    }
}

impl From<Props> for WidgetStyle {
    fn from(fields: Props) -> Self {
        let mut fields = Fields(fields);
        WidgetStyle {
            background_color: fields.take("backgroundColor"),
            background_image: fields.take("backgroundImage"),
            background_size: fields.take("backgroundSize"),
            border_width: fields.take("borderWidth"),
            border_color: fields.take("borderColor"),
            border_style: fields.take("borderStyle"),
            border_radius: fields.take("borderRadius"),
            shadow_enabled: fields.take("shadowEnabled"),
            shadow_color: fields.take("shadowColor"),
            shadow_blur: fields.take("shadowBlur"),
            shadow_offset_x: fields.take("shadowOffsetX"),
            shadow_offset_y: fields.take("shadowOffsetY"),
            padding: fields.take("padding"),
            title_show: fields.take("titleShow"),
            title_font_size: fields.take("titleFontSize"),
            title_color: fields.take("titleColor"),
            title_align: fields.take("titleAlign"),
            title_font_weight: fields.take("titleFontWeight"),
        }
    }
}

/// How a widget's live values are obtained
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataSourceType {
    /// Use `props` as given
    #[default]
    Static,
    /// A named, server-registered data source
    DataSource,
    /// An ad-hoc HTTP call
    Api,
    Upload,
}

/// HTTP method of an ad-hoc API binding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ApiMethod {
    #[default]
    Get,
    Post,
}

/// A `source` path in fetched data copied to a `target` path in props
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    pub source: String,
    pub target: String,
}

impl FieldMapping {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Data binding of one widget
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Props")]
pub struct DataSourceConfig {
    #[serde(rename = "type")]
    pub source_type: DataSourceType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_source_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_method: Option<ApiMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_headers: Option<IndexMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_params: Option<Props>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_body: Option<Props>,

    /// Path to the payload inside the response, e.g. `data.items[0]`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_path: Option<String>,

    /// Applied in order; later mappings may overwrite earlier targets
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub field_mappings: Vec<FieldMapping>,

    /// Seconds between re-fetches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_interval: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_enabled: Option<bool>,
}

impl From<Props> for DataSourceConfig {
    fn from(fields: Props) -> Self {
        let mut fields = Fields(fields);
        DataSourceConfig {
            source_type: fields.take("type").unwrap_or_default(),
            data_source_code: fields.take("dataSourceCode"),
            api_url: fields.take("apiUrl"),
            api_method: fields.take("apiMethod"),
            api_headers: fields.take("apiHeaders"),
            api_params: fields.take("apiParams"),
            api_body: fields.take("apiBody"),
            data_path: fields.take("dataPath"),
            field_mappings: fields.take_list("fieldMappings"),
            refresh_interval: fields.take("refreshInterval"),
            refresh_enabled: fields.take("refreshEnabled"),
        }
    }
}

impl DataSourceConfig {
    /// Binding to a named data source
    pub fn named(code: impl Into<String>) -> Self {
        Self {
            source_type: DataSourceType::DataSource,
            data_source_code: Some(code.into()),
            ..Self::default()
        }
    }

    /// Binding to an ad-hoc API endpoint
    pub fn api(url: impl Into<String>, method: ApiMethod) -> Self {
        Self {
            source_type: DataSourceType::Api,
            api_url: Some(url.into()),
            api_method: Some(method),
            ..Self::default()
        }
    }

    pub fn with_data_path(mut self, path: impl Into<String>) -> Self {
        self.data_path = Some(path.into());
        self
    }

    pub fn with_mapping(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.field_mappings.push(FieldMapping::new(source, target));
        self
    }

    pub fn with_refresh(mut self, seconds: f64) -> Self {
        self.refresh_enabled = Some(true);
        self.refresh_interval = Some(seconds);
        self
    }

    /// Whether props are used as given, without fetching
    pub fn is_static(&self) -> bool {
        self.source_type == DataSourceType::Static
    }

    /// Configured data path, ignoring empty strings
    pub fn data_path(&self) -> Option<&str> {
        self.data_path.as_deref().filter(|p| !p.is_empty())
    }

    /// Period of the refresh timer, `None` when refreshing is off
    pub fn refresh_period(&self) -> Option<Duration> {
        if self.refresh_enabled != Some(true) {
            return None;
        }
        self.refresh_interval
            .filter(|secs| secs.is_finite() && *secs > 0.0)
            .map(Duration::from_secs_f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_widget_type_tags() {
        assert_eq!(WidgetType::ALL.len(), 29);
        assert_eq!(WidgetType::ChartKline.as_str(), "chart-kline");
        assert_eq!(WidgetType::from("video-player".to_string()), WidgetType::VideoPlayer);
        assert_eq!(
            WidgetType::from("sparkline".to_string()),
            WidgetType::Custom("sparkline".to_string())
        );
        assert!(WidgetType::parse_known("sparkline").is_none());
        assert!(WidgetType::ChartGauge.is_chart());
        assert!(!WidgetType::TodoList.is_chart());
    }

    #[test]
    fn test_document_wire_names() {
        let mut doc = DashboardDocument::new("Ops");
        let mut widget = Widget {
            id: String::new(),
            widget_type: WidgetType::StatCard,
            i: String::new(),
            x: 0,
            y: 0,
            w: 3,
            h: 2,
            min_w: Some(2),
            min_h: None,
            max_w: None,
            max_h: None,
            title: None,
            props: Props::new(),
            style: None,
            data_source: Some(DataSourceConfig::named("sales").with_mapping("total", "value")),
        };
        widget.set_id("w1".to_string());
        doc.widgets.push(widget);

        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["rowHeight"], json!(50.0));
        assert_eq!(value["widgets"][0]["type"], json!("stat-card"));
        assert_eq!(value["widgets"][0]["i"], json!("w1"));
        assert_eq!(value["widgets"][0]["minW"], json!(2));
        assert!(value["widgets"][0].get("minH").is_none());
        assert_eq!(value["widgets"][0]["dataSource"]["type"], json!("dataSource"));
        assert_eq!(value["widgets"][0]["dataSource"]["dataSourceCode"], json!("sales"));
        assert_eq!(
            value["widgets"][0]["dataSource"]["fieldMappings"][0],
            json!({"source": "total", "target": "value"})
        );
    }

    #[test]
    fn test_permissive_decode() {
        let doc = DashboardDocument::from_json(
            r#"{"name": "Imported", "widgets": [{"type": "clock", "x": 1.6, "y": -2, "w": 3, "h": null}]}"#,
        )
        .unwrap();

        assert_eq!(doc.name, "Imported");
        assert_eq!(doc.columns, DEFAULT_COLUMNS);
        assert!(!doc.id.is_empty());

        let widget = &doc.widgets[0];
        assert_eq!(widget.widget_type, WidgetType::Clock);
        assert!(!widget.id.is_empty());
        assert_eq!(widget.i, widget.id);
        assert_eq!((widget.x, widget.y, widget.w, widget.h), (2, 0, 3, 0));
    }

    #[test]
    fn test_decode_rejects_non_objects() {
        assert!(matches!(
            DashboardDocument::from_json("[1, 2]"),
            Err(DocumentError::NotAnObject("an array"))
        ));
        assert!(matches!(
            DashboardDocument::from_json("{not json"),
            Err(DocumentError::Json(_))
        ));
        assert!(matches!(
            DashboardDocument::from_json("\"dashboard\""),
            Err(DocumentError::NotAnObject("a string"))
        ));
    }

    #[test]
    fn test_mistyped_fields_take_defaults() {
        let doc = DashboardDocument::from_json(
            r#"{"name": 7, "columns": "12", "rowHeight": null, "margin": [1], "widgets": "many"}"#,
        )
        .unwrap();
        assert_eq!(doc.name, "My Dashboard");
        assert_eq!(doc.columns, DEFAULT_COLUMNS);
        assert_eq!(doc.row_height, DEFAULT_ROW_HEIGHT);
        assert_eq!(doc.margin, DEFAULT_MARGIN);
        assert!(doc.widgets.is_empty());

        let doc = DashboardDocument::from_json(
            r#"{"widgets": [
                {"id": "a", "type": "clock", "props": [], "style": {"borderStyle": "groove", "padding": 4}},
                {"id": "b", "type": 3, "dataSource": {"type": "database", "apiHeaders": {"X-Count": 1},
                    "dataPath": "rows", "fieldMappings": [{"source": "n", "target": "value"}, "bad"]}},
                "not a widget"
            ]}"#,
        )
        .unwrap();
        assert_eq!(doc.widgets.len(), 2);

        let clock = &doc.widgets[0];
        assert!(clock.props.is_empty());
        let style = clock.style.as_ref().unwrap();
        assert_eq!(style.border_style, None);
        assert_eq!(style.padding, Some(4.0));
        assert_eq!(clock.effective_style().border_style, Some(BorderStyle::Solid));

        let other = &doc.widgets[1];
        assert_eq!(other.widget_type, WidgetType::Custom(String::new()));
        let source = other.data_source.as_ref().unwrap();
        assert_eq!(source.source_type, DataSourceType::Static);
        assert!(source.api_headers.is_none());
        assert_eq!(source.data_path(), Some("rows"));
        assert_eq!(source.field_mappings, vec![FieldMapping::new("n", "value")]);
    }

    #[test]
    fn test_duplicate_ids_are_reassigned() {
        let doc = DashboardDocument::from_json(
            r#"{"widgets": [
                {"id": "a", "type": "clock"},
                {"id": "a", "type": "weather"},
                {"id": "b", "type": "clock", "i": "a"}
            ]}"#,
        )
        .unwrap();

        let ids: Vec<&str> = doc.widgets.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids[0], "a");
        assert_ne!(ids[1], "a");
        assert!(!ids[1].is_empty());
        assert_eq!(ids[2], "b");
        assert!(doc.widgets.iter().all(|w| w.i == w.id));
        assert_eq!(doc.position_of(ids[1]), Some(1));
    }

    #[test]
    fn test_style_merge_falls_back_to_defaults() {
        let patch = WidgetStyle {
            padding: Some(4.0),
            border_style: Some(BorderStyle::Dashed),
            ..WidgetStyle::default()
        };
        let merged = WidgetStyle::defaults().merged(&patch);

        assert_eq!(merged.padding, Some(4.0));
        assert_eq!(merged.border_style, Some(BorderStyle::Dashed));
        assert_eq!(merged.border_radius, Some(8.0));
        assert_eq!(merged.title_align, Some(TitleAlign::Left));
    }

    #[test]
    fn test_refresh_period() {
        let config = DataSourceConfig::named("cpu");
        assert_eq!(config.refresh_period(), None);

        let config = config.with_refresh(5.0);
        assert_eq!(config.refresh_period(), Some(Duration::from_secs(5)));

        let mut disabled = DataSourceConfig::named("cpu").with_refresh(0.0);
        assert_eq!(disabled.refresh_period(), None);
        disabled.refresh_interval = Some(10.0);
        disabled.refresh_enabled = Some(false);
        assert_eq!(disabled.refresh_period(), None);
    }

    #[test]
    fn test_next_free_y() {
        let mut doc = DashboardDocument::default();
        assert_eq!(doc.next_free_y(), 0);

        let json = r#"{"widgets": [
            {"id": "a", "type": "clock", "x": 0, "y": 0, "w": 3, "h": 2},
            {"id": "b", "type": "clock", "x": 3, "y": 4, "w": 3, "h": 3}
        ]}"#;
        doc = DashboardDocument::from_json(json).unwrap();
        assert_eq!(doc.next_free_y(), 7);
    }
}
