//! Built-in widget material catalog
//!
//! A material is the immutable template a widget is created from: default
//! geometry, size bounds and default props. Widgets deep-copy the props at
//! creation, so editing a widget never touches its material.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::document::{GridPosition, Props, Widget, WidgetType};

/// Palette group a material is listed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialCategory {
    Chart,
    List,
    Widget,
}

/// Template describing a widget kind's defaults and constraints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetMaterial {
    #[serde(rename = "type")]
    pub widget_type: WidgetType,
    pub title: String,
    pub icon: String,
    pub category: MaterialCategory,
    pub default_w: u32,
    pub default_h: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_w: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_h: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_w: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_h: Option<u32>,
    pub default_props: Props,
}

impl WidgetMaterial {
    /// Create a widget instance of this material at `position`
    pub fn instantiate(&self, id: String, position: GridPosition) -> Widget {
        Widget {
            i: id.clone(),
            id,
            widget_type: self.widget_type.clone(),
            x: position.x,
            y: position.y,
            w: self.default_w,
            h: self.default_h,
            min_w: self.min_w,
            min_h: self.min_h,
            max_w: self.max_w,
            max_h: self.max_h,
            title: Some(self.title.clone()),
            props: self.default_props.clone(),
            style: None,
            data_source: None,
        }
    }
}

/// A prop key a field mapping may write to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldTarget {
    pub key: &'static str,
    pub label: &'static str,
}

const PALETTE: [&str; 5] = ["#5470c6", "#91cc75", "#fac858", "#ee6666", "#73c0de"];

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

fn material(
    widget_type: WidgetType,
    title: &str,
    icon: &str,
    category: MaterialCategory,
    size: (u32, u32),
    min: (u32, u32),
    props: Value,
) -> WidgetMaterial {
    let default_props = match props {
        Value::Object(map) => map,
        _ => Props::new(),
    };
    WidgetMaterial {
        widget_type,
        title: title.to_string(),
        icon: icon.to_string(),
        category,
        default_w: size.0,
        default_h: size.1,
        min_w: Some(min.0),
        min_h: Some(min.1),
        max_w: None,
        max_h: None,
        default_props,
    }
}

static MATERIALS: Lazy<Vec<WidgetMaterial>> = Lazy::new(|| {
    use MaterialCategory::{Chart, List, Widget as Content};

    vec![
        material(WidgetType::StatCard, "Stat Card", "CreditCard", Content, (3, 2), (2, 2), json!({
            "title": "Total Visits",
            "value": 0,
            "prefix": "",
            "suffix": "",
            "trend": 0,
            "trendLabel": "vs last week",
            "iconName": "TrendingUp",
            "iconColor": "var(--el-color-primary)",
            "bgColor": "var(--el-bg-color)",
        })),
        material(WidgetType::ProgressCard, "Progress Card", "Activity", Content, (3, 2), (2, 2), json!({
            "title": "Completion",
            "percentage": 75,
            "status": "",
            "strokeWidth": 12,
            "showText": true,
        })),
        material(WidgetType::ChartLine, "Line Chart", "TrendingUp", Chart, (6, 4), (4, 3), json!({
            "title": "Visit Trend",
            "smooth": true,
            "showArea": false,
            "showSymbol": true,
            "symbolSize": 6,
            "lineWidth": 2,
            "showLegend": true,
            "legendPosition": "top",
            "colors": PALETTE,
            "xAxisData": MONTHS,
            "seriesData": [
                {"name": "Visits", "data": [820, 932, 901, 934, 1290, 1330, 1320, 1450, 1200, 1100, 1350, 1500]},
                {"name": "Downloads", "data": [620, 732, 701, 734, 1090, 1130, 1120, 1250, 1000, 900, 1150, 1300]},
            ],
        })),
        material(WidgetType::ChartBar, "Bar Chart", "BarChart2", Chart, (6, 4), (4, 3), json!({
            "title": "Sales by Region",
            "horizontal": false,
            "stack": false,
            "barWidth": "auto",
            "barRadius": 4,
            "showBackground": false,
            "showLegend": true,
            "legendPosition": "top",
            "colors": PALETTE,
            "xAxisData": ["East", "South", "North", "Central", "Southwest", "Northwest", "Northeast"],
            "seriesData": [
                {"name": "2023", "data": [320, 302, 301, 334, 390, 330, 320]},
                {"name": "2024", "data": [420, 382, 391, 434, 490, 430, 420]},
            ],
        })),
        material(WidgetType::ChartPie, "Pie Chart", "PieChart", Chart, (4, 4), (3, 3), json!({
            "title": "Traffic Sources",
            "pieType": "pie",
            "radius": ["0%", "70%"],
            "showLabel": true,
            "labelPosition": "outside",
            "showLegend": true,
            "legendPosition": "bottom",
            "colors": PALETTE,
            "seriesData": [
                {"name": "Search Engine", "value": 1048},
                {"name": "Direct", "value": 735},
                {"name": "Email", "value": 580},
                {"name": "Affiliate Ads", "value": 484},
                {"name": "Video Ads", "value": 300},
            ],
        })),
        material(WidgetType::ChartGauge, "Gauge", "Gauge", Chart, (4, 4), (3, 3), json!({
            "title": "System Load",
            "value": 72.5,
            "min": 0,
            "max": 100,
            "unit": "%",
            "splitNumber": 10,
            "showProgress": true,
            "colorStops": [
                {"offset": 0.3, "color": "#67e0e3"},
                {"offset": 0.7, "color": "#37a2da"},
                {"offset": 1, "color": "#fd666d"},
            ],
            "pointerWidth": 6,
            "pointerLength": "60%",
        })),
        material(WidgetType::ChartArea, "Area Chart", "AreaChart", Chart, (6, 4), (4, 3), json!({
            "title": "Visit Trend",
            "smooth": true,
            "stack": false,
            "showLegend": true,
            "legendPosition": "top",
            "colors": PALETTE,
            "xAxisData": MONTHS,
            "seriesData": [
                {"name": "2023", "data": [820, 932, 901, 934, 1290, 1330, 1320, 1450, 1200, 1100, 1350, 1500]},
                {"name": "2024", "data": [1020, 1132, 1101, 1134, 1490, 1530, 1520, 1650, 1400, 1300, 1550, 1700]},
            ],
        })),
        material(WidgetType::ChartRadar, "Radar Chart", "Radar", Chart, (4, 4), (3, 3), json!({
            "title": "Capability Review",
            "shape": "polygon",
            "showLegend": true,
            "legendPosition": "top",
            "colors": ["#5470c6", "#91cc75", "#fac858"],
            "indicators": [
                {"name": "Sales", "max": 100},
                {"name": "Management", "max": 100},
                {"name": "Technology", "max": 100},
                {"name": "Support", "max": 100},
                {"name": "R&D", "max": 100},
                {"name": "Marketing", "max": 100},
            ],
            "seriesData": [
                {"name": "Budget", "value": [85, 90, 80, 70, 75, 88]},
                {"name": "Actual", "value": [90, 85, 95, 80, 70, 92]},
            ],
        })),
        material(WidgetType::ChartFunnel, "Funnel Chart", "Filter", Chart, (4, 4), (3, 3), json!({
            "title": "Conversion Funnel",
            "sort": "descending",
            "orient": "vertical",
            "showLegend": true,
            "legendPosition": "top",
            "colors": PALETTE,
            "seriesData": [
                {"name": "Visit", "value": 100},
                {"name": "Inquiry", "value": 80},
                {"name": "Intent", "value": 60},
                {"name": "Order", "value": 40},
                {"name": "Deal", "value": 20},
            ],
        })),
        material(WidgetType::ChartScatter, "Scatter Chart", "ScatterChart", Chart, (6, 4), (4, 3), json!({
            "title": "Distribution",
            "symbolSize": 10,
            "xAxisName": "Height",
            "yAxisName": "Weight",
            "axisNameLocation": "end",
            "showLegend": true,
            "legendPosition": "top",
            "colors": PALETTE,
            "seriesData": [
                {"name": "Male", "data": [[161, 51], [167, 59], [159, 49], [157, 63], [155, 53], [170, 70], [175, 75], [180, 80], [165, 58], [172, 68]]},
                {"name": "Female", "data": [[150, 45], [155, 50], [160, 52], [158, 48], [162, 55], [165, 58], [153, 47], [168, 60], [157, 51], [163, 54]]},
            ],
        })),
        material(WidgetType::ChartRing, "Ring Progress", "CircleDot", Chart, (4, 4), (3, 3), json!({
            "title": "KPI Completion",
            "colors": ["#5470c6", "#91cc75", "#fac858", "#ee6666"],
            "seriesData": [
                {"name": "Sales", "value": 85, "max": 100},
                {"name": "Orders", "value": 72, "max": 100},
                {"name": "Customers", "value": 93, "max": 100},
            ],
        })),
        material(WidgetType::ChartHeatmap, "Heatmap", "Grid", Chart, (6, 4), (4, 3), json!({
            "title": "Weekly Visit Heat",
            "xAxisData": ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"],
            "yAxisData": ["00:00", "04:00", "08:00", "12:00", "16:00", "20:00"],
            "seriesData": heatmap_cells(),
            "minValue": 0,
            "maxValue": 50,
        })),
        material(WidgetType::ChartKline, "Candlestick", "CandlestickChart", Chart, (6, 4), (4, 3), json!({
            "title": "Stock Trend",
            "showMA5": true,
            "showMA10": true,
            "xAxisData": ["2024/1/2", "2024/1/3", "2024/1/4", "2024/1/5", "2024/1/8", "2024/1/9", "2024/1/10", "2024/1/11", "2024/1/12", "2024/1/15"],
            "seriesData": [
                [20, 34, 10, 38], [40, 35, 30, 50], [31, 38, 33, 44], [38, 15, 5, 42], [15, 25, 10, 35],
                [25, 32, 20, 38], [32, 30, 25, 40], [30, 45, 28, 48], [45, 50, 40, 55], [50, 48, 42, 58],
            ],
        })),
        material(WidgetType::ChartSankey, "Sankey", "GitBranch", Chart, (6, 4), (4, 3), json!({
            "title": "Traffic Flow",
            "colors": PALETTE,
            "nodes": [
                {"name": "Visit"}, {"name": "Search Engine"}, {"name": "Direct"},
                {"name": "Inquiry"}, {"name": "Intent"}, {"name": "Order"}, {"name": "Deal"},
            ],
            "links": [
                {"source": "Visit", "target": "Search Engine", "value": 500},
                {"source": "Visit", "target": "Direct", "value": 300},
                {"source": "Visit", "target": "Inquiry", "value": 200},
                {"source": "Search Engine", "target": "Intent", "value": 300},
                {"source": "Direct", "target": "Intent", "value": 200},
                {"source": "Inquiry", "target": "Order", "value": 150},
                {"source": "Order", "target": "Deal", "value": 400},
            ],
        })),
        material(WidgetType::TodoList, "Todo List", "CheckSquare", List, (4, 4), (3, 3), json!({
            "title": "Todo",
            "items": [
                {"id": "1", "title": "Review quarterly report", "done": false, "priority": "high"},
                {"id": "2", "title": "Update team roster", "done": true, "priority": "medium"},
                {"id": "3", "title": "Plan offsite", "done": false, "priority": "low"},
            ],
        })),
        material(WidgetType::NoticeList, "Notices", "Bell", List, (4, 4), (3, 3), json!({
            "title": "Latest Notices",
            "limit": 5,
        })),
        material(WidgetType::AnnouncementList, "Announcements", "Megaphone", List, (4, 4), (3, 3), json!({
            "title": "Latest Announcements",
            "limit": 5,
        })),
        material(WidgetType::RankingList, "Ranking", "Award", List, (4, 4), (3, 3), json!({
            "title": "Sales Ranking",
            "items": [
                {"rank": 1, "name": "Alice", "value": 12000},
                {"rank": 2, "name": "Bob", "value": 10000},
                {"rank": 3, "name": "Carol", "value": 8000},
                {"rank": 4, "name": "Dave", "value": 6000},
                {"rank": 5, "name": "Erin", "value": 4000},
            ],
        })),
        material(WidgetType::QuickLinks, "Quick Links", "Grid", List, (4, 3), (2, 2), json!({
            "title": "Quick Links",
            "columns": 4,
            "rows": 2,
            "menus": [],
        })),
        material(WidgetType::WelcomeCard, "Welcome Card", "Smile", Content, (6, 2), (4, 2), json!({
            "title": "Welcome back",
            "subtitle": "Have a productive day",
            "showTime": true,
            "showWeather": false,
        })),
        material(WidgetType::Calendar, "Calendar", "Calendar", Content, (4, 5), (3, 4), json!({
            "title": "Calendar",
            "showLunar": false,
        })),
        material(WidgetType::Countdown, "Countdown", "Timer", Content, (3, 2), (2, 2), json!({
            "title": "Countdown",
            "targetTime": "",
            "showDays": true,
            "showHours": true,
            "showMinutes": true,
            "showSeconds": true,
            "finishedText": "Finished",
        })),
        material(WidgetType::Clock, "Clock", "Clock", Content, (3, 2), (2, 2), json!({
            "title": "",
            "showDate": true,
            "showSeconds": true,
            "format24": true,
            "timezone": "local",
        })),
        material(WidgetType::Weather, "Weather", "CloudSun", Content, (3, 2), (2, 2), json!({
            "title": "Today's Weather",
            "city": "Beijing",
            "temperature": 25,
            "weather": "Sunny",
            "humidity": 45,
            "wind": "NE 3",
        })),
        material(WidgetType::ImageCarousel, "Image Carousel", "Images", Content, (6, 3), (3, 2), json!({
            "title": "",
            "images": [
                {"url": "https://picsum.photos/800/400?random=1", "title": "Image 1", "link": ""},
                {"url": "https://picsum.photos/800/400?random=2", "title": "Image 2", "link": ""},
                {"url": "https://picsum.photos/800/400?random=3", "title": "Image 3", "link": ""},
            ],
            "autoplay": true,
            "interval": 3000,
            "showIndicator": true,
            "showArrow": true,
        })),
        material(WidgetType::DataTable, "Data Table", "Table", List, (6, 4), (4, 3), json!({
            "title": "Data List",
            "columns": [
                {"prop": "name", "label": "Name", "width": 120},
                {"prop": "value", "label": "Value", "width": 100},
                {"prop": "status", "label": "Status", "width": 80},
                {"prop": "time", "label": "Time", "width": 150},
            ],
            "data": [
                {"name": "Item A", "value": 1234, "status": "Normal", "time": "2024-01-01 10:00"},
                {"name": "Item B", "value": 5678, "status": "Warning", "time": "2024-01-02 11:00"},
                {"name": "Item C", "value": 9012, "status": "Normal", "time": "2024-01-03 12:00"},
                {"name": "Item D", "value": 3456, "status": "Error", "time": "2024-01-04 13:00"},
            ],
            "stripe": true,
            "border": false,
            "showIndex": false,
            "size": "default",
        })),
        material(WidgetType::Iframe, "Embedded Page", "Globe", Content, (6, 4), (3, 2), json!({
            "title": "External Page",
            "url": "https://www.example.com",
            "showBorder": true,
            "allowFullscreen": true,
        })),
        material(WidgetType::VideoPlayer, "Video Player", "Video", Content, (6, 4), (4, 3), json!({
            "title": "",
            "url": "https://www.w3schools.com/html/mov_bbb.mp4",
            "poster": "",
            "autoplay": false,
            "loop": false,
            "muted": false,
            "controls": true,
        })),
        material(WidgetType::Image, "Image", "Image", Content, (4, 3), (2, 2), json!({
            "title": "",
            "src": "https://picsum.photos/400/300",
            "alt": "Image",
            "fit": "cover",
            "lazy": true,
            "previewSrcList": [],
            "zIndex": 2000,
            "hideOnClickModal": false,
        })),
    ]
});

/// `[x, y, value]` cells for the default heatmap: 7 days by 6 time slots
fn heatmap_cells() -> Vec<[u32; 3]> {
    const VALUES: [[u32; 6]; 7] = [
        [5, 2, 15, 28, 35, 18],
        [3, 1, 18, 32, 38, 22],
        [4, 2, 20, 30, 40, 25],
        [6, 3, 22, 35, 42, 28],
        [8, 4, 25, 38, 45, 30],
        [15, 8, 12, 20, 25, 35],
        [12, 6, 10, 18, 22, 30],
    ];

    VALUES
        .iter()
        .enumerate()
        .flat_map(|(x, slots)| {
            slots
                .iter()
                .enumerate()
                .map(move |(y, value)| [x as u32, y as u32, *value])
        })
        .collect()
}

/// The built-in catalog, one material per widget kind
pub fn widget_materials() -> &'static [WidgetMaterial] {
    &MATERIALS
}

/// Look up the material for a widget kind
pub fn find_material(widget_type: &WidgetType) -> Option<&'static WidgetMaterial> {
    MATERIALS.iter().find(|m| &m.widget_type == widget_type)
}

/// Materials listed under `category`, in catalog order
pub fn materials_by_category(category: MaterialCategory) -> Vec<&'static WidgetMaterial> {
    MATERIALS.iter().filter(|m| m.category == category).collect()
}

/// Every palette group with its materials, groups in first-seen order
pub fn grouped_materials() -> IndexMap<MaterialCategory, Vec<&'static WidgetMaterial>> {
    let mut groups: IndexMap<MaterialCategory, Vec<&'static WidgetMaterial>> = IndexMap::new();
    for material in MATERIALS.iter() {
        groups.entry(material.category).or_default().push(material);
    }
    groups
}

const COMMON_TARGETS: [FieldTarget; 1] = [FieldTarget { key: "title", label: "Title" }];

/// Prop keys a field mapping may target for `widget_type`
pub fn field_targets(widget_type: &WidgetType) -> Vec<FieldTarget> {
    let specific: &'static [(&'static str, &'static str)] = match widget_type {
        WidgetType::StatCard => &[
            ("value", "Value"),
            ("trend", "Trend"),
            ("trendLabel", "Trend label"),
            ("prefix", "Prefix"),
            ("suffix", "Suffix"),
        ],
        WidgetType::ProgressCard => &[("percentage", "Percentage")],
        WidgetType::ChartLine | WidgetType::ChartBar => &[
            ("xAxisData", "X axis data"),
            ("seriesData", "Series data"),
        ],
        WidgetType::ChartPie => &[("seriesData", "Series data")],
        WidgetType::ChartGauge => &[
            ("value", "Current value"),
            ("min", "Minimum"),
            ("max", "Maximum"),
        ],
        WidgetType::TodoList | WidgetType::NoticeList | WidgetType::RankingList => {
            &[("items", "List data")]
        }
        WidgetType::QuickLinks => &[("links", "Link data")],
        _ => &[],
    };

    COMMON_TARGETS
        .iter()
        .copied()
        .chain(specific.iter().map(|&(key, label)| FieldTarget { key, label }))
        .collect()
}
