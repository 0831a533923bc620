//! Core functionality for the dashboard designer
//!
//! This crate provides the in-memory dashboard document model, the widget
//! material catalog, path-based field mapping, and the design store with
//! its snapshot-based undo/redo history.

pub mod change;
pub mod document;
pub mod history;
pub mod mapping;
pub mod materials;
pub mod path;
pub mod store;

use thiserror::Error;

// Re-export commonly used types
pub use change::{ChangeKind, DocumentChange, DocumentSubscriber};
pub use document::{
    ApiMethod, DashboardDocument, DashboardPatch, DataSourceConfig, DataSourceType,
    FieldMapping, GridPosition, LayoutEntry, Props, Widget, WidgetStyle, WidgetType,
};
pub use history::{SnapshotHistory, DEFAULT_HISTORY_LIMIT};
pub use mapping::apply_field_mappings;
pub use materials::{
    field_targets, find_material, grouped_materials, materials_by_category, widget_materials,
    FieldTarget, MaterialCategory, WidgetMaterial,
};
pub use path::{get_by_path, set_by_path};
pub use store::{DesignStore, StoreOptions};

/// Errors that can occur while encoding or decoding dashboard documents
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Expected a JSON object, found {0}")]
    NotAnObject(&'static str),
}
