//! Widget-level editing operations

use tracing::debug;

use super::DesignStore;
use crate::change::ChangeKind;
use crate::document::{
    new_id, DashboardPatch, DataSourceConfig, GridPosition, LayoutEntry, Props, WidgetStyle,
};
use crate::materials::WidgetMaterial;

impl DesignStore {
    /// Place a new widget built from `material` and select it
    ///
    /// Without a position the widget goes to column 0 below the lowest
    /// occupied row. Returns the new widget id.
    pub fn add_widget(&self, material: &WidgetMaterial, position: Option<GridPosition>) -> String {
        let mut state = self.state.write();
        let position =
            position.unwrap_or_else(|| GridPosition::new(0, state.document.next_free_y()));

        let id = new_id();
        let widget = material.instantiate(id.clone(), position);
        debug!(widget_id = %id, widget_type = %widget.widget_type, x = position.x, y = position.y, "adding widget");

        state.document.widgets.push(widget);
        state.active_id = Some(id.clone());
        self.commit(state, ChangeKind::WidgetAdded(id.clone()), true);
        id
    }

    /// Remove a widget; `false` if no widget has `id`
    pub fn delete_widget(&self, id: &str) -> bool {
        let mut state = self.state.write();
        let Some(index) = state.document.position_of(id) else {
            return false;
        };

        state.document.widgets.remove(index);
        state.clear_selection_if(id);
        self.commit(state, ChangeKind::WidgetRemoved(id.to_string()), true);
        true
    }

    /// Duplicate a widget directly below itself and select the copy
    pub fn copy_widget(&self, id: &str) -> Option<String> {
        let mut state = self.state.write();
        let mut copy = state.document.widget(id)?.clone();

        let copy_id = new_id();
        copy.set_id(copy_id.clone());
        copy.y = copy.bottom();

        state.document.widgets.push(copy);
        state.active_id = Some(copy_id.clone());
        self.commit(state, ChangeKind::WidgetAdded(copy_id.clone()), true);
        Some(copy_id)
    }

    /// Put a copy of a widget on the clipboard, replacing its content
    pub fn copy_to_clipboard(&self, id: &str) -> bool {
        let mut state = self.state.write();
        let Some(widget) = state.document.widget(id).cloned() else {
            return false;
        };
        state.clipboard = Some(widget);
        true
    }

    /// Paste the clipboard widget below the lowest occupied row
    ///
    /// Returns `false` when the clipboard is empty. The clipboard keeps its
    /// content, so repeated pastes produce independent copies.
    pub fn paste_from_clipboard(&self) -> bool {
        let mut state = self.state.write();
        let Some(mut widget) = state.clipboard.clone() else {
            return false;
        };

        let id = new_id();
        widget.set_id(id.clone());
        widget.y = state.document.next_free_y();

        state.document.widgets.push(widget);
        state.active_id = Some(id.clone());
        self.commit(state, ChangeKind::WidgetAdded(id), true);
        true
    }

    /// Shallow-merge `props` into a widget's props without recording a
    /// snapshot
    pub fn update_widget_props(&self, id: &str, props: Props) -> bool {
        let mut state = self.state.write();
        let Some(widget) = state.document.widget_mut(id) else {
            return false;
        };

        widget.props.extend(props);
        self.commit(state, ChangeKind::WidgetUpdated(id.to_string()), false);
        true
    }

    /// Set a widget's title without recording a snapshot
    pub fn update_widget_title(&self, id: &str, title: impl Into<String>) -> bool {
        let mut state = self.state.write();
        let Some(widget) = state.document.widget_mut(id) else {
            return false;
        };

        widget.title = Some(title.into());
        self.commit(state, ChangeKind::WidgetUpdated(id.to_string()), false);
        true
    }

    /// Replace a widget's data binding
    pub fn update_widget_data_source(&self, id: &str, config: DataSourceConfig) -> bool {
        let mut state = self.state.write();
        let Some(widget) = state.document.widget_mut(id) else {
            return false;
        };

        debug!(widget_id = %id, source_type = ?config.source_type, "updating data source");
        widget.data_source = Some(config);
        self.commit(state, ChangeKind::WidgetUpdated(id.to_string()), true);
        true
    }

    /// Merge `patch` over the widget's style, itself layered over the
    /// default style
    pub fn update_widget_style(&self, id: &str, patch: &WidgetStyle) -> bool {
        let mut state = self.state.write();
        let Some(widget) = state.document.widget_mut(id) else {
            return false;
        };

        let base = match &widget.style {
            Some(existing) => WidgetStyle::defaults().merged(existing),
            None => WidgetStyle::defaults(),
        };
        widget.style = Some(base.merged(patch));
        self.commit(state, ChangeKind::WidgetUpdated(id.to_string()), true);
        true
    }

    /// Apply a full-layout recompute from the grid engine
    ///
    /// Entries are matched to widgets by grid key. No snapshot is recorded;
    /// hosts record one per finished drag gesture. Returns the number of
    /// widgets moved or resized.
    pub fn update_layout(&self, layout: &[LayoutEntry]) -> usize {
        let mut state = self.state.write();
        let mut applied = 0;

        for entry in layout {
            if let Some(widget) = state.document.widgets.iter_mut().find(|w| w.i == entry.i) {
                widget.x = entry.x;
                widget.y = entry.y;
                widget.w = entry.w;
                widget.h = entry.h;
                applied += 1;
            }
        }

        if applied > 0 {
            self.commit(state, ChangeKind::LayoutChanged, false);
        }
        applied
    }

    /// Remove every widget and clear the selection
    pub fn clear_canvas(&self) {
        let mut state = self.state.write();
        state.document.widgets.clear();
        state.active_id = None;
        self.commit(state, ChangeKind::CanvasCleared, true);
    }

    /// Overwrite dashboard-level settings without recording a snapshot
    pub fn update_dashboard_config(&self, patch: &DashboardPatch) {
        let mut state = self.state.write();
        state.document.apply_patch(patch);
        self.commit(state, ChangeKind::DashboardConfigChanged, false);
    }
}
