//! Dashboard design store
//!
//! One store owns one dashboard document plus the editing session around
//! it: selection, clipboard, drag/preview flags and the undo history.
//! Hosts create a store per editing session and share it behind an `Arc`.

mod ordering;
mod widgets;

use std::sync::{Arc, Weak};

use parking_lot::{RwLock, RwLockWriteGuard};
use tracing::{debug, warn};

use crate::change::{ChangeKind, DocumentChange, DocumentSubscriber};
use crate::document::{DashboardDocument, Widget};
use crate::history::{SnapshotHistory, DEFAULT_HISTORY_LIMIT};

/// Store configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    /// Maximum number of undo snapshots, clamped to at least 1
    pub history_limit: usize,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

/// Store state guarded by a single lock
struct StoreState {
    document: DashboardDocument,
    active_id: Option<String>,
    history: SnapshotHistory,
    /// Raised while undo/redo replaces the document and notifies
    time_travel: bool,
    clipboard: Option<Widget>,
    dragging: bool,
    preview: bool,
    version: u64,
}

impl StoreState {
    fn record_snapshot(&mut self) -> bool {
        if self.time_travel {
            debug!("snapshot suppressed during undo/redo");
            return false;
        }

        match self.document.to_json() {
            Ok(snapshot) => {
                self.history.record(snapshot);
                true
            }
            Err(err) => {
                warn!(error = %err, "failed to serialize document snapshot");
                false
            }
        }
    }

    fn clear_selection_if(&mut self, id: &str) {
        if self.active_id.as_deref() == Some(id) {
            self.active_id = None;
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Travel {
    Undo,
    Redo,
}

/// Editing state machine over a single dashboard document
pub struct DesignStore {
    state: RwLock<StoreState>,
    subscribers: RwLock<Vec<Weak<dyn DocumentSubscriber>>>,
}

impl Default for DesignStore {
    fn default() -> Self {
        Self::from_document(DashboardDocument::default(), StoreOptions::default())
    }
}

impl DesignStore {
    /// Create a new store over an empty dashboard
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_options(name, StoreOptions::default())
    }

    /// Create a new store over an empty dashboard with custom options
    pub fn with_options(name: impl Into<String>, options: StoreOptions) -> Self {
        Self::from_document(DashboardDocument::new(name), options)
    }

    /// Create a store editing `document`
    ///
    /// The document is recorded as the first snapshot, so the first
    /// mutation can be undone back to it.
    pub fn from_document(document: DashboardDocument, options: StoreOptions) -> Self {
        let mut state = StoreState {
            document,
            active_id: None,
            history: SnapshotHistory::new(options.history_limit),
            time_travel: false,
            clipboard: None,
            dragging: false,
            preview: false,
            version: 0,
        };
        state.record_snapshot();

        Self {
            state: RwLock::new(state),
            subscribers: RwLock::new(Vec::new()),
        }
    }

    /// Copy of the current document
    pub fn document(&self) -> DashboardDocument {
        self.state.read().document.clone()
    }

    /// Run `f` against the current document without cloning it
    pub fn read<R>(&self, f: impl FnOnce(&DashboardDocument) -> R) -> R {
        f(&self.state.read().document)
    }

    /// Copy of one widget
    pub fn widget(&self, id: &str) -> Option<Widget> {
        self.state.read().document.widget(id).cloned()
    }

    /// Document version, bumped by every mutation
    pub fn version(&self) -> u64 {
        self.state.read().version
    }

    /// Serialize the document as indented JSON
    pub fn export_config(&self) -> String {
        let state = self.state.read();
        state.document.to_json_pretty().unwrap_or_else(|err| {
            warn!(error = %err, "failed to export dashboard");
            String::new()
        })
    }

    /// Replace the document with the one encoded in `json`
    ///
    /// Returns `false` and leaves the store untouched when `json` is not a
    /// JSON object or does not decode as a document.
    pub fn import_config(&self, json: &str) -> bool {
        match DashboardDocument::from_json(json) {
            Ok(document) => {
                self.load_document(document);
                true
            }
            Err(err) => {
                warn!(error = %err, "rejected dashboard import");
                false
            }
        }
    }

    /// Replace the document wholesale, clearing the selection
    pub fn load_document(&self, mut document: DashboardDocument) {
        document.normalize();

        let mut state = self.state.write();
        debug!(widgets = document.widgets.len(), "loading dashboard document");
        state.document = document;
        state.active_id = None;
        self.commit(state, ChangeKind::Imported, true);
    }

    /// Push the current document onto the undo history
    ///
    /// Ignored while an undo or redo is propagating. Returns whether a
    /// snapshot was recorded.
    pub fn record_snapshot(&self) -> bool {
        self.state.write().record_snapshot()
    }

    /// Step back one snapshot; `false` at the oldest snapshot
    pub fn undo(&self) -> bool {
        self.travel(Travel::Undo)
    }

    /// Step forward one snapshot; `false` at the newest snapshot
    pub fn redo(&self) -> bool {
        self.travel(Travel::Redo)
    }

    pub fn can_undo(&self) -> bool {
        self.state.read().history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.state.read().history.can_redo()
    }

    /// Number of snapshots in the undo history
    pub fn history_len(&self) -> usize {
        self.state.read().history.len()
    }

    /// Cursor position in the undo history
    pub fn history_index(&self) -> Option<usize> {
        self.state.read().history.cursor()
    }

    /// Select a widget, or clear the selection with `None`
    pub fn set_active(&self, id: Option<&str>) {
        let mut state = self.state.write();
        state.active_id = id.map(str::to_string);
        self.notify_session(state);
    }

    pub fn active_id(&self) -> Option<String> {
        self.state.read().active_id.clone()
    }

    /// The selected widget, if it still exists
    pub fn active_widget(&self) -> Option<Widget> {
        let state = self.state.read();
        let id = state.active_id.as_deref()?;
        state.document.widget(id).cloned()
    }

    pub fn set_dragging(&self, dragging: bool) {
        let mut state = self.state.write();
        state.dragging = dragging;
        self.notify_session(state);
    }

    pub fn is_dragging(&self) -> bool {
        self.state.read().dragging
    }

    pub fn set_preview(&self, preview: bool) {
        let mut state = self.state.write();
        state.preview = preview;
        self.notify_session(state);
    }

    pub fn is_preview(&self) -> bool {
        self.state.read().preview
    }

    pub fn has_clipboard(&self) -> bool {
        self.state.read().clipboard.is_some()
    }

    /// Add a subscriber
    ///
    /// Subscribers are held weakly; dropping the last `Arc` unsubscribes.
    pub fn subscribe(&self, subscriber: Arc<dyn DocumentSubscriber>) {
        let mut subscribers = self.subscribers.write();
        subscribers.push(Arc::downgrade(&subscriber));
    }

    fn travel(&self, direction: Travel) -> bool {
        let mut state = self.state.write();

        let snapshot = match direction {
            Travel::Undo => state.history.undo().map(str::to_string),
            Travel::Redo => state.history.redo().map(str::to_string),
        };
        let Some(snapshot) = snapshot else {
            debug!(?direction, "history boundary reached");
            return false;
        };

        let document = match DashboardDocument::from_json(&snapshot) {
            Ok(document) => document,
            Err(err) => {
                warn!(?direction, error = %err, "corrupt history snapshot");
                match direction {
                    Travel::Undo => state.history.redo(),
                    Travel::Redo => state.history.undo(),
                };
                return false;
            }
        };

        state.time_travel = true;
        state.document = document;
        if let Some(id) = state.active_id.clone() {
            if state.document.widget(&id).is_none() {
                state.active_id = None;
            }
        }
        state.version += 1;
        debug!(?direction, cursor = ?state.history.cursor(), "restored snapshot");

        let kind = match direction {
            Travel::Undo => ChangeKind::Undo,
            Travel::Redo => ChangeKind::Redo,
        };
        let change = DocumentChange {
            version: state.version,
            kind,
        };
        drop(state);

        self.notify_subscribers(&change);
        self.state.write().time_travel = false;
        true
    }

    /// Finish a document mutation: snapshot, bump the version, release the
    /// lock and notify
    fn commit(&self, mut state: RwLockWriteGuard<'_, StoreState>, kind: ChangeKind, snapshot: bool) {
        if snapshot {
            state.record_snapshot();
        }
        state.version += 1;
        let change = DocumentChange {
            version: state.version,
            kind,
        };
        drop(state);
        self.notify_subscribers(&change);
    }

    fn notify_session(&self, state: RwLockWriteGuard<'_, StoreState>) {
        let change = DocumentChange {
            version: state.version,
            kind: ChangeKind::SessionChanged,
        };
        drop(state);
        self.notify_subscribers(&change);
    }

    fn notify_subscribers(&self, change: &DocumentChange) {
        let live: Vec<Arc<dyn DocumentSubscriber>> = {
            let mut subscribers = self.subscribers.write();

            // Remove any dead weak references
            subscribers.retain(|weak| weak.strong_count() > 0);
            subscribers.iter().filter_map(Weak::upgrade).collect()
        };

        for subscriber in live {
            subscriber.on_document_change(change);
        }
    }
}
