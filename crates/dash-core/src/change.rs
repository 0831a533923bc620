//! Document change notifications
//!
//! Renderers and inspectors subscribe to the store instead of observing its
//! fields. Every notification carries the document version after the change.

/// What a store operation changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeKind {
    WidgetAdded(String),
    WidgetRemoved(String),
    WidgetUpdated(String),
    /// Z-order of the widget changed
    WidgetReordered(String),
    LayoutChanged,
    CanvasCleared,
    DashboardConfigChanged,
    /// The whole document was replaced by an import
    Imported,
    Undo,
    Redo,
    /// Selection, drag or preview state changed; the document did not
    SessionChanged,
}

/// Notification delivered to subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentChange {
    /// Document version after the change
    pub version: u64,
    pub kind: ChangeKind,
}

/// Trait for components that need to respond to document changes
pub trait DocumentSubscriber: Send + Sync {
    /// Called after the store has applied a change and released its lock
    fn on_document_change(&self, change: &DocumentChange);
}

/// Subscriber backed by a closure
pub struct ClosureSubscriber<F> {
    handler: F,
}

impl<F> DocumentSubscriber for ClosureSubscriber<F>
where
    F: Fn(&DocumentChange) + Send + Sync,
{
    fn on_document_change(&self, change: &DocumentChange) {
        (self.handler)(change);
    }
}

/// Create a subscriber from a closure
pub fn subscriber_from_fn<F>(f: F) -> ClosureSubscriber<F>
where
    F: Fn(&DocumentChange) + Send + Sync + 'static,
{
    ClosureSubscriber { handler: f }
}
