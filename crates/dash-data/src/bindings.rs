//! Per-widget binding registry
//!
//! Holds the resolved render props of every bound widget and the refresh
//! timer feeding them. The registry never touches the document: it keeps
//! its own copy of each widget's binding and default props, keyed by id.

use std::sync::{Arc, Weak};

use ahash::AHashMap;
use dash_core::{DashboardDocument, DataSourceConfig, Props, Widget};
use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::debug;

use crate::fetcher::{ResolvedData, WidgetDataFetcher};
use crate::refresh::{create_refresh_timer, RefreshHandle};

const UPDATE_CHANNEL_CAPACITY: usize = 64;

struct BindingSlot {
    data_source: Option<DataSourceConfig>,
    defaults: Props,
    resolved: Option<ResolvedData>,
    /// Dropped together with the slot
    timer: Option<RefreshHandle>,
}

struct Inner {
    fetcher: WidgetDataFetcher,
    slots: RwLock<AHashMap<String, BindingSlot>>,
    updates: broadcast::Sender<String>,
}

/// Resolved render props for the widgets of a dashboard
#[derive(Clone)]
pub struct WidgetBindings {
    inner: Arc<Inner>,
}

impl WidgetBindings {
    /// Create a new, empty registry
    pub fn new(fetcher: WidgetDataFetcher) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                fetcher,
                slots: RwLock::new(AHashMap::new()),
                updates,
            }),
        }
    }

    /// Bind `widget`, resolve its data once and arm its refresh timer
    ///
    /// Rebinding an id replaces the previous binding and disposes its timer.
    pub async fn bind(&self, widget: &Widget) -> ResolvedData {
        let id = widget.id.clone();
        let data_source = widget.data_source.clone();
        let defaults = widget.props.clone();

        let timer = self.arm_timer(&id, data_source.as_ref());
        let slot = BindingSlot {
            data_source: data_source.clone(),
            defaults: defaults.clone(),
            resolved: None,
            timer,
        };
        if self.inner.slots.write().insert(id.clone(), slot).is_some() {
            debug!(widget_id = %id, "rebinding widget");
        }

        let resolved = self
            .inner
            .fetcher
            .resolve_widget_data(data_source.as_ref(), &defaults)
            .await;
        self.apply(&id, resolved.clone());
        resolved
    }

    /// Forget a widget and stop its refresh timer
    pub fn unbind(&self, id: &str) -> bool {
        let removed = self.inner.slots.write().remove(id);
        if removed.is_some() {
            debug!(widget_id = %id, "unbound widget");
        }
        removed.is_some()
    }

    /// Install a fetch result for `id`
    ///
    /// Returns `false` without effect when the widget is no longer bound,
    /// e.g. a late response for a deleted widget. The last result applied
    /// wins.
    pub fn apply(&self, id: &str, resolved: ResolvedData) -> bool {
        let mut slots = self.inner.slots.write();
        let Some(slot) = slots.get_mut(id) else {
            debug!(widget_id = %id, "dropping result for unbound widget");
            return false;
        };
        slot.resolved = Some(resolved);
        drop(slots);

        // No receivers is fine
        let _ = self.inner.updates.send(id.to_string());
        true
    }

    /// Re-fetch one widget's data; `false` if it is not bound
    pub async fn refresh(&self, id: &str) -> bool {
        let Some((data_source, defaults)) = self.binding_inputs(id) else {
            return false;
        };
        let resolved = self
            .inner
            .fetcher
            .resolve_widget_data(data_source.as_ref(), &defaults)
            .await;
        self.apply(id, resolved)
    }

    /// Latest resolution for `id`
    pub fn resolved(&self, id: &str) -> Option<ResolvedData> {
        self.inner.slots.read().get(id)?.resolved.clone()
    }

    /// Props to render `id` with: the latest resolution, else the defaults
    pub fn render_props(&self, id: &str) -> Option<Props> {
        let slots = self.inner.slots.read();
        let slot = slots.get(id)?;
        let props = match &slot.resolved {
            Some(resolved) => resolved.resolved_props.clone(),
            None => slot.defaults.clone(),
        };
        Some(props)
    }

    pub fn is_bound(&self, id: &str) -> bool {
        self.inner.slots.read().contains_key(id)
    }

    /// Whether `id` has an armed refresh timer
    pub fn is_refreshing(&self, id: &str) -> bool {
        let slots = self.inner.slots.read();
        let refreshing = slots
            .get(id)
            .and_then(|slot| slot.timer.as_ref())
            .is_some_and(RefreshHandle::is_active);
        refreshing
    }

    pub fn len(&self) -> usize {
        self.inner.slots.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.slots.read().is_empty()
    }

    /// Receive the id of every widget whose resolved props changed
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.inner.updates.subscribe()
    }

    /// Align the registry with `document`
    ///
    /// Widgets no longer in the document are unbound; new widgets and
    /// widgets whose binding or props changed are (re)bound.
    pub async fn sync(&self, document: &DashboardDocument) {
        let stale: Vec<String> = {
            let slots = self.inner.slots.read();
            slots
                .keys()
                .filter(|id| document.widget(id).is_none())
                .cloned()
                .collect()
        };
        for id in stale {
            self.unbind(&id);
        }

        for widget in &document.widgets {
            if self.needs_bind(widget) {
                self.bind(widget).await;
            }
        }
    }

    fn needs_bind(&self, widget: &Widget) -> bool {
        let slots = self.inner.slots.read();
        let needs = match slots.get(&widget.id) {
            Some(slot) => slot.data_source != widget.data_source || slot.defaults != widget.props,
            None => true,
        };
        needs
    }

    fn binding_inputs(&self, id: &str) -> Option<(Option<DataSourceConfig>, Props)> {
        let slots = self.inner.slots.read();
        let slot = slots.get(id)?;
        Some((slot.data_source.clone(), slot.defaults.clone()))
    }

    fn arm_timer(&self, id: &str, data_source: Option<&DataSourceConfig>) -> Option<RefreshHandle> {
        let inner: Weak<Inner> = Arc::downgrade(&self.inner);
        let id = id.to_string();

        create_refresh_timer(data_source, move || {
            let Some(inner) = inner.upgrade() else {
                return;
            };
            let bindings = WidgetBindings { inner };
            let id = id.clone();
            tokio::spawn(async move {
                bindings.refresh(&id).await;
            });
        })
    }
}
