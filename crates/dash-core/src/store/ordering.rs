//! Z-order operations
//!
//! Widgets later in the list are drawn on top of earlier ones.

use tracing::debug;

use super::DesignStore;
use crate::change::ChangeKind;
use crate::document::Widget;

impl DesignStore {
    /// Raise a widget one layer
    pub fn move_widget_up(&self, id: &str) -> bool {
        self.reorder(id, |widgets, index| {
            if index + 1 >= widgets.len() {
                return false;
            }
            widgets.swap(index, index + 1);
            true
        })
    }

    /// Lower a widget one layer
    pub fn move_widget_down(&self, id: &str) -> bool {
        self.reorder(id, |widgets, index| {
            if index == 0 {
                return false;
            }
            widgets.swap(index, index - 1);
            true
        })
    }

    /// Raise a widget above all others
    pub fn move_widget_to_top(&self, id: &str) -> bool {
        self.reorder(id, |widgets, index| {
            if index + 1 >= widgets.len() {
                return false;
            }
            let widget = widgets.remove(index);
            widgets.push(widget);
            true
        })
    }

    /// Lower a widget below all others
    pub fn move_widget_to_bottom(&self, id: &str) -> bool {
        self.reorder(id, |widgets, index| {
            if index == 0 {
                return false;
            }
            let widget = widgets.remove(index);
            widgets.insert(0, widget);
            true
        })
    }

    fn reorder(&self, id: &str, apply: impl FnOnce(&mut Vec<Widget>, usize) -> bool) -> bool {
        let mut state = self.state.write();
        let Some(index) = state.document.position_of(id) else {
            return false;
        };

        if !apply(&mut state.document.widgets, index) {
            debug!(widget_id = %id, index, "widget already at z-order boundary");
            return false;
        }

        self.commit(state, ChangeKind::WidgetReordered(id.to_string()), true);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::WidgetType;
    use crate::materials::find_material;

    fn store_with(count: usize) -> (DesignStore, Vec<String>) {
        let store = DesignStore::new("Layers");
        let material = find_material(&WidgetType::Clock).unwrap();
        let ids = (0..count).map(|_| store.add_widget(material, None)).collect();
        (store, ids)
    }

    fn order(store: &DesignStore) -> Vec<String> {
        store.read(|doc| doc.widgets.iter().map(|w| w.id.clone()).collect())
    }

    #[test]
    fn test_top_and_bottom_of_two() {
        let (store, ids) = store_with(2);
        let len = store.history_len();

        assert!(!store.move_widget_to_top(&ids[1]));
        assert_eq!(order(&store), ids);
        assert_eq!(store.history_len(), len);

        assert!(store.move_widget_to_bottom(&ids[1]));
        assert_eq!(order(&store), vec![ids[1].clone(), ids[0].clone()]);
        assert_eq!(store.history_len(), len + 1);
    }

    #[test]
    fn test_single_steps() {
        let (store, ids) = store_with(3);

        assert!(store.move_widget_up(&ids[0]));
        assert_eq!(order(&store), vec![ids[1].clone(), ids[0].clone(), ids[2].clone()]);

        assert!(store.move_widget_down(&ids[2]));
        assert_eq!(order(&store), vec![ids[1].clone(), ids[2].clone(), ids[0].clone()]);

        assert!(!store.move_widget_up(&ids[0]));
        assert!(!store.move_widget_down(&ids[1]));
    }

    #[test]
    fn test_to_top_from_middle() {
        let (store, ids) = store_with(3);
        assert!(store.move_widget_to_top(&ids[0]));
        assert_eq!(order(&store), vec![ids[1].clone(), ids[2].clone(), ids[0].clone()]);

        assert!(!store.move_widget_to_bottom(&ids[1]));
        assert!(!store.move_widget_up("missing"));
    }

    #[test]
    fn test_reorder_is_undoable() {
        let (store, ids) = store_with(3);
        store.move_widget_to_bottom(&ids[2]);
        assert!(store.undo());
        assert_eq!(order(&store), ids);
    }
}
