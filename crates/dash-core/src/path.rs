//! Dotted/bracket path access into JSON values
//!
//! Paths look like `data.items[0].name`. Bracket indices are normalized to
//! plain segments (`items.0`) before walking.

use serde_json::{Map, Value};

/// Rewrite `foo[3]` segments as `foo.3`
pub fn normalize_path(path: &str) -> String {
    let mut normalized = String::with_capacity(path.len());
    let mut rest = path;

    while let Some(open) = rest.find('[') {
        let after = &rest[open + 1..];
        match after.find(']') {
            Some(close) if close > 0 && after[..close].bytes().all(|b| b.is_ascii_digit()) => {
                normalized.push_str(&rest[..open]);
                normalized.push('.');
                normalized.push_str(&after[..close]);
                rest = &after[close + 1..];
            }
            _ => {
                normalized.push_str(&rest[..=open]);
                rest = after;
            }
        }
    }

    normalized.push_str(rest);
    normalized
}

/// Read the value at `path`
///
/// An empty path or a `null` root yields the root itself. Walking stops with
/// `None` as soon as a segment is missing or an intermediate is `null`.
pub fn get_by_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() || root.is_null() {
        return Some(root);
    }

    let normalized = normalize_path(path);
    let mut current = root;

    for segment in normalized.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    Some(current)
}

/// Write `value` at `path`, creating intermediate objects as needed
///
/// A no-op when the path is empty or the root is not a container. Absent,
/// `null` or scalar intermediates are replaced by empty objects.
pub fn set_by_path(root: &mut Value, path: &str, value: Value) {
    if path.is_empty() || !(root.is_object() || root.is_array()) {
        return;
    }

    let normalized = normalize_path(path);
    let segments: Vec<&str> = normalized.split('.').collect();
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    let mut current = root;
    for segment in parents {
        current = slot(current, segment);
    }
    *slot(current, last) = value;
}

/// Mutable reference to the child `segment` of `container`, created as
/// `null` if absent
fn slot<'a>(container: &'a mut Value, segment: &str) -> &'a mut Value {
    let index = segment.parse::<usize>().ok();

    if container.is_array() && index.is_none() {
        // Named key on an array: keep the elements under their index keys
        let entries = match std::mem::take(container) {
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| (i.to_string(), item))
                .collect(),
            _ => Map::new(),
        };
        *container = Value::Object(entries);
    } else if !container.is_object() && !container.is_array() {
        *container = Value::Object(Map::new());
    }

    match (container, index) {
        (Value::Array(items), Some(index)) => {
            if items.len() <= index {
                items.resize(index + 1, Value::Null);
            }
            &mut items[index]
        }
        (Value::Object(map), _) => map.entry(segment.to_string()).or_insert(Value::Null),
        (other, _) => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("data.items[0].name"), "data.items.0.name");
        assert_eq!(normalize_path("matrix[1][2]"), "matrix.1.2");
        assert_eq!(normalize_path("plain.path"), "plain.path");
        assert_eq!(normalize_path("odd[key]"), "odd[key]");
    }

    #[test]
    fn test_get_nested() {
        assert_eq!(get_by_path(&json!({"a": {"b": 5}}), "a.b"), Some(&json!(5)));
        assert_eq!(get_by_path(&json!({"a": null}), "a.b"), None);
        assert_eq!(get_by_path(&json!({}), "a.b"), None);
        assert_eq!(get_by_path(&json!({"a": null}), "a"), Some(&Value::Null));
    }

    #[test]
    fn test_get_bracket_index() {
        let data = json!({"data": {"items": [{"name": "first"}, {"name": "second"}]}});
        assert_eq!(get_by_path(&data, "data.items[1].name"), Some(&json!("second")));
        assert_eq!(get_by_path(&data, "data.items.0.name"), Some(&json!("first")));
        assert_eq!(get_by_path(&data, "data.items[5].name"), None);
    }

    #[test]
    fn test_get_empty_path_or_null_root() {
        let data = json!({"x": 1});
        assert_eq!(get_by_path(&data, ""), Some(&data));
        assert_eq!(get_by_path(&Value::Null, "x.y"), Some(&Value::Null));
        assert_eq!(get_by_path(&json!(3), "x"), None);
    }

    #[test]
    fn test_set_creates_intermediates() {
        let mut props = json!({"title": "t"});
        set_by_path(&mut props, "chart.axis.label", json!("Revenue"));
        assert_eq!(
            props,
            json!({"title": "t", "chart": {"axis": {"label": "Revenue"}}})
        );
    }

    #[test]
    fn test_set_replaces_scalar_intermediate() {
        let mut props = json!({"legend": false});
        set_by_path(&mut props, "legend.position", json!("top"));
        assert_eq!(props, json!({"legend": {"position": "top"}}));
    }

    #[test]
    fn test_set_array_index() {
        let mut props = json!({"series": [{"name": "a"}]});
        set_by_path(&mut props, "series[0].name", json!("b"));
        set_by_path(&mut props, "series[2].name", json!("c"));
        assert_eq!(
            props,
            json!({"series": [{"name": "b"}, null, {"name": "c"}]})
        );
    }

    #[test]
    fn test_set_noop_cases() {
        let mut props = json!({"a": 1});
        set_by_path(&mut props, "", json!(2));
        assert_eq!(props, json!({"a": 1}));

        let mut scalar = json!(7);
        set_by_path(&mut scalar, "a", json!(2));
        assert_eq!(scalar, json!(7));
    }

    #[test]
    fn test_set_then_get_round_trip() {
        let paths = ["a", "a.b", "a.b.c", "list[0]", "deep.list[3].x", "x.0.y"];
        for path in paths {
            let mut root = json!({"a": {"z": true}, "list": [1]});
            set_by_path(&mut root, path, json!({"marker": path}));
            assert_eq!(
                get_by_path(&root, path),
                Some(&json!({"marker": path})),
                "path {path}"
            );
        }
    }
}
