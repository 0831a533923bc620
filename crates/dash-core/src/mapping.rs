//! Field mapping: reshaping fetched data into widget props

use serde_json::Value;
use tracing::debug;

use crate::document::{FieldMapping, Props};
use crate::path::{get_by_path, set_by_path};

/// Merge `data` onto `target_props` according to `mappings`
///
/// Without mappings the payload is assumed to already be shaped like the
/// widget's props and its top-level keys are merged over `target_props`.
/// Only object payloads are merged: array and scalar payloads leave the props
/// unchanged and reach renderers only through the fetcher's `raw_data`.
/// With mappings, each `source` path is read from `data` and written to its
/// `target` path in order; sources that do not resolve leave the target
/// untouched.
pub fn apply_field_mappings(data: &Value, mappings: &[FieldMapping], target_props: &Props) -> Props {
    if mappings.is_empty() {
        let mut merged = target_props.clone();
        match data {
            Value::Object(fields) => {
                for (key, value) in fields {
                    merged.insert(key.clone(), value.clone());
                }
            }
            other => {
                debug!(kind = json_kind(other), "passthrough payload is not an object, props unchanged");
            }
        }
        return merged;
    }

    let mut result = Value::Object(target_props.clone());
    for mapping in mappings {
        if let Some(value) = get_by_path(data, &mapping.source) {
            set_by_path(&mut result, &mapping.target, value.clone());
        }
    }

    match result {
        Value::Object(props) => props,
        _ => target_props.clone(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
