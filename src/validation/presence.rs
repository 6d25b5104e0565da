use serde_json::{Map, Value};

use crate::domain::{FieldKind, FieldSchema};

/// `null`, blank strings, empty arrays and objects without any set member
/// count as unset. Numbers (including zero) and booleans are set.
pub fn value_is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(text) => !text.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => map.values().any(value_is_set),
        Value::Bool(_) | Value::Number(_) => true,
    }
}

pub fn field_is_present(field: &FieldSchema, value: Option<&Value>) -> bool {
    let Some(value) = value else {
        return false;
    };
    if field.zero_is_missing && value.as_f64() == Some(0.0) {
        return false;
    }
    value_is_set(value)
}

/// Collects titles of unset mandatory fields. Subfields of a nested object
/// are checked when the object is mandatory or partly filled in.
pub fn collect_missing(fields: &[FieldSchema], data: &Map<String, Value>, out: &mut Vec<String>) {
    collect_missing_with_prefix(fields, data, None, out);
}

fn collect_missing_with_prefix(
    fields: &[FieldSchema],
    data: &Map<String, Value>,
    prefix: Option<&str>,
    out: &mut Vec<String>,
) {
    for field in fields {
        let value = data.get(&field.name);
        let label = match prefix {
            Some(parent) => format!("{parent} / {}", field.title),
            None => field.title.clone(),
        };
        if let FieldKind::Object(children) = &field.kind {
            let nested = value.and_then(Value::as_object);
            let partly_filled = nested.is_some_and(|map| map.values().any(value_is_set));
            if field.required || partly_filled {
                let empty = Map::new();
                let before = out.len();
                collect_missing_with_prefix(children, nested.unwrap_or(&empty), Some(&label), out);
                if field.required && out.len() == before && !partly_filled {
                    out.push(label);
                }
            }
            continue;
        }
        if field.required && !field_is_present(field, value) {
            out.push(label);
        }
    }
}

/// Drops unset values so optional, untouched fields are not type-checked.
pub fn prune_unset(data: &Map<String, Value>) -> Map<String, Value> {
    data.iter()
        .filter_map(|(key, value)| {
            let pruned = match value {
                Value::Object(map) => Value::Object(prune_unset(map)),
                other => other.clone(),
            };
            value_is_set(&pruned).then(|| (key.clone(), pruned))
        })
        .collect()
}
