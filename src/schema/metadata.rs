use std::collections::HashMap;

use schemars::schema::SchemaObject;
use serde_json::Value;

pub fn metadata_map(schema: &SchemaObject) -> HashMap<String, Value> {
    schema
        .extensions
        .iter()
        .filter(|(key, _)| key.starts_with("x-"))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

pub fn extension_string(schema: &SchemaObject, key: &str) -> Option<String> {
    schema
        .extensions
        .get(key)
        .and_then(|value| value.as_str().map(str::to_string))
}

pub fn extension_bool(schema: &SchemaObject, key: &str) -> bool {
    schema
        .extensions
        .get(key)
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

pub fn title_of(schema: &SchemaObject) -> Option<String> {
    schema.metadata.as_ref().and_then(|m| m.title.clone())
}

pub fn description_of(schema: &SchemaObject) -> Option<String> {
    schema.metadata.as_ref().and_then(|m| m.description.clone())
}

/// Turns `basicInformation` or `avg_price-min` into `Basic Information` /
/// `Avg Price Min`.
pub fn prettify_label(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let mut result = String::with_capacity(raw.len() + 4);
    let mut capitalize = true;
    let mut previous_lower = false;
    for ch in raw.chars() {
        if ch == '_' || ch == '-' {
            result.push(' ');
            capitalize = true;
            previous_lower = false;
            continue;
        }
        if ch.is_ascii_uppercase() && previous_lower {
            result.push(' ');
        }

        if capitalize {
            result.push(ch.to_ascii_uppercase());
            capitalize = false;
        } else {
            result.push(ch);
        }
        previous_lower = ch.is_ascii_lowercase() || ch.is_ascii_digit();
    }

    result.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn slugify(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len());
    for ch in raw.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}
