use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::domain::{FieldKind, FieldSchema, FlowSchema, PayloadShape, SectionSchema};
use crate::form::SectionValues;
use crate::validation::field_is_present;

/// Reshapes collected section values into the backend's payload contract.
///
/// Only fields declared by the flow are carried over. Each key becomes its
/// `x-api-name`, or else the snake_case form of the field name. Unset values
/// are dropped and flow constants are merged last.
pub fn build_payload(flow: &FlowSchema, values: &SectionValues) -> Value {
    let empty = Map::new();
    let mut payload = Map::new();
    for section in &flow.sections {
        let data = values.get(&section.id).unwrap_or(&empty);
        let mapped = map_fields(&section.fields, data);
        match flow.payload {
            PayloadShape::Flat => payload.extend(mapped),
            PayloadShape::Nested => {
                if !mapped.is_empty() {
                    payload.insert(section_key(section), Value::Object(mapped));
                }
            }
        }
    }
    for (key, value) in &flow.payload_constants {
        payload.insert(key.clone(), value.clone());
    }
    Value::Object(payload)
}

/// `fullName` → `full_name`, `GSTNumber` → `gst_number`, `price-range` →
/// `price_range`.
pub fn to_snake_case(raw: &str) -> String {
    static ACRONYM: OnceLock<Regex> = OnceLock::new();
    static BOUNDARY: OnceLock<Regex> = OnceLock::new();
    static SEPARATORS: OnceLock<Regex> = OnceLock::new();
    let acronym = ACRONYM.get_or_init(|| Regex::new(r"([A-Z]+)([A-Z][a-z])").expect("valid regex"));
    let boundary = BOUNDARY.get_or_init(|| Regex::new(r"([a-z0-9])([A-Z])").expect("valid regex"));
    let separators = SEPARATORS.get_or_init(|| Regex::new(r"[\s\-]+").expect("valid regex"));

    let split = acronym.replace_all(raw.trim(), "${1}_${2}");
    let split = boundary.replace_all(&split, "${1}_${2}");
    separators.replace_all(&split, "_").to_lowercase()
}

pub fn section_key(section: &SectionSchema) -> String {
    section
        .api_name
        .clone()
        .unwrap_or_else(|| to_snake_case(&section.id))
}

pub fn field_key(field: &FieldSchema) -> String {
    field
        .api_name
        .clone()
        .unwrap_or_else(|| to_snake_case(&field.name))
}

fn map_fields(fields: &[FieldSchema], data: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    for field in fields {
        let value = data.get(&field.name);
        match (&field.kind, value) {
            (FieldKind::Object(children), Some(Value::Object(nested))) => {
                let mapped = map_fields(children, nested);
                if mapped.is_empty() {
                    continue;
                }
                if field.flatten {
                    out.extend(mapped);
                } else {
                    out.insert(field_key(field), Value::Object(mapped));
                }
            }
            (FieldKind::Object(_), _) => {}
            (_, Some(value)) if field_is_present(field, Some(value)) => {
                out.insert(field_key(field), value.clone());
            }
            _ => {}
        }
    }
    out
}
