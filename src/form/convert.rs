use serde_json::Value;

use crate::domain::{FieldKind, FieldSchema};

use super::error::FieldCoercionError;

/// Converts raw text typed by the user into the JSON value for `schema`.
/// Blank input yields `Ok(None)`, meaning "unset".
pub fn coerce_input(
    contents: &str,
    schema: &FieldSchema,
) -> Result<Option<Value>, FieldCoercionError> {
    let trimmed = contents.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match &schema.kind {
        FieldKind::String => Ok(Some(Value::String(contents.to_string()))),
        FieldKind::Array(inner) => array_value(trimmed, inner, schema),
        FieldKind::Object(_) => serde_json::from_str::<Value>(trimmed)
            .ok()
            .filter(Value::is_object)
            .map(Some)
            .ok_or_else(|| FieldCoercionError::new(&schema.pointer, "expected a JSON object")),
        scalar => scalar_value(trimmed, scalar, schema).map(Some),
    }
}

/// Renders a stored value back into the text form `coerce_input` accepts.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Number(num) => num.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Array(items) => items
            .iter()
            .map(value_to_string)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

fn array_value(
    contents: &str,
    inner: &FieldKind,
    schema: &FieldSchema,
) -> Result<Option<Value>, FieldCoercionError> {
    let mut values = Vec::new();
    for raw in contents.split(',') {
        let item = raw.trim();
        if item.is_empty() {
            continue;
        }
        values.push(scalar_value(item, inner, schema)?);
    }
    Ok(Some(Value::Array(values)))
}

fn scalar_value(
    item: &str,
    kind: &FieldKind,
    schema: &FieldSchema,
) -> Result<Value, FieldCoercionError> {
    match kind {
        FieldKind::String => Ok(Value::String(item.to_string())),
        FieldKind::Integer => item.parse::<i64>().map(Value::from).map_err(|_| {
            FieldCoercionError::new(&schema.pointer, format!("'{item}' is not a valid integer"))
        }),
        FieldKind::Number => item
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| {
                FieldCoercionError::new(&schema.pointer, format!("'{item}' is not a valid number"))
            }),
        FieldKind::Boolean => match item.to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" | "1" => Ok(Value::Bool(true)),
            "false" | "no" | "n" | "0" => Ok(Value::Bool(false)),
            _ => Err(FieldCoercionError::new(
                &schema.pointer,
                format!("'{item}' is not a valid boolean"),
            )),
        },
        FieldKind::Enum(options) => options
            .iter()
            .find(|opt| opt.eq_ignore_ascii_case(item))
            .map(|opt| Value::String(opt.clone()))
            .ok_or_else(|| {
                FieldCoercionError::new(
                    &schema.pointer,
                    format!("value '{item}' is not one of: {}", options.join(", ")),
                )
            }),
        FieldKind::Array(_) => Err(FieldCoercionError::new(
            &schema.pointer,
            "nested arrays are not supported",
        )),
        FieldKind::Object(_) => Err(FieldCoercionError::new(
            &schema.pointer,
            "arrays of objects are not supported",
        )),
    }
}
