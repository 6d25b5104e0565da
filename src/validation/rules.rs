use serde_json::{Map, Value};

use crate::domain::{CrossFieldRule, FieldSchema, SectionSchema};
use crate::form::value_to_string;

use super::presence::field_is_present;

/// Evaluates one cross-field rule, returning the failure message if it does
/// not hold. Rules never fire on fields that are still unset; presence is
/// reported separately.
pub fn evaluate_rule(
    rule: &CrossFieldRule,
    section: &SectionSchema,
    data: &Map<String, Value>,
) -> Option<String> {
    match rule {
        CrossFieldRule::Ordered {
            lower,
            upper,
            message,
        } => {
            let low = lookup(data, lower).and_then(Value::as_f64)?;
            let high = lookup(data, upper).and_then(Value::as_f64)?;
            (low > high).then(|| {
                message.clone().unwrap_or_else(|| {
                    format!(
                        "{} cannot be greater than {}",
                        title(section, lower),
                        title(section, upper)
                    )
                })
            })
        }
        CrossFieldRule::AnyOf { fields, message } => {
            let any_present = fields.iter().any(|name| present(section, data, name));
            (!any_present).then(|| {
                message.clone().unwrap_or_else(|| {
                    let titles: Vec<String> =
                        fields.iter().map(|name| title(section, name)).collect();
                    format!("Provide at least one of: {}", titles.join(", "))
                })
            })
        }
        CrossFieldRule::Requires {
            when,
            equals,
            then,
            message,
        } => {
            if lookup(data, when) != Some(equals) {
                return None;
            }
            let missing: Vec<String> = then
                .iter()
                .filter(|name| !present(section, data, name))
                .map(|name| title(section, name))
                .collect();
            if missing.is_empty() {
                return None;
            }
            Some(message.clone().unwrap_or_else(|| {
                format!(
                    "{} required when {} is {}",
                    missing.join(", "),
                    title(section, when),
                    value_to_string(equals)
                )
            }))
        }
    }
}

fn lookup<'a>(data: &'a Map<String, Value>, dotted: &str) -> Option<&'a Value> {
    let mut segments = dotted.split('.');
    let mut current = data.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

fn field<'a>(section: &'a SectionSchema, dotted: &str) -> Option<&'a FieldSchema> {
    let path: Vec<&str> = dotted.split('.').collect();
    section.field_at(&path)
}

fn title(section: &SectionSchema, dotted: &str) -> String {
    field(section, dotted)
        .map(|field| field.title.clone())
        .unwrap_or_else(|| dotted.to_string())
}

fn present(section: &SectionSchema, data: &Map<String, Value>, dotted: &str) -> bool {
    let value = lookup(data, dotted);
    match field(section, dotted) {
        Some(field) => field_is_present(field, value),
        None => value.is_some_and(super::presence::value_is_set),
    }
}
