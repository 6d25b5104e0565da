use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde_json::{Map, Value};

use crate::domain::{FieldKind, FieldSchema, SectionSchema};

use super::{
    convert::{coerce_input, value_to_string},
    error::FieldCoercionError,
};

/// One editable row of the terminal wizard: a leaf field plus the text the
/// user is typing into it. Nested-object fields are expanded into one row
/// per subfield.
#[derive(Debug, Clone)]
pub struct FieldRow {
    pub schema: FieldSchema,
    /// Titles from the section root, joined with " / ".
    pub label: String,
    pub buffer: String,
    pub dirty: bool,
    pub error: Option<String>,
}

impl FieldRow {
    pub fn from_schema(schema: FieldSchema, label: String, value: Option<&Value>) -> Self {
        let buffer = value.map(value_to_string).unwrap_or_default();
        Self {
            schema,
            label,
            buffer,
            dirty: false,
            error: None,
        }
    }

    pub fn path(&self) -> Vec<&str> {
        self.schema.path.iter().map(String::as_str).collect()
    }

    /// `address.city` for nested rows, the plain name otherwise.
    pub fn dotted_path(&self) -> String {
        self.schema.path.join(".")
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        let changed = match &self.schema.kind {
            FieldKind::Boolean => match key.code {
                KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right => {
                    self.toggle();
                    true
                }
                KeyCode::Backspace | KeyCode::Delete => self.clear(),
                _ => false,
            },
            FieldKind::Enum(_) => match key.code {
                KeyCode::Left => self.cycle(-1),
                KeyCode::Right | KeyCode::Char(' ') => self.cycle(1),
                KeyCode::Backspace | KeyCode::Delete => self.clear(),
                _ => false,
            },
            _ => match key.code {
                KeyCode::Char(ch)
                    if !key
                        .modifiers
                        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
                {
                    self.buffer.push(ch);
                    true
                }
                KeyCode::Backspace => self.buffer.pop().is_some(),
                KeyCode::Delete => self.clear(),
                _ => false,
            },
        };
        if changed {
            self.dirty = true;
        }
        changed
    }

    pub fn toggle(&mut self) {
        let next = !matches!(self.buffer.as_str(), "true");
        self.buffer = next.to_string();
    }

    /// Steps through enum options; an unset enum starts at either end.
    pub fn cycle(&mut self, delta: i64) -> bool {
        let FieldKind::Enum(options) = &self.schema.kind else {
            return false;
        };
        if options.is_empty() {
            return false;
        }
        let len = options.len() as i64;
        let next = match options.iter().position(|option| *option == self.buffer) {
            Some(current) => (current as i64 + delta).rem_euclid(len),
            None if delta < 0 => len - 1,
            None => 0,
        };
        self.buffer = options[next as usize].clone();
        true
    }

    fn clear(&mut self) -> bool {
        let had_value = !self.buffer.is_empty();
        self.buffer.clear();
        had_value
    }

    /// The value to store, or `None` when the row is blank.
    pub fn value(&self) -> Result<Option<Value>, FieldCoercionError> {
        coerce_input(&self.buffer, &self.schema)
    }

    pub fn display_value(&self) -> String {
        match &self.schema.kind {
            FieldKind::Boolean => match self.buffer.as_str() {
                "true" => "[x] yes".to_string(),
                "false" => "[ ] no".to_string(),
                _ => "[ ] (not set)".to_string(),
            },
            FieldKind::Enum(_) if self.buffer.is_empty() => "‹ choose ›".to_string(),
            FieldKind::Enum(_) => format!("‹ {} ›", self.buffer),
            _ => self.buffer.clone(),
        }
    }

    /// Short typing hint shown under the value.
    pub fn input_hint(&self) -> Option<String> {
        match &self.schema.kind {
            FieldKind::Boolean => Some("Space toggles".to_string()),
            FieldKind::Enum(options) => Some(format!("←/→ {}", options.join(" | "))),
            FieldKind::Array(inner) => match inner.as_ref() {
                FieldKind::Enum(options) => {
                    Some(format!("comma-separated: {}", options.join(", ")))
                }
                _ => Some("comma-separated".to_string()),
            },
            _ => None,
        }
    }
}

/// Expands a section into rows, descending into nested-object fields.
pub fn section_rows(section: &SectionSchema, data: Option<&Map<String, Value>>) -> Vec<FieldRow> {
    let mut rows = Vec::new();
    push_rows(&section.fields, data, None, &mut rows);
    rows
}

fn push_rows(
    fields: &[FieldSchema],
    data: Option<&Map<String, Value>>,
    prefix: Option<&str>,
    rows: &mut Vec<FieldRow>,
) {
    for field in fields {
        let label = match prefix {
            Some(parent) => format!("{parent} / {}", field.title),
            None => field.title.clone(),
        };
        let value = data.and_then(|map| map.get(&field.name));
        match &field.kind {
            FieldKind::Object(children) => {
                push_rows(children, value.and_then(Value::as_object), Some(&label), rows);
            }
            _ => rows.push(FieldRow::from_schema(field.clone(), label, value)),
        }
    }
}
