use std::collections::HashMap;

use serde_json::{Map, Value};

#[derive(Debug, Clone)]
pub struct FlowSchema {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    /// Path appended to the API base URL on submission.
    pub endpoint: Option<String>,
    pub payload: PayloadShape,
    pub payload_constants: Map<String, Value>,
    pub sections: Vec<SectionSchema>,
}

impl FlowSchema {
    pub fn section(&self, id: &str) -> Option<&SectionSchema> {
        self.sections.iter().find(|section| section.id == id)
    }

    pub fn section_index(&self, id: &str) -> Option<usize> {
        self.sections.iter().position(|section| section.id == id)
    }

    pub fn section_ids(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|section| section.id.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayloadShape {
    /// Every section's fields merged into one object.
    #[default]
    Flat,
    /// One object per section, keyed by the section's API name.
    Nested,
}

#[derive(Debug, Clone)]
pub struct SectionSchema {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub api_name: Option<String>,
    pub fields: Vec<FieldSchema>,
    pub rules: Vec<CrossFieldRule>,
    /// Section subschema with `$ref`s inlined, fed to the JSON Schema validator.
    pub schema: Value,
}

impl SectionSchema {
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Looks up a field by its path relative to the section, descending into
    /// nested-object fields.
    pub fn field_at(&self, path: &[&str]) -> Option<&FieldSchema> {
        let (first, rest) = path.split_first()?;
        let mut current = self.field(first)?;
        for segment in rest {
            let FieldKind::Object(children) = &current.kind else {
                return None;
            };
            current = children.iter().find(|child| child.name == *segment)?;
        }
        Some(current)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldSchema> {
        self.fields.iter().filter(|field| field.required)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    String,
    Integer,
    Number,
    Boolean,
    Enum(Vec<String>),
    Array(Box<FieldKind>),
    Object(Vec<FieldSchema>),
}

impl FieldKind {
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldKind::Integer | FieldKind::Number)
    }

    pub fn type_label(&self) -> String {
        match self {
            FieldKind::String => "string".to_string(),
            FieldKind::Integer => "integer".to_string(),
            FieldKind::Number => "number".to_string(),
            FieldKind::Boolean => "boolean".to_string(),
            FieldKind::Enum(_) => "enum".to_string(),
            FieldKind::Array(inner) => format!("{}[]", inner.type_label()),
            FieldKind::Object(_) => "object".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSchema {
    pub name: String,
    /// Path from the section root, e.g. `["address", "city"]`.
    pub path: Vec<String>,
    pub pointer: String,
    pub title: String,
    pub description: Option<String>,
    pub section_id: String,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<Value>,
    pub api_name: Option<String>,
    pub flatten: bool,
    pub zero_is_missing: bool,
    pub metadata: HashMap<String, Value>,
}

impl FieldSchema {
    pub fn display_label(&self) -> String {
        if self.title.eq_ignore_ascii_case(&self.name) {
            self.title.clone()
        } else {
            format!("{} ({})", self.title, self.name)
        }
    }

    pub fn children(&self) -> &[FieldSchema] {
        match &self.kind {
            FieldKind::Object(children) => children,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CrossFieldRule {
    /// `lower` must not exceed `upper` when both hold numbers.
    Ordered {
        lower: String,
        upper: String,
        message: Option<String>,
    },
    /// At least one of `fields` must be present.
    AnyOf {
        fields: Vec<String>,
        message: Option<String>,
    },
    /// When `when` equals `equals`, every field in `then` becomes mandatory.
    Requires {
        when: String,
        equals: Value,
        then: Vec<String>,
        message: Option<String>,
    },
}

impl CrossFieldRule {
    pub fn referenced_fields(&self) -> Vec<&str> {
        match self {
            CrossFieldRule::Ordered { lower, upper, .. } => vec![lower, upper],
            CrossFieldRule::AnyOf { fields, .. } => fields.iter().map(String::as_str).collect(),
            CrossFieldRule::Requires { when, then, .. } => std::iter::once(when.as_str())
                .chain(then.iter().map(String::as_str))
                .collect(),
        }
    }
}
