use std::fmt;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use jsonschema::{Draft, Validator};
use serde_json::{Map, Value};

use crate::domain::{FlowSchema, SectionSchema};

use super::{
    error::{ValidationError, ValidationIssue},
    presence::{collect_missing, prune_unset},
    rules::evaluate_rule,
};

/// Decides whether one section's data lets the wizard move forward.
///
/// Implementations must be pure: the same snapshot always yields the same
/// result.
pub trait SectionValidator {
    fn validate(&self, data: &Map<String, Value>) -> Result<(), ValidationError>;
}

impl<F> SectionValidator for F
where
    F: Fn(&Map<String, Value>) -> Result<(), ValidationError>,
{
    fn validate(&self, data: &Map<String, Value>) -> Result<(), ValidationError> {
        self(data)
    }
}

/// Validator derived from a section of a flow document: mandatory fields,
/// then JSON Schema constraints on the filled-in values, then cross-field
/// rules. All issues found are reported together.
pub struct SchemaSectionValidator {
    section: SectionSchema,
    validator: Validator,
}

impl fmt::Debug for SchemaSectionValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaSectionValidator")
            .field("section", &self.section.id)
            .field("rules", &self.section.rules.len())
            .finish()
    }
}

impl SchemaSectionValidator {
    pub fn new(section: &SectionSchema) -> Result<Self> {
        let mut schema = section.schema.clone();
        strip_required(&mut schema);
        let validator = jsonschema::options()
            .with_draft(Draft::Draft7)
            .should_validate_formats(true)
            .build(&schema)
            .with_context(|| format!("failed to compile schema for section '{}'", section.id))?;
        Ok(Self {
            section: section.clone(),
            validator,
        })
    }

    fn schema_issues(&self, data: &Map<String, Value>) -> Vec<ValidationIssue> {
        let instance = Value::Object(prune_unset(data));
        self.validator
            .iter_errors(&instance)
            .map(|error| {
                let relative = error.instance_path.to_string();
                let message = match self.field_title(&relative) {
                    Some(title) => format!("{title}: {error}"),
                    None => error.to_string(),
                };
                ValidationIssue::InvalidValue {
                    pointer: format!("/{}{relative}", self.section.id),
                    message,
                }
            })
            .collect()
    }

    fn field_title(&self, relative_pointer: &str) -> Option<String> {
        let path: Vec<&str> = relative_pointer
            .trim_start_matches('/')
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();
        // Array items report their index as the last segment.
        let mut candidate = path.as_slice();
        while !candidate.is_empty() {
            if let Some(field) = self.section.field_at(candidate) {
                return Some(field.title.clone());
            }
            candidate = &candidate[..candidate.len() - 1];
        }
        None
    }
}

impl SectionValidator for SchemaSectionValidator {
    fn validate(&self, data: &Map<String, Value>) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        let mut missing = Vec::new();
        collect_missing(&self.section.fields, data, &mut missing);
        if !missing.is_empty() {
            issues.push(ValidationIssue::MissingFields(missing));
        }

        issues.extend(self.schema_issues(data));

        issues.extend(
            self.section
                .rules
                .iter()
                .filter_map(|rule| evaluate_rule(rule, &self.section, data))
                .map(|message| ValidationIssue::Rule { message }),
        );

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(self.section.id.clone(), issues))
        }
    }
}

/// Per-flow map of section id to validator. Sections without an entry
/// always pass.
#[derive(Default)]
pub struct ValidatorSet {
    validators: IndexMap<String, Box<dyn SectionValidator>>,
}

impl fmt::Debug for ValidatorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorSet")
            .field("sections", &self.validators.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ValidatorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_flow(flow: &FlowSchema) -> Result<Self> {
        let mut set = Self::new();
        for section in &flow.sections {
            set.insert(section.id.clone(), SchemaSectionValidator::new(section)?);
        }
        Ok(set)
    }

    /// Registers or replaces the validator for `section`.
    pub fn insert(&mut self, section: impl Into<String>, validator: impl SectionValidator + 'static) {
        self.validators.insert(section.into(), Box::new(validator));
    }

    pub fn contains(&self, section: &str) -> bool {
        self.validators.contains_key(section)
    }

    pub fn validate(
        &self,
        section: &str,
        data: Option<&Map<String, Value>>,
    ) -> Result<(), ValidationError> {
        let Some(validator) = self.validators.get(section) else {
            return Ok(());
        };
        let empty = Map::new();
        validator.validate(data.unwrap_or(&empty)).map_err(|mut err| {
            if err.section.is_empty() {
                err.section = section.to_string();
            }
            err
        })
    }
}

/// Presence is checked by `collect_missing`, which understands blank
/// strings and the zero policy; keeping `required` would double-report.
fn strip_required(schema: &mut Value) {
    match schema {
        Value::Object(map) => {
            if matches!(map.get("required"), Some(Value::Array(_))) {
                map.shift_remove("required");
            }
            for value in map.values_mut() {
                strip_required(value);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(strip_required),
        _ => {}
    }
}
