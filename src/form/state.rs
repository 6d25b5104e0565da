use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::domain::{FieldKind, FieldSchema, FlowSchema};

/// Field values for every section, keyed by section id in wizard order.
pub type SectionValues = IndexMap<String, Map<String, Value>>;

/// The section store for one flow: every section's field values plus the
/// navigation cursor.
#[derive(Debug, Clone)]
pub struct FormState {
    order: Vec<String>,
    values: SectionValues,
    initial: SectionValues,
    active_index: usize,
    furthest_step: usize,
    dirty: bool,
    submitted: bool,
}

impl FormState {
    pub fn from_flow(flow: &FlowSchema) -> Self {
        let initial: SectionValues = flow
            .sections
            .iter()
            .map(|section| (section.id.clone(), seed_defaults(&section.fields)))
            .collect();
        Self::with_initial(flow.section_ids().map(str::to_string).collect(), initial)
    }

    pub fn from_sections<I, S>(sections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let order: Vec<String> = sections.into_iter().map(Into::into).collect();
        let initial: SectionValues = order
            .iter()
            .map(|id| (id.clone(), Map::new()))
            .collect();
        Self::with_initial(order, initial)
    }

    fn with_initial(order: Vec<String>, initial: SectionValues) -> Self {
        Self {
            order,
            values: initial.clone(),
            initial,
            active_index: 0,
            furthest_step: 0,
            dirty: false,
            submitted: false,
        }
    }

    pub fn set_field(&mut self, section: &str, field: &str, value: Value) {
        self.values
            .entry(section.to_string())
            .or_default()
            .insert(field.to_string(), value);
        self.dirty = true;
    }

    /// Sets a value below a nested-object field, creating intermediate
    /// objects (and replacing non-object values) along the way.
    pub fn set_field_at(&mut self, section: &str, path: &[&str], value: Value) {
        let Some((last, parents)) = path.split_last() else {
            return;
        };
        let mut current = self.values.entry(section.to_string()).or_default();
        for segment in parents {
            let slot = current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            let Value::Object(next) = slot else {
                return;
            };
            current = next;
        }
        current.insert(last.to_string(), value);
        self.dirty = true;
    }

    pub fn clear_field(&mut self, section: &str, path: &[&str]) -> Option<Value> {
        let (last, parents) = path.split_last()?;
        let mut current = self.values.get_mut(section)?;
        for segment in parents {
            current = current.get_mut(*segment)?.as_object_mut()?;
        }
        let removed = current.shift_remove(*last);
        if removed.is_some() {
            self.dirty = true;
        }
        removed
    }

    pub fn section_data(&self, section: &str) -> Option<&Map<String, Value>> {
        self.values.get(section)
    }

    pub fn field_value(&self, section: &str, path: &[&str]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        let mut current = self.values.get(section)?.get(*first)?;
        for segment in rest {
            current = current.as_object()?.get(*segment)?;
        }
        Some(current)
    }

    pub fn values(&self) -> &SectionValues {
        &self.values
    }

    /// Swaps in a full mapping, e.g. from a draft. Sections unknown to the
    /// flow are kept so nothing the user typed is lost.
    pub fn replace_values(&mut self, values: SectionValues) {
        let mut merged: SectionValues = self
            .order
            .iter()
            .map(|id| (id.clone(), Map::new()))
            .collect();
        for (section, data) in values {
            merged.insert(section, data);
        }
        self.values = merged;
        self.dirty = false;
    }

    pub fn reset(&mut self) {
        self.values = self.initial.clone();
        self.active_index = 0;
        self.furthest_step = 0;
        self.dirty = false;
        self.submitted = false;
    }

    pub fn section_ids(&self) -> &[String] {
        &self.order
    }

    pub fn section_count(&self) -> usize {
        self.order.len()
    }

    pub fn index_of(&self, section: &str) -> Option<usize> {
        self.order.iter().position(|id| id == section)
    }

    pub fn active_section(&self) -> &str {
        self.order
            .get(self.active_index)
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn furthest_step(&self) -> usize {
        self.furthest_step
    }

    /// Moves the cursor without any validation. Returns `false` for an
    /// unknown section.
    pub fn set_active_section(&mut self, section: &str) -> bool {
        match self.index_of(section) {
            Some(index) => {
                self.active_index = index;
                true
            }
            None => false,
        }
    }

    pub fn set_furthest_step(&mut self, index: usize) {
        self.furthest_step = index.min(self.order.len().saturating_sub(1));
    }

    pub fn is_reachable(&self, index: usize) -> bool {
        index < self.order.len() && index <= self.furthest_step
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn mark_submitted(&mut self) {
        self.submitted = true;
    }
}

fn seed_defaults(fields: &[FieldSchema]) -> Map<String, Value> {
    let mut data = Map::new();
    for field in fields {
        if let Some(default) = &field.default {
            data.insert(field.name.clone(), default.clone());
        } else if let FieldKind::Object(children) = &field.kind {
            let nested = seed_defaults(children);
            if !nested.is_empty() {
                data.insert(field.name.clone(), Value::Object(nested));
            }
        }
    }
    data
}
