use anyhow::{Context, Result, bail};
use percent_encoding::percent_decode_str;
use schemars::schema::{RootSchema, Schema, SchemaObject};
use serde_json::Value;

const MAX_REF_DEPTH: usize = 32;

#[derive(Debug)]
pub struct SchemaResolver<'a> {
    raw: &'a Value,
    root: &'a RootSchema,
}

impl<'a> SchemaResolver<'a> {
    pub fn new(raw: &'a Value, root: &'a RootSchema) -> Self {
        Self { raw, root }
    }

    pub fn root_object(&self) -> &SchemaObject {
        &self.root.schema
    }

    pub fn resolve_schema(&self, schema: &Schema) -> Result<SchemaObject> {
        self.resolve_with_depth(schema, 0)
    }

    /// Replaces every `$ref` inside `value` with its target so the result
    /// validates without the rest of the document. Keywords next to a `$ref`
    /// win over the target's.
    pub fn inline_refs(&self, value: &Value) -> Result<Value> {
        self.inline_with_depth(value, 0)
    }

    fn inline_with_depth(&self, value: &Value, depth: usize) -> Result<Value> {
        if depth > MAX_REF_DEPTH {
            bail!("$ref chain is deeper than {MAX_REF_DEPTH} levels");
        }
        match value {
            Value::Object(map) => {
                if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
                    let pointer = fragment_pointer(reference)?;
                    let target = self
                        .raw
                        .pointer(&pointer)
                        .with_context(|| format!("reference '{reference}' not found"))?;
                    let mut inlined = self.inline_with_depth(target, depth + 1)?;
                    if let Value::Object(resolved) = &mut inlined {
                        for (key, sibling) in map.iter().filter(|(key, _)| *key != "$ref") {
                            resolved.insert(key.clone(), self.inline_with_depth(sibling, depth)?);
                        }
                    }
                    return Ok(inlined);
                }
                let mut out = serde_json::Map::with_capacity(map.len());
                for (key, child) in map {
                    out.insert(key.clone(), self.inline_with_depth(child, depth)?);
                }
                Ok(Value::Object(out))
            }
            Value::Array(items) => items
                .iter()
                .map(|item| self.inline_with_depth(item, depth))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            other => Ok(other.clone()),
        }
    }

    fn resolve_with_depth(&self, schema: &Schema, depth: usize) -> Result<SchemaObject> {
        if depth > MAX_REF_DEPTH {
            bail!("$ref chain is deeper than {MAX_REF_DEPTH} levels");
        }
        match schema {
            Schema::Bool(value) => Ok(Schema::Bool(*value).into_object()),
            Schema::Object(object) => {
                if let Some(reference) = &object.reference {
                    let target = self.follow_reference(reference)?;
                    let mut resolved = self.resolve_with_depth(&target, depth + 1)?;
                    overlay_siblings(object, &mut resolved);
                    Ok(resolved)
                } else {
                    Ok(object.clone())
                }
            }
        }
    }

    fn follow_reference(&self, reference: &str) -> Result<Schema> {
        if let Some(key) = reference.strip_prefix("#/definitions/") {
            let target = self
                .root
                .definitions
                .get(key)
                .with_context(|| format!("definition '{key}' not found"))?;
            return Ok(target.clone());
        }

        if reference.starts_with('#') {
            let pointer = fragment_pointer(reference)?;
            let target = self
                .raw
                .pointer(&pointer)
                .with_context(|| format!("reference '{reference}' not found"))?;
            return serde_json::from_value(target.clone())
                .with_context(|| format!("reference '{reference}' is not a valid schema"));
        }

        bail!("unsupported reference {reference}")
    }
}

/// `#/a/b`, `#a/b` and percent-encoded fragments become JSON pointers.
fn fragment_pointer(reference: &str) -> Result<String> {
    let Some(fragment) = reference.strip_prefix('#') else {
        bail!("unsupported reference {reference}");
    };
    let decoded = percent_decode_str(fragment)
        .decode_utf8()
        .context("invalid percent-encoding in $ref")?;
    Ok(if decoded.is_empty() || decoded.starts_with('/') {
        decoded.into_owned()
    } else {
        format!("/{decoded}")
    })
}

/// Keywords written next to a `$ref` (titles, defaults, `x-` extensions)
/// win over the referenced schema's own.
fn overlay_siblings(reference: &SchemaObject, resolved: &mut SchemaObject) {
    if let Some(meta) = reference.metadata.as_deref() {
        let target = resolved.metadata();
        if meta.title.is_some() {
            target.title = meta.title.clone();
        }
        if meta.description.is_some() {
            target.description = meta.description.clone();
        }
        if meta.default.is_some() {
            target.default = meta.default.clone();
        }
    }
    for (key, value) in &reference.extensions {
        resolved.extensions.insert(key.clone(), value.clone());
    }
}
