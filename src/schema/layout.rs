use std::collections::HashSet;

use anyhow::{Context, Result, anyhow, bail};
use schemars::schema::{
    ArrayValidation, InstanceType, ObjectValidation, Schema, SchemaObject, SingleOrVec,
};
use serde_json::{Map, Value};

use crate::domain::{
    CrossFieldRule, FieldKind, FieldSchema, FlowSchema, PayloadShape, SectionSchema,
};

use crate::submission::{field_key, section_key};

use super::{
    loader::load_root_schema,
    metadata::{
        description_of, extension_bool, extension_string, metadata_map, prettify_label, slugify,
        title_of,
    },
    resolver::SchemaResolver,
};

pub fn build_flow_schema(schema_value: &Value) -> Result<FlowSchema> {
    let root = load_root_schema(schema_value)?;
    let resolver = SchemaResolver::new(schema_value, &root);
    let root_object = resolver.root_object();
    ensure_object_schema(root_object).context("flow document root")?;

    let title = title_of(root_object).unwrap_or_else(|| "Onboarding".to_string());
    let id = extension_string(root_object, "x-flow").unwrap_or_else(|| slugify(&title));
    if id.is_empty() {
        bail!("flow document needs an `x-flow` id or a title");
    }

    let object = root_object
        .object
        .as_ref()
        .filter(|object| !object.properties.is_empty())
        .ok_or_else(|| anyhow!("flow '{id}' must declare at least one section"))?;

    let mut sections = Vec::with_capacity(object.properties.len());
    for (name, property_schema) in &object.properties {
        let resolved = resolver.resolve_schema(property_schema)?;
        let section = build_section(&resolver, &resolved, name)
            .with_context(|| format!("invalid section '{name}' in flow '{id}'"))?;
        sections.push(section);
    }

    let flow = FlowSchema {
        title,
        description: description_of(root_object),
        endpoint: extension_string(root_object, "x-endpoint"),
        payload: payload_shape(root_object)?,
        payload_constants: payload_constants(root_object)?,
        sections,
        id,
    };
    ensure_distinct_payload_keys(&flow)?;
    Ok(flow)
}

/// Two values landing on one payload key would silently overwrite each
/// other, so such documents are refused. Flow constants may override.
fn ensure_distinct_payload_keys(flow: &FlowSchema) -> Result<()> {
    let mut top = HashSet::new();
    for section in &flow.sections {
        let mut own = HashSet::new();
        let seen = match flow.payload {
            PayloadShape::Flat => &mut top,
            PayloadShape::Nested => {
                let key = section_key(section);
                if !top.insert(key.clone()) {
                    bail!("section '{}' reuses the payload key '{key}'", section.id);
                }
                &mut own
            }
        };
        claim_payload_keys(&section.fields, seen)
            .with_context(|| format!("invalid section '{}' in flow '{}'", section.id, flow.id))?;
    }
    Ok(())
}

fn claim_payload_keys(fields: &[FieldSchema], seen: &mut HashSet<String>) -> Result<()> {
    for field in fields {
        if let FieldKind::Object(children) = &field.kind {
            if field.flatten {
                claim_payload_keys(children, seen)?;
                continue;
            }
            claim_payload_keys(children, &mut HashSet::new())?;
        }
        let key = field_key(field);
        if !seen.insert(key.clone()) {
            bail!("field '{}' reuses the payload key '{key}'", field.pointer);
        }
    }
    Ok(())
}

fn build_section(
    resolver: &SchemaResolver<'_>,
    schema: &SchemaObject,
    name: &str,
) -> Result<SectionSchema> {
    if !is_object_schema(schema) {
        bail!("sections must be object schemas");
    }
    let fields = match schema.object.as_ref() {
        Some(object) => build_fields(resolver, object, name, &[])?,
        None => Vec::new(),
    };

    let mut section = SectionSchema {
        id: name.to_string(),
        title: title_of(schema).unwrap_or_else(|| prettify_label(name)),
        description: description_of(schema),
        api_name: extension_string(schema, "x-api-name"),
        fields,
        rules: Vec::new(),
        schema: section_schema_value(resolver, schema)?,
    };
    section.rules = parse_rules(schema, &section)?;
    Ok(section)
}

fn build_fields(
    resolver: &SchemaResolver<'_>,
    object: &ObjectValidation,
    section_id: &str,
    prefix: &[String],
) -> Result<Vec<FieldSchema>> {
    let required = required_set(object);
    let mut fields = Vec::with_capacity(object.properties.len());
    for (child_name, child_schema) in &object.properties {
        let mut path = prefix.to_vec();
        path.push(child_name.clone());
        let resolved = resolver.resolve_schema(child_schema)?;
        let field = build_field_schema(
            resolver,
            &resolved,
            child_name,
            path,
            section_id,
            required.contains(child_name),
        )?;
        fields.push(field);
    }
    Ok(fields)
}

fn build_field_schema(
    resolver: &SchemaResolver<'_>,
    schema: &SchemaObject,
    name: &str,
    path: Vec<String>,
    section_id: &str,
    required: bool,
) -> Result<FieldSchema> {
    let kind = detect_kind(resolver, schema, section_id, &path)
        .with_context(|| format!("unsupported schema for field '{name}'"))?;
    let flatten = extension_bool(schema, "x-flatten");
    if flatten && !matches!(kind, FieldKind::Object(_)) {
        bail!("field '{name}' sets x-flatten but is not an object");
    }
    let zero_is_missing = extension_bool(schema, "x-zero-is-missing");
    if zero_is_missing && !kind.is_numeric() {
        bail!("field '{name}' sets x-zero-is-missing but is not numeric");
    }

    Ok(FieldSchema {
        name: name.to_string(),
        pointer: to_pointer(section_id, &path),
        path,
        title: title_of(schema).unwrap_or_else(|| prettify_label(name)),
        description: description_of(schema),
        section_id: section_id.to_string(),
        kind,
        required,
        default: schema.metadata.as_ref().and_then(|m| m.default.clone()),
        api_name: extension_string(schema, "x-api-name"),
        flatten,
        zero_is_missing,
        metadata: metadata_map(schema),
    })
}

fn detect_kind(
    resolver: &SchemaResolver<'_>,
    schema: &SchemaObject,
    section_id: &str,
    path: &[String],
) -> Result<FieldKind> {
    if let Some(options) = &schema.enum_values {
        let enum_values = options
            .iter()
            .map(|value| match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect();
        return Ok(FieldKind::Enum(enum_values));
    }

    match instance_type(schema) {
        Some(InstanceType::String) => Ok(FieldKind::String),
        None if schema.object.is_none() => Ok(FieldKind::String),
        Some(InstanceType::Integer) => Ok(FieldKind::Integer),
        Some(InstanceType::Number) => Ok(FieldKind::Number),
        Some(InstanceType::Boolean) => Ok(FieldKind::Boolean),
        Some(InstanceType::Object) | None => {
            let object = schema
                .object
                .as_ref()
                .filter(|object| !object.properties.is_empty())
                .context("object fields must define properties")?;
            let children = build_fields(resolver, object, section_id, path)?;
            Ok(FieldKind::Object(children))
        }
        Some(InstanceType::Array) => {
            let array = schema
                .array
                .as_ref()
                .context("array schema must define items")?;
            let inner = resolve_array_items(resolver, array)?;
            let inner_kind = detect_kind(resolver, &inner, section_id, path)?;
            match inner_kind {
                FieldKind::String
                | FieldKind::Integer
                | FieldKind::Number
                | FieldKind::Boolean
                | FieldKind::Enum(_) => Ok(FieldKind::Array(Box::new(inner_kind))),
                FieldKind::Object(_) => bail!("arrays of objects are not supported"),
                FieldKind::Array(_) => bail!("nested arrays are not supported"),
            }
        }
        Some(other) => bail!("unsupported field type {other:?}"),
    }
}

fn parse_rules(schema: &SchemaObject, section: &SectionSchema) -> Result<Vec<CrossFieldRule>> {
    let Some(raw) = schema.extensions.get("x-rules") else {
        return Ok(Vec::new());
    };
    let entries = raw.as_array().context("x-rules must be an array")?;
    let mut rules = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let rule = parse_rule(entry).with_context(|| format!("x-rules[{index}]"))?;
        for field in rule.referenced_fields() {
            let path: Vec<&str> = field.split('.').collect();
            if section.field_at(&path).is_none() {
                bail!("x-rules[{index}] references unknown field '{field}'");
            }
        }
        rules.push(rule);
    }
    Ok(rules)
}

fn parse_rule(entry: &Value) -> Result<CrossFieldRule> {
    let obj = entry.as_object().context("rule must be an object")?;
    let kind = obj
        .get("rule")
        .and_then(Value::as_str)
        .context("rule is missing its `rule` kind")?;
    let message = obj.get("message").and_then(Value::as_str).map(str::to_string);
    let rule = match kind {
        "ordered" => CrossFieldRule::Ordered {
            lower: string_key(obj, "lower")?,
            upper: string_key(obj, "upper")?,
            message,
        },
        "any-of" => CrossFieldRule::AnyOf {
            fields: string_list(obj, "fields")?,
            message,
        },
        "requires" => CrossFieldRule::Requires {
            when: string_key(obj, "when")?,
            equals: obj.get("equals").cloned().unwrap_or(Value::Bool(true)),
            then: string_list(obj, "then")?,
            message,
        },
        other => bail!("unknown rule kind '{other}'"),
    };
    Ok(rule)
}

fn string_key(obj: &Map<String, Value>, key: &str) -> Result<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .with_context(|| format!("rule needs a string `{key}`"))
}

fn string_list(obj: &Map<String, Value>, key: &str) -> Result<Vec<String>> {
    let items = obj
        .get(key)
        .and_then(Value::as_array)
        .with_context(|| format!("rule needs an array `{key}`"))?;
    let list = items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .with_context(|| format!("`{key}` entries must be strings"))
        })
        .collect::<Result<Vec<_>>>()?;
    if list.is_empty() {
        bail!("`{key}` must not be empty");
    }
    Ok(list)
}

fn payload_shape(schema: &SchemaObject) -> Result<PayloadShape> {
    match extension_string(schema, "x-payload").as_deref() {
        None | Some("flat") => Ok(PayloadShape::Flat),
        Some("nested") => Ok(PayloadShape::Nested),
        Some(other) => bail!("unknown x-payload shape '{other}', expected flat or nested"),
    }
}

fn payload_constants(schema: &SchemaObject) -> Result<Map<String, Value>> {
    match schema.extensions.get("x-payload-constants") {
        None => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(_) => bail!("x-payload-constants must be an object"),
    }
}

fn section_schema_value(resolver: &SchemaResolver<'_>, schema: &SchemaObject) -> Result<Value> {
    let value = serde_json::to_value(Schema::Object(schema.clone()))
        .context("failed to serialize section schema")?;
    resolver.inline_refs(&value)
}

fn resolve_array_items(
    resolver: &SchemaResolver<'_>,
    array: &ArrayValidation,
) -> Result<SchemaObject> {
    let items = array
        .items
        .as_ref()
        .context("array schema must define items")?;
    match items {
        SingleOrVec::Single(schema) => resolver.resolve_schema(schema),
        SingleOrVec::Vec(list) => match list.first() {
            Some(first) => resolver.resolve_schema(first),
            None => bail!("tuple arrays without items are not supported"),
        },
    }
}

fn required_set(object: &ObjectValidation) -> HashSet<String> {
    object.required.iter().cloned().collect()
}

fn to_pointer(section_id: &str, path: &[String]) -> String {
    std::iter::once(section_id)
        .chain(path.iter().map(String::as_str))
        .map(|segment| segment.replace('~', "~0").replace('/', "~1"))
        .fold(String::new(), |mut acc, segment| {
            acc.push('/');
            acc.push_str(&segment);
            acc
        })
}

fn is_object_schema(schema: &SchemaObject) -> bool {
    match instance_type(schema) {
        Some(InstanceType::Object) => true,
        None => schema.object.is_some(),
        _ => false,
    }
}

fn instance_type(schema: &SchemaObject) -> Option<InstanceType> {
    schema.instance_type.as_ref().and_then(|kind| match kind {
        SingleOrVec::Single(single) => Some(**single),
        SingleOrVec::Vec(items) => items
            .iter()
            .cloned()
            .find(|item| *item != InstanceType::Null),
    })
}

fn ensure_object_schema(schema: &SchemaObject) -> Result<()> {
    if is_object_schema(schema) {
        Ok(())
    } else {
        bail!("schema must describe an object")
    }
}
