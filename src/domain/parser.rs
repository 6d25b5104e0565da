use anyhow::Result;
use serde_json::Value;

use crate::schema::build_flow_schema;

use super::schema::FlowSchema;

/// Parse a flow document (a JSON Schema with wizard extensions) into a `FlowSchema`.
pub fn parse_flow_schema(value: &Value) -> Result<FlowSchema> {
    build_flow_schema(value)
}
