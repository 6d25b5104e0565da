use anyhow::{Context, Result, bail};
use schemars::schema::RootSchema;
use serde_json::Value;

/// Sections are checked with a Draft 7 validator, so a document that asks
/// for another dialect is refused up front. A missing `$schema` is fine.
pub fn load_root_schema(document: &Value) -> Result<RootSchema> {
    let Some(object) = document.as_object() else {
        bail!("flow document must be a JSON object");
    };
    if let Some(dialect) = object.get("$schema") {
        let dialect = dialect.as_str().unwrap_or_default();
        if !dialect.contains("draft-07") {
            bail!("flow documents must use JSON Schema draft-07, found '{dialect}'");
        }
    }
    serde_json::from_value(document.clone()).context("flow document is not a valid JSON Schema")
}
