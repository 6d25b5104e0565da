use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use super::DocumentFormat;

pub fn parse_document_str(contents: &str, format: DocumentFormat) -> Result<Value> {
    match format {
        DocumentFormat::Json => {
            serde_json::from_str::<Value>(contents).with_context(|| "failed to parse JSON document")
        }
        #[cfg(feature = "yaml")]
        DocumentFormat::Yaml => {
            serde_yaml::from_str::<Value>(contents).with_context(|| "failed to parse YAML document")
        }
        #[cfg(feature = "toml")]
        DocumentFormat::Toml => contents
            .parse::<toml::Value>()
            .with_context(|| "failed to parse TOML document")
            .and_then(|value| {
                serde_json::to_value(value).context("failed to convert TOML to JSON")
            }),
    }
}

const SNIFF_ORDER: &[DocumentFormat] = &[
    DocumentFormat::Json,
    #[cfg(feature = "toml")]
    DocumentFormat::Toml,
    #[cfg(feature = "yaml")]
    DocumentFormat::Yaml,
];

/// Reads a flow or config document. The extension picks the format; without
/// a known one each compiled-in format is tried and the JSON error is kept.
pub fn load_document(path: &Path) -> Result<Value> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read file {}", path.display()))?;
    if let Some(format) = DocumentFormat::from_path(path) {
        return parse_document_str(&contents, format)
            .with_context(|| format!("failed to parse {}", path.display()));
    }
    let mut first_error = None;
    for format in SNIFF_ORDER {
        match parse_document_str(&contents, *format) {
            Ok(value) => return Ok(value),
            Err(err) => {
                first_error.get_or_insert(err);
            }
        }
    }
    let err = first_error.unwrap_or_else(|| anyhow::anyhow!("no document formats are enabled"));
    Err(err.context(format!("failed to parse {}", path.display())))
}
