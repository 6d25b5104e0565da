use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;

use super::DocumentFormat;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputDestination {
    Stdout,
    File(PathBuf),
}

impl OutputDestination {
    pub fn file(path: impl AsRef<Path>) -> Self {
        OutputDestination::File(path.as_ref().to_path_buf())
    }

    fn describe(&self) -> String {
        match self {
            OutputDestination::Stdout => "stdout".to_string(),
            OutputDestination::File(path) => path.display().to_string(),
        }
    }
}

/// Rendering and targets for payloads that are written out instead of sent.
/// An empty destination list renders nothing.
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub format: DocumentFormat,
    pub pretty: bool,
    pub destinations: Vec<OutputDestination>,
}

impl OutputOptions {
    pub fn new(format: DocumentFormat) -> Self {
        Self {
            format,
            pretty: true,
            destinations: vec![OutputDestination::Stdout],
        }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn with_destinations(mut self, destinations: Vec<OutputDestination>) -> Self {
        self.destinations = destinations;
        self
    }
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self::new(DocumentFormat::Json)
    }
}

/// Renders a payload in `format`. TOML cannot hold a bare scalar, so
/// payloads are expected to be objects there.
pub fn render_payload(payload: &Value, format: DocumentFormat, pretty: bool) -> Result<String> {
    let text = match format {
        DocumentFormat::Json if pretty => serde_json::to_string_pretty(payload)?,
        DocumentFormat::Json => serde_json::to_string(payload)?,
        #[cfg(feature = "yaml")]
        DocumentFormat::Yaml => serde_yaml::to_string(payload)?,
        #[cfg(feature = "toml")]
        DocumentFormat::Toml if pretty => toml::to_string_pretty(payload)?,
        #[cfg(feature = "toml")]
        DocumentFormat::Toml => toml::to_string(payload)?,
    };
    Ok(text)
}

/// Renders once, then writes to every destination in order. Missing parent
/// directories of file destinations are created.
pub fn emit(payload: &Value, options: &OutputOptions) -> Result<()> {
    if options.destinations.is_empty() {
        return Ok(());
    }
    let mut text = render_payload(payload, options.format, options.pretty)
        .with_context(|| format!("failed to render payload as {}", options.format))?;
    if !text.ends_with('\n') {
        text.push('\n');
    }
    for destination in &options.destinations {
        write_to(destination, &text)
            .with_context(|| format!("failed to write payload to {}", destination.describe()))?;
    }
    Ok(())
}

fn write_to(destination: &OutputDestination, text: &str) -> io::Result<()> {
    match destination {
        OutputDestination::Stdout => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()
        }
        OutputDestination::File(path) => {
            if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, text)
        }
    }
}
