use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::draft::DEFAULT_QUOTA_BYTES;
use crate::io::load_document;

pub const ENV_API_URL: &str = "ONBOARDFLOW_API_URL";
pub const ENV_API_TOKEN: &str = "ONBOARDFLOW_API_TOKEN";
pub const ENV_DRAFT_DIR: &str = "ONBOARDFLOW_DRAFT_DIR";

/// Where submissions go and where drafts live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OnboardConfig {
    pub api_url: String,
    pub api_token: Option<String>,
    pub draft_dir: PathBuf,
    pub timeout_secs: u64,
    pub quota_bytes: usize,
}

impl Default for OnboardConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000/api".to_string(),
            api_token: None,
            draft_dir: PathBuf::from(".onboardflow/drafts"),
            timeout_secs: 30,
            quota_bytes: DEFAULT_QUOTA_BYTES,
        }
    }
}

impl OnboardConfig {
    /// Defaults, then the optional config file, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let document = load_document(path)?;
        let config = serde_json::from_value(document)
            .with_context(|| format!("invalid configuration in {}", path.display()))?;
        debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Overrides fields from `lookup`, which is `std::env::var` outside tests.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_blank = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(url) = non_blank(ENV_API_URL) {
            self.api_url = url;
        }
        if let Some(token) = non_blank(ENV_API_TOKEN) {
            self.api_token = Some(token);
        }
        if let Some(dir) = non_blank(ENV_DRAFT_DIR) {
            self.draft_dir = PathBuf::from(dir);
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}
