use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{
    config::{ENV_API_TOKEN, ENV_API_URL, ENV_DRAFT_DIR, OnboardConfig},
    draft::DEFAULT_QUOTA_BYTES,
};

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

fn write_config(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, text).unwrap();
    path
}

#[test]
fn defaults_point_at_a_local_api() {
    let config = OnboardConfig::default();
    assert_eq!(config.api_url, "http://localhost:8000/api");
    assert_eq!(config.api_token, None);
    assert_eq!(config.draft_dir, PathBuf::from(".onboardflow/drafts"));
    assert_eq!(config.quota_bytes, DEFAULT_QUOTA_BYTES);
    assert_eq!(config.timeout(), Duration::from_secs(30));
}

#[test]
fn file_values_override_defaults_and_keep_the_rest() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        dir.path(),
        "onboardflow.json",
        r#"{"api_url": "https://api.attirelly.in", "timeout_secs": 5}"#,
    );
    let config = OnboardConfig::from_file(&path).unwrap();
    assert_eq!(config.api_url, "https://api.attirelly.in");
    assert_eq!(config.timeout(), Duration::from_secs(5));
    assert_eq!(config.draft_dir, OnboardConfig::default().draft_dir);
}

#[cfg(feature = "yaml")]
#[test]
fn yaml_files_are_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        dir.path(),
        "onboardflow.yaml",
        "api_token: secret\ndraft_dir: /var/lib/drafts\n",
    );
    let config = OnboardConfig::from_file(&path).unwrap();
    assert_eq!(config.api_token.as_deref(), Some("secret"));
    assert_eq!(config.draft_dir, PathBuf::from("/var/lib/drafts"));
}

#[cfg(feature = "toml")]
#[test]
fn toml_files_are_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), "onboardflow.toml", "quota_bytes = 1024\n");
    let config = OnboardConfig::from_file(&path).unwrap();
    assert_eq!(config.quota_bytes, 1024);
}

#[test]
fn unknown_keys_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), "onboardflow.json", r#"{"api_uri": "typo"}"#);
    let err = OnboardConfig::from_file(&path).unwrap_err();
    assert!(format!("{err:#}").contains("invalid configuration"));
}

#[test]
fn environment_overrides_file_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        dir.path(),
        "onboardflow.json",
        r#"{"api_url": "https://file.example", "draft_dir": "from-file"}"#,
    );
    let mut config = OnboardConfig::from_file(&path).unwrap();
    config.apply_env(env(&[
        (ENV_API_URL, "https://env.example"),
        (ENV_API_TOKEN, "token-1"),
    ]));
    assert_eq!(config.api_url, "https://env.example");
    assert_eq!(config.api_token.as_deref(), Some("token-1"));
    assert_eq!(config.draft_dir, PathBuf::from("from-file"));
}

#[test]
fn blank_environment_values_are_ignored() {
    let mut config = OnboardConfig {
        api_token: Some("kept".to_string()),
        ..OnboardConfig::default()
    };
    config.apply_env(env(&[
        (ENV_API_URL, ""),
        (ENV_API_TOKEN, "   "),
        (ENV_DRAFT_DIR, "\t"),
    ]));
    assert_eq!(config.api_url, OnboardConfig::default().api_url);
    assert_eq!(config.api_token.as_deref(), Some("kept"));
    assert_eq!(config.draft_dir, OnboardConfig::default().draft_dir);
}

#[test]
fn missing_config_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(OnboardConfig::load(Some(&dir.path().join("absent.json"))).is_err());
}

#[test]
fn zero_timeout_is_raised_to_one_second() {
    let config = OnboardConfig {
        timeout_secs: 0,
        ..OnboardConfig::default()
    };
    assert_eq!(config.timeout(), Duration::from_secs(1));
}
