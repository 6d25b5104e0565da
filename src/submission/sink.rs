use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;
use tracing::{info, warn};

use crate::io::output::{OutputOptions, emit};

use super::error::SubmissionError;

/// What the backend (or a dry-run sink) acknowledged.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitReceipt {
    pub status: u16,
    pub body: Option<Value>,
}

impl SubmitReceipt {
    pub fn local() -> Self {
        Self {
            status: 0,
            body: None,
        }
    }
}

/// The external API, seen as an opaque sink.
pub trait Submitter {
    fn submit(&self, endpoint: &str, payload: &Value) -> Result<SubmitReceipt, SubmissionError>;
}

impl<F> Submitter for F
where
    F: Fn(&str, &Value) -> Result<SubmitReceipt, SubmissionError>,
{
    fn submit(&self, endpoint: &str, payload: &Value) -> Result<SubmitReceipt, SubmissionError> {
        self(endpoint, payload)
    }
}

/// POSTs JSON payloads to `<base_url><endpoint>`. One request per call and
/// no retries.
#[derive(Debug, Clone)]
pub struct HttpSubmitter {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpSubmitter {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SubmissionError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            token: None,
        })
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|token| !token.trim().is_empty());
        self
    }

    pub fn url_for(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return endpoint.to_string();
        }
        let base = self.base_url.trim_end_matches('/');
        let path = endpoint.trim_start_matches('/');
        if path.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{path}")
        }
    }
}

impl Submitter for HttpSubmitter {
    fn submit(&self, endpoint: &str, payload: &Value) -> Result<SubmitReceipt, SubmissionError> {
        let url = self.url_for(endpoint);
        let mut request = self.client.post(&url).json(payload);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send()?;
        let status = response.status();
        let text = response.text()?;
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "submission rejected");
            return Err(SubmissionError::Rejected {
                status: status.as_u16(),
                body: text,
            });
        }
        info!(%url, status = status.as_u16(), "submission accepted");
        Ok(SubmitReceipt {
            status: status.as_u16(),
            body: serde_json::from_str(&text).ok(),
        })
    }
}

/// Writes the payload through the output layer instead of the network.
#[derive(Debug, Clone, Default)]
pub struct OutputSubmitter {
    options: OutputOptions,
}

impl OutputSubmitter {
    pub fn new(options: OutputOptions) -> Self {
        Self { options }
    }
}

impl Submitter for OutputSubmitter {
    fn submit(&self, endpoint: &str, payload: &Value) -> Result<SubmitReceipt, SubmissionError> {
        emit(payload, &self.options).map_err(SubmissionError::Output)?;
        info!(endpoint, "payload written (dry run)");
        Ok(SubmitReceipt::local())
    }
}
