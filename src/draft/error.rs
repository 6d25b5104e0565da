use std::{fmt, io};

#[derive(Debug)]
pub enum DraftError {
    Storage { key: String, source: io::Error },
    QuotaExceeded { key: String, size: usize, quota: usize },
    Encode(serde_json::Error),
    Decode { key: String, source: serde_json::Error },
}

impl DraftError {
    /// The stored bytes exist but are not a draft. Callers may treat this as
    /// "no draft" and start fresh.
    pub fn is_unreadable(&self) -> bool {
        matches!(self, DraftError::Decode { .. })
    }
}

impl fmt::Display for DraftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DraftError::Storage { key, source } => {
                write!(f, "draft storage failed for '{key}': {source}")
            }
            DraftError::QuotaExceeded { key, size, quota } => write!(
                f,
                "draft '{key}' is {size} bytes, over the {quota} byte storage quota"
            ),
            DraftError::Encode(source) => write!(f, "failed to encode draft: {source}"),
            DraftError::Decode { key, source } => {
                write!(f, "stored draft '{key}' is unreadable: {source}")
            }
        }
    }
}

impl std::error::Error for DraftError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DraftError::Storage { source, .. } => Some(source),
            DraftError::Encode(source) | DraftError::Decode { source, .. } => Some(source),
            DraftError::QuotaExceeded { .. } => None,
        }
    }
}
