use std::fmt;

use crate::validation::ValidationError;

#[derive(Debug)]
pub enum SubmissionError {
    /// The request never produced a response (DNS, TLS, timeout, ...).
    Transport(reqwest::Error),
    /// The backend answered with a non-success status.
    Rejected { status: u16, body: String },
    Output(anyhow::Error),
    /// A section still fails validation; nothing was sent.
    Invalid(ValidationError),
    AlreadySubmitted,
}

impl SubmissionError {
    pub fn is_rejection(&self) -> bool {
        matches!(self, SubmissionError::Rejected { .. })
    }
}

impl fmt::Display for SubmissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionError::Transport(err) => write!(f, "submission failed: {err}"),
            SubmissionError::Rejected { status, body } if body.trim().is_empty() => {
                write!(f, "submission rejected with status {status}")
            }
            SubmissionError::Rejected { status, body } => {
                write!(f, "submission rejected with status {status}: {}", body.trim())
            }
            SubmissionError::Output(err) => write!(f, "failed to write payload: {err:#}"),
            SubmissionError::Invalid(err) => write!(f, "cannot submit yet: {err}"),
            SubmissionError::AlreadySubmitted => write!(f, "this flow was already submitted"),
        }
    }
}

impl std::error::Error for SubmissionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SubmissionError::Transport(err) => Some(err),
            SubmissionError::Output(err) => Some(err.as_ref()),
            SubmissionError::Invalid(err) => Some(err),
            SubmissionError::Rejected { .. } | SubmissionError::AlreadySubmitted => None,
        }
    }
}

impl From<reqwest::Error> for SubmissionError {
    fn from(err: reqwest::Error) -> Self {
        SubmissionError::Transport(err)
    }
}

impl From<ValidationError> for SubmissionError {
    fn from(err: ValidationError) -> Self {
        SubmissionError::Invalid(err)
    }
}
