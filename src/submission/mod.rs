mod error;
mod payload;
mod sink;

pub use error::SubmissionError;
pub use payload::{build_payload, field_key, section_key, to_snake_case};
pub use sink::{HttpSubmitter, OutputSubmitter, SubmitReceipt, Submitter};
