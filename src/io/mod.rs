pub mod format;
pub mod input;
pub mod output;

pub use format::DocumentFormat;
pub use input::{load_document, parse_document_str};
pub use output::{OutputDestination, OutputOptions, emit, render_payload};
