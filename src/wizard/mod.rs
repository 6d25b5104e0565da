mod actions;
mod navigator;

pub use actions::WizardCommand;
pub use navigator::{NavOutcome, Navigator, SectionStatus, section_status, validate_all};
