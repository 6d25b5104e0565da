mod error;
mod presence;
mod rules;
mod section;

pub use error::{ValidationError, ValidationIssue};
pub use presence::{field_is_present, value_is_set};
pub use section::{SchemaSectionValidator, SectionValidator, ValidatorSet};
