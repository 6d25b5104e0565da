mod convert;
mod error;
mod field;
mod state;

pub use convert::{coerce_input, value_to_string};
pub use error::FieldCoercionError;
pub use field::{FieldRow, section_rows};
pub use state::{FormState, SectionValues};
