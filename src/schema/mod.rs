mod layout;
mod loader;
mod metadata;
mod resolver;

pub use layout::build_flow_schema;
pub(crate) use metadata::prettify_label;
