mod parser;
mod schema;

pub use parser::parse_flow_schema;
pub use schema::{CrossFieldRule, FieldKind, FieldSchema, FlowSchema, PayloadShape, SectionSchema};
