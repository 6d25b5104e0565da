mod fields;
mod footer;
mod header;
mod sidebar;

pub use fields::{render_fields, row_lines};
pub use footer::render_footer;
pub use header::render_header;
pub use sidebar::{render_sidebar, sidebar_label};
