mod components;
mod view;

#[cfg(test)]
pub use components::{row_lines, sidebar_label};
pub use view::{SidebarEntry, UiContext, draw};
