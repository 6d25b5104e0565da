use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
};

use crate::{form::FieldRow, wizard::SectionStatus};

use super::components::{render_fields, render_footer, render_header, render_sidebar};

pub struct SidebarEntry {
    pub title: String,
    pub status: SectionStatus,
}

pub struct UiContext<'a> {
    pub flow_title: &'a str,
    pub flow_description: Option<&'a str>,
    pub section_title: &'a str,
    pub section_description: Option<&'a str>,
    pub sections: &'a [SidebarEntry],
    pub rows: &'a [FieldRow],
    pub selected: usize,
    pub status_message: &'a str,
    pub dirty: bool,
    pub issue_count: usize,
    pub help: Option<&'a str>,
    pub draft_id: Option<&'a str>,
    pub busy: bool,
}

/// Header on top, sidebar plus field list in the middle, footer below.
/// `scroll` is the first visible row and is kept across frames.
pub fn draw(frame: &mut Frame<'_>, ctx: &UiContext<'_>, scroll: &mut usize) {
    let header_height = if ctx.flow_description.is_some() { 4 } else { 3 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(header_height),
            Constraint::Min(6),
            Constraint::Length(4),
        ])
        .split(frame.area());

    render_header(frame, chunks[0], ctx);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(20)])
        .split(chunks[1]);
    render_sidebar(frame, middle[0], ctx);
    render_fields(frame, middle[1], ctx, scroll);

    render_footer(frame, chunks[2], ctx);
}
