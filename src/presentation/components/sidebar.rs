use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};

use crate::wizard::SectionStatus;

use super::super::view::{SidebarEntry, UiContext};

pub fn render_sidebar(frame: &mut Frame<'_>, area: Rect, ctx: &UiContext<'_>) {
    let items: Vec<ListItem<'_>> = ctx
        .sections
        .iter()
        .map(|entry| ListItem::new(Line::from(sidebar_spans(entry))))
        .collect();
    let list = List::new(items).block(Block::default().title("Steps").borders(Borders::ALL));
    frame.render_widget(list, area);
}

/// `▶ 2. Brand` for the active step, `✓` for reached valid steps, `•` for
/// reached ones and `·` for locked ones.
pub fn sidebar_label(entry: &SidebarEntry) -> String {
    format!(
        "{} {}. {}",
        marker(&entry.status),
        entry.status.index + 1,
        entry.title
    )
}

fn sidebar_spans(entry: &SidebarEntry) -> Vec<Span<'static>> {
    let style = if entry.status.active {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else if !entry.status.reachable {
        Style::default().fg(Color::DarkGray)
    } else if entry.status.valid {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::White)
    };
    vec![Span::styled(sidebar_label(entry), style)]
}

fn marker(status: &SectionStatus) -> &'static str {
    if status.active {
        "▶"
    } else if !status.reachable {
        "·"
    } else if status.valid {
        "✓"
    } else {
        "•"
    }
}
