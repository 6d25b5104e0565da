use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};

use super::super::view::UiContext;

pub fn render_footer(frame: &mut Frame<'_>, area: Rect, ctx: &UiContext<'_>) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(2)])
        .split(area);

    if let Some(help) = ctx.help {
        let keys = Paragraph::new(help)
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(Color::Yellow));
        frame.render_widget(keys, rows[0]);
    }

    let status = Paragraph::new(status_line(ctx)).wrap(Wrap { trim: true });
    frame.render_widget(status, rows[1]);
}

fn status_line(ctx: &UiContext<'_>) -> Line<'static> {
    let mut spans = Vec::new();
    if let Some(step) = ctx.sections.iter().position(|entry| entry.status.active) {
        spans.push(Span::styled(
            format!("Step {}/{} ", step + 1, ctx.sections.len()),
            Style::default().add_modifier(Modifier::BOLD),
        ));
    }
    spans.push(verdict(ctx));
    spans.push(Span::raw(" "));

    let message = if ctx.status_message.trim().is_empty() {
        "Ready"
    } else {
        ctx.status_message
    };
    spans.push(Span::raw(message.to_string()));
    if ctx.dirty {
        spans.push(Span::styled(
            " • unsaved changes",
            Style::default().fg(Color::Yellow),
        ));
    }
    if let Some(id) = ctx.draft_id {
        spans.push(Span::styled(
            format!(" • draft {id}"),
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(spans)
}

fn verdict(ctx: &UiContext<'_>) -> Span<'static> {
    if ctx.busy {
        Span::styled("[busy]", Style::default().fg(Color::Magenta))
    } else if ctx.issue_count > 0 {
        Span::styled(
            format!("[! {}]", ctx.issue_count),
            Style::default().fg(Color::Red),
        )
    } else {
        Span::styled("[ok]", Style::default().fg(Color::Green))
    }
}
