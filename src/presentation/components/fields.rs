use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use textwrap::wrap;
use unicode_width::UnicodeWidthStr;

use crate::form::FieldRow;

use super::super::view::UiContext;

pub fn render_fields(frame: &mut Frame<'_>, area: Rect, ctx: &UiContext<'_>, scroll: &mut usize) {
    let mut field_area = area;
    if let Some(description) = ctx.section_description {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(2)])
            .split(area);
        let details = Paragraph::new(description.to_string())
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(details, chunks[0]);
        field_area = chunks[1];
    }

    let block = Block::default()
        .title(ctx.section_title.to_string())
        .borders(Borders::ALL);

    if ctx.rows.is_empty() {
        let placeholder = Paragraph::new("This section has no fields").block(block);
        frame.render_widget(placeholder, field_area);
        return;
    }

    let content_width = field_area.width.saturating_sub(4);
    let rendered: Vec<RowRender> = ctx
        .rows
        .iter()
        .enumerate()
        .map(|(idx, row)| build_row_render(row, idx == ctx.selected, content_width))
        .collect();
    let heights: Vec<usize> = rendered.iter().map(|row| row.lines.len()).collect();
    let window = field_area.height.saturating_sub(2) as usize;
    *scroll = visible_start(&heights, ctx.selected, *scroll, window);

    let mut lines = Vec::new();
    let mut cursor = None;
    for (idx, row) in rendered.into_iter().enumerate().skip(*scroll) {
        if let Some(hint) = row.cursor_hint {
            cursor = Some((lines.len() + hint.line_offset, hint.value_width));
        }
        lines.extend(row.lines);
        if idx > ctx.selected && lines.len() >= window {
            break;
        }
    }

    frame.render_widget(Paragraph::new(lines).block(block), field_area);

    if !ctx.busy
        && let Some((line, width)) = cursor
        && line < window
    {
        let x = field_area.x.saturating_add(3).saturating_add(width);
        let y = field_area.y.saturating_add(1).saturating_add(line as u16);
        frame.set_cursor_position((x, y));
    }
}

/// First row to draw so that the selected row fits in `window` lines,
/// moving the previous offset as little as possible.
fn visible_start(heights: &[usize], selected: usize, previous: usize, window: usize) -> usize {
    if heights.is_empty() {
        return 0;
    }
    let selected = selected.min(heights.len() - 1);
    let mut start = previous.min(selected);
    while start < selected && heights[start..=selected].iter().sum::<usize>() > window {
        start += 1;
    }
    start
}

struct RowRender {
    lines: Vec<Line<'static>>,
    cursor_hint: Option<CursorHint>,
}

struct CursorHint {
    line_offset: usize,
    value_width: u16,
}

/// Lines for one row, exposed for rendering tests.
pub fn row_lines(row: &FieldRow, is_selected: bool, max_width: u16) -> Vec<Line<'static>> {
    build_row_render(row, is_selected, max_width).lines
}

fn build_row_render(row: &FieldRow, is_selected: bool, max_width: u16) -> RowRender {
    let mut lines = Vec::new();
    let mut label = row.label.clone();
    if row.schema.required {
        label.push_str(" *");
    }
    let label_style = if is_selected {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    };
    lines.push(Line::from(Span::styled(label, label_style)));

    let (value_lines, cursor_hint) = value_lines(row, is_selected, max_width, lines.len());
    lines.extend(value_lines);
    lines.push(meta_line(row, is_selected));

    if let Some(error) = &row.error {
        for segment in wrap(error, max_width.max(8) as usize) {
            lines.push(Line::from(Span::styled(
                format!("  ! {}", segment.into_owned()),
                Style::default().fg(Color::Red),
            )));
        }
    }
    lines.push(Line::from(""));

    RowRender { lines, cursor_hint }
}

fn value_lines(
    row: &FieldRow,
    is_selected: bool,
    max_width: u16,
    offset: usize,
) -> (Vec<Line<'static>>, Option<CursorHint>) {
    let text = row.display_value();
    let clamp_width = max_width.saturating_sub(4).max(4) as usize;
    let mut wrapped: Vec<String> = wrap(&text, clamp_width)
        .into_iter()
        .map(|segment| segment.into_owned())
        .collect();
    if wrapped.is_empty() {
        wrapped.push(String::new());
    }

    if !is_selected {
        let style = if row.buffer.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::White)
        };
        let lines = wrapped
            .into_iter()
            .map(|segment| {
                let shown = if segment.is_empty() { "-".to_string() } else { segment };
                Line::from(vec![Span::raw("  "), Span::styled(shown, style)])
            })
            .collect();
        return (lines, None);
    }

    let inner_width = wrapped
        .iter()
        .map(|line| UnicodeWidthStr::width(line.as_str()))
        .max()
        .unwrap_or(0)
        .max(8);
    let last_width = wrapped
        .last()
        .map(|line| UnicodeWidthStr::width(line.as_str()))
        .unwrap_or(0);
    let border_style = Style::default().fg(Color::Yellow);
    let value_style = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);
    let border = "─".repeat(inner_width + 2);

    let mut lines = vec![Line::from(Span::styled(format!("┌{border}┐"), border_style))];
    for segment in &wrapped {
        let pad = inner_width.saturating_sub(UnicodeWidthStr::width(segment.as_str()));
        lines.push(Line::from(vec![
            Span::styled("│ ", border_style),
            Span::styled(format!("{segment}{}", " ".repeat(pad)), value_style),
            Span::styled(" │", border_style),
        ]));
    }
    lines.push(Line::from(Span::styled(format!("└{border}┘"), border_style)));

    // Typed fields get a text cursor; toggles and pickers do not.
    let takes_text = !matches!(
        row.schema.kind,
        crate::domain::FieldKind::Boolean | crate::domain::FieldKind::Enum(_)
    );
    let cursor_hint = takes_text.then_some(CursorHint {
        line_offset: offset + wrapped.len(),
        value_width: last_width as u16,
    });
    (lines, cursor_hint)
}

fn meta_line(row: &FieldRow, is_selected: bool) -> Line<'static> {
    let style = if is_selected {
        Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let mut meta = vec![Span::styled(
        format!("  {}", row.schema.kind.type_label()),
        style,
    )];
    if row.schema.path.len() > 1 {
        meta.push(Span::styled(
            format!(" · {}", row.dotted_path()),
            Style::default().fg(Color::DarkGray),
        ));
    }
    if is_selected && let Some(hint) = row.input_hint() {
        meta.push(Span::styled(
            format!(" · {hint}"),
            Style::default().fg(Color::DarkGray),
        ));
    }
    if row.dirty && row.error.is_none() {
        meta.push(Span::styled(" · edited", Style::default().fg(Color::Yellow)));
    }
    Line::from(meta)
}
