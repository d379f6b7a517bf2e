//! UI rendering

use super::app::{App, Focus, LoadState, Thumbnail};
use crate::display::DetailDisplay;
use crate::facets::NO_FILTERS_MESSAGE;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::border,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, StatefulWidget, Wrap},
};
use ratatui_image::StatefulImage;
use shelf_catalog::{LOAD_FAILURE_MESSAGE, NO_RESULTS_MESSAGE};
use std::time::Instant;
use unicode_width::UnicodeWidthStr;

const SELECTION_BG: Color = Color::Rgb(38, 38, 38);
const CARD_HEIGHT: usize = 2;

/// Render the entire UI
pub fn render(frame: &mut Frame, app: &mut App) {
    match app.load_state.clone() {
        LoadState::Loading { started_at } => return render_loading(frame, app, started_at),
        LoadState::Failed(cause) => return render_failure(frame, &cause),
        LoadState::Ready => {}
    }

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(28),     // Filters sidebar
            Constraint::Min(30),        // Results + search
            Constraint::Percentage(35), // Preview
        ])
        .split(frame.area());

    let center = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(4),    // Results list
            Constraint::Length(1), // Results count
            Constraint::Length(1), // Status bar
            Constraint::Length(1), // Toast line
            Constraint::Length(1), // Search input
        ])
        .split(columns[1]);

    render_filters(frame, app, columns[0]);
    render_results(frame, app, center[0]);
    render_results_count(frame, app, center[1]);
    render_status_bar(frame, app, center[2]);
    render_toast_line(frame, app, center[3]);
    render_search_input(frame, app, center[4]);
    render_preview_panel(frame, app, columns[2]);

    if app.detail.is_open() {
        render_detail_overlay(frame, app);
    }
}

fn render_loading(frame: &mut Frame, app: &App, started_at: Instant) {
    let area = centered_line(frame.area());
    let text = format!("{} Loading {}", spinner_frame(started_at), app.source);
    frame.render_widget(
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::DIM)),
        area,
    );
}

fn render_failure(frame: &mut Frame, cause: &str) {
    let area = frame.area();
    let top = area.height.saturating_sub(4) / 2;
    let body = Rect::new(area.x, area.y + top, area.width, area.height.saturating_sub(top));

    let lines = vec![
        Line::from(Span::styled(
            LOAD_FAILURE_MESSAGE,
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            cause.to_string(),
            Style::default().fg(Color::DarkGray),
        )),
        Line::default(),
        Line::from(Span::styled("Esc quit", Style::default().fg(Color::DarkGray))),
    ];
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        body,
    );
}

fn centered_line(area: Rect) -> Rect {
    Rect::new(area.x, area.y + area.height / 2, area.width, 1.min(area.height))
}

fn pane_border(app: &App, focus: Focus) -> Style {
    if app.focus == focus {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

/// Facet groups with a checkbox per distinct value
fn render_filters(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::RIGHT)
        .border_style(pane_border(app, Focus::Filters))
        .title(Span::styled(" Filters ", pane_border(app, Focus::Filters)));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(store) = &app.store else {
        return;
    };
    if store.vocabulary().is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                NO_FILTERS_MESSAGE,
                Style::default().fg(Color::DarkGray),
            ))
            .wrap(Wrap { trim: true }),
            inner,
        );
        return;
    }

    let focused = app.focus == Focus::Filters;
    let mut items = Vec::new();
    let mut option_index = 0usize;
    let mut selected_item = None;

    for group in store.vocabulary().groups() {
        if !items.is_empty() {
            items.push(ListItem::new(Line::default()));
        }
        items.push(ListItem::new(Line::from(Span::styled(
            group.label.clone(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ))));

        for value in &group.values {
            let checked = store.filters().is_selected(&group.field, value);
            let is_cursor = focused && option_index == app.filter_cursor;
            if option_index == app.filter_cursor {
                selected_item = Some(items.len());
            }

            let base = if is_cursor {
                Style::default().bg(SELECTION_BG)
            } else {
                Style::default()
            };
            let box_style = if checked {
                base.fg(Color::Green)
            } else {
                base.fg(Color::DarkGray)
            };
            let label = if value.is_empty() { "(empty)" } else { value };
            let label_style = if value.is_empty() {
                base.fg(Color::DarkGray).add_modifier(Modifier::ITALIC)
            } else {
                base.fg(Color::Gray)
            };

            items.push(ListItem::new(Line::from(vec![
                Span::styled(if checked { "[x] " } else { "[ ] " }, box_style),
                Span::styled(label.to_string(), label_style),
            ])));
            option_index += 1;
        }
    }

    app.filter_list_state.select(selected_item);
    StatefulWidget::render(
        List::new(items),
        inner,
        frame.buffer_mut(),
        &mut app.filter_list_state,
    );
}

/// Result cards, or the no-results message
fn render_results(frame: &mut Frame, app: &mut App, area: Rect) {
    app.results_rows = area.height as usize / CARD_HEIGHT;

    if app.cards.is_empty() {
        let msg = Paragraph::new(NO_RESULTS_MESSAGE)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(msg, centered_line(area));
        return;
    }

    let selected_index = app.list_state.selected();
    let width = area.width as usize;

    let items: Vec<ListItem> = app
        .cards
        .iter()
        .enumerate()
        .map(|(i, card)| {
            let is_selected = selected_index == Some(i);
            let base_style = if is_selected {
                Style::default().bg(SELECTION_BG)
            } else {
                Style::default()
            };
            let prefix_style = if is_selected {
                Style::default().fg(Color::LightRed).bg(SELECTION_BG)
            } else {
                Style::default()
            };

            let lines = card
                .to_tui_lines(is_selected, base_style, prefix_style)
                .into_iter()
                .map(|line| pad_line(line, width, base_style))
                .collect::<Vec<_>>();
            ListItem::new(lines)
        })
        .collect();

    StatefulWidget::render(
        List::new(items),
        area,
        frame.buffer_mut(),
        &mut app.list_state,
    );
}

/// Extend a line with styled spaces so the selection background spans the row.
fn pad_line(mut line: Line<'static>, width: usize, style: Style) -> Line<'static> {
    let used: usize = line.spans.iter().map(|s| s.content.width()).sum();
    if used < width {
        line.spans.push(Span::styled(" ".repeat(width - used), style));
    }
    line
}

fn render_results_count(frame: &mut Frame, app: &App, area: Rect) {
    let Some(store) = &app.store else {
        return;
    };
    let dim = Style::default().fg(Color::DarkGray);
    let mut spans = vec![Span::styled(
        format!("  {} of {} items", store.visible_len(), store.catalog().len()),
        dim,
    )];
    if !store.filters().is_unconstrained() {
        spans.push(Span::styled(" · filtered", Style::default().fg(Color::Yellow)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the status bar (focus indicator + keyboard shortcuts)
fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let dim = Style::default().fg(Color::DarkGray);
    let bracket = Style::default().fg(Color::DarkGray);

    let (focus_name, hints): (&str, &[&str]) = match app.focus {
        Focus::Search => ("search ", &["Enter results"]),
        Focus::Filters => ("filters", &["↑↓ move", "Space toggle"]),
        Focus::Results => ("results", &["↑↓ select", "Enter details"]),
    };

    let mut spans = vec![
        Span::styled("  focus:", dim),
        Span::styled(
            focus_name,
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        ),
    ];
    for hint in hints.iter().chain(&["Tab focus", "^r reset", "Esc quit"]) {
        spans.push(Span::styled(" [", bracket));
        spans.push(Span::styled(*hint, dim));
        spans.push(Span::styled("]", bracket));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the toast notification line (below status bar)
fn render_toast_line(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(ref toast) = app.toast {
        let bracket = Style::default().fg(Color::DarkGray);
        let toast_style = if toast.is_error {
            Style::default().fg(Color::Red).add_modifier(Modifier::DIM)
        } else {
            Style::default().fg(Color::Blue).add_modifier(Modifier::DIM)
        };

        let spans = vec![
            Span::styled("  [", bracket),
            Span::styled(toast.message.as_str(), toast_style),
            Span::styled("]", bracket),
        ];
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

/// Render the search input (thick bar on the left, block cursor when focused)
fn render_search_input(frame: &mut Frame, app: &App, area: Rect) {
    let input = &app.search_input;
    let focused = app.focus == Focus::Search;
    let bar_style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let text_style = Style::default().fg(Color::White);

    let mut spans = vec![Span::styled("▌ ", bar_style)];

    if input.text.is_empty() && !focused {
        spans.push(Span::styled(
            "search title, author, tags",
            Style::default().fg(Color::DarkGray),
        ));
    } else {
        let (before, after) = input.text.split_at(input.cursor);
        let cursor_char = after.chars().next();
        let after_cursor = cursor_char.map(|c| &after[c.len_utf8()..]).unwrap_or("");

        if !before.is_empty() {
            spans.push(Span::styled(before, text_style));
        }
        match (focused, cursor_char) {
            (true, Some(c)) => spans.push(Span::styled(
                c.to_string(),
                Style::default().fg(Color::White).bg(Color::DarkGray),
            )),
            (true, None) => spans.push(Span::styled("█", text_style)),
            (false, Some(c)) => spans.push(Span::styled(c.to_string(), text_style)),
            (false, None) => {}
        }
        if !after_cursor.is_empty() {
            spans.push(Span::styled(after_cursor, text_style));
        }
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Thumbnail and summary of the highlighted card
fn render_preview_panel(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::LEFT)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(record) = app.selected_record() else {
        return;
    };

    let label = Style::default().fg(Color::DarkGray);
    let value = Style::default().fg(Color::White);
    let mut lines = vec![
        Line::from(Span::styled(
            record.title().to_string(),
            value.add_modifier(Modifier::BOLD),
        )),
        Line::default(),
    ];
    for (name, text) in [
        ("Author", record.author()),
        ("Year", record.year()),
        ("Category", record.get("category")),
        ("Type", record.get("type")),
    ] {
        if !text.is_empty() {
            lines.push(Line::from(vec![
                Span::styled(format!("{name:<10}"), label),
                Span::styled(text.to_string(), value),
            ]));
        }
    }
    lines.push(Line::default());
    lines.push(Line::from(Span::styled("Enter for details", label)));

    let text_height = lines.len() as u16;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(text_height)])
        .split(inner);

    let image_key = app.selected_image().map(str::to_string);
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), chunks[1]);
    if let Some(key) = image_key {
        render_thumbnail(frame, app, &key, chunks[0]);
    }
}

fn render_thumbnail(frame: &mut Frame, app: &mut App, key: &str, area: Rect) {
    let dim = Style::default().fg(Color::DarkGray);
    if !app.image_protocol.is_supported() || app.picker.is_none() {
        frame.render_widget(Paragraph::new(Span::styled(key.to_string(), dim)), area);
        return;
    }

    match app.thumbnails.get_mut(key) {
        Some(Thumbnail::Ready(protocol)) => {
            frame.render_stateful_widget(StatefulImage::default(), area, protocol.as_mut());
        }
        Some(Thumbnail::Failed) => {
            frame.render_widget(Paragraph::new(Span::styled("image unavailable", dim)), area);
        }
        Some(Thumbnail::Loading) | None => {
            frame.render_widget(Paragraph::new(Span::styled("loading image…", dim)), area);
        }
    }
}

/// Expanded view of the selected record, drawn over everything else
fn render_detail_overlay(frame: &mut Frame, app: &mut App) {
    let area = frame.area();
    let width = (area.width * 60 / 100)
        .max(40)
        .min(area.width.saturating_sub(4));
    let height = (area.height * 70 / 100)
        .max(12)
        .min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let overlay = Rect::new(x, y, width, height);
    app.detail_area = Some(overlay);

    frame.render_widget(Clear, overlay);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(border::ROUNDED)
        .border_style(Style::default().fg(Color::Green))
        .title(" Details ")
        .title_bottom(Line::from(Span::styled(
            " [Esc close] [d download] [a archive] [y copy link] ",
            Style::default().fg(Color::DarkGray),
        )));
    let inner = block.inner(overlay);
    frame.render_widget(block, overlay);

    let Some(detail) = app.detail.current() else {
        return;
    };
    let lines = DetailDisplay::new(detail).to_tui_lines(inner.width.saturating_sub(2) as usize);
    let image = detail.image.clone();

    let has_image = !image.is_empty()
        && matches!(app.thumbnails.get(&image), Some(Thumbnail::Ready(_)))
        && inner.height > lines.len() as u16 + 4;
    let text_area = if has_image {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(4), Constraint::Length(lines.len() as u16)])
            .split(inner);
        render_thumbnail(frame, app, &image, chunks[0]);
        chunks[1]
    } else {
        inner
    };

    let padded = Rect {
        x: text_area.x + 1,
        width: text_area.width.saturating_sub(2),
        ..text_area
    };
    frame.render_widget(Paragraph::new(lines), padded);
}

fn spinner_frame(started_at: Instant) -> &'static str {
    const FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
    let elapsed = started_at.elapsed().as_millis() / 80;
    FRAMES[(elapsed as usize) % FRAMES.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_line_fills_width() {
        let line = Line::from(vec![Span::raw("ab"), Span::raw("cd")]);
        let padded = pad_line(line, 6, Style::default());
        assert_eq!(padded.to_string(), "abcd  ");

        let wide = pad_line(Line::from("abcdef"), 3, Style::default());
        assert_eq!(wide.spans.len(), 1);
    }

    #[test]
    fn test_centered_line() {
        let r = centered_line(Rect::new(0, 0, 10, 9));
        assert_eq!(r, Rect::new(0, 4, 10, 1));
        assert_eq!(centered_line(Rect::new(0, 0, 10, 0)).height, 0);
    }
}
