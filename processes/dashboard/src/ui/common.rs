use std::time::Instant;

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, Menu};

/// Render the title bar with the data source
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let snapshot = app.bus.current_snapshot();
    let line = Line::from(vec![
        Span::styled(" roswatch ", app.theme.header),
        Span::styled(
            format!(
                "| {} | {} topics, {} services, {} nodes",
                app.bus.description(),
                snapshot.topics.len(),
                snapshot.services.len(),
                snapshot.nodes.len()
            ),
            Style::default().add_modifier(Modifier::DIM),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Render the menu tabs
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = Menu::ALL
        .iter()
        .enumerate()
        .map(|(i, menu)| Line::from(format!(" F{}:{} ", i + 1, menu.title())))
        .collect();

    let tabs = Tabs::new(titles)
        .select(app.menu().map(Menu::index))
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect, now: Instant) {
    let (status, style) = if let Some(notice) = &app.notice {
        (format!(" {notice}"), Style::default().fg(app.theme.error))
    } else if let Some(err) = app.bus.last_error() {
        (format!(" Error: {err} | Esc:back F10:help"), Style::default().fg(app.theme.error))
    } else if let Some(updated) = app.bus.last_updated() {
        let elapsed = now.saturating_duration_since(updated);
        (
            format!(
                " Updated {:.1}s ago | Tab:switch Enter:open Space:fold Esc:back F10:help",
                elapsed.as_secs_f64()
            ),
            Style::default().add_modifier(Modifier::DIM),
        )
    } else {
        (" Waiting for bus... | Esc:quit".to_string(), Style::default().add_modifier(Modifier::DIM))
    };

    frame.render_widget(Paragraph::new(status).style(style), area);
}

/// Render the screen's own bottom line, such as the picked TF frame
pub fn render_bottom_line(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(text) = app.screen.bottom_line() {
        let line = Line::from(Span::styled(format!(" {text}"), Style::default().fg(app.theme.info)));
        frame.render_widget(Paragraph::new(line), area);
    }
}

/// Render the help overlay
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from("  Tab/S-Tab   Next/previous menu"),
        Line::from("  F1-F3       Topics, Services, TF"),
        Line::from("  Up/Down     Move selection"),
        Line::from("  PgUp/PgDn   Move a page"),
        Line::from("  Home/End    First/last line"),
        Line::from("  Enter       Open selection, call service"),
        Line::from("  Space       Collapse/expand"),
        Line::from("  a-z...      Search labels"),
        Line::from("  Backspace   Clear search"),
        Line::from("  Esc         Back, or quit"),
        Line::from("  Ctrl-C      Quit"),
        Line::from("  F10         Toggle this help"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    let help_width = 42;
    let help_height = 18;
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width.min(area.width), help_height.min(area.height));

    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
