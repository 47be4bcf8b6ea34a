//! Plain text screens.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::ui::Theme;
use crate::views::{ServiceView, TfEchoView};

fn block<'a>(theme: &Theme, title: String) -> Block<'a> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(Style::default().fg(theme.border))
}

pub fn render_welcome(frame: &mut Frame, theme: &Theme, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("roswatch", theme.header)),
        Line::from(""),
        Line::from("F1 Topics    F2 Services    F3 TF"),
        Line::from(""),
        Line::from(Span::styled(
            "Tab cycles the menu, F10 shows every key",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];
    let paragraph = Paragraph::new(lines).alignment(Alignment::Center).block(block(theme, String::new()));
    frame.render_widget(paragraph, area);
}

pub fn render_service(frame: &mut Frame, theme: &Theme, view: &ServiceView, area: Rect) {
    let mut lines: Vec<Line> = view.lines().iter().map(|l| Line::from(l.as_str())).collect();
    lines.push(Line::from(""));
    let call_style = if view.is_calling() {
        Style::default().add_modifier(Modifier::DIM)
    } else {
        Style::default()
    };
    lines.extend(view.call_lines().iter().map(|l| Line::from(Span::styled(l.as_str(), call_style))));
    let scroll = u16::try_from(view.scroll()).unwrap_or(u16::MAX);
    let paragraph = Paragraph::new(lines)
        .block(block(theme, format!(" {} ", view.service())))
        .scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}

pub fn render_tf_echo(frame: &mut Frame, theme: &Theme, view: &TfEchoView, area: Rect) {
    let mut lines: Vec<Line> = view.lines().iter().map(|l| Line::from(l.as_str())).collect();
    if let Some(err) = view.error() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("Lookup failed: {err}"),
            Style::default().fg(theme.error),
        )));
    }
    let paragraph = Paragraph::new(lines).block(block(theme, format!(" {} ", view.title())));
    frame.render_widget(paragraph, area);
}
