use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::format::format_count;
use crate::ui::Theme;
use crate::views::TopicView;

/// Render the topic view: rate line, latest message and its peers
pub fn render(frame: &mut Frame, theme: &Theme, view: &mut TopicView, area: Rect) {
    let rows = Layout::vertical([Constraint::Length(1), Constraint::Min(3)]).split(area);
    let columns = Layout::horizontal([Constraint::Min(30), Constraint::Length(36)]).split(rows[1]);

    let info = Line::from(vec![
        Span::styled(format!(" {}", view.info()), Style::default().fg(theme.info)),
        Span::styled(
            format!("  ({} received)", format_count(view.received())),
            Style::default().add_modifier(Modifier::DIM),
        ),
    ]);
    frame.render_widget(Paragraph::new(info), rows[0]);

    render_message(frame, theme, view, columns[0]);
    render_peers(frame, theme, view, columns[1]);
}

fn render_message(frame: &mut Frame, theme: &Theme, view: &mut TopicView, area: Rect) {
    let block = Block::default()
        .title(format!(" {} ", view.topic()))
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(Style::default().fg(theme.border));
    view.set_page(block.inner(area).height as usize);

    let lines: Vec<Line> = if view.message().is_empty() {
        vec![Line::from(Span::styled(
            "  Waiting for messages...",
            Style::default().add_modifier(Modifier::DIM),
        ))]
    } else {
        view.message().iter().map(|l| Line::from(l.as_str())).collect()
    };

    let scroll = u16::try_from(view.scroll()).unwrap_or(u16::MAX);
    frame.render_widget(Paragraph::new(lines).block(block).scroll((scroll, 0)), area);
}

fn render_peers(frame: &mut Frame, theme: &Theme, view: &TopicView, area: Rect) {
    let mut lines = Vec::new();
    lines.push(Line::from(Span::styled(
        format!("Publishers ({})", view.publishers().len()),
        theme.header,
    )));
    lines.extend(view.publishers().iter().map(|p| Line::from(format!("  {p}"))));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("Subscribers ({})", view.subscribers().len()),
        theme.header,
    )));
    lines.extend(view.subscribers().iter().map(|s| Line::from(format!("  {s}"))));
    if let Some(node) = view.last_publisher() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Last message from", theme.header)));
        lines.push(Line::from(format!("  {node}")));
    }

    let block = Block::default()
        .title(" Nodes ")
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(Style::default().fg(theme.border));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
