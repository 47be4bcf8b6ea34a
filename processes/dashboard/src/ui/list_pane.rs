use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::ui::Theme;
use crate::views::ListPane;

/// Render a tree controller's lines with the focused row highlighted.
///
/// Tells the pane how many rows fit so page movement matches what is on
/// screen.
pub fn render(
    frame: &mut Frame,
    theme: &Theme,
    pane: &mut ListPane,
    title: &str,
    needle: &str,
    area: Rect,
) {
    let title = if needle.is_empty() {
        format!(" {title} ({}) ", pane.lines().len())
    } else {
        format!(" {title} [search: \"{needle}\"] ")
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(Style::default().fg(theme.border));

    let inner = block.inner(area);
    pane.set_viewport_height(inner.height as usize);

    if pane.lines().is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            "  Nothing to show",
            Style::default().add_modifier(Modifier::DIM),
        )))
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = pane
        .lines()
        .iter()
        .map(|line| {
            let style = if line.muted { theme.muted } else { Style::default() };
            ListItem::new(Line::from(Span::styled(line.text.clone(), style)))
        })
        .collect();

    let list = List::new(items).block(block).highlight_style(theme.selected);

    let mut state = ListState::default();
    state.select(Some(pane.focused()));

    frame.render_stateful_widget(list, area, &mut state);
}
