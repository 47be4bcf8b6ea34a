use ratatui::{
    style::{Color, Modifier, Style},
    widgets::BorderType,
};
use tracing::debug;

/// Colours and styles used by every renderer
#[derive(Debug, Clone)]
pub struct Theme {
    pub header: Style,
    pub tab_active: Style,
    pub tab_inactive: Style,
    pub selected: Style,
    /// Grouping rows that cannot be opened
    pub muted: Style,
    pub highlight: Color,
    pub border: Color,
    pub info: Color,
    pub error: Color,
    pub border_type: BorderType,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Black).bg(Color::Cyan),
            tab_inactive: Style::default().fg(Color::Gray),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            muted: Style::default().fg(Color::DarkGray),
            highlight: Color::Cyan,
            border: Color::Gray,
            info: Color::Green,
            error: Color::Red,
            border_type: BorderType::Rounded,
        }
    }

    pub fn light() -> Self {
        Self {
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::White).bg(Color::Blue),
            tab_inactive: Style::default().fg(Color::DarkGray),
            selected: Style::default().bg(Color::Gray).add_modifier(Modifier::BOLD),
            muted: Style::default().fg(Color::Gray),
            highlight: Color::Blue,
            border: Color::DarkGray,
            info: Color::Green,
            error: Color::Red,
            border_type: BorderType::Rounded,
        }
    }

    /// Pick light or dark from the terminal background, defaulting to dark
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.6 => Self::light(),
            Ok(_) => Self::dark(),
            Err(e) => {
                debug!(error = %e, "Cannot detect terminal background");
                Self::dark()
            }
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}
