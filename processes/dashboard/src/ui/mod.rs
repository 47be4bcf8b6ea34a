pub mod common;
pub mod list_pane;
pub mod text;
pub mod theme;
pub mod topic;

use std::time::Instant;

use ratatui::{
    layout::{Constraint, Layout},
    Frame,
};

pub use theme::Theme;

use crate::app::App;
use crate::views::Screen;

/// Draw the whole dashboard for the current screen
pub fn render(frame: &mut Frame, app: &mut App, now: Instant) {
    let chunks = Layout::vertical([
        Constraint::Length(1), // Header bar
        Constraint::Length(1), // Tabs
        Constraint::Min(5),    // Content
        Constraint::Length(1), // Screen bottom line
        Constraint::Length(1), // Status bar
    ])
    .split(frame.area());

    common::render_header(frame, app, chunks[0]);
    common::render_tabs(frame, app, chunks[1]);

    let theme = &app.theme;
    match &mut app.screen {
        Screen::Welcome => text::render_welcome(frame, theme, chunks[2]),
        Screen::Topics(view) => {
            let needle = view.controller().needle().to_string();
            list_pane::render(frame, theme, view.pane_mut(), "Topics", &needle, chunks[2]);
        }
        Screen::Topic(view) => topic::render(frame, theme, view, chunks[2]),
        Screen::Services(view) => {
            let needle = view.controller().needle().to_string();
            list_pane::render(frame, theme, view.pane_mut(), "Services", &needle, chunks[2]);
        }
        Screen::Service(view) => text::render_service(frame, theme, view, chunks[2]),
        Screen::TfTree(view) => {
            let needle = view.controller().needle().to_string();
            list_pane::render(frame, theme, view.pane_mut(), "TF frames", &needle, chunks[2]);
        }
        Screen::TfEcho(view) => text::render_tf_echo(frame, theme, view, chunks[2]),
    }

    common::render_bottom_line(frame, app, chunks[3]);
    common::render_status_bar(frame, app, chunks[4], now);

    if app.show_help {
        common::render_help(frame, app, frame.area());
    }
}
