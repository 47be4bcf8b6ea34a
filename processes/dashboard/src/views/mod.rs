//! Screens of the dashboard.
//!
//! Each view owns its controller, its cadences and, for the topic view, its
//! subscription. Replacing the active [`Screen`] drops the old view and with
//! it every timer and subscription it held.

mod services;
mod tf;
mod topic;
mod topics;

use std::time::Instant;

use roswatch_common::{ListSurface, NavInput, SurfaceLine};

use crate::app::Menu;
use crate::bus::BusState;

pub use services::{ServiceView, ServicesView};
pub(crate) use tf::frame_label;
pub use tf::{TfEchoView, TfTreeView};
pub use topic::TopicView;
pub use topics::TopicsView;

/// Navigation requested by a view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    OpenTopic(String),
    OpenService(String),
    OpenTfEcho { from: String, to: String },
}

/// Display lines pushed by a tree controller, drawn by the list renderer
#[derive(Debug, Default)]
pub struct ListPane {
    lines: Vec<SurfaceLine>,
    focused: usize,
    height: usize,
    dirty: bool,
}

impl ListPane {
    pub fn lines(&self) -> &[SurfaceLine] {
        &self.lines
    }

    pub fn focused(&self) -> usize {
        self.focused
    }

    /// Called by the renderer with the rows available inside the pane
    pub fn set_viewport_height(&mut self, height: usize) {
        self.height = height;
    }

    pub fn take_repaint(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

impl ListSurface for ListPane {
    fn set_lines(&mut self, lines: Vec<SurfaceLine>) {
        self.lines = lines;
    }

    fn focus(&mut self, index: usize) {
        self.focused = index;
    }

    fn viewport_height(&self) -> usize {
        self.height
    }

    fn repaint(&mut self) {
        self.dirty = true;
    }
}

/// Scroll offset over lines the user reads rather than selects
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Scroll {
    pub offset: usize,
}

impl Scroll {
    /// Apply movement input; returns false for input that is not movement
    pub fn handle(&mut self, input: NavInput, total: usize, page: usize) -> bool {
        let last = total.saturating_sub(1);
        let page = page.max(1);
        self.offset = match input {
            NavInput::Up => self.offset.saturating_sub(1),
            NavInput::Down => self.offset + 1,
            NavInput::PageUp => self.offset.saturating_sub(page),
            NavInput::PageDown => self.offset + page,
            NavInput::Home => 0,
            NavInput::End => last,
            _ => return false,
        }
        .min(last);
        true
    }
}

pub enum Screen {
    Welcome,
    Topics(TopicsView),
    Topic(TopicView),
    Services(ServicesView),
    Service(ServiceView),
    TfTree(TfTreeView),
    TfEcho(TfEchoView),
}

impl Screen {
    /// Menu entry this screen sits under
    pub fn menu(&self) -> Option<Menu> {
        match self {
            Screen::Welcome => None,
            Screen::Topics(_) | Screen::Topic(_) => Some(Menu::Topics),
            Screen::Services(_) | Screen::Service(_) => Some(Menu::Services),
            Screen::TfTree(_) | Screen::TfEcho(_) => Some(Menu::Tf),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Screen::Welcome => "welcome",
            Screen::Topics(_) => "topics",
            Screen::Topic(_) => "topic",
            Screen::Services(_) => "services",
            Screen::Service(_) => "service",
            Screen::TfTree(_) => "tf tree",
            Screen::TfEcho(_) => "tf echo",
        }
    }

    pub fn tick(&mut self, now: Instant, bus: &BusState) {
        match self {
            Screen::Welcome => {}
            Screen::Topics(view) => view.tick(now, bus),
            Screen::Topic(view) => view.tick(now, bus),
            Screen::Services(view) => view.tick(now, bus),
            Screen::Service(view) => view.tick(now, bus),
            Screen::TfTree(view) => view.tick(now, bus),
            Screen::TfEcho(view) => view.tick(now, bus),
        }
    }

    pub fn handle(&mut self, input: NavInput, bus: &BusState) -> Option<Transition> {
        match self {
            Screen::Welcome => None,
            Screen::Topics(view) => view.handle(input),
            Screen::Topic(view) => {
                view.handle(input);
                None
            }
            Screen::Services(view) => view.handle(input),
            Screen::Service(view) => {
                view.handle(input, bus);
                None
            }
            Screen::TfTree(view) => view.handle(input),
            Screen::TfEcho(_) => None,
        }
    }

    /// Whether anything on the screen changed since the last call
    pub fn take_repaint(&mut self) -> bool {
        match self {
            Screen::Welcome => false,
            Screen::Topics(view) => view.pane_mut().take_repaint(),
            Screen::Topic(view) => view.take_repaint(),
            Screen::Services(view) => view.pane_mut().take_repaint(),
            Screen::Service(view) => view.take_repaint(),
            Screen::TfTree(view) => view.pane_mut().take_repaint(),
            Screen::TfEcho(view) => view.take_repaint(),
        }
    }

    /// Extra line shown above the status bar, if the screen wants one
    pub fn bottom_line(&self) -> Option<String> {
        match self {
            Screen::Topics(view) => view.error().map(|e| format!("Stale tree: {e}")),
            Screen::TfTree(view) => view.from().map(|from| format!("From: {from}")),
            _ => None,
        }
    }
}
