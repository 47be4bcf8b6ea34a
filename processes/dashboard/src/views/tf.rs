use std::time::{Duration, Instant};

use roswatch_common::{lookup_transform, ListSurface, NavInput, TreeController, TreeEvent, TreeNode};
use tracing::{debug, info};

use super::{ListPane, Transition};
use crate::bus::{BusState, FrameInfo};
use crate::cadence::Cadence;
use crate::format::transform_lines;

pub(crate) fn frame_label(node: &TreeNode<FrameInfo>) -> String {
    match &node.payload.publisher {
        Some(publisher) => format!("{} [{}]", node.name, publisher),
        None => node.name.clone(),
    }
}

/// The TF frame forest. The first activation picks the source frame, the
/// second opens the echo from it to the activated frame.
pub struct TfTreeView {
    controller: TreeController<FrameInfo>,
    pane: ListPane,
    refresh: Cadence,
    from: Option<String>,
}

impl TfTreeView {
    pub fn new(bus: &BusState, refresh: Duration, now: Instant) -> Self {
        let mut view = Self {
            controller: TreeController::new().with_renderer(frame_label),
            pane: ListPane::default(),
            refresh: Cadence::new(refresh, now),
            from: None,
        };
        view.rebuild(bus);
        view
    }

    pub fn controller(&self) -> &TreeController<FrameInfo> {
        &self.controller
    }

    pub fn pane(&self) -> &ListPane {
        &self.pane
    }

    pub fn pane_mut(&mut self) -> &mut ListPane {
        &mut self.pane
    }

    pub fn from(&self) -> Option<&str> {
        self.from.as_deref()
    }

    pub fn tick(&mut self, now: Instant, bus: &BusState) {
        if self.refresh.due(now) {
            self.rebuild(bus);
        }
    }

    fn rebuild(&mut self, bus: &BusState) {
        let forest = bus.current_snapshot().frame_forest();
        self.controller.set_forest(forest, &mut self.pane);
    }

    pub fn handle(&mut self, input: NavInput) -> Option<Transition> {
        if input == NavInput::Backspace && self.from.take().is_some() {
            debug!("Cleared source frame");
            self.pane.repaint();
        }

        match self.controller.handle(input, &mut self.pane)? {
            TreeEvent::Activated { mut path, .. } => {
                let frame = path.pop()?;
                match self.from.take() {
                    None => {
                        debug!(from = %frame, "Picked source frame");
                        self.from = Some(frame);
                        self.pane.repaint();
                        None
                    }
                    Some(from) => {
                        info!(%from, to = %frame, "Opening transform echo");
                        Some(Transition::OpenTfEcho { from, to: frame })
                    }
                }
            }
            _ => None,
        }
    }
}

/// Continuously recomputed transform between two frames
pub struct TfEchoView {
    from: String,
    to: String,
    lines: Vec<String>,
    error: Option<String>,
    refresh: Cadence,
    dirty: bool,
}

impl TfEchoView {
    pub fn new(from: &str, to: &str, bus: &BusState, refresh: Duration, now: Instant) -> Self {
        let mut view = Self {
            from: from.to_string(),
            to: to.to_string(),
            lines: Vec::new(),
            error: None,
            refresh: Cadence::new(refresh, now),
            dirty: true,
        };
        view.update(bus);
        view
    }

    pub fn title(&self) -> String {
        format!("{} -> {}", self.from, self.to)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn tick(&mut self, now: Instant, bus: &BusState) {
        if self.refresh.due(now) {
            self.update(bus);
        }
    }

    fn update(&mut self, bus: &BusState) {
        let forest = bus.current_snapshot().frame_forest();
        match lookup_transform(&forest, &self.from, &self.to, |frame| frame.transform) {
            Ok(transform) => {
                self.lines = transform_lines(&transform);
                self.error = None;
            }
            Err(e) => {
                // Frames come and go; keep the last good transform on screen
                self.error = Some(e.to_string());
            }
        }
        self.dirty = true;
    }

    pub fn take_repaint(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
