use std::time::{Duration, Instant};

use roswatch_common::{NamespaceBuilder, NamespaceEntry, NavInput, TreeController, TreeEvent};
use tracing::warn;

use super::{ListPane, Transition};
use crate::bus::BusState;
use crate::cadence::Cadence;

/// Namespace tree of the published topics
pub struct TopicsView {
    controller: TreeController<NamespaceEntry>,
    pane: ListPane,
    refresh: Cadence,
    error: Option<String>,
}

impl TopicsView {
    pub fn new(bus: &BusState, refresh: Duration, now: Instant) -> Self {
        let mut view = Self {
            controller: TreeController::new().with_muting(|entry: &NamespaceEntry| !entry.real),
            pane: ListPane::default(),
            refresh: Cadence::new(refresh, now),
            error: None,
        };
        view.rebuild(bus);
        view
    }

    pub fn controller(&self) -> &TreeController<NamespaceEntry> {
        &self.controller
    }

    pub fn pane(&self) -> &ListPane {
        &self.pane
    }

    pub fn pane_mut(&mut self) -> &mut ListPane {
        &mut self.pane
    }

    /// Why the last rebuild was rejected, if it was
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn tick(&mut self, now: Instant, bus: &BusState) {
        if self.refresh.due(now) {
            self.rebuild(bus);
        }
    }

    fn rebuild(&mut self, bus: &BusState) {
        match NamespaceBuilder::build(bus.current_snapshot().topic_names()) {
            Ok(forest) => {
                self.controller.set_forest(forest, &mut self.pane);
                self.error = None;
            }
            Err(e) => {
                // Keep showing the previous tree
                let message = e.to_string();
                if self.error.as_deref() != Some(message.as_str()) {
                    warn!(error = %message, "Rejected topic list");
                }
                self.error = Some(message);
            }
        }
    }

    pub fn handle(&mut self, input: NavInput) -> Option<Transition> {
        match self.controller.handle(input, &mut self.pane)? {
            TreeEvent::Activated { path, payload } if payload.real => {
                Some(Transition::OpenTopic(NamespaceEntry::full_name(&path)))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{BusPublisher, BusSnapshot, ChannelSource, TopicInfo};

    fn bus_with(topics: &[&str]) -> (BusPublisher, BusState) {
        let (publisher, source) = ChannelSource::create("test");
        let mut bus = BusState::new(Box::new(source));
        publish(&publisher, topics);
        bus.refresh();
        (publisher, bus)
    }

    fn publish(publisher: &BusPublisher, topics: &[&str]) {
        let snapshot = BusSnapshot {
            topics: topics
                .iter()
                .map(|name| TopicInfo {
                    name: name.to_string(),
                    type_name: "std_msgs/String".to_string(),
                })
                .collect(),
            ..Default::default()
        };
        publisher.publish_snapshot(snapshot).unwrap();
    }

    fn texts(view: &TopicsView) -> Vec<&str> {
        view.pane().lines().iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn grouping_nodes_are_muted() {
        let (_publisher, bus) = bus_with(&["/a/b1", "/a/b2", "/c"]);
        let view = TopicsView::new(&bus, Duration::from_secs(1), Instant::now());

        assert_eq!(texts(&view), ["├── a", "│   ├── b1", "│   └── b2", "└── c"]);
        let muted: Vec<_> = view.pane().lines().iter().map(|l| l.muted).collect();
        assert_eq!(muted, [true, false, false, false]);
    }

    #[test]
    fn activating_a_topic_opens_it() {
        let (_publisher, bus) = bus_with(&["/a/b1", "/c"]);
        let mut view = TopicsView::new(&bus, Duration::from_secs(1), Instant::now());

        assert_eq!(view.handle(NavInput::Activate), None);
        view.handle(NavInput::Down);
        assert_eq!(
            view.handle(NavInput::Activate),
            Some(Transition::OpenTopic("/a/b1".to_string()))
        );
    }

    #[test]
    fn refresh_keeps_collapse_state() {
        let (publisher, mut bus) = bus_with(&["/a/b1", "/c"]);
        let start = Instant::now();
        let mut view = TopicsView::new(&bus, Duration::from_secs(1), start);
        view.handle(NavInput::Toggle);
        assert_eq!(texts(&view), ["├── a", "└── c"]);

        publish(&publisher, &["/a/b1", "/a/b2", "/c", "/d"]);
        bus.refresh();
        view.tick(start + Duration::from_millis(500), &bus);
        assert_eq!(view.pane().lines().len(), 2);

        view.tick(start + Duration::from_secs(1), &bus);
        assert_eq!(texts(&view), ["├── a", "├── c", "└── d"]);
    }

    #[test]
    fn malformed_topic_keeps_previous_tree() {
        let (publisher, mut bus) = bus_with(&["/c"]);
        let start = Instant::now();
        let mut view = TopicsView::new(&bus, Duration::from_secs(1), start);

        publish(&publisher, &["/c", "bad"]);
        bus.refresh();
        view.tick(start + Duration::from_secs(1), &bus);

        assert_eq!(texts(&view), ["└── c"]);
        assert!(view.error().unwrap().contains("bad"));
    }
}
