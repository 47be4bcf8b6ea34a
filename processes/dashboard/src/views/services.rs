use std::time::{Duration, Instant};

use roswatch_common::{Connectors, Forest, NavInput, TreeController, TreeEvent, TreeNode};
use serde_json::{Map, Value};
use tracing::warn;

use super::{ListPane, Scroll, Transition};
use crate::bus::{BusState, ServiceCall};
use crate::cadence::Cadence;
use crate::format::message_lines;

/// Flat, searchable list of service names
pub struct ServicesView {
    controller: TreeController<()>,
    pane: ListPane,
    refresh: Cadence,
}

impl ServicesView {
    pub fn new(bus: &BusState, refresh: Duration, now: Instant) -> Self {
        let mut view = Self {
            controller: TreeController::new().with_connectors(Connectors::flat()),
            pane: ListPane::default(),
            refresh: Cadence::new(refresh, now),
        };
        view.rebuild(bus);
        view
    }

    pub fn controller(&self) -> &TreeController<()> {
        &self.controller
    }

    pub fn pane(&self) -> &ListPane {
        &self.pane
    }

    pub fn pane_mut(&mut self) -> &mut ListPane {
        &mut self.pane
    }

    pub fn tick(&mut self, now: Instant, bus: &BusState) {
        if self.refresh.due(now) {
            self.rebuild(bus);
        }
    }

    fn rebuild(&mut self, bus: &BusState) {
        // Service names are already sorted by the snapshot map
        let forest: Forest<()> =
            bus.current_snapshot().service_names().map(|name| TreeNode::new(name, ())).collect();
        self.controller.set_forest(forest, &mut self.pane);
    }

    pub fn handle(&mut self, input: NavInput) -> Option<Transition> {
        match self.controller.handle(input, &mut self.pane)? {
            TreeEvent::Activated { mut path, .. } => path.pop().map(Transition::OpenService),
            _ => None,
        }
    }
}

/// One service, the nodes providing it and the outcome of the last call.
///
/// Activation calls the service with an empty request. Services whose
/// request template has fields are not called; the template is shown
/// instead.
pub struct ServiceView {
    service: String,
    lines: Vec<String>,
    call: Option<ServiceCall>,
    call_lines: Vec<String>,
    scroll: Scroll,
    refresh: Cadence,
    dirty: bool,
}

impl ServiceView {
    pub fn new(service: &str, bus: &BusState, refresh: Duration, now: Instant) -> Self {
        let mut view = Self {
            service: service.to_string(),
            lines: Vec::new(),
            call: None,
            call_lines: vec!["Enter calls the service".to_string()],
            scroll: Scroll::default(),
            refresh: Cadence::new(refresh, now),
            dirty: true,
        };
        view.update(bus);
        view
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Provider lines
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The pending call, its response or its failure
    pub fn call_lines(&self) -> &[String] {
        &self.call_lines
    }

    pub fn is_calling(&self) -> bool {
        self.call.is_some()
    }

    pub fn scroll(&self) -> usize {
        self.scroll.offset
    }

    pub fn tick(&mut self, now: Instant, bus: &BusState) {
        self.poll_call();
        if self.refresh.due(now) {
            self.update(bus);
        }
    }

    fn poll_call(&mut self) {
        let Some(result) = self.call.as_mut().and_then(ServiceCall::try_response) else {
            return;
        };
        self.call = None;
        self.call_lines = match result {
            Ok(value) => {
                let mut lines = vec!["Response:".to_string()];
                lines.extend(message_lines(&value).into_iter().map(|line| format!("  {line}")));
                lines
            }
            Err(e) => {
                warn!(service = %self.service, error = %e, "Service call failed");
                vec![format!("Call failed: {e}")]
            }
        };
        self.dirty = true;
    }

    fn call(&mut self, bus: &BusState) {
        // One call in flight at a time
        if self.call.is_some() {
            return;
        }

        if let Some(template) = bus.current_snapshot().required_input(&self.service) {
            self.call_lines = vec![format!("Needs input: {template}")];
        } else {
            match bus.call_service(&self.service, Value::Object(Map::new())) {
                Ok(call) => {
                    self.call_lines = vec![format!("Calling {}...", self.service)];
                    self.call = Some(call);
                }
                Err(e) => {
                    warn!(service = %self.service, error = %e, "Cannot call service");
                    self.call_lines = vec![format!("Call failed: {e}")];
                }
            }
        }
        self.dirty = true;
    }

    fn update(&mut self, bus: &BusState) {
        let snapshot = bus.current_snapshot();
        let lines = if snapshot.services.contains_key(&self.service) {
            let providers = snapshot.providers_of(&self.service);
            let mut lines = vec![format!("Providers ({}):", providers.len())];
            lines.extend(providers.iter().map(|p| format!("  {}", bus.node_name(p))));
            lines
        } else {
            vec!["Service is no longer advertised".to_string()]
        };

        if lines != self.lines {
            self.lines = lines;
            self.dirty = true;
        }
    }

    pub fn handle(&mut self, input: NavInput, bus: &BusState) {
        if input == NavInput::Activate {
            self.call(bus);
        } else if self.scroll.handle(input, self.lines.len() + 1 + self.call_lines.len(), 1) {
            self.dirty = true;
        }
    }

    pub fn take_repaint(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{BusPublisher, BusSnapshot, ChannelSource, FileSource};
    use serde_json::json;

    fn bus() -> (BusPublisher, BusState) {
        let (publisher, source) = ChannelSource::create("test");
        let mut snapshot = BusSnapshot::default();
        snapshot.services.insert("/spawn".to_string(), vec!["http://sim:1/".to_string()]);
        snapshot.services.insert("/clear".to_string(), vec!["/turtlesim".to_string()]);
        snapshot.nodes.insert("http://sim:1/".to_string(), "/turtlesim".to_string());
        publisher.publish_snapshot(snapshot).unwrap();

        let mut bus = BusState::new(Box::new(source));
        bus.refresh();
        (publisher, bus)
    }

    #[test]
    fn lists_services_without_tree_art() {
        let (_publisher, bus) = bus();
        let view = ServicesView::new(&bus, Duration::from_secs(1), Instant::now());
        let texts: Vec<_> = view.pane().lines().iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, ["/clear", "/spawn"]);
    }

    #[test]
    fn search_then_activate_opens_service() {
        let (_publisher, bus) = bus();
        let mut view = ServicesView::new(&bus, Duration::from_secs(1), Instant::now());

        view.handle(NavInput::Char('s'));
        view.handle(NavInput::Char('p'));
        assert_eq!(
            view.handle(NavInput::Activate),
            Some(Transition::OpenService("/spawn".to_string()))
        );
    }

    #[test]
    fn service_view_resolves_provider_names() {
        let (publisher, mut bus) = bus();
        let start = Instant::now();
        let mut view = ServiceView::new("/spawn", &bus, Duration::from_secs(1), start);
        assert_eq!(view.lines(), ["Providers (1):", "  /turtlesim"]);
        assert!(view.take_repaint());

        publisher.publish_snapshot(BusSnapshot::default()).unwrap();
        bus.refresh();
        view.tick(start + Duration::from_secs(1), &bus);
        assert_eq!(view.lines(), ["Service is no longer advertised"]);
        assert!(view.take_repaint());
    }

    #[test]
    fn activation_shows_the_response() {
        let (publisher, bus) = bus();
        publisher.advertise_service("/spawn", |_| Ok(json!({"name": "turtle2", "pose": {"x": 1}})));
        let start = Instant::now();
        let mut view = ServiceView::new("/spawn", &bus, Duration::from_secs(1), start);
        assert_eq!(view.call_lines(), ["Enter calls the service"]);

        view.handle(NavInput::Activate, &bus);
        assert!(view.is_calling());
        assert_eq!(view.call_lines(), ["Calling /spawn..."]);

        view.tick(start, &bus);
        assert!(!view.is_calling());
        assert_eq!(
            view.call_lines(),
            ["Response:", "  name: \"turtle2\"", "  pose: {", "    \"x\": 1", "  }"]
        );
    }

    #[test]
    fn failed_calls_are_reported() {
        let (publisher, bus) = bus();
        publisher.advertise_service("/clear", |_| Err("not ready".to_string()));
        let start = Instant::now();

        let mut view = ServiceView::new("/clear", &bus, Duration::from_secs(1), start);
        view.handle(NavInput::Activate, &bus);
        view.tick(start, &bus);
        assert_eq!(view.call_lines(), ["Call failed: service call failed: not ready"]);

        // Nothing answers /spawn here
        let mut view = ServiceView::new("/spawn", &bus, Duration::from_secs(1), start);
        view.handle(NavInput::Activate, &bus);
        assert!(!view.is_calling());
        assert_eq!(view.call_lines(), ["Call failed: unknown service '/spawn'"]);
    }

    #[test]
    fn services_needing_input_are_not_called() {
        let (publisher, source) = ChannelSource::create("test");
        let mut snapshot = BusSnapshot::default();
        snapshot.services.insert("/add".to_string(), vec!["/adder".to_string()]);
        snapshot.service_requests.insert("/add".to_string(), json!({"a": 0}));
        publisher.publish_snapshot(snapshot).unwrap();
        publisher.advertise_service("/add", |_| Ok(json!({})));
        let mut bus = BusState::new(Box::new(source));
        bus.refresh();

        let mut view = ServiceView::new("/add", &bus, Duration::from_secs(1), Instant::now());
        view.handle(NavInput::Activate, &bus);
        assert!(!view.is_calling());
        assert_eq!(view.call_lines(), ["Needs input: {\"a\":0}"]);
    }

    #[test]
    fn file_sources_cannot_call() {
        let bus = BusState::new(Box::new(FileSource::new("/nonexistent/bus.json")));
        let mut view = ServiceView::new("/spawn", &bus, Duration::from_secs(1), Instant::now());
        view.handle(NavInput::Activate, &bus);
        assert_eq!(view.call_lines(), ["Call failed: this source cannot call services"]);
    }
}
