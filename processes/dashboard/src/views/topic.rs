use std::time::{Duration, Instant};

use roswatch_common::{NavInput, RateSnapshot, RateStats};
use tracing::debug;

use super::Scroll;
use crate::bus::{Arrival, BusState, Subscription};
use crate::cadence::Cadence;
use crate::format::{info_line, message_lines};

/// Live view of one topic: latest message, rates and its publishers and
/// subscribers.
///
/// Subscribes on construction. Dropping the view drops the subscription,
/// which unsubscribes, and the cadence, which stops the rate refresh.
pub struct TopicView {
    topic: String,
    type_name: Option<String>,
    stats: RateStats,
    rates: RateSnapshot,
    opened_at: Instant,
    received: u64,
    info: String,
    message: Vec<String>,
    publishers: Vec<String>,
    subscribers: Vec<String>,
    last_publisher: Option<String>,
    scroll: Scroll,
    page: usize,
    refresh: Cadence,
    subscription: Subscription,
    dirty: bool,
}

impl TopicView {
    pub fn open(
        topic: &str,
        bus: &BusState,
        window_capacity: usize,
        refresh: Duration,
        now: Instant,
    ) -> roswatch_common::Result<Self> {
        let stats = RateStats::new(window_capacity)?;
        let subscription = bus.subscribe(topic);

        let mut view = Self {
            topic: topic.to_string(),
            type_name: None,
            stats,
            rates: RateSnapshot::default(),
            opened_at: now,
            received: 0,
            info: String::new(),
            message: Vec::new(),
            publishers: Vec::new(),
            subscribers: Vec::new(),
            last_publisher: None,
            scroll: Scroll::default(),
            page: 1,
            refresh: Cadence::new(refresh, now),
            subscription,
            dirty: true,
        };
        view.refresh_info(bus);
        Ok(view)
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn info(&self) -> &str {
        &self.info
    }

    pub fn rates(&self) -> RateSnapshot {
        self.rates
    }

    pub fn received(&self) -> u64 {
        self.received
    }

    pub fn message(&self) -> &[String] {
        &self.message
    }

    pub fn publishers(&self) -> &[String] {
        &self.publishers
    }

    pub fn subscribers(&self) -> &[String] {
        &self.subscribers
    }

    /// Node that sent the newest message, when the source reports it
    pub fn last_publisher(&self) -> Option<&str> {
        self.last_publisher.as_deref()
    }

    pub fn scroll(&self) -> usize {
        self.scroll.offset
    }

    /// Rows available for the message, set by the renderer
    pub fn set_page(&mut self, rows: usize) {
        self.page = rows;
    }

    pub fn tick(&mut self, now: Instant, bus: &BusState) {
        for arrival in self.subscription.drain() {
            self.record(arrival, bus);
        }
        if self.refresh.due(now) {
            self.refresh_info(bus);
        }
    }

    /// Every arrival counts towards the rates; only the newest is shown
    fn record(&mut self, arrival: Arrival, bus: &BusState) {
        let elapsed = arrival.received_at.saturating_duration_since(self.opened_at);
        self.stats.record(elapsed.as_millis() as u64, arrival.size);
        if !arrival.type_name.is_empty() {
            self.type_name = Some(arrival.type_name);
        }
        if let Some(uri) = &arrival.publisher {
            self.last_publisher = Some(bus.node_name(uri).to_string());
        }
        self.message = message_lines(&arrival.value);
        self.received += 1;
        self.dirty = true;
    }

    fn refresh_info(&mut self, bus: &BusState) {
        let snapshot = bus.current_snapshot();
        self.rates = self.stats.snapshot();
        let type_name = self.type_name.as_deref().or_else(|| snapshot.topic_type(&self.topic));
        self.info = info_line(&self.topic, type_name, &self.rates);
        self.publishers = snapshot.publishers_of(&self.topic).to_vec();
        self.subscribers = snapshot.subscribers_of(&self.topic).to_vec();
        self.dirty = true;
        debug!(topic = %self.topic, hz = self.rates.hz, samples = self.stats.count(), "Refreshed topic rates");
    }

    pub fn handle(&mut self, input: NavInput) {
        if self.scroll.handle(input, self.message.len(), self.page) {
            self.dirty = true;
        }
    }

    pub fn take_repaint(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
