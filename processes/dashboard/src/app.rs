use std::time::{Duration, Instant};

use roswatch_common::NavInput;
use tracing::{info, warn};

use crate::bus::{BusSource, BusState};
use crate::cadence::Cadence;
use crate::configuration::DashboardConfig;
use crate::ui::Theme;
use crate::views::{
    Screen, ServiceView, ServicesView, TfEchoView, TfTreeView, TopicView, TopicsView, Transition,
};

/// How often the status bar clock is redrawn when nothing else changes
const IDLE_REDRAW: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Menu {
    Topics,
    Services,
    Tf,
}

impl Menu {
    pub const ALL: [Menu; 3] = [Menu::Topics, Menu::Services, Menu::Tf];

    pub fn next(self) -> Self {
        match self {
            Menu::Topics => Menu::Services,
            Menu::Services => Menu::Tf,
            Menu::Tf => Menu::Topics,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Menu::Topics => Menu::Tf,
            Menu::Services => Menu::Topics,
            Menu::Tf => Menu::Services,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Menu::Topics => "Topics",
            Menu::Services => "Services",
            Menu::Tf => "TF",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Menu::Topics => 0,
            Menu::Services => 1,
            Menu::Tf => 2,
        }
    }
}

pub struct App {
    pub running: bool,
    pub show_help: bool,
    pub screen: Screen,
    pub bus: BusState,
    pub config: DashboardConfig,
    pub theme: Theme,

    /// Message from the last failed action, shown in the status bar
    pub notice: Option<String>,

    /// Top-level view a detail view was opened from, restored on back
    parent: Option<Screen>,
    bus_refresh: Cadence,
    idle_redraw: Cadence,
    dirty: bool,
}

impl App {
    pub fn new(source: Box<dyn BusSource>, config: DashboardConfig) -> Self {
        Self::with_theme(source, config, Theme::auto_detect())
    }

    pub fn with_theme(source: Box<dyn BusSource>, config: DashboardConfig, theme: Theme) -> Self {
        let now = Instant::now();
        Self {
            running: true,
            show_help: false,
            screen: Screen::Welcome,
            bus: BusState::new(source),
            bus_refresh: Cadence::new(config.forest_refresh(), now),
            idle_redraw: Cadence::new(IDLE_REDRAW, now),
            config,
            theme,
            notice: None,
            parent: None,
            dirty: true,
        }
    }

    /// Poll the bus source once
    pub fn refresh_bus(&mut self) -> bool {
        let updated = self.bus.refresh();
        self.dirty = true;
        updated
    }

    pub fn menu(&self) -> Option<Menu> {
        self.screen.menu()
    }

    /// Open a menu entry's top-level view, dropping whatever was showing
    pub fn open(&mut self, menu: Menu, now: Instant) {
        let config = &self.config;
        let screen = match menu {
            Menu::Topics => Screen::Topics(TopicsView::new(&self.bus, config.forest_refresh(), now)),
            Menu::Services => {
                Screen::Services(ServicesView::new(&self.bus, config.forest_refresh(), now))
            }
            Menu::Tf => Screen::TfTree(TfTreeView::new(&self.bus, config.forest_refresh(), now)),
        };
        info!(view = screen.name(), "Switching view");
        self.parent = None;
        self.screen = screen;
        self.notice = None;
        self.dirty = true;
    }

    pub fn next_menu(&mut self, now: Instant) {
        let menu = self.menu().map_or(Menu::Topics, Menu::next);
        self.open(menu, now);
    }

    pub fn prev_menu(&mut self, now: Instant) {
        let menu = self.menu().map_or(Menu::Tf, Menu::prev);
        self.open(menu, now);
    }

    /// Leave a detail view for the view it was opened from; quit from a
    /// top-level view
    pub fn go_back(&mut self) {
        match self.parent.take() {
            Some(parent) => {
                info!(from = self.screen.name(), to = parent.name(), "Going back");
                self.screen = parent;
                self.dirty = true;
            }
            None => self.quit(),
        }
    }

    pub fn handle_nav(&mut self, input: NavInput, now: Instant) {
        self.dirty = true;
        let Some(transition) = self.screen.handle(input, &self.bus) else {
            return;
        };

        let config = &self.config;
        let detail = match transition {
            Transition::OpenTopic(topic) => {
                match TopicView::open(
                    &topic,
                    &self.bus,
                    config.window_capacity,
                    config.rate_interval(),
                    now,
                ) {
                    Ok(view) => Screen::Topic(view),
                    Err(e) => {
                        warn!(%topic, error = %e, "Cannot open topic");
                        self.notice = Some(e.to_string());
                        return;
                    }
                }
            }
            Transition::OpenService(service) => {
                Screen::Service(ServiceView::new(&service, &self.bus, config.forest_refresh(), now))
            }
            Transition::OpenTfEcho { from, to } => Screen::TfEcho(TfEchoView::new(
                &from,
                &to,
                &self.bus,
                config.tf_echo_interval(),
                now,
            )),
        };

        info!(view = detail.name(), "Opening detail view");
        let parent = std::mem::replace(&mut self.screen, detail);
        self.parent = Some(parent);
    }

    /// Timer-driven work: poll the bus, feed arrivals and fire view cadences
    pub fn tick(&mut self, now: Instant) {
        if self.bus_refresh.due(now) {
            self.refresh_bus();
        }
        self.screen.tick(now, &self.bus);
        if self.idle_redraw.due(now) {
            self.dirty = true;
        }
    }

    /// Whether the screen needs drawing, clearing the request
    pub fn take_redraw(&mut self) -> bool {
        let screen = self.screen.take_repaint();
        std::mem::take(&mut self.dirty) || screen
    }

    pub fn request_redraw(&mut self) {
        self.dirty = true;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
        self.dirty = true;
    }

    pub fn quit(&mut self) {
        info!("Quitting");
        self.running = false;
    }
}
