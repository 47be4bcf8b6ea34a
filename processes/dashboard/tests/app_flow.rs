use std::time::{Duration, Instant};

use ratatui::{backend::TestBackend, Terminal};
use roswatch::ui::{self, Theme};
use roswatch::views::Screen;
use roswatch::{App, BusPublisher, BusSnapshot, ChannelSource, DashboardConfig, Menu};
use roswatch_common::NavInput;
use serde_json::json;

fn snapshot() -> BusSnapshot {
    serde_json::from_value(json!({
        "topics": [
            {"name": "/robot/odom", "type": "nav_msgs/Odometry"},
            {"name": "/rosout", "type": "rosgraph_msgs/Log"}
        ],
        "publishers": {"/robot/odom": ["/driver"]},
        "subscribers": {"/robot/odom": ["/planner"]},
        "services": {"/spawn": ["http://sim:1/"]},
        "nodes": {"http://sim:1/": "/turtlesim"},
        "tf": [{
            "name": "map",
            "children": [{"name": "odom", "transform": {"translation": [1.0, 0.0, 0.0]}}]
        }]
    }))
    .unwrap()
}

fn app() -> (BusPublisher, App) {
    let (publisher, source) = ChannelSource::create("test");
    publisher.publish_snapshot(snapshot()).unwrap();
    let mut app = App::with_theme(Box::new(source), DashboardConfig::default(), Theme::dark());
    assert!(app.refresh_bus());
    (publisher, app)
}

fn screen_text(app: &mut App) -> String {
    let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
    terminal.draw(|frame| ui::render(frame, app, Instant::now())).unwrap();
    terminal.backend().buffer().content().iter().map(|cell| cell.symbol()).collect()
}

#[test]
fn topic_round_trip_subscribes_and_unsubscribes() {
    let (publisher, mut app) = app();
    let now = Instant::now();

    app.open(Menu::Topics, now);
    app.handle_nav(NavInput::Down, now);
    app.handle_nav(NavInput::Activate, now);
    assert!(matches!(&app.screen, Screen::Topic(view) if view.topic() == "/robot/odom"));

    assert!(publisher.publish("/robot/odom", "nav_msgs/Odometry", json!({"x": 1.5})));
    app.tick(now);
    let Screen::Topic(view) = &app.screen else {
        panic!("expected topic view");
    };
    assert_eq!(view.received(), 1);
    assert_eq!(view.message(), ["x: 1.5"]);
    assert_eq!(view.publishers(), ["/driver"]);

    app.go_back();
    assert_eq!(app.screen.name(), "topics");
    assert!(app.running);
    assert!(!publisher.publish("/robot/odom", "nav_msgs/Odometry", json!({"x": 2})));

    // The topics tree comes back with its selection
    let Screen::Topics(view) = &app.screen else {
        panic!("expected topics view");
    };
    assert_eq!(view.pane().focused(), 1);

    app.go_back();
    assert!(!app.running);
}

#[test]
fn grouping_node_does_not_open() {
    let (_publisher, mut app) = app();
    let now = Instant::now();
    app.open(Menu::Topics, now);
    app.handle_nav(NavInput::Activate, now);
    assert_eq!(app.screen.name(), "topics");
}

#[test]
fn tf_pick_then_echo() {
    let (_publisher, mut app) = app();
    let now = Instant::now();

    app.open(Menu::Tf, now);
    app.handle_nav(NavInput::Activate, now);
    assert_eq!(app.screen.bottom_line().as_deref(), Some("From: map"));

    app.handle_nav(NavInput::End, now);
    app.handle_nav(NavInput::Activate, now);
    let Screen::TfEcho(view) = &app.screen else {
        panic!("expected tf echo");
    };
    assert_eq!(view.title(), "map -> odom");
    assert_eq!(view.lines()[1], "  x: 1.000000");

    app.go_back();
    assert_eq!(app.screen.name(), "tf tree");
}

#[test]
fn service_detail_resolves_node_names() {
    let (_publisher, mut app) = app();
    let now = Instant::now();

    app.open(Menu::Services, now);
    app.handle_nav(NavInput::Activate, now);
    let Screen::Service(view) = &app.screen else {
        panic!("expected service view");
    };
    assert_eq!(view.lines(), ["Providers (1):", "  /turtlesim"]);
}

#[test]
fn service_call_shows_the_response() {
    let (publisher, mut app) = app();
    publisher.advertise_service("/spawn", |_| Ok(json!({"name": "turtle2"})));
    let now = Instant::now();

    app.open(Menu::Services, now);
    app.handle_nav(NavInput::Activate, now);
    app.handle_nav(NavInput::Activate, now);
    app.tick(now);

    let Screen::Service(view) = &app.screen else {
        panic!("expected service view");
    };
    assert_eq!(view.call_lines(), ["Response:", "  name: \"turtle2\""]);
    assert!(screen_text(&mut app).contains("name: \"turtle2\""));
}

#[test]
fn zero_window_reports_a_notice() {
    let (publisher, source) = ChannelSource::create("test");
    publisher.publish_snapshot(snapshot()).unwrap();
    let config = DashboardConfig {
        window_capacity: 0,
        ..DashboardConfig::default()
    };
    let mut app = App::with_theme(Box::new(source), config, Theme::dark());
    app.refresh_bus();
    let now = Instant::now();

    app.open(Menu::Topics, now);
    app.handle_nav(NavInput::End, now);
    app.handle_nav(NavInput::Activate, now);
    assert_eq!(app.screen.name(), "topics");
    assert!(app.notice.is_some());
}

#[test]
fn bus_refresh_follows_the_forest_cadence() {
    let (publisher, mut app) = app();
    let start = Instant::now();
    app.open(Menu::Topics, start);

    let mut next = snapshot();
    next.topics.retain(|t| t.name == "/rosout");
    publisher.publish_snapshot(next).unwrap();

    app.tick(start + Duration::from_secs(2));
    assert_eq!(app.bus.current_snapshot().topics.len(), 1);
}

#[test]
fn every_screen_renders() {
    let (_publisher, mut app) = app();
    let now = Instant::now();

    assert!(screen_text(&mut app).contains("F1 Topics"));

    app.open(Menu::Topics, now);
    assert!(screen_text(&mut app).contains("robot"));

    app.handle_nav(NavInput::Down, now);
    app.handle_nav(NavInput::Activate, now);
    assert!(screen_text(&mut app).contains("Topic: /robot/odom"));

    app.open(Menu::Services, now);
    assert!(screen_text(&mut app).contains("/spawn"));

    app.open(Menu::Tf, now);
    app.toggle_help();
    assert!(screen_text(&mut app).contains("Keyboard Shortcuts"));
}
