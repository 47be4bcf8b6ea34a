use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind};
use roswatch_common::NavInput;

use crate::app::{App, Menu};

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent, now: Instant) {
    if key.kind == KeyEventKind::Release {
        return;
    }

    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }

    // If help is shown, any key closes it
    if app.show_help {
        app.toggle_help();
        return;
    }

    match key.code {
        KeyCode::F(10) => app.toggle_help(),

        // Menu switching
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.prev_menu(now);
            } else {
                app.next_menu(now);
            }
        }
        KeyCode::BackTab => app.prev_menu(now),

        // Direct menu access
        KeyCode::F(1) => app.open(Menu::Topics, now),
        KeyCode::F(2) => app.open(Menu::Services, now),
        KeyCode::F(3) => app.open(Menu::Tf, now),

        KeyCode::Esc => app.go_back(),

        _ => {
            if let Some(input) = nav_input(key) {
                app.handle_nav(input, now);
            }
        }
    }
}

/// Translate a key into list navigation, if it is one
pub fn nav_input(key: KeyEvent) -> Option<NavInput> {
    let input = match key.code {
        KeyCode::Up => NavInput::Up,
        KeyCode::Down => NavInput::Down,
        KeyCode::PageUp => NavInput::PageUp,
        KeyCode::PageDown => NavInput::PageDown,
        KeyCode::Home => NavInput::Home,
        KeyCode::End => NavInput::End,
        KeyCode::Enter => NavInput::Activate,
        KeyCode::Char(' ') => NavInput::Toggle,
        KeyCode::Backspace => NavInput::Backspace,
        KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
            NavInput::Char(c)
        }
        _ => return None,
    };
    Some(input)
}

/// Scroll wheel moves the selection
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent, now: Instant) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.handle_nav(NavInput::Up, now),
        MouseEventKind::ScrollDown => app.handle_nav(NavInput::Down, now),
        _ => {}
    }
}
