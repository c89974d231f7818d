//! Terminal input handling.

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};

use crate::app::App;
use crate::channel::RetryDecision;

/// Poll for a terminal event with a timeout.
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event.
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // Help overlay swallows the next key
    if app.show_help {
        app.show_help = false;
        return;
    }

    // A pending reconnect prompt is modal: only the decision keys count
    if app.prompt.is_some() {
        match key.code {
            KeyCode::Char('r') | KeyCode::Enter => app.answer_prompt(RetryDecision::Retry),
            KeyCode::Char('a') | KeyCode::Esc => app.answer_prompt(RetryDecision::Abandon),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),
        KeyCode::Char('t') => app.toggle_dark_mode(),
        KeyCode::Char('?') => app.toggle_help(),
        _ => {}
    }
}
