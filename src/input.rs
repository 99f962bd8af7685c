//! Keyboard input handling.
//!
//! Maps terminal key events to [`App`] changes and, where the coordinator is
//! involved, to an [`Intent`] for the dispatcher.  Adding a new keybinding is
//! a single match arm in [`handle_key_event`].
//!
//! ## For contributors
//!
//! To add a new keybinding:
//!
//! 1. Add a method on [`App`] for the action (if one doesn't exist).
//! 2. Add a `KeyCode` match arm in [`handle_key_event`] that calls it.
//! 3. Update the help text in [`crate::ui`]'s status bar.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::app::App;
use crate::dispatch::Intent;

/// Process a single key event.  Returns the intent to dispatch, if any.
///
/// Only reacts to key-press events (ignoring release / repeat) so that each
/// physical keypress triggers exactly one action.
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> Option<Intent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    if app.picker.is_some() {
        return handle_picker_key(app, key.code);
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
        KeyCode::Home | KeyCode::Char('g') => app.select_first(),
        KeyCode::End | KeyCode::Char('G') => app.select_last(),
        KeyCode::Tab | KeyCode::Char('f') => app.open_picker(),
        KeyCode::Char('m') => return app.view_more(),
        KeyCode::Char(' ') => return app.toggle_approval(),
        KeyCode::Char('r') => return Some(Intent::Bootstrap),
        _ => {}
    }
    None
}

fn handle_picker_key(app: &mut App, code: KeyCode) -> Option<Intent> {
    match code {
        KeyCode::Down | KeyCode::Char('j') => app.picker_move(true),
        KeyCode::Up | KeyCode::Char('k') => app.picker_move(false),
        KeyCode::Enter => return app.confirm_picker(),
        KeyCode::Esc | KeyCode::Char('q') => return Some(app.cancel_picker()),
        _ => {}
    }
    None
}
