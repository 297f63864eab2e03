use crate::actions::Action;
use crate::app::{AppMode, AppState, InputPurpose};
use crate::model::TraversalKind;
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

/// Waits up to `timeout` for a key press and maps it to an action. Resize
/// events need no action: the next frame measures the canvas again.
pub fn handle_events(app: &AppState, timeout: Duration) -> Result<Option<Action>> {
    if event::poll(timeout)? {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                return Ok(handle_key_event(app, key));
            }
        }
    }
    Ok(None)
}

pub fn handle_key_event(app: &AppState, key: KeyEvent) -> Option<Action> {
    match &app.mode {
        AppMode::Normal => handle_normal_mode(key),
        AppMode::Input { .. } => handle_input_mode(key),
        AppMode::Help => handle_help_mode(key),
    }
}

fn handle_normal_mode(key: KeyEvent) -> Option<Action> {
    use KeyCode::*;

    match (key.code, key.modifiers) {
        (Char('q'), KeyModifiers::NONE) => Some(Action::Quit),
        (Char('c'), KeyModifiers::CONTROL) => Some(Action::Quit),

        // Tree service
        (Char('i'), KeyModifiers::NONE) => Some(Action::StartInput(InputPurpose::Insert)),
        (Char('d'), KeyModifiers::NONE) => Some(Action::StartInput(InputPurpose::Delete)),
        (Char('m'), KeyModifiers::NONE) => Some(Action::StartInput(InputPurpose::Degree)),
        (Char('c'), KeyModifiers::NONE) => Some(Action::ClearTree),
        (Char('t'), KeyModifiers::NONE) => Some(Action::CycleTreeType),
        (Char('x'), KeyModifiers::NONE) => Some(Action::ToggleMirror),
        (Char('1'), KeyModifiers::NONE) => Some(Action::Traversal(TraversalKind::InOrder)),
        (Char('2'), KeyModifiers::NONE) => Some(Action::Traversal(TraversalKind::PreOrder)),
        (Char('3'), KeyModifiers::NONE) => Some(Action::Traversal(TraversalKind::PostOrder)),
        (Char('4'), KeyModifiers::NONE) => Some(Action::Traversal(TraversalKind::BreadthFirst)),
        (Char('n'), KeyModifiers::NONE) => Some(Action::ShowInfo),
        (Char('r'), KeyModifiers::NONE) => Some(Action::Refresh),

        // Viewport
        (Char('h'), KeyModifiers::NONE) | (Left, _) => Some(Action::Pan { dx: -1.0, dy: 0.0 }),
        (Char('j'), KeyModifiers::NONE) | (Down, _) => Some(Action::Pan { dx: 0.0, dy: 1.0 }),
        (Char('k'), KeyModifiers::NONE) | (Up, _) => Some(Action::Pan { dx: 0.0, dy: -1.0 }),
        (Char('l'), KeyModifiers::NONE) | (Right, _) => Some(Action::Pan { dx: 1.0, dy: 0.0 }),
        (Char('+'), _) | (Char('='), KeyModifiers::NONE) => Some(Action::ZoomIn),
        (Char('-'), KeyModifiers::NONE) => Some(Action::ZoomOut),
        (Char('0'), KeyModifiers::NONE) => Some(Action::ResetView),
        (Char('f'), KeyModifiers::NONE) => Some(Action::FitView),

        (Char('?'), _) => Some(Action::ShowHelp),

        _ => None,
    }
}

fn handle_input_mode(key: KeyEvent) -> Option<Action> {
    use KeyCode::*;

    match (key.code, key.modifiers) {
        (Esc, _) => Some(Action::CancelInput),
        (Enter, _) => Some(Action::ConfirmInput),
        (Backspace, _) => Some(Action::Backspace),
        (Char('c'), KeyModifiers::CONTROL) => Some(Action::CancelInput),
        (Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => Some(Action::TypeChar(c)),
        _ => None,
    }
}

fn handle_help_mode(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => Some(Action::CloseHelp),
        _ => None,
    }
}
