//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{App, AppState, Tab, PAGE_SCROLL_SIZE};
use crate::models::{Field, UserDraft, ValidationError};

/// Maximum length for a form field value.
/// 64 chars covers names, emails, and websites without letting the form
/// overflow its fixed-width input boxes.
const MAX_FIELD_LENGTH: usize = 64;

/// What a key press did to a form
enum FormAction {
    None,
    Submit,
    Cancel,
}

/// Shared key handling for the create form and the edit modal.
fn handle_form_key(draft: &mut UserDraft, focus: &mut Field, key: KeyEvent) -> FormAction {
    match key.code {
        KeyCode::Enter => FormAction::Submit,
        KeyCode::Esc => FormAction::Cancel,
        KeyCode::Tab | KeyCode::Down => {
            *focus = focus.next();
            FormAction::None
        }
        KeyCode::BackTab | KeyCode::Up => {
            *focus = focus.prev();
            FormAction::None
        }
        KeyCode::Backspace => {
            draft.field_mut(*focus).pop();
            FormAction::None
        }
        KeyCode::Char(c) => {
            let value = draft.field_mut(*focus);
            if value.len() < MAX_FIELD_LENGTH {
                value.push(c);
            }
            FormAction::None
        }
        _ => FormAction::None,
    }
}

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.quit();
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    // Handle delete confirmation
    if matches!(app.state, AppState::ConfirmingDelete) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.confirm_delete();
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.cancel_delete();
            }
            _ => {}
        }
        return Ok(false);
    }

    // Handle edit modal
    if matches!(app.state, AppState::EditingUser) {
        return handle_edit_input(app, key);
    }

    // Handle search mode
    if matches!(app.state, AppState::Searching) {
        return handle_search_input(app, key);
    }

    // A failed read blocks the page; only retry and quit work
    if app.load_error.is_some() {
        match key.code {
            KeyCode::Char('r') => app.start_load(),
            KeyCode::Char('q') => app.state = AppState::ConfirmingQuit,
            _ => {}
        }
        return Ok(false);
    }

    match app.current_tab {
        Tab::Create => handle_create_input(app, key),
        Tab::Users => handle_users_input(app, key),
    }
}

fn handle_users_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
        }
        KeyCode::Char('1') => {
            app.current_tab = Tab::Users;
        }
        KeyCode::Char('2') => {
            app.current_tab = Tab::Create;
        }
        KeyCode::Tab => {
            app.current_tab = app.current_tab.next();
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.move_selection_up(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.move_selection_down(1);
        }
        KeyCode::PageUp => {
            app.move_selection_up(PAGE_SCROLL_SIZE);
        }
        KeyCode::PageDown => {
            app.move_selection_down(PAGE_SCROLL_SIZE);
        }
        KeyCode::Char('g') | KeyCode::Home => {
            app.select_first();
        }
        KeyCode::Char('G') | KeyCode::End => {
            app.select_last();
        }
        KeyCode::Char('/') => {
            app.state = AppState::Searching;
        }
        KeyCode::Char('s') => {
            app.cycle_sort_column();
        }
        KeyCode::Char('S') => {
            app.toggle_sort_direction();
        }
        KeyCode::Char('e') | KeyCode::Enter => {
            app.open_edit();
        }
        KeyCode::Char('d') => {
            app.request_delete();
        }
        KeyCode::Char('u') => {
            app.refresh();
        }
        KeyCode::Esc => {
            if !app.search_query.is_empty() {
                app.search_query.clear();
                app.selection = 0;
            }
        }
        _ => {}
    }
    Ok(false)
}

fn handle_create_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    let field = app.create_focus;
    let edited = matches!(key.code, KeyCode::Char(_) | KeyCode::Backspace);

    match handle_form_key(&mut app.create_form, &mut app.create_focus, key) {
        FormAction::Submit => app.submit_create(),
        FormAction::Cancel => app.current_tab = Tab::Users,
        FormAction::None => {}
    }

    // Editing a field clears its stale validation message
    if edited {
        clear_field_error(&mut app.create_errors, field);
    }

    Ok(false)
}

fn handle_edit_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    let field = app.edit_focus;
    let edited = matches!(key.code, KeyCode::Char(_) | KeyCode::Backspace);

    match handle_form_key(&mut app.edit_form, &mut app.edit_focus, key) {
        FormAction::Submit => app.submit_edit(),
        FormAction::Cancel => app.close_edit(),
        FormAction::None => {}
    }

    if edited {
        clear_field_error(&mut app.edit_errors, field);
    }

    Ok(false)
}

fn clear_field_error(errors: &mut Option<ValidationError>, field: Field) {
    if let Some(validation) = errors.as_mut() {
        validation.errors.retain(|(f, _)| *f != field);
        if validation.errors.is_empty() {
            *errors = None;
        }
    }
}

fn handle_search_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            app.search_query.clear();
            app.selection = 0;
            app.state = AppState::Normal;
        }
        KeyCode::Enter => {
            app.state = AppState::Normal;
        }
        KeyCode::Backspace => {
            app.search_query.pop();
            app.selection = 0;
        }
        KeyCode::Char(c) => {
            app.search_query.push(c);
            app.selection = 0;
        }
        _ => {}
    }
    Ok(false)
}
