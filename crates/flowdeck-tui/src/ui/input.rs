//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use flowdeck_core::workflow::{can_add_description_char, can_add_name_char};

use crate::app::{can_add_token_char, App, AppState, FormFocus, PAGE_SCROLL_SIZE};

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match app.state {
        AppState::LoggingIn => Ok(handle_login_input(app, key)),
        AppState::CreatingApp => Ok(handle_form_input(app, key)),
        AppState::ShowingHelp => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                app.state = AppState::Normal;
            }
            Ok(false)
        }
        AppState::ConfirmingQuit => Ok(handle_quit_input(app, key)),
        AppState::Quitting => Ok(true),
        AppState::Normal => Ok(handle_dashboard_input(app, key)),
    }
}

fn handle_quit_input(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
            app.state = AppState::Quitting;
            true
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.state = AppState::Normal;
            false
        }
        _ => false,
    }
}

fn handle_dashboard_input(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') => app.state = AppState::ConfirmingQuit,
        KeyCode::Char('?') => app.state = AppState::ShowingHelp,
        KeyCode::Char('r') => app.refresh(),
        KeyCode::Char('n') => app.start_create(),
        KeyCode::Enter => app.open_selected_editor(),
        KeyCode::Char('o') => app.open_selected_overview(),
        KeyCode::Char('h') => app.open_platform_home(),
        KeyCode::Char('L') => app.logout(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(1),
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(1),
        KeyCode::PageDown => app.select_next(PAGE_SCROLL_SIZE),
        KeyCode::PageUp => app.select_prev(PAGE_SCROLL_SIZE),
        KeyCode::Home | KeyCode::Char('g') => app.selection = 0,
        KeyCode::End | KeyCode::Char('G') => app.select_last(),
        _ => {}
    }
    false
}

fn handle_login_input(app: &mut App, key: KeyEvent) -> bool {
    if key.code == KeyCode::Esc {
        app.state = AppState::Quitting;
        return true;
    }
    // The token stays fixed while it is being verified
    if app.login_pending {
        return false;
    }

    match key.code {
        KeyCode::Enter => app.attempt_login(),
        KeyCode::Backspace => {
            app.login_token.pop();
        }
        KeyCode::Char(c) => {
            if can_add_token_char(app.login_token.chars().count(), c) {
                app.login_token.push(c);
            }
        }
        _ => {}
    }
    false
}

fn handle_form_input(app: &mut App, key: KeyEvent) -> bool {
    // Everything, including Esc, waits for the pending create
    if app.is_submitting() {
        return false;
    }

    match key.code {
        KeyCode::Esc => app.cancel_create(),
        KeyCode::Tab | KeyCode::Down => app.form_focus = app.form_focus.next(),
        KeyCode::BackTab | KeyCode::Up => app.form_focus = app.form_focus.prev(),
        KeyCode::Enter => match app.form_focus {
            FormFocus::Submit => app.submit_create(),
            focus => app.form_focus = focus.next(),
        },
        KeyCode::Left | KeyCode::Right if app.form_focus == FormFocus::Mode => toggle_mode(app),
        KeyCode::Char(' ') if app.form_focus == FormFocus::Mode => toggle_mode(app),
        KeyCode::Backspace => {
            let focus = app.form_focus;
            if let Some(form) = app.controller.as_mut().map(|c| c.form_mut()) {
                match focus {
                    FormFocus::Name => {
                        form.name.pop();
                    }
                    FormFocus::Description => {
                        form.description.pop();
                    }
                    FormFocus::Mode | FormFocus::Submit => {}
                }
            }
        }
        KeyCode::Char(c) => {
            let focus = app.form_focus;
            if let Some(form) = app.controller.as_mut().map(|c| c.form_mut()) {
                match focus {
                    FormFocus::Name => {
                        if can_add_name_char(form.name.chars().count(), c) {
                            form.name.push(c);
                        }
                    }
                    FormFocus::Description => {
                        if can_add_description_char(form.description.chars().count(), c) {
                            form.description.push(c);
                        }
                    }
                    // Ignore character input on mode and button
                    FormFocus::Mode | FormFocus::Submit => {}
                }
            }
        }
        _ => {}
    }
    false
}

fn toggle_mode(app: &mut App) {
    if let Some(controller) = app.controller.as_mut() {
        let form = controller.form_mut();
        form.mode = form.mode.toggle();
    }
}
