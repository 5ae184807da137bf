//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes. Forms own every printable key while they are
//! on screen, so global shortcuts there use function keys.

use crossterm::event::{KeyCode, KeyEvent};

use artfolio_core::Route;

use crate::app::{
    can_add_content_char, can_add_name_char, can_add_password_char, can_add_title_char, App,
    AppState, AuthField, EditField, PAGE_SCROLL_SIZE,
};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> bool {
    match app.state {
        AppState::ShowingHelp => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                app.state = AppState::Normal;
            }
            return false;
        }
        AppState::ConfirmingQuit => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    app.state = AppState::Quitting;
                    return true;
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.state = AppState::Normal;
                }
                _ => {}
            }
            return false;
        }
        AppState::ConfirmingDelete => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.confirm_delete(),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.state = AppState::Normal;
                }
                _ => {}
            }
            return false;
        }
        AppState::Quitting => return true,
        AppState::Normal => {}
    }

    // Any key dismisses the last status message
    app.status_message = None;

    match app.route() {
        Route::SignIn | Route::SignUp => handle_auth_input(app, key),
        Route::EditArtwork(_) => handle_edit_input(app, key),
        Route::Profile => handle_profile_input(app, key),
        Route::Gallery => handle_gallery_input(app, key),
        Route::Artwork(_) => handle_artwork_input(app, key),
    }
}

/// Keys shared by the browsing screens. Returns true if the key was used.
fn handle_global_input(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') => app.state = AppState::ConfirmingQuit,
        KeyCode::Char('?') => app.state = AppState::ShowingHelp,
        KeyCode::Char('g') => app.navigate(Route::Gallery),
        KeyCode::Char('p') => app.navigate(Route::Profile),
        KeyCode::Char('r') => app.refresh_current(),
        KeyCode::F(3) => app.sign_out(),
        _ => return false,
    }
    true
}

fn handle_gallery_input(app: &mut App, key: KeyEvent) -> bool {
    if handle_global_input(app, key) {
        return false;
    }
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.move_gallery_selection(-1),
        KeyCode::Down | KeyCode::Char('j') => app.move_gallery_selection(1),
        KeyCode::PageUp => app.move_gallery_selection(-(PAGE_SCROLL_SIZE as isize)),
        KeyCode::PageDown => app.move_gallery_selection(PAGE_SCROLL_SIZE as isize),
        KeyCode::Home => app.gallery_selection = 0,
        KeyCode::End => app.gallery_selection = app.artworks.len().saturating_sub(1),
        KeyCode::Enter => {
            if let Some(id) = app.selected_artwork().map(|a| a.id) {
                app.navigate(Route::Artwork(id));
            }
        }
        KeyCode::Esc => app.state = AppState::ConfirmingQuit,
        _ => {}
    }
    false
}

fn handle_artwork_input(app: &mut App, key: KeyEvent) -> bool {
    if handle_global_input(app, key) {
        return false;
    }
    let comment_count = app
        .detail
        .as_ref()
        .map(|d| d.detail.comments.len())
        .unwrap_or(0);
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            app.comment_scroll = app.comment_scroll.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.comment_scroll = (app.comment_scroll + 1).min(comment_count.saturating_sub(1));
        }
        KeyCode::Char('e') => match app.owned_detail().map(|a| a.id) {
            Some(id) => app.navigate(Route::EditArtwork(id)),
            None => {
                app.status_message = Some("You can only edit your own artworks".to_string());
            }
        },
        KeyCode::Char('d') => app.request_delete(),
        KeyCode::Esc | KeyCode::Backspace => app.navigate(Route::Gallery),
        _ => {}
    }
    false
}

fn handle_edit_input(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc => {
            if let Route::EditArtwork(id) = app.route() {
                app.navigate(Route::Artwork(id));
            }
        }
        KeyCode::Down | KeyCode::Tab => app.edit_focus = app.edit_focus.next(),
        KeyCode::Up | KeyCode::BackTab => app.edit_focus = app.edit_focus.prev(),
        KeyCode::Enter => {
            if app.edit_focus == EditField::Button {
                app.submit_edit();
            } else {
                app.edit_focus = app.edit_focus.next();
            }
        }
        KeyCode::Backspace => match app.edit_focus {
            EditField::Title => {
                app.edit_title.pop();
            }
            EditField::Content => {
                app.edit_content.pop();
            }
            EditField::Button => {}
        },
        KeyCode::Char(c) => match app.edit_focus {
            EditField::Title if can_add_title_char(app.edit_title.chars().count(), c) => {
                app.edit_title.push(c);
            }
            EditField::Content if can_add_content_char(app.edit_content.chars().count(), c) => {
                app.edit_content.push(c);
            }
            _ => {}
        },
        KeyCode::F(1) => app.state = AppState::ShowingHelp,
        _ => {}
    }
    false
}

fn handle_profile_input(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc => app.navigate(Route::Gallery),
        KeyCode::Enter => app.submit_profile(),
        KeyCode::F(3) => app.sign_out(),
        KeyCode::F(1) => app.state = AppState::ShowingHelp,
        KeyCode::Backspace => {
            app.profile_name.pop();
        }
        KeyCode::Char(c) => {
            if can_add_name_char(app.profile_name.chars().count(), c) {
                app.profile_name.push(c);
            }
        }
        _ => {}
    }
    false
}

fn handle_auth_input(app: &mut App, key: KeyEvent) -> bool {
    let mode = app.auth_mode;
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Quitting;
            return true;
        }
        KeyCode::F(2) => app.toggle_auth_mode(),
        KeyCode::Down | KeyCode::Tab => app.auth_focus = app.auth_focus.next(mode),
        KeyCode::Up | KeyCode::BackTab => app.auth_focus = app.auth_focus.prev(mode),
        KeyCode::Enter => {
            if app.auth_focus == AuthField::Button {
                app.submit_auth();
            } else {
                app.auth_focus = app.auth_focus.next(mode);
            }
        }
        KeyCode::Backspace => match app.auth_focus {
            AuthField::Name => {
                app.auth_name.pop();
            }
            AuthField::Username => {
                app.auth_username.pop();
            }
            AuthField::Password => {
                app.auth_password.pop();
            }
            AuthField::Button => {}
        },
        KeyCode::Char(c) => match app.auth_focus {
            AuthField::Name if can_add_name_char(app.auth_name.chars().count(), c) => {
                app.auth_name.push(c);
            }
            AuthField::Username if can_add_name_char(app.auth_username.chars().count(), c) => {
                app.auth_username.push(c);
            }
            AuthField::Password if can_add_password_char(app.auth_password.chars().count(), c) => {
                app.auth_password.push(c);
            }
            _ => {}
        },
        _ => {}
    }
    false
}
