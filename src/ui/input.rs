//! Keyboard input handling.
//!
//! Input is routed by mode, most-modal first: compose dialog, then detail
//! overlay, then the search prompt, then the browse list. Only the browse
//! handler can quit the application.

use super::helpers::{spawn_create_story, spawn_detail_fetch, spawn_like, spawn_load_stories};
use super::loop_runner::Action;
use crate::app::{App, AppEvent, ComposeState, DetailState, LoadState};
use crate::util::{validate_url_for_open, MAX_QUERY_LENGTH};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;

/// Longest accepted story title in the compose dialog.
const MAX_TITLE_LENGTH: usize = 200;

pub(super) fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    // Ctrl+C always quits, regardless of mode
    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        return Ok(Action::Quit);
    }

    if app.compose.is_some() {
        handle_compose_input(app, code, event_tx);
        return Ok(Action::Continue);
    }
    if app.detail.is_open() {
        handle_detail_input(app, code, event_tx);
        return Ok(Action::Continue);
    }
    if app.search_mode {
        handle_search_input(app, code);
        return Ok(Action::Continue);
    }
    handle_browse_input(app, code, event_tx)
}

// ============================================================================
// Browse Mode
// ============================================================================

fn handle_browse_input(
    app: &mut App,
    code: KeyCode,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    match code {
        KeyCode::Char('q') => return Ok(Action::Quit),

        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_prev(),

        KeyCode::Enter => {
            if let Some(story) = app.selected_story() {
                let id = story.id.clone();
                spawn_detail_fetch(app, &id, event_tx);
            }
        }

        KeyCode::Char('l') | KeyCode::Char(' ') => {
            if let Some(story) = app.selected_story() {
                let id = story.id.clone();
                spawn_like(app, &id, event_tx);
            }
        }

        KeyCode::Char('/') => {
            app.search_mode = true;
            app.needs_redraw = true;
        }

        KeyCode::Char('n') => app.open_compose(),

        KeyCode::Char('r') => {
            // The collection is fetched once; 'r' only retries a failed load
            if matches!(app.load_state, LoadState::Failed(_)) {
                spawn_load_stories(app, event_tx);
            }
        }

        KeyCode::Char('t') => {
            let name = app.cycle_theme();
            app.set_status(format!("Theme: {}", name));
        }

        _ => {}
    }
    Ok(Action::Continue)
}

// ============================================================================
// Search Prompt
// ============================================================================

fn handle_search_input(app: &mut App, code: KeyCode) {
    match code {
        // Esc clears the query as it leaves the prompt; Enter keeps the
        // query applied to the list.
        KeyCode::Esc => {
            app.search_mode = false;
            app.set_query(String::new());
        }
        KeyCode::Enter => {
            app.search_mode = false;
            app.needs_redraw = true;
        }
        KeyCode::Backspace => {
            let mut query = app.query.clone();
            query.pop();
            app.set_query(query);
        }
        KeyCode::Char(c) => {
            if app.query.len() < MAX_QUERY_LENGTH {
                let mut query = app.query.clone();
                query.push(c);
                app.set_query(query);
            }
        }
        _ => {}
    }
}

// ============================================================================
// Detail Overlay
// ============================================================================

fn handle_detail_input(app: &mut App, code: KeyCode, event_tx: &mpsc::Sender<AppEvent>) {
    match code {
        KeyCode::Esc | KeyCode::Char('q') => app.close_detail(),

        KeyCode::Char('j') | KeyCode::Down => {
            app.detail_scroll = app.detail_scroll.saturating_add(1);
            app.needs_redraw = true;
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.detail_scroll = app.detail_scroll.saturating_sub(1);
            app.needs_redraw = true;
        }

        KeyCode::Char('l') | KeyCode::Char(' ') => {
            if let DetailState::Loaded { story } = &app.detail {
                let id = story.id.clone();
                spawn_like(app, &id, event_tx);
            }
        }

        KeyCode::Char('o') => {
            if let DetailState::Loaded { story } = &app.detail {
                if story.image_url.is_empty() {
                    app.set_status("No image for this story");
                } else {
                    match validate_url_for_open(&story.image_url) {
                        Ok(url) => {
                            if let Err(e) = open::that(url.as_str()) {
                                app.set_status(format!("Failed to open browser: {}", e));
                            }
                        }
                        Err(msg) => app.set_status(msg),
                    }
                }
            }
        }

        KeyCode::Char('r') => {
            // Retry a failed detail load without closing the overlay
            if let DetailState::Failed { story_id, .. } = &app.detail {
                let id = story_id.clone();
                spawn_detail_fetch(app, &id, event_tx);
            }
        }

        _ => {}
    }
}

// ============================================================================
// Compose Dialog
// ============================================================================

fn handle_compose_input(app: &mut App, code: KeyCode, event_tx: &mpsc::Sender<AppEvent>) {
    // Clone out of the state machine so the arms can mutate `app` freely
    let Some(state) = app.compose.clone() else {
        return;
    };

    match state {
        ComposeState::Input { mut title } => match code {
            KeyCode::Esc => app.close_compose(),
            KeyCode::Enter => {
                if title.trim().is_empty() {
                    app.set_status("Story title must not be empty");
                } else {
                    let title = title.trim().to_string();
                    spawn_create_story(app, title, event_tx);
                }
            }
            KeyCode::Backspace => {
                title.pop();
                app.compose = Some(ComposeState::Input { title });
                app.needs_redraw = true;
            }
            KeyCode::Char(c) => {
                if title.len() < MAX_TITLE_LENGTH {
                    title.push(c);
                    app.compose = Some(ComposeState::Input { title });
                    app.needs_redraw = true;
                }
            }
            _ => {}
        },
        // Input is locked while the submission is in flight; the server's
        // answer decides whether the dialog closes or reopens.
        ComposeState::Submitting { .. } => {}
    }
}

// ============================================================================
// Tests
// ============================================================================
