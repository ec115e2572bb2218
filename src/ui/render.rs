//! Top-level rendering dispatch.

use super::helpers::spinner_frame;
use super::{compose, detail, status, stories};
use crate::app::{App, LoadState};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub(super) fn render(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // search bar
            Constraint::Min(1),    // story list / load state
            Constraint::Length(1), // status bar
        ])
        .split(f.area());

    render_search_bar(f, app, chunks[0]);

    match &app.load_state {
        LoadState::Loading => render_loading(f, app, chunks[1]),
        LoadState::Failed(message) => render_load_failed(f, app, chunks[1], message),
        LoadState::Ready => {
            if app.filtered.is_empty() {
                render_empty(f, app, chunks[1]);
            } else {
                stories::render(f, app, chunks[1]);
            }
        }
    }

    status::render(f, app, chunks[2]);

    // Overlays render last, over the list
    if app.detail.is_open() {
        detail::render(f, app);
    }
    if app.compose.is_some() {
        compose::render(f, app);
    }
}

fn render_search_bar(f: &mut Frame, app: &App, area: Rect) {
    let style = if app.search_mode {
        app.theme.search_active
    } else {
        app.theme.search_inactive
    };

    let content = if app.search_mode {
        Line::from(vec![
            Span::raw(app.query.clone()),
            Span::styled("█", app.theme.search_active),
        ])
    } else if app.query.is_empty() {
        Line::from(Span::styled(
            "Search by title or category… press / to search",
            app.theme.search_inactive,
        ))
    } else {
        Line::from(Span::raw(app.query.clone()))
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(style)
        .title(" Search ");
    f.render_widget(Paragraph::new(content).block(block), area);
}

fn render_loading(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.panel_border)
        .title(" Stories ");
    let line = Line::from(vec![
        Span::styled(spinner_frame(app.spinner_frame), app.theme.loading),
        Span::raw(" Loading impact stories…"),
    ]);
    f.render_widget(Paragraph::new(line).block(block), area);
}

fn render_load_failed(f: &mut Frame, app: &App, area: Rect, message: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.error)
        .title(" Stories ");
    let lines = vec![
        Line::from(Span::styled(
            "Failed to load stories. Please try again later.",
            app.theme.error,
        )),
        Line::from(""),
        Line::from(Span::raw(message.to_string())),
        Line::from(""),
        Line::from(Span::styled("[r] try again", app.theme.detail_metadata)),
    ];
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_empty(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.panel_border)
        .title(" Stories ");
    let message = if app.query.trim().is_empty() {
        "No stories yet."
    } else {
        "No stories found matching your search."
    };
    let lines = vec![Line::from(Span::styled(message, app.theme.detail_metadata))];
    f.render_widget(Paragraph::new(lines).block(block), area);
}
