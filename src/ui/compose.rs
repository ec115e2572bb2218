//! New-story dialog overlay.

use super::helpers::{centered_rect, spinner_frame};
use crate::app::{App, ComposeState};
use ratatui::{
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

pub(super) fn render(f: &mut Frame, app: &App) {
    let Some(state) = &app.compose else { return };

    let area = centered_rect(60, 24, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.panel_border_focused)
        .title(" New Story ");

    let lines = match state {
        ComposeState::Input { title } => vec![
            Line::from(""),
            Line::from(vec![
                Span::styled("Title: ", app.theme.detail_metadata),
                Span::raw(title.clone()),
                Span::styled("█", app.theme.search_active),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                "[Enter] submit   [Esc] cancel",
                app.theme.detail_metadata,
            )),
        ],
        ComposeState::Submitting { title } => vec![
            Line::from(""),
            Line::from(vec![
                Span::styled(spinner_frame(app.spinner_frame), app.theme.loading),
                Span::raw(format!(" Submitting \"{}\"…", title)),
            ]),
        ],
    };

    f.render_widget(Paragraph::new(lines).block(block), area);
}
