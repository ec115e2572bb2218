//! Story detail overlay.
//!
//! The overlay opens the moment details are requested and never closes on
//! its own: a slow fetch shows a spinner, a failed fetch shows the error
//! with a retry hint. Only Esc dismisses it.

use super::helpers::{centered_rect, spinner_frame};
use crate::app::{App, DetailState};
use ratatui::{
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

pub(super) fn render(f: &mut Frame, app: &App) {
    let area = centered_rect(72, 80, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.panel_border_focused)
        .title(" Story ");

    let paragraph = match &app.detail {
        DetailState::Closed => return,

        DetailState::Loading { .. } => Paragraph::new(Line::from(vec![
            Span::styled(spinner_frame(app.spinner_frame), app.theme.loading),
            Span::raw(" Loading story…"),
        ])),

        DetailState::Failed { error, .. } => Paragraph::new(vec![
            Line::from(Span::styled("Failed to load story", app.theme.detail_error)),
            Line::from(""),
            Line::from(Span::styled(error.as_str(), app.theme.detail_body)),
            Line::from(""),
            Line::from(Span::styled("[r] retry   [Esc] close", app.theme.detail_metadata)),
        ]),

        DetailState::Loaded { story } => {
            let mut metadata = vec![Span::styled(
                story.category.clone(),
                app.theme.list_category,
            )];
            if story.is_featured {
                metadata.push(Span::raw("  "));
                metadata.push(Span::styled("★ featured", app.theme.list_featured));
            }
            metadata.push(Span::raw("  "));
            let likes = if app.like_in_flight(&story.id) {
                format!("♥ {}…", story.likes)
            } else {
                format!("♥ {}", story.likes)
            };
            metadata.push(Span::styled(likes, app.theme.list_likes));

            let mut lines = vec![
                Line::from(Span::styled(story.title.clone(), app.theme.detail_title)),
                Line::from(metadata),
                Line::from(""),
            ];
            if !story.summary.is_empty() {
                lines.push(Line::from(Span::styled(
                    story.summary.clone(),
                    app.theme.detail_metadata,
                )));
                lines.push(Line::from(""));
            }
            for text_line in story.description.lines() {
                lines.push(Line::from(Span::styled(
                    text_line.to_string(),
                    app.theme.detail_body,
                )));
            }
            if !story.image_url.is_empty() {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    format!("Image: {}", story.image_url),
                    app.theme.detail_metadata,
                )));
            }

            let scroll = app.detail_scroll.min(u16::MAX as usize) as u16;
            Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .scroll((scroll, 0))
        }
    };

    f.render_widget(paragraph.block(block), area);
}
