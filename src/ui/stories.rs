//! Story list widget.

use crate::app::App;
use crate::util::{display_width, truncate_to_width};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

/// Render the story list for the current filtered view.
pub(super) fn render(f: &mut Frame, app: &App, area: Rect) {
    let title = if app.query.trim().is_empty() {
        format!(" Stories ({}) ", app.filtered.len())
    } else {
        format!(" Stories ({}/{}) ", app.filtered.len(), app.stories.len())
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.panel_border_focused)
        .title(title);
    let inner_width = block.inner(area).width as usize;

    let items: Vec<ListItem> = app
        .filtered
        .iter()
        .map(|story| {
            let marker = if story.is_featured { "★ " } else { "  " };
            let likes = if app.like_in_flight(&story.id) {
                format!(" ♥ {}…", story.likes)
            } else {
                format!(" ♥ {}", story.likes)
            };
            let category = if story.category.is_empty() {
                String::new()
            } else {
                format!("  · {}", story.category)
            };

            // Title gets whatever width the fixed parts leave over
            let reserved = 2 + display_width(&likes) + display_width(&category);
            let title_width = inner_width.saturating_sub(reserved);

            let line = Line::from(vec![
                Span::styled(marker, app.theme.list_featured),
                Span::styled(
                    truncate_to_width(&story.title, title_width).into_owned(),
                    app.theme.list_normal,
                ),
                Span::styled(category, app.theme.list_category),
                Span::styled(likes, app.theme.list_likes),
            ]);
            ListItem::new(line)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(app.theme.list_selected);

    let mut state = ListState::default();
    if !app.filtered.is_empty() {
        state.select(Some(app.selected));
    }

    f.render_stateful_widget(list, area, &mut state);
}
