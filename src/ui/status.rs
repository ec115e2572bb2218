//! Status bar widget.

use crate::app::App;
use ratatui::{layout::Rect, widgets::Paragraph, Frame};
use std::borrow::Cow;

/// Render the status bar: an expiring status message when one is set,
/// otherwise keybinding hints for the active mode.
pub(super) fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(msg.as_ref())
    } else if app.compose.is_some() {
        Cow::Borrowed("[Enter] submit | [Esc] cancel")
    } else if app.detail.is_open() {
        Cow::Borrowed("[l]ike [o]pen image [r]etry [j/k]scroll [Esc]close")
    } else if app.search_mode {
        Cow::Borrowed("Type to filter | ENTER keep | ESC clear")
    } else {
        Cow::Borrowed("[/]search [Enter]details [l]ike [n]ew story [t]heme [q]uit")
    };

    f.render_widget(Paragraph::new(text).style(app.theme.status_bar), area);
}
