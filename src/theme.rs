//! Theme system for the TUI.
//!
//! Semantic color roles mapped to ratatui `Style` values. `ThemeVariant`
//! selects between Dark and Light palettes; the active `ColorPalette` is
//! held on the `App` and swapped wholesale when the theme changes.

use ratatui::style::{Color, Modifier, Style};

// ============================================================================
// Theme Variant
// ============================================================================

/// Available theme variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeVariant {
    Dark,
    Light,
}

impl ThemeVariant {
    /// Parse a variant name from a config string (case-insensitive).
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    /// Build the `ColorPalette` for this variant.
    pub fn palette(self) -> ColorPalette {
        match self {
            Self::Dark => ColorPalette::dark(),
            Self::Light => ColorPalette::light(),
        }
    }

    /// Cycle to the next variant: Dark → Light → Dark.
    pub fn next(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    /// Human-readable name for status display.
    pub fn name(self) -> &'static str {
        match self {
            Self::Dark => "Dark",
            Self::Light => "Light",
        }
    }
}

// ============================================================================
// Color Palette
// ============================================================================

/// A complete palette mapping every semantic UI role to a `Style`.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    // -- Story list --
    pub list_normal: Style,
    pub list_selected: Style,
    pub list_featured: Style,
    pub list_likes: Style,
    pub list_category: Style,

    // -- Search bar --
    pub search_active: Style,
    pub search_inactive: Style,

    // -- Detail overlay --
    pub detail_title: Style,
    pub detail_body: Style,
    pub detail_metadata: Style,
    pub detail_error: Style,

    // -- Chrome --
    pub status_bar: Style,
    pub panel_border: Style,
    pub panel_border_focused: Style,
    pub loading: Style,
    pub error: Style,
}

impl ColorPalette {
    fn dark() -> Self {
        Self {
            list_normal: Style::default(),
            list_selected: Style::default().bg(Color::DarkGray).fg(Color::White),
            list_featured: Style::default().fg(Color::Yellow),
            list_likes: Style::default().fg(Color::Magenta),
            list_category: Style::default().fg(Color::Cyan),

            search_active: Style::default().fg(Color::Yellow),
            search_inactive: Style::default().fg(Color::DarkGray),

            detail_title: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            detail_body: Style::default(),
            detail_metadata: Style::default().fg(Color::DarkGray),
            detail_error: Style::default().fg(Color::Red),

            status_bar: Style::default().bg(Color::DarkGray).fg(Color::White),
            panel_border: Style::default(),
            panel_border_focused: Style::default().fg(Color::Cyan),
            loading: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),
        }
    }

    fn light() -> Self {
        Self {
            list_normal: Style::default().fg(Color::Black),
            list_selected: Style::default().bg(Color::Blue).fg(Color::White),
            list_featured: Style::default().fg(Color::Rgb(180, 120, 0)),
            list_likes: Style::default().fg(Color::Rgb(160, 30, 120)),
            list_category: Style::default().fg(Color::Rgb(0, 95, 135)),

            search_active: Style::default().fg(Color::Rgb(180, 120, 0)),
            search_inactive: Style::default().fg(Color::Gray),

            detail_title: Style::default()
                .fg(Color::Rgb(0, 95, 135))
                .add_modifier(Modifier::BOLD),
            detail_body: Style::default().fg(Color::Black),
            detail_metadata: Style::default().fg(Color::Gray),
            detail_error: Style::default().fg(Color::Rgb(180, 0, 0)),

            status_bar: Style::default().bg(Color::Blue).fg(Color::White),
            panel_border: Style::default().fg(Color::Gray),
            panel_border_focused: Style::default().fg(Color::Blue),
            loading: Style::default().fg(Color::Rgb(180, 120, 0)),
            error: Style::default().fg(Color::Rgb(180, 0, 0)),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
