//! Theme system for the TUI.
//!
//! Provides semantic color roles that map to ratatui `Style` values.
//! The `ThemeVariant` enum selects between Dark and Light palettes,
//! and `StyleMap` resolves role names to concrete styles.

use ratatui::style::{Color, Modifier, Style};
use std::collections::HashMap;

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
    /// Parse a variant name from a string (case-insensitive).
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    pub fn palette(self) -> ColorPalette {
        match self {
            Self::Dark => ColorPalette::dark(),
            Self::Light => ColorPalette::light(),
        }
    }

    /// Dark → Light → Dark.
    pub fn next(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

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

/// One `Style` per semantic UI role.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    // -- Category sidebar --
    pub category_normal: Style,
    pub category_cursor: Style,
    pub category_active: Style,
    pub category_refreshing: Style,

    // -- Article cards --
    pub article_headline: Style,
    pub article_meta: Style,
    pub article_summary: Style,
    pub article_link: Style,
    pub article_cursor: Style,
    pub article_placeholder: Style,

    // -- Pager --
    pub pager_current: Style,
    pub pager_other: Style,

    // -- Chrome --
    pub error_banner: Style,
    pub input_active: Style,
    pub input_idle: Style,
    pub status_bar: Style,
    pub panel_border: Style,
    pub panel_border_focused: Style,
}

impl ColorPalette {
    fn dark() -> Self {
        Self {
            category_normal: Style::default().fg(Color::Gray),
            category_cursor: Style::default().bg(Color::DarkGray).fg(Color::White),
            category_active: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            category_refreshing: Style::default().fg(Color::Yellow),

            article_headline: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            article_meta: Style::default().fg(Color::DarkGray),
            article_summary: Style::default(),
            article_link: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::UNDERLINED),
            article_cursor: Style::default().bg(Color::Rgb(40, 40, 40)),
            article_placeholder: Style::default().fg(Color::DarkGray),

            pager_current: Style::default().bg(Color::Blue).fg(Color::White),
            pager_other: Style::default().fg(Color::Gray),

            error_banner: Style::default().fg(Color::Red),
            input_active: Style::default().fg(Color::Yellow),
            input_idle: Style::default().fg(Color::DarkGray),
            status_bar: Style::default().bg(Color::DarkGray).fg(Color::White),
            panel_border: Style::default(),
            panel_border_focused: Style::default().fg(Color::Cyan),
        }
    }

    fn light() -> Self {
        Self {
            category_normal: Style::default().fg(Color::Black),
            category_cursor: Style::default().bg(Color::Blue).fg(Color::White),
            category_active: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            category_refreshing: Style::default().fg(Color::Magenta),

            article_headline: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            article_meta: Style::default().fg(Color::DarkGray),
            article_summary: Style::default().fg(Color::Black),
            article_link: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::UNDERLINED),
            article_cursor: Style::default().bg(Color::Rgb(225, 230, 240)),
            article_placeholder: Style::default().fg(Color::DarkGray),

            pager_current: Style::default().bg(Color::Blue).fg(Color::White),
            pager_other: Style::default().fg(Color::DarkGray),

            error_banner: Style::default().fg(Color::Red),
            input_active: Style::default().fg(Color::Magenta),
            input_idle: Style::default().fg(Color::DarkGray),
            status_bar: Style::default().bg(Color::White).fg(Color::Black),
            panel_border: Style::default().fg(Color::DarkGray),
            panel_border_focused: Style::default().fg(Color::Blue),
        }
    }
}

// ============================================================================
// Style Map
// ============================================================================

/// String-keyed style lookup so render code names roles, not colors.
#[derive(Debug, Clone)]
pub struct StyleMap {
    map: HashMap<&'static str, Style>,
}

const ROLE_NAMES: [&str; 18] = [
    "category_normal",
    "category_cursor",
    "category_active",
    "category_refreshing",
    "article_headline",
    "article_meta",
    "article_summary",
    "article_link",
    "article_cursor",
    "article_placeholder",
    "pager_current",
    "pager_other",
    "error_banner",
    "input_active",
    "input_idle",
    "status_bar",
    "panel_border",
    "panel_border_focused",
];

impl StyleMap {
    pub fn from_palette(p: &ColorPalette) -> Self {
        let styles: [Style; 18] = [
            p.category_normal,
            p.category_cursor,
            p.category_active,
            p.category_refreshing,
            p.article_headline,
            p.article_meta,
            p.article_summary,
            p.article_link,
            p.article_cursor,
            p.article_placeholder,
            p.pager_current,
            p.pager_other,
            p.error_banner,
            p.input_active,
            p.input_idle,
            p.status_bar,
            p.panel_border,
            p.panel_border_focused,
        ];

        let map = ROLE_NAMES.iter().copied().zip(styles).collect();
        Self { map }
    }

    /// Resolve a role name. Unknown roles get `Style::default()`.
    pub fn resolve(&self, role: &str) -> Style {
        self.map.get(role).copied().unwrap_or_default()
    }
}
