use crate::theme::{StyleMap, ThemeVariant};
use newsman::api::{Article, HttpArticleService, SENTINEL_CATEGORY};
use newsman::auth::AuthContext;
use newsman::browser::{ArticleBrowser, BrowserView};
use ratatui::style::Style;
use std::borrow::Cow;
use tokio::time::Instant;

/// Browser backed by the real HTTP service.
pub type Browser = ArticleBrowser<HttpArticleService>;

/// How long a status message stays in the status bar.
const STATUS_TTL_SECS: u64 = 4;

// ============================================================================
// Focus and Mode Enums
// ============================================================================

/// Which panel has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Categories,
    Articles,
}

/// Whether keystrokes drive navigation or edit the add-category field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    AddCategory,
}

/// Events from background tasks.
pub enum AppEvent {
    /// A spawned browser operation panicked.
    TaskPanicked { task: &'static str, error: String },
}

// ============================================================================
// Application State
// ============================================================================

/// TUI state: the browser handle, the auth context it was given, and
/// purely presentational state (cursor, focus, theme, status line).
pub struct App {
    pub browser: Browser,
    pub auth: AuthContext,

    /// Last snapshot read from the browser; refreshed on every state change.
    pub view: BrowserView,

    pub focus: Focus,
    pub input_mode: InputMode,
    /// Cursor in the category sidebar. Row 0 is "All News".
    pub category_cursor: usize,
    /// Cursor within the visible page of articles.
    pub article_cursor: usize,

    pub theme_variant: ThemeVariant,
    pub theme: StyleMap,

    pub status_message: Option<(Cow<'static, str>, Instant)>,
    pub needs_redraw: bool,
    pub spinner_frame: usize,
}

impl App {
    pub fn new(browser: Browser, auth: AuthContext, theme_variant: ThemeVariant) -> Self {
        let view = browser.view();
        Self {
            browser,
            auth,
            view,
            focus: Focus::Categories,
            input_mode: InputMode::Normal,
            category_cursor: 0,
            article_cursor: 0,
            theme_variant,
            theme: StyleMap::from_palette(&theme_variant.palette()),
            status_message: None,
            needs_redraw: true,
            spinner_frame: 0,
        }
    }

    pub fn style(&self, role: &str) -> Style {
        self.theme.resolve(role)
    }

    /// Cycle Dark → Light and return the new theme's name.
    pub fn cycle_theme(&mut self) -> &'static str {
        self.theme_variant = self.theme_variant.next();
        self.theme = StyleMap::from_palette(&self.theme_variant.palette());
        self.needs_redraw = true;
        self.theme_variant.name()
    }

    /// Re-read the browser state and keep cursors in range.
    pub fn sync_view(&mut self) {
        self.view = self.browser.view();
        self.clamp_cursors();
        self.needs_redraw = true;
    }

    pub fn clamp_cursors(&mut self) {
        // +1 for the "All News" row
        let rows = self.view.categories.len() + 1;
        self.category_cursor = self.category_cursor.min(rows - 1);
        self.article_cursor = if self.view.visible_articles.is_empty() {
            0
        } else {
            self.article_cursor
                .min(self.view.visible_articles.len() - 1)
        };
    }

    /// Category name under the sidebar cursor (the sentinel for row 0).
    pub fn category_at_cursor(&self) -> &str {
        match self.category_cursor {
            0 => SENTINEL_CATEGORY,
            n => self
                .view
                .categories
                .get(n - 1)
                .map(|c| c.category_name.as_str())
                .unwrap_or(SENTINEL_CATEGORY),
        }
    }

    pub fn article_at_cursor(&self) -> Option<&Article> {
        self.view.visible_articles.get(self.article_cursor)
    }

    pub fn nav_down(&mut self) {
        match self.focus {
            Focus::Categories => {
                if self.category_cursor < self.view.categories.len() {
                    self.category_cursor += 1;
                }
            }
            Focus::Articles => {
                if self.article_cursor + 1 < self.view.visible_articles.len() {
                    self.article_cursor += 1;
                }
            }
        }
    }

    pub fn nav_up(&mut self) {
        match self.focus {
            Focus::Categories => self.category_cursor = self.category_cursor.saturating_sub(1),
            Focus::Articles => self.article_cursor = self.article_cursor.saturating_sub(1),
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Categories => Focus::Articles,
            Focus::Articles => Focus::Categories,
        };
    }

    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
        self.needs_redraw = true;
    }

    /// Drop an expired status message. Returns true if one was cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        match &self.status_message {
            Some((_, set_at)) if set_at.elapsed().as_secs() >= STATUS_TTL_SECS => {
                self.status_message = None;
                true
            }
            _ => false,
        }
    }

    /// Something is in flight, so the spinner should animate.
    pub fn is_busy(&self) -> bool {
        self.view.articles_loading || self.view.categories_loading || self.view.refreshing.is_some()
    }
}
