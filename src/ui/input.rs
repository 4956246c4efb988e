//! Input handling for the TUI.
//!
//! Browser operations are spawned rather than awaited so the loop keeps
//! drawing while requests are in flight.

use crate::app::{App, AppEvent, Focus, InputMode};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use newsman::api::SENTINEL_CATEGORY;
use newsman::auth::AuthError;
use newsman::util::validate_url_for_open;
use tokio::sync::mpsc;

use super::helpers::spawn_browser_task;
use super::Action;

const ERR_ARTICLE_NO_URL: &str = "Article has no URL";

/// Main input dispatch function.
pub(super) async fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        return Ok(Action::Quit);
    }

    match app.input_mode {
        InputMode::AddCategory => {
            handle_add_category_input(app, code, event_tx);
            Ok(Action::Continue)
        }
        InputMode::Normal => handle_browse_input(app, code, event_tx),
    }
}

fn handle_browse_input(
    app: &mut App,
    code: KeyCode,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    match code {
        KeyCode::Char('q') => return Ok(Action::Quit),
        KeyCode::Char('j') | KeyCode::Down => app.nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.nav_up(),
        KeyCode::Tab => app.toggle_focus(),
        KeyCode::Enter => select_category_at_cursor(app, event_tx),
        KeyCode::Char('r') => refresh_category(app, event_tx),
        KeyCode::Char('a') => {
            app.input_mode = InputMode::AddCategory;
            app.needs_redraw = true;
        }
        KeyCode::Char('n') | KeyCode::Right => {
            let next = app.view.page + 1;
            go_to_page(app, next);
        }
        KeyCode::Char('p') | KeyCode::Left => {
            let prev = app.view.page.saturating_sub(1);
            go_to_page(app, prev);
        }
        KeyCode::Char('o') => open_article(app),
        KeyCode::Char('t') => {
            let name = app.cycle_theme();
            app.set_status(format!("Theme: {}", name));
        }
        KeyCode::Char('L') => sign_out(app, event_tx),
        _ => {}
    }
    Ok(Action::Continue)
}

/// Keys while editing the new-category field.
///
/// The text lives in the browser state so it survives leaving the mode.
fn handle_add_category_input(app: &mut App, code: KeyCode, event_tx: &mpsc::Sender<AppEvent>) {
    match code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.needs_redraw = true;
        }
        KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
            let input = app.view.new_category_input.clone();
            if input.trim().is_empty() {
                return;
            }
            if app.view.refreshing.is_some() {
                app.set_status("Another refresh is in progress");
                return;
            }
            let browser = app.browser.clone();
            spawn_browser_task("add category", async move { browser.add_category(&input).await }, event_tx);
        }
        KeyCode::Backspace => {
            let mut input = app.view.new_category_input.clone();
            input.pop();
            app.browser.set_new_category_input(input);
        }
        KeyCode::Char(c) if !c.is_control() => {
            let mut input = app.view.new_category_input.clone();
            input.push(c);
            app.browser.set_new_category_input(input);
        }
        _ => {}
    }
    // Keep the snapshot current so the next keystroke builds on it
    app.sync_view();
}

fn select_category_at_cursor(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    if app.focus != Focus::Categories {
        return;
    }
    let category = app.category_at_cursor().to_string();
    app.article_cursor = 0;
    let browser = app.browser.clone();
    spawn_browser_task(
        "select category",
        async move { browser.select_category(&category).await },
        event_tx,
    );
}

/// Refresh the category under the cursor, or the selected one when the
/// article panel has focus. "All News" is not a category and is skipped.
fn refresh_category(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    if app.view.refreshing.is_some() {
        app.set_status("Another refresh is in progress");
        return;
    }
    let category = match app.focus {
        Focus::Categories => app.category_at_cursor().to_string(),
        Focus::Articles => app.view.selected_category.clone(),
    };
    if category == SENTINEL_CATEGORY {
        app.set_status("Select a category to refresh");
        return;
    }
    let browser = app.browser.clone();
    spawn_browser_task(
        "refresh category",
        async move { browser.refresh_category(&category).await },
        event_tx,
    );
}

/// Only pages the pager would offer are accepted.
fn go_to_page(app: &mut App, page: usize) {
    if page == 0 || page > app.view.page_count || page == app.view.page {
        return;
    }
    app.article_cursor = 0;
    app.browser.set_page(page);
    app.sync_view();
}

fn open_article(app: &mut App) {
    if app.focus != Focus::Articles {
        return;
    }
    let Some(url) = app.article_at_cursor().map(|a| a.source_url.clone()) else {
        return;
    };
    if url.is_empty() {
        app.set_status(ERR_ARTICLE_NO_URL);
        return;
    }
    if let Err(e) = validate_url_for_open(&url) {
        app.set_status(e.to_string());
    } else if let Err(e) = open::that(&url) {
        app.set_status(format!("Failed to open browser: {}", e));
    }
}

/// Forget the session now; revoke it on the server in the background.
fn sign_out(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    if !app.auth.is_enabled() {
        app.set_status("Sign-in is not configured");
        return;
    }
    match app.auth.sign_out_local() {
        Ok(Some(revoke)) => {
            app.set_status("Signed out");
            spawn_browser_task("sign out", revoke.run(), event_tx);
        }
        Ok(None) => app.set_status("Not signed in"),
        Err(AuthError::Io(e)) => app.set_status(format!("Failed to remove session: {}", e)),
        Err(e) => app.set_status(format!("Sign out failed: {}", e)),
    }
}
