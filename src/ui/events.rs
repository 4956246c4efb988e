//! Application event handling.
//!
//! Browser results need no event: they are written into the browser state
//! and observed through its change subscription. What remains here is the
//! snapshot refresh and background failure reporting.

use crate::app::{App, AppEvent};

use super::helpers::SPINNER;

pub(super) fn handle_app_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::TaskPanicked { task, error } => {
            tracing::error!(task, error, "Background task panicked");
            app.set_status(format!("Internal error in {} task", task));
        }
    }
}

/// The browser state changed: take a fresh snapshot.
pub(super) fn handle_browser_changed(app: &mut App) {
    let had_error = app.view.error.clone();
    app.sync_view();
    if app.view.error != had_error {
        if let Some(error) = &app.view.error {
            tracing::debug!(error = %error, "Browser error shown");
        }
    }
}

/// Periodic tick: expire status text and animate the spinner.
pub(super) fn handle_tick(app: &mut App) {
    if app.clear_expired_status() {
        app.needs_redraw = true;
    }
    if app.is_busy() {
        app.spinner_frame = (app.spinner_frame + 1) % SPINNER.len();
        app.needs_redraw = true;
    }
}
