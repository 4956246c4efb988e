//! Helpers shared across the UI layer: panic-safe task spawning and the
//! spinner glyphs.

use crate::app::AppEvent;
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tokio::sync::mpsc;

/// Frames of the loading spinner, advanced on each tick while busy.
pub(super) const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Wraps a future to catch panics and convert them to errors.
///
/// Tokio would otherwise swallow a panicking task silently; this turns the
/// payload into a message the event loop can show.
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: Future<Output = T>,
{
    AssertUnwindSafe(future).catch_unwind().await.map_err(|panic| {
        if let Some(s) = panic.downcast_ref::<&'static str>() {
            s.to_string()
        } else if let Some(s) = panic.downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        }
    })
}

/// Run a browser operation in the background.
///
/// Results land in the browser's own state, which the loop picks up through
/// its change subscription; only a panic is reported back here.
pub(super) fn spawn_browser_task<F>(task: &'static str, future: F, event_tx: &mpsc::Sender<AppEvent>)
where
    F: Future<Output = ()> + Send + 'static,
{
    let tx = event_tx.clone();
    tokio::spawn(async move {
        if let Err(error) = catch_task_panic(future).await {
            tracing::error!(task, error = %error, "Task panicked");
            if let Err(e) = tx.send(AppEvent::TaskPanicked { task, error }).await {
                tracing::warn!(error = %e, "Failed to report panic (receiver dropped)");
            }
        }
    });
}
