//! Terminal user interface for the article browser.
//!
//! - `loop_runner` - main event loop and terminal management
//! - `input` - keyboard handling
//! - `events` - background events, browser changes, ticks
//! - `render` - layout, error banner, pager
//! - `categories` / `articles` / `status` - panel widgets
//! - `helpers` - panic-safe task spawning

mod articles;
mod categories;
mod events;
mod helpers;
mod input;
mod loop_runner;
mod render;
mod status;

pub use loop_runner::{run, Action};
