//! newsman: a terminal client for a categorized news API.
//!
//! The library half holds everything that does not touch the terminal:
//!
//! - [`api`] - the remote article service and its error normalization
//! - [`browser`] - the article browser view-model (state, operations, pagination)
//! - [`auth`] - identity-service client, session storage, and the auth context
//! - [`config`] - config file and environment overrides
//! - [`util`] - URL validation and text helpers shared by the TUI

pub mod api;
pub mod auth;
pub mod browser;
pub mod config;
pub mod util;
