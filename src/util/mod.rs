//! Utility functions shared by the library and the TUI.
//!
//! - **URL validation**: service base URLs and article links before opening
//! - **Text processing**: control-character stripping, Unicode-aware
//!   truncation, and label casing for terminal rendering

mod text;
mod url_validator;

pub use text::{capitalize_first, display_width, strip_control_chars, truncate_to_width};
pub use url_validator::{validate_base_url, validate_url_for_open, UrlValidationError};
