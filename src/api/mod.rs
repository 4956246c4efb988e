//! Client side of the news backend's article API.
//!
//! - [`client`] - the [`ArticleService`] trait and its reqwest implementation
//! - [`error`] - normalization of failed responses into [`ApiError`]
//! - [`types`] - `Article` / `Category` wire types and date formatting

mod client;
mod error;
mod types;

pub use client::{
    build_http_client, ArticleService, HttpArticleService, DEFAULT_PROCESS_PATH,
    SENTINEL_CATEGORY,
};
pub(crate) use client::{read_limited_body, MAX_RESPONSE_SIZE};
pub use error::{ApiError, REQUEST_FAILED_MESSAGE, STATUS_TOO_MANY_REQUESTS, UNKNOWN_ERROR_MESSAGE};
pub use types::{format_published_date, Article, Category, RecordId, DATE_FALLBACK};
