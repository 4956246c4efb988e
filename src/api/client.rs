use super::error::ApiError;
use super::types::{Article, Category};
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;
use url::Url;

/// Category name meaning "no filter": served by the all-articles endpoint.
pub const SENTINEL_CATEGORY: &str = "general";

/// Default route that triggers backend fetch + summarize for a category.
pub const DEFAULT_PROCESS_PATH: &str = "/news/process";

pub(crate) const MAX_RESPONSE_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// The remote article service.
///
/// Implemented over HTTP by [`HttpArticleService`]; tests substitute fakes.
pub trait ArticleService: Send + Sync + 'static {
    fn list_categories(&self) -> impl Future<Output = Result<Vec<Category>, ApiError>> + Send;

    /// Articles for `category`, or every article for [`SENTINEL_CATEGORY`].
    fn list_articles(
        &self,
        category: &str,
    ) -> impl Future<Output = Result<Vec<Article>, ApiError>> + Send;

    /// Ask the backend to (re)collect and process a category. The response
    /// body is not used.
    fn trigger_processing(&self, category: &str)
        -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// [`ArticleService`] backed by the news backend's REST API.
#[derive(Clone)]
pub struct HttpArticleService {
    client: reqwest::Client,
    base_url: Url,
    process_path: String,
}

impl HttpArticleService {
    pub fn new(client: reqwest::Client, base_url: Url) -> Self {
        Self {
            client,
            base_url,
            process_path: DEFAULT_PROCESS_PATH.to_string(),
        }
    }

    /// Use an alternative processing route (e.g. a "process and store" variant).
    pub fn with_process_path(mut self, path: impl Into<String>) -> Self {
        self.process_path = path.into();
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build `base + path segments`, percent-encoding each segment.
    ///
    /// A trailing empty segment yields a trailing slash (`/articles/`).
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| ApiError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }

    fn process_endpoint(&self, category: &str) -> Result<Url, ApiError> {
        let mut segments: Vec<&str> = self
            .process_path
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();
        segments.push(category);
        self.endpoint(&segments)
    }

    async fn get_bytes(&self, url: Url) -> Result<Vec<u8>, ApiError> {
        tracing::debug!(url = %url, "GET");
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        let body = read_limited_body(response, MAX_RESPONSE_SIZE).await;

        if !status.is_success() {
            // A truncated or unreadable error body still yields a structured failure.
            let body = body.unwrap_or_default();
            let err = ApiError::from_response_body(status.as_u16(), &body);
            tracing::warn!(url = %url, status = status.as_u16(), error = %err, "Request failed");
            return Err(err);
        }

        body
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let body = self.get_bytes(url).await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

impl ArticleService for HttpArticleService {
    async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        let url = self.endpoint(&["articles", "categories"])?;
        self.get_json(url).await
    }

    async fn list_articles(&self, category: &str) -> Result<Vec<Article>, ApiError> {
        let url = if category == SENTINEL_CATEGORY {
            self.endpoint(&["articles", ""])?
        } else {
            self.endpoint(&["articles", "by-category", category])?
        };
        self.get_json(url).await
    }

    async fn trigger_processing(&self, category: &str) -> Result<(), ApiError> {
        let url = self.process_endpoint(category)?;
        let started = std::time::Instant::now();
        self.get_bytes(url).await?;
        tracing::info!(
            category,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Backend processing finished"
        );
        Ok(())
    }
}

/// Build the shared HTTP client.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, ApiError> {
    Ok(reqwest::Client::builder()
        .pool_max_idle_per_host(4)
        .pool_idle_timeout(Duration::from_secs(30))
        .tcp_keepalive(Duration::from_secs(60))
        .timeout(timeout)
        .user_agent(concat!("newsman/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

pub(crate) async fn read_limited_body(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, ApiError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(ApiError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(ApiError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
