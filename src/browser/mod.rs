//! Article browser view-model.
//!
//! [`ArticleBrowser`] owns the [`BrowserState`] and runs the user operations
//! against an [`ArticleService`]. Operations are async and may run
//! concurrently; each one applies its mutations in short lock sections and
//! never holds the lock across an await, so a render surface always sees a
//! consistent snapshot.
//!
//! No request is ever cancelled and responses are not sequenced: if two
//! article fetches overlap, whichever resolves last wins, even if it was
//! issued first.

mod state;

pub use state::{page_count, page_slice, BrowserState, BrowserView, DEFAULT_PAGE_SIZE};

use crate::api::{ApiError, ArticleService, SENTINEL_CATEGORY};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;

/// Shown when the category list cannot be loaded.
pub const CATEGORIES_ERROR: &str = "Could not load categories. Please try refreshing the page.";

/// Cheap-to-clone handle; clones share state and service.
pub struct ArticleBrowser<S> {
    inner: Arc<Inner<S>>,
}

struct Inner<S> {
    service: S,
    state: Mutex<BrowserState>,
    page_size: usize,
    /// Bumped after every mutation so a render surface knows to redraw.
    revision: watch::Sender<u64>,
}

impl<S> Clone for ArticleBrowser<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: ArticleService> ArticleBrowser<S> {
    pub fn new(service: S, page_size: usize) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                service,
                state: Mutex::new(BrowserState::default()),
                page_size: page_size.max(1),
                revision,
            }),
        }
    }

    pub fn page_size(&self) -> usize {
        self.inner.page_size
    }

    /// Receiver that changes whenever the state does.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    /// Copy of the current state.
    pub fn state(&self) -> BrowserState {
        self.read(BrowserState::clone)
    }

    /// Render-ready snapshot, including the current page's articles.
    pub fn view(&self) -> BrowserView {
        self.read(|s| BrowserView::from_state(s, self.inner.page_size))
    }

    fn read<R>(&self, f: impl FnOnce(&BrowserState) -> R) -> R {
        let state = self.inner.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    fn update<R>(&self, f: impl FnOnce(&mut BrowserState) -> R) -> R {
        let result = {
            let mut state = self.inner.state.lock().unwrap_or_else(PoisonError::into_inner);
            f(&mut state)
        };
        self.inner.revision.send_modify(|rev| *rev = rev.wrapping_add(1));
        result
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Load categories and the unfiltered article list. The two requests run
    /// side by side and each applies its own result as soon as it lands.
    pub async fn initialize(&self) {
        tracing::debug!("Initializing article browser");
        tokio::join!(self.fetch_categories(), self.fetch_articles(SENTINEL_CATEGORY));
    }

    /// Select `name` and load its articles. The previous list stays visible
    /// until the fetch settles.
    pub async fn select_category(&self, name: &str) {
        self.update(|s| s.selected_category = name.to_string());
        self.fetch_articles(name).await;
    }

    /// Replace the article list with `category`'s articles.
    ///
    /// Success resets the page to 1. Failure empties the list but leaves the
    /// page number as it was.
    pub async fn fetch_articles(&self, category: &str) {
        self.update(|s| {
            s.error = None;
            s.articles_loading = true;
        });

        let result = self.inner.service.list_articles(category).await;

        self.update(|s| {
            match result {
                Ok(articles) => {
                    tracing::debug!(category, count = articles.len(), "Articles loaded");
                    s.articles = Arc::new(articles);
                    s.page = 1;
                }
                Err(e) => {
                    tracing::warn!(category, error = %e, "Error fetching articles");
                    s.error = Some(format!("Could not load articles for \"{category}\"."));
                    s.articles = Arc::new(Vec::new());
                }
            }
            s.articles_loading = false;
        });
    }

    /// Replace the category list. Failure leaves the current list untouched.
    pub async fn fetch_categories(&self) {
        self.update(|s| s.categories_loading = true);

        let result = self.inner.service.list_categories().await;

        self.update(|s| {
            match result {
                Ok(categories) => {
                    tracing::debug!(count = categories.len(), "Categories loaded");
                    s.categories = Arc::new(categories);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Error fetching categories");
                    s.error = Some(CATEGORIES_ERROR.to_string());
                }
            }
            s.categories_loading = false;
        });
    }

    /// Ask the backend to reprocess `category`, then reload whichever
    /// category is selected once processing finishes.
    ///
    /// Ignored while another refresh or add holds the refresh slot.
    pub async fn refresh_category(&self, category: &str) {
        if !self.claim_refresh_slot(category) {
            return;
        }

        match self.inner.service.trigger_processing(category).await {
            Ok(()) => {
                // Read at settle time: the user may have switched meanwhile.
                let selected = self.read(|s| s.selected_category.clone());
                self.fetch_articles(&selected).await;
            }
            Err(e) => {
                tracing::warn!(category, error = %e, "Error refreshing category");
                let message = failure_message(&e, || {
                    format!("Could not refresh \"{category}\". Please try again later.")
                });
                self.update(|s| s.error = Some(message));
            }
        }

        self.update(|s| s.refreshing = None);
    }

    /// Create a category by processing it on the backend, then select it.
    ///
    /// The name is trimmed and lowercased; blank input does nothing. Ignored
    /// while the refresh slot is taken.
    pub async fn add_category(&self, raw: &str) {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return;
        }
        let category = trimmed.to_lowercase();

        if !self.claim_refresh_slot(&category) {
            return;
        }

        match self.inner.service.trigger_processing(&category).await {
            Ok(()) => {
                tracing::info!(category = %category, "Category added");
                self.update(|s| s.new_category_input.clear());
                self.fetch_categories().await;
                self.select_category(&category).await;
            }
            Err(e) => {
                tracing::warn!(category = %category, error = %e, "Error adding category");
                let message = failure_message(&e, || format!("Could not add \"{category}\"."));
                self.update(|s| s.error = Some(message));
            }
        }

        self.update(|s| s.refreshing = None);
    }

    /// Jump to a page. Not clamped; out-of-range pages show nothing.
    pub fn set_page(&self, page: usize) {
        self.update(|s| s.page = page);
    }

    pub fn set_new_category_input(&self, text: impl Into<String>) {
        let text = text.into();
        self.update(|s| s.new_category_input = text);
    }

    /// Take the refresh slot for `category`, clearing any error. Returns
    /// false when another refresh/add already holds it.
    fn claim_refresh_slot(&self, category: &str) -> bool {
        self.update(|s| match &s.refreshing {
            Some(busy) => {
                tracing::debug!(requested = category, busy = %busy, "Refresh already in progress, ignoring");
                false
            }
            None => {
                s.error = None;
                s.refreshing = Some(category.to_string());
                true
            }
        })
    }
}

/// Rate-limit failures show the server's text; everything else gets `generic`.
fn failure_message(err: &ApiError, generic: impl FnOnce() -> String) -> String {
    err.rate_limit_message()
        .map(str::to_string)
        .unwrap_or_else(generic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Article, Category, RecordId};
    use std::collections::HashMap;

    /// Scripted service: canned results per category, plus a call log.
    #[derive(Default)]
    struct FakeService {
        categories: Mutex<Vec<Category>>,
        articles: HashMap<String, Vec<Article>>,
        process_status: Option<(u16, &'static str)>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeService {
        fn log(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ArticleService for FakeService {
        async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
            self.log("categories".to_string());
            Ok(self.categories.lock().unwrap().clone())
        }

        async fn list_articles(&self, category: &str) -> Result<Vec<Article>, ApiError> {
            self.log(format!("articles:{category}"));
            self.articles
                .get(category)
                .cloned()
                .ok_or_else(|| ApiError::from_response_body(404, b"{}"))
        }

        async fn trigger_processing(&self, category: &str) -> Result<(), ApiError> {
            self.log(format!("process:{category}"));
            match self.process_status {
                Some((status, body)) => Err(ApiError::from_response_body(status, body.as_bytes())),
                None => {
                    self.categories.lock().unwrap().push(Category {
                        id: RecordId::from(category),
                        category_name: category.to_string(),
                    });
                    Ok(())
                }
            }
        }
    }

    fn articles(n: usize) -> Vec<Article> {
        (1..=n)
            .map(|i| Article {
                id: RecordId::from(i as i64),
                headline: format!("Story {i}"),
                summary: String::new(),
                source_name: String::new(),
                source_url: String::new(),
                published_at: None,
                image_url: None,
            })
            .collect()
    }

    fn fake_with(entries: &[(&str, usize)]) -> FakeService {
        FakeService {
            articles: entries
                .iter()
                .map(|(name, n)| (name.to_string(), articles(*n)))
                .collect(),
            ..FakeService::default()
        }
    }

    #[test]
    fn starts_loading_on_all_news() {
        let browser = ArticleBrowser::new(FakeService::default(), 5);
        let state = browser.state();
        assert_eq!(state.selected_category, SENTINEL_CATEGORY);
        assert_eq!(state.page, 1);
        assert!(state.articles_loading);
        assert!(state.categories_loading);
        assert_eq!(state.refreshing, None);
    }

    #[test]
    fn zero_page_size_is_raised_to_one() {
        let browser = ArticleBrowser::new(FakeService::default(), 0);
        assert_eq!(browser.page_size(), 1);
    }

    #[test]
    fn mutations_bump_revision() {
        let browser = ArticleBrowser::new(FakeService::default(), 5);
        let mut rx = browser.subscribe();
        let before = *rx.borrow_and_update();
        browser.set_page(2);
        assert!(rx.has_changed().unwrap());
        assert_ne!(*rx.borrow_and_update(), before);
        browser.set_new_category_input("tech");
        assert!(rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn initialize_requests_categories_and_sentinel() {
        let browser = ArticleBrowser::new(fake_with(&[(SENTINEL_CATEGORY, 7)]), 5);
        browser.initialize().await;

        let calls = browser.inner.service.calls();
        assert!(calls.contains(&"categories".to_string()));
        assert!(calls.contains(&"articles:general".to_string()));

        let view = browser.view();
        assert_eq!(view.page_count, 2);
        assert_eq!(view.visible_articles.len(), 5);
        assert!(!view.articles_loading);
        assert!(!view.categories_loading);
    }

    #[tokio::test]
    async fn add_normalizes_then_fetches_categories_before_selecting() {
        let browser = ArticleBrowser::new(fake_with(&[("world news", 2)]), 5);
        browser.set_new_category_input("  World News ");
        browser.add_category("  World News ").await;

        assert_eq!(
            browser.inner.service.calls(),
            vec!["process:world news", "categories", "articles:world news"]
        );
        let state = browser.state();
        assert_eq!(state.selected_category, "world news");
        assert_eq!(state.new_category_input, "");
        assert_eq!(state.categories.len(), 1);
        assert_eq!(state.refreshing, None);
    }

    #[tokio::test]
    async fn rate_limit_without_message_uses_normalized_text() {
        let service = FakeService {
            process_status: Some((429, "")),
            ..FakeService::default()
        };
        let browser = ArticleBrowser::new(service, 5);
        browser.refresh_category("tech").await;

        assert_eq!(
            browser.state().error.as_deref(),
            Some(crate::api::UNKNOWN_ERROR_MESSAGE)
        );
    }

    #[tokio::test]
    async fn claiming_refresh_clears_previous_error() {
        let browser = ArticleBrowser::new(fake_with(&[(SENTINEL_CATEGORY, 1)]), 5);
        browser.fetch_articles("missing").await;
        assert!(browser.state().error.is_some());

        browser.refresh_category("tech").await;
        let state = browser.state();
        assert_eq!(state.error, None);
        assert_eq!(state.articles.len(), 1);
    }

    #[tokio::test]
    async fn set_page_is_not_clamped() {
        let browser = ArticleBrowser::new(fake_with(&[(SENTINEL_CATEGORY, 3)]), 5);
        browser.fetch_articles(SENTINEL_CATEGORY).await;
        browser.set_page(4);
        let view = browser.view();
        assert_eq!(view.page, 4);
        assert!(view.visible_articles.is_empty());
    }
}
