//! Browser state and the values derived from it for rendering.

use crate::api::{Article, Category, SENTINEL_CATEGORY};
use std::sync::Arc;

/// Articles shown per page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// The single mutable aggregate behind the article browser.
///
/// Lists are held in `Arc` so snapshots for rendering are cheap; they are
/// only ever replaced wholesale, never edited in place.
#[derive(Debug, Clone)]
pub struct BrowserState {
    /// Articles for the last successful fetch, in server order.
    pub articles: Arc<Vec<Article>>,
    pub categories: Arc<Vec<Category>>,
    /// Selected category name, or [`SENTINEL_CATEGORY`] for "all".
    pub selected_category: String,
    /// 1-based. Reset to 1 only when a fetch successfully replaces `articles`.
    pub page: usize,
    /// Text typed into the add-category field.
    pub new_category_input: String,
    pub error: Option<String>,

    // Loading indicators are independent fields; each operation owns one.
    pub articles_loading: bool,
    pub categories_loading: bool,
    /// Category currently being refreshed or added. One slot, not a set.
    pub refreshing: Option<String>,
}

impl Default for BrowserState {
    fn default() -> Self {
        Self {
            articles: Arc::new(Vec::new()),
            categories: Arc::new(Vec::new()),
            selected_category: SENTINEL_CATEGORY.to_string(),
            page: 1,
            new_category_input: String::new(),
            error: None,
            // The first render happens before initialization settles.
            articles_loading: true,
            categories_loading: true,
            refreshing: None,
        }
    }
}

impl BrowserState {
    /// Number of pages needed for the current article list.
    pub fn page_count(&self, page_size: usize) -> usize {
        page_count(self.articles.len(), page_size)
    }

    /// The articles on the current page.
    pub fn visible_articles(&self, page_size: usize) -> &[Article] {
        page_slice(&self.articles, self.page, page_size)
    }

    pub fn is_refreshing(&self, category: &str) -> bool {
        self.refreshing.as_deref() == Some(category)
    }
}

/// `ceil(len / page_size)`. A zero page size is treated as 1.
pub fn page_count(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size.max(1))
}

/// The contiguous slice for 1-based `page`. Pages past the end (and page 0)
/// are empty rather than an error.
pub fn page_slice<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let page_size = page_size.max(1);
    if page == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

// ============================================================================
// Render-ready snapshot
// ============================================================================

/// Everything a render surface needs, computed from one consistent state read.
#[derive(Debug, Clone)]
pub struct BrowserView {
    pub categories: Arc<Vec<Category>>,
    pub selected_category: String,
    pub visible_articles: Vec<Article>,
    pub total_articles: usize,
    pub page: usize,
    pub page_count: usize,
    pub articles_loading: bool,
    pub categories_loading: bool,
    pub refreshing: Option<String>,
    pub error: Option<String>,
    pub new_category_input: String,
}

impl BrowserView {
    pub fn from_state(state: &BrowserState, page_size: usize) -> Self {
        Self {
            categories: Arc::clone(&state.categories),
            selected_category: state.selected_category.clone(),
            visible_articles: state.visible_articles(page_size).to_vec(),
            total_articles: state.articles.len(),
            page: state.page,
            page_count: state.page_count(page_size),
            articles_loading: state.articles_loading,
            categories_loading: state.categories_loading,
            refreshing: state.refreshing.clone(),
            error: state.error.clone(),
            new_category_input: state.new_category_input.clone(),
        }
    }

    /// A pager with one page or fewer is not shown.
    pub fn show_pager(&self) -> bool {
        self.page_count > 1
    }

    pub fn is_refreshing(&self, category: &str) -> bool {
        self.refreshing.as_deref() == Some(category)
    }

    pub fn is_selected(&self, category: &str) -> bool {
        self.selected_category == category
    }
}
