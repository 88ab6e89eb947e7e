//! Pull-based cursor over search listing pages
//!
//! The cursor requests listing pages strictly in increasing index order, one
//! per call. It ends on the first page without result rows, on the optional
//! page cap, or on a failed listing fetch. A failed listing fetch is
//! reported to the caller instead of being retried: it usually means the
//! catalog ended or the site changed.

use crate::catalog::{parse_search_page, SearchPage, SearchQuery};
use crate::crawler::fetcher::PageFetcher;
use crate::SweepError;
use std::sync::Arc;

/// Lazy, finite sequence of [`SearchPage`]s
pub struct PaginationCursor {
    fetcher: Arc<dyn PageFetcher>,
    query: SearchQuery,
    next_index: u32,
    pages_fetched: u32,
    max_pages: Option<u32>,
    exhausted: bool,
}

impl PaginationCursor {
    /// Creates a cursor starting at page 0
    pub fn new(fetcher: Arc<dyn PageFetcher>, query: SearchQuery) -> Self {
        Self {
            fetcher,
            query,
            next_index: 0,
            pages_fetched: 0,
            max_pages: None,
            exhausted: false,
        }
    }

    /// Starts from `index` instead of 0
    pub fn starting_at(mut self, index: u32) -> Self {
        self.next_index = index;
        self
    }

    /// Stops after `max_pages` listing pages have been fetched
    pub fn with_max_pages(mut self, max_pages: Option<u32>) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Index of the page the next call will request
    pub fn next_index(&self) -> u32 {
        self.next_index
    }

    /// Number of listing pages fetched so far
    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Fetches and parses the next listing page
    ///
    /// # Returns
    ///
    /// * `Ok(Some(SearchPage))` - A page with at least one result row
    /// * `Ok(None)` - The listing is exhausted or the page cap was reached
    /// * `Err(SweepError::PaginationFetch)` - The listing page could not be fetched
    pub async fn next(&mut self) -> crate::Result<Option<SearchPage>> {
        if self.exhausted {
            return Ok(None);
        }

        if self.max_pages.is_some_and(|max| self.pages_fetched >= max) {
            tracing::info!("Reached page cap of {}", self.pages_fetched);
            self.exhausted = true;
            return Ok(None);
        }

        let index = self.next_index;
        let page_url = self.query.page_url(index);
        tracing::info!("Scanning listing page {}", index);

        let content = match self.fetcher.fetch(page_url.as_str()).await {
            Ok(content) => content,
            Err(source) => {
                self.exhausted = true;
                return Err(SweepError::PaginationFetch {
                    uri: page_url.to_string(),
                    source,
                });
            }
        };

        self.pages_fetched += 1;
        self.next_index += 1;

        let page = parse_search_page(&content.body, &page_url, index);
        if page.row_count() == 0 {
            tracing::info!("Listing page {} is empty, end of catalog", index);
            self.exhausted = true;
            return Ok(None);
        }

        tracing::debug!(
            "Listing page {}: {} candidates, {} skipped",
            index,
            page.links.len(),
            page.skipped
        );

        Ok(Some(page))
    }
}
