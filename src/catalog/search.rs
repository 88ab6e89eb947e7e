//! Search listing URLs and candidate-link extraction
//!
//! A search listing is an HTML page holding a `#search_result_container`
//! with one `a.search_result_row` anchor per product. Only anchors pointing
//! at a single product's detail page become candidates; bundles and packages
//! are skipped.

use crate::catalog::Language;
use scraper::{Html, Selector};
use url::Url;

/// Storefront category for games
const GAME_CATEGORY: &str = "998";

/// Builds the search listing URL for each page index
#[derive(Debug, Clone)]
pub struct SearchQuery {
    base: Url,
    supported_languages: String,
}

impl SearchQuery {
    /// Creates a query filtered to products supporting all `languages`
    pub fn new(base: Url, languages: &[Language]) -> Self {
        let supported_languages = languages
            .iter()
            .map(|language| language.key())
            .collect::<Vec<_>>()
            .join(",");

        Self {
            base,
            supported_languages,
        }
    }

    /// Returns the URL of the search listing page at `index`
    ///
    /// # Example
    ///
    /// ```
    /// use lingo_sweep::catalog::SearchQuery;
    /// use lingo_sweep::Language;
    /// use url::Url;
    ///
    /// let base = Url::parse("https://store.example.com/search/").unwrap();
    /// let languages = [Language::parse("french").unwrap(), Language::parse("german").unwrap()];
    /// let query = SearchQuery::new(base, &languages);
    /// assert_eq!(
    ///     query.page_url(2).as_str(),
    ///     "https://store.example.com/search/?category1=998&supportedlang=french%2Cgerman&page=2"
    /// );
    /// ```
    pub fn page_url(&self, index: u32) -> Url {
        let mut url = self.base.clone();
        url.query_pairs_mut()
            .clear()
            .append_pair("category1", GAME_CATEGORY)
            .append_pair("supportedlang", &self.supported_languages)
            .append_pair("page", &index.to_string());
        url
    }
}

/// A product URI discovered on a search listing
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CandidateLink {
    uri: String,
}

impl CandidateLink {
    /// Resolves `href` against the listing URL and keeps it if it names a
    /// single product's detail page
    pub fn from_href(href: &str, base_url: &Url) -> Option<Self> {
        let href = href.trim();
        if href.is_empty() || href.starts_with('#') {
            return None;
        }

        let absolute = base_url.join(href).ok()?;
        if absolute.scheme() != "http" && absolute.scheme() != "https" {
            return None;
        }

        if !is_detail_page(&absolute) {
            return None;
        }

        Some(Self {
            uri: absolute.to_string(),
        })
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }
}

/// Returns true if the URL path names a product detail page
///
/// Detail pages live under `/app/<id>`; bundles (`/bundle/`) and packages
/// (`/sub/`) aggregate several products and carry no language table.
fn is_detail_page(url: &Url) -> bool {
    let segments: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.collect())
        .unwrap_or_default();

    segments.contains(&"app")
        && !segments
            .iter()
            .any(|segment| *segment == "bundle" || *segment == "sub")
}

/// One page of search results
#[derive(Debug, Clone)]
pub struct SearchPage {
    /// Zero-based page index
    pub index: u32,

    /// Valid candidates, in listing order
    pub links: Vec<CandidateLink>,

    /// Result rows that were not product detail pages
    pub skipped: usize,
}

impl SearchPage {
    /// Total number of result rows on the page, valid or not
    pub fn row_count(&self) -> usize {
        self.links.len() + self.skipped
    }
}

/// Parses a search listing into a [`SearchPage`]
///
/// A listing without a result container is treated as an empty page.
pub fn parse_search_page(html: &str, page_url: &Url, index: u32) -> SearchPage {
    let document = Html::parse_document(html);
    let mut links = Vec::new();
    let mut skipped = 0;

    if let Ok(row_selector) = Selector::parse("#search_result_container a.search_result_row") {
        for row in document.select(&row_selector) {
            match row
                .value()
                .attr("href")
                .and_then(|href| CandidateLink::from_href(href, page_url))
            {
                Some(link) => links.push(link),
                None => skipped += 1,
            }
        }
    }

    SearchPage {
        index,
        links,
        skipped,
    }
}
