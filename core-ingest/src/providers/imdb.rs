//! IMDb scraping client.
//!
//! Two-page flow: a site search resolves a title to its `tt` identifier,
//! then the dedicated soundtrack sub-page is fetched and the track list
//! extracted from its structured item list. The soundtrack page carries no
//! authoritative numbering, so callers assign sequential positions.

use crate::config::ImdbConfig;
use crate::error::ProviderError;
use crate::providers::RateLimiter;
use core_http::{HttpClient, HttpRequest};
use scraper::{Html, Selector};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// Result items inspected on the search page.
const MAX_SEARCH_CANDIDATES: usize = 3;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = "Mozilla/5.0 (compatible; Filmscore/0.1)";

/// Current search-result markup, with the pre-redesign markup as fallback.
const SEARCH_RESULT_SELECTORS: &str =
    "li.find-title-result, table.findList tr.findResult";

/// Track list containers on the soundtrack page: structured item list
/// first, legacy container class when that yields nothing.
const TRACK_ITEM_SELECTOR: &str = "li.ipc-metadata-list__item";
const LEGACY_TRACK_ITEM_SELECTOR: &str = "div.soundTrack";

pub struct ImdbClient {
    http_client: Arc<dyn HttpClient>,
    config: ImdbConfig,
    rate_limiter: Arc<Mutex<RateLimiter>>,
}

/// One search-page result: the title id plus the surrounding text snippet
/// used for the year heuristic.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SearchCandidate {
    id: String,
    snippet: String,
}

impl ImdbClient {
    pub fn new(http_client: Arc<dyn HttpClient>, config: ImdbConfig) -> Self {
        let rate_limiter = Arc::new(Mutex::new(RateLimiter::new(config.rate_limit_ms)));
        Self {
            http_client,
            config,
            rate_limiter,
        }
    }

    /// Resolve a film title to its IMDb identifier via the site search.
    ///
    /// Inspects the first three result items. When a year is supplied, a
    /// candidate whose snippet contains the year string is preferred;
    /// otherwise the first candidate is accepted unconditionally. This is
    /// a heuristic: colliding titles can resolve to the wrong film.
    pub async fn find_title(
        &self,
        title: &str,
        year: Option<i32>,
    ) -> Result<Option<String>, ProviderError> {
        let url = format!(
            "{}/find/?q={}&s=tt",
            self.config.base_url,
            urlencoding::encode(title)
        );

        debug!(%title, ?year, "searching IMDb titles");

        let html = self.get(url).await?;
        let candidates = parse_search_results(&html);
        Ok(pick_candidate(&candidates, year))
    }

    /// Fetch the soundtrack sub-page and extract its track titles, in page
    /// order. An empty vector means the page listed no usable tracks.
    pub async fn soundtrack_titles(&self, title_id: &str) -> Result<Vec<String>, ProviderError> {
        let url = self.soundtrack_page_url(title_id);
        let html = self.get(url).await?;
        Ok(parse_soundtrack_titles(&html))
    }

    pub fn soundtrack_page_url(&self, title_id: &str) -> String {
        format!("{}/title/{}/soundtrack/", self.config.base_url, title_id)
    }

    async fn get(&self, url: String) -> Result<String, ProviderError> {
        self.rate_limiter.lock().await.wait_if_needed().await;

        let request = HttpRequest::get(url)
            .header("User-Agent", USER_AGENT)
            .header("Accept-Language", "en-US,en;q=0.8")
            .timeout(REQUEST_TIMEOUT);

        let response = self.http_client.execute(request).await?;
        if !response.is_success() {
            return Err(ProviderError::Api {
                status: response.status,
                body: String::new(),
            });
        }
        Ok(response.text())
    }
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

fn parse_search_results(html: &str) -> Vec<SearchCandidate> {
    let document = Html::parse_document(html);
    let item_selector = selector(SEARCH_RESULT_SELECTORS);
    let link_selector = selector("a[href]");

    let mut candidates = Vec::new();
    for item in document.select(&item_selector).take(MAX_SEARCH_CANDIDATES) {
        let id = item
            .select(&link_selector)
            .filter_map(|a| a.value().attr("href"))
            .find_map(extract_title_id);
        if let Some(id) = id {
            let snippet = item.text().collect::<Vec<_>>().join(" ");
            candidates.push(SearchCandidate { id, snippet });
        }
    }
    candidates
}

/// Pull a `tt`-prefixed identifier out of a `/title/...` href.
fn extract_title_id(href: &str) -> Option<String> {
    let rest = href.split("/title/").nth(1)?;
    let id: &str = rest.split(['/', '?']).next()?;
    let digits = id.strip_prefix("tt")?;
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        Some(id.to_string())
    } else {
        None
    }
}

fn pick_candidate(candidates: &[SearchCandidate], year: Option<i32>) -> Option<String> {
    if let Some(year) = year {
        let needle = year.to_string();
        if let Some(hit) = candidates.iter().find(|c| c.snippet.contains(&needle)) {
            return Some(hit.id.clone());
        }
    }
    candidates.first().map(|c| c.id.clone())
}

/// Extract track titles from the soundtrack page.
///
/// Each list item's first non-empty text node is the song title; performer
/// and writer credits follow in separate nodes and are ignored.
fn parse_soundtrack_titles(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    let titles = collect_item_titles(&document, TRACK_ITEM_SELECTOR);
    if !titles.is_empty() {
        return titles;
    }
    collect_item_titles(&document, LEGACY_TRACK_ITEM_SELECTOR)
}

fn collect_item_titles(document: &Html, css: &str) -> Vec<String> {
    let item_selector = selector(css);
    document
        .select(&item_selector)
        .filter_map(|item| {
            item.text()
                .map(str::trim)
                .find(|t| !t.is_empty())
                .map(str::to_string)
        })
        .collect()
}
