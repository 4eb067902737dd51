//! Competitor and ranking lookups through a public search engine.
//!
//! Queries always run one after another with a pause in between; firing them
//! concurrently gets the client blocked by the engine's anti-scraping defences.

use crate::models::{CompetitorInfo, KeywordRanking, SearchResult};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use url::Url;

pub const DUCKDUCKGO_HTML_URL: &str = "https://html.duckduckgo.com/html/";
pub const SEARCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Results considered per competitor query.
pub const COMPETITOR_RESULTS: usize = 10;
/// Results scanned when looking for the target's own ranking.
pub const RANKING_RESULTS: usize = 20;
/// Only this many competitor queries are executed.
pub const MAX_COMPETITOR_QUERIES: usize = 5;
/// Competitors kept after sorting by overlap.
pub const MAX_COMPETITORS: usize = 10;

static RESULT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".result").expect("result selector should be valid"));
static RESULT_TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".result__title a").expect("result title selector should be valid")
});
static RESULT_SNIPPET_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".result__snippet").expect("result snippet selector should be valid")
});

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Invalid search endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("Search request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Search engine returned status {0}")]
    Status(u16),

    #[error("Failed to read search results: {0}")]
    Body(#[source] reqwest::Error),
}

/// A search provider returning an ordered, best-effort result list.
#[async_trait]
pub trait CompetitorSearch: Send + Sync {
    async fn search(&self, query: &str, max_results: usize)
    -> Result<Vec<SearchResult>, SearchError>;
}

/// Scrapes the DuckDuckGo HTML endpoint (no API key needed).
pub struct DuckDuckGoSearch {
    client: Client,
    base_url: String,
}

impl DuckDuckGoSearch {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: DUCKDUCKGO_HTML_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }
}

#[async_trait]
impl CompetitorSearch for DuckDuckGoSearch {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let url = Url::parse_with_params(&self.base_url, &[("q", query)])?;

        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "text/html")
            .timeout(SEARCH_TIMEOUT)
            .send()
            .await
            .map_err(SearchError::Request)?;

        if !response.status().is_success() {
            return Err(SearchError::Status(response.status().as_u16()));
        }

        let html = response.text().await.map_err(SearchError::Body)?;
        Ok(parse_results(&html, max_results))
    }
}

/// Parses a DuckDuckGo HTML result page.
///
/// Only the first `max_results` result blocks are looked at; blocks without a
/// title or an absolute http(s) link are dropped.
pub fn parse_results(html: &str, max_results: usize) -> Vec<SearchResult> {
    let document = Html::parse_document(html);

    document
        .select(&RESULT_SELECTOR)
        .take(max_results)
        .filter_map(|block| {
            let title_link = block.select(&RESULT_TITLE_SELECTOR).next()?;
            let title = title_link.text().collect::<String>().trim().to_string();
            let url = decode_redirect(title_link.value().attr("href").unwrap_or_default());
            let description = block
                .select(&RESULT_SNIPPET_SELECTOR)
                .next()
                .map(|snippet| snippet.text().collect::<String>().trim().to_string())
                .unwrap_or_default();

            (!title.is_empty() && url.starts_with("http")).then_some(SearchResult {
                title,
                url,
                description,
            })
        })
        .collect()
}

/// Unwraps DuckDuckGo's `/l/?uddg=<encoded target>` redirect links.
pub fn decode_redirect(href: &str) -> String {
    if !href.contains("uddg=") {
        return href.to_string();
    }

    Url::parse("https://duckduckgo.com/")
        .and_then(|base| base.join(href))
        .ok()
        .and_then(|url| {
            url.query_pairs()
                .find(|(key, _)| key == "uddg")
                .map(|(_, value)| value.into_owned())
        })
        .filter(|decoded| !decoded.is_empty())
        .unwrap_or_else(|| href.to_string())
}

/// Host of a URL without a leading `www.`.
pub fn domain_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    let domain = host.strip_prefix("www.").unwrap_or(host);
    (!domain.is_empty()).then(|| domain.to_string())
}

async fn search_or_empty(
    search: &dyn CompetitorSearch,
    query: &str,
    max_results: usize,
) -> Vec<SearchResult> {
    match search.search(query, max_results).await {
        Ok(results) => results,
        Err(e) => {
            tracing::warn!(query = %query, error = %e, "Search failed, treating as no results");
            Vec::new()
        }
    }
}

/// Finds sites that show up for the same queries as the target.
///
/// Competitors are keyed by domain and collect the queries they appeared for;
/// the result is ordered by overlap count, ties keeping first-seen order.
pub async fn search_competitors(
    search: &dyn CompetitorSearch,
    target_url: &str,
    queries: &[String],
    delay: Duration,
) -> Vec<CompetitorInfo> {
    let target_domain = domain_of(target_url).unwrap_or_else(|| target_url.to_string());
    let mut competitors: Vec<CompetitorInfo> = Vec::new();

    for query in queries.iter().take(MAX_COMPETITOR_QUERIES) {
        let results = search_or_empty(search, query, COMPETITOR_RESULTS).await;

        for result in results {
            let Some(domain) = domain_of(&result.url) else {
                continue;
            };
            if domain == target_domain {
                continue;
            }

            match competitors.iter_mut().find(|c| c.domain == domain) {
                Some(existing) => {
                    if !existing.keyword_overlap.contains(query) {
                        existing.keyword_overlap.push(query.clone());
                    }
                }
                None => competitors.push(CompetitorInfo {
                    url: result.url,
                    title: result.title,
                    description: result.description,
                    domain,
                    keyword_overlap: vec![query.clone()],
                    strengths: Vec::new(),
                    weaknesses: Vec::new(),
                    seo: None,
                }),
            }
        }

        tokio::time::sleep(delay).await;
    }

    competitors.sort_by(|a, b| b.keyword_overlap.len().cmp(&a.keyword_overlap.len()));
    competitors.truncate(MAX_COMPETITORS);
    competitors
}

/// Looks up the target's 1-based position for each keyword within the top results.
pub async fn search_keyword_rankings(
    search: &dyn CompetitorSearch,
    target_url: &str,
    keywords: &[String],
    delay: Duration,
) -> Vec<KeywordRanking> {
    let target_domain = domain_of(target_url).unwrap_or_else(|| target_url.to_string());
    let mut rankings = Vec::with_capacity(keywords.len());

    for keyword in keywords {
        let results = search_or_empty(search, keyword, RANKING_RESULTS).await;
        let position = results
            .iter()
            .position(|result| domain_of(&result.url).as_deref() == Some(target_domain.as_str()))
            .map(|index| index + 1);

        tracing::debug!(keyword = %keyword, position = ?position, "Keyword ranking");
        rankings.push(KeywordRanking {
            keyword: keyword.clone(),
            position,
        });

        tokio::time::sleep(delay).await;
    }

    rankings
}
