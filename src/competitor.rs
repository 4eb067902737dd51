//! The competitor branch: search, detail fetches and a side-by-side comparison.

use crate::crawler::PageFetcher;
use crate::keywords::extract_keywords;
use crate::llm::{TextCompletion, generate_or};
use crate::models::{CompetitorData, CompetitorInfo, CompetitorSeo, PageData};
use crate::search::{CompetitorSearch, search_competitors};
use crate::seo_analyzer::SeoAnalyzer;
use crate::workflow::Branch;
use anyhow::Result;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::time::Duration;

/// Content keywords used as search queries, after the title.
pub const QUERY_KEYWORDS: usize = 10;
/// Competitors whose pages are fetched and scored.
pub const DETAILED_COMPETITORS: usize = 3;

pub const COMPETITOR_FALLBACK: &str = "LLM unavailable for competitor analysis.";

/// Search queries for a page: its title first, then its top content words.
pub fn competitor_queries(page: &PageData) -> Vec<String> {
    let mut queries = Vec::with_capacity(QUERY_KEYWORDS + 1);
    if !page.meta.title.is_empty() {
        queries.push(page.meta.title.clone());
    }
    queries.extend(
        extract_keywords(&page.text_content, QUERY_KEYWORDS)
            .into_iter()
            .map(|k| k.word),
    );
    queries
}

/// Comparable metrics of a page. `overall_score` is left for the caller.
pub fn snapshot(page: &PageData) -> CompetitorSeo {
    CompetitorSeo {
        word_count: page.page_info.word_count,
        title_length: page.meta.title_length,
        description_length: page.meta.description_length,
        response_time_ms: page.page_info.response_time_ms,
        image_count: page.images.len(),
        internal_links: page.internal_links().count(),
        has_structured_data: !page.structured_data.is_empty(),
        has_og_tags: !page.meta.og_title.is_empty(),
        has_twitter_card: !page.meta.twitter_card.is_empty(),
        overall_score: 0,
    }
}

fn scored_snapshot(page: &PageData) -> CompetitorSeo {
    CompetitorSeo {
        overall_score: SeoAnalyzer::evaluate(page).overall_score,
        ..snapshot(page)
    }
}

struct Metric {
    label: &'static str,
    value: u64,
    is_flag: bool,
}

impl Metric {
    fn display(&self) -> String {
        match (self.is_flag, self.value) {
            (true, 0) => "no".to_string(),
            (true, _) => "yes".to_string(),
            (false, v) => v.to_string(),
        }
    }
}

fn metrics(seo: &CompetitorSeo) -> [Metric; 5] {
    let count = |label, value: usize| Metric {
        label,
        value: value as u64,
        is_flag: false,
    };
    let flag = |label, value: bool| Metric {
        label,
        value: value as u64,
        is_flag: true,
    };
    [
        count("Word count", seo.word_count),
        count("Internal links", seo.internal_links),
        flag("Structured data", seo.has_structured_data),
        flag("Open Graph", seo.has_og_tags),
        count("SEO score", seo.overall_score as usize),
    ]
}

/// Where the competitor is ahead (its strengths) and behind (its weaknesses).
pub fn compare(target: &CompetitorSeo, competitor: &CompetitorSeo) -> (Vec<String>, Vec<String>) {
    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();

    for (theirs, ours) in metrics(competitor).iter().zip(metrics(target).iter()) {
        let line = format!("{}: {} vs {}", theirs.label, theirs.display(), ours.display());
        if theirs.value > ours.value {
            strengths.push(line);
        } else if theirs.value < ours.value {
            weaknesses.push(line);
        }
    }

    (strengths, weaknesses)
}

/// Metric labels where the target beats every crawled competitor, and labels where
/// at least one crawled competitor beats the target.
pub fn advantages_and_gaps(
    target: &CompetitorSeo,
    competitors: &[CompetitorSeo],
) -> (Vec<String>, Vec<String>) {
    if competitors.is_empty() {
        return (Vec::new(), Vec::new());
    }

    let ours = metrics(target);
    let theirs: Vec<[Metric; 5]> = competitors.iter().map(metrics).collect();
    let mut advantages = Vec::new();
    let mut gaps = Vec::new();

    for (i, metric) in ours.iter().enumerate() {
        if theirs.iter().all(|m| metric.value > m[i].value) {
            advantages.push(metric.label.to_string());
        }
        if theirs.iter().any(|m| m[i].value > metric.value) {
            gaps.push(metric.label.to_string());
        }
    }

    (advantages, gaps)
}

pub struct CompetitorAnalyzer<'a> {
    fetcher: &'a dyn PageFetcher,
    search: &'a dyn CompetitorSearch,
    llm: &'a dyn TextCompletion,
    delay: Duration,
    max_concurrent: usize,
}

impl<'a> CompetitorAnalyzer<'a> {
    pub fn new(
        fetcher: &'a dyn PageFetcher,
        search: &'a dyn CompetitorSearch,
        llm: &'a dyn TextCompletion,
        delay: Duration,
        max_concurrent: usize,
    ) -> Self {
        Self {
            fetcher,
            search,
            llm,
            delay,
            max_concurrent: max_concurrent.max(1),
        }
    }

    pub async fn analyze(&self, page: &PageData) -> CompetitorData {
        let target_url = page.page_info.url.clone();
        let queries = competitor_queries(page);
        let mut competitors =
            search_competitors(self.search, &target_url, &queries, self.delay).await;

        self.fetch_details(&mut competitors).await;

        let target = scored_snapshot(page);
        let crawled: Vec<CompetitorSeo> = competitors
            .iter()
            .filter_map(|c| c.seo.clone())
            .collect();
        for competitor in competitors.iter_mut() {
            if let Some(seo) = &competitor.seo {
                let (strengths, weaknesses) = compare(&target, seo);
                competitor.strengths = strengths;
                competitor.weaknesses = weaknesses;
            }
        }
        let (competitive_advantages, competitive_gaps) = advantages_and_gaps(&target, &crawled);

        let market_summary = format!(
            "{} competitors found for {}",
            competitors.len(),
            queries.iter().take(3).cloned().collect::<Vec<_>>().join(", ")
        );

        let llm_analysis = if competitors.is_empty() {
            String::new()
        } else {
            let prompt = competitor_prompt(page, &queries, &competitors);
            generate_or(self.llm, &prompt, COMPETITOR_FALLBACK, "competitor analysis").await
        };

        CompetitorData {
            target_url,
            competitors,
            market_summary,
            competitive_advantages,
            competitive_gaps,
            llm_analysis,
        }
    }

    /// Fetches the leading competitors with bounded concurrency. Failures leave `seo` empty.
    async fn fetch_details(&self, competitors: &mut [CompetitorInfo]) {
        let fetcher = self.fetcher;
        let urls: Vec<String> = competitors
            .iter()
            .take(DETAILED_COMPETITORS)
            .map(|c| c.url.clone())
            .collect();

        let results = stream::iter(urls)
            .map(|url| async move {
                let result = fetcher.fetch(&url).await;
                (url, result)
            })
            .buffered(self.max_concurrent)
            .collect::<Vec<_>>()
            .await;

        for (competitor, (url, result)) in competitors.iter_mut().zip(results) {
            match result {
                Ok(page) => competitor.seo = Some(scored_snapshot(&page)),
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "Failed to fetch competitor page");
                }
            }
        }
    }
}

#[async_trait]
impl Branch<CompetitorData> for CompetitorAnalyzer<'_> {
    fn name(&self) -> &'static str {
        "Competitor"
    }

    async fn run(&self, page: &PageData) -> Result<CompetitorData> {
        Ok(self.analyze(page).await)
    }
}

fn competitor_prompt(page: &PageData, queries: &[String], competitors: &[CompetitorInfo]) -> String {
    let competitor_lines = competitors
        .iter()
        .take(5)
        .map(|c| {
            format!(
                "- {}: \"{}\" (queries: {})",
                c.domain,
                c.title,
                c.keyword_overlap.join(", ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are an SEO and competition analyst. Analyse the competitive situation.\n\n\
         Target page: {}\nTitle: {}\nMain keywords: {}\n\n\
         Competitors found:\n{}\n\n\
         Write a short competitive analysis with:\n\
         1. Overview of the competitive landscape\n\
         2. Possible advantages of the target page\n\
         3. Gaps and opportunities to exploit\n\
         4. Top 3 recommendations to improve the competitive position",
        page.page_info.url,
        page.meta.title,
        queries.iter().take(5).cloned().collect::<Vec<_>>().join(", "),
        competitor_lines
    )
}
