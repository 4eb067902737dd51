mod common;
mod server;

use common::{FakeFetcher, FakeLlm, FakeSearch, baseline_page, set_title};
use seo_agent::competitor::{
    CompetitorAnalyzer, advantages_and_gaps, compare, competitor_queries, snapshot,
};
use seo_agent::crawler::{Crawler, PageFetcher};
use seo_agent::http_client::build_http_client;
use seo_agent::models::CompetitorSeo;
use seo_agent::seo_analyzer::SeoAnalyzer;
use seo_agent::workflow::Branch;
use std::time::Duration;

fn seo(word_count: usize, internal_links: usize, structured: bool, og: bool, score: u32) -> CompetitorSeo {
    CompetitorSeo {
        word_count,
        internal_links,
        has_structured_data: structured,
        has_og_tags: og,
        overall_score: score,
        ..CompetitorSeo::default()
    }
}

#[test]
fn test_queries_start_with_title() {
    let mut page = baseline_page();
    page.text_content = "oak oak walnut chairs".to_string();

    assert_eq!(
        competitor_queries(&page),
        vec![page.meta.title.clone(), "oak".into(), "walnut".into(), "chairs".into()]
    );

    set_title(&mut page, "");
    assert_eq!(competitor_queries(&page)[0], "oak");
}

#[test]
fn test_queries_cap_keywords_at_ten() {
    let mut page = baseline_page();
    page.text_content = "one two three four five six seven eight nine ten eleven twelve"
        .split(' ')
        .filter(|w| w.len() >= 3)
        .map(|w| format!("{}word", w))
        .collect::<Vec<_>>()
        .join(" ");

    assert_eq!(competitor_queries(&page).len(), 11);
}

#[test]
fn test_snapshot_reads_page_metrics() {
    let page = baseline_page();
    let snap = snapshot(&page);

    assert_eq!(snap.word_count, 700);
    assert_eq!(snap.title_length, 49);
    assert_eq!(snap.image_count, 2);
    assert_eq!(snap.internal_links, 3);
    assert!(snap.has_structured_data && snap.has_og_tags && snap.has_twitter_card);
    assert_eq!(snap.overall_score, 0);
}

#[test]
fn test_compare_splits_strengths_and_weaknesses() {
    let target = seo(500, 3, true, false, 70);
    let competitor = seo(800, 3, false, true, 60);

    let (strengths, weaknesses) = compare(&target, &competitor);

    assert_eq!(
        strengths,
        vec!["Word count: 800 vs 500".to_string(), "Open Graph: yes vs no".to_string()]
    );
    assert_eq!(
        weaknesses,
        vec!["Structured data: no vs yes".to_string(), "SEO score: 60 vs 70".to_string()]
    );
}

#[test]
fn test_advantages_and_gaps() {
    let target = seo(900, 5, true, false, 80);
    let competitors = vec![seo(400, 8, false, false, 60), seo(600, 2, true, true, 75)];

    let (advantages, gaps) = advantages_and_gaps(&target, &competitors);

    assert_eq!(advantages, vec!["Word count".to_string(), "SEO score".to_string()]);
    assert_eq!(gaps, vec!["Internal links".to_string(), "Open Graph".to_string()]);
}

#[test]
fn test_advantages_need_crawled_competitors() {
    let (advantages, gaps) = advantages_and_gaps(&seo(900, 5, true, true, 90), &[]);
    assert!(advantages.is_empty());
    assert!(gaps.is_empty());
}

#[tokio::test]
async fn test_analyzer_ranks_fetches_and_compares() {
    let mut page = baseline_page();
    page.text_content = "oak oak walnut".to_string();
    page.raw_html.clear();
    let title = page.meta.title.clone();

    let search = FakeSearch::default()
        .with(
            &title,
            &[
                "https://competitor-one.com/a",
                "https://www.competitor-two.com/b",
                "https://oakwood.example/self",
            ],
        )
        .with("oak", &["https://competitor-two.com/c", "https://competitor-three.com/d"])
        .with("walnut", &["https://competitor-two.com/e"]);

    let mut bigger = baseline_page();
    bigger.page_info.word_count = 900;
    let mut no_schema = baseline_page();
    no_schema.structured_data.clear();

    let fetcher = FakeFetcher::default()
        .with("https://www.competitor-two.com/b", bigger)
        .with("https://competitor-three.com/d", no_schema);
    let llm = FakeLlm::new("Competitive landscape");
    let analyzer = CompetitorAnalyzer::new(&fetcher, &search, &llm, Duration::ZERO, 2);

    let data = analyzer.run(&page).await.unwrap();

    let domains: Vec<&str> = data.competitors.iter().map(|c| c.domain.as_str()).collect();
    assert_eq!(domains, vec!["competitor-two.com", "competitor-one.com", "competitor-three.com"]);
    assert_eq!(
        data.competitors[0].keyword_overlap,
        vec![title.clone(), "oak".to_string(), "walnut".to_string()]
    );
    assert_eq!(fetcher.fetched().len(), 3);

    let two = &data.competitors[0];
    assert_eq!(two.seo.as_ref().map(|s| s.word_count), Some(900));
    assert_eq!(two.strengths, vec!["Word count: 900 vs 700".to_string()]);
    assert!(two.weaknesses.is_empty());

    // The failed fetch leaves the snapshot empty.
    assert!(data.competitors[1].seo.is_none());

    let three = &data.competitors[2];
    assert_eq!(three.seo.as_ref().map(|s| s.overall_score), Some(98));
    assert_eq!(
        three.weaknesses,
        vec!["Structured data: no vs yes".to_string(), "SEO score: 98 vs 100".to_string()]
    );

    assert!(data.competitive_advantages.is_empty());
    assert_eq!(data.competitive_gaps, vec!["Word count".to_string()]);
    assert_eq!(
        data.market_summary,
        format!("3 competitors found for {}, oak, walnut", title)
    );
    assert_eq!(data.llm_analysis, "Competitive landscape");
    assert_eq!(data.target_url, page.page_info.url);
    assert_eq!(analyzer.name(), "Competitor");
}

#[tokio::test]
async fn test_analyzer_without_competitors_skips_llm() {
    let mut page = baseline_page();
    page.text_content = "oak".to_string();
    let search = FakeSearch::default();
    let fetcher = FakeFetcher::default();
    let llm = FakeLlm::new("unused");
    let analyzer = CompetitorAnalyzer::new(&fetcher, &search, &llm, Duration::ZERO, 5);

    let data = analyzer.analyze(&page).await;

    assert!(data.competitors.is_empty());
    assert!(data.llm_analysis.is_empty());
    assert_eq!(llm.calls(), 0);
    assert!(fetcher.fetched().is_empty());
    assert!(data.market_summary.starts_with("0 competitors found for "));
}

#[tokio::test]
async fn test_analyzer_runs_at_most_five_queries() {
    let mut page = baseline_page();
    page.text_content = "alpha beta gamma delta epsilon zeta theta".to_string();
    let search = FakeSearch::default();
    let fetcher = FakeFetcher::default();
    let llm = FakeLlm::new("");
    let analyzer = CompetitorAnalyzer::new(&fetcher, &search, &llm, Duration::ZERO, 5);

    analyzer.analyze(&page).await;

    assert_eq!(search.queries().len(), 5);
    assert_eq!(search.queries()[0], page.meta.title);
}

#[tokio::test]
async fn test_identical_pages_compare_as_equal() {
    let base_url = server::start_site_server(true).await;
    let crawler = Crawler::new(build_http_client(5, "seo-agent-test").expect("client"));

    // Same page as the competitor, listed under another domain so the search keeps it.
    let mut page = crawler.fetch(&base_url).await.unwrap();
    page.page_info.url = "https://oakwood.example/".to_string();
    page.page_info.final_url = page.page_info.url.clone();
    let target_score = SeoAnalyzer::evaluate(&page).overall_score;

    let competitor_url = format!("{}/", base_url);
    let search = FakeSearch::default().with(&page.meta.title, &[competitor_url.as_str()]);
    let llm = FakeLlm::new("");
    let analyzer = CompetitorAnalyzer::new(&crawler, &search, &llm, Duration::ZERO, 2);

    let data = analyzer.run(&page).await.unwrap();

    assert_eq!(data.competitors.len(), 1);
    let competitor = &data.competitors[0];
    assert_eq!(
        competitor.seo.as_ref().map(|s| s.overall_score),
        Some(target_score)
    );
    assert!(competitor.strengths.is_empty());
    assert!(competitor.weaknesses.is_empty());
    assert!(data.competitive_advantages.is_empty());
    assert!(data.competitive_gaps.is_empty());
}

#[tokio::test]
async fn test_competitor_without_site_files_scores_lower() {
    let site_url = server::start_site_server(true).await;
    let bare_url = server::start_site_server(false).await;
    let crawler = Crawler::new(build_http_client(5, "seo-agent-test").expect("client"));

    let mut page = crawler.fetch(&site_url).await.unwrap();
    page.page_info.url = "https://oakwood.example/".to_string();
    page.page_info.final_url = page.page_info.url.clone();

    let competitor_url = format!("{}/", bare_url);
    let search = FakeSearch::default().with(&page.meta.title, &[competitor_url.as_str()]);
    let llm = FakeLlm::new("");
    let analyzer = CompetitorAnalyzer::new(&crawler, &search, &llm, Duration::ZERO, 2);

    let data = analyzer.run(&page).await.unwrap();

    let weaknesses = &data.competitors[0].weaknesses;
    assert_eq!(weaknesses.len(), 1);
    assert!(weaknesses[0].starts_with("SEO score: "));
    assert_eq!(data.competitive_advantages, vec!["SEO score".to_string()]);
}
