mod common;
mod server;

use common::FakeSearch;
use seo_agent::http_client::build_http_client;
use seo_agent::search::{
    CompetitorSearch, DuckDuckGoSearch, SearchError, decode_redirect, domain_of, parse_results,
    search_competitors, search_keyword_rankings,
};
use server::{SEARCH_RESULTS, start_service_server};
use std::time::{Duration, Instant};

#[test]
fn test_parse_results_keeps_absolute_links() {
    let results = parse_results(SEARCH_RESULTS, 10);

    let urls: Vec<&str> = results.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "https://www.competitor-one.com/oak",
            "https://competitor-two.net/tables",
            "https://oakwood.example/",
        ]
    );
    assert_eq!(results[0].title, "Competitor One");
    assert_eq!(results[0].description, "Oak furniture made to order");
    assert!(results[2].description.contains("target"));
}

#[test]
fn test_parse_results_limits_blocks() {
    assert_eq!(parse_results(SEARCH_RESULTS, 1).len(), 1);
    assert!(parse_results("<html><body></body></html>", 10).is_empty());
}

#[test]
fn test_decode_redirect() {
    assert_eq!(
        decode_redirect("//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fa%3Fb%3D1&rut=x"),
        "https://example.com/a?b=1"
    );
    assert_eq!(decode_redirect("https://example.com/"), "https://example.com/");
}

#[test]
fn test_domain_of_strips_www() {
    assert_eq!(domain_of("https://www.example.com/a").as_deref(), Some("example.com"));
    assert_eq!(domain_of("http://shop.example.com").as_deref(), Some("shop.example.com"));
    assert_eq!(domain_of("not a url"), None);
}

#[tokio::test]
async fn test_duckduckgo_search_against_local_endpoint() {
    let base_url = start_service_server().await;
    let client = build_http_client(5, "seo-agent-test").unwrap();
    let search = DuckDuckGoSearch::new(client).with_base_url(&format!("{}/html/", base_url));

    let results = search.search("oak furniture", 10).await.unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[1].url, "https://competitor-two.net/tables");

    let empty = search.search("nothing", 10).await.unwrap();
    assert!(empty.is_empty());

    let err = search.search("blocked query", 10).await.unwrap_err();
    assert!(matches!(err, SearchError::Status(503)));
}

#[tokio::test]
async fn test_failed_queries_count_as_empty() {
    let base_url = start_service_server().await;
    let client = build_http_client(5, "seo-agent-test").unwrap();
    let search = DuckDuckGoSearch::new(client).with_base_url(&format!("{}/html/", base_url));

    let queries = vec!["blocked".to_string(), "oak furniture".to_string()];
    let competitors =
        search_competitors(&search, "https://oakwood.example/", &queries, Duration::ZERO).await;

    let domains: Vec<&str> = competitors.iter().map(|c| c.domain.as_str()).collect();
    assert_eq!(domains, vec!["competitor-one.com", "competitor-two.net"]);
    assert_eq!(competitors[0].keyword_overlap, vec!["oak furniture".to_string()]);
}

#[tokio::test]
async fn test_competitors_sorted_by_overlap_and_capped() {
    let many: Vec<String> = (0..10).map(|i| format!("https://site{}.com/", i)).collect();
    let many_refs: Vec<&str> = many.iter().map(String::as_str).collect();

    let search = FakeSearch::default().with("first", &many_refs).with(
        "second",
        &[
            "https://site9.com/x",
            "https://www.site5.com/y",
            "https://site10.com/",
            "https://site11.com/",
        ],
    );
    let queries = vec!["first".to_string(), "second".to_string()];

    let competitors =
        search_competitors(&search, "https://target.com/", &queries, Duration::ZERO).await;

    assert_eq!(competitors.len(), 10);
    assert_eq!(competitors[0].domain, "site5.com");
    assert_eq!(competitors[1].domain, "site9.com");
    assert_eq!(competitors[2].domain, "site0.com");
    assert_eq!(competitors[1].url, "https://site9.com/");
    assert!(competitors.iter().all(|c| c.domain != "site11.com"));
}

#[tokio::test]
async fn test_queries_are_serialized_with_delay() {
    let search = FakeSearch::default();
    let keywords = vec!["oak".to_string(), "walnut".to_string(), "pine".to_string()];

    let start = Instant::now();
    let rankings =
        search_keyword_rankings(&search, "https://target.com/", &keywords, Duration::from_millis(30))
            .await;

    assert!(start.elapsed() >= Duration::from_millis(90));
    assert_eq!(search.queries(), keywords);
    assert_eq!(rankings.len(), 3);
}

#[tokio::test]
async fn test_ranking_is_first_matching_position() {
    let search = FakeSearch::default().with(
        "oak",
        &["https://other.com/", "https://www.target.com/a", "https://target.com/b"],
    );

    let rankings = search_keyword_rankings(
        &search,
        "https://target.com/",
        &["oak".to_string(), "pine".to_string()],
        Duration::ZERO,
    )
    .await;

    assert_eq!(rankings[0].position, Some(2));
    assert_eq!(rankings[1].position, None);
}
