#![allow(dead_code)]

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use seo_agent::crawler::PageFetcher;
use seo_agent::llm::{LlmError, TextCompletion};
use seo_agent::models::{
    Heading, Image, Link, MetaInfo, PageData, PageInfo, SearchResult, StructuredDataItem,
};
use seo_agent::search::{CompetitorSearch, SearchError};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const BASE_URL: &str = "https://oakwood.example/furniture";

pub fn heading(level: u8, text: &str) -> Heading {
    Heading {
        tag: format!("h{}", level),
        text: text.to_string(),
        level,
    }
}

pub fn link(url: &str, text: &str, is_internal: bool) -> Link {
    Link {
        url: url.to_string(),
        text: text.to_string(),
        is_internal,
        is_nofollow: false,
        has_title: false,
    }
}

pub fn image(alt: &str) -> Image {
    Image {
        src: "/img/photo.jpg".to_string(),
        alt: alt.to_string(),
        has_alt: !alt.trim().is_empty(),
        ..Image::default()
    }
}

pub fn set_title(page: &mut PageData, title: &str) {
    page.meta.title = title.to_string();
    page.meta.title_length = title.chars().count();
}

pub fn set_description(page: &mut PageData, description: &str) {
    page.meta.description = description.to_string();
    page.meta.description_length = description.chars().count();
}

/// A page that passes every rule: each category scores 100.
pub fn baseline_page() -> PageData {
    let text_content = "Solid oak tables and chairs are made by hand in our workshop. "
        .repeat(70)
        .trim()
        .to_string();

    let mut page = PageData {
        page_info: PageInfo {
            url: BASE_URL.to_string(),
            final_url: BASE_URL.to_string(),
            status_code: 200,
            response_time_ms: 200,
            content_length: 20_000,
            content_type: "text/html".to_string(),
            word_count: 700,
            language: "en".to_string(),
            charset: "utf-8".to_string(),
            has_https: true,
            has_robots_txt: true,
            has_sitemap: true,
            robots_txt_content: "User-agent: *".to_string(),
        },
        meta: MetaInfo {
            viewport: "width=device-width, initial-scale=1".to_string(),
            robots: "index, follow".to_string(),
            canonical: BASE_URL.to_string(),
            og_title: "Oakwood furniture".to_string(),
            og_description: "Handmade oak furniture".to_string(),
            og_image: "https://oakwood.example/og.jpg".to_string(),
            og_type: "website".to_string(),
            twitter_card: "summary_large_image".to_string(),
            ..MetaInfo::default()
        },
        headings: vec![
            heading(1, "Handmade oak furniture"),
            heading(2, "Dining tables"),
            heading(2, "Chairs and benches"),
        ],
        links: vec![
            link("https://oakwood.example/tables", "Tables", true),
            link("https://oakwood.example/chairs", "Chairs", true),
            link("https://oakwood.example/about", "About us", true),
            link("https://wood-guide.org/oak", "Oak care guide", false),
            link("https://forestry.example.net/", "Certified forestry", false),
        ],
        images: vec![image("Oak dining table"), image("Walnut chair by a window")],
        structured_data: vec![StructuredDataItem {
            schema_type: "Organization".to_string(),
            properties: BTreeMap::from([("name".to_string(), "Oakwood".to_string())]),
            raw_json: r#"{"@type":"Organization","name":"Oakwood"}"#.to_string(),
        }],
        raw_html: format!("<html><body><p>{}</p></body></html>", text_content),
        text_content,
    };

    set_title(&mut page, "Handmade Oak Furniture for Modern Homes | Oakwood");
    set_description(
        &mut page,
        "Handmade oak tables, chairs and shelves built to last for generations. Free delivery and a ten year warranty on every piece.",
    );
    page
}

/// Answers every prompt with a fixed text and counts the calls.
pub struct FakeLlm {
    pub reply: String,
    pub calls: AtomicUsize,
}

impl FakeLlm {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextCompletion for FakeLlm {
    async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }
}

/// Always fails, like a backend without credentials.
pub struct DownLlm;

#[async_trait]
impl TextCompletion for DownLlm {
    async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
        Err(LlmError::MissingApiKey { provider: "Test" })
    }
}

/// Canned search results per query; unknown queries return nothing.
#[derive(Default)]
pub struct FakeSearch {
    pub results: HashMap<String, Vec<SearchResult>>,
    pub queries: Mutex<Vec<String>>,
}

impl FakeSearch {
    pub fn with(mut self, query: &str, urls: &[&str]) -> Self {
        let results = urls
            .iter()
            .map(|url| SearchResult {
                title: format!("Result {}", url),
                url: url.to_string(),
                description: String::new(),
            })
            .collect();
        self.results.insert(query.to_string(), results);
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompetitorSearch for FakeSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>, SearchError> {
        self.queries.lock().unwrap().push(query.to_string());
        let mut results = self.results.get(query).cloned().unwrap_or_default();
        results.truncate(max_results);
        Ok(results)
    }
}

/// Serves prepared pages by URL; anything else fails like a refused connection.
#[derive(Default)]
pub struct FakeFetcher {
    pub pages: HashMap<String, PageData>,
    pub fetched: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn with(mut self, url: &str, page: PageData) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<PageData> {
        self.fetched.lock().unwrap().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow!("connection refused: {}", url))
    }
}
