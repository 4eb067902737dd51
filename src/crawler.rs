use crate::models::{Heading, Image, Link, MetaInfo, PageData, PageInfo, StructuredDataItem};
use crate::robots::probe_site_files;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Instant;
use url::Url;

/// Only the first part of the raw HTML is kept for the text-to-HTML ratio.
pub const RAW_HTML_LIMIT: usize = 50_000;
/// Visible text kept for keyword extraction and prompts.
pub const TEXT_CONTENT_LIMIT: usize = 10_000;

const HEADING_TEXT_LIMIT: usize = 200;
const ANCHOR_TEXT_LIMIT: usize = 100;
const PROPERTY_VALUE_LIMIT: usize = 200;
const RAW_JSON_LIMIT: usize = 1000;

/// Fetches one page and turns it into [`PageData`].
///
/// The workflow and the competitor branch only depend on this trait, so tests can
/// drive them with canned pages.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<PageData>;
}

// Selectors are compiled once.
static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("title").expect("title selector should be valid"));
static BODY_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("body").expect("body selector should be valid"));
static HTML_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("html").expect("html selector should be valid"));
static CHARSET_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("meta[charset]").expect("charset selector should be valid"));
static CANONICAL_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("link[rel='canonical']").expect("canonical selector should be valid")
});
static HEADING_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("h1, h2, h3, h4, h5, h6").expect("heading selector should be valid")
});
static LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("a[href] selector should be valid"));
static IMG_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("img").expect("img selector should be valid"));
static JSON_LD_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("script[type*='ld+json']").expect("JSON-LD selector should be valid")
});

static TEMPLATE_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{.*?\}\}").expect("placeholder pattern should be valid"));

/// Plain-HTTP page fetcher backed by a shared reqwest client.
///
/// Every fetch also checks robots.txt and sitemap.xml, so target and competitor pages are
/// scored on the same facts.
pub struct Crawler {
    client: reqwest::Client,
}

impl Crawler {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for Crawler {
    async fn fetch(&self, url: &str) -> Result<PageData> {
        let requested = normalize_url(url)?;

        let start = Instant::now();
        let response = self
            .client
            .get(requested.as_str())
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", requested))?;
        let response_time_ms = start.elapsed().as_millis() as u64;

        let status_code = response.status().as_u16();
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("text/html")
            .to_string();

        let ct_lower = content_type.to_lowercase();
        if !ct_lower.contains("text/html") && !ct_lower.contains("application/xhtml") {
            tracing::warn!(
                url = %requested,
                content_type = %content_type,
                "Non-HTML content type detected, parsing may fail"
            );
        }

        let html = response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {}", requested))?;

        let site_files = probe_site_files(&self.client, &requested).await;

        let mut page = parse_page(
            &html,
            PageInfo {
                url: requested.to_string(),
                final_url,
                status_code,
                response_time_ms,
                content_type,
                ..PageInfo::default()
            },
        );
        page.page_info.has_robots_txt = site_files.has_robots_txt;
        page.page_info.robots_txt_content = site_files.robots_txt_content;
        page.page_info.has_sitemap = site_files.has_sitemap;

        tracing::debug!(
            url = %page.page_info.url,
            status = page.page_info.status_code,
            words = page.page_info.word_count,
            "Page fetched"
        );

        Ok(page)
    }
}

/// Trims the input and assumes `https://` when no scheme is given.
pub fn normalize_url(input: &str) -> Result<Url> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("URL must not be empty"));
    }

    let candidate = if trimmed.starts_with("http") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let url = Url::parse(&candidate).with_context(|| format!("Invalid URL: {}", input))?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(anyhow!(
                "Invalid URL scheme '{}': only http and https are supported",
                scheme
            ));
        }
    }

    if url.host_str().is_none() {
        return Err(anyhow!("URL has no host: {}", input));
    }

    Ok(url)
}

/// Extracts everything the checks need from an HTML document.
///
/// `info` carries the fetch facts (url, final url, status, timing, content type);
/// the remaining page facts are derived from the document. Links resolve against
/// the final URL, falling back to the requested one.
pub fn parse_page(html: &str, mut info: PageInfo) -> PageData {
    let document = Html::parse_document(html);

    let base = Url::parse(&info.final_url)
        .or_else(|_| Url::parse(&info.url))
        .ok();

    let text_content = extract_visible_text(&document);

    info.content_length = html.chars().count();
    info.word_count = text_content.split_whitespace().count();
    info.has_https = info.final_url.starts_with("https");
    info.language = document
        .select(&HTML_SELECTOR)
        .next()
        .and_then(|el| el.value().attr("lang"))
        .unwrap_or_default()
        .to_string();
    info.charset = document
        .select(&CHARSET_SELECTOR)
        .next()
        .and_then(|el| el.value().attr("charset"))
        .unwrap_or_default()
        .to_string();

    PageData {
        meta: extract_meta(&document),
        headings: extract_headings(&document),
        links: base
            .as_ref()
            .map(|base| extract_links(&document, base))
            .unwrap_or_default(),
        images: extract_images(&document),
        structured_data: extract_structured_data(&document),
        raw_html: truncate(html, RAW_HTML_LIMIT),
        text_content: truncate(&text_content, TEXT_CONTENT_LIMIT),
        page_info: info,
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn extract_visible_text(document: &Html) -> String {
    let mut raw = String::new();
    if let Some(body) = document.select(&BODY_SELECTOR).next() {
        push_visible_text(body, &mut raw);
    }
    collapse_whitespace(&raw)
}

fn push_visible_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
            out.push(' ');
        } else if let Some(child_element) = ElementRef::wrap(child)
            && !matches!(child_element.value().name(), "script" | "style" | "noscript")
        {
            push_visible_text(child_element, out);
        }
    }
}

fn meta_content(document: &Html, selector: &str) -> String {
    Selector::parse(selector)
        .ok()
        .and_then(|sel| {
            document
                .select(&sel)
                .next()
                .and_then(|el| el.value().attr("content"))
                .map(|content| content.trim().to_string())
        })
        .unwrap_or_default()
}

fn extract_meta(document: &Html) -> MetaInfo {
    let title = document
        .select(&TITLE_SELECTOR)
        .next()
        .map(element_text)
        .unwrap_or_default();
    let description = meta_content(document, "meta[name='description']");

    MetaInfo {
        title_length: title.chars().count(),
        description_length: description.chars().count(),
        title,
        description,
        keywords: meta_content(document, "meta[name='keywords']"),
        viewport: meta_content(document, "meta[name='viewport']"),
        robots: meta_content(document, "meta[name='robots']"),
        canonical: document
            .select(&CANONICAL_SELECTOR)
            .next()
            .and_then(|el| el.value().attr("href"))
            .unwrap_or_default()
            .to_string(),
        og_title: meta_content(document, "meta[property='og:title']"),
        og_description: meta_content(document, "meta[property='og:description']"),
        og_image: meta_content(document, "meta[property='og:image']"),
        og_type: meta_content(document, "meta[property='og:type']"),
        twitter_card: meta_content(document, "meta[name='twitter:card']"),
        twitter_title: meta_content(document, "meta[name='twitter:title']"),
        twitter_description: meta_content(document, "meta[name='twitter:description']"),
    }
}

/// Headings in document order. Unrendered template placeholders are removed.
fn extract_headings(document: &Html) -> Vec<Heading> {
    let mut headings = Vec::new();

    for element in document.select(&HEADING_SELECTOR) {
        let tag = element.value().name().to_lowercase();
        let Some(level) = tag
            .strip_prefix('h')
            .and_then(|n| n.parse::<u8>().ok())
        else {
            continue;
        };

        let mut text = element_text(element);
        if text.is_empty() {
            continue;
        }
        if TEMPLATE_PLACEHOLDER.is_match(&text) {
            text = collapse_whitespace(&TEMPLATE_PLACEHOLDER.replace_all(&text, ""));
            if text.is_empty() {
                continue;
            }
        }

        headings.push(Heading {
            tag,
            text: truncate(&text, HEADING_TEXT_LIMIT),
            level,
        });
    }

    headings
}

fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

fn is_same_site(link: &Url, page: &Url) -> bool {
    match (link.host_str(), page.host_str()) {
        (Some(a), Some(b)) => a == b || strip_www(a) == strip_www(b),
        _ => false,
    }
}

fn extract_links(document: &Html, page_url: &Url) -> Vec<Link> {
    let mut links = Vec::new();

    for element in document.select(&LINK_SELECTOR) {
        let href = element.value().attr("href").unwrap_or_default().trim();
        if href.is_empty()
            || href.starts_with('#')
            || href.starts_with("javascript:")
            || href.starts_with("mailto:")
            || href.starts_with("tel:")
        {
            continue;
        }

        let Ok(absolute_url) = page_url.join(href) else {
            continue;
        };

        let rel = element.value().attr("rel").unwrap_or_default();

        links.push(Link {
            is_internal: is_same_site(&absolute_url, page_url),
            url: absolute_url.to_string(),
            text: truncate(&element_text(element), ANCHOR_TEXT_LIMIT),
            is_nofollow: rel.contains("nofollow"),
            has_title: element
                .value()
                .attr("title")
                .is_some_and(|title| !title.is_empty()),
        });
    }

    links
}

fn extract_images(document: &Html) -> Vec<Image> {
    document
        .select(&IMG_SELECTOR)
        .map(|element| {
            let attr = |name: &str| {
                element
                    .value()
                    .attr(name)
                    .filter(|value| !value.is_empty())
            };
            let alt = attr("alt").unwrap_or_default().to_string();

            Image {
                src: attr("src")
                    .or_else(|| attr("data-src"))
                    .unwrap_or_default()
                    .to_string(),
                has_alt: !alt.trim().is_empty(),
                alt,
                width: attr("width").unwrap_or_default().to_string(),
                height: attr("height").unwrap_or_default().to_string(),
                is_lazy_loaded: element.value().attr("loading") == Some("lazy")
                    || attr("data-src").is_some(),
            }
        })
        .collect()
}

fn extract_structured_data(document: &Html) -> Vec<StructuredDataItem> {
    let mut items = Vec::new();

    for element in document.select(&JSON_LD_SELECTOR) {
        let raw = element.text().collect::<String>();
        let data: Value = match serde_json::from_str(&raw) {
            Ok(data) => data,
            Err(e) => {
                tracing::debug!(error = %e, "Skipping malformed JSON-LD block");
                continue;
            }
        };

        match data {
            Value::Array(entries) => items.extend(entries.iter().filter_map(structured_item)),
            other => items.extend(structured_item(&other)),
        }
    }

    items
}

fn structured_item(value: &Value) -> Option<StructuredDataItem> {
    let object = value.as_object()?;

    let schema_type = match object.get("@type") {
        Some(Value::String(t)) if !t.is_empty() => t.clone(),
        Some(Value::Array(types)) if !types.is_empty() => types
            .iter()
            .map(stringify_value)
            .collect::<Vec<_>>()
            .join(", "),
        _ => "Unknown".to_string(),
    };

    let properties: BTreeMap<String, String> = object
        .iter()
        .filter(|(key, _)| key.as_str() != "@type" && key.as_str() != "@context")
        .map(|(key, value)| (key.clone(), truncate(&stringify_value(value), PROPERTY_VALUE_LIMIT)))
        .collect();

    Some(StructuredDataItem {
        schema_type,
        properties,
        raw_json: truncate(&value.to_string(), RAW_JSON_LIMIT),
    })
}

fn stringify_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
