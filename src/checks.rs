//! The rule-based SEO checks.
//!
//! Each check starts at 100 and subtracts a fixed penalty per violated
//! condition, in the order the conditions are evaluated below. Scores are
//! floored at 0. Checks are pure: missing fields are ordinary input.

use crate::models::{Category, CategoryScore, CheckResult, Issue, PageData, Severity};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use url::Url;

/// A single check over one page.
pub type Check = fn(&PageData) -> CheckResult;

/// All checks in report order.
pub const ALL_CHECKS: [Check; 9] = [
    check_title,
    check_meta_description,
    check_headings,
    check_images,
    check_links,
    check_technical,
    check_content,
    check_social_media,
    check_url,
];

static GENERIC_ALT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(image|img|foto|photo|bild|picture|banner|logo|icon|grafik|graphic|untitled|dsc[_\d]|img[_\d]|screenshot)\s*\d*$",
    )
    .expect("generic alt pattern should be valid")
});

/// Scores and issues from one pass over all checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckRun {
    pub scores: Vec<CategoryScore>,
    pub issues: Vec<Issue>,
}

/// Runs every check against the page, keeping each check's issue order.
pub fn run_all_checks(page: &PageData) -> CheckRun {
    let mut scores = Vec::with_capacity(ALL_CHECKS.len());
    let mut issues = Vec::new();

    for check in ALL_CHECKS {
        let result = check(page);
        scores.push(result.score);
        issues.extend(result.issues);
    }

    CheckRun { scores, issues }
}

/// Collects penalties and issues for one category.
struct Tally {
    category: Category,
    score: i32,
    issues: Vec<Issue>,
}

impl Tally {
    fn new(category: Category) -> Self {
        Self {
            category,
            score: 100,
            issues: Vec::new(),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn penalize(
        &mut self,
        penalty: i32,
        severity: Severity,
        title: &str,
        description: String,
        recommendation: &str,
        current_value: String,
        ideal_value: &str,
    ) {
        self.score -= penalty;
        self.issues.push(Issue {
            category: self.category,
            title: title.to_string(),
            description,
            severity,
            recommendation: recommendation.to_string(),
            current_value,
            ideal_value: ideal_value.to_string(),
        });
    }

    fn finish(self, details: String) -> CheckResult {
        CheckResult {
            score: CategoryScore {
                category: self.category,
                score: self.score.max(0) as u32,
                max_score: 100,
                details,
            },
            issues: self.issues,
        }
    }
}

/// The "page is unusable for this property" outcome: score 0, one critical issue.
fn missing(
    category: Category,
    title: &str,
    description: &str,
    recommendation: &str,
    current_value: &str,
    ideal_value: &str,
) -> CheckResult {
    CheckResult {
        score: CategoryScore {
            category,
            score: 0,
            max_score: 100,
            details: String::new(),
        },
        issues: vec![Issue {
            category,
            title: title.to_string(),
            description: description.to_string(),
            severity: Severity::Critical,
            recommendation: recommendation.to_string(),
            current_value: current_value.to_string(),
            ideal_value: ideal_value.to_string(),
        }],
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

fn alphanumeric_lowercase(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// True when the title is nothing but the site's domain name.
fn title_is_domain(title: &str, page_url: &str) -> bool {
    let Some(host) = Url::parse(page_url)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
    else {
        return false;
    };
    let domain = host.strip_prefix("www.").unwrap_or(&host);
    let domain = alphanumeric_lowercase(domain);

    !domain.is_empty() && alphanumeric_lowercase(title) == domain
}

fn starts_with_separator(title: &str) -> bool {
    title
        .chars()
        .next()
        .is_some_and(|c| c.is_whitespace() || matches!(c, '|' | ':' | '-' | '–' | '—'))
}

pub fn check_title(page: &PageData) -> CheckResult {
    let title = &page.meta.title;
    let length = page.meta.title_length;

    if title.is_empty() {
        return missing(
            Category::Title,
            "Missing title tag",
            "The page has no title tag. The title is the most important on-page SEO factor and is shown as the headline in search results.",
            "Add a unique, descriptive title of 50-60 characters containing the main keyword, e.g. \"Main keyword - Description | Brand\".",
            "No title",
            "50-60 characters",
        );
    }

    let mut tally = Tally::new(Category::Title);

    if length < 30 {
        tally.penalize(
            30,
            Severity::Warning,
            "Title too short",
            format!(
                "The title has only {} characters. Search engines favour titles of 50-60 characters; short titles waste space in the results.",
                length
            ),
            "Extend the title to 50-60 characters with relevant keywords.",
            format!("{} characters", length),
            "50-60 characters",
        );
    } else if length > 60 {
        tally.penalize(
            15,
            Severity::Warning,
            "Title too long",
            format!(
                "The title has {} characters and will be truncated in search results.",
                length
            ),
            "Shorten the title to at most 60 characters. Put the key terms first and the brand last.",
            format!("{} characters", length),
            "50-60 characters",
        );
    }

    if title_is_domain(title, &page.page_info.url) {
        tally.penalize(
            25,
            Severity::Warning,
            "Title is only the domain name",
            "The title consists of the domain name and contains no descriptive keywords.".to_string(),
            "Write a descriptive title around the main keyword, e.g. \"Main keyword - Description | Brand\".",
            title.clone(),
            "Descriptive title",
        );
    }

    if starts_with_separator(title) {
        tally.penalize(
            10,
            Severity::Info,
            "Title starts with a separator",
            "The title begins with a separator instead of keywords. The first words of a title carry the most weight.".to_string(),
            "Lead with the most important keywords; use separators only before the brand name.",
            truncate(title, 20),
            "Keywords first",
        );
    }

    tally.finish(title.clone())
}

pub fn check_meta_description(page: &PageData) -> CheckResult {
    let description = &page.meta.description;
    let length = page.meta.description_length;

    if description.is_empty() {
        return missing(
            Category::MetaDescription,
            "Missing meta description",
            "The page has no meta description. Search engines will show an arbitrary text snippet instead.",
            "Write a unique meta description of 150-160 characters with the main keyword and a call to action.",
            "No description",
            "150-160 characters",
        );
    }

    let mut tally = Tally::new(Category::MetaDescription);

    if length < 80 {
        tally.penalize(
            30,
            Severity::Warning,
            "Meta description far too short",
            format!(
                "The description has only {} characters and leaves most of the snippet space unused.",
                length
            ),
            "Extend the description to 150-160 characters with keywords, a unique selling point and a call to action.",
            format!("{} characters", length),
            "150-160 characters",
        );
    } else if length < 120 {
        tally.penalize(
            15,
            Severity::Info,
            "Meta description a bit short",
            format!(
                "The description has {} characters. The optimum is 150-160.",
                length
            ),
            "Extend the description to 150-160 characters for full visibility in search results.",
            format!("{} characters", length),
            "150-160 characters",
        );
    } else if length > 160 {
        tally.penalize(
            10,
            Severity::Info,
            "Meta description too long",
            format!(
                "The description has {} characters and will be truncated in search results.",
                length
            ),
            "Shorten the description to 160 characters; put the key message in the first 120.",
            format!("{} characters", length),
            "150-160 characters",
        );
    }

    if description.trim().to_lowercase() == page.meta.title.trim().to_lowercase() {
        tally.penalize(
            15,
            Severity::Warning,
            "Description identical to title",
            "Meta description and title are the same. They should complement each other.".to_string(),
            "Write a separate description that adds detail beyond the title.",
            "Same as title".to_string(),
            "Unique text",
        );
    }

    tally.finish(truncate(description, 100))
}

pub fn check_headings(page: &PageData) -> CheckResult {
    let mut tally = Tally::new(Category::Headings);
    let h1: Vec<_> = page.headings_at(1).collect();
    let h2_count = page.headings_at(2).count();

    match h1.as_slice() {
        [] => tally.penalize(
            40,
            Severity::Critical,
            "No H1 heading",
            "The page has no H1. After the title, the H1 is the strongest signal of the page topic.".to_string(),
            "Add exactly one H1 that contains the main keyword and describes the page.",
            "0 H1 headings".to_string(),
            "1 H1 heading",
        ),
        [only] => {
            let length = only.text.chars().count();
            if length > 70 {
                tally.penalize(
                    10,
                    Severity::Info,
                    "H1 too long",
                    format!("The H1 has {} characters and loses focus.", length),
                    "Shorten the H1 to at most 70 characters and focus it on the main keyword.",
                    format!("{} characters", length),
                    "Max. 70 characters",
                );
            }
            if !only.text.is_empty()
                && only.text.trim().to_lowercase() == page.meta.title.trim().to_lowercase()
            {
                tally.penalize(
                    5,
                    Severity::Info,
                    "H1 identical to title",
                    "The H1 repeats the title word for word; a variation covers more keyword variants.".to_string(),
                    "Vary the H1 slightly, e.g. phrase it in more detail or use another keyword variant.",
                    "Identical".to_string(),
                    "Slightly varied",
                );
            }
        }
        many => tally.penalize(
            20,
            Severity::Warning,
            "Multiple H1 headings",
            format!(
                "The page has {} H1 headings. One H1 per page keeps the main topic clear.",
                many.len()
            ),
            "Turn all but one H1 into H2 headings.",
            format!("{} H1 headings", many.len()),
            "1 H1 heading",
        ),
    }

    if h2_count == 0 && page.page_info.word_count > 100 {
        tally.penalize(
            15,
            Severity::Warning,
            "No H2 headings",
            "The page has no H2 headings to structure its content.".to_string(),
            "Use H2 headings to split the content into sections, each with a relevant sub-keyword.",
            "0 H2 headings".to_string(),
            "2-8 H2 headings",
        );
    }

    if let Some(pair) = page
        .headings
        .windows(2)
        .find(|pair| pair[1].level > pair[0].level.saturating_add(1))
    {
        let (from, to) = (pair[0].level, pair[1].level);
        tally.penalize(
            10,
            Severity::Warning,
            "Broken heading hierarchy",
            format!("Jump from H{} straight to H{}; intermediate levels are skipped.", from, to),
            &format!(
                "Insert the missing H{} level. The hierarchy must not have gaps: H1 -> H2 -> H3.",
                from.saturating_add(1)
            ),
            format!("H{} -> H{}", from, to),
            "Continuous hierarchy",
        );
    }

    let mut seen = HashSet::new();
    let mut duplicates: Vec<String> = Vec::new();
    for heading in &page.headings {
        let text = heading.text.trim().to_lowercase();
        if !seen.insert(text.clone()) && !duplicates.contains(&text) {
            duplicates.push(text);
        }
    }
    if let Some(first) = duplicates.first() {
        tally.penalize(
            10,
            Severity::Info,
            "Duplicate headings",
            format!(
                "{} heading text(s) appear more than once, e.g. \"{}\".",
                duplicates.len(),
                first
            ),
            "Make every heading unique so each covers a different aspect of the topic.",
            format!("{} duplicates", duplicates.len()),
            "0 duplicates",
        );
    }

    tally.finish(format!("H1: {}, H2: {}", h1.len(), h2_count))
}

pub fn check_images(page: &PageData) -> CheckResult {
    let mut tally = Tally::new(Category::Images);
    let total = page.images.len();

    if total == 0 {
        if page.page_info.word_count > 300 {
            tally.penalize(
                10,
                Severity::Info,
                "No images on the page",
                "The page has no visual content. Images improve engagement and bring image-search traffic.".to_string(),
                "Add relevant images with descriptive alt text and meaningful file names.",
                "0 images".to_string(),
                "At least 1 image",
            );
        }
        return tally.finish("No images".to_string());
    }

    let without_alt = page.images.iter().filter(|img| !img.has_alt).count();
    let pct_without = without_alt as f64 / total as f64 * 100.0;
    let current = format!("{}/{} without alt", without_alt, total);

    if pct_without > 50.0 {
        tally.penalize(
            35,
            Severity::Critical,
            "Most images lack alt text",
            format!(
                "{} of {} images ({}%) have no alt text. Alt text is essential for SEO and accessibility.",
                without_alt,
                total,
                pct_without.round()
            ),
            "Give every image a descriptive alt text of 5-15 words, with a keyword where it fits.",
            current,
            "0 without alt text",
        );
    } else if pct_without > 20.0 {
        tally.penalize(
            20,
            Severity::Warning,
            "Images without alt text",
            format!("{} of {} images have no alt text.", without_alt, total),
            "Add the missing alt texts, describing each image precisely.",
            current,
            "0 without alt text",
        );
    } else if pct_without > 0.0 {
        tally.penalize(
            8,
            Severity::Info,
            "Some images without alt text",
            format!("{} of {} images have no alt text.", without_alt, total),
            "Add the missing alt texts.",
            current,
            "0 without alt text",
        );
    }

    let generic = page
        .images
        .iter()
        .filter(|img| img.has_alt && GENERIC_ALT.is_match(img.alt.trim()))
        .count();
    if generic > 0 {
        tally.penalize(
            10,
            Severity::Warning,
            "Generic alt texts",
            format!(
                "{} images have meaningless alt texts such as \"image\" or \"photo\".",
                generic
            ),
            "Replace generic alt texts with descriptions, e.g. \"Red sofa in a modern living room\".",
            format!("{} generic", generic),
            "Descriptive texts",
        );
    }

    let too_long = page
        .images
        .iter()
        .filter(|img| img.alt.chars().count() > 125)
        .count();
    if too_long > 0 {
        tally.penalize(
            5,
            Severity::Info,
            "Alt texts too long",
            format!(
                "{} images have alt texts over 125 characters; screen readers read them in full.",
                too_long
            ),
            "Keep alt texts under 125 characters.",
            format!("{} too long", too_long),
            "Max. 125 characters",
        );
    }

    tally.finish(format!("{} images, {} with alt", total, total - without_alt))
}

pub fn check_links(page: &PageData) -> CheckResult {
    let mut tally = Tally::new(Category::Links);
    let internal = page.internal_links().count();
    let external = page.external_links().count();
    let total = page.links.len();

    if internal == 0 {
        tally.penalize(
            30,
            Severity::Critical,
            "No internal links",
            "The page links to no other page of the site. Internal links drive crawlability and link equity.".to_string(),
            "Add at least 3-5 internal links to related pages with descriptive anchor text.",
            "0 internal".to_string(),
            "10+ internal links",
        );
    } else if internal < 3 {
        tally.penalize(
            20,
            Severity::Warning,
            "Few internal links",
            format!(
                "Only {} internal links. Strong internal linking helps search engines discover and weigh pages.",
                internal
            ),
            "Link to more related content; contextual links in body text are the most valuable.",
            format!("{} internal", internal),
            "10+ internal links",
        );
    }

    if external == 0 && page.page_info.word_count > 300 {
        tally.penalize(
            5,
            Severity::Info,
            "No external links",
            "The page cites no external source. Outbound links to authoritative sites can support relevance.".to_string(),
            "Link to trustworthy external sources such as studies or official sites.",
            "0 external".to_string(),
            "2-5 external links",
        );
    }

    let empty_anchor = page
        .links
        .iter()
        .filter(|link| link.text.trim().is_empty())
        .count();
    if empty_anchor > 0 {
        tally.penalize(
            10,
            Severity::Warning,
            "Links without anchor text",
            format!(
                "{} links have no visible anchor text. Anchor text tells search engines what the target is about.",
                empty_anchor
            ),
            "Give every link a descriptive anchor text.",
            format!("{} without text", empty_anchor),
            "0 without anchor text",
        );
    }

    if total > 150 {
        tally.penalize(
            10,
            Severity::Info,
            "Very many links",
            format!(
                "The page has {} links. Too many links dilute the value passed by each one.",
                total
            ),
            "Trim navigation and footer links that are not needed.",
            format!("{} links", total),
            "Max. 100-150",
        );
    }

    let internal_nofollow = page
        .internal_links()
        .filter(|link| link.is_nofollow)
        .count();
    if internal_nofollow > 0 {
        tally.penalize(
            10,
            Severity::Warning,
            "Internal links marked nofollow",
            format!(
                "{} internal links carry nofollow, which blocks link equity to your own pages.",
                internal_nofollow
            ),
            "Remove nofollow from internal links.",
            format!("{} nofollow", internal_nofollow),
            "0 internal nofollow",
        );
    }

    tally.finish(format!("{} internal, {} external", internal, external))
}

pub fn check_technical(page: &PageData) -> CheckResult {
    let mut tally = Tally::new(Category::Technical);
    let info = &page.page_info;

    if info.status_code != 200 {
        tally.penalize(
            40,
            Severity::Critical,
            "HTTP status is not 200",
            format!("The page answers with status {} instead of 200 OK.", info.status_code),
            "Fix the status code: check redirects for 3xx, missing pages for 4xx, server errors for 5xx.",
            info.status_code.to_string(),
            "200 OK",
        );
    }

    if !info.has_https {
        tally.penalize(
            25,
            Severity::Critical,
            "No HTTPS",
            "The page is not served over HTTPS. HTTPS is a ranking factor and browsers flag HTTP pages as insecure.".to_string(),
            "Install a TLS certificate and redirect all HTTP URLs to HTTPS with a 301.",
            "HTTP".to_string(),
            "HTTPS",
        );
    }

    if !info.final_url.is_empty() && info.final_url != info.url {
        tally.penalize(
            5,
            Severity::Info,
            "Redirect detected",
            format!("The URL redirects: {} -> {}", info.url, info.final_url),
            "Link the canonical URL directly and avoid redirect chains.",
            "Redirect".to_string(),
            "Direct URL",
        );
    }

    if info.response_time_ms > 3000 {
        tally.penalize(
            25,
            Severity::Critical,
            "Very slow response",
            format!("Server response time: {}ms.", info.response_time_ms),
            "Improve server performance: caching, a CDN, better hosting, faster queries.",
            format!("{}ms", info.response_time_ms),
            "<500ms",
        );
    } else if info.response_time_ms > 1000 {
        tally.penalize(
            10,
            Severity::Warning,
            "Slow response",
            format!("Server response time: {}ms. Aim for under 500ms.", info.response_time_ms),
            "Check server caching, enable gzip/brotli compression, consider a CDN.",
            format!("{}ms", info.response_time_ms),
            "<500ms",
        );
    }

    if !info.has_robots_txt {
        tally.penalize(
            8,
            Severity::Warning,
            "No robots.txt",
            "No robots.txt found. It tells search engines which areas they may crawl.".to_string(),
            "Create a robots.txt at the site root that also references the sitemap.",
            "Missing".to_string(),
            "Present",
        );
    }

    let robots = page.meta.robots.to_lowercase();
    if robots.contains("noindex") {
        tally.penalize(
            40,
            Severity::Critical,
            "Page blocked with noindex",
            "The meta robots tag contains \"noindex\"; search engines will not index this page.".to_string(),
            "Remove noindex if the page should appear in search results.",
            robots.clone(),
            "index, follow",
        );
    } else if robots.contains("nofollow") {
        tally.penalize(
            10,
            Severity::Warning,
            "Page marked nofollow",
            "The meta robots tag contains \"nofollow\", so no link on this page is followed.".to_string(),
            "Remove nofollow from the meta robots tag.",
            robots.clone(),
            "index, follow",
        );
    }

    if !info.has_sitemap {
        tally.penalize(
            8,
            Severity::Warning,
            "No XML sitemap",
            "No sitemap.xml found. A sitemap helps search engines find every page.".to_string(),
            "Publish an XML sitemap at /sitemap.xml and reference it in robots.txt.",
            "Missing".to_string(),
            "Present",
        );
    }

    if page.meta.viewport.is_empty() {
        tally.penalize(
            15,
            Severity::Critical,
            "No viewport meta tag",
            "No viewport tag present. With mobile-first indexing this is critical for rankings.".to_string(),
            "Add <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\"> to the head.",
            "Missing".to_string(),
            "Viewport present",
        );
    }

    if page.meta.canonical.is_empty() {
        tally.penalize(
            5,
            Severity::Info,
            "No canonical tag",
            "No canonical link present. It prevents duplicate content across URL variants.".to_string(),
            "Add a self-referencing <link rel=\"canonical\" href=\"...\">.",
            "Missing".to_string(),
            "Self-referencing canonical",
        );
    }

    if info.language.is_empty() {
        tally.penalize(
            8,
            Severity::Warning,
            "No lang attribute",
            "The html element has no lang attribute to declare the page language.".to_string(),
            "Add a lang attribute, e.g. <html lang=\"en\">.",
            "Missing".to_string(),
            "e.g. lang=\"en\"",
        );
    }

    let size_kb = (info.content_length as f64 / 1024.0).round() as u64;
    if size_kb > 3000 {
        tally.penalize(
            10,
            Severity::Warning,
            "Very large HTML document",
            format!("The HTML is {} KB. Large documents load slowly on mobile connections.", size_kb),
            "Move inline CSS/JS to external files, remove comments, enable compression.",
            format!("{} KB", size_kb),
            "<500 KB",
        );
    }

    tally.finish(format!(
        "Status {}, {}ms",
        info.status_code, info.response_time_ms
    ))
}

pub fn check_content(page: &PageData) -> CheckResult {
    let mut tally = Tally::new(Category::Content);
    let words = page.page_info.word_count;

    if words < 100 {
        tally.penalize(
            40,
            Severity::Critical,
            "Very little content",
            format!(
                "Only {} words. Search engines can barely assess the page; thin content ranks poorly.",
                words
            ),
            "Write at least 300 words of useful, unique content that matches the search intent.",
            format!("{} words", words),
            "300+ words",
        );
    } else if words < 300 {
        tally.penalize(
            25,
            Severity::Warning,
            "Little content",
            format!("Only {} words. Good rankings usually need more than 300.", words),
            "Expand the content: answer audience questions and cover related topics.",
            format!("{} words", words),
            "300+ words",
        );
    } else if words < 600 {
        tally.penalize(
            10,
            Severity::Info,
            "Moderate content length",
            format!("{} words. Competitive keywords usually call for 600+.", words),
            "Add depth where it helps; quality beats quantity.",
            format!("{} words", words),
            "600+ words",
        );
    }

    let html_len = page.raw_html.chars().count();
    let text_len = page.text_content.chars().count();
    if html_len > 1000 && text_len > 0 {
        let ratio = (text_len as f64 / html_len as f64 * 100.0).round() as u64;
        if ratio < 10 {
            tally.penalize(
                10,
                Severity::Info,
                "Low text-to-HTML ratio",
                format!("Only {}% of the HTML is visible text, which points to bloated markup.", ratio),
                "Remove wrapper elements, externalise CSS/JS and reduce inline styles.",
                format!("{}%", ratio),
                "25%+",
            );
        }
    }

    if page.structured_data.is_empty() {
        tally.penalize(
            15,
            Severity::Warning,
            "No structured data (Schema.org)",
            "No JSON-LD found. Structured data enables rich results such as ratings, FAQs and breadcrumbs.".to_string(),
            "Add JSON-LD matching the page type: Organization, LocalBusiness, Article, Product, FAQPage or BreadcrumbList.",
            "0 schema types".to_string(),
            "At least 1 schema type",
        );
    } else {
        let types = page
            .structured_data
            .iter()
            .map(|item| item.schema_type.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        tally.penalize(
            0,
            Severity::Good,
            "Structured data present",
            format!(
                "{} schema.org type(s) found: {}. This can enable rich results.",
                page.structured_data.len(),
                types
            ),
            "Validate the markup regularly with a rich results testing tool.",
            types.clone(),
            "",
        );
    }

    tally.finish(format!("{} words", words))
}

pub fn check_social_media(page: &PageData) -> CheckResult {
    let mut tally = Tally::new(Category::SocialMedia);
    let meta = &page.meta;

    if meta.og_title.is_empty() {
        tally.penalize(
            20,
            Severity::Warning,
            "No og:title",
            "No Open Graph title. Shared links show a generic or missing headline.".to_string(),
            "Add <meta property=\"og:title\" content=\"...\">.",
            "Missing".to_string(),
            "Present",
        );
    }
    if meta.og_description.is_empty() {
        tally.penalize(
            15,
            Severity::Warning,
            "No og:description",
            "No Open Graph description. Shared links show no summary in the preview.".to_string(),
            "Add <meta property=\"og:description\" content=\"...\">.",
            "Missing".to_string(),
            "Present",
        );
    }
    if meta.og_image.is_empty() {
        tally.penalize(
            20,
            Severity::Warning,
            "No og:image",
            "No Open Graph image. Links without a preview image get far fewer clicks.".to_string(),
            "Add <meta property=\"og:image\" content=\"https://...\"> with an image of at least 1200x630px.",
            "Missing".to_string(),
            "1200x630px image",
        );
    }
    if meta.og_type.is_empty() {
        tally.penalize(
            5,
            Severity::Info,
            "No og:type",
            "No Open Graph type; platforms cannot tell what kind of content is shared.".to_string(),
            "Add <meta property=\"og:type\" content=\"website\"> (or article, product, ...).",
            "Missing".to_string(),
            "e.g. website",
        );
    }
    if meta.twitter_card.is_empty() {
        tally.penalize(
            10,
            Severity::Info,
            "No Twitter card",
            "No Twitter/X card tags; links appear without a rich preview.".to_string(),
            "Add <meta name=\"twitter:card\" content=\"summary_large_image\">.",
            "Missing".to_string(),
            "summary_large_image",
        );
    }

    tally.finish(String::new())
}

pub fn check_url(page: &PageData) -> CheckResult {
    let mut tally = Tally::new(Category::Url);
    let full_url = if page.page_info.final_url.is_empty() {
        &page.page_info.url
    } else {
        &page.page_info.final_url
    };

    let Ok(parsed) = Url::parse(full_url) else {
        return tally.finish(String::new());
    };
    let path = parsed.path();

    if let Some(query) = parsed.query().filter(|q| !q.is_empty()) {
        tally.penalize(
            10,
            Severity::Info,
            "URL has query parameters",
            format!(
                "Query parameters found: ?{}. Parameter URLs can cause duplicate content.",
                truncate(query, 50)
            ),
            "Prefer readable URLs without parameters, or point the canonical at the clean version.",
            format!("?{}", truncate(query, 39)),
            "No parameters",
        );
    }

    let length = full_url.chars().count();
    if length > 100 {
        tally.penalize(
            10,
            Severity::Info,
            "URL too long",
            format!("The URL has {} characters. Short, readable URLs perform better.", length),
            "Keep URLs under 75 characters; drop needless directory levels and filler words.",
            format!("{} characters", length),
            "Max. 75 characters",
        );
    }

    if path != path.to_lowercase() {
        tally.penalize(
            10,
            Severity::Warning,
            "Uppercase letters in URL",
            "The path contains uppercase letters. URLs are case-sensitive, so variants can count as duplicates.".to_string(),
            "Use lowercase URLs only and 301-redirect the uppercase variants.",
            truncate(path, 40),
            "Lowercase only",
        );
    }

    if path.contains('_') {
        tally.penalize(
            5,
            Severity::Info,
            "Underscores in URL",
            "The path uses underscores. Hyphens are treated as word separators, underscores are not.".to_string(),
            "Replace underscores with hyphens and redirect the old URLs.",
            "Underscores".to_string(),
            "Hyphens (-)",
        );
    }

    if path.contains(['%', '&', '=', '+']) {
        tally.penalize(
            5,
            Severity::Info,
            "Special characters in URL path",
            "The path contains encoded or special characters that make it hard to read and share.".to_string(),
            "Use readable paths limited to a-z, 0-9 and hyphens.",
            "Special characters".to_string(),
            "Only a-z, 0-9, -",
        );
    }

    tally.finish(truncate(path, 50))
}
