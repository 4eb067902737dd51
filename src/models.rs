use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Facts about the fetch itself and the site root files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageInfo {
    pub url: String,
    pub final_url: String,
    pub status_code: u16,
    pub response_time_ms: u64,
    pub content_length: usize,
    pub content_type: String,
    pub word_count: usize,
    pub language: String,
    pub charset: String,
    pub has_https: bool,
    pub has_robots_txt: bool,
    pub has_sitemap: bool,
    pub robots_txt_content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetaInfo {
    pub title: String,
    pub title_length: usize,
    pub description: String,
    pub description_length: usize,
    pub keywords: String,
    pub viewport: String,
    pub robots: String,
    pub canonical: String,
    pub og_title: String,
    pub og_description: String,
    pub og_image: String,
    pub og_type: String,
    pub twitter_card: String,
    pub twitter_title: String,
    pub twitter_description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    pub tag: String,
    pub text: String,
    pub level: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
    pub text: String,
    pub is_internal: bool,
    pub is_nofollow: bool,
    pub has_title: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Image {
    pub src: String,
    pub alt: String,
    pub has_alt: bool,
    pub width: String,
    pub height: String,
    pub is_lazy_loaded: bool,
}

/// One JSON-LD object found on the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuredDataItem {
    #[serde(rename = "type")]
    pub schema_type: String,
    pub properties: BTreeMap<String, String>,
    pub raw_json: String,
}

/// Everything extracted from one fetched page. Read-only input to the checks.
///
/// `headings` keeps document order; the hierarchy and duplicate checks rely on it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageData {
    pub page_info: PageInfo,
    pub meta: MetaInfo,
    pub headings: Vec<Heading>,
    pub links: Vec<Link>,
    pub images: Vec<Image>,
    pub structured_data: Vec<StructuredDataItem>,
    pub raw_html: String,
    pub text_content: String,
}

impl PageData {
    pub fn internal_links(&self) -> impl Iterator<Item = &Link> {
        self.links.iter().filter(|link| link.is_internal)
    }

    pub fn external_links(&self) -> impl Iterator<Item = &Link> {
        self.links.iter().filter(|link| !link.is_internal)
    }

    pub fn headings_at(&self, level: u8) -> impl Iterator<Item = &Heading> {
        self.headings.iter().filter(move |h| h.level == level)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Info,
    Good,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Good => "good",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The nine rule-engine categories, in the order the checks run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Title")]
    Title,
    #[serde(rename = "Meta Description")]
    MetaDescription,
    #[serde(rename = "Headings")]
    Headings,
    #[serde(rename = "Images")]
    Images,
    #[serde(rename = "Links")]
    Links,
    #[serde(rename = "Technical")]
    Technical,
    #[serde(rename = "Content")]
    Content,
    #[serde(rename = "Social Media")]
    SocialMedia,
    #[serde(rename = "URL")]
    Url,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Title,
        Category::MetaDescription,
        Category::Headings,
        Category::Images,
        Category::Links,
        Category::Technical,
        Category::Content,
        Category::SocialMedia,
        Category::Url,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Title => "Title",
            Category::MetaDescription => "Meta Description",
            Category::Headings => "Headings",
            Category::Images => "Images",
            Category::Links => "Links",
            Category::Technical => "Technical",
            Category::Content => "Content",
            Category::SocialMedia => "Social Media",
            Category::Url => "URL",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub category: Category,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub recommendation: String,
    pub current_value: String,
    pub ideal_value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: Category,
    pub score: u32,
    pub max_score: u32,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub score: CategoryScore,
    pub issues: Vec<Issue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeoAnalysis {
    pub overall_score: u32,
    pub scores: Vec<CategoryScore>,
    pub issues: Vec<Issue>,
    pub strengths: Vec<String>,
    pub summary: String,
    pub llm_recommendations: String,
}

impl SeoAnalysis {
    pub fn count(&self, severity: Severity) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.severity == severity)
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordInfo {
    pub keyword: String,
    pub density: f64,
    pub count: usize,
    pub in_title: bool,
    pub in_description: bool,
    pub in_h1: bool,
    pub in_headings: bool,
    pub in_url: bool,
    pub prominence_score: u32,
}

/// Search-engine position of the target site for one keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRanking {
    pub keyword: String,
    pub position: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordData {
    pub target_url: String,
    pub primary_keywords: Vec<KeywordInfo>,
    pub secondary_keywords: Vec<KeywordInfo>,
    pub rankings: Vec<KeywordRanking>,
    pub missing_keywords: Vec<String>,
    pub keyword_suggestions: Vec<String>,
    pub content_gaps: Vec<String>,
    pub llm_analysis: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub description: String,
}

/// Comparable on-page metrics for a crawled competitor (or the target itself).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetitorSeo {
    pub word_count: usize,
    pub title_length: usize,
    pub description_length: usize,
    pub response_time_ms: u64,
    pub image_count: usize,
    pub internal_links: usize,
    pub has_structured_data: bool,
    pub has_og_tags: bool,
    pub has_twitter_card: bool,
    pub overall_score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetitorInfo {
    pub url: String,
    pub title: String,
    pub description: String,
    pub domain: String,
    pub keyword_overlap: Vec<String>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub seo: Option<CompetitorSeo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetitorData {
    pub target_url: String,
    pub competitors: Vec<CompetitorInfo>,
    pub market_summary: String,
    pub competitive_advantages: Vec<String>,
    pub competitive_gaps: Vec<String>,
    pub llm_analysis: String,
}

/// The assembled result of one `analyze` run. Any branch may be missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeoReport {
    pub url: String,
    pub timestamp: String,
    pub crawl_data: Option<PageData>,
    pub seo_analysis: Option<SeoAnalysis>,
    pub competitor_data: Option<CompetitorData>,
    pub keyword_data: Option<KeywordData>,
    pub executive_summary: String,
    pub errors: Vec<String>,
    pub report_html_path: String,
}
