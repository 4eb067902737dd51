//! Keyword extraction, prominence scoring and the keyword branch.

use crate::llm::{TextCompletion, generate_or};
use crate::models::{KeywordData, KeywordInfo, KeywordRanking, PageData};
use crate::search::{CompetitorSearch, search_keyword_rankings};
use crate::workflow::Branch;
use anyhow::Result;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

/// Keywords extracted per page.
pub const TOP_KEYWORDS: usize = 20;
/// Keywords whose search ranking is looked up.
pub const RANKED_KEYWORDS: usize = 5;
/// Cap for each of the primary and secondary lists.
pub const BUCKET_SIZE: usize = 10;
/// Keywords at or above this prominence are primary.
pub const PRIMARY_THRESHOLD: u32 = 30;

pub const WEIGHT_TITLE: u32 = 30;
pub const WEIGHT_DESCRIPTION: u32 = 20;
pub const WEIGHT_H1: u32 = 25;
pub const WEIGHT_HEADINGS: u32 = 10;
pub const WEIGHT_URL: u32 = 15;

pub const KEYWORD_FALLBACK: &str = "LLM unavailable for keyword analysis.";

static WORD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[a-zäöüß]{3,}\b").expect("word pattern should be valid"));

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // German
        "der", "die", "das", "ein", "eine", "und", "oder", "aber", "von", "mit", "auf",
        "fuer", "für", "ist", "sind", "war", "hat", "haben", "wird", "werden", "kann",
        "nicht", "auch", "als", "nach", "bei", "aus", "wie", "wenn", "den", "dem", "des",
        "sich", "ich", "wir", "sie", "ihr", "uns", "was", "noch", "nur", "ueber", "über",
        "vor", "bis", "durch", "unter", "ohne", "dass", "daß", "diese", "dieser", "dieses",
        "einem", "einen", "einer", "zum", "zur", "vom", "mehr",
        // English
        "the", "and", "for", "are", "but", "not", "you", "all", "can", "had", "her", "was",
        "one", "our", "out", "has", "have", "been", "from", "this", "that", "with", "will",
        "each", "make", "how", "them", "then", "its", "over", "such", "into", "than",
        "most", "also", "some", "just", "about", "would", "could", "should", "their",
        "which", "when", "where", "what", "there", "here", "other", "your", "they", "very",
        "only", "does", "did", "his", "him", "who", "may", "new", "now", "any", "being",
        "both", "between", "after", "before", "because", "well",
    ]
    .into_iter()
    .collect()
});

/// A content word and how often it occurs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordCount {
    pub word: String,
    pub count: usize,
}

/// Most frequent content words of `text`, most frequent first.
///
/// Equal counts keep the order in which the words first appeared.
pub fn extract_keywords(text: &str, top_n: usize) -> Vec<KeywordCount> {
    let lowered = text.to_lowercase();
    let mut counts: Vec<KeywordCount> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for word in WORD_PATTERN.find_iter(&lowered).map(|m| m.as_str()) {
        if STOP_WORDS.contains(word) {
            continue;
        }
        match index.get(word) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(word, counts.len());
                counts.push(KeywordCount {
                    word: word.to_string(),
                    count: 1,
                });
            }
        }
    }

    // sort_by is stable
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(top_n);
    counts
}

/// Lowercased page locations a keyword is looked up in.
struct Placements {
    title: String,
    description: String,
    h1: Vec<String>,
    headings: Vec<String>,
    url: String,
}

impl Placements {
    fn of(page: &PageData) -> Self {
        Self {
            title: page.meta.title.to_lowercase(),
            description: page.meta.description.to_lowercase(),
            h1: page
                .headings_at(1)
                .map(|h| h.text.to_lowercase())
                .collect(),
            headings: page.headings.iter().map(|h| h.text.to_lowercase()).collect(),
            url: page.page_info.url.to_lowercase(),
        }
    }
}

/// Prominence from the five placement flags, before any ranking boost.
pub fn prominence(info: &KeywordInfo) -> u32 {
    [
        (info.in_title, WEIGHT_TITLE),
        (info.in_description, WEIGHT_DESCRIPTION),
        (info.in_h1, WEIGHT_H1),
        (info.in_headings, WEIGHT_HEADINGS),
        (info.in_url, WEIGHT_URL),
    ]
    .iter()
    .filter(|(flag, _)| *flag)
    .map(|(_, weight)| weight)
    .sum()
}

/// Density, placement flags and prominence for each extracted keyword.
pub fn score_keywords(page: &PageData, keywords: &[KeywordCount]) -> Vec<KeywordInfo> {
    let total_words = page.page_info.word_count.max(1);
    let places = Placements::of(page);

    keywords
        .iter()
        .map(|kw| {
            let word = kw.word.as_str();
            let density = kw.count as f64 / total_words as f64 * 100.0;
            let mut info = KeywordInfo {
                keyword: kw.word.clone(),
                density: (density * 100.0).round() / 100.0,
                count: kw.count,
                in_title: places.title.contains(word),
                in_description: places.description.contains(word),
                in_h1: places.h1.iter().any(|t| t.contains(word)),
                in_headings: places.headings.iter().any(|t| t.contains(word)),
                in_url: places.url.contains(word),
                prominence_score: 0,
            };
            info.prominence_score = prominence(&info);
            info
        })
        .collect()
}

/// Raises prominence by `21 - rank` for keywords the target ranks for, capped at 100.
pub fn apply_ranking_boost(keywords: &mut [KeywordInfo], rankings: &[KeywordRanking]) {
    for info in keywords.iter_mut() {
        let rank = rankings
            .iter()
            .find(|r| r.keyword == info.keyword)
            .and_then(|r| r.position);
        if let Some(rank) = rank {
            let boost = 21u32.saturating_sub(rank as u32);
            info.prominence_score = (info.prominence_score + boost).min(100);
        }
    }
}

/// Splits into primary and secondary keywords, each capped, keeping frequency order.
pub fn split_by_prominence(keywords: Vec<KeywordInfo>) -> (Vec<KeywordInfo>, Vec<KeywordInfo>) {
    let (mut primary, mut secondary): (Vec<_>, Vec<_>) = keywords
        .into_iter()
        .partition(|k| k.prominence_score >= PRIMARY_THRESHOLD);
    primary.truncate(BUCKET_SIZE);
    secondary.truncate(BUCKET_SIZE);
    (primary, secondary)
}

/// The keyword branch: extraction, rankings, scoring and an LLM write-up.
pub struct KeywordAnalyzer<'a> {
    search: &'a dyn CompetitorSearch,
    llm: &'a dyn TextCompletion,
    delay: Duration,
}

impl<'a> KeywordAnalyzer<'a> {
    pub fn new(search: &'a dyn CompetitorSearch, llm: &'a dyn TextCompletion, delay: Duration) -> Self {
        Self { search, llm, delay }
    }

    pub async fn analyze(&self, page: &PageData) -> KeywordData {
        let extracted = extract_keywords(&page.text_content, TOP_KEYWORDS);
        let scored = score_keywords(page, &extracted);

        let ranked: Vec<String> = scored
            .iter()
            .take(RANKED_KEYWORDS)
            .map(|k| k.keyword.clone())
            .collect();
        let rankings =
            search_keyword_rankings(self.search, &page.page_info.url, &ranked, self.delay).await;

        // The prompt describes the unboosted top ten.
        let prompt = keyword_prompt(page, &scored, &rankings);

        // Buckets follow the unboosted score; rankings only raise scores within them.
        let (mut primary_keywords, mut secondary_keywords) = split_by_prominence(scored);
        apply_ranking_boost(&mut primary_keywords, &rankings);
        apply_ranking_boost(&mut secondary_keywords, &rankings);

        let llm_analysis = generate_or(self.llm, &prompt, KEYWORD_FALLBACK, "keyword analysis").await;

        KeywordData {
            target_url: page.page_info.url.clone(),
            primary_keywords,
            secondary_keywords,
            rankings,
            missing_keywords: Vec::new(),
            keyword_suggestions: Vec::new(),
            content_gaps: Vec::new(),
            llm_analysis,
        }
    }
}

#[async_trait]
impl Branch<KeywordData> for KeywordAnalyzer<'_> {
    fn name(&self) -> &'static str {
        "Keyword"
    }

    async fn run(&self, page: &PageData) -> Result<KeywordData> {
        Ok(self.analyze(page).await)
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

fn keyword_prompt(page: &PageData, keywords: &[KeywordInfo], rankings: &[KeywordRanking]) -> String {
    let keyword_lines = keywords
        .iter()
        .take(BUCKET_SIZE)
        .map(|k| {
            format!(
                "- \"{}\": {}x (density {}%, title: {}, H1: {})",
                k.keyword,
                k.count,
                k.density,
                yes_no(k.in_title),
                yes_no(k.in_h1)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let ranking_lines = if rankings.is_empty() {
        "No rankings determined".to_string()
    } else {
        rankings
            .iter()
            .map(|r| match r.position {
                Some(pos) => format!("- \"{}\": position {}", r.keyword, pos),
                None => format!("- \"{}\": not found", r.keyword),
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "You are an SEO keyword expert. Analyse the keyword usage of this web page.\n\n\
         URL: {}\nTitle: {}\nTotal words: {}\n\n\
         Top keywords on the page:\n{}\n\n\
         Search ranking positions:\n{}\n\n\
         Give concrete recommendations:\n\
         1. Which keywords are well positioned?\n\
         2. Which keywords are missing or should be used more?\n\
         3. Keyword suggestions for better rankings\n\
         4. Content gaps that should be closed",
        page.page_info.url,
        page.meta.title,
        page.page_info.word_count.max(1),
        keyword_lines,
        ranking_lines
    )
}
