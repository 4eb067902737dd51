use crate::checks::run_all_checks;
use crate::llm::{TextCompletion, generate_or};
use crate::models::{CategoryScore, Issue, PageData, SeoAnalysis, Severity};
use crate::workflow::Branch;
use anyhow::Result;
use async_trait::async_trait;

/// Categories scoring at least this much are listed as strengths.
pub const STRENGTH_THRESHOLD: u32 = 80;

pub const RECOMMENDATIONS_FALLBACK: &str =
    "LLM unavailable - recommendations are based on the rule-based checks.";

/// The analysis branch: rule engine, aggregation and LLM recommendations.
pub struct SeoAnalyzer<'a> {
    llm: &'a dyn TextCompletion,
}

impl<'a> SeoAnalyzer<'a> {
    pub fn new(llm: &'a dyn TextCompletion) -> Self {
        Self { llm }
    }

    /// Runs the checks and aggregates them. Deterministic, no I/O.
    pub fn evaluate(page: &PageData) -> SeoAnalysis {
        let run = run_all_checks(page);
        Self::aggregate(run.scores, run.issues)
    }

    /// Overall score is the rounded mean of the category scores (0 when there are none).
    pub fn aggregate(scores: Vec<CategoryScore>, issues: Vec<Issue>) -> SeoAnalysis {
        let overall_score = if scores.is_empty() {
            0
        } else {
            let total: u32 = scores.iter().map(|s| s.score).sum();
            (total as f64 / scores.len() as f64).round() as u32
        };

        let strengths = scores
            .iter()
            .filter(|s| s.score >= STRENGTH_THRESHOLD)
            .map(|s| format!("{}: {}/100", s.category, s.score))
            .collect();

        let mut analysis = SeoAnalysis {
            overall_score,
            scores,
            issues,
            strengths,
            summary: String::new(),
            llm_recommendations: String::new(),
        };
        analysis.summary = format!(
            "SEO score: {}/100 | {} critical, {} warnings, {} notices",
            analysis.overall_score,
            analysis.count(Severity::Critical),
            analysis.count(Severity::Warning),
            analysis.count(Severity::Info)
        );
        analysis
    }

    pub async fn analyze(&self, page: &PageData) -> SeoAnalysis {
        let mut analysis = Self::evaluate(page);
        let prompt = recommendations_prompt(page, &analysis);
        analysis.llm_recommendations =
            generate_or(self.llm, &prompt, RECOMMENDATIONS_FALLBACK, "recommendations").await;
        analysis
    }
}

#[async_trait]
impl Branch<SeoAnalysis> for SeoAnalyzer<'_> {
    fn name(&self) -> &'static str {
        "Analysis"
    }

    async fn run(&self, page: &PageData) -> Result<SeoAnalysis> {
        Ok(self.analyze(page).await)
    }
}

fn recommendations_prompt(page: &PageData, analysis: &SeoAnalysis) -> String {
    let problems = analysis
        .issues
        .iter()
        .filter(|i| matches!(i.severity, Severity::Critical | Severity::Warning))
        .map(|i| {
            format!(
                "- [{}] {}: {}",
                i.severity.as_str().to_uppercase(),
                i.title,
                i.description
            )
        })
        .collect::<Vec<_>>();

    let problems = if problems.is_empty() {
        "No critical problems found.".to_string()
    } else {
        problems.join("\n")
    };

    format!(
        "You are an SEO expert. Review the following SEO problems of a web page and give \
         concrete, prioritised recommendations.\n\n\
         URL: {}\nOverall score: {}/100\nWords on the page: {}\nTitle: {}\n\n\
         Problems found:\n{}\n\n\
         Give at most 5 prioritised recommendations with concrete actions.",
        page.page_info.url,
        analysis.overall_score,
        page.page_info.word_count,
        page.meta.title,
        problems
    )
}
