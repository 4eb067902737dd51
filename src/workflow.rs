//! Crawl, then three concurrent analysis branches, then the report.
//!
//! Only a failed crawl ends a run early. Branch failures are recorded as
//! error strings and the report is built from whatever did succeed.

use crate::crawler::PageFetcher;
use crate::llm::TextCompletion;
use crate::models::{CompetitorData, KeywordData, PageData, SeoAnalysis, SeoReport};
use crate::reporter::Reporter;
use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// One analysis step that runs on the crawled page.
#[async_trait]
pub trait Branch<T: Send>: Send + Sync {
    /// Label used to tag this branch's errors.
    fn name(&self) -> &'static str;

    async fn run(&self, page: &PageData) -> Result<T>;
}

/// Progress of a workflow run.
///
/// The three analysis branches run concurrently under the single `Analyzing`
/// state; there is no per-branch status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowStatus {
    Pending,
    Crawled,
    Analyzing,
    Completed,
    Error,
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WorkflowStatus::Pending => "pending",
            WorkflowStatus::Crawled => "crawled",
            WorkflowStatus::Analyzing => "analyzing",
            WorkflowStatus::Completed => "completed",
            WorkflowStatus::Error => "error",
        })
    }
}

/// Everything a run produced. Each branch writes only its own slot.
#[derive(Debug, Clone)]
pub struct WorkflowState {
    pub url: String,
    pub status: WorkflowStatus,
    pub crawl_data: Option<PageData>,
    pub seo_analysis: Option<SeoAnalysis>,
    pub competitor_data: Option<CompetitorData>,
    pub keyword_data: Option<KeywordData>,
    pub report: Option<SeoReport>,
    pub errors: Vec<String>,
}

impl WorkflowState {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            status: WorkflowStatus::Pending,
            crawl_data: None,
            seo_analysis: None,
            competitor_data: None,
            keyword_data: None,
            report: None,
            errors: Vec::new(),
        }
    }

    fn record<T>(&mut self, outcome: Result<T, String>) -> Option<T> {
        match outcome {
            Ok(value) => Some(value),
            Err(message) => {
                self.errors.push(message);
                None
            }
        }
    }
}

pub struct Workflow<'a> {
    fetcher: &'a dyn PageFetcher,
    analysis: &'a dyn Branch<SeoAnalysis>,
    competitors: &'a dyn Branch<CompetitorData>,
    keywords: &'a dyn Branch<KeywordData>,
    llm: &'a dyn TextCompletion,
    reports_dir: PathBuf,
}

impl<'a> Workflow<'a> {
    pub fn new(
        fetcher: &'a dyn PageFetcher,
        analysis: &'a dyn Branch<SeoAnalysis>,
        competitors: &'a dyn Branch<CompetitorData>,
        keywords: &'a dyn Branch<KeywordData>,
        llm: &'a dyn TextCompletion,
        reports_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            fetcher,
            analysis,
            competitors,
            keywords,
            llm,
            reports_dir: reports_dir.into(),
        }
    }

    pub async fn run(&self, url: &str) -> WorkflowState {
        self.run_with_progress(url, |_| {}).await
    }

    /// Runs the whole pipeline, reporting each status transition to `on_status`.
    pub async fn run_with_progress(
        &self,
        url: &str,
        on_status: impl Fn(WorkflowStatus) + Send + Sync,
    ) -> WorkflowState {
        let mut state = WorkflowState::new(url);
        on_status(state.status);

        let page = match self.fetcher.fetch(url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::error!(url = %url, error = %e, "Crawl failed");
                state.errors.push(format!("Crawl error: {:#}", e));
                state.status = WorkflowStatus::Error;
                on_status(state.status);
                return state;
            }
        };
        state.status = WorkflowStatus::Crawled;
        on_status(state.status);

        state.status = WorkflowStatus::Analyzing;
        on_status(state.status);

        let (analysis, competitors, keywords) = tokio::join!(
            run_branch(self.analysis, &page),
            run_branch(self.competitors, &page),
            run_branch(self.keywords, &page),
        );

        state.crawl_data = Some(page);
        state.seo_analysis = state.record(analysis);
        state.competitor_data = state.record(competitors);
        state.keyword_data = state.record(keywords);

        let mut report = Reporter::build_report(&state, self.llm).await;
        match Reporter::save_html_report(&report, &self.reports_dir) {
            Ok(path) => report.report_html_path = path.display().to_string(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to write HTML report");
                state.errors.push(format!("Report error: {:#}", e));
                report.errors = state.errors.clone();
            }
        }
        state.report = Some(report);

        state.status = WorkflowStatus::Completed;
        on_status(state.status);
        state
    }
}

async fn run_branch<T: Send>(branch: &dyn Branch<T>, page: &PageData) -> Result<T, String> {
    branch.run(page).await.map_err(|e| {
        tracing::error!(branch = branch.name(), error = %e, "Analysis branch failed");
        format!("{} error: {:#}", branch.name(), e)
    })
}
