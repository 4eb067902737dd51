pub mod checks;
pub mod cli;
pub mod competitor;
pub mod config;
pub mod crawler;
pub mod http_client;
pub mod keywords;
pub mod llm;
pub mod models;
pub mod reporter;
pub mod robots;
pub mod search;
pub mod seo_analyzer;
pub mod workflow;

use anyhow::Result;
use cli::{Cli, Command};
use colored::*;
use competitor::CompetitorAnalyzer;
use config::Settings;
use crawler::{Crawler, PageFetcher};
use http_client::build_http_client;
use indicatif::{ProgressBar, ProgressStyle};
use keywords::KeywordAnalyzer;
use reporter::Reporter;
use search::DuckDuckGoSearch;
use seo_analyzer::SeoAnalyzer;
use std::time::Duration;
use workflow::{Workflow, WorkflowStatus};

pub async fn run(args: Cli) -> Result<()> {
    println!(
        "{}",
        "SEO Agent - Page Analysis & Competitor Research"
            .bright_cyan()
            .bold()
    );
    println!("{}", "=".repeat(50).bright_blue());
    println!();

    let settings = Settings::load()?;
    let client = build_http_client(settings.request_timeout, &settings.user_agent)?;
    let crawler = Crawler::new(client.clone());

    match args.command {
        Command::Crawl { url } => {
            println!("{} {}", "Crawling:".bright_white().bold(), url);
            println!();
            let page = crawler.fetch(&url).await?;
            Reporter::print_crawl(&page);
        }
        Command::Analyze { url } => {
            println!("{} {}", "Analyzing:".bright_white().bold(), url);
            println!(
                "{} {} ({})",
                "LLM:".bright_white().bold(),
                settings.llm_provider,
                settings.model_name()
            );
            println!();

            let llm = llm::from_settings(&settings, client.clone());
            let search = DuckDuckGoSearch::new(client);
            let delay = Duration::from_millis(settings.search_delay_ms);

            let analysis = SeoAnalyzer::new(llm.as_ref());
            let competitors = CompetitorAnalyzer::new(
                &crawler,
                &search,
                llm.as_ref(),
                delay,
                settings.max_concurrent_requests,
            );
            let keywords = KeywordAnalyzer::new(&search, llm.as_ref(), delay);
            let workflow = Workflow::new(
                &crawler,
                &analysis,
                &competitors,
                &keywords,
                llm.as_ref(),
                settings.reports_dir.clone(),
            );

            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("[{elapsed_precise}] {spinner:.cyan} {msg}")?,
            );
            pb.enable_steady_tick(Duration::from_millis(120));

            let state = workflow
                .run_with_progress(&url, |status| {
                    pb.set_message(match status {
                        WorkflowStatus::Pending => "Crawling page...",
                        WorkflowStatus::Crawled => "Page crawled",
                        WorkflowStatus::Analyzing => {
                            "Analyzing SEO, competitors and keywords..."
                        }
                        WorkflowStatus::Completed => "Analysis complete",
                        WorkflowStatus::Error => "Analysis failed",
                    })
                })
                .await;
            pb.finish_and_clear();

            if state.status == WorkflowStatus::Error {
                anyhow::bail!("{}", state.errors.join("; "));
            }
            if let Some(report) = &state.report {
                Reporter::print_summary(report);
            }
        }
    }

    Ok(())
}
