use crate::competitor::snapshot;
use crate::llm::{TextCompletion, generate_or};
use crate::models::{
    CompetitorData, CompetitorSeo, KeywordData, PageData, SeoAnalysis, SeoReport, Severity,
};
use crate::workflow::WorkflowState;
use anyhow::{Context, Result};
use colored::*;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

/// Headings listed in the report's page section.
const REPORT_HEADINGS: usize = 20;

pub struct Reporter;

impl Reporter {
    /// Assembles the report from whatever the branches produced.
    pub async fn build_report(state: &WorkflowState, llm: &dyn TextCompletion) -> SeoReport {
        let url = state
            .crawl_data
            .as_ref()
            .map(|page| page.page_info.url.clone())
            .unwrap_or_else(|| state.url.clone());

        let prompt = summary_prompt(&url, state);
        let fallback = Self::fallback_summary(&url, state.seo_analysis.as_ref());
        let executive_summary = generate_or(llm, &prompt, &fallback, "executive summary").await;

        SeoReport {
            url,
            timestamp: chrono::Utc::now().to_rfc3339(),
            crawl_data: state.crawl_data.clone(),
            seo_analysis: state.seo_analysis.clone(),
            competitor_data: state.competitor_data.clone(),
            keyword_data: state.keyword_data.clone(),
            executive_summary,
            errors: state.errors.clone(),
            report_html_path: String::new(),
        }
    }

    pub fn fallback_summary(url: &str, analysis: Option<&SeoAnalysis>) -> String {
        match analysis {
            Some(analysis) => format!(
                "SEO analysis for {} completed. Overall score: {}/100. {} critical issues found.",
                url,
                analysis.overall_score,
                analysis.count(Severity::Critical)
            ),
            None => format!("SEO analysis for {} completed.", url),
        }
    }

    /// `seo_report_<host with dots as underscores>_<unix millis>.html`
    pub fn report_filename(url: &str, timestamp_millis: i64) -> String {
        let stem = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.replace('.', "_")))
            .unwrap_or_else(|| "report".to_string());
        format!("seo_report_{}_{}.html", stem, timestamp_millis)
    }

    /// Writes the rendered report into `dir`, creating it if needed.
    pub fn save_html_report(report: &SeoReport, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create reports directory: {}", dir.display()))?;

        let path = dir.join(Self::report_filename(
            &report.url,
            chrono::Utc::now().timestamp_millis(),
        ));
        fs::write(&path, Self::render_html(report))
            .with_context(|| format!("Failed to write report: {}", path.display()))?;

        tracing::info!(path = %path.display(), "HTML report written");
        Ok(path)
    }

    pub fn render_html(report: &SeoReport) -> String {
        let mut html = String::with_capacity(32 * 1024);
        let score_class = report
            .seo_analysis
            .as_ref()
            .map(|a| score_class(a.overall_score))
            .unwrap_or("bad");

        let _ = write!(
            html,
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n\
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
             <title>SEO Report - {url}</title>\n<style>{css}</style>\n</head>\n<body>\n\
             <div class=\"container\">\n<div class=\"header\">\n<h1>SEO Report</h1>\n\
             <div class=\"url\">{url}</div>\n<div class=\"timestamp\">Generated {date}</div>\n</div>\n",
            url = html_escape(&report.url),
            css = REPORT_CSS,
            date = html_escape(&format_timestamp(&report.timestamp)),
        );

        if let Some(analysis) = &report.seo_analysis {
            let _ = write!(
                html,
                "<div class=\"score-section\"><div class=\"score-circle {}\">\
                 <div class=\"score-number\">{}</div><div class=\"score-label\">of 100</div>\
                 </div></div>\n",
                score_class, analysis.overall_score
            );
        }

        let _ = write!(
            html,
            "<div class=\"card\"><h2>Executive Summary</h2><div class=\"summary-text\">{}</div></div>\n",
            html_escape(&report.executive_summary)
        );

        if let Some(page) = &report.crawl_data {
            render_page_section(&mut html, page);
        }

        match &report.seo_analysis {
            Some(analysis) => render_analysis_section(&mut html, analysis),
            None => empty_card(&mut html, "SEO Scores", "The rule-based analysis is not available."),
        }

        match &report.competitor_data {
            Some(data) => {
                let target = report.crawl_data.as_ref().map(|page| CompetitorSeo {
                    overall_score: report
                        .seo_analysis
                        .as_ref()
                        .map(|a| a.overall_score)
                        .unwrap_or_default(),
                    ..snapshot(page)
                });
                render_competitor_section(&mut html, data, target.as_ref());
            }
            None => empty_card(&mut html, "Competitor Analysis", "No competitor data available."),
        }

        match &report.keyword_data {
            Some(data) => render_keyword_section(&mut html, data),
            None => empty_card(&mut html, "Keyword Analysis", "No keyword data available."),
        }

        if let Some(page) = &report.crawl_data
            && !page.structured_data.is_empty()
        {
            html.push_str("<div class=\"card\"><h2>Structured Data (Schema.org)</h2>\n");
            for item in &page.structured_data {
                let _ = write!(
                    html,
                    "<div class=\"info-item\"><div class=\"label\">Type</div>\
                     <div class=\"value ok\">{}</div><pre>{}</pre></div>\n",
                    html_escape(&item.schema_type),
                    html_escape(&item.raw_json)
                );
            }
            html.push_str("</div>\n");
        }

        if !report.errors.is_empty() {
            html.push_str("<div class=\"card\"><h2>Workflow Errors</h2><ul class=\"errors\">\n");
            for error in &report.errors {
                let _ = writeln!(html, "<li>{}</li>", html_escape(error));
            }
            html.push_str("</ul></div>\n");
        }

        let _ = write!(
            html,
            "<div class=\"footer\">Generated by <strong>SEO Agent</strong> | {}</div>\n\
             </div>\n</body>\n</html>\n",
            html_escape(&format_timestamp(&report.timestamp))
        );

        html
    }

    pub fn print_summary(report: &SeoReport) {
        println!("\n{}", "=".repeat(80).bright_blue());
        println!("{}", "SEO Agent - Analysis Report".bright_cyan().bold());
        println!("{}", "=".repeat(80).bright_blue());
        println!();
        println!("{}: {}", "URL".bright_white().bold(), report.url);
        println!("{}: {}", "Timestamp".bright_white().bold(), report.timestamp);
        println!();

        if let Some(analysis) = &report.seo_analysis {
            println!(
                "{} {}",
                "Overall Score:".bright_white().bold(),
                colored_score(analysis.overall_score, &format!("{}/100", analysis.overall_score))
            );
            println!();

            println!("{}", "Category Scores".bright_yellow().bold().underline());
            for score in &analysis.scores {
                println!(
                    "  {:<18} {}",
                    score.category.label(),
                    colored_score(score.score, &format!("{:>3}", score.score))
                );
            }
            println!();

            println!("{}", "Issues".bright_yellow().bold().underline());
            println!(
                "  Critical: {}",
                count_colored(analysis.count(Severity::Critical), Severity::Critical)
            );
            println!(
                "  Warnings: {}",
                count_colored(analysis.count(Severity::Warning), Severity::Warning)
            );
            println!(
                "  Notices:  {}",
                analysis.count(Severity::Info).to_string().bright_cyan()
            );

            let top: Vec<_> = analysis
                .issues
                .iter()
                .filter(|i| matches!(i.severity, Severity::Critical | Severity::Warning))
                .take(5)
                .collect();
            if !top.is_empty() {
                println!();
                for issue in top {
                    println!(
                        "  [{}] {}: {}",
                        severity_label(issue.severity),
                        issue.category.label().bright_white(),
                        issue.title
                    );
                }
            }
            println!();
        }

        if let Some(data) = &report.competitor_data {
            println!("{}", "Competitors".bright_yellow().bold().underline());
            println!("  {}", data.market_summary);
            for (rank, competitor) in data.competitors.iter().take(5).enumerate() {
                println!(
                    "  {}. {} ({} shared queries)",
                    rank + 1,
                    competitor.domain.bright_white(),
                    competitor.keyword_overlap.len()
                );
            }
            println!();
        }

        if let Some(data) = &report.keyword_data
            && !data.primary_keywords.is_empty()
        {
            println!("{}", "Primary Keywords".bright_yellow().bold().underline());
            for keyword in data.primary_keywords.iter().take(5) {
                println!(
                    "  {:<20} {:>3}x  {:>5}%  score {}",
                    keyword.keyword, keyword.count, keyword.density, keyword.prominence_score
                );
            }
            println!();
        }

        if !report.errors.is_empty() {
            println!("{}", "Errors".bright_red().bold().underline());
            for error in &report.errors {
                println!("  {}", error.bright_red());
            }
            println!();
        }

        if !report.report_html_path.is_empty() {
            println!(
                "{} {}",
                "Report saved to:".bright_white().bold(),
                report.report_html_path.bright_green()
            );
        }
        println!("{}", "=".repeat(80).bright_blue());
    }

    /// Prints the extracted page facts of a crawl-only run.
    pub fn print_crawl(page: &PageData) {
        let info = &page.page_info;
        println!("{}", "Page".bright_yellow().bold().underline());
        println!("  URL:           {}", info.url);
        println!("  Final URL:     {}", info.final_url);
        println!(
            "  Status:        {}",
            if info.status_code == 200 {
                info.status_code.to_string().bright_green()
            } else {
                info.status_code.to_string().bright_red()
            }
        );
        println!("  Response time: {}ms", info.response_time_ms);
        println!("  Words:         {}", info.word_count);
        println!("  Language:      {}", or_dash(&info.language));
        println!("  HTTPS:         {}", yes_no(info.has_https));
        println!("  robots.txt:    {}", yes_no(info.has_robots_txt));
        println!("  sitemap.xml:   {}", yes_no(info.has_sitemap));
        println!();

        println!("{}", "Meta".bright_yellow().bold().underline());
        println!("  Title ({}):       {}", page.meta.title_length, or_dash(&page.meta.title));
        println!(
            "  Description ({}): {}",
            page.meta.description_length,
            or_dash(&page.meta.description)
        );
        println!("  Canonical:        {}", or_dash(&page.meta.canonical));
        println!("  Viewport:         {}", or_dash(&page.meta.viewport));
        println!("  og:title:         {}", or_dash(&page.meta.og_title));
        println!();

        println!("{}", "Headings".bright_yellow().bold().underline());
        for heading in page.headings.iter().take(REPORT_HEADINGS) {
            let indent = "  ".repeat(heading.level as usize);
            println!("{}{} {}", indent, heading.tag.to_uppercase().bright_cyan(), heading.text);
        }
        println!();

        println!(
            "{} {} internal, {} external",
            "Links:".bright_white().bold(),
            page.internal_links().count(),
            page.external_links().count()
        );
        println!(
            "{} {} total, {} with alt text",
            "Images:".bright_white().bold(),
            page.images.len(),
            page.images.iter().filter(|i| i.has_alt).count()
        );
        println!(
            "{} {}",
            "Structured data:".bright_white().bold(),
            page.structured_data
                .iter()
                .map(|s| s.schema_type.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
}

pub fn score_class(score: u32) -> &'static str {
    if score >= 80 {
        "good"
    } else if score >= 50 {
        "ok"
    } else {
        "bad"
    }
}

pub fn html_escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn format_timestamp(timestamp: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(timestamp)
        .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|_| timestamp.to_string())
}

fn yes_no(flag: bool) -> ColoredString {
    if flag { "yes".bright_green() } else { "no".bright_red() }
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

fn colored_score(score: u32, text: &str) -> ColoredString {
    match score_class(score) {
        "good" => text.bright_green(),
        "ok" => text.yellow(),
        _ => text.bright_red(),
    }
}

fn count_colored(count: usize, severity: Severity) -> ColoredString {
    match (count, severity) {
        (0, _) => count.to_string().bright_green(),
        (_, Severity::Critical) => count.to_string().bright_red(),
        _ => count.to_string().yellow(),
    }
}

fn severity_label(severity: Severity) -> ColoredString {
    match severity {
        Severity::Critical => "CRIT".bright_red(),
        Severity::Warning => "WARN".yellow(),
        Severity::Info => "INFO".bright_cyan(),
        Severity::Good => "GOOD".bright_green(),
    }
}

fn check_mark(flag: bool) -> &'static str {
    if flag {
        "<span class=\"check\">&#10003;</span>"
    } else {
        "<span class=\"cross\">&#10007;</span>"
    }
}

fn empty_card(html: &mut String, title: &str, message: &str) {
    let _ = write!(
        html,
        "<div class=\"card\"><h2>{}</h2><p class=\"dim\">{}</p></div>\n",
        html_escape(title),
        html_escape(message)
    );
}

fn info_item(html: &mut String, label: &str, value: &str, class: &str) {
    let _ = write!(
        html,
        "<div class=\"info-item\"><div class=\"label\">{}</div><div class=\"value {}\">{}</div></div>",
        html_escape(label),
        class,
        html_escape(value)
    );
}

fn render_page_section(html: &mut String, page: &PageData) {
    let info = &page.page_info;
    let response_class = match info.response_time_ms {
        0..=1000 => "ok",
        1001..=3000 => "warn",
        _ => "bad",
    };

    html.push_str("<div class=\"card\"><h2>Page Information</h2><div class=\"info-grid\">");
    info_item(
        html,
        "Status code",
        &info.status_code.to_string(),
        if info.status_code == 200 { "ok" } else { "bad" },
    );
    info_item(html, "Response time", &format!("{}ms", info.response_time_ms), response_class);
    info_item(
        html,
        "Words",
        &info.word_count.to_string(),
        if info.word_count >= 300 { "ok" } else { "bad" },
    );
    info_item(
        html,
        "HTTPS",
        if info.has_https { "Yes" } else { "No" },
        if info.has_https { "ok" } else { "bad" },
    );
    info_item(html, "Language", or_dash(&info.language), "");
    info_item(
        html,
        "robots.txt",
        if info.has_robots_txt { "Present" } else { "Missing" },
        if info.has_robots_txt { "ok" } else { "warn" },
    );
    info_item(
        html,
        "Sitemap",
        if info.has_sitemap { "Present" } else { "Missing" },
        if info.has_sitemap { "ok" } else { "warn" },
    );
    info_item(
        html,
        "Structured data",
        &format!("{} found", page.structured_data.len()),
        if page.structured_data.is_empty() { "warn" } else { "ok" },
    );
    html.push_str("</div>\n<div class=\"grid-2\"><div><h3>Headings</h3><ul class=\"headings\">");
    for heading in page.headings.iter().take(REPORT_HEADINGS) {
        let _ = write!(
            html,
            "<li class=\"level-{}\"><span class=\"tag\">{}</span> {}</li>",
            heading.level,
            html_escape(&heading.tag.to_uppercase()),
            html_escape(&heading.text)
        );
    }
    html.push_str("</ul></div><div><h3>Links &amp; Images</h3><div class=\"info-grid\">");
    info_item(html, "Internal", &page.internal_links().count().to_string(), "");
    info_item(html, "External", &page.external_links().count().to_string(), "");
    info_item(html, "Images", &page.images.len().to_string(), "");
    info_item(
        html,
        "Images with alt",
        &page.images.iter().filter(|i| i.has_alt).count().to_string(),
        "",
    );
    html.push_str("</div></div></div></div>\n");
}

fn render_analysis_section(html: &mut String, analysis: &SeoAnalysis) {
    html.push_str("<div class=\"card\"><h2>SEO Scores</h2>\n");
    for score in &analysis.scores {
        let _ = write!(
            html,
            "<div class=\"score-bar-container\"><div class=\"score-bar-label\">{label}</div>\
             <div class=\"score-bar-track\"><div class=\"score-bar-fill {class}\" style=\"width: {score}%\"></div></div>\
             <div class=\"score-bar-value\">{score}%</div></div>\n",
            label = html_escape(score.category.label()),
            class = score_class(score.score),
            score = score.score
        );
    }
    html.push_str("</div>\n");

    let _ = write!(
        html,
        "<div class=\"card\"><h2>Issues Found ({})</h2>\n<table>\n\
         <tr><th>Severity</th><th>Category</th><th>Issue</th><th>Recommendation</th><th>Current</th><th>Ideal</th></tr>\n",
        analysis.issues.len()
    );
    for issue in &analysis.issues {
        let _ = write!(
            html,
            "<tr><td><span class=\"badge badge-{sev}\">{sev}</span></td><td>{cat}</td>\
             <td><strong>{title}</strong><br><span class=\"dim\">{desc}</span></td>\
             <td>{rec}</td><td>{cur}</td><td>{ideal}</td></tr>\n",
            sev = issue.severity.as_str(),
            cat = html_escape(issue.category.label()),
            title = html_escape(&issue.title),
            desc = html_escape(&issue.description),
            rec = html_escape(&issue.recommendation),
            cur = html_escape(&issue.current_value),
            ideal = html_escape(&issue.ideal_value)
        );
    }
    html.push_str("</table></div>\n");

    if !analysis.strengths.is_empty() {
        html.push_str("<div class=\"card\"><h2>Strengths</h2><ul>");
        for strength in &analysis.strengths {
            let _ = write!(html, "<li><span class=\"check\">+</span> {}</li>", html_escape(strength));
        }
        html.push_str("</ul></div>\n");
    }

    if !analysis.llm_recommendations.is_empty() {
        let _ = write!(
            html,
            "<div class=\"card\"><h2>AI Recommendations</h2><div class=\"llm-box\">{}</div></div>\n",
            html_escape(&analysis.llm_recommendations)
        );
    }
}

fn render_competitor_section(html: &mut String, data: &CompetitorData, target: Option<&CompetitorSeo>) {
    let _ = write!(
        html,
        "<div class=\"card\"><h2>Competitor Analysis</h2><p>{}</p>\n",
        html_escape(&data.market_summary)
    );

    if data.competitors.is_empty() {
        html.push_str("<p class=\"dim\">No competitors found.</p>\n");
    } else {
        html.push_str("<table><tr><th>#</th><th>Domain</th><th>Title</th><th>Shared queries</th></tr>\n");
        for (i, competitor) in data.competitors.iter().enumerate() {
            let chips: String = competitor
                .keyword_overlap
                .iter()
                .map(|q| format!("<span class=\"keyword-chip\">{}</span>", html_escape(q)))
                .collect();
            let _ = write!(
                html,
                "<tr><td>{}</td><td><strong>{}</strong></td><td>{}</td><td>{}</td></tr>\n",
                i + 1,
                html_escape(&competitor.domain),
                html_escape(&competitor.title),
                chips
            );
        }
        html.push_str("</table>\n");
    }

    let crawled: Vec<_> = data
        .competitors
        .iter()
        .filter_map(|c| c.seo.as_ref().map(|seo| (c, seo)))
        .collect();

    if let Some(target) = target
        && !crawled.is_empty()
    {
        html.push_str("<h3>SEO comparison with top competitors</h3><table><tr><th>Metric</th><th class=\"target\">Target</th>");
        for (competitor, _) in &crawled {
            let _ = write!(html, "<th>{}</th>", html_escape(&competitor.domain));
        }
        html.push_str("</tr>\n");

        let rows: [(&str, fn(&CompetitorSeo) -> String); 10] = [
            ("Words", |s| s.word_count.to_string()),
            ("Title (chars)", |s| s.title_length.to_string()),
            ("Description (chars)", |s| s.description_length.to_string()),
            ("Response time (ms)", |s| s.response_time_ms.to_string()),
            ("Images", |s| s.image_count.to_string()),
            ("Internal links", |s| s.internal_links.to_string()),
            ("Schema.org", |s| check_mark(s.has_structured_data).to_string()),
            ("Open Graph", |s| check_mark(s.has_og_tags).to_string()),
            ("Twitter Card", |s| check_mark(s.has_twitter_card).to_string()),
            ("SEO score", |s| s.overall_score.to_string()),
        ];
        for (label, cell) in rows {
            let _ = write!(html, "<tr><td><strong>{}</strong></td><td class=\"target\">{}</td>", label, cell(target));
            for (_, seo) in &crawled {
                let _ = write!(html, "<td>{}</td>", cell(seo));
            }
            html.push_str("</tr>\n");
        }
        html.push_str("</table>\n");

        for (competitor, _) in &crawled {
            if competitor.strengths.is_empty() && competitor.weaknesses.is_empty() {
                continue;
            }
            let _ = write!(html, "<div class=\"comparison\"><h3>{}</h3>", html_escape(&competitor.domain));
            for strength in &competitor.strengths {
                let _ = write!(html, "<div class=\"ahead\">&uarr; {}</div>", html_escape(strength));
            }
            for weakness in &competitor.weaknesses {
                let _ = write!(html, "<div class=\"behind\">&darr; {}</div>", html_escape(weakness));
            }
            html.push_str("</div>\n");
        }
    }

    if !data.competitive_advantages.is_empty() {
        html.push_str("<h3 class=\"good-text\">Your advantages</h3><ul>");
        for item in &data.competitive_advantages {
            let _ = write!(html, "<li><span class=\"check\">+</span> {}</li>", html_escape(item));
        }
        html.push_str("</ul>\n");
    }
    if !data.competitive_gaps.is_empty() {
        html.push_str("<h3 class=\"bad-text\">Your gaps</h3><ul>");
        for item in &data.competitive_gaps {
            let _ = write!(html, "<li><span class=\"cross\">-</span> {}</li>", html_escape(item));
        }
        html.push_str("</ul>\n");
    }
    if !data.llm_analysis.is_empty() {
        let _ = write!(html, "<div class=\"llm-box\">{}</div>\n", html_escape(&data.llm_analysis));
    }
    html.push_str("</div>\n");
}

fn render_keyword_section(html: &mut String, data: &KeywordData) {
    html.push_str("<div class=\"card\"><h2>Keyword Analysis</h2>\n");

    if data.primary_keywords.is_empty() && data.secondary_keywords.is_empty() {
        html.push_str("<p class=\"dim\">No keywords extracted.</p>\n");
    }

    if !data.primary_keywords.is_empty() {
        html.push_str(
            "<h3>Primary keywords</h3><table><tr><th>Keyword</th><th>Count</th><th>Density</th>\
             <th>Title</th><th>H1</th><th>Description</th><th>URL</th><th>Score</th></tr>\n",
        );
        for k in &data.primary_keywords {
            let _ = write!(
                html,
                "<tr><td><strong>{}</strong></td><td>{}</td><td>{}%</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                html_escape(&k.keyword),
                k.count,
                k.density,
                check_mark(k.in_title),
                check_mark(k.in_h1),
                check_mark(k.in_description),
                check_mark(k.in_url),
                k.prominence_score
            );
        }
        html.push_str("</table>\n");
    }

    if !data.secondary_keywords.is_empty() {
        html.push_str("<h3>Secondary keywords</h3><div>");
        for k in &data.secondary_keywords {
            let _ = write!(
                html,
                "<span class=\"keyword-chip\">{} ({}x)</span>",
                html_escape(&k.keyword),
                k.count
            );
        }
        html.push_str("</div>\n");
    }

    if !data.rankings.is_empty() {
        html.push_str("<h3>Search rankings</h3><table><tr><th>Keyword</th><th>Position</th></tr>\n");
        for ranking in &data.rankings {
            let position = ranking
                .position
                .map(|p| p.to_string())
                .unwrap_or_else(|| "not in top 20".to_string());
            let _ = write!(
                html,
                "<tr><td>{}</td><td>{}</td></tr>\n",
                html_escape(&ranking.keyword),
                position
            );
        }
        html.push_str("</table>\n");
    }

    if !data.llm_analysis.is_empty() {
        let _ = write!(html, "<div class=\"llm-box\">{}</div>\n", html_escape(&data.llm_analysis));
    }
    html.push_str("</div>\n");
}

fn summary_prompt(url: &str, state: &WorkflowState) -> String {
    let score = state
        .seo_analysis
        .as_ref()
        .map(|a| format!("Overall score: {}/100", a.overall_score))
        .unwrap_or_else(|| "No score available".to_string());

    let critical = state
        .seo_analysis
        .as_ref()
        .map(|a| {
            a.issues
                .iter()
                .filter(|i| i.severity == Severity::Critical)
                .map(|i| format!("- {}", i.title))
                .collect::<Vec<_>>()
        })
        .filter(|lines| !lines.is_empty())
        .map(|lines| lines.join("\n"))
        .unwrap_or_else(|| "None".to_string());

    let competitor_count = state
        .competitor_data
        .as_ref()
        .map(|c| c.competitors.len())
        .unwrap_or(0);

    let keywords = state
        .keyword_data
        .as_ref()
        .map(|k| {
            k.primary_keywords
                .iter()
                .take(5)
                .map(|k| k.keyword.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        })
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "None determined".to_string());

    format!(
        "You are an SEO consultant. Write an executive summary for the following SEO report.\n\n\
         URL: {}\n{}\n\nCritical problems:\n{}\n\n\
         Competitors found: {}\nTop keywords: {}\n\n\
         Write a short, concise summary (3-5 sentences) that highlights the key findings \
         and the most urgent actions.",
        url, score, critical, competitor_count, keywords
    )
}

const REPORT_CSS: &str = r#"
:root { --bg:#0f0f23; --surface:#1a1a2e; --border:#2a2a4a; --text:#e0e0ff; --dim:#8888aa;
  --accent:#00d2ff; --green:#00e676; --yellow:#ffd740; --red:#ff5252;
  --gradient:linear-gradient(135deg,#00d2ff,#3a7bd5,#7b2ff7); }
* { margin:0; padding:0; box-sizing:border-box; }
body { font-family:'Segoe UI',system-ui,-apple-system,sans-serif; background:var(--bg); color:var(--text); line-height:1.6; }
.container { max-width:1200px; margin:0 auto; padding:2rem; }
.header { text-align:center; padding:3rem 2rem; background:var(--gradient); border-radius:16px; margin-bottom:2rem; }
.header h1 { font-size:2.5rem; font-weight:800; }
.header .url { word-break:break-all; opacity:.9; }
.header .timestamp { font-size:.85rem; opacity:.7; }
.score-section { display:flex; justify-content:center; margin:-3rem 0 2rem; }
.score-circle { width:140px; height:140px; border-radius:50%; background:var(--surface); border:6px solid; display:flex; flex-direction:column; align-items:center; justify-content:center; }
.score-circle.good { border-color:var(--green); } .score-circle.ok { border-color:var(--yellow); } .score-circle.bad { border-color:var(--red); }
.score-number { font-size:2.5rem; font-weight:800; } .score-label { color:var(--dim); font-size:.8rem; }
.card { background:var(--surface); border:1px solid var(--border); border-radius:12px; padding:1.5rem; margin-bottom:1.5rem; }
.card h2 { margin-bottom:1rem; color:var(--accent); } .card h3 { margin:1rem 0 .5rem; }
.summary-text, .llm-box { white-space:pre-wrap; }
.llm-box { margin-top:1rem; padding:1rem; border-left:3px solid var(--accent); background:rgba(0,210,255,.05); }
.info-grid { display:grid; grid-template-columns:repeat(auto-fill,minmax(160px,1fr)); gap:.75rem; }
.info-item { background:var(--bg); border-radius:8px; padding:.75rem; }
.info-item .label { color:var(--dim); font-size:.8rem; } .info-item .value { font-weight:700; }
.value.ok { color:var(--green); } .value.warn { color:var(--yellow); } .value.bad { color:var(--red); }
.grid-2 { display:grid; grid-template-columns:1fr 1fr; gap:1.5rem; margin-top:1rem; }
.headings { list-style:none; } .headings .tag { color:var(--accent); font-weight:700; margin-right:.4rem; }
.level-2 { padding-left:1rem; } .level-3 { padding-left:2rem; } .level-4, .level-5, .level-6 { padding-left:3rem; }
.score-bar-container { display:flex; align-items:center; gap:1rem; margin:.4rem 0; }
.score-bar-label { width:160px; } .score-bar-value { width:50px; text-align:right; }
.score-bar-track { flex:1; height:10px; background:var(--bg); border-radius:5px; overflow:hidden; }
.score-bar-fill { height:100%; } .score-bar-fill.good { background:var(--green); } .score-bar-fill.ok { background:var(--yellow); } .score-bar-fill.bad { background:var(--red); }
table { width:100%; border-collapse:collapse; margin-top:.5rem; }
th, td { text-align:left; padding:.5rem; border-bottom:1px solid var(--border); vertical-align:top; }
th { color:var(--dim); font-weight:600; } td.target, th.target { color:var(--accent); }
.badge { padding:.15rem .5rem; border-radius:4px; font-size:.75rem; font-weight:700; text-transform:uppercase; }
.badge-critical { background:var(--red); color:#000; } .badge-warning { background:var(--yellow); color:#000; }
.badge-info { background:var(--accent); color:#000; } .badge-good { background:var(--green); color:#000; }
.keyword-chip { display:inline-block; padding:.1rem .5rem; margin:.15rem; border-radius:12px; background:var(--bg); border:1px solid var(--border); font-size:.85rem; }
.check, .good-text, .behind { color:var(--green); } .cross, .bad-text, .ahead { color:var(--red); }
.dim { color:var(--dim); } pre { white-space:pre-wrap; font-size:.8rem; color:var(--dim); margin-top:.5rem; }
.errors li { color:var(--red); margin-left:1.2rem; }
.footer { text-align:center; color:var(--dim); font-size:.85rem; padding:2rem 0; }
"#;
