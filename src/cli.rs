use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "seo-agent")]
#[command(about = "SEO analysis of a single web page with competitor and keyword research", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the full analysis and write an HTML report
    Analyze {
        /// The page to analyze
        #[arg(value_name = "URL")]
        url: String,
    },
    /// Fetch a page and print what was extracted from it
    Crawl {
        /// The page to fetch
        #[arg(value_name = "URL")]
        url: String,
    },
}
