//! Site-root probes for `robots.txt` and `sitemap.xml`.

use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Probes get their own short timeout, independent of the page fetch.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// robots.txt content is kept only up to this many characters.
pub const ROBOTS_CONTENT_LIMIT: usize = 2000;

/// What was found at the site root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteFiles {
    pub has_robots_txt: bool,
    pub robots_txt_content: String,
    pub has_sitemap: bool,
}

/// Builds the URL of a file at the root of the page's origin (scheme, host and port).
pub fn root_file_url(page_url: &Url, file: &str) -> Url {
    let mut url = page_url.clone();
    url.set_path(file);
    url.set_query(None);
    url.set_fragment(None);
    url
}

/// Probes robots.txt and sitemap.xml concurrently.
///
/// A file counts as present only on a 2xx answer. Any failure (network, timeout,
/// unreadable body) degrades to "not found" and never fails the crawl.
pub async fn probe_site_files(client: &Client, page_url: &Url) -> SiteFiles {
    let robots_url = root_file_url(page_url, "/robots.txt");
    let sitemap_url = root_file_url(page_url, "/sitemap.xml");

    let (robots, sitemap) = tokio::join!(
        fetch_root_file(client, &robots_url),
        fetch_root_file(client, &sitemap_url)
    );

    let mut files = SiteFiles::default();

    if let Some(response) = robots {
        files.has_robots_txt = true;
        match response.text().await {
            Ok(body) => {
                files.robots_txt_content = body.chars().take(ROBOTS_CONTENT_LIMIT).collect();
            }
            Err(e) => {
                tracing::debug!(url = %robots_url, error = %e, "Failed to read robots.txt body");
            }
        }
    }

    files.has_sitemap = sitemap.is_some();
    files
}

async fn fetch_root_file(client: &Client, url: &Url) -> Option<reqwest::Response> {
    match client.get(url.as_str()).timeout(PROBE_TIMEOUT).send().await {
        Ok(response) if response.status().is_success() => Some(response),
        Ok(response) => {
            tracing::info!(url = %url, status = %response.status(), "Site file not found");
            None
        }
        Err(e) => {
            tracing::info!(url = %url, error = %e, "Site file probe failed");
            None
        }
    }
}
