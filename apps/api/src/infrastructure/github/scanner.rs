use std::collections::{HashMap, VecDeque};

use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION, LINK};
use reqwest::StatusCode;
use serde::Deserialize;

use super::errors::{ScanError, ScanResult};

/// Default GitHub REST API base
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Reads every file of a GitHub repository
///
/// Walks the contents API breadth-first, following `Link: rel="next"`
/// pagination on every listing. Files are keyed by name only, so a file
/// seen later replaces an earlier one with the same name. A file whose
/// download fails is skipped; listing failures abort the scan.
pub struct RepoScanner {
    api_base: String,
    token: Option<String>,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ContentEntry {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    download_url: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

impl RepoScanner {
    /// Creates a scanner against a contents-API host
    ///
    /// # Arguments
    /// * `api_base` - API root, e.g. [`DEFAULT_GITHUB_API_URL`]
    /// * `token` - Access token sent as a bearer token, if any
    pub fn with_api_base(api_base: impl Into<String>, token: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("crewforge-api/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
            client,
        }
    }

    /// Fetch every file of the repository at `repo_url`
    ///
    /// # Returns
    /// * `Ok(HashMap<name, content>)` - All readable files
    /// * `Err(ScanError::InvalidUrl)` - URL lacks an owner and repo; no request is made
    /// * `Err(ScanError::RateLimited)` - A listing hit the rate limit
    /// * `Err(ScanError::FetchError)` - A listing failed for any other reason
    pub async fn scan_all_files(&self, repo_url: &str) -> ScanResult<HashMap<String, String>> {
        let (owner, repo) = parse_repo_url(repo_url)?;
        tracing::info!(%owner, %repo, "Scanning repository");

        let mut listings = VecDeque::from([format!(
            "{}/repos/{}/{}/contents",
            self.api_base, owner, repo
        )]);
        let mut files = HashMap::new();

        while let Some(listing) = listings.pop_front() {
            let mut page = Some(listing);
            while let Some(url) = page.take() {
                let (entries, next) = self.list_page(&url).await?;

                for entry in entries {
                    match entry.kind.as_str() {
                        "file" => {
                            if let Some(content) = self.fetch_file(&entry).await {
                                files.insert(entry.name, content);
                            }
                        }
                        "dir" => {
                            if let Some(dir_url) = entry.url {
                                listings.push_back(dir_url);
                            }
                        }
                        _ => {}
                    }
                }

                page = next;
            }
        }

        tracing::info!(%owner, %repo, count = files.len(), "Repository scan complete");
        Ok(files)
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.client.get(url).header(ACCEPT, "application/vnd.github+json");
        match &self.token {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {}", token)),
            None => request,
        }
    }

    async fn list_page(&self, url: &str) -> ScanResult<(Vec<ContentEntry>, Option<String>)> {
        let response = self
            .get(url)
            .send()
            .await
            .map_err(|e| ScanError::FetchError(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ScanError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status == StatusCode::FORBIDDEN && body.to_lowercase().contains("rate limit") {
                return Err(ScanError::RateLimited);
            }
            return Err(ScanError::FetchError(format!("status {}", status)));
        }

        let next = next_link(response.headers());
        let entries = response
            .json::<Vec<ContentEntry>>()
            .await
            .map_err(|e| ScanError::FetchError(format!("unexpected listing body: {}", e)))?;

        Ok((entries, next))
    }

    async fn fetch_file(&self, entry: &ContentEntry) -> Option<String> {
        let download_url = entry.download_url.as_deref()?;

        let response = match self.get(download_url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(file = %entry.name, error = %e, "Skipping file");
                return None;
            }
        };

        if response.status() != StatusCode::OK {
            tracing::warn!(file = %entry.name, status = %response.status(), "Skipping file");
            return None;
        }

        response
            .text()
            .await
            .map_err(|e| tracing::warn!(file = %entry.name, error = %e, "Skipping file"))
            .ok()
    }
}

/// Extract `(owner, repo)` from the last two path segments of a repository URL
///
/// Accepts full URLs (`https://github.com/owner/repo`) and bare
/// `owner/repo` paths. A trailing `.git` is dropped.
pub fn parse_repo_url(repo_url: &str) -> ScanResult<(String, String)> {
    let path = match repo_url.split_once("://") {
        // Skip the host
        Some((_, rest)) => rest.split_once('/').map(|(_, path)| path).unwrap_or(""),
        None => repo_url,
    };

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    match segments.as_slice() {
        [.., owner, repo] => {
            let repo = repo.strip_suffix(".git").unwrap_or(*repo);
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(ScanError::InvalidUrl(repo_url.to_string())),
    }
}

/// Target of the `rel="next"` entry of a `Link` header
fn next_link(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(LINK)?.to_str().ok()?;

    value.split(',').find_map(|link| {
        let mut parts = link.split(';');
        let target = parts
            .next()?
            .trim()
            .strip_prefix('<')?
            .strip_suffix('>')?;
        parts
            .any(|param| matches!(param.trim(), "rel=\"next\"" | "rel=next"))
            .then(|| target.to_string())
    })
}
