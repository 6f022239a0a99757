//! GitHub REST client backing the pull request watcher.

use crate::producers::{PullRequest, PullRequestSource};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

pub const GITHUB_API_BASE: &str = "https://api.github.com";
const CLIENT_AGENT: &str = concat!("nagloop/", env!("CARGO_PKG_VERSION"));
const PER_PAGE: u32 = 100;

/// Token-authenticated GitHub API client. Never log the token.
#[derive(Clone)]
pub struct GitHubClient {
    token: String,
    base_url: String,
    client: Client,
}

impl GitHubClient {
    pub fn new(token: String) -> Self {
        Self {
            token,
            base_url: GITHUB_API_BASE.to_string(),
            client: Client::new(),
        }
    }

    /// Point the client at another API root (GitHub Enterprise, tests).
    pub fn with_base_url(token: String, base_url: &str) -> Result<Self> {
        let parsed = url::Url::parse(base_url)
            .with_context(|| format!("Invalid GitHub API base URL: {}", base_url))?;
        Ok(Self {
            token,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            client: Client::new(),
        })
    }

    fn repo_url(&self, owner: &str, repo: &str, path: &str) -> String {
        format!("{}/repos/{}/{}/{}", self.base_url, owner, repo, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> Result<T> {
        let per_page = PER_PAGE.to_string();
        let res = self
            .client
            .get(url)
            .query(query)
            .query(&[("per_page", per_page.as_str())])
            .bearer_auth(&self.token)
            .header(reqwest::header::USER_AGENT, CLIENT_AGENT)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            anyhow::bail!("GitHub API error {} for {}: {}", status, url, body);
        }
        res.json::<T>()
            .await
            .with_context(|| format!("Failed to decode response from {}", url))
    }

    async fn count(&self, url: &str) -> Result<usize> {
        let items: Vec<serde_json::Value> = self.get_json(url, &[]).await?;
        Ok(items.len())
    }
}

#[async_trait]
impl PullRequestSource for GitHubClient {
    async fn list_open(&self, owner: &str, repo: &str) -> Result<Vec<PullRequest>> {
        let url = self.repo_url(owner, repo, "pulls");
        self.get_json(&url, &[("state", "open")]).await
    }

    /// Each list counts on its own; a failing list counts as 0 unless both fail.
    async fn count_comments(&self, owner: &str, repo: &str, number: u64) -> Result<usize> {
        let review = self
            .count(&self.repo_url(owner, repo, &format!("pulls/{}/comments", number)))
            .await;
        let conversation = self
            .count(&self.repo_url(owner, repo, &format!("issues/{}/comments", number)))
            .await;
        match (review, conversation) {
            (Err(e), Err(_)) => Err(e),
            (review, conversation) => {
                for e in [&review, &conversation].into_iter().filter_map(|r| r.as_ref().err()) {
                    tracing::debug!(error = %e, number, "comment list unavailable, counting 0");
                }
                Ok(review.unwrap_or(0) + conversation.unwrap_or(0))
            }
        }
    }

    async fn count_commits(&self, owner: &str, repo: &str, number: u64) -> Result<usize> {
        self.count(&self.repo_url(owner, repo, &format!("pulls/{}/commits", number)))
            .await
    }
}
