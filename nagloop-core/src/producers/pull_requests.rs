//! Pull request watcher: reminds a room about new and updated pull requests.

use crate::dispatch::{PollOutcome, Producer};
use crate::models::{Notice, PullRequestWatch};
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, DurationRound, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_PULL_REQUEST_POLL: Duration = Duration::from_secs(1200);

/// Open pull request as listed by the source
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    /// API URL; also the watcher's identity key
    pub url: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// What the watcher remembers about a pull request between polls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestInfo {
    pub commits: usize,
    pub comments: usize,
    pub url: String,
    pub title: String,
}

/// Read access to a repository's pull requests.
#[async_trait]
pub trait PullRequestSource: Send + Sync + 'static {
    async fn list_open(&self, owner: &str, repo: &str) -> anyhow::Result<Vec<PullRequest>>;

    /// Review comments plus conversation comments.
    async fn count_comments(&self, owner: &str, repo: &str, number: u64)
        -> anyhow::Result<usize>;

    async fn count_commits(&self, owner: &str, repo: &str, number: u64) -> anyhow::Result<usize>;
}

/// Turn `https://api.github.com/repos/o/r/pulls/1` into `https://github.com/o/r/pull/1`.
pub fn api_url_to_public_url(url: &str) -> String {
    url.replacen("api.", "", 1)
        .replacen("/repos", "", 1)
        .replacen("pulls", "pull", 1)
}

/// Watches one repository and posts review reminders to one room.
#[derive(Clone)]
pub struct PullRequestWatcher<S> {
    name: String,
    source: S,
    owner: String,
    repo: String,
    room: String,
    next_poll: Duration,
    seen: HashMap<String, PullRequestInfo>,
}

impl<S: PullRequestSource> PullRequestWatcher<S> {
    pub fn new(
        source: S,
        owner: impl Into<String>,
        repo: impl Into<String>,
        room: impl Into<String>,
    ) -> Self {
        let owner = owner.into();
        let repo = repo.into();
        Self {
            name: format!("pull-requests:{}/{}", owner, repo),
            source,
            owner,
            repo,
            room: room.into(),
            next_poll: DEFAULT_PULL_REQUEST_POLL,
            seen: HashMap::new(),
        }
    }

    pub fn from_config(source: S, watch: &PullRequestWatch) -> Self {
        Self::new(source, &watch.owner, &watch.repo, &watch.room)
            .with_poll_interval(Duration::from_secs(watch.poll_interval_seconds))
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.next_poll = interval;
        self
    }

    /// Pull requests recorded so far, keyed by API URL.
    pub fn seen(&self) -> &HashMap<String, PullRequestInfo> {
        &self.seen
    }

    /// Compare the open pull requests against what was seen before.
    ///
    /// Unknown pull requests count only if opened after the start of `now`'s
    /// UTC day. Known ones are reported again when commits were added to a
    /// discussion that already has comments.
    pub async fn scan(&mut self, now: DateTime<Utc>) -> anyhow::Result<Vec<Notice>> {
        let start_of_day = now
            .duration_trunc(chrono::Duration::days(1))
            .context("Failed to compute start of day")?;
        let pulls = self
            .source
            .list_open(&self.owner, &self.repo)
            .await
            .with_context(|| {
                format!("Failed to list pull requests for {}/{}", self.owner, self.repo)
            })?;

        let mut notices = Vec::new();
        for pr in pulls {
            let comments = self
                .source
                .count_comments(&self.owner, &self.repo, pr.number)
                .await
                .unwrap_or_else(|e| self.count_unavailable(pr.number, "comments", e));
            let commits = self
                .source
                .count_commits(&self.owner, &self.repo, pr.number)
                .await
                .unwrap_or_else(|e| self.count_unavailable(pr.number, "commits", e));
            let public_url = api_url_to_public_url(&pr.url);

            if let Some(info) = self.seen.get_mut(&pr.url) {
                if info.commits < commits && comments > 0 {
                    notices.push(Notice::to_room(
                        format!("New commits added to: {}({})", pr.title, public_url),
                        self.room.clone(),
                    ));
                }
                info.commits = commits;
                info.comments = comments;
            } else if pr.created_at > start_of_day {
                notices.push(Notice::to_room(
                    format!("Codereview please: {}({})", pr.title, public_url),
                    self.room.clone(),
                ));
                self.seen.insert(
                    pr.url.clone(),
                    PullRequestInfo {
                        commits,
                        comments,
                        url: pr.url,
                        title: pr.title,
                    },
                );
            }
        }
        Ok(notices)
    }

    fn count_unavailable(&self, number: u64, what: &str, error: anyhow::Error) -> usize {
        tracing::debug!(
            producer = %self.name,
            number,
            what,
            error = %error,
            "count unavailable, using 0"
        );
        0
    }
}

#[async_trait]
impl<S: PullRequestSource> Producer for PullRequestWatcher<S> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn poll(&mut self) -> anyhow::Result<PollOutcome> {
        let notices = self.scan(Utc::now()).await?;
        Ok(PollOutcome::from_notices(notices, self.next_poll))
    }
}
