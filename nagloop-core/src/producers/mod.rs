//! Concrete producers
//!
//! - [`Greeter`]: a fixed notice on a fixed cadence.
//! - [`PullRequestWatcher`]: review reminders for a GitHub repository.

mod github;
mod greeter;
mod pull_requests;

pub use github::{GitHubClient, GITHUB_API_BASE};
pub use greeter::Greeter;
pub use pull_requests::{
    api_url_to_public_url, PullRequest, PullRequestInfo, PullRequestSource, PullRequestWatcher,
    DEFAULT_PULL_REQUEST_POLL,
};
